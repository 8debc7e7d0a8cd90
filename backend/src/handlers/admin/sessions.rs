use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    models::system_log::LogEntry,
    services::{
        session_store::{Session, SessionStats},
        system_log::record_quietly,
    },
    state::AppState,
    types::UserId,
};

/// Live sessions with truncated tokens.
pub async fn session_stats(State(state): State<AppState>) -> Json<SessionStats> {
    Json(state.sessions.stats())
}

/// Force logout everywhere. Unknown users simply close zero sessions.
pub async fn destroy_user_sessions(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<UserId>,
) -> Json<Value> {
    let closed = state.sessions.destroy_all_for_user(user_id);
    tracing::info!(target_user = %user_id, closed, by = %session.user_id, "Sessions revoked");
    record_quietly(
        state.system_log.as_ref(),
        LogEntry::warn("sessions", format!("Sesiones del usuario {} cerradas", user_id))
            .by(session.user_id)
            .meta(json!({ "target_user_id": user_id, "sessions_closed": closed })),
    )
    .await;

    Json(json!({
        "success": true,
        "sessions_closed": closed,
    }))
}
