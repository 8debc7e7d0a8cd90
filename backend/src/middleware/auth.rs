//! Session gate.
//!
//! Handlers never check credentials themselves: routers are grouped by policy
//! and the matching gate is attached with `route_layer`. A gate either inserts
//! the [`Session`] into the request extensions and runs the handler, or
//! answers with an [`AuthRejection`] and the handler never runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    models::role::Role,
    services::session_store::{Session, SessionStore},
    state::AppState,
    utils::cookies::session_token_from_headers,
};

pub const NOT_AUTHENTICATED_ERROR: &str = "No autenticado";
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Debe iniciar sesión para acceder a este recurso";
pub const FORBIDDEN_ERROR: &str = "Acceso denegado";
pub const FORBIDDEN_MESSAGE: &str = "No tiene permisos para realizar esta acción";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No cookie, unknown token or expired session.
    NotAuthenticated,
    /// Valid session whose cached role is not allowed here.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthRejection::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                NOT_AUTHENTICATED_ERROR,
                NOT_AUTHENTICATED_MESSAGE,
            ),
            AuthRejection::Forbidden => (StatusCode::FORBIDDEN, FORBIDDEN_ERROR, FORBIDDEN_MESSAGE),
        };
        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// Looks the cookie token up in the store. A hit slides the idle window.
pub fn extract_session(store: &SessionStore, headers: &HeaderMap) -> Option<Session> {
    let token = session_token_from_headers(headers)?;
    store.get(&token)
}

pub fn require_auth(store: &SessionStore, headers: &HeaderMap) -> Result<Session, AuthRejection> {
    extract_session(store, headers).ok_or(AuthRejection::NotAuthenticated)
}

pub fn require_role(
    store: &SessionStore,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<Session, AuthRejection> {
    let session = require_auth(store, headers)?;
    if !session.has_role(allowed) {
        tracing::debug!(
            user_id = %session.user_id,
            role = %session.role,
            "role not allowed for route"
        );
        return Err(AuthRejection::Forbidden);
    }
    Ok(session)
}

/// Any valid session.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let session = require_auth(&state.sessions, request.headers())?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Role policy for one group of routes.
#[derive(Clone)]
pub struct RoleGate {
    pub sessions: Arc<SessionStore>,
    pub allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(state: &AppState, allowed: &'static [Role]) -> Self {
        Self {
            sessions: state.sessions.clone(),
            allowed,
        }
    }
}

pub async fn require_roles(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let session = require_role(&gate.sessions, request.headers(), gate.allowed)?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
