use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    handlers::{found, projects::ensure_project, success, touched},
    models::{
        system_log::LogEntry,
        ticket::{
            AssignTicket, CreateTicket, Ticket, TicketQuery, TicketStats, UpdateTicket,
            UpdateTicketStatus,
        },
    },
    repositories::{ticket as ticket_repo, user as user_repo},
    services::{
        session_store::Session,
        system_log::{client_ip, record_quietly},
    },
    state::AppState,
    types::TicketId,
    validation::validated,
};

const ORIGIN: &str = "tickets";
const TICKET_NOT_FOUND: &str = "Ticket no encontrado";

/// Administrators see every ticket; everyone else only their own.
fn ensure_owner(session: &Session, ticket: &Ticket) -> AppResult<()> {
    if session.is_admin() || ticket.creator_id == session.user_id {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "No tiene permisos sobre este ticket".into(),
    ))
}

async fn load_owned(state: &AppState, session: &Session, id: TicketId) -> AppResult<Ticket> {
    let ticket = found(
        ticket_repo::find_by_id(&state.pool, id).await?,
        TICKET_NOT_FOUND,
    )?;
    ensure_owner(session, &ticket)?;
    Ok(ticket)
}

async fn record(state: &AppState, session: &Session, headers: &HeaderMap, entry: LogEntry) {
    record_quietly(
        state.system_log.as_ref(),
        entry.by(session.user_id).from_ip(client_ip(headers)),
    )
    .await;
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<TicketQuery>,
) -> AppResult<Json<Vec<Ticket>>> {
    let creator = (!session.is_admin()).then_some(session.user_id);
    Ok(Json(ticket_repo::list(&state.pool, &query, creator).await?))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<TicketId>,
) -> AppResult<Json<Ticket>> {
    Ok(Json(load_owned(&state, &session, id).await?))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Json(payload): Json<CreateTicket>,
) -> AppResult<(StatusCode, Json<Ticket>)> {
    let payload = validated(payload)?;
    if let Some(project) = payload.project_id {
        ensure_project(&state, project).await?;
    }

    let id = ticket_repo::create(&state.pool, &payload, session.user_id).await?;
    let ticket = found(
        ticket_repo::find_by_id(&state.pool, id).await?,
        TICKET_NOT_FOUND,
    )?;
    record(
        &state,
        &session,
        &headers,
        LogEntry::info(ORIGIN, format!("Ticket #{} creado", id))
            .meta(json!({ "priority": ticket.priority })),
    )
    .await;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<TicketId>,
    Json(payload): Json<UpdateTicket>,
) -> AppResult<Json<Ticket>> {
    let payload = validated(payload)?;
    load_owned(&state, &session, id).await?;
    if let Some(project) = payload.project_id {
        ensure_project(&state, project).await?;
    }

    touched(
        ticket_repo::update(&state.pool, id, &payload).await?,
        TICKET_NOT_FOUND,
    )?;
    record(
        &state,
        &session,
        &headers,
        LogEntry::info(ORIGIN, format!("Ticket #{} actualizado", id)),
    )
    .await;
    let ticket = found(
        ticket_repo::find_by_id(&state.pool, id).await?,
        TICKET_NOT_FOUND,
    )?;
    Ok(Json(ticket))
}

pub async fn update_ticket_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<TicketId>,
    Json(payload): Json<UpdateTicketStatus>,
) -> AppResult<Json<Ticket>> {
    let previous = load_owned(&state, &session, id).await?;

    touched(
        ticket_repo::set_status(&state.pool, id, payload.status).await?,
        TICKET_NOT_FOUND,
    )?;
    record(
        &state,
        &session,
        &headers,
        LogEntry::info(ORIGIN, format!("Estado del ticket #{} cambiado", id))
            .meta(json!({ "from": previous.status, "to": payload.status })),
    )
    .await;
    let ticket = found(
        ticket_repo::find_by_id(&state.pool, id).await?,
        TICKET_NOT_FOUND,
    )?;
    Ok(Json(ticket))
}

pub async fn assign_ticket(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<TicketId>,
    Json(payload): Json<AssignTicket>,
) -> AppResult<Json<Ticket>> {
    found(
        user_repo::find_by_id(&state.pool, payload.assignee_id).await?,
        "Usuario no encontrado",
    )?;

    touched(
        ticket_repo::assign(&state.pool, id, payload.assignee_id).await?,
        TICKET_NOT_FOUND,
    )?;
    record(
        &state,
        &session,
        &headers,
        LogEntry::info(ORIGIN, format!("Ticket #{} asignado", id))
            .meta(json!({ "assignee_id": payload.assignee_id })),
    )
    .await;
    let ticket = found(
        ticket_repo::find_by_id(&state.pool, id).await?,
        TICKET_NOT_FOUND,
    )?;
    Ok(Json(ticket))
}

pub async fn ticket_stats(State(state): State<AppState>) -> AppResult<Json<TicketStats>> {
    Ok(Json(ticket_repo::stats(&state.pool).await?))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<TicketId>,
) -> AppResult<Json<Value>> {
    touched(
        ticket_repo::delete(&state.pool, id).await?,
        TICKET_NOT_FOUND,
    )?;
    record(
        &state,
        &session,
        &headers,
        LogEntry::warn(ORIGIN, format!("Ticket #{} eliminado", id)),
    )
    .await;
    Ok(success("Ticket eliminado correctamente"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{role::Role, status::Priority, ticket::TicketStatus};
    use crate::types::UserId;
    use chrono::Utc;

    fn session(id: i64, role: Role) -> Session {
        Session {
            user_id: UserId(id),
            name: "Usuario".into(),
            email: "user@agro.test".into(),
            role,
            created_at: Utc::now(),
            last_activity: Utc::now(),
        }
    }

    fn ticket(creator: i64) -> Ticket {
        Ticket {
            id: TicketId(1),
            subject: "Bomba de riego".into(),
            description: "La bomba del lote 3 no arranca".into(),
            priority: Priority::High,
            status: TicketStatus::Open,
            creator_id: UserId(creator),
            creator_name: None,
            assignee_id: None,
            assignee_name: None,
            project_id: None,
            project_name: None,
            closed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn creator_and_admin_may_touch_ticket() {
        assert!(ensure_owner(&session(7, Role::Producer), &ticket(7)).is_ok());
        assert!(ensure_owner(&session(1, Role::Administrator), &ticket(7)).is_ok());
    }

    #[test]
    fn other_users_are_forbidden() {
        assert!(matches!(
            ensure_owner(&session(8, Role::Producer), &ticket(7)),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_owner(&session(9, Role::Advisor), &ticket(7)),
            Err(AppError::Forbidden(_))
        ));
    }
}
