use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    handlers::{found, touched},
    models::{
        role::{Role, RoleCount, RoleRecord},
        status::ActiveStatus,
        system_log::LogEntry,
        user::{
            ChangePassword, CreateUser, UpdateUser, UpdateUserStatus, UserResponse,
            PRIMARY_ADMIN_ID,
        },
    },
    repositories::user as user_repo,
    services::{
        session_store::Session,
        system_log::{client_ip, record_quietly},
    },
    state::AppState,
    types::UserId,
    utils::password::hash_password,
    validation::validated,
};

const USER_NOT_FOUND: &str = "Usuario no encontrado";

#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, body = [UserResponse])),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user_repo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Administrators see anyone; everybody else only themselves.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path)),
    responses((status = 200, body = UserResponse), (status = 403), (status = 404)),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<UserId>,
) -> AppResult<Json<UserResponse>> {
    if !session.is_admin() && session.user_id != id {
        return Err(AppError::Forbidden(
            "Solo puede consultar su propio perfil".into(),
        ));
    }
    let user = found(user_repo::find_by_id(&state.pool, id).await?, USER_NOT_FOUND)?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses((status = 201, body = UserResponse), (status = 409), (status = 422)),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Json(payload): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let payload = validated(payload)?;
    if user_repo::email_taken(&state.pool, &payload.email, None).await? {
        return Err(AppError::Conflict("El email ya está registrado".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let id = user_repo::create(
        &state.pool,
        &payload.name,
        &payload.email,
        &password_hash,
        payload.role,
        payload.status,
    )
    .await?;
    let user = found(user_repo::find_by_id(&state.pool, id).await?, USER_NOT_FOUND)?;

    record_quietly(
        state.system_log.as_ref(),
        LogEntry::info("users", format!("Usuario creado: {}", user.email))
            .by(session.user_id)
            .from_ip(client_ip(&headers))
            .meta(json!({ "user_id": id, "role": user.role })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path)),
    request_body = UpdateUser,
    responses((status = 200, body = UserResponse), (status = 400), (status = 404), (status = 409)),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<UserId>,
    Json(payload): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let payload = validated(payload)?;
    ensure_can_change_role(id, payload.role)?;
    let current = found(user_repo::find_by_id(&state.pool, id).await?, USER_NOT_FOUND)?;

    if payload.status == Some(ActiveStatus::Inactive) {
        ensure_can_deactivate(&session, id)?;
    }
    if let Some(email) = payload.email.as_deref() {
        if user_repo::email_taken(&state.pool, email, Some(id)).await? {
            return Err(AppError::Conflict("El email ya está registrado".into()));
        }
    }

    user_repo::update(&state.pool, id, &payload).await?;
    let updated = found(user_repo::find_by_id(&state.pool, id).await?, USER_NOT_FOUND)?;

    // Sessions cache name, email and role; any drift forces a new login.
    let role_changed = updated.role != current.role;
    let identity_changed = updated.name != current.name || updated.email != current.email;
    let deactivated = current.is_active() && !updated.is_active();
    let sessions_closed = if role_changed || identity_changed || deactivated {
        state.sessions.destroy_all_for_user(id)
    } else {
        0
    };

    record_quietly(
        state.system_log.as_ref(),
        LogEntry::info("users", format!("Usuario actualizado: {}", updated.email))
            .by(session.user_id)
            .from_ip(client_ip(&headers))
            .meta(json!({
                "user_id": id,
                "role_changed": role_changed,
                "identity_changed": identity_changed,
                "deactivated": deactivated,
                "sessions_closed": sessions_closed,
            })),
    )
    .await;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/status",
    params(("id" = i64, Path)),
    request_body = UpdateUserStatus,
    responses((status = 200, description = "Estado actualizado"), (status = 400), (status = 404)),
    tag = "users"
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<UserId>,
    Json(payload): Json<UpdateUserStatus>,
) -> AppResult<Json<Value>> {
    if payload.status == ActiveStatus::Inactive {
        ensure_can_deactivate(&session, id)?;
    }
    touched(
        user_repo::set_status(&state.pool, id, payload.status).await?,
        USER_NOT_FOUND,
    )?;

    let sessions_closed = match payload.status {
        ActiveStatus::Inactive => state.sessions.destroy_all_for_user(id),
        ActiveStatus::Active => 0,
    };

    record_quietly(
        state.system_log.as_ref(),
        LogEntry::info("users", format!("Estado de usuario {} cambiado a {}", id, payload.status))
            .by(session.user_id)
            .from_ip(client_ip(&headers)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Estado actualizado correctamente",
        "status": payload.status,
        "sessions_closed": sessions_closed,
    })))
}

/// Administrative reset; the user has to log in again everywhere.
#[utoipa::path(
    patch,
    path = "/api/users/{id}/password",
    params(("id" = i64, Path)),
    request_body = ChangePassword,
    responses((status = 200, description = "Contraseña actualizada"), (status = 404), (status = 422)),
    tag = "users"
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<UserId>,
    Json(payload): Json<ChangePassword>,
) -> AppResult<Json<Value>> {
    let payload = validated(payload)?;
    let password_hash = hash_password(&payload.password)?;
    touched(
        user_repo::set_password(&state.pool, id, &password_hash).await?,
        USER_NOT_FOUND,
    )?;
    state.sessions.destroy_all_for_user(id);

    record_quietly(
        state.system_log.as_ref(),
        LogEntry::info("users", format!("Contraseña restablecida para el usuario {}", id))
            .by(session.user_id)
            .from_ip(client_ip(&headers)),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "message": "Contraseña actualizada correctamente",
    })))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path)),
    responses((status = 200, description = "Usuario eliminado"), (status = 400), (status = 404)),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<UserId>,
) -> AppResult<Json<Value>> {
    if id == PRIMARY_ADMIN_ID {
        return Err(AppError::BadRequest(
            "No se puede eliminar al administrador principal".into(),
        ));
    }
    if id == session.user_id {
        return Err(AppError::BadRequest("No puede eliminar su propia cuenta".into()));
    }

    touched(user_repo::delete(&state.pool, id).await?, USER_NOT_FOUND)?;
    state.sessions.destroy_all_for_user(id);

    record_quietly(
        state.system_log.as_ref(),
        LogEntry::warn("users", format!("Usuario {} eliminado", id))
            .by(session.user_id)
            .from_ip(client_ip(&headers)),
    )
    .await;

    Ok(Json(json!({ "success": true, "message": "Usuario eliminado correctamente" })))
}

#[utoipa::path(
    get,
    path = "/api/users/stats/by-role",
    responses((status = 200, body = [RoleCount])),
    tag = "users"
)]
pub async fn stats_by_role(State(state): State<AppState>) -> AppResult<Json<Vec<RoleCount>>> {
    Ok(Json(user_repo::count_by_role(&state.pool).await?))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    responses((status = 200, body = [RoleRecord])),
    tag = "users"
)]
pub async fn list_roles(State(state): State<AppState>) -> AppResult<Json<Vec<RoleRecord>>> {
    Ok(Json(user_repo::list_roles(&state.pool).await?))
}

/// The primary administrator keeps the administrator role.
fn ensure_can_change_role(target: UserId, role: Option<Role>) -> AppResult<()> {
    match role {
        Some(role) if target == PRIMARY_ADMIN_ID && role != Role::Administrator => {
            Err(AppError::BadRequest(
                "No se puede cambiar el rol del administrador principal".into(),
            ))
        }
        _ => Ok(()),
    }
}

fn ensure_can_deactivate(session: &Session, target: UserId) -> AppResult<()> {
    if target == PRIMARY_ADMIN_ID {
        return Err(AppError::BadRequest(
            "No se puede desactivar al administrador principal".into(),
        ));
    }
    if target == session.user_id {
        return Err(AppError::BadRequest(
            "No puede desactivar su propia cuenta".into(),
        ));
    }
    Ok(())
}
