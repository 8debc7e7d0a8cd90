use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::extract_session,
    models::{
        system_log::LogEntry,
        user::{ForgotPasswordRequest, LoginRequest, LoginResponse, SessionResponse},
    },
    repositories::user as user_repo,
    services::system_log::{client_ip, record_quietly},
    state::AppState,
    utils::{
        cookies::{build_clear_session_cookie, build_session_cookie, session_token_from_headers},
        password::{generate_reset_token, verify_password},
    },
    validation::validated,
};

const INVALID_CREDENTIALS: &str = "Credenciales inválidas";
const FORGOT_PASSWORD_REPLY: &str =
    "Si el email está registrado, recibirá instrucciones para restablecer su contraseña";

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Credenciales inválidas"),
        (status = 403, description = "Cuenta inactiva"),
        (status = 429, description = "Demasiados intentos")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Response> {
    let payload = validated(payload)?;
    let ip = client_ip(&headers);

    let Some(user) = user_repo::find_by_email(&state.pool, &payload.email).await? else {
        record_quietly(
            state.system_log.as_ref(),
            LogEntry::warn("auth", "Intento de inicio de sesión con email desconocido")
                .from_ip(ip)
                .meta(json!({ "email": payload.email.trim() })),
        )
        .await;
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        record_quietly(
            state.system_log.as_ref(),
            LogEntry::warn("auth", "Contraseña incorrecta")
                .by(user.id)
                .from_ip(ip),
        )
        .await;
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    if !user.is_active() {
        return Err(AppError::Forbidden(
            "Cuenta inactiva. Contacte al administrador".into(),
        ));
    }

    user_repo::touch_last_access(&state.pool, user.id).await?;
    let session_user = user.session_user();
    let token = state.sessions.create(&session_user);

    record_quietly(
        state.system_log.as_ref(),
        LogEntry::info("login", format!("Inicio de sesión de {}", user.email))
            .by(user.id)
            .from_ip(ip),
    )
    .await;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    let cookie = build_session_cookie(&token, state.config.cookie_options());
    let body = LoginResponse {
        success: true,
        message: "Inicio de sesión exitoso".into(),
        user: session_user,
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Idempotent: without a live session it still clears the cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Sesión cerrada")),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token_from_headers(&headers) {
        let session = state.sessions.get(&token);
        state.sessions.destroy(&token);

        if let Some(session) = session {
            record_quietly(
                state.system_log.as_ref(),
                LogEntry::info("logout", format!("Cierre de sesión de {}", session.email))
                    .by(session.user_id)
                    .from_ip(client_ip(&headers)),
            )
            .await;
        }
    }

    let cookie = build_clear_session_cookie(state.config.cookie_options());
    (
        [(SET_COOKIE, cookie)],
        Json(json!({ "success": true, "message": "Sesión cerrada correctamente" })),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, body = SessionResponse),
        (status = 401, body = SessionResponse)
    ),
    tag = "auth"
)]
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match extract_session(&state.sessions, &headers) {
        Some(session) => Json(SessionResponse {
            authenticated: true,
            user: Some(session.user()),
        })
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(SessionResponse {
                authenticated: false,
                user: None,
            }),
        )
            .into_response(),
    }
}

/// Same answer whether or not the email exists.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses((status = 200, description = "Respuesta genérica")),
    tag = "auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<Value>> {
    let payload = validated(payload)?;

    if let Some(user) = user_repo::find_by_email(&state.pool, &payload.email).await? {
        if user.is_active() {
            // No mail transport and no reset endpoint: the token is neither
            // stored nor redeemable, it only reaches the server log.
            let token = generate_reset_token();
            tracing::debug!(user_id = %user.id, reset_token = %token, "Password reset token issued");
            tracing::info!(user_id = %user.id, "Password reset requested");
            record_quietly(
                state.system_log.as_ref(),
                LogEntry::info("auth", "Solicitud de restablecimiento de contraseña")
                    .by(user.id)
                    .from_ip(client_ip(&headers)),
            )
            .await;
        }
    }

    Ok(Json(json!({ "success": true, "message": FORGOT_PASSWORD_REPLY })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;
    use crate::models::system_log::LogLevel;
    use crate::services::session_store::SessionUser;
    use crate::services::system_log::MockSystemLogRecorder;
    use crate::state::tests::test_state;
    use crate::types::UserId;
    use axum::http::{header::COOKIE, HeaderValue};
    use std::sync::Arc;

    fn cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("sessionId={}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn logout_destroys_session_and_records_event() {
        let mut recorder = MockSystemLogRecorder::new();
        recorder
            .expect_record()
            .withf(|entry| {
                entry.origin == "logout"
                    && entry.level == LogLevel::Info
                    && entry.user_id == Some(UserId(9))
            })
            .times(1)
            .returning(|_| Ok(()));
        let state = test_state().with_system_log(Arc::new(recorder));

        let token = state.sessions.create(&SessionUser {
            id: UserId(9),
            name: "Marta".into(),
            email: "marta@agro.test".into(),
            role: Role::Producer,
        });

        let response = logout(State(state.clone()), cookie(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
        assert!(state.sessions.get(&token).is_none());
    }

    #[tokio::test]
    async fn logout_without_session_is_idempotent() {
        let mut recorder = MockSystemLogRecorder::new();
        recorder.expect_record().times(0);
        let state = test_state().with_system_log(Arc::new(recorder));

        let response = logout(State(state.clone()), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = logout(State(state), cookie("unknown-token")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn session_reports_cached_identity() {
        let state = test_state();
        let token = state.sessions.create(&SessionUser {
            id: UserId(42),
            name: "Admin".into(),
            email: "admin@agro.test".into(),
            role: Role::Administrator,
        });

        let response = session(State(state.clone()), cookie(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["authenticated"], true);
        assert_eq!(json["user"]["id"], 42);
        assert_eq!(json["user"]["role"], "administrator");

        let response = session(State(state), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
