use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            code: code.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    BadRequest(String),
    InternalServerError(anyhow::Error),
    Validation(Vec<String>),
    InsufficientBudget { available: f64, requested: f64 },
    InsufficientStock { available: f64, requested: f64 },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("No encontrado", msg, "NOT_FOUND"),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("No autenticado", msg, "UNAUTHORIZED"),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("Acceso denegado", msg, "FORBIDDEN"),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("Conflicto", msg, "CONFLICT"),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Solicitud inválida", msg, "BAD_REQUEST"),
            ),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Error interno",
                        "Error interno del servidor",
                        "INTERNAL_SERVER_ERROR",
                    ),
                )
            }
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("Datos inválidos", "La validación falló", "VALIDATION_ERROR")
                    .with_details(serde_json::json!({ "errors": errors })),
            ),
            AppError::InsufficientBudget {
                available,
                requested,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "Presupuesto insuficiente",
                    "El monto supera el presupuesto disponible del proyecto",
                    "INSUFFICIENT_BUDGET",
                )
                .with_details(serde_json::json!({
                    "available": available,
                    "requested": requested,
                })),
            ),
            AppError::InsufficientStock {
                available,
                requested,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "Stock insuficiente",
                    "La cantidad solicitada supera el stock disponible",
                    "INSUFFICIENT_STOCK",
                )
                .with_details(serde_json::json!({
                    "available": available,
                    "requested": requested,
                })),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Recurso no encontrado".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("El registro ya existe".to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest("Referencia a un registro inexistente".to_string())
            }
            _ => AppError::InternalServerError(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}

pub type AppResult<T> = Result<T, AppError>;
