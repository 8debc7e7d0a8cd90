//! User accounts and the authentication payloads built around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{role::Role, status::ActiveStatus};
use crate::services::session_store::SessionUser;
use crate::types::UserId;
use crate::validation::rules::{validate_not_blank, validate_password_strength};

/// The seeded administrator. It can never be deactivated or deleted.
pub const PRIMARY_ADMIN_ID: UserId = UserId(1);

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: ActiveStatus,
    pub last_access: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == ActiveStatus::Active
    }

    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: ActiveStatus,
    pub last_access: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            status: user.status,
            last_access: user.last_access,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(
        length(min = 3, max = 100, message = "El nombre debe tener entre 3 y 100 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(email(message = "Formato de email inválido"))]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: ActiveStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(
        length(min = 3, max = 100, message = "El nombre debe tener entre 3 y 100 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(email(message = "Formato de email inválido"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<ActiveStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatus {
    pub status: ActiveStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Formato de email inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: SessionUser,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Formato de email inválido"))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}
