use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::ActiveStatus;
use crate::types::ProviderId;
use crate::validation::rules::validate_not_blank;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub tax_id: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub product_types: Option<String>,
    pub status: ActiveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProvider {
    #[validate(
        length(min = 3, max = 150, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(
        length(min = 5, max = 30, message = "El NIT debe tener entre 5 y 30 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub tax_id: String,
    pub contact: Option<String>,
    #[validate(length(min = 7, max = 20, message = "Teléfono inválido"))]
    pub phone: Option<String>,
    #[validate(email(message = "Formato de email inválido"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub product_types: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProvider {
    #[validate(
        length(min = 3, max = 150, message = "El nombre debe tener al menos 3 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(
        length(min = 5, max = 30, message = "El NIT debe tener entre 5 y 30 caracteres"),
        custom(function = "validate_not_blank")
    )]
    pub tax_id: Option<String>,
    pub contact: Option<String>,
    #[validate(length(min = 7, max = 20, message = "Teléfono inválido"))]
    pub phone: Option<String>,
    #[validate(email(message = "Formato de email inválido"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub product_types: Option<String>,
}
