pub mod admin;
pub mod auth;
pub mod budgets;
pub mod expenses;
pub mod health;
pub mod inventory;
pub mod milestones;
pub mod phases;
pub mod products;
pub mod projects;
pub mod providers;
pub mod reports;
pub mod resources;
pub mod tasks;
pub mod tickets;
pub mod users;

use axum::Json;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};

/// Turns a missing row into a 404 with `message`.
pub(crate) fn found<T>(value: Option<T>, message: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::NotFound(message.to_string()))
}

/// Turns a zero-row UPDATE/DELETE into a 404 with `message`.
pub(crate) fn touched(rows: u64, message: &str) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::NotFound(message.to_string()));
    }
    Ok(())
}

pub(crate) fn success(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}
