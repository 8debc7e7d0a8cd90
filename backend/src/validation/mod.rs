//! Request payload validation shared by the handlers.
//!
//! Field-level checks are declared with `#[derive(Validate)]` on the payloads;
//! cross-field checks (date ranges, stock/budget arithmetic) live in `rules`
//! and are reported through [`reject`].

pub mod rules;

pub use validator::Validate;

use crate::error::AppError;
use validator::ValidationError;

/// Converts a single rule failure into the same shape derive validation produces.
pub fn reject(field: &str, error: ValidationError) -> AppError {
    let detail = match error.message {
        Some(message) => format!("{}: {}", field, message),
        None => format!("{}: {}", field, error.code),
    };
    AppError::Validation(vec![detail])
}

/// Runs derive validation and maps failures to `AppError::Validation`.
pub fn validated<T: Validate>(payload: T) -> Result<T, AppError> {
    payload.validate()?;
    Ok(payload)
}
