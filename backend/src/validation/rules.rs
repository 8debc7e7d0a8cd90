//! Common validation rules shared across request payloads.

use chrono::NaiveDate;
use validator::ValidationError;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Validates password strength.
///
/// Requirements:
/// - At least 8 characters
/// - One uppercase and one lowercase letter
/// - One character that is neither a letter nor a digit
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(error(
            "password_too_short",
            "La contraseña debe tener al menos 8 caracteres",
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(error(
            "password_missing_uppercase",
            "La contraseña debe contener al menos una mayúscula",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(error(
            "password_missing_lowercase",
            "La contraseña debe contener al menos una minúscula",
        ));
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        return Err(error(
            "password_missing_symbol",
            "La contraseña debe contener al menos un carácter especial",
        ));
    }
    Ok(())
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "El campo no puede estar vacío"));
    }
    Ok(())
}

/// Start and end are both optional; only a present pair is compared.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(error(
            "date_range_inverted",
            "La fecha de fin debe ser posterior a la fecha de inicio",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_requires_length() {
        assert_eq!(
            validate_password_strength("Ab#1").unwrap_err().code,
            "password_too_short"
        );
    }

    #[test]
    fn password_requires_mixed_case() {
        assert_eq!(
            validate_password_strength("abcdefg#").unwrap_err().code,
            "password_missing_uppercase"
        );
        assert_eq!(
            validate_password_strength("ABCDEFG#").unwrap_err().code,
            "password_missing_lowercase"
        );
    }

    #[test]
    fn password_requires_symbol() {
        assert_eq!(
            validate_password_strength("Abcdefgh1").unwrap_err().code,
            "password_missing_symbol"
        );
    }

    #[test]
    fn password_accepts_strong_value() {
        assert!(validate_password_strength("Admin123!").is_ok());
    }

    #[test]
    fn blank_strings_are_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank(" maíz ").is_ok());
    }

    #[test]
    fn date_range_compares_only_complete_pairs() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(validate_date_range(Some(jan), Some(feb)).is_ok());
        assert!(validate_date_range(Some(jan), Some(jan)).is_ok());
        assert!(validate_date_range(Some(feb), Some(jan)).is_err());
        assert!(validate_date_range(None, Some(jan)).is_ok());
        assert!(validate_date_range(Some(feb), None).is_ok());
    }
}
