//! Validation helpers for DTOs.

use time::{Date, macros::format_description};
use validator::ValidationError;

/// Rejects empty and whitespace-only values.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a calendar date written as `YYYY-MM-DD`.
///
/// # Examples
///
/// ```ignore
/// validate_iso_date("2024-03-01") // Ok
/// validate_iso_date("2024-02-30") // Err - no such day
/// validate_iso_date("03/01/2024") // Err - wrong format
/// ```
pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    if value.len() != 10 || Date::parse(value, &format).is_err() {
        let mut err = ValidationError::new("iso_date");
        err.message = Some(format!("`{value}` is not a YYYY-MM-DD date").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Hawks").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_iso_date_valid() {
        assert!(validate_iso_date("2024-03-01").is_ok());
        assert!(validate_iso_date("2024-02-29").is_ok());
    }

    #[test]
    fn test_validate_iso_date_invalid() {
        assert!(validate_iso_date("2023-02-29").is_err()); // not a leap year
        assert!(validate_iso_date("2024-3-1").is_err()); // unpadded
        assert!(validate_iso_date("03/01/2024").is_err());
        assert!(validate_iso_date("").is_err());
    }
}
