//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse an optional UUID column.
pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|raw| parse_uuid(raw, label)).transpose()
}

/// Trim a required text field, rejecting empty values.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping blank values to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Ensure a monetary amount (minor units) is strictly positive.
pub(crate) fn require_positive_amount(amount_minor: i64, label: &str) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(normalize_required_text("  Rice ", "title").unwrap(), "Rice");
        assert_eq!(
            normalize_required_text("   ", "title"),
            Err(EngineError::Validation("title must not be empty".to_string()))
        );
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some(" x ")), Some("x".to_string()));
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(require_positive_amount(1, "amount").is_ok());
        assert_eq!(
            require_positive_amount(0, "amount"),
            Err(EngineError::InvalidAmount("amount must be > 0".to_string()))
        );
    }
}
