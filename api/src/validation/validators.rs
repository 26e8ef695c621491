//! Field validators
//!
//! Reusable checks shared by the schema rules. Each returns the
//! [`FailureKind`] describing why the value was rejected.

use shared::FieldInput;

use super::failures::FailureKind;

/// Validate that a field is present and not empty after trimming
pub fn validate_required(value: &FieldInput) -> Result<(), FailureKind> {
    match value {
        FieldInput::Text(s) if !s.trim().is_empty() => Ok(()),
        FieldInput::List(_) => Ok(()),
        _ => Err(FailureKind::FieldRequired),
    }
}

/// Validate that a value is one of the allowed options
pub fn validate_one_of(value: &str, allowed: &[String]) -> Result<(), FailureKind> {
    if allowed.iter().any(|option| option == value) {
        Ok(())
    } else {
        Err(FailureKind::FieldInvalidOption)
    }
}

/// Validate that a value is an integer
pub fn validate_int(value: &str) -> Result<i64, FailureKind> {
    value.parse::<i64>().map_err(|_| FailureKind::FieldWrongFormat)
}

/// Validate that a value is an integer within `min..=max`
pub fn validate_int_range(value: &str, min: i64, max: i64) -> Result<i64, FailureKind> {
    let parsed = validate_int(value)?;
    if parsed < min || parsed > max {
        return Err(FailureKind::FieldOutOfRange);
    }
    Ok(parsed)
}

/// Validate that a value has exactly `len` characters
pub fn validate_exact_length(value: &str, len: usize) -> Result<(), FailureKind> {
    if value.chars().count() != len {
        return Err(FailureKind::FieldWrongFormat);
    }
    Ok(())
}

/// Validate that a field is a list with at least `min` items
pub fn validate_min_items(value: &FieldInput, min: usize) -> Result<(), FailureKind> {
    match value.as_list() {
        Some(items) if items.len() >= min => Ok(()),
        _ => Err(FailureKind::FieldRequired),
    }
}
