//! Change detection against original snapshots
//!
//! Checkbox and radio values round-trip through HTML in several spellings
//! (`on`, `true`, `1`, an empty string when unchecked). Both sides are
//! normalised before comparing.

const CANONICAL_TRUE: &str = "true";
const CANONICAL_FALSE: &str = "false";

/// Normalise a submitted value for comparison.
pub fn normalize(value: &str) -> String {
    let value = value.trim().to_lowercase();
    match value.as_str() {
        "" | "false" | "off" => CANONICAL_FALSE.to_string(),
        "on" | "true" | "1" => CANONICAL_TRUE.to_string(),
        _ => value,
    }
}

/// Whether `current` differs from `original`.
///
/// With no recorded original there is nothing to compare, so the value counts
/// as changed. A missing current value compares as an empty string.
pub fn has_changed(current: Option<&str>, original: Option<&str>) -> bool {
    match original {
        None => true,
        Some(original) => normalize(current.unwrap_or_default()) != normalize(original),
    }
}
