//! Error formatting for GOV.UK error summaries and inline field errors

use serde::Serialize;
use shared::{ErrorReport, SummaryItem};

use super::failures::{ErrorMessage, FailureKind, FieldFailure};

/// Text used when a failure carries no usable message.
pub const FALLBACK_MESSAGE: &str = "Invalid value";

/// Summary and inline texts for one failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedError {
    pub summary_message: String,
    pub inline_message: String,
}

impl FormattedError {
    fn fallback() -> Self {
        Self {
            summary_message: FALLBACK_MESSAGE.to_string(),
            inline_message: FALLBACK_MESSAGE.to_string(),
        }
    }
}

fn needs_fallback(message: &ErrorMessage) -> bool {
    match message {
        ErrorMessage::Typed { summary, .. } => summary.is_empty(),
        ErrorMessage::Plain(text) => text.is_empty(),
        ErrorMessage::Missing => true,
    }
}

/// A formatted per-field failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub field_name: String,
    pub kind: FailureKind,
    pub summary_message: String,
    pub inline_message: String,
}

/// Format a single failure.
///
/// Typed messages keep both texts. Plain strings are used for both. Missing or
/// empty messages fall back to [`FALLBACK_MESSAGE`].
pub fn format(failure: &FieldFailure) -> FormattedError {
    if needs_fallback(&failure.message) {
        return FormattedError::fallback();
    }
    match &failure.message {
        ErrorMessage::Typed { summary, inline } => FormattedError {
            summary_message: summary.clone(),
            inline_message: inline.clone(),
        },
        ErrorMessage::Plain(text) => FormattedError {
            summary_message: text.clone(),
            inline_message: text.clone(),
        },
        ErrorMessage::Missing => FormattedError::fallback(),
    }
}

/// Format a failure into a [`ValidationFailure`]. Failures that needed the
/// fallback text are reclassified as [`FailureKind::FallbackInvalidValue`].
pub fn resolve(failure: &FieldFailure) -> ValidationFailure {
    let formatted = format(failure);
    let kind = if needs_fallback(&failure.message) {
        FailureKind::FallbackInvalidValue
    } else {
        failure.kind
    };
    ValidationFailure {
        field_name: failure.field.clone(),
        kind,
        summary_message: formatted.summary_message,
        inline_message: formatted.inline_message,
    }
}

pub fn resolve_all(failures: &[FieldFailure]) -> Vec<ValidationFailure> {
    failures.iter().map(resolve).collect()
}

/// Build the field error map and the ordered summary list.
///
/// Every failure yields one summary entry linking to `#<field>`. The field
/// map skips failures whose inline text is empty.
pub fn format_all(failures: &[FieldFailure]) -> ErrorReport {
    let mut report = ErrorReport::default();
    for failure in failures {
        let formatted = format(failure);
        if !formatted.inline_message.is_empty() {
            report
                .field_errors
                .entry(failure.field.clone())
                .or_insert(formatted.inline_message);
        }
        report.summary_list.push(SummaryItem {
            text: formatted.summary_message,
            href: format!("#{}", failure.field),
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(field: &str, message: ErrorMessage) -> FieldFailure {
        FieldFailure::new(field, FailureKind::FieldRequired, message)
    }

    #[test]
    fn test_typed_message_keeps_both_texts() {
        let formatted = format(&failure("fullName", ErrorMessage::typed("Enter your full name", "Enter a name")));
        assert_eq!(formatted.summary_message, "Enter your full name");
        assert_eq!(formatted.inline_message, "Enter a name");
    }

    #[test]
    fn test_plain_message_used_verbatim() {
        let formatted = format(&failure("address", ErrorMessage::plain("Invalid address")));
        assert_eq!(formatted.summary_message, "Invalid address");
        assert_eq!(formatted.inline_message, "Invalid address");
    }

    #[test]
    fn test_missing_or_empty_message_falls_back() {
        for message in [
            ErrorMessage::Missing,
            ErrorMessage::plain(""),
            ErrorMessage::typed("", "inline only"),
        ] {
            let formatted = format(&failure("x", message));
            assert_eq!(formatted.summary_message, FALLBACK_MESSAGE);
            assert_eq!(formatted.inline_message, FALLBACK_MESSAGE);
        }
        assert_eq!(
            resolve(&failure("x", ErrorMessage::Missing)).kind,
            FailureKind::FallbackInvalidValue
        );
    }

    #[test]
    fn test_format_all_builds_summary_and_field_errors() {
        let failures = vec![
            failure("fullName", ErrorMessage::typed("Enter your full name", "Enter your full name")),
            FieldFailure::new(
                "validDate",
                FailureKind::GroupInvalidCombination,
                ErrorMessage::typed("Date of birth must be a real date", ""),
            ),
        ];

        let report = format_all(&failures);
        assert_eq!(report.field_errors.len(), 1);
        assert_eq!(report.field_errors["fullName"], "Enter your full name");
        assert_eq!(
            report.summary_list,
            vec![
                SummaryItem {
                    text: "Enter your full name".into(),
                    href: "#fullName".into()
                },
                SummaryItem {
                    text: "Date of birth must be a real date".into(),
                    href: "#validDate".into()
                },
            ]
        );
    }

    #[test]
    fn test_format_all_is_idempotent() {
        let failures = vec![
            failure("b", ErrorMessage::plain("second")),
            failure("a", ErrorMessage::plain("first")),
        ];
        assert_eq!(format_all(&failures), format_all(&failures));
        assert_eq!(format_all(&failures).summary_list[0].href, "#b");
    }

    #[test]
    fn test_resolve_all_keeps_order_and_kind() {
        let failures = vec![
            FieldFailure::new("priority", FailureKind::FieldInvalidOption, ErrorMessage::plain("Pick one")),
            failure("fullName", ErrorMessage::plain("Enter your full name")),
        ];
        let resolved = resolve_all(&failures);
        assert_eq!(resolved[0].field_name, "priority");
        assert_eq!(resolved[0].kind, FailureKind::FieldInvalidOption);
        assert_eq!(resolved[1].inline_message, "Enter your full name");
    }
}
