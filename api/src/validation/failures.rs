//! Validation failures and deferred error messages
//!
//! Rules carry their messages as [`Message`] closures. A message is only
//! resolved against the translator once its rule has actually failed.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::i18n::Translate;

/// Failure taxonomy shared by every rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    FieldRequired,
    FieldInvalidOption,
    FieldNotChanged,
    FieldOutOfRange,
    FieldWrongFormat,
    GroupInvalidCombination,
    FallbackInvalidValue,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::FieldRequired => "field_required",
            FailureKind::FieldInvalidOption => "field_invalid_option",
            FailureKind::FieldNotChanged => "field_not_changed",
            FailureKind::FieldOutOfRange => "field_out_of_range",
            FailureKind::FieldWrongFormat => "field_wrong_format",
            FailureKind::GroupInvalidCombination => "group_invalid_combination",
            FailureKind::FallbackInvalidValue => "fallback_invalid_value",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved but not yet formatted error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMessage {
    /// Separate texts for the error summary and the inline field error.
    Typed { summary: String, inline: String },
    /// A bare string, used for both texts.
    Plain(String),
    /// No usable message.
    Missing,
}

impl ErrorMessage {
    pub fn typed(summary: impl Into<String>, inline: impl Into<String>) -> Self {
        ErrorMessage::Typed {
            summary: summary.into(),
            inline: inline.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        ErrorMessage::Plain(text.into())
    }
}

type Resolver = dyn Fn(&dyn Translate) -> ErrorMessage + Send + Sync;

/// Deferred message attached to a rule.
#[derive(Clone)]
pub struct Message(Arc<Resolver>);

impl Message {
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn(&dyn Translate) -> ErrorMessage + Send + Sync + 'static,
    {
        Self(Arc::new(resolve))
    }

    /// Same translated text in the summary and inline.
    pub fn key(key: impl Into<String>) -> Self {
        Self::key_with(key, &[])
    }

    /// Like [`Message::key`], with `{{name}}` parameters.
    pub fn key_with(key: impl Into<String>, params: &[(&str, &str)]) -> Self {
        let key = key.into();
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(move |t| {
            let params: Vec<(&str, &str)> =
                params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let text = t.translate(&key, &params);
            ErrorMessage::typed(text.clone(), text)
        })
    }

    /// Different summary and inline texts.
    pub fn typed(summary_key: impl Into<String>, inline_key: impl Into<String>) -> Self {
        let summary_key = summary_key.into();
        let inline_key = inline_key.into();
        Self::new(move |t| ErrorMessage::typed(t.translate(&summary_key, &[]), t.translate(&inline_key, &[])))
    }

    /// Summary text only; the inline text is left empty.
    pub fn summary_only(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(move |t| ErrorMessage::typed(t.translate(&key, &[]), String::new()))
    }

    /// Untranslated text.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| ErrorMessage::Plain(text.clone()))
    }

    pub fn resolve(&self, translator: &dyn Translate) -> ErrorMessage {
        (self.0)(translator)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Message(..)")
    }
}

/// A failing field as produced by the schema validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: String,
    pub kind: FailureKind,
    pub message: ErrorMessage,
}

impl FieldFailure {
    pub fn new(field: impl Into<String>, kind: FailureKind, message: ErrorMessage) -> Self {
        Self {
            field: field.into(),
            kind,
            message,
        }
    }
}

/// A rule that did not hold: what went wrong and which message explains it.
#[derive(Debug, Clone, Copy)]
pub struct Violation<'a> {
    pub kind: FailureKind,
    pub message: &'a Message,
}

impl<'a> Violation<'a> {
    pub fn new(kind: FailureKind, message: &'a Message) -> Self {
        Self { kind, message }
    }
}

/// Accumulates failures in evaluation order, at most one per key. The key is
/// the field name unless [`FailureCollector::check_keyed`] says otherwise.
pub struct FailureCollector<'t> {
    translator: &'t dyn Translate,
    failures: Vec<FieldFailure>,
    failed: HashSet<String>,
}

impl<'t> FailureCollector<'t> {
    pub fn new(translator: &'t dyn Translate) -> Self {
        Self {
            translator,
            failures: vec![],
            failed: HashSet::new(),
        }
    }

    /// Record a failure if the result is Err and the field has none yet.
    pub fn check(&mut self, field: &str, result: Result<(), Violation<'_>>) -> &mut Self {
        self.check_keyed(field, field, result)
    }

    /// Like [`FailureCollector::check`], deduplicating on `key` rather than
    /// on the reported field.
    pub fn check_keyed(
        &mut self,
        key: &str,
        field: &str,
        result: Result<(), Violation<'_>>,
    ) -> &mut Self {
        if let Err(violation) = result {
            self.add_failure(key, field, violation);
        }
        self
    }

    fn add_failure(&mut self, key: &str, field: &str, violation: Violation<'_>) {
        if self.failed.insert(key.to_string()) {
            let message = violation.message.resolve(self.translator);
            self.failures.push(FieldFailure::new(field, violation.kind, message));
        }
    }

    pub fn has_failed(&self, key: &str) -> bool {
        self.failed.contains(key)
    }

    pub fn finish(self) -> Vec<FieldFailure> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Catalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn catalog() -> Catalog {
        Catalog::from_json_str(
            r#"{"err": {"summary": "Summary text", "inline": "Inline text", "range": "From {{min}}"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_message_constructors() {
        let t = catalog();
        assert_eq!(
            Message::key("err.summary").resolve(&t),
            ErrorMessage::typed("Summary text", "Summary text")
        );
        assert_eq!(
            Message::typed("err.summary", "err.inline").resolve(&t),
            ErrorMessage::typed("Summary text", "Inline text")
        );
        assert_eq!(
            Message::summary_only("err.summary").resolve(&t),
            ErrorMessage::typed("Summary text", "")
        );
        assert_eq!(
            Message::key_with("err.range", &[("min", "1")]).resolve(&t),
            ErrorMessage::typed("From 1", "From 1")
        );
        assert_eq!(Message::plain("raw").resolve(&t), ErrorMessage::plain("raw"));
    }

    #[test]
    fn test_messages_resolve_only_on_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let message = Message::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            ErrorMessage::plain("boom")
        });
        let t = catalog();

        let mut collector = FailureCollector::new(&t);
        collector.check("a", Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        collector.check("a", Err(Violation::new(FailureKind::FieldRequired, &message)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_collector_keeps_first_failure_per_field() {
        let t = catalog();
        let first = Message::plain("first");
        let second = Message::plain("second");

        let mut collector = FailureCollector::new(&t);
        collector
            .check("name", Err(Violation::new(FailureKind::FieldRequired, &first)))
            .check("name", Err(Violation::new(FailureKind::FieldWrongFormat, &second)))
            .check("address", Err(Violation::new(FailureKind::FieldRequired, &second)));

        assert!(collector.has_failed("name"));

        let failures = collector.finish();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].field, "name");
        assert_eq!(failures[0].kind, FailureKind::FieldRequired);
        assert_eq!(failures[0].message, ErrorMessage::plain("first"));
        assert_eq!(failures[1].field, "address");
    }

    #[test]
    fn test_keyed_checks_share_a_reported_field() {
        let t = catalog();
        let message = Message::plain("Enter a real date");
        let violation =
            || -> Result<(), Violation> { Err(Violation::new(FailureKind::GroupInvalidCombination, &message)) };

        let mut collector = FailureCollector::new(&t);
        collector
            .check_keyed("startDate:validDate", "validDate", violation())
            .check_keyed("endDate:validDate", "validDate", violation())
            .check_keyed("endDate:validDate", "validDate", violation());

        assert!(collector.has_failed("startDate:validDate"));
        assert!(!collector.has_failed("validDate"));
        let fields: Vec<String> = collector.finish().into_iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["validDate", "validDate"]);
    }

    #[test]
    fn test_failure_kind_names() {
        assert_eq!(FailureKind::GroupInvalidCombination.to_string(), "group_invalid_combination");
        assert_eq!(
            serde_json::to_value(FailureKind::FieldNotChanged).unwrap(),
            serde_json::json!("field_not_changed")
        );
    }
}
