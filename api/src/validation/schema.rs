//! Declarative form schemas
//!
//! A [`FormSchema`] is an ordered list of [`Rule`] variants built once at
//! startup. [`FormSchema::validate`] walks the rules in declaration order and
//! records at most one failure per field, so the error summary order is the
//! declaration order.

use std::borrow::Cow;

use serde_json::Value;
use shared::{ErrorReport, FormSubmission, OriginalSnapshot, SanitizedForm};

use super::change_detection::has_changed;
use super::dates::{compose_date, is_valid_calendar_date};
use super::failures::{FailureCollector, FailureKind, FieldFailure, Message, Violation};
use super::formatter::format_all;
use super::sanitizers::{sanitize_submission, InputShape};
use super::validators::{
    validate_exact_length, validate_int, validate_int_range, validate_min_items, validate_one_of,
    validate_required,
};
use crate::i18n::Translate;

/// Pseudo-field reporting that the date parts do not form a real date.
pub const VALID_DATE_FIELD: &str = "validDate";

const YEAR_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Day,
    Month,
    Year,
}

impl DatePart {
    pub const ALL: [DatePart; 3] = [DatePart::Day, DatePart::Month, DatePart::Year];

    pub fn suffix(&self) -> &'static str {
        match self {
            DatePart::Day => "day",
            DatePart::Month => "month",
            DatePart::Year => "year",
        }
    }
}

/// Input name of one part of a date group, e.g. `dateOfBirth-day`.
pub fn date_field(group: &str, part: DatePart) -> String {
    format!("{group}-{}", part.suffix())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartCheck {
    IsInt,
    IsLength,
}

/// Plain ASCII digits only. Signs and other characters would leak into the
/// composed `YYYY-MM-DD`.
fn check_digits(value: &str) -> Result<(), (FailureKind, PartCheck)> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err((FailureKind::FieldWrongFormat, PartCheck::IsInt))
    }
}

fn check_date_part(value: &str, part: DatePart) -> Result<i64, (FailureKind, PartCheck)> {
    match part {
        DatePart::Day => {
            check_digits(value)?;
            validate_int_range(value, 1, 31).map_err(|k| (k, PartCheck::IsInt))
        }
        DatePart::Month => {
            check_digits(value)?;
            validate_int_range(value, 1, 12).map_err(|k| (k, PartCheck::IsInt))
        }
        DatePart::Year => {
            validate_exact_length(value, YEAR_LENGTH).map_err(|k| (k, PartCheck::IsLength))?;
            check_digits(value)?;
            validate_int(value).map_err(|k| (k, PartCheck::IsInt))
        }
    }
}

fn date_group_is_blank(form: &SanitizedForm, group: &str) -> bool {
    DatePart::ALL
        .iter()
        .all(|part| form.get(&date_field(group, *part)).is_blank())
}

/// Messages for one date part.
#[derive(Debug, Clone)]
pub struct DateMessages {
    pub not_empty: Message,
    pub is_int: Message,
    pub is_length: Option<Message>,
}

impl DateMessages {
    fn for_check(&self, check: PartCheck) -> &Message {
        match check {
            PartCheck::IsLength => self.is_length.as_ref().unwrap_or(&self.is_int),
            PartCheck::IsInt => &self.is_int,
        }
    }
}

/// Messages for a whole day/month/year group.
#[derive(Debug, Clone)]
pub struct DateGroupMessages {
    pub day: DateMessages,
    pub month: DateMessages,
    pub year: DateMessages,
    pub valid_date: Message,
}

impl DateGroupMessages {
    /// Messages under `<prefix>.day.notEmpty`, `<prefix>.day.isInt`, ...,
    /// `<prefix>.year.isLength` and `<prefix>.validDate`.
    pub fn from_prefix(prefix: &str) -> Self {
        let range = |part: &str, max: &str| DateMessages {
            not_empty: Message::key(format!("{prefix}.{part}.notEmpty")),
            is_int: Message::key_with(format!("{prefix}.{part}.isInt"), &[("min", "1"), ("max", max)]),
            is_length: None,
        };
        let length = YEAR_LENGTH.to_string();
        Self {
            day: range("day", "31"),
            month: range("month", "12"),
            year: DateMessages {
                not_empty: Message::key(format!("{prefix}.year.notEmpty")),
                is_int: Message::key(format!("{prefix}.year.isInt")),
                is_length: Some(Message::key_with(
                    format!("{prefix}.year.isLength"),
                    &[("length", length.as_str())],
                )),
            },
            // There is no input called `validDate`, so this only shows in the summary.
            valid_date: Message::summary_only(format!("{prefix}.validDate")),
        }
    }

    fn part(&self, part: DatePart) -> &DateMessages {
        match part {
            DatePart::Day => &self.day,
            DatePart::Month => &self.month,
            DatePart::Year => &self.year,
        }
    }
}

/// One declarative validation rule.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Non-empty text after trimming.
    RequiredString { field: String, message: Message },
    /// Present and one of `allowed`.
    EnumMembership {
        field: String,
        allowed: Vec<String>,
        not_empty: Message,
        invalid_option: Message,
    },
    /// Must differ from the original snapshot value, when one exists.
    CrossFieldChanged { field: String, not_changed: Message },
    /// A list with at least `min` items.
    ArrayMinLength {
        field: String,
        min: usize,
        message: Message,
    },
    /// One part of a day/month/year group. Skipped when the whole group is blank.
    DateComponent {
        group: String,
        part: DatePart,
        messages: DateMessages,
    },
    /// The parts of a group form a real date. Only runs once every part is valid.
    DateComposite {
        field: String,
        group: String,
        message: Message,
    },
}

impl Rule {
    /// Field a failure of this rule is reported against.
    pub fn field(&self) -> Cow<'_, str> {
        match self {
            Rule::RequiredString { field, .. }
            | Rule::EnumMembership { field, .. }
            | Rule::CrossFieldChanged { field, .. }
            | Rule::ArrayMinLength { field, .. }
            | Rule::DateComposite { field, .. } => Cow::Borrowed(field.as_str()),
            Rule::DateComponent { group, part, .. } => Cow::Owned(date_field(group, *part)),
        }
    }

    /// Identity used for the one-failure-per-field check. Composite date
    /// rules all report against [`VALID_DATE_FIELD`], so they are told apart
    /// by group.
    fn failure_key(&self) -> Cow<'_, str> {
        match self {
            Rule::DateComposite { field, group, .. } => Cow::Owned(format!("{group}:{field}")),
            _ => self.field(),
        }
    }

    /// Input read by this rule, if it owns one.
    fn input(&self) -> Option<(String, InputShape)> {
        match self {
            Rule::RequiredString { field, .. } | Rule::EnumMembership { field, .. } => {
                Some((field.clone(), InputShape::Text))
            }
            Rule::ArrayMinLength { field, .. } => Some((field.clone(), InputShape::List)),
            Rule::DateComponent { group, part, .. } => {
                Some((date_field(group, *part), InputShape::Text))
            }
            Rule::CrossFieldChanged { .. } | Rule::DateComposite { .. } => None,
        }
    }

    fn evaluate<'r>(
        &'r self,
        form: &SanitizedForm,
        original: Option<&OriginalSnapshot>,
    ) -> Result<(), Violation<'r>> {
        match self {
            Rule::RequiredString { field, message } => validate_required(form.get(field))
                .map_err(|kind| Violation::new(kind, message)),

            Rule::EnumMembership {
                field,
                allowed,
                not_empty,
                invalid_option,
            } => {
                let value = form.get(field);
                validate_required(value).map_err(|kind| Violation::new(kind, not_empty))?;
                let text = value.as_text().unwrap_or_default();
                validate_one_of(text, allowed).map_err(|kind| Violation::new(kind, invalid_option))
            }

            Rule::CrossFieldChanged { field, not_changed } => {
                let Some(previous) = original.and_then(|o| o.get(field)) else {
                    return Ok(());
                };
                let current = form.get(field).to_snapshot_string();
                if has_changed(current.as_deref(), Some(previous)) {
                    Ok(())
                } else {
                    Err(Violation::new(FailureKind::FieldNotChanged, not_changed))
                }
            }

            Rule::ArrayMinLength {
                field,
                min,
                message,
            } => validate_min_items(form.get(field), *min)
                .map_err(|kind| Violation::new(kind, message)),

            Rule::DateComponent {
                group,
                part,
                messages,
            } => {
                if date_group_is_blank(form, group) {
                    return Ok(());
                }
                let value = form.get(&date_field(group, *part));
                validate_required(value)
                    .map_err(|kind| Violation::new(kind, &messages.not_empty))?;
                check_date_part(value.as_text().unwrap_or_default(), *part)
                    .map(|_| ())
                    .map_err(|(kind, check)| Violation::new(kind, messages.for_check(check)))
            }

            Rule::DateComposite { group, message, .. } => {
                if date_group_is_blank(form, group) {
                    return Ok(());
                }
                let parts: Option<Vec<i64>> = DatePart::ALL
                    .iter()
                    .map(|part| {
                        form.text(&date_field(group, *part))
                            .and_then(|text| check_date_part(text, *part).ok())
                    })
                    .collect();
                // Individual part failures are already reported.
                let Some(parts) = parts else {
                    return Ok(());
                };
                let day = u32::try_from(parts[0]).unwrap_or(0);
                let month = u32::try_from(parts[1]).unwrap_or(0);
                let year = i32::try_from(parts[2]).unwrap_or(-1);
                if is_valid_calendar_date(day, month, year) {
                    Ok(())
                } else {
                    Err(Violation::new(FailureKind::GroupInvalidCombination, message))
                }
            }
        }
    }
}

/// Result of running a submission through a schema.
#[derive(Debug, Clone)]
pub struct FormOutcome {
    pub values: SanitizedForm,
    pub failures: Vec<FieldFailure>,
    /// Composed `YYYY-MM-DD` dates for every filled-in date group.
    pub dates: Vec<(String, String)>,
}

impl FormOutcome {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn report(&self) -> ErrorReport {
        format_all(&self.failures)
    }

    /// Sanitized values plus composed dates, as stored in the session.
    pub fn stored_value(&self) -> Value {
        let mut value = self.values.to_value();
        if let Value::Object(map) = &mut value {
            for (group, date) in &self.dates {
                map.insert(group.clone(), Value::String(date.clone()));
            }
        }
        value
    }
}

/// An immutable, ordered set of rules for one form.
#[derive(Debug, Clone)]
pub struct FormSchema {
    entity: String,
    rules: Vec<Rule>,
}

impl FormSchema {
    pub fn builder(entity: impl Into<String>) -> FormSchemaBuilder {
        FormSchemaBuilder {
            entity: entity.into(),
            rules: vec![],
        }
    }

    /// Name of the entity this form edits, e.g. `person`.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Inputs read by the rules, in declaration order, without duplicates.
    pub fn inputs(&self) -> Vec<(String, InputShape)> {
        let mut inputs: Vec<(String, InputShape)> = vec![];
        for (name, shape) in self.rules.iter().filter_map(Rule::input) {
            if !inputs.iter().any(|(existing, _)| *existing == name) {
                inputs.push((name, shape));
            }
        }
        inputs
    }

    fn date_groups(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::DateComposite { group, .. } => Some(group.as_str()),
            _ => None,
        })
    }

    /// Narrow a raw submission to this schema's inputs.
    pub fn sanitize(&self, submission: &FormSubmission) -> SanitizedForm {
        let inputs = self.inputs();
        sanitize_submission(
            submission,
            inputs.iter().map(|(name, shape)| (name.as_str(), *shape)),
        )
    }

    /// Evaluate every rule against a sanitized form.
    ///
    /// Never fails: malformed input reads as absent fields and produces
    /// ordinary failures.
    pub fn validate(
        &self,
        form: &SanitizedForm,
        original: Option<&OriginalSnapshot>,
        translator: &dyn Translate,
    ) -> Vec<FieldFailure> {
        let mut collector = FailureCollector::new(translator);
        for rule in &self.rules {
            let key = rule.failure_key();
            if collector.has_failed(&key) {
                continue;
            }
            collector.check_keyed(&key, &rule.field(), rule.evaluate(form, original));
        }

        let failures = collector.finish();
        tracing::debug!(
            entity = %self.entity,
            failures = failures.len(),
            "form validated"
        );
        failures
    }

    /// Sanitize, validate and compose dates in one pass.
    pub fn process(
        &self,
        submission: &FormSubmission,
        original: Option<&OriginalSnapshot>,
        translator: &dyn Translate,
    ) -> FormOutcome {
        let values = self.sanitize(submission);
        let failures = self.validate(&values, original, translator);
        let dates = self
            .date_groups()
            .filter(|group| !date_group_is_blank(&values, group))
            .map(|group| {
                let part = |p| values.text(&date_field(group, p)).unwrap_or_default();
                (
                    group.to_string(),
                    compose_date(part(DatePart::Day), part(DatePart::Month), part(DatePart::Year)),
                )
            })
            .collect();

        FormOutcome {
            values,
            failures,
            dates,
        }
    }
}

/// Builder for [`FormSchema`].
#[derive(Debug)]
pub struct FormSchemaBuilder {
    entity: String,
    rules: Vec<Rule>,
}

impl FormSchemaBuilder {
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required_text(self, field: impl Into<String>, message: Message) -> Self {
        self.rule(Rule::RequiredString {
            field: field.into(),
            message,
        })
    }

    pub fn one_of(
        self,
        field: impl Into<String>,
        allowed: &[&str],
        not_empty: Message,
        invalid_option: Message,
    ) -> Self {
        self.rule(Rule::EnumMembership {
            field: field.into(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
            not_empty,
            invalid_option,
        })
    }

    /// Require `field` to differ from its original snapshot value.
    pub fn must_change(self, field: impl Into<String>, not_changed: Message) -> Self {
        self.rule(Rule::CrossFieldChanged {
            field: field.into(),
            not_changed,
        })
    }

    pub fn min_items(self, field: impl Into<String>, min: usize, message: Message) -> Self {
        self.rule(Rule::ArrayMinLength {
            field: field.into(),
            min,
            message,
        })
    }

    /// Add `<group>-day`, `<group>-month`, `<group>-year` and the
    /// [`VALID_DATE_FIELD`] composite check.
    pub fn date_group(mut self, group: impl Into<String>, messages: DateGroupMessages) -> Self {
        let group = group.into();
        for part in DatePart::ALL {
            self.rules.push(Rule::DateComponent {
                group: group.clone(),
                part,
                messages: messages.part(part).clone(),
            });
        }
        self.rule(Rule::DateComposite {
            field: VALID_DATE_FIELD.to_string(),
            group,
            message: messages.valid_date,
        })
    }

    pub fn build(self) -> FormSchema {
        FormSchema {
            entity: self.entity,
            rules: self.rules,
        }
    }
}
