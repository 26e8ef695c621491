// tests/form_pipeline_tests.rs
// End-to-end checks of sanitize -> validate -> format without HTTP

use form_api::i18n::Catalog;
use form_api::validation::forms::{application_form, contact_form, person_form};
use form_api::validation::{resolve_all, FailureKind, VALID_DATE_FIELD};
use serde_json::json;
use shared::{FormSubmission, OriginalSnapshot};

fn catalog() -> Catalog {
    Catalog::embedded()
}

fn submission(value: serde_json::Value) -> FormSubmission {
    FormSubmission::from_value(value)
}

#[test]
fn test_missing_full_name_is_the_only_failure() {
    let outcome = person_form().process(
        &submission(json!({"fullName": "", "address": "123 Test St"})),
        None,
        &catalog(),
    );

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].field, "fullName");
    assert_eq!(outcome.failures[0].kind, FailureKind::FieldRequired);

    let report = outcome.report();
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "fieldErrors": {"fullName": "Enter your full name"},
            "summaryList": [{"text": "Enter your full name", "href": "#fullName"}]
        })
    );
}

#[test]
fn test_day_out_of_range_does_not_crash() {
    let outcome = person_form().process(
        &submission(json!({
            "fullName": "Ada",
            "address": "1 Analytical Way",
            "dateOfBirth-day": "32",
            "dateOfBirth-month": "1",
            "dateOfBirth-year": "1990"
        })),
        None,
        &catalog(),
    );

    let day = outcome
        .failures
        .iter()
        .find(|f| f.field == "dateOfBirth-day")
        .expect("day failure");
    assert_eq!(day.kind, FailureKind::FieldOutOfRange);

    let report = outcome.report();
    assert_eq!(
        report.field_errors.get("dateOfBirth-day").map(String::as_str),
        Some("Day must be a number between 1 and 31")
    );
    assert!(report.summary_list.iter().all(|item| item.href != "#validDate"));
}

#[test]
fn test_impossible_date_is_reported_in_summary_only() {
    let outcome = person_form().process(
        &submission(json!({
            "fullName": "Ada",
            "address": "1 Analytical Way",
            "dateOfBirth-day": "29",
            "dateOfBirth-month": "2",
            "dateOfBirth-year": "1999"
        })),
        None,
        &catalog(),
    );

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].field, VALID_DATE_FIELD);
    assert_eq!(outcome.failures[0].kind, FailureKind::GroupInvalidCombination);

    let report = outcome.report();
    assert!(report.field_errors.is_empty());
    assert_eq!(report.summary_list[0].text, "Date of birth must be a real date");
    assert_eq!(report.summary_list[0].href, "#validDate");
}

#[test]
fn test_leap_day_is_accepted_and_composed() {
    let outcome = person_form().process(
        &submission(json!({
            "fullName": "Ada",
            "address": "1 Analytical Way",
            "dateOfBirth-day": "29",
            "dateOfBirth-month": "2",
            "dateOfBirth-year": "2000"
        })),
        None,
        &catalog(),
    );

    assert!(outcome.is_valid());
    assert_eq!(outcome.stored_value()["dateOfBirth"], "2000-02-29");
}

#[test]
fn test_resubmitting_original_preference_fails_once() {
    let original = OriginalSnapshot::new()
        .with("contactPreference", "email")
        .with("priority", "low");
    let outcome = contact_form().process(
        &submission(json!({
            "contactPreference": "email",
            "priority": "low",
            "communicationMethods": ["email", "post"]
        })),
        Some(&original),
        &catalog(),
    );

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].field, "contactPreference");
    assert_eq!(outcome.failures[0].kind, FailureKind::FieldNotChanged);
}

#[test]
fn test_changed_preference_passes() {
    let original = OriginalSnapshot::new().with("contactPreference", "email");
    let outcome = contact_form().process(
        &submission(json!({
            "contactPreference": "phone",
            "priority": "high",
            "communicationMethods": ["phone"]
        })),
        Some(&original),
        &catalog(),
    );
    assert!(outcome.is_valid());
}

#[test]
fn test_empty_communication_methods_use_separate_texts() {
    let outcome = contact_form().process(
        &submission(json!({"contactPreference": "post", "priority": "medium"})),
        None,
        &catalog(),
    );

    let report = outcome.report();
    assert_eq!(
        report.field_errors.get("communicationMethods").map(String::as_str),
        Some("Select at least one option")
    );
    assert_eq!(
        report.summary_list[0].text,
        "Select at least one way we can communicate with you"
    );
}

#[test]
fn test_application_failures_follow_field_order() {
    let outcome = application_form().process(
        &submission(json!({
            "contactPreference": "fax",
            "dateOfBirth-day": "1",
            "dateOfBirth-month": "13",
            "dateOfBirth-year": "19"
        })),
        None,
        &catalog(),
    );

    let fields: Vec<&str> = outcome.failures.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "fullName",
            "address",
            "contactPreference",
            "priority",
            "communicationMethods",
            "dateOfBirth-month",
            "dateOfBirth-year",
        ]
    );

    let kinds: Vec<FailureKind> = resolve_all(&outcome.failures).iter().map(|f| f.kind).collect();
    assert_eq!(kinds[2], FailureKind::FieldInvalidOption);
    assert_eq!(kinds[6], FailureKind::FieldWrongFormat);
}

#[test]
fn test_malformed_body_reads_as_empty_form() {
    let outcome = person_form().process(&submission(json!("fullName=Ada")), None, &catalog());
    let fields: Vec<&str> = outcome.failures.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["fullName", "address"]);
}

#[test]
fn test_missing_translation_falls_back_to_key() {
    let empty = Catalog::from_json_str("{}").unwrap();
    let outcome = person_form().process(&submission(json!({})), None, &empty);
    let report = outcome.report();
    assert_eq!(
        report.field_errors.get("fullName").map(String::as_str),
        Some("forms.name.validationError.notEmpty")
    );
}

#[test]
fn test_values_are_only_trimmed() {
    let outcome = person_form().process(
        &submission(json!({"fullName": "\u{7}", "address": "1 High St"})),
        None,
        &catalog(),
    );
    assert!(outcome.is_valid(), "{:?}", outcome.failures);

    let outcome = person_form().process(
        &submission(json!({"fullName": "  Ada\u{1}Lovelace ", "address": "1 High St"})),
        None,
        &catalog(),
    );
    assert!(outcome.is_valid());
    assert_eq!(outcome.stored_value()["fullName"], "Ada\u{1}Lovelace");
}

#[test]
fn test_partial_date_group_requires_missing_parts() {
    let cases: [(&[(&str, &str)], &[&str]); 6] = [
        (&[("dateOfBirth-day", "5")], &["dateOfBirth-month", "dateOfBirth-year"]),
        (&[("dateOfBirth-month", "6")], &["dateOfBirth-day", "dateOfBirth-year"]),
        (&[("dateOfBirth-year", "1990")], &["dateOfBirth-day", "dateOfBirth-month"]),
        (&[("dateOfBirth-day", "5"), ("dateOfBirth-month", "6")], &["dateOfBirth-year"]),
        (&[("dateOfBirth-day", "5"), ("dateOfBirth-year", "1990")], &["dateOfBirth-month"]),
        (&[("dateOfBirth-month", "6"), ("dateOfBirth-year", "1990")], &["dateOfBirth-day"]),
    ];

    for (filled, missing) in cases {
        let mut body = FormSubmission::new()
            .with("fullName", "Ada")
            .with("address", "1 Analytical Way");
        for (field, value) in filled {
            body = body.with(*field, *value);
        }

        let outcome = person_form().process(&body, None, &catalog());
        let fields: Vec<&str> = outcome.failures.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, missing.to_vec(), "filled: {filled:?}");
        assert!(
            outcome.failures.iter().all(|f| f.kind == FailureKind::FieldRequired),
            "filled: {filled:?}"
        );
        assert!(!fields.contains(&VALID_DATE_FIELD), "filled: {filled:?}");
    }
}
