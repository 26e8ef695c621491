//! Form definitions
//!
//! The schemas for every form the service renders, registered once at
//! startup and shared read-only between requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::failures::Message;
use super::schema::{DateGroupMessages, FormSchema, FormSchemaBuilder};

// ─────────────────────────────────────────────────────────────────────────────
// Field names and options
// ─────────────────────────────────────────────────────────────────────────────

pub const FULL_NAME: &str = "fullName";
pub const ADDRESS: &str = "address";
pub const CONTACT_PREFERENCE: &str = "contactPreference";
pub const PRIORITY: &str = "priority";
pub const COMMUNICATION_METHODS: &str = "communicationMethods";
pub const DATE_OF_BIRTH: &str = "dateOfBirth";

pub const CONTACT_PREFERENCE_OPTIONS: [&str; 3] = ["email", "phone", "post"];
pub const PRIORITY_OPTIONS: [&str; 3] = ["low", "medium", "high"];

/// Minimum number of communication methods a user must tick
const MIN_COMMUNICATION_METHODS: usize = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Field groups
// ─────────────────────────────────────────────────────────────────────────────

fn identity_fields(builder: FormSchemaBuilder) -> FormSchemaBuilder {
    builder
        .required_text(FULL_NAME, Message::key("forms.name.validationError.notEmpty"))
        .required_text(ADDRESS, Message::key("forms.address.validationError.notEmpty"))
}

fn preference_fields(builder: FormSchemaBuilder) -> FormSchemaBuilder {
    builder
        .one_of(
            CONTACT_PREFERENCE,
            &CONTACT_PREFERENCE_OPTIONS,
            Message::key("forms.contactPreference.validationError.notEmpty"),
            Message::key("forms.contactPreference.validationError.invalidOption"),
        )
        .must_change(
            CONTACT_PREFERENCE,
            Message::key("forms.contactPreference.validationError.notChanged"),
        )
        .one_of(
            PRIORITY,
            &PRIORITY_OPTIONS,
            Message::key("forms.priority.validationError.notEmpty"),
            Message::key("forms.priority.validationError.invalidOption"),
        )
        .min_items(
            COMMUNICATION_METHODS,
            MIN_COMMUNICATION_METHODS,
            Message::typed(
                "forms.communicationMethods.validationError.notEmpty",
                "forms.communicationMethods.validationError.notEmptyInline",
            ),
        )
}

fn date_of_birth(builder: FormSchemaBuilder) -> FormSchemaBuilder {
    builder.date_group(
        DATE_OF_BIRTH,
        DateGroupMessages::from_prefix("forms.dateOfBirth.validationError"),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Forms
// ─────────────────────────────────────────────────────────────────────────────

/// Name, address and optional date of birth.
pub fn person_form() -> FormSchema {
    date_of_birth(identity_fields(FormSchema::builder("person"))).build()
}

/// Contact preference, priority and communication methods.
pub fn contact_form() -> FormSchema {
    preference_fields(FormSchema::builder("contact")).build()
}

/// Every field on one page: fullName, address, contactPreference, priority,
/// communicationMethods, dateOfBirth-day/-month/-year, validDate.
pub fn application_form() -> FormSchema {
    date_of_birth(preference_fields(identity_fields(FormSchema::builder("application")))).build()
}

/// Schemas by entity name.
#[derive(Debug, Clone, Default)]
pub struct FormRegistry {
    forms: BTreeMap<String, Arc<FormSchema>>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every built-in form.
    pub fn standard() -> Self {
        Self::new()
            .register(person_form())
            .register(contact_form())
            .register(application_form())
    }

    pub fn register(mut self, schema: FormSchema) -> Self {
        tracing::debug!(entity = schema.entity(), rules = schema.rules().len(), "form registered");
        self.forms.insert(schema.entity().to_string(), Arc::new(schema));
        self
    }

    pub fn get(&self, entity: &str) -> Option<Arc<FormSchema>> {
        self.forms.get(entity).cloned()
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }
}
