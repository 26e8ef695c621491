//! Form Validation Module
//!
//! Sanitization, rule evaluation and error formatting for form submissions.
//!
//! # Overview
//!
//! A submission flows through four stages:
//!
//! 1. **Sanitizers** - narrow raw JSON values to trimmed strings or lists
//! 2. **Schema** - evaluate declarative rules in declaration order
//! 3. **Change detection / dates** - helpers the rules call into
//! 4. **Formatter** - build GOV.UK field errors and the error summary
//!
//! # Usage
//!
//! ```ignore
//! use crate::validation::{forms, format_all};
//!
//! let schema = forms::person_form();
//! let outcome = schema.process(&submission, original.as_ref(), &catalog);
//! if !outcome.is_valid() {
//!     let report = format_all(&outcome.failures);
//!     // report.field_errors / report.summary_list go to the page
//! }
//! ```
//!
//! ## Error report
//!
//! ```json
//! {
//!   "fieldErrors": {"fullName": "Enter your full name"},
//!   "summaryList": [{"text": "Enter your full name", "href": "#fullName"}]
//! }
//! ```

pub mod change_detection;
pub mod dates;
pub mod extractors;
pub mod failures;
pub mod formatter;
pub mod forms;
pub mod sanitizers;
pub mod schema;
pub mod validators;

// Re-export commonly used items
pub use change_detection::has_changed;
pub use dates::{compose_date, is_valid_calendar_date};
pub use extractors::FormBody;
pub use failures::{ErrorMessage, FailureKind, FieldFailure, Message};
pub use formatter::{format, format_all, resolve_all, FormattedError, ValidationFailure};
pub use forms::FormRegistry;
pub use sanitizers::{sanitize_value, InputShape};
pub use schema::{DateGroupMessages, FormOutcome, FormSchema, Rule, VALID_DATE_FIELD};
