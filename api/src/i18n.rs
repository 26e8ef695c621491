//! Message catalogue
//!
//! User-facing text is looked up by dotted keys such as
//! `forms.name.validationError.notEmpty`. Catalogues are JSON documents,
//! either nested objects or flat dotted keys.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const EMBEDDED_EN: &str = include_str!("../locales/en.json");

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap();
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalogue {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalogue is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalogue root must be a JSON object")]
    NotAnObject,
}

/// Message lookup used by validation rules.
pub trait Translate: Send + Sync {
    /// Resolve `key`, substituting `{{name}}` placeholders from `params`.
    /// Unknown keys resolve to the key itself.
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    /// The English catalogue compiled into the binary.
    pub fn embedded() -> Self {
        // The embedded file is checked by `test_embedded_catalog_parses`.
        Self::from_json_str(EMBEDDED_EN).unwrap_or_default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(root) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let mut messages = HashMap::new();
        for (key, value) in &root {
            flatten(key, value, &mut messages);
        }
        Ok(Self { messages })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Entries in `other` replace entries with the same key.
    pub fn merge(mut self, other: Catalog) -> Self {
        self.messages.extend(other.messages);
        self
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(children) => {
            for (key, child) in children {
                flatten(&format!("{prefix}.{key}"), child, out);
            }
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

impl Translate for Catalog {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        match self.messages.get(key) {
            Some(template) => interpolate(template, params),
            None => {
                tracing::debug!(key, "missing translation");
                key.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = Catalog::from_json_str(EMBEDDED_EN).unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(
            catalog.translate("forms.name.validationError.notEmpty", &[]),
            "Enter your full name"
        );
    }

    #[test]
    fn test_flat_and_nested_keys() {
        let catalog = Catalog::from_json_str(
            r#"{"forms": {"address": {"label": "Address"}}, "pages.start": "Start now"}"#,
        )
        .unwrap();
        assert_eq!(catalog.translate("forms.address.label", &[]), "Address");
        assert_eq!(catalog.translate("pages.start", &[]), "Start now");
    }

    #[test]
    fn test_missing_key_returns_key() {
        let catalog = Catalog::default();
        assert_eq!(catalog.translate("forms.unknown", &[]), "forms.unknown");
    }

    #[test]
    fn test_placeholders_are_interpolated() {
        let catalog =
            Catalog::from_json_str(r#"{"range": "Between {{min}} and {{ max }} ({{unit}})"}"#).unwrap();
        assert_eq!(
            catalog.translate("range", &[("min", "1"), ("max", "31")]),
            "Between 1 and 31 ({{unit}})"
        );
    }

    #[test]
    fn test_merge_overrides() {
        let base = Catalog::from_json_str(r#"{"a": "one", "b": "two"}"#).unwrap();
        let overrides = Catalog::from_json_str(r#"{"b": "deux"}"#).unwrap();
        let merged = base.merge(overrides);
        assert_eq!(merged.translate("a", &[]), "one");
        assert_eq!(merged.translate("b", &[]), "deux");
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(Catalog::from_json_str("[]"), Err(CatalogError::NotAnObject)));
        assert!(matches!(Catalog::from_json_str("{"), Err(CatalogError::Parse(_))));
    }
}
