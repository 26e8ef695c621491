use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::i18n::{Catalog, CatalogError};
use crate::metrics;
use crate::session::{MemorySessionStore, SessionStore};
use crate::validation::FormRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub started_at: Instant,
    pub registry: Registry,
    pub forms: Arc<FormRegistry>,
    pub sessions: Arc<dyn SessionStore>,
    pub translator: Arc<Catalog>,
}

impl AppState {
    pub fn new(config: &AppConfig, registry: Registry) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::embedded();
        if let Some(path) = &config.locale_file {
            catalog = catalog.merge(Catalog::from_file(path)?);
            tracing::info!(path = %path.display(), "locale overrides loaded");
        }

        let sessions = Arc::new(MemorySessionStore::new(&config.session));
        Ok(Self::with_parts(registry, FormRegistry::standard(), sessions, catalog))
    }

    pub fn with_parts(
        registry: Registry,
        forms: FormRegistry,
        sessions: Arc<dyn SessionStore>,
        translator: Catalog,
    ) -> Self {
        metrics::FORMS_REGISTERED.set(forms.entities().count() as i64);
        Self {
            started_at: Instant::now(),
            registry,
            forms: Arc::new(forms),
            sessions,
            translator: Arc::new(translator),
        }
    }

    #[cfg(test)]
    pub fn for_tests(config: &AppConfig) -> Self {
        let registry = metrics::new_registry("test").unwrap();
        Self::new(config, registry).unwrap()
    }
}
