use anyhow::Result;
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, LogFormat};
use crate::metrics;

const DEFAULT_FILTER: &str = "form_api=debug,tower_http=debug";
const METRICS_PREFIX: &str = "govuk_forms";

pub struct Observability {
    pub registry: Registry,
}

impl Observability {
    pub fn init(config: &AppConfig) -> Result<Self> {
        let registry = metrics::new_registry(METRICS_PREFIX)?;

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_FILTER.into());

        let (json_layer, pretty_layer) = match config.log_format {
            LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
            LogFormat::Pretty => (None, Some(tracing_subscriber::fmt::layer())),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .with(pretty_layer)
            .try_init()?;

        tracing::info!(format = ?config.log_format, "Observability stack initialized (Prometheus + tracing)");
        Ok(Self { registry })
    }
}
