pub mod config;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod metrics;
pub mod metrics_handler;
pub mod observability;
pub mod routes;
pub mod session;
pub mod session_cookie;
pub mod state;
pub mod validation;
