//! # Structured Logging Module
//!
//! Environment-aware structured logging for resolver hosts. Library code only
//! emits `tracing` events; binaries and tests call
//! [`init_structured_logging`] once to install a subscriber.

use crate::config::{detect_environment, LoggingConfig};
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific defaults.
pub fn init_structured_logging() {
    init_with_config(&LoggingConfig::default());
}

/// Initialize structured logging, honoring an explicit level and format.
///
/// Only the first call in a process has any effect. `RUST_LOG` takes
/// precedence over the configured level.
pub fn init_with_config(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = detect_environment();
        let level = config
            .level
            .clone()
            .unwrap_or_else(|| get_log_level(&environment).to_string());

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A host may already have installed a global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized, keeping it");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            level = %level,
            json = config.json,
            "Structured logging initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" | "development" => "debug",
        _ => "debug",
    }
}

/// Log structured data for resolver lifecycle operations
pub fn log_resolution_operation(
    operation: &str,
    resolver_id: Uuid,
    name: Option<&str>,
    provider: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        resolver_id = %resolver_id,
        name = name,
        provider = provider,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "RESOLVER_OPERATION"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_with_config(&LoggingConfig {
            level: Some("trace".to_string()),
            json: true,
        });
        log_resolution_operation("test", Uuid::new_v4(), Some("n"), None, "success", None);
        assert!(LOGGER_INITIALIZED.get().is_some());
    }
}
