//! Vulcan Telemetry - logging setup for the Vulcan data layer.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vulcan_telemetry::{TelemetryConfig, init_telemetry};
//!
//! init_telemetry(&TelemetryConfig::new("movies-app").with_json_logs(false))?;
//! tracing::info!(model = "Movie", "fetching first page");
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod logging;

pub use logging::*;

/// Field names masked by default.
pub const DEFAULT_REDACT_FIELDS: &[&str] = &["password", "api_key", "secret", "token", "authorization"];

/// Configuration for telemetry initialization.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line.
    pub service_name: String,

    /// Log level filter used when `RUST_LOG` is unset (e.g., "info", "debug").
    pub log_level: String,

    /// Enable JSON log output.
    pub json_logs: bool,

    /// Fields to redact from logged payloads.
    pub redact_fields: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "vulcan".to_string(),
            log_level: "info".to_string(),
            json_logs: true,
            redact_fields: DEFAULT_REDACT_FIELDS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl TelemetryConfig {
    /// Create a new configuration with the given service name.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable or disable JSON logs.
    #[must_use]
    pub const fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Add fields to redact from logs.
    #[must_use]
    pub fn with_redact_fields(mut self, fields: Vec<String>) -> Self {
        self.redact_fields.extend(fields);
        self
    }
}

/// Initialize logging for the process.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)?;
    tracing::debug!(service = %config.service_name, "telemetry initialized");
    Ok(())
}

/// Telemetry error type.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_masks_credentials() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "vulcan");
        assert_eq!(config.log_level, "info");
        assert!(config.json_logs);
        assert!(config.redact_fields.contains(&"token".to_string()));
    }

    #[test]
    fn builder_chain() {
        let config = TelemetryConfig::new("movies")
            .with_log_level("debug")
            .with_json_logs(false)
            .with_redact_fields(vec!["email".to_string()]);

        assert_eq!(config.service_name, "movies");
        assert_eq!(config.log_level, "debug");
        assert!(!config.json_logs);
        assert!(config.redact_fields.contains(&"email".to_string()));
        assert!(config.redact_fields.contains(&"password".to_string()));
    }

    #[test]
    fn second_init_fails() {
        let config = TelemetryConfig::new("test").with_log_level("off");
        let _ = init_telemetry(&config);
        assert!(matches!(
            init_telemetry(&config),
            Err(TelemetryError::LoggingInit(_))
        ));
    }
}
