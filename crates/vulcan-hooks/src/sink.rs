//! Where query errors are reported.

use vulcan_telemetry::{DEFAULT_REDACT_FIELDS, redact_sensitive};

use crate::executor::QueryError;
use crate::options::QueryVariables;

/// A query error observed while normalizing a result.
#[derive(Debug, Clone, Copy)]
pub struct ErrorReport<'a> {
    /// Resolver the query targeted.
    pub resolver_name: &'a str,
    pub variables: &'a QueryVariables,
    pub error: &'a QueryError,
}

/// Receives query errors. Reporting never changes the returned result.
pub trait ErrorSink: Send + Sync {
    fn report(&self, report: &ErrorReport<'_>);
}

/// Logs query errors as `warn` events with sensitive variables masked.
#[derive(Debug, Clone)]
pub struct TracingErrorSink {
    redact_fields: Vec<String>,
}

impl Default for TracingErrorSink {
    fn default() -> Self {
        Self {
            redact_fields: DEFAULT_REDACT_FIELDS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl TracingErrorSink {
    /// Sink masking `fields` in logged variables.
    #[must_use]
    pub const fn with_redact_fields(fields: Vec<String>) -> Self {
        Self {
            redact_fields: fields,
        }
    }
}

impl ErrorSink for TracingErrorSink {
    fn report(&self, report: &ErrorReport<'_>) {
        let variables = serde_json::to_value(report.variables)
            .map(|value| redact_sensitive(&value, &self.redact_fields))
            .unwrap_or_default();
        tracing::warn!(
            resolver = report.resolver_name,
            variables = %variables,
            status_code = ?report.error.network_error.as_ref().and_then(|e| e.status_code),
            graphql_errors = report.error.graphql_errors.len(),
            error = %report.error,
            "multi query returned an error"
        );
    }
}
