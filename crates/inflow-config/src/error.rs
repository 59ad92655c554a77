//! # Design
//!
//! - Constant error messages; offending values live in structured fields.
//! - One variant per failure class so callers can match without string
//!   inspection.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading the service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value failed validation.
    #[error("invalid configuration value")]
    InvalidValue {
        /// Field name that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            field,
            reason,
            value: Some(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_keeps_constant_message() {
        let err = ConfigError::invalid("http_port", "invalid_number", "abc");
        assert_eq!(err.to_string(), "invalid configuration value");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "http_port",
                reason: "invalid_number",
                value: Some(value),
            } if value == "abc"
        ));
    }
}
