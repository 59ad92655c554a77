//! # Design
//!
//! - Constant error messages; sources preserved for diagnostics without
//!   double-logging.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised while initialising or rendering telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the global tracing subscriber failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// Building or registering a Prometheus collector failed.
    #[error("failed to register metrics collector")]
    MetricsRegister {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// Encoding the metrics registry failed.
    #[error("failed to encode metrics")]
    MetricsEncode {
        /// Underlying Prometheus error.
        source: prometheus::Error,
    },
    /// The encoded metrics buffer was not valid UTF-8.
    #[error("metrics output was not valid utf-8")]
    MetricsUtf8 {
        /// Underlying conversion error.
        source: std::string::FromUtf8Error,
    },
}

impl TelemetryError {
    pub(crate) const fn register(source: prometheus::Error) -> Self {
        Self::MetricsRegister { source }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn metrics_errors_preserve_sources() {
        let register = TelemetryError::register(prometheus::Error::Msg("duplicate".to_string()));
        assert_eq!(
            register.to_string(),
            "failed to register metrics collector"
        );
        assert!(register.source().is_some());

        let encode = TelemetryError::MetricsEncode {
            source: prometheus::Error::Msg("encode".to_string()),
        };
        assert_eq!(encode.to_string(), "failed to encode metrics");
        assert!(encode.source().is_some());
    }
}
