//! Environment parsing for [`AppConfig`].

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    AppConfig, DEFAULT_BENCH_LOG, DEFAULT_BIND_ADDR, DEFAULT_HTTP_PORT, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SAMPLE_INTERVAL,
};

const ENV_BIND_ADDR: &str = "INFLOW_BIND_ADDR";
const ENV_HTTP_PORT: &str = "INFLOW_HTTP_PORT";
const ENV_BENCH_LOG: &str = "INFLOW_BENCH_LOG";
const ENV_SAMPLE_INTERVAL_MS: &str = "INFLOW_SAMPLE_INTERVAL_MS";
const ENV_QUEUE_CAPACITY: &str = "INFLOW_QUEUE_CAPACITY";

impl AppConfig {
    /// Resolve the configuration from `INFLOW_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse or validate.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let bind_addr = match lookup(ENV_BIND_ADDR) {
            Some(raw) => parse_bind_addr(&raw)?,
            None => DEFAULT_BIND_ADDR,
        };
        let http_port = match lookup(ENV_HTTP_PORT) {
            Some(raw) => parse_http_port(&raw)?,
            None => DEFAULT_HTTP_PORT,
        };
        let bench_log_path = match lookup(ENV_BENCH_LOG) {
            Some(raw) => parse_bench_log_path(&raw)?,
            None => PathBuf::from(DEFAULT_BENCH_LOG),
        };
        let sample_interval = match lookup(ENV_SAMPLE_INTERVAL_MS) {
            Some(raw) => parse_sample_interval(&raw)?,
            None => DEFAULT_SAMPLE_INTERVAL,
        };
        let queue_capacity = match lookup(ENV_QUEUE_CAPACITY) {
            Some(raw) => parse_queue_capacity(&raw)?,
            None => DEFAULT_QUEUE_CAPACITY,
        };

        Ok(Self {
            bind_addr,
            http_port,
            bench_log_path,
            sample_interval,
            queue_capacity,
        })
    }
}

fn parse_bind_addr(raw: &str) -> ConfigResult<IpAddr> {
    raw.trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::invalid("bind_addr", "invalid_ip", raw))
}

fn parse_http_port(raw: &str) -> ConfigResult<u16> {
    let port = raw
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::invalid("http_port", "invalid_number", raw))?;
    if port == 0 {
        return Err(ConfigError::invalid("http_port", "zero", raw));
    }
    Ok(port)
}

fn parse_bench_log_path(raw: &str) -> ConfigResult<PathBuf> {
    if raw.trim().is_empty() {
        return Err(ConfigError::invalid("bench_log_path", "empty", raw));
    }
    Ok(PathBuf::from(raw))
}

fn parse_sample_interval(raw: &str) -> ConfigResult<Duration> {
    let millis = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid("sample_interval_ms", "invalid_number", raw))?;
    if millis == 0 {
        return Err(ConfigError::invalid("sample_interval_ms", "zero", raw));
    }
    Ok(Duration::from_millis(millis))
}

fn parse_queue_capacity(raw: &str) -> ConfigResult<usize> {
    let capacity = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid("queue_capacity", "invalid_number", raw))?;
    if capacity == 0 {
        return Err(ConfigError::invalid("queue_capacity", "zero", raw));
    }
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |name| map.get(name).map(|value| (*value).to_string())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() -> ConfigResult<()> {
        let config = AppConfig::from_lookup(|_| None)?;
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(config.bench_log_path, PathBuf::from(DEFAULT_BENCH_LOG));
        assert_eq!(config.sample_interval, DEFAULT_SAMPLE_INTERVAL);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        Ok(())
    }

    #[test]
    fn explicit_values_override_defaults() -> ConfigResult<()> {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_BIND_ADDR, "127.0.0.1"),
            (ENV_HTTP_PORT, "9090"),
            (ENV_BENCH_LOG, "/var/log/inflow/benchmark.txt"),
            (ENV_SAMPLE_INTERVAL_MS, "50"),
            (ENV_QUEUE_CAPACITY, "32"),
        ]))?;
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1");
        assert_eq!(config.http_port, 9090);
        assert_eq!(
            config.bench_log_path,
            PathBuf::from("/var/log/inflow/benchmark.txt")
        );
        assert_eq!(config.sample_interval, Duration::from_millis(50));
        assert_eq!(config.queue_capacity, 32);
        Ok(())
    }

    #[test]
    fn invalid_port_is_rejected_with_context() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_HTTP_PORT, "not-a-port")]))
            .expect_err("non-numeric port should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "http_port",
                reason: "invalid_number",
                ..
            }
        ));
    }

    #[test]
    fn zero_port_and_interval_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_HTTP_PORT, "0")]))
            .expect_err("zero port should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "http_port",
                reason: "zero",
                ..
            }
        ));

        let err = AppConfig::from_lookup(lookup_from(&[(ENV_SAMPLE_INTERVAL_MS, "0")]))
            .expect_err("zero interval should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "sample_interval_ms",
                reason: "zero",
                ..
            }
        ));
    }

    #[test]
    fn empty_bench_log_path_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_BENCH_LOG, "  ")]))
            .expect_err("blank path should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "bench_log_path",
                reason: "empty",
                ..
            }
        ));
    }
}
