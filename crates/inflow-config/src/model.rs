//! Configuration model shared across the inflow services.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Default listener address.
pub(crate) const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Default HTTP port.
pub(crate) const DEFAULT_HTTP_PORT: u16 = 8080;
/// Default benchmark log path, relative to the working directory.
pub(crate) const DEFAULT_BENCH_LOG: &str = "benchmark.txt";
/// Default performance-monitor tick interval.
pub(crate) const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);
/// Default benchmark-writer queue bound.
pub(crate) const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Service configuration resolved once at bootstrap.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: IpAddr,
    /// Port the HTTP listener binds to; never zero.
    pub http_port: u16,
    /// Path of the append-only benchmark log.
    pub bench_log_path: PathBuf,
    /// Tick interval for the per-upload performance monitor.
    pub sample_interval: Duration,
    /// Bound of the benchmark-writer queue.
    pub queue_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            http_port: DEFAULT_HTTP_PORT,
            bench_log_path: PathBuf::from(DEFAULT_BENCH_LOG),
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
