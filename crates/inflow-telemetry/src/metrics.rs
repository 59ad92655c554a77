//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes a minimal set of counters/gauges relevant to the upload
//!   pipeline and the benchmark log writer.

use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{TelemetryError, TelemetryResult};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    uploads_total: IntCounterVec,
    upload_bytes_total: IntCounter,
    active_uploads: IntGauge,
    last_copy_duration_ms: IntGauge,
    bench_log_failures_total: IntCounter,
    bench_log_dropped_total: IntCounter,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Number of uploads currently streaming to disk.
    pub active_uploads: i64,
    /// Duration (ms) of the most recently completed byte copy.
    pub last_copy_duration_ms: i64,
    /// Total bytes written by completed uploads.
    pub upload_bytes_total: u64,
    /// Total benchmark-log append failures observed.
    pub bench_log_failures_total: u64,
    /// Total benchmark results dropped because the writer queue was full.
    pub bench_log_dropped_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> TelemetryResult<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )
        .map_err(TelemetryError::register)?;
        let uploads_total = IntCounterVec::new(
            Opts::new("uploads_total", "Upload requests finished by outcome"),
            &["status"],
        )
        .map_err(TelemetryError::register)?;
        let upload_bytes_total = IntCounter::with_opts(Opts::new(
            "upload_bytes_total",
            "Bytes written to disk by completed uploads",
        ))
        .map_err(TelemetryError::register)?;
        let active_uploads = IntGauge::with_opts(Opts::new(
            "active_uploads",
            "Uploads currently streaming to disk",
        ))
        .map_err(TelemetryError::register)?;
        let last_copy_duration_ms = IntGauge::with_opts(Opts::new(
            "last_copy_duration_ms",
            "Duration of the most recent byte copy (ms)",
        ))
        .map_err(TelemetryError::register)?;
        let bench_log_failures_total = IntCounter::with_opts(Opts::new(
            "bench_log_failures_total",
            "Benchmark log append failures",
        ))
        .map_err(TelemetryError::register)?;
        let bench_log_dropped_total = IntCounter::with_opts(Opts::new(
            "bench_log_dropped_total",
            "Benchmark results dropped because the writer queue was full",
        ))
        .map_err(TelemetryError::register)?;

        registry
            .register(Box::new(http_requests_total.clone()))
            .map_err(TelemetryError::register)?;
        registry
            .register(Box::new(uploads_total.clone()))
            .map_err(TelemetryError::register)?;
        registry
            .register(Box::new(upload_bytes_total.clone()))
            .map_err(TelemetryError::register)?;
        registry
            .register(Box::new(active_uploads.clone()))
            .map_err(TelemetryError::register)?;
        registry
            .register(Box::new(last_copy_duration_ms.clone()))
            .map_err(TelemetryError::register)?;
        registry
            .register(Box::new(bench_log_failures_total.clone()))
            .map_err(TelemetryError::register)?;
        registry
            .register(Box::new(bench_log_dropped_total.clone()))
            .map_err(TelemetryError::register)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                uploads_total,
                upload_bytes_total,
                active_uploads,
                last_copy_duration_ms,
                bench_log_failures_total,
                bench_log_dropped_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the upload outcome counter (`success`, `client_error`,
    /// `server_error`).
    pub fn inc_upload(&self, status: &str) {
        self.inner
            .uploads_total
            .with_label_values(&[status])
            .inc();
    }

    /// Record bytes written by a completed upload.
    pub fn add_upload_bytes(&self, bytes: u64) {
        self.inner.upload_bytes_total.inc_by(bytes);
    }

    /// Mark an upload as entering the streaming phase.
    pub fn inc_active_uploads(&self) {
        self.inner.active_uploads.inc();
    }

    /// Mark an upload as leaving the streaming phase.
    pub fn dec_active_uploads(&self) {
        self.inner.active_uploads.dec();
    }

    /// Record the duration of the most recent byte copy.
    pub fn observe_copy_duration(&self, duration: Duration) {
        self.inner
            .last_copy_duration_ms
            .set(Self::duration_to_ms(duration));
    }

    /// Increment the benchmark-log append failure counter.
    pub fn inc_bench_log_failure(&self) {
        self.inner.bench_log_failures_total.inc();
    }

    /// Increment the counter of results dropped on a full writer queue.
    pub fn inc_bench_log_dropped(&self) {
        self.inner.bench_log_dropped_total.inc();
    }

    /// Render the metrics registry using the Prometheus text exposition
    /// format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges and
    /// counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_uploads: self.inner.active_uploads.get(),
            last_copy_duration_ms: self.inner.last_copy_duration_ms.get(),
            upload_bytes_total: self.inner.upload_bytes_total.get(),
            bench_log_failures_total: self.inner.bench_log_failures_total.get(),
            bench_log_dropped_total: self.inner.bench_log_dropped_total.get(),
        }
    }

    /// Convert a duration to milliseconds saturating at `i64::MAX`.
    fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}
