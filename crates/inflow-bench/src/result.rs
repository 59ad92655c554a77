//! Benchmark result value and shared numeric formatting.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Bytes per mebibyte, used by the rate and memory formatting.
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Copy durations below this floor are clamped before the rate division so
/// sub-millisecond copies (including 0-byte uploads) report a finite rate.
const MIN_RATE_WINDOW: Duration = Duration::from_millis(1);

/// Immutable record of one completed upload, produced exactly once per
/// successful copy.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    /// Instant the result was finalized.
    pub timestamp: DateTime<Utc>,
    /// Name of the uploaded file as declared by the client, or the
    /// destination file name when no name was declared.
    pub file_name: String,
    /// Bytes actually written by the copy; never the client-declared size.
    pub byte_count: u64,
    /// Wall-clock span of the byte copy only.
    pub copy_duration: Duration,
    /// Transfer rate in bytes per second.
    pub transfer_rate_bps: f64,
    /// Peak memory during the copy minus memory at request start. Negative
    /// when the runtime reclaimed memory mid-copy.
    pub memory_used_bytes: i64,
    /// Time-averaged CPU estimate from the performance monitor.
    pub cpu_usage_percent: f64,
    /// Live task count snapshot taken once at completion.
    pub task_count: usize,
}

impl BenchmarkResult {
    /// Render the single benchmark-log line for this result, without a
    /// trailing newline.
    #[must_use]
    pub fn log_line(&self) -> String {
        format!(
            "[{}] File: {}, Size: {} bytes, Duration: {:?}, Transfer Rate: {}, Memory Used: {}, CPU Usage: {}, Tasks: {}",
            self.timestamp.to_rfc3339(),
            self.file_name,
            self.byte_count,
            self.copy_duration,
            format_rate_mbs(self.transfer_rate_bps),
            format_memory_mb(self.memory_used_bytes),
            format_cpu_percent(self.cpu_usage_percent),
            self.task_count,
        )
    }
}

/// Compute the transfer rate in bytes per second, flooring the duration at
/// one millisecond so the result is always finite.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn transfer_rate_bps(byte_count: u64, copy_duration: Duration) -> f64 {
    let window = copy_duration.max(MIN_RATE_WINDOW);
    byte_count as f64 / window.as_secs_f64()
}

/// Compute the signed memory delta between the copy-window peak and the
/// reading taken at request start. Negative deltas propagate as-is.
#[must_use]
pub fn memory_delta_bytes(peak_memory_bytes: u64, initial_memory_bytes: u64) -> i64 {
    let peak = i64::try_from(peak_memory_bytes).unwrap_or(i64::MAX);
    let initial = i64::try_from(initial_memory_bytes).unwrap_or(i64::MAX);
    peak.saturating_sub(initial)
}

/// Format a bytes-per-second rate as `"<float> MB/s"` with two decimals.
#[must_use]
pub fn format_rate_mbs(rate_bps: f64) -> String {
    format!("{:.2} MB/s", rate_bps / BYTES_PER_MB)
}

/// Format a signed byte count as `"<float> MB"` with two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_memory_mb(bytes: i64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

/// Format a CPU percentage as `"<float>%"` with two decimals.
#[must_use]
pub fn format_cpu_percent(percent: f64) -> String {
    format!("{percent:.2}%")
}
