//! Per-upload performance monitor.
//!
//! # Design
//! - One monitor per upload; it samples on a fixed interval for the lifetime
//!   of the request and folds the readings into a peak and a running average.
//! - Cancellation is a one-shot signal and the result is handed back through
//!   the task join, so [`PerfMonitor::stop`] consuming `self` makes
//!   "stoppable exactly once" a compile-time guarantee and the accumulators
//!   are only read after sampling has ceased.
//! - Dropping the handle without calling `stop` also terminates the sampling
//!   task: the closed cancel channel resolves on the next poll.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::probe::ResourceProbe;

/// Summary returned by a stopped monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonitorReport {
    /// Highest memory reading observed during the sampling window.
    pub peak_memory_bytes: u64,
    /// Time-averaged CPU estimate, `(alive_tasks / cpu_count) * 100` per
    /// tick. An approximation of scheduling pressure, not CPU time.
    pub avg_cpu_percent: f64,
    /// Number of ticks that contributed to the averages.
    pub samples: usize,
}

/// Handle to a running sampling task.
pub struct PerfMonitor {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<MonitorReport>,
}

impl PerfMonitor {
    /// Spawn the sampling task. The first tick fires immediately, so any
    /// upload that outlives a single poll contributes at least one sample.
    #[must_use]
    pub fn start(probe: Arc<dyn ResourceProbe>, interval: Duration) -> Self {
        let (cancel, mut cancelled) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut peak_memory_bytes = 0_u64;
            let mut cpu_sum = 0_f64;
            let mut samples = 0_usize;

            loop {
                tokio::select! {
                    _ = &mut cancelled => break,
                    _ = ticker.tick() => {
                        peak_memory_bytes = peak_memory_bytes.max(probe.process_memory_bytes());
                        cpu_sum += cpu_estimate_percent(probe.alive_tasks(), probe.cpu_count());
                        samples += 1;
                    }
                }
            }

            let avg_cpu_percent = if samples == 0 {
                0.0
            } else {
                cpu_sum / to_f64(samples)
            };
            MonitorReport {
                peak_memory_bytes,
                avg_cpu_percent,
                samples,
            }
        });

        Self { cancel, task }
    }

    /// Signal cancellation and wait for the final report. Sampling is
    /// guaranteed to have ceased before the report is produced.
    pub async fn stop(self) -> MonitorReport {
        let _ = self.cancel.send(());
        match self.task.await {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "performance monitor task join failed");
                MonitorReport::default()
            }
        }
    }
}

fn cpu_estimate_percent(alive_tasks: usize, cpu_count: usize) -> f64 {
    to_f64(alive_tasks) / to_f64(cpu_count.max(1)) * 100.0
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: usize) -> f64 {
    value as f64
}
