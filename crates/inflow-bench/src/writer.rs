//! Queue-backed benchmark log writer.

use std::path::{Path, PathBuf};

use inflow_telemetry::Metrics;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{BenchError, BenchResult};
use crate::result::BenchmarkResult;

/// Factory for the benchmark log writer task.
pub struct BenchWriter;

/// Cloneable producer side of the writer queue; one operation, `append`.
#[derive(Clone)]
pub struct BenchWriterHandle {
    tx: mpsc::Sender<BenchmarkResult>,
    metrics: Metrics,
}

impl BenchWriter {
    /// Spawn the single consumer task draining the bounded queue into the
    /// log file at `path`. The file is opened in append mode per line and
    /// created on first write; it is never rotated or truncated.
    ///
    /// The task ends once every handle has been dropped and the queue has
    /// drained, so awaiting the returned join handle is a graceful shutdown.
    #[must_use]
    pub fn spawn(
        path: PathBuf,
        queue_capacity: usize,
        metrics: Metrics,
    ) -> (BenchWriterHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<BenchmarkResult>(queue_capacity.max(1));
        let consumer_metrics = metrics.clone();

        let task = tokio::spawn(async move {
            while let Some(result) = rx.recv().await {
                if let Err(err) = append_line(&path, &result.log_line()).await {
                    warn!(
                        error = %err,
                        path = %path.display(),
                        "failed to append benchmark line"
                    );
                    consumer_metrics.inc_bench_log_failure();
                }
            }
            debug!(path = %path.display(), "benchmark writer drained");
        });

        (BenchWriterHandle { tx, metrics }, task)
    }
}

impl BenchWriterHandle {
    /// Enqueue one result without blocking. When the queue is full the
    /// result is dropped and counted rather than stalling the caller.
    pub fn append(&self, result: BenchmarkResult) {
        match self.tx.try_send(result) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("benchmark writer queue full; dropping result");
                self.metrics.inc_bench_log_dropped();
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("benchmark writer closed; dropping result");
                self.metrics.inc_bench_log_failure();
            }
        }
    }
}

async fn append_line(path: &Path, line: &str) -> BenchResult<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await
        .map_err(|source| BenchError::io("append.open", path, source))?;
    file.write_all(line.as_bytes())
        .await
        .map_err(|source| BenchError::io("append.write", path, source))?;
    file.write_all(b"\n")
        .await
        .map_err(|source| BenchError::io("append.write", path, source))?;
    file.flush()
        .await
        .map_err(|source| BenchError::io("append.flush", path, source))?;
    Ok(())
}
