//! The upload-and-measure pipeline behind `POST /upload`.
//!
//! # Design
//!
//! - The handler owns the request-scoped telemetry: it samples the initial
//!   memory reading, starts the performance monitor before anything can
//!   fail, and stops it on every exit path so no sampler outlives its
//!   request.
//! - The linear pipeline (validate → prepare → locate field → copy) runs in
//!   a helper returning `Result`, keeping the stop-the-monitor obligation in
//!   exactly one place.
//! - Exactly one benchmark result is dispatched per successful copy, after
//!   the monitor has been stopped; failed uploads dispatch nothing.

use std::convert::TryFrom;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use inflow_bench::{
    BenchmarkResult, format_cpu_percent, format_memory_mb, format_rate_mbs, memory_delta_bytes,
    transfer_rate_bps,
};
use inflow_fsops::{DestinationFile, destination_file_name, ensure_parent_dirs};
use inflow_telemetry::{MonitorReport, PerfMonitor};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::http::errors::{ApiError, describe};
use crate::state::ApiState;

/// Multipart field that carries the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadQuery {
    #[serde(default)]
    pub(crate) dest: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct UploadResponse {
    pub(crate) status: &'static str,
    pub(crate) destination: String,
    pub(crate) size: u64,
    pub(crate) duration_ms: u64,
    pub(crate) transfer_rate: String,
    pub(crate) memory_used_mb: String,
    pub(crate) cpu_usage: String,
}

struct CopyOutcome {
    destination: PathBuf,
    file_name: String,
    bytes_written: u64,
    copy_duration: Duration,
}

pub(crate) async fn upload(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let request_start = Instant::now();
    let initial_memory = state.probe.process_memory_bytes();
    state.telemetry.inc_active_uploads();
    let monitor = PerfMonitor::start(Arc::clone(&state.probe), state.config.sample_interval);

    let outcome = run_pipeline(&query, multipart).await;
    state.telemetry.dec_active_uploads();

    match outcome {
        Ok(copy) => {
            let report = monitor.stop().await;
            let response = finalize(&state, copy, &report, initial_memory, request_start);
            state.telemetry.inc_upload("success");
            Ok(Json(response))
        }
        Err(err) => {
            // The sampler must not outlive a failed request.
            monitor.stop().await;
            let status = if err.status == StatusCode::BAD_REQUEST {
                "client_error"
            } else {
                "server_error"
            };
            state.telemetry.inc_upload(status);
            Err(err)
        }
    }
}

/// Steps 2–7 of the pipeline: everything that can fail before finalization.
async fn run_pipeline(
    query: &UploadQuery,
    mut multipart: Multipart,
) -> Result<CopyOutcome, ApiError> {
    let dest = query
        .dest
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request("destination path is required"))?;
    let destination = PathBuf::from(dest);

    ensure_parent_dirs(&destination).await.map_err(|err| {
        ApiError::internal(format!("failed to create directory: {}", describe(&err)))
    })?;

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return Err(ApiError::bad_request(
                    "failed to get file: multipart field 'file' is missing",
                ));
            }
            Err(err) => {
                return Err(ApiError::bad_request(format!(
                    "failed to get file: {}",
                    describe(&err)
                )));
            }
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map_or_else(|| destination_file_name(&destination), ToOwned::to_owned);

        let mut sink = DestinationFile::create(&destination).await.map_err(|err| {
            ApiError::internal(format!(
                "failed to create destination file: {}",
                describe(&err)
            ))
        })?;

        let copy_start = Instant::now();
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    sink.write_chunk(&chunk).await.map_err(|err| {
                        ApiError::internal(format!("failed to save file: {}", describe(&err)))
                    })?;
                }
                Ok(None) => break,
                Err(err) => {
                    return Err(ApiError::internal(format!(
                        "failed to save file: {}",
                        describe(&err)
                    )));
                }
            }
        }
        let bytes_written = sink.finish().await.map_err(|err| {
            ApiError::internal(format!("failed to save file: {}", describe(&err)))
        })?;
        let copy_duration = copy_start.elapsed();

        return Ok(CopyOutcome {
            destination,
            file_name,
            bytes_written,
            copy_duration,
        });
    }
}

/// Steps 8–10: assemble the benchmark result, dispatch it, and build the
/// response payload.
fn finalize(
    state: &ApiState,
    copy: CopyOutcome,
    report: &MonitorReport,
    initial_memory: u64,
    request_start: Instant,
) -> UploadResponse {
    let transfer_rate = transfer_rate_bps(copy.bytes_written, copy.copy_duration);
    let memory_used = memory_delta_bytes(report.peak_memory_bytes, initial_memory);
    let task_count = state.probe.alive_tasks();
    let destination = copy.destination.display().to_string();

    state.telemetry.add_upload_bytes(copy.bytes_written);
    state.telemetry.observe_copy_duration(copy.copy_duration);

    info!(
        destination = %destination,
        bytes = copy.bytes_written,
        copy_ms = duration_ms(copy.copy_duration),
        total_ms = duration_ms(request_start.elapsed()),
        "upload completed"
    );

    state.bench.append(BenchmarkResult {
        timestamp: Utc::now(),
        file_name: copy.file_name,
        byte_count: copy.bytes_written,
        copy_duration: copy.copy_duration,
        transfer_rate_bps: transfer_rate,
        memory_used_bytes: memory_used,
        cpu_usage_percent: report.avg_cpu_percent,
        task_count,
    });

    UploadResponse {
        status: "success",
        destination,
        size: copy.bytes_written,
        duration_ms: duration_ms(copy.copy_duration),
        transfer_rate: format_rate_mbs(transfer_rate),
        memory_used_mb: format_memory_mb(memory_used),
        cpu_usage: format_cpu_percent(report.avg_cpu_percent),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
