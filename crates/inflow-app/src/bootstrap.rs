//! Service wiring for the inflow binary.

use std::net::SocketAddr;
use std::sync::Arc;

use inflow_api::ApiServer;
use inflow_bench::BenchWriter;
use inflow_config::AppConfig;
use inflow_telemetry::{LoggingConfig, Metrics, ResourceProbe, SystemProbe, init_logging};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Entry point for the inflow boot sequence.
///
/// # Errors
///
/// Returns an error if configuration loading, telemetry initialisation, or
/// the API server fails.
pub async fn run_app() -> AppResult<()> {
    let config =
        AppConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
    run_app_with(config).await
}

/// Boot sequence that relies entirely on an injected configuration to
/// simplify testing.
async fn run_app_with(config: AppConfig) -> AppResult<()> {
    init_logging(&LoggingConfig::default())
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!("inflow bootstrap starting");

    let telemetry =
        Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
    let probe: Arc<dyn ResourceProbe> = Arc::new(SystemProbe::new());

    let (bench, writer_task) = BenchWriter::spawn(
        config.bench_log_path.clone(),
        config.queue_capacity,
        telemetry.clone(),
    );
    info!(
        path = %config.bench_log_path.display(),
        capacity = config.queue_capacity,
        "benchmark writer ready"
    );

    let addr = SocketAddr::new(config.bind_addr, config.http_port);
    let api = ApiServer::new(config, telemetry, probe, bench);

    info!(addr = %addr, "launching api listener");
    let serve_result = api.serve(addr).await;

    // The writer queue only drains once every handle is gone; the server
    // owned the last one, so all that remains is to reap the task.
    if !writer_task.is_finished() {
        writer_task.abort();
    }
    if let Err(err) = writer_task.await
        && !err.is_cancelled()
    {
        warn!(error = %err, "benchmark writer join failed");
    }

    serve_result.map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("api server shutdown complete");
    Ok(())
}
