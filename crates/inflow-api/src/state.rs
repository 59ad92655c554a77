//! Shared API state wired in at bootstrap.

use std::sync::Arc;

use inflow_bench::BenchWriterHandle;
use inflow_config::AppConfig;
use inflow_telemetry::{Metrics, ResourceProbe};

/// Dependencies every handler reaches through [`axum::extract::State`].
pub(crate) struct ApiState {
    pub(crate) config: AppConfig,
    pub(crate) telemetry: Metrics,
    pub(crate) probe: Arc<dyn ResourceProbe>,
    pub(crate) bench: BenchWriterHandle,
}

impl ApiState {
    pub(crate) fn new(
        config: AppConfig,
        telemetry: Metrics,
        probe: Arc<dyn ResourceProbe>,
        bench: BenchWriterHandle,
    ) -> Self {
        Self {
            config,
            telemetry,
            probe,
            bench,
        }
    }
}
