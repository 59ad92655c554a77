#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Telemetry primitives shared across the inflow workspace.
//!
//! This crate centralises logging, metrics, and the per-upload performance
//! sampling machinery so the delivery surfaces adopt a consistent
//! observability story.

mod error;
mod init;
mod metrics;
mod monitor;
mod probe;

pub use error::{TelemetryError, TelemetryResult};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging,
    propagate_request_id_layer, set_request_id_layer,
};
pub use metrics::{Metrics, MetricsSnapshot};
pub use monitor::{MonitorReport, PerfMonitor};
pub use probe::{ResourceProbe, SystemProbe};
