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

//! Benchmark results and the append-only benchmark log writer.
//!
//! # Design
//!
//! - One immutable [`BenchmarkResult`] per successfully completed upload.
//! - The log writer is an explicitly-owned value constructed once at
//!   bootstrap: a bounded queue with a single dedicated consumer task, so
//!   concurrent uploads can never spawn unbounded writers and appended lines
//!   never interleave.
//! - Log-file failures are telemetry failures: logged and counted, never
//!   surfaced to an upload response.

mod error;
mod result;
mod writer;

pub use error::{BenchError, BenchResult};
pub use result::{
    BenchmarkResult, format_cpu_percent, format_memory_mb, format_rate_mbs, memory_delta_bytes,
    transfer_rate_bps,
};
pub use writer::{BenchWriter, BenchWriterHandle};
