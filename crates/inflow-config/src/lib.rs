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

//! Environment-driven configuration for the inflow service.
//!
//! # Design
//!
//! - One `AppConfig` value constructed once at bootstrap and handed to the
//!   delivery surfaces; no ambient global settings.
//! - Parsing goes through an injected lookup so tests never mutate the
//!   process environment.
//! - Validation failures carry `{field, reason, value}` context with constant
//!   messages.

mod error;
mod loader;
mod model;

pub use error::{ConfigError, ConfigResult};
pub use model::AppConfig;
