//! Batch driver for the DDR debug-information compiler.
//!
//! Reads one Symbol IR snapshot per compilation unit, merges them into a
//! single aggregate, applies overrides and macro lists, then writes the
//! binary blob and/or appends to the superset.

mod config;
mod error;
mod pipeline;

use std::sync::Once;

pub use config::{Command, GenConfig, USAGE};
pub use error::{DriverError, Result};
pub use pipeline::{build_ir, run, RunSummary};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=ddrgen=debug` or
/// `RUST_LOG=ddr_ir=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}
