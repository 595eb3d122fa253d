//! The batch pipeline.
//!
//! ```text
//! snapshot -> merge -> snapshot -> merge -> ... -> dedup -> overrides -> macros
//!                                                                   -> blob
//!                                                                   -> superset
//! ```
//!
//! Merging is strictly sequential: each unit is folded into the single
//! aggregate before the next one is read. The first failure stops the run.

use std::path::Path;

use ddr_blobgen::{BlobGenerator, SupersetGenerator};
use ddr_ir::{snapshot, IrError, SymbolIr};

use crate::{DriverError, GenConfig, Result};

/// What one run did, for logging and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub units: usize,
    pub types: usize,
    pub duplicates_removed: usize,
    pub overrides_applied: usize,
    pub macros_added: usize,
}

/// Run the whole pipeline described by `config`.
pub fn run(config: &GenConfig) -> Result<RunSummary> {
    let (ir, summary) = build_ir(config)?;

    // the blob is assembled in memory first, so a generation failure
    // leaves both outputs untouched
    if let Some(path) = &config.blob {
        BlobGenerator::new(config.blob_options()).write(&ir, path)?;
        tracing::debug!(path = %path.display(), "wrote blob");
    }
    if let Some(path) = &config.superset {
        SupersetGenerator::new(config.superset_options()).append(&ir, path)?;
    }
    Ok(summary)
}

/// Load, merge and enrich the IR without serializing it.
pub fn build_ir(config: &GenConfig) -> Result<(SymbolIr, RunSummary)> {
    let mut summary = RunSummary::default();
    let mut ir = SymbolIr::new();

    for path in &config.snapshots {
        let unit = load_snapshot(path)?;
        tracing::debug!(path = %path.display(), types = unit.types().len(), "loaded snapshot");
        ir.merge_ir(unit)?;
        summary.units += 1;
    }

    summary.duplicates_removed = ir.remove_duplicates();
    tracing::debug!(removed = summary.duplicates_removed, "removed duplicates");

    for path in &config.overrides {
        summary.overrides_applied += ir.apply_overrides_file(path)?;
    }
    if let Some(path) = &config.macros {
        summary.macros_added = ir.add_macros_file(path)?;
    }

    summary.types = ir.types().len();
    tracing::debug!(?summary, "symbol IR ready");
    Ok((ir, summary))
}

fn load_snapshot(path: &Path) -> Result<SymbolIr> {
    snapshot::read(path).map_err(|source| match source {
        IrError::Io { .. } => DriverError::Ir(source),
        source => DriverError::Snapshot {
            path: path.to_owned(),
            source,
        },
    })
}
