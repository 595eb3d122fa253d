//! Driver errors.

use std::path::PathBuf;

use ddr_blobgen::GenError;
use ddr_ir::IrError;
use thiserror::Error;

pub type Result<T, E = DriverError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DriverError {
    /// Bad command line.
    #[error("{0}")]
    Usage(String),

    #[error("cannot load snapshot `{path}`: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: IrError,
    },

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error(transparent)]
    Gen(#[from] GenError),
}
