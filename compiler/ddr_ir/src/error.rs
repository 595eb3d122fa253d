//! Errors raised while building or merging a Symbol IR.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for Symbol IR operations.
pub type Result<T, E = IrError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum IrError {
    /// A cross-reference in a merged unit has no counterpart in the aggregate.
    #[error("merge: cannot resolve reference from `{referrer}` to `{target}`")]
    MergeResolution { referrer: String, target: String },

    /// A superclass or typedef alias resolved to the type itself.
    #[error("merge: `{name}` refers to itself")]
    MergeCycle { name: String },

    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[cfg(feature = "snapshot")]
    #[error("malformed IR snapshot: {source}")]
    Snapshot {
        #[from]
        source: bincode::Error,
    },

    /// A snapshot decoded cleanly but does not describe a well-formed graph.
    #[cfg(feature = "snapshot")]
    #[error("malformed IR snapshot: {reason}")]
    InvalidSnapshot { reason: String },
}

impl IrError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        IrError::Io {
            path: path.into(),
            source,
        }
    }
}
