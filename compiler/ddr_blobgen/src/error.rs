//! Errors raised while serializing a Symbol IR.

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for generator operations.
pub type Result<T, E = GenError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("cannot write `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("out of memory allocating {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// The build pass produced more records than the enumerate pass counted.
    #[error("internal error: {what}: counted {expected}, built {actual}")]
    FormatInvariant {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{what} does not fit in 32 bits")]
    SizeOverflow { what: &'static str },

    #[error("unable to determine bitfield format from {slot0:08X} {slot1:08X}")]
    BitfieldFormat { slot0: u32, slot1: u32 },

    #[error("string of {len} bytes is too long for the string table")]
    StringTooLong { len: usize },
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}
