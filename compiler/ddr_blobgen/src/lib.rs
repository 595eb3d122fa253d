//! Serializers for an aggregate DDR Symbol IR.
//!
//! - [`BlobGenerator`] writes the binary blob the runtime debugger loads
//! - [`SupersetGenerator`] appends the text superset used to detect
//!   incompatible layout changes between builds
//!
//! Both walk the IR the same way: every named, non-excluded namespace, enum,
//! class and union becomes an entry, and anonymous types held by value are
//! flattened into the entry that owns them.

mod blob;
mod error;
mod superset;
mod walk;

pub use blob::{BlobGenerator, BlobOptions};
pub use error::{GenError, Result};
pub use superset::{SupersetGenerator, SupersetOptions};
