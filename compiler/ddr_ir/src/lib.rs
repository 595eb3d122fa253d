//! Symbol IR for the DDR debug-information compiler.
//!
//! A scanner produces one [`SymbolIr`] per compilation unit. The driver folds
//! them into one aggregate with [`SymbolIr::merge_ir`], collapses leftovers
//! with [`SymbolIr::remove_duplicates`], then enriches the result with
//! override rules and macro lists before handing it to the generators.
//!
//! # Graph representation
//!
//! - Nodes live in a [`TypeArena`] and are addressed by [`TypeId`]
//! - Ownership is list membership: the top-level list and each scope's
//!   sub-UDTs; anonymous types are owned by the field or typedef using them
//! - Every other link is a plain `TypeId` and may form cycles, so walks
//!   that follow links keep a visited set
//!
//! The per-kind behaviour is one exhaustive `match` over [`TypeKind`], in
//! [`visitor::walk_type`].

mod arena;
mod dedup;
mod equality;
mod error;
mod macro_list;
mod macros;
mod merge;
mod modifiers;
mod overrides;
mod symbol_ir;
mod traits;
mod type_id;
mod types;
pub mod visitor;

#[cfg(feature = "snapshot")]
pub mod snapshot;

pub use arena::TypeArena;
pub use error::{IrError, Result};
pub use macro_list::{parse_macro_list, MacroGroup};
pub use macros::{reduce_integer, Macro};
pub use modifiers::{ModifierFlags, Modifiers, POINTER_SIZE};
pub use overrides::Override;
pub use symbol_ir::{SymbolIr, TypeKey};
pub use traits::{HasFields, HasSubUdts};
pub use type_id::TypeId;
pub use types::{
    ClassUdt, EnumMember, EnumUdt, Field, Layout, NamespaceUdt, Scope, SymbolKind, Type, TypeKind,
    TypedefUdt, UdtInfo, UnionUdt,
};
pub use visitor::TypeVisitor;
