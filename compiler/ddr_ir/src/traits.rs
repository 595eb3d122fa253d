//! Focused capability traits.
//!
//! Consumers that only need a field list or a nested-type list take these
//! instead of matching on [`TypeKind`](crate::TypeKind).

use crate::{ClassUdt, Field, Type, TypeId, UnionUdt};

/// Anything that owns data members.
pub trait HasFields {
    fn fields(&self) -> &[Field];
}

/// Anything that owns nested named types.
pub trait HasSubUdts {
    fn sub_udts(&self) -> &[TypeId];
}

/// Types without a layout have no fields.
impl HasFields for Type {
    fn fields(&self) -> &[Field] {
        self.layout().map_or(&[], |layout| &layout.fields)
    }
}

impl HasFields for ClassUdt {
    fn fields(&self) -> &[Field] {
        &self.layout.fields
    }
}

impl HasFields for UnionUdt {
    fn fields(&self) -> &[Field] {
        &self.layout.fields
    }
}

impl HasSubUdts for Type {
    fn sub_udts(&self) -> &[TypeId] {
        self.scope().map_or(&[], |scope| &scope.sub_udts)
    }
}
