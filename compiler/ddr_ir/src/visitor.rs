//! Type graph visitor.
//!
//! Traversal follows ownership only: the top-level list, then each scope's
//! sub-UDTs. Non-owning links (field types, superclasses, aliases) are left
//! to the visitor, which must track what it has seen if it follows them.
//!
//! Default implementations call `walk_*` functions that traverse children.
//! Override `visit_*` methods to add behavior for one kind.
//!
//! # Example
//!
//! ```text
//! struct CountStructs {
//!     count: usize,
//! }
//!
//! impl<'ir> TypeVisitor<'ir> for CountStructs {
//!     fn visit_class(&mut self, id: TypeId, ty: &'ir Type, class: &'ir ClassUdt, ir: &'ir SymbolIr) {
//!         self.count += 1;
//!         walk_scope(self, &class.scope, ir);
//!     }
//! }
//! ```

use crate::{ClassUdt, EnumUdt, NamespaceUdt, Scope, SymbolIr, Type, TypeId, TypeKind, TypedefUdt, UnionUdt};

/// Kind-dispatched visitor over a [`SymbolIr`].
///
/// The IR is immutable during traversal; visitors collect what they need
/// and mutate afterwards.
pub trait TypeVisitor<'ir> {
    /// Visit any type; dispatches on its kind.
    fn visit_type(&mut self, id: TypeId, ir: &'ir SymbolIr) {
        walk_type(self, id, ir);
    }

    fn visit_base(&mut self, id: TypeId, ty: &'ir Type, ir: &'ir SymbolIr) {
        let _ = (id, ty, ir);
    }

    fn visit_namespace(
        &mut self,
        id: TypeId,
        ty: &'ir Type,
        ns: &'ir NamespaceUdt,
        ir: &'ir SymbolIr,
    ) {
        let _ = (id, ty);
        walk_scope(self, &ns.scope, ir);
    }

    fn visit_enum(&mut self, id: TypeId, ty: &'ir Type, e: &'ir EnumUdt, ir: &'ir SymbolIr) {
        let _ = (id, ty, e, ir);
    }

    fn visit_typedef(
        &mut self,
        id: TypeId,
        ty: &'ir Type,
        typedef: &'ir TypedefUdt,
        ir: &'ir SymbolIr,
    ) {
        let _ = (id, ty, typedef, ir);
    }

    fn visit_class(&mut self, id: TypeId, ty: &'ir Type, class: &'ir ClassUdt, ir: &'ir SymbolIr) {
        let _ = (id, ty);
        walk_scope(self, &class.scope, ir);
    }

    fn visit_union(&mut self, id: TypeId, ty: &'ir Type, union: &'ir UnionUdt, ir: &'ir SymbolIr) {
        let _ = (id, ty);
        walk_scope(self, &union.scope, ir);
    }
}

/// Dispatch `id` to the visitor method for its kind.
pub fn walk_type<'ir, V: TypeVisitor<'ir> + ?Sized>(visitor: &mut V, id: TypeId, ir: &'ir SymbolIr) {
    let ty = ir.get(id);
    match &ty.kind {
        TypeKind::Base => visitor.visit_base(id, ty, ir),
        TypeKind::Namespace(ns) => visitor.visit_namespace(id, ty, ns, ir),
        TypeKind::Enum(e) => visitor.visit_enum(id, ty, e, ir),
        TypeKind::Typedef(typedef) => visitor.visit_typedef(id, ty, typedef, ir),
        TypeKind::Class(class) => visitor.visit_class(id, ty, class, ir),
        TypeKind::Union(union) => visitor.visit_union(id, ty, union, ir),
    }
}

/// Visit every sub-UDT a scope owns, in order.
pub fn walk_scope<'ir, V: TypeVisitor<'ir> + ?Sized>(visitor: &mut V, scope: &'ir Scope, ir: &'ir SymbolIr) {
    for &sub in &scope.sub_udts {
        visitor.visit_type(sub, ir);
    }
}

/// Visit every top-level type, in order.
pub fn walk_ir<'ir, V: TypeVisitor<'ir> + ?Sized>(visitor: &mut V, ir: &'ir SymbolIr) {
    for &id in ir.types() {
        visitor.visit_type(id, ir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KindCounter {
        classes: usize,
        namespaces: usize,
        others: usize,
    }

    impl<'ir> TypeVisitor<'ir> for KindCounter {
        fn visit_base(&mut self, _id: TypeId, _ty: &'ir Type, _ir: &'ir SymbolIr) {
            self.others += 1;
        }

        fn visit_namespace(&mut self, _id: TypeId, _ty: &'ir Type, ns: &'ir NamespaceUdt, ir: &'ir SymbolIr) {
            self.namespaces += 1;
            walk_scope(self, &ns.scope, ir);
        }

        fn visit_class(&mut self, _id: TypeId, _ty: &'ir Type, class: &'ir ClassUdt, ir: &'ir SymbolIr) {
            self.classes += 1;
            walk_scope(self, &class.scope, ir);
        }
    }

    #[test]
    fn test_walk_follows_ownership() {
        let mut ir = SymbolIr::new();
        let int = ir.add_type(Type::base("int", 4));
        let ns = ir.add_type(Type::namespace("J9"));
        let outer = ir.add_nested(ns, Type::structure("Outer", 4, vec![crate::Field::new("i", int, 0)]));
        ir.add_nested(outer, Type::structure("Inner", 0, vec![]));

        let mut counter = KindCounter {
            classes: 0,
            namespaces: 0,
            others: 0,
        };
        walk_ir(&mut counter, &ir);
        assert_eq!(counter.namespaces, 1);
        assert_eq!(counter.classes, 2);
        // field types are not owned, so `int` is reached once via the top level
        assert_eq!(counter.others, 1);
    }
}
