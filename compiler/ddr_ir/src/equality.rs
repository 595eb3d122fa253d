//! Structural equality over the type graph.
//!
//! Links may form cycles, so the comparison carries the set of pairs it has
//! already entered; meeting a pair again counts as equal. Two cyclic graphs
//! whose cycles differ in shape can therefore compare equal.

use rustc_hash::FxHashSet;

use crate::{Field, Layout, Scope, SymbolIr, TypeId, TypeKind};

impl SymbolIr {
    /// Whether `a` and `b` declare the same shape: kind, qualified name,
    /// size, fields, enumerators, macros, sub-types, superclass and alias.
    pub fn structurally_equal(&self, a: TypeId, b: TypeId) -> bool {
        a == b || Equality::new(self, self).types(a, b)
    }

    /// Compare `a` in this IR with `b` in `other`.
    pub fn structurally_equal_in(&self, a: TypeId, other: &SymbolIr, b: TypeId) -> bool {
        Equality::new(self, other).types(a, b)
    }
}

struct Equality<'a> {
    left: &'a SymbolIr,
    right: &'a SymbolIr,
    visited: FxHashSet<(TypeId, TypeId)>,
}

impl<'a> Equality<'a> {
    fn new(left: &'a SymbolIr, right: &'a SymbolIr) -> Self {
        Equality {
            left,
            right,
            visited: FxHashSet::default(),
        }
    }

    fn types(&mut self, a: TypeId, b: TypeId) -> bool {
        if !self.visited.insert((a, b)) {
            return true;
        }
        let (left, right) = (self.left, self.right);
        let (x, y) = (left.get(a), right.get(b));
        if x.symbol_kind() != y.symbol_kind()
            || x.name != y.name
            || x.size != y.size
            || left.full_name(a) != right.full_name(b)
        {
            return false;
        }

        match (&x.kind, &y.kind) {
            (TypeKind::Base, TypeKind::Base) => true,
            (TypeKind::Namespace(p), TypeKind::Namespace(q)) => self.scopes(&p.scope, &q.scope),
            (TypeKind::Enum(p), TypeKind::Enum(q)) => p.members == q.members,
            (TypeKind::Typedef(p), TypeKind::Typedef(q)) => {
                p.modifiers == q.modifiers && self.links(p.aliased, q.aliased)
            }
            (TypeKind::Class(p), TypeKind::Class(q)) => {
                p.is_class == q.is_class
                    && self.layouts(&p.layout, &q.layout)
                    && self.links(p.superclass, q.superclass)
                    && self.scopes(&p.scope, &q.scope)
            }
            (TypeKind::Union(p), TypeKind::Union(q)) => {
                self.layouts(&p.layout, &q.layout) && self.scopes(&p.scope, &q.scope)
            }
            _ => false,
        }
    }

    fn links(&mut self, a: Option<TypeId>, b: Option<TypeId>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.types(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn scopes(&mut self, p: &Scope, q: &Scope) -> bool {
        p.enum_members == q.enum_members
            && p.macros == q.macros
            && p.sub_udts.len() == q.sub_udts.len()
            && p.sub_udts
                .iter()
                .zip(&q.sub_udts)
                .all(|(&a, &b)| self.types(a, b))
    }

    fn layouts(&mut self, p: &Layout, q: &Layout) -> bool {
        p.complete == q.complete
            && p.fields.len() == q.fields.len()
            && p.fields.iter().zip(&q.fields).all(|(f, g)| self.fields(f, g))
    }

    fn fields(&mut self, f: &Field, g: &Field) -> bool {
        f.name == g.name
            && f.offset == g.offset
            && f.bit_field == g.bit_field
            && f.is_static == g.is_static
            && f.modifiers == g.modifiers
            && self.types(f.ty, g.ty)
    }
}

#[cfg(test)]
mod tests;
