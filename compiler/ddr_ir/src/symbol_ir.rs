//! The Symbol IR: an arena of types plus the ordered top-level list.
//!
//! An IR fresh from a scanner is "raw": it has no key index and is only
//! used as a merge source. The first [`merge_ir`](SymbolIr::merge_ir) into
//! an IR builds the (qualified name, kind) index and makes it the aggregate.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::visitor::{walk_ir, walk_type, TypeVisitor};
use crate::{Modifiers, SymbolKind, Type, TypeArena, TypeId};

/// Merge key: qualified name plus kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub name: String,
    pub kind: SymbolKind,
}

impl TypeKey {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        TypeKey {
            name: name.into(),
            kind,
        }
    }
}

/// A type graph for one compilation unit, or the merge of many.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolIr {
    pub(crate) arena: TypeArena,
    /// Owned top-level types, in declaration order.
    pub(crate) types: Vec<TypeId>,
    #[cfg_attr(feature = "snapshot", serde(skip))]
    pub(crate) index: Option<FxHashMap<TypeKey, TypeId>>,
}

impl SymbolIr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level type.
    pub fn add_type(&mut self, ty: Type) -> TypeId {
        let id = self.arena.push(ty);
        self.types.push(id);
        self.index_insert(id);
        id
    }

    /// Add a named type owned by the namespace, class or union `outer`.
    ///
    /// If `outer` cannot own types the new node is left unlisted.
    pub fn add_nested(&mut self, outer: TypeId, mut ty: Type) -> TypeId {
        if let Some(udt) = ty.udt_mut() {
            udt.outer = Some(outer);
        }
        let id = self.arena.push(ty);
        match self.arena[outer].scope_mut() {
            Some(scope) => scope.sub_udts.push(id),
            None => tracing::debug!(outer = %outer, "nested type added to a non-scope type"),
        }
        self.index_insert(id);
        id
    }

    /// Allocate a type that is owned by a field or typedef rather than
    /// listed in a scope, such as an anonymous struct.
    pub fn alloc(&mut self, ty: Type) -> TypeId {
        self.arena.push(ty)
    }

    /// Add a top-level typedef of `aliased`; its size follows the alias.
    pub fn new_typedef(
        &mut self,
        name: impl Into<String>,
        aliased: TypeId,
        modifiers: Modifiers,
    ) -> TypeId {
        let size = modifiers.size_of(self.arena[aliased].size);
        let mut ty = Type::typedef(name, aliased, modifiers);
        ty.size = size;
        self.add_type(ty)
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        self.arena.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        self.arena.get_mut(id)
    }

    #[inline]
    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    /// Top-level types, in order.
    #[inline]
    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    /// Every type reachable through ownership (top-level entries and their
    /// sub-UDTs), in pre-order.
    pub fn all_udts(&self) -> Vec<TypeId> {
        struct Collect(Vec<TypeId>);

        impl<'ir> TypeVisitor<'ir> for Collect {
            fn visit_type(&mut self, id: TypeId, ir: &'ir SymbolIr) {
                self.0.push(id);
                walk_type(self, id, ir);
            }
        }

        let mut collect = Collect(Vec::with_capacity(self.types.len()));
        walk_ir(&mut collect, self);
        collect.0
    }

    /// Name prefixed by every enclosing scope, `::`-joined.
    ///
    /// Anonymous types have an empty full name.
    pub fn full_name(&self, id: TypeId) -> String {
        let ty = self.get(id);
        if ty.is_anonymous() {
            return String::new();
        }
        let mut segments = vec![ty.name.as_str()];
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut next = ty.outer();
        while let Some(outer) = next {
            if !seen.insert(outer) {
                break;
            }
            let scope = self.get(outer);
            if !scope.is_anonymous() {
                segments.push(scope.name.as_str());
            }
            next = scope.outer();
        }
        segments.reverse();
        segments.join("::")
    }

    /// Merge key of a named type; anonymous types have none.
    pub fn key(&self, id: TypeId) -> Option<TypeKey> {
        let ty = self.get(id);
        if ty.is_anonymous() {
            return None;
        }
        Some(TypeKey::new(self.full_name(id), ty.symbol_kind()))
    }

    /// Find a type by qualified name and kind.
    pub fn find(&self, name: &str, kind: SymbolKind) -> Option<TypeId> {
        if let Some(index) = &self.index {
            return index.get(&TypeKey::new(name, kind)).copied();
        }
        self.all_udts()
            .into_iter()
            .find(|&id| self.get(id).symbol_kind() == kind && self.full_name(id) == name)
    }

    /// Find the first type of any kind with this qualified name.
    pub fn find_by_name(&self, name: &str) -> Option<TypeId> {
        self.all_udts()
            .into_iter()
            .find(|&id| !self.get(id).is_anonymous() && self.full_name(id) == name)
    }

    /// Whether the key index has been built.
    #[inline]
    pub fn is_aggregate(&self) -> bool {
        self.index.is_some()
    }

    pub(crate) fn lookup(&self, key: &TypeKey) -> Option<TypeId> {
        self.index.as_ref().and_then(|index| index.get(key).copied())
    }

    /// Build the key index if it does not exist. The first declaration of a
    /// key wins.
    pub(crate) fn ensure_index(&mut self) {
        if self.index.is_some() {
            return;
        }
        let mut index = FxHashMap::default();
        for id in self.all_udts() {
            if let Some(key) = self.key(id) {
                index.entry(key).or_insert(id);
            }
        }
        tracing::trace!(entries = index.len(), "built type index");
        self.index = Some(index);
    }

    pub(crate) fn rebuild_index(&mut self) {
        self.index = None;
        self.ensure_index();
    }

    pub(crate) fn index_insert(&mut self, id: TypeId) {
        if self.index.is_none() {
            return;
        }
        if let Some(key) = self.key(id) {
            if let Some(index) = &mut self.index {
                index.entry(key).or_insert(id);
            }
        }
    }

    pub(crate) fn index_insert_key(&mut self, key: TypeKey, id: TypeId) {
        if let Some(index) = &mut self.index {
            index.entry(key).or_insert(id);
        }
    }
}

#[cfg(test)]
mod tests;
