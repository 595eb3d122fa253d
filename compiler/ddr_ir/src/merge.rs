//! Folding one compilation unit's IR into an aggregate.
//!
//! # Phases
//!
//! 1. Index the aggregate by (qualified name, kind).
//! 2. Walk the unit's top-level types. A type whose key is already known is
//!    deep-merged into the existing one; any other type has its owned
//!    subtree moved into the aggregate arena.
//! 3. Re-resolve every link that still holds a handle from the unit's arena.
//!
//! Handles are arena-relative, so phase 2 records an id map (unit handle to
//! aggregate handle) and phase 3 rewrites links through it. Links nothing in
//! the map accounts for fall back to the key index.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    ClassUdt, IrError, NamespaceUdt, Result, SymbolIr, SymbolKind, Type, TypeId, TypeKey, TypeKind,
    UnionUdt,
};

impl SymbolIr {
    /// Merge `other` into this IR, consuming it.
    ///
    /// New types are moved in; types already present gain the sub-types,
    /// fields, enumerators and macros they were missing. A field already
    /// present by name is kept as is.
    pub fn merge_ir(&mut self, other: SymbolIr) -> Result<()> {
        self.ensure_index();
        let mut merger = Merger::new(self, other);
        merger.merge_top_level();
        merger.resolve()?;
        tracing::debug!(
            moved = merger.moved.len(),
            merged = merger.map.len() - merger.moved.len(),
            total = merger.dst.types.len(),
            "merged compilation unit"
        );
        Ok(())
    }
}

/// A link copied from the unit that still holds a unit handle.
#[derive(Copy, Clone, Debug)]
enum PendingRef {
    Field { owner: TypeId, index: usize },
    Superclass(TypeId),
    Alias(TypeId),
}

struct Merger<'a> {
    dst: &'a mut SymbolIr,
    src: SymbolIr,
    /// Keys of every unit node, computed before any node is moved out.
    src_keys: Vec<Option<TypeKey>>,
    /// Unit handle to aggregate handle, for moved and merged nodes.
    map: FxHashMap<TypeId, TypeId>,
    /// Aggregate handles of moved nodes; all of their links are unit handles.
    moved: Vec<TypeId>,
    moved_set: FxHashSet<TypeId>,
    /// Links added to nodes that were already in the aggregate.
    pending: Vec<PendingRef>,
}

impl<'a> Merger<'a> {
    fn new(dst: &'a mut SymbolIr, src: SymbolIr) -> Self {
        let src_keys = src.arena.iter().map(|(id, _)| src.key(id)).collect();
        Merger {
            dst,
            src,
            src_keys,
            map: FxHashMap::default(),
            moved: Vec::new(),
            moved_set: FxHashSet::default(),
            pending: Vec::new(),
        }
    }

    fn src_key(&self, id: TypeId) -> Option<&TypeKey> {
        self.src_keys.get(id.index()).and_then(Option::as_ref)
    }

    fn existing(&self, src_id: TypeId) -> Option<TypeId> {
        self.src_key(src_id).and_then(|key| self.dst.lookup(key))
    }

    fn merge_top_level(&mut self) {
        let top = std::mem::take(&mut self.src.types);
        for t in top {
            if self.map.contains_key(&t) {
                continue;
            }
            match self.existing(t) {
                Some(s) => self.merge_into(t, s),
                None => {
                    let new = self.transplant(t, None);
                    self.dst.types.push(new);
                }
            }
        }
    }

    /// Move unit node `t` and its owned subtree into the aggregate.
    fn transplant(&mut self, t: TypeId, outer: Option<TypeId>) -> TypeId {
        let mut ty = self.src.arena.take(t);
        if let Some(udt) = ty.udt_mut() {
            udt.outer = outer;
        }
        let subs = ty
            .scope_mut()
            .map(|scope| std::mem::take(&mut scope.sub_udts))
            .unwrap_or_default();
        let anonymous: Vec<TypeId> = ty.refs().filter(|&r| self.is_unmapped_anonymous(r)).collect();

        let new = self.dst.arena.push(ty);
        self.map.insert(t, new);
        self.moved.push(new);
        self.moved_set.insert(new);
        if let Some(key) = self.src_key(t).cloned() {
            self.dst.index_insert_key(key, new);
        }
        tracing::trace!(from = %t, to = %new, "moved type");

        let mut new_subs = Vec::with_capacity(subs.len());
        for sub in subs {
            if !self.map.contains_key(&sub) {
                new_subs.push(self.transplant(sub, Some(new)));
            }
        }
        if let Some(scope) = self.dst.arena[new].scope_mut() {
            scope.sub_udts = new_subs;
        }

        for anon in anonymous {
            if !self.map.contains_key(&anon) {
                self.transplant(anon, None);
            }
        }
        new
    }

    fn is_unmapped_anonymous(&self, src_id: TypeId) -> bool {
        src_id.index() < self.src_keys.len()
            && self.src_key(src_id).is_none()
            && !self.map.contains_key(&src_id)
    }

    /// Deep-merge unit node `t` into aggregate node `s` of the same key.
    fn merge_into(&mut self, t: TypeId, s: TypeId) {
        self.map.insert(t, s);
        let incoming = self.src.arena.take(t);
        let track = !self.moved_set.contains(&s);

        if let Some(scope) = incoming.scope() {
            // anonymous sub-UDTs have no key; they pair up by position and kind
            let mut known_anonymous: Vec<(TypeId, SymbolKind)> = self.dst.arena[s]
                .scope()
                .map(|target| {
                    target
                        .sub_udts
                        .iter()
                        .map(|&id| (id, &self.dst.arena[id]))
                        .filter(|(_, ty)| ty.is_anonymous())
                        .map(|(id, ty)| (id, ty.symbol_kind()))
                        .collect()
                })
                .unwrap_or_default();
            for &sub in &scope.sub_udts {
                if self.map.contains_key(&sub) {
                    continue;
                }
                if self.src_key(sub).is_none() {
                    let kind = self.src.arena[sub].symbol_kind();
                    match known_anonymous.iter().position(|&(_, have)| have == kind) {
                        Some(at) => {
                            let (existing, _) = known_anonymous.remove(at);
                            self.merge_into(sub, existing);
                        }
                        None => self.adopt_sub(sub, s),
                    }
                    continue;
                }
                match self.existing(sub) {
                    Some(existing) => self.merge_into(sub, existing),
                    None => self.adopt_sub(sub, s),
                }
            }
            if let Some(target) = self.dst.arena[s].scope_mut() {
                for m in &scope.macros {
                    if !target.macros.iter().any(|have| have.name == m.name) {
                        target.macros.push(m.clone());
                    }
                }
            }
        }

        self.merge_enum_members(&incoming, s);
        let appended = self.merge_fields(&incoming, s, track);

        // anonymous field types outside the sub-UDT list
        for (field_ty, index) in appended {
            if self.is_unmapped_anonymous(field_ty) {
                self.transplant(field_ty, None);
                tracing::trace!(owner = %s, index, "carried anonymous member type");
            }
        }

        self.adopt_definition(incoming, s, track);
    }

    /// Move unit sub-UDT `sub` into aggregate node `s`.
    fn adopt_sub(&mut self, sub: TypeId, s: TypeId) {
        let new = self.transplant(sub, Some(s));
        match self.dst.arena[s].scope_mut() {
            Some(scope) => scope.sub_udts.push(new),
            None => self.dst.types.push(new),
        }
    }

    fn merge_enum_members(&mut self, incoming: &Type, s: TypeId) {
        let target = match &mut self.dst.arena[s].kind {
            TypeKind::Enum(e) => &mut e.members,
            TypeKind::Namespace(NamespaceUdt { scope, .. })
            | TypeKind::Class(ClassUdt { scope, .. })
            | TypeKind::Union(UnionUdt { scope, .. }) => &mut scope.enum_members,
            TypeKind::Base | TypeKind::Typedef(_) => return,
        };
        for member in incoming.enum_members() {
            if !target.iter().any(|have| have.name == member.name) {
                target.push(member.clone());
            }
        }
    }

    /// Append fields new by name; returns (unit type handle, field index) of
    /// each appended field.
    fn merge_fields(&mut self, incoming: &Type, s: TypeId, track: bool) -> Vec<(TypeId, usize)> {
        let Some(fields) = incoming.layout().map(|layout| &layout.fields) else {
            return Vec::new();
        };
        let owner_name = self.dst.full_name(s);
        let Some(layout) = self.dst.arena[s].layout_mut() else {
            return Vec::new();
        };

        let mut appended = Vec::new();
        // anonymous members match positionally
        let mut anonymous_seen = 0usize;
        for field in fields {
            let existing = if field.is_anonymous() {
                anonymous_seen += 1;
                layout
                    .fields
                    .iter()
                    .filter(|have| have.is_anonymous())
                    .nth(anonymous_seen - 1)
            } else {
                layout.fields.iter().find(|have| have.name == field.name)
            };
            match existing {
                Some(have) => {
                    if have.offset != field.offset {
                        tracing::debug!(
                            owner = %owner_name,
                            field = %field.name,
                            kept = have.offset,
                            ignored = field.offset,
                            "field differs between compilation units; keeping first"
                        );
                    }
                }
                None => {
                    let index = layout.fields.len();
                    layout.fields.push(field.clone());
                    appended.push((field.ty, index));
                }
            }
        }
        if track {
            self.pending.extend(
                appended
                    .iter()
                    .map(|&(_, index)| PendingRef::Field { owner: s, index }),
            );
        }
        appended
    }

    /// Let a forward declaration or unresolved typedef take the incoming
    /// definition.
    fn adopt_definition(&mut self, incoming: Type, s: TypeId, track: bool) {
        let line = incoming.udt().map(|udt| udt.line_number);
        let target = &mut self.dst.arena[s];
        match (&mut target.kind, incoming.kind) {
            (TypeKind::Class(have), TypeKind::Class(new)) => {
                if !have.layout.complete && new.layout.complete {
                    have.layout.complete = true;
                    have.udt.line_number = new.udt.line_number;
                    target.size = incoming.size;
                    if have.superclass.is_none() {
                        if let Some(superclass) = new.superclass {
                            have.superclass = Some(superclass);
                            if track {
                                self.pending.push(PendingRef::Superclass(s));
                            }
                        }
                    }
                }
            }
            (TypeKind::Union(have), TypeKind::Union(new)) => {
                if !have.layout.complete && new.layout.complete {
                    have.layout.complete = true;
                    have.udt.line_number = new.udt.line_number;
                    target.size = incoming.size;
                }
            }
            (TypeKind::Typedef(have), TypeKind::Typedef(new)) => {
                if have.aliased.is_none() {
                    if let Some(aliased) = new.aliased {
                        have.aliased = Some(aliased);
                        have.modifiers = new.modifiers;
                        if let Some(line) = line {
                            have.udt.line_number = line;
                        }
                        target.size = incoming.size;
                        if track {
                            self.pending.push(PendingRef::Alias(s));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Rewrite every link that still holds a unit handle.
    fn resolve(&mut self) -> Result<()> {
        for i in 0..self.moved.len() {
            let id = self.moved[i];
            self.resolve_moved(id)?;
        }
        for i in 0..self.pending.len() {
            match self.pending[i] {
                PendingRef::Field { owner, index } => {
                    let Some(field_ty) = self.dst.arena[owner]
                        .layout()
                        .and_then(|layout| layout.fields.get(index))
                        .map(|field| field.ty)
                    else {
                        continue;
                    };
                    let resolved = self.resolve_link(owner, field_ty, false)?;
                    if let Some(field) = self.dst.arena[owner]
                        .layout_mut()
                        .and_then(|layout| layout.fields.get_mut(index))
                    {
                        field.ty = resolved;
                    }
                }
                PendingRef::Superclass(owner) => {
                    if let TypeKind::Class(class) = &self.dst.arena[owner].kind {
                        if let Some(superclass) = class.superclass {
                            let resolved = self.resolve_link(owner, superclass, true)?;
                            if let TypeKind::Class(class) = &mut self.dst.arena[owner].kind {
                                class.superclass = Some(resolved);
                            }
                        }
                    }
                }
                PendingRef::Alias(owner) => {
                    if let Some((aliased, _)) = self.dst.arena[owner].alias() {
                        let resolved = self.resolve_link(owner, aliased, true)?;
                        if let TypeKind::Typedef(typedef) = &mut self.dst.arena[owner].kind {
                            typedef.aliased = Some(resolved);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_moved(&mut self, id: TypeId) -> Result<()> {
        let ty = self.dst.get(id);
        let superclass = match ty.superclass() {
            Some(superclass) => Some(self.resolve_link(id, superclass, true)?),
            None => None,
        };
        let aliased = match ty.alias() {
            Some((aliased, _)) => Some(self.resolve_link(id, aliased, true)?),
            None => None,
        };
        let mut field_types = Vec::new();
        if let Some(layout) = ty.layout() {
            field_types.reserve(layout.fields.len());
            for field in &layout.fields {
                field_types.push(self.resolve_link(id, field.ty, false)?);
            }
        }

        match &mut self.dst.arena[id].kind {
            TypeKind::Typedef(typedef) => {
                if aliased.is_some() {
                    typedef.aliased = aliased;
                }
            }
            TypeKind::Class(class) => {
                class.superclass = superclass;
                for (field, ty) in class.layout.fields.iter_mut().zip(field_types) {
                    field.ty = ty;
                }
            }
            TypeKind::Union(union) => {
                for (field, ty) in union.layout.fields.iter_mut().zip(field_types) {
                    field.ty = ty;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Map unit handle `target`, referenced from aggregate node `referrer`,
    /// to its aggregate counterpart.
    fn resolve_link(&self, referrer: TypeId, target: TypeId, forbid_self: bool) -> Result<TypeId> {
        let resolved = self
            .map
            .get(&target)
            .copied()
            .or_else(|| self.existing(target));
        match resolved {
            Some(resolved) if forbid_self && resolved == referrer => Err(IrError::MergeCycle {
                name: self.dst.full_name(referrer),
            }),
            Some(resolved) => Ok(resolved),
            None => Err(IrError::MergeResolution {
                referrer: self.dst.full_name(referrer),
                target: self
                    .src_key(target)
                    .map_or_else(|| target.to_string(), |key| key.name.clone()),
            }),
        }
    }
}

#[cfg(test)]
mod tests;
