//! Collapsing structurally identical declarations.
//!
//! Scope lists are processed bottom-up: a type's sub-UDTs are de-duplicated
//! before the list that holds the type. A dropped entry is redirected to
//! the survivor, along with every named type nested inside it.

use rustc_hash::FxHashMap;

use crate::{HasSubUdts, SymbolIr, TypeId, TypeKey};

#[derive(Default)]
struct Redirects {
    map: FxHashMap<TypeId, TypeId>,
    removed: usize,
}

impl Redirects {
    /// Follow redirects to the final survivor.
    fn target(&self, mut id: TypeId) -> TypeId {
        // a chain cannot be longer than the number of redirects
        for _ in 0..=self.map.len() {
            match self.map.get(&id) {
                Some(&next) if next != id => id = next,
                _ => break,
            }
        }
        id
    }
}

impl SymbolIr {
    /// Drop later declarations that are structurally equal to an earlier one
    /// with the same qualified name and kind, in every scope.
    ///
    /// Returns the number of entries removed from scope lists.
    pub fn remove_duplicates(&mut self) -> usize {
        let mut redirects = Redirects::default();
        let top = std::mem::take(&mut self.types);
        self.types = self.dedup_list(top, &mut redirects);

        if !redirects.map.is_empty() {
            let redirects = &redirects;
            for ty in self.arena.iter_mut() {
                ty.for_each_ref_mut(|link| *link = redirects.target(*link));
            }
        }
        self.rebuild_index();
        tracing::debug!(removed = redirects.removed, "removed duplicate types");
        redirects.removed
    }

    fn dedup_list(&mut self, list: Vec<TypeId>, redirects: &mut Redirects) -> Vec<TypeId> {
        for &id in &list {
            let subs = self.get(id).sub_udts().to_vec();
            if subs.is_empty() {
                continue;
            }
            let subs = self.dedup_list(subs, redirects);
            if let Some(scope) = self.get_mut(id).scope_mut() {
                scope.sub_udts = subs;
            }
        }

        let mut kept = Vec::with_capacity(list.len());
        let mut seen: FxHashMap<TypeKey, Vec<TypeId>> = FxHashMap::default();
        for id in list {
            let Some(key) = self.key(id) else {
                kept.push(id);
                continue;
            };
            let candidates = seen.entry(key).or_default();
            match candidates.iter().copied().find(|&c| self.structurally_equal(c, id)) {
                Some(survivor) => {
                    tracing::trace!(dropped = %id, survivor = %survivor, "duplicate type");
                    redirects.removed += 1;
                    self.redirect_subtree(id, survivor, redirects);
                }
                None => {
                    candidates.push(id);
                    kept.push(id);
                }
            }
        }
        kept
    }

    /// Redirect `dropped` and its named nested types to their counterparts
    /// under `survivor`.
    fn redirect_subtree(&self, dropped: TypeId, survivor: TypeId, redirects: &mut Redirects) {
        redirects.map.insert(dropped, survivor);
        for &sub in self.get(dropped).sub_udts() {
            let Some(key) = self.key(sub) else { continue };
            let counterpart = self
                .get(survivor)
                .sub_udts()
                .iter()
                .copied()
                .find(|&have| self.key(have).as_ref() == Some(&key));
            if let Some(counterpart) = counterpart {
                self.redirect_subtree(sub, counterpart, redirects);
            }
        }
    }
}
