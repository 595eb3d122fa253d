//! Flat storage for the type graph.
//!
//! Nodes are never removed individually; a merge moves nodes out of the
//! source arena by value and the source arena is dropped with it.

use std::ops::{Index, IndexMut};

use crate::{Type, TypeId};

/// Owns every [`Type`] node of one Symbol IR.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeArena {
    nodes: Vec<Type>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its ID.
    pub fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId::new(to_u32(self.nodes.len()));
        self.nodes.push(ty);
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.nodes[id.index()]
    }

    /// Take a node out, leaving an anonymous placeholder behind.
    pub(crate) fn take(&mut self, id: TypeId) -> Type {
        std::mem::replace(&mut self.nodes[id.index()], Type::base(String::new(), 0))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their IDs, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, ty)| (TypeId::new(to_u32(index)), ty))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Type> {
        self.nodes.iter_mut()
    }
}

impl Index<TypeId> for TypeArena {
    type Output = Type;

    #[inline]
    fn index(&self, id: TypeId) -> &Type {
        self.get(id)
    }
}

impl IndexMut<TypeId> for TypeArena {
    #[inline]
    fn index_mut(&mut self, id: TypeId) -> &mut Type {
        self.get_mut(id)
    }
}

#[cold]
#[inline(never)]
fn arena_overflow(len: usize) -> ! {
    panic!("type arena exceeded u32::MAX nodes ({len})")
}

#[inline]
fn to_u32(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(value) => value,
        Err(_) => arena_overflow(len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_index() {
        let mut arena = TypeArena::new();
        assert!(arena.is_empty());
        let int = arena.push(Type::base("int", 4));
        let ch = arena.push(Type::base("char", 1));
        assert_eq!(int, TypeId::new(0));
        assert_eq!(ch, TypeId::new(1));
        assert_eq!(arena[ch].name, "char");
        arena[int].size = 8;
        assert_eq!(arena.get(int).size, 8);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_take_leaves_placeholder() {
        let mut arena = TypeArena::new();
        let id = arena.push(Type::base("int", 4));
        let taken = arena.take(id);
        assert_eq!(taken.name, "int");
        assert!(arena[id].is_anonymous());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_iter_yields_ids() {
        let mut arena = TypeArena::new();
        arena.push(Type::base("a", 1));
        arena.push(Type::base("b", 1));
        let ids: Vec<_> = arena.iter().map(|(id, ty)| (id.raw(), ty.name.clone())).collect();
        assert_eq!(ids, [(0, "a".to_string()), (1, "b".to_string())]);
    }
}
