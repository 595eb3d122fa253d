//! Handle to a type node owned by a [`TypeArena`](crate::TypeArena).
//!
//! - `TypeId(u32)` instead of `Rc<RefCell<Type>>` for cross-links
//! - O(1) equality and hashing, so visited sets are cheap
//! - Only meaningful for the arena that issued it

use std::fmt;
use std::hash::{Hash, Hasher};

/// Index of a type node inside one Symbol IR's arena.
///
/// Handles from different IRs are not interchangeable; `merge_ir` remaps
/// every handle it transplants.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Create a new `TypeId` from a raw arena index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        TypeId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Hash for TypeId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_roundtrip() {
        let id = TypeId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.raw(), 42);
    }

    #[test]
    fn test_type_id_hash_and_order() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(TypeId::new(1));
        set.insert(TypeId::new(1));
        set.insert(TypeId::new(2));
        assert_eq!(set.len(), 2);
        assert!(TypeId::new(1) < TypeId::new(2));
    }

    #[test]
    fn test_type_id_formatting() {
        assert_eq!(format!("{:?}", TypeId::new(7)), "TypeId(7)");
        assert_eq!(format!("{}", TypeId::new(7)), "#7");
    }
}
