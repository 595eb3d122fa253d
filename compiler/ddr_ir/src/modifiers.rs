//! Type modifiers layered on a field or typedef.
//!
//! A field's declared type is a named [`Type`](crate::Type) plus these
//! modifiers: cv-style qualifiers, pointer/reference depth and array
//! dimensions, outermost dimension first.

use bitflags::bitflags;
use smallvec::SmallVec;

/// Size in bytes of a data pointer on the host that produced the IR.
pub const POINTER_SIZE: u64 = std::mem::size_of::<usize>() as u64;

bitflags! {
    /// Qualifier bits of a [`Modifiers`] value.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
    pub struct ModifierFlags: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const UNALIGNED = 1 << 2;
        const RESTRICT = 1 << 3;
        const SHARED = 1 << 4;
    }
}

impl ModifierFlags {
    /// Source spellings, in the order they are printed.
    const NAMES: [(ModifierFlags, &'static str); 5] = [
        (ModifierFlags::CONST, "const"),
        (ModifierFlags::VOLATILE, "volatile"),
        (ModifierFlags::UNALIGNED, "unaligned"),
        (ModifierFlags::RESTRICT, "restrict"),
        (ModifierFlags::SHARED, "shared"),
    ];
}

/// Qualifiers, indirection and array shape applied to a base type.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    pub flags: ModifierFlags,
    pub pointer_count: u32,
    pub reference_count: u32,
    /// One entry per dimension; `0` means the dimension has no declared length.
    pub array_lengths: SmallVec<[u64; 2]>,
}

impl Modifiers {
    /// No qualifiers, no indirection, not an array.
    pub fn none() -> Self {
        Self::default()
    }

    /// `count` levels of pointer indirection.
    pub fn pointer(count: u32) -> Self {
        Modifiers {
            pointer_count: count,
            ..Self::default()
        }
    }

    /// An array with the given dimensions.
    pub fn array(lengths: &[u64]) -> Self {
        Modifiers {
            array_lengths: lengths.iter().copied().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ModifierFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        !self.array_lengths.is_empty()
    }

    #[inline]
    pub fn array_dimensions(&self) -> usize {
        self.array_lengths.len()
    }

    /// Declared length of dimension `index`, `0` if unsized or out of range.
    #[inline]
    pub fn array_length(&self, index: usize) -> u64 {
        self.array_lengths.get(index).copied().unwrap_or(0)
    }

    /// Whether any qualifier, indirection or array shape is present.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
            && self.pointer_count == 0
            && self.reference_count == 0
            && self.array_lengths.is_empty()
    }

    /// Qualifier keywords, each followed by a space (`"const volatile "`).
    pub fn modifier_names(&self) -> String {
        let mut names = String::new();
        for (flag, name) in ModifierFlags::NAMES {
            if self.flags.contains(flag) {
                names.push_str(name);
                names.push(' ');
            }
        }
        names
    }

    /// `*` per pointer level followed by `[]` per array dimension.
    pub fn pointer_suffix(&self) -> String {
        let mut suffix = "*".repeat(self.pointer_count as usize);
        for _ in 0..self.array_dimensions() {
            suffix.push_str("[]");
        }
        suffix
    }

    /// Size of a value of the base type once these modifiers are applied.
    ///
    /// Any indirection yields the pointer size; every sized array dimension
    /// multiplies the element size.
    pub fn size_of(&self, base_size: u64) -> u64 {
        let element = if self.pointer_count > 0 || self.reference_count > 0 {
            POINTER_SIZE
        } else {
            base_size
        };
        self.array_lengths
            .iter()
            .filter(|&&len| len > 0)
            .fold(element, |size, &len| size.saturating_mul(len))
    }
}
