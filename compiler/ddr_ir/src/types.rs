//! Type graph nodes.
//!
//! Every declared type is one [`Type`] node: the attributes all kinds share,
//! plus a closed [`TypeKind`] carrying the per-kind payload. Ownership of
//! nested types is list membership (`Scope::sub_udts`, the IR's top-level
//! list); every other link is a [`TypeId`] and may form cycles.

use crate::{Macro, Modifiers, TypeId};

/// A declared type: base, namespace, enum, typedef, class/struct or union.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct Type {
    /// Unqualified name; empty for anonymous types.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Excluded types and their subtrees are not serialized.
    pub excluded: bool,
    /// Opaque types stop typedef-chain resolution.
    pub opaque: bool,
    pub kind: TypeKind,
}

/// Per-kind payload of a [`Type`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKind {
    Base,
    Namespace(NamespaceUdt),
    Enum(EnumUdt),
    Typedef(TypedefUdt),
    Class(ClassUdt),
    Union(UnionUdt),
}

/// Attributes shared by every user-defined type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct UdtInfo {
    /// Enclosing namespace or class, if nested.
    pub outer: Option<TypeId>,
    pub line_number: u32,
}

/// Contents a namespace-like type owns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct Scope {
    /// Named nested types, in declaration order.
    pub sub_udts: Vec<TypeId>,
    pub macros: Vec<Macro>,
    /// Literals of anonymous enums declared in this scope.
    pub enum_members: Vec<EnumMember>,
}

/// Data members of a class, struct or union.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub fields: Vec<Field>,
    /// `false` for a forward declaration.
    pub complete: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct NamespaceUdt {
    pub udt: UdtInfo,
    pub scope: Scope,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumUdt {
    pub udt: UdtInfo,
    pub members: Vec<EnumMember>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct TypedefUdt {
    pub udt: UdtInfo,
    /// Aliased type; `None` only while a scanner is still resolving it.
    pub aliased: Option<TypeId>,
    pub modifiers: Modifiers,
}

/// A class or struct; `is_class` selects the keyword.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassUdt {
    pub udt: UdtInfo,
    pub scope: Scope,
    pub layout: Layout,
    pub superclass: Option<TypeId>,
    pub is_class: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct UnionUdt {
    pub udt: UdtInfo,
    pub scope: Scope,
    pub layout: Layout,
}

/// One enumerator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        EnumMember {
            name: name.into(),
            value,
        }
    }
}

/// A data member of a class, struct or union.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    /// Empty for an anonymous member (`struct { ... };` inside a union).
    pub name: String,
    pub ty: TypeId,
    /// Byte offset from the start of the enclosing type.
    pub offset: u64,
    /// Bit width, `0` when not a bitfield.
    pub bit_field: u32,
    pub is_static: bool,
    pub modifiers: Modifiers,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeId, offset: u64) -> Self {
        Field {
            name: name.into(),
            ty,
            offset,
            bit_field: 0,
            is_static: false,
            modifiers: Modifiers::none(),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_bit_field(mut self, width: u32) -> Self {
        self.bit_field = width;
        self
    }

    #[must_use]
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// Discriminant of [`TypeKind`], used in merge keys.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum SymbolKind {
    Base,
    Namespace,
    Enum,
    Typedef,
    Class,
    Union,
}

impl SymbolKind {
    /// Source keyword for composite kinds; empty for base types and typedefs.
    ///
    /// Classes are distinguished from structs by the node itself, see
    /// [`Type::kind_name`].
    pub fn name(self) -> &'static str {
        match self {
            SymbolKind::Base | SymbolKind::Typedef => "",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Enum => "enum",
            SymbolKind::Class => "struct",
            SymbolKind::Union => "union",
        }
    }
}

impl Type {
    fn with_kind(name: impl Into<String>, size: u64, kind: TypeKind) -> Self {
        Type {
            name: name.into(),
            size,
            excluded: false,
            opaque: false,
            kind,
        }
    }

    /// A built-in type such as `int` or `void`.
    pub fn base(name: impl Into<String>, size: u64) -> Self {
        Self::with_kind(name, size, TypeKind::Base)
    }

    pub fn namespace(name: impl Into<String>) -> Self {
        Self::with_kind(name, 0, TypeKind::Namespace(NamespaceUdt::default()))
    }

    pub fn enumeration(name: impl Into<String>, size: u64, members: Vec<EnumMember>) -> Self {
        let udt = EnumUdt {
            members,
            ..EnumUdt::default()
        };
        Self::with_kind(name, size, TypeKind::Enum(udt))
    }

    /// A typedef of `aliased`; the size is left for the IR to derive.
    pub fn typedef(name: impl Into<String>, aliased: TypeId, modifiers: Modifiers) -> Self {
        let udt = TypedefUdt {
            aliased: Some(aliased),
            modifiers,
            ..TypedefUdt::default()
        };
        Self::with_kind(name, 0, TypeKind::Typedef(udt))
    }

    /// A complete `struct`.
    pub fn structure(name: impl Into<String>, size: u64, fields: Vec<Field>) -> Self {
        Self::class_like(name, size, fields, false)
    }

    /// A complete `class`.
    pub fn class(name: impl Into<String>, size: u64, fields: Vec<Field>) -> Self {
        Self::class_like(name, size, fields, true)
    }

    fn class_like(name: impl Into<String>, size: u64, fields: Vec<Field>, is_class: bool) -> Self {
        let udt = ClassUdt {
            layout: Layout {
                fields,
                complete: true,
            },
            is_class,
            ..ClassUdt::default()
        };
        Self::with_kind(name, size, TypeKind::Class(udt))
    }

    /// A forward-declared `struct` with no layout yet.
    pub fn forward_struct(name: impl Into<String>) -> Self {
        Self::with_kind(name, 0, TypeKind::Class(ClassUdt::default()))
    }

    pub fn union(name: impl Into<String>, size: u64, fields: Vec<Field>) -> Self {
        let udt = UnionUdt {
            layout: Layout {
                fields,
                complete: true,
            },
            ..UnionUdt::default()
        };
        Self::with_kind(name, size, TypeKind::Union(udt))
    }

    #[must_use]
    pub fn with_superclass(mut self, superclass: TypeId) -> Self {
        if let TypeKind::Class(class) = &mut self.kind {
            class.superclass = Some(superclass);
        }
        self
    }

    #[must_use]
    pub fn with_line(mut self, line_number: u32) -> Self {
        if let Some(udt) = self.udt_mut() {
            udt.line_number = line_number;
        }
        self
    }

    #[must_use]
    pub fn with_macro(mut self, m: Macro) -> Self {
        if let Some(scope) = self.scope_mut() {
            scope.macros.push(m);
        }
        self
    }

    /// Add an enumerator; namespace-like types hoist it into their scope.
    #[must_use]
    pub fn with_enum_member(mut self, member: EnumMember) -> Self {
        match &mut self.kind {
            TypeKind::Enum(e) => e.members.push(member),
            TypeKind::Namespace(NamespaceUdt { scope, .. })
            | TypeKind::Class(ClassUdt { scope, .. })
            | TypeKind::Union(UnionUdt { scope, .. }) => scope.enum_members.push(member),
            TypeKind::Base | TypeKind::Typedef(_) => {}
        }
        self
    }

    #[must_use]
    pub fn mark_opaque(mut self) -> Self {
        self.opaque = true;
        self
    }

    #[must_use]
    pub fn mark_excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn symbol_kind(&self) -> SymbolKind {
        match self.kind {
            TypeKind::Base => SymbolKind::Base,
            TypeKind::Namespace(_) => SymbolKind::Namespace,
            TypeKind::Enum(_) => SymbolKind::Enum,
            TypeKind::Typedef(_) => SymbolKind::Typedef,
            TypeKind::Class(_) => SymbolKind::Class,
            TypeKind::Union(_) => SymbolKind::Union,
        }
    }

    /// Source keyword (`"struct"`, `"class"`, `"union"`, ...), empty for
    /// base types and typedefs.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::Class(class) if class.is_class => "class",
            _ => self.symbol_kind().name(),
        }
    }

    /// Whether this is a class, struct or union.
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_) | TypeKind::Union(_))
    }

    pub fn udt(&self) -> Option<&UdtInfo> {
        match &self.kind {
            TypeKind::Base => None,
            TypeKind::Namespace(NamespaceUdt { udt, .. })
            | TypeKind::Enum(EnumUdt { udt, .. })
            | TypeKind::Typedef(TypedefUdt { udt, .. })
            | TypeKind::Class(ClassUdt { udt, .. })
            | TypeKind::Union(UnionUdt { udt, .. }) => Some(udt),
        }
    }

    pub fn udt_mut(&mut self) -> Option<&mut UdtInfo> {
        match &mut self.kind {
            TypeKind::Base => None,
            TypeKind::Namespace(NamespaceUdt { udt, .. })
            | TypeKind::Enum(EnumUdt { udt, .. })
            | TypeKind::Typedef(TypedefUdt { udt, .. })
            | TypeKind::Class(ClassUdt { udt, .. })
            | TypeKind::Union(UnionUdt { udt, .. }) => Some(udt),
        }
    }

    /// Enclosing namespace or class.
    #[inline]
    pub fn outer(&self) -> Option<TypeId> {
        self.udt().and_then(|udt| udt.outer)
    }

    pub fn scope(&self) -> Option<&Scope> {
        match &self.kind {
            TypeKind::Namespace(NamespaceUdt { scope, .. })
            | TypeKind::Class(ClassUdt { scope, .. })
            | TypeKind::Union(UnionUdt { scope, .. }) => Some(scope),
            TypeKind::Base | TypeKind::Enum(_) | TypeKind::Typedef(_) => None,
        }
    }

    pub fn scope_mut(&mut self) -> Option<&mut Scope> {
        match &mut self.kind {
            TypeKind::Namespace(NamespaceUdt { scope, .. })
            | TypeKind::Class(ClassUdt { scope, .. })
            | TypeKind::Union(UnionUdt { scope, .. }) => Some(scope),
            TypeKind::Base | TypeKind::Enum(_) | TypeKind::Typedef(_) => None,
        }
    }

    pub fn layout(&self) -> Option<&Layout> {
        match &self.kind {
            TypeKind::Class(ClassUdt { layout, .. }) | TypeKind::Union(UnionUdt { layout, .. }) => {
                Some(layout)
            }
            _ => None,
        }
    }

    pub fn layout_mut(&mut self) -> Option<&mut Layout> {
        match &mut self.kind {
            TypeKind::Class(ClassUdt { layout, .. }) | TypeKind::Union(UnionUdt { layout, .. }) => {
                Some(layout)
            }
            _ => None,
        }
    }

    /// Enumerators: an enum's own members or a scope's hoisted ones.
    pub fn enum_members(&self) -> &[EnumMember] {
        match &self.kind {
            TypeKind::Enum(e) => &e.members,
            _ => self.scope().map_or(&[], |scope| &scope.enum_members),
        }
    }

    pub fn macros(&self) -> &[Macro] {
        self.scope().map_or(&[], |scope| &scope.macros)
    }

    pub fn superclass(&self) -> Option<TypeId> {
        match &self.kind {
            TypeKind::Class(class) => class.superclass,
            _ => None,
        }
    }

    /// Aliased type and modifiers of a typedef.
    pub fn alias(&self) -> Option<(TypeId, &Modifiers)> {
        match &self.kind {
            TypeKind::Typedef(TypedefUdt {
                aliased: Some(aliased),
                modifiers,
                ..
            }) => Some((*aliased, modifiers)),
            _ => None,
        }
    }

    /// Complete unless this is a forward-declared composite.
    pub fn is_complete(&self) -> bool {
        self.layout().map_or(true, |layout| layout.complete)
    }

    /// Every non-owning type reference held by this node: alias or
    /// superclass first, then field types in order.
    pub fn refs(&self) -> impl Iterator<Item = TypeId> + '_ {
        let head = match &self.kind {
            TypeKind::Typedef(typedef) => typedef.aliased,
            TypeKind::Class(class) => class.superclass,
            _ => None,
        };
        let fields = self.layout().map_or(&[][..], |layout| &layout.fields);
        head.into_iter().chain(fields.iter().map(|field| field.ty))
    }

    /// Visit every non-owning type reference held by this node.
    pub(crate) fn for_each_ref_mut(&mut self, mut f: impl FnMut(&mut TypeId)) {
        match &mut self.kind {
            TypeKind::Typedef(TypedefUdt {
                aliased: Some(aliased),
                ..
            }) => f(aliased),
            TypeKind::Class(class) => {
                if let Some(superclass) = &mut class.superclass {
                    f(superclass);
                }
                for field in &mut class.layout.fields {
                    f(&mut field.ty);
                }
            }
            TypeKind::Union(union) => {
                for field in &mut union.layout.fields {
                    f(&mut field.ty);
                }
            }
            _ => {}
        }
    }
}
