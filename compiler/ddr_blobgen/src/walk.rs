//! Entry walk shared by both generators.
//!
//! An entry is one named, non-excluded namespace, enum, class or union.
//! Its members arrive in output order:
//!
//! 1. fields, with anonymous by-value composites flattened in place
//! 2. enum-member constants hoisted into its scope
//! 3. integer-valued macros
//! 4. members of anonymous sub-UDTs that no field uses
//!
//! Sinks that set [`MemberSink::ENUM_MEMBERS_FIRST`] get step 2 before step 1,
//! at every flattening level.
//!
//! Named sub-UDTs become entries of their own after their owner.

use ddr_ir::visitor::{walk_ir, walk_type};
use ddr_ir::{
    ClassUdt, EnumUdt, Field, NamespaceUdt, Scope, SymbolIr, Type, TypeId, TypeKind, TypeVisitor,
    UnionUdt,
};

/// Receives the members of the entry being walked.
pub(crate) trait MemberSink<'ir> {
    /// Hoisted enum members come before the fields instead of after them.
    const ENUM_MEMBERS_FIRST: bool = false;

    /// A field; `path` is the dotted prefix of the anonymous types it was
    /// flattened out of, and `offset` already includes their offsets.
    fn field(&mut self, ir: &'ir SymbolIr, path: &str, offset: u64, field: &'ir Field);

    fn constant(&mut self, name: &'ir str, value: i64);
}

/// Receives entry boundaries as well as members.
pub(crate) trait EntrySink<'ir>: MemberSink<'ir> {
    fn begin_entry(&mut self, ir: &'ir SymbolIr, id: TypeId, ty: &'ir Type);

    fn end_entry(&mut self, ir: &'ir SymbolIr, id: TypeId, ty: &'ir Type);
}

/// Walk every entry of `ir` into `sink`.
pub(crate) fn walk_entries<'ir, S: EntrySink<'ir>>(ir: &'ir SymbolIr, sink: &mut S) {
    let mut walker = EntryWalker { sink };
    walk_ir(&mut walker, ir);
}

struct EntryWalker<'s, S> {
    sink: &'s mut S,
}

impl<'ir, S: EntrySink<'ir>> EntryWalker<'_, S> {
    fn entry(
        &mut self,
        id: TypeId,
        ty: &'ir Type,
        scope: &'ir Scope,
        fields: &'ir [Field],
        ir: &'ir SymbolIr,
    ) {
        self.sink.begin_entry(ir, id, ty);
        Flattener::new(ir, &mut *self.sink, id).members(scope, fields, "", 0);
        self.sink.end_entry(ir, id, ty);
        for &sub in &scope.sub_udts {
            self.visit_type(sub, ir);
        }
    }
}

impl<'ir, S: EntrySink<'ir>> TypeVisitor<'ir> for EntryWalker<'_, S> {
    fn visit_type(&mut self, id: TypeId, ir: &'ir SymbolIr) {
        let ty = ir.get(id);
        if ty.excluded {
            tracing::trace!(name = %ty.name, "skipping excluded type");
            return;
        }
        // anonymous types only ever contribute to a named owner
        if ty.is_anonymous() {
            return;
        }
        walk_type(self, id, ir);
    }

    fn visit_namespace(&mut self, id: TypeId, ty: &'ir Type, ns: &'ir NamespaceUdt, ir: &'ir SymbolIr) {
        self.entry(id, ty, &ns.scope, &[], ir);
    }

    fn visit_enum(&mut self, id: TypeId, ty: &'ir Type, e: &'ir EnumUdt, ir: &'ir SymbolIr) {
        self.sink.begin_entry(ir, id, ty);
        for member in &e.members {
            self.sink.constant(&member.name, member.value);
        }
        self.sink.end_entry(ir, id, ty);
    }

    fn visit_class(&mut self, id: TypeId, ty: &'ir Type, class: &'ir ClassUdt, ir: &'ir SymbolIr) {
        self.entry(id, ty, &class.scope, &class.layout.fields, ir);
    }

    fn visit_union(&mut self, id: TypeId, ty: &'ir Type, union: &'ir UnionUdt, ir: &'ir SymbolIr) {
        self.entry(id, ty, &union.scope, &union.layout.fields, ir);
    }
}

/// Emits the members of one entry, descending into anonymous types.
///
/// The stack holds the types currently being flattened; a type that would
/// contain itself by value is emitted as a plain field instead.
struct Flattener<'a, 'ir, S> {
    ir: &'ir SymbolIr,
    sink: &'a mut S,
    stack: Vec<TypeId>,
}

impl<'a, 'ir, S: MemberSink<'ir>> Flattener<'a, 'ir, S> {
    fn new(ir: &'ir SymbolIr, sink: &'a mut S, owner: TypeId) -> Self {
        Flattener {
            ir,
            sink,
            stack: vec![owner],
        }
    }

    fn members(&mut self, scope: &'ir Scope, fields: &'ir [Field], path: &str, base: u64) {
        if S::ENUM_MEMBERS_FIRST {
            self.enum_members(scope);
        }
        for field in fields {
            self.field(field, path, base);
        }
        if !S::ENUM_MEMBERS_FIRST {
            self.enum_members(scope);
        }
        for m in &scope.macros {
            if let Some(value) = m.numeric() {
                self.sink.constant(&m.name, value);
            }
        }
        for &sub in &scope.sub_udts {
            let ty = self.ir.get(sub);
            if ty.is_anonymous() && !ty.excluded && !fields.iter().any(|f| f.ty == sub) {
                self.flatten(sub, path, base);
            }
        }
    }

    fn enum_members(&mut self, scope: &'ir Scope) {
        for member in &scope.enum_members {
            self.sink.constant(&member.name, member.value);
        }
    }

    fn field(&mut self, field: &'ir Field, path: &str, base: u64) {
        if field.is_static {
            return;
        }
        let offset = base.saturating_add(field.offset);
        if self.flattens(field) {
            let nested = if field.name.is_empty() {
                path.to_owned()
            } else {
                format!("{path}{}.", field.name)
            };
            self.flatten(field.ty, &nested, offset);
        } else {
            self.sink.field(self.ir, path, offset, field);
        }
    }

    /// Whether `field` holds an anonymous enum, struct or union by value.
    fn flattens(&self, field: &Field) -> bool {
        let ty = self.ir.get(field.ty);
        ty.is_anonymous()
            && field.modifiers.pointer_count == 0
            && field.modifiers.reference_count == 0
            && !field.modifiers.is_array()
            && matches!(ty.kind, TypeKind::Enum(_) | TypeKind::Class(_) | TypeKind::Union(_))
            && !self.stack.contains(&field.ty)
    }

    fn flatten(&mut self, id: TypeId, path: &str, base: u64) {
        if self.stack.contains(&id) {
            return;
        }
        self.stack.push(id);
        let ir = self.ir;
        match &ir.get(id).kind {
            TypeKind::Class(class) => self.members(&class.scope, &class.layout.fields, path, base),
            TypeKind::Union(union) => self.members(&union.scope, &union.layout.fields, path, base),
            TypeKind::Namespace(ns) => self.members(&ns.scope, &[], path, base),
            TypeKind::Enum(e) => {
                for member in &e.members {
                    self.sink.constant(&member.name, member.value);
                }
            }
            TypeKind::Base | TypeKind::Typedef(_) => {}
        }
        self.stack.pop();
    }
}
