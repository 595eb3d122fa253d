//! Field type strings as they appear in the blob.

use std::fmt::Write as _;

use ddr_ir::{Field, SymbolIr, TypeKind};

/// Qualified name with `::` rendered as `__`.
pub(crate) fn blob_name(qualified: &str) -> String {
    qualified.replace("::", "__")
}

/// Render the declared type of `field`.
///
/// Qualifiers come first, then the type by kind, then `*` per pointer,
/// `[N]` per array dimension (`[]` when unsized) and `:B` for bitfields.
pub(crate) fn field_type_name(ir: &SymbolIr, field: &Field) -> String {
    let mut out = field.modifiers.modifier_names();
    let ty = ir.get(field.ty);
    match &ty.kind {
        TypeKind::Base => out.push_str(&ty.name),
        TypeKind::Typedef(typedef) => {
            let void_pointer = typedef.modifiers.pointer_count >= 1
                && typedef.aliased.is_some_and(|aliased| ir.get(aliased).name == "void");
            if void_pointer {
                out.push_str("void*");
            } else {
                out.push_str(&ir.full_name(field.ty));
            }
        }
        TypeKind::Namespace(_) | TypeKind::Enum(_) | TypeKind::Class(_) | TypeKind::Union(_) => {
            out.push_str(ty.kind_name());
            let full_name = ir.full_name(field.ty);
            if !full_name.is_empty() {
                out.push(' ');
                out.push_str(&full_name);
            }
        }
    }
    for _ in 0..field.modifiers.pointer_count {
        out.push('*');
    }
    for index in 0..field.modifiers.array_dimensions() {
        match field.modifiers.array_length(index) {
            0 => out.push_str("[]"),
            len => {
                let _ = write!(out, "[{len}]");
            }
        }
    }
    if field.bit_field != 0 {
        let _ = write!(out, ":{}", field.bit_field);
    }
    out
}
