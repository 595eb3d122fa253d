use super::*;
use crate::{EnumMember, Modifiers, Type};

fn node_list(ir: &mut SymbolIr, name: &str) -> TypeId {
    let node = ir.add_type(Type::forward_struct(name));
    *ir.get_mut(node) = Type::structure(
        name,
        8,
        vec![Field::new("next", node, 0).with_modifiers(Modifiers::pointer(1))],
    );
    node
}

#[test]
fn self_referential_struct_equals_itself() {
    let mut ir = SymbolIr::new();
    let node = node_list(&mut ir, "Node");
    assert!(ir.structurally_equal(node, node));

    let mut other = SymbolIr::new();
    let copy = node_list(&mut other, "Node");
    assert!(ir.structurally_equal_in(node, &other, copy));
}

#[test]
fn duplicate_declarations_compare_equal() {
    let mut ir = SymbolIr::new();
    let a = node_list(&mut ir, "Node");
    let b = node_list(&mut ir, "Node");
    assert_ne!(a, b);
    assert!(ir.structurally_equal(a, b));
}

#[test]
fn differing_fields_are_unequal() {
    let mut ir = SymbolIr::new();
    let int = ir.add_type(Type::base("int", 4));
    let a = ir.add_type(Type::structure("P", 4, vec![Field::new("x", int, 0)]));
    let b = ir.add_type(Type::structure("P", 4, vec![Field::new("y", int, 0)]));
    let c = ir.add_type(Type::structure("P", 4, vec![Field::new("x", int, 0).with_bit_field(3)]));
    assert!(!ir.structurally_equal(a, b));
    assert!(!ir.structurally_equal(a, c));
}

#[test]
fn kind_and_name_must_match() {
    let mut ir = SymbolIr::new();
    let s = ir.add_type(Type::structure("X", 0, vec![]));
    let u = ir.add_type(Type::union("X", 0, vec![]));
    let c = ir.add_type(Type::class("X", 0, vec![]));
    let y = ir.add_type(Type::structure("Y", 0, vec![]));
    assert!(!ir.structurally_equal(s, u));
    assert!(!ir.structurally_equal(s, c));
    assert!(!ir.structurally_equal(s, y));
}

#[test]
fn enums_compare_members() {
    let mut ir = SymbolIr::new();
    let a = ir.add_type(Type::enumeration("E", 4, vec![EnumMember::new("A", 1)]));
    let b = ir.add_type(Type::enumeration("E", 4, vec![EnumMember::new("A", 1)]));
    let c = ir.add_type(Type::enumeration("E", 4, vec![EnumMember::new("A", 2)]));
    assert!(ir.structurally_equal(a, b));
    assert!(!ir.structurally_equal(a, c));
}

#[test]
fn mutually_aliasing_typedefs_terminate() {
    let mut ir = SymbolIr::new();
    let int = ir.add_type(Type::base("int", 4));
    let a = ir.new_typedef("A", int, Modifiers::none());
    let b = ir.new_typedef("B", a, Modifiers::none());
    if let TypeKind::Typedef(typedef) = &mut ir.get_mut(a).kind {
        typedef.aliased = Some(b);
    }
    assert!(ir.structurally_equal(a, a));
    assert!(!ir.structurally_equal(a, b));
}
