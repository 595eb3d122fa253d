use super::*;
use crate::{Field, HasSubUdts};
use pretty_assertions::assert_eq;

#[test]
fn full_name_joins_enclosing_scopes() {
    let mut ir = SymbolIr::new();
    let ns = ir.add_type(Type::namespace("omr"));
    let outer = ir.add_nested(ns, Type::class("Heap", 0, vec![]));
    let inner = ir.add_nested(outer, Type::structure("Region", 0, vec![]));
    assert_eq!(ir.full_name(inner), "omr::Heap::Region");
    assert_eq!(ir.full_name(ns), "omr");
    assert_eq!(ir.get(outer).sub_udts(), [inner]);
}

#[test]
fn full_name_survives_outer_cycle() {
    let mut ir = SymbolIr::new();
    let a = ir.add_type(Type::namespace("A"));
    let b = ir.add_nested(a, Type::namespace("B"));
    // corrupt: A claims to be nested in B
    if let Some(udt) = ir.get_mut(a).udt_mut() {
        udt.outer = Some(b);
    }
    assert_eq!(ir.full_name(b), "A::B");
}

#[test]
fn anonymous_types_have_no_key() {
    let mut ir = SymbolIr::new();
    let anon = ir.alloc(Type::structure("", 4, vec![]));
    assert_eq!(ir.full_name(anon), "");
    assert_eq!(ir.key(anon), None);
    assert!(ir.types().is_empty());
    assert!(ir.all_udts().is_empty());
}

#[test]
fn all_udts_is_preorder_over_ownership() {
    let mut ir = SymbolIr::new();
    let int = ir.add_type(Type::base("int", 4));
    let ns = ir.add_type(Type::namespace("N"));
    let s = ir.add_nested(ns, Type::structure("S", 4, vec![Field::new("i", int, 0)]));
    let e = ir.add_nested(s, Type::enumeration("E", 4, vec![]));
    let t = ir.add_type(Type::structure("T", 0, vec![]));
    assert_eq!(ir.all_udts(), [int, ns, s, e, t]);
}

#[test]
fn find_with_and_without_index() {
    let mut ir = SymbolIr::new();
    let ns = ir.add_type(Type::namespace("N"));
    let s = ir.add_nested(ns, Type::structure("S", 0, vec![]));
    ir.add_type(Type::enumeration("N::S", 4, vec![]));

    assert!(!ir.is_aggregate());
    assert_eq!(ir.find("N::S", SymbolKind::Class), Some(s));
    assert_eq!(ir.find("N::S", SymbolKind::Union), None);

    ir.ensure_index();
    assert!(ir.is_aggregate());
    assert_eq!(ir.find("N::S", SymbolKind::Class), Some(s));
    let late = ir.add_nested(ns, Type::union("U", 4, vec![]));
    assert_eq!(ir.find("N::U", SymbolKind::Union), Some(late));
    assert_eq!(ir.find_by_name("N::S"), Some(s));
    assert_eq!(ir.find_by_name("S"), None);
}

#[test]
fn index_keeps_first_declaration() {
    let mut ir = SymbolIr::new();
    let first = ir.add_type(Type::structure("Dup", 4, vec![]));
    ir.add_type(Type::structure("Dup", 8, vec![]));
    ir.ensure_index();
    assert_eq!(ir.find("Dup", SymbolKind::Class), Some(first));
}

#[test]
fn typedef_size_follows_alias_and_modifiers() {
    let mut ir = SymbolIr::new();
    let int = ir.add_type(Type::base("int", 4));
    let myint = ir.new_typedef("myint", int, Modifiers::none());
    let arr = ir.new_typedef("quad", myint, Modifiers::array(&[4]));
    let ptr = ir.new_typedef("pint", int, Modifiers::pointer(1));
    assert_eq!(ir.get(myint).size, 4);
    assert_eq!(ir.get(arr).size, 16);
    assert_eq!(ir.get(ptr).size, crate::POINTER_SIZE);
}
