use std::collections::BTreeSet;

use super::*;
use crate::{EnumMember, Field, HasFields, HasSubUdts, Macro, Modifiers, SymbolKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// (qualified name + kind, fields as `name:type:offset`, enumerators)
type Summary = BTreeSet<(String, Vec<String>, Vec<String>)>;

fn summary(ir: &SymbolIr) -> Summary {
    ir.all_udts()
        .into_iter()
        .map(|id| {
            let ty = ir.get(id);
            let fields = ty
                .fields()
                .iter()
                .map(|f| format!("{}:{}:{}", f.name, ir.full_name(f.ty), f.offset))
                .collect();
            let members = ty.enum_members().iter().map(|m| m.name.clone()).collect();
            (format!("{} {}", ty.kind_name(), ir.full_name(id)), fields, members)
        })
        .collect()
}

fn merged(units: Vec<SymbolIr>) -> Result<SymbolIr> {
    let mut aggregate = SymbolIr::new();
    for unit in units {
        aggregate.merge_ir(unit)?;
    }
    Ok(aggregate)
}

fn field_type_name(ir: &SymbolIr, owner: &str, field: &str) -> String {
    let Some(id) = ir.find(owner, SymbolKind::Class) else {
        panic!("{owner} missing");
    };
    let Some(f) = ir.get(id).fields().iter().find(|f| f.name == field) else {
        panic!("{owner}.{field} missing");
    };
    ir.full_name(f.ty)
}

fn point_unit(fields: &[(&str, u64)]) -> SymbolIr {
    let mut ir = SymbolIr::new();
    let int = ir.add_type(Type::base("int", 4));
    let fields = fields
        .iter()
        .map(|&(name, offset)| Field::new(name, int, offset))
        .collect();
    ir.add_type(Type::structure("Point", 8, fields));
    ir
}

#[test]
fn new_types_are_moved_and_relinked() {
    let mut a = SymbolIr::new();
    a.add_type(Type::base("char", 1));
    let b = point_unit(&[("x", 0), ("y", 4)]);

    let ir = merged(vec![a, b]).unwrap_or_else(|e| panic!("{e}"));
    assert!(ir.is_aggregate());
    assert_eq!(ir.types().len(), 3);
    let point = ir.find("Point", SymbolKind::Class);
    let int = ir.find("int", SymbolKind::Base);
    assert!(point.is_some() && int.is_some());
    let point = point.unwrap_or_else(|| unreachable!());
    assert!(ir.get(point).fields().iter().all(|f| Some(f.ty) == int));
}

#[test]
fn known_types_gain_missing_fields() {
    let ir = merged(vec![point_unit(&[("x", 0)]), point_unit(&[("x", 0), ("y", 4)])])
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(ir.types().len(), 2);
    assert_eq!(field_type_name(&ir, "Point", "y"), "int");
    let names: Vec<_> = ir
        .find("Point", SymbolKind::Class)
        .map(|id| ir.get(id).fields().iter().map(|f| f.name.clone()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["x", "y"]);
}

#[test]
fn first_seen_field_wins() {
    let ir = merged(vec![point_unit(&[("x", 0)]), point_unit(&[("x", 4)])])
        .unwrap_or_else(|e| panic!("{e}"));
    let point = ir
        .find("Point", SymbolKind::Class)
        .unwrap_or_else(|| panic!("Point missing"));
    assert_eq!(ir.get(point).fields()[0].offset, 0);
    assert_eq!(ir.get(point).fields().len(), 1);
}

#[test]
fn forward_declaration_adopts_definition() {
    let mut fwd = SymbolIr::new();
    fwd.add_type(Type::forward_struct("Node"));

    let mut def = SymbolIr::new();
    let base = def.add_type(Type::structure("Base", 4, vec![]));
    let node = def.add_type(Type::forward_struct("Node"));
    *def.get_mut(node) = Type::structure(
        "Node",
        16,
        vec![Field::new("next", node, 8).with_modifiers(Modifiers::pointer(1))],
    )
    .with_superclass(base)
    .with_line(42);

    let ir = merged(vec![fwd, def]).unwrap_or_else(|e| panic!("{e}"));
    let node = ir
        .find("Node", SymbolKind::Class)
        .unwrap_or_else(|| panic!("Node missing"));
    let ty = ir.get(node);
    assert!(ty.is_complete());
    assert_eq!(ty.size, 16);
    assert_eq!(ty.udt().map(|u| u.line_number), Some(42));
    assert_eq!(ty.fields()[0].ty, node);
    assert_eq!(ty.superclass(), ir.find("Base", SymbolKind::Class));
}

#[test]
fn sub_udts_merge_by_qualified_name() {
    let unit = |inner: &str, member: &str| {
        let mut ir = SymbolIr::new();
        let ns = ir.add_type(Type::namespace("omr").with_macro(Macro::new("OMR_X", "1")));
        ir.add_nested(ns, Type::structure(inner, 0, vec![]));
        ir.add_nested(
            ns,
            Type::enumeration("Mode", 4, vec![EnumMember::new(member, 1)]),
        );
        ir
    };
    let ir = merged(vec![unit("A", "ON"), unit("B", "OFF")]).unwrap_or_else(|e| panic!("{e}"));

    let ns = ir
        .find("omr", SymbolKind::Namespace)
        .unwrap_or_else(|| panic!("omr missing"));
    let subs: Vec<String> = ir.get(ns).sub_udts().iter().map(|&s| ir.full_name(s)).collect();
    assert_eq!(subs, ["omr::A", "omr::Mode", "omr::B"]);
    assert_eq!(ir.get(ns).macros().len(), 1);
    let mode = ir
        .find("omr::Mode", SymbolKind::Enum)
        .unwrap_or_else(|| panic!("Mode missing"));
    let members: Vec<&str> = ir.get(mode).enum_members().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(members, ["ON", "OFF"]);
}

#[test]
fn anonymous_member_types_travel_with_their_field() {
    let unit = |with_union: bool| {
        let mut ir = SymbolIr::new();
        let int = ir.add_type(Type::base("int", 4));
        let mut fields = vec![Field::new("tag", int, 0)];
        if with_union {
            let anon = ir.alloc(Type::union("", 4, vec![Field::new("i", int, 0)]));
            fields.push(Field::new("u", anon, 4));
        }
        ir.add_type(Type::structure("Value", 8, fields));
        ir
    };
    // moved with the owner
    let ir = merged(vec![unit(true)]).unwrap_or_else(|e| panic!("{e}"));
    let int = ir.find("int", SymbolKind::Base);
    let value = ir.find("Value", SymbolKind::Class).unwrap_or_else(|| panic!());
    let anon = ir.get(value).fields()[1].ty;
    assert!(ir.get(anon).is_anonymous());
    assert_eq!(Some(ir.get(anon).fields()[0].ty), int);

    // appended to an existing owner
    let ir = merged(vec![unit(false), unit(true)]).unwrap_or_else(|e| panic!("{e}"));
    let int = ir.find("int", SymbolKind::Base);
    let value = ir.find("Value", SymbolKind::Class).unwrap_or_else(|| panic!());
    let anon = ir.get(value).fields()[1].ty;
    assert!(ir.get(anon).is_anonymous());
    assert_eq!(Some(ir.get(anon).fields()[0].ty), int);
}

#[test]
fn namespace_gains_anonymous_sub_udts_in_either_order() {
    let plain = || {
        let mut ir = SymbolIr::new();
        ir.add_type(Type::namespace("ns"));
        ir
    };
    let flagged = || {
        let mut ir = SymbolIr::new();
        let ns = ir.add_type(Type::namespace("ns"));
        ir.add_nested(
            ns,
            Type::enumeration("", 4, vec![EnumMember::new("NS_FLAG", 1)]),
        );
        ir
    };
    for units in [vec![plain(), flagged()], vec![flagged(), plain()]] {
        let ir = merged(units).unwrap_or_else(|e| panic!("{e}"));
        let ns = ir
            .find("ns", SymbolKind::Namespace)
            .unwrap_or_else(|| panic!("ns missing"));
        let subs = ir.get(ns).sub_udts();
        assert_eq!(subs.len(), 1);
        let flag = ir.get(subs[0]);
        assert_eq!(flag.outer(), Some(ns));
        assert_eq!(flag.enum_members()[0].name, "NS_FLAG");
    }
}

#[test]
fn forward_declaration_keeps_anonymous_sub_udts_of_definition() {
    let mut fwd = SymbolIr::new();
    fwd.add_type(Type::forward_struct("S"));
    let definition = || {
        let mut ir = SymbolIr::new();
        let int = ir.add_type(Type::base("int", 4));
        let s = ir.add_type(Type::structure("S", 4, vec![Field::new("x", int, 0)]));
        ir.add_nested(
            s,
            Type::enumeration("", 4, vec![EnumMember::new("S_ON", 1)]),
        );
        ir
    };

    let ir = merged(vec![fwd, definition(), definition()]).unwrap_or_else(|e| panic!("{e}"));
    let s = ir
        .find("S", SymbolKind::Class)
        .unwrap_or_else(|| panic!("S missing"));
    assert!(ir.get(s).is_complete());
    let subs = ir.get(s).sub_udts();
    assert_eq!(subs.len(), 1, "a later unit pairs with the known anonymous enum");
    assert_eq!(ir.get(subs[0]).outer(), Some(s));
    let members: Vec<&str> = ir.get(subs[0]).enum_members().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(members, ["S_ON"]);
}

#[test]
fn superclass_cycle_is_rejected() {
    let mut unit = SymbolIr::new();
    let c = unit.add_type(Type::class("Loop", 0, vec![]));
    if let TypeKind::Class(class) = &mut unit.get_mut(c).kind {
        class.superclass = Some(c);
    }
    let err = merged(vec![unit]).err();
    assert!(matches!(err, Some(IrError::MergeCycle { ref name }) if name == "Loop"));
}

#[test]
fn unresolvable_reference_is_rejected() {
    let mut unit = SymbolIr::new();
    let ghost = unit.alloc(Type::base("ghost_t", 4));
    unit.add_type(Type::structure("Haunted", 4, vec![Field::new("g", ghost, 0)]));
    let err = merged(vec![unit]).err();
    assert!(matches!(
        err,
        Some(IrError::MergeResolution { ref referrer, ref target })
            if referrer == "Haunted" && target == "ghost_t"
    ));
}

#[test]
fn self_referential_struct_merges() {
    let unit = || {
        let mut ir = SymbolIr::new();
        let node = ir.add_type(Type::forward_struct("Node"));
        *ir.get_mut(node) = Type::structure(
            "Node",
            8,
            vec![Field::new("next", node, 0).with_modifiers(Modifiers::pointer(1))],
        );
        ir
    };
    let ir = merged(vec![unit(), unit()]).unwrap_or_else(|e| panic!("{e}"));
    let node = ir.find("Node", SymbolKind::Class).unwrap_or_else(|| panic!());
    assert_eq!(ir.get(node).fields()[0].ty, node);
    assert!(ir.structurally_equal(node, node));
}

#[test]
fn merging_the_same_unit_twice_changes_nothing() {
    let once = merged(vec![point_unit(&[("x", 0), ("y", 4)])]).unwrap_or_else(|e| panic!("{e}"));
    let mut twice = once.clone();
    twice
        .merge_ir(point_unit(&[("x", 0), ("y", 4)]))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(summary(&once), summary(&twice));
    assert_eq!(once.arena().len(), twice.arena().len());
}

/// Five fixed struct shapes; a unit declares any subset of them, always
/// with the same shape.
fn unit_from(selection: &[bool]) -> SymbolIr {
    let mut ir = SymbolIr::new();
    let int = ir.add_type(Type::base("int", 4));
    let ns = ir.add_type(Type::namespace("ns"));
    for (i, _) in selection.iter().enumerate().filter(|&(_, &on)| on) {
        let name = format!("S{i}");
        let fields = vec![Field::new("a", int, 0), Field::new(format!("f{i}"), int, 4)];
        let ty = Type::structure(name, 8, fields);
        let id = if i % 2 == 0 {
            ir.add_nested(ns, ty)
        } else {
            ir.add_type(ty)
        };
        if i == 3 {
            ir.add_nested(id, Type::enumeration("Kind", 4, vec![EnumMember::new("K3", 3)]));
        }
    }
    ir
}

proptest! {
    #[test]
    fn merge_is_content_commutative(
        a in proptest::collection::vec(any::<bool>(), 5),
        b in proptest::collection::vec(any::<bool>(), 5),
    ) {
        let ab = merged(vec![unit_from(&a), unit_from(&b)]);
        let ba = merged(vec![unit_from(&b), unit_from(&a)]);
        prop_assert!(ab.is_ok() && ba.is_ok());
        let (ab, ba) = (ab.unwrap_or_default(), ba.unwrap_or_default());
        prop_assert_eq!(summary(&ab), summary(&ba));
    }

    #[test]
    fn merge_is_idempotent(a in proptest::collection::vec(any::<bool>(), 5)) {
        let once = merged(vec![unit_from(&a)]).unwrap_or_default();
        let twice = merged(vec![unit_from(&a), unit_from(&a)]).unwrap_or_default();
        prop_assert_eq!(summary(&once), summary(&twice));
        prop_assert_eq!(once.arena().len(), twice.arena().len());
    }
}
