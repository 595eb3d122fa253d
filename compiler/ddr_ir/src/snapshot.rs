//! Binary snapshots of a raw Symbol IR, one per compilation unit.
//!
//! A scanner writes a snapshot per unit; the driver decodes each one and
//! merges it. The key index is not stored.
//!
//! Decoding checks the graph before handing it out: every handle must name
//! a stored node, and scope ownership must form a forest.

use std::fs;
use std::path::Path;

use crate::{HasSubUdts, IrError, Result, SymbolIr, TypeId};

/// Serialize an IR.
pub fn encode(ir: &SymbolIr) -> Result<Vec<u8>> {
    Ok(bincode::serialize(ir)?)
}

/// Deserialize an IR. The result is raw, whatever it was when encoded.
pub fn decode(bytes: &[u8]) -> Result<SymbolIr> {
    let ir: SymbolIr = bincode::deserialize(bytes)?;
    validate(&ir)?;
    Ok(ir)
}

fn invalid(reason: String) -> IrError {
    IrError::InvalidSnapshot { reason }
}

fn validate(ir: &SymbolIr) -> Result<()> {
    let arena = ir.arena();
    let len = arena.len();
    let check = |from: &dyn std::fmt::Display, id: TypeId| {
        if id.index() < len {
            Ok(())
        } else {
            Err(invalid(format!(
                "{from} refers to {id}, but only {len} types are stored"
            )))
        }
    };

    let mut owners = vec![0u32; len];
    let mut nested = vec![false; len];
    for &id in ir.types() {
        check(&"the top-level list", id)?;
        owners[id.index()] += 1;
    }
    for (id, ty) in arena.iter() {
        for target in ty.refs().chain(ty.outer()) {
            check(&id, target)?;
        }
        for &sub in ty.sub_udts() {
            check(&id, sub)?;
            owners[sub.index()] += 1;
            nested[sub.index()] = true;
        }
    }
    if let Some(index) = owners.iter().position(|&count| count > 1) {
        return Err(invalid(format!("type #{index} has more than one owner")));
    }

    // nodes no root reaches sit on an ownership cycle
    let mut reached = vec![false; len];
    let mut stack: Vec<TypeId> = arena
        .iter()
        .map(|(id, _)| id)
        .filter(|id| !nested[id.index()])
        .collect();
    while let Some(id) = stack.pop() {
        reached[id.index()] = true;
        stack.extend(arena[id].sub_udts().iter().copied());
    }
    match reached.iter().position(|&seen| !seen) {
        Some(index) => Err(invalid(format!("type #{index} is part of an ownership cycle"))),
        None => Ok(()),
    }
}

pub fn read(path: &Path) -> Result<SymbolIr> {
    let bytes = fs::read(path).map_err(|source| IrError::io(path, source))?;
    decode(&bytes)
}

pub fn write(ir: &SymbolIr, path: &Path) -> Result<()> {
    let bytes = encode(ir)?;
    fs::write(path, bytes).map_err(|source| IrError::io(path, source))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests {
    use super::*;
    use crate::{Field, Modifiers, Type};

    #[test]
    fn test_snapshot_preserves_graph() {
        let mut ir = SymbolIr::new();
        let int = ir.add_type(Type::base("int", 4));
        let node = ir.add_type(Type::forward_struct("Node"));
        *ir.get_mut(node) = Type::structure(
            "Node",
            16,
            vec![
                Field::new("value", int, 0),
                Field::new("next", node, 8).with_modifiers(Modifiers::pointer(1)),
            ],
        );
        ir.ensure_index();

        let bytes = encode(&ir).unwrap();
        let back = decode(&bytes).unwrap();
        assert!(!back.is_aggregate());
        assert_eq!(back.types(), ir.types());
        assert!(back.structurally_equal_in(node, &ir, node));
    }

    #[test]
    fn test_file_roundtrip_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.ddrir");
        let mut ir = SymbolIr::new();
        ir.add_type(Type::base("char", 1));
        write(&ir, &path).unwrap();
        assert_eq!(read(&path).unwrap().types().len(), 1);

        assert!(matches!(read(&dir.path().join("missing")), Err(IrError::Io { .. })));
        assert!(matches!(decode(&[0xFF; 3]), Err(IrError::Snapshot { .. })));
    }

    fn decode_err(ir: &SymbolIr) -> String {
        match decode(&encode(ir).unwrap()) {
            Err(IrError::InvalidSnapshot { reason }) => reason,
            other => panic!("expected an invalid snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_dangling_handles_are_rejected() {
        let mut ir = SymbolIr::new();
        let ns = ir.add_type(Type::namespace("ns"));
        if let Some(scope) = ir.get_mut(ns).scope_mut() {
            scope.sub_udts.push(TypeId::new(99));
        }
        assert_eq!(
            decode_err(&ir),
            "#0 refers to #99, but only 1 types are stored"
        );

        let mut ir = SymbolIr::new();
        ir.add_type(Type::structure("S", 4, vec![Field::new("x", TypeId::new(7), 0)]));
        assert!(decode_err(&ir).contains("#7"));
    }

    #[test]
    fn test_ownership_cycles_are_rejected() {
        let mut ir = SymbolIr::new();
        let a = ir.alloc(Type::namespace("a"));
        let b = ir.add_nested(a, Type::namespace("b"));
        if let Some(scope) = ir.get_mut(b).scope_mut() {
            scope.sub_udts.push(a);
        }
        assert!(decode_err(&ir).contains("ownership cycle"));

        let mut ir = SymbolIr::new();
        let a = ir.add_type(Type::namespace("a"));
        let b = ir.add_type(Type::namespace("b"));
        if let Some(scope) = ir.get_mut(b).scope_mut() {
            scope.sub_udts.push(a);
        }
        assert_eq!(decode_err(&ir), "type #0 has more than one owner");
    }
}
