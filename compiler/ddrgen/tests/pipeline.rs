//! End-to-end runs over snapshot files.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use ddr_ir::{snapshot, Field, IrError, Modifiers, SymbolIr, Type, TypeId};
use ddrgen::{run, DriverError, GenConfig};
use pretty_assertions::assert_eq;

fn point_unit() -> SymbolIr {
    let mut ir = SymbolIr::new();
    let int = ir.add_type(Type::base("int", 4));
    let point = ir.add_type(Type::structure(
        "Point",
        8,
        vec![Field::new("x", int, 0), Field::new("y", int, 4)],
    ));
    ir.new_typedef("Point", point, Modifiers::none());
    ir
}

fn line_unit() -> SymbolIr {
    let mut ir = SymbolIr::new();
    let int = ir.add_type(Type::base("int", 4));
    let point = ir.add_type(Type::structure(
        "Point",
        8,
        vec![Field::new("x", int, 0), Field::new("y", int, 4)],
    ));
    ir.add_type(Type::structure(
        "Line",
        16,
        vec![Field::new("start", point, 0), Field::new("end", point, 8)],
    ));
    ir
}

fn write_unit(dir: &Path, name: &str, ir: &SymbolIr) -> PathBuf {
    let path = dir.join(name);
    snapshot::write(ir, &path).unwrap();
    path
}

fn config(dir: &Path, snapshots: Vec<PathBuf>) -> GenConfig {
    GenConfig {
        snapshots,
        blob: Some(dir.join("blob.dat")),
        superset: Some(dir.join("superset.dat")),
        c_limits: false,
        ..GenConfig::default()
    }
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

#[test]
fn point_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let unit = write_unit(dir.path(), "point.ir", &point_unit());
    let config = config(dir.path(), vec![unit]);

    let summary = run(&config).unwrap();
    assert_eq!(summary.units, 1);
    assert_eq!(summary.types, 3);

    let blob = fs::read(dir.path().join("blob.dat")).unwrap();
    assert_eq!(u32_at(&blob, 0), 1, "version");
    assert_eq!(u32_at(&blob, 16), 1, "structure count");
    assert_eq!(u32_at(&blob, 20 + 8), 2, "field count");
    assert_eq!(u32_at(&blob, 20 + 16), 8, "structure size");

    let superset = fs::read_to_string(dir.path().join("superset.dat")).unwrap();
    assert_eq!(
        superset,
        "S|Point|PointPointer|\nF|x|x|I32|int\nF|y|y|I32|int\n"
    );
}

#[test]
fn remerging_a_unit_leaves_the_blob_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let unit = write_unit(dir.path(), "point.ir", &point_unit());

    let once = config(dir.path(), vec![unit.clone()]);
    run(&once).unwrap();
    let first = fs::read(dir.path().join("blob.dat")).unwrap();

    let twice = config(dir.path(), vec![unit.clone(), unit]);
    run(&twice).unwrap();
    let second = fs::read(dir.path().join("blob.dat")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn units_merge_then_overrides_and_macros_apply() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_unit(dir.path(), "point.ir", &point_unit());
    let second = write_unit(dir.path(), "line.ir", &line_unit());
    let overrides = dir.path().join("blob.overrides");
    fs::write(&overrides, "# renamed for the debugger\nddrblob.fieldoverride.Line.end=finish\n").unwrap();
    let macros = dir.path().join("macroList");
    fs::write(&macros, "@DDRFILE_BEGIN point.h\n@TYPE_Point\n@MACRO_POINT_DIM (2)\n@DDRFILE_END\n").unwrap();

    let mut config = config(dir.path(), vec![first, second]);
    config.blob = None;
    config.overrides.push(overrides);
    config.macros = Some(macros);

    let summary = run(&config).unwrap();
    assert_eq!(summary.units, 2);
    assert_eq!(summary.overrides_applied, 1);
    assert_eq!(summary.macros_added, 1);

    let superset = fs::read_to_string(dir.path().join("superset.dat")).unwrap();
    assert_eq!(
        superset.lines().collect::<Vec<_>>(),
        [
            "S|Point|PointPointer|",
            "F|x|x|I32|int",
            "F|y|y|I32|int",
            "C|POINT_DIM",
            "S|Line|LinePointer|",
            "F|start|start|Point|Point",
            "F|finish|finish|Point|Point",
        ]
    );
    assert!(!dir.path().join("blob.dat").exists());
}

#[test]
fn missing_snapshot_stops_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.ir");
    let config = config(dir.path(), vec![missing.clone()]);

    match run(&config) {
        Err(DriverError::Ir(IrError::Io { path, .. })) => assert_eq!(path, missing),
        other => panic!("expected an IO error, got {other:?}"),
    }
    assert!(!dir.path().join("blob.dat").exists());
    assert!(!dir.path().join("superset.dat").exists());
}

#[test]
fn corrupt_snapshot_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("corrupt.ir");
    fs::write(&corrupt, b"not a snapshot").unwrap();
    let config = config(dir.path(), vec![corrupt.clone()]);

    let err = run(&config).expect_err("corrupt snapshot must fail");
    assert!(err.to_string().contains("corrupt.ir"), "{err}");
    assert!(matches!(err, DriverError::Snapshot { path, .. } if path == corrupt));
}

#[test]
fn snapshot_with_dangling_handle_is_rejected_without_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let mut unit = SymbolIr::new();
    let ns = unit.add_type(Type::namespace("ns"));
    if let Some(scope) = unit.get_mut(ns).scope_mut() {
        scope.sub_udts.push(TypeId::new(99));
    }
    let path = write_unit(dir.path(), "dangling.ir", &unit);
    let config = config(dir.path(), vec![path.clone()]);

    let err = run(&config).expect_err("dangling handle must fail");
    assert!(matches!(
        &err,
        DriverError::Snapshot { path: p, source: IrError::InvalidSnapshot { .. } } if *p == path
    ));
    assert!(err.to_string().contains("#99"), "{err}");
    assert!(!dir.path().join("blob.dat").exists());
}
