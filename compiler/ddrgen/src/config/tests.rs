use super::*;
use pretty_assertions::assert_eq;

fn parse(args: &[&str]) -> Result<Command> {
    Command::from_args(args.iter().copied())
}

#[test]
fn full_command_line() {
    let command = parse(&[
        "--blob",
        "out/blob.dat",
        "--superset=out/superset.dat",
        "--overrides",
        "a.overrides",
        "--overrides=b.overrides",
        "--macros",
        "macroList",
        "--print-empty-types",
        "--no-c-limits",
        "unit1.ir",
        "unit2.ir",
    ]);
    let expected = GenConfig {
        snapshots: vec!["unit1.ir".into(), "unit2.ir".into()],
        blob: Some("out/blob.dat".into()),
        superset: Some("out/superset.dat".into()),
        overrides: vec!["a.overrides".into(), "b.overrides".into()],
        macros: Some("macroList".into()),
        print_empty_types: true,
        c_limits: false,
    };
    assert_eq!(command.ok(), Some(Command::Run(expected)));
}

#[test]
fn defaults_keep_c_limits() {
    let Ok(Command::Run(config)) = parse(&["--blob", "b", "u.ir"]) else {
        panic!("expected a run");
    };
    assert!(config.c_limits);
    assert!(!config.print_empty_types);
    assert_eq!(config.blob_options(), BlobOptions::default());
    assert_eq!(config.superset_options(), SupersetOptions::default());
}

#[test]
fn help_wins() {
    assert_eq!(parse(&["--blob", "b", "-h"]).ok(), Some(Command::Help));
    assert_eq!(parse(&["--help"]).ok(), Some(Command::Help));
}

#[test]
fn usage_errors() {
    for (args, message) in [
        (&["--blob", "b"][..], "no snapshot files given"),
        (&["u.ir"][..], "nothing to generate: pass `--blob` and/or `--superset`"),
        (&["--blob"][..], "`--blob` needs a path"),
        (&["--superset=", "u.ir"][..], "`--superset` needs a path"),
        (&["--verbose", "u.ir"][..], "unknown option `--verbose`"),
    ] {
        match parse(args) {
            Err(DriverError::Usage(got)) => assert_eq!(got, message, "{args:?}"),
            other => panic!("{args:?}: expected a usage error, got {other:?}"),
        }
    }
}
