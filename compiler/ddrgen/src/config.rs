//! Command-line configuration.

use std::path::PathBuf;

use ddr_blobgen::{BlobOptions, SupersetOptions};

use crate::{DriverError, Result};

pub const USAGE: &str = "\
Usage: ddrgen [options] <snapshot>...

Merges per-compilation-unit Symbol IR snapshots and writes the debugger blob
and/or the superset.

Options:
  --blob <path>         Write the binary blob to <path>
  --superset <path>     Append superset lines to <path>
  --overrides <path>    Apply an override file (repeatable)
  --macros <path>       Attach macros from a macro list file
  --print-empty-types   Emit types with no fields or constants
  --no-c-limits         Omit the CLimits entry from the blob
  -h, --help            Show this help";

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Run(GenConfig),
    Help,
}

/// One generator run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenConfig {
    /// IR snapshots, merged in order.
    pub snapshots: Vec<PathBuf>,
    pub blob: Option<PathBuf>,
    pub superset: Option<PathBuf>,
    /// Override files, applied in order after deduplication.
    pub overrides: Vec<PathBuf>,
    pub macros: Option<PathBuf>,
    pub print_empty_types: bool,
    pub c_limits: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            snapshots: Vec::new(),
            blob: None,
            superset: None,
            overrides: Vec::new(),
            macros: None,
            print_empty_types: false,
            c_limits: true,
        }
    }
}

impl GenConfig {
    pub fn blob_options(&self) -> BlobOptions {
        BlobOptions {
            print_empty_types: self.print_empty_types,
            include_c_limits: self.c_limits,
        }
    }

    pub fn superset_options(&self) -> SupersetOptions {
        SupersetOptions {
            print_empty_types: self.print_empty_types,
        }
    }
}

impl Command {
    /// Parse arguments, excluding the program name.
    ///
    /// Options taking a path accept `--opt <path>` and `--opt=<path>`.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut config = GenConfig::default();
        let mut args = args.into_iter().map(Into::<String>::into);

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_owned(), Some(value.to_owned())),
                _ => (arg.clone(), None),
            };
            let mut path = || -> Result<PathBuf> {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
                    .ok_or_else(|| DriverError::Usage(format!("`{flag}` needs a path")))
            };

            match flag.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "--blob" => config.blob = Some(path()?),
                "--superset" => config.superset = Some(path()?),
                "--overrides" => config.overrides.push(path()?),
                "--macros" => config.macros = Some(path()?),
                "--print-empty-types" => config.print_empty_types = true,
                "--no-c-limits" => config.c_limits = false,
                _ if flag.starts_with('-') => {
                    return Err(DriverError::Usage(format!("unknown option `{arg}`")));
                }
                _ => config.snapshots.push(PathBuf::from(arg)),
            }
        }

        if config.snapshots.is_empty() {
            return Err(DriverError::Usage("no snapshot files given".to_owned()));
        }
        if config.blob.is_none() && config.superset.is_none() {
            return Err(DriverError::Usage(
                "nothing to generate: pass `--blob` and/or `--superset`".to_owned(),
            ));
        }
        Ok(Command::Run(config))
    }
}

#[cfg(test)]
mod tests;
