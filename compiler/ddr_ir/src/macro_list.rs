//! Macro list files and attaching their macros to types.
//!
//! The list is a flat marker file produced by preprocessing each header:
//!
//! ```text
//! @DDRFILE_BEGIN j9class.h
//! @TYPE_J9Class
//! @MACRO_J9_CLASS_FLAG 0x4
//! @DDRFILE_END
//! ```
//!
//! A header may be scanned several times; repeats within one header group
//! are dropped.

use std::fs;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{IrError, Macro, Result, SymbolIr, SymbolKind, Type, TypeId};

/// Macros destined for one type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroGroup {
    pub type_name: String,
    pub macros: Vec<Macro>,
}

/// Parse a macro list into groups, in the order types first appear.
///
/// Unrecognized lines and macros with no preceding `@TYPE_` in their header
/// are skipped.
pub fn parse_macro_list(text: &str) -> Vec<MacroGroup> {
    let mut groups: Vec<MacroGroup> = Vec::new();
    let mut group_of: FxHashMap<String, usize> = FxHashMap::default();
    let mut current: Option<usize> = None;
    let mut header_seen: FxHashSet<(usize, String, String)> = FxHashSet::default();

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("@DDRFILE_BEGIN") || line.starts_with("@DDRFILE_END") {
            current = None;
            header_seen.clear();
        } else if let Some(type_name) = line.strip_prefix("@TYPE_") {
            let type_name = type_name.trim();
            if type_name.is_empty() {
                current = None;
                continue;
            }
            let index = *group_of.entry(type_name.to_owned()).or_insert_with(|| {
                groups.push(MacroGroup {
                    type_name: type_name.to_owned(),
                    macros: Vec::new(),
                });
                groups.len() - 1
            });
            current = Some(index);
        } else if let Some(rest) = line.strip_prefix("@MACRO_") {
            let Some(index) = current else {
                tracing::trace!(line, "macro outside a type group");
                continue;
            };
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            if header_seen.insert((index, name.to_owned(), value.to_owned())) {
                groups[index].macros.push(Macro::new(name, value));
            }
        }
    }
    groups
}

impl SymbolIr {
    /// Attach macro groups. Each group goes to the namespace, class or
    /// union of that name, or to a new top-level namespace when there is
    /// none. Returns the number of macros added.
    pub fn add_macros(&mut self, groups: Vec<MacroGroup>) -> usize {
        let mut added = 0;
        for group in groups {
            let target = self.macro_target(&group.type_name);
            let Some(scope) = self.get_mut(target).scope_mut() else {
                continue;
            };
            for m in group.macros {
                if !scope.macros.iter().any(|have| have.name == m.name) {
                    scope.macros.push(m);
                    added += 1;
                }
            }
        }
        tracing::debug!(added, "attached macros");
        added
    }

    pub fn add_macros_file(&mut self, path: &Path) -> Result<usize> {
        let text = fs::read_to_string(path).map_err(|source| IrError::io(path, source))?;
        Ok(self.add_macros(parse_macro_list(&text)))
    }

    fn macro_target(&mut self, name: &str) -> TypeId {
        for kind in [SymbolKind::Class, SymbolKind::Union, SymbolKind::Namespace] {
            if let Some(id) = self.find(name, kind) {
                return id;
            }
        }
        if let Some(id) = self
            .find_all_by_bare_name(name)
            .into_iter()
            .find(|&id| self.get(id).scope().is_some())
        {
            return id;
        }
        tracing::trace!(name, "creating namespace for macros");
        self.add_type(Type::namespace(name))
    }
}
