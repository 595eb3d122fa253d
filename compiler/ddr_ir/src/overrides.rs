//! Textual override rules applied to a finished IR.
//!
//! ```text
//! # comment
//! ddrblob.opaquetype=J9Object
//! fieldoverride.J9Class.flags=classFlags
//! typeoverride.J9Class.flags=UDATA
//! ```

use std::fs;
use std::path::Path;

use crate::visitor::{walk_ir, walk_type, TypeVisitor};
use crate::{IrError, Modifiers, Result, SymbolIr, Type, TypeId};

/// One parsed override line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Override {
    /// Stop typedef-chain resolution at `type_name`.
    Opaque { type_name: String },
    /// Rename `type_name.field` to `new_name`.
    FieldRename {
        type_name: String,
        field: String,
        new_name: String,
    },
    /// Give `type_name.field` the type named `new_type`, with no modifiers.
    FieldRetype {
        type_name: String,
        field: String,
        new_type: String,
    },
}

impl Override {
    /// Parse one line; blank, comment-only and malformed lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            return None;
        }
        let line = line.strip_prefix("ddrblob.").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        if value.is_empty() {
            return None;
        }
        if key == "opaquetype" {
            return Some(Override::Opaque {
                type_name: value.to_owned(),
            });
        }

        let (rule, target) = key.split_once('.')?;
        let (type_name, field) = target.split_once('.')?;
        if type_name.is_empty() || field.is_empty() {
            return None;
        }
        let (type_name, field) = (type_name.to_owned(), field.to_owned());
        match rule {
            "fieldoverride" => Some(Override::FieldRename {
                type_name,
                field,
                new_name: value.to_owned(),
            }),
            "typeoverride" => Some(Override::FieldRetype {
                type_name,
                field,
                new_type: value.to_owned(),
            }),
            _ => None,
        }
    }

    /// Bare name of the type the rule applies to.
    pub fn type_name(&self) -> &str {
        match self {
            Override::Opaque { type_name }
            | Override::FieldRename { type_name, .. }
            | Override::FieldRetype { type_name, .. } => type_name,
        }
    }
}

/// Collects every owned type with a given bare name.
struct ByName<'n> {
    name: &'n str,
    found: Vec<TypeId>,
}

impl<'ir> TypeVisitor<'ir> for ByName<'_> {
    fn visit_type(&mut self, id: TypeId, ir: &'ir SymbolIr) {
        if ir.get(id).name == self.name {
            self.found.push(id);
        }
        walk_type(self, id, ir);
    }
}

impl SymbolIr {
    /// Every type in the ownership tree whose unqualified name is `name`.
    pub fn find_all_by_bare_name(&self, name: &str) -> Vec<TypeId> {
        let mut by_name = ByName {
            name,
            found: Vec::new(),
        };
        walk_ir(&mut by_name, self);
        by_name.found
    }

    /// Apply one rule; returns the number of types it changed.
    pub fn apply_override(&mut self, rule: &Override) -> usize {
        let targets = self.find_all_by_bare_name(rule.type_name());
        let mut touched = 0;
        for id in targets {
            let changed = match rule {
                Override::Opaque { .. } => {
                    self.get_mut(id).opaque = true;
                    true
                }
                Override::FieldRename {
                    field, new_name, ..
                } => self.rename_field(id, field, new_name),
                Override::FieldRetype {
                    field, new_type, ..
                } => self.retype_field(id, field, new_type),
            };
            if changed {
                touched += 1;
            }
        }
        tracing::trace!(?rule, touched, "applied override");
        touched
    }

    /// Apply every rule in `text`, one per line; returns types changed.
    pub fn apply_overrides_list(&mut self, text: &str) -> usize {
        let mut touched = 0;
        for line in text.lines() {
            match Override::parse(line) {
                Some(rule) => touched += self.apply_override(&rule),
                None => {
                    if !line.split('#').next().unwrap_or_default().trim().is_empty() {
                        tracing::debug!(line, "skipping malformed override");
                    }
                }
            }
        }
        touched
    }

    pub fn apply_overrides_file(&mut self, path: &Path) -> Result<usize> {
        let text = fs::read_to_string(path).map_err(|source| IrError::io(path, source))?;
        let touched = self.apply_overrides_list(&text);
        tracing::debug!(path = %path.display(), touched, "applied overrides");
        Ok(touched)
    }

    fn rename_field(&mut self, id: TypeId, field: &str, new_name: &str) -> bool {
        let Some(layout) = self.get_mut(id).layout_mut() else {
            return false;
        };
        let mut changed = false;
        for f in layout.fields.iter_mut().filter(|f| f.name == field) {
            f.name = new_name.to_owned();
            changed = true;
        }
        changed
    }

    fn retype_field(&mut self, id: TypeId, field: &str, new_type: &str) -> bool {
        let has_field = self
            .get(id)
            .layout()
            .is_some_and(|layout| layout.fields.iter().any(|f| f.name == field));
        if !has_field {
            return false;
        }
        let replacement = match self.find_by_name(new_type) {
            Some(existing) => existing,
            None => self.add_type(Type::base(new_type, 0)),
        };
        let Some(layout) = self.get_mut(id).layout_mut() else {
            return false;
        };
        for f in layout.fields.iter_mut().filter(|f| f.name == field) {
            f.ty = replacement;
            f.modifiers = Modifiers::none();
        }
        true
    }
}
