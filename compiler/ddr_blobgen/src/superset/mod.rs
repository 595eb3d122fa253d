//! Superset generator.
//!
//! The superset is a text file accumulating every type, constant and field
//! any build has produced. Each run appends its lines, and downstream tooling
//! diffs the result to spot breaking changes.
//!
//! ```text
//! S|vm$J9Class|vm$J9ClassPointer|vm$J9Object
//! C|J9_CLASS_FLAG
//! F|romClass|romClass|vm$J9ROMClass*|vm$J9ROMClass*
//! ```
//!
//! An `S|` line is held back until the type contributes its first `C|` or
//! `F|` line, so empty types leave no trace unless requested.

mod names;

use std::fmt::{self, Write as _};
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use ddr_ir::{Field, SymbolIr, Type, TypeId, TypeKind, TypedefUdt};
use rustc_hash::FxHashSet;

use crate::walk::{walk_entries, EntrySink, MemberSink};
use crate::{GenError, Result};
use names::{canonical_name, dollar_name, replace_legacy, stops_alias_chain};

/// Switches for [`SupersetGenerator`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SupersetOptions {
    /// Write `S|` lines for types that contribute no other line.
    pub print_empty_types: bool,
}

/// Renders a [`SymbolIr`] as superset lines.
#[derive(Clone, Debug, Default)]
pub struct SupersetGenerator {
    options: SupersetOptions,
}

impl SupersetGenerator {
    pub fn new(options: SupersetOptions) -> Self {
        SupersetGenerator { options }
    }

    /// All superset lines for `ir`, newline-terminated.
    pub fn render(&self, ir: &SymbolIr) -> String {
        let mut printer = Printer {
            print_empty: self.options.print_empty_types,
            out: String::new(),
            pending: None,
        };
        walk_entries(ir, &mut printer);
        printer.out
    }

    /// Append the rendered lines to `path`, creating it if needed.
    pub fn append(&self, ir: &SymbolIr, path: &Path) -> Result<()> {
        let text = self.render(ir);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| GenError::io(path, e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| GenError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "appended superset");
        Ok(())
    }
}

struct Printer {
    print_empty: bool,
    out: String,
    /// `S|` line of the current entry, until something is printed under it.
    pending: Option<String>,
}

impl Printer {
    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Some(header) = self.pending.take() {
            self.out.push_str(&header);
        }
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }
}

impl<'ir> MemberSink<'ir> for Printer {
    const ENUM_MEMBERS_FIRST: bool = true;

    fn field(&mut self, ir: &'ir SymbolIr, path: &str, _offset: u64, field: &'ir Field) {
        let name = if field.name == "class" {
            "klass"
        } else {
            field.name.as_str()
        };
        let dotted = format!("{path}{name}");
        let key = dotted.replace('.', "$");
        let (assembled, declared) = field_type_names(ir, field);
        self.line(format_args!("F|{key}|{dotted}|{assembled}|{declared}"));
    }

    fn constant(&mut self, name: &'ir str, _value: i64) {
        self.line(format_args!("C|{name}"));
    }
}

impl<'ir> EntrySink<'ir> for Printer {
    fn begin_entry(&mut self, ir: &'ir SymbolIr, id: TypeId, ty: &'ir Type) {
        let name = dollar_name(&ir.full_name(id));
        let super_name = ty
            .superclass()
            .map(|s| dollar_name(&ir.full_name(s)))
            .unwrap_or_default();
        let header = format!("S|{name}|{name}Pointer|{super_name}\n");
        if self.print_empty {
            self.out.push_str(&header);
        } else {
            self.pending = Some(header);
        }
    }

    fn end_entry(&mut self, _ir: &'ir SymbolIr, _id: TypeId, _ty: &'ir Type) {
        self.pending = None;
    }
}

/// Assembled and declared type columns of an `F|` line.
///
/// The assembled name resolves typedefs down to what they stand for, so
/// retyping a field through a new typedef of the same base type leaves it
/// unchanged. The declared name is the type as written.
fn field_type_names(ir: &SymbolIr, field: &Field) -> (String, String) {
    let pointer_suffix = field.modifiers.pointer_suffix();
    let mut names = TypeNames {
        ir,
        assembled: String::new(),
        declared: String::new(),
        pointer_suffix: pointer_suffix.clone(),
        seen: FxHashSet::default(),
    };
    names.visit(field.ty);

    let bits = if field.bit_field == 0 {
        String::new()
    } else {
        format!(":{}", field.bit_field)
    };
    let assembled = format!("{}{}{bits}", names.assembled, names.pointer_suffix);
    let declared = format!(
        "{}{}{pointer_suffix}{bits}",
        field.modifiers.modifier_names(),
        names.declared
    );
    (dollar_name(&assembled), declared)
}

struct TypeNames<'ir> {
    ir: &'ir SymbolIr,
    assembled: String,
    declared: String,
    /// Field suffix plus the indirection contributed by resolved typedefs.
    pointer_suffix: String,
    /// Typedefs already on the resolution path.
    seen: FxHashSet<TypeId>,
}

impl TypeNames<'_> {
    fn visit(&mut self, id: TypeId) {
        let ir = self.ir;
        let ty = ir.get(id);
        match &ty.kind {
            TypeKind::Base => {
                self.declared = replace_legacy(&ty.name);
                self.assembled = canonical_name(&ir.full_name(id), ty.size);
            }
            TypeKind::Typedef(typedef) => self.visit_typedef(id, ty, typedef),
            TypeKind::Namespace(_) | TypeKind::Enum(_) | TypeKind::Class(_) | TypeKind::Union(_) => {
                let name = dollar_name(&ir.full_name(id));
                self.declared.clone_from(&name);
                self.assembled = name;
            }
        }
    }

    fn visit_typedef(&mut self, id: TypeId, ty: &Type, typedef: &TypedefUdt) {
        self.seen.insert(id);
        let mut target = id;
        loop {
            let current = self.ir.get(target);
            if current.opaque || stops_alias_chain(&current.name) {
                break;
            }
            match current.alias() {
                Some((next, _)) if self.seen.insert(next) => target = next,
                _ => break,
            }
        }
        if target == id {
            self.assembled = canonical_name(&self.ir.full_name(id), ty.size);
        } else {
            tracing::trace!(typedef = %ty.name, resolved = %self.ir.get(target).name, "resolved alias chain");
            self.visit(target);
        }
        self.declared = replace_legacy(&ty.name);

        let mut suffix = "*".repeat(typedef.modifiers.pointer_count as usize);
        suffix.push_str(&self.pointer_suffix);
        for _ in 0..typedef.modifiers.array_dimensions() {
            suffix.push_str("[]");
        }
        self.pointer_suffix = suffix;
    }
}
