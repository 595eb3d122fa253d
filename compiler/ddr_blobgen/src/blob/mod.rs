//! Binary blob generator.
//!
//! The blob describes every emitted type for the runtime debugger: its
//! qualified name, superclass, fields with their declared types and offsets,
//! and integer constants. All names live once in a trailing string table.
//!
//! Generation runs the entry walk twice. The enumerate pass only counts, so
//! the build pass can allocate every record array exactly once and treat any
//! surplus record as an internal error. The whole image is assembled in
//! memory before anything touches the filesystem.
//!
//! # Layout
//!
//! ```text
//! header (20 bytes)
//! struct record, its field records, its constant records   x structureCount
//! string data
//! ```

mod format;
mod records;
mod strings;

use std::mem;
use std::path::Path;

use ddr_ir::{Field, SymbolIr, Type, TypeId};

use crate::walk::{walk_entries, EntrySink, MemberSink};
use crate::{GenError, Result};
use format::{blob_name, field_type_name};
use records::{
    native_bitfield_format, struct_data_size, BlobHeader, ConstantRecord, FieldRecord,
    StructRecord, C_LIMITS_NAME, HEADER_SIZE, NO_SUPER,
};
use strings::StringTable;

/// Switches for [`BlobGenerator`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlobOptions {
    /// Emit types with no fields and no constants.
    pub print_empty_types: bool,
    /// Append the `CLimits` entry with the target's C integer limits.
    pub include_c_limits: bool,
}

impl Default for BlobOptions {
    fn default() -> Self {
        BlobOptions {
            print_empty_types: false,
            include_c_limits: true,
        }
    }
}

/// Serializes a [`SymbolIr`] into the binary blob format.
#[derive(Clone, Debug, Default)]
pub struct BlobGenerator {
    options: BlobOptions,
}

impl BlobGenerator {
    pub fn new(options: BlobOptions) -> Self {
        BlobGenerator { options }
    }

    /// Build the complete blob image.
    pub fn generate(&self, ir: &SymbolIr) -> Result<Vec<u8>> {
        let bitfield_format = native_bitfield_format()?;

        let mut enumerator = Enumerator::new(self.options.print_empty_types);
        walk_entries(ir, &mut enumerator);
        let mut expected = enumerator.total;
        if self.options.include_c_limits {
            expected.structs += 1;
            expected.constants += records::c_limits().len();
        }
        tracing::debug!(
            structures = expected.structs,
            fields = expected.fields,
            constants = expected.constants,
            "enumerated blob records"
        );

        let mut builder = Builder::new(self.options.print_empty_types, expected)?;
        walk_entries(ir, &mut builder);
        if let Some(err) = builder.error.take() {
            return Err(err);
        }
        if self.options.include_c_limits {
            let limits: Vec<PendingMember<'_>> = records::c_limits()
                .into_iter()
                .map(|(name, value)| PendingMember::Constant(name, value))
                .collect();
            builder.push_entry(C_LIMITS_NAME, None, 0, &limits)?;
        }
        builder.finish_check()?;

        let image = builder.serialize(bitfield_format)?;
        tracing::debug!(
            bytes = image.len(),
            strings = builder.strings.len(),
            "built blob"
        );
        Ok(image)
    }

    /// Build the blob and write it to `path`, replacing any existing file.
    pub fn write(&self, ir: &SymbolIr, path: &Path) -> Result<()> {
        let image = self.generate(ir)?;
        std::fs::write(path, image).map_err(|e| GenError::io(path, e))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Counts {
    structs: usize,
    fields: usize,
    constants: usize,
}

/// Whether an entry with these member counts is emitted.
fn is_emitted(print_empty: bool, fields: usize, constants: usize) -> bool {
    print_empty || fields + constants > 0
}

/// First pass: counts the records each emitted entry contributes.
struct Enumerator {
    print_empty: bool,
    entry: Counts,
    total: Counts,
}

impl Enumerator {
    fn new(print_empty: bool) -> Self {
        Enumerator {
            print_empty,
            entry: Counts::default(),
            total: Counts::default(),
        }
    }
}

impl<'ir> MemberSink<'ir> for Enumerator {
    fn field(&mut self, _ir: &'ir SymbolIr, _path: &str, _offset: u64, _field: &'ir Field) {
        self.entry.fields += 1;
    }

    fn constant(&mut self, _name: &'ir str, _value: i64) {
        self.entry.constants += 1;
    }
}

impl<'ir> EntrySink<'ir> for Enumerator {
    fn begin_entry(&mut self, _ir: &'ir SymbolIr, _id: TypeId, _ty: &'ir Type) {
        self.entry = Counts::default();
    }

    fn end_entry(&mut self, _ir: &'ir SymbolIr, _id: TypeId, _ty: &'ir Type) {
        let entry = mem::take(&mut self.entry);
        if is_emitted(self.print_empty, entry.fields, entry.constants) {
            self.total.structs += 1;
            self.total.fields += entry.fields;
            self.total.constants += entry.constants;
        }
    }
}

/// A member waiting for its entry to be committed.
enum PendingMember<'ir> {
    Field {
        name: String,
        type_name: String,
        offset: u64,
    },
    Constant(&'ir str, i64),
}

/// Second pass: interns names and fills the record arrays.
///
/// Sink callbacks cannot fail, so the first error is parked in `error` and
/// every later entry is ignored.
struct Builder<'ir> {
    print_empty: bool,
    expected: Counts,
    strings: StringTable,
    structs: Vec<StructRecord>,
    fields: Vec<FieldRecord>,
    constants: Vec<ConstantRecord>,
    pending: Vec<PendingMember<'ir>>,
    error: Option<GenError>,
}

impl<'ir> Builder<'ir> {
    fn new(print_empty: bool, expected: Counts) -> Result<Self> {
        Ok(Builder {
            print_empty,
            expected,
            strings: StringTable::default(),
            structs: reserve(expected.structs, "structure records")?,
            fields: reserve(expected.fields, "field records")?,
            constants: reserve(expected.constants, "constant records")?,
            pending: Vec::new(),
            error: None,
        })
    }

    /// Commit one entry.
    ///
    /// Member names are interned in arrival order before the struct and
    /// super names.
    fn push_entry(
        &mut self,
        name: &str,
        super_name: Option<&str>,
        size: u64,
        members: &[PendingMember<'_>],
    ) -> Result<()> {
        let mut field_count = 0usize;
        let mut constant_count = 0usize;
        for member in members {
            match member {
                PendingMember::Field {
                    name,
                    type_name,
                    offset,
                } => {
                    let record = FieldRecord {
                        name_offset: self.strings.intern(name)?,
                        type_offset: self.strings.intern(type_name)?,
                        offset: to_u32(*offset, "field offset")?,
                    };
                    push_counted(&mut self.fields, record, self.expected.fields, "field records")?;
                    field_count += 1;
                }
                &PendingMember::Constant(name, value) => {
                    let record = ConstantRecord {
                        name_offset: self.strings.intern(name)?,
                        value,
                    };
                    push_counted(&mut self.constants, record, self.expected.constants, "constant records")?;
                    constant_count += 1;
                }
            }
        }

        let name_offset = self.strings.intern(name)?;
        let super_offset = match super_name {
            Some(super_name) => self.strings.intern(super_name)?,
            None => NO_SUPER,
        };
        let record = StructRecord {
            name_offset,
            super_offset,
            field_count: to_u32(field_count, "field count")?,
            constant_count: to_u32(constant_count, "constant count")?,
            struct_size: to_u32(size, "structure size")?,
        };
        push_counted(&mut self.structs, record, self.expected.structs, "structure records")
    }

    /// Fail when the build pass produced fewer records than were counted.
    fn finish_check(&self) -> Result<()> {
        for (what, expected, actual) in [
            ("structure records", self.expected.structs, self.structs.len()),
            ("field records", self.expected.fields, self.fields.len()),
            ("constant records", self.expected.constants, self.constants.len()),
        ] {
            if expected != actual {
                return Err(GenError::FormatInvariant {
                    what,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    fn serialize(&self, bitfield_format: u8) -> Result<Vec<u8>> {
        let header = BlobHeader {
            bitfield_format,
            struct_data_size: struct_data_size(
                self.structs.len(),
                self.fields.len(),
                self.constants.len(),
            )?,
            string_data_size: self.strings.size(),
            structure_count: to_u32(self.structs.len(), "structure count")?,
        };
        let total = HEADER_SIZE + header.struct_data_size as usize + header.string_data_size as usize;
        let mut out = reserve(total, "blob image")?;

        header.write_to(&mut out);
        let mut fields = self.fields.iter();
        let mut constants = self.constants.iter();
        for record in &self.structs {
            record.write_to(&mut out);
            for field in fields.by_ref().take(record.field_count as usize) {
                field.write_to(&mut out);
            }
            for constant in constants.by_ref().take(record.constant_count as usize) {
                constant.write_to(&mut out);
            }
        }
        self.strings.write_to(&mut out);
        Ok(out)
    }
}

impl<'ir> MemberSink<'ir> for Builder<'ir> {
    fn field(&mut self, ir: &'ir SymbolIr, path: &str, offset: u64, field: &'ir Field) {
        self.pending.push(PendingMember::Field {
            name: format!("{path}{}", field.name),
            type_name: field_type_name(ir, field),
            offset,
        });
    }

    fn constant(&mut self, name: &'ir str, value: i64) {
        self.pending.push(PendingMember::Constant(name, value));
    }
}

impl<'ir> EntrySink<'ir> for Builder<'ir> {
    fn begin_entry(&mut self, _ir: &'ir SymbolIr, _id: TypeId, _ty: &'ir Type) {
        self.pending.clear();
    }

    fn end_entry(&mut self, ir: &'ir SymbolIr, id: TypeId, ty: &'ir Type) {
        let members = mem::take(&mut self.pending);
        let fields = members
            .iter()
            .filter(|member| matches!(member, PendingMember::Field { .. }))
            .count();
        let constants = members.len() - fields;
        if self.error.is_some() || !is_emitted(self.print_empty, fields, constants) {
            return;
        }
        let name = blob_name(&ir.full_name(id));
        let super_name = ty.superclass().map(|s| blob_name(&ir.full_name(s)));
        // namespaces and enums have no meaningful sizeof
        let size = if ty.is_composite() { ty.size } else { 0 };
        tracing::trace!(%name, fields, constants, "blob entry");
        if let Err(err) = self.push_entry(&name, super_name.as_deref(), size, &members) {
            self.error = Some(err);
        }
    }
}

fn reserve<T>(capacity: usize, what: &'static str) -> Result<Vec<T>> {
    let mut records = Vec::new();
    records
        .try_reserve_exact(capacity)
        .map_err(|source| GenError::Allocation { what, source })?;
    Ok(records)
}

fn push_counted<T>(records: &mut Vec<T>, record: T, expected: usize, what: &'static str) -> Result<()> {
    if records.len() >= expected {
        return Err(GenError::FormatInvariant {
            what,
            expected,
            actual: records.len() + 1,
        });
    }
    records.push(record);
    Ok(())
}

fn to_u32<N: TryInto<u32>>(value: N, what: &'static str) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| GenError::SizeOverflow { what })
}
