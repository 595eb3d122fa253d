//! Fixed-size blob records.
//!
//! Every record is a packed run of native-endian integers.

use std::ffi::{c_char, c_int, c_long, c_schar, c_short, c_uchar, c_uint, c_ulong, c_ushort};
use std::mem::size_of;

use crate::{GenError, Result};

pub(crate) const BLOB_VERSION: u32 = 1;

/// Marks a struct record without a superclass.
pub(crate) const NO_SUPER: u32 = u32::MAX;

pub(crate) const HEADER_SIZE: usize = 20;
pub(crate) const STRUCT_RECORD_SIZE: usize = 20;
pub(crate) const FIELD_RECORD_SIZE: usize = 12;
pub(crate) const CONSTANT_RECORD_SIZE: usize = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BlobHeader {
    pub(crate) bitfield_format: u8,
    pub(crate) struct_data_size: u32,
    pub(crate) string_data_size: u32,
    pub(crate) structure_count: u32,
}

impl BlobHeader {
    #[allow(clippy::cast_possible_truncation, reason = "sizeof(bool) and sizeof(usize) fit in u8")]
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&BLOB_VERSION.to_ne_bytes());
        out.push(size_of::<bool>() as u8);
        out.push(size_of::<usize>() as u8);
        out.push(self.bitfield_format);
        out.push(0);
        out.extend_from_slice(&self.struct_data_size.to_ne_bytes());
        out.extend_from_slice(&self.string_data_size.to_ne_bytes());
        out.extend_from_slice(&self.structure_count.to_ne_bytes());
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct StructRecord {
    pub(crate) name_offset: u32,
    pub(crate) super_offset: u32,
    pub(crate) field_count: u32,
    pub(crate) constant_count: u32,
    pub(crate) struct_size: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldRecord {
    pub(crate) name_offset: u32,
    pub(crate) type_offset: u32,
    pub(crate) offset: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ConstantRecord {
    pub(crate) name_offset: u32,
    pub(crate) value: i64,
}

impl StructRecord {
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        for word in [
            self.name_offset,
            self.super_offset,
            self.field_count,
            self.constant_count,
            self.struct_size,
        ] {
            out.extend_from_slice(&word.to_ne_bytes());
        }
    }
}

impl FieldRecord {
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        for word in [self.name_offset, self.type_offset, self.offset] {
            out.extend_from_slice(&word.to_ne_bytes());
        }
    }
}

impl ConstantRecord {
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.name_offset.to_ne_bytes());
        out.extend_from_slice(&self.value.to_ne_bytes());
    }
}

/// Byte size of the struct, field and constant records together.
pub(crate) fn struct_data_size(structs: usize, fields: usize, constants: usize) -> Result<u32> {
    let overflow = || GenError::SizeOverflow { what: "struct data" };
    let total = structs
        .checked_mul(STRUCT_RECORD_SIZE)
        .zip(fields.checked_mul(FIELD_RECORD_SIZE))
        .zip(constants.checked_mul(CONSTANT_RECORD_SIZE))
        .and_then(|((s, f), c)| s.checked_add(f)?.checked_add(c))
        .ok_or_else(overflow)?;
    u32::try_from(total).map_err(|_| overflow())
}

/// Widths of the eight probe bitfields, four per 32-bit slot.
const PROBE_WIDTHS: [u32; 8] = [1, 15, 6, 10, 7, 9, 4, 12];
const PROBE_VALUES: [u32; 8] = [1, 31768, 3, 777, 43, 298, 12, 1654];

/// Bit-order marker values, keyed by the raw words the probe produces.
const LSB_FIRST: (u32, u32) = (0xC243_F831, 0x676C_952B);
const MSB_FIRST: (u32, u32) = (0xFC18_0F09, 0x572A_C676);

/// Pack the probe values the way the target C ABI allocates bitfields.
///
/// Little-endian ABIs fill each storage unit from its least significant bit,
/// big-endian ABIs from its most significant bit.
pub(crate) fn probe_bitfields(lsb_first: bool) -> (u32, u32) {
    let mut slots = [0u32; 2];
    for (slot, word) in slots.iter_mut().enumerate() {
        let mut used = 0;
        for i in slot * 4..slot * 4 + 4 {
            let width = PROBE_WIDTHS[i];
            let shift = if lsb_first { used } else { 32 - used - width };
            *word |= PROBE_VALUES[i] << shift;
            used += width;
        }
    }
    (slots[0], slots[1])
}

/// Marker for the probe result: 1 for LSB-first, 2 for MSB-first.
pub(crate) fn bitfield_format(slot0: u32, slot1: u32) -> Result<u8> {
    match (slot0, slot1) {
        LSB_FIRST => Ok(1),
        MSB_FIRST => Ok(2),
        _ => Err(GenError::BitfieldFormat { slot0, slot1 }),
    }
}

/// Marker for the machine this generator runs on.
///
/// Rust has no C bitfields to write the probe into, so the allocation order
/// is taken from the target's byte order: every ABI this builds for
/// allocates LSB-first on little-endian and MSB-first on big-endian. That
/// makes the word match in [`bitfield_format`] infallible here; it only
/// rejects probe words from another source.
pub(crate) fn native_bitfield_format() -> Result<u8> {
    let (slot0, slot1) = probe_bitfields(cfg!(target_endian = "little"));
    bitfield_format(slot0, slot1)
}

/// Name of the synthetic entry carrying the C integer limits.
pub(crate) const C_LIMITS_NAME: &str = "CLimits";

/// The target's C integer limits, as raw 64-bit values.
#[allow(clippy::cast_possible_wrap, reason = "unsigned maxima are stored as raw bits")]
pub(crate) fn c_limits() -> [(&'static str, i64); 14] {
    [
        ("CHAR_MAX", i64::from(c_char::MAX)),
        ("CHAR_MIN", i64::from(c_char::MIN)),
        ("INT_MAX", i64::from(c_int::MAX)),
        ("INT_MIN", i64::from(c_int::MIN)),
        ("LONG_MAX", i64::from(c_long::MAX)),
        ("LONG_MIN", i64::from(c_long::MIN)),
        ("SCHAR_MAX", i64::from(c_schar::MAX)),
        ("SCHAR_MIN", i64::from(c_schar::MIN)),
        ("SHRT_MAX", i64::from(c_short::MAX)),
        ("SHRT_MIN", i64::from(c_short::MIN)),
        ("UCHAR_MAX", i64::from(c_uchar::MAX)),
        ("UINT_MAX", i64::from(c_uint::MAX)),
        ("ULONG_MAX", u64::from(c_ulong::MAX) as i64),
        ("USHRT_MAX", i64::from(c_ushort::MAX)),
    ]
}
