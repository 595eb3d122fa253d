//! Deduplicating string table.

use rustc_hash::FxHashMap;

use crate::{GenError, Result};

/// Interned strings in first-use order, each addressed by its byte offset
/// into the serialized table.
#[derive(Debug, Default)]
pub(crate) struct StringTable {
    offsets: FxHashMap<String, u32>,
    order: Vec<String>,
    size: u32,
}

impl StringTable {
    /// Bytes one string occupies: `u16` length, the bytes, padding to even.
    pub(crate) fn entry_size(len: usize) -> usize {
        (2 + len + 1) & !1
    }

    /// Offset of `s`, reserving space on first use.
    pub(crate) fn intern(&mut self, s: &str) -> Result<u32> {
        if let Some(&offset) = self.offsets.get(s) {
            return Ok(offset);
        }
        if u16::try_from(s.len()).is_err() {
            return Err(GenError::StringTooLong { len: s.len() });
        }
        let offset = self.size;
        self.size = u32::try_from(Self::entry_size(s.len()))
            .ok()
            .and_then(|entry| offset.checked_add(entry))
            .ok_or(GenError::SizeOverflow { what: "string data" })?;
        self.offsets.insert(s.to_owned(), offset);
        self.order.push(s.to_owned());
        Ok(offset)
    }

    /// Serialized size in bytes.
    pub(crate) fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Append the serialized table to `out`.
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        for s in &self.order {
            // length checked in `intern`
            let len = u16::try_from(s.len()).unwrap_or(u16::MAX);
            out.extend_from_slice(&len.to_ne_bytes());
            out.extend_from_slice(s.as_bytes());
            if s.len() % 2 == 1 {
                out.push(0);
            }
        }
    }
}
