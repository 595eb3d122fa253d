//! Canonical type names for the superset.
//!
//! The debugger refers to integer types by width (`U32`, `IDATA`), so the
//! assembled column normalizes C spellings through these fixed tables.

/// C integer spellings renamed to `I<bits>`/`U<bits>` from the type's size.
const SIZED_INTEGERS: &[&str] = &[
    "unsigned char",
    "uint8_t",
    "__uint8_t",
    "signed char",
    "char",
    "int8_t",
    "__int8_t",
    "unsigned short int",
    "short unsigned int",
    "uint16_t",
    "__uint16_t",
    "signed short int",
    "short signed int",
    "short int",
    "int16_t",
    "__int16_t",
    "unsigned int",
    "uint32_t",
    "__uint32_t",
    "signed int",
    "int",
    "int32_t",
    "__int32_t",
    "long unsigned int",
    "unsigned long int",
    "long long unsigned int",
    "unsigned long long int",
    "uint64_t",
    "long signed int",
    "signed long int",
    "long long signed int",
    "signed long long int",
    "long int",
    "long long int",
    "int64_t",
];

/// Whole-name renames, checked before [`SIZED_INTEGERS`].
const RENAMES: [(&str, &str); 3] = [
    ("intptr_t", "IDATA"),
    ("uintptr_t", "UDATA"),
    ("char", "U8"),
];

/// Legacy underscored spellings.
const LEGACY: [(&str, &str); 10] = [
    ("U_8", "U8"),
    ("U_16", "U16"),
    ("U_32", "U32"),
    ("U_64", "U64"),
    ("U_128", "U128"),
    ("I_8", "I8"),
    ("I_16", "I16"),
    ("I_32", "I32"),
    ("I_64", "I64"),
    ("I_128", "I128"),
];

/// Rewrite legacy spellings in `name`.
///
/// An exact match is replaced outright; otherwise the first occurrence of
/// each legacy spelling is replaced in place.
pub(crate) fn replace_legacy(name: &str) -> String {
    if let Some(&(_, to)) = LEGACY.iter().find(|&&(from, _)| from == name) {
        return to.to_owned();
    }
    let mut out = name.to_owned();
    for (from, to) in LEGACY {
        if let Some(start) = out.find(from) {
            out.replace_range(start..start + from.len(), to);
        }
    }
    out
}

/// Canonical name of an integer-like type of `size` bytes.
pub(crate) fn canonical_name(full_name: &str, size: u64) -> String {
    if let Some(&(_, to)) = RENAMES.iter().find(|&&(from, _)| from == full_name) {
        return to.to_owned();
    }
    if SIZED_INTEGERS.contains(&full_name) {
        let sign = if full_name.contains('u') { 'U' } else { 'I' };
        return format!("{sign}{}", size.saturating_mul(8));
    }
    replace_legacy(full_name)
}

/// Whether a typedef chain stops at `name` instead of following its alias.
pub(crate) fn stops_alias_chain(name: &str) -> bool {
    name == "IDATA"
        || name == "UDATA"
        || LEGACY
            .iter()
            .chain(RENAMES.iter())
            .any(|&(from, to)| name == from || name == to)
}

/// Qualified name in superset form, with `::` rendered as `$`.
pub(crate) fn dollar_name(qualified: &str) -> String {
    qualified.replace("::", "$")
}
