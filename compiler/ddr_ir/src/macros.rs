//! Preprocessor macros attached to a type.
//!
//! Macros keep their raw replacement text; the integer value is derived on
//! first request and cached. Only macros that reduce to an integer become
//! constants in the generated artifacts.

use std::cell::OnceCell;
use std::fmt;

/// A `#define` captured for a type.
#[derive(Clone)]
#[cfg_attr(feature = "snapshot", derive(serde::Serialize, serde::Deserialize))]
pub struct Macro {
    pub name: String,
    pub value: String,
    #[cfg_attr(feature = "snapshot", serde(skip))]
    numeric: OnceCell<Option<i64>>,
}

impl Macro {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Macro {
            name: name.into(),
            value: value.into(),
            numeric: OnceCell::new(),
        }
    }

    /// The integer this macro expands to, if its text is an integer literal.
    pub fn numeric(&self) -> Option<i64> {
        *self.numeric.get_or_init(|| reduce_integer(&self.value))
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.numeric().is_some()
    }
}

impl PartialEq for Macro {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl Eq for Macro {}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Macro({} = {:?})", self.name, self.value)
    }
}

/// Reduce macro text to an integer.
///
/// Balanced outer parentheses are stripped, then the remainder is parsed
/// with C base detection (`0x` hex, leading `0` octal, decimal otherwise)
/// and an optional `u`/`l` suffix. Anything else is not an integer.
pub fn reduce_integer(text: &str) -> Option<i64> {
    let mut text = text.trim();
    while let Some(inner) = strip_outer_parens(text) {
        text = inner.trim();
    }

    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, text[1..].trim_start()),
        b'+' => (false, text[1..].trim_start()),
        _ => (false, text),
    };
    let digits = digits.trim_end_matches(['u', 'U', 'l', 'L']);

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    // Parse as u64 so that unsigned values above i64::MAX keep their bits.
    let magnitude = u64::from_str_radix(body, radix).ok()?;
    #[allow(clippy::cast_possible_wrap)]
    let value = magnitude as i64;
    Some(if negative { value.wrapping_neg() } else { value })
}

/// Strip one pair of parentheses that encloses the whole text.
fn strip_outer_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}
