//! Property keys.
//!
//! A key addresses one slot of a reference value: an array index or a
//! named property. The same type appears in label paths so that a blame
//! message names the exact slot that was read or written.

use std::fmt;

use serde::Serialize;

/// Largest array length. Indices run from `0` to `MAX_LENGTH - 1`; a
/// numeric name at or past the limit stays a named property.
pub const MAX_LENGTH: usize = u32::MAX as usize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Key {
    /// An array index.
    Index(usize),
    /// A named property.
    Name(String),
}

impl Key {
    /// The property-name spelling of this key (`3` for `Index(3)`).
    pub fn to_name(&self) -> String {
        match self {
            Key::Index(i) => i.to_string(),
            Key::Name(n) => n.clone(),
        }
    }

    /// Normalize a named key that spells an index (`"3"`) into `Index(3)`.
    pub fn canonical(self) -> Key {
        match self {
            Key::Name(n) => match n.parse::<usize>() {
                Ok(i) if i < MAX_LENGTH && i.to_string() == n => Key::Index(i),
                _ => Key::Name(n),
            },
            other => other,
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(n) => write!(f, "{}", n),
        }
    }
}
