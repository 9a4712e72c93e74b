//! Case-insensitive identifiers.
//!
//! Unit names, register names, capability names, and mnemonics all compare
//! and hash without regard to ASCII case, while the spelling first seen is
//! preserved for display and diagnostics.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Deserialize;

/// A case-insensitive identifier.
///
/// Two idents are equal iff their ASCII-lowercased forms are equal; hashing
/// is consistent with that equality. `Display` renders the original
/// spelling.
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct Ident(String);

impl Ident {
    /// Creates an ident from any string-like value.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The original spelling.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The case-folded form used for equality, hashing, and ordering.
    pub fn folded(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Ident {}

impl Hash for Ident {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ident {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.0.bytes().map(|b| b.to_ascii_lowercase());
        let rhs = other.0.bytes().map(|b| b.to_ascii_lowercase());
        lhs.cmp(rhs)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ident {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Ident {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
