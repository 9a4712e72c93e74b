//! Capability registry and instruction set table.
//!
//! This module defines what kinds of work the processor knows about:
//! 1. **Capabilities:** Case-insensitive classes of work (e.g. `ALU`, `MEM`)
//!    carried by units and required by instructions.
//! 2. **Interning:** A registry that canonicalizes capability spellings; the
//!    first spelling seen for a case-folded key wins for diagnostics.
//! 3. **ISA table:** The mnemonic-to-capability mapping, validated against
//!    the capability set a processor actually supports.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::common::error::SimError;
use crate::common::ident::Ident;

/// A class of work a unit can perform and an instruction can require.
///
/// Comparison and hashing fold case, as for [`Ident`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability(Ident);

impl Capability {
    /// Creates a capability from any string-like value.
    pub fn new(name: impl Into<Ident>) -> Self {
        Self(name.into())
    }

    /// The capability name.
    pub fn name(&self) -> &Ident {
        &self.0
    }

    /// The original spelling.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Interning registry for capability spellings.
///
/// The first spelling registered under a case-folded key becomes the
/// canonical handle returned by every later [`intern`](Self::intern) of the
/// same key.
#[derive(Debug, Default)]
pub struct CapRegistry {
    caps: HashMap<Ident, Capability>,
}

impl CapRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical capability for `name`, registering it if new.
    pub fn intern(&mut self, name: &str) -> Capability {
        let key = Ident::new(name);
        self.caps
            .entry(key)
            .or_insert_with(|| Capability::new(name))
            .clone()
    }

    /// Looks up the canonical capability for `name`, if registered.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.caps.get(&Ident::new(name))
    }
}

/// The instruction set: a case-insensitive mnemonic-to-capability mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IsaTable {
    map: HashMap<Ident, Capability>,
}

impl IsaTable {
    /// Loads an ISA from ordered `(mnemonic, capability)` rows, validating
    /// every capability against `supported`.
    ///
    /// Fails with [`SimError::DuplicateMnemonic`] when two rows share a
    /// case-folded mnemonic and with [`SimError::UnsupportedCapability`]
    /// when a row names a capability outside the supported set. The
    /// capability stored for a mnemonic is the canonical one from
    /// `supported`.
    pub fn load<'a, I>(rows: I, supported: &HashSet<Capability>) -> Result<Self, SimError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = HashMap::new();

        for (mnemonic, capability) in rows {
            let cap = supported.get(&Capability::new(capability)).ok_or_else(|| {
                SimError::UnsupportedCapability {
                    mnemonic: mnemonic.to_string(),
                    capability: capability.to_string(),
                }
            })?;

            if map.insert(Ident::new(mnemonic), cap.clone()).is_some() {
                return Err(SimError::DuplicateMnemonic {
                    mnemonic: mnemonic.to_string(),
                });
            }
        }

        Ok(Self { map })
    }

    /// Resolves a mnemonic to its capability, case-insensitively.
    pub fn lookup(&self, mnemonic: &str) -> Option<&Capability> {
        self.map.get(&Ident::new(mnemonic))
    }

    /// Number of mnemonics in the table.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when the table holds no mnemonics.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
