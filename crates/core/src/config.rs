//! Decoded configuration surface.
//!
//! This module defines the deserializable shapes a caller decodes processor
//! and ISA files into (the CLI feeds them JSON). It provides:
//! 1. **Unit shapes:** `UnitSpec` and `FuncUnitSpec` with defaulted lock and
//!    memory fields.
//! 2. **Processor shape:** The four port lists of a processor description.
//! 3. **ISA shape:** Ordered mnemonic/capability rows.
//!
//! Decoding performs no validation; the graph builder and ISA loader do.

use serde::Deserialize;

use crate::common::ident::Ident;
use crate::isa::Capability;
use crate::units::{FuncUnit, LockInfo, ProcessorDesc, UnitModel};

/// Decoded shape of a single functional unit.
#[derive(Clone, Debug, Deserialize)]
pub struct UnitSpec {
    /// Unit name.
    pub name: String,
    /// Instructions hosted per cycle.
    pub width: usize,
    /// Kinds of work the unit performs.
    pub capabilities: Vec<String>,
    /// The unit performs register reads.
    #[serde(default)]
    pub read_lock: bool,
    /// The unit commits register writes.
    #[serde(default)]
    pub write_lock: bool,
    /// Capabilities for which the unit accesses unified memory.
    #[serde(default)]
    pub mem_access: Vec<String>,
}

/// Decoded shape of a unit together with its predecessors.
#[derive(Clone, Debug, Deserialize)]
pub struct FuncUnitSpec {
    /// The unit itself.
    pub unit: UnitSpec,
    /// Names of the units feeding this one.
    #[serde(default)]
    pub preds: Vec<String>,
}

/// Decoded shape of a whole processor description.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProcessorSpec {
    /// Entry units.
    #[serde(default)]
    pub in_ports: Vec<UnitSpec>,
    /// Exit units with their predecessors.
    #[serde(default)]
    pub out_ports: Vec<FuncUnitSpec>,
    /// Units that are both entries and exits.
    #[serde(default)]
    pub in_out_ports: Vec<UnitSpec>,
    /// Internal units with their predecessors.
    #[serde(default)]
    pub internal_units: Vec<FuncUnitSpec>,
}

/// One decoded ISA row.
#[derive(Clone, Debug, Deserialize)]
pub struct IsaRow {
    /// Instruction mnemonic.
    pub mnemonic: String,
    /// Capability the instruction requires.
    pub capability: String,
}

/// Decoded shape of an ISA table: ordered rows.
pub type IsaSpec = Vec<IsaRow>;

impl From<UnitSpec> for UnitModel {
    fn from(spec: UnitSpec) -> Self {
        UnitModel::new(
            spec.name,
            spec.width,
            spec.capabilities.iter().map(|c| Capability::new(c.as_str())).collect(),
            LockInfo::new(spec.read_lock, spec.write_lock),
            spec.mem_access.iter().map(|c| Capability::new(c.as_str())).collect(),
        )
    }
}

impl From<FuncUnitSpec> for FuncUnit {
    fn from(spec: FuncUnitSpec) -> Self {
        FuncUnit::new(
            spec.unit.into(),
            spec.preds.into_iter().map(Ident::new).collect(),
        )
    }
}

impl From<ProcessorSpec> for ProcessorDesc {
    fn from(spec: ProcessorSpec) -> Self {
        ProcessorDesc::new(
            spec.in_ports.into_iter().map(UnitModel::from).collect(),
            spec.out_ports.into_iter().map(FuncUnit::from).collect(),
            spec.in_out_ports.into_iter().map(UnitModel::from).collect(),
            spec.internal_units.into_iter().map(FuncUnit::from).collect(),
        )
    }
}
