//! Functional unit descriptors and the raw processor description.
//!
//! A processor is described as four disjoint lists of units: entry ports,
//! exit ports (with their predecessors), combined entry/exit ports, and
//! internal units (with their predecessors). The graph builder turns this
//! raw shape into a canonical, index-based pipeline graph.

use crate::common::ident::Ident;
use crate::isa::Capability;

/// Hazard-check participation flags for one unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LockInfo {
    /// The unit performs register reads; instructions stall here until every
    /// earlier writer of a source register has committed its write.
    pub read_lock: bool,
    /// The unit commits register writes; writes to a register are granted in
    /// program order here.
    pub write_lock: bool,
}

impl LockInfo {
    /// Creates lock flags.
    pub fn new(read_lock: bool, write_lock: bool) -> Self {
        Self {
            read_lock,
            write_lock,
        }
    }
}

/// Static descriptor of one pipeline stage.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitModel {
    /// Unit name, unique within the processor (case-insensitively).
    pub name: Ident,
    /// Maximum instructions hosted by this unit in any single cycle.
    pub width: usize,
    /// Kinds of work this unit can perform. Non-empty.
    pub capabilities: Vec<Capability>,
    /// Hazard-check participation.
    pub lock_info: LockInfo,
    /// Capabilities for which this unit accesses unified memory.
    pub mem_access: Vec<Capability>,
}

impl UnitModel {
    /// Creates a unit descriptor.
    pub fn new(
        name: impl Into<Ident>,
        width: usize,
        capabilities: Vec<Capability>,
        lock_info: LockInfo,
        mem_access: Vec<Capability>,
    ) -> Self {
        Self {
            name: name.into(),
            width,
            capabilities,
            lock_info,
            mem_access,
        }
    }

    /// True when this unit can perform work of the given capability.
    pub fn supports(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// True when hosting an instruction of the given capability accesses
    /// unified memory.
    pub fn needs_mem(&self, cap: &Capability) -> bool {
        self.mem_access.contains(cap)
    }
}

/// A unit together with the names of its direct predecessors.
///
/// An instruction may advance into the unit only from one of its
/// predecessors (or from outside the pipeline when the unit is an entry).
#[derive(Clone, Debug, PartialEq)]
pub struct FuncUnit {
    /// The unit itself.
    pub unit: UnitModel,
    /// Names of the units feeding this one.
    pub preds: Vec<Ident>,
}

impl FuncUnit {
    /// Creates a unit with its predecessor list.
    pub fn new(unit: UnitModel, preds: Vec<Ident>) -> Self {
        Self { unit, preds }
    }
}

/// The raw processor description: four disjoint lists defining the unit
/// graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessorDesc {
    /// Entry units (no predecessors); instructions are injected here.
    pub in_ports: Vec<UnitModel>,
    /// Exit units (no successors), each with its predecessors.
    pub out_ports: Vec<FuncUnit>,
    /// Units that are both entries and exits (single-stage pipelines).
    pub in_out_ports: Vec<UnitModel>,
    /// Every other unit, each with its predecessors.
    pub internal_units: Vec<FuncUnit>,
}

impl ProcessorDesc {
    /// Creates a processor description from its four port lists.
    pub fn new(
        in_ports: Vec<UnitModel>,
        out_ports: Vec<FuncUnit>,
        in_out_ports: Vec<UnitModel>,
        internal_units: Vec<FuncUnit>,
    ) -> Self {
        Self {
            in_ports,
            out_ports,
            in_out_ports,
            internal_units,
        }
    }

    /// Iterates over every declared unit with its predecessor names, in
    /// declaration order (entries, exits, entry/exits, internals).
    pub fn units(&self) -> impl Iterator<Item = (&UnitModel, &[Ident])> {
        const NO_PREDS: &[Ident] = &[];
        self.in_ports
            .iter()
            .map(move |unit| (unit, NO_PREDS))
            .chain(
                self.out_ports
                    .iter()
                    .map(|port| (&port.unit, port.preds.as_slice())),
            )
            .chain(self.in_out_ports.iter().map(move |unit| (unit, NO_PREDS)))
            .chain(
                self.internal_units
                    .iter()
                    .map(|port| (&port.unit, port.preds.as_slice())),
            )
    }
}
