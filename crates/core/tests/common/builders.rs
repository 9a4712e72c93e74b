//! Fluent builders and one-call runners for simulator tests.

use pipesim_core::common::error::SimError;
use pipesim_core::isa::{Capability, IsaTable};
use pipesim_core::program::assembler;
use pipesim_core::sim::{simulate, SimResult};
use pipesim_core::units::{FuncUnit, LockInfo, ProcessorDesc, UnitModel};
use pipesim_core::PipelineGraph;

/// Fluent construction of a [`UnitModel`].
pub struct UnitBuilder {
    name: String,
    width: usize,
    caps: Vec<String>,
    read_lock: bool,
    write_lock: bool,
    mem: Vec<String>,
}

impl UnitBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            width: 1,
            caps: Vec::new(),
            read_lock: false,
            write_lock: false,
            mem: Vec::new(),
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn caps(mut self, caps: &[&str]) -> Self {
        self.caps = caps.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn read_lock(mut self) -> Self {
        self.read_lock = true;
        self
    }

    pub fn write_lock(mut self) -> Self {
        self.write_lock = true;
        self
    }

    pub fn mem(mut self, caps: &[&str]) -> Self {
        self.mem = caps.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn build(self) -> UnitModel {
        UnitModel::new(
            self.name,
            self.width,
            self.caps.iter().map(|c| Capability::new(c.as_str())).collect(),
            LockInfo::new(self.read_lock, self.write_lock),
            self.mem.iter().map(|c| Capability::new(c.as_str())).collect(),
        )
    }
}

/// A unit with named predecessors.
pub fn func(unit: UnitModel, preds: &[&str]) -> FuncUnit {
    FuncUnit::new(unit, preds.iter().map(|&p| p.into()).collect())
}

/// The classic five-stage pipeline: F -> D -> X -> M -> W, each width 1 with
/// capabilities {ALU, MEM}; D read-locks, W write-locks, and F and M access
/// memory for both capabilities.
pub fn five_stage() -> ProcessorDesc {
    let stage = |name: &str| UnitBuilder::new(name).caps(&["ALU", "MEM"]);
    ProcessorDesc::new(
        vec![stage("F").mem(&["ALU", "MEM"]).build()],
        vec![func(stage("W").write_lock().build(), &["M"])],
        vec![],
        vec![
            func(stage("D").read_lock().build(), &["F"]),
            func(stage("X").build(), &["D"]),
            func(stage("M").mem(&["ALU", "MEM"]).build(), &["X"]),
        ],
    )
}

/// The ISA used by most scenario tests.
pub fn basic_isa() -> Vec<(&'static str, &'static str)> {
    vec![("LW", "MEM"), ("SW", "MEM"), ("ADD", "ALU"), ("SUB", "ALU")]
}

/// Builds, loads, assembles, and simulates; panics on any error.
pub fn run(desc: &ProcessorDesc, isa_rows: &[(&str, &str)], lines: &[&str]) -> SimResult {
    try_run(desc, isa_rows, lines).expect("simulation failed")
}

/// Builds, loads, assembles, and simulates, surfacing the first error.
pub fn try_run(
    desc: &ProcessorDesc,
    isa_rows: &[(&str, &str)],
    lines: &[&str],
) -> Result<SimResult, SimError> {
    let graph = PipelineGraph::build(desc)?;
    let isa = IsaTable::load(isa_rows.iter().copied(), graph.supported_caps())?;
    let program = assembler::assemble(lines.iter().copied(), &isa)?;
    simulate(&graph, &program)
}

/// One instruction's timeline as owned `(cycle, unit)` pairs.
pub fn visits(result: &SimResult, instr: usize) -> Vec<(u32, String)> {
    result.timelines[instr]
        .iter()
        .map(|visit| (visit.cycle, visit.unit.to_string()))
        .collect()
}

/// Shorthand for building an expected timeline from a start cycle and unit
/// names: `expected(2, &["F", "D", "D", "X"])` occupies cycles 2..=5.
pub fn expected(start: u32, units: &[&str]) -> Vec<(u32, String)> {
    units
        .iter()
        .enumerate()
        .map(|(offset, &unit)| (start + offset as u32, unit.to_string()))
        .collect()
}
