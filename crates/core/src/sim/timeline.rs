//! Simulation result and per-instruction timelines.
//!
//! The engine's output is, for every instruction in program order, the
//! ordered list of (cycle, unit) occupations from entry to retirement.
//! Stalls appear as the same unit repeated on consecutive cycles, which is
//! exactly what a pipeline diagram renders.

use crate::common::ident::Ident;
use crate::stats::SimStats;

/// One cycle of one instruction's life: the unit it occupied and when.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageVisit {
    /// Clock cycle, starting at 1.
    pub cycle: u32,
    /// Name of the occupied unit.
    pub unit: Ident,
}

/// The complete outcome of a simulation run.
#[derive(Clone, Debug)]
pub struct SimResult {
    /// Per-instruction timelines, in program order. Each timeline is
    /// gap-free: one visit per cycle from entry to retirement.
    pub timelines: Vec<Vec<StageVisit>>,
    /// Total cycles simulated (the highest recorded cycle).
    pub cycles: u32,
    /// Counters accumulated during the run.
    pub stats: SimStats,
}

impl SimResult {
    /// The timeline of one instruction as `(cycle, unit name)` pairs.
    pub fn visits(&self, instr: usize) -> Vec<(u32, &str)> {
        self.timelines[instr]
            .iter()
            .map(|visit| (visit.cycle, visit.unit.as_str()))
            .collect()
    }
}
