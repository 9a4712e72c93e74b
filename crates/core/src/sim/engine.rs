//! The per-cycle dispatch and hazard engine.
//!
//! The engine advances a global cycle counter and repeatedly executes one
//! tick until every instruction has retired or a tick makes no progress.
//! Each tick:
//! 1. **Harvest:** Instructions sitting in an exit unit with all register
//!    grants acquired retire; they record no further history.
//! 2. **Plan:** Instructions are considered in program order. Lock grants,
//!    width consumption, vacated slots, and memory tokens produced by
//!    earlier instructions in the same tick are visible to later ones.
//!    An instruction enters an entry unit, re-attempts pending register
//!    grants, advances to a successor, or stalls in place (re-recording its
//!    unit so every cycle between entry and retirement appears in its
//!    history).
//! 3. **Advance** the cycle counter.
//!
//! Candidate targets are tried in canonical (topological, name-tied) order,
//! and width and memory tokens are consumed greedily in program order, so a
//! tick is a pure function of the engine state.

use std::collections::{HashMap, HashSet};

use crate::common::error::SimError;
use crate::common::ident::Ident;
use crate::graph::PipelineGraph;
use crate::isa::Capability;
use crate::program::Program;
use crate::sim::access::{build_access_plan, AccessType, RegAccessQueue};
use crate::sim::timeline::{SimResult, StageVisit};
use crate::stats::SimStats;

/// Runtime state of a single instruction.
struct InstrState {
    /// Canonical index of the occupied unit, or `None` before entry.
    unit: Option<usize>,
    /// All source-register reads have been granted.
    reads_done: bool,
    /// The destination-register write has been granted.
    write_done: bool,
    /// The instruction has left the pipeline.
    retired: bool,
    /// Every (cycle, unit) occupation, in order.
    history: Vec<(u32, usize)>,
}

/// What one planning pass accomplished.
#[derive(Default)]
struct TickOutcome {
    moves: usize,
    entered: usize,
    first_blocked: Option<(usize, String)>,
}

impl TickOutcome {
    fn note_blocked(&mut self, instr: usize, reason: String) {
        if self.first_blocked.is_none() {
            self.first_blocked = Some((instr, reason));
        }
    }

    fn progressed(&self) -> bool {
        self.moves > 0 || self.entered > 0
    }
}

/// The dispatch engine. One instance simulates one program on one processor;
/// instances share no state.
pub struct Engine<'a> {
    graph: &'a PipelineGraph,
    program: &'a Program,
    states: Vec<InstrState>,
    queues: HashMap<Ident, RegAccessQueue>,
    cycle: u32,
    trace: bool,
    stats: SimStats,
}

impl<'a> Engine<'a> {
    /// Creates an engine for the given processor and program.
    pub fn new(graph: &'a PipelineGraph, program: &'a Program) -> Self {
        let states = program
            .iter()
            .map(|_| InstrState {
                unit: None,
                reads_done: false,
                write_done: false,
                retired: false,
                history: Vec::new(),
            })
            .collect();

        Self {
            graph,
            program,
            states,
            queues: build_access_plan(program),
            cycle: 1,
            trace: false,
            stats: SimStats::default(),
        }
    }

    /// Enables per-event tracing to stderr.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Runs the simulation to completion.
    ///
    /// Returns the per-instruction timelines, or
    /// [`SimError::StructuralDeadlock`] if a tick makes no progress while
    /// instructions remain in flight.
    pub fn run(mut self) -> Result<SimResult, SimError> {
        loop {
            let retired_now = self.harvest();
            if self.states.iter().all(|st| st.retired) {
                break;
            }

            let outcome = self.plan_moves();
            if retired_now == 0 && !outcome.progressed() {
                let (instr, reason) = outcome
                    .first_blocked
                    .unwrap_or_else(|| (0, "cannot advance".to_string()));
                return Err(SimError::StructuralDeadlock {
                    cycle: self.cycle,
                    instr,
                    reason,
                });
            }

            self.cycle += 1;
        }

        let total = self.cycle - 1;
        self.stats.cycles = u64::from(total);

        let timelines = self
            .states
            .iter()
            .map(|st| {
                st.history
                    .iter()
                    .map(|&(cycle, unit)| StageVisit {
                        cycle,
                        unit: self.graph.unit(unit).name.clone(),
                    })
                    .collect()
            })
            .collect();

        Ok(SimResult {
            timelines,
            cycles: total,
            stats: self.stats,
        })
    }

    /// Retires every instruction that has finished its exit unit.
    fn harvest(&mut self) -> usize {
        let mut retired = 0;
        for idx in 0..self.states.len() {
            if self.states[idx].retired {
                continue;
            }
            if let Some(unit) = self.states[idx].unit {
                if self.graph.is_exit(unit) && self.locks_done(idx, unit) {
                    self.states[idx].retired = true;
                    self.stats.instructions_retired += 1;
                    retired += 1;
                    if self.trace {
                        eprintln!("[Retire] cycle={} I{}", self.cycle, idx);
                    }
                }
            }
        }
        retired
    }

    /// Plans and applies this tick's movement, in program order.
    fn plan_moves(&mut self) -> TickOutcome {
        let mut width_used = vec![0usize; self.graph.len()];
        for st in &self.states {
            if !st.retired {
                if let Some(unit) = st.unit {
                    width_used[unit] += 1;
                }
            }
        }
        let mut mem_used: HashSet<Capability> = HashSet::new();
        let mut outcome = TickOutcome::default();

        for idx in 0..self.states.len() {
            if self.states[idx].retired {
                continue;
            }
            match self.states[idx].unit {
                None => self.plan_entry(idx, &mut width_used, &mut mem_used, &mut outcome),
                Some(unit) => self.plan_advance(idx, unit, &mut width_used, &mut mem_used, &mut outcome),
            }
        }

        outcome
    }

    /// Tries to inject a not-yet-entered instruction into an entry unit.
    fn plan_entry(
        &mut self,
        idx: usize,
        width_used: &mut [usize],
        mem_used: &mut HashSet<Capability>,
        outcome: &mut TickOutcome,
    ) {
        let cap = self.program[idx].capability.clone();
        let mut rejection: Option<String> = None;
        let mut mem_blocked = false;

        for &entry in self.graph.entries() {
            if !self.graph.usable_caps(entry).contains(&cap) {
                continue;
            }
            match self.admit(entry, &cap, width_used, mem_used) {
                Ok(()) => {
                    self.states[idx].unit = Some(entry);
                    let _ = self.attempt_grants(idx, entry);
                    self.record(idx, entry);
                    outcome.entered += 1;
                    if self.trace {
                        eprintln!(
                            "[Dispatch] cycle={} I{} enters {}",
                            self.cycle,
                            idx,
                            self.graph.unit(entry).name
                        );
                    }
                    return;
                }
                Err(Admission::MemBusy) => {
                    mem_blocked = true;
                    if rejection.is_none() {
                        rejection = Some(format!(
                            "cannot enter unit {}: memory busy for capability {}",
                            self.graph.unit(entry).name,
                            cap
                        ));
                    }
                }
                Err(Admission::Full) => {
                    if rejection.is_none() {
                        rejection = Some(format!(
                            "cannot enter unit {}: at capacity",
                            self.graph.unit(entry).name
                        ));
                    }
                }
            }
        }

        if mem_blocked {
            self.stats.mem_serializations += 1;
        }
        let reason =
            rejection.unwrap_or_else(|| format!("no entry unit accepts capability {cap}"));
        outcome.note_blocked(idx, reason);
    }

    /// Advances (or stalls) an instruction already inside the pipeline.
    fn plan_advance(
        &mut self,
        idx: usize,
        unit: usize,
        width_used: &mut [usize],
        mem_used: &mut HashSet<Capability>,
        outcome: &mut TickOutcome,
    ) {
        let cap = self.program[idx].capability.clone();

        // Pending register grants pin the instruction to its unit.
        if !self.locks_done(idx, unit) {
            if let Err(register) = self.attempt_grants(idx, unit) {
                self.stay(idx, unit, &cap, mem_used);
                self.stats.stalls_data += 1;
                outcome.note_blocked(idx, format!("waiting for register {register}"));
                if self.trace {
                    eprintln!(
                        "[Stall] cycle={} I{} in {} (register {})",
                        self.cycle,
                        idx,
                        self.graph.unit(unit).name,
                        register
                    );
                }
                return;
            }
        }

        // Finished instructions hold their exit unit until harvest.
        if self.graph.is_exit(unit) {
            self.stay(idx, unit, &cap, mem_used);
            return;
        }

        let mut rejection: Option<String> = None;
        let mut mem_blocked = false;
        let mut any_candidate = false;

        for &succ in self.graph.successors(unit) {
            if !self.graph.usable_caps(succ).contains(&cap) {
                continue;
            }
            any_candidate = true;
            match self.admit(succ, &cap, width_used, mem_used) {
                Ok(()) => {
                    width_used[unit] -= 1;
                    self.states[idx].unit = Some(succ);
                    let _ = self.attempt_grants(idx, succ);
                    self.record(idx, succ);
                    outcome.moves += 1;
                    if self.trace {
                        eprintln!(
                            "[Dispatch] cycle={} I{} {} -> {}",
                            self.cycle,
                            idx,
                            self.graph.unit(unit).name,
                            self.graph.unit(succ).name
                        );
                    }
                    return;
                }
                Err(Admission::MemBusy) => {
                    mem_blocked = true;
                    if rejection.is_none() {
                        rejection = Some(format!(
                            "cannot enter unit {}: memory busy for capability {}",
                            self.graph.unit(succ).name,
                            cap
                        ));
                    }
                }
                Err(Admission::Full) => {
                    if rejection.is_none() {
                        rejection = Some(format!(
                            "cannot enter unit {}: at capacity",
                            self.graph.unit(succ).name
                        ));
                    }
                }
            }
        }

        // No acceptable successor this tick.
        self.stay(idx, unit, &cap, mem_used);
        self.stats.stalls_structural += 1;
        if mem_blocked {
            self.stats.mem_serializations += 1;
        }
        let reason = rejection.unwrap_or_else(|| {
            if any_candidate {
                format!("no successor of {} is available", self.graph.unit(unit).name)
            } else {
                format!(
                    "no successor of {} supports capability {}",
                    self.graph.unit(unit).name,
                    cap
                )
            }
        });
        if self.trace {
            eprintln!(
                "[Stall] cycle={} I{} in {} ({})",
                self.cycle,
                idx,
                self.graph.unit(unit).name,
                reason_tag(&reason)
            );
        }
        outcome.note_blocked(idx, reason);
    }

    /// Width and unified-memory admission check for one candidate target.
    /// On success the target's slot and (if needed) memory token are
    /// consumed.
    fn admit(
        &self,
        target: usize,
        cap: &Capability,
        width_used: &mut [usize],
        mem_used: &mut HashSet<Capability>,
    ) -> Result<(), Admission> {
        let unit = self.graph.unit(target);
        if width_used[target] >= unit.width {
            return Err(Admission::Full);
        }
        if unit.needs_mem(cap) {
            if mem_used.contains(cap) {
                return Err(Admission::MemBusy);
            }
            mem_used.insert(cap.clone());
        }
        width_used[target] += 1;
        Ok(())
    }

    /// Keeps an instruction in place for this cycle, re-recording its unit
    /// and holding its memory token if the unit accesses memory.
    fn stay(&mut self, idx: usize, unit: usize, cap: &Capability, mem_used: &mut HashSet<Capability>) {
        if self.graph.unit(unit).needs_mem(cap) {
            mem_used.insert(cap.clone());
        }
        self.record(idx, unit);
    }

    /// Attempts the unit's outstanding register grants for an instruction:
    /// all source reads as a block, then the destination write. Returns the
    /// first blocking register on failure.
    fn attempt_grants(&mut self, idx: usize, unit: usize) -> Result<(), Ident> {
        let lock_info = self.graph.unit(unit).lock_info;

        if lock_info.read_lock && !self.states[idx].reads_done {
            let sources = &self.program[idx].sources;
            for source in sources {
                let queue = &self.queues[source];
                if !queue.can_access(AccessType::Read, idx) {
                    return Err(source.clone());
                }
            }
            for source in sources {
                self.queues
                    .get_mut(source)
                    .expect("planned register")
                    .dequeue(idx);
            }
            self.states[idx].reads_done = true;
        }

        if lock_info.write_lock && !self.states[idx].write_done {
            let destination = &self.program[idx].destination;
            let queue = &self.queues[destination];
            if !queue.can_access(AccessType::Write, idx) {
                return Err(destination.clone());
            }
            self.queues
                .get_mut(destination)
                .expect("planned register")
                .dequeue(idx);
            self.states[idx].write_done = true;
        }

        Ok(())
    }

    /// True when the instruction holds every grant the unit's locks demand.
    fn locks_done(&self, idx: usize, unit: usize) -> bool {
        let lock_info = self.graph.unit(unit).lock_info;
        (!lock_info.read_lock || self.states[idx].reads_done)
            && (!lock_info.write_lock || self.states[idx].write_done)
    }

    fn record(&mut self, idx: usize, unit: usize) {
        self.states[idx].history.push((self.cycle, unit));
    }
}

/// Why a candidate target turned an instruction away.
enum Admission {
    /// The target already hosts `width` instructions this cycle.
    Full,
    /// The capability's unified-memory token is taken this cycle.
    MemBusy,
}

/// Short tag for trace output.
fn reason_tag(reason: &str) -> &str {
    if reason.contains("memory busy") {
        "memory"
    } else {
        "structural"
    }
}
