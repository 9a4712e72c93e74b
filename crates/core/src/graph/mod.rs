//! Canonical pipeline graph construction and validation.
//!
//! This module turns a raw [`ProcessorDesc`] into the canonical form the
//! dispatch engine runs against. It provides:
//! 1. **Validation:** Name uniqueness, predecessor resolution, acyclicity,
//!    connectivity, and capability closure, failing on the first violation.
//! 2. **Canonicalization:** Units stored in a stable topological order (ties
//!    broken by case-folded name) with index-based edges; later code never
//!    looks units up by name.
//! 3. **Capability analysis:** Per-unit usable capability sets and the
//!    processor-wide supported set (see [`caps`]).

pub mod caps;

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::common::error::SimError;
use crate::common::ident::Ident;
use crate::isa::{CapRegistry, Capability};
use crate::units::{ProcessorDesc, UnitModel};

/// Which of the four port lists a unit was declared in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Entry,
    Exit,
    Both,
    Internal,
}

/// The canonical processor graph.
///
/// Units are held in an arena ordered by a stable topological sort; all
/// edges and port lists are index-based. Built once per simulation and
/// immutable afterwards.
#[derive(Debug)]
pub struct PipelineGraph {
    units: Vec<UnitModel>,
    succs: Vec<Vec<usize>>,
    preds: Vec<Vec<usize>>,
    entries: Vec<usize>,
    exits: Vec<usize>,
    is_exit: Vec<bool>,
    usable: Vec<HashSet<Capability>>,
    supported: HashSet<Capability>,
    index: HashMap<Ident, usize>,
}

impl PipelineGraph {
    /// Builds and validates the canonical graph from a raw description.
    ///
    /// Validation order (first violation wins): duplicate names, dangling
    /// predecessors, cycles, dead ends, unreachable exit capabilities.
    pub fn build(desc: &ProcessorDesc) -> Result<Self, SimError> {
        let declared = collect_units(desc)?;
        let (succs, preds) = resolve_edges(&declared)?;
        let order = topo_order(&declared, &preds)?;

        // Remap everything onto canonical indices.
        let mut canonical = vec![0usize; declared.len()];
        for (new_idx, &old_idx) in order.iter().enumerate() {
            canonical[old_idx] = new_idx;
        }
        let units: Vec<UnitModel> = order.iter().map(|&old| declared[old].unit.clone()).collect();
        let roles: Vec<Role> = order.iter().map(|&old| declared[old].role).collect();
        let remap = |lists: &[Vec<usize>]| -> Vec<Vec<usize>> {
            order
                .iter()
                .map(|&old| {
                    let mut mapped: Vec<usize> =
                        lists[old].iter().map(|&peer| canonical[peer]).collect();
                    mapped.sort_unstable();
                    mapped
                })
                .collect()
        };
        let succs = remap(&succs);
        let preds = remap(&preds);

        check_roles(&units, &roles, &succs, &preds)?;

        let entries: Vec<usize> = (0..units.len())
            .filter(|&u| matches!(roles[u], Role::Entry | Role::Both))
            .collect();
        let exits: Vec<usize> = (0..units.len())
            .filter(|&u| matches!(roles[u], Role::Exit | Role::Both))
            .collect();
        let mut is_exit = vec![false; units.len()];
        for &e in &exits {
            is_exit[e] = true;
        }

        let flow = caps::analyze(&units, &succs, &preds, &entries, &exits)?;

        let index = units
            .iter()
            .enumerate()
            .map(|(idx, unit)| (unit.name.clone(), idx))
            .collect();

        Ok(Self {
            units,
            succs,
            preds,
            entries,
            exits,
            is_exit,
            usable: flow.usable,
            supported: flow.supported,
            index,
        })
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when the graph has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The unit at a canonical index.
    pub fn unit(&self, idx: usize) -> &UnitModel {
        &self.units[idx]
    }

    /// Canonical indices of entry units, in canonical order.
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    /// Canonical indices of exit units, in canonical order.
    pub fn exits(&self) -> &[usize] {
        &self.exits
    }

    /// Successors of a unit, in canonical order.
    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.succs[idx]
    }

    /// Predecessors of a unit, in canonical order.
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        &self.preds[idx]
    }

    /// True when the unit is an exit port.
    pub fn is_exit(&self, idx: usize) -> bool {
        self.is_exit[idx]
    }

    /// Capabilities an instruction may actually carry through this unit:
    /// those supported along some full entry-to-exit path over it.
    pub fn usable_caps(&self, idx: usize) -> &HashSet<Capability> {
        &self.usable[idx]
    }

    /// The processor-wide supported capability set: the union of the entry
    /// units' usable sets. ISA rows must stay within this set.
    pub fn supported_caps(&self) -> &HashSet<Capability> {
        &self.supported
    }

    /// Canonical index of a unit by (case-insensitive) name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&Ident::new(name)).copied()
    }
}

/// One declared unit before canonicalization.
struct DeclaredUnit {
    unit: UnitModel,
    preds: Vec<Ident>,
    role: Role,
}

/// Collects all declared units in declaration order, canonicalizing
/// capability spellings and rejecting duplicate names.
fn collect_units(desc: &ProcessorDesc) -> Result<Vec<DeclaredUnit>, SimError> {
    let mut collector = UnitCollector::default();

    for unit in &desc.in_ports {
        collector.push(unit, Vec::new(), Role::Entry)?;
    }
    for port in &desc.out_ports {
        collector.push(&port.unit, port.preds.clone(), Role::Exit)?;
    }
    for unit in &desc.in_out_ports {
        collector.push(unit, Vec::new(), Role::Both)?;
    }
    for port in &desc.internal_units {
        collector.push(&port.unit, port.preds.clone(), Role::Internal)?;
    }

    Ok(collector.declared)
}

/// Accumulates declared units, interning capabilities and rejecting
/// duplicate names as they arrive.
#[derive(Default)]
struct UnitCollector {
    registry: CapRegistry,
    seen: HashSet<Ident>,
    declared: Vec<DeclaredUnit>,
}

impl UnitCollector {
    fn push(&mut self, unit: &UnitModel, preds: Vec<Ident>, role: Role) -> Result<(), SimError> {
        if !self.seen.insert(unit.name.clone()) {
            return Err(SimError::DuplicateName {
                unit: unit.name.to_string(),
            });
        }
        let mut model = unit.clone();
        model.capabilities = intern_all(&unit.capabilities, &mut self.registry);
        model.mem_access = intern_all(&unit.mem_access, &mut self.registry);
        self.declared.push(DeclaredUnit {
            unit: model,
            preds,
            role,
        });
        Ok(())
    }
}

/// Interns a capability list, deduplicating case-folded repeats.
fn intern_all(caps: &[Capability], registry: &mut CapRegistry) -> Vec<Capability> {
    let mut out: Vec<Capability> = Vec::with_capacity(caps.len());
    for cap in caps {
        let canonical = registry.intern(cap.as_str());
        if !out.contains(&canonical) {
            out.push(canonical);
        }
    }
    out
}

/// Resolves predecessor names to indices and builds both adjacency tables.
fn resolve_edges(declared: &[DeclaredUnit]) -> Result<(Vec<Vec<usize>>, Vec<Vec<usize>>), SimError> {
    let by_name: HashMap<&Ident, usize> = declared
        .iter()
        .enumerate()
        .map(|(idx, decl)| (&decl.unit.name, idx))
        .collect();

    let mut succs = vec![Vec::new(); declared.len()];
    let mut preds = vec![Vec::new(); declared.len()];

    for (idx, decl) in declared.iter().enumerate() {
        for pred_name in &decl.preds {
            let &pred_idx = by_name.get(pred_name).ok_or_else(|| {
                SimError::DanglingPredecessor {
                    unit: decl.unit.name.to_string(),
                    pred: pred_name.to_string(),
                }
            })?;
            if !preds[idx].contains(&pred_idx) {
                preds[idx].push(pred_idx);
                succs[pred_idx].push(idx);
            }
        }
    }

    Ok((succs, preds))
}

/// Computes the canonical topological order: Kahn's algorithm with the ready
/// set ordered by case-folded unit name.
fn topo_order(declared: &[DeclaredUnit], preds: &[Vec<usize>]) -> Result<Vec<usize>, SimError> {
    let n = declared.len();
    let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();
    let mut ready: BTreeSet<(String, usize)> = (0..n)
        .filter(|&u| indegree[u] == 0)
        .map(|u| (declared[u].unit.name.folded(), u))
        .collect();

    // Successor lookup over original indices.
    let mut succs = vec![Vec::new(); n];
    for (idx, pred_list) in preds.iter().enumerate() {
        for &p in pred_list {
            succs[p].push(idx);
        }
    }

    let mut order = Vec::with_capacity(n);
    while let Some((_, u)) = ready.pop_first() {
        order.push(u);
        for &s in &succs[u] {
            indegree[s] -= 1;
            if indegree[s] == 0 {
                ready.insert((declared[s].unit.name.folded(), s));
            }
        }
    }

    if order.len() < n {
        let on_cycle = (0..n)
            .filter(|&u| indegree[u] > 0)
            .min_by_key(|&u| declared[u].unit.name.folded())
            .expect("incomplete sort implies a remaining unit");
        return Err(SimError::CyclicPipeline {
            unit: declared[on_cycle].unit.name.to_string(),
        });
    }

    Ok(order)
}

/// Checks every unit's declared role against its actual degrees.
///
/// In an acyclic graph this is exactly connectivity: a unit whose degrees
/// match its declared role lies on an entry-to-exit path, because every
/// maximal backward walk ends at a predecessor-free unit (a declared entry)
/// and every maximal forward walk ends at a successor-free unit (a declared
/// exit). A mismatch is a dead end: an entry that feeds nothing, an exit
/// that something feeds from below, or an internal unit cut off on either
/// side.
fn check_roles(
    units: &[UnitModel],
    roles: &[Role],
    succs: &[Vec<usize>],
    preds: &[Vec<usize>],
) -> Result<(), SimError> {
    for idx in 0..units.len() {
        let has_preds = !preds[idx].is_empty();
        let has_succs = !succs[idx].is_empty();
        let expected = match roles[idx] {
            Role::Entry => (false, true),
            Role::Exit => (true, false),
            Role::Both => (false, false),
            Role::Internal => (true, true),
        };
        if (has_preds, has_succs) != expected {
            return Err(SimError::DeadEnd {
                unit: units[idx].name.to_string(),
            });
        }
    }
    Ok(())
}
