//! Capability flow analysis over the canonical graph.
//!
//! A capability is only meaningful on a unit if an instruction carrying it
//! can both arrive there from an entry and drain from there to an exit, with
//! the capability supported at every hop. This module computes:
//! 1. **Forward support:** Capabilities carried from the entries to each unit.
//! 2. **Backward support:** Capabilities that can drain from each unit to the exits.
//! 3. **Usable sets:** Their intersection, consulted by the dispatch engine
//!    so instructions are never routed into a hop their capability cannot
//!    leave.
//!
//! The analysis also enforces capability closure: every capability declared
//! on an exit must be fully path-supported from some entry.

use std::collections::HashSet;

use crate::common::error::SimError;
use crate::isa::Capability;
use crate::units::UnitModel;

/// Result of the capability flow analysis.
pub struct CapFlow {
    /// Per-unit usable capability sets, indexed canonically.
    pub usable: Vec<HashSet<Capability>>,
    /// Union of the entry units' usable sets.
    pub supported: HashSet<Capability>,
}

/// Runs the flow analysis. `units`, `succs`, and `preds` are in canonical
/// (topological) order, so a plain index walk visits predecessors first.
pub fn analyze(
    units: &[UnitModel],
    succs: &[Vec<usize>],
    preds: &[Vec<usize>],
    entries: &[usize],
    exits: &[usize],
) -> Result<CapFlow, SimError> {
    let n = units.len();

    // Forward pass: what can reach each unit from the entries.
    let mut fwd: Vec<HashSet<Capability>> = Vec::with_capacity(n);
    for idx in 0..n {
        let own: HashSet<Capability> = units[idx].capabilities.iter().cloned().collect();
        if preds[idx].is_empty() {
            fwd.push(own);
        } else {
            let inherited: HashSet<Capability> = preds[idx]
                .iter()
                .flat_map(|&p| fwd[p].iter().cloned())
                .collect();
            fwd.push(own.intersection(&inherited).cloned().collect());
        }
    }

    // Every exit capability must be forward-supported along some path.
    for &exit in exits {
        for cap in &units[exit].capabilities {
            if !fwd[exit].contains(cap) {
                return Err(SimError::UnreachableCapability {
                    capability: cap.to_string(),
                });
            }
        }
    }

    // Backward pass: what can drain from each unit to the exits.
    let mut bwd: Vec<HashSet<Capability>> = vec![HashSet::new(); n];
    for idx in (0..n).rev() {
        let own: HashSet<Capability> = units[idx].capabilities.iter().cloned().collect();
        bwd[idx] = if succs[idx].is_empty() {
            own
        } else {
            let drained: HashSet<Capability> = succs[idx]
                .iter()
                .flat_map(|&s| bwd[s].iter().cloned())
                .collect();
            own.intersection(&drained).cloned().collect()
        };
    }

    let usable: Vec<HashSet<Capability>> = (0..n)
        .map(|idx| fwd[idx].intersection(&bwd[idx]).cloned().collect())
        .collect();

    let supported = entries
        .iter()
        .flat_map(|&e| usable[e].iter().cloned())
        .collect();

    Ok(CapFlow { usable, supported })
}
