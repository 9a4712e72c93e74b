//! Graph construction and validation tests.
//!
//! Covers the builder's validation passes in order: duplicate names,
//! dangling predecessors, cycles, dead ends, and the canonical ordering of
//! the resulting graph.

use crate::common::builders::{func, UnitBuilder};
use pipesim_core::common::error::SimError;
use pipesim_core::units::ProcessorDesc;
use pipesim_core::PipelineGraph;

fn unit(name: &str) -> UnitBuilder {
    UnitBuilder::new(name).caps(&["ALU"])
}

#[test]
fn builds_linear_pipeline() {
    let desc = ProcessorDesc::new(
        vec![unit("F").build()],
        vec![func(unit("W").build(), &["D"])],
        vec![],
        vec![func(unit("D").build(), &["F"])],
    );
    let graph = PipelineGraph::build(&desc).unwrap();

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.entries(), &[graph.index_of("F").unwrap()]);
    assert_eq!(graph.exits(), &[graph.index_of("W").unwrap()]);

    let d = graph.index_of("D").unwrap();
    assert_eq!(graph.successors(graph.index_of("F").unwrap()), &[d]);
    assert_eq!(graph.predecessors(graph.index_of("W").unwrap()), &[d]);
}

#[test]
fn duplicate_name_rejected_case_insensitively() {
    let desc = ProcessorDesc::new(
        vec![unit("Core").build()],
        vec![func(unit("CORE").build(), &["Core"])],
        vec![],
        vec![],
    );
    assert_eq!(
        PipelineGraph::build(&desc).unwrap_err(),
        SimError::DuplicateName {
            unit: "CORE".to_string()
        }
    );
}

#[test]
fn dangling_predecessor_rejected() {
    let desc = ProcessorDesc::new(
        vec![unit("F").build()],
        vec![func(unit("W").build(), &["ghost"])],
        vec![],
        vec![],
    );
    assert_eq!(
        PipelineGraph::build(&desc).unwrap_err(),
        SimError::DanglingPredecessor {
            unit: "W".to_string(),
            pred: "ghost".to_string()
        }
    );
}

#[test]
fn cycle_rejected() {
    // A -> B -> A among the internal units.
    let desc = ProcessorDesc::new(
        vec![unit("F").build()],
        vec![func(unit("W").build(), &["B"])],
        vec![],
        vec![
            func(unit("A").build(), &["F", "B"]),
            func(unit("B").build(), &["A"]),
        ],
    );
    assert_eq!(
        PipelineGraph::build(&desc).unwrap_err(),
        SimError::CyclicPipeline {
            unit: "A".to_string()
        }
    );
}

#[test]
fn internal_unit_without_successor_is_a_dead_end() {
    let desc = ProcessorDesc::new(
        vec![unit("F").build()],
        vec![func(unit("W").build(), &["F"])],
        vec![],
        vec![func(unit("stub").build(), &["F"])],
    );
    assert_eq!(
        PipelineGraph::build(&desc).unwrap_err(),
        SimError::DeadEnd {
            unit: "stub".to_string()
        }
    );
}

#[test]
fn entry_without_successor_is_a_dead_end() {
    let desc = ProcessorDesc::new(
        vec![unit("F").build(), unit("orphan").build()],
        vec![func(unit("W").build(), &["F"])],
        vec![],
        vec![],
    );
    assert_eq!(
        PipelineGraph::build(&desc).unwrap_err(),
        SimError::DeadEnd {
            unit: "orphan".to_string()
        }
    );
}

#[test]
fn single_unit_processor_uses_in_out_port() {
    let desc = ProcessorDesc::new(vec![], vec![], vec![unit("fullSys").build()], vec![]);
    let graph = PipelineGraph::build(&desc).unwrap();
    assert_eq!(graph.entries(), graph.exits());
    assert!(graph.is_exit(0));
}

#[test]
fn canonical_order_is_topological_with_name_ties() {
    // Two parallel middle units; the tie between them breaks by name.
    let desc = ProcessorDesc::new(
        vec![unit("F").build()],
        vec![func(unit("W").build(), &["beta", "alpha"])],
        vec![],
        vec![
            func(unit("beta").build(), &["F"]),
            func(unit("alpha").build(), &["F"]),
        ],
    );
    let graph = PipelineGraph::build(&desc).unwrap();

    let names: Vec<&str> = (0..graph.len()).map(|u| graph.unit(u).name.as_str()).collect();
    assert_eq!(names, ["F", "alpha", "beta", "W"]);
}

#[test]
fn predecessors_resolve_case_insensitively() {
    let desc = ProcessorDesc::new(
        vec![unit("Fetch").build()],
        vec![func(unit("W").build(), &["FETCH"])],
        vec![],
        vec![],
    );
    assert!(PipelineGraph::build(&desc).is_ok());
}
