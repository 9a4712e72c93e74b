//! Program execution simulation.
//!
//! This module hosts the dispatch engine and its supporting pieces:
//! 1. **Access plan:** Per-register program-order access queues ([`access`]).
//! 2. **Engine:** The per-cycle tick loop ([`engine`]).
//! 3. **Timelines:** The per-instruction output shape ([`timeline`]).

/// Register access forecasting (RAW / WAW / WAR discipline).
pub mod access;
/// The per-cycle dispatch and hazard engine.
pub mod engine;
/// Simulation result and per-instruction timelines.
pub mod timeline;

pub use engine::Engine;
pub use timeline::{SimResult, StageVisit};

use crate::common::error::SimError;
use crate::graph::PipelineGraph;
use crate::program::Program;

/// Runs a program on a processor and returns its pipeline timeline.
///
/// Convenience wrapper over [`Engine`] with tracing disabled.
pub fn simulate(graph: &PipelineGraph, program: &Program) -> Result<SimResult, SimError> {
    Engine::new(graph, program).run()
}
