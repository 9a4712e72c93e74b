//! Cycle-accurate pipeline simulator library.
//!
//! This crate simulates straight-line programs on a declaratively described
//! pipelined processor, producing a per-instruction timeline of the
//! functional units occupied at each clock cycle. It provides:
//! 1. **Graph:** Validation and canonicalization of the unit DAG.
//! 2. **ISA:** Case-insensitive capability interning and the mnemonic table.
//! 3. **Program:** Line-oriented assembly into typed instructions.
//! 4. **Simulation:** The per-cycle dispatch engine with width, lock, and
//!    unified-memory hazard handling.
//! 5. **Config:** serde-decodable shapes for processor and ISA files.
//!
//! Register values are never computed; only the schedule of execution is.

/// Common types (case-insensitive identifiers, errors).
pub mod common;
/// Decoded configuration shapes for processor and ISA files.
pub mod config;
/// Canonical pipeline graph construction and validation.
pub mod graph;
/// Capabilities and the instruction set table.
pub mod isa;
/// Program representation and assembly.
pub mod program;
/// The dispatch engine, access plan, and timelines.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Functional unit descriptors and the raw processor description.
pub mod units;

/// The tagged error type every stage reports.
pub use crate::common::error::SimError;
/// Case-insensitive identifier used for every name in the simulator.
pub use crate::common::ident::Ident;
/// The canonical processor graph; build with `PipelineGraph::build`.
pub use crate::graph::PipelineGraph;
/// Run a program on a processor: `simulate(&graph, &program)`.
pub use crate::sim::{simulate, SimResult};
