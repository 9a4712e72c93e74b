//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for a simulation run. It provides:
//! 1. **Cycle and throughput:** Total cycles, retired instructions, and derived CPI.
//! 2. **Stalls:** Data-hazard and structural stall cycle counts.
//! 3. **Memory:** Unified-memory serialization events.

use std::time::{Duration, Instant};

/// Counters accumulated by the dispatch engine over one run.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulated cycles.
    pub cycles: u64,
    /// Number of instructions retired.
    pub instructions_retired: u64,
    /// Cycles an instruction spent stalled on a register hazard.
    pub stalls_data: u64,
    /// Cycles an instruction spent stalled on width or memory contention.
    pub stalls_structural: u64,
    /// Times an advance was deferred to serialize unified-memory access.
    pub mem_serializations: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            stalls_data: 0,
            stalls_structural: 0,
            mem_serializations: 0,
        }
    }
}

impl SimStats {
    /// Wall-clock time since the stats were created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Prints the run summary to stdout.
    pub fn print(&self) {
        let seconds = self.elapsed().as_secs_f64();
        let instr = if self.instructions_retired == 0 {
            1
        } else {
            self.instructions_retired
        };
        let cpi = self.cycles as f64 / instr as f64;

        println!("\n==========================================================");
        println!("PIPELINE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_cpi                  {:.4}", cpi);
        println!("stalls.data              {}", self.stalls_data);
        println!("stalls.structural        {}", self.stalls_structural);
        println!("mem.serializations       {}", self.mem_serializations);
        println!("----------------------------------------------------------");
    }
}
