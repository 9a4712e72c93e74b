//! Pipeline simulator CLI.
//!
//! This binary is the single entry point for running simulations. It
//! performs:
//! 1. **Loading:** Decodes the processor description and ISA table from JSON
//!    and reads the program source.
//! 2. **Simulation:** Builds the canonical graph, loads the ISA, assembles
//!    the program, and runs the dispatch engine.
//! 3. **Rendering:** Prints the timeline as a pipeline diagram table, with
//!    optional run statistics.

use clap::{Parser, Subcommand};
use std::{fs, process};

use pipesim_core::config::{IsaSpec, ProcessorSpec};
use pipesim_core::isa::IsaTable;
use pipesim_core::program::assembler;
use pipesim_core::sim::Engine;
use pipesim_core::units::ProcessorDesc;
use pipesim_core::{PipelineGraph, SimResult};

#[derive(Parser, Debug)]
#[command(
    name = "pipesim",
    author,
    version,
    about = "Cycle-accurate pipeline simulator",
    long_about = "Simulate a program through a pipelined processor and print the pipeline diagram.\n\nThe processor and ISA are JSON files; the program is one instruction per line.\n\nExample:\n  pipesim run --processor cpu.json --isa isa.json program.asm"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a program and print its pipeline diagram.
    Run {
        /// Processor description (JSON).
        #[arg(short, long)]
        processor: String,

        /// ISA table (JSON).
        #[arg(short, long)]
        isa: String,

        /// Program source file, one instruction per line.
        program: String,

        /// Log every dispatch, stall, and retirement to stderr.
        #[arg(long)]
        trace: bool,

        /// Print run statistics after the diagram.
        #[arg(long)]
        stats: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            processor,
            isa,
            program,
            trace,
            stats,
        }) => cmd_run(&processor, &isa, &program, trace, stats),
        None => {
            eprintln!("pipesim — pass a subcommand");
            eprintln!();
            eprintln!("  pipesim run --processor <cpu.json> --isa <isa.json> <program>");
            eprintln!();
            eprintln!("  pipesim --help  for full options");
            process::exit(1);
        }
    }
}

/// Loads the three inputs, runs the simulation, and prints the results.
fn cmd_run(processor_path: &str, isa_path: &str, program_path: &str, trace: bool, stats: bool) {
    let spec: ProcessorSpec = decode_json(processor_path);
    let isa_spec: IsaSpec = decode_json(isa_path);
    let source = read_file(program_path);

    let desc = ProcessorDesc::from(spec);
    let graph = PipelineGraph::build(&desc).unwrap_or_else(|e| fail(processor_path, &e));

    let rows: Vec<(&str, &str)> = isa_spec
        .iter()
        .map(|row| (row.mnemonic.as_str(), row.capability.as_str()))
        .collect();
    let isa = IsaTable::load(rows, graph.supported_caps()).unwrap_or_else(|e| fail(isa_path, &e));

    let program =
        assembler::assemble(source.lines(), &isa).unwrap_or_else(|e| fail(program_path, &e));

    let result = Engine::new(&graph, &program)
        .with_trace(trace)
        .run()
        .unwrap_or_else(|e| fail(program_path, &e));

    print_diagram(&result);
    if stats {
        result.stats.print();
    }
}

/// Prints the timeline as a table: one column per cycle, one row per
/// instruction, cells holding the occupied unit.
fn print_diagram(result: &SimResult) {
    let cycles = result.cycles as usize;
    let label_width = format!("I{}", result.timelines.len().saturating_sub(1)).len();
    let cell_width = result
        .timelines
        .iter()
        .flatten()
        .map(|visit| visit.unit.as_str().len())
        .chain((1..=cycles).map(|c| c.to_string().len()))
        .max()
        .unwrap_or(1);

    print!("{:label_width$}", "");
    for cycle in 1..=cycles {
        print!(" {cycle:>cell_width$}");
    }
    println!();

    for (index, timeline) in result.timelines.iter().enumerate() {
        let mut cells = vec![""; cycles];
        for visit in timeline {
            cells[(visit.cycle - 1) as usize] = visit.unit.as_str();
        }
        print!("{:>label_width$}", format!("I{index}"));
        for cell in cells {
            print!(" {cell:>cell_width$}");
        }
        println!();
    }
}

/// Reads a whole file, exiting with a message on failure.
fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {path}: {e}");
        process::exit(1);
    })
}

/// Reads and decodes a JSON file, exiting with a message on failure.
fn decode_json<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let text = read_file(path);
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error decoding {path}: {e}");
        process::exit(1);
    })
}

/// Reports a simulator error and exits.
fn fail(path: &str, err: &dyn std::fmt::Display) -> ! {
    eprintln!("Error in {path}: {err}");
    process::exit(1);
}
