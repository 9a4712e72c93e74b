//! Simulator error definitions.
//!
//! Every failure the simulator reports is a variant of [`SimError`], carrying
//! just enough context (offending name, line number, cycle) for a human
//! message. Errors are fatal to the current run; callers may retry with new
//! inputs.

use std::fmt;

/// Errors raised while building a processor, loading an ISA, assembling a
/// program, or dispatching instructions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// Two units share a case-folded name.
    DuplicateName {
        /// The colliding unit name.
        unit: String,
    },

    /// A unit references a predecessor that is not defined anywhere.
    DanglingPredecessor {
        /// The unit whose predecessor list is broken.
        unit: String,
        /// The undefined predecessor name.
        pred: String,
    },

    /// The unit graph has a cycle.
    CyclicPipeline {
        /// A unit on the cycle.
        unit: String,
    },

    /// A unit is unreachable from every entry or cannot reach any exit.
    DeadEnd {
        /// The disconnected unit.
        unit: String,
    },

    /// A capability declared on an exit is not supported along any full
    /// entry-to-exit path.
    UnreachableCapability {
        /// The unsupported capability.
        capability: String,
    },

    /// Two ISA rows share a case-folded mnemonic.
    DuplicateMnemonic {
        /// The colliding mnemonic.
        mnemonic: String,
    },

    /// An ISA row maps a mnemonic to a capability the processor cannot carry.
    UnsupportedCapability {
        /// The mnemonic being declared.
        mnemonic: String,
        /// The unsupported capability.
        capability: String,
    },

    /// A program line uses a mnemonic absent from the ISA.
    UnknownMnemonic {
        /// The unknown mnemonic.
        mnemonic: String,
        /// One-based source line number.
        line: usize,
    },

    /// A non-blank program line had no tokens after stripping.
    EmptyInstruction {
        /// One-based source line number.
        line: usize,
    },

    /// An instruction was given no operands although one is required.
    MissingDestination {
        /// The mnemonic missing its operands.
        mnemonic: String,
        /// One-based source line number.
        line: usize,
    },

    /// A simulation tick made no progress while instructions remained.
    StructuralDeadlock {
        /// The cycle at which the processor stalled.
        cycle: u32,
        /// Program index of the first blocked instruction.
        instr: usize,
        /// Why the instruction's preferred target rejected it.
        reason: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::DuplicateName { unit } => {
                write!(f, "functional unit {unit} defined more than once")
            }
            SimError::DanglingPredecessor { unit, pred } => {
                write!(f, "unit {unit} references undefined predecessor {pred}")
            }
            SimError::CyclicPipeline { unit } => {
                write!(f, "unit graph contains a cycle through {unit}")
            }
            SimError::DeadEnd { unit } => {
                write!(f, "no path through unit {unit} connects an input port to an output port")
            }
            SimError::UnreachableCapability { capability } => {
                write!(f, "capability {capability} is not supported along any full pipeline path")
            }
            SimError::DuplicateMnemonic { mnemonic } => {
                write!(f, "instruction {mnemonic} declared more than once")
            }
            SimError::UnsupportedCapability {
                mnemonic,
                capability,
            } => {
                write!(f, "instruction {mnemonic} requires unsupported capability {capability}")
            }
            SimError::UnknownMnemonic { mnemonic, line } => {
                write!(f, "unsupported instruction {mnemonic} at line {line}")
            }
            SimError::EmptyInstruction { line } => {
                write!(f, "no instruction found at line {line}")
            }
            SimError::MissingDestination { mnemonic, line } => {
                write!(f, "no operands provided for instruction {mnemonic} at line {line}")
            }
            SimError::StructuralDeadlock {
                cycle,
                instr,
                reason,
            } => {
                write!(f, "processor stalled at cycle {cycle}: instruction {instr} {reason}")
            }
        }
    }
}

impl std::error::Error for SimError {}
