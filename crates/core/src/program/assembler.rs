//! Line-oriented program assembly.
//!
//! Each non-blank, non-comment line holds one instruction: a mnemonic
//! followed by comma- or whitespace-separated register operands, the first
//! of which is the destination. A parenthesized operand such as `(R2)`
//! denotes a memory-addressing source register and is stripped to the bare
//! register name.

use crate::common::error::SimError;
use crate::common::ident::Ident;
use crate::isa::IsaTable;
use crate::program::{Instruction, Program};

/// Assembles source lines into a program, resolving each mnemonic against
/// the ISA table.
///
/// Blank lines and lines starting with `#` are ignored. Errors carry the
/// one-based line number of the offending line.
pub fn assemble<I, S>(lines: I, isa: &IsaTable) -> Result<Program, SimError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut program = Vec::new();

    for (line_no, line) in lines.into_iter().enumerate() {
        let line_no = line_no + 1;
        let text = line.as_ref().trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        program.push(parse_line(line_no, text, isa)?);
    }

    Ok(program)
}

/// Parses one non-blank source line.
fn parse_line(line_no: usize, text: &str, isa: &IsaTable) -> Result<Instruction, SimError> {
    let mut tokens = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty());

    let mnemonic = tokens
        .next()
        .ok_or(SimError::EmptyInstruction { line: line_no })?;

    let capability = isa
        .lookup(mnemonic)
        .cloned()
        .ok_or_else(|| SimError::UnknownMnemonic {
            mnemonic: mnemonic.to_string(),
            line: line_no,
        })?;

    let mut operands = tokens.map(strip_addressing);
    let destination = operands
        .next()
        .ok_or_else(|| SimError::MissingDestination {
            mnemonic: mnemonic.to_string(),
            line: line_no,
        })?;
    let sources: Vec<Ident> = operands.map(Ident::new).collect();

    Ok(Instruction {
        mnemonic: Ident::new(mnemonic),
        destination: Ident::new(destination),
        sources,
        capability,
    })
}

/// Strips the memory-addressing parentheses from an operand, if present.
/// `(R2)` and `R2` both name register `R2`; the addressing form does not
/// change hazard semantics.
fn strip_addressing(operand: &str) -> &str {
    operand
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(operand)
}
