use std::fmt;

use itertools::Itertools;

use crate::{memory::Memory, op::Op};

/// One decoded instruction and where it sits in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub offset: usize,
    pub op: Op,
}

impl Line {
    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        self.op.size()
    }
}

fn operand_of(op: Op) -> Option<u16> {
    match op {
        Op::Jump(v) | Op::IfJump(v) | Op::IfNotJump(v) | Op::Syscall(v) => Some(v),
        Op::Ticks16(v) | Op::Wait16(v) => Some(v),
        Op::Set(v)
        | Op::Add(v)
        | Op::Sub(v)
        | Op::Equal(v)
        | Op::Lt(v)
        | Op::Gt(v)
        | Op::LtEqual(v)
        | Op::GtEqual(v)
        | Op::Ticks(v)
        | Op::Wait(v)
        | Op::Instrument(v)
        | Op::Play(v)
        | Op::Note(v) => Some(v as u16),
        _ => None,
    }
}

/// Formats as a script statement, so a listing can be compiled again
impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.op.opcode(), operand_of(self.op)) {
            (Some(opcode), Some(arg)) => write!(f, "{}({arg})", opcode.mnemonic()),
            (Some(opcode), None) => write!(f, "{}()", opcode.mnemonic()),
            (None, note) => write!(f, "db({})", note.unwrap_or_default()),
        }
    }
}

/// Decode a whole buffer, front to back.
///
/// This follows byte order, not control flow: operand bytes skipped by a not-taken
/// conditional jump are still shown as part of the jump.
pub fn disassemble(bytecode: &[u8]) -> Vec<Line> {
    let memory = Memory::new(bytecode);
    let mut lines = vec![];
    let mut offset = 0;
    while offset < memory.len() {
        let op = memory.decode(offset);
        lines.push(Line { offset, op });
        offset += op.size();
    }
    lines
}

/// One `offset: statement` per line
pub fn listing(bytecode: &[u8]) -> String {
    disassemble(bytecode)
        .iter()
        .map(|line| format!("{:04}: {line}", line.offset))
        .join("\n")
}
