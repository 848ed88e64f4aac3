use crate::op::{Op, Opcode};

/// A read-only view over assembled bytecode
///
/// Several tracks can read the same buffer, each starting at its own base.
///
/// ```text
///      track 0 (base 0)              track 1 (base 9)
///   ┌────────────────────────────┐ ┌──────────────────┐
///   │ E9 02 E7 3C EB 04 FE 00 00 │ │ E7 40 FA ...     │
///   └────────────────────────────┘ └──────────────────┘
/// ```
///
/// Reads past the end of the buffer yield `0`, which executes as a NOP.
#[derive(Clone, Copy, Debug)]
pub struct Memory<'a> {
    bytes: &'a [u8],
}

impl<'a> Memory<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn load_u8(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    /// Little-endian, low byte first
    pub fn load_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.load_u8(offset), self.load_u8(offset + 1)])
    }

    /// Decode the instruction starting at `offset`
    pub fn decode(&self, offset: usize) -> Op {
        let byte = self.load_u8(offset);
        let u8_arg = || self.load_u8(offset + 1);
        let u16_arg = || self.load_u16(offset + 1);

        let Some(opcode) = Opcode::parse(byte) else {
            return Op::Note(byte);
        };
        match opcode {
            Opcode::Nop => Op::Nop,
            Opcode::Halt => Op::Halt,
            Opcode::Jump => Op::Jump(u16_arg()),
            Opcode::IfJump => Op::IfJump(u16_arg()),
            Opcode::IfNotJump => Op::IfNotJump(u16_arg()),
            Opcode::Section => Op::Section,
            Opcode::Repeat => Op::Repeat,
            Opcode::IfRepeat => Op::IfRepeat,
            Opcode::IfNotRepeat => Op::IfNotRepeat,
            Opcode::Syscall => Op::Syscall(u16_arg()),
            Opcode::Reset => Op::Note(byte),
            Opcode::Set => Op::Set(u8_arg()),
            Opcode::Add => Op::Add(u8_arg()),
            Opcode::Sub => Op::Sub(u8_arg()),
            Opcode::Equal => Op::Equal(u8_arg()),
            Opcode::Lt => Op::Lt(u8_arg()),
            Opcode::Gt => Op::Gt(u8_arg()),
            Opcode::LtEqual => Op::LtEqual(u8_arg()),
            Opcode::GtEqual => Op::GtEqual(u8_arg()),
            Opcode::Ticks => Op::Ticks(u8_arg()),
            Opcode::Ticks16 => Op::Ticks16(u16_arg()),
            Opcode::Wait => Op::Wait(u8_arg()),
            Opcode::Wait16 => Op::Wait16(u16_arg()),
            Opcode::Instrument => Op::Instrument(u8_arg()),
            Opcode::InstrumentSet => Op::InstrumentSet,
            Opcode::Play => Op::Play(u8_arg()),
            Opcode::PlaySet => Op::PlaySet,
        }
    }
}

impl<'a> From<&'a [u8]> for Memory<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}
