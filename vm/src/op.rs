#[cfg(test)]
use proptest_derive::Arbitrary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(test, derive(Arbitrary))]
#[repr(u8)]
pub enum Opcode {
    /// End the tick without doing anything
    Nop = 0x00,
    /// Stop the track. Later ticks only report the halt again.
    Halt = 0xFF,
    /// Move the cursor to an offset within the program
    Jump = 0xFE,
    /// [Opcode::Jump] when the accumulator is set
    IfJump = 0xFD,
    /// [Opcode::Jump] when the accumulator is clear
    IfNotJump = 0xFC,
    /// Remember the current cursor as the section anchor
    Section = 0xFB,
    /// Go back to the section anchor
    Repeat = 0xFA,
    IfRepeat = 0xF9,
    IfNotRepeat = 0xF8,
    /// Ask the host to run an external call with a 16 bit code
    Syscall = 0xF7,
    /// Assembled like any other opcode, but never dispatched: the VM plays it as a note.
    Reset = 0xF6,
    Set = 0xF5,
    Add = 0xF4,
    Sub = 0xF3,
    Equal = 0xF2,
    Lt = 0xF1,
    Gt = 0xF0,
    LtEqual = 0xEF,
    GtEqual = 0xEE,
    /// Frames to wait between dispatch phases
    Ticks = 0xED,
    Ticks16 = 0xEC,
    /// Skip the next `n` dispatch phases
    Wait = 0xEB,
    Wait16 = 0xEA,
    Instrument = 0xE9,
    /// Select the instrument held in the register
    InstrumentSet = 0xE8,
    Play = 0xE7,
    /// Play the note held in the register
    PlaySet = 0xE6,
}

/// Width of the operand following an opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    U8,
    U16,
}

impl Operand {
    pub fn len(self) -> usize {
        match self {
            Operand::None => 0,
            Operand::U8 => 1,
            Operand::U16 => 2,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Operand::None
    }
}

impl Opcode {
    pub const ALL: [Opcode; 27] = [
        Opcode::Nop,
        Opcode::Halt,
        Opcode::Jump,
        Opcode::IfJump,
        Opcode::IfNotJump,
        Opcode::Section,
        Opcode::Repeat,
        Opcode::IfRepeat,
        Opcode::IfNotRepeat,
        Opcode::Syscall,
        Opcode::Reset,
        Opcode::Set,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Equal,
        Opcode::Lt,
        Opcode::Gt,
        Opcode::LtEqual,
        Opcode::GtEqual,
        Opcode::Ticks,
        Opcode::Ticks16,
        Opcode::Wait,
        Opcode::Wait16,
        Opcode::Instrument,
        Opcode::InstrumentSet,
        Opcode::Play,
        Opcode::PlaySet,
    ];

    /// Look up the opcode for a byte. Anything unknown is a bare note.
    pub fn parse(byte: u8) -> Option<Opcode> {
        Self::ALL.iter().copied().find(|op| *op as u8 == byte)
    }

    pub fn operand(self) -> Operand {
        match self {
            Opcode::Jump
            | Opcode::IfJump
            | Opcode::IfNotJump
            | Opcode::Syscall
            | Opcode::Ticks16
            | Opcode::Wait16 => Operand::U16,
            Opcode::Set
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Equal
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::LtEqual
            | Opcode::GtEqual
            | Opcode::Ticks
            | Opcode::Wait
            | Opcode::Instrument
            | Opcode::Play => Operand::U8,
            Opcode::Nop
            | Opcode::Halt
            | Opcode::Section
            | Opcode::Repeat
            | Opcode::IfRepeat
            | Opcode::IfNotRepeat
            | Opcode::Reset
            | Opcode::InstrumentSet
            | Opcode::PlaySet => Operand::None,
        }
    }

    /// Encoded size in bytes, opcode included
    pub fn size(self) -> usize {
        1 + self.operand().len()
    }

    /// The lowercase name used by the assembler and the script language
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Halt => "halt",
            Opcode::Jump => "jump",
            Opcode::IfJump => "ifjump",
            Opcode::IfNotJump => "ifnotjump",
            Opcode::Section => "section",
            Opcode::Repeat => "repeat",
            Opcode::IfRepeat => "ifrepeat",
            Opcode::IfNotRepeat => "ifnotrepeat",
            Opcode::Syscall => "syscall",
            Opcode::Reset => "reset",
            Opcode::Set => "set",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Equal => "equal",
            Opcode::Lt => "lt",
            Opcode::Gt => "gt",
            Opcode::LtEqual => "ltequal",
            Opcode::GtEqual => "gtequal",
            Opcode::Ticks => "ticks",
            Opcode::Ticks16 => "ticks16",
            Opcode::Wait => "wait",
            Opcode::Wait16 => "wait16",
            Opcode::Instrument => "instrument",
            Opcode::InstrumentSet => "instrumentset",
            Opcode::Play => "play",
            Opcode::PlaySet => "playset",
        }
    }

    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        Self::ALL.iter().copied().find(|op| op.mnemonic() == name)
    }
}

/// A decoded instruction, as seen by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Nop,
    Halt,
    Jump(u16),
    IfJump(u16),
    IfNotJump(u16),
    Section,
    Repeat,
    IfRepeat,
    IfNotRepeat,
    Syscall(u16),
    Set(u8),
    Add(u8),
    Sub(u8),
    Equal(u8),
    Lt(u8),
    Gt(u8),
    LtEqual(u8),
    GtEqual(u8),
    Ticks(u8),
    Ticks16(u16),
    Wait(u8),
    Wait16(u16),
    Instrument(u8),
    InstrumentSet,
    Play(u8),
    PlaySet,
    /// Any byte without a dispatch rule, [Opcode::Reset] included
    Note(u8),
}

impl Op {
    /// The opcode this op was decoded from. Bare notes have none.
    pub fn opcode(&self) -> Option<Opcode> {
        let opcode = match self {
            Op::Nop => Opcode::Nop,
            Op::Halt => Opcode::Halt,
            Op::Jump(_) => Opcode::Jump,
            Op::IfJump(_) => Opcode::IfJump,
            Op::IfNotJump(_) => Opcode::IfNotJump,
            Op::Section => Opcode::Section,
            Op::Repeat => Opcode::Repeat,
            Op::IfRepeat => Opcode::IfRepeat,
            Op::IfNotRepeat => Opcode::IfNotRepeat,
            Op::Syscall(_) => Opcode::Syscall,
            Op::Set(_) => Opcode::Set,
            Op::Add(_) => Opcode::Add,
            Op::Sub(_) => Opcode::Sub,
            Op::Equal(_) => Opcode::Equal,
            Op::Lt(_) => Opcode::Lt,
            Op::Gt(_) => Opcode::Gt,
            Op::LtEqual(_) => Opcode::LtEqual,
            Op::GtEqual(_) => Opcode::GtEqual,
            Op::Ticks(_) => Opcode::Ticks,
            Op::Ticks16(_) => Opcode::Ticks16,
            Op::Wait(_) => Opcode::Wait,
            Op::Wait16(_) => Opcode::Wait16,
            Op::Instrument(_) => Opcode::Instrument,
            Op::InstrumentSet => Opcode::InstrumentSet,
            Op::Play(_) => Opcode::Play,
            Op::PlaySet => Opcode::PlaySet,
            Op::Note(_) => return None,
        };
        Some(opcode)
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        self.opcode().map_or(1, Opcode::size)
    }

    /// Whether executing this op ends the current dispatch phase
    pub fn ends_tick(&self) -> bool {
        matches!(
            self,
            Op::Nop
                | Op::Syscall(_)
                | Op::Ticks(_)
                | Op::Ticks16(_)
                | Op::Wait(_)
                | Op::Wait16(_)
                | Op::Instrument(_)
                | Op::InstrumentSet
                | Op::Play(_)
                | Op::PlaySet
                | Op::Note(_)
        )
    }
}
