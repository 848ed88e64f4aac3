use vm::op::{Opcode, Operand as Width};

/// Anything that can be squeezed into an operand.
///
/// Values are never rejected: the magnitude is taken modulo the operand's range, so
/// `-3` becomes `3` and `300` becomes `44` for a byte. Floats are truncated, and NaN or
/// infinities become `0`.
pub trait Operand: Copy {
    /// `|self| mod modulus`
    fn coerce(self, modulus: u32) -> u32;
}

macro_rules! unsigned_operand {
    ($($t:ty),*) => {$(
        impl Operand for $t {
            fn coerce(self, modulus: u32) -> u32 {
                (self as u128 % modulus as u128) as u32
            }
        }
    )*};
}

macro_rules! signed_operand {
    ($($t:ty),*) => {$(
        impl Operand for $t {
            fn coerce(self, modulus: u32) -> u32 {
                (self.unsigned_abs() as u128 % modulus as u128) as u32
            }
        }
    )*};
}

unsigned_operand!(u8, u16, u32, u64, u128, usize);
signed_operand!(i8, i16, i32, i64, i128, isize);

impl Operand for f64 {
    fn coerce(self, modulus: u32) -> u32 {
        if !self.is_finite() {
            return 0;
        }
        (self.abs() % modulus as f64).trunc() as u32
    }
}

impl Operand for f32 {
    fn coerce(self, modulus: u32) -> u32 {
        (self as f64).coerce(modulus)
    }
}

pub fn coerce8(value: impl Operand) -> u8 {
    value.coerce(1 << 8) as u8
}

pub fn coerce16(value: impl Operand) -> u16 {
    value.coerce(1 << 16) as u16
}

/// Builds bytecode one mnemonic at a time
///
/// ```
/// use lang::assemble::Assembler;
///
/// let mut asm = Assembler::default();
/// asm.instrument(2).play(60).wait(8).halt();
/// assert_eq!(asm.bytes(), &[0xE9, 2, 0xE7, 60, 0xEB, 8, 0xFF]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembler {
    bytecode: Vec<u8>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes written so far, which is also the offset of the next instruction
    pub fn len(&self) -> usize {
        self.bytecode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytecode
    }

    /// Throw away everything written so far
    pub fn clear(&mut self) {
        self.bytecode.clear();
    }

    /// Append an opcode followed by its operand, sized by the opcode.
    ///
    /// `arg` is ignored for opcodes that take no operand.
    pub fn emit(&mut self, opcode: Opcode, arg: impl Operand) -> &mut Self {
        self.bytecode.push(opcode as u8);
        match opcode.operand() {
            Width::None => {}
            Width::U8 => self.bytecode.push(coerce8(arg)),
            Width::U16 => self.bytecode.extend(coerce16(arg).to_le_bytes()),
        }
        self
    }

    fn op(&mut self, opcode: Opcode) -> &mut Self {
        self.emit(opcode, 0u8)
    }

    /// Raw bytes, each coerced to 8 bits. Handy for bare notes.
    pub fn db<T: Operand>(&mut self, bytes: &[T]) -> &mut Self {
        self.bytecode.extend(bytes.iter().map(|b| coerce8(*b)));
        self
    }

    pub fn nop(&mut self) -> &mut Self {
        self.op(Opcode::Nop)
    }

    pub fn halt(&mut self) -> &mut Self {
        self.op(Opcode::Halt)
    }

    pub fn jump(&mut self, offset: impl Operand) -> &mut Self {
        self.emit(Opcode::Jump, offset)
    }

    pub fn ifjump(&mut self, offset: impl Operand) -> &mut Self {
        self.emit(Opcode::IfJump, offset)
    }

    pub fn ifnotjump(&mut self, offset: impl Operand) -> &mut Self {
        self.emit(Opcode::IfNotJump, offset)
    }

    pub fn section(&mut self) -> &mut Self {
        self.op(Opcode::Section)
    }

    pub fn repeat(&mut self) -> &mut Self {
        self.op(Opcode::Repeat)
    }

    pub fn ifrepeat(&mut self) -> &mut Self {
        self.op(Opcode::IfRepeat)
    }

    pub fn ifnotrepeat(&mut self) -> &mut Self {
        self.op(Opcode::IfNotRepeat)
    }

    pub fn syscall(&mut self, code: impl Operand) -> &mut Self {
        self.emit(Opcode::Syscall, code)
    }

    /// Emits the `reset` opcode. The VM has no rule for it and plays it as note `0xF6`.
    pub fn reset(&mut self) -> &mut Self {
        self.op(Opcode::Reset)
    }

    pub fn set(&mut self, value: impl Operand) -> &mut Self {
        self.emit(Opcode::Set, value)
    }

    pub fn add(&mut self, value: impl Operand) -> &mut Self {
        self.emit(Opcode::Add, value)
    }

    pub fn sub(&mut self, value: impl Operand) -> &mut Self {
        self.emit(Opcode::Sub, value)
    }

    pub fn equal(&mut self, value: impl Operand) -> &mut Self {
        self.emit(Opcode::Equal, value)
    }

    pub fn lt(&mut self, value: impl Operand) -> &mut Self {
        self.emit(Opcode::Lt, value)
    }

    pub fn gt(&mut self, value: impl Operand) -> &mut Self {
        self.emit(Opcode::Gt, value)
    }

    pub fn ltequal(&mut self, value: impl Operand) -> &mut Self {
        self.emit(Opcode::LtEqual, value)
    }

    pub fn gtequal(&mut self, value: impl Operand) -> &mut Self {
        self.emit(Opcode::GtEqual, value)
    }

    pub fn ticks(&mut self, rate: impl Operand) -> &mut Self {
        self.emit(Opcode::Ticks, rate)
    }

    pub fn ticks16(&mut self, rate: impl Operand) -> &mut Self {
        self.emit(Opcode::Ticks16, rate)
    }

    pub fn wait(&mut self, frames: impl Operand) -> &mut Self {
        self.emit(Opcode::Wait, frames)
    }

    pub fn wait16(&mut self, frames: impl Operand) -> &mut Self {
        self.emit(Opcode::Wait16, frames)
    }

    pub fn instrument(&mut self, index: impl Operand) -> &mut Self {
        self.emit(Opcode::Instrument, index)
    }

    pub fn instrumentset(&mut self) -> &mut Self {
        self.op(Opcode::InstrumentSet)
    }

    pub fn play(&mut self, note: impl Operand) -> &mut Self {
        self.emit(Opcode::Play, note)
    }

    pub fn playset(&mut self) -> &mut Self {
        self.op(Opcode::PlaySet)
    }
}

impl From<Assembler> for Vec<u8> {
    fn from(asm: Assembler) -> Self {
        asm.into_bytes()
    }
}
