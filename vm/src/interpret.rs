use crate::{
    hooks::{Hooks, NoopHooks},
    memory::Memory,
    op::Op,
    state::TrackState,
};
use tracing::{instrument, trace};

/// How `add` and `sub` treat the register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Arithmetic {
    /// Wrap around at 8 bits, like every other value in the VM
    #[default]
    Wrapping,
    /// Let the register leave `0..=255`, so comparisons see the raw value.
    ///
    /// `playset` and `instrumentset` reduce it with the assembler's rule (`|r| mod 256`).
    Unmasked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackConfig {
    /// The maximum number of instructions fetched by one dispatch phase.
    ///
    /// When this is reached the phase ends early so a program that never plays, waits or
    /// syscalls cannot hang the host's frame loop.
    pub max_instructions: usize,
    pub arithmetic: Arithmetic,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            max_instructions: 255,
            arithmetic: Arithmetic::default(),
        }
    }
}

/// One music channel running over a shared bytecode buffer
#[derive(Clone, Debug)]
pub struct Track<H = NoopHooks> {
    /// Where this track's program starts in the buffer
    base: u16,
    config: TrackConfig,
    state: TrackState,
    hooks: H,
}

impl Track<NoopHooks> {
    pub fn new(base: u16) -> Self {
        Self::with_hooks(base, NoopHooks)
    }
}

impl<H: Hooks> Track<H> {
    pub fn with_hooks(base: u16, hooks: H) -> Self {
        Self::with_config(base, hooks, TrackConfig::default())
    }

    pub fn with_config(base: u16, hooks: H, config: TrackConfig) -> Self {
        Self {
            base,
            config,
            state: TrackState::default(),
            hooks,
        }
    }

    /// Advance one frame.
    ///
    /// Most frames are swallowed by the tick rate or a pending wait. The rest run
    /// instructions until one of them ends the phase.
    #[instrument(skip(self, bytecode), fields(base = self.base))]
    pub fn dispatch(&mut self, bytecode: &[u8]) {
        if self.state.halted {
            self.hooks.on_halt();
            return;
        }

        if self.state.tick_counter > 0 {
            self.state.tick_counter -= 1;
            return;
        }
        self.state.tick_counter = self.state.tick_rate;

        // pulses only live for the phase that raised them
        self.state.clear_pulses();

        if self.state.wait_counter > 0 {
            self.state.wait_counter -= 1;
            return;
        }

        let memory = Memory::new(bytecode);
        for _ in 0..self.config.max_instructions {
            #[cfg(feature = "tracing")]
            tracy_client::plot!("cursor", self.state.cursor as f64);

            let op = memory.decode(self.base as usize + self.state.cursor as usize);
            trace!(cursor = self.state.cursor, ?op);
            self.run_op(op);
            if op.ends_tick() {
                return;
            }
        }
        trace!("instruction limit reached");
    }

    fn run_op(&mut self, op: Op) {
        match op {
            Op::Nop => self.advance(1),
            Op::Halt => {
                self.state.halted = true;
                self.advance(1);
                self.hooks.on_halt();
            }
            Op::Jump(target) => self.state.cursor = target,
            Op::IfJump(target) => self.branch(self.state.accumulator, target, 2),
            Op::IfNotJump(target) => self.branch(!self.state.accumulator, target, 2),
            Op::Section => {
                self.state.section_anchor = self.state.cursor;
                self.advance(1);
            }
            Op::Repeat => self.state.cursor = self.state.section_anchor,
            Op::IfRepeat => self.branch(self.state.accumulator, self.state.section_anchor, 1),
            Op::IfNotRepeat => self.branch(!self.state.accumulator, self.state.section_anchor, 1),
            Op::Syscall(code) => {
                self.state.syscall_code = code;
                self.state.syscall_pulse = true;
                self.advance(3);
                self.hooks.on_syscall(code);
            }
            Op::Set(value) => {
                self.state.register = value as i32;
                self.advance(2);
            }
            Op::Add(value) => {
                let register = self.state.register;
                self.state.register = self.config.arithmetic.add(register, value as i32);
                self.advance(2);
            }
            Op::Sub(value) => {
                let register = self.state.register;
                self.state.register = self.config.arithmetic.add(register, -(value as i32));
                self.advance(2);
            }
            Op::Equal(value) => self.compare(|r| r == value as i32),
            Op::Lt(value) => self.compare(|r| r < value as i32),
            Op::Gt(value) => self.compare(|r| r > value as i32),
            Op::LtEqual(value) => self.compare(|r| r <= value as i32),
            Op::GtEqual(value) => self.compare(|r| r >= value as i32),
            Op::Ticks(rate) => {
                self.state.tick_rate = rate as u16;
                self.advance(2);
            }
            Op::Ticks16(rate) => {
                self.state.tick_rate = rate;
                self.advance(3);
            }
            Op::Wait(frames) => {
                self.state.wait_counter = frames as u16;
                self.advance(2);
            }
            Op::Wait16(frames) => {
                self.state.wait_counter = frames;
                self.advance(3);
            }
            Op::Instrument(instrument) => self.select_instrument(instrument, 2),
            Op::InstrumentSet => self.select_instrument(register_byte(self.state.register), 1),
            Op::Play(note) => self.play(note, 2),
            Op::PlaySet => self.play(register_byte(self.state.register), 1),
            Op::Note(note) => self.play(note, 1),
        }
    }

    fn advance(&mut self, bytes: u16) {
        self.state.cursor = self.state.cursor.wrapping_add(bytes);
    }

    /// Take `target` when `taken`, otherwise step over `skip` bytes
    fn branch(&mut self, taken: bool, target: u16, skip: u16) {
        if taken {
            self.state.cursor = target;
        } else {
            self.advance(skip);
        }
    }

    fn compare(&mut self, predicate: impl Fn(i32) -> bool) {
        self.state.accumulator = predicate(self.state.register);
        self.advance(2);
    }

    fn select_instrument(&mut self, instrument: u8, size: u16) {
        self.state.instrument = instrument;
        self.state.instrument_pulse = true;
        self.advance(size);
        self.hooks.on_instrument(instrument);
    }

    fn play(&mut self, note: u8, size: u16) {
        self.state.note = note;
        self.state.play_pulse = true;
        self.advance(size);
        self.hooks.on_play(note);
    }

    /// Put every field back to its default. The bytecode is left alone.
    pub fn reset(&mut self) {
        self.state = TrackState::default();
    }

    pub fn base(&self) -> u16 {
        self.base
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn cursor(&self) -> u16 {
        self.state.cursor
    }

    pub fn register(&self) -> i32 {
        self.state.register
    }

    pub fn accumulator(&self) -> bool {
        self.state.accumulator
    }

    pub fn tick_rate(&self) -> u16 {
        self.state.tick_rate
    }

    pub fn wait_counter(&self) -> u16 {
        self.state.wait_counter
    }

    pub fn halted(&self) -> bool {
        self.state.halted
    }

    pub fn syscall_pulse(&self) -> bool {
        self.state.syscall_pulse
    }

    pub fn syscall_code(&self) -> u16 {
        self.state.syscall_code
    }

    pub fn instrument_pulse(&self) -> bool {
        self.state.instrument_pulse
    }

    pub fn instrument(&self) -> u8 {
        self.state.instrument
    }

    pub fn play_pulse(&self) -> bool {
        self.state.play_pulse
    }

    pub fn note(&self) -> u8 {
        self.state.note
    }

    /// Mark the track halted without running anything.
    ///
    /// Hosts use this to park a track until they start it with [Track::resume].
    pub fn halt(&mut self) {
        self.state.halted = true;
    }

    pub fn resume(&mut self) {
        self.state.halted = false;
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }
}

impl Arithmetic {
    fn add(self, register: i32, value: i32) -> i32 {
        match self {
            Arithmetic::Wrapping => (register + value).rem_euclid(256),
            Arithmetic::Unmasked => register.wrapping_add(value),
        }
    }
}

/// Reduce the register to a byte the way the assembler coerces operands
fn register_byte(register: i32) -> u8 {
    (register.unsigned_abs() % 256) as u8
}

#[cfg(test)]
mod tests;
