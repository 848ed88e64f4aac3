/// Everything a track mutates while it runs
///
/// [crate::interpret::Track::reset] puts all of this back to [Default].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackState {
    /// Offset of the next instruction, relative to the track's base
    pub cursor: u16,
    /// Frames left before the next dispatch phase
    pub tick_counter: u16,
    /// Saved cursor for the repeat family. Only written by [crate::op::Opcode::Section].
    pub section_anchor: u16,
    /// Scratch register.
    ///
    /// Held wide so [crate::interpret::Arithmetic::Unmasked] can leave the 8 bit range.
    pub register: i32,
    /// Result of the last comparison
    pub accumulator: bool,
    pub instrument: u8,
    pub note: u8,
    pub syscall_code: u16,
    /// Frames to wait between dispatch phases
    pub tick_rate: u16,
    /// Dispatch phases left in an explicit pause
    pub wait_counter: u16,
    /// Sticky until reset
    pub halted: bool,
    pub syscall_pulse: bool,
    pub instrument_pulse: bool,
    pub play_pulse: bool,
}

impl TrackState {
    pub fn clear_pulses(&mut self) {
        self.syscall_pulse = false;
        self.instrument_pulse = false;
        self.play_pulse = false;
    }
}
