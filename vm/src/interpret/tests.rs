use proptest::prelude::*;

use super::{Arithmetic, Track, TrackConfig};
use crate::{hooks::Event, op::Opcode};

fn recording(base: u16) -> Track<Vec<Event>> {
    Track::with_hooks(base, vec![])
}

fn unmasked(base: u16) -> Track<Vec<Event>> {
    Track::with_config(
        base,
        vec![],
        TrackConfig {
            arithmetic: Arithmetic::Unmasked,
            ..Default::default()
        },
    )
}

fn pulses<H: crate::hooks::Hooks>(track: &Track<H>) -> usize {
    [
        track.syscall_pulse(),
        track.instrument_pulse(),
        track.play_pulse(),
    ]
    .into_iter()
    .filter(|p| *p)
    .count()
}

use Opcode::*;

proptest! {
    #[test]
    fn test_never_panics(
        bytecode in prop::collection::vec(prop::bits::u8::ANY, 0..512),
        base in 0..600u16,
    ) {
        let mut track = recording(base);
        for _ in 0..513 {
            track.dispatch(&bytecode);
        }
    }

    #[test]
    fn test_at_most_one_pulse_per_dispatch(
        bytecode in prop::collection::vec(prop::bits::u8::ANY, 1..128),
    ) {
        let mut track = unmasked(0);
        for _ in 0..64 {
            track.dispatch(&bytecode);
            prop_assert!(pulses(&track) <= 1);
        }
    }
}

#[test]
fn test_register_comparisons() {
    let cases = [(Equal, 8), (Gt, 7), (Lt, 9), (LtEqual, 8), (GtEqual, 8)];
    for (cmp, value) in cases {
        let bytecode = [Set as u8, 5, Add as u8, 3, cmp as u8, value, Play as u8, 1];
        let mut track = recording(0);
        track.dispatch(&bytecode);
        assert_eq!(track.register(), 8);
        assert!(track.accumulator(), "{cmp:?} {value}");
    }

    let bytecode = [Set as u8, 5, Sub as u8, 1, Equal as u8, 5, Play as u8, 1];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert!(!track.accumulator());
}

#[test]
fn test_section_loops_until_condition_flips() {
    let bytecode = [
        Section as u8,
        Add as u8,
        1,
        PlaySet as u8,
        GtEqual as u8,
        3,
        IfNotRepeat as u8,
        Halt as u8,
    ];
    let mut track = recording(0);
    let mut cursors = vec![];
    for _ in 0..4 {
        track.dispatch(&bytecode);
        cursors.push(track.cursor());
    }

    // the halt falls through into the zero byte past the end
    assert_eq!(cursors, vec![4, 4, 4, 9]);
    assert_eq!(
        track.hooks(),
        &vec![Event::Play(1), Event::Play(2), Event::Play(3), Event::Halt]
    );
    assert!(track.halted());
}

#[test]
fn test_wait_skips_exactly_n_phases() {
    let bytecode = [Wait as u8, 3, Play as u8, 10];
    let mut track = recording(0);

    track.dispatch(&bytecode);
    assert_eq!(track.wait_counter(), 3);
    for _ in 0..3 {
        track.dispatch(&bytecode);
        assert_eq!(pulses(&track), 0);
        assert_eq!(track.cursor(), 2);
    }
    track.dispatch(&bytecode);
    assert!(track.play_pulse());
    assert_eq!(track.note(), 10);
}

#[test]
fn test_wait16() {
    let bytecode = [Wait16 as u8, 0x2C, 0x01, Play as u8, 10];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert_eq!(track.wait_counter(), 300);
    assert_eq!(track.cursor(), 3);
    for _ in 0..300 {
        track.dispatch(&bytecode);
    }
    assert!(!track.play_pulse());
    track.dispatch(&bytecode);
    assert!(track.play_pulse());
}

#[test]
fn test_ticks_throttle_dispatch_phases() {
    let bytecode = [Ticks as u8, 2, Play as u8, 1, Play as u8, 2, Play as u8, 3];
    let mut track = recording(0);

    track.dispatch(&bytecode);
    assert_eq!(track.tick_rate(), 2);

    // pulses from a phase stay visible while the following frames are throttled
    let mut played = vec![];
    for _ in 0..9 {
        let before = track.hooks().len();
        track.dispatch(&bytecode);
        played.push(track.hooks().get(before).copied());
    }
    assert_eq!(
        played,
        vec![
            Some(Event::Play(1)),
            None,
            None,
            Some(Event::Play(2)),
            None,
            None,
            Some(Event::Play(3)),
            None,
            None
        ]
    );
    assert!(track.play_pulse());
}

#[test]
fn test_ticks16_is_little_endian() {
    let bytecode = [Ticks16 as u8, 0x34, 0x12];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert_eq!(track.tick_rate(), 0x1234);
    assert_eq!(track.cursor(), 3);
}

#[test]
fn test_pulses_clear_on_next_phase() {
    let bytecode = [
        Instrument as u8,
        4,
        Syscall as u8,
        0x34,
        0x12,
        Play as u8,
        60,
        Nop as u8,
    ];
    let mut track = recording(0);

    track.dispatch(&bytecode);
    assert!(track.instrument_pulse());
    assert_eq!(track.instrument(), 4);
    assert_eq!(pulses(&track), 1);

    track.dispatch(&bytecode);
    assert!(track.syscall_pulse());
    assert_eq!(track.syscall_code(), 0x1234);
    assert_eq!(pulses(&track), 1);

    track.dispatch(&bytecode);
    assert!(track.play_pulse());
    assert_eq!(pulses(&track), 1);

    track.dispatch(&bytecode);
    assert_eq!(pulses(&track), 0);
    assert_eq!(
        track.hooks(),
        &vec![Event::Instrument(4), Event::Syscall(0x1234), Event::Play(60)]
    );
}

#[test]
fn test_jump_cycle_is_cut_off() {
    let bytecode = [Jump as u8, 0, 0];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert_eq!(track.cursor(), 0);
    assert_eq!(pulses(&track), 0);
    assert!(track.hooks().is_empty());
}

#[test]
fn test_instruction_limit_counts_fetches() {
    // add, jump, add, jump, ... the 255th fetch is an add
    let bytecode = [Add as u8, 1, Jump as u8, 0, 0];
    let mut track = unmasked(0);
    track.dispatch(&bytecode);
    assert_eq!(track.register(), 128);
    assert_eq!(track.cursor(), 2);

    let mut track = Track::with_config(
        0,
        Vec::<Event>::new(),
        TrackConfig {
            max_instructions: 10,
            ..Default::default()
        },
    );
    track.dispatch(&bytecode);
    assert_eq!(track.register(), 5);
    assert_eq!(track.cursor(), 0);
}

#[test]
fn test_halt_keeps_running_the_same_phase() {
    let bytecode = [Halt as u8, Play as u8, 7];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    track.reset();
    track.hooks_mut().clear();

    track.dispatch(&bytecode);
    assert!(track.halted());
    assert_eq!(track.cursor(), 3);
    assert_eq!(track.hooks(), &vec![Event::Halt, Event::Play(7)]);

    track.dispatch(&bytecode);
    assert_eq!(track.cursor(), 3);
    assert_eq!(
        track.hooks(),
        &vec![Event::Halt, Event::Play(7), Event::Halt]
    );
}

#[test]
fn test_reset_opcode_is_played_as_note() {
    let bytecode = [Set as u8, 9, Reset as u8];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert!(track.play_pulse());
    assert_eq!(track.note(), 0xF6);
    assert_eq!(track.register(), 9);
    assert_eq!(track.cursor(), 3);
}

#[test]
fn test_bare_notes() {
    let bytecode = [0x01, 0x30, 0xE5];
    let mut track = recording(0);
    for _ in 0..3 {
        track.dispatch(&bytecode);
    }
    assert_eq!(
        track.hooks(),
        &vec![Event::Play(0x01), Event::Play(0x30), Event::Play(0xE5)]
    );
}

#[test]
fn test_conditional_jump_not_taken_skips_two_bytes() {
    // lands on the high byte of the operand, which is a nop here
    let bytecode = [IfJump as u8, 0x05, 0x00, Play as u8, 1, Play as u8, 2];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert_eq!(track.cursor(), 3);
    assert!(!track.play_pulse());

    let bytecode = [
        Set as u8,
        1,
        Equal as u8,
        1,
        IfJump as u8,
        0x09,
        0x00,
        Play as u8,
        1,
        Play as u8,
        2,
    ];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert_eq!(track.note(), 2);

    let bytecode = [IfNotJump as u8, 0x05, 0x00, Play as u8, 1, Play as u8, 2];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert_eq!(track.note(), 2);
}

#[test]
fn test_conditional_repeat() {
    let bytecode = [
        Play as u8,
        1,
        Section as u8,
        Set as u8,
        1,
        Equal as u8,
        1,
        IfRepeat as u8,
    ];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    // loops on itself until the instruction limit
    track.dispatch(&bytecode);
    assert_eq!(track.state().section_anchor, 2);
    assert!(!track.play_pulse());

    let bytecode = [Section as u8, Play as u8, 5, Repeat as u8];
    let mut track = recording(0);
    for _ in 0..3 {
        track.dispatch(&bytecode);
    }
    assert_eq!(track.hooks(), &vec![Event::Play(5); 3]);
}

#[test]
fn test_tracks_share_a_buffer() {
    let bytecode = [
        Play as u8,
        1,
        Jump as u8,
        0,
        0,
        Play as u8,
        2,
        Jump as u8,
        0,
        0,
    ];
    let mut first = recording(0);
    let mut second = recording(5);
    for _ in 0..2 {
        first.dispatch(&bytecode);
        second.dispatch(&bytecode);
    }
    assert_eq!(first.hooks(), &vec![Event::Play(1); 2]);
    assert_eq!(second.hooks(), &vec![Event::Play(2); 2]);
    assert_eq!(second.base(), 5);
    assert_eq!(second.cursor(), 2);
}

#[test]
fn test_wrapping_arithmetic() {
    let bytecode = [Set as u8, 250, Add as u8, 10, PlaySet as u8];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert_eq!(track.register(), 4);
    assert_eq!(track.note(), 4);

    let bytecode = [Set as u8, 1, Sub as u8, 3, InstrumentSet as u8];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    assert_eq!(track.register(), 254);
    assert_eq!(track.instrument(), 254);
}

#[test]
fn test_unmasked_arithmetic() {
    let bytecode = [Set as u8, 250, Add as u8, 10, Gt as u8, 255, PlaySet as u8];
    let mut track = unmasked(0);
    track.dispatch(&bytecode);
    assert_eq!(track.register(), 260);
    assert!(track.accumulator());
    assert_eq!(track.note(), 4);

    let bytecode = [Set as u8, 1, Sub as u8, 3, Lt as u8, 0, InstrumentSet as u8];
    let mut track = unmasked(0);
    track.dispatch(&bytecode);
    assert_eq!(track.register(), -2);
    assert!(track.accumulator());
    assert_eq!(track.instrument(), 2);
}

#[test]
fn test_reset_restores_defaults() {
    let bytecode = [Ticks as u8, 3, Set as u8, 7, Wait as u8, 9];
    let mut track = recording(0);
    track.dispatch(&bytecode);
    track.dispatch(&bytecode);
    track.dispatch(&bytecode);
    track.dispatch(&bytecode);
    track.dispatch(&bytecode);
    assert_ne!(track.state(), &Default::default());

    track.reset();
    assert_eq!(track.state(), &Default::default());
    assert_eq!(track.base(), 0);
}

#[test]
fn test_parked_track_only_reports_halt() {
    let bytecode = [Play as u8, 1];
    let mut track = recording(0);
    track.halt();
    track.dispatch(&bytecode);
    assert_eq!(track.hooks(), &vec![Event::Halt]);
    track.resume();
    track.dispatch(&bytecode);
    assert_eq!(track.hooks(), &vec![Event::Halt, Event::Play(1)]);
}
