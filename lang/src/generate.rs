use itertools::Itertools;
use rand::prelude::*;
use tracing::instrument;

/// Intervals the generator picks notes from, a major scale over an octave and a half
const SCALE: [u8; 10] = [0, 2, 4, 5, 7, 9, 11, 12, 14, 16];

/// A random, well formed script: an instrument, a riff and an ending that loops back to
/// the riff or stops.
pub fn generate() -> String {
    generate_with(&mut thread_rng())
}

#[instrument(skip(rng))]
pub fn generate_with<R: Rng>(rng: &mut R) -> String {
    let root = rng.gen_range(24..48u8);
    let riff = format!("riff{}", rng.gen_range(0..100));
    let mut lines = vec![
        format!("instrument({})", rng.gen_range(0..6)),
        format!("ticks({})", rng.gen_range(0..4)),
        format!("{riff}:"),
        "section()".to_string(),
    ];

    for skip in 0..rng.gen_range(2..12) {
        let note = root + SCALE.choose(rng).copied().unwrap_or(0);
        let line = match rng.gen_range(0..14) {
            0 => format!("play({note})"),
            1 => format!("db({note})"),
            2 => format!("wait({})", rng.gen_range(1..16)),
            3 => format!("wait16({})", rng.gen_range(16..600)),
            4 => format!("set({note}) playset()"),
            5 => format!("set({}) instrumentset()", rng.gen_range(0..6)),
            6 => format!(
                "set({note}) section() add({}) playset() wait({}) lt({}) ifrepeat()",
                rng.gen_range(1..4),
                rng.gen_range(1..8),
                note + 12
            ),
            7 => format!(
                "set({}) section() sub(1) play({note}) ltequal(0) ifnotrepeat()",
                rng.gen_range(1..5)
            ),
            8 => format!(
                "set({0}) equal({0}) ifjump(skip{skip}) play({note}) skip{skip}:",
                rng.gen_range(0..8)
            ),
            9 => format!(
                "set({}) gt({}) ifnotjump(skip{skip}) gtequal(0) play({note}) skip{skip}:",
                rng.gen_range(0..8),
                rng.gen_range(0..8)
            ),
            10 => format!("syscall({:#x})", rng.gen_range(0..0x10000)),
            11 => format!("ticks16({})", rng.gen_range(0..300)),
            12 => "nop()".to_string(),
            _ => "reset()".to_string(),
        };
        lines.push(line);
    }

    let ending = match rng.gen_range(0..3) {
        0 => format!("jump({riff})"),
        1 => "repeat()".to_string(),
        _ => "halt()".to_string(),
    };
    lines.push(ending);
    lines.into_iter().join("\n")
}
