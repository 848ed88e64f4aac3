//! A tick-driven bytecode sequencer for tiny console music.
//!
//! A [Track] walks a byte buffer one frame at a time and reports notes, instrument
//! changes, halts and syscalls to its [Hooks].
//!
//! ```
//! use vm::{hooks::Event, op::Opcode, Track};
//!
//! let bytecode = [Opcode::Play as u8, 60, Opcode::Halt as u8];
//! let mut track = Track::with_hooks(0, Vec::<Event>::new());
//! track.dispatch(&bytecode);
//! track.dispatch(&bytecode);
//! assert_eq!(track.hooks(), &vec![Event::Play(60), Event::Halt]);
//! ```
pub mod disasm;
pub mod hooks;
pub mod interpret;
pub mod memory;
pub mod op;
pub mod state;

pub use hooks::{Event, Hooks, NoopHooks};
pub use interpret::{Arithmetic, Track, TrackConfig};
pub use memory::Memory;
