//! Scripts and assembly for the sequencer.
//!
//! ```
//! let bytecode = lang::compile_source("loop: play(60) wait(8) jump(loop)").unwrap();
//! assert_eq!(bytecode, [0xE7, 60, 0xEB, 8, 0xFE, 0, 0, 0xFF]);
//! ```
pub mod assemble;
pub mod compile;
pub mod generate;
pub mod parse;

pub use assemble::Assembler;
pub use compile::{compile, compile_source, CompileError};
