//! CHIP-8 / SUPER-CHIP interpreter.
//!
//! The machine executes a fixed opcode budget per frame tick, with both
//! timers decrementing once per tick; a frontend driving
//! [`Chip8::run_frame`] at ~60 Hz reproduces the classic timing.
//!
//! SUPER-CHIP extensions covered: 128x64 high resolution, the scroll
//! opcodes, interpreter exit, and the 00FA compatibility toggle that
//! switches the shift and register-transfer instructions to their
//! original COSMAC semantics.

#[cfg(feature = "native")]
pub mod audio;
mod chip8;
mod config;
pub mod cpu;
pub mod display;
mod error;
pub mod input;
pub mod instruction;
#[cfg(feature = "native")]
pub mod keyboard_map;
pub mod palette;

pub use chip8::Chip8;
pub use config::{Chip8Config, DEFAULT_INSTRUCTIONS_PER_FRAME};
pub use error::Chip8Error;
