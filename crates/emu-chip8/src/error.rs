//! Interpreter error types.

use std::fmt;

use crate::cpu::{MAX_ROM_SIZE, STACK_DEPTH};

/// Fatal interpreter errors.
///
/// Unknown opcodes are deliberately not represented here: they are
/// non-fatal diagnostics and execution continues past them. Everything
/// in this enum stops the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Error {
    /// The ROM does not fit in the 3,584 bytes above the program origin.
    RomTooLarge(usize),
    /// A subroutine call exceeded the 16-entry return stack.
    StackOverflow,
    /// A return executed with an empty return stack.
    StackUnderflow,
}

impl fmt::Display for Chip8Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RomTooLarge(size) => write!(
                f,
                "ROM is {size} bytes; at most {MAX_ROM_SIZE} fit above 0x200",
            ),
            Self::StackOverflow => {
                write!(f, "call stack overflow (depth limit {STACK_DEPTH})")
            }
            Self::StackUnderflow => write!(f, "return with empty call stack"),
        }
    }
}

impl std::error::Error for Chip8Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_limit() {
        let msg = Chip8Error::RomTooLarge(4000).to_string();
        assert!(msg.contains("4000"));
        assert!(msg.contains("3584"));
    }
}
