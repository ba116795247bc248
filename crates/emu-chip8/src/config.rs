//! CHIP-8 machine configuration.

/// Instructions executed per frame tick when nothing overrides it.
pub const DEFAULT_INSTRUCTIONS_PER_FRAME: u32 = 8;

/// CHIP-8 machine configuration.
pub struct Chip8Config {
    /// Raw ROM bytes, loaded verbatim at 0x200.
    pub rom_data: Vec<u8>,
    /// Theme table index; out-of-range values fall back to theme 0.
    pub theme: usize,
    /// Opcode budget per frame tick.
    pub instructions_per_frame: u32,
    /// Horizontal scrolls step 2 pixels instead of 4 in low resolution.
    pub legacy_scroll: bool,
}

impl Chip8Config {
    #[must_use]
    pub fn new(rom_data: Vec<u8>) -> Self {
        Self {
            rom_data,
            theme: 0,
            instructions_per_frame: DEFAULT_INSTRUCTIONS_PER_FRAME,
            legacy_scroll: false,
        }
    }
}
