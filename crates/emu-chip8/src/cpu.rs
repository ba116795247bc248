//! Machine state and opcode execution.
//!
//! `step` runs one fetch-decode-execute cycle: read the big-endian word
//! at pc, advance pc by 2, decode, then one exhaustive match mutates
//! the state. The pc advance happens before execution, so jump, call
//! and return targets are taken literally.
//!
//! All memory accesses derived from the index register or the program
//! counter are masked into the 4 KB address space, so out-of-range
//! addresses wrap deterministically instead of faulting.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Keypad;
use crate::instruction::Instruction;

/// Addressable memory size.
pub const MEM_SIZE: usize = 4096;

/// Program load address.
pub const PROGRAM_START: u16 = 0x200;

/// Largest ROM that fits above the program origin.
pub const MAX_ROM_SIZE: usize = MEM_SIZE - PROGRAM_START as usize;

/// Call stack depth.
pub const STACK_DEPTH: usize = 16;

/// General-purpose register count.
pub const REGISTER_COUNT: usize = 16;

/// Bytes per font glyph.
const GLYPH_SIZE: u16 = 5;

/// The 16-glyph hex font, resident at 0x000.
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// What one executed instruction asks of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Carry on with the next instruction.
    Continue,
    /// FX0A: suspend issuance until a key press lands in register X.
    AwaitKey(u8),
    /// 00FD: stop the interpreter.
    Stop,
}

pub struct Cpu {
    pub(crate) memory: [u8; MEM_SIZE],
    pub(crate) v: [u8; REGISTER_COUNT],
    pub(crate) i: u16,
    pub(crate) pc: u16,
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) sp: usize,
    pub(crate) delay: u8,
    pub(crate) sound: u8,
    pub(crate) compat_mode: bool,
    pub(crate) legacy_scroll: bool,
    rng: StdRng,
}

impl Cpu {
    /// Power-on state: zeroed registers and memory, font resident,
    /// pc at the program origin.
    #[must_use]
    pub fn new() -> Self {
        let mut memory = [0; MEM_SIZE];
        memory[..FONT.len()].copy_from_slice(&FONT);
        Self {
            memory,
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay: 0,
            sound: 0,
            compat_mode: false,
            legacy_scroll: false,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Load a ROM at the program origin. The length check happens
    /// before any byte is copied, so a failed load changes nothing.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge(rom.len()));
        }
        let start = usize::from(PROGRAM_START);
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Decrement both timers once; each saturates at zero.
    pub fn tick_timers(&mut self) {
        if self.delay > 0 {
            self.delay -= 1;
        }
        if self.sound > 0 {
            self.sound -= 1;
        }
    }

    /// Run one fetch-decode-execute cycle.
    pub fn step(
        &mut self,
        display: &mut Display,
        keypad: &Keypad,
    ) -> Result<StepOutcome, Chip8Error> {
        let word = self.fetch();
        self.pc = self.pc.wrapping_add(2);

        let Some(instruction) = Instruction::decode(word) else {
            eprintln!(
                "unknown opcode {word:#06X} at {:#05X}",
                self.pc.wrapping_sub(2)
            );
            return Ok(StepOutcome::Continue);
        };

        self.execute(instruction, display, keypad)
    }

    fn fetch(&self) -> u16 {
        let hi = self.read_byte(self.pc);
        let lo = self.read_byte(self.pc.wrapping_add(1));
        u16::from(hi) << 8 | u16::from(lo)
    }

    fn execute(
        &mut self,
        instruction: Instruction,
        display: &mut Display,
        keypad: &Keypad,
    ) -> Result<StepOutcome, Chip8Error> {
        match instruction {
            Instruction::ClearScreen => display.clear(),
            Instruction::Return => {
                if self.sp == 0 {
                    return Err(Chip8Error::StackUnderflow);
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
            }
            Instruction::ScrollDown(n) => display.scroll_down(usize::from(n)),
            Instruction::ScrollUp(n) => display.scroll_up(usize::from(n)),
            Instruction::ScrollRight => display.scroll_right(self.scroll_step(display)),
            Instruction::ScrollLeft => display.scroll_left(self.scroll_step(display)),
            Instruction::ToggleCompat => self.compat_mode = !self.compat_mode,
            Instruction::Exit => return Ok(StepOutcome::Stop),
            Instruction::LowRes => display.set_high_res(false),
            Instruction::HighRes => display.set_high_res(true),
            Instruction::Jump(nnn) => self.pc = nnn,
            Instruction::Call(nnn) => {
                if self.sp == STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow);
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }
            Instruction::SkipEqImm(x, nn) => {
                self.skip_if(self.v[usize::from(x)] == nn);
            }
            Instruction::SkipNeImm(x, nn) => {
                self.skip_if(self.v[usize::from(x)] != nn);
            }
            Instruction::SkipEq(x, y) => {
                self.skip_if(self.v[usize::from(x)] == self.v[usize::from(y)]);
            }
            Instruction::SkipNe(x, y) => {
                self.skip_if(self.v[usize::from(x)] != self.v[usize::from(y)]);
            }
            Instruction::SetImm(x, nn) => self.v[usize::from(x)] = nn,
            Instruction::AddImm(x, nn) => {
                let x = usize::from(x);
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Instruction::Assign(x, y) => self.v[usize::from(x)] = self.v[usize::from(y)],
            Instruction::Or(x, y) => {
                self.v[usize::from(x)] |= self.v[usize::from(y)];
                self.logic_quirk(display);
            }
            Instruction::And(x, y) => {
                self.v[usize::from(x)] &= self.v[usize::from(y)];
                self.logic_quirk(display);
            }
            Instruction::Xor(x, y) => {
                self.v[usize::from(x)] ^= self.v[usize::from(y)];
                self.logic_quirk(display);
            }
            Instruction::Add(x, y) => {
                let (x, y) = (usize::from(x), usize::from(y));
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = sum;
                self.v[0xF] = u8::from(carry);
            }
            Instruction::Sub(x, y) => {
                let (x, y) = (usize::from(x), usize::from(y));
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[x] = vx.wrapping_sub(vy);
                self.v[0xF] = u8::from(vx >= vy);
            }
            Instruction::SubFrom(x, y) => {
                let (x, y) = (usize::from(x), usize::from(y));
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[x] = vy.wrapping_sub(vx);
                self.v[0xF] = u8::from(vy >= vx);
            }
            Instruction::ShiftRight(x, y) => {
                let (x, y) = (usize::from(x), usize::from(y));
                let source = if self.compat_mode { self.v[x] } else { self.v[y] };
                let carry = source & 1;
                self.v[x] = source >> 1;
                self.v[0xF] = carry;
            }
            Instruction::ShiftLeft(x, y) => {
                let (x, y) = (usize::from(x), usize::from(y));
                let source = if self.compat_mode { self.v[x] } else { self.v[y] };
                let carry = source >> 7;
                self.v[x] = source << 1;
                self.v[0xF] = carry;
            }
            Instruction::SetIndex(nnn) => self.i = nnn,
            Instruction::JumpOffset(nnn) => {
                self.pc = nnn.wrapping_add(u16::from(self.v[0]));
            }
            Instruction::Random(x, nn) => {
                self.v[usize::from(x)] = self.rng.random::<u8>() & nn;
            }
            Instruction::Draw(x, y, n) => {
                let mut rows = [0u8; 16];
                for (offset, row) in rows[..usize::from(n)].iter_mut().enumerate() {
                    *row = self.read_byte(self.i.wrapping_add(offset as u16));
                }
                let vx = usize::from(self.v[usize::from(x)]);
                let vy = usize::from(self.v[usize::from(y)]);
                self.v[0xF] = display.blit_sprite(vx, vy, &rows[..usize::from(n)]);
            }
            Instruction::SkipKeyDown(x) => {
                self.skip_if(keypad.is_pressed(self.v[usize::from(x)]));
            }
            Instruction::SkipKeyUp(x) => {
                self.skip_if(!keypad.is_pressed(self.v[usize::from(x)]));
            }
            Instruction::ReadDelay(x) => self.v[usize::from(x)] = self.delay,
            Instruction::WaitKey(x) => return Ok(StepOutcome::AwaitKey(x)),
            Instruction::SetDelay(x) => self.delay = self.v[usize::from(x)],
            Instruction::SetSound(x) => self.sound = self.v[usize::from(x)],
            Instruction::AddIndex(x) => {
                self.i = self.i.wrapping_add(u16::from(self.v[usize::from(x)]));
            }
            Instruction::FontGlyph(x) => {
                self.i = u16::from(self.v[usize::from(x)]) * GLYPH_SIZE;
            }
            Instruction::StoreBcd(x) => {
                let value = self.v[usize::from(x)];
                self.write_byte(self.i, value / 100);
                self.write_byte(self.i.wrapping_add(1), value / 10 % 10);
                self.write_byte(self.i.wrapping_add(2), value % 10);
            }
            Instruction::StoreRegisters(x) => {
                for offset in 0..=usize::from(x) {
                    self.write_byte(self.i.wrapping_add(offset as u16), self.v[offset]);
                }
                if !self.compat_mode {
                    self.i = self.i.wrapping_add(u16::from(x) + 1);
                }
            }
            Instruction::LoadRegisters(x) => {
                for offset in 0..=usize::from(x) {
                    self.v[offset] = self.read_byte(self.i.wrapping_add(offset as u16));
                }
                if !self.compat_mode {
                    self.i = self.i.wrapping_add(u16::from(x) + 1);
                }
            }
        }
        Ok(StepOutcome::Continue)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    /// OR/AND/XOR clear VF in low resolution, a quirk some programs
    /// rely on.
    fn logic_quirk(&mut self, display: &Display) {
        if !display.high_res() {
            self.v[0xF] = 0;
        }
    }

    /// Horizontal scroll step: 4 pixels, or 2 in legacy low-res mode.
    fn scroll_step(&self, display: &Display) -> usize {
        if self.legacy_scroll && !display.high_res() { 2 } else { 4 }
    }

    fn read_byte(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr) & (MEM_SIZE - 1)]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.memory[usize::from(addr) & (MEM_SIZE - 1)] = value;
    }

    // Read-only state accessors, mostly for frontends and tests.

    #[must_use]
    pub fn register(&self, index: usize) -> u8 {
        self.v[index]
    }

    #[must_use]
    pub fn index(&self) -> u16 {
        self.i
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    #[must_use]
    pub fn delay(&self) -> u8 {
        self.delay
    }

    #[must_use]
    pub fn sound(&self) -> u8 {
        self.sound
    }

    #[must_use]
    pub fn compat_mode(&self) -> bool {
        self.compat_mode
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
