//! The assembled machine and its frame scheduler.
//!
//! [`Chip8::run_frame`] is the whole timing model: latch input, resolve
//! a pending key-wait, tick both timers once, then execute the frame's
//! opcode budget. A frontend calling it every 16 ms gets 60 Hz timers
//! and the configured instruction rate for free.

use crate::config::Chip8Config;
use crate::cpu::{Cpu, StepOutcome};
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::Keypad;
use crate::palette::Theme;

/// Where the scheduler is between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecState {
    Running,
    /// FX0A executed; issuance is suspended until a key press lands in
    /// register `target`.
    AwaitingKey { target: u8 },
    /// 00FD executed, or a fatal error surfaced. Frames still latch
    /// input and count, but no opcodes run.
    Stopped,
}

pub struct Chip8 {
    cpu: Cpu,
    display: Display,
    keypad: Keypad,
    state: ExecState,
    instructions_per_frame: u32,
    theme: Theme,
    frame_count: u64,
}

impl Chip8 {
    /// Build a machine from a configuration. Fails if the ROM does not
    /// fit; on failure no machine exists at all.
    pub fn new(config: &Chip8Config) -> Result<Self, Chip8Error> {
        let mut cpu = Cpu::new();
        cpu.load_rom(&config.rom_data)?;
        cpu.legacy_scroll = config.legacy_scroll;
        Ok(Self {
            cpu,
            display: Display::new(),
            keypad: Keypad::new(),
            state: ExecState::Running,
            instructions_per_frame: config.instructions_per_frame,
            theme: Theme::from_index(config.theme),
            frame_count: 0,
        })
    }

    /// Run one frame tick.
    ///
    /// A fatal error stops the machine permanently and is returned to
    /// the caller once; subsequent frames are quiet no-ops.
    pub fn run_frame(&mut self) -> Result<(), Chip8Error> {
        self.keypad.latch();

        if let ExecState::AwaitingKey { target } = self.state {
            if let Some(key) = self.keypad.take_fresh_key() {
                self.cpu.v[usize::from(target)] = key;
                self.state = ExecState::Running;
            }
        }

        self.cpu.tick_timers();

        for _ in 0..self.instructions_per_frame {
            if self.state != ExecState::Running {
                break;
            }
            match self.cpu.step(&mut self.display, &self.keypad) {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::AwaitKey(target)) => {
                    self.state = ExecState::AwaitingKey { target };
                }
                Ok(StepOutcome::Stop) => self.state = ExecState::Stopped,
                Err(err) => {
                    self.state = ExecState::Stopped;
                    self.frame_count += 1;
                    return Err(err);
                }
            }
        }

        self.frame_count += 1;
        Ok(())
    }

    /// Forward a raw key transition from the frontend. It takes effect
    /// at the next frame's latch.
    pub fn key_event(&mut self, key: u8, down: bool) {
        self.keypad.set_key(key, down);
    }

    /// Whether opcodes will still execute. False after 00FD or a fatal
    /// error; a pending key-wait still counts as running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state != ExecState::Stopped
    }

    /// Active display width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.display.width()
    }

    /// Active display height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.display.height()
    }

    /// The active region of plane 1, row-major, one byte per pixel.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        self.display.pixels()
    }

    /// Whether the display changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        self.display.take_dirty()
    }

    /// Sound timer value; nonzero means the beeper should be on.
    #[must_use]
    pub fn sound_level(&self) -> u8 {
        self.cpu.sound()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Processor state, for frontends that display it.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_from_words(words: &[u16], instructions_per_frame: u32) -> Chip8 {
        let mut rom = Vec::new();
        for word in words {
            rom.extend_from_slice(&word.to_be_bytes());
        }
        let mut config = Chip8Config::new(rom);
        config.instructions_per_frame = instructions_per_frame;
        Chip8::new(&config).expect("test rom fits")
    }

    #[test]
    fn oversized_rom_yields_no_machine() {
        let config = Chip8Config::new(vec![0; crate::cpu::MAX_ROM_SIZE + 1]);
        assert!(matches!(
            Chip8::new(&config),
            Err(Chip8Error::RomTooLarge(_))
        ));
    }

    #[test]
    fn frame_runs_the_configured_budget() {
        // eight V0 increments per frame
        let mut chip8 = machine_from_words(&[0x7001; 8], 8);
        chip8.run_frame().unwrap();
        assert_eq!(chip8.cpu().register(0), 8);
        assert_eq!(chip8.frame_count(), 1);
    }

    #[test]
    fn timers_tick_once_per_frame() {
        // V0 = 3, delay = V0, then spin
        let mut chip8 = machine_from_words(&[0x6003, 0xF015, 0x1204], 2);
        chip8.run_frame().unwrap();
        assert_eq!(chip8.cpu().delay(), 3);
        chip8.run_frame().unwrap();
        chip8.run_frame().unwrap();
        chip8.run_frame().unwrap();
        assert_eq!(chip8.cpu().delay(), 0);
    }

    #[test]
    fn exit_opcode_stops_for_good() {
        let mut chip8 = machine_from_words(&[0x00FD, 0x7001], 8);
        chip8.run_frame().unwrap();
        assert!(!chip8.is_running());
        assert_eq!(chip8.cpu().register(0), 0);

        // stopped frames still succeed and count
        chip8.run_frame().unwrap();
        assert_eq!(chip8.cpu().register(0), 0);
        assert_eq!(chip8.frame_count(), 2);
    }

    #[test]
    fn fatal_error_is_reported_once() {
        let mut chip8 = machine_from_words(&[0x00EE], 8);
        assert_eq!(chip8.run_frame(), Err(Chip8Error::StackUnderflow));
        assert!(!chip8.is_running());
        assert_eq!(chip8.run_frame(), Ok(()));
    }

    #[test]
    fn key_wait_freezes_execution_until_a_press() {
        // wait for a key into V5, then V0 = 1
        let mut chip8 = machine_from_words(&[0xF50A, 0x6001], 8);
        chip8.run_frame().unwrap();
        chip8.run_frame().unwrap();
        assert_eq!(chip8.cpu().register(0), 0);
        assert!(chip8.is_running());

        chip8.key_event(0x7, true);
        chip8.run_frame().unwrap();
        assert_eq!(chip8.cpu().register(5), 0x7);
        assert_eq!(chip8.cpu().register(0), 1);
    }

    #[test]
    fn key_wait_prefers_the_lowest_key() {
        let mut chip8 = machine_from_words(&[0xF00A], 1);
        chip8.run_frame().unwrap();
        chip8.key_event(0xB, true);
        chip8.key_event(0x3, true);
        chip8.run_frame().unwrap();
        assert_eq!(chip8.cpu().register(0), 0x3);
    }

    #[test]
    fn key_events_take_effect_at_the_next_latch() {
        // skip if key V0 down; V1 = 1 only when not skipped
        let mut chip8 = machine_from_words(&[0xE09E, 0x6101], 2);
        chip8.key_event(0x0, true);
        chip8.run_frame().unwrap();
        assert_eq!(chip8.cpu().register(1), 0);
    }

    #[test]
    fn theme_out_of_range_falls_back_to_default() {
        let mut config = Chip8Config::new(vec![0x12, 0x00]);
        config.theme = 99;
        let chip8 = Chip8::new(&config).unwrap();
        assert_eq!(chip8.theme(), Theme::from_index(0));
    }

    #[test]
    fn dirty_flag_tracks_display_changes() {
        let mut chip8 = machine_from_words(&[0x00E0, 0x1202], 1);
        assert!(!chip8.take_dirty());
        chip8.run_frame().unwrap();
        assert!(chip8.take_dirty());
        assert!(!chip8.take_dirty());
    }
}
