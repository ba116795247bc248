//! CHIP-8 interpreter binary.
//!
//! Runs a ROM with a winit window and pixels framebuffer, or in
//! headless mode for a fixed number of frames.

#![allow(clippy::cast_possible_truncation)]

use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use emu_chip8::audio::Beeper;
use emu_chip8::display::{HIGH_RES_HEIGHT, HIGH_RES_WIDTH};
use emu_chip8::palette::THEMES;
use emu_chip8::{Chip8, Chip8Config, keyboard_map};
use pixels::{Pixels, SurfaceTexture};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

/// Window scale factor, relative to the 128x64 high-resolution grid.
const SCALE: u32 = 8;

/// Frame duration for the 60 Hz tick.
const FRAME_DURATION: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    theme: usize,
    instructions_per_frame: u32,
    legacy_scroll: bool,
    headless: bool,
    frames: u32,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        theme: 0,
        instructions_per_frame: emu_chip8::DEFAULT_INSTRUCTIONS_PER_FRAME,
        legacy_scroll: false,
        headless: false,
        frames: 600,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--theme" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.theme = s.parse().unwrap_or(0);
                }
            }
            "--ipf" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.instructions_per_frame = s
                        .parse()
                        .unwrap_or(emu_chip8::DEFAULT_INSTRUCTIONS_PER_FRAME);
                }
            }
            "--legacy-scroll" => {
                cli.legacy_scroll = true;
            }
            "--headless" => {
                cli.headless = true;
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(600);
                }
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-chip8 [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --rom <file>      CHIP-8 ROM file (.ch8)");
                eprintln!(
                    "  --theme <n>       Color theme 0-{} [default: 0]",
                    THEMES.len() - 1
                );
                eprintln!("  --ipf <n>         Instructions per frame [default: 8]");
                eprintln!("  --legacy-scroll   Scroll 2 pixels instead of 4 in low resolution");
                eprintln!("  --headless        Run without a window");
                eprintln!("  --frames <n>      Number of frames in headless mode [default: 600]");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// Headless mode
// ---------------------------------------------------------------------------

fn run_headless(cli: &CliArgs) {
    let mut chip8 = make_chip8(cli);

    for _ in 0..cli.frames {
        if let Err(e) = chip8.run_frame() {
            eprintln!("Interpreter fault: {e}");
            process::exit(1);
        }
        if !chip8.is_running() {
            break;
        }
    }
    eprintln!("Ran {} frames", chip8.frame_count());
}

// ---------------------------------------------------------------------------
// Windowed mode (winit + pixels)
// ---------------------------------------------------------------------------

struct App {
    chip8: Chip8,
    window: Option<&'static Window>,
    pixels: Option<Pixels<'static>>,
    beeper: Option<Beeper>,
    fb_width: u32,
    last_frame_time: Instant,
}

impl App {
    fn new(chip8: Chip8) -> Self {
        let fb_width = chip8.width() as u32;
        Self {
            chip8,
            window: None,
            pixels: None,
            beeper: Beeper::new(),
            fb_width,
            last_frame_time: Instant::now(),
        }
    }

    fn handle_key(&mut self, keycode: KeyCode, pressed: bool) {
        if let Some(key) = keyboard_map::map_keycode(keycode) {
            self.chip8.key_event(key, pressed);
        }
    }

    fn update_pixels(&mut self) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };

        // 00FE/00FF change the framebuffer dimensions mid-run
        let width = self.chip8.width() as u32;
        if width != self.fb_width {
            let height = self.chip8.height() as u32;
            if let Err(e) = pixels.resize_buffer(width, height) {
                eprintln!("Framebuffer resize error: {e}");
                return;
            }
            self.fb_width = width;
        }

        let theme = self.chip8.theme();
        let frame = pixels.frame_mut();
        for (i, &on) in self.chip8.pixels().iter().enumerate() {
            let color = if on == 1 { theme.foreground } else { theme.background };
            let offset = i * 4;
            frame[offset] = color.r;
            frame[offset + 1] = color.g;
            frame[offset + 2] = color.b;
            frame[offset + 3] = 0xFF;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_size = winit::dpi::LogicalSize::new(
            HIGH_RES_WIDTH as u32 * SCALE,
            HIGH_RES_HEIGHT as u32 * SCALE,
        );
        let attrs = WindowAttributes::default()
            .with_title("CHIP-8")
            .with_inner_size(window_size)
            .with_resizable(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window: &'static Window = Box::leak(Box::new(window));
                let inner = window.inner_size();
                let surface = SurfaceTexture::new(inner.width, inner.height, window);
                let width = self.chip8.width() as u32;
                let height = self.chip8.height() as u32;
                match Pixels::new(width, height, surface) {
                    Ok(pixels) => {
                        self.pixels = Some(pixels);
                    }
                    Err(e) => {
                        eprintln!("Failed to create pixels: {e}");
                        event_loop.exit();
                        return;
                    }
                }
                self.window = Some(window);
            }
            Err(e) => {
                eprintln!("Failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if keycode == KeyCode::Escape && event.state == ElementState::Pressed {
                        event_loop.exit();
                        return;
                    }
                    self.handle_key(keycode, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if now.duration_since(self.last_frame_time) >= FRAME_DURATION {
                    if let Err(e) = self.chip8.run_frame() {
                        eprintln!("Interpreter fault: {e}");
                        process::exit(1);
                    }
                    if !self.chip8.is_running() {
                        event_loop.exit();
                        return;
                    }
                    if let Some(beeper) = &self.beeper {
                        beeper.set_active(self.chip8.sound_level() > 0);
                    }
                    if self.chip8.take_dirty() {
                        self.update_pixels();
                    }
                    self.last_frame_time = now;
                }

                if let Some(pixels) = self.pixels.as_ref() {
                    if let Err(e) = pixels.render() {
                        eprintln!("Render error: {e}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window {
            window.request_redraw();
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn make_chip8(cli: &CliArgs) -> Chip8 {
    let rom_path = cli.rom_path.as_ref().unwrap_or_else(|| {
        eprintln!("No ROM file specified. Use --rom <file.ch8>");
        process::exit(1);
    });

    let rom_data = match std::fs::read(rom_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to read ROM file {}: {e}", rom_path.display());
            process::exit(1);
        }
    };

    let mut config = Chip8Config::new(rom_data);
    config.theme = cli.theme;
    config.instructions_per_frame = cli.instructions_per_frame;
    config.legacy_scroll = cli.legacy_scroll;

    match Chip8::new(&config) {
        Ok(chip8) => {
            eprintln!("Loaded ROM: {}", rom_path.display());
            chip8
        }
        Err(e) => {
            eprintln!("Failed to load ROM: {e}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = parse_args();

    if cli.headless {
        run_headless(&cli);
        return;
    }

    let chip8 = make_chip8(&cli);
    let mut app = App::new(chip8);

    let event_loop = match EventLoop::new() {
        Ok(el) => el,
        Err(e) => {
            eprintln!("Failed to create event loop: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {e}");
        process::exit(1);
    }
}
