//! Beeper output.
//!
//! CHIP-8 sound is a single tone gated by the sound timer. The cpal
//! callback synthesizes a continuous sine wave and an atomic flag,
//! updated once per frame from the timer, decides whether it is
//! audible. The phase keeps advancing while muted so the tone resumes
//! without a click.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

/// Audio sample rate in Hz.
const SAMPLE_RATE: u32 = 44100;

/// Beeper tone frequency in Hz.
const TONE_HZ: f32 = 440.0;

/// Output amplitude, kept well below full scale.
const AMPLITUDE: f32 = 0.25;

/// A fixed-frequency beeper on the default audio device.
pub struct Beeper {
    _stream: Stream,
    gate: Arc<AtomicBool>,
}

impl Beeper {
    /// Open the default output device and start a muted stream.
    ///
    /// Returns `None` if no usable audio device is available; callers
    /// run silently in that case.
    pub fn new() -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;

        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let gate = Arc::new(AtomicBool::new(false));
        let callback_gate = Arc::clone(&gate);
        let phase_step = TONE_HZ * TAU / SAMPLE_RATE as f32;
        let mut phase = 0.0f32;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let audible = callback_gate.load(Ordering::Relaxed);
                    for sample in data.iter_mut() {
                        *sample = if audible {
                            phase.sin() * AMPLITUDE
                        } else {
                            0.0
                        };
                        phase = (phase + phase_step) % TAU;
                    }
                },
                |err| eprintln!("Audio stream error: {err}"),
                None,
            )
            .ok()?;

        stream.play().ok()?;

        Some(Self {
            _stream: stream,
            gate,
        })
    }

    /// Gate the tone on or off. Called once per frame with
    /// `sound_level() > 0`.
    pub fn set_active(&self, active: bool) {
        self.gate.store(active, Ordering::Relaxed);
    }
}
