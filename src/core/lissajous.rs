//! Lissajous curve sampler and multi-frame renderer.
//!
//! Each animation traces `x(t) = sin(t)`, `y(t) = sin(t * freq + phase)` for
//! `t` in `[0, cycles * 2π)`. The frequency is drawn once per animation, the
//! phase advances by a fixed step between frames.
//!
//! # Key types
//!
//! - [`AnimationConfig`] - all rendering constants, with documented defaults
//! - [`Frame`] - square palette-indexed raster (index 0 = background, 1 = foreground)
//! - [`Animation`] - rendered frames plus delay and loop count
//! - [`CurveAnimator`] - renders animations and writes them as GIF
//!
//! Randomness is injected through [`rand::Rng`] so tests can pass a seeded
//! `StdRng`; request handlers use [`time_seeded_rng`] once per render.

use std::f64::consts::PI;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::encode::{EncodeError, encode_gif};

/// Palette index of the background color.
pub const BACKGROUND_INDEX: u8 = 0;
/// Palette index of the curve color.
pub const FOREGROUND_INDEX: u8 = 1;

/// Two-color palette shared by every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: [u8; 3],
    pub foreground: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0x00, 0x00, 0x00],
            foreground: [0x00, 0xff, 0x00],
        }
    }
}

impl Palette {
    /// RGB color for a palette index. Anything but the foreground index maps to background.
    pub fn rgb(&self, index: u8) -> [u8; 3] {
        if index == FOREGROUND_INDEX {
            self.foreground
        } else {
            self.background
        }
    }
}

/// Animation repeat count written into the GIF loop extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopCount {
    /// Play this many times.
    Finite(u16),
    /// Loop forever.
    Infinite,
}

/// Rendering constants.
///
/// The default `loop_count` reuses the frame count (64) instead of looping
/// forever. Set `loop_count` to [`LoopCount::Infinite`] to change that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Half-width of the canvas; frames are `2 * size + 1` pixels square.
    pub size: u32,
    /// Number of frames per animation.
    pub frames: usize,
    /// Per-frame delay in hundredths of a second.
    pub delay_cs: u16,
    /// Angular step between curve samples (radians).
    pub resolution: f64,
    /// Phase increment between frames (radians).
    pub phase_step: f64,
    /// Frequency is drawn uniformly from `[0, max_frequency)`.
    pub max_frequency: f64,
    /// Cycle count used when the request doesn't carry a valid one.
    pub default_cycles: u64,
    pub loop_count: LoopCount,
    pub palette: Palette,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            size: 100,
            frames: 64,
            delay_cs: 8,
            resolution: 0.001,
            phase_step: 0.1,
            max_frequency: 3.0,
            default_cycles: 5,
            loop_count: LoopCount::Finite(64),
            palette: Palette::default(),
        }
    }
}

/// Rejected animation settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Sample resolution must be finite and positive, got {0}")]
    InvalidResolution(f64),
    #[error("Frame count must be at least 1")]
    NoFrames,
    #[error("Frame side {0} exceeds the GIF limit of 65535 pixels")]
    FrameTooLarge(u64),
    #[error("Maximum frequency must be finite and non-negative, got {0}")]
    InvalidFrequency(f64),
    #[error("Phase step must be finite, got {0}")]
    InvalidPhaseStep(f64),
    #[error("Default cycle count must be at least 1")]
    NoDefaultCycles,
}

impl AnimationConfig {
    /// Side length of every frame in pixels.
    pub fn side(&self) -> u32 {
        self.size.saturating_mul(2).saturating_add(1)
    }

    /// Check the settings can render in bounded time and encode as GIF.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ConfigError::InvalidResolution(self.resolution));
        }
        if self.frames == 0 {
            return Err(ConfigError::NoFrames);
        }
        let side = 2 * u64::from(self.size) + 1;
        if side > u64::from(u16::MAX) {
            return Err(ConfigError::FrameTooLarge(side));
        }
        if !(self.max_frequency.is_finite() && self.max_frequency >= 0.0) {
            return Err(ConfigError::InvalidFrequency(self.max_frequency));
        }
        if !self.phase_step.is_finite() {
            return Err(ConfigError::InvalidPhaseStep(self.phase_step));
        }
        if self.default_cycles == 0 {
            return Err(ConfigError::NoDefaultCycles);
        }
        Ok(())
    }
}

/// Square palette-indexed raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    side: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// New frame filled with the background index.
    pub fn new(side: u32) -> Self {
        Self {
            side,
            pixels: vec![BACKGROUND_INDEX; side as usize * side as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.side
    }

    pub fn height(&self) -> u32 {
        self.side
    }

    /// Row-major palette indices.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn index_at(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.side && y < self.side {
            Some(self.pixels[y as usize * self.side as usize + x as usize])
        } else {
            None
        }
    }

    /// Set a pixel; coordinates outside the raster are ignored.
    fn set_index(&mut self, x: i64, y: i64, index: u8) {
        let side = i64::from(self.side);
        if (0..side).contains(&x) && (0..side).contains(&y) {
            self.pixels[(y * side + x) as usize] = index;
        }
    }
}

/// Rendered animation, serialized once and then dropped.
#[derive(Debug, Clone)]
pub struct Animation {
    pub frames: Vec<Frame>,
    pub delay_cs: u16,
    pub loop_count: LoopCount,
    /// Relative frequency used for every frame.
    pub frequency: f64,
}

/// Draw the relative frequency for one animation: uniform in `[0, max)`.
pub fn draw_frequency<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    rng.r#gen::<f64>() * max
}

/// RNG seeded from the wall clock. Call once per render.
pub fn time_seeded_rng() -> StdRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    StdRng::seed_from_u64(nanos)
}

/// Renders Lissajous animations with a fixed configuration.
///
/// Holds no mutable state, so one instance can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct CurveAnimator {
    config: AnimationConfig,
}

impl CurveAnimator {
    pub fn new(config: AnimationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Render `cycles` oscillations with a frequency drawn from `rng`.
    pub fn render<R: Rng + ?Sized>(&self, cycles: u64, rng: &mut R) -> Animation {
        let frequency = draw_frequency(rng, self.config.max_frequency);
        self.render_with_frequency(cycles, frequency)
    }

    /// Render with an explicit frequency. Fully deterministic.
    pub fn render_with_frequency(&self, cycles: u64, frequency: f64) -> Animation {
        let cfg = &self.config;
        let mut phase = 0.0;
        let mut frames = Vec::with_capacity(cfg.frames);

        for _ in 0..cfg.frames {
            frames.push(self.render_frame(cycles, frequency, phase));
            phase += cfg.phase_step;
        }

        debug!(
            "Rendered {} frames ({}x{}), cycles={}, freq={:.4}",
            frames.len(),
            cfg.side(),
            cfg.side(),
            cycles,
            frequency
        );

        Animation {
            frames,
            delay_cs: cfg.delay_cs,
            loop_count: cfg.loop_count,
            frequency,
        }
    }

    fn render_frame(&self, cycles: u64, frequency: f64, phase: f64) -> Frame {
        let size = i64::from(self.config.size);
        let scale = f64::from(self.config.size);
        let end = cycles as f64 * 2.0 * PI;
        let mut frame = Frame::new(self.config.side());

        let mut t = 0.0_f64;
        while t < end {
            let x = t.sin();
            let y = (t * frequency + phase).sin();
            // `as` truncates toward zero: the +0.5 idiom, not round()
            frame.set_index(
                size + (x * scale + 0.5) as i64,
                size + (y * scale + 0.5) as i64,
                FOREGROUND_INDEX,
            );
            t += self.config.resolution;
        }
        frame
    }

    /// Render and encode as a looping GIF into `out`.
    pub fn write_gif<R, W>(&self, cycles: u64, rng: &mut R, out: &mut W) -> Result<(), EncodeError>
    where
        R: Rng + ?Sized,
        W: Write,
    {
        let animation = self.render(cycles, rng);
        encode_gif(&animation, &self.config.palette, out)
    }
}
