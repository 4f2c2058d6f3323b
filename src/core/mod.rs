//! Core engine modules - request counter, curve renderer, GIF encoder
//!
//! These modules are independent of the HTTP layer and can be used and
//! tested without a running server.

pub mod counter;
pub mod encode;
pub mod lissajous;

// Re-exports for convenience
pub use counter::RequestCounter;
pub use encode::{EncodeError, encode_gif};
pub use lissajous::{
    Animation, AnimationConfig, ConfigError, CurveAnimator, Frame, LoopCount, Palette, draw_frequency,
    time_seeded_rng,
};
