//! Lissajous - echo, hit counter and animated Lissajous GIF over HTTP
//!
//! Re-exports all modules for use by the binary target.

pub mod cli;
pub mod config;
pub mod core;
pub mod server;

pub use crate::core::{CurveAnimator, RequestCounter};
pub use server::{ApiServer, AppState};
