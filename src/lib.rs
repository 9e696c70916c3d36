//! Vast Unknown - a generative-art survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (strokes, distortion, particles, complexity)
//! - `renderer`: WebGPU rendering pipeline
//! - `sessions`: Session records, local leaderboard, backend submit
//! - `settings`: User-facing quality/effect options
//! - `tuning`: Data-driven game balance

pub mod renderer;
pub mod sessions;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use sessions::{Leaderboard, SessionRecord};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matching the display-driven design)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Drawing field dimensions (logical units; canvas scales to fit)
    pub const FIELD_WIDTH: f32 = 1200.0;
    pub const FIELD_HEIGHT: f32 = 800.0;

    /// Complexity is clamped to [0, COMPLEXITY_MAX]; reaching the max ends the game
    pub const COMPLEXITY_MAX: f32 = 100.0;

    /// Minimum spacing between appended stroke points
    pub const MIN_POINT_SPACING: f32 = 3.0;

    /// Stroke render width in field units
    pub const STROKE_WIDTH: f32 = 2.5;
    /// Unknown-curve render width (thinner, it is a hint layer)
    pub const CURVE_WIDTH: f32 = 1.5;
    /// Particle quad half-extent
    pub const PARTICLE_SIZE: f32 = 1.6;

    /// Dash pattern for fragmented/hint rendering (on, off) in field units
    pub const DASH_ON: f32 = 6.0;
    pub const DASH_OFF: f32 = 5.0;
}

/// Squared distance between two points, avoiding the sqrt in hot loops
#[inline]
pub fn dist_sq(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}

/// Wrap a coordinate into [0, extent)
#[inline]
pub fn wrap_coord(v: f32, extent: f32) -> f32 {
    let r = v % extent;
    if r < 0.0 { r + extent } else { r }
}
