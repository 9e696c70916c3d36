//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entity vectors stay id-sorted by construction)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod complexity;
pub mod curves;
pub mod distortion;
pub mod fragments;
pub mod noise;
pub mod particles;
pub mod state;
pub mod strokes;
pub mod tick;

pub use complexity::complexity_factor;
pub use noise::FlowField;
pub use state::{
    ActiveStroke, Behavior, BehaviorKind, Fragment, GamePhase, GameState, Particle, ShadowPoint,
    Stroke, UnknownCurve, DEFAULT_PARTICLE_POPULATION,
};
pub use strokes::decisiveness_of;
pub use tick::{StrokeEvent, TickInput, tick};
