//! The per-tick driver.
//!
//! `tick` advances the whole simulation one fixed step in a fixed subsystem
//! order: session transitions, stroke input, behavior assignment, the freeze
//! lottery, continuous distortion, periodic distortion, fragmentation, curve
//! generation, particles, then the terminal check. Rendering happens
//! elsewhere, as a read-only pass over the resulting state.

use glam::Vec2;

use crate::sim::state::{GamePhase, GameState};
use crate::sim::{behavior, complexity, curves, distortion, fragments, particles, strokes};

/// A pointer event routed into the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeEvent {
    Start(Vec2),
    Move(Vec2),
    End,
}

/// Input collected between ticks.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer events in arrival order; drained once per frame.
    pub stroke_events: Vec<StrokeEvent>,
    /// Begin a session from Ready.
    pub start: bool,
    /// Toggle pause while playing (or resume while paused).
    pub pause: bool,
    /// Force the session over.
    pub end: bool,
}

impl TickInput {
    /// Clear one-shot inputs after a tick has consumed them.
    pub fn clear_oneshot(&mut self) {
        self.stroke_events.clear();
        self.start = false;
        self.pause = false;
        self.end = false;
    }
}

/// Advance the game state by one fixed timestep.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Session transitions come first so a pause or end takes effect before
    // anything else moves.
    if input.start && state.phase == GamePhase::Ready {
        state.phase = GamePhase::Playing;
    }
    if input.pause {
        state.phase = match state.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
    }
    if input.end && matches!(state.phase, GamePhase::Playing | GamePhase::Paused) {
        // Ending a session commits whatever stroke is still in flight; the
        // matching release may have been swallowed by a paused tick.
        strokes::finalize_stroke(state);
        state.phase = GamePhase::GameOver;
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    let now = state.time();

    for event in &input.stroke_events {
        match *event {
            StrokeEvent::Start(point) => strokes::begin_stroke(state, point),
            StrokeEvent::Move(point) => strokes::extend_stroke(state, point),
            StrokeEvent::End => strokes::finalize_stroke(state),
        }
    }

    behavior::assign_new(state);
    behavior::freeze_lottery(state, now);
    distortion::animate_strokes(state, now);
    distortion::mutate_permanent(state, now);
    fragments::update(state, now, dt);
    curves::update(state, now);
    particles::update(state, now, dt);

    if complexity::is_terminal(state) {
        state.phase = GamePhase::GameOver;
    }
}
