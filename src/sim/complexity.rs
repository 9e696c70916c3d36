//! The complexity controller.
//!
//! One scalar in [0, COMPLEXITY_MAX] drives every distortion intensity and
//! the win/loss state. Only the two functions here may mutate it: `recompute`
//! on stroke finalization and `reward` on curve connection.

use crate::consts::COMPLEXITY_MAX;
use crate::sim::state::GameState;

/// Recompute complexity from the total finalized point count. Called
/// whenever a stroke finalizes; overwrites any earlier reward decrements.
pub fn recompute(state: &mut GameState) {
    let total = state.total_drawn_points() as f32;
    let raw = total * state.tuning.growth_rate / state.tuning.normalizer;
    state.complexity = raw.clamp(0.0, COMPLEXITY_MAX);
    state.complexity_peak = state.complexity_peak.max(state.complexity);
}

/// Knock complexity down after a curve connection, floored at zero.
pub fn reward(state: &mut GameState, delta: f32) {
    state.complexity = (state.complexity - delta).max(0.0);
}

/// The normalized drive signal in [0, 1].
pub fn complexity_factor(state: &GameState) -> f32 {
    state.complexity / COMPLEXITY_MAX
}

/// True once the session has hit the ceiling.
pub fn is_terminal(state: &GameState) -> bool {
    state.complexity >= COMPLEXITY_MAX
}
