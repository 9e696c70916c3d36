//! Unknown curves: speculative branches the unknown offers back.
//!
//! Mid-game, existing strokes sprout short dashed polylines. Starting a new
//! stroke near a curve's tip "answers" it: the curve connects and complexity
//! drops by the connect reward (handled in the stroke input path). Curves
//! never alter stroke geometry.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::sim::complexity;
use crate::sim::state::{GameState, UnknownCurve};

/// Timer-driven generation plus expiry of stale curves.
pub fn update(state: &mut GameState, now: f32) {
    maybe_generate(state, now);
    expire(state, now);
}

fn maybe_generate(state: &mut GameState, now: f32) {
    if now < state.next_curve_at {
        return;
    }
    state.next_curve_at = now + state.tuning.curve_interval;

    // Only the mid-game window breeds curves: too calm and the unknown has
    // nothing to say, too chaotic and it stops offering.
    let c = state.complexity;
    if c <= state.tuning.curve_min_complexity || c >= state.tuning.curve_max_complexity {
        return;
    }
    let cf = complexity::complexity_factor(state);
    if state.rng.random::<f32>() >= cf * state.tuning.curve_chance_scale {
        return;
    }

    // Branch sources: finalized strokes and the in-progress one alike.
    let min_points = state.tuning.curve_min_points;
    let mut sources: Vec<Option<usize>> = state
        .strokes
        .iter()
        .enumerate()
        .filter(|(_, s)| s.points.len() > min_points)
        .map(|(i, _)| Some(i))
        .collect();
    if state
        .active_stroke
        .as_ref()
        .is_some_and(|a| a.points.len() > min_points)
    {
        sources.push(None);
    }
    if sources.is_empty() {
        return;
    }

    let id = state.next_entity_id();
    let GameState {
        strokes,
        active_stroke,
        curves,
        rng,
        tuning,
        ..
    } = state;

    let picked = sources[rng.random_range(0..sources.len())];
    let poly: Vec<Vec2> = match picked {
        Some(i) => {
            let stroke = &strokes[i];
            (0..stroke.points.len()).map(|j| stroke.current_pos(j)).collect()
        }
        None => active_stroke
            .as_ref()
            .map(|a| a.points.clone())
            .unwrap_or_default(),
    };
    if poly.len() < 2 {
        return;
    }

    let branch = tuning.curve_branch.pick(rng);
    let branch_idx = (((poly.len() - 1) as f32) * branch) as usize;
    let branch_point = poly[branch_idx];
    let local_dir = if branch_idx + 1 < poly.len() {
        poly[branch_idx + 1] - poly[branch_idx]
    } else {
        poly[branch_idx] - poly[branch_idx - 1]
    };

    let count = rng.random_range(tuning.curve_points_min..=tuning.curve_points_max);
    let step = tuning.curve_step_base + tuning.curve_step_scale * cf;
    let bend_amp = rng.random_range(0.3..0.9);
    let bend_freq = rng.random_range(0.5..1.5);
    let bend_phase = rng.random_range(0.0..TAU);

    let mut points = Vec::with_capacity(count);
    points.push(branch_point);
    let mut pos = branch_point;
    let mut angle = local_dir.y.atan2(local_dir.x) + rng.random_range(-1.0..1.0);
    for i in 1..count {
        angle += (i as f32 * bend_freq + bend_phase).sin() * bend_amp;
        pos += Vec2::new(angle.cos(), angle.sin()) * step;
        points.push(pos);
    }

    curves.push(UnknownCurve {
        id,
        points,
        created_at: now,
        connected: false,
        connected_at: 0.0,
        intensity: rng.random::<f32>(),
    });
}

fn expire(state: &mut GameState, now: f32) {
    let unconnected_life = state.tuning.curve_unconnected_lifetime;
    let grace = state.tuning.curve_connected_grace;
    state.curves.retain(|curve| {
        if curve.connected {
            now - curve.connected_at < grace
        } else {
            now - curve.created_at < unconnected_life
        }
    });
}
