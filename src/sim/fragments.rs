//! Fragmentation: strokes shed drifting, dashed copies as complexity rises.
//!
//! A detached fragment is a visual snapshot; the source stroke keeps its
//! logical points and only gains `fragmented` render flags on the segment it
//! lost. Fragments drift with a sinusoidal sway and expire after a fixed age.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::sim::complexity;
use crate::sim::state::{Fragment, GameState};

/// Timer-driven detach plus per-tick drift and aging of live fragments.
pub fn update(state: &mut GameState, now: f32, dt: f32) {
    maybe_detach(state, now);
    drift_and_expire(state, now, dt);
}

fn maybe_detach(state: &mut GameState, now: f32) {
    if now < state.next_fragment_at {
        return;
    }
    let cf = complexity::complexity_factor(state);
    state.next_fragment_at = now + state.tuning.fragment_interval(cf);
    if cf <= state.tuning.fragment_activation {
        return;
    }

    let min_points = state.tuning.fragment_min_points;
    let candidates: Vec<usize> = state
        .strokes
        .iter()
        .enumerate()
        .filter(|(_, s)| s.points.len() > min_points)
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return;
    }

    let id = state.next_entity_id();
    let GameState {
        strokes,
        fragments,
        rng,
        tuning,
        ..
    } = state;
    let stroke = &mut strokes[candidates[rng.random_range(0..candidates.len())]];

    let n = stroke.points.len();
    let frac = tuning.fragment_segment.pick(rng);
    let seg_len = ((n as f32 * frac) as usize).clamp(2, n);
    let start = if n > seg_len {
        rng.random_range(0..=(n - seg_len))
    } else {
        0
    };

    // Snapshot the segment's current on-screen positions, distortion and all.
    let points: Vec<Vec2> = (start..start + seg_len)
        .map(|i| stroke.current_pos(i))
        .collect();

    let angle = rng.random_range(0.0..TAU);
    let speed = tuning.fragment_drift.pick(rng);
    let drift = Vec2::new(angle.cos(), angle.sin()) * speed;

    let shadow = stroke.ensure_shadow();
    for i in start..start + seg_len {
        if let Some(sp) = shadow.get_mut(i) {
            sp.fragmented = true;
        }
    }

    fragments.push(Fragment {
        id,
        points,
        offset: Vec2::ZERO,
        drift,
        created_at: now,
        dash_progress: 0.0,
    });
}

fn drift_and_expire(state: &mut GameState, now: f32, dt: f32) {
    let max_age = state.tuning.fragment_max_age;
    for fragment in state.fragments.iter_mut() {
        let age = now - fragment.created_at;
        // Sway perpendicular to the drift line so fragments wander instead
        // of sliding straight off.
        let sway = (age * 1.5 + fragment.id as f32 * 0.7).sin();
        let perp = Vec2::new(-fragment.drift.y, fragment.drift.x) * 0.35;
        fragment.offset += (fragment.drift + perp * sway) * dt;
        fragment.dash_progress += dt;
    }
    state.fragments.retain(|f| now - f.created_at < max_age);
}
