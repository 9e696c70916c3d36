//! The distortion engine.
//!
//! Two independent mutation paths over the stroke shadows:
//! - a per-tick reversible wobble of unfrozen Animate strokes, recomputed
//!   from original coordinates every tick;
//! - a timer-driven irreversible mutation of one Permanent stroke segment,
//!   where each point is displaced exactly once and then never touched again.
//!
//! Both damp their output by the stroke's resistance
//! (`1 - decisiveness * k`): decisive strokes hold their shape longer.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;

use crate::sim::complexity;
use crate::sim::state::{BehaviorKind, GameState, Stroke};

/// Continuous reversible animation. Positions derive from the original
/// points, never from the previous frame, so unfreezing semantics stay
/// trivial: stop calling this and the stroke snaps back.
pub fn animate_strokes(state: &mut GameState, now: f32) {
    let cf = complexity::complexity_factor(state);
    let k = state.tuning.resistance_k;
    let base_amp = state.tuning.wobble_amplitude;

    for stroke in state.strokes.iter_mut() {
        let Some(behavior) = stroke.behavior else {
            continue;
        };
        if behavior.kind != BehaviorKind::Animate || behavior.frozen {
            continue;
        }
        let resistance = 1.0 - stroke.decisiveness * k;
        let amp = base_amp * (0.5 + cf) * behavior.intensity * resistance;

        stroke.ensure_shadow();
        let Stroke { points, shadow, .. } = stroke;
        let Some(shadow) = shadow else { continue };
        for (i, sp) in shadow.iter_mut().enumerate() {
            if sp.distorted {
                continue;
            }
            let Some(&orig) = points.get(i) else { continue };
            let phase = i as f32;
            let w1 = (now * 2.2 + phase * 0.35).sin();
            let w2 = (now * 3.1 + phase * 0.21).cos();
            sp.pos = orig + Vec2::new(w1 + 0.6 * w2, w2 - 0.6 * w1) * amp;
        }
    }
}

/// Timer-driven irreversible mutation. Picks one Permanent stroke, carves a
/// random contiguous segment out of it, and displaces every not-yet-distorted
/// point in that segment once: a random-direction wave plus a coherent-noise
/// offset, shaped by a sine bell that peaks mid-segment.
pub fn mutate_permanent(state: &mut GameState, now: f32) {
    if now < state.next_mutation_at {
        return;
    }
    let cf = complexity::complexity_factor(state);
    state.next_mutation_at = now + state.tuning.mutation_interval(cf);

    let GameState {
        strokes,
        rng,
        flow,
        tuning,
        ..
    } = state;

    let candidates: Vec<usize> = strokes
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s.behavior, Some(b) if b.kind == BehaviorKind::Permanent))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return;
    }
    let stroke = &mut strokes[candidates[rng.random_range(0..candidates.len())]];

    let n = stroke.points.len();
    if n < 2 {
        return;
    }
    let frac = tuning.mutation_segment.pick(rng);
    let seg_len = ((n as f32 * frac) as usize).clamp(2, n);
    let start = if n > seg_len {
        rng.random_range(0..=(n - seg_len))
    } else {
        0
    };

    let behavior_intensity = stroke.behavior.map_or(0.5, |b| b.intensity);
    let resistance = 1.0 - stroke.decisiveness * tuning.resistance_k;
    let strength = (0.8 + 1.2 * cf) * (0.5 + behavior_intensity) * resistance;

    let wave_angle = rng.random_range(0.0..TAU);
    let wave_dir = Vec2::new(wave_angle.cos(), wave_angle.sin());
    let wave_phase = rng.random_range(0.0..TAU);
    // Keys the noise offset to this trigger so repeat mutations of nearby
    // geometry do not retrace the same displacement.
    let salt = now + stroke.id as f32 * 13.7;
    let may_erode = cf > tuning.erosion_threshold;

    stroke.ensure_shadow();
    let Stroke { points, shadow, .. } = stroke;
    let Some(shadow) = shadow else { return };

    let span = (seg_len - 1).max(1) as f32;
    for i in start..start + seg_len {
        let Some(sp) = shadow.get_mut(i) else { continue };
        if sp.distorted {
            continue;
        }
        let Some(&orig) = points.get(i) else { continue };

        let rel = (i - start) as f32 / span;
        let window = (rel * PI).sin();
        let wave = wave_dir * (rel * TAU * 1.5 + wave_phase).sin() * tuning.mutation_wave_mag;
        let drift = flow.distort_offset(orig, salt) * tuning.mutation_noise_mag;

        sp.pos += (wave + drift) * window * strength;
        sp.distorted = true;
        if may_erode && rng.random::<f32>() < tuning.erosion_chance {
            sp.eroded = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Behavior;
    use proptest::prelude::*;

    fn stroke_with_behavior(id: u32, n: usize, kind: BehaviorKind) -> Stroke {
        Stroke {
            id,
            points: (0..n).map(|i| Vec2::new(i as f32 * 8.0, 50.0)).collect(),
            decisiveness: 0.5,
            intensity: 0.5,
            created_at: 0.0,
            behavior: Some(Behavior {
                kind,
                intensity: 0.8,
                frozen: false,
                frozen_at: 0.0,
            }),
            shadow: None,
        }
    }

    #[test]
    fn test_animate_displaces_from_original() {
        let mut state = GameState::new(4);
        state.complexity = 40.0;
        state.strokes.push(stroke_with_behavior(1, 12, BehaviorKind::Animate));

        animate_strokes(&mut state, 1.0);
        let at_one: Vec<Vec2> = state.strokes[0]
            .shadow
            .as_ref()
            .expect("shadow created")
            .iter()
            .map(|sp| sp.pos)
            .collect();

        animate_strokes(&mut state, 2.0);
        animate_strokes(&mut state, 3.0);
        // Recomputing at the original time must reproduce the original
        // offsets exactly: the wobble is a function of (original, time), not
        // of the previous frame.
        animate_strokes(&mut state, 1.0);
        let again: Vec<Vec2> = state.strokes[0]
            .shadow
            .as_ref()
            .expect("shadow present")
            .iter()
            .map(|sp| sp.pos)
            .collect();
        assert_eq!(at_one, again);
    }

    #[test]
    fn test_animate_skips_permanent_and_frozen() {
        let mut state = GameState::new(4);
        state.complexity = 60.0;
        state.strokes.push(stroke_with_behavior(1, 6, BehaviorKind::Permanent));
        let mut frozen = stroke_with_behavior(2, 6, BehaviorKind::Animate);
        if let Some(b) = frozen.behavior.as_mut() {
            b.frozen = true;
        }
        state.strokes.push(frozen);

        animate_strokes(&mut state, 5.0);
        assert!(state.strokes[0].shadow.is_none());
        assert!(state.strokes[1].shadow.is_none());
    }

    #[test]
    fn test_mutation_respects_timer() {
        let mut state = GameState::new(9);
        state.complexity = 50.0;
        state.strokes.push(stroke_with_behavior(1, 30, BehaviorKind::Permanent));
        state.next_mutation_at = 10.0;
        mutate_permanent(&mut state, 9.9);
        assert!(state.strokes[0].shadow.is_none());
        mutate_permanent(&mut state, 10.0);
        assert!(state.strokes[0].shadow.is_some());
    }

    #[test]
    fn test_mutation_marks_contiguous_segment() {
        let mut state = GameState::new(9);
        state.complexity = 50.0;
        state.strokes.push(stroke_with_behavior(1, 40, BehaviorKind::Permanent));
        state.next_mutation_at = 0.0;
        mutate_permanent(&mut state, 0.0);

        let shadow = state.strokes[0].shadow.as_ref().expect("shadow");
        let marked: Vec<usize> = shadow
            .iter()
            .enumerate()
            .filter(|(_, sp)| sp.distorted)
            .map(|(i, _)| i)
            .collect();
        // 20-60% of 40 points.
        assert!(marked.len() >= 8 && marked.len() <= 24, "got {}", marked.len());
        for pair in marked.windows(2) {
            assert_eq!(pair[1], pair[0] + 1, "segment must be contiguous");
        }
    }

    #[test]
    fn test_distorted_points_never_move_again() {
        let mut state = GameState::new(21);
        state.complexity = 50.0;
        state.strokes.push(stroke_with_behavior(1, 40, BehaviorKind::Permanent));

        state.next_mutation_at = 0.0;
        mutate_permanent(&mut state, 0.0);
        let first: Vec<(bool, Vec2)> = state.strokes[0]
            .shadow
            .as_ref()
            .expect("shadow")
            .iter()
            .map(|sp| (sp.distorted, sp.pos))
            .collect();

        // Hammer the same stroke with many more triggers; previously
        // distorted points must keep their exact coordinates.
        for round in 1..=50 {
            state.next_mutation_at = 0.0;
            mutate_permanent(&mut state, round as f32 * 0.6);
        }
        let shadow = state.strokes[0].shadow.as_ref().expect("shadow");
        for (i, (was_distorted, pos)) in first.iter().enumerate() {
            if *was_distorted {
                assert_eq!(shadow[i].pos, *pos, "point {i} moved after distortion");
            }
        }
    }

    #[test]
    fn test_mutation_skips_animate_strokes() {
        let mut state = GameState::new(9);
        state.complexity = 50.0;
        state.strokes.push(stroke_with_behavior(1, 30, BehaviorKind::Animate));
        state.next_mutation_at = 0.0;
        mutate_permanent(&mut state, 0.0);
        assert!(state.strokes[0].shadow.is_none());
    }

    #[test]
    fn test_erosion_only_at_high_complexity() {
        let mut state = GameState::new(17);
        state.complexity = 50.0;
        state.strokes.push(stroke_with_behavior(1, 100, BehaviorKind::Permanent));
        state.next_mutation_at = 0.0;
        mutate_permanent(&mut state, 0.0);
        let eroded = state.strokes[0]
            .shadow
            .as_ref()
            .expect("shadow")
            .iter()
            .filter(|sp| sp.eroded)
            .count();
        assert_eq!(eroded, 0, "erosion must not fire below the threshold");

        // Above the 0.85 threshold, repeated passes erode some points.
        state.complexity = 95.0;
        for round in 0..40 {
            state.next_mutation_at = 0.0;
            mutate_permanent(&mut state, round as f32 * 0.6);
        }
        let eroded = state.strokes[0]
            .shadow
            .as_ref()
            .expect("shadow")
            .iter()
            .filter(|sp| sp.eroded)
            .count();
        assert!(eroded > 0, "25% erosion chance over many points must fire");
    }

    #[test]
    fn test_decisive_strokes_resist_wobble() {
        let mut state = GameState::new(4);
        state.complexity = 40.0;
        let mut soft = stroke_with_behavior(1, 10, BehaviorKind::Animate);
        soft.decisiveness = 0.0;
        let mut firm = stroke_with_behavior(2, 10, BehaviorKind::Animate);
        firm.decisiveness = 1.0;
        state.strokes.push(soft);
        state.strokes.push(firm);

        animate_strokes(&mut state, 1.3);
        let offset = |stroke: &Stroke, i: usize| -> f32 {
            stroke.shadow.as_ref().expect("shadow")[i]
                .pos
                .distance(stroke.points[i])
        };
        // Same behavior intensity and time, so displacement magnitudes
        // differ only by the resistance factor.
        let soft_off = offset(&state.strokes[0], 5);
        let firm_off = offset(&state.strokes[1], 5);
        assert!(
            firm_off < soft_off,
            "decisive stroke moved {firm_off}, loose stroke {soft_off}"
        );
    }

    proptest! {
        #[test]
        fn prop_distorted_points_keep_position(
            points in prop::collection::vec((-1e4f32..1e4, -1e4f32..1e4), 2..60),
            seed in 0u64..u64::MAX,
            complexity in 0.0f32..100.0,
        ) {
            // Whatever geometry, seed, and complexity the session is in,
            // a second mutation pass over overlapping segments must leave
            // every already-distorted point exactly where it was.
            let mut state = GameState::new(seed);
            state.complexity = complexity;
            state.strokes.push(Stroke {
                id: 1,
                points: points.into_iter().map(|(x, y)| Vec2::new(x, y)).collect(),
                decisiveness: 0.5,
                intensity: 0.5,
                created_at: 0.0,
                behavior: Some(Behavior {
                    kind: BehaviorKind::Permanent,
                    intensity: 0.8,
                    frozen: false,
                    frozen_at: 0.0,
                }),
                shadow: None,
            });

            state.next_mutation_at = 0.0;
            mutate_permanent(&mut state, 0.0);
            let first: Vec<(bool, Vec2)> = state.strokes[0]
                .shadow
                .as_ref()
                .map(|s| s.iter().map(|sp| (sp.distorted, sp.pos)).collect())
                .unwrap_or_default();

            state.next_mutation_at = 0.0;
            mutate_permanent(&mut state, 0.0);

            let shadow = state.strokes[0].shadow.as_ref().expect("shadow");
            for (i, (was_distorted, pos)) in first.iter().enumerate() {
                if *was_distorted {
                    prop_assert_eq!(shadow[i].pos, *pos, "point {} moved", i);
                }
            }
        }
    }
}
