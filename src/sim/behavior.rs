//! Behavior assignment and the freeze lottery.
//!
//! Every finalized stroke gets exactly one Behavior the first tick it is
//! observed, and keeps it for life. Separately, rising complexity runs a
//! per-tick lottery that permanently freezes one animated stroke at a time.

use rand::Rng;

use crate::sim::complexity;
use crate::sim::state::{Behavior, BehaviorKind, GameState};

/// Classify every stroke that does not yet carry a behavior.
pub fn assign_new(state: &mut GameState) {
    let GameState { strokes, rng, .. } = state;
    for stroke in strokes.iter_mut() {
        if stroke.behavior.is_some() {
            continue;
        }
        let kind = if rng.random::<bool>() {
            BehaviorKind::Animate
        } else {
            BehaviorKind::Permanent
        };
        stroke.behavior = Some(Behavior {
            kind,
            intensity: rng.random::<f32>(),
            frozen: false,
            frozen_at: 0.0,
        });
    }
}

/// With probability `freeze_chance * complexity_factor`, lock one random
/// unfrozen Animate stroke at its current shadow position.
pub fn freeze_lottery(state: &mut GameState, now: f32) {
    let cf = complexity::complexity_factor(state);
    if cf <= 0.0 {
        return;
    }
    let chance = state.tuning.freeze_chance * cf;
    if state.rng.random::<f32>() >= chance {
        return;
    }

    let GameState { strokes, rng, .. } = state;
    let candidates: Vec<usize> = strokes
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            matches!(s.behavior, Some(b) if b.kind == BehaviorKind::Animate && !b.frozen)
        })
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return;
    }

    let stroke = &mut strokes[candidates[rng.random_range(0..candidates.len())]];
    // Lock whatever is on screen right now; a never-animated stroke locks
    // at its original coordinates.
    stroke.ensure_shadow();
    if let Some(behavior) = stroke.behavior.as_mut() {
        behavior.frozen = true;
        behavior.frozen_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use crate::sim::state::Stroke;

    fn bare_stroke(id: u32) -> Stroke {
        Stroke {
            id,
            points: vec![Vec2::ZERO, Vec2::new(20.0, 0.0), Vec2::new(40.0, 0.0)],
            decisiveness: 0.5,
            intensity: 0.5,
            created_at: 0.0,
            behavior: None,
            shadow: None,
        }
    }

    #[test]
    fn test_assignment_is_one_time() {
        let mut state = GameState::new(42);
        state.strokes.push(bare_stroke(1));
        assign_new(&mut state);
        let first = state.strokes[0].behavior.expect("behavior assigned");
        assert!((0.0..=1.0).contains(&first.intensity));
        assert!(!first.frozen);

        // A second pass must not touch the existing assignment.
        assign_new(&mut state);
        let second = state.strokes[0].behavior.expect("behavior kept");
        assert_eq!(first.kind, second.kind);
        assert_eq!(first.intensity, second.intensity);
    }

    #[test]
    fn test_assignment_covers_all_new_strokes() {
        let mut state = GameState::new(7);
        for id in 1..=20 {
            state.strokes.push(bare_stroke(id));
        }
        assign_new(&mut state);
        assert!(state.strokes.iter().all(|s| s.behavior.is_some()));
    }

    #[test]
    fn test_both_variants_occur() {
        let mut state = GameState::new(3);
        for id in 1..=64 {
            state.strokes.push(bare_stroke(id));
        }
        assign_new(&mut state);
        let animate = state
            .strokes
            .iter()
            .filter(|s| matches!(s.behavior, Some(b) if b.kind == BehaviorKind::Animate))
            .count();
        assert!(animate > 0 && animate < 64, "uniform split, got {animate}/64");
    }

    #[test]
    fn test_lottery_inert_at_zero_complexity() {
        let mut state = GameState::new(11);
        state.strokes.push(bare_stroke(1));
        assign_new(&mut state);
        state.complexity = 0.0;
        for _ in 0..200 {
            freeze_lottery(&mut state, 1.0);
        }
        let frozen = state
            .strokes
            .iter()
            .any(|s| matches!(s.behavior, Some(b) if b.frozen));
        assert!(!frozen);
    }

    #[test]
    fn test_lottery_eventually_freezes_animate_stroke() {
        let mut state = GameState::new(11);
        for id in 1..=8 {
            state.strokes.push(bare_stroke(id));
            let kind = if id % 2 == 0 {
                BehaviorKind::Animate
            } else {
                BehaviorKind::Permanent
            };
            state.strokes.last_mut().expect("just pushed").behavior = Some(Behavior {
                kind,
                intensity: 0.5,
                frozen: false,
                frozen_at: 0.0,
            });
        }

        state.complexity = 100.0;
        for i in 0..2000 {
            freeze_lottery(&mut state, i as f32 * 0.016);
        }
        let frozen = state
            .strokes
            .iter()
            .filter(|s| matches!(s.behavior, Some(b) if b.frozen))
            .count();
        assert!(frozen > 0, "5% per-tick lottery over 2000 ticks must fire");
        // Frozen strokes must have a shadow to be locked at.
        for s in &state.strokes {
            if matches!(s.behavior, Some(b) if b.frozen) {
                assert!(s.shadow.is_some());
            }
        }
    }

    #[test]
    fn test_lottery_never_freezes_permanent() {
        let mut state = GameState::new(5);
        state.strokes.push(bare_stroke(1));
        // Force a Permanent assignment to prove it is never selected.
        state.strokes[0].behavior = Some(Behavior {
            kind: BehaviorKind::Permanent,
            intensity: 0.5,
            frozen: false,
            frozen_at: 0.0,
        });
        state.complexity = 100.0;
        for _ in 0..500 {
            freeze_lottery(&mut state, 0.0);
        }
        let b = state.strokes[0].behavior.expect("behavior");
        assert!(!b.frozen);
    }
}
