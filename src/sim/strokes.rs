//! Stroke input and the path registry.
//!
//! Pointer events append into the in-progress buffer; finalization computes
//! the stroke's derived metadata (decisiveness, intensity), scores it, hands
//! it to the owning registry under a fresh stable ID, and recomputes
//! complexity.

use glam::Vec2;

use crate::consts::{COMPLEXITY_MAX, MIN_POINT_SPACING};
use crate::sim::complexity;
use crate::sim::state::{ActiveStroke, GameState, Stroke};

/// Begin a new stroke. Starting within the capture radius of an unconnected
/// curve's tip connects that curve and rewards the player before the first
/// point lands.
pub fn begin_stroke(state: &mut GameState, point: Vec2) {
    // A dangling in-progress stroke means we missed an end event; close it
    // out rather than dropping the player's work.
    if state.active_stroke.is_some() {
        finalize_stroke(state);
    }

    let now = state.time();
    let radius_sq = state.tuning.capture_radius * state.tuning.capture_radius;
    let reward = state.tuning.connect_reward;

    let mut connections = 0u32;
    for curve in &mut state.curves {
        if curve.connected {
            continue;
        }
        let Some(tip) = curve.tip() else { continue };
        if tip.distance_squared(point) <= radius_sq {
            curve.connected = true;
            curve.connected_at = now;
            connections += 1;
        }
    }
    for _ in 0..connections {
        complexity::reward(state, reward);
    }

    state.active_stroke = Some(ActiveStroke {
        points: vec![point],
        started_at: now,
    });
}

/// Append a pointer-move position, subject to the minimum spacing filter.
pub fn extend_stroke(state: &mut GameState, point: Vec2) {
    let Some(active) = state.active_stroke.as_mut() else {
        return;
    };
    if let Some(&last) = active.points.last() {
        if last.distance(point) <= MIN_POINT_SPACING {
            return;
        }
    }
    active.points.push(point);
}

/// Finalize the in-progress stroke into the registry.
pub fn finalize_stroke(state: &mut GameState) {
    let Some(active) = state.active_stroke.take() else {
        return;
    };
    if active.points.is_empty() {
        return;
    }

    let now = state.time();
    let decisiveness = decisiveness_of(&active.points);
    // Captured against complexity as it stands now, before this stroke's
    // points feed the recompute below.
    let intensity = decisiveness * (1.0 + state.complexity / COMPLEXITY_MAX);

    let base = active.points.len() as u32;
    let bonus = (decisiveness * 10.0).floor() as u32;
    state.score += base + bonus;

    let id = state.next_entity_id();
    state.strokes.push(Stroke {
        id,
        points: active.points,
        decisiveness,
        intensity,
        created_at: now,
        behavior: None,
        shadow: None,
    });

    complexity::recompute(state);
}

/// Straightness times capped drawing speed, in [0, 1].
///
/// `straightness` compares the endpoint-to-endpoint distance against the
/// walked distance; `speed` is points per walked unit. The walked distance is
/// floored at 1 so degenerate strokes divide cleanly.
pub fn decisiveness_of(points: &[Vec2]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    let straight = points[0].distance(points[points.len() - 1]);
    let mut actual = 0.0;
    for pair in points.windows(2) {
        actual += pair[0].distance(pair[1]);
    }
    let actual = actual.max(1.0);
    let straightness = straight / actual;
    let speed = points.len() as f32 / actual;
    (straightness * (2.0 * speed).min(1.0)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GamePhase, UnknownCurve};
    use proptest::prelude::*;

    fn line(n: usize, spacing: f32) -> Vec<Vec2> {
        (0..n).map(|i| Vec2::new(i as f32 * spacing, 0.0)).collect()
    }

    #[test]
    fn test_decisive_straight_stroke() {
        // Dense straight line: straightness 1, speed past the cap.
        let d = decisiveness_of(&line(10, 1.2));
        assert!(d > 0.9, "expected near-1 decisiveness, got {d}");
    }

    #[test]
    fn test_hesitant_stroke_scores_low() {
        // A tight zigzag walks far but goes nowhere.
        let points: Vec<Vec2> = (0..40)
            .map(|i| Vec2::new((i % 2) as f32 * 4.0, i as f32 * 0.5))
            .collect();
        let d = decisiveness_of(&points);
        assert!(d < 0.5, "expected low decisiveness, got {d}");
    }

    #[test]
    fn test_degenerate_strokes() {
        assert_eq!(decisiveness_of(&[]), 0.0);
        assert_eq!(decisiveness_of(&[Vec2::new(5.0, 5.0)]), 0.0);
        // Two identical points: walked distance floors to 1, straight is 0.
        let d = decisiveness_of(&[Vec2::ZERO, Vec2::ZERO]);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_spacing_filter() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        begin_stroke(&mut state, Vec2::ZERO);
        extend_stroke(&mut state, Vec2::new(1.0, 0.0)); // too close, dropped
        extend_stroke(&mut state, Vec2::new(3.0, 0.0)); // exactly 3, dropped
        extend_stroke(&mut state, Vec2::new(4.0, 0.0)); // > 3 from last kept
        let active = state.active_stroke.as_ref().expect("active stroke");
        assert_eq!(active.points.len(), 2);
        assert_eq!(active.points[1], Vec2::new(4.0, 0.0));
    }

    #[test]
    fn test_finalize_scores_and_recomputes() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        state.active_stroke = Some(ActiveStroke {
            points: line(10, 1.2),
            started_at: 0.0,
        });
        finalize_stroke(&mut state);
        assert_eq!(state.strokes.len(), 1);
        let stroke = &state.strokes[0];
        // Base 10 points plus a bonus from near-1 decisiveness.
        assert!(state.score > 10, "score {} should include a bonus", state.score);
        assert!(stroke.decisiveness > 0.9);
        // 10 points * 1.0 / 10 = 1.0 complexity
        assert_eq!(state.complexity, 1.0);
        assert!(state.active_stroke.is_none());
    }

    #[test]
    fn test_intensity_captured_before_recompute() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        state.complexity = 50.0;
        state.active_stroke = Some(ActiveStroke {
            points: line(10, 1.2),
            started_at: 0.0,
        });
        finalize_stroke(&mut state);
        let stroke = &state.strokes[0];
        let expected = stroke.decisiveness * 1.5;
        assert!((stroke.intensity - expected).abs() < 1e-6);
    }

    #[test]
    fn test_empty_finalize_is_noop() {
        let mut state = GameState::new(1);
        finalize_stroke(&mut state);
        assert!(state.strokes.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_start_connects_nearby_curve() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        state.complexity = 50.0;
        state.curves.push(UnknownCurve {
            id: 99,
            points: vec![Vec2::new(100.0, 100.0), Vec2::new(120.0, 100.0)],
            created_at: 0.0,
            connected: false,
            connected_at: 0.0,
            intensity: 0.5,
        });
        // Start 25 units from the tip, inside the 30-unit capture radius.
        begin_stroke(&mut state, Vec2::new(145.0, 100.0));
        assert!(state.curves[0].connected);
        assert_eq!(state.complexity, 35.0);
    }

    #[test]
    fn test_start_misses_far_curve() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        state.complexity = 50.0;
        state.curves.push(UnknownCurve {
            id: 99,
            points: vec![Vec2::new(100.0, 100.0)],
            created_at: 0.0,
            connected: false,
            connected_at: 0.0,
            intensity: 0.5,
        });
        begin_stroke(&mut state, Vec2::new(200.0, 100.0));
        assert!(!state.curves[0].connected);
        assert_eq!(state.complexity, 50.0);
    }

    #[test]
    fn test_connected_curves_ignored_on_start() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        state.complexity = 50.0;
        state.curves.push(UnknownCurve {
            id: 99,
            points: vec![Vec2::new(100.0, 100.0)],
            created_at: 0.0,
            connected: true,
            connected_at: 0.0,
            intensity: 0.5,
        });
        begin_stroke(&mut state, Vec2::new(100.0, 100.0));
        assert_eq!(state.complexity, 50.0);
    }

    #[test]
    fn test_begin_finalizes_dangling_stroke() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        begin_stroke(&mut state, Vec2::ZERO);
        extend_stroke(&mut state, Vec2::new(10.0, 0.0));
        // End never arrived; a fresh start must not drop the old stroke.
        begin_stroke(&mut state, Vec2::new(500.0, 500.0));
        assert_eq!(state.strokes.len(), 1);
        let active = state.active_stroke.as_ref().expect("active stroke");
        assert_eq!(active.points[0], Vec2::new(500.0, 500.0));
    }

    proptest! {
        #[test]
        fn prop_decisiveness_in_unit_range(
            points in prop::collection::vec((-1e4f32..1e4, -1e4f32..1e4), 0..60)
        ) {
            let points: Vec<Vec2> = points.into_iter().map(|(x, y)| Vec2::new(x, y)).collect();
            let d = decisiveness_of(&points);
            prop_assert!((0.0..=1.0).contains(&d), "decisiveness {} out of range", d);
        }
    }
}
