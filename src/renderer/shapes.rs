//! Shape generation for 2D primitives
//!
//! Strokes, fragments and curve hints all render as quad ribbons along
//! their polylines; particles render as small quads. Everything is a
//! triangle list in game coordinates.

use glam::Vec2;

use super::vertex::Vertex;

fn push_quad(vertices: &mut Vec<Vertex>, a: Vec2, b: Vec2, perp: Vec2, color: [f32; 4]) {
    let v1a = a + perp;
    let v1b = a - perp;
    let v2a = b + perp;
    let v2b = b - perp;

    vertices.push(Vertex::new(v1a.x, v1a.y, color));
    vertices.push(Vertex::new(v1b.x, v1b.y, color));
    vertices.push(Vertex::new(v2a.x, v2a.y, color));

    vertices.push(Vertex::new(v2a.x, v2a.y, color));
    vertices.push(Vertex::new(v1b.x, v1b.y, color));
    vertices.push(Vertex::new(v2b.x, v2b.y, color));
}

/// Generate vertices for a solid ribbon along a polyline
pub fn polyline(points: &[Vec2], half_width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance(b);
        if len <= f32::EPSILON {
            continue;
        }
        let dir = (b - a) / len;
        let perp = Vec2::new(-dir.y, dir.x) * half_width;
        push_quad(&mut vertices, a, b, perp, color);
    }

    vertices
}

/// Generate vertices for a dashed ribbon along a polyline
///
/// The dash pattern runs by arclength across the whole polyline, so dashes
/// flow over segment joints. `phase` shifts where the pattern starts, which
/// lets drifting fragments animate their dashes.
pub fn dashed_polyline(
    points: &[Vec2],
    half_width: f32,
    color: [f32; 4],
    dash_on: f32,
    dash_off: f32,
    phase: f32,
) -> Vec<Vertex> {
    let period = dash_on + dash_off;
    if period <= f32::EPSILON || dash_on <= f32::EPSILON {
        return polyline(points, half_width, color);
    }

    let mut vertices = Vec::new();
    let mut s = phase.rem_euclid(period);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance(b);
        if len <= f32::EPSILON {
            continue;
        }
        let dir = (b - a) / len;
        let perp = Vec2::new(-dir.y, dir.x) * half_width;

        let mut t = 0.0;
        while t < len {
            let local = s.rem_euclid(period);
            // Advance either to the end of the current on/off span or to
            // the end of this segment, whichever comes first. The floor on
            // `run` keeps float residue from stalling the walk.
            if local < dash_on {
                let run = (dash_on - local).min(len - t).max(1e-4);
                push_quad(&mut vertices, a + dir * t, a + dir * (t + run), perp, color);
                t += run;
                s += run;
            } else {
                let run = (period - local).min(len - t).max(1e-4);
                t += run;
                s += run;
            }
        }
    }

    vertices
}

/// Generate vertices for a single particle quad
pub fn particle_quad(pos: Vec2, half_size: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        Vec2::new(pos.x, pos.y - half_size),
        Vec2::new(pos.x, pos.y + half_size),
        Vec2::new(-half_size, 0.0),
        color,
    );
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_polyline_two_triangles_per_segment() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
        ];
        assert_eq!(polyline(&points, 1.0, WHITE).len(), 12);
    }

    #[test]
    fn test_polyline_needs_two_points() {
        assert!(polyline(&[], 1.0, WHITE).is_empty());
        assert!(polyline(&[Vec2::ZERO], 1.0, WHITE).is_empty());
    }

    #[test]
    fn test_polyline_skips_degenerate_segment() {
        let points = vec![Vec2::ZERO, Vec2::ZERO, Vec2::new(5.0, 0.0)];
        assert_eq!(polyline(&points, 1.0, WHITE).len(), 6);
    }

    #[test]
    fn test_dashed_polyline_counts_dashes() {
        // Length 22 with 6-on/5-off from phase 0 gives on-spans at [0,6)
        // and [11,17); the third would start exactly at 22 and is empty.
        let points = vec![Vec2::new(0.0, 0.0), Vec2::new(22.0, 0.0)];
        let verts = dashed_polyline(&points, 1.0, WHITE, 6.0, 5.0, 0.0);
        assert_eq!(verts.len(), 12);
    }

    #[test]
    fn test_dashed_polyline_phase_shifts_pattern() {
        let points = vec![Vec2::new(0.0, 0.0), Vec2::new(22.0, 0.0)];
        let base = dashed_polyline(&points, 1.0, WHITE, 6.0, 5.0, 0.0);
        let shifted = dashed_polyline(&points, 1.0, WHITE, 6.0, 5.0, 8.0);
        let first_x = |verts: &[Vertex]| {
            verts
                .iter()
                .map(|v| v.position[0])
                .fold(f32::MAX, f32::min)
        };
        assert!((first_x(&base) - first_x(&shifted)).abs() > 1.0);
    }

    #[test]
    fn test_dashed_polyline_zero_pattern_falls_back_solid() {
        let points = vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)];
        assert_eq!(
            dashed_polyline(&points, 1.0, WHITE, 0.0, 0.0, 0.0).len(),
            6
        );
    }

    #[test]
    fn test_particle_quad_centered() {
        let verts = particle_quad(Vec2::new(5.0, 5.0), 2.0, WHITE);
        assert_eq!(verts.len(), 6);
        for v in &verts {
            assert!((v.position[0] - 5.0).abs() <= 2.0 + 1e-5);
            assert!((v.position[1] - 5.0).abs() <= 2.0 + 1e-5);
        }
    }
}
