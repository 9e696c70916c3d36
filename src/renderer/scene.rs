//! Scene assembly: turn a game state into one vertex list
//!
//! This is a read-only pass over [`GameState`]: it never touches the
//! simulation RNG. Layers are painted back to front: particles, finalized
//! strokes, fragments, the in-progress stroke, then unknown-curve hints.

use std::f32::consts::TAU;

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts;
use crate::settings::Settings;
use crate::sim::{GameState, complexity_factor};

/// Complexity above which finalized strokes start to fade
const FADE_THRESHOLD: f32 = 85.0;
/// Fragment alpha ramps down over this many final time units
const FRAGMENT_FADE_SPAN: f32 = 3.0;
/// How fast fragment dashes crawl, in field units per time unit
const FRAGMENT_DASH_SPEED: f32 = 18.0;

fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Render-side flicker roll for eroded points.
///
/// Stable within a short tick window so eroded gaps hold still for a few
/// frames, re-rolled as ticks advance. Pure hash: the render pass must not
/// consume simulation randomness.
fn erosion_skip(stroke_id: u32, index: usize, ticks: u64, chance: f32) -> bool {
    let mut h = stroke_id.wrapping_mul(2654435761);
    h = h.wrapping_add(index as u32).wrapping_mul(2246822519);
    h = h.wrapping_add((ticks / 6) as u32).wrapping_mul(3266489917);
    h ^= h >> 15;
    ((h % 1000) as f32) < chance * 1000.0
}

fn emit_run(
    vertices: &mut Vec<Vertex>,
    run: &[Vec2],
    dashed: bool,
    half_width: f32,
    color: [f32; 4],
) {
    if run.len() < 2 {
        return;
    }
    if dashed {
        vertices.extend(shapes::dashed_polyline(
            run,
            half_width,
            color,
            consts::DASH_ON,
            consts::DASH_OFF,
            0.0,
        ));
    } else {
        vertices.extend(shapes::polyline(run, half_width, color));
    }
}

/// Build the full scene for one frame
pub fn build_scene(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    let now = state.time();
    let cf = complexity_factor(state);

    // Particles
    for p in &state.particles {
        let color = if p.influenced && settings.particle_tint {
            colors::PARTICLE_INFLUENCED
        } else {
            colors::PARTICLE
        };
        vertices.extend(shapes::particle_quad(p.pos, consts::PARTICLE_SIZE, color));
    }

    // Finalized strokes, from the distortion shadow where one exists
    let stroke_alpha = if state.complexity > FADE_THRESHOLD {
        1.0 - 0.6 * ((state.complexity - FADE_THRESHOLD) / (consts::COMPLEXITY_MAX - FADE_THRESHOLD))
    } else {
        1.0
    };
    let skip_chance = (0.25 + 0.5 * cf).min(0.9);
    let half_width = consts::STROKE_WIDTH * 0.5;
    for stroke in &state.strokes {
        let color = with_alpha(colors::STROKE, stroke_alpha);
        let mut run: Vec<Vec2> = Vec::new();
        let mut run_dashed = false;
        for i in 0..stroke.points.len() {
            let flags = stroke.shadow.as_ref().and_then(|s| s.get(i));
            let eroded = flags.is_some_and(|f| f.eroded);
            let fragmented = flags.is_some_and(|f| f.fragmented);
            if eroded
                && settings.render_erosion
                && erosion_skip(stroke.id, i, state.time_ticks, skip_chance)
            {
                // Gap: the line breaks here
                emit_run(&mut vertices, &run, run_dashed, half_width, color);
                run.clear();
                continue;
            }
            if !run.is_empty() && fragmented != run_dashed {
                // Style change: close the run and restart from its tail so
                // the line stays visually continuous
                let tail = run[run.len() - 1];
                emit_run(&mut vertices, &run, run_dashed, half_width, color);
                run.clear();
                run.push(tail);
            }
            run_dashed = fragmented;
            run.push(stroke.current_pos(i));
        }
        emit_run(&mut vertices, &run, run_dashed, half_width, color);
    }

    // Drifting fragments
    for frag in &state.fragments {
        let age = now - frag.created_at;
        let fade =
            ((state.tuning.fragment_max_age - age) / FRAGMENT_FADE_SPAN).clamp(0.0, 1.0);
        let phase = if settings.reduced_motion {
            0.0
        } else {
            frag.dash_progress * FRAGMENT_DASH_SPEED
        };
        let points: Vec<Vec2> = frag.points.iter().map(|p| *p + frag.offset).collect();
        vertices.extend(shapes::dashed_polyline(
            &points,
            half_width,
            with_alpha(colors::FRAGMENT, fade),
            consts::DASH_ON,
            consts::DASH_OFF,
            phase,
        ));
    }

    // In-progress stroke, always raw points at full strength
    if let Some(active) = &state.active_stroke {
        vertices.extend(shapes::polyline(
            &active.points,
            half_width,
            colors::STROKE_ACTIVE,
        ));
    }

    // Unknown-curve hints, unconnected only
    let curve_half = consts::CURVE_WIDTH * 0.5;
    for curve in state.curves.iter().filter(|c| !c.connected) {
        let pulse = if settings.reduced_motion {
            0.8
        } else {
            0.55 + 0.45 * (now * 3.0 + curve.intensity * TAU).sin()
        };
        let phase = if settings.reduced_motion { 0.0 } else { now * 6.0 };
        vertices.extend(shapes::dashed_polyline(
            &curve.points,
            curve_half,
            with_alpha(colors::CURVE_HINT, pulse),
            consts::DASH_ON,
            consts::DASH_OFF,
            phase,
        ));
    }

    vertices
}
