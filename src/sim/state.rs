//! Game state and core simulation types
//!
//! One owning registry for everything the tick mutates: strokes, their
//! distortion shadows, fragments, unknown curves, particles, the complexity
//! scalar, and the single RNG.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::noise::FlowField;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the player to start a session
    Ready,
    /// Active drawing/simulation
    Playing,
    /// Session suspended; nothing advances
    Paused,
    /// Complexity reached the ceiling (or the session was ended)
    GameOver,
}

/// Mutation mechanism a finalized stroke is locked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
    /// Continuously re-animated from original coordinates; reversible
    Animate,
    /// Mutated irreversibly, one segment at a time
    Permanent,
}

/// Per-stroke mutation behavior, assigned once and never reassigned.
#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    pub kind: BehaviorKind,
    /// Fixed at assignment, uniform in [0, 1]
    pub intensity: f32,
    /// Animate only: animation locked at its last computed position
    pub frozen: bool,
    pub frozen_at: f32,
}

/// Shadow entry index-aligned with a stroke's original point.
#[derive(Debug, Clone, Copy)]
pub struct ShadowPoint {
    /// Current on-screen position
    pub pos: Vec2,
    /// Irreversibly mutated; coordinates never recomputed once set
    pub distorted: bool,
    /// Candidate for render-time skip at high complexity
    pub eroded: bool,
    /// Excluded from solid rendering, drawn dashed
    pub fragmented: bool,
}

impl ShadowPoint {
    pub fn from_point(pos: Vec2) -> Self {
        Self {
            pos,
            distorted: false,
            eroded: false,
            fragmented: false,
        }
    }
}

/// A finalized stroke: original geometry plus derived metadata and the
/// lazily created distortion shadow.
#[derive(Debug, Clone)]
pub struct Stroke {
    pub id: u32,
    /// Original coordinates, append-ordered, never reordered or rewritten
    pub points: Vec<Vec2>,
    /// Straightness x speed score in [0, 1]
    pub decisiveness: f32,
    /// decisiveness scaled by complexity at creation time
    pub intensity: f32,
    pub created_at: f32,
    /// Assigned on first tick the stroke is observed
    pub behavior: Option<Behavior>,
    /// Created on first mutation, index-aligned with `points`
    pub shadow: Option<Vec<ShadowPoint>>,
}

impl Stroke {
    /// Current on-screen position of point `i` (shadow if present).
    pub fn current_pos(&self, i: usize) -> Vec2 {
        match &self.shadow {
            Some(shadow) => shadow[i].pos,
            None => self.points[i],
        }
    }

    /// Initialize the shadow from the original points if absent.
    pub fn ensure_shadow(&mut self) -> &mut Vec<ShadowPoint> {
        let points = &self.points;
        self.shadow
            .get_or_insert_with(|| points.iter().copied().map(ShadowPoint::from_point).collect())
    }
}

/// The stroke currently being drawn. Append-only until finalized; rendered
/// undistorted and owned by nothing but the input path.
#[derive(Debug, Clone, Default)]
pub struct ActiveStroke {
    pub points: Vec<Vec2>,
    pub started_at: f32,
}

/// A detached, drifting visual copy of part of a stroke.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub id: u32,
    /// Snapshot of the source segment's on-screen positions at detach time
    pub points: Vec<Vec2>,
    /// Accumulated drift, applied at render time
    pub offset: Vec2,
    /// Drift velocity, field units per time unit
    pub drift: Vec2,
    pub created_at: f32,
    /// Advances every tick; drives the dash animation
    pub dash_progress: f32,
}

/// A speculative branch polyline. Connecting a new stroke near its tip
/// rewards the player; it never alters stroke geometry.
#[derive(Debug, Clone)]
pub struct UnknownCurve {
    pub id: u32,
    pub points: Vec<Vec2>,
    pub created_at: f32,
    pub connected: bool,
    pub connected_at: f32,
    /// Drives the render-side pulse
    pub intensity: f32,
}

impl UnknownCurve {
    /// The capture point a new stroke must start near to connect.
    pub fn tip(&self) -> Option<Vec2> {
        self.points.last().copied()
    }
}

/// A free particle of the unknown. Purely visual; carries no identity.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    /// Fixed coordinate the flow field is sampled at
    pub home: Vec2,
    pub vel: Vec2,
    /// Within a stroke's influence radius this tick (render tint)
    pub influenced: bool,
}

/// Default particle population (the Medium quality preset).
pub const DEFAULT_PARTICLE_POPULATION: usize = 2000;

/// Complete game state. Deterministic given seed and input sequence.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// The one random source every subsystem draws from
    pub rng: Pcg32,
    /// Coherent-noise sampler, seeded alongside the RNG
    pub flow: FlowField,
    /// Balance control panel
    pub tuning: Tuning,
    /// Field dimensions; particle space wraps at these bounds
    pub field_width: f32,
    pub field_height: f32,
    /// Current phase
    pub phase: GamePhase,
    /// Simulation tick counter; advances only while Playing
    pub time_ticks: u64,
    /// Score accumulated from stroke completion
    pub score: u32,
    /// The drive scalar, clamped to [0, COMPLEXITY_MAX]
    pub complexity: f32,
    /// Highest complexity reached this session
    pub complexity_peak: f32,
    /// Finalized strokes, id-ordered by construction
    pub strokes: Vec<Stroke>,
    /// The in-progress stroke, if the pointer is down
    pub active_stroke: Option<ActiveStroke>,
    /// Live fragments, id-ordered by construction
    pub fragments: Vec<Fragment>,
    /// Live unknown curves, id-ordered by construction
    pub curves: Vec<UnknownCurve>,
    /// The particle field
    pub particles: Vec<Particle>,
    /// Next irreversible-mutation trigger, in sim seconds
    pub next_mutation_at: f32,
    /// Next fragmentation trigger
    pub next_fragment_at: f32,
    /// Next unknown-curve trigger
    pub next_curve_at: f32,
    /// Next entity ID (strokes, fragments, curves share the sequence)
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed.
    pub fn new(seed: u64) -> Self {
        let tuning = Tuning::default();
        let next_mutation_at = tuning.mutation_interval(0.0);
        let next_fragment_at = tuning.fragment_interval(0.0);
        let next_curve_at = tuning.curve_interval;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            flow: FlowField::new(seed as u32),
            tuning,
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            phase: GamePhase::Ready,
            time_ticks: 0,
            score: 0,
            complexity: 0.0,
            complexity_peak: 0.0,
            strokes: Vec::new(),
            active_stroke: None,
            fragments: Vec::new(),
            curves: Vec::new(),
            particles: Vec::new(),
            next_mutation_at,
            next_fragment_at,
            next_curve_at,
            next_id: 1,
        };
        state.resize_particles(DEFAULT_PARTICLE_POPULATION);
        state
    }

    /// Allocate a new entity ID.
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Elapsed simulation time in seconds. Frozen while paused.
    pub fn time(&self) -> f32 {
        self.time_ticks as f32 * SIM_DT
    }

    /// Seconds survived, the HUD/session figure. Identical to sim time
    /// because ticks only advance while playing.
    pub fn survival_secs(&self) -> f32 {
        self.time()
    }

    /// Grow or shrink the particle population (quality presets).
    pub fn resize_particles(&mut self, population: usize) {
        if population < self.particles.len() {
            self.particles.truncate(population);
            return;
        }
        while self.particles.len() < population {
            let home = Vec2::new(
                self.rng.random_range(0.0..self.field_width),
                self.rng.random_range(0.0..self.field_height),
            );
            self.particles.push(Particle {
                pos: home,
                home,
                vel: Vec2::ZERO,
                influenced: false,
            });
        }
    }

    /// Total points across finalized strokes; the complexity growth input.
    pub fn total_drawn_points(&self) -> usize {
        self.strokes.iter().map(|s| s.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score, 0);
        assert_eq!(state.complexity, 0.0);
        assert!(state.strokes.is_empty());
        assert_eq!(state.particles.len(), DEFAULT_PARTICLE_POPULATION);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_entity_ids_monotonic() {
        let mut state = GameState::new(1);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        let c = state.next_entity_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_particles_spawn_inside_field() {
        let state = GameState::new(123);
        for p in &state.particles {
            assert!(p.pos.x >= 0.0 && p.pos.x < state.field_width);
            assert!(p.pos.y >= 0.0 && p.pos.y < state.field_height);
            assert_eq!(p.pos, p.home);
        }
    }

    #[test]
    fn test_resize_particles() {
        let mut state = GameState::new(5);
        state.resize_particles(100);
        assert_eq!(state.particles.len(), 100);
        state.resize_particles(300);
        assert_eq!(state.particles.len(), 300);
    }

    #[test]
    fn test_ensure_shadow_matches_points() {
        let mut stroke = Stroke {
            id: 1,
            points: vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)],
            decisiveness: 1.0,
            intensity: 1.0,
            created_at: 0.0,
            behavior: None,
            shadow: None,
        };
        assert_eq!(stroke.current_pos(1), Vec2::new(10.0, 0.0));
        let shadow = stroke.ensure_shadow();
        assert_eq!(shadow.len(), 2);
        assert!(!shadow[0].distorted && !shadow[0].eroded && !shadow[0].fragmented);
        assert_eq!(stroke.current_pos(1), Vec2::new(10.0, 0.0));
    }
}
