//! Data-driven game balance.
//!
//! Every gameplay constant that shapes how the unknown behaves lives here,
//! so a balance pass touches one file and tests can pin exact values.

use rand::Rng;

/// An inclusive-exclusive f32 range with a convenience sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Sample uniformly from the span. Degenerate spans return `min`.
    pub fn pick(&self, rng: &mut impl Rng) -> f32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.random_range(self.min..self.max)
    }
}

/// The balance control panel. One instance lives in `GameState`.
#[derive(Clone, Debug)]
pub struct Tuning {
    // -- Complexity --
    /// Multiplier on total drawn points before normalization.
    pub growth_rate: f32,
    /// Divisor turning point totals into the 0-100 scale.
    pub normalizer: f32,
    /// Complexity knocked off when a stroke connects to an unknown curve.
    pub connect_reward: f32,

    // -- Behavior --
    /// Per-tick freeze lottery probability, scaled by the complexity factor.
    pub freeze_chance: f32,
    /// Decisiveness-to-resistance factor: resistance = 1 - decisiveness * k.
    pub resistance_k: f32,

    // -- Continuous distortion --
    /// Base wobble amplitude in field units, before complexity/intensity scaling.
    pub wobble_amplitude: f32,

    // -- Periodic irreversible distortion --
    /// Interval = max(min, base - scale * complexity_factor).
    pub mutation_interval_base: f32,
    pub mutation_interval_scale: f32,
    pub mutation_interval_min: f32,
    /// Fraction of the stroke mutated per trigger.
    pub mutation_segment: Span,
    /// Magnitude of the random-direction wave term, field units.
    pub mutation_wave_mag: f32,
    /// Magnitude of the coherent-noise term, field units.
    pub mutation_noise_mag: f32,
    /// Complexity factor above which newly distorted points may erode.
    pub erosion_threshold: f32,
    /// Chance an eligible newly distorted point is flagged eroded.
    pub erosion_chance: f32,

    // -- Fragmentation --
    /// Interval = max(min, base - scale * complexity_factor).
    pub fragment_interval_base: f32,
    pub fragment_interval_scale: f32,
    pub fragment_interval_min: f32,
    /// Complexity factor below which fragmentation stays dormant.
    pub fragment_activation: f32,
    /// Strokes must be strictly longer than this to fragment.
    pub fragment_min_points: usize,
    /// Fraction of the stroke detached per trigger.
    pub fragment_segment: Span,
    /// Drift speed assigned to a new fragment, field units per time unit.
    pub fragment_drift: Span,
    /// Fragments older than this are discarded.
    pub fragment_max_age: f32,

    // -- Unknown curves --
    /// Fixed generation interval in time units.
    pub curve_interval: f32,
    /// Curves only generate while complexity is strictly inside this window.
    pub curve_min_complexity: f32,
    pub curve_max_complexity: f32,
    /// Trigger probability = complexity_factor * this scale.
    pub curve_chance_scale: f32,
    /// Source strokes must be strictly longer than this.
    pub curve_min_points: usize,
    /// Branch point as a fraction along the source stroke.
    pub curve_branch: Span,
    /// Generated polyline point count, inclusive.
    pub curve_points_min: usize,
    pub curve_points_max: usize,
    /// Step length = base + scale * complexity_factor, field units per point.
    pub curve_step_base: f32,
    pub curve_step_scale: f32,
    /// New strokes starting within this radius of a curve tip connect to it.
    pub capture_radius: f32,
    /// Unconnected curves live for two generation cycles.
    pub curve_unconnected_lifetime: f32,
    /// Connected curves linger this long before removal.
    pub curve_connected_grace: f32,

    // -- Particle field --
    /// Strokes repel particles inside this radius.
    pub particle_influence_radius: f32,
    /// Repulsion acceleration scale.
    pub particle_repulsion: f32,
    /// Magnitude of the chaos kick near decisive strokes at high complexity.
    pub particle_chaos_mag: f32,
    /// Complexity above which the chaos term can fire.
    pub particle_chaos_complexity: f32,
    /// Nearby stroke decisiveness above which the chaos term can fire.
    pub particle_chaos_decisiveness: f32,
    /// Base flow speed from the noise field, field units per time unit.
    pub particle_flow_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            growth_rate: 1.0,
            normalizer: 10.0,
            connect_reward: 15.0,

            freeze_chance: 0.05,
            resistance_k: 0.2,

            wobble_amplitude: 3.0,

            mutation_interval_base: 2.0,
            mutation_interval_scale: 1.5,
            mutation_interval_min: 0.5,
            mutation_segment: Span::new(0.2, 0.6),
            mutation_wave_mag: 14.0,
            mutation_noise_mag: 9.0,
            erosion_threshold: 0.85,
            erosion_chance: 0.25,

            fragment_interval_base: 5.0,
            fragment_interval_scale: 3.0,
            fragment_interval_min: 2.0,
            fragment_activation: 0.1,
            fragment_min_points: 10,
            fragment_segment: Span::new(0.15, 0.40),
            fragment_drift: Span::new(6.0, 18.0),
            fragment_max_age: 15.0,

            curve_interval: 3.0,
            curve_min_complexity: 20.0,
            curve_max_complexity: 90.0,
            curve_chance_scale: 0.4,
            curve_min_points: 5,
            curve_branch: Span::new(0.3, 0.8),
            curve_points_min: 5,
            curve_points_max: 12,
            curve_step_base: 6.0,
            curve_step_scale: 14.0,
            capture_radius: 30.0,
            curve_unconnected_lifetime: 6.0,
            curve_connected_grace: 1.0,

            particle_influence_radius: 70.0,
            particle_repulsion: 40.0,
            particle_chaos_mag: 25.0,
            particle_chaos_complexity: 50.0,
            particle_chaos_decisiveness: 0.7,
            particle_flow_speed: 12.0,
        }
    }
}

impl Tuning {
    /// Periodic mutation interval at the given complexity factor.
    pub fn mutation_interval(&self, cf: f32) -> f32 {
        (self.mutation_interval_base - self.mutation_interval_scale * cf)
            .max(self.mutation_interval_min)
    }

    /// Fragmentation interval at the given complexity factor.
    pub fn fragment_interval(&self, cf: f32) -> f32 {
        (self.fragment_interval_base - self.fragment_interval_scale * cf)
            .max(self.fragment_interval_min)
    }
}
