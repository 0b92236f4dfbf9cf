#![forbid(unsafe_code)]

//! Particle simulation for one animator.
//!
//! # Invariants
//!
//! 1. A particle set belongs to exactly one generation [`Dimension`]; it is
//!    regenerated, never stretched, when the observed size changes
//!    materially.
//! 2. Positions stay in `[-m, w + m) × [-m, h + m)` of the generation
//!    dimension, where `m` is the overflow margin. Motion wraps around.
//! 3. The particle set is a pure function of the seed and the generation
//!    dimension.
//! 4. An empty dimension holds no particles.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use stardust_core::Dimension;

use crate::palette::StardustPalette;

/// One star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in logical pixels.
    pub x: f64,
    pub y: f64,
    /// Velocity in logical pixels per second.
    pub vx: f64,
    pub vy: f64,
    /// Radius in logical pixels.
    pub radius: f64,
    /// Base brightness in `[0, 1]`.
    pub brightness: f64,
    /// Twinkle phase in radians.
    pub twinkle_phase: f64,
    /// Twinkle speed in radians per second.
    pub twinkle_speed: f64,
    /// Position along the palette gradient in `[0, 1]`.
    pub hue: f64,
}

impl Particle {
    /// Brightness after twinkling, in `[0.4 * brightness, brightness]`.
    #[inline]
    pub fn intensity(&self) -> f64 {
        self.brightness * (0.7 + 0.3 * self.twinkle_phase.sin())
    }
}

/// Tunables for particle generation and motion.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorParams {
    /// Particles per square logical pixel.
    pub density: f64,
    /// Lower bound on the particle count for a non-empty area.
    pub min_count: usize,
    /// Upper bound on the particle count.
    pub max_count: usize,
    /// Speed range, logical pixels per second.
    pub speed_min: f64,
    pub speed_max: f64,
    /// Radius range, logical pixels.
    pub radius_min: f64,
    pub radius_max: f64,
    /// How far particles may drift past each edge before wrapping.
    pub overflow_margin: f64,
    /// Size change (pixels, either axis) that triggers regeneration.
    pub regen_tolerance: f64,
    /// Longest time step simulated in one frame.
    pub max_step: Duration,
    pub seed: u64,
    pub palette: StardustPalette,
}

impl Default for AnimatorParams {
    fn default() -> Self {
        Self {
            density: 0.0004,
            min_count: 8,
            max_count: 400,
            speed_min: 4.0,
            speed_max: 18.0,
            radius_min: 0.6,
            radius_max: 1.8,
            overflow_margin: 4.0,
            regen_tolerance: 1.0,
            max_step: Duration::from_millis(100),
            seed: 0x5354_4152,
            palette: StardustPalette::Nebula,
        }
    }
}

impl AnimatorParams {
    /// Copy with every field made usable: non-finite values fall back to
    /// defaults, negatives clamp to zero, and ranges are ordered.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let defaults = Self::default();
        let non_negative = |v: f64, fallback: f64| {
            if v.is_finite() { v.max(0.0) } else { fallback }
        };
        let (speed_min, speed_max) = ordered_pair(
            non_negative(self.speed_min, defaults.speed_min),
            non_negative(self.speed_max, defaults.speed_max),
        );
        let (radius_min, radius_max) = ordered_pair(
            non_negative(self.radius_min, defaults.radius_min),
            non_negative(self.radius_max, defaults.radius_max),
        );
        Self {
            density: non_negative(self.density, defaults.density),
            min_count: self.min_count.min(self.max_count),
            max_count: self.min_count.max(self.max_count),
            speed_min,
            speed_max,
            radius_min,
            radius_max,
            overflow_margin: non_negative(self.overflow_margin, defaults.overflow_margin),
            regen_tolerance: non_negative(self.regen_tolerance, defaults.regen_tolerance),
            max_step: self.max_step,
            seed: self.seed,
            palette: self.palette,
        }
    }

    /// Particles for a set of this dimension.
    ///
    /// Zero for an empty dimension, otherwise `round(area * density)`
    /// clamped to `[min_count, max_count]`.
    pub fn particle_count(&self, dim: Dimension) -> usize {
        if dim.is_empty() {
            return 0;
        }
        let raw = (dim.area() * self.density).round();
        let raw = if raw.is_finite() && raw > 0.0 { raw as usize } else { 0 };
        raw.clamp(self.min_count.min(self.max_count), self.max_count)
    }
}

/// Particles plus the dimension they were generated for.
#[derive(Debug, Clone, Default)]
pub struct ParticleState {
    dimension: Dimension,
    generation: u64,
    particles: Vec<Particle>,
}

impl ParticleState {
    /// Empty state for an unmeasured container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimension of the current generation.
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Number of regenerations so far.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// True when `dim` differs materially from the generation dimension.
    pub fn needs_regeneration(&self, dim: Dimension, params: &AnimatorParams) -> bool {
        self.dimension
            .differs_materially(&dim, params.regen_tolerance)
    }

    /// Replace the particle set with a fresh one for `dim`.
    pub fn regenerate(&mut self, dim: Dimension, params: &AnimatorParams) {
        self.generation += 1;
        self.dimension = dim;
        self.particles.clear();

        let count = params.particle_count(dim);
        if count == 0 {
            return;
        }
        let mut rng = SmallRng::seed_from_u64(mix_seed(params.seed, dim));
        self.particles.reserve(count);
        for _ in 0..count {
            let speed = lerp(params.speed_min, params.speed_max, rng.random::<f64>());
            let heading = rng.random::<f64>() * TAU;
            self.particles.push(Particle {
                x: rng.random::<f64>() * dim.width(),
                y: rng.random::<f64>() * dim.height(),
                vx: heading.cos() * speed,
                vy: heading.sin() * speed,
                radius: lerp(params.radius_min, params.radius_max, rng.random::<f64>()),
                brightness: lerp(0.35, 1.0, rng.random::<f64>()),
                twinkle_phase: rng.random::<f64>() * TAU,
                twinkle_speed: lerp(0.5, 2.5, rng.random::<f64>()),
                hue: rng.random::<f64>(),
            });
        }
    }

    /// Move every particle by `velocity * dt`, wrapping within the margin.
    pub fn step(&mut self, dt: Duration, params: &AnimatorParams) {
        let dt = dt.min(params.max_step).as_secs_f64();
        if dt <= 0.0 || self.particles.is_empty() {
            return;
        }
        let m = params.overflow_margin;
        let (w, h) = (self.dimension.width(), self.dimension.height());
        for p in &mut self.particles {
            p.x = wrap(p.x + p.vx * dt, -m, w + m);
            p.y = wrap(p.y + p.vy * dt, -m, h + m);
            p.twinkle_phase = (p.twinkle_phase + p.twinkle_speed * dt).rem_euclid(TAU);
        }
    }

    /// One frame: regenerate if `dim` changed materially, otherwise step.
    ///
    /// Returns whether the set was regenerated.
    pub fn advance(&mut self, dim: Dimension, dt: Duration, params: &AnimatorParams) -> bool {
        if self.needs_regeneration(dim, params) {
            self.regenerate(dim, params);
            true
        } else {
            self.step(dt, params);
            false
        }
    }
}

/// Seed depends only on the configured seed and the dimension.
fn mix_seed(seed: u64, dim: Dimension) -> u64 {
    let w = dim.width().to_bits().wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let h = dim.height().to_bits().rotate_left(29).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    seed ^ w ^ h
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn ordered_pair(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Wrap `v` into `[lo, hi)`. A degenerate span pins to `lo`.
#[inline]
fn wrap(v: f64, lo: f64, hi: f64) -> f64 {
    let span = hi - lo;
    if !(span > 0.0) || !v.is_finite() {
        return lo;
    }
    let wrapped = lo + (v - lo).rem_euclid(span);
    // rem_euclid can round up to exactly `span` for tiny negative inputs.
    if wrapped >= hi { lo } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dim(w: f64, h: f64) -> Dimension {
        Dimension::new(w, h)
    }

    #[test]
    fn defaults_are_already_normal() {
        let params = AnimatorParams::default();
        assert_eq!(params.normalized(), params);
    }

    #[test]
    fn normalized_orders_ranges_and_drops_bad_values() {
        let params = AnimatorParams {
            density: f64::NAN,
            min_count: 50,
            max_count: 10,
            speed_min: 20.0,
            speed_max: -3.0,
            radius_min: f64::INFINITY,
            overflow_margin: -1.0,
            ..AnimatorParams::default()
        }
        .normalized();
        assert_eq!(params.density, 0.0004);
        assert_eq!((params.min_count, params.max_count), (10, 50));
        assert_eq!((params.speed_min, params.speed_max), (0.0, 20.0));
        assert_eq!(params.radius_min, 0.6);
        assert_eq!(params.overflow_margin, 0.0);
    }

    #[test]
    fn count_is_zero_for_empty_area() {
        let params = AnimatorParams::default();
        assert_eq!(params.particle_count(Dimension::ZERO), 0);
        assert_eq!(params.particle_count(dim(0.0, 500.0)), 0);
    }

    #[test]
    fn count_follows_density_within_bounds() {
        let params = AnimatorParams::default();
        assert_eq!(params.particle_count(dim(300.0, 200.0)), 24);
        assert_eq!(params.particle_count(dim(600.0, 200.0)), 48);
        assert_eq!(params.particle_count(dim(10.0, 10.0)), 8);
        assert_eq!(params.particle_count(dim(10_000.0, 10_000.0)), 400);
    }

    #[test]
    fn regeneration_is_deterministic() {
        let params = AnimatorParams::default();
        let mut a = ParticleState::new();
        let mut b = ParticleState::new();
        a.regenerate(dim(300.0, 200.0), &params);
        b.regenerate(dim(120.0, 80.0), &params);
        b.regenerate(dim(300.0, 200.0), &params);
        assert_eq!(a.particles(), b.particles());
        assert_eq!(b.generation(), 2);
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = ParticleState::new();
        let mut b = ParticleState::new();
        a.regenerate(dim(300.0, 200.0), &AnimatorParams::default());
        b.regenerate(
            dim(300.0, 200.0),
            &AnimatorParams {
                seed: 7,
                ..AnimatorParams::default()
            },
        );
        assert_ne!(a.particles(), b.particles());
    }

    #[test]
    fn advance_regenerates_only_on_material_change() {
        let params = AnimatorParams::default();
        let mut state = ParticleState::new();
        let dt = Duration::from_millis(16);

        assert!(!state.advance(Dimension::ZERO, dt, &params));
        assert!(state.advance(dim(300.0, 200.0), dt, &params));
        assert!(!state.advance(dim(300.5, 200.0), dt, &params));
        assert!(!state.advance(dim(301.0, 199.0), dt, &params));
        assert!(state.advance(dim(600.0, 200.0), dt, &params));
        assert_eq!(state.dimension(), dim(600.0, 200.0));
        assert_eq!(state.particles().len(), 48);
        assert!(state.advance(Dimension::ZERO, dt, &params));
        assert!(state.particles().is_empty());
    }

    #[test]
    fn step_is_clamped_to_max_step() {
        let params = AnimatorParams {
            speed_min: 10.0,
            speed_max: 10.0,
            overflow_margin: 1_000.0,
            ..AnimatorParams::default()
        };
        let mut state = ParticleState::new();
        state.regenerate(dim(300.0, 200.0), &params);
        let before = state.particles()[0];
        state.step(Duration::from_secs(60), &params);
        let after = state.particles()[0];
        let moved = ((after.x - before.x).powi(2) + (after.y - before.y).powi(2)).sqrt();
        assert!((moved - 1.0).abs() < 1e-9, "moved {moved}");
    }

    #[test]
    fn wrap_handles_edges() {
        assert_eq!(wrap(-5.0, -4.0, 104.0), 103.0);
        assert_eq!(wrap(104.0, -4.0, 104.0), -4.0);
        assert_eq!(wrap(50.0, 0.0, 0.0), 0.0);
        assert_eq!(wrap(f64::NAN, 0.0, 10.0), 0.0);
    }

    proptest! {
        #[test]
        fn count_is_monotone_in_area(
            w in 0.0f64..4_000.0,
            h in 0.0f64..4_000.0,
            dw in 0.0f64..500.0,
            dh in 0.0f64..500.0,
        ) {
            let params = AnimatorParams::default();
            let small = params.particle_count(dim(w, h));
            let large = params.particle_count(dim(w + dw, h + dh));
            prop_assert!(small <= large);
            prop_assert!(large <= params.max_count);
        }

        #[test]
        fn positions_stay_within_margin(
            w in 1.0f64..800.0,
            h in 1.0f64..600.0,
            seed in any::<u64>(),
            steps in prop::collection::vec(0u64..250, 1..40),
        ) {
            let params = AnimatorParams { seed, ..AnimatorParams::default() };
            let mut state = ParticleState::new();
            state.regenerate(dim(w, h), &params);
            let m = params.overflow_margin;
            for ms in steps {
                state.step(Duration::from_millis(ms), &params);
                for p in state.particles() {
                    prop_assert!(p.x >= -m && p.x < w + m, "x {} outside", p.x);
                    prop_assert!(p.y >= -m && p.y < h + m, "y {} outside", p.y);
                    prop_assert!((0.0..=1.0).contains(&p.intensity()));
                }
            }
        }
    }
}
