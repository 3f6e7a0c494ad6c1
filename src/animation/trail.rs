use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::animation::curve::RouteCurve;
use crate::config::AnimationConfig;
use crate::WorldPoint;

/// Spark particles strung out behind the comet.
#[derive(Debug, Clone)]
pub struct CometTrail {
    particles: Vec<WorldPoint>,
    span: f64,
    scatter: f64,
    seed: u64,
    rng: ChaCha8Rng,
}

impl CometTrail {
    pub fn new(config: &AnimationConfig) -> Self {
        CometTrail {
            particles: vec![WorldPoint::ZERO; config.trail_particles],
            span: config.trail_span,
            scatter: config.trail_scatter,
            seed: config.trail_seed,
            rng: ChaCha8Rng::seed_from_u64(config.trail_seed),
        }
    }

    pub fn particles(&self) -> &[WorldPoint] {
        &self.particles
    }

    /// Restarts the scatter sequence so a replay looks identical.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.particles.fill(WorldPoint::ZERO);
    }

    /// Places particle `i` at an earlier point of the curve, scattering the
    /// tail more than the head.
    pub fn update(&mut self, curve: &RouteCurve, t: f64) {
        let count = self.particles.len();
        for (i, slot) in self.particles.iter_mut().enumerate() {
            let along = i as f64 / count as f64;
            let base = curve.point_at((t - along * self.span).max(0.0));
            let spread = self.scatter * along;
            *slot = WorldPoint::new(
                base.x + (self.rng.random::<f64>() - 0.5) * spread,
                base.y + (self.rng.random::<f64>() - 0.5) * spread,
                base.z + (self.rng.random::<f64>() - 0.5) * spread,
            );
        }
    }
}
