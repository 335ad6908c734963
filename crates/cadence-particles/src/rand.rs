//! Seeded random source shared by emitters and random forces

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random sampling helpers over an injected, seedable generator.
#[derive(Debug, Clone)]
pub struct ParticleRng {
    rng: StdRng,
}

impl ParticleRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Returns a float in [min, max); `min` when the range is empty
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniformly distributed point on the unit sphere (Marsaglia)
    pub fn unit_sphere(&mut self) -> Vec3 {
        loop {
            let x = self.range(-1.0, 1.0);
            let y = self.range(-1.0, 1.0);
            let s = x * x + y * y;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                return Vec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
            }
        }
    }

    /// Unit direction within the cone around `axis` whose half-angle is
    /// `atan(tan_half_angle)`.
    ///
    /// Samples a disk of radius `tan_half_angle` one unit along the axis and
    /// normalizes, so the opening is given as a tangent rather than an angle.
    pub fn cone_direction(&mut self, axis: Vec3, tan_half_angle: f32) -> Vec3 {
        let forward = axis.normalize_or(Vec3::Y);
        if tan_half_angle <= 0.0 {
            return forward;
        }
        let (u, w) = forward.any_orthonormal_pair();
        let r = tan_half_angle * self.next_f32().sqrt();
        let phi = self.range(0.0, std::f32::consts::TAU);
        (forward + u * (r * phi.cos()) + w * (r * phi.sin())).normalize()
    }

    /// Standard normal sample (Box–Muller)
    pub fn gaussian(&mut self) -> f32 {
        // 1 - [0,1) keeps ln away from zero
        let u1 = 1.0 - self.next_f32();
        let u2 = self.next_f32();
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }
}
