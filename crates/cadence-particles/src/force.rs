//! Forces that accumulate into `Particle::force`
//!
//! Every force ADDS its contribution; the system clears the accumulators
//! before each derivative evaluation. Per-particle laws ([`ForceLaw`]) are
//! wrapped in an [`ExternalForce`], which acts on one bound particle or, in a
//! dynamic system, on every particle. Pairwise springs implement [`Force`]
//! directly.
//!
//! Springs push only their first particle. The screw force swizzles
//! components instead of taking a cross product, and the floor repeller
//! always pushes along `(0, 0.5, 0.5)`.

use crate::particle::{Particle, ParticleId, ParticleSet};
use crate::rand::ParticleRng;
use glam::Vec3;

/// Something that contributes to the particles' accumulated forces.
pub trait Force {
    /// Add this force's contribution to the particle(s) it is bound to.
    fn apply(&mut self, time: f32, particles: &mut ParticleSet);

    /// Add this force's contribution to every particle.
    ///
    /// Only called for external forces when the system is dynamic.
    fn apply_all(&mut self, time: f32, particles: &mut ParticleSet) {
        self.apply(time, particles);
    }

    /// Whether the force can act on the whole particle list
    fn is_external(&self) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// A force law evaluated one particle at a time
pub trait ForceLaw {
    fn eval(&mut self, time: f32, particle: &mut Particle);

    fn name(&self) -> &str;
}

/// Applies a [`ForceLaw`] to a bound particle, or to all particles when the
/// system is dynamic.
#[derive(Debug, Clone)]
pub struct ExternalForce<L> {
    law: L,
    target: Option<ParticleId>,
}

impl<L: ForceLaw> ExternalForce<L> {
    /// Unbound: acts only through `apply_all` in a dynamic system.
    pub fn new(law: L) -> Self {
        Self { law, target: None }
    }

    pub fn bound(law: L, target: ParticleId) -> Self {
        Self {
            law,
            target: Some(target),
        }
    }

    pub fn law(&self) -> &L {
        &self.law
    }

    pub fn law_mut(&mut self) -> &mut L {
        &mut self.law
    }

    pub fn target(&self) -> Option<ParticleId> {
        self.target
    }

    pub fn bind(&mut self, target: ParticleId) {
        self.target = Some(target);
    }
}

impl<L: ForceLaw> Force for ExternalForce<L> {
    fn apply(&mut self, time: f32, particles: &mut ParticleSet) {
        // Dead or unbound targets contribute nothing
        if let Some(p) = self.target.and_then(|id| particles.get_mut(id)) {
            self.law.eval(time, p);
        }
    }

    fn apply_all(&mut self, time: f32, particles: &mut ParticleSet) {
        for p in particles.iter_mut() {
            self.law.eval(time, p);
        }
    }

    fn is_external(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        self.law.name()
    }
}

/// Constant acceleration: `force += g * mass`
#[derive(Debug, Clone, Copy)]
pub struct Gravity {
    pub g: Vec3,
}

impl Gravity {
    pub fn new(g: Vec3) -> Self {
        Self { g }
    }
}

impl ForceLaw for Gravity {
    fn eval(&mut self, _time: f32, p: &mut Particle) {
        p.force += self.g * p.mass;
    }

    fn name(&self) -> &str {
        "gravity"
    }
}

/// Linear drag: `force += -damping * velocity`
#[derive(Debug, Clone, Copy)]
pub struct ViscousDrag {
    pub damping: f32,
}

impl ViscousDrag {
    pub fn new(damping: f32) -> Self {
        Self { damping }
    }
}

impl ForceLaw for ViscousDrag {
    fn eval(&mut self, _time: f32, p: &mut Particle) {
        p.force += p.velocity * -self.damping;
    }

    fn name(&self) -> &str {
        "viscous_drag"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Attract,
    Repel,
}

/// Pull toward (or push away from) a fixed point with magnitude `a / (b + distance)`
#[derive(Debug, Clone, Copy)]
pub struct PointAttractor {
    pub center: Vec3,
    pub a: f32,
    pub b: f32,
    pub polarity: Polarity,
}

impl PointAttractor {
    pub fn attractor(center: Vec3, a: f32, b: f32) -> Self {
        Self {
            center,
            a,
            b,
            polarity: Polarity::Attract,
        }
    }

    pub fn repeller(center: Vec3, a: f32, b: f32) -> Self {
        Self {
            center,
            a,
            b,
            polarity: Polarity::Repel,
        }
    }
}

impl ForceLaw for PointAttractor {
    fn eval(&mut self, _time: f32, p: &mut Particle) {
        let to_center = self.center - p.position;
        let distance = to_center.length();
        let mut direction = to_center.normalize();
        if self.polarity == Polarity::Repel {
            direction = -direction;
        }
        p.force += direction * (self.a / (self.b + distance));
    }

    fn name(&self) -> &str {
        match self.polarity {
            Polarity::Attract => "attractor",
            Polarity::Repel => "repeller",
        }
    }
}

/// Whirl around a point: magnitude `a / (b + distance)` along the swizzled
/// radial direction `(-d.z, d.y, d.x)`.
#[derive(Debug, Clone, Copy)]
pub struct Screw {
    pub origin: Vec3,
    pub a: f32,
    pub b: f32,
}

impl Screw {
    pub fn new(origin: Vec3, a: f32, b: f32) -> Self {
        Self { origin, a, b }
    }
}

impl ForceLaw for Screw {
    fn eval(&mut self, _time: f32, p: &mut Particle) {
        let offset = p.position - self.origin;
        let distance = offset.length();
        let d = offset.normalize();
        let swirl = Vec3::new(-d.z, d.y, d.x).normalize();
        p.force += swirl * (self.a / (self.b + distance));
    }

    fn name(&self) -> &str {
        "screw"
    }
}

/// Isotropic random kick of length uniform in `[0, max_length)`
#[derive(Debug, Clone)]
pub struct RandomForce {
    pub max_length: f32,
    rng: ParticleRng,
}

impl RandomForce {
    pub fn new(max_length: f32, rng: ParticleRng) -> Self {
        Self { max_length, rng }
    }
}

impl ForceLaw for RandomForce {
    fn eval(&mut self, _time: f32, p: &mut Particle) {
        let direction = self.rng.unit_sphere();
        let length = self.rng.range(0.0, self.max_length);
        p.force += direction * length;
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Random kick with normally distributed length `|N(0, sigma)|`, capped at
/// `max_length`, along a direction built from three normal samples.
#[derive(Debug, Clone)]
pub struct GaussianForce {
    pub sigma: f32,
    pub max_length: f32,
    rng: ParticleRng,
}

impl GaussianForce {
    pub fn new(sigma: f32, max_length: f32, rng: ParticleRng) -> Self {
        Self {
            sigma,
            max_length,
            rng,
        }
    }
}

impl ForceLaw for GaussianForce {
    fn eval(&mut self, _time: f32, p: &mut Particle) {
        let raw = Vec3::new(self.rng.gaussian(), self.rng.gaussian(), self.rng.gaussian());
        let direction = raw.normalize_or_zero();
        let length = (self.rng.gaussian() * self.sigma).abs().min(self.max_length);
        p.force += direction * length;
    }

    fn name(&self) -> &str {
        "gaussian"
    }
}

/// Repulsion from the plane `dot(x, normal) = d`.
///
/// Magnitude `a / (b + signed distance)`, always along `(0, 0.5, 0.5)`.
#[derive(Debug, Clone, Copy)]
pub struct FloorRepeller {
    pub normal: Vec3,
    pub d: f32,
    pub a: f32,
    pub b: f32,
}

impl FloorRepeller {
    pub fn new(normal: Vec3, d: f32, a: f32, b: f32) -> Self {
        Self { normal, d, a, b }
    }
}

impl ForceLaw for FloorRepeller {
    fn eval(&mut self, _time: f32, p: &mut Particle) {
        let distance = p.position.dot(self.normal) - self.d;
        let magnitude = self.a / (self.b + distance);
        p.force += Vec3::new(0.0, 0.5, 0.5) * magnitude;
    }

    fn name(&self) -> &str {
        "floor_repeller"
    }
}

/// Hooke spring between two particles; only `first` is pushed.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    pub first: ParticleId,
    pub second: ParticleId,
    pub rest_length: f32,
    pub stiffness: f32,
}

impl Spring {
    pub fn new(first: ParticleId, second: ParticleId, rest_length: f32, stiffness: f32) -> Self {
        Self {
            first,
            second,
            rest_length,
            stiffness,
        }
    }
}

impl Force for Spring {
    fn apply(&mut self, _time: f32, particles: &mut ParticleSet) {
        let Some(p2) = particles.get(self.second).map(|p| p.position) else {
            return;
        };
        let Some(p1) = particles.get_mut(self.first) else {
            return;
        };
        let delta = p1.position - p2;
        let length = delta.length();
        p1.force += delta.normalize() * (-self.stiffness * (length - self.rest_length));
    }

    fn name(&self) -> &str {
        "spring"
    }
}

/// Spring plus a damping term along the separation; only `first` is pushed.
#[derive(Debug, Clone, Copy)]
pub struct DampedSpring {
    pub spring: Spring,
    pub damping: f32,
}

impl DampedSpring {
    pub fn new(spring: Spring, damping: f32) -> Self {
        Self { spring, damping }
    }
}

impl Force for DampedSpring {
    fn apply(&mut self, _time: f32, particles: &mut ParticleSet) {
        let s = self.spring;
        let Some((x2, v2)) = particles.get(s.second).map(|p| (p.position, p.velocity)) else {
            return;
        };
        let Some(p1) = particles.get_mut(s.first) else {
            return;
        };
        let delta = p1.position - x2;
        let length = delta.length();
        let factor_spring = -s.stiffness * (length - s.rest_length);
        let factor_damping = -self.damping * (p1.velocity - v2).dot(delta) / length;
        p1.force += delta.normalize() * (factor_spring + factor_damping);
    }

    fn name(&self) -> &str {
        "damped_spring"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(position: Vec3) -> Particle {
        Particle::new(position, Vec3::ZERO, 1.0)
    }

    fn eval_law<L: ForceLaw>(mut law: L, mut p: Particle) -> Vec3 {
        law.eval(0.0, &mut p);
        p.force
    }

    #[test]
    fn gravity_scales_with_mass() {
        let p = Particle::new(Vec3::ZERO, Vec3::ZERO, 2.0);
        let f = eval_law(Gravity::new(Vec3::new(0.0, -9.8, 0.0)), p);
        assert_eq!(f, Vec3::new(0.0, -19.6, 0.0));
    }

    #[test]
    fn forces_accumulate_instead_of_overwrite() {
        let mut p = at(Vec3::ZERO);
        p.force = Vec3::X;
        let mut g = Gravity::new(Vec3::NEG_Y);
        g.eval(0.0, &mut p);
        assert_eq!(p.force, Vec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn drag_opposes_velocity() {
        let p = Particle::new(Vec3::ZERO, Vec3::new(2.0, 0.0, -4.0), 1.0);
        let f = eval_law(ViscousDrag::new(0.5), p);
        assert_eq!(f, Vec3::new(-1.0, 0.0, 2.0));
    }

    #[test]
    fn attractor_and_repeller_are_opposite() {
        let p = at(Vec3::new(3.0, 0.0, 0.0));
        let pull = eval_law(PointAttractor::attractor(Vec3::ZERO, 4.0, 1.0), p.clone());
        let push = eval_law(PointAttractor::repeller(Vec3::ZERO, 4.0, 1.0), p);
        // a / (b + d) = 4 / (1 + 3)
        assert_eq!(pull, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(push, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn screw_uses_swizzled_direction() {
        let p = at(Vec3::new(0.0, 0.0, 2.0));
        let f = eval_law(Screw::new(Vec3::ZERO, 3.0, 1.0), p);
        // d = (0,0,1) -> (-1, 0, 0), magnitude 3 / (1 + 2)
        assert!((f - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn floor_repeller_pushes_along_fixed_direction() {
        let p = at(Vec3::new(5.0, 1.0, 0.0));
        let f = eval_law(FloorRepeller::new(Vec3::Y, 0.0, 2.0, 1.0), p);
        // distance 1, magnitude 2 / 2
        assert_eq!(f, Vec3::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn random_force_is_bounded() {
        let mut law = RandomForce::new(2.0, ParticleRng::seeded(11));
        for _ in 0..200 {
            let mut p = at(Vec3::ZERO);
            law.eval(0.0, &mut p);
            assert!(p.force.length() < 2.0 + 1e-4);
        }
    }

    #[test]
    fn gaussian_force_is_capped() {
        let mut law = GaussianForce::new(10.0, 1.5, ParticleRng::seeded(3));
        for _ in 0..200 {
            let mut p = at(Vec3::ZERO);
            law.eval(0.0, &mut p);
            assert!(p.force.length() <= 1.5 + 1e-4);
        }
    }

    #[test]
    fn spring_pushes_only_the_first_particle() {
        let mut set = ParticleSet::new();
        let a = set.push(at(Vec3::new(3.0, 0.0, 0.0)));
        let b = set.push(at(Vec3::ZERO));
        let mut spring = Spring::new(a, b, 1.0, 2.0);
        spring.apply(0.0, &mut set);
        // Stretched by 2, k = 2 -> pulled back by 4
        assert_eq!(set.get(a).unwrap().force, Vec3::new(-4.0, 0.0, 0.0));
        assert_eq!(set.get(b).unwrap().force, Vec3::ZERO);
    }

    #[test]
    fn damped_spring_adds_velocity_term() {
        let mut set = ParticleSet::new();
        let a = set.push(Particle::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1.0));
        let b = set.push(at(Vec3::ZERO));
        let mut spring = DampedSpring::new(Spring::new(a, b, 2.0, 5.0), 0.5);
        spring.apply(0.0, &mut set);
        // At rest length: only damping, -0.5 * dot((1,0,0),(2,0,0)) / 2 = -0.5
        assert!((set.get(a).unwrap().force - Vec3::new(-0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn spring_with_missing_partner_is_a_no_op() {
        let mut set = ParticleSet::new();
        let a = set.push(at(Vec3::X).with_life(0.0, 1.0));
        let b = set.push(at(Vec3::ZERO));
        set.retain_alive(2.0);
        let mut spring = Spring::new(b, a, 0.0, 1.0);
        spring.apply(0.0, &mut set);
        assert_eq!(set.get(b).unwrap().force, Vec3::ZERO);
    }

    #[test]
    fn external_force_binding() {
        let mut set = ParticleSet::new();
        let a = set.push(at(Vec3::ZERO));
        let b = set.push(at(Vec3::ZERO));

        let mut bound = ExternalForce::bound(Gravity::new(Vec3::NEG_Y), b);
        bound.apply(0.0, &mut set);
        assert_eq!(set.get(a).unwrap().force, Vec3::ZERO);
        assert_eq!(set.get(b).unwrap().force, Vec3::NEG_Y);

        let mut all = ExternalForce::new(Gravity::new(Vec3::NEG_Y));
        all.apply(0.0, &mut set);
        assert_eq!(set.get(a).unwrap().force, Vec3::ZERO);
        all.apply_all(0.0, &mut set);
        assert_eq!(set.get(a).unwrap().force, Vec3::NEG_Y);
        assert!(all.is_external());
        assert_eq!(all.name(), "gravity");
    }
}
