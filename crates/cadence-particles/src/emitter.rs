//! Particle emitters: rate accumulation plus position/velocity sampling

use crate::particle::Particle;
use crate::rand::ParticleRng;
use cadence_core::TimeFunction;
use glam::Vec3;

/// Produces new particles for the interval `(last_time, now]`.
pub trait Emitter {
    fn emit(&mut self, last_time: f32, now: f32) -> Vec<Particle>;

    /// Drop any fractional particle carried between calls
    fn reset(&mut self) {}

    fn name(&self) -> &str;
}

/// Direction policy for initial velocities
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VelocityShape {
    /// Uniform over the unit sphere
    Isotropic,
    /// Within a cone around `direction`; half-angle is `atan(tan_half_angle)`
    Cone { direction: Vec3, tan_half_angle: f32 },
}

/// Rate, lifetime, and sampling state shared by every emitter shape.
#[derive(Debug, Clone)]
pub struct EmissionState {
    /// Particles per second
    pub rate: f32,
    pub lifespan: f32,
    /// No particles are released at or after this time
    pub termination_time: f32,
    pub mass: f32,
    pub velocity: VelocityShape,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Fractional particles not yet released
    accumulator: f32,
    rng: ParticleRng,
}

impl EmissionState {
    /// Immortal unit-mass particles, isotropic, unit speed, never terminating
    pub fn new(rate: f32, rng: ParticleRng) -> Self {
        Self {
            rate,
            lifespan: f32::INFINITY,
            termination_time: f32::INFINITY,
            mass: 1.0,
            velocity: VelocityShape::Isotropic,
            min_speed: 1.0,
            max_speed: 1.0,
            accumulator: 0.0,
            rng,
        }
    }

    pub fn with_lifespan(mut self, lifespan: f32) -> Self {
        self.lifespan = lifespan;
        self
    }

    pub fn with_termination(mut self, termination_time: f32) -> Self {
        self.termination_time = termination_time;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_cone(mut self, direction: Vec3, tan_half_angle: f32) -> Self {
        self.velocity = VelocityShape::Cone {
            direction,
            tan_half_angle,
        };
        self
    }

    pub fn with_speed_range(mut self, min_speed: f32, max_speed: f32) -> Self {
        self.min_speed = min_speed;
        self.max_speed = max_speed;
        self
    }

    pub fn set_constant_speed(&mut self, speed: f32) {
        self.min_speed = speed;
        self.max_speed = speed;
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    pub fn rng_mut(&mut self) -> &mut ParticleRng {
        &mut self.rng
    }

    /// Book `rate * (now - last_time)` particles and release the whole ones.
    ///
    /// The fractional remainder carries into the next call, so the long-run
    /// count tracks `rate` regardless of frame jitter. A backwards interval
    /// books nothing. Past `termination_time` the booking still happens but
    /// nothing is released.
    pub fn release_count(&mut self, last_time: f32, now: f32) -> usize {
        let delta = (now - last_time).max(0.0);
        self.accumulator += self.rate * delta;
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        if now >= self.termination_time {
            return 0;
        }
        whole as usize
    }

    pub fn sample_velocity(&mut self) -> Vec3 {
        let direction = match self.velocity {
            VelocityShape::Isotropic => self.rng.unit_sphere(),
            VelocityShape::Cone {
                direction,
                tan_half_angle,
            } => self.rng.cone_direction(direction, tan_half_angle),
        };
        direction * self.rng.range(self.min_speed, self.max_speed)
    }

    /// A particle born at `now` at `position`, with a sampled velocity
    pub fn spawn(&mut self, position: Vec3, now: f32) -> Particle {
        let velocity = self.sample_velocity();
        Particle::new(position, velocity, self.mass).with_life(now, self.lifespan)
    }
}

/// Emits every particle from one fixed point
#[derive(Debug, Clone)]
pub struct PointEmitter {
    pub state: EmissionState,
    pub position: Vec3,
}

impl PointEmitter {
    pub fn new(position: Vec3, state: EmissionState) -> Self {
        Self { state, position }
    }
}

impl Emitter for PointEmitter {
    fn emit(&mut self, last_time: f32, now: f32) -> Vec<Particle> {
        let count = self.state.release_count(last_time, now);
        (0..count).map(|_| self.state.spawn(self.position, now)).collect()
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn name(&self) -> &str {
        "point"
    }
}

/// Emits from uniformly random points on a sphere's surface
#[derive(Debug, Clone)]
pub struct SphereEmitter {
    pub state: EmissionState,
    pub center: Vec3,
    pub radius: f32,
}

impl SphereEmitter {
    pub fn new(center: Vec3, radius: f32, state: EmissionState) -> Self {
        Self {
            state,
            center,
            radius,
        }
    }
}

impl Emitter for SphereEmitter {
    fn emit(&mut self, last_time: f32, now: f32) -> Vec<Particle> {
        let count = self.state.release_count(last_time, now);
        (0..count)
            .map(|_| {
                let position = self.center + self.state.rng_mut().unit_sphere() * self.radius;
                self.state.spawn(position, now)
            })
            .collect()
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn name(&self) -> &str {
        "sphere"
    }
}

/// Emits from points picked uniformly over a curve's parameter range
pub struct CurveEmitter<F> {
    pub state: EmissionState,
    curve: F,
}

impl<F: TimeFunction<Output = Vec3>> CurveEmitter<F> {
    pub fn new(curve: F, state: EmissionState) -> Self {
        Self { state, curve }
    }

    pub fn curve(&self) -> &F {
        &self.curve
    }
}

impl<F: TimeFunction<Output = Vec3>> Emitter for CurveEmitter<F> {
    fn emit(&mut self, last_time: f32, now: f32) -> Vec<Particle> {
        let count = self.state.release_count(last_time, now);
        let (t_min, t_max) = (self.curve.t_min(), self.curve.t_max());
        (0..count)
            .map(|_| {
                let t = self.state.rng_mut().range(t_min, t_max);
                let position = self.curve.eval(t);
                self.state.spawn(position, now)
            })
            .collect()
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn name(&self) -> &str {
        "curve"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::FnCurve;

    fn state(rate: f32) -> EmissionState {
        EmissionState::new(rate, ParticleRng::seeded(17))
    }

    #[test]
    fn long_run_rate_converges() {
        let rate = 7.3;
        let dt = 1.0 / 60.0;
        let mut emitter = PointEmitter::new(Vec3::ZERO, state(rate));
        let mut total = 0usize;
        let frames = 600;
        for i in 0..frames {
            let last = i as f32 * dt;
            total += emitter.emit(last, last + dt).len();
        }
        let expected = rate * frames as f32 * dt;
        assert!((total as f32 - expected).abs() <= 1.0, "{total} vs {expected}");
    }

    #[test]
    fn fractional_rate_carries_between_calls() {
        let mut s = state(0.5);
        assert_eq!(s.release_count(0.0, 1.0), 0);
        assert!((s.accumulator() - 0.5).abs() < 1e-6);
        assert_eq!(s.release_count(1.0, 2.0), 1);
        assert!(s.accumulator().abs() < 1e-6);
    }

    #[test]
    fn termination_stops_release_but_keeps_booking() {
        let mut s = state(10.0).with_termination(1.0);
        assert_eq!(s.release_count(0.0, 0.5), 5);
        assert_eq!(s.release_count(0.5, 1.25), 0);
        assert!((s.accumulator() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn backwards_interval_books_nothing() {
        let mut s = state(100.0);
        assert_eq!(s.release_count(2.0, 1.0), 0);
        assert_eq!(s.accumulator(), 0.0);
    }

    #[test]
    fn particles_carry_birth_time_and_lifespan() {
        let mut emitter =
            PointEmitter::new(Vec3::new(1.0, 2.0, 3.0), state(4.0).with_lifespan(2.5).with_mass(3.0));
        let born = emitter.emit(1.0, 1.5);
        assert_eq!(born.len(), 2);
        for p in &born {
            assert_eq!(p.birth_time, 1.5);
            assert_eq!(p.lifespan, 2.5);
            assert_eq!(p.mass, 3.0);
            assert_eq!(p.position, Vec3::new(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn constant_speed_and_cone_direction() {
        let mut s = state(1000.0).with_cone(Vec3::Y, 0.25);
        s.set_constant_speed(3.0);
        let mut emitter = PointEmitter::new(Vec3::ZERO, s);
        let limit = 0.25f32.atan() + 1e-4;
        for p in emitter.emit(0.0, 0.1) {
            assert!((p.velocity.length() - 3.0).abs() < 1e-4);
            assert!(p.velocity.angle_between(Vec3::Y) <= limit);
        }
    }

    #[test]
    fn speed_range_is_respected() {
        let s = state(1000.0).with_speed_range(2.0, 5.0);
        let mut emitter = PointEmitter::new(Vec3::ZERO, s);
        for p in emitter.emit(0.0, 0.5) {
            let speed = p.velocity.length();
            assert!((2.0 - 1e-4..5.0 + 1e-4).contains(&speed), "speed {speed}");
        }
    }

    #[test]
    fn sphere_emitter_places_on_surface() {
        let mut emitter = SphereEmitter::new(Vec3::new(0.0, 10.0, 0.0), 2.0, state(200.0));
        for p in emitter.emit(0.0, 0.25) {
            let r = (p.position - Vec3::new(0.0, 10.0, 0.0)).length();
            assert!((r - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn curve_emitter_samples_the_curve() {
        let line = FnCurve::new(0.0, 1.0, |t: f32| Vec3::new(t, 0.0, 0.0));
        let mut emitter = CurveEmitter::new(line, state(100.0));
        let born = emitter.emit(0.0, 1.0);
        assert_eq!(born.len(), 100);
        for p in &born {
            assert!((0.0..1.0).contains(&p.position.x));
            assert_eq!(p.position.y, 0.0);
        }
    }

    #[test]
    fn reset_drops_the_remainder() {
        let mut emitter = PointEmitter::new(Vec3::ZERO, state(0.9));
        emitter.emit(0.0, 1.0);
        emitter.reset();
        assert_eq!(emitter.state.accumulator(), 0.0);
    }
}
