//! Particle collection exposed as a first-order ODE state vector

use crate::force::Force;
use crate::particle::{Particle, ParticleId, ParticleSet};
use crate::solver::OdeSystem;
use glam::Vec3;

/// Floats per particle in the state vector: position xyz then velocity xyz
pub const STATE_STRIDE: usize = 6;

/// Owns the particles and the forces acting on them.
///
/// The state vector lists particles in collection order as
/// `[pos.x, pos.y, pos.z, vel.x, vel.y, vel.z]`. Adding or removing particles
/// is only valid between solver calls, never inside one.
pub struct ParticleSystem {
    particles: ParticleSet,
    forces: Vec<Box<dyn Force>>,
    dynamic: bool,
}

impl ParticleSystem {
    pub fn new(dynamic: bool) -> Self {
        Self {
            particles: ParticleSet::new(),
            forces: Vec::new(),
            dynamic,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn set_dynamic(&mut self, dynamic: bool) {
        self.dynamic = dynamic;
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSet {
        &mut self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn add_force(&mut self, force: Box<dyn Force>) {
        log::debug!("[particles] added force '{}'", force.name());
        self.forces.push(force);
    }

    pub fn force_count(&self) -> usize {
        self.forces.len()
    }

    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        self.particles.push(particle)
    }

    /// Append particles in order, returning their ids.
    pub fn add_particles(&mut self, particles: Vec<Particle>) -> Vec<ParticleId> {
        particles.into_iter().map(|p| self.particles.push(p)).collect()
    }

    /// Remove every particle dead at `time`. Returns how many were removed.
    pub fn eliminate_dead_particles(&mut self, time: f32) -> usize {
        self.particles.retain_alive(time)
    }

    pub fn clear_particles(&mut self) {
        self.particles.clear();
    }

    /// Zero every particle's force accumulator
    pub fn clear_forces(&mut self) {
        for p in self.particles.iter_mut() {
            p.force = Vec3::ZERO;
        }
    }

    /// Let every registered force accumulate at `time`
    pub fn update_forces(&mut self, time: f32) {
        for force in &mut self.forces {
            if self.dynamic && force.is_external() {
                force.apply_all(time, &mut self.particles);
            } else {
                force.apply(time, &mut self.particles);
            }
        }
    }

    /// Snapshot of current positions in collection order
    pub fn particle_positions(&self) -> Vec<Vec3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Write positions into `out`, resizing it to the particle count
    pub fn write_positions(&self, out: &mut Vec<Vec3>) {
        out.clear();
        out.extend(self.particles.iter().map(|p| p.position));
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OdeSystem for ParticleSystem {
    fn dimension(&self) -> usize {
        STATE_STRIDE * self.particles.len()
    }

    fn state(&self, out: &mut [f32]) {
        assert_eq!(out.len(), self.dimension(), "state buffer length mismatch");
        for (chunk, p) in out.chunks_exact_mut(STATE_STRIDE).zip(self.particles.iter()) {
            chunk[..3].copy_from_slice(&p.position.to_array());
            chunk[3..].copy_from_slice(&p.velocity.to_array());
        }
    }

    fn set_state(&mut self, state: &[f32]) {
        assert_eq!(state.len(), self.dimension(), "state buffer length mismatch");
        for (chunk, p) in state.chunks_exact(STATE_STRIDE).zip(self.particles.iter_mut()) {
            p.position = Vec3::from_slice(&chunk[..3]);
            p.velocity = Vec3::from_slice(&chunk[3..]);
        }
    }

    fn derivative(&mut self, time: f32, out: &mut [f32]) {
        assert_eq!(out.len(), self.dimension(), "derivative buffer length mismatch");
        self.clear_forces();
        self.update_forces(time);
        for (chunk, p) in out.chunks_exact_mut(STATE_STRIDE).zip(self.particles.iter()) {
            chunk[..3].copy_from_slice(&p.velocity.to_array());
            chunk[3..].copy_from_slice(&(p.force / p.mass).to_array());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::{ExternalForce, Gravity, Spring, ViscousDrag};

    fn two_particles(dynamic: bool) -> ParticleSystem {
        let mut system = ParticleSystem::new(dynamic);
        system.add_particles(vec![
            Particle::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0), 1.0),
            Particle::new(Vec3::new(-1.0, 0.5, 0.0), Vec3::new(0.0, -2.0, 0.25), 2.0),
        ]);
        system
    }

    #[test]
    fn dimension_is_six_per_particle() {
        let system = two_particles(true);
        assert_eq!(system.dimension(), 12);
        assert_eq!(ParticleSystem::default().dimension(), 0);
    }

    #[test]
    fn state_layout_and_round_trip() {
        let mut system = two_particles(true);
        let mut state = vec![0.0; system.dimension()];
        system.state(&mut state);
        assert_eq!(&state[..6], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let before: Vec<Particle> = system.particles().iter().cloned().collect();
        system.set_state(&state);
        let after: Vec<Particle> = system.particles().iter().cloned().collect();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.position.to_array().map(f32::to_bits), b.position.to_array().map(f32::to_bits));
            assert_eq!(a.velocity.to_array().map(f32::to_bits), b.velocity.to_array().map(f32::to_bits));
        }
    }

    #[test]
    #[should_panic(expected = "state buffer length mismatch")]
    fn short_state_buffer_panics() {
        let system = two_particles(true);
        let mut state = vec![0.0; 5];
        system.state(&mut state);
    }

    #[test]
    fn derivative_is_velocity_and_acceleration() {
        let mut system = two_particles(true);
        system.add_force(Box::new(ExternalForce::new(Gravity::new(Vec3::new(0.0, -10.0, 0.0)))));
        system.add_force(Box::new(ExternalForce::new(ViscousDrag::new(1.0))));
        let mut deriv = vec![0.0; system.dimension()];
        system.derivative(0.0, &mut deriv);

        assert_eq!(&deriv[..3], &[4.0, 5.0, 6.0]);
        // (m g - v) / m with m = 1
        assert_eq!(&deriv[3..6], &[-4.0, -15.0, -6.0]);
        // m = 2: (2 * -10 + 2) / 2
        assert_eq!(&deriv[9..12], &[0.0, -9.0, -0.125]);
    }

    #[test]
    fn derivative_clears_previous_forces() {
        let mut system = two_particles(true);
        system.add_force(Box::new(ExternalForce::new(Gravity::new(Vec3::NEG_Y))));
        let mut deriv = vec![0.0; system.dimension()];
        system.derivative(0.0, &mut deriv);
        system.derivative(0.0, &mut deriv);
        assert_eq!(deriv[4], -1.0);
    }

    #[test]
    fn non_dynamic_systems_only_touch_bound_particles() {
        let mut system = two_particles(false);
        let ids: Vec<ParticleId> = system.particles().iter().map(|p| p.id()).collect();
        system.add_force(Box::new(ExternalForce::new(Gravity::new(Vec3::NEG_Y))));
        system.add_force(Box::new(ExternalForce::bound(Gravity::new(Vec3::X), ids[1])));
        system.clear_forces();
        system.update_forces(0.0);
        let forces: Vec<Vec3> = system.particles().iter().map(|p| p.force).collect();
        assert_eq!(forces[0], Vec3::ZERO);
        assert_eq!(forces[1], Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn springs_act_in_any_mode() {
        let mut system = two_particles(false);
        let ids: Vec<ParticleId> = system.particles().iter().map(|p| p.id()).collect();
        system.add_force(Box::new(Spring::new(ids[0], ids[1], 0.0, 1.0)));
        system.clear_forces();
        system.update_forces(0.0);
        assert_ne!(system.particles().get(ids[0]).unwrap().force, Vec3::ZERO);
    }

    #[test]
    fn eliminate_and_snapshot() {
        let mut system = ParticleSystem::new(true);
        system.add_particles(vec![
            Particle::new(Vec3::X, Vec3::ZERO, 1.0).with_life(0.0, 1.0),
            Particle::new(Vec3::Y, Vec3::ZERO, 1.0),
            Particle::new(Vec3::Z, Vec3::ZERO, 1.0).with_life(0.5, 1.0),
        ]);
        assert!(system.add_particles(Vec::new()).is_empty());
        assert_eq!(system.eliminate_dead_particles(1.2), 1);
        assert_eq!(system.particle_positions(), vec![Vec3::Y, Vec3::Z]);

        let mut buffer = vec![Vec3::ONE; 8];
        system.write_positions(&mut buffer);
        assert_eq!(buffer, vec![Vec3::Y, Vec3::Z]);
    }
}
