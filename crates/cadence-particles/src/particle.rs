//! Point-mass particles and the arena that owns them

use glam::Vec3;
use std::collections::HashMap;

/// Stable handle to a particle inside a [`ParticleSet`].
///
/// Ids survive removal of other particles; forces hold these rather than
/// references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(u64);

impl ParticleId {
    /// Id carried by particles that have not been added to a set yet
    pub const UNASSIGNED: Self = ParticleId(u64::MAX);

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A simulated point mass
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    id: ParticleId,
    pub mass: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Accumulated force, cleared before every derivative evaluation
    pub force: Vec3,
    /// Seconds of life; `f32::INFINITY` never dies
    pub lifespan: f32,
    pub birth_time: f32,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, mass: f32) -> Self {
        debug_assert!(mass > 0.0, "particle mass must be positive, got {mass}");
        Self {
            id: ParticleId::UNASSIGNED,
            mass,
            position,
            velocity,
            force: Vec3::ZERO,
            lifespan: f32::INFINITY,
            birth_time: 0.0,
        }
    }

    pub fn with_life(mut self, birth_time: f32, lifespan: f32) -> Self {
        self.birth_time = birth_time;
        self.lifespan = lifespan;
        self
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// Dead once a finite lifespan has fully elapsed.
    pub fn is_dead(&self, time: f32) -> bool {
        self.lifespan.is_finite() && time - self.birth_time >= self.lifespan
    }

    /// Age in seconds at `time`
    pub fn age(&self, time: f32) -> f32 {
        time - self.birth_time
    }
}

/// Insertion-ordered particle storage with id lookup.
#[derive(Debug, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
    slots: HashMap<ParticleId, usize>,
    next_id: u64,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Append a particle, assigning it a fresh id.
    pub fn push(&mut self, mut particle: Particle) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        particle.id = id;
        self.slots.insert(id, self.particles.len());
        self.particles.push(particle);
        id
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.slots.get(&id).map(|&i| &self.particles[i])
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.slots.get(&id).map(|&i| &mut self.particles[i])
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    /// Drop every particle dead at `time`, keeping survivors in order.
    /// Returns how many were removed.
    pub fn retain_alive(&mut self, time: f32) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| !p.is_dead(time));
        let removed = before - self.particles.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.slots.clear();
    }

    fn reindex(&mut self) {
        self.slots.clear();
        for (i, p) in self.particles.iter().enumerate() {
            self.slots.insert(p.id, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn death_is_inclusive_at_lifespan() {
        let p = Particle::new(Vec3::ZERO, Vec3::ZERO, 1.0).with_life(0.0, 5.0);
        assert!(!p.is_dead(4.999));
        assert!(p.is_dead(5.0));
        assert!(p.is_dead(100.0));
    }

    #[test]
    fn infinite_lifespan_never_dies() {
        let p = Particle::new(Vec3::ZERO, Vec3::ZERO, 1.0);
        assert!(!p.is_dead(f32::MAX));
        assert!(!p.is_dead(1e30));
    }

    #[test]
    fn ids_survive_removal_of_others() {
        let mut set = ParticleSet::new();
        let a = set.push(Particle::new(Vec3::X, Vec3::ZERO, 1.0).with_life(0.0, 1.0));
        let b = set.push(Particle::new(Vec3::Y, Vec3::ZERO, 1.0));
        let c = set.push(Particle::new(Vec3::Z, Vec3::ZERO, 1.0));
        assert_ne!(a, b);

        assert_eq!(set.retain_alive(2.0), 1);
        assert!(!set.contains(a));
        assert_eq!(set.get(b).unwrap().position, Vec3::Y);
        assert_eq!(set.get(c).unwrap().position, Vec3::Z);
        // Survivors keep their relative order
        let order: Vec<ParticleId> = set.iter().map(|p| p.id()).collect();
        assert_eq!(order, [b, c]);
    }

    #[test]
    fn fresh_particles_are_unassigned() {
        let p = Particle::new(Vec3::ZERO, Vec3::ZERO, 2.0);
        assert_eq!(p.id(), ParticleId::UNASSIGNED);
        assert_eq!(p.age(3.0), 3.0);
    }
}
