//! Per-frame driver tying time mapping, emission, and integration together

use crate::emitter::Emitter;
use crate::solver::DifferentialSolver;
use crate::system::ParticleSystem;
use cadence_animation::{Controller, ControllerBase, RepeatType, TimeMapping};
use cadence_core::{CadenceError, Result};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

/// Positions written once per frame for the renderer to read
pub type PositionBuffer = Rc<RefCell<Vec<Vec3>>>;

/// Runs a particle simulation on the controller's local timeline.
///
/// Particles live on a simulation clock that only moves forward: each update
/// advances it by the local time that actually elapsed, also across a cycle
/// wrap, an oscillate reflection, or a negative rate. Birth times, deaths,
/// emission, and integration all use that clock, so lifetimes hold in every
/// repeat mode. It starts at the local time of the first update.
///
/// Each update that the base reports as a change performs, strictly in this
/// order: prune particles dead at the new simulation time, emit for the
/// elapsed interval, integrate over the same interval, and snapshot
/// positions into the shared buffer. Particles born this frame are
/// integrated over the whole interval together with the older ones.
pub struct ParticleController {
    base: ControllerBase,
    system: ParticleSystem,
    emitters: Vec<Box<dyn Emitter>>,
    solver: Box<dyn DifferentialSolver>,
    /// Global and local time of the previous recompute
    last: Option<(f32, f32)>,
    sim_time: f32,
    positions: PositionBuffer,
    name: String,
}

impl ParticleController {
    pub fn new(
        name: impl Into<String>,
        mapping: TimeMapping,
        system: ParticleSystem,
        solver: Box<dyn DifferentialSolver>,
    ) -> Self {
        Self {
            base: ControllerBase::new(mapping),
            system,
            emitters: Vec::new(),
            solver,
            last: None,
            sim_time: 0.0,
            positions: Rc::new(RefCell::new(Vec::new())),
            name: name.into(),
        }
    }

    pub fn add_emitter(&mut self, emitter: Box<dyn Emitter>) {
        log::debug!("[{}] added {} emitter", self.name, emitter.name());
        self.emitters.push(emitter);
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut ParticleSystem {
        &mut self.system
    }

    pub fn solver(&self) -> &dyn DifferentialSolver {
        self.solver.as_ref()
    }

    /// Another handle to the buffer the renderer reads
    pub fn positions(&self) -> PositionBuffer {
        Rc::clone(&self.positions)
    }

    pub fn last_local_time(&self) -> Option<f32> {
        self.last.map(|(_, local)| local)
    }

    /// Simulation clock: birth times and deaths are measured on it
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Drop all particles and start the timeline over.
    pub fn reset(&mut self) {
        self.system.clear_particles();
        for emitter in &mut self.emitters {
            emitter.reset();
        }
        self.base.reset();
        self.last = None;
        self.sim_time = 0.0;
        self.positions.borrow_mut().clear();
    }

    /// Local time elapsed between two recomputes, never negative.
    ///
    /// Clamped or unbounded mappings are monotonic between saturation points,
    /// so the local difference is exact. Cycle and oscillate can wrap or
    /// reflect inside one frame; there the elapsed time is `|rate|` times the
    /// global step.
    fn elapsed(&self, last_global: f32, last_local: f32, global: f32, local: f32) -> f32 {
        let mapping = self.base.mapping();
        let bounded = mapping.min_time().is_finite()
            && mapping.max_time().is_finite()
            && mapping.global_start_time().is_finite();
        if mapping.repeat_type() == RepeatType::Clamp || !bounded {
            (local - last_local).abs()
        } else {
            (mapping.rate().abs() * (global - last_global)).max(0.0)
        }
    }
}

impl Controller for ParticleController {
    fn base(&self) -> &ControllerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControllerBase {
        &mut self.base
    }

    fn update(&mut self, global_time: f32) -> Result<bool> {
        if !self.base.update(global_time) {
            return Ok(false);
        }

        let local = self.base.local_time(global_time);
        if !local.is_finite() {
            return Err(CadenceError::SimulationError(format!(
                "[{}] local time at global {global_time} is {local}",
                self.name
            )));
        }

        let start = match self.last {
            Some((last_global, last_local)) => {
                let start = self.sim_time;
                self.sim_time += self.elapsed(last_global, last_local, global_time, local);
                start
            }
            None => {
                self.sim_time = local;
                local
            }
        };
        let now = self.sim_time;

        let died = self.system.eliminate_dead_particles(now);

        let mut born = 0;
        for emitter in &mut self.emitters {
            let particles = emitter.emit(start, now);
            born += particles.len();
            self.system.add_particles(particles);
        }

        if now > start {
            self.solver.solve(&mut self.system, start, now);
        }

        self.system.write_positions(&mut self.positions.borrow_mut());
        self.last = Some((global_time, local));

        if died > 0 || born > 0 {
            log::debug!(
                "[{}] t={now}: {born} born, {died} died, {} alive",
                self.name,
                self.system.particle_count()
            );
        }
        Ok(true)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
