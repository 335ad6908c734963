//! Particle scene description (parsed from TOML) and controller construction

use crate::controller::ParticleController;
use crate::emitter::{EmissionState, Emitter, PointEmitter, SphereEmitter};
use crate::force::{
    ExternalForce, FloorRepeller, Force, GaussianForce, Gravity, PointAttractor, RandomForce,
    Screw, ViscousDrag,
};
use crate::rand::ParticleRng;
use crate::solver::SolverKind;
use crate::system::ParticleSystem;
use cadence_animation::{RepeatType, TimeMapping};
use cadence_core::{CadenceError, Result};
use glam::Vec3;
use serde::Deserialize;
use std::path::Path;

/// A complete particle scene: timeline, solver, emitters, and forces
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: Option<String>,
    pub controller: ControllerConfig,
    pub solver: SolverConfig,
    pub system: SystemConfig,
    #[serde(rename = "emitter")]
    pub emitters: Vec<EmitterConfig>,
    #[serde(rename = "force")]
    pub forces: Vec<ForceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub repeat: RepeatType,
    pub min_time: f32,
    pub max_time: f32,
    pub global_start: f32,
    pub rate: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            repeat: RepeatType::Clamp,
            min_time: 0.0,
            max_time: f32::INFINITY,
            global_start: 0.0,
            rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub kind: SolverKind,
    pub steps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: SolverKind::Euler,
            steps: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub dynamic: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { dynamic: true }
    }
}

/// Emission shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitterShape {
    #[default]
    Point,
    Sphere,
}

/// One `[[emitter]]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub shape: EmitterShape,
    pub position: [f32; 3],
    /// Sphere radius
    pub radius: f32,
    /// Particles per second
    pub rate: f32,
    pub lifespan: f32,
    pub termination: f32,
    pub mass: f32,
    /// Cone axis; isotropic when absent
    pub direction: Option<[f32; 3]>,
    /// Tangent of the cone half-angle
    pub spread: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Overrides `speed_min`/`speed_max` with a constant speed
    pub speed: Option<f32>,
    pub seed: u64,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            shape: EmitterShape::Point,
            position: [0.0; 3],
            radius: 0.5,
            rate: 10.0,
            lifespan: f32::INFINITY,
            termination: f32::INFINITY,
            mass: 1.0,
            direction: None,
            spread: 0.0,
            speed_min: 1.0,
            speed_max: 1.0,
            speed: None,
            seed: 0,
        }
    }
}

/// One `[[force]]` table, selected by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForceConfig {
    Gravity {
        #[serde(default = "default_gravity")]
        g: [f32; 3],
    },
    Drag {
        damping: f32,
    },
    Attractor {
        center: [f32; 3],
        a: f32,
        #[serde(default = "one")]
        b: f32,
    },
    Repeller {
        center: [f32; 3],
        a: f32,
        #[serde(default = "one")]
        b: f32,
    },
    Screw {
        origin: [f32; 3],
        a: f32,
        #[serde(default = "one")]
        b: f32,
    },
    Random {
        max_length: f32,
        #[serde(default)]
        seed: u64,
    },
    Gaussian {
        #[serde(default = "one")]
        sigma: f32,
        max_length: f32,
        #[serde(default)]
        seed: u64,
    },
    Floor {
        #[serde(default = "up")]
        normal: [f32; 3],
        #[serde(default)]
        d: f32,
        a: f32,
        #[serde(default = "one")]
        b: f32,
    },
}

fn default_gravity() -> [f32; 3] {
    [0.0, -9.81, 0.0]
}

fn one() -> f32 {
    1.0
}

fn up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

impl SceneConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.solver.steps == 0 {
            return Err(invalid("solver.steps must be at least 1"));
        }
        let c = &self.controller;
        if c.max_time < c.min_time {
            return Err(invalid(format!(
                "controller.max_time ({}) is below min_time ({})",
                c.max_time, c.min_time
            )));
        }
        if c.repeat != RepeatType::Clamp && !(c.min_time.is_finite() && c.max_time.is_finite()) {
            return Err(invalid(format!("controller.repeat = \"{}\" needs finite bounds", c.repeat)));
        }
        if c.rate == 0.0 && c.repeat != RepeatType::Clamp {
            return Err(invalid("controller.rate of 0 cannot cycle or oscillate"));
        }
        if !self.system.dynamic && !self.forces.is_empty() {
            return Err(invalid(
                "scene forces act on every particle and need system.dynamic = true",
            ));
        }
        for (i, e) in self.emitters.iter().enumerate() {
            if e.mass <= 0.0 {
                return Err(invalid(format!("emitter {i}: mass must be positive")));
            }
            if e.rate < 0.0 {
                return Err(invalid(format!("emitter {i}: rate must not be negative")));
            }
            if e.speed.is_none() && e.speed_max < e.speed_min {
                return Err(invalid(format!("emitter {i}: speed_max is below speed_min")));
            }
        }
        Ok(())
    }

    pub fn mapping(&self) -> TimeMapping {
        let c = &self.controller;
        TimeMapping::with_start(c.repeat, c.min_time, c.max_time, c.global_start, c.rate)
    }

    /// Build a ready-to-run controller from this scene.
    pub fn build(&self) -> Result<ParticleController> {
        self.validate()?;

        let mut system = ParticleSystem::new(self.system.dynamic);
        for force in &self.forces {
            system.add_force(force.build());
        }

        let name = self.name.clone().unwrap_or_else(|| "particles".to_string());
        let solver = self.solver.kind.build(self.solver.steps);
        let mut controller = ParticleController::new(name, self.mapping(), system, solver);
        for emitter in &self.emitters {
            controller.add_emitter(emitter.build());
        }

        log::info!(
            "[particles] built scene '{}' ({} emitters, {} forces, {} solver x{})",
            controller_name(&controller),
            self.emitters.len(),
            self.forces.len(),
            self.solver.kind,
            self.solver.steps
        );
        Ok(controller)
    }
}

fn controller_name(controller: &ParticleController) -> &str {
    use cadence_animation::Controller;
    controller.name()
}

impl EmitterConfig {
    pub fn build(&self) -> Box<dyn Emitter> {
        let mut state = EmissionState::new(self.rate, ParticleRng::seeded(self.seed))
            .with_lifespan(self.lifespan)
            .with_termination(self.termination)
            .with_mass(self.mass)
            .with_speed_range(self.speed_min, self.speed_max);
        if let Some(direction) = self.direction {
            state = state.with_cone(Vec3::from_array(direction), self.spread);
        }
        if let Some(speed) = self.speed {
            state.set_constant_speed(speed);
        }

        let position = Vec3::from_array(self.position);
        match self.shape {
            EmitterShape::Point => Box::new(PointEmitter::new(position, state)),
            EmitterShape::Sphere => Box::new(SphereEmitter::new(position, self.radius, state)),
        }
    }
}

impl ForceConfig {
    /// Unbound external force; acts on every particle of a dynamic system.
    pub fn build(&self) -> Box<dyn Force> {
        match *self {
            ForceConfig::Gravity { g } => {
                Box::new(ExternalForce::new(Gravity::new(Vec3::from_array(g))))
            }
            ForceConfig::Drag { damping } => Box::new(ExternalForce::new(ViscousDrag::new(damping))),
            ForceConfig::Attractor { center, a, b } => Box::new(ExternalForce::new(
                PointAttractor::attractor(Vec3::from_array(center), a, b),
            )),
            ForceConfig::Repeller { center, a, b } => Box::new(ExternalForce::new(
                PointAttractor::repeller(Vec3::from_array(center), a, b),
            )),
            ForceConfig::Screw { origin, a, b } => {
                Box::new(ExternalForce::new(Screw::new(Vec3::from_array(origin), a, b)))
            }
            ForceConfig::Random { max_length, seed } => Box::new(ExternalForce::new(
                RandomForce::new(max_length, ParticleRng::seeded(seed)),
            )),
            ForceConfig::Gaussian {
                sigma,
                max_length,
                seed,
            } => Box::new(ExternalForce::new(GaussianForce::new(
                sigma,
                max_length,
                ParticleRng::seeded(seed),
            ))),
            ForceConfig::Floor { normal, d, a, b } => Box::new(ExternalForce::new(
                FloorRepeller::new(Vec3::from_array(normal), d, a, b),
            )),
        }
    }
}

fn invalid(msg: impl Into<String>) -> CadenceError {
    CadenceError::InvalidConfig(msg.into())
}
