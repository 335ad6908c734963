//! Cadence Particles - particle simulation driven by animation controllers
//!
//! - `ParticleSystem` - particles plus forces, exposed as an ODE state vector
//! - `Force` / `ForceLaw` - gravity, drag, attractors, springs, noise
//! - `Emitter` - rate-accumulating point, sphere, and curve emitters
//! - `DifferentialSolver` - Euler, Heun, and fourth-order Runge-Kutta
//! - `ParticleController` - prunes, emits, integrates, and publishes positions each frame
//! - `SceneConfig` - TOML scene description

pub mod config;
pub mod controller;
pub mod emitter;
pub mod force;
pub mod particle;
pub mod rand;
pub mod solver;
pub mod system;

pub use self::rand::ParticleRng;
pub use config::{EmitterConfig, EmitterShape, ForceConfig, SceneConfig};
pub use controller::{ParticleController, PositionBuffer};
pub use emitter::{CurveEmitter, EmissionState, Emitter, PointEmitter, SphereEmitter, VelocityShape};
pub use force::{
    DampedSpring, ExternalForce, FloorRepeller, Force, ForceLaw, GaussianForce, Gravity,
    PointAttractor, Polarity, RandomForce, Screw, Spring, ViscousDrag,
};
pub use particle::{Particle, ParticleId, ParticleSet};
pub use solver::{euler_step, DifferentialSolver, Euler, Heun, OdeSystem, RungeKutta4, SolverKind};
pub use system::{ParticleSystem, STATE_STRIDE};
