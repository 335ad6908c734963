//! Fixed-step explicit integrators over a flat state vector

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A first-order system `y' = f(t, y)` with a flat `f32` state.
pub trait OdeSystem {
    fn dimension(&self) -> usize;

    /// Copy the state into `out`; `out.len()` must equal `dimension()`
    fn state(&self, out: &mut [f32]);

    /// Replace the state; `state.len()` must equal `dimension()`
    fn set_state(&mut self, state: &[f32]);

    /// Evaluate `f(time, y)` into `out`; `out.len()` must equal `dimension()`
    fn derivative(&mut self, time: f32, out: &mut [f32]);
}

/// Advances an [`OdeSystem`] from `t_start` to `t_end`.
pub trait DifferentialSolver {
    fn solve(&mut self, system: &mut dyn OdeSystem, t_start: f32, t_end: f32);

    fn steps(&self) -> usize;

    fn name(&self) -> &str;
}

/// One explicit Euler step of size `h` starting at `t`.
pub fn euler_step(system: &mut dyn OdeSystem, t: f32, h: f32) {
    let n = system.dimension();
    let mut state = vec![0.0; n];
    let mut deriv = vec![0.0; n];
    euler_step_with(system, t, h, &mut state, &mut deriv);
}

fn euler_step_with(
    system: &mut dyn OdeSystem,
    t: f32,
    h: f32,
    state: &mut Vec<f32>,
    deriv: &mut Vec<f32>,
) {
    let n = system.dimension();
    state.resize(n, 0.0);
    deriv.resize(n, 0.0);
    system.state(state);
    system.derivative(t, deriv);
    for (y, dy) in state.iter_mut().zip(deriv.iter()) {
        *y += h * dy;
    }
    system.set_state(state);
}

fn step_size(t_start: f32, t_end: f32, steps: usize) -> f32 {
    assert!(steps > 0, "solver needs at least one step");
    (t_end - t_start) / steps as f32
}

/// Forward Euler with a fixed number of equal sub-steps. O(h) per step;
/// stiff systems (springs) need many steps.
#[derive(Debug, Clone)]
pub struct Euler {
    steps: usize,
    state: Vec<f32>,
    deriv: Vec<f32>,
}

impl Euler {
    pub fn new(steps: usize) -> Self {
        assert!(steps > 0, "solver needs at least one step");
        Self {
            steps,
            state: Vec::new(),
            deriv: Vec::new(),
        }
    }
}

impl DifferentialSolver for Euler {
    fn solve(&mut self, system: &mut dyn OdeSystem, t_start: f32, t_end: f32) {
        let h = step_size(t_start, t_end, self.steps);
        log::trace!("euler: {} steps of {h} from {t_start}", self.steps);
        for i in 0..self.steps {
            let t = t_start + h * i as f32;
            euler_step_with(system, t, h, &mut self.state, &mut self.deriv);
        }
    }

    fn steps(&self) -> usize {
        self.steps
    }

    fn name(&self) -> &str {
        "euler"
    }
}

/// Heun's method (explicit trapezoid): an Euler predictor averaged with the
/// slope at the predicted end point.
#[derive(Debug, Clone)]
pub struct Heun {
    steps: usize,
    start: Vec<f32>,
    predicted: Vec<f32>,
    k1: Vec<f32>,
    k2: Vec<f32>,
}

impl Heun {
    pub fn new(steps: usize) -> Self {
        assert!(steps > 0, "solver needs at least one step");
        Self {
            steps,
            start: Vec::new(),
            predicted: Vec::new(),
            k1: Vec::new(),
            k2: Vec::new(),
        }
    }
}

impl DifferentialSolver for Heun {
    fn solve(&mut self, system: &mut dyn OdeSystem, t_start: f32, t_end: f32) {
        let h = step_size(t_start, t_end, self.steps);
        log::trace!("heun: {} steps of {h} from {t_start}", self.steps);
        for i in 0..self.steps {
            let t = t_start + h * i as f32;
            let n = system.dimension();
            for buf in [&mut self.start, &mut self.predicted, &mut self.k1, &mut self.k2] {
                buf.resize(n, 0.0);
            }

            system.state(&mut self.start);
            system.derivative(t, &mut self.k1);
            for ((p, y), k) in self.predicted.iter_mut().zip(&self.start).zip(&self.k1) {
                *p = y + h * k;
            }
            system.set_state(&self.predicted);
            system.derivative(t + h, &mut self.k2);

            for ((y, k1), k2) in self.start.iter_mut().zip(&self.k1).zip(&self.k2) {
                *y += 0.5 * h * (k1 + k2);
            }
            system.set_state(&self.start);
        }
    }

    fn steps(&self) -> usize {
        self.steps
    }

    fn name(&self) -> &str {
        "heun"
    }
}

/// Classic fourth-order Runge–Kutta
#[derive(Debug, Clone)]
pub struct RungeKutta4 {
    steps: usize,
    start: Vec<f32>,
    probe: Vec<f32>,
    k: [Vec<f32>; 4],
}

impl RungeKutta4 {
    pub fn new(steps: usize) -> Self {
        assert!(steps > 0, "solver needs at least one step");
        Self {
            steps,
            start: Vec::new(),
            probe: Vec::new(),
            k: Default::default(),
        }
    }

    /// Set the system to `start + scale * k[stage]` and sample the slope into `k[stage + 1]`
    fn stage(&mut self, system: &mut dyn OdeSystem, stage: usize, t: f32, scale: f32) {
        for ((p, y), k) in self.probe.iter_mut().zip(&self.start).zip(&self.k[stage]) {
            *p = y + scale * k;
        }
        system.set_state(&self.probe);
        system.derivative(t, &mut self.k[stage + 1]);
    }
}

impl DifferentialSolver for RungeKutta4 {
    fn solve(&mut self, system: &mut dyn OdeSystem, t_start: f32, t_end: f32) {
        let h = step_size(t_start, t_end, self.steps);
        log::trace!("rk4: {} steps of {h} from {t_start}", self.steps);
        for i in 0..self.steps {
            let t = t_start + h * i as f32;
            let n = system.dimension();
            self.start.resize(n, 0.0);
            self.probe.resize(n, 0.0);
            for k in &mut self.k {
                k.resize(n, 0.0);
            }

            system.state(&mut self.start);
            system.derivative(t, &mut self.k[0]);
            self.stage(system, 0, t + 0.5 * h, 0.5 * h);
            self.stage(system, 1, t + 0.5 * h, 0.5 * h);
            self.stage(system, 2, t + h, h);

            let [k1, k2, k3, k4] = &self.k;
            for (j, y) in self.start.iter_mut().enumerate() {
                *y += h / 6.0 * (k1[j] + 2.0 * k2[j] + 2.0 * k3[j] + k4[j]);
            }
            system.set_state(&self.start);
        }
    }

    fn steps(&self) -> usize {
        self.steps
    }

    fn name(&self) -> &str {
        "rk4"
    }
}

/// Solver selection for configuration files and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    #[default]
    Euler,
    Heun,
    Rk4,
}

impl SolverKind {
    pub fn build(self, steps: usize) -> Box<dyn DifferentialSolver> {
        match self {
            SolverKind::Euler => Box::new(Euler::new(steps)),
            SolverKind::Heun => Box::new(Heun::new(steps)),
            SolverKind::Rk4 => Box::new(RungeKutta4::new(steps)),
        }
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euler" => Ok(SolverKind::Euler),
            "heun" => Ok(SolverKind::Heun),
            "rk4" => Ok(SolverKind::Rk4),
            _ => Err(format!("unknown solver '{s}'; valid values: euler, heun, rk4")),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolverKind::Euler => "euler",
            SolverKind::Heun => "heun",
            SolverKind::Rk4 => "rk4",
        };
        f.write_str(s)
    }
}
