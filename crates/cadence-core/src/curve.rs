//! Keyframe curves - binary search + interpolation

use crate::function::TimeFunction;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A keyframe: a value at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: Vec3,
    /// Incoming tangent for cubic spline
    pub in_tangent: Option<Vec3>,
    /// Outgoing tangent for cubic spline
    pub out_tangent: Option<Vec3>,
}

impl Keyframe {
    pub fn new(time: f32, value: Vec3) -> Self {
        Self {
            time,
            value,
            in_tangent: None,
            out_tangent: None,
        }
    }

    pub fn with_tangents(mut self, in_tangent: Vec3, out_tangent: Vec3) -> Self {
        self.in_tangent = Some(in_tangent);
        self.out_tangent = Some(out_tangent);
        self
    }
}

/// How to interpolate between keyframes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Jump to next value (no blending)
    Step,
    /// Linear interpolation
    #[default]
    Linear,
    /// Cubic Hermite spline (uses tangents, zero when absent)
    CubicSpline,
}

/// A vector-valued keyframe curve, clamped to its first/last value outside
/// the keyed range.
#[derive(Debug, Clone)]
pub struct KeyframeCurve {
    interpolation: Interpolation,
    keyframes: Vec<Keyframe>,
}

impl KeyframeCurve {
    /// Keyframes are sorted by time on construction.
    pub fn new(interpolation: Interpolation, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            interpolation,
            keyframes,
        }
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Sample the curve at `time`.
    pub fn sample(&self, time: f32) -> Vec3 {
        let keyframes = &self.keyframes;

        let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else {
            return Vec3::ZERO;
        };

        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let idx = match keyframes.binary_search_by(|kf| kf.time.total_cmp(&time)) {
            Ok(i) => return keyframes[i].value,
            Err(i) => i,
        };

        let prev = &keyframes[idx - 1];
        let next = &keyframes[idx];

        let span = next.time - prev.time;
        if span <= 0.0 {
            return prev.value;
        }
        let t = (time - prev.time) / span;

        match self.interpolation {
            Interpolation::Step => prev.value,
            Interpolation::Linear => prev.value.lerp(next.value, t),
            Interpolation::CubicSpline => cubic_hermite(
                prev.value,
                prev.out_tangent.unwrap_or(Vec3::ZERO),
                next.value,
                next.in_tangent.unwrap_or(Vec3::ZERO),
                span,
                t,
            ),
        }
    }
}

impl TimeFunction for KeyframeCurve {
    type Output = Vec3;

    fn eval(&self, t: f32) -> Vec3 {
        self.sample(t)
    }

    fn t_min(&self) -> f32 {
        self.keyframes.first().map_or(0.0, |k| k.time)
    }

    fn t_max(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }
}

/// A scalar keyframe curve (blend weights, intensities).
///
/// Stored as a [`KeyframeCurve`] with the value in `x`.
#[derive(Debug, Clone)]
pub struct ScalarCurve {
    inner: KeyframeCurve,
}

impl ScalarCurve {
    pub fn new(interpolation: Interpolation, points: &[(f32, f32)]) -> Self {
        let keyframes = points
            .iter()
            .map(|&(t, v)| Keyframe::new(t, Vec3::new(v, 0.0, 0.0)))
            .collect();
        Self {
            inner: KeyframeCurve::new(interpolation, keyframes),
        }
    }
}

impl TimeFunction for ScalarCurve {
    type Output = f32;

    fn eval(&self, t: f32) -> f32 {
        self.inner.sample(t).x
    }

    fn t_min(&self) -> f32 {
        self.inner.t_min()
    }

    fn t_max(&self) -> f32 {
        self.inner.t_max()
    }
}

/// Cubic Hermite interpolation.
///
/// `m0`/`m1` are per-second tangents; they are scaled by the interval length
/// `dt`. `t` is the normalized [0..1] parameter.
pub fn cubic_hermite(p0: Vec3, m0: Vec3, p1: Vec3, m1: Vec3, dt: f32, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    p0 * h00 + m0 * (h10 * dt) + p1 * h01 + m1 * (h11 * dt)
}
