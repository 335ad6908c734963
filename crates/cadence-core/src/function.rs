//! Time-parameterized functions that drive channels

use crate::ChannelValue;

/// A function of time with a nominal parameter range.
///
/// `eval` must be well defined for any `t` in `[t_min, t_max]`; what happens
/// outside that range is up to the implementation (the curves here clamp).
pub trait TimeFunction {
    type Output: Into<ChannelValue>;

    fn eval(&self, t: f32) -> Self::Output;

    fn t_min(&self) -> f32;

    fn t_max(&self) -> f32;
}

/// A constant value over an unbounded range
#[derive(Debug, Clone, Copy)]
pub struct Constant<T>(pub T);

impl<T> TimeFunction for Constant<T>
where
    T: Copy + Into<ChannelValue>,
{
    type Output = T;

    fn eval(&self, _t: f32) -> T {
        self.0
    }

    fn t_min(&self) -> f32 {
        f32::NEG_INFINITY
    }

    fn t_max(&self) -> f32 {
        f32::INFINITY
    }
}

/// Wraps a closure together with the range it is meant to be sampled on.
pub struct FnCurve<F> {
    f: F,
    t_min: f32,
    t_max: f32,
}

impl<F> FnCurve<F> {
    pub fn new(t_min: f32, t_max: f32, f: F) -> Self {
        Self { f, t_min, t_max }
    }
}

impl<F, T> TimeFunction for FnCurve<F>
where
    F: Fn(f32) -> T,
    T: Into<ChannelValue>,
{
    type Output = T;

    fn eval(&self, t: f32) -> T {
        (self.f)(t)
    }

    fn t_min(&self) -> f32 {
        self.t_min
    }

    fn t_max(&self) -> f32 {
        self.t_max
    }
}
