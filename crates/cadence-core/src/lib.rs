//! Cadence Core - Foundational types for the Cadence animation framework
//!
//! This crate provides the types that the controller and simulation crates share:
//! - `Channel` / `ChannelValue` - named, typed value slots written by controllers
//! - `TimeFunction` - anything that can be evaluated at a time
//! - `KeyframeCurve`, `ScalarCurve` - keyframed driving curves
//! - Error types and Result alias

pub mod channel;
pub mod curve;
mod error;
pub mod function;

pub use channel::{Channel, ChannelValue};
pub use curve::{Interpolation, Keyframe, KeyframeCurve, ScalarCurve};
pub use error::{CadenceError, Result};
pub use function::{Constant, FnCurve, TimeFunction};
