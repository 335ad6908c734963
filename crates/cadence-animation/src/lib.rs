//! Animation controllers for Cadence
//!
//! A controller turns the global frame time into its own local animation
//! time and recomputes only when that time changed:
//! - `TimeMapping` - clamp / cycle / oscillate remapping with rate and start offset
//! - `ControllerBase` - enable flag, change detection, bound channels
//! - `FunctionController` - samples a `TimeFunction` into a channel
//! - `AnimationList` - ticks a set of controllers once per frame

pub mod controller;
pub mod function_controller;
pub mod list;
pub mod time_map;

pub use controller::{Controller, ControllerBase};
pub use function_controller::FunctionController;
pub use list::AnimationList;
pub use time_map::{modulo, RepeatType, TimeMapping};
