//! Controller that samples a time function and writes it into a channel

use crate::controller::{Controller, ControllerBase};
use crate::time_map::{RepeatType, TimeMapping};
use cadence_core::{CadenceError, Channel, Result, TimeFunction};

/// Drives one channel from a [`TimeFunction`] evaluated at local time.
pub struct FunctionController<F> {
    base: ControllerBase,
    function: F,
    name: String,
}

impl<F: TimeFunction> FunctionController<F> {
    pub fn new(name: impl Into<String>, mapping: TimeMapping, function: F, channel: Channel) -> Self {
        Self {
            base: ControllerBase::new(mapping).with_channel(channel),
            function,
            name: name.into(),
        }
    }

    /// Local interval taken from the function's own parameter range.
    pub fn spanning(
        name: impl Into<String>,
        repeat_type: RepeatType,
        function: F,
        channel: Channel,
    ) -> Self {
        let mapping = TimeMapping::new(repeat_type, function.t_min(), function.t_max());
        Self::new(name, mapping, function, channel)
    }

    pub fn function(&self) -> &F {
        &self.function
    }

    pub fn channel(&self) -> Option<&Channel> {
        self.base.channels().first()
    }
}

impl<F: TimeFunction> Controller for FunctionController<F> {
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
        let value = self.function.eval(local);
        let channel = self.base.channels().first().ok_or_else(|| {
            CadenceError::AnimationError(format!("controller '{}' has no channel", self.name))
        })?;
        channel.set_checked(value)?;
        log::trace!("[{}] global {global_time} -> local {local}", self.name);
        Ok(true)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
