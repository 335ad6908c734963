//! Controller base state and the per-frame update contract

use crate::time_map::TimeMapping;
use cadence_core::{Channel, Result};

/// State shared by every controller: time mapping, enable flag, the last
/// global time seen, and the channels the controller writes to.
#[derive(Debug, Clone)]
pub struct ControllerBase {
    mapping: TimeMapping,
    enabled: bool,
    global_last_time: f32,
    channels: Vec<Channel>,
}

impl ControllerBase {
    pub fn new(mapping: TimeMapping) -> Self {
        Self {
            mapping,
            enabled: true,
            global_last_time: f32::NEG_INFINITY,
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn mapping(&self) -> &TimeMapping {
        &self.mapping
    }

    pub fn mapping_mut(&mut self) -> &mut TimeMapping {
        &mut self.mapping
    }

    pub fn local_time(&self, global_time: f32) -> f32 {
        self.mapping.local_time(global_time)
    }

    pub fn enable(&mut self) {
        log::debug!("controller enabled");
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        log::debug!("controller disabled");
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn global_last_time(&self) -> f32 {
        self.global_last_time
    }

    /// Forget the last global time so the next `update` always reports a change.
    pub fn reset(&mut self) {
        self.global_last_time = f32::NEG_INFINITY;
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn add_channel(&mut self, channel: Channel) {
        self.channels.push(channel);
    }

    /// Records `global_time` and reports whether the controller should recompute.
    ///
    /// The condition is `enabled && last == -inf || time != last`, grouped the
    /// way `&&` and `||` bind: a disabled controller still reports a change
    /// whenever the time differs from the previous call.
    pub fn update(&mut self, global_time: f32) -> bool {
        let changed = self.enabled && self.global_last_time == f32::NEG_INFINITY
            || global_time != self.global_last_time;
        self.global_last_time = global_time;
        changed
    }
}

/// Anything driven once per frame by global time.
pub trait Controller {
    fn base(&self) -> &ControllerBase;

    fn base_mut(&mut self) -> &mut ControllerBase;

    /// Advance to `global_time`. Returns whether anything was recomputed.
    fn update(&mut self, global_time: f32) -> Result<bool>;

    /// Human-readable name, used in logs
    fn name(&self) -> &str {
        "controller"
    }
}
