//! Global-to-local time remapping with clamp / cycle / oscillate repeat modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How local time behaves once global time runs past the local interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatType {
    /// Saturate at the interval bounds
    #[default]
    Clamp,
    /// Wrap back to the start of the interval
    Cycle,
    /// Ping-pong between the bounds
    Oscillate,
}

impl FromStr for RepeatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(RepeatType::Clamp),
            "cycle" => Ok(RepeatType::Cycle),
            "oscillate" => Ok(RepeatType::Oscillate),
            _ => Err(format!(
                "unknown repeat type '{s}'; valid values: clamp, cycle, oscillate"
            )),
        }
    }
}

impl fmt::Display for RepeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepeatType::Clamp => "clamp",
            RepeatType::Cycle => "cycle",
            RepeatType::Oscillate => "oscillate",
        };
        f.write_str(s)
    }
}

/// Floored modulo: `((a % b) + b) % b`.
///
/// For `b > 0` the result is in `[0, b)` even when `a` is negative.
pub fn modulo(a: f32, b: f32) -> f32 {
    ((a % b) + b) % b
}

/// Maps a monotonic global time onto a controller's local animation time.
///
/// `global_start_time` maps to `min_time`; `rate` scales (and, when negative,
/// reverses) the passage of local time. A `rate` of zero combined with
/// `Cycle` or `Oscillate` divides by zero and yields NaN/infinite local
/// times; callers must not configure that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapping {
    repeat_type: RepeatType,
    min_time: f32,
    max_time: f32,
    initial_duration: f32,
    global_start_time: f32,
    rate: f32,
}

impl TimeMapping {
    /// Interval `[min_time, max_time]` starting at global time `min_time`, rate 1.
    pub fn new(repeat_type: RepeatType, min_time: f32, max_time: f32) -> Self {
        Self::with_start(repeat_type, min_time, max_time, min_time, 1.0)
    }

    pub fn with_start(
        repeat_type: RepeatType,
        min_time: f32,
        max_time: f32,
        global_start_time: f32,
        rate: f32,
    ) -> Self {
        Self {
            repeat_type,
            min_time,
            max_time,
            initial_duration: max_time - min_time,
            global_start_time,
            rate,
        }
    }

    /// Unbounded interval: local time is `rate * global time`.
    pub fn unbounded() -> Self {
        Self::with_start(
            RepeatType::Clamp,
            f32::NEG_INFINITY,
            f32::INFINITY,
            f32::NEG_INFINITY,
            1.0,
        )
    }

    pub fn repeat_type(&self) -> RepeatType {
        self.repeat_type
    }

    pub fn min_time(&self) -> f32 {
        self.min_time
    }

    pub fn max_time(&self) -> f32 {
        self.max_time
    }

    /// `max_time - min_time`, kept in step with both setters
    pub fn initial_duration(&self) -> f32 {
        self.initial_duration
    }

    pub fn global_start_time(&self) -> f32 {
        self.global_start_time
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_repeat_type(&mut self, repeat_type: RepeatType) {
        self.repeat_type = repeat_type;
    }

    pub fn set_min_time(&mut self, min_time: f32) {
        self.min_time = min_time;
        self.initial_duration = self.max_time - self.min_time;
    }

    pub fn set_max_time(&mut self, max_time: f32) {
        self.max_time = max_time;
        self.initial_duration = self.max_time - self.min_time;
    }

    pub fn set_global_start_time(&mut self, global_start_time: f32) {
        self.global_start_time = global_start_time;
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    /// Local time corresponding to global `time`.
    pub fn local_time(&self, time: f32) -> f32 {
        let min = self.min_time;
        let max = self.max_time;
        let start = self.global_start_time;
        let rate = self.rate;

        // Play once with an open end
        if max == f32::INFINITY && start.is_finite() {
            let mut local = rate * (time - start);
            if min.is_finite() {
                local += min;
            }
            return local;
        }

        if !min.is_finite() || !max.is_finite() || !start.is_finite() {
            return rate * time;
        }

        match self.repeat_type {
            RepeatType::Clamp => {
                let s = rate * (time - start) + min;
                // Not f32::clamp: a reversed interval must not panic
                if s < min {
                    min
                } else if s > max {
                    max
                } else {
                    s
                }
            }
            RepeatType::Cycle => {
                let period = self.initial_duration / rate;
                rate * modulo(time - start, period) + min
            }
            RepeatType::Oscillate => {
                let period = self.initial_duration / rate;
                let mut s = rate * modulo(time - start, period) + min;
                let segment = ((time - start) / period).floor();
                if modulo(segment, 2.0) == 1.0 {
                    s = self.reflect(s);
                }
                if rate < 0.0 {
                    s = self.reflect(s);
                }
                s
            }
        }
    }

    /// Mirror `s` inside the interval: `min` maps to `max` and vice versa
    fn reflect(&self, s: f32) -> f32 {
        self.max_time - (s - self.min_time)
    }
}

impl Default for TimeMapping {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(repeat: RepeatType) -> TimeMapping {
        TimeMapping::with_start(repeat, 20.0, 25.0, 20.0, 1.0)
    }

    #[test]
    fn clamp_saturates() {
        let m = mapping(RepeatType::Clamp);
        assert_eq!(m.local_time(0.0), 20.0);
        assert_eq!(m.local_time(20.0), 20.0);
        assert_eq!(m.local_time(22.0), 22.0);
        assert_eq!(m.local_time(25.0), 25.0);
        assert_eq!(m.local_time(30.0), 25.0);
    }

    #[test]
    fn cycle_wraps() {
        let m = mapping(RepeatType::Cycle);
        assert_eq!(m.local_time(24.0), 24.0);
        assert_eq!(m.local_time(25.0), 20.0);
        assert_eq!(m.local_time(26.0), 21.0);
    }

    #[test]
    fn cycle_before_start_wraps_forward() {
        let m = mapping(RepeatType::Cycle);
        // 19 is one unit before the start: last unit of the previous period
        assert_eq!(m.local_time(19.0), 24.0);
    }

    #[test]
    fn oscillate_ping_pongs() {
        let m = mapping(RepeatType::Oscillate);
        assert_eq!(m.local_time(24.0), 24.0);
        assert_eq!(m.local_time(25.0), 25.0);
        assert_eq!(m.local_time(26.0), 24.0);
        assert_eq!(m.local_time(30.0), 20.0);
    }

    #[test]
    fn oscillate_negative_rate_stays_in_interval() {
        let m = TimeMapping::with_start(RepeatType::Oscillate, 0.0, 4.0, 0.0, -1.0);
        for i in 0..40 {
            let local = m.local_time(i as f32 * 0.37);
            assert!((0.0..=4.0).contains(&local), "local {local} out of range");
        }
    }

    #[test]
    fn double_rate_cycles_twice_as_fast() {
        let m = TimeMapping::with_start(RepeatType::Cycle, 0.0, 10.0, 0.0, 2.0);
        assert_eq!(m.local_time(2.0), 4.0);
        assert_eq!(m.local_time(5.0), 0.0);
        assert_eq!(m.local_time(6.0), 2.0);
    }

    #[test]
    fn open_ended_interval_runs_forever() {
        let m = TimeMapping::with_start(RepeatType::Cycle, 2.0, f32::INFINITY, 10.0, 0.5);
        assert_eq!(m.local_time(10.0), 2.0);
        assert_eq!(m.local_time(110.0), 52.0);

        let no_min =
            TimeMapping::with_start(RepeatType::Clamp, f32::NEG_INFINITY, f32::INFINITY, 10.0, 1.0);
        assert_eq!(no_min.local_time(15.0), 5.0);
    }

    #[test]
    fn non_finite_bounds_fall_back_to_scaled_time() {
        let m = TimeMapping::with_start(RepeatType::Cycle, 0.0, 5.0, f32::NEG_INFINITY, 2.0);
        assert_eq!(m.local_time(3.0), 6.0);
        assert_eq!(TimeMapping::unbounded().local_time(-7.5), -7.5);
        let nan = TimeMapping::with_start(RepeatType::Clamp, f32::NAN, 5.0, 0.0, 1.0);
        assert_eq!(nan.local_time(4.0), 4.0);
    }

    #[test]
    fn zero_rate_cycle_is_not_finite() {
        let m = TimeMapping::with_start(RepeatType::Cycle, 0.0, 5.0, 0.0, 0.0);
        assert!(!m.local_time(1.0).is_finite());
    }

    #[test]
    fn setters_keep_duration_in_step() {
        let mut m = mapping(RepeatType::Cycle);
        assert_eq!(m.initial_duration(), 5.0);
        m.set_max_time(30.0);
        assert_eq!(m.initial_duration(), 10.0);
        m.set_min_time(22.0);
        assert_eq!(m.initial_duration(), 8.0);
    }

    #[test]
    fn mapping_is_deterministic() {
        let m = TimeMapping::with_start(RepeatType::Oscillate, -3.0, 7.5, 1.25, 1.7);
        for i in -50..50 {
            let t = i as f32 * 0.913;
            assert_eq!(m.local_time(t).to_bits(), m.local_time(t).to_bits());
        }
    }

    #[test]
    fn modulo_is_never_negative() {
        for i in -200..200 {
            let a = i as f32 * 0.731;
            for b in [0.5f32, 1.0, 3.3, 25.0] {
                let r = modulo(a, b);
                assert!(r >= 0.0 && r < b, "modulo({a}, {b}) = {r}");
            }
        }
    }

    #[test]
    fn repeat_type_parses() {
        assert_eq!("Cycle".parse::<RepeatType>().unwrap(), RepeatType::Cycle);
        assert_eq!("oscillate".parse::<RepeatType>().unwrap(), RepeatType::Oscillate);
        assert!("bounce".parse::<RepeatType>().is_err());
        assert_eq!(RepeatType::Clamp.to_string(), "clamp");
    }
}
