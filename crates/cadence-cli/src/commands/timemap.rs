//! Time mapping table command

use anyhow::{bail, Result};
use cadence_animation::{RepeatType, TimeMapping};

pub struct TimemapArgs {
    pub times: Vec<f32>,
    pub repeat: RepeatType,
    pub min: f32,
    pub max: f32,
    pub start: f32,
    pub rate: f32,
    pub from: f32,
    pub to: f32,
    pub step: f32,
}

pub fn run(args: TimemapArgs) -> Result<()> {
    let times: Vec<f32> = if args.times.is_empty() {
        let count = sample_count(args.from, args.to, args.step)?;
        (0..count).map(|i| args.from + i as f32 * args.step).collect()
    } else {
        args.times
    };

    let mapping = TimeMapping::with_start(args.repeat, args.min, args.max, args.start, args.rate);
    log::debug!("[timemap] {:?}", mapping);

    println!(
        "{} over [{}, {}], start {}, rate {}",
        args.repeat, args.min, args.max, args.start, args.rate
    );
    println!("{:>10}  {:>10}", "global", "local");
    for global in times {
        println!("{:>10.4}  {:>10.4}", global, mapping.local_time(global));
    }
    Ok(())
}

/// Upper bound on rows printed for a `--from`/`--to` range
const MAX_SAMPLES: usize = 100_000;

/// Number of samples in `from, from + step, ...` up to and including `to`.
/// Times are computed by index so long ranges do not drift.
fn sample_count(from: f32, to: f32, step: f32) -> Result<usize> {
    if !from.is_finite() || !to.is_finite() {
        bail!("--from and --to must be finite, got {from} and {to}");
    }
    if !(step > 0.0) {
        bail!("--step must be positive, got {step}");
    }
    if to < from {
        bail!("--to ({to}) is before --from ({from})");
    }
    let steps = ((to - from) / step + 1e-4).floor();
    if steps >= MAX_SAMPLES as f32 {
        bail!("range {from}..={to} with step {step} exceeds {MAX_SAMPLES} samples");
    }
    Ok(steps as usize + 1)
}
