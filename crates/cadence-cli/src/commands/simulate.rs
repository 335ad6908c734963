//! Headless particle scene runner

use anyhow::{bail, Context, Result};
use cadence_animation::Controller;
use cadence_particles::SceneConfig;
use glam::Vec3;

pub struct SimulateArgs {
    pub scene: String,
    pub frames: u32,
    pub fps: f32,
    pub every: u32,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    if !(args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }
    if args.every == 0 {
        bail!("--every must be at least 1");
    }

    let config = SceneConfig::load(&args.scene)
        .with_context(|| format!("failed to load scene '{}'", args.scene))?;
    let mut controller = config.build()?;
    let positions = controller.positions();

    println!(
        "Simulating '{}': {} frames at {} fps",
        controller.name(),
        args.frames,
        args.fps
    );
    println!("{:>6}  {:>8}  {:>8}  {:>24}", "frame", "time", "count", "centroid");

    for frame in 0..=args.frames {
        let time = frame as f32 / args.fps;
        controller.update(time)?;

        if frame % args.every == 0 || frame == args.frames {
            let buffer = positions.borrow();
            let line = match centroid(&buffer) {
                Some(c) => format!("({:.3}, {:.3}, {:.3})", c.x, c.y, c.z),
                None => "-".to_string(),
            };
            println!("{:>6}  {:>8.3}  {:>8}  {:>24}", frame, time, buffer.len(), line);
        }
    }
    Ok(())
}

fn centroid(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    let sum: Vec3 = points.iter().copied().sum();
    Some(sum / points.len() as f32)
}
