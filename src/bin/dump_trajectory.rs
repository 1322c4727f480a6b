use std::{env, error::Error, io};

use auv_guidance::{
    config::TrajectoryRequest,
    trajectories::{Sample, Trajectory},
    CONTROL_PERIOD,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Samples a move offline at a fixed step and prints one JSON sample per line.
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: dump_trajectory <request.json> [step in seconds]")?;
    let step = match args.next() {
        Some(step) => step.parse::<f64>()?,
        None => CONTROL_PERIOD.as_secs_f64(),
    };
    if !(step > 0.) {
        return Err(format!("step must be strictly positive, got {step}").into());
    }

    let trajectory = TrajectoryRequest::from_path(path)?.build()?;
    let duration = trajectory.get_duration();
    let n_steps = (duration / step).ceil() as usize;
    info!(duration, n_samples = n_steps + 1, "dumping trajectory");

    for i in 0..=n_steps {
        let t = (i as f64 * step).min(duration);
        println!("{}", serde_json::to_string(&Sample::at(&trajectory, t))?);
    }
    Ok(())
}
