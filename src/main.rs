use std::{env, error::Error, io, sync::Arc};

use auv_guidance::{config::TrajectoryRequest, launch_sampling_thread, trajectories::Trajectory};
use tokio::select;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEMO_REQUEST: &str = include_str!("../config/long_move.json");

/// Streams the reference of a move in real time, one JSON sample per line on stdout.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let request = match env::args().nth(1) {
        Some(path) => TrajectoryRequest::from_path(path)?,
        None => {
            info!("no trajectory request given, running the demo move");
            TrajectoryRequest::from_json(DEMO_REQUEST)?
        }
    };
    let trajectory = Arc::new(request.build()?);
    info!(duration = trajectory.get_duration(), "trajectory ready, sampling");

    let (stop_sender, mut handle) = launch_sampling_thread(trajectory, |sample| {
        match serde_json::to_string(&sample) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("couldn't serialize sample at {}s: {e}", sample.time),
        }
    });

    select! {
        res = &mut handle => res?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, stopping the sampling thread");
            let _ = stop_sender.send(());
            handle.await?;
        }
    }
    Ok(())
}
