#![deny(clippy::unwrap_used)]
pub mod config;
pub mod error;
pub mod limits;
pub mod math;
pub mod trajectories;
pub mod waypoint;

use std::{sync::Arc, time::Duration};

use tokio::{
    select,
    sync::oneshot::{self, Sender},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info};
use trajectories::{Sample, Trajectory};

pub use error::{ConfigError, TrajectoryError};
pub use limits::{AxisLimits, Limits};
pub use waypoint::Waypoint;

/// 100Hz, the rate of the vehicle's controller
pub const CONTROL_PERIOD: Duration = Duration::from_millis(10);

async fn sampling_loop<T, F>(trajectory: &T, on_sample: &mut F)
where
    T: Trajectory,
    F: FnMut(Sample),
{
    let duration = trajectory.get_duration();
    let mut interval = tokio::time::interval(CONTROL_PERIOD);
    let start = Instant::now();
    loop {
        // completes right away the first time, so t = 0 is sampled without waiting
        interval.tick().await;

        let t = start.elapsed().as_secs_f64().min(duration);
        on_sample(Sample::at(trajectory, t));
        if t >= duration {
            debug!(duration, "reached the end of the trajectory");
            return;
        }
    }
}

/// Samples `trajectory` every [`CONTROL_PERIOD`] from now on, until its end is
/// sampled or the returned sender is used (or dropped).
pub fn launch_sampling_thread<T, F>(trajectory: Arc<T>, mut on_sample: F) -> (Sender<()>, JoinHandle<()>)
where
    T: Trajectory + Send + Sync + 'static,
    F: FnMut(Sample) + Send + 'static,
{
    let (stop_sender, stop_receiver) = oneshot::channel();
    let handle = tokio::spawn(async move {
        select! {
            _ = sampling_loop(trajectory.as_ref(), &mut on_sample) => {}
            _ = stop_receiver => {
                info!("sampling thread received stop signal")
            }
        };
    });
    (stop_sender, handle)
}
