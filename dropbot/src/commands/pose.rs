use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread::{self, sleep},
    time::Duration,
};

use anyhow::anyhow;
use robot::{PoseStore, RobotConn};
use sorter::{Arm, Pose, PoseKey};

use super::{connect_robot, log_err};
use crate::config::AppConfig;

pub fn list(config: &AppConfig) -> anyhow::Result<()> {
    let store = PoseStore::load(&config.poses.path)?;
    println!("Poses in {} (revision {})", config.poses.path.display(), store.revision);
    for (key, pose) in store.iter() {
        println!("{:<16} {pose}", key.as_str());
    }

    Ok(())
}

/// Store the arm's current position under `key`.
pub fn set(config: &AppConfig, key: PoseKey) -> anyhow::Result<()> {
    let mut store = PoseStore::load(&config.poses.path)?;
    let mut robot = connect_robot(config, store.clone())?;

    let pose = robot.current_pose()?;
    store.set(key, pose);
    store.save(&config.poses.path)?;
    log::info!("Saved {key} = {pose} (revision {})", store.revision);

    log_err("Closing robot connection", || robot.close());

    Ok(())
}

/// Log the live arm position until stopped, so that poses can be taught by
/// hand-guiding the arm.
pub fn track(config: &AppConfig, stop: Arc<AtomicBool>) -> anyhow::Result<()> {
    let store = PoseStore::load(&config.poses.path)?;
    let robot = connect_robot(config, store)?;
    let period = config.tracker_period();
    let latest = Arc::new(Mutex::new(None));

    let tracker = {
        let latest = latest.clone();
        let stop = stop.clone();
        thread::Builder::new()
            .name("pose-tracker".to_string())
            .spawn(move || run_tracker(robot, latest, &stop, period))?
    };

    while !stop.load(Ordering::Relaxed) && !tracker.is_finished() {
        sleep(period);
        let pose = *latest.lock().unwrap_or_else(PoisonError::into_inner);
        match pose {
            Some(pose) => log::info!("Live position: {pose}"),
            None => log::info!("Waiting for first position"),
        }
    }

    tracker.join().map_err(|_| anyhow!("Pose tracker panicked"))?;

    Ok(())
}

fn run_tracker(mut robot: RobotConn, latest: Arc<Mutex<Option<Pose>>>, stop: &AtomicBool, period: Duration) {
    while !stop.load(Ordering::Relaxed) {
        match robot.current_pose() {
            Ok(pose) => *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(pose),
            Err(e) => {
                log::error!("Error reading arm position {e}");
                break;
            }
        }
        sleep(period);
    }

    log_err("Closing robot connection", || robot.close());
}
