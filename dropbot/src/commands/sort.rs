use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use anyhow::anyhow;
use robot::{PoseStore, WeightSensorConn};
use sorter::{CycleFlag, SortWorkflow, SystemClock};
use vision::camera::{Camera, CameraSource};

use super::{connect_robot, log_err, open_vision};
use crate::config::AppConfig;

pub fn run(config: &AppConfig, stop: Arc<AtomicBool>) -> anyhow::Result<()> {
    let poses = PoseStore::load(&config.poses.path)?;
    let config = config.clone();
    let cycle_flag = CycleFlag::new();

    let worker = thread::Builder::new()
        .name("sort".to_string())
        .spawn(move || -> anyhow::Result<usize> {
            let robot = connect_robot(&config, poses)?;
            let scale = WeightSensorConn::new(&config.scale.host, config.scale_timeout());
            log::info!("Opening camera {}", config.camera.index);
            let source = CameraSource::new(Camera::open(config.camera.index)?, open_vision(&config)?);

            let mut workflow = SortWorkflow::new(robot, scale, source, SystemClock)
                .with_timing(config.timing())
                .with_retry(config.retry_policy())
                .with_cycle_flag(cycle_flag);

            log::info!("Waiting for battery detection");
            let res = workflow.run_until(|_| stop.load(Ordering::Relaxed));

            let (robot, _, _) = workflow.into_parts();
            log_err("Closing robot connection", || robot.close());

            Ok(res?)
        })?;

    let cycles = worker.join().map_err(|_| anyhow!("Sort worker panicked"))??;
    log::info!("Sorting stopped after {cycles} cycles");

    Ok(())
}
