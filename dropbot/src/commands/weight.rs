use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread::sleep,
    time::Duration,
};

use robot::WeightSensorConn;
use sorter::WeightSensor;

use crate::config::AppConfig;

const READ_INTERVAL: Duration = Duration::from_secs(1);

pub fn run(config: &AppConfig, count: Option<usize>, stop: &AtomicBool) -> anyhow::Result<()> {
    let mut scale = WeightSensorConn::new(&config.scale.host, config.scale_timeout());
    log::info!("Reading weight from {}", scale.url());

    let mut reads = 0;
    while !stop.load(Ordering::Relaxed) && count.map_or(true, |n| reads < n) {
        reads += 1;
        match scale.read_grams() {
            Ok(grams) => log::info!("Weight received: {grams:.2} g"),
            Err(e) => log::warn!("Weight read failed: {e}"),
        }
        sleep(READ_INTERVAL);
    }

    Ok(())
}
