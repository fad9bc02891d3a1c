use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread::sleep,
    time::Duration,
};

use vision::camera::Camera;

use super::open_vision;
use crate::config::AppConfig;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(config: &AppConfig, frames: Option<usize>, stop: &AtomicBool) -> anyhow::Result<()> {
    let mut camera = Camera::open(config.camera.index)?;
    let mut vision = open_vision(config)?;

    let mut seen = 0;
    while !stop.load(Ordering::Relaxed) && frames.map_or(true, |n| seen < n) {
        seen += 1;
        let frame = match camera.read() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("{e}");
                sleep(FRAME_INTERVAL);
                continue;
            }
        };

        match vision.process_frame(&frame)? {
            Some(obs) => log::info!("Detected: {} | {} | Length: {} ({:.2})", obs.size(), obs.color(), obs.length(), obs.confidence()),
            None => log::info!("No battery detected"),
        }
        sleep(FRAME_INTERVAL);
    }

    Ok(())
}
