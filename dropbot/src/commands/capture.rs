use std::{
    fs,
    sync::atomic::{AtomicBool, Ordering},
    thread::sleep,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{bail, Context};
use opencv::imgcodecs;
use sorter::{sample_stem, yolo_label, SamplePaths, Split};
use vision::{camera::Camera, frame_size};

use super::open_vision;
use crate::{cli::CaptureArgs, config::AppConfig};

/// Save up to `args.count` cropped frames with a detected battery, each with
/// a YOLO label derived from the detection box.
pub fn run(config: &AppConfig, args: &CaptureArgs, stop: &AtomicBool) -> anyhow::Result<()> {
    for kind in ["images", "labels"] {
        for split in [Split::Train, Split::Val] {
            let dir = args.out.join(kind).join(split.as_str());
            fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }

    let mut camera = Camera::open(config.camera.index)?;
    let mut vision = open_vision(config)?;
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let interval = Duration::from_millis(args.interval_ms);

    log::info!("Capturing {} samples of class {} ({})", args.count, args.class_id, args.name);
    let mut saved = 0;
    while saved < args.count && !stop.load(Ordering::Relaxed) {
        let frame = match camera.read() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("{e}");
                sleep(interval);
                continue;
            }
        };

        let cropped = vision.crop(&frame)?;
        let Some(obs) = vision.process_cropped(&cropped)? else {
            log::info!("No battery detected, skipping frame");
            sleep(interval);
            continue;
        };

        let split = Split::for_index(saved);
        let paths = SamplePaths::new(&args.out, split, &sample_stem(&args.name, timestamp, saved));
        let image_path = paths.image.to_string_lossy();
        if !imgcodecs::imwrite_def(&image_path, &cropped)? {
            bail!("Failed to write image {image_path}");
        }
        fs::write(&paths.label, yolo_label(obs.bbox(), frame_size(&cropped), args.class_id))
            .with_context(|| format!("Failed to write label {}", paths.label.display()))?;

        saved += 1;
        log::info!("Saved {} ({}) [{saved}/{}]", paths.image.display(), split.as_str(), args.count);
        sleep(interval);
    }

    log::info!("Captured {saved} samples into {}", args.out.display());

    Ok(())
}
