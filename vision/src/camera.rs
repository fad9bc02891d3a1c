use anyhow::{bail, Ok};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{VideoCapture, CAP_ANY, CAP_PROP_BUFFERSIZE},
};
use sorter::{BatteryObservation, BatterySource, CaptureError};

use crate::VisionSystem;

pub struct Camera {
    capture: VideoCapture,
}

impl Camera {
    pub fn open(index: i32) -> anyhow::Result<Self> {
        let mut capture = VideoCapture::new(index, CAP_ANY)?;
        if !capture.is_opened()? {
            bail!("Failed to open camera {index}");
        }
        // Keep the driver queue short so a read after a pause sees the present.
        if !capture.set(CAP_PROP_BUFFERSIZE, 1.0)? {
            log::debug!("Camera {index} ignores the buffer size hint");
        }

        Ok(Self { capture })
    }

    pub fn read(&mut self) -> anyhow::Result<Mat> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            bail!("Failed to read frame");
        }

        Ok(frame)
    }
}

/// Live camera feeding the observation pipeline.
pub struct CameraSource {
    camera: Camera,
    vision: VisionSystem,
}

impl CameraSource {
    pub fn new(camera: Camera, vision: VisionSystem) -> Self {
        Self { camera, vision }
    }
}

impl BatterySource for CameraSource {
    fn observe(&mut self) -> Result<Option<BatteryObservation>, CaptureError> {
        let frame = self.camera.read().map_err(|e| CaptureError(format!("{e:#}")))?;
        self.vision
            .process_frame(&frame)
            .map_err(|e| CaptureError(format!("processing failed: {e:#}")))
    }
}
