use opencv::core::Mat;
use sorter::{BoundingBox, LocatorParams};

use crate::{detector::Detector, utils::frame_size};

/// Finds the single battery in a cropped frame.
pub struct ObjectLocator {
    detector: Box<dyn Detector>,
    params: LocatorParams,
}

impl ObjectLocator {
    pub fn new(detector: Box<dyn Detector>, params: LocatorParams) -> Self {
        Self { detector, params }
    }

    pub fn params(&self) -> &LocatorParams {
        &self.params
    }

    /// Best plausible box, clamped to the frame. `None` is a normal outcome.
    pub fn locate(&mut self, frame: &Mat) -> anyhow::Result<Option<BoundingBox>> {
        let candidates = self.detector.detect(frame, self.params.detection_confidence)?;
        Ok(self.params.select(candidates, frame_size(frame)))
    }
}
