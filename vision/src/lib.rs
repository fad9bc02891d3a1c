mod color;
mod lighting;
mod locator;
mod preprocess;
mod utils;

pub mod camera;
pub mod detector;

use anyhow::Ok;
use opencv::{core::Mat, prelude::*};
use sorter::{classify_color, estimate_size, BatteryObservation};

pub use color::representative_hsv;
pub use lighting::normalize_lighting;
pub use locator::ObjectLocator;
pub use preprocess::{crop_center, DEFAULT_CROP_RATIO};
pub use utils::frame_size;

use utils::to_rect;

pub struct VisionSystem {
    locator: ObjectLocator,
    crop_ratio: f64,
}

impl VisionSystem {
    pub fn new(locator: ObjectLocator, crop_ratio: f64) -> Self {
        Self { locator, crop_ratio }
    }

    pub fn crop(&self, frame: &Mat) -> anyhow::Result<Mat> {
        crop_center(frame, self.crop_ratio)
    }

    /// Observation of the battery in a raw camera frame.
    pub fn process_frame(&mut self, frame: &Mat) -> anyhow::Result<Option<BatteryObservation>> {
        let cropped = self.crop(frame)?;
        self.process_cropped(&cropped)
    }

    /// Same as [`VisionSystem::process_frame`] for a frame that is already
    /// cropped. Box coordinates are relative to `cropped`.
    pub fn process_cropped(&mut self, cropped: &Mat) -> anyhow::Result<Option<BatteryObservation>> {
        let Some(bbox) = self.locator.locate(cropped)? else {
            log::debug!("No battery in view");
            return Ok(None);
        };

        let crop = Mat::roi(cropped, to_rect(&bbox.crop_rect()))?.try_clone()?;
        if crop.empty() {
            return Ok(None);
        }

        let normalized = normalize_lighting(&crop)?;
        let (size, length) = estimate_size(normalized.cols(), normalized.rows());
        let Some(hsv) = representative_hsv(&normalized)? else {
            return Ok(None);
        };
        let color = classify_color(hsv);
        log::debug!("Battery box {}x{}, color sample {hsv}", bbox.width(), bbox.height());

        Ok(Some(BatteryObservation::new(bbox, size, length, color)))
    }
}

#[cfg(test)]
mod tests {
    use opencv::core::{Scalar, CV_8UC3};
    use sorter::{BoundingBox, LocatorParams, SizeLabel};

    use super::*;
    use crate::detector::Detector;

    struct FixedDetector(Vec<BoundingBox>);

    impl Detector for FixedDetector {
        fn detect(&mut self, _frame: &Mat, min_confidence: f32) -> anyhow::Result<Vec<BoundingBox>> {
            Ok(self.0.iter().copied().filter(|b| b.confidence >= min_confidence).collect())
        }
    }

    fn system(boxes: Vec<BoundingBox>) -> VisionSystem {
        let locator = ObjectLocator::new(Box::new(FixedDetector(boxes)), LocatorParams::default());
        VisionSystem::new(locator, DEFAULT_CROP_RATIO)
    }

    fn frame() -> Mat {
        Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::new(40.0, 170.0, 210.0, 0.0)).unwrap()
    }

    #[test]
    fn upright_battery_becomes_observation() {
        let mut vision = system(vec![BoundingBox::new(100, 40, 140, 180, 0.9, 0)]);
        let obs = vision.process_frame(&frame()).unwrap().unwrap();

        assert_eq!(obs.size(), SizeLabel::Aa);
        assert_eq!(obs.length(), 140);
        assert_eq!(obs.bbox().min.x, 100);
    }

    #[test]
    fn square_box_is_no_detection() {
        let mut vision = system(vec![BoundingBox::new(100, 40, 200, 140, 0.9, 0)]);
        assert!(vision.process_frame(&frame()).unwrap().is_none());
    }

    #[test]
    fn empty_detector_is_no_detection() {
        let mut vision = system(Vec::new());
        assert!(vision.process_frame(&frame()).unwrap().is_none());
    }
}
