use anyhow::{bail, Ok};
use opencv::{core::Mat, prelude::*};
use sorter::center_crop;

use crate::utils::{frame_size, to_rect};

pub const DEFAULT_CROP_RATIO: f64 = 0.5;

/// Zoom into the middle of the frame, keeping `ratio` of each dimension.
pub fn crop_center(frame: &Mat, ratio: f64) -> anyhow::Result<Mat> {
    if !(ratio > 0.0 && ratio <= 1.0) {
        bail!("Crop ratio must be in (0, 1], got {ratio}");
    }

    let rect = center_crop(frame_size(frame), ratio);
    if rect.width == 0 || rect.height == 0 {
        bail!("Frame {}x{} is too small to crop by {ratio}", frame.cols(), frame.rows());
    }

    let cropped = Mat::roi(frame, to_rect(&rect))?.try_clone()?;

    Ok(cropped)
}
