use opencv::{
    core::{Mat, Size},
    imgproc::{cvt_color_def, gaussian_blur_def, COLOR_BGR2HSV},
};
use sorter::{robust_representative, HsvTriplet};

use crate::utils::pixels;

const BLUR_KERNEL: i32 = 11;

/// Representative HSV color of a BGR crop, or `None` for an empty crop.
pub fn representative_hsv(crop: &Mat) -> anyhow::Result<Option<HsvTriplet>> {
    let mut blurred = Mat::default();
    gaussian_blur_def(crop, &mut blurred, Size::new(BLUR_KERNEL, BLUR_KERNEL), 0.0)?;

    let mut hsv = Mat::default();
    cvt_color_def(&blurred, &mut hsv, COLOR_BGR2HSV)?;

    let samples = pixels(&hsv)?;
    Ok(robust_representative(&samples).map(HsvTriplet::from))
}
