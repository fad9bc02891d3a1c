use anyhow::Ok;
use opencv::{
    core::{self, Mat, Size, Vector},
    imgproc::{create_clahe, cvt_color_def, COLOR_BGR2Lab, COLOR_Lab2BGR},
    prelude::*,
};

const CLAHE_CLIP_LIMIT: f64 = 2.0;
const CLAHE_TILES: i32 = 8;

/// Equalize brightness locally so that wrapper colors read the same under
/// different ambient light. Only the L channel of Lab is touched.
pub fn normalize_lighting(crop: &Mat) -> anyhow::Result<Mat> {
    let mut lab = Mat::default();
    cvt_color_def(crop, &mut lab, COLOR_BGR2Lab)?;

    let mut channels = Vector::<Mat>::new();
    core::split(&lab, &mut channels)?;

    let mut clahe = create_clahe(CLAHE_CLIP_LIMIT, Size::new(CLAHE_TILES, CLAHE_TILES))?;
    let mut l_eq = Mat::default();
    clahe.apply(&channels.get(0)?, &mut l_eq)?;
    channels.set(0, l_eq)?;

    let mut merged = Mat::default();
    core::merge(&channels, &mut merged)?;

    let mut res = Mat::default();
    cvt_color_def(&merged, &mut res, COLOR_Lab2BGR)?;

    Ok(res)
}
