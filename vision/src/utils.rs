use nalgebra::Vector3;
use opencv::{
    core::{Rect, Vec3b},
    prelude::*,
};
use sorter::{CropRect, FrameSize};

pub fn frame_size(mat: &Mat) -> FrameSize {
    FrameSize::new(mat.cols(), mat.rows())
}

pub fn to_rect(rect: &CropRect) -> Rect {
    Rect::new(rect.x, rect.y, rect.width, rect.height)
}

/// All pixels of a 3-channel 8-bit image as floating point triplets, in
/// channel order.
pub fn pixels(mat: &Mat) -> anyhow::Result<Vec<Vector3<f64>>> {
    let mut res = Vec::with_capacity((mat.rows() * mat.cols()).max(0) as usize);

    for r in 0..mat.rows() {
        for c in 0..mat.cols() {
            let pixel = mat.at_2d::<Vec3b>(r, c)?;
            res.push(Vector3::new(pixel[0] as f64, pixel[1] as f64, pixel[2] as f64));
        }
    }

    Ok(res)
}
