use opencv::core::Mat;
use sorter::BoundingBox;

pub mod yolo;

/// Pretrained object detector.
pub trait Detector {
    /// Candidate boxes in pixel coordinates of `frame` whose confidence is at
    /// least `min_confidence`. No suppression is applied.
    fn detect(&mut self, frame: &Mat, min_confidence: f32) -> anyhow::Result<Vec<BoundingBox>>;
}
