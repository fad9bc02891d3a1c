use crate::geometry::{non_max_suppression, select_best, BoundingBox, FrameSize};

/// Shape checks that separate a battery silhouette from detector artifacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plausibility {
    /// Largest share of the frame width or height a box may cover.
    pub max_extent: f64,
    /// Smallest accepted height/width ratio (inclusive).
    pub min_aspect: f64,
    /// Height/width ratio from which boxes are rejected (exclusive).
    pub max_aspect: f64,
}

impl Default for Plausibility {
    fn default() -> Self {
        Self {
            max_extent: 0.8,
            min_aspect: 1.2,
            max_aspect: 5.0,
        }
    }
}

impl Plausibility {
    pub fn accepts(&self, candidate: &BoundingBox, frame: FrameSize) -> bool {
        let width = candidate.width() as f64;
        let height = candidate.height() as f64;
        if width > self.max_extent * frame.width as f64 || height > self.max_extent * frame.height as f64 {
            return false;
        }

        let aspect = candidate.aspect_ratio();
        aspect >= self.min_aspect && aspect < self.max_aspect
    }
}

/// Thresholds used to turn raw detector output into at most one battery box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorParams {
    /// Confidence handed to the detector itself.
    pub detection_confidence: f32,
    /// Confidence floor applied again during suppression.
    pub nms_confidence: f32,
    pub iou_threshold: f64,
    pub plausibility: Plausibility,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            detection_confidence: 0.25,
            nms_confidence: 0.4,
            iou_threshold: 0.5,
            plausibility: Plausibility::default(),
        }
    }
}

impl LocatorParams {
    /// Suppress duplicates, keep the most confident box and check its shape.
    ///
    /// The returned box is clamped to `frame` and always has a non-zero area.
    pub fn select(&self, candidates: Vec<BoundingBox>, frame: FrameSize) -> Option<BoundingBox> {
        let count = candidates.len();
        let survivors = non_max_suppression(candidates, self.nms_confidence, self.iou_threshold);
        log::debug!("{} of {count} candidates survived suppression", survivors.len());

        let best = select_best(&survivors)?;
        if !self.plausibility.accepts(&best, frame) {
            log::debug!(
                "Rejected implausible box {}x{} (aspect {:.2})",
                best.width(),
                best.height(),
                best.aspect_ratio()
            );
            return None;
        }

        best.clamped(frame)
    }
}
