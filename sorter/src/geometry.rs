use itertools::Itertools;
use nalgebra::Vector2;

/// Pixel dimensions of a frame or crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: i32,
    pub height: i32,
}

impl FrameSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A rectangular window inside a frame, as used for ROI extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Centered crop window covering `ratio` of each dimension.
///
/// Sizes are truncated and the origin is floor-divided, so the window never
/// leaves the source frame. `ratio` is expected to be in `(0, 1]`.
pub fn center_crop(frame: FrameSize, ratio: f64) -> CropRect {
    let height = (frame.height as f64 * ratio) as i32;
    let width = (frame.width as f64 * ratio) as i32;

    CropRect {
        x: frame.width / 2 - width / 2,
        y: frame.height / 2 - height / 2,
        width,
        height,
    }
}

/// Detector candidate in pixel coordinates of the frame it was found in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector2<i32>,
    pub max: Vector2<i32>,
    pub confidence: f32,
    pub class_id: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, confidence: f32, class_id: i32) -> Self {
        Self {
            min: Vector2::new(x1, y1),
            max: Vector2::new(x2, y2),
            confidence,
            class_id,
        }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> i64 {
        self.width().max(0) as i64 * self.height().max(0) as i64
    }

    /// Height over width, or 0 for a box without width.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width() == 0 {
            0.0
        } else {
            self.height() as f64 / self.width() as f64
        }
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let inter_w = (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)).max(0) as i64;
        let inter_h = (self.max.y.min(other.max.y) - self.min.y.max(other.min.y)).max(0) as i64;
        let intersection = inter_w * inter_h;
        let union = self.area() + other.area() - intersection;

        if union <= 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }

    /// The part of the box that lies inside `frame`, or `None` if nothing does.
    pub fn clamped(&self, frame: FrameSize) -> Option<BoundingBox> {
        let mut clamped = *self;
        clamped.min.x = self.min.x.clamp(0, frame.width);
        clamped.min.y = self.min.y.clamp(0, frame.height);
        clamped.max.x = self.max.x.clamp(0, frame.width);
        clamped.max.y = self.max.y.clamp(0, frame.height);

        (clamped.width() > 0 && clamped.height() > 0).then_some(clamped)
    }

    pub fn crop_rect(&self) -> CropRect {
        CropRect {
            x: self.min.x,
            y: self.min.y,
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Greedy non-max suppression.
///
/// Boxes at or below `min_confidence` are dropped. The rest are visited from
/// the most to the least confident and a box is kept only if its IoU with
/// every box kept so far is at most `iou_threshold`. Suppression ignores the
/// class id. The result is sorted by descending confidence.
pub fn non_max_suppression(
    boxes: Vec<BoundingBox>,
    min_confidence: f32,
    iou_threshold: f64,
) -> Vec<BoundingBox> {
    let candidates = boxes
        .into_iter()
        .filter(|b| b.confidence > min_confidence)
        .sorted_by(|a, b| b.confidence.total_cmp(&a.confidence))
        .collect_vec();

    let mut kept: Vec<BoundingBox> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept.iter().all(|k| k.iou(&candidate) <= iou_threshold) {
            kept.push(candidate);
        }
    }

    kept
}

/// Highest-confidence box; the earliest one wins a tie.
pub fn select_best(boxes: &[BoundingBox]) -> Option<BoundingBox> {
    boxes
        .iter()
        .copied()
        .min_by(|a, b| b.confidence.total_cmp(&a.confidence))
}
