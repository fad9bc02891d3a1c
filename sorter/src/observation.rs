use std::fmt;

use crate::{color::ColorLabel, geometry::BoundingBox, size::SizeLabel};

/// What one frame says about the battery in view.
///
/// Built once per successful detection and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryObservation {
    size: SizeLabel,
    length: i32,
    color: ColorLabel,
    confidence: f32,
    bbox: BoundingBox,
}

impl BatteryObservation {
    pub fn new(bbox: BoundingBox, size: SizeLabel, length: i32, color: ColorLabel) -> Self {
        Self {
            size,
            length,
            color,
            confidence: bbox.confidence.clamp(0.0, 1.0),
            bbox,
        }
    }

    pub fn size(&self) -> SizeLabel {
        self.size
    }

    /// Longer side of the detected box in pixels.
    pub fn length(&self) -> i32 {
        self.length
    }

    pub fn color(&self) -> ColorLabel {
        self.color
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }
}

impl fmt::Display for BatteryObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} | Length: {} ({:.2})",
            self.size, self.color, self.length, self.confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        let bbox = BoundingBox::new(0, 0, 40, 140, 1.3, 0);
        let obs = BatteryObservation::new(bbox, SizeLabel::Aa, 140, ColorLabel::Gold);
        assert_eq!(obs.confidence(), 1.0);
        assert_eq!(obs.to_string(), "AA, gold | Length: 140 (1.00)");
    }
}
