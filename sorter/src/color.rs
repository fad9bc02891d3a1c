use std::fmt;

use itertools::Itertools;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Brightness percentiles kept when sampling a crop. Pixels outside are
/// specular highlights or shadow.
const VALUE_PERCENTILES: (f64, f64) = (20.0, 80.0);

/// OpenCV 8-bit HSV: hue in [0, 180), saturation and value in [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvTriplet {
    pub hue: i32,
    pub saturation: i32,
    pub value: i32,
}

impl HsvTriplet {
    pub fn new(hue: i32, saturation: i32, value: i32) -> Self {
        Self { hue, saturation, value }
    }
}

impl From<Vector3<f64>> for HsvTriplet {
    /// Fractional channels are truncated toward zero.
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x as i32, v.y as i32, v.z as i32)
    }
}

impl fmt::Display for HsvTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{} S{} V{}", self.hue, self.saturation, self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorLabel {
    Gold,
    RedOrange,
    Green,
    Blue,
    WhiteGray,
    Empty,
    Other,
}

impl ColorLabel {
    pub const ALL: [ColorLabel; 7] = [
        ColorLabel::Gold,
        ColorLabel::RedOrange,
        ColorLabel::Green,
        ColorLabel::Blue,
        ColorLabel::WhiteGray,
        ColorLabel::Empty,
        ColorLabel::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorLabel::Gold => "gold",
            ColorLabel::RedOrange => "red/orange",
            ColorLabel::Green => "green",
            ColorLabel::Blue => "blue",
            ColorLabel::WhiteGray => "white/gray",
            ColorLabel::Empty => "empty",
            ColorLabel::Other => "other",
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a representative color to a label. First matching rule wins.
pub fn classify_color(hsv: HsvTriplet) -> ColorLabel {
    let HsvTriplet { hue: h, saturation: s, value: v } = hsv;

    if v < 40 && s < 40 {
        ColorLabel::Empty
    } else if (38..=50).contains(&h) && v > 120 {
        ColorLabel::Gold
    } else if (h <= 20 || (160..=180).contains(&h)) && s >= 60 {
        ColorLabel::RedOrange
    } else if (45..=90).contains(&h) && s >= 45 && v >= 55 {
        ColorLabel::Green
    } else if (100..=130).contains(&h) && s >= 45 && v >= 55 {
        ColorLabel::Blue
    } else if s < 30 && v > 100 && !(35..=55).contains(&h) {
        ColorLabel::WhiteGray
    } else {
        // Dim or washed-out crops and every remaining hue.
        ColorLabel::Other
    }
}

/// Representative HSV color of a crop's pixels.
///
/// Keeps the pixels whose value lies between the 20th and 80th value
/// percentile and returns their per-channel median. Falls back to the mean of
/// all pixels when that band holds none. Returns `None` for an empty slice.
pub fn robust_representative(pixels: &[Vector3<f64>]) -> Option<Vector3<f64>> {
    if pixels.is_empty() {
        return None;
    }

    let values = pixels.iter().map(|p| p.z).sorted_by(f64::total_cmp).collect_vec();
    let low = percentile(&values, VALUE_PERCENTILES.0);
    let high = percentile(&values, VALUE_PERCENTILES.1);

    let kept = pixels
        .iter()
        .filter(|p| p.z >= low && p.z <= high)
        .collect_vec();

    if kept.is_empty() {
        let sum: Vector3<f64> = pixels.iter().sum();
        return Some(sum / pixels.len() as f64);
    }

    Some(Vector3::new(
        median(kept.iter().map(|p| p.x)),
        median(kept.iter().map(|p| p.y)),
        median(kept.iter().map(|p| p.z)),
    ))
}

/// Linearly interpolated percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn median(values: impl Iterator<Item = f64>) -> f64 {
    let sorted = values.sorted_by(f64::total_cmp).collect_vec();
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
