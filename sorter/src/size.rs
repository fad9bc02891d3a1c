use std::fmt;

use serde::{Deserialize, Serialize};

/// Pixel-length bands calibrated for the fixed camera height above the
/// pick area. They have to be measured again if the camera moves.
const AAA_LENGTH: std::ops::Range<i32> = 110..130;
const AA_LENGTH: std::ops::Range<i32> = 130..150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeLabel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "unknown")]
    Unknown,
}

impl SizeLabel {
    pub fn from_length(length: i32) -> Self {
        if AAA_LENGTH.contains(&length) {
            SizeLabel::Aaa
        } else if AA_LENGTH.contains(&length) {
            SizeLabel::Aa
        } else {
            SizeLabel::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeLabel::Aaa => "AAA",
            SizeLabel::Aa => "AA",
            SizeLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size class and length of a battery crop. The length is the longer side,
/// so the estimate does not depend on how the battery is rotated.
pub fn estimate_size(width: i32, height: i32) -> (SizeLabel, i32) {
    let length = width.max(height);
    (SizeLabel::from_length(length), length)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(109, SizeLabel::Unknown)]
    #[case(110, SizeLabel::Aaa)]
    #[case(129, SizeLabel::Aaa)]
    #[case(130, SizeLabel::Aa)]
    #[case(149, SizeLabel::Aa)]
    #[case(150, SizeLabel::Unknown)]
    #[case(0, SizeLabel::Unknown)]
    fn length_bands(#[case] length: i32, #[case] expected: SizeLabel) {
        assert_eq!(SizeLabel::from_length(length), expected);
    }

    #[test]
    fn length_is_the_longer_side() {
        assert_eq!(estimate_size(40, 135), (SizeLabel::Aa, 135));
        assert_eq!(estimate_size(115, 30), (SizeLabel::Aaa, 115));
    }
}
