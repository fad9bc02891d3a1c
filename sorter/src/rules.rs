//! Chemistry classification from size, color and weight.
//!
//! The rule tables are scanned top to bottom and the first row whose color
//! filter and weight band both match decides. A size without a matching row
//! falls back to [`Chemistry::Unknown`], which keeps the function total.

use std::{
    fmt,
    ops::{Bound, RangeBounds},
};

use serde::{Deserialize, Serialize};

use crate::{color::ColorLabel, pose::PoseKey, size::SizeLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chemistry {
    #[serde(rename = "alkaline")]
    Alkaline,
    #[serde(rename = "lithium")]
    Lithium,
    #[serde(rename = "zinc")]
    Zinc,
    #[serde(rename = "NiMH")]
    Nimh,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Chemistry {
    /// Bin the battery is dropped into.
    pub fn drop_pose(&self) -> PoseKey {
        match self {
            Chemistry::Alkaline => PoseKey::AlkalineDrop,
            Chemistry::Lithium => PoseKey::LithiumDrop,
            Chemistry::Zinc => PoseKey::ZincDrop,
            Chemistry::Nimh => PoseKey::NimhDrop,
            Chemistry::Unknown => PoseKey::UnknownDrop,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Chemistry::Alkaline => "alkaline",
            Chemistry::Lithium => "lithium",
            Chemistry::Zinc => "zinc",
            Chemistry::Nimh => "NiMH",
            Chemistry::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Chemistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationDecision {
    pub chemistry: Chemistry,
    pub drop_target: PoseKey,
    /// No rule matched; the battery goes to the unknown bin by default.
    pub fallback: bool,
}

impl ClassificationDecision {
    fn new(chemistry: Chemistry) -> Self {
        Self {
            chemistry,
            drop_target: chemistry.drop_pose(),
            fallback: false,
        }
    }

    fn fallback() -> Self {
        Self {
            fallback: true,
            ..Self::new(Chemistry::Unknown)
        }
    }
}

type Band = (Bound<f64>, Bound<f64>);

const fn closed_open(low: f64, high: f64) -> Band {
    (Bound::Included(low), Bound::Excluded(high))
}

const fn closed(low: f64, high: f64) -> Band {
    (Bound::Included(low), Bound::Included(high))
}

const fn open(low: f64, high: f64) -> Band {
    (Bound::Excluded(low), Bound::Excluded(high))
}

const fn open_closed(low: f64, high: f64) -> Band {
    (Bound::Excluded(low), Bound::Included(high))
}

struct Rule {
    color: Option<ColorLabel>,
    bands: &'static [Band],
    chemistry: Chemistry,
}

impl Rule {
    fn matches(&self, color: ColorLabel, grams: f64) -> bool {
        self.color.map_or(true, |c| c == color) && self.bands.iter().any(|band| band.contains(&grams))
    }
}

const AA_RULES: &[Rule] = &[
    // Green wrappers in the alkaline band are rechargeable look-alikes.
    Rule { color: Some(ColorLabel::Green), bands: &[closed_open(20.0, 24.0)], chemistry: Chemistry::Unknown },
    Rule { color: None, bands: &[closed_open(20.0, 24.0)], chemistry: Chemistry::Alkaline },
    Rule { color: None, bands: &[closed_open(13.0, 15.0), closed_open(17.0, 18.0)], chemistry: Chemistry::Lithium },
    Rule { color: Some(ColorLabel::Blue), bands: &[closed(24.0, 27.0)], chemistry: Chemistry::Unknown },
    Rule { color: None, bands: &[closed(24.0, 27.0)], chemistry: Chemistry::Nimh },
    Rule { color: None, bands: &[closed_open(14.0, 17.0), closed_open(10.0, 13.0)], chemistry: Chemistry::Zinc },
];

const AAA_RULES: &[Rule] = &[
    Rule { color: Some(ColorLabel::Green), bands: &[closed(9.0, 11.0)], chemistry: Chemistry::Unknown },
    Rule { color: None, bands: &[closed(9.0, 11.0)], chemistry: Chemistry::Alkaline },
    Rule { color: None, bands: &[open(5.0, 9.0)], chemistry: Chemistry::Zinc },
    Rule { color: None, bands: &[closed_open(3.0, 5.0)], chemistry: Chemistry::Lithium },
    Rule { color: Some(ColorLabel::Blue), bands: &[open_closed(11.0, 13.0)], chemistry: Chemistry::Unknown },
    Rule { color: None, bands: &[open_closed(11.0, 13.0)], chemistry: Chemistry::Nimh },
];

fn rules_for(size: SizeLabel) -> &'static [Rule] {
    match size {
        SizeLabel::Aa => AA_RULES,
        SizeLabel::Aaa => AAA_RULES,
        SizeLabel::Unknown => &[],
    }
}

/// Decide the chemistry and drop bin of a weighed battery.
pub fn classify(size: SizeLabel, color: ColorLabel, grams: f64) -> ClassificationDecision {
    rules_for(size)
        .iter()
        .find(|rule| rule.matches(color, grams))
        .map(|rule| ClassificationDecision::new(rule.chemistry))
        .unwrap_or_else(ClassificationDecision::fallback)
}
