use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cartesian tool pose: position in meters, orientation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { x, y, z, roll, pitch, yaw }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.roll, self.pitch, self.yaw]
    }

    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [x, y, z, roll, pitch, yaw] => Some(Self::new(*x, *y, *z, *roll, *pitch, *yaw)),
            _ => None,
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x: {:.3}, y: {:.3}, z: {:.3}, roll: {:.3}, pitch: {:.3}, yaw: {:.3}",
            self.x, self.y, self.z, self.roll, self.pitch, self.yaw
        )
    }
}

/// Named arm pose. Only the arm connection knows the joint values behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoseKey {
    #[serde(rename = "VIEW_POSITION")]
    View,
    #[serde(rename = "PICK_POSITION")]
    Pick,
    #[serde(rename = "LIFT_POSITION")]
    Lift,
    #[serde(rename = "WEIGHT_DROP")]
    WeightDrop,
    #[serde(rename = "LIFT_POSITION2")]
    Lift2,
    #[serde(rename = "ALKALINE_DROP")]
    AlkalineDrop,
    #[serde(rename = "LITHIUM_DROP")]
    LithiumDrop,
    #[serde(rename = "ZINC_DROP")]
    ZincDrop,
    #[serde(rename = "NiMH_DROP")]
    NimhDrop,
    #[serde(rename = "UNKNOWN_DROP")]
    UnknownDrop,
}

impl PoseKey {
    pub const ALL: [PoseKey; 10] = [
        PoseKey::View,
        PoseKey::Pick,
        PoseKey::Lift,
        PoseKey::WeightDrop,
        PoseKey::Lift2,
        PoseKey::AlkalineDrop,
        PoseKey::LithiumDrop,
        PoseKey::ZincDrop,
        PoseKey::NimhDrop,
        PoseKey::UnknownDrop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PoseKey::View => "VIEW_POSITION",
            PoseKey::Pick => "PICK_POSITION",
            PoseKey::Lift => "LIFT_POSITION",
            PoseKey::WeightDrop => "WEIGHT_DROP",
            PoseKey::Lift2 => "LIFT_POSITION2",
            PoseKey::AlkalineDrop => "ALKALINE_DROP",
            PoseKey::LithiumDrop => "LITHIUM_DROP",
            PoseKey::ZincDrop => "ZINC_DROP",
            PoseKey::NimhDrop => "NiMH_DROP",
            PoseKey::UnknownDrop => "UNKNOWN_DROP",
        }
    }
}

impl fmt::Display for PoseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pose key {0:?}")]
pub struct UnknownPoseKey(pub String);

impl FromStr for PoseKey {
    type Err = UnknownPoseKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PoseKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPoseKey(s.to_string()))
    }
}
