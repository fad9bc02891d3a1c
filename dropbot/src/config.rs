//! `dropbot.toml`: connection details, detector thresholds and timings.
//!
//! Every section falls back to defaults, so an empty or missing file runs the
//! cell with the values it was commissioned with.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sorter::{LocatorParams, Plausibility, RetryPolicy, WorkflowTiming};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub robot: RobotCfg,
    pub scale: ScaleCfg,
    pub camera: CameraCfg,
    pub detector: DetectorCfg,
    pub workflow: WorkflowCfg,
    pub poses: PosesCfg,
    pub logging: LoggingCfg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotCfg {
    pub address: String,
    pub port: u16,
    pub calibrate_on_start: bool,
}

impl Default for RobotCfg {
    fn default() -> Self {
        Self {
            address: "172.20.10.4".to_string(),
            port: robot::DEFAULT_PORT,
            calibrate_on_start: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleCfg {
    pub host: String,
    pub timeout_ms: u64,
    pub attempts: u32,
    pub backoff_ms: u64,
    /// Wait after dropping the battery onto the scale.
    pub settle_ms: u64,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            host: "172.20.10.2".to_string(),
            timeout_ms: 2000,
            attempts: 3,
            backoff_ms: 500,
            settle_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraCfg {
    pub index: i32,
    pub crop_ratio: f64,
}

impl Default for CameraCfg {
    fn default() -> Self {
        Self {
            index: 0,
            crop_ratio: vision::DEFAULT_CROP_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorCfg {
    pub model: PathBuf,
    pub input_size: i32,
    pub confidence: f32,
    pub nms_confidence: f32,
    pub iou_threshold: f64,
    pub max_extent: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        let locator = LocatorParams::default();
        Self {
            model: PathBuf::from("best.onnx"),
            input_size: vision::detector::yolo::DEFAULT_INPUT_SIZE,
            confidence: locator.detection_confidence,
            nms_confidence: locator.nms_confidence,
            iou_threshold: locator.iou_threshold,
            max_extent: locator.plausibility.max_extent,
            min_aspect: locator.plausibility.min_aspect,
            max_aspect: locator.plausibility.max_aspect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowCfg {
    pub confirm_delay_ms: u64,
    pub release_pause_ms: u64,
    pub tracker_period_ms: u64,
}

impl Default for WorkflowCfg {
    fn default() -> Self {
        Self {
            confirm_delay_ms: 2000,
            release_pause_ms: 500,
            tracker_period_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosesCfg {
    pub path: PathBuf,
}

impl Default for PosesCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("poses.toml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingCfg {
    pub level: String,
    /// Rolling log file; console only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingCfg {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl AppConfig {
    /// Parse and validate `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig =
            toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.robot.address.trim().is_empty() {
            bail!("robot.address must not be empty");
        }
        if self.scale.host.trim().is_empty() {
            bail!("scale.host must not be empty");
        }
        if self.scale.attempts == 0 {
            bail!("scale.attempts must be >= 1");
        }
        if self.scale.timeout_ms == 0 {
            bail!("scale.timeout_ms must be >= 1");
        }
        if !(self.camera.crop_ratio > 0.0 && self.camera.crop_ratio <= 1.0) {
            bail!("camera.crop_ratio must be in (0, 1]");
        }

        let d = &self.detector;
        if d.input_size <= 0 || d.input_size % 32 != 0 {
            bail!("detector.input_size must be a positive multiple of 32");
        }
        for (name, value) in [
            ("detector.confidence", d.confidence as f64),
            ("detector.nms_confidence", d.nms_confidence as f64),
            ("detector.iou_threshold", d.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be in [0, 1]");
            }
        }
        if !(d.max_extent > 0.0 && d.max_extent <= 1.0) {
            bail!("detector.max_extent must be in (0, 1]");
        }
        if d.min_aspect <= 0.0 || d.min_aspect >= d.max_aspect {
            bail!("detector.min_aspect must be positive and below detector.max_aspect");
        }

        if self.workflow.tracker_period_ms == 0 {
            bail!("workflow.tracker_period_ms must be >= 1");
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            bail!("logging.level must be one of {}", LOG_LEVELS.join(", "));
        }

        Ok(())
    }

    pub fn locator_params(&self) -> LocatorParams {
        let d = &self.detector;
        LocatorParams {
            detection_confidence: d.confidence,
            nms_confidence: d.nms_confidence,
            iou_threshold: d.iou_threshold,
            plausibility: Plausibility {
                max_extent: d.max_extent,
                min_aspect: d.min_aspect,
                max_aspect: d.max_aspect,
            },
        }
    }

    pub fn timing(&self) -> WorkflowTiming {
        WorkflowTiming {
            confirm_delay: Duration::from_millis(self.workflow.confirm_delay_ms),
            scale_settle: Duration::from_millis(self.scale.settle_ms),
            release_pause: Duration::from_millis(self.workflow.release_pause_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.scale.attempts,
            backoff: Duration::from_millis(self.scale.backoff_ms),
        }
    }

    pub fn scale_timeout(&self) -> Duration {
        Duration::from_millis(self.scale.timeout_ms)
    }

    pub fn tracker_period(&self) -> Duration {
        Duration::from_millis(self.workflow.tracker_period_ms)
    }
}
