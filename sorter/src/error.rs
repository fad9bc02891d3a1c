use std::io;

use thiserror::Error;

use crate::pose::PoseKey;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorError {
    #[error("weight sensor unreachable: {0}")]
    Unreachable(String),
    #[error("weight sensor answered with HTTP {0}")]
    Status(u16),
    #[error("malformed weight reading {0:?}")]
    Malformed(String),
    #[error("no weight reading after {attempts} attempts (last error: {last})")]
    Exhausted { attempts: u32, last: Box<SensorError> },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActuatorError {
    #[error("failed to connect to arm at {address}: {reason}")]
    Connect { address: String, reason: String },
    #[error("arm connection error: {0}")]
    Io(String),
    #[error("arm protocol error: {0}")]
    Protocol(String),
    #[error("arm rejected {command}: {message}")]
    Rejected { command: String, message: String },
    #[error("no pose configured for {0}")]
    MissingPose(PoseKey),
}

impl From<io::Error> for ActuatorError {
    fn from(e: io::Error) -> Self {
        ActuatorError::Io(e.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("frame capture failed: {0}")]
pub struct CaptureError(pub String);

/// Why a sort cycle stopped before dropping the battery.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CycleError {
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(#[from] SensorError),
    #[error("actuator failure: {0}")]
    Actuator(#[from] ActuatorError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("a sort cycle is already running")]
    Busy,
}

impl CycleError {
    /// Whether the workflow can carry on with the next cycle.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CycleError::SensorUnavailable(_) | CycleError::Capture(_))
    }
}
