//! Seams between the sort workflow and the hardware.
//!
//! Implementations live in the `robot` and `vision` crates; the simulator and
//! the tests provide their own.

use crate::{
    error::{ActuatorError, CaptureError, SensorError},
    observation::BatteryObservation,
    pose::{Pose, PoseKey},
};

/// Robot arm that moves between named poses and drives a gripper.
pub trait Arm {
    fn move_to(&mut self, key: PoseKey) -> Result<(), ActuatorError>;
    fn open_gripper(&mut self) -> Result<(), ActuatorError>;
    fn close_gripper(&mut self) -> Result<(), ActuatorError>;
    fn current_pose(&mut self) -> Result<Pose, ActuatorError>;
    fn calibrate(&mut self) -> Result<(), ActuatorError>;
}

/// One reading attempt from the scale. Retries are the caller's business.
pub trait WeightSensor {
    fn read_grams(&mut self) -> Result<f64, SensorError>;
}

/// Produces the observation for the battery currently under the camera.
pub trait BatterySource {
    /// `Ok(None)` means nothing plausible is in view.
    fn observe(&mut self) -> Result<Option<BatteryObservation>, CaptureError>;
}

impl<T: Arm + ?Sized> Arm for Box<T> {
    fn move_to(&mut self, key: PoseKey) -> Result<(), ActuatorError> {
        (**self).move_to(key)
    }

    fn open_gripper(&mut self) -> Result<(), ActuatorError> {
        (**self).open_gripper()
    }

    fn close_gripper(&mut self) -> Result<(), ActuatorError> {
        (**self).close_gripper()
    }

    fn current_pose(&mut self) -> Result<Pose, ActuatorError> {
        (**self).current_pose()
    }

    fn calibrate(&mut self) -> Result<(), ActuatorError> {
        (**self).calibrate()
    }
}

impl<T: WeightSensor + ?Sized> WeightSensor for Box<T> {
    fn read_grams(&mut self) -> Result<f64, SensorError> {
        (**self).read_grams()
    }
}

impl<T: BatterySource + ?Sized> BatterySource for Box<T> {
    fn observe(&mut self) -> Result<Option<BatteryObservation>, CaptureError> {
        (**self).observe()
    }
}
