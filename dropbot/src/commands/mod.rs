use std::fmt;

use robot::{PoseStore, RobotConn};
use sorter::Arm;
use vision::{
    detector::yolo::YoloDetector,
    ObjectLocator, VisionSystem,
};

use crate::config::AppConfig;

pub mod capture;
pub mod inference;
pub mod pose;
pub mod simulate;
pub mod sort;
pub mod weight;

/// Connect to the arm and get it ready to move. Failures here are fatal: the
/// operator has to fix the cell and start again.
fn connect_robot(config: &AppConfig, poses: PoseStore) -> anyhow::Result<RobotConn> {
    log::info!("Connecting to robot at {}:{}", config.robot.address, config.robot.port);
    let mut robot = RobotConn::connect(&config.robot.address, config.robot.port, poses)?;

    if config.robot.calibrate_on_start {
        log::info!("Calibrating robot");
        robot.calibrate()?;
    }
    robot.update_tool()?;
    log::info!("Robot ready");

    Ok(robot)
}

fn open_vision(config: &AppConfig) -> anyhow::Result<VisionSystem> {
    let detector = YoloDetector::load(&config.detector.model, config.detector.input_size)?;
    let locator = ObjectLocator::new(Box::new(detector), config.locator_params());

    Ok(VisionSystem::new(locator, config.camera.crop_ratio))
}

fn log_err<T, E: fmt::Display>(what: &str, f: impl FnOnce() -> Result<T, E>) {
    if let Err(e) = f() {
        log::error!("Error: {what} failed\n{e}");
    }
}
