use std::{
    io::ErrorKind,
    net::TcpStream,
    time::Duration,
};

use protocol::{read_frame, write_frame, Command, Response};
use serde_json::Value;
use sorter::{ActuatorError, Arm, Pose, PoseKey};

pub mod poses;
pub mod protocol;
pub mod scale;

pub use poses::PoseStore;
pub use scale::WeightSensorConn;

pub const DEFAULT_PORT: u16 = 40001;

/// Calibration and long moves answer only when done.
const REPLY_TIMEOUT: Duration = Duration::from_secs(120);

pub struct RobotConn {
    stream: TcpStream,
    poses: PoseStore,
}

impl RobotConn {
    pub fn connect(address: &str, port: u16, poses: PoseStore) -> Result<RobotConn, ActuatorError> {
        let connect_err = |e: std::io::Error| ActuatorError::Connect {
            address: format!("{address}:{port}"),
            reason: e.to_string(),
        };
        let stream = TcpStream::connect((address, port)).map_err(connect_err)?;
        stream.set_read_timeout(Some(REPLY_TIMEOUT)).map_err(connect_err)?;
        stream.set_nodelay(true).map_err(connect_err)?;

        Ok(RobotConn { stream, poses })
    }

    pub fn poses(&self) -> &PoseStore {
        &self.poses
    }

    fn send(&mut self, command: Command) -> Result<Vec<Value>, ActuatorError> {
        log::debug!("Sending {} to robot", command.name());
        let payload = serde_json::to_vec(&command.to_request()).map_err(|e| ActuatorError::Protocol(e.to_string()))?;
        write_frame(&mut self.stream, &payload)?;

        let reply = match read_frame(&mut self.stream) {
            Ok(reply) => reply,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                return Err(ActuatorError::Io(format!("no reply to {} within {REPLY_TIMEOUT:?}", command.name())));
            }
            Err(e) => return Err(e.into()),
        };
        let response: Response = serde_json::from_slice(&reply).map_err(|e| ActuatorError::Protocol(e.to_string()))?;

        if !response.is_ok() {
            return Err(ActuatorError::Rejected {
                command: command.name().to_string(),
                message: response.message,
            });
        }

        Ok(response.list_ret_param)
    }

    pub fn update_tool(&mut self) -> Result<(), ActuatorError> {
        self.send(Command::UpdateTool).map(|_| ())
    }

    pub fn move_pose(&mut self, pose: Pose) -> Result<(), ActuatorError> {
        self.send(Command::MovePose(pose)).map(|_| ())
    }

    pub fn close(mut self) -> Result<(), ActuatorError> {
        self.send(Command::CloseConnection).map(|_| ())
    }
}

impl Arm for RobotConn {
    fn move_to(&mut self, key: PoseKey) -> Result<(), ActuatorError> {
        let pose = self.poses.get(key).ok_or(ActuatorError::MissingPose(key))?;
        log::debug!("Moving to {key} ({pose})");
        self.move_pose(pose)
    }

    fn open_gripper(&mut self) -> Result<(), ActuatorError> {
        self.send(Command::OpenGripper).map(|_| ())
    }

    fn close_gripper(&mut self) -> Result<(), ActuatorError> {
        self.send(Command::CloseGripper).map(|_| ())
    }

    fn current_pose(&mut self) -> Result<Pose, ActuatorError> {
        let values = self.send(Command::GetPose)?;
        let values: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();

        Pose::from_slice(&values)
            .ok_or_else(|| ActuatorError::Protocol(format!("expected 6 pose values, got {values:?}")))
    }

    fn calibrate(&mut self) -> Result<(), ActuatorError> {
        self.send(Command::CalibrateAuto).map(|_| ())
    }
}
