//! Wire format of the arm's command server.
//!
//! Every message in either direction is a little-endian `u64` byte length
//! followed by that many bytes of JSON. Requests name a command and carry a
//! parameter list; replies carry a status, a message and the returned values.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sorter::Pose;

/// Replies larger than this are treated as a corrupt stream.
const MAX_FRAME_LEN: u64 = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CalibrateAuto,
    UpdateTool,
    MovePose(Pose),
    OpenGripper,
    CloseGripper,
    GetPose,
    CloseConnection,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CalibrateAuto => "CALIBRATE",
            Command::UpdateTool => "UPDATE_TOOL",
            Command::MovePose(_) => "MOVE_POSE",
            Command::OpenGripper => "OPEN_GRIPPER",
            Command::CloseGripper => "CLOSE_GRIPPER",
            Command::GetPose => "GET_POSE",
            Command::CloseConnection => "CLOSE_CONNECTION",
        }
    }

    fn params(&self) -> Vec<Value> {
        match self {
            Command::CalibrateAuto => vec![json!("AUTO")],
            Command::MovePose(pose) => pose.to_array().iter().map(|v| json!(v)).collect(),
            _ => Vec::new(),
        }
    }

    pub fn to_request(&self) -> Request {
        Request {
            command: self.name().to_string(),
            param_list: self.params(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub command: String,
    pub param_list: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub list_ret_param: Vec<Value>,
}

impl Response {
    pub fn ok(values: Vec<Value>) -> Self {
        Self {
            status: "OK".to_string(),
            message: String::new(),
            list_ret_param: values,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

pub fn write_frame<W: Write>(w: &mut W, payload: &[u8]) -> io::Result<()> {
    w.write_all(&(payload.len() as u64).to_le_bytes())?;
    w.write_all(payload)?;
    w.flush()
}

pub fn read_frame<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let mut size_buf = [0u8; 8];
    r.read_exact(&mut size_buf)?;

    let size = u64::from_le_bytes(size_buf);
    if size > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {size} bytes exceeds limit"),
        ));
    }

    let mut data_buf = vec![0; size as usize];
    r.read_exact(&mut data_buf)?;

    Ok(data_buf)
}
