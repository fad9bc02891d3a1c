use std::{
    net::TcpListener,
    sync::mpsc,
    thread,
};

use robot::{
    protocol::{read_frame, write_frame, Request, Response},
    PoseStore, RobotConn,
};
use serde_json::json;
use sorter::{ActuatorError, Arm, Pose, PoseKey};

/// Command server stub: answers every request with `reply(request)` and
/// reports the command names it saw once the client hangs up.
fn spawn_arm_stub(
    reply: impl Fn(&Request) -> Response + Send + 'static,
) -> (u16, mpsc::Receiver<Vec<Request>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut seen = Vec::new();
        while let Ok(frame) = read_frame(&mut stream) {
            let request: Request = serde_json::from_slice(&frame).unwrap();
            let response = reply(&request);
            seen.push(request);
            write_frame(&mut stream, &serde_json::to_vec(&response).unwrap()).unwrap();
        }
        tx.send(seen).unwrap();
    });

    (port, rx)
}

#[test]
fn move_to_sends_stored_pose() {
    let (port, seen) = spawn_arm_stub(|_| Response::ok(Vec::new()));
    let mut arm = RobotConn::connect("127.0.0.1", port, PoseStore::default()).unwrap();

    arm.calibrate().unwrap();
    arm.move_to(PoseKey::View).unwrap();
    arm.open_gripper().unwrap();
    arm.close().unwrap();

    let requests = seen.recv().unwrap();
    let names: Vec<_> = requests.iter().map(|r| r.command.as_str()).collect();
    assert_eq!(names, ["CALIBRATE", "MOVE_POSE", "OPEN_GRIPPER", "CLOSE_CONNECTION"]);
    assert_eq!(
        requests[1].param_list,
        vec![json!(0.351), json!(0.077), json!(0.219), json!(2.663), json!(1.049), json!(2.522)]
    );
}

#[test]
fn current_pose_is_parsed_from_reply() {
    let (port, _seen) = spawn_arm_stub(|request| match request.command.as_str() {
        "GET_POSE" => Response::ok(vec![json!(0.2), json!(-0.1), json!(0.15), json!(0.0), json!(1.5), json!(-0.3)]),
        _ => Response::ok(Vec::new()),
    });
    let mut arm = RobotConn::connect("127.0.0.1", port, PoseStore::default()).unwrap();

    assert_eq!(arm.current_pose().unwrap(), Pose::new(0.2, -0.1, 0.15, 0.0, 1.5, -0.3));
}

#[test]
fn rejected_command_carries_server_message() {
    let (port, _seen) = spawn_arm_stub(|_| Response {
        status: "KO".into(),
        message: "Robot not calibrated".into(),
        list_ret_param: Vec::new(),
    });
    let mut arm = RobotConn::connect("127.0.0.1", port, PoseStore::default()).unwrap();

    assert_eq!(
        arm.close_gripper(),
        Err(ActuatorError::Rejected {
            command: "CLOSE_GRIPPER".into(),
            message: "Robot not calibrated".into()
        })
    );
}

#[test]
fn connect_to_closed_port_fails() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = RobotConn::connect("127.0.0.1", port, PoseStore::default()).err().unwrap();
    assert!(matches!(err, ActuatorError::Connect { .. }));
}
