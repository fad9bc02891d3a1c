use std::{
    io::{Read, Write},
    net::TcpListener,
    thread,
    time::Duration,
};

use robot::WeightSensorConn;
use sorter::{SensorError, WeightSensor};

/// One-shot HTTP server answering a single request with `status` and `body`.
fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 512];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });

    format!("http://{addr}/")
}

#[test]
fn reads_grams_from_body() {
    let url = serve_once("200 OK", "22.41\n");
    let mut scale = WeightSensorConn::new(&url, Duration::from_secs(2));

    assert_eq!(scale.read_grams(), Ok(22.41));
}

#[test]
fn non_200_status_is_no_reading() {
    let url = serve_once("503 Service Unavailable", "busy");
    let mut scale = WeightSensorConn::new(&url, Duration::from_secs(2));

    assert_eq!(scale.read_grams(), Err(SensorError::Status(503)));
}

#[test]
fn unparsable_body_is_malformed() {
    let url = serve_once("200 OK", "tare");
    let mut scale = WeightSensorConn::new(&url, Duration::from_secs(2));

    assert_eq!(scale.read_grams(), Err(SensorError::Malformed("tare".into())));
}

#[test]
fn unreachable_sensor_is_reported() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut scale = WeightSensorConn::new(&format!("http://127.0.0.1:{port}/"), Duration::from_millis(500));

    assert!(matches!(scale.read_grams(), Err(SensorError::Unreachable(_))));
}
