use std::time::Duration;

use sorter::{SensorError, WeightSensor};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Network scale that answers `GET /` with the current weight in grams as a
/// bare decimal string.
pub struct WeightSensorConn {
    agent: ureq::Agent,
    url: String,
}

impl WeightSensorConn {
    /// `host` is an address like `172.20.10.2` or a full URL.
    pub fn new(host: &str, timeout: Duration) -> Self {
        let url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}/")
        };
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        Self { agent, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl WeightSensor for WeightSensorConn {
    fn read_grams(&mut self) -> Result<f64, SensorError> {
        let response = match self.agent.get(&self.url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(SensorError::Status(code)),
            Err(e) => return Err(SensorError::Unreachable(e.to_string())),
        };
        if response.status() != 200 {
            return Err(SensorError::Status(response.status()));
        }

        let body = response
            .into_string()
            .map_err(|e| SensorError::Unreachable(e.to_string()))?;
        parse_weight(&body)
    }
}

pub fn parse_weight(body: &str) -> Result<f64, SensorError> {
    let text = body.trim();
    match text.parse::<f64>() {
        Ok(grams) if grams.is_finite() => Ok(grams),
        _ => Err(SensorError::Malformed(text.to_string())),
    }
}
