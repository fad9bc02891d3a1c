use std::time::Duration;

use crate::{clock::Clock, devices::WeightSensor, error::SensorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Wait between two attempts. Not applied after the last one.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Read the scale until it answers with a finite gram value or the attempts
/// run out.
pub fn read_with_retry<W, C>(sensor: &mut W, policy: RetryPolicy, clock: &C) -> Result<f64, SensorError>
where
    W: WeightSensor + ?Sized,
    C: Clock + ?Sized,
{
    let attempts = policy.attempts.max(1);
    let mut last = SensorError::Unreachable("no attempt made".to_string());

    for attempt in 1..=attempts {
        match sensor.read_grams() {
            Ok(grams) if grams.is_finite() => {
                log::debug!("Weight reading {grams:.2} g (attempt {attempt})");
                return Ok(grams);
            }
            Ok(grams) => last = SensorError::Malformed(grams.to_string()),
            Err(e) => last = e,
        }
        log::warn!("Weight read attempt {attempt}/{attempts} failed: {last}");

        if attempt < attempts {
            clock.sleep(policy.backoff);
        }
    }

    Err(SensorError::Exhausted {
        attempts,
        last: Box::new(last),
    })
}
