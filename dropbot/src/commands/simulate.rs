use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        PoisonError,
    },
    time::Duration,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use robot::PoseStore;
use sorter::{RetryPolicy, SortWorkflow, SystemClock, WorkflowTiming};

use crate::{
    config::AppConfig,
    simulator::{SharedBench, SimulatedArm, SimulatedScale, SimulatedSource},
};

const SCALE_FAILURE_RATE: f64 = 0.05;

/// Run `cycles` sort cycles against simulated hardware and log where the
/// batteries went.
pub fn run(config: &AppConfig, cycles: usize, seed: Option<u64>, no_delay: bool, stop: &AtomicBool) -> anyhow::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let poses = PoseStore::load(&config.poses.path)?;
    let bench = SharedBench::default();

    let arm = SimulatedArm::new(poses, bench.clone());
    let scale = SimulatedScale::new(bench.clone(), StdRng::seed_from_u64(rng.gen()), SCALE_FAILURE_RATE);
    let source = SimulatedSource::new(bench.clone(), StdRng::seed_from_u64(rng.gen()));

    let (timing, retry) = if no_delay {
        let timing = WorkflowTiming {
            confirm_delay: Duration::ZERO,
            scale_settle: Duration::ZERO,
            release_pause: Duration::ZERO,
        };
        let retry = RetryPolicy {
            backoff: Duration::ZERO,
            ..config.retry_policy()
        };
        (timing, retry)
    } else {
        (config.timing(), config.retry_policy())
    };

    let mut workflow = SortWorkflow::new(arm, scale, source, SystemClock)
        .with_timing(timing)
        .with_retry(retry);
    let done = workflow.run_until(|n| n >= cycles || stop.load(Ordering::Relaxed))?;

    let bench = bench.lock().unwrap_or_else(PoisonError::into_inner);
    log::info!("Simulation finished after {done} cycles");
    for (bin, count) in &bench.bins {
        log::info!("{:<16} {count}", bin.as_str());
    }
    if bench.set_aside > 0 {
        log::warn!("{} batteries were set aside", bench.set_aside);
    }

    Ok(())
}
