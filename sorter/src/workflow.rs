//! The pick, weigh and sort cycle.
//!
//! A cycle looks at the pick area twice (the second look after a settle
//! delay confirms the battery stayed put), carries the battery to the scale,
//! weighs it, classifies it and drops it into its bin. The arm always ends a
//! cycle over the pick area, also when the scale gave up or the arm failed.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    clock::Clock,
    devices::{Arm, BatterySource, WeightSensor},
    error::{ActuatorError, CycleError},
    observation::BatteryObservation,
    pose::PoseKey,
    rules::{classify, ClassificationDecision},
    weight::{read_with_retry, RetryPolicy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTiming {
    /// Wait between the first detection and the confirming look.
    pub confirm_delay: Duration,
    /// Wait after releasing the battery onto the scale.
    pub scale_settle: Duration,
    /// Wait after releasing the battery into its bin.
    pub release_pause: Duration,
}

impl Default for WorkflowTiming {
    fn default() -> Self {
        Self {
            confirm_delay: Duration::from_secs(2),
            scale_settle: Duration::from_secs(1),
            release_pause: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Nothing plausible in view.
    NoBattery,
    /// Seen once but gone on the confirming look.
    Moved,
    Sorted {
        observation: BatteryObservation,
        grams: f64,
        decision: ClassificationDecision,
    },
}

/// Shared "a cycle is running" marker.
///
/// Clones share the same flag, so every entry point that can start a cycle
/// must be handed a clone of one flag.
#[derive(Debug, Clone, Default)]
pub struct CycleFlag(Arc<AtomicBool>);

impl CycleFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark a cycle as running. Returns `None` if one already is.
    pub fn try_acquire(&self) -> Option<CycleGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard(self.0.clone()))
    }
}

/// Clears the [`CycleFlag`] when dropped.
#[derive(Debug)]
pub struct CycleGuard(Arc<AtomicBool>);

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SortWorkflow<A, W, S, C> {
    arm: A,
    scale: W,
    source: S,
    clock: C,
    timing: WorkflowTiming,
    retry: RetryPolicy,
    flag: CycleFlag,
}

impl<A, W, S, C> SortWorkflow<A, W, S, C>
where
    A: Arm,
    W: WeightSensor,
    S: BatterySource,
    C: Clock,
{
    pub fn new(arm: A, scale: W, source: S, clock: C) -> Self {
        Self {
            arm,
            scale,
            source,
            clock,
            timing: WorkflowTiming::default(),
            retry: RetryPolicy::default(),
            flag: CycleFlag::new(),
        }
    }

    pub fn with_timing(mut self, timing: WorkflowTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cycle_flag(mut self, flag: CycleFlag) -> Self {
        self.flag = flag;
        self
    }

    pub fn arm_mut(&mut self) -> &mut A {
        &mut self.arm
    }

    pub fn into_parts(self) -> (A, W, S) {
        (self.arm, self.scale, self.source)
    }

    /// Park the arm over the pick area before the first cycle.
    pub fn start(&mut self) -> Result<(), ActuatorError> {
        log::info!("Moving to {} and waiting for batteries", PoseKey::View);
        self.arm.move_to(PoseKey::View)
    }

    /// Run one cycle. Fails with [`CycleError::Busy`] if another cycle holds
    /// the shared flag.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        let _guard = self.flag.try_acquire().ok_or(CycleError::Busy)?;

        let Some(first) = self.source.observe()? else {
            return Ok(CycleOutcome::NoBattery);
        };
        log::info!("Initial detection: {first}");

        self.clock.sleep(self.timing.confirm_delay);
        let Some(observation) = self.source.observe()? else {
            log::warn!("Battery moved out of frame after delay, skipping");
            return Ok(CycleOutcome::Moved);
        };
        log::info!("Final detection: {observation}");

        match self.sort(observation) {
            Err(CycleError::Actuator(e)) => {
                log::error!("Arm failure during sort cycle: {e}");
                if let Err(e) = self.arm.move_to(PoseKey::View) {
                    log::error!("Could not return to {}: {e}", PoseKey::View);
                }
                Err(CycleError::Actuator(e))
            }
            res => res,
        }
    }

    fn sort(&mut self, observation: BatteryObservation) -> Result<CycleOutcome, CycleError> {
        self.arm.open_gripper()?;
        self.arm.move_to(PoseKey::Pick)?;
        self.arm.close_gripper()?;
        self.arm.move_to(PoseKey::Lift)?;
        self.arm.move_to(PoseKey::WeightDrop)?;
        self.arm.open_gripper()?;
        self.clock.sleep(self.timing.scale_settle);

        let grams = match read_with_retry(&mut self.scale, self.retry, &self.clock) {
            Ok(grams) => grams,
            Err(e) => {
                log::error!("Failed to read weight, returning to view: {e}");
                self.arm.close_gripper()?;
                self.arm.move_to(PoseKey::View)?;
                return Err(CycleError::SensorUnavailable(e));
            }
        };
        log::info!("Weight = {grams:.2} g");

        self.arm.close_gripper()?;
        self.arm.move_to(PoseKey::Lift2)?;

        let decision = classify(observation.size(), observation.color(), grams);
        if decision.fallback {
            log::warn!(
                "Unclassified battery ({observation}, {grams:.2} g), sending to {}",
                decision.drop_target
            );
        } else {
            log::info!("Classed as {}", decision.chemistry.as_str().to_uppercase());
        }

        self.arm.move_to(decision.drop_target)?;
        self.arm.open_gripper()?;
        self.clock.sleep(self.timing.release_pause);
        self.arm.move_to(PoseKey::View)?;

        Ok(CycleOutcome::Sorted {
            observation,
            grams,
            decision,
        })
    }

    /// Run cycles until `stop` returns true for the number of finished
    /// cycles. Sensor and capture failures only end the current cycle; arm
    /// failures end the run.
    pub fn run_until(&mut self, mut stop: impl FnMut(usize) -> bool) -> Result<usize, CycleError> {
        self.start()?;

        let mut cycles = 0;
        while !stop(cycles) {
            match self.run_cycle() {
                Ok(CycleOutcome::Sorted { decision, .. }) => {
                    log::debug!("Sorted into {}", decision.drop_target);
                }
                Ok(_) => {}
                Err(e) if e.is_recoverable() => log::warn!("Sort cycle aborted: {e}"),
                Err(e) => return Err(e),
            }
            cycles += 1;
        }

        Ok(cycles)
    }
}
