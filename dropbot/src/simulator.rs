//! Stand-in hardware for running the sort cycle without a cell.
//!
//! All three devices share one [`Bench`]: the source puts batteries into the
//! pick area, the arm carries them between the pick area, the scale and the
//! bins, and the scale weighs whatever lies on it.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rand::{rngs::StdRng, seq::SliceRandom, Rng};
use robot::PoseStore;
use sorter::{
    ActuatorError, Arm, BatteryObservation, BatterySource, BoundingBox, CaptureError, ColorLabel, Pose, PoseKey,
    SensorError, SizeLabel, WeightSensor,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimBattery {
    pub size: SizeLabel,
    pub color: ColorLabel,
    pub grams: f64,
}

const CATALOGUE: &[SimBattery] = &[
    SimBattery { size: SizeLabel::Aa, color: ColorLabel::Gold, grams: 23.0 },
    SimBattery { size: SizeLabel::Aa, color: ColorLabel::RedOrange, grams: 15.5 },
    SimBattery { size: SizeLabel::Aa, color: ColorLabel::WhiteGray, grams: 14.0 },
    SimBattery { size: SizeLabel::Aa, color: ColorLabel::Blue, grams: 26.0 },
    SimBattery { size: SizeLabel::Aa, color: ColorLabel::Other, grams: 25.5 },
    SimBattery { size: SizeLabel::Aa, color: ColorLabel::Green, grams: 22.0 },
    SimBattery { size: SizeLabel::Aaa, color: ColorLabel::Gold, grams: 10.0 },
    SimBattery { size: SizeLabel::Aaa, color: ColorLabel::RedOrange, grams: 7.0 },
    SimBattery { size: SizeLabel::Aaa, color: ColorLabel::Other, grams: 12.0 },
    SimBattery { size: SizeLabel::Aaa, color: ColorLabel::WhiteGray, grams: 4.0 },
    SimBattery { size: SizeLabel::Unknown, color: ColorLabel::Other, grams: 30.0 },
];

#[derive(Debug, Default)]
pub struct Bench {
    pub in_view: Option<SimBattery>,
    pub on_scale: Option<SimBattery>,
    pub bins: BTreeMap<PoseKey, usize>,
    /// Batteries released over an occupied pick area.
    pub set_aside: usize,
}

pub type SharedBench = Arc<Mutex<Bench>>;

fn lock(bench: &SharedBench) -> MutexGuard<'_, Bench> {
    bench.lock().unwrap_or_else(PoisonError::into_inner)
}

fn is_bin(key: PoseKey) -> bool {
    matches!(
        key,
        PoseKey::AlkalineDrop | PoseKey::NimhDrop | PoseKey::ZincDrop | PoseKey::LithiumDrop | PoseKey::UnknownDrop
    )
}

pub struct SimulatedArm {
    poses: PoseStore,
    bench: SharedBench,
    at: PoseKey,
    holding: Option<SimBattery>,
}

impl SimulatedArm {
    pub fn new(poses: PoseStore, bench: SharedBench) -> Self {
        Self {
            poses,
            bench,
            at: PoseKey::View,
            holding: None,
        }
    }
}

impl Arm for SimulatedArm {
    fn move_to(&mut self, key: PoseKey) -> Result<(), ActuatorError> {
        let pose = self.poses.get(key).ok_or(ActuatorError::MissingPose(key))?;
        log::debug!("Moving to {key} ({pose})");
        self.at = key;
        Ok(())
    }

    fn open_gripper(&mut self) -> Result<(), ActuatorError> {
        let Some(battery) = self.holding.take() else {
            return Ok(());
        };

        let mut bench = lock(&self.bench);
        match self.at {
            PoseKey::WeightDrop => bench.on_scale = Some(battery),
            key if is_bin(key) => *bench.bins.entry(key).or_default() += 1,
            _ if bench.in_view.is_none() => bench.in_view = Some(battery),
            _ => bench.set_aside += 1,
        }
        Ok(())
    }

    fn close_gripper(&mut self) -> Result<(), ActuatorError> {
        if self.holding.is_some() {
            return Ok(());
        }

        let mut bench = lock(&self.bench);
        self.holding = match self.at {
            PoseKey::Pick => bench.in_view.take(),
            PoseKey::WeightDrop => bench.on_scale.take(),
            _ => None,
        };
        Ok(())
    }

    fn current_pose(&mut self) -> Result<Pose, ActuatorError> {
        self.poses.get(self.at).ok_or(ActuatorError::MissingPose(self.at))
    }

    fn calibrate(&mut self) -> Result<(), ActuatorError> {
        Ok(())
    }
}

pub struct SimulatedScale {
    bench: SharedBench,
    rng: StdRng,
    failure_rate: f64,
}

impl SimulatedScale {
    pub fn new(bench: SharedBench, rng: StdRng, failure_rate: f64) -> Self {
        Self {
            bench,
            rng,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

impl WeightSensor for SimulatedScale {
    fn read_grams(&mut self) -> Result<f64, SensorError> {
        if self.rng.gen_bool(self.failure_rate) {
            return Err(SensorError::Unreachable("simulated timeout".to_string()));
        }

        let on_scale = lock(&self.bench).on_scale;
        Ok(on_scale.map_or(0.0, |b| b.grams + self.rng.gen_range(-0.2..0.2)))
    }
}

pub struct SimulatedSource {
    bench: SharedBench,
    rng: StdRng,
    /// Chance that no new battery shows up in an empty pick area.
    empty_rate: f64,
    /// Chance that a battery in view gets knocked out of the frame.
    moved_rate: f64,
}

impl SimulatedSource {
    pub fn new(bench: SharedBench, rng: StdRng) -> Self {
        Self {
            bench,
            rng,
            empty_rate: 0.2,
            moved_rate: 0.1,
        }
    }

    pub fn with_rates(mut self, empty_rate: f64, moved_rate: f64) -> Self {
        self.empty_rate = empty_rate.clamp(0.0, 1.0);
        self.moved_rate = moved_rate.clamp(0.0, 1.0);
        self
    }

    fn observation(&mut self, battery: SimBattery) -> BatteryObservation {
        let length = match battery.size {
            SizeLabel::Aa => 140,
            SizeLabel::Aaa => 120,
            SizeLabel::Unknown => 160,
        };
        let confidence = self.rng.gen_range(0.5..0.95);
        let bbox = BoundingBox::new(40, 60, 40 + length, 100, confidence, 0);

        BatteryObservation::new(bbox, battery.size, length, battery.color)
    }
}

impl BatterySource for SimulatedSource {
    fn observe(&mut self) -> Result<Option<BatteryObservation>, CaptureError> {
        let mut bench = lock(&self.bench);
        match bench.in_view {
            Some(_) if self.rng.gen_bool(self.moved_rate) => {
                log::debug!("Battery knocked out of view");
                bench.in_view = None;
            }
            Some(_) => {}
            None if self.rng.gen_bool(self.empty_rate) => {}
            None => bench.in_view = CATALOGUE.choose(&mut self.rng).copied(),
        }

        let in_view = bench.in_view;
        drop(bench);

        Ok(in_view.map(|battery| self.observation(battery)))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use sorter::{CycleOutcome, RetryPolicy, SortWorkflow, SystemClock, WorkflowTiming};

    use super::*;

    const NO_WAIT: WorkflowTiming = WorkflowTiming {
        confirm_delay: std::time::Duration::ZERO,
        scale_settle: std::time::Duration::ZERO,
        release_pause: std::time::Duration::ZERO,
    };

    fn workflow(
        bench: &SharedBench,
        seed: u64,
        failure_rate: f64,
    ) -> SortWorkflow<SimulatedArm, SimulatedScale, SimulatedSource, SystemClock> {
        let arm = SimulatedArm::new(PoseStore::default(), bench.clone());
        let scale = SimulatedScale::new(bench.clone(), StdRng::seed_from_u64(seed), failure_rate);
        let source = SimulatedSource::new(bench.clone(), StdRng::seed_from_u64(seed + 1));

        SortWorkflow::new(arm, scale, source, SystemClock)
            .with_timing(NO_WAIT)
            .with_retry(RetryPolicy {
                attempts: 2,
                backoff: std::time::Duration::ZERO,
            })
    }

    #[test]
    fn sorted_batteries_end_up_in_their_bins() {
        let bench = SharedBench::default();
        let mut workflow = workflow(&bench, 7, 0.1);
        workflow.start().unwrap();

        let mut expected = BTreeMap::new();
        for _ in 0..200 {
            if let Ok(CycleOutcome::Sorted { decision, .. }) = workflow.run_cycle() {
                *expected.entry(decision.drop_target).or_insert(0) += 1;
            }
        }

        assert!(!expected.is_empty());
        assert_eq!(lock(&bench).bins, expected);
    }

    #[test]
    fn dead_scale_sorts_nothing() {
        let bench = SharedBench::default();
        let mut workflow = workflow(&bench, 3, 1.0);

        let cycles = workflow.run_until(|n| n >= 50).unwrap();

        assert_eq!(cycles, 50);
        let bench = lock(&bench);
        assert!(bench.bins.is_empty());
        assert!(bench.on_scale.is_none());
    }

    #[test]
    fn arm_carries_battery_from_pick_to_scale() {
        let bench = SharedBench::default();
        let battery = CATALOGUE[0];
        lock(&bench).in_view = Some(battery);
        let mut arm = SimulatedArm::new(PoseStore::default(), bench.clone());

        arm.move_to(PoseKey::Pick).unwrap();
        arm.close_gripper().unwrap();
        arm.move_to(PoseKey::WeightDrop).unwrap();
        arm.open_gripper().unwrap();

        let bench = lock(&bench);
        assert!(bench.in_view.is_none());
        assert_eq!(bench.on_scale, Some(battery));
    }

    #[test]
    fn empty_scale_reads_zero() {
        let mut scale = SimulatedScale::new(SharedBench::default(), StdRng::seed_from_u64(1), 0.0);
        assert_eq!(scale.read_grams().unwrap(), 0.0);
    }

    #[test]
    fn current_pose_follows_moves() {
        let mut arm = SimulatedArm::new(PoseStore::default(), SharedBench::default());
        assert!(arm.move_to(PoseKey::Lift2).is_ok());
        assert_eq!(arm.current_pose().unwrap(), PoseStore::default().get(PoseKey::Lift2).unwrap());
    }
}
