use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use rstest::rstest;
use sorter::{
    ActuatorError, Arm, BatteryObservation, BatterySource, BoundingBox, CaptureError, Chemistry,
    Clock, ColorLabel, CycleError, CycleFlag, CycleOutcome, Pose, PoseKey, SensorError, SizeLabel,
    SortWorkflow, WeightSensor,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArmCall {
    Move(PoseKey),
    Open,
    Close,
}

/// Arm that records every command and can be told to fail one move.
#[derive(Clone, Default)]
struct SpyArm {
    calls: Arc<Mutex<Vec<ArmCall>>>,
    fail_on: Option<PoseKey>,
}

impl SpyArm {
    fn failing_on(key: PoseKey) -> Self {
        Self {
            fail_on: Some(key),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<ArmCall> {
        self.calls.lock().unwrap().clone()
    }

    fn moves_to(&self, key: PoseKey) -> usize {
        self.calls().iter().filter(|c| **c == ArmCall::Move(key)).count()
    }
}

impl Arm for SpyArm {
    fn move_to(&mut self, key: PoseKey) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(ArmCall::Move(key));
        if self.fail_on == Some(key) {
            return Err(ActuatorError::Rejected {
                command: "MOVE_POSE".into(),
                message: "collision detected".into(),
            });
        }
        Ok(())
    }

    fn open_gripper(&mut self) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(ArmCall::Open);
        Ok(())
    }

    fn close_gripper(&mut self) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(ArmCall::Close);
        Ok(())
    }

    fn current_pose(&mut self) -> Result<Pose, ActuatorError> {
        Ok(Pose::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0))
    }

    fn calibrate(&mut self) -> Result<(), ActuatorError> {
        Ok(())
    }
}

struct ScriptedScale(VecDeque<Result<f64, SensorError>>);

impl WeightSensor for ScriptedScale {
    fn read_grams(&mut self) -> Result<f64, SensorError> {
        self.0
            .pop_front()
            .unwrap_or_else(|| Err(SensorError::Unreachable("connection refused".into())))
    }
}

struct ScriptedSource(VecDeque<Option<BatteryObservation>>);

impl BatterySource for ScriptedSource {
    fn observe(&mut self) -> Result<Option<BatteryObservation>, CaptureError> {
        self.0
            .pop_front()
            .ok_or_else(|| CaptureError("camera closed".into()))
    }
}

#[derive(Clone, Default)]
struct RecordingClock(Arc<Mutex<Vec<Duration>>>);

impl Clock for RecordingClock {
    fn sleep(&self, d: Duration) {
        self.0.lock().unwrap().push(d);
    }
}

fn battery(size: SizeLabel, color: ColorLabel) -> BatteryObservation {
    let bbox = BoundingBox::new(100, 40, 140, 180, 0.87, 0);
    BatteryObservation::new(bbox, size, 140, color)
}

fn seen_twice(obs: BatteryObservation) -> ScriptedSource {
    ScriptedSource(VecDeque::from([Some(obs), Some(obs)]))
}

#[rstest]
fn full_cycle_visits_poses_in_order() {
    let arm = SpyArm::default();
    let clock = RecordingClock::default();
    let mut workflow = SortWorkflow::new(
        arm.clone(),
        ScriptedScale(VecDeque::from([Ok(22.0)])),
        seen_twice(battery(SizeLabel::Aa, ColorLabel::Gold)),
        clock.clone(),
    );

    let outcome = workflow.run_cycle().unwrap();

    let CycleOutcome::Sorted { grams, decision, .. } = outcome else {
        panic!("expected a sorted battery, got {outcome:?}");
    };
    assert_eq!(grams, 22.0);
    assert_eq!(decision.chemistry, Chemistry::Alkaline);
    assert_eq!(
        arm.calls(),
        vec![
            ArmCall::Open,
            ArmCall::Move(PoseKey::Pick),
            ArmCall::Close,
            ArmCall::Move(PoseKey::Lift),
            ArmCall::Move(PoseKey::WeightDrop),
            ArmCall::Open,
            ArmCall::Close,
            ArmCall::Move(PoseKey::Lift2),
            ArmCall::Move(PoseKey::AlkalineDrop),
            ArmCall::Open,
            ArmCall::Move(PoseKey::View),
        ]
    );
    assert_eq!(
        *clock.0.lock().unwrap(),
        vec![Duration::from_secs(2), Duration::from_secs(1), Duration::from_millis(500)]
    );
}

#[rstest]
#[case::green_override(SizeLabel::Aa, ColorLabel::Green, 22.0, PoseKey::UnknownDrop)]
#[case::aaa_zinc(SizeLabel::Aaa, ColorLabel::RedOrange, 7.0, PoseKey::ZincDrop)]
#[case::unknown_size(SizeLabel::Unknown, ColorLabel::Gold, 22.0, PoseKey::UnknownDrop)]
#[case::aaa_unmatched(SizeLabel::Aaa, ColorLabel::Gold, 30.0, PoseKey::UnknownDrop)]
fn battery_lands_in_its_bin(
    #[case] size: SizeLabel,
    #[case] color: ColorLabel,
    #[case] grams: f64,
    #[case] bin: PoseKey,
) {
    let arm = SpyArm::default();
    let mut workflow = SortWorkflow::new(
        arm.clone(),
        ScriptedScale(VecDeque::from([Ok(grams)])),
        seen_twice(battery(size, color)),
        RecordingClock::default(),
    );

    workflow.run_cycle().unwrap();
    assert_eq!(arm.moves_to(bin), 1);
}

#[rstest]
fn three_failed_weight_reads_abort_to_view_once() {
    let arm = SpyArm::default();
    let clock = RecordingClock::default();
    let mut workflow = SortWorkflow::new(
        arm.clone(),
        ScriptedScale(VecDeque::from([
            Err(SensorError::Status(500)),
            Err(SensorError::Malformed("--".into())),
            Err(SensorError::Unreachable("timed out".into())),
        ])),
        seen_twice(battery(SizeLabel::Aa, ColorLabel::Gold)),
        clock.clone(),
    );

    let err = workflow.run_cycle().unwrap_err();

    assert!(matches!(err, CycleError::SensorUnavailable(SensorError::Exhausted { attempts: 3, .. })));
    assert_eq!(arm.moves_to(PoseKey::View), 1);
    assert_eq!(arm.calls().last(), Some(&ArmCall::Move(PoseKey::View)));
    assert_eq!(arm.calls()[arm.calls().len() - 2], ArmCall::Close);
    assert_eq!(arm.moves_to(PoseKey::Lift2), 0);
    // confirm delay, scale settle, two backoffs
    assert_eq!(clock.0.lock().unwrap().len(), 4);
}

#[rstest]
fn battery_gone_on_second_look_is_skipped() {
    let arm = SpyArm::default();
    let obs = battery(SizeLabel::Aa, ColorLabel::Gold);
    let mut workflow = SortWorkflow::new(
        arm.clone(),
        ScriptedScale(VecDeque::new()),
        ScriptedSource(VecDeque::from([Some(obs), None])),
        RecordingClock::default(),
    );

    assert_eq!(workflow.run_cycle(), Ok(CycleOutcome::Moved));
    assert!(arm.calls().is_empty());
}

#[rstest]
fn empty_pick_area_does_not_move_the_arm() {
    let arm = SpyArm::default();
    let clock = RecordingClock::default();
    let mut workflow = SortWorkflow::new(
        arm.clone(),
        ScriptedScale(VecDeque::new()),
        ScriptedSource(VecDeque::from([None])),
        clock.clone(),
    );

    assert_eq!(workflow.run_cycle(), Ok(CycleOutcome::NoBattery));
    assert!(arm.calls().is_empty());
    assert!(clock.0.lock().unwrap().is_empty());
}

#[rstest]
fn confirming_observation_decides_the_bin() {
    let arm = SpyArm::default();
    let mut workflow = SortWorkflow::new(
        arm.clone(),
        ScriptedScale(VecDeque::from([Ok(10.0)])),
        ScriptedSource(VecDeque::from([
            Some(battery(SizeLabel::Aa, ColorLabel::Gold)),
            Some(battery(SizeLabel::Aaa, ColorLabel::Gold)),
        ])),
        RecordingClock::default(),
    );

    workflow.run_cycle().unwrap();
    assert_eq!(arm.moves_to(PoseKey::AlkalineDrop), 1);
}

#[rstest]
fn arm_failure_returns_to_view_and_ends_the_run() {
    let arm = SpyArm::failing_on(PoseKey::WeightDrop);
    let mut workflow = SortWorkflow::new(
        arm.clone(),
        ScriptedScale(VecDeque::new()),
        seen_twice(battery(SizeLabel::Aa, ColorLabel::Gold)),
        RecordingClock::default(),
    );

    let err = workflow.run_until(|cycles| cycles >= 5).unwrap_err();

    assert!(matches!(err, CycleError::Actuator(ActuatorError::Rejected { .. })));
    // Once on start, once while recovering.
    assert_eq!(arm.moves_to(PoseKey::View), 2);
    assert_eq!(arm.calls().last(), Some(&ArmCall::Move(PoseKey::View)));
}

#[rstest]
fn second_cycle_while_flag_is_held_is_busy() {
    let flag = CycleFlag::new();
    let mut workflow = SortWorkflow::new(
        SpyArm::default(),
        ScriptedScale(VecDeque::new()),
        ScriptedSource(VecDeque::from([None, None])),
        RecordingClock::default(),
    )
    .with_cycle_flag(flag.clone());

    let held = flag.try_acquire().unwrap();
    assert_eq!(workflow.run_cycle(), Err(CycleError::Busy));
    drop(held);

    assert_eq!(workflow.run_cycle(), Ok(CycleOutcome::NoBattery));
    assert!(!flag.is_running());
}

#[rstest]
fn sensor_failure_does_not_stop_the_run() {
    let arm = SpyArm::default();
    let gold = battery(SizeLabel::Aa, ColorLabel::Gold);
    let mut workflow = SortWorkflow::new(
        arm.clone(),
        ScriptedScale(VecDeque::from([
            Err(SensorError::Status(503)),
            Err(SensorError::Status(503)),
            Err(SensorError::Status(503)),
            Ok(25.0),
        ])),
        ScriptedSource(VecDeque::from([Some(gold), Some(gold), Some(gold), Some(gold)])),
        RecordingClock::default(),
    );

    assert_eq!(workflow.run_until(|cycles| cycles >= 2), Ok(2));
    assert_eq!(arm.moves_to(PoseKey::NimhDrop), 1);
}

#[rstest]
fn capture_failure_is_recoverable_in_run() {
    let mut workflow = SortWorkflow::new(
        SpyArm::default(),
        ScriptedScale(VecDeque::new()),
        ScriptedSource(VecDeque::new()),
        RecordingClock::default(),
    );

    assert_eq!(workflow.run_until(|cycles| cycles >= 3), Ok(3));
}
