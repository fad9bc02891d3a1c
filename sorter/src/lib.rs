//! Battery perception rules, chemistry classification and the sort cycle.
//!
//! Everything in here is free of camera and network code: the OpenCV side
//! lives in the `vision` crate and the device connections in `robot`. Both
//! plug into the workflow through the traits in [`devices`].

pub mod clock;
pub mod color;
pub mod dataset;
pub mod devices;
pub mod error;
pub mod geometry;
pub mod locate;
pub mod observation;
pub mod pose;
pub mod rules;
pub mod size;
pub mod weight;
pub mod workflow;

pub use clock::{Clock, SystemClock};
pub use color::{classify_color, robust_representative, ColorLabel, HsvTriplet};
pub use dataset::{sample_stem, yolo_label, SamplePaths, Split};
pub use devices::{Arm, BatterySource, WeightSensor};
pub use error::{ActuatorError, CaptureError, CycleError, SensorError};
pub use geometry::{center_crop, BoundingBox, CropRect, FrameSize};
pub use locate::{LocatorParams, Plausibility};
pub use observation::BatteryObservation;
pub use pose::{Pose, PoseKey};
pub use rules::{classify, Chemistry, ClassificationDecision};
pub use size::{estimate_size, SizeLabel};
pub use weight::{read_with_retry, RetryPolicy};
pub use workflow::{CycleFlag, CycleOutcome, SortWorkflow, WorkflowTiming};
