pub mod angle;
pub mod coordinator;
pub mod filter;
pub mod stability;
pub mod status;

pub use angle::{angle_at, shoulder_angle};
pub use coordinator::{CaptureCoordinator, CaptureEvent, FrameOutcome};
pub use filter::{InsufficientReason, JointFilter, JointSelection, MeasurementJoints};
pub use stability::{AngleSample, StabilitySignal, StabilityState, StabilityTracker};
pub use status::Status;
