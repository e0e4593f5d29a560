pub mod joint;

pub use joint::{Joint, JointId, JointKind, JointSample, MeasurementSide};
