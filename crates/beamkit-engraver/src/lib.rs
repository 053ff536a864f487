//! # Beamkit Engraver
//!
//! Converts cubic Bezier path geometry into a 2-axis G-code motion program.
//!
//! ## Pipeline
//!
//! - **Orientation**: derive the document-to-machine affine transform from
//!   user-placed orientation points
//! - **Flattening**: uniform-parameter polyline conversion of cubic segments
//! - **Biarc fitting**: tangent-matched circular-arc approximation with a
//!   deviation tolerance and bounded subdivision
//! - **Motion planning**: per-subpath primitive sequences in machine space,
//!   concatenated in input order
//! - **Emission**: deterministic G0/G1/G2/G3 program text
//!
//! The pipeline is pure and synchronous: inputs are captured once per job,
//! the transform is immutable after construction, and equal inputs produce
//! byte-identical programs. All fatal errors abort the whole job; no partial
//! program text is ever returned.

pub mod biarc;
pub mod error;
pub mod flatten;
pub mod gcode;
pub mod job;
pub mod orientation;
pub mod planner;

// Re-export commonly used items
pub use biarc::{BiarcFitter, FittedSegment};
pub use error::{EngraveError, EngraveResult, ParameterError};
pub use flatten::flatten_cubic;
pub use gcode::GcodeEmitter;
pub use job::{CurveMode, EngraveJob, EngraveParameters};
pub use orientation::{solve_orientation, AffineTransform, OrientationPoint};
pub use planner::{MotionPlanner, MotionPrimitive};
