//! # Beamkit Core
//!
//! Geometry value types and unit handling shared by the beamkit crates.
//! Provides the planar primitives (points, cubic Bezier segments, subpaths)
//! consumed by the engraving pipeline, and the measurement-unit selection
//! used when emitting programs.

pub mod geom;
pub mod units;

pub use geom::{CubicBezier, Point, Subpath};
pub use units::Units;
