//! # Beamkit
//!
//! Converts cubic Bezier path geometry into 2-axis G-code motion programs
//! for CNC and laser controllers.
//!
//! ## Architecture
//!
//! Beamkit is organized as a workspace:
//!
//! 1. **beamkit-core** - geometry value types (points, cubics, subpaths) and
//!    unit handling
//! 2. **beamkit-engraver** - the pipeline: orientation transforms, polyline
//!    flattening, biarc fitting, motion planning, G-code emission
//! 3. **beamkit** - this crate; re-exports plus a small binary that runs a
//!    JSON job description through the pipeline
//!
//! The pipeline core does no I/O: it receives already-extracted geometry
//! (orientation points, subpaths, parameters) and returns program text.
//! Document traversal on one side and file writing on the other belong to
//! the caller.

pub use beamkit_core::{CubicBezier, Point, Subpath, Units};

pub use beamkit_engraver::{
    flatten_cubic, solve_orientation, AffineTransform, BiarcFitter, CurveMode, EngraveError,
    EngraveJob, EngraveParameters, EngraveResult, FittedSegment, GcodeEmitter, MotionPlanner,
    MotionPrimitive, OrientationPoint, ParameterError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with console output, honoring the `RUST_LOG`
/// environment variable.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
