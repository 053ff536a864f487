//! Job-level parameters and the end-to-end pipeline driver.

use beamkit_core::{Subpath, Units};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EngraveResult, ParameterError};
use crate::gcode::GcodeEmitter;
use crate::orientation::{solve_orientation, OrientationPoint};
use crate::planner::MotionPlanner;

/// How cubic segments are turned into motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveMode {
    /// Uniform-parameter straight segments (`G1` only).
    Polyline,
    /// Tangent-matched circular arcs (`G2`/`G3`) with line fallback.
    Biarc,
}

impl Default for CurveMode {
    fn default() -> Self {
        Self::Polyline
    }
}

/// Resolved settings for one engraving job. Captured once at job start and
/// passed around by reference; nothing in the pipeline mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngraveParameters {
    /// Curve conversion strategy.
    pub curve_mode: CurveMode,
    /// Straight segments per cubic in polyline mode.
    pub polyline_segments: u32,
    /// Unit system of the emitted program.
    pub units: Units,
    /// Cutting feed rate, machine units per minute.
    pub feed_rate: f64,
    /// Maximum deviation between a cubic and its fitted arcs, machine units.
    pub arc_tolerance: f64,
    /// Subdivision budget for the biarc fitter.
    pub max_split_depth: u32,
    /// Fixed-point digits for coordinates; `None` selects the unit default.
    pub decimals: Option<u8>,
    /// Program-end word.
    pub program_end: String,
}

impl Default for EngraveParameters {
    fn default() -> Self {
        Self {
            curve_mode: CurveMode::Polyline,
            polyline_segments: 24,
            units: Units::Mm,
            feed_rate: 600.0,
            arc_tolerance: 0.01,
            max_split_depth: 8,
            decimals: None,
            program_end: "M2".to_string(),
        }
    }
}

impl EngraveParameters {
    /// Coordinate digits actually used by the emitter.
    pub fn coordinate_decimals(&self) -> u8 {
        self.decimals.unwrap_or(self.units.default_decimals())
    }

    /// Validate before running a job.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.polyline_segments < 1 || self.polyline_segments > 10_000 {
            return Err(ParameterError::OutOfRange {
                name: "polyline_segments".to_string(),
                value: f64::from(self.polyline_segments),
                min: 1.0,
                max: 10_000.0,
            });
        }
        if !self.feed_rate.is_finite() || self.feed_rate <= 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "feed_rate".to_string(),
                reason: "must be positive and finite".to_string(),
            });
        }
        if !self.arc_tolerance.is_finite() || self.arc_tolerance <= 0.0 {
            return Err(ParameterError::InvalidValue {
                name: "arc_tolerance".to_string(),
                reason: "must be positive and finite".to_string(),
            });
        }
        if self.max_split_depth < 1 || self.max_split_depth > 16 {
            return Err(ParameterError::OutOfRange {
                name: "max_split_depth".to_string(),
                value: f64::from(self.max_split_depth),
                min: 1.0,
                max: 16.0,
            });
        }
        if let Some(decimals) = self.decimals {
            if decimals > 8 {
                return Err(ParameterError::OutOfRange {
                    name: "decimals".to_string(),
                    value: f64::from(decimals),
                    min: 0.0,
                    max: 8.0,
                });
            }
        }
        if self.program_end.trim().is_empty() {
            return Err(ParameterError::InvalidValue {
                name: "program_end".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// A complete engraving job: inputs captured once, then immutable.
///
/// The pipeline is pure, so running the same job twice produces
/// byte-identical program text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngraveJob {
    pub orientation: Vec<OrientationPoint>,
    pub subpaths: Vec<Subpath>,
    #[serde(default)]
    pub params: EngraveParameters,
}

impl EngraveJob {
    pub fn new(
        orientation: Vec<OrientationPoint>,
        subpaths: Vec<Subpath>,
        params: EngraveParameters,
    ) -> Self {
        Self {
            orientation,
            subpaths,
            params,
        }
    }

    /// Run the whole pipeline: solve the orientation transform, plan the
    /// motion, emit program text. Fatal errors abort with no partial
    /// output.
    pub fn generate(&self) -> EngraveResult<String> {
        self.params.validate()?;
        let transform = solve_orientation(&self.orientation)?;
        debug!(
            "planning {} subpaths in {:?} mode",
            self.subpaths.len(),
            self.params.curve_mode
        );

        let planner = MotionPlanner::new(&transform, &self.params);
        let program = planner.plan(&self.subpaths)?;
        info!(
            "motion plan complete: {} subpaths, {} primitives",
            self.subpaths.len(),
            program.len()
        );

        GcodeEmitter::new(&self.params).emit(&program)
    }

    /// Like [`generate`](Self::generate), but keeps the program as lines.
    pub fn generate_lines(&self) -> EngraveResult<Vec<String>> {
        self.params.validate()?;
        let transform = solve_orientation(&self.orientation)?;
        let program = MotionPlanner::new(&transform, &self.params).plan(&self.subpaths)?;
        GcodeEmitter::new(&self.params).emit_lines(&program)
    }
}
