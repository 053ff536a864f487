//! Motion planning: ordered subpaths to machine-space motion primitives.
//!
//! The planner walks subpaths in input order (the caller's order is the
//! cutting order; no reordering or optimization happens here), maps each
//! cubic into machine space through the orientation transform, and converts
//! it with the configured curve strategy. Every subpath opens with a rapid
//! move to its transformed start point, the tool-up traversal.
//!
//! Cubics are transformed before conversion: an affine map takes cubics to
//! cubics exactly, so flattening commutes with the transform, and arcs are
//! fitted directly in machine space where they stay true circles under any
//! affine (including shear), with the tolerance applying in machine units.

use beamkit_core::{CubicBezier, Point, Subpath};
use tracing::debug;

use crate::biarc::{BiarcFitter, FittedSegment};
use crate::error::{EngraveError, EngraveResult};
use crate::flatten::flatten_cubic;
use crate::job::{CurveMode, EngraveParameters};
use crate::orientation::AffineTransform;

/// Absolute tolerance for the segment-chain continuity contract, in
/// document units.
pub const CONTINUITY_EPS: f64 = 1e-6;

/// A single machine-space motion. Each primitive starts at the previous
/// primitive's endpoint; the first primitive of a job is always a rapid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionPrimitive {
    /// Tool-up traversal to a new subpath start.
    RapidMove { to: Point },
    /// Straight cutting move.
    Line { to: Point },
    /// Clockwise arc around `center`.
    ArcCW { to: Point, center: Point },
    /// Counter-clockwise arc around `center`.
    ArcCCW { to: Point, center: Point },
}

impl MotionPrimitive {
    /// Endpoint of the motion, i.e. the next primitive's start position.
    pub fn target(&self) -> Point {
        match *self {
            MotionPrimitive::RapidMove { to }
            | MotionPrimitive::Line { to }
            | MotionPrimitive::ArcCW { to, .. }
            | MotionPrimitive::ArcCCW { to, .. } => to,
        }
    }
}

/// Converts validated subpaths into one ordered primitive sequence.
pub struct MotionPlanner<'a> {
    transform: &'a AffineTransform,
    params: &'a EngraveParameters,
}

impl<'a> MotionPlanner<'a> {
    pub fn new(transform: &'a AffineTransform, params: &'a EngraveParameters) -> Self {
        Self { transform, params }
    }

    /// Plan all subpaths, concatenated in input order.
    ///
    /// Empty subpaths are skipped. A discontinuous subpath aborts the whole
    /// job with [`EngraveError::InvalidSubpath`]; a transform that produces
    /// non-finite machine coordinates aborts with
    /// [`EngraveError::NumericFault`].
    pub fn plan(&self, subpaths: &[Subpath]) -> EngraveResult<Vec<MotionPrimitive>> {
        let fitter = BiarcFitter::new(self.params.arc_tolerance, self.params.max_split_depth);
        let mut program = Vec::new();

        for (index, subpath) in subpaths.iter().enumerate() {
            if subpath.segments.is_empty() {
                debug!("skipping empty subpath {}", index);
                continue;
            }
            if let Some(segment) = subpath.first_discontinuity(CONTINUITY_EPS) {
                return Err(EngraveError::InvalidSubpath {
                    subpath: index,
                    segment,
                });
            }

            let before = program.len();
            let first = self.transformed(&subpath.segments[0], index)?;
            program.push(MotionPrimitive::RapidMove { to: first.start });

            for segment in &subpath.segments {
                let machine_seg = self.transformed(segment, index)?;
                match self.params.curve_mode {
                    CurveMode::Polyline => {
                        for point in
                            flatten_cubic(&machine_seg, self.params.polyline_segments)
                        {
                            program.push(MotionPrimitive::Line { to: point });
                        }
                    }
                    CurveMode::Biarc => {
                        for fitted in fitter.fit(&machine_seg) {
                            program.push(match fitted {
                                FittedSegment::Line { end } => MotionPrimitive::Line { to: end },
                                FittedSegment::Arc {
                                    end,
                                    center,
                                    clockwise: true,
                                } => MotionPrimitive::ArcCW { to: end, center },
                                FittedSegment::Arc {
                                    end,
                                    center,
                                    clockwise: false,
                                } => MotionPrimitive::ArcCCW { to: end, center },
                            });
                        }
                    }
                }
            }

            debug!(
                "subpath {}: {} segments -> {} primitives",
                index,
                subpath.segments.len(),
                program.len() - before
            );
        }

        Ok(program)
    }

    fn transformed(&self, segment: &CubicBezier, subpath: usize) -> EngraveResult<CubicBezier> {
        let mapped = self.transform.apply_cubic(segment);
        if !mapped.is_finite() {
            debug!("non-finite machine coordinates in subpath {}", subpath);
            return Err(EngraveError::NumericFault {
                word: "coordinate",
                value: f64::NAN,
            });
        }
        Ok(mapped)
    }
}
