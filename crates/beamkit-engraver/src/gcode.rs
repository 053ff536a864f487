//! G-code emission from motion primitives.
//!
//! Output policy, fixed so identical programs are byte-identical:
//! - preamble: unit word (`G21`/`G20`), then `G90` absolute positioning
//! - `G0` for rapids, `G1`/`G2`/`G3` for cutting moves
//! - the feed rate is repeated on every cutting move (the modal-emission
//!   alternative saves a few bytes but is easy to get wrong when programs
//!   are spliced; repeating is always correct)
//! - arc centers are `I`/`J` offsets from the current position
//! - coordinates are fixed-point with the configured digit count
//! - postamble: the configured program-end word
//!
//! Any non-finite value aborts emission with a `NumericFault`; `NaN` text
//! must never reach a controller.

use tracing::debug;

use beamkit_core::Point;

use crate::error::{EngraveError, EngraveResult};
use crate::job::EngraveParameters;
use crate::planner::MotionPrimitive;

/// Serializes a motion program into controller-agnostic G-code text.
pub struct GcodeEmitter<'a> {
    params: &'a EngraveParameters,
}

impl<'a> GcodeEmitter<'a> {
    pub fn new(params: &'a EngraveParameters) -> Self {
        Self { params }
    }

    /// Emit the program as individual lines, preamble and postamble
    /// included.
    pub fn emit_lines(&self, program: &[MotionPrimitive]) -> EngraveResult<Vec<String>> {
        debug_assert!(
            matches!(program.first(), None | Some(MotionPrimitive::RapidMove { .. })),
            "programs must open with a rapid establishing the start position"
        );

        let decimals = usize::from(self.params.coordinate_decimals());
        let feed = coord("F", self.params.feed_rate, 0)?;
        let mut lines = Vec::with_capacity(program.len() + 3);

        lines.push(self.params.units.gcode_word().to_string());
        lines.push("G90".to_string());

        // Planner programs always open with a rapid; the origin fallback
        // only matters for hand-built primitive slices.
        let mut position = Point::ZERO;
        for primitive in program {
            let line = match *primitive {
                MotionPrimitive::RapidMove { to } => {
                    format!(
                        "G0 X{} Y{}",
                        coord("X", to.x, decimals)?,
                        coord("Y", to.y, decimals)?
                    )
                }
                MotionPrimitive::Line { to } => {
                    format!(
                        "G1 X{} Y{} F{}",
                        coord("X", to.x, decimals)?,
                        coord("Y", to.y, decimals)?,
                        feed
                    )
                }
                MotionPrimitive::ArcCW { to, center } => {
                    self.arc_line("G2", position, to, center, decimals, &feed)?
                }
                MotionPrimitive::ArcCCW { to, center } => {
                    self.arc_line("G3", position, to, center, decimals, &feed)?
                }
            };
            lines.push(line);
            position = primitive.target();
        }

        lines.push(self.params.program_end.clone());
        debug!("emitted {} program lines", lines.len());
        Ok(lines)
    }

    /// Emit the program as one newline-terminated text block, ready to be
    /// written verbatim to a file.
    pub fn emit(&self, program: &[MotionPrimitive]) -> EngraveResult<String> {
        let mut text = self.emit_lines(program)?.join("\n");
        text.push('\n');
        Ok(text)
    }

    fn arc_line(
        &self,
        word: &str,
        from: Point,
        to: Point,
        center: Point,
        decimals: usize,
        feed: &str,
    ) -> EngraveResult<String> {
        Ok(format!(
            "{} X{} Y{} I{} J{} F{}",
            word,
            coord("X", to.x, decimals)?,
            coord("Y", to.y, decimals)?,
            coord("I", center.x - from.x, decimals)?,
            coord("J", center.y - from.y, decimals)?,
            feed
        ))
    }
}

/// Fixed-point formatting with the non-finite guard. Every number in the
/// output text passes through here.
fn coord(word: &'static str, value: f64, decimals: usize) -> EngraveResult<String> {
    if !value.is_finite() {
        return Err(EngraveError::NumericFault { word, value });
    }
    Ok(format!("{value:.decimals$}"))
}
