//! Biarc approximation of cubic Bezier segments.
//!
//! A biarc is a pair of circular arcs joined with a common tangent. The fit
//! matches the cubic's endpoint tangents, places the join point with the
//! classic equal-tangent-length construction, and verifies the curve stays
//! within a deviation tolerance. Where a fit is rejected the segment is
//! split at t = 0.5 and each half retried; at the subdivision budget the
//! remainder degrades to a straight move. Fitting therefore never fails,
//! it only gets coarser.

use beamkit_core::{CubicBezier, Point};
use std::f64::consts::TAU;

/// Unit tangents whose cross product is below this count as parallel.
const PARALLEL_EPS: f64 = 1e-6;
/// Chords shorter than this are not worth an arc construction.
const MIN_CHORD: f64 = 1e-9;
/// Arcs flatter than this radius are emitted as lines; a G2/G3 word with a
/// huge I/J offset loses all precision at the controller.
const MAX_ARC_RADIUS: f64 = 1.0e5;
/// Interior parameters sampled by the deviation check (t = i/(N+1)).
const DEVIATION_SAMPLES: u32 = 63;
/// Accepted fits must sit comfortably inside the tolerance; the deviation
/// check is sampled, not exact.
const ACCEPT_FRACTION: f64 = 0.85;

/// One element of a fitted approximation, in the same coordinate space as
/// the input curve. The start point is implicit: the previous element's
/// endpoint (or the curve start for the first element).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FittedSegment {
    Line {
        end: Point,
    },
    Arc {
        end: Point,
        center: Point,
        clockwise: bool,
    },
}

impl FittedSegment {
    pub fn end(&self) -> Point {
        match *self {
            FittedSegment::Line { end } => end,
            FittedSegment::Arc { end, .. } => end,
        }
    }
}

/// Biarc fitter with a deviation tolerance and a subdivision budget.
#[derive(Debug, Clone)]
pub struct BiarcFitter {
    tolerance: f64,
    max_depth: u32,
}

impl BiarcFitter {
    pub fn new(tolerance: f64, max_depth: u32) -> Self {
        debug_assert!(tolerance.is_finite() && tolerance > 0.0);
        Self {
            tolerance,
            max_depth,
        }
    }

    /// Approximate `curve` with arcs and lines, always producing at least
    /// one segment whose chain ends exactly on `curve.end`.
    ///
    /// Subdivision uses an explicit work stack with a depth counter, so the
    /// budget is enforced without relying on call-stack limits. The right
    /// half is pushed first so the left half is emitted first and output
    /// order follows the curve parameter.
    pub fn fit(&self, curve: &CubicBezier) -> Vec<FittedSegment> {
        let mut out = Vec::new();
        let mut stack: Vec<(CubicBezier, u32)> = vec![(*curve, 0)];

        while let Some((seg, depth)) = stack.pop() {
            if depth >= self.max_depth || self.nearly_straight(&seg) {
                out.push(FittedSegment::Line { end: seg.end });
                continue;
            }
            match self.try_fit(&seg) {
                Some(fitted) => out.extend(fitted),
                None => {
                    let (left, right) = seg.split(0.5);
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }

        coalesce_arcs(out, curve.start)
    }

    /// Flatness test on the control polygon. The curve lies inside the
    /// convex hull of its control points, so when both inner controls sit
    /// within tolerance of the chord the chord itself is a valid fit.
    fn nearly_straight(&self, seg: &CubicBezier) -> bool {
        let chord = seg.chord();
        let len = chord.length();
        if len < MIN_CHORD {
            return seg.ctrl1.distance_to(seg.start) <= self.tolerance * ACCEPT_FRACTION
                && seg.ctrl2.distance_to(seg.start) <= self.tolerance * ACCEPT_FRACTION;
        }
        let dir = chord / len;
        for ctrl in [seg.ctrl1, seg.ctrl2] {
            let rel = ctrl - seg.start;
            let perp = dir.cross(rel).abs();
            let along = dir.dot(rel);
            if perp > self.tolerance * ACCEPT_FRACTION || along < 0.0 || along > len {
                return false;
            }
        }
        true
    }

    /// Construct a biarc (or its single-arc / line degenerations) for one
    /// segment and accept it only if the sampled deviation is inside the
    /// tolerance.
    fn try_fit(&self, seg: &CubicBezier) -> Option<Vec<FittedSegment>> {
        let chord = seg.chord();
        let chord_len = chord.length();
        if chord_len < MIN_CHORD {
            // Loop-back curve: halving separates the lobes.
            return None;
        }

        let t0 = seg.tangent_at(0.0);
        let t1 = seg.tangent_at(1.0);
        let cross01 = t0.cross(t1);
        let dot01 = t0.dot(t1);

        let candidate = if cross01.abs() < PARALLEL_EPS && dot01 > 0.0 {
            // Parallel same-direction tangents: a single arc, or a straight
            // move when the chord is aligned with them too.
            if (t0.cross(chord) / chord_len).abs() < PARALLEL_EPS {
                vec![FittedSegment::Line { end: seg.end }]
            } else {
                vec![arc_or_line(seg.start, t0, seg.end)]
            }
        } else {
            // Equal-tangent-length construction: solve |v - d(t0+t1)| = 2d
            // for d, then join the arcs at the midpoint of the two tangent
            // segment tips.
            let tsum = t0 + t1;
            let a = 2.0 * (dot01 - 1.0);
            let vt = chord.dot(tsum);
            let vv = chord.dot(chord);
            let d = if a.abs() < 1e-12 {
                if vt.abs() < 1e-12 {
                    return None;
                }
                vv / (2.0 * vt)
            } else {
                let disc = 4.0 * vt * vt - 4.0 * a * vv;
                if disc < 0.0 {
                    return None;
                }
                let sq = disc.sqrt();
                let r1 = (2.0 * vt + sq) / (2.0 * a);
                let r2 = (2.0 * vt - sq) / (2.0 * a);
                match (r1 > MIN_CHORD, r2 > MIN_CHORD) {
                    (true, true) => r1.min(r2),
                    (true, false) => r1,
                    (false, true) => r2,
                    _ => return None,
                }
            };
            if !d.is_finite() || d <= MIN_CHORD {
                return None;
            }
            let join = ((seg.start + t0 * d) + (seg.end - t1 * d)) * 0.5;
            if join.distance_to(seg.start) < MIN_CHORD || join.distance_to(seg.end) < MIN_CHORD {
                return None;
            }
            vec![
                arc_or_line(seg.start, t0, join),
                arc_or_line_to(seg.end, t1, join),
            ]
        };

        if max_deviation(seg, &candidate) <= self.tolerance * ACCEPT_FRACTION {
            Some(candidate)
        } else {
            None
        }
    }
}

/// Arc starting at `from` moving along `tangent` and ending at `to`;
/// degrades to a line when `to` sits on the tangent line or the radius
/// blows up.
fn arc_or_line(from: Point, tangent: Point, to: Point) -> FittedSegment {
    match arc_through(from, tangent, to) {
        Some((center, clockwise)) if center.distance_to(from) <= MAX_ARC_RADIUS => {
            FittedSegment::Arc {
                end: to,
                center,
                clockwise,
            }
        }
        _ => FittedSegment::Line { end: to },
    }
}

/// Arc starting at `from` and ending at `to`, leaving `to` along
/// `end_tangent`. Mirror of [`arc_or_line`] for the second half of a biarc.
fn arc_or_line_to(to: Point, end_tangent: Point, from: Point) -> FittedSegment {
    match arc_through(to, end_tangent, from) {
        Some((center, clockwise)) if center.distance_to(to) <= MAX_ARC_RADIUS => {
            FittedSegment::Arc {
                end: to,
                center,
                clockwise,
            }
        }
        _ => FittedSegment::Line { end: to },
    }
}

/// Center and sense of the circle tangent to `tangent` at `p` that passes
/// through `q`: the intersection of the normal at `p` with the
/// perpendicular bisector of pq. `None` when `q` lies on the tangent line.
fn arc_through(p: Point, tangent: Point, q: Point) -> Option<(Point, bool)> {
    let n = tangent.perp();
    let w = q - p;
    let offset = n.dot(w);
    if offset.abs() < 1e-9 * w.length().max(1e-12) {
        return None;
    }
    let r = w.dot(w) / (2.0 * offset);
    let center = p + n * r;
    let clockwise = (p - center).cross(tangent) < 0.0;
    Some((center, clockwise))
}

/// Largest sampled distance from `curve` to the chained `segments`, which
/// start at `curve.start`. Each sample measures to the nearest segment.
pub fn max_deviation(curve: &CubicBezier, segments: &[FittedSegment]) -> f64 {
    let mut max_dev = 0.0f64;
    for i in 1..=DEVIATION_SAMPLES {
        let t = f64::from(i) / f64::from(DEVIATION_SAMPLES + 1);
        let p = curve.point_at(t);
        let mut best = f64::INFINITY;
        let mut seg_start = curve.start;
        for seg in segments {
            let dist = match *seg {
                FittedSegment::Line { end } => point_segment_distance(p, seg_start, end),
                FittedSegment::Arc {
                    end,
                    center,
                    clockwise,
                } => point_arc_distance(p, seg_start, end, center, clockwise),
            };
            best = best.min(dist);
            seg_start = seg.end();
        }
        max_dev = max_dev.max(best);
    }
    max_dev
}

fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 < 1e-24 {
        return p.distance_to(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance_to(a + ab * t)
}

fn point_arc_distance(p: Point, start: Point, end: Point, center: Point, clockwise: bool) -> f64 {
    let radius = start.distance_to(center);
    let a0 = angle_of(start - center);
    let a1 = angle_of(end - center);
    let phi = angle_of(p - center);
    let (sweep, delta) = if clockwise {
        (wrap_tau(a0 - a1), wrap_tau(a0 - phi))
    } else {
        (wrap_tau(a1 - a0), wrap_tau(phi - a0))
    };
    if delta <= sweep {
        (p.distance_to(center) - radius).abs()
    } else {
        p.distance_to(start).min(p.distance_to(end))
    }
}

fn angle_of(v: Point) -> f64 {
    v.y.atan2(v.x)
}

fn wrap_tau(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Signed-direction sweep of an arc, in (0, 2pi).
fn arc_sweep(start: Point, end: Point, center: Point, clockwise: bool) -> f64 {
    let a0 = angle_of(start - center);
    let a1 = angle_of(end - center);
    if clockwise {
        wrap_tau(a0 - a1)
    } else {
        wrap_tau(a1 - a0)
    }
}

/// Merge consecutive arcs that lie on the same circle with the same sense,
/// as a tangent-joined biarc whose halves share one center does (a quarter
/// circle fits as two 45 degree arcs that are really one 90 degree arc).
/// Merging stops short of a full turn so the endpoints keep describing the
/// path unambiguously.
fn coalesce_arcs(segments: Vec<FittedSegment>, chain_start: Point) -> Vec<FittedSegment> {
    let mut out: Vec<FittedSegment> = Vec::with_capacity(segments.len());
    let mut start = chain_start;
    let mut out_start = chain_start;

    for seg in segments {
        let prev = match out.last() {
            Some(&FittedSegment::Arc {
                end,
                center,
                clockwise,
            }) => Some((end, center, clockwise)),
            _ => None,
        };

        let mut merged = false;
        if let (
            Some((prev_end, prev_center, prev_cw)),
            FittedSegment::Arc {
                end,
                center,
                clockwise,
            },
        ) = (prev, seg)
        {
            let radius = out_start.distance_to(prev_center);
            let eps = 1e-6 * (1.0 + radius);
            let same_circle = prev_center.distance_to(center) <= eps
                && (start.distance_to(center) - radius).abs() <= eps;
            if clockwise == prev_cw && same_circle {
                let first = arc_sweep(out_start, prev_end, prev_center, prev_cw);
                let second = arc_sweep(start, end, center, clockwise);
                let total = arc_sweep(out_start, end, prev_center, prev_cw);
                if first + second < TAU - 1e-3 && (total - (first + second)).abs() < 1e-3 {
                    if let Some(FittedSegment::Arc { end: last_end, .. }) = out.last_mut() {
                        *last_end = end;
                    }
                    merged = true;
                }
            }
        }
        if !merged {
            out_start = start;
            out.push(seg);
        }
        start = seg.end();
    }
    out
}
