//! Uniform-parameter flattening of cubic segments into polylines.
//!
//! Polyline mode trades arc support for predictability: every cubic becomes
//! exactly N straight moves sampled at t = i/N, whatever its shape. Straight
//! and degenerate curves still subdivide uniformly, and there is no failure
//! mode for finite control points.

use beamkit_core::{CubicBezier, Point};

/// Sample `curve` at t = i/N for i in 1..=N.
///
/// The returned points chain onto `curve.start`; the last one is exactly
/// `curve.end` (the Bernstein evaluation at t = 1 has no rounding).
pub fn flatten_cubic(curve: &CubicBezier, segments: u32) -> Vec<Point> {
    let n = segments.max(1);
    (1..=n)
        .map(|i| curve.point_at(f64::from(i) / f64::from(n)))
        .collect()
}
