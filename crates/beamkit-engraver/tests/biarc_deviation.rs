//! Property tests for the biarc fitter: whatever the curve, the fitted
//! chain ends where the curve ends and the curve never strays further from
//! the chain than the tolerance.
//!
//! Distances here are computed independently of the fitter's own deviation
//! check, so a bug in that check cannot hide itself.

use beamkit_core::{CubicBezier, Point};
use beamkit_engraver::{BiarcFitter, FittedSegment};
use proptest::prelude::*;

const TOLERANCE: f64 = 0.5;

fn dist_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return p.distance_to(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance_to(a + ab * t)
}

fn dist_to_arc(p: Point, start: Point, end: Point, center: Point, clockwise: bool) -> f64 {
    let tau = std::f64::consts::TAU;
    let wrap = |a: f64| {
        let r = a % tau;
        if r < 0.0 {
            r + tau
        } else {
            r
        }
    };
    let angle = |v: Point| v.y.atan2(v.x);

    let a0 = angle(start - center);
    let a1 = angle(end - center);
    let phi = angle(p - center);
    let (sweep, delta) = if clockwise {
        (wrap(a0 - a1), wrap(a0 - phi))
    } else {
        (wrap(a1 - a0), wrap(phi - a0))
    };
    if delta <= sweep {
        (p.distance_to(center) - start.distance_to(center)).abs()
    } else {
        p.distance_to(start).min(p.distance_to(end))
    }
}

fn dist_to_chain(p: Point, chain_start: Point, segments: &[FittedSegment]) -> f64 {
    let mut best = f64::INFINITY;
    let mut start = chain_start;
    for seg in segments {
        let d = match *seg {
            FittedSegment::Line { end } => dist_to_segment(p, start, end),
            FittedSegment::Arc {
                end,
                center,
                clockwise,
            } => dist_to_arc(p, start, end, center, clockwise),
        };
        best = best.min(d);
        start = seg.end();
    }
    best
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fitted_chain_stays_within_tolerance(xs in prop::array::uniform8(-50.0f64..50.0)) {
        let curve = CubicBezier::new(
            Point::new(xs[0], xs[1]),
            Point::new(xs[2], xs[3]),
            Point::new(xs[4], xs[5]),
            Point::new(xs[6], xs[7]),
        );
        let fitter = BiarcFitter::new(TOLERANCE, 8);
        let segments = fitter.fit(&curve);

        prop_assert!(!segments.is_empty());
        prop_assert!(segments.last().unwrap().end().distance_to(curve.end) < 1e-9);

        for i in 0..=100u32 {
            let t = f64::from(i) / 100.0;
            let p = curve.point_at(t);
            let d = dist_to_chain(p, curve.start, &segments);
            prop_assert!(
                d <= TOLERANCE + 1e-6,
                "deviation {} at t = {} for curve {:?}",
                d,
                t,
                curve
            );
        }
    }

    #[test]
    fn fit_is_deterministic(xs in prop::array::uniform8(-50.0f64..50.0)) {
        let curve = CubicBezier::new(
            Point::new(xs[0], xs[1]),
            Point::new(xs[2], xs[3]),
            Point::new(xs[4], xs[5]),
            Point::new(xs[6], xs[7]),
        );
        let fitter = BiarcFitter::new(TOLERANCE, 8);
        prop_assert_eq!(fitter.fit(&curve), fitter.fit(&curve));
    }
}
