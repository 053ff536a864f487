//! Planar geometry primitives.
//!
//! Everything here is plain cartesian `f64` data. Which coordinate space a
//! value lives in (document vs. machine) is a property of the container
//! holding it: subpath geometry arrives in document space, motion primitives
//! are machine space, and the orientation transform is the only bridge
//! between the two.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 2D point, also used as a vector where the distinction does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product.
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product; positive when `other` lies
    /// counter-clockwise of `self`.
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for (near-)zero vectors.
    pub fn normalized(self) -> Option<Point> {
        let len = self.length();
        if len > 1e-12 {
            Some(self / len)
        } else {
            None
        }
    }

    /// 90 degree counter-clockwise rotation.
    pub fn perp(self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// A cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub end: Point,
}

impl CubicBezier {
    pub fn new(start: Point, ctrl1: Point, ctrl2: Point, end: Point) -> Self {
        Self {
            start,
            ctrl1,
            ctrl2,
            end,
        }
    }

    /// A straight segment expressed as a cubic (control points on the chord).
    pub fn line(start: Point, end: Point) -> Self {
        Self {
            start,
            ctrl1: start.lerp(end, 1.0 / 3.0),
            ctrl2: start.lerp(end, 2.0 / 3.0),
            end,
        }
    }

    /// Evaluate at parameter `t` using the Bernstein basis. `t = 0` and
    /// `t = 1` return the endpoints exactly, with no rounding.
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Point::new(
            b0 * self.start.x + b1 * self.ctrl1.x + b2 * self.ctrl2.x + b3 * self.end.x,
            b0 * self.start.y + b1 * self.ctrl1.y + b2 * self.ctrl2.y + b3 * self.end.y,
        )
    }

    /// First derivative at `t`.
    pub fn derivative_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let d0 = self.ctrl1 - self.start;
        let d1 = self.ctrl2 - self.ctrl1;
        let d2 = self.end - self.ctrl2;
        (d0 * (u * u) + d1 * (2.0 * u * t) + d2 * (t * t)) * 3.0
    }

    /// Unit tangent at `t`.
    ///
    /// Falls back to the second and then third derivative when the lower one
    /// vanishes (coincident control points), and finally to +X so callers
    /// always get a usable direction.
    pub fn tangent_at(&self, t: f64) -> Point {
        if let Some(dir) = self.derivative_at(t).normalized() {
            return dir;
        }
        let d0 = self.ctrl1 - self.start;
        let d1 = self.ctrl2 - self.ctrl1;
        let d2 = self.end - self.ctrl2;
        let second = ((d1 - d0) * (1.0 - t) + (d2 - d1) * t) * 6.0;
        if let Some(dir) = second.normalized() {
            return dir;
        }
        let third = (d2 - d1 - (d1 - d0)) * 6.0;
        third.normalized().unwrap_or(Point::new(1.0, 0.0))
    }

    /// Split at `t` with de Casteljau's construction into two cubics that
    /// share the split point.
    pub fn split(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let p01 = self.start.lerp(self.ctrl1, t);
        let p12 = self.ctrl1.lerp(self.ctrl2, t);
        let p23 = self.ctrl2.lerp(self.end, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let mid = p012.lerp(p123, t);
        (
            CubicBezier::new(self.start, p01, p012, mid),
            CubicBezier::new(mid, p123, p23, self.end),
        )
    }

    /// Vector from start to end.
    pub fn chord(&self) -> Point {
        self.end - self.start
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite()
            && self.ctrl1.is_finite()
            && self.ctrl2.is_finite()
            && self.end.is_finite()
    }
}

/// An ordered chain of cubic segments.
///
/// Invariant (caller contract): each segment starts where the previous one
/// ends. The `closed` flag records that the final endpoint coincides with
/// the first start; no extra closing segment is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subpath {
    pub segments: Vec<CubicBezier>,
    #[serde(default)]
    pub closed: bool,
}

impl Subpath {
    pub fn new(segments: Vec<CubicBezier>, closed: bool) -> Self {
        Self { segments, closed }
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|s| s.start)
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|s| s.end)
    }

    /// Index of the first segment that does not start where its predecessor
    /// ends (within `tol`), or `None` when the chain is continuous.
    pub fn first_discontinuity(&self, tol: f64) -> Option<usize> {
        self.segments
            .windows(2)
            .position(|w| w[0].end.distance_to(w[1].start) > tol)
            .map(|i| i + 1)
    }

    pub fn is_finite(&self) -> bool {
        self.segments.iter().all(CubicBezier::is_finite)
    }
}
