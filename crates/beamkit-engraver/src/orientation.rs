//! Orientation points and the document-to-machine transform.
//!
//! Orientation points pair a location in the input drawing with the machine
//! coordinate it must land on. Two points fix a similarity transform
//! (uniform scale + rotation + translation); three fix a full affine with
//! independent axis scales and shear, and are preferred when available. The
//! transform is the only place where Y-flip and unit scaling happen; nothing
//! downstream hard-codes either, so correctness rests entirely on where the
//! caller placed the points.

use beamkit_core::{CubicBezier, Point};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngraveError, EngraveResult};

/// Document points closer than this count as coincident, and a three-point
/// system with a determinant below this counts as collinear.
pub const DEGENERACY_EPS: f64 = 1e-9;

/// One user-placed correspondence between document and machine space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationPoint {
    pub document: Point,
    pub machine: Point,
    /// Role of the point (1, 2 or 3). Point 1 anchors the translation in
    /// the two-point case.
    pub ordinal: u8,
}

impl OrientationPoint {
    pub fn new(ordinal: u8, document: Point, machine: Point) -> Self {
        Self {
            document,
            machine,
            ordinal,
        }
    }
}

/// Affine map from document space to machine space.
///
/// Standard 2x3 column convention:
/// `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Map a cubic through the transform. Affine maps take cubic Beziers to
    /// cubic Beziers exactly, so transforming the four control points is the
    /// whole operation.
    pub fn apply_cubic(&self, seg: &CubicBezier) -> CubicBezier {
        CubicBezier::new(
            self.apply(seg.start),
            self.apply(seg.ctrl1),
            self.apply(seg.ctrl2),
            self.apply(seg.end),
        )
    }

    /// Determinant of the linear part.
    pub fn det(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// True when the linear part is a uniform scale + rotation, optionally
    /// mirrored, i.e. when it maps circles to circles.
    pub fn is_similarity(&self, eps: f64) -> bool {
        let scale = self
            .a
            .abs()
            .max(self.b.abs())
            .max(self.c.abs())
            .max(self.d.abs())
            .max(1e-12);
        let direct = (self.a - self.d).abs() <= eps * scale && (self.b + self.c).abs() <= eps * scale;
        let mirrored =
            (self.a + self.d).abs() <= eps * scale && (self.b - self.c).abs() <= eps * scale;
        direct || mirrored
    }

    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Solve the document-to-machine transform from orientation points.
///
/// Exactly 2 points give a similarity fit anchored on point 1; exactly 3
/// give the full 6-parameter affine. Anything else is
/// [`EngraveError::InsufficientOrientation`]; coincident or collinear
/// document points are [`EngraveError::DegenerateOrientation`].
pub fn solve_orientation(points: &[OrientationPoint]) -> EngraveResult<AffineTransform> {
    if points.len() != 2 && points.len() != 3 {
        return Err(EngraveError::InsufficientOrientation {
            count: points.len(),
        });
    }

    let mut ordered: Vec<OrientationPoint> = points.to_vec();
    ordered.sort_by_key(|p| p.ordinal);

    // Coincident document points make the system singular in both cases.
    for i in 0..ordered.len() {
        for j in (i + 1)..ordered.len() {
            if ordered[i].document.distance_to(ordered[j].document) < DEGENERACY_EPS {
                return Err(degenerate("coincident", &ordered));
            }
        }
    }

    let transform = match ordered.len() {
        2 => solve_similarity(&ordered[0], &ordered[1]),
        _ => solve_affine(&ordered)?,
    };

    debug!(
        "orientation transform solved from {} points (det {:.6}, similarity: {})",
        ordered.len(),
        transform.det(),
        transform.is_similarity(1e-9)
    );
    Ok(transform)
}

fn degenerate(reason: &str, points: &[OrientationPoint]) -> EngraveError {
    EngraveError::DegenerateOrientation {
        reason: reason.to_string(),
        points: points.iter().map(|p| p.document).collect(),
    }
}

/// Two-point fit: uniform scale + rotation from the vector between the two
/// document points vs. the vector between the two machine points, with the
/// translation pinning point 1 exactly.
fn solve_similarity(p1: &OrientationPoint, p2: &OrientationPoint) -> AffineTransform {
    let dv = p2.document - p1.document;
    let mv = p2.machine - p1.machine;

    // Complex division mv / dv gives the scale-rotation (a + ib).
    let den = dv.dot(dv);
    let a = (mv.x * dv.x + mv.y * dv.y) / den;
    let b = (mv.y * dv.x - mv.x * dv.y) / den;

    let (c, d) = (-b, a);
    AffineTransform {
        a,
        b,
        c,
        d,
        tx: p1.machine.x - (a * p1.document.x + c * p1.document.y),
        ty: p1.machine.y - (b * p1.document.x + d * p1.document.y),
    }
}

/// Three-point fit: solve the two independent 3x3 systems
/// `[x y 1] * [a c tx]' = x'` and `[x y 1] * [b d ty]' = y'`.
fn solve_affine(points: &[OrientationPoint]) -> EngraveResult<AffineTransform> {
    let [p1, p2, p3] = [&points[0], &points[1], &points[2]];

    // The system determinant equals the cross product of the edge vectors;
    // collinear document points make it vanish.
    let det = (p2.document - p1.document).cross(p3.document - p1.document);
    if det.abs() < DEGENERACY_EPS {
        return Err(degenerate("collinear", points));
    }

    let m = Matrix3::new(
        p1.document.x,
        p1.document.y,
        1.0,
        p2.document.x,
        p2.document.y,
        1.0,
        p3.document.x,
        p3.document.y,
        1.0,
    );
    let lu = m.lu();

    let xs = Vector3::new(p1.machine.x, p2.machine.x, p3.machine.x);
    let ys = Vector3::new(p1.machine.y, p2.machine.y, p3.machine.y);
    let (row_x, row_y) = match (lu.solve(&xs), lu.solve(&ys)) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(degenerate("collinear", points)),
    };

    Ok(AffineTransform {
        a: row_x[0],
        c: row_x[1],
        tx: row_x[2],
        b: row_y[0],
        d: row_y[1],
        ty: row_y[2],
    })
}
