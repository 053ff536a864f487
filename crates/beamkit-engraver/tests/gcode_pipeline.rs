//! End-to-end pipeline tests: orientation points + subpaths + parameters in,
//! program text out.

use beamkit_core::{CubicBezier, Point, Subpath, Units};
use beamkit_engraver::{
    CurveMode, EngraveError, EngraveJob, EngraveParameters, OrientationPoint,
};

fn identity_orientation() -> Vec<OrientationPoint> {
    vec![
        OrientationPoint::new(1, Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
        OrientationPoint::new(2, Point::new(100.0, 0.0), Point::new(100.0, 0.0)),
    ]
}

fn line_subpath(from: Point, to: Point) -> Subpath {
    Subpath::new(vec![CubicBezier::line(from, to)], false)
}

#[test]
fn test_single_line_polyline_program() {
    // Identity-like 2-point orientation, one straight subpath, N = 1.
    let job = EngraveJob::new(
        identity_orientation(),
        vec![line_subpath(Point::new(0.0, 0.0), Point::new(100.0, 0.0))],
        EngraveParameters {
            polyline_segments: 1,
            ..EngraveParameters::default()
        },
    );

    let lines = job.generate_lines().unwrap();
    assert_eq!(
        lines,
        vec![
            "G21",
            "G90",
            "G0 X0.000 Y0.000",
            "G1 X100.000 Y0.000 F600",
            "M2",
        ]
    );
}

#[test]
fn test_quarter_circle_biarc_is_one_arc_word() {
    // One cubic approximating a quarter circle; with a 0.01mm tolerance the
    // biarc halves land on the same circle and merge, so the program
    // contains exactly one arc word and no cutting lines.
    let r = 10.0;
    let k = 0.552_284_749_830_793_4 * r;
    let quarter = CubicBezier::new(
        Point::new(r, 0.0),
        Point::new(r, k),
        Point::new(k, r),
        Point::new(0.0, r),
    );
    let job = EngraveJob::new(
        identity_orientation(),
        vec![Subpath::new(vec![quarter], false)],
        EngraveParameters {
            curve_mode: CurveMode::Biarc,
            arc_tolerance: 0.01,
            ..EngraveParameters::default()
        },
    );

    let lines = job.generate_lines().unwrap();
    let arc_lines: Vec<&String> = lines
        .iter()
        .filter(|l| l.starts_with("G2 ") || l.starts_with("G3 "))
        .collect();
    assert_eq!(arc_lines.len(), 1, "program was: {lines:#?}");
    assert!(arc_lines[0].starts_with("G3 X0.000 Y10.000"));
    assert!(!lines.iter().any(|l| l.starts_with("G1 ")));
}

#[test]
fn test_subpath_order_and_count_preserved() {
    let subpaths: Vec<Subpath> = (0..4)
        .map(|i| {
            let x = f64::from(i) * 25.0;
            line_subpath(Point::new(x, 5.0), Point::new(x + 10.0, 5.0))
        })
        .collect();
    let job = EngraveJob::new(
        identity_orientation(),
        subpaths,
        EngraveParameters {
            polyline_segments: 2,
            ..EngraveParameters::default()
        },
    );

    let lines = job.generate_lines().unwrap();
    let rapids: Vec<&String> = lines.iter().filter(|l| l.starts_with("G0 ")).collect();
    assert_eq!(rapids.len(), 4);
    assert_eq!(rapids[0], "G0 X0.000 Y5.000");
    assert_eq!(rapids[1], "G0 X25.000 Y5.000");
    assert_eq!(rapids[2], "G0 X50.000 Y5.000");
    assert_eq!(rapids[3], "G0 X75.000 Y5.000");
}

#[test]
fn test_three_point_orientation_flips_y() {
    // Document origin top-left (Y down), machine origin bottom-left (Y up),
    // page height 100. The flip comes entirely from the point placement.
    let orientation = vec![
        OrientationPoint::new(1, Point::new(0.0, 0.0), Point::new(0.0, 100.0)),
        OrientationPoint::new(2, Point::new(100.0, 0.0), Point::new(100.0, 100.0)),
        OrientationPoint::new(3, Point::new(0.0, 100.0), Point::new(0.0, 0.0)),
    ];
    let job = EngraveJob::new(
        orientation,
        vec![line_subpath(Point::new(10.0, 10.0), Point::new(20.0, 10.0))],
        EngraveParameters {
            polyline_segments: 1,
            ..EngraveParameters::default()
        },
    );

    let lines = job.generate_lines().unwrap();
    assert_eq!(lines[2], "G0 X10.000 Y90.000");
    assert_eq!(lines[3], "G1 X20.000 Y90.000 F600");
}

#[test]
fn test_inch_units_select_g20() {
    let job = EngraveJob::new(
        identity_orientation(),
        vec![line_subpath(Point::new(0.0, 0.0), Point::new(1.0, 0.0))],
        EngraveParameters {
            units: Units::Inch,
            polyline_segments: 1,
            ..EngraveParameters::default()
        },
    );
    let lines = job.generate_lines().unwrap();
    assert_eq!(lines[0], "G20");
    assert_eq!(lines[2], "G0 X0.0000 Y0.0000");
}

#[test]
fn test_pipeline_is_deterministic() {
    let wavy = CubicBezier::new(
        Point::new(0.0, 0.0),
        Point::new(10.0, 40.0),
        Point::new(30.0, -40.0),
        Point::new(40.0, 0.0),
    );
    let job = EngraveJob::new(
        identity_orientation(),
        vec![
            Subpath::new(vec![wavy], false),
            line_subpath(Point::new(50.0, 0.0), Point::new(60.0, 0.0)),
        ],
        EngraveParameters {
            curve_mode: CurveMode::Biarc,
            arc_tolerance: 0.05,
            ..EngraveParameters::default()
        },
    );

    let first = job.generate().unwrap();
    let second = job.generate().unwrap();
    assert_eq!(first, second);
    assert!(first.ends_with("M2\n"));
}

#[test]
fn test_degenerate_orientation_aborts_job() {
    let orientation = vec![
        OrientationPoint::new(1, Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
        OrientationPoint::new(2, Point::new(1e-10, 0.0), Point::new(100.0, 0.0)),
    ];
    let job = EngraveJob::new(
        orientation,
        vec![line_subpath(Point::new(0.0, 0.0), Point::new(10.0, 0.0))],
        EngraveParameters::default(),
    );
    assert!(matches!(
        job.generate(),
        Err(EngraveError::DegenerateOrientation { .. })
    ));
}

#[test]
fn test_single_orientation_point_aborts_job() {
    let job = EngraveJob::new(
        vec![OrientationPoint::new(
            1,
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        )],
        vec![line_subpath(Point::new(0.0, 0.0), Point::new(10.0, 0.0))],
        EngraveParameters::default(),
    );
    assert_eq!(
        job.generate().unwrap_err(),
        EngraveError::InsufficientOrientation { count: 1 }
    );
}

#[test]
fn test_discontinuous_subpath_aborts_job() {
    let broken = Subpath::new(
        vec![
            CubicBezier::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            CubicBezier::line(Point::new(10.0, 2.0), Point::new(20.0, 0.0)),
        ],
        false,
    );
    let job = EngraveJob::new(
        identity_orientation(),
        vec![broken],
        EngraveParameters::default(),
    );
    assert_eq!(
        job.generate().unwrap_err(),
        EngraveError::InvalidSubpath {
            subpath: 0,
            segment: 1
        }
    );
}

#[test]
fn test_invalid_parameters_abort_before_solving() {
    let job = EngraveJob::new(
        // Orientation is degenerate too, but parameter validation runs
        // first and wins.
        vec![],
        vec![],
        EngraveParameters {
            feed_rate: -1.0,
            ..EngraveParameters::default()
        },
    );
    assert!(matches!(
        job.generate(),
        Err(EngraveError::Parameter(_))
    ));
}

#[test]
fn test_closed_subpath_not_auto_closed() {
    // A closed triangle-ish subpath of three straight cubics: the emitter
    // must not append an extra closing move beyond the chain itself.
    let a = Point::new(0.0, 0.0);
    let b = Point::new(10.0, 0.0);
    let c = Point::new(5.0, 8.0);
    let closed = Subpath::new(
        vec![
            CubicBezier::line(a, b),
            CubicBezier::line(b, c),
            CubicBezier::line(c, a),
        ],
        true,
    );
    let job = EngraveJob::new(
        identity_orientation(),
        vec![closed],
        EngraveParameters {
            polyline_segments: 1,
            ..EngraveParameters::default()
        },
    );
    let lines = job.generate_lines().unwrap();
    // Preamble (2) + rapid + 3 cutting moves + postamble.
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[5], "G1 X0.000 Y0.000 F600");
}

#[test]
fn test_job_roundtrips_through_json() {
    let job = EngraveJob::new(
        identity_orientation(),
        vec![line_subpath(Point::new(0.0, 0.0), Point::new(10.0, 0.0))],
        EngraveParameters {
            curve_mode: CurveMode::Biarc,
            ..EngraveParameters::default()
        },
    );
    let json = serde_json::to_string(&job).unwrap();
    let back: EngraveJob = serde_json::from_str(&json).unwrap();
    assert_eq!(back, job);
    assert_eq!(back.generate().unwrap(), job.generate().unwrap());
}
