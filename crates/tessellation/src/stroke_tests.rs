use crate::geom::math::Transform;
use crate::geom::{Box2D, Fixed, Line, Point};
use crate::path::Path;
use crate::traps::Traps;
use crate::{
    stroke_polygon_to_traps, stroke_rectilinear_to_boxes, Antialias, Boxes, LineCap, LineJoin,
    StrokeStyle, TessellationError,
};

fn fx(v: f64) -> Fixed {
    Fixed::from_f64(v)
}

fn style(width: f64) -> StrokeStyle {
    let mut style = StrokeStyle::default();
    style.line_width = width;
    style
}

fn stroke(path: &Path, style: &StrokeStyle) -> Traps {
    stroke_with_ctm(path, style, &Transform::identity())
}

fn stroke_with_ctm(path: &Path, style: &StrokeStyle, ctm: &Transform) -> Traps {
    let ctm_inverse = ctm.inverse().unwrap();
    let mut traps = Traps::new();
    stroke_polygon_to_traps(path, style, ctm, &ctm_inverse, 0.1, &mut traps).unwrap();
    traps
}

fn trap_area(traps: &Traps) -> f64 {
    let mut area = 0.0;
    for t in traps.traps() {
        let top = t.top.to_f64();
        let bot = t.bottom.to_f64();
        let x = |line: &Line, y: f64| -> f64 {
            let p1 = line.p1.to_f64();
            let p2 = line.p2.to_f64();
            p1.x + (y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y)
        };
        let w_top = x(&t.right, top) - x(&t.left, top);
        let w_bot = x(&t.right, bot) - x(&t.left, bot);
        area += 0.5 * (w_top + w_bot) * (bot - top);
    }
    area
}

fn boxes_contain(boxes: &Boxes, x: f64, y: f64) -> bool {
    boxes.boxes().iter().any(|b| {
        b.p1.x.to_f64() <= x && x <= b.p2.x.to_f64() && b.p1.y.to_f64() <= y && y <= b.p2.y.to_f64()
    })
}

#[test]
fn s4_axis_aligned_butt_stroke() {
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.line_to(fx(10.0), fx(0.0));

    let mut boxes = Boxes::new();
    stroke_rectilinear_to_boxes(
        &path,
        &style(2.0),
        &Transform::identity(),
        Antialias::Default,
        &mut boxes,
    )
    .unwrap();

    assert_eq!(
        boxes.boxes(),
        &[Box2D::canonical(
            &Point::new(fx(0.0), fx(-1.0)),
            &Point::new(fx(10.0), fx(1.0)),
        )]
    );
}

#[test]
fn s6_dashed_rectilinear_stroke() {
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.line_to(fx(10.0), fx(0.0));

    let mut dashed = style(2.0);
    dashed.dash = vec![2.0, 2.0];
    dashed.dash_offset = 0.0;

    let mut boxes = Boxes::new();
    stroke_rectilinear_to_boxes(
        &path,
        &dashed,
        &Transform::identity(),
        Antialias::Default,
        &mut boxes,
    )
    .unwrap();

    let expected: Vec<Box2D> = [(0.0, 2.0), (4.0, 6.0), (8.0, 10.0)]
        .iter()
        .map(|&(x1, x2)| {
            Box2D::canonical(&Point::new(fx(x1), fx(-1.0)), &Point::new(fx(x2), fx(1.0)))
        })
        .collect();
    assert_eq!(boxes.boxes(), &expected[..]);
}

#[test]
fn s5_cubic_stroke_follows_the_curve() {
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.curve_to(fx(3.0), fx(0.0), fx(3.0), fx(3.0), fx(0.0), fx(3.0));

    let mut s = style(1.0);
    s.line_cap = LineCap::Round;
    s.line_join = LineJoin::Miter;

    let ctm = Transform::identity();
    let ctm_inverse = ctm.inverse().unwrap();
    let mut traps = Traps::new();
    stroke_polygon_to_traps(&path, &s, &ctm, &ctm_inverse, 0.25, &mut traps).unwrap();

    // Every point of the true curve lies inside the stroke.
    let sample = |t: f64| -> (f64, f64) {
        let omt = 1.0 - t;
        let x = 3.0 * t * omt * omt * 3.0 + 3.0 * t * t * omt * 3.0;
        let y = 3.0 * t * t * omt * 3.0 + t * t * t * 3.0;
        (x, y)
    };
    for i in 0..=20 {
        let (x, y) = sample(i as f64 / 20.0);
        assert!(traps.contains(x, y), "curve point ({}, {}) uncovered", x, y);
    }

    // Points well clear of the offset band are not covered: the stroke
    // reaches at most half a line width plus the tolerance from the curve.
    assert!(!traps.contains(1.0, 1.5));
    assert!(!traps.contains(3.4, 1.5));
    assert!(!traps.contains(0.0, -1.0));

    // The round leading cap covers behind the start point.
    assert!(traps.contains(-0.4, 0.0));
    assert!(!traps.contains(-0.9, 0.0));
}

#[test]
fn rectilinear_stroker_matches_general_stroker() {
    let mut path = Path::new();
    path.move_to(fx(1.0), fx(1.0));
    path.line_to(fx(6.0), fx(1.0));
    path.line_to(fx(6.0), fx(5.0));

    let s = style(2.0);

    let mut boxes = Boxes::new();
    stroke_rectilinear_to_boxes(
        &path,
        &s,
        &Transform::identity(),
        Antialias::Default,
        &mut boxes,
    )
    .unwrap();

    let traps = stroke(&path, &s);

    for iy in -1..8 {
        for ix in -1..9 {
            let x = ix as f64 + 0.37;
            let y = iy as f64 + 0.41;
            assert_eq!(
                boxes_contain(&boxes, x, y),
                traps.contains(x, y),
                "strokers disagree at ({}, {})",
                x,
                y
            );
        }
    }
}

#[test]
fn rectilinear_stroker_rejects_unsupported_styles() {
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.line_to(fx(4.0), fx(0.0));

    let ctm = Transform::identity();

    let mut round = style(2.0);
    round.line_cap = LineCap::Round;
    let mut boxes = Boxes::new();
    assert_eq!(
        stroke_rectilinear_to_boxes(&path, &round, &ctm, Antialias::Default, &mut boxes),
        Err(TessellationError::Unsupported)
    );

    let mut bevel = style(2.0);
    bevel.line_join = LineJoin::Bevel;
    assert_eq!(
        stroke_rectilinear_to_boxes(&path, &bevel, &ctm, Antialias::Default, &mut boxes),
        Err(TessellationError::Unsupported)
    );

    let rotated = Transform::rotation(crate::geom::math::euclid::Angle::degrees(30.0));
    assert_eq!(
        stroke_rectilinear_to_boxes(&path, &style(2.0), &rotated, Antialias::Default, &mut boxes),
        Err(TessellationError::Unsupported)
    );
}

#[test]
fn stroked_box_fast_path() {
    let mut path = Path::new();
    path.move_to(fx(1.0), fx(1.0));
    path.line_to(fx(5.0), fx(1.0));
    path.line_to(fx(5.0), fx(4.0));
    path.line_to(fx(1.0), fx(4.0));
    path.close();

    let mut boxes = Boxes::new();
    stroke_rectilinear_to_boxes(
        &path,
        &style(1.0),
        &Transform::identity(),
        Antialias::Default,
        &mut boxes,
    )
    .unwrap();

    // Four side rectangles of half-line thickness.
    assert_eq!(boxes.len(), 4);
    let expected = (5.0 * 1.0) * 2.0 + (2.0 * 1.0) * 2.0;
    let area: f64 = boxes
        .boxes()
        .iter()
        .map(|b| (b.p2.x - b.p1.x).to_f64() * (b.p2.y - b.p1.y).to_f64())
        .sum();
    assert!((area - expected).abs() < 1e-9);

    // The frame surrounds an empty interior.
    assert!(boxes_contain(&boxes, 3.0, 1.2));
    assert!(!boxes_contain(&boxes, 3.0, 2.5));

    // And matches the general stroker.
    let traps = stroke(&path, &style(1.0));
    for iy in 0..6 {
        for ix in 0..7 {
            let x = ix as f64 + 0.37;
            let y = iy as f64 + 0.41;
            assert_eq!(
                boxes_contain(&boxes, x, y),
                traps.contains(x, y),
                "disagree at ({}, {})",
                x,
                y
            );
        }
    }
}

#[test]
fn butt_and_square_caps() {
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.line_to(fx(4.0), fx(0.0));

    let butt = stroke(&path, &style(2.0));
    assert!(butt.contains(2.0, 0.5));
    assert!(!butt.contains(-0.5, 0.0));
    assert!((trap_area(&butt) - 8.0).abs() < 1e-6);

    let mut sq = style(2.0);
    sq.line_cap = LineCap::Square;
    let square = stroke(&path, &sq);
    // Square caps extend half the line width beyond both endpoints.
    assert!(square.contains(-0.8, 0.0));
    assert!(square.contains(4.8, 0.0));
    assert!(!square.contains(-1.2, 0.0));
    assert!((trap_area(&square) - 12.0).abs() < 1e-6);
}

#[test]
fn round_cap_dot() {
    // A subpath reduced to a single point strokes as a dot under round
    // caps, and disappears under butt caps.
    let mut path = Path::new();
    path.move_to(fx(2.0), fx(2.0));
    path.line_to(fx(2.0), fx(2.0));

    let mut round = style(2.0);
    round.line_cap = LineCap::Round;
    let dot = stroke(&path, &round);
    assert!(dot.contains(2.0, 2.0));
    assert!(dot.contains(2.6, 2.0));
    assert!(!dot.contains(3.2, 2.0));

    let butt = stroke(&path, &style(2.0));
    assert!(butt.is_empty());
}

#[test]
fn miter_limit_downgrades_to_bevel() {
    // Two segments meeting at an acute angle; within the limit the miter
    // spike extends well past the corner, beyond it the join is beveled.
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.line_to(fx(4.0), fx(0.0));
    path.line_to(fx(0.0), fx(1.0));

    let mut mitered = style(0.5);
    mitered.miter_limit = 10.0;
    let mut beveled = style(0.5);
    beveled.miter_limit = 1.5;

    let miter_traps = stroke(&path, &mitered);
    let bevel_traps = stroke(&path, &beveled);

    assert!(trap_area(&miter_traps) > trap_area(&bevel_traps) + 0.05);

    // The spike reaches right of the corner only when mitered.
    let spike = (4.7, 0.02);
    assert!(miter_traps.contains(spike.0, spike.1));
    assert!(!bevel_traps.contains(spike.0, spike.1));
}

#[test]
fn round_join_fans_the_corner() {
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.line_to(fx(4.0), fx(0.0));
    path.line_to(fx(4.0), fx(4.0));

    let mut s = style(2.0);
    s.line_join = LineJoin::Round;
    let traps = stroke(&path, &s);

    // The outer corner is rounded: a point inside the miter square but
    // outside the round join radius stays uncovered.
    assert!(traps.contains(4.0, 0.0));
    assert!(traps.contains(4.6, -0.6));
    assert!(!traps.contains(4.9, -0.9));

    let mut m = style(2.0);
    m.line_join = LineJoin::Miter;
    let mitered = stroke(&path, &m);
    assert!(mitered.contains(4.9, -0.9));
}

#[test]
fn closed_path_joins_first_and_last_segments() {
    let mut path = Path::new();
    path.move_to(fx(1.0), fx(1.0));
    path.line_to(fx(5.0), fx(1.0));
    path.line_to(fx(5.0), fx(5.0));
    path.line_to(fx(1.0), fx(5.0));
    path.close();

    let traps = stroke(&path, &style(1.0));

    // The miter join at the closing corner fills the outer square.
    assert!(traps.contains(0.7, 0.7));
    // Frame coverage: on the sides, empty in the middle.
    assert!(traps.contains(3.0, 1.2));
    assert!(!traps.contains(3.0, 3.0));

    // Area is the difference of the outer and inner rectangles.
    assert!((trap_area(&traps) - (5.0 * 5.0 - 3.0 * 3.0)).abs() < 1e-6);
}

#[test]
fn dashed_diagonal_preserves_on_length() {
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.line_to(fx(6.0), fx(8.0));

    let mut s = style(1.0);
    s.dash = vec![1.0, 1.0];
    let traps = stroke(&path, &s);

    // Length 10, half of it on, times the line width.
    assert!((trap_area(&traps) - 5.0).abs() < 0.1);
}

#[test]
fn dash_offset_shifts_pattern() {
    let mut path = Path::new();
    path.move_to(fx(0.0), fx(0.0));
    path.line_to(fx(8.0), fx(0.0));

    let mut s = style(1.0);
    s.dash = vec![2.0, 2.0];
    s.dash_offset = 2.0;

    let traps = stroke(&path, &s);
    // Starts "off": first ink appears at x = 2.
    assert!(!traps.contains(1.0, 0.0));
    assert!(traps.contains(3.0, 0.0));
    assert!(!traps.contains(5.0, 0.0));
    assert!(traps.contains(7.0, 0.0));
}

#[test]
fn stroke_scales_with_ctm() {
    // Stroking under a uniform scale matrix equals stroking the same
    // device-space path with the width scaled instead.
    let mut path = Path::new();
    path.move_to(fx(2.0), fx(2.0));
    path.line_to(fx(8.0), fx(6.0));

    let scaled_ctm = stroke_with_ctm(&path, &style(1.0), &Transform::scale(2.0, 2.0));
    let scaled_width = stroke(&path, &style(2.0));

    for iy in 0..9 {
        for ix in 0..11 {
            let x = ix as f64 + 0.37;
            let y = iy as f64 + 0.41;
            assert_eq!(
                scaled_ctm.contains(x, y),
                scaled_width.contains(x, y),
                "ctm/width scaling disagree at ({}, {})",
                x,
                y
            );
        }
    }
}

#[test]
fn empty_path_is_nothing_to_do() {
    let path = Path::new();
    let ctm = Transform::identity();
    let mut traps = Traps::new();
    assert_eq!(
        stroke_polygon_to_traps(&path, &style(1.0), &ctm, &ctm, 0.1, &mut traps),
        Err(TessellationError::NothingToDo)
    );
}
