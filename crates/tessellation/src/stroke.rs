//! Expansion of a stroked path into an outline polygon (or a triangle
//! strip), handling caps, joins, dashes and spline stroking.
//!
//! At every point along the path the stroker computes a "face": the pair
//! of points offset half the line width to either side of the path along
//! the perpendicular of the tangent. Segment sides connect consecutive
//! faces, joins and caps fill the gaps between them, and a convex pen
//! supplies the vertices of every round shape.

use crate::bentley_ottmann::tessellate_polygon;
use crate::dash::StrokerDash;
use crate::error::{TessellationError, TessellationResult};
use crate::geom::math::{dvector, DVector, Transform};
use crate::geom::spline::Spline;
use crate::geom::{Box2D, Fixed, Line, Point, Slope};
use crate::path::{Path, PathInterpreter};
use crate::pen::Pen;
use crate::polygon::Polygon;
use crate::traps::Traps;
use crate::{FillRule, LineCap, LineJoin, StrokeStyle};

/// Consumer of the stroker's geometry.
///
/// A consumer either collects the outline as directed external edges
/// (`prefers_external_edges` true, the polygon path) or as filled
/// triangles, fans and quads (the shaper path). The stroker emits whichever
/// representation the consumer prefers.
pub trait StrokeOutput {
    fn prefers_external_edges(&self) -> bool;

    fn add_external_edge(&mut self, p1: &Point, p2: &Point);

    fn add_triangle(&mut self, triangle: &[Point; 3]);

    fn add_triangle_fan(&mut self, midpt: &Point, points: &[Point]);

    fn add_convex_quad(&mut self, quad: &[Point; 4]);
}

impl StrokeOutput for Polygon {
    fn prefers_external_edges(&self) -> bool {
        true
    }

    fn add_external_edge(&mut self, p1: &Point, p2: &Point) {
        Polygon::add_external_edge(self, p1, p2);
    }

    // The filled primitives contribute their boundary; stroke output is
    // always tessellated under the winding rule, where the overlapping
    // positive pieces merge.

    fn add_triangle(&mut self, triangle: &[Point; 3]) {
        Polygon::add_external_edge(self, &triangle[0], &triangle[1]);
        Polygon::add_external_edge(self, &triangle[1], &triangle[2]);
        Polygon::add_external_edge(self, &triangle[2], &triangle[0]);
    }

    fn add_triangle_fan(&mut self, midpt: &Point, points: &[Point]) {
        if points.is_empty() {
            return;
        }
        Polygon::add_external_edge(self, midpt, &points[0]);
        for w in points.windows(2) {
            Polygon::add_external_edge(self, &w[0], &w[1]);
        }
        Polygon::add_external_edge(self, points.last().unwrap(), midpt);
    }

    fn add_convex_quad(&mut self, quad: &[Point; 4]) {
        Polygon::add_external_edge(self, &quad[0], &quad[1]);
        Polygon::add_external_edge(self, &quad[1], &quad[2]);
        Polygon::add_external_edge(self, &quad[2], &quad[3]);
        Polygon::add_external_edge(self, &quad[3], &quad[0]);
    }
}

/// The stroke geometry at one point of the path: the point itself and its
/// two offsets, along with the tangent in its three forms (fixed device
/// vector, unit device vector, unit user vector).
#[derive(Copy, Clone, Debug)]
pub struct StrokeFace {
    pub ccw: Point,
    pub point: Point,
    pub cw: Point,
    pub dev_vector: Slope,
    pub dev_slope: DVector,
    pub usr_vector: DVector,
}

#[inline]
fn translate_point(point: &Point, offset: &Point) -> Point {
    Point::new(point.x + offset.x, point.y + offset.y)
}

fn join_is_clockwise(in_face: &StrokeFace, out_face: &StrokeFace) -> bool {
    let in_slope = Slope::new(&in_face.point, &in_face.cw);
    let out_slope = Slope::new(&out_face.point, &out_face.cw);
    in_slope.compare(&out_slope) < 0
}

#[inline]
fn slope_compare_sgn(dx1: f64, dy1: f64, dx2: f64, dy2: f64) -> i32 {
    let c = dx1 * dy2 - dx2 * dy1;
    if c > 0.0 {
        return 1;
    }
    if c < 0.0 {
        return -1;
    }
    0
}

/// Intersect two segments, in floating point. Touches at endpoints do not
/// count.
fn slow_segment_intersection(
    seg1_p1: &Point,
    seg1_p2: &Point,
    seg2_p1: &Point,
    seg2_p2: &Point,
) -> Option<Point> {
    let seg1_dx = (seg1_p2.x - seg1_p1.x).to_f64();
    let seg1_dy = (seg1_p2.y - seg1_p1.y).to_f64();
    let seg2_dx = (seg2_p2.x - seg2_p1.x).to_f64();
    let seg2_dy = (seg2_p2.y - seg2_p1.y).to_f64();
    let denominator = seg2_dy * seg1_dx - seg2_dx * seg1_dy;
    if denominator == 0.0 {
        return None;
    }

    let seg_start_dx = (seg1_p1.x - seg2_p1.x).to_f64();
    let seg_start_dy = (seg1_p1.y - seg2_p1.y).to_f64();
    let u_a = (seg2_dx * seg_start_dy - seg2_dy * seg_start_dx) / denominator;
    let u_b = (seg1_dx * seg_start_dy - seg1_dy * seg_start_dx) / denominator;

    if u_a <= 0.0 || u_a >= 1.0 || u_b <= 0.0 || u_b >= 1.0 {
        return None;
    }

    Some(Point::new(
        seg1_p1.x + Fixed::from_f64(u_a * seg1_dx),
        seg1_p1.y + Fixed::from_f64(u_a * seg1_dy),
    ))
}

struct Stroker<'a, O: StrokeOutput> {
    style: StrokeStyle,

    ctm: &'a Transform,
    ctm_inverse: &'a Transform,
    half_line_width: f64,
    tolerance: f64,
    spline_cusp_tolerance: f64,
    ctm_det_positive: bool,

    output: &'a mut O,

    pen: Pen,

    current_point: Point,
    first_point: Point,

    has_initial_sub_path: bool,

    current_face: Option<StrokeFace>,
    first_face: Option<StrokeFace>,

    dash: StrokerDash,

    bounds: Option<Box2D>,
}

impl<'a, O: StrokeOutput> Stroker<'a, O> {
    fn new(
        path: &Path,
        style: &StrokeStyle,
        ctm: &'a Transform,
        ctm_inverse: &'a Transform,
        tolerance: f64,
        limits: &[Box2D],
        output: &'a mut O,
    ) -> Self {
        let half_line_width = style.half_line_width();

        // To decide whether two spline segments need a round join or can
        // get away with a bevel, compare the angle between them: when the
        // chord distance (half the line width times the cosine of the
        // bisection angle) sinks more than tolerance below the half line
        // width, a fan point must be injected.
        let mut spline_cusp_tolerance = 1.0 - tolerance / half_line_width;
        spline_cusp_tolerance *= spline_cusp_tolerance;
        spline_cusp_tolerance *= 2.0;
        spline_cusp_tolerance -= 1.0;
        if !(spline_cusp_tolerance >= -1.0) {
            spline_cusp_tolerance = -1.0;
        } else if spline_cusp_tolerance > 1.0 {
            spline_cusp_tolerance = 1.0;
        }

        let bounds = if limits.is_empty() {
            None
        } else {
            let mut bounds = limits[0];
            for b in &limits[1..] {
                bounds.add_box(b);
            }

            // Extend the bounds to cover every trapezoid a segment outside
            // of them could still generate inside.
            let (dx, dy) = style.max_distance_from_path(path.stroke_is_rectilinear(), ctm);
            let fdx = Fixed::from_f64(dx);
            let fdy = Fixed::from_f64(dy);
            bounds.p1.x -= fdx;
            bounds.p2.x += fdx;
            bounds.p1.y -= fdy;
            bounds.p2.y += fdy;
            Some(bounds)
        };

        Stroker {
            style: style.clone(),
            ctm,
            ctm_inverse,
            half_line_width,
            tolerance,
            spline_cusp_tolerance,
            ctm_det_positive: ctm.determinant() >= 0.0,
            output,
            pen: Pen::new(half_line_width, tolerance, ctm),
            current_point: Point::default(),
            first_point: Point::default(),
            has_initial_sub_path: false,
            current_face: None,
            first_face: None,
            dash: StrokerDash::new(style),
            bounds,
        }
    }

    /// Maps a device-space delta into user space and normalizes it.
    /// Returns the unit user vector and the user-space magnitude, or
    /// `None` for a delta that vanishes in user space.
    fn compute_normalized_slope(&self, dx: f64, dy: f64) -> Option<(f64, f64, f64)> {
        let v = self.ctm_inverse.transform_vector(dvector(dx, dy));

        if v.x == 0.0 && v.y == 0.0 {
            return None;
        }

        if v.x == 0.0 {
            if v.y > 0.0 {
                Some((0.0, 1.0, v.y))
            } else {
                Some((0.0, -1.0, -v.y))
            }
        } else if v.y == 0.0 {
            if v.x > 0.0 {
                Some((1.0, 0.0, v.x))
            } else {
                Some((-1.0, 0.0, -v.x))
            }
        } else {
            let mag = v.x.hypot(v.y);
            Some((v.x / mag, v.y / mag, mag))
        }
    }

    fn compute_face(
        &self,
        point: &Point,
        dev_slope: &Slope,
        slope_dx: f64,
        slope_dy: f64,
    ) -> StrokeFace {
        // Rotate to get a half-line-width vector along the face. The
        // rotation is by 90 degrees in user space, but must come out the
        // right way round in device space, which depends on whether the
        // matrix reflects: the sign of its determinant.
        let (face_dx, face_dy) = if self.ctm_det_positive {
            (
                -slope_dy * self.half_line_width,
                slope_dx * self.half_line_width,
            )
        } else {
            (
                slope_dy * self.half_line_width,
                -slope_dx * self.half_line_width,
            )
        };

        // Back to device space.
        let offset = self.ctm.transform_vector(dvector(face_dx, face_dy));
        let offset_ccw = Point::from_f64(offset.x, offset.y);
        let offset_cw = Point::new(-offset_ccw.x, -offset_ccw.y);

        let ddx = dev_slope.dx.to_f64();
        let ddy = dev_slope.dy.to_f64();
        let dev_mag = ddx.hypot(ddy);
        let dev_unit = if dev_mag > 0.0 {
            dvector(ddx / dev_mag, ddy / dev_mag)
        } else {
            dvector(0.0, 0.0)
        };

        StrokeFace {
            ccw: translate_point(point, &offset_ccw),
            point: *point,
            cw: translate_point(point, &offset_cw),
            dev_vector: *dev_slope,
            dev_slope: dev_unit,
            usr_vector: dvector(slope_dx, slope_dy),
        }
    }

    /// Construct a fan around `midpt` using the pen vertices between the
    /// incoming and outgoing direction vectors.
    fn tessellate_fan(
        &mut self,
        in_vector: &Slope,
        out_vector: &Slope,
        midpt: &Point,
        inpt: &Point,
        outpt: &Point,
        clockwise: bool,
    ) {
        let in_bounds = match &self.bounds {
            Some(bounds) => bounds.contains_point(midpt),
            None => true,
        };

        if in_bounds {
            debug_assert!(self.pen.num_vertices() > 0);
            let num_vertices = self.pen.num_vertices();

            if clockwise {
                let (mut start, stop) = self.pen.find_active_ccw_vertices(in_vector, out_vector);
                if self.output.prefers_external_edges() {
                    let mut last = *inpt;
                    while start != stop {
                        let p = translate_point(midpt, &self.pen.vertices()[start].point);
                        self.output.add_external_edge(&last, &p);
                        last = p;

                        start = if start == 0 { num_vertices - 1 } else { start - 1 };
                    }
                    self.output.add_external_edge(&last, outpt);
                    return;
                }

                if start != stop {
                    let mut points = Vec::with_capacity(num_vertices + 2);
                    points.push(*inpt);
                    while start != stop {
                        points.push(translate_point(midpt, &self.pen.vertices()[start].point));
                        start = if start == 0 { num_vertices - 1 } else { start - 1 };
                    }
                    points.push(*outpt);

                    self.output.add_triangle_fan(midpt, &points);
                    return;
                }
            } else {
                let (mut start, stop) = self.pen.find_active_cw_vertices(in_vector, out_vector);
                if self.output.prefers_external_edges() {
                    let mut last = *inpt;
                    while start != stop {
                        let p = translate_point(midpt, &self.pen.vertices()[start].point);
                        self.output.add_external_edge(&p, &last);
                        last = p;

                        start += 1;
                        if start == num_vertices {
                            start = 0;
                        }
                    }
                    self.output.add_external_edge(outpt, &last);
                    return;
                }

                if start != stop {
                    let mut points = Vec::with_capacity(num_vertices + 2);
                    points.push(*inpt);
                    while start != stop {
                        points.push(translate_point(midpt, &self.pen.vertices()[start].point));
                        start += 1;
                        if start == num_vertices {
                            start = 0;
                        }
                    }
                    points.push(*outpt);

                    self.output.add_triangle_fan(midpt, &points);
                    return;
                }
            }
        }

        // Ensure a leak-free connection.
        if self.output.prefers_external_edges() {
            if clockwise {
                self.output.add_external_edge(inpt, outpt);
            } else {
                self.output.add_external_edge(outpt, inpt);
            }
        } else {
            self.output.add_triangle(&[*midpt, *inpt, *outpt]);
        }
    }

    fn join(&mut self, in_face: &StrokeFace, out_face: &StrokeFace) {
        let clockwise = join_is_clockwise(out_face, in_face);

        if in_face.cw == out_face.cw && in_face.ccw == out_face.ccw {
            return;
        }

        let (inpt, outpt) = if clockwise {
            if self.output.prefers_external_edges() {
                self.output.add_external_edge(&out_face.cw, &in_face.point);
                self.output.add_external_edge(&in_face.point, &in_face.cw);
            }
            (in_face.ccw, out_face.ccw)
        } else {
            if self.output.prefers_external_edges() {
                self.output.add_external_edge(&in_face.ccw, &in_face.point);
                self.output.add_external_edge(&in_face.point, &out_face.ccw);
            }
            (in_face.cw, out_face.cw)
        };

        if self.style.line_join == LineJoin::Round {
            // Construct a fan around the common midpoint.
            return self.tessellate_fan(
                &in_face.dev_vector,
                &out_face.dev_vector,
                &in_face.point,
                &inpt,
                &outpt,
                clockwise,
            );
        }

        if self.style.line_join == LineJoin::Miter {
            // Dot product of the incoming with the outgoing slope vector.
            let in_dot_out = -in_face.usr_vector.x * out_face.usr_vector.x
                + -in_face.usr_vector.y * out_face.usr_vector.y;
            let ml = self.style.miter_limit;

            // Lines meeting at an acute angle can generate long miters;
            // the limit criterion is 1/sin(psi/2) <= ml, squared and
            // rewritten via 2 sin^2(psi/2) = 1 - cos(psi) into
            // 2 <= ml^2 (1 - in . out).
            if 2.0 <= ml * ml * (1.0 - in_dot_out) {
                // The points are in device space; the slopes still need
                // transforming from user space.
                let x1 = inpt.x.to_f64();
                let y1 = inpt.y.to_f64();
                let d1 = self.ctm.transform_vector(in_face.usr_vector);
                let (dx1, dy1) = (d1.x, d1.y);

                let x2 = outpt.x.to_f64();
                let y2 = outpt.y.to_f64();
                let d2 = self.ctm.transform_vector(out_face.usr_vector);
                let (dx2, dy2) = (d2.x, d2.y);

                // The outer miter corner is the intersection of the two
                // outer edges. Compute my directly, then mx from the edge
                // with the larger dy to avoid dividing by nearly zero.
                let my = ((x2 - x1) * dy1 * dy2 - y2 * dx2 * dy1 + y1 * dx1 * dy2)
                    / (dx1 * dy2 - dx2 * dy1);
                let mx = if dy1.abs() >= dy2.abs() {
                    (my - y1) * dx1 / dy1 + x1
                } else {
                    (my - y2) * dx2 / dy2 + x2
                };

                // When the outer edges are nearly parallel, the fixed-point
                // perturbation of the outer points can fling the computed
                // intersection far away. Only accept a miter point lying
                // between the two faces; otherwise draw a bevel.
                let ix = in_face.point.x.to_f64();
                let iy = in_face.point.y.to_f64();

                let fdx1 = x1 - ix;
                let fdy1 = y1 - iy;

                let fdx2 = x2 - ix;
                let fdy2 = y2 - iy;

                let mdx = mx - ix;
                let mdy = my - iy;

                if slope_compare_sgn(fdx1, fdy1, mdx, mdy)
                    != slope_compare_sgn(fdx2, fdy2, mdx, mdy)
                {
                    let miter_point = Point::from_f64(mx, my);
                    if self.output.prefers_external_edges() {
                        if clockwise {
                            self.output.add_external_edge(&inpt, &miter_point);
                            self.output.add_external_edge(&miter_point, &outpt);
                        } else {
                            self.output.add_external_edge(&outpt, &miter_point);
                            self.output.add_external_edge(&miter_point, &inpt);
                        }
                    } else {
                        self.output.add_convex_quad(&[
                            in_face.point,
                            inpt,
                            miter_point,
                            outpt,
                        ]);
                    }
                    return;
                }
            }
        }

        // Bevel, and the fallback for rejected miters.
        if self.output.prefers_external_edges() {
            if clockwise {
                self.output.add_external_edge(&inpt, &outpt);
            } else {
                self.output.add_external_edge(&outpt, &inpt);
            }
        } else {
            self.output.add_triangle(&[in_face.point, inpt, outpt]);
        }
    }

    fn add_cap(&mut self, f: &StrokeFace) {
        match self.style.line_cap {
            LineCap::Round => {
                let slope = f.dev_vector.reversed();
                self.tessellate_fan(&f.dev_vector, &slope, &f.point, &f.cw, &f.ccw, false);
            }

            LineCap::Square => {
                let dx = f.usr_vector.x * self.half_line_width;
                let dy = f.usr_vector.y * self.half_line_width;
                let v = self.ctm.transform_vector(dvector(dx, dy));
                let fvector = Point::from_f64(v.x, v.y);

                let quad = [
                    f.ccw,
                    translate_point(&f.ccw, &fvector),
                    translate_point(&f.cw, &fvector),
                    f.cw,
                ];

                if self.output.prefers_external_edges() {
                    self.output.add_external_edge(&quad[0], &quad[1]);
                    self.output.add_external_edge(&quad[1], &quad[2]);
                    self.output.add_external_edge(&quad[2], &quad[3]);
                } else {
                    self.output.add_convex_quad(&quad);
                }
            }

            LineCap::Butt => {
                if self.output.prefers_external_edges() {
                    self.output.add_external_edge(&f.ccw, &f.cw);
                }
            }
        }
    }

    /// The leading cap faces backwards: flip the tangent and swap the two
    /// offsets so it is outward-facing.
    fn add_leading_cap(&mut self, face: &StrokeFace) {
        let mut reversed = *face;

        reversed.usr_vector = dvector(-reversed.usr_vector.x, -reversed.usr_vector.y);
        reversed.dev_vector = reversed.dev_vector.reversed();
        std::mem::swap(&mut reversed.cw, &mut reversed.ccw);

        self.add_cap(&reversed);
    }

    fn add_trailing_cap(&mut self, face: &StrokeFace) {
        self.add_cap(face);
    }

    fn add_caps(&mut self) {
        // A degenerate subpath with round caps strokes as a dot; pick an
        // arbitrary tangent for it.
        if self.has_initial_sub_path
            && self.first_face.is_none()
            && self.current_face.is_none()
            && self.style.line_cap == LineCap::Round
        {
            let slope = Slope::from_deltas(Fixed::ONE, Fixed::from_int(0));
            if let Some((dx, dy, _)) = self.compute_normalized_slope(1.0, 0.0) {
                let first_point = self.first_point;
                let face = self.compute_face(&first_point, &slope, dx, dy);

                self.add_leading_cap(&face);
                self.add_trailing_cap(&face);
            }
        }

        if let Some(face) = self.first_face {
            self.add_leading_cap(&face);
        }

        if let Some(face) = self.current_face {
            self.add_trailing_cap(&face);
        }
    }

    /// Emit the two sides of one stroked segment, returning the faces at
    /// its two ends.
    fn add_sub_edge(
        &mut self,
        p1: &Point,
        p2: &Point,
        dev_slope: &Slope,
        slope_dx: f64,
        slope_dy: f64,
    ) -> (StrokeFace, StrokeFace) {
        let start = self.compute_face(p1, dev_slope, slope_dx, slope_dy);
        let mut end = start;

        if p1 == p2 {
            return (start, end);
        }

        end.point = *p2;
        let delta = Point::new(p2.x - p1.x, p2.y - p1.y);
        end.ccw = translate_point(&end.ccw, &delta);
        end.cw = translate_point(&end.cw, &delta);

        if self.output.prefers_external_edges() {
            self.output.add_external_edge(&end.cw, &start.cw);
            self.output.add_external_edge(&start.ccw, &end.ccw);
        } else {
            self.output
                .add_convex_quad(&[start.cw, end.cw, end.ccw, start.ccw]);
        }

        (start, end)
    }

    fn stroker_move_to(&mut self, point: &Point) {
        // Reset the dash pattern for new sub paths.
        self.dash.start();

        // Cap the start and end of the previous sub path as needed.
        self.add_caps();

        self.first_point = *point;
        self.current_point = *point;

        self.first_face = None;
        self.current_face = None;
        self.has_initial_sub_path = false;
    }

    fn stroker_line_to(&mut self, point: &Point) {
        self.has_initial_sub_path = true;

        let p1 = self.current_point;
        if p1 == *point {
            return;
        }

        let dev_slope = Slope::new(&p1, point);
        let slope_dx = (point.x - p1.x).to_f64();
        let slope_dy = (point.y - p1.y).to_f64();
        let (slope_dx, slope_dy) = match self.compute_normalized_slope(slope_dx, slope_dy) {
            Some((dx, dy, _)) => (dx, dy),
            None => return,
        };

        let (start, end) = self.add_sub_edge(&p1, point, &dev_slope, slope_dx, slope_dy);

        if let Some(current) = self.current_face {
            // Join with the final face from the previous segment.
            self.join(&current, &start);
        } else if self.first_face.is_none() {
            // Save this subpath's first face in case it is needed for the
            // closing join.
            self.first_face = Some(start);
        }
        self.current_face = Some(end);

        self.current_point = *point;
    }

    /// Dashed lines: cap each dash end, join around turns while on.
    fn stroker_line_to_dashed(&mut self, p2: &Point) {
        self.has_initial_sub_path = self.dash.dash_starts_on;

        let p1 = self.current_point;
        if p1 == *p2 {
            return;
        }

        let mut fully_in_bounds = true;
        if let Some(bounds) = &self.bounds {
            if !bounds.contains_point(&p1) || !bounds.contains_point(p2) {
                fully_in_bounds = false;
            }
        }

        let dev_slope = Slope::new(&p1, p2);

        let slope_dx = (p2.x - p1.x).to_f64();
        let slope_dy = (p2.y - p1.y).to_f64();
        let (slope_dx, slope_dy, mag) =
            match self.compute_normalized_slope(slope_dx, slope_dy) {
                Some(v) => v,
                None => return,
            };

        let mut remain = mag;
        let mut segment_p1 = p1;
        while remain > 0.0 {
            let step_length = self.dash.dash_remain.min(remain);
            remain -= step_length;
            let dx2 = slope_dx * (mag - remain);
            let dy2 = slope_dy * (mag - remain);
            let v = self.ctm.transform_vector(dvector(dx2, dy2));
            let segment_p2 = Point::new(
                Fixed::from_f64(v.x) + p1.x,
                Fixed::from_f64(v.y) + p1.y,
            );

            let segment_in_bounds = fully_in_bounds
                || (self.first_face.is_none() && self.dash.dash_starts_on)
                || match &self.bounds {
                    Some(bounds) => {
                        bounds.intersects_segment(&Line::new(segment_p1, segment_p2))
                    }
                    None => true,
                };

            if self.dash.dash_on && segment_in_bounds {
                let (sub_start, sub_end) =
                    self.add_sub_edge(&segment_p1, &segment_p2, &dev_slope, slope_dx, slope_dy);

                if let Some(current) = self.current_face.take() {
                    // Join with the final face from the previous segment.
                    self.join(&current, &sub_start);
                } else if self.first_face.is_none() && self.dash.dash_starts_on {
                    // Save the subpath's first face for the closing join.
                    self.first_face = Some(sub_start);
                } else {
                    // Cap the dash start when not connecting to a
                    // previous segment.
                    self.add_leading_cap(&sub_start);
                }

                if remain > 0.0 {
                    // Cap the dash end when not at the end of the segment.
                    self.add_trailing_cap(&sub_end);
                } else {
                    self.current_face = Some(sub_end);
                }
            } else if let Some(current) = self.current_face.take() {
                // Cap the final face from the previous segment.
                self.add_trailing_cap(&current);
            }

            self.dash.step(step_length);
            segment_p1 = segment_p2;
        }

        if self.dash.dash_on && self.current_face.is_none() {
            // The segment ends on a transition to on: compute a new face
            // and cap the beginning of the next dash now, so it coincides
            // with any join the next segment starts with.
            let face = self.compute_face(p2, &dev_slope, slope_dx, slope_dy);
            self.add_leading_cap(&face);
            self.current_face = Some(face);
        }

        self.current_point = *p2;
    }

    fn stroker_spline_to(&mut self, point: &Point, tangent: &Slope) {
        self.has_initial_sub_path = true;

        if self.current_point == *point {
            return;
        }

        let slope_dx = tangent.dx.to_f64();
        let slope_dy = tangent.dy.to_f64();
        let (slope_dx, slope_dy) = match self.compute_normalized_slope(slope_dx, slope_dy) {
            Some((dx, dy, _)) => (dx, dy),
            None => return,
        };

        let new_face = self.compute_face(point, tangent, slope_dx, slope_dy);

        debug_assert!(self.current_face.is_some());
        let current_face = match self.current_face {
            Some(face) => face,
            None => {
                self.current_face = Some(new_face);
                self.current_point = *point;
                return;
            }
        };

        // When successive face normals turn past the cusp threshold, the
        // stroke quads alone would leave a notch; smooth it with a fan.
        if new_face.dev_slope.x * current_face.dev_slope.x
            + new_face.dev_slope.y * current_face.dev_slope.y
            < self.spline_cusp_tolerance
        {
            let clockwise = join_is_clockwise(&new_face, &current_face);
            let (inpt, outpt) = if clockwise {
                (current_face.cw, new_face.cw)
            } else {
                (current_face.ccw, new_face.ccw)
            };

            self.tessellate_fan(
                &current_face.dev_vector,
                &new_face.dev_vector,
                &current_face.point,
                &inpt,
                &outpt,
                clockwise,
            );
        }

        if let Some(intersect_point) = slow_segment_intersection(
            &current_face.cw,
            &current_face.ccw,
            &new_face.cw,
            &new_face.ccw,
        ) {
            // The two faces cross: two triangles sharing the crossing.
            self.output
                .add_triangle(&[current_face.ccw, new_face.ccw, intersect_point]);
            self.output
                .add_triangle(&[current_face.cw, new_face.cw, intersect_point]);
        } else {
            // The quad between the faces, as two triangles.
            self.output
                .add_triangle(&[current_face.ccw, current_face.cw, new_face.cw]);
            self.output
                .add_triangle(&[current_face.ccw, new_face.cw, new_face.ccw]);
        }

        self.current_face = Some(new_face);
        self.current_point = *point;
    }

    fn stroker_curve_to(&mut self, b: &Point, c: &Point, d: &Point) {
        let mut spline = match Spline::new(&self.current_point, b, c, d) {
            Some(spline) => spline,
            None => {
                // Degenerate: a straight line to d.
                if self.dash.dashed {
                    return self.stroker_line_to_dashed(d);
                }
                return self.stroker_line_to(d);
            }
        };

        // If the line width shrinks the pen to a single point, there is
        // nothing to draw.
        if self.pen.num_vertices() <= 1 {
            return;
        }

        // Compute the initial face.
        if !self.dash.dashed || self.dash.dash_on {
            let slope_dx = spline.initial_slope.dx.to_f64();
            let slope_dy = spline.initial_slope.dy.to_f64();
            if let Some((dx, dy, _)) = self.compute_normalized_slope(slope_dx, slope_dy) {
                let current_point = self.current_point;
                let face = self.compute_face(&current_point, &spline.initial_slope, dx, dy);

                if let Some(current) = self.current_face {
                    self.join(&current, &face);
                } else if self.first_face.is_none() {
                    self.first_face = Some(face);
                }

                self.current_face = Some(face);
            }
        }

        // Temporarily switch to round joins to guarantee smooth stroked
        // curves.
        let line_join_save = self.style.line_join;
        self.style.line_join = LineJoin::Round;

        let dashed = self.dash.dashed;
        let tolerance = self.tolerance;
        spline.decompose(tolerance, &mut |p, tangent| {
            if dashed {
                self.stroker_line_to_dashed(&p);
            } else {
                self.stroker_spline_to(&p, &tangent);
            }
        });

        // And join the final face.
        if !self.dash.dashed || self.dash.dash_on {
            let slope_dx = spline.final_slope.dx.to_f64();
            let slope_dy = spline.final_slope.dy.to_f64();
            if let Some((dx, dy, _)) = self.compute_normalized_slope(slope_dx, slope_dy) {
                let current_point = self.current_point;
                let face = self.compute_face(&current_point, &spline.final_slope, dx, dy);

                if let Some(current) = self.current_face {
                    self.join(&current, &face);
                }
                self.current_face = Some(face);
            }
        }

        self.style.line_join = line_join_save;
    }

    fn stroker_close_path(&mut self) {
        let first_point = self.first_point;
        if self.dash.dashed {
            self.stroker_line_to_dashed(&first_point);
        } else {
            self.stroker_line_to(&first_point);
        }

        match (self.current_face, self.first_face) {
            (Some(current), Some(first)) => {
                // Join the first and final faces of the subpath.
                self.join(&current, &first);
            }
            _ => {
                // Cap the start and end of the subpath as needed.
                self.add_caps();
            }
        }

        self.has_initial_sub_path = false;
        self.first_face = None;
        self.current_face = None;
    }
}

impl<O: StrokeOutput> PathInterpreter for Stroker<'_, O> {
    fn move_to(&mut self, point: &Point) {
        self.stroker_move_to(point);
    }

    fn line_to(&mut self, point: &Point) {
        if self.dash.dashed {
            self.stroker_line_to_dashed(point);
        } else {
            self.stroker_line_to(point);
        }
    }

    fn curve_to(&mut self, b: &Point, c: &Point, d: &Point) {
        self.stroker_curve_to(b, c, d);
    }

    fn close(&mut self) {
        self.stroker_close_path();
    }
}

/// Expands the stroke of `path` into an external-edge polygon.
pub fn stroke_to_polygon(
    path: &Path,
    style: &StrokeStyle,
    ctm: &Transform,
    ctm_inverse: &Transform,
    tolerance: f64,
    polygon: &mut Polygon,
) -> TessellationResult {
    if path.is_empty() {
        return Err(TessellationError::NothingToDo);
    }

    let limits = polygon.limits().to_vec();
    let mut stroker = Stroker::new(path, style, ctm, ctm_inverse, tolerance, &limits, polygon);

    path.interpret(&mut stroker);

    // Cap the start and end of the final sub path as needed.
    stroker.add_caps();

    Ok(())
}

/// Expands the stroke of `path` through a triangle/fan/quad consumer.
pub fn stroke_to_shaper<O: StrokeOutput>(
    path: &Path,
    style: &StrokeStyle,
    ctm: &Transform,
    ctm_inverse: &Transform,
    tolerance: f64,
    output: &mut O,
) -> TessellationResult {
    if path.is_empty() {
        return Err(TessellationError::NothingToDo);
    }

    let mut stroker = Stroker::new(path, style, ctm, ctm_inverse, tolerance, &[], output);

    path.interpret(&mut stroker);
    stroker.add_caps();

    Ok(())
}

/// Strokes `path` and tessellates the outline into trapezoids.
pub fn stroke_polygon_to_traps(
    path: &Path,
    style: &StrokeStyle,
    ctm: &Transform,
    ctm_inverse: &Transform,
    tolerance: f64,
    traps: &mut Traps,
) -> TessellationResult {
    let mut polygon = Polygon::with_limits(traps.limits());
    stroke_to_polygon(path, style, ctm, ctm_inverse, tolerance, &mut polygon)?;

    if polygon.num_edges() == 0 {
        return Ok(());
    }

    tessellate_polygon(traps, &polygon, FillRule::Winding)
}
