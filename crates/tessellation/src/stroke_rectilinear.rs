//! The fast-path stroker for rectilinear paths: emits boxes directly and
//! de-overlaps them with the rectilinear tessellator, skipping polygon
//! construction and the general sweep entirely.

use crate::bentley_ottmann_rectilinear::tessellate_boxes;
use crate::boxes::Boxes;
use crate::dash::StrokerDash;
use crate::error::{TessellationError, TessellationResult};
use crate::geom::math::{transform_is_scale, Transform};
use crate::geom::{Box2D, Fixed, Line, Point, Slope};
use crate::path::{Path, PathInterpreter};
use crate::{Antialias, FillRule, LineCap, LineJoin, StrokeStyle};

use smallvec::SmallVec;

const HORIZONTAL: u32 = 0x1;
const FORWARDS: u32 = 0x2;
const JOIN: u32 = 0x4;

#[derive(Copy, Clone, Debug)]
struct Segment {
    p1: Point,
    p2: Point,
    flags: u32,
}

struct RectilinearStroker<'a> {
    line_cap: LineCap,
    half_line_x: Fixed,
    half_line_y: Fixed,
    // Per-axis dash scale, user to device.
    scale_x: f64,
    scale_y: f64,
    antialias: Antialias,
    boxes: &'a mut Boxes,

    current_point: Point,
    first_point: Point,
    open_sub_path: bool,

    dash: StrokerDash,

    bounds: Option<Box2D>,

    // The common case is a single rectangle.
    segments: SmallVec<[Segment; 8]>,
}

impl<'a> RectilinearStroker<'a> {
    /// This special-case stroker only supports miter-joined lines (not
    /// curves) and a matrix without shear. It also only supports
    /// horizontal and vertical line elements, which the caller vouches for
    /// through the path's stroke rectilinearity flag.
    fn new(
        style: &StrokeStyle,
        ctm: &Transform,
        antialias: Antialias,
        boxes: &'a mut Boxes,
    ) -> Option<Self> {
        if style.line_join != LineJoin::Miter {
            return None;
        }

        // If the miter limit turns right angles into bevels this
        // optimization does not apply. The ratio is 1/sin(phi/2), so the
        // cutoff is at sqrt(2).
        if style.miter_limit < std::f64::consts::SQRT_2 {
            return None;
        }

        if !(style.line_cap == LineCap::Butt || style.line_cap == LineCap::Square) {
            return None;
        }

        if !transform_is_scale(ctm) {
            return None;
        }

        Some(RectilinearStroker {
            line_cap: style.line_cap,
            half_line_x: Fixed::from_f64(ctm.m11.abs() * style.line_width / 2.0),
            half_line_y: Fixed::from_f64(ctm.m22.abs() * style.line_width / 2.0),
            scale_x: ctm.m11.abs(),
            scale_y: ctm.m22.abs(),
            antialias,
            boxes,
            current_point: Point::default(),
            first_point: Point::default(),
            open_sub_path: false,
            dash: StrokerDash::new(style),
            bounds: None,
            segments: SmallVec::new(),
        })
    }

    fn limit(&mut self, limits: &[Box2D]) {
        let mut bounds = limits[0];
        for b in &limits[1..] {
            bounds.add_box(b);
        }

        bounds.p1.x -= self.half_line_x;
        bounds.p2.x += self.half_line_x;
        bounds.p1.y -= self.half_line_y;
        bounds.p2.y += self.half_line_y;

        self.bounds = Some(bounds);
    }

    fn add_segment(&mut self, p1: &Point, p2: &Point, flags: u32) {
        self.segments.push(Segment {
            p1: *p1,
            p2: *p2,
            flags,
        });
    }

    /// Expand each accumulated segment into one box: extend the endpoints
    /// to cover the preceding/following join or cap, then widen by half
    /// the line width on both sides.
    fn emit_segments(&mut self) {
        let line_cap = self.line_cap;
        let half_line_x = self.half_line_x;
        let half_line_y = self.half_line_y;

        for i in 0..self.segments.len() {
            // Extend to include the previous cap or join for every segment
            // except the first of an open, butt-capped subpath. Emitting a
            // miter join across an elided degenerate segment must be
            // avoided; overlap between the boxes is eliminated afterwards
            // by the tessellation.
            let j = if i == 0 { self.segments.len() - 1 } else { i - 1 };
            let mut lengthen_initial =
                (self.segments[i].flags ^ self.segments[j].flags) & HORIZONTAL != 0;
            let j = if i == self.segments.len() - 1 { 0 } else { i + 1 };
            let mut lengthen_final =
                (self.segments[i].flags ^ self.segments[j].flags) & HORIZONTAL != 0;

            if self.open_sub_path {
                if i == 0 {
                    lengthen_initial = line_cap != LineCap::Butt;
                }
                if i == self.segments.len() - 1 {
                    lengthen_final = line_cap != LineCap::Butt;
                }
            }

            let mut a = self.segments[i].p1;
            let mut b = self.segments[i].p2;

            if lengthen_initial || lengthen_final {
                if a.y == b.y {
                    if a.x < b.x {
                        if lengthen_initial {
                            a.x -= half_line_x;
                        }
                        if lengthen_final {
                            b.x += half_line_x;
                        }
                    } else {
                        if lengthen_initial {
                            a.x += half_line_x;
                        }
                        if lengthen_final {
                            b.x -= half_line_x;
                        }
                    }
                } else {
                    if a.y < b.y {
                        if lengthen_initial {
                            a.y -= half_line_y;
                        }
                        if lengthen_final {
                            b.y += half_line_y;
                        }
                    } else {
                        if lengthen_initial {
                            a.y += half_line_y;
                        }
                        if lengthen_final {
                            b.y -= half_line_y;
                        }
                    }
                }
            }

            // Widen by half the line width perpendicular to the segment.
            if a.y == b.y {
                a.y -= half_line_y;
                b.y += half_line_y;
            } else {
                a.x -= half_line_x;
                b.x += half_line_x;
            }

            let bbox = Box2D::canonical(&a, &b);
            self.boxes.add(self.antialias, &bbox);
        }

        self.segments.clear();
    }

    fn emit_segments_dashed(&mut self) {
        let line_cap = self.line_cap;
        let half_line_x = self.half_line_x;
        let half_line_y = self.half_line_y;

        for i in 0..self.segments.len() {
            let is_horizontal = self.segments[i].flags & HORIZONTAL != 0;

            // Handle the join for a potentially degenerate segment: butt
            // caps would leave a gap at the corner, so emit the small
            // square covering it.
            if line_cap == LineCap::Butt
                && self.segments[i].flags & JOIN != 0
                && (i != self.segments.len() - 1
                    || (!self.open_sub_path && self.dash.dash_starts_on))
            {
                let j = (i + 1) % self.segments.len();
                let forwards = self.segments[i].flags & FORWARDS != 0;
                let out_slope = Slope::new(&self.segments[j].p1, &self.segments[j].p2);

                let mut p1 = self.segments[i].p2;
                let mut p2 = p1;

                if is_horizontal {
                    if forwards {
                        p2.x += half_line_x;
                    } else {
                        p1.x -= half_line_x;
                    }

                    if out_slope.dy > Fixed::from_int(0) {
                        p1.y -= half_line_y;
                    } else {
                        p2.y += half_line_y;
                    }
                } else {
                    if forwards {
                        p2.y += half_line_y;
                    } else {
                        p1.y -= half_line_y;
                    }

                    if out_slope.dx > Fixed::from_int(0) {
                        p1.x -= half_line_x;
                    } else {
                        p2.x += half_line_x;
                    }
                }

                let bbox = Box2D::new(p1, p2);
                self.boxes.add(self.antialias, &bbox);
            }

            let mut a = self.segments[i].p1;
            let mut b = self.segments[i].p2;

            if is_horizontal {
                if line_cap == LineCap::Square {
                    if a.x <= b.x {
                        a.x -= half_line_x;
                        b.x += half_line_x;
                    } else {
                        a.x += half_line_x;
                        b.x -= half_line_x;
                    }
                }

                a.y += half_line_y;
                b.y -= half_line_y;
            } else {
                if line_cap == LineCap::Square {
                    if a.y <= b.y {
                        a.y -= half_line_y;
                        b.y += half_line_y;
                    } else {
                        a.y += half_line_y;
                        b.y -= half_line_y;
                    }
                }

                a.x += half_line_x;
                b.x -= half_line_x;
            }

            if a == b {
                continue;
            }

            let bbox = Box2D::canonical(&a, &b);
            self.boxes.add(self.antialias, &bbox);
        }

        self.segments.clear();
    }

    fn emit(&mut self) {
        if self.dash.dashed {
            self.emit_segments_dashed();
        } else {
            self.emit_segments();
        }
    }

    fn stroker_line_to(&mut self, b: &Point) {
        let a = self.current_point;

        // Only horizontal or vertical elements are supported.
        debug_assert!(a.x == b.x || a.y == b.y);

        // Nothing is drawn for degenerate paths.
        if a == *b {
            return;
        }

        let flags = if a.y == b.y { HORIZONTAL } else { 0 } | JOIN;
        self.add_segment(&a, b, flags);

        self.current_point = *b;
        self.open_sub_path = true;
    }

    fn stroker_line_to_dashed(&mut self, point: &Point) {
        let a = self.current_point;
        let b = *point;

        // Nothing is drawn for degenerate paths.
        if a == b {
            return;
        }

        debug_assert!(a.x == b.x || a.y == b.y);

        let mut fully_in_bounds = true;
        if let Some(bounds) = &self.bounds {
            if !bounds.contains_point(&a) || !bounds.contains_point(&b) {
                fully_in_bounds = false;
            }
        }

        let mut flags = if a.y == b.y { HORIZONTAL } else { 0 };
        let (mag, sf) = if flags & HORIZONTAL != 0 {
            (b.x - a.x, self.scale_x)
        } else {
            (b.y - a.y, self.scale_y)
        };

        let (mut remain, sign) = if mag < Fixed::from_int(0) {
            ((-mag).to_f64(), 1.0)
        } else {
            flags |= FORWARDS;
            (mag.to_f64(), -1.0)
        };

        let mut segment_p1 = a;
        let mut dash_on_emitted = false;
        let mut segment_p2 = a;

        while remain > 0.0 {
            let step_length = (sf * self.dash.dash_remain).min(remain);
            remain -= step_length;

            let m = Fixed::from_f64(sign * remain);
            segment_p2 = b;
            if flags & HORIZONTAL != 0 {
                segment_p2.x = b.x + m;
                segment_p2.y = segment_p1.y;
            } else {
                segment_p2.y = b.y + m;
                segment_p2.x = segment_p1.x;
            }

            let in_bounds = fully_in_bounds
                || match &self.bounds {
                    Some(bounds) => {
                        bounds.intersects_segment(&Line::new(segment_p1, segment_p2))
                    }
                    None => true,
                };

            if self.dash.dash_on && in_bounds {
                let join = if remain <= 0.0 { JOIN } else { 0 };
                self.add_segment(&segment_p1, &segment_p2, flags | join);
                dash_on_emitted = true;
            } else {
                dash_on_emitted = false;
            }

            self.dash.step(step_length / sf);
            segment_p1 = segment_p2;
        }

        if self.dash.dash_on && !dash_on_emitted {
            let in_bounds = fully_in_bounds
                || match &self.bounds {
                    Some(bounds) => {
                        bounds.intersects_segment(&Line::new(segment_p1, segment_p2))
                    }
                    None => true,
                };

            if in_bounds {
                // The segment ends on a transition to on; add a
                // degenerate segment so the next dash step starts with a
                // cap here.
                self.add_segment(&segment_p1, &segment_p1, flags | JOIN);
            }
        }

        self.current_point = *point;
        self.open_sub_path = true;
    }

    fn stroker_close_path(&mut self) {
        // Nothing is drawn for degenerate paths.
        if !self.open_sub_path {
            return;
        }

        let first_point = self.first_point;
        if self.dash.dashed {
            self.stroker_line_to_dashed(&first_point);
        } else {
            self.stroker_line_to(&first_point);
        }

        self.open_sub_path = false;
        self.emit();
    }
}

impl PathInterpreter for RectilinearStroker<'_> {
    fn move_to(&mut self, point: &Point) {
        self.emit();

        // Reset the dash pattern for new sub paths.
        self.dash.start();

        self.current_point = *point;
        self.first_point = *point;
        self.open_sub_path = false;
    }

    fn line_to(&mut self, point: &Point) {
        if self.dash.dashed {
            self.stroker_line_to_dashed(point);
        } else {
            self.stroker_line_to(point);
        }
    }

    fn curve_to(&mut self, _b: &Point, _c: &Point, d: &Point) {
        // Rectilinear paths carry no curves; treat a stray one as its
        // chord so release builds stay well-defined.
        debug_assert!(false, "curve in rectilinear stroke");
        self.line_to(d);
    }

    fn close(&mut self) {
        self.stroker_close_path();
    }
}

/// Strokes a rectilinear path directly into boxes.
///
/// Returns `Unsupported` unless the style uses miter joins with a limit of
/// at least sqrt(2), butt or square caps, and the CTM is free of shear;
/// callers fall back to the general stroker.
pub fn stroke_rectilinear_to_boxes(
    path: &Path,
    style: &StrokeStyle,
    ctm: &Transform,
    antialias: Antialias,
    boxes: &mut Boxes,
) -> TessellationResult {
    if path.is_empty() {
        return Err(TessellationError::NothingToDo);
    }

    debug_assert!(path.stroke_is_rectilinear());
    if !path.stroke_is_rectilinear() {
        return Err(TessellationError::Unsupported);
    }

    if style.line_join != LineJoin::Miter
        || style.miter_limit < std::f64::consts::SQRT_2
        || !(style.line_cap == LineCap::Butt || style.line_cap == LineCap::Square)
        || !transform_is_scale(ctm)
    {
        return Err(TessellationError::Unsupported);
    }

    let half_line_x = Fixed::from_f64(ctm.m11.abs() * style.line_width / 2.0);
    let half_line_y = Fixed::from_f64(ctm.m22.abs() * style.line_width / 2.0);

    let mut bbox = Box2D::from_point(&Point::default());
    if !style.is_dashed()
        && path.is_stroke_box(&mut bbox)
        // If the sides overlap they must go through the tessellator.
        && bbox.p2.x - bbox.p1.x > half_line_x + half_line_x
        && bbox.p2.y - bbox.p1.y > half_line_y + half_line_y
    {
        // Top.
        let b = Box2D::new(
            Point::new(bbox.p1.x - half_line_x, bbox.p1.y - half_line_y),
            Point::new(bbox.p2.x + half_line_x, bbox.p1.y + half_line_y),
        );
        boxes.add(antialias, &b);

        // Left, excluding the top and bottom rows.
        let b = Box2D::new(
            Point::new(bbox.p1.x - half_line_x, bbox.p1.y + half_line_y),
            Point::new(bbox.p1.x + half_line_x, bbox.p2.y - half_line_y),
        );
        boxes.add(antialias, &b);

        // Right, excluding the top and bottom rows.
        let b = Box2D::new(
            Point::new(bbox.p2.x - half_line_x, bbox.p1.y + half_line_y),
            Point::new(bbox.p2.x + half_line_x, bbox.p2.y - half_line_y),
        );
        boxes.add(antialias, &b);

        // Bottom.
        let b = Box2D::new(
            Point::new(bbox.p1.x - half_line_x, bbox.p2.y - half_line_y),
            Point::new(bbox.p2.x + half_line_x, bbox.p2.y + half_line_y),
        );
        boxes.add(antialias, &b);

        return Ok(());
    }

    let limits = boxes.limits().to_vec();
    let mut stroker = match RectilinearStroker::new(style, ctm, antialias, boxes) {
        Some(stroker) => stroker,
        None => return Err(TessellationError::Unsupported),
    };

    if !limits.is_empty() {
        stroker.limit(&limits);
    }

    path.interpret(&mut stroker);
    stroker.emit();

    // The segments were tessellated incrementally without eliminating
    // self-intersections; de-overlap them now.
    let result = tessellate_boxes(boxes, FillRule::Winding);
    if result.is_err() {
        boxes.clear();
    }
    result
}
