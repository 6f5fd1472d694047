//! Filling a path into a polygon, trapezoids or boxes.

use crate::bentley_ottmann::tessellate_polygon;
use crate::bentley_ottmann_rectilinear::{
    tessellate_boxes, tessellate_rectilinear_polygon, tessellate_rectilinear_polygon_to_boxes,
};
use crate::boxes::Boxes;
use crate::error::{TessellationError, TessellationResult};
use crate::geom::spline::{self, Spline};
use crate::geom::{Box2D, Point};
use crate::path::{Path, PathInterpreter};
use crate::polygon::Polygon;
use crate::traps::Traps;
use crate::{Antialias, FillRule};

struct Filler<'a> {
    polygon: &'a mut Polygon,
    tolerance: f64,
    limit: Option<Box2D>,
    current_point: Point,
    last_move_to: Point,
}

impl Filler<'_> {
    fn close_subpath(&mut self) {
        let last_move_to = self.last_move_to;
        self.add_line(&last_move_to);
    }

    fn add_line(&mut self, point: &Point) {
        self.polygon.add_external_edge(&self.current_point, point);
        self.current_point = *point;
    }
}

impl PathInterpreter for Filler<'_> {
    fn move_to(&mut self, point: &Point) {
        self.close_subpath();
        self.current_point = *point;
        self.last_move_to = *point;
    }

    fn line_to(&mut self, point: &Point) {
        self.add_line(point);
    }

    fn curve_to(&mut self, b: &Point, c: &Point, d: &Point) {
        if let Some(limit) = &self.limit {
            // A curve that cannot reach the limits only contributes its
            // winding, for which the chord is enough.
            if !spline::intersects(&self.current_point, b, c, d, limit) {
                return self.add_line(d);
            }
        }

        match Spline::new(&self.current_point, b, c, d) {
            Some(mut spline) => {
                let tolerance = self.tolerance;
                let polygon = &mut *self.polygon;
                let mut current = self.current_point;
                spline.decompose(tolerance, &mut |p, _| {
                    polygon.add_external_edge(&current, &p);
                    current = p;
                });
                self.current_point = current;
            }
            None => self.add_line(d),
        }
    }

    fn close(&mut self) {
        self.close_subpath();
    }
}

/// Fills `path` into an external-edge polygon, flattening curves at
/// `tolerance`.
pub fn fill_to_polygon(path: &Path, tolerance: f64, polygon: &mut Polygon) -> TessellationResult {
    let mut filler = Filler {
        limit: polygon.limit(),
        polygon,
        tolerance,
        // A degenerate initial subpath, implicitly closed.
        current_point: Point::default(),
        last_move_to: Point::default(),
    };

    path.interpret(&mut filler);
    filler.close_subpath();

    Ok(())
}

struct FillerRectilinearAligned<'a> {
    polygon: &'a mut Polygon,
    current_point: Point,
    last_move_to: Point,
}

impl FillerRectilinearAligned<'_> {
    fn add_line(&mut self, point: &Point) {
        let p = Point::new(point.x.round_down(), point.y.round_down());
        self.polygon.add_external_edge(&self.current_point, &p);
        self.current_point = p;
    }

    fn close_subpath(&mut self) {
        let last_move_to = self.last_move_to;
        self.polygon
            .add_external_edge(&self.current_point, &last_move_to);
        self.current_point = last_move_to;
    }
}

impl PathInterpreter for FillerRectilinearAligned<'_> {
    fn move_to(&mut self, point: &Point) {
        self.close_subpath();
        let p = Point::new(point.x.round_down(), point.y.round_down());
        self.current_point = p;
        self.last_move_to = p;
    }

    fn line_to(&mut self, point: &Point) {
        self.add_line(point);
    }

    fn curve_to(&mut self, _b: &Point, _c: &Point, _d: &Point) {
        unreachable!("rectilinear paths contain no curves");
    }

    fn close(&mut self) {
        self.close_subpath();
    }
}

/// Fills a rectilinear path into a polygon. Without antialiasing every
/// vertex snaps to the pixel grid first, producing exact integer polygons
/// for the rectilinear tessellator.
pub fn fill_rectilinear_to_polygon(
    path: &Path,
    antialias: Antialias,
    polygon: &mut Polygon,
) -> TessellationResult {
    if antialias != Antialias::None {
        return fill_to_polygon(path, 0.0, polygon);
    }

    let mut filler = FillerRectilinearAligned {
        polygon,
        current_point: Point::default(),
        last_move_to: Point::default(),
    };

    path.interpret_flat(&mut filler, 0.0);
    filler.close_subpath();

    Ok(())
}

/// Fills `path` under `fill_rule` into trapezoids.
pub fn fill_to_traps(
    path: &Path,
    fill_rule: FillRule,
    tolerance: f64,
    traps: &mut Traps,
) -> TessellationResult {
    if path.fill_is_empty() {
        return Err(TessellationError::NothingToDo);
    }

    let mut polygon = Polygon::with_limits(traps.limits());
    fill_to_polygon(path, tolerance, &mut polygon)?;

    if polygon.num_edges() == 0 {
        return Ok(());
    }

    // Rectilinear fills skip intersection handling entirely and come out
    // flagged for the box/region conversions downstream.
    if path.fill_is_rectilinear() {
        return tessellate_rectilinear_polygon(&polygon, fill_rule, traps);
    }

    tessellate_polygon(traps, &polygon, fill_rule)
}

fn fill_rectilinear_tessellate_to_boxes(
    path: &Path,
    fill_rule: FillRule,
    antialias: Antialias,
    boxes: &mut Boxes,
) -> TessellationResult {
    let mut polygon = Polygon::with_limits(boxes.limits());
    // The polygon clips against the limits from here on.
    boxes.clear_limits();

    // Tolerance is irrelevant, the path is rectilinear.
    fill_rectilinear_to_polygon(path, antialias, &mut polygon)?;

    tessellate_rectilinear_polygon_to_boxes(&polygon, fill_rule, boxes)
}

/// Fills a rectilinear path directly into boxes, bypassing the general
/// tessellator: a lone rectangle is emitted as-is, a sequence of rectangle
/// subpaths is emitted then de-overlapped, and anything else goes through
/// the rectilinear sweep.
pub fn fill_rectilinear_to_boxes(
    path: &Path,
    fill_rule: FillRule,
    antialias: Antialias,
    boxes: &mut Boxes,
) -> TessellationResult {
    let mut bbox = Box2D::from_point(&Point::default());

    if path.is_box(&mut bbox) {
        boxes.add(antialias, &bbox);
        return Ok(());
    }

    let mut iter = path.iter();
    while iter.is_fill_box(&mut bbox) {
        if bbox.p1.y == bbox.p2.y || bbox.p1.x == bbox.p2.x {
            continue;
        }

        if bbox.p1.y > bbox.p2.y {
            // Flip into y order, swapping x as well to preserve the
            // winding of the subpath.
            std::mem::swap(&mut bbox.p1.y, &mut bbox.p2.y);
            std::mem::swap(&mut bbox.p1.x, &mut bbox.p2.x);
        }

        boxes.add(antialias, &bbox);
    }

    if iter.at_end() {
        return tessellate_boxes(boxes, fill_rule);
    }

    // The path is not a sequence of rectangles; extract clipped
    // rectilinear edges instead.
    boxes.clear();
    fill_rectilinear_tessellate_to_boxes(path, fill_rule, antialias, boxes)
}
