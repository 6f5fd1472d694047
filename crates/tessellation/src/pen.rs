//! The stroking pen: a convex polygon approximating the image of a circle
//! of half the line width under the current transformation.

use crate::geom::hull;
use crate::geom::math::Transform;
use crate::geom::{math, Point, Slope};

/// One pen vertex with its slopes to the neighbouring vertices, used to
/// select the active vertex range when building round joins and caps.
#[derive(Copy, Clone, Debug)]
pub struct PenVertex {
    pub point: Point,
    pub slope_ccw: Slope,
    pub slope_cw: Slope,
}

/// A counter-clockwise-ordered convex pen.
#[derive(Clone, Debug)]
pub struct Pen {
    vertices: Vec<PenVertex>,
}

/// Number of pen vertices required so every chord of the transformed
/// circle stays within `tolerance` of it.
pub fn vertices_needed(tolerance: f64, radius: f64, ctm: &Transform) -> usize {
    let major_axis = math::transformed_circle_major_axis(ctm, radius);

    if tolerance >= 4.0 * major_axis {
        // Squashed below the tolerance in every direction.
        1
    } else if tolerance >= major_axis {
        4
    } else {
        let delta = (1.0 - tolerance / major_axis).acos();
        let mut num = (2.0 * std::f64::consts::PI / delta).ceil() as usize;
        if num % 2 == 1 {
            num += 1;
        }
        num.max(4)
    }
}

impl Pen {
    pub fn new(radius: f64, tolerance: f64, ctm: &Transform) -> Pen {
        let reflect = ctm.determinant() < 0.0;
        let num_vertices = vertices_needed(tolerance, radius, ctm);

        let mut vertices = Vec::with_capacity(num_vertices);
        for i in 0..num_vertices {
            let mut theta = 2.0 * std::f64::consts::PI * i as f64 / num_vertices as f64;
            // A reflecting matrix would turn the vertex order clockwise;
            // walk the circle the other way so the device-space pen stays
            // counter-clockwise.
            if reflect {
                theta = -theta;
            }
            let dx = radius * theta.cos();
            let dy = radius * theta.sin();
            let offset = ctm.transform_vector(math::dvector(dx, dy));
            vertices.push(PenVertex {
                point: Point::from_f64(offset.x, offset.y),
                slope_ccw: Slope::from_deltas(Default::default(), Default::default()),
                slope_cw: Slope::from_deltas(Default::default(), Default::default()),
            });
        }

        let mut pen = Pen { vertices };
        pen.compute_slopes();
        pen
    }

    #[inline]
    pub fn vertices(&self) -> &[PenVertex] {
        &self.vertices
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Merges extra vertex offsets into the pen, keeping it convex.
    pub fn add_points(&mut self, points: &[Point]) {
        let mut all: Vec<Point> = self.vertices.iter().map(|v| v.point).collect();
        all.extend_from_slice(points);

        hull::compute(&mut all);

        self.vertices = all
            .into_iter()
            .map(|point| PenVertex {
                point,
                slope_ccw: Slope::from_deltas(Default::default(), Default::default()),
                slope_cw: Slope::from_deltas(Default::default(), Default::default()),
            })
            .collect();
        self.compute_slopes();
    }

    fn compute_slopes(&mut self) {
        let n = self.vertices.len();
        if n < 2 {
            return;
        }

        for i in 0..n {
            let prev = self.vertices[(i + n - 1) % n].point;
            let this = self.vertices[i].point;
            let next = self.vertices[(i + 1) % n].point;

            self.vertices[i].slope_cw = Slope::new(&prev, &this);
            self.vertices[i].slope_ccw = Slope::new(&this, &next);
        }
    }

    /// The vertex active for `slope` walking the pen clockwise: the first
    /// whose slope range brackets it. A degenerate pen (one collapsed to a
    /// line) has no bracketing vertex; the first stands in.
    pub fn find_active_cw_vertex_index(&self, slope: &Slope) -> usize {
        for (i, v) in self.vertices.iter().enumerate() {
            if slope.compare(&v.slope_ccw) < 0 && slope.compare(&v.slope_cw) >= 0 {
                return i;
            }
        }
        0
    }

    /// Like [`Pen::find_active_cw_vertex_index`] for a counter-clockwise
    /// walk: the search runs backwards against the reversed slope.
    pub fn find_active_ccw_vertex_index(&self, slope: &Slope) -> usize {
        let slope_reverse = slope.reversed();

        for (i, v) in self.vertices.iter().enumerate().rev() {
            if v.slope_ccw.compare(&slope_reverse) >= 0 && v.slope_cw.compare(&slope_reverse) < 0 {
                return i;
            }
        }
        0
    }

    /// Active vertex range for a clockwise fan from `in_slope` to
    /// `out_slope`; the caller walks forward from `start`, stopping before
    /// `stop`.
    pub fn find_active_cw_vertices(&self, in_slope: &Slope, out_slope: &Slope) -> (usize, usize) {
        (
            self.find_active_cw_vertex_index(in_slope),
            self.find_active_cw_vertex_index(out_slope),
        )
    }

    /// Active vertex range for a counter-clockwise fan; the caller walks
    /// backward from `start`, stopping before `stop`.
    pub fn find_active_ccw_vertices(&self, in_slope: &Slope, out_slope: &Slope) -> (usize, usize) {
        (
            self.find_active_ccw_vertex_index(in_slope),
            self.find_active_ccw_vertex_index(out_slope),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    #[test]
    fn vertex_count_scales_with_tolerance() {
        let id = Transform::identity();
        let coarse = vertices_needed(0.5, 1.0, &id);
        let fine = vertices_needed(0.01, 1.0, &id);
        assert!(fine > coarse);
        assert!(coarse >= 4);
        assert_eq!(fine % 2, 0);

        // A pen smaller than the tolerance degenerates.
        assert_eq!(vertices_needed(10.0, 1.0, &id), 1);
    }

    #[test]
    fn scaling_the_ctm_adds_vertices() {
        let id = Transform::identity();
        let big = Transform::scale(10.0, 10.0);
        assert!(vertices_needed(0.1, 1.0, &big) > vertices_needed(0.1, 1.0, &id));
    }

    #[test]
    fn pen_is_convex_and_centered() {
        let pen = Pen::new(2.0, 0.1, &Transform::identity());
        assert!(pen.num_vertices() >= 4);

        for v in pen.vertices() {
            let d = v.point.to_f64();
            let r = (d.x * d.x + d.y * d.y).sqrt();
            assert!((r - 2.0).abs() < 0.1, "vertex radius {}", r);
        }

        // Consecutive turns are convex under the slope ordering.
        let n = pen.num_vertices();
        for i in 0..n {
            let v = &pen.vertices()[i];
            assert!(v.slope_cw.compare(&v.slope_ccw) < 0);
        }
    }

    #[test]
    fn reflection_keeps_ccw_order(){
        let pen = Pen::new(1.0, 0.1, &Transform::scale(1.0, -1.0));
        for v in pen.vertices() {
            assert!(v.slope_cw.compare(&v.slope_ccw) < 0);
        }
    }

    #[test]
    fn add_points_keeps_convexity() {
        let mut pen = Pen::new(1.0, 0.1, &Transform::identity());
        let n = pen.num_vertices();
        // Interior points change nothing.
        pen.add_points(&[point(0.1, 0.1)]);
        assert_eq!(pen.num_vertices(), n);

        // A far exterior point becomes a vertex.
        pen.add_points(&[point(5.0, 0.0)]);
        assert!(pen.vertices().iter().any(|v| v.point == point(5.0, 0.0)));
    }

    #[test]
    fn active_vertex_brackets_direction() {
        let pen = Pen::new(1.0, 0.1, &Transform::identity());
        let dir = Slope::new(&point(0.0, 0.0), &point(1.0, 0.0));
        let i = pen.find_active_cw_vertex_index(&dir);
        let v = &pen.vertices()[i];
        assert!(dir.compare(&v.slope_ccw) < 0);
        assert!(dir.compare(&v.slope_cw) >= 0);
    }
}
