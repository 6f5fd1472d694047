//! Decomposition of cubic bézier splines into polylines.
//!
//! The flattener subdivides with De Casteljau midpoints until the inner
//! control points sit within the tolerance of the chord, emitting each
//! resulting point together with an approximated tangent. The initial and
//! final tangents are exposed separately because the stroker needs them to
//! orient leading and trailing caps.

use crate::{Box2D, Fixed, Line, Point, Slope};
use arrayvec::ArrayVec;

/// The four control points of a cubic bézier.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SplineKnots {
    pub a: Point,
    pub b: Point,
    pub c: Point,
    pub d: Point,
}

/// A cubic bézier prepared for decomposition.
pub struct Spline {
    pub knots: SplineKnots,
    pub initial_slope: Slope,
    pub final_slope: Slope,
    last_point: Point,
}

impl Spline {
    /// Prepares a spline for decomposition, deriving the initial and final
    /// tangents from the first and last non-degenerate control polygon
    /// legs. Returns `None` for fully degenerate curves (the caller then
    /// emits a single line-to instead).
    pub fn new(a: &Point, b: &Point, c: &Point, d: &Point) -> Option<Spline> {
        // If both tangents vanish this is just a straight line (or a point).
        if a == b && c == d {
            return None;
        }

        let initial_slope = if a != b {
            Slope::new(a, b)
        } else if a != c {
            Slope::new(a, c)
        } else if a != d {
            Slope::new(a, d)
        } else {
            return None;
        };

        let final_slope = if c != d {
            Slope::new(c, d)
        } else if b != d {
            Slope::new(b, d)
        } else {
            // Treat this as a straight line from a to d.
            return None;
        };

        Some(Spline {
            knots: SplineKnots {
                a: *a,
                b: *b,
                c: *c,
                d: *d,
            },
            initial_slope,
            final_slope,
            last_point: *a,
        })
    }

    /// Emits a polyline approximation within `tolerance` of the true curve
    /// through `sink(point, tangent)`. The first emitted point follows the
    /// curve origin (which the caller already has); the final point is the
    /// curve endpoint with the final tangent.
    pub fn decompose<F>(&mut self, tolerance: f64, sink: &mut F)
    where
        F: FnMut(Point, Slope),
    {
        let mut s1 = self.knots;
        self.last_point = s1.a;
        self.decompose_into(&mut s1, tolerance * tolerance, sink);

        let d = self.knots.d;
        let final_slope = self.final_slope;
        self.emit(d, final_slope, sink);
    }

    fn decompose_into<F>(&mut self, s1: &mut SplineKnots, tolerance_squared: f64, sink: &mut F)
    where
        F: FnMut(Point, Slope),
    {
        if error_squared(s1) < tolerance_squared {
            let (a, b) = (s1.a, s1.b);
            self.emit(a, Slope::new(&a, &b), sink);
            return;
        }

        let mut s2 = de_casteljau(s1);
        self.decompose_into(s1, tolerance_squared, sink);
        self.decompose_into(&mut s2, tolerance_squared, sink);
    }

    fn emit<F>(&mut self, point: Point, tangent: Slope, sink: &mut F)
    where
        F: FnMut(Point, Slope),
    {
        // Numerically coincident midpoints produce no output, which also
        // bounds the subdivision: a fully collapsed half has zero error.
        if point == self.last_point {
            return;
        }
        self.last_point = point;
        sink(point, tangent);
    }
}

#[inline]
fn midpoint(a: &Point, b: &Point) -> Point {
    Point::new(
        Fixed::from_bits(((a.x.to_bits() as i64 + b.x.to_bits() as i64) >> 1) as i32),
        Fixed::from_bits(((a.y.to_bits() as i64 + b.y.to_bits() as i64) >> 1) as i32),
    )
}

/// Splits `s1` in half at the midpoint; `s1` becomes the first half and the
/// second half is returned.
fn de_casteljau(s1: &mut SplineKnots) -> SplineKnots {
    let ab = midpoint(&s1.a, &s1.b);
    let bc = midpoint(&s1.b, &s1.c);
    let cd = midpoint(&s1.c, &s1.d);
    let abbc = midpoint(&ab, &bc);
    let bccd = midpoint(&bc, &cd);
    let mid = midpoint(&abbc, &bccd);

    let s2 = SplineKnots {
        a: mid,
        b: bccd,
        c: cd,
        d: s1.d,
    };

    s1.b = ab;
    s1.c = abbc;
    s1.d = mid;

    s2
}

/// Upper bound of the squared distance of the curve from its chord: the
/// larger of the two inner control points' squared distances from the
/// segment a-d.
fn error_squared(knots: &SplineKnots) -> f64 {
    let mut bdx = (knots.b.x - knots.a.x).to_f64();
    let mut bdy = (knots.b.y - knots.a.y).to_f64();

    let mut cdx = (knots.c.x - knots.a.x).to_f64();
    let mut cdy = (knots.c.y - knots.a.y).to_f64();

    if knots.a != knots.d {
        let dx = (knots.d.x - knots.a.x).to_f64();
        let dy = (knots.d.y - knots.a.y).to_f64();
        let v = dx * dx + dy * dy;

        let u = bdx * dx + bdy * dy;
        if u <= 0.0 {
            // b projects before a; distance to a is already right.
        } else if u >= v {
            bdx -= dx;
            bdy -= dy;
        } else {
            bdx -= u / v * dx;
            bdy -= u / v * dy;
        }

        let u = cdx * dx + cdy * dy;
        if u <= 0.0 {
        } else if u >= v {
            cdx -= dx;
            cdy -= dy;
        } else {
            cdx -= u / v * dx;
            cdy -= u / v * dy;
        }
    }

    let berr = bdx * bdx + bdy * bdy;
    let cerr = cdx * cdx + cdy * cdy;
    if berr > cerr {
        berr
    } else {
        cerr
    }
}

fn add_quadratic_extrema(a: f64, b: f64, c: f64, roots: &mut ArrayVec<[f64; 4]>) {
    // Roots of a*t^2 + b*t + c inside (0, 1).
    if a.abs() < 1e-30 {
        if b.abs() > 1e-30 {
            let t = -c / b;
            if t > 0.0 && t < 1.0 {
                roots.push(t);
            }
        }
        return;
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return;
    }
    let sq = disc.sqrt();
    for &t in &[(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)] {
        if t > 0.0 && t < 1.0 {
            roots.push(t);
        }
    }
}

fn sample(t: f64, x0: f64, x1: f64, x2: f64, x3: f64) -> f64 {
    let s = 1.0 - t;
    s * s * s * x0 + 3.0 * t * s * s * x1 + 3.0 * t * t * s * x2 + t * t * t * x3
}

/// Adds the axis extrema of the curve to `sink`, for bounding-box growth
/// when a control point escapes the box of the endpoints. The derivative of
/// each coordinate polynomial is quadratic; its roots inside (0, 1) are the
/// extremal parameters.
pub fn bound<F>(a: &Point, b: &Point, c: &Point, d: &Point, sink: &mut F)
where
    F: FnMut(Point),
{
    let x0 = a.x.to_f64();
    let x1 = b.x.to_f64();
    let x2 = c.x.to_f64();
    let x3 = d.x.to_f64();
    let y0 = a.y.to_f64();
    let y1 = b.y.to_f64();
    let y2 = c.y.to_f64();
    let y3 = d.y.to_f64();

    let mut roots: ArrayVec<[f64; 4]> = ArrayVec::new();

    // x'(t) / 3 = At^2 + Bt + C
    add_quadratic_extrema(
        3.0 * (x1 - x2) + x3 - x0,
        2.0 * (x0 - 2.0 * x1 + x2),
        x1 - x0,
        &mut roots,
    );
    add_quadratic_extrema(
        3.0 * (y1 - y2) + y3 - y0,
        2.0 * (y0 - 2.0 * y1 + y2),
        y1 - y0,
        &mut roots,
    );

    for &t in roots.iter() {
        let p = Point::from_f64(
            sample(t, x0, x1, x2, x3),
            sample(t, y0, y1, y2, y3),
        );
        sink(p);
    }
}

/// Conservative test of whether the curve may intersect `bbox`: any control
/// point inside, or any control polygon segment crossing the box. The curve
/// lies within the convex hull of its control points, so a miss here is
/// definitive.
pub fn intersects(a: &Point, b: &Point, c: &Point, d: &Point, bbox: &Box2D) -> bool {
    if bbox.contains_point(a)
        || bbox.contains_point(b)
        || bbox.contains_point(c)
        || bbox.contains_point(d)
    {
        return true;
    }

    bbox.intersects_segment(&Line::new(*a, *b))
        || bbox.intersects_segment(&Line::new(*b, *c))
        || bbox.intersects_segment(&Line::new(*c, *d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point;

    #[test]
    fn degenerate_curves_are_rejected() {
        let p = point(1.0, 1.0);
        assert!(Spline::new(&p, &p, &p, &p).is_none());

        // A curve with only coincident tangent legs is still a line.
        assert!(Spline::new(&p, &p, &point(2.0, 2.0), &point(2.0, 2.0)).is_none());
    }

    #[test]
    fn tangents_skip_degenerate_legs() {
        let s = Spline::new(
            &point(0.0, 0.0),
            &point(0.0, 0.0),
            &point(1.0, 0.0),
            &point(1.0, 1.0),
        )
        .unwrap();
        // a == b, so the initial tangent comes from a -> c.
        assert_eq!(s.initial_slope, Slope::new(&point(0.0, 0.0), &point(1.0, 0.0)));
        assert_eq!(s.final_slope, Slope::new(&point(1.0, 0.0), &point(1.0, 1.0)));
    }

    #[test]
    fn decompose_ends_at_endpoint() {
        let mut s = Spline::new(
            &point(0.0, 0.0),
            &point(3.0, 0.0),
            &point(3.0, 3.0),
            &point(0.0, 3.0),
        )
        .unwrap();

        let mut points = Vec::new();
        s.decompose(0.25, &mut |p, _| points.push(p));

        assert!(!points.is_empty());
        assert_eq!(*points.last().unwrap(), point(0.0, 3.0));
        // No consecutive duplicates.
        for w in points.windows(2) {
            assert_ne!(w[0], w[1]);
        }
    }

    #[test]
    fn decompose_respects_tolerance() {
        let a = point(0.0, 0.0);
        let b = point(3.0, 0.0);
        let c = point(3.0, 3.0);
        let d = point(0.0, 3.0);
        let mut s = Spline::new(&a, &b, &c, &d).unwrap();

        let mut points = vec![a];
        s.decompose(0.1, &mut |p, _| points.push(p));

        // Sample the true curve densely; every sample must be within
        // tolerance (plus fixed-point resolution) of the polyline.
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let x = sample(t, 0.0, 3.0, 3.0, 0.0);
            let y = sample(t, 0.0, 0.0, 3.0, 3.0);

            let mut best = f64::INFINITY;
            for w in points.windows(2) {
                let (p, q) = (w[0].to_f64(), w[1].to_f64());
                let (dx, dy) = (q.x - p.x, q.y - p.y);
                let len2 = dx * dx + dy * dy;
                let u = if len2 > 0.0 {
                    (((x - p.x) * dx + (y - p.y) * dy) / len2).max(0.0).min(1.0)
                } else {
                    0.0
                };
                let (ex, ey) = (p.x + u * dx - x, p.y + u * dy - y);
                best = best.min((ex * ex + ey * ey).sqrt());
            }
            assert!(best <= 0.1 + 2.0 / 256.0, "distance {} at t={}", best, t);
        }
    }

    #[test]
    fn bound_finds_extrema() {
        let mut points = Vec::new();
        bound(
            &point(0.0, 0.0),
            &point(-3.0, 1.0),
            &point(-3.0, 2.0),
            &point(0.0, 3.0),
            &mut |p| points.push(p),
        );
        let min_x = points.iter().map(|p| p.x).min().unwrap();
        assert_eq!(min_x, Fixed::from_f64(-2.25));
    }

    #[test]
    fn intersects_is_conservative() {
        let bbox = Box2D::from_integers(0, 0, 4, 4);
        assert!(intersects(
            &point(1.0, 1.0),
            &point(8.0, 8.0),
            &point(9.0, 9.0),
            &point(10.0, 10.0),
            &bbox,
        ));
        assert!(!intersects(
            &point(5.0, 5.0),
            &point(8.0, 8.0),
            &point(9.0, 9.0),
            &point(10.0, 10.0),
            &bbox,
        ));
    }
}
