use crate::{spline, Fixed, Line, Point};

/// An axis-aligned box given by two corner points.
///
/// Canonical boxes keep `p1 <= p2` componentwise. Non-canonical (free form)
/// boxes are permitted in a few internal spots that track winding through
/// the corner order; every constructor here produces the canonical form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Box2D {
    pub p1: Point,
    pub p2: Point,
}

/// An integer rectangle, produced by rounding a box outwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Box2D {
    #[inline]
    pub fn new(p1: Point, p2: Point) -> Self {
        Box2D { p1, p2 }
    }

    /// Builds the canonical box spanned by two arbitrary corner points.
    pub fn canonical(a: &Point, b: &Point) -> Self {
        let (x1, x2) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        let (y1, y2) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        Box2D {
            p1: Point::new(x1, y1),
            p2: Point::new(x2, y2),
        }
    }

    #[inline]
    pub fn from_integers(x: i32, y: i32, w: i32, h: i32) -> Self {
        Box2D {
            p1: Point::from_ints(x, y),
            p2: Point::from_ints(x + w, y + h),
        }
    }

    #[inline]
    pub fn from_point(p: &Point) -> Self {
        Box2D { p1: *p, p2: *p }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.p1.x >= self.p2.x || self.p1.y >= self.p2.y
    }

    #[inline]
    pub fn contains_point(&self, p: &Point) -> bool {
        self.p1.x <= p.x && p.x <= self.p2.x && self.p1.y <= p.y && p.y <= self.p2.y
    }

    #[inline]
    pub fn contains_box(&self, other: &Box2D) -> bool {
        self.p1.x <= other.p1.x
            && self.p2.x >= other.p2.x
            && self.p1.y <= other.p1.y
            && self.p2.y >= other.p2.y
    }

    #[inline]
    pub fn add_point(&mut self, p: &Point) {
        if p.x < self.p1.x {
            self.p1.x = p.x;
        } else if p.x > self.p2.x {
            self.p2.x = p.x;
        }
        if p.y < self.p1.y {
            self.p1.y = p.y;
        } else if p.y > self.p2.y {
            self.p2.y = p.y;
        }
    }

    #[inline]
    pub fn add_box(&mut self, other: &Box2D) {
        if other.p1.x < self.p1.x {
            self.p1.x = other.p1.x;
        }
        if other.p2.x > self.p2.x {
            self.p2.x = other.p2.x;
        }
        if other.p1.y < self.p1.y {
            self.p1.y = other.p1.y;
        }
        if other.p2.y > self.p2.y {
            self.p2.y = other.p2.y;
        }
    }

    /// Grows the box to cover a cubic bézier from `a` (assumed already
    /// added) with control points `b`, `c` and endpoint `d`. When both
    /// control points already lie inside, the endpoint alone is enough;
    /// otherwise the curve's axis extrema are added.
    pub fn add_curve_to(&mut self, a: &Point, b: &Point, c: &Point, d: &Point) {
        self.add_point(d);
        if !self.contains_point(b) || !self.contains_point(c) {
            spline::bound(a, b, c, d, &mut |p| self.add_point(&p));
        }
    }

    #[inline]
    pub fn is_pixel_aligned(&self) -> bool {
        let mut f = 0;
        f |= self.p1.x.fractional_part();
        f |= self.p1.y.fractional_part();
        f |= self.p2.x.fractional_part();
        f |= self.p2.y.fractional_part();
        f == 0
    }

    /// Rounds outwards to the containing integer rectangle.
    pub fn round_to_integer_rect(&self) -> IntRect {
        let x = self.p1.x.integer_floor();
        let y = self.p1.y.integer_floor();
        IntRect {
            x,
            y,
            width: self.p2.x.integer_ceil() - x,
            height: self.p2.y.integer_ceil() - y,
        }
    }

    /// Whether any part of `line` intersects the box.
    ///
    /// Computes whether the ray starting at `line.p1` towards `line.p2`
    /// enters the box before reaching `p2`, using only 64-bit
    /// intermediates: the parametric entry/exit intervals per axis are
    /// compared cross-multiplied rather than divided out.
    pub fn intersects_segment(&self, line: &Line) -> bool {
        if self.contains_point(&line.p1) || self.contains_point(&line.p2) {
            return true;
        }

        let zero = Fixed::from_int(0);
        let mut t1 = zero;
        let mut t2 = zero;
        let mut t3 = zero;
        let mut t4 = zero;

        let mut xlen = line.p2.x - line.p1.x;
        let mut ylen = line.p2.y - line.p1.y;

        if !xlen.is_zero() {
            if xlen > zero {
                t1 = self.p1.x - line.p1.x;
                t2 = self.p2.x - line.p1.x;
            } else {
                t1 = line.p1.x - self.p2.x;
                t2 = line.p1.x - self.p1.x;
                xlen = -xlen;
            }

            if (t1 < zero || t1 > xlen) && (t2 < zero || t2 > xlen) {
                return false;
            }
        } else {
            // Fully vertical line: check that x is in bounds.
            if line.p1.x < self.p1.x || line.p1.x > self.p2.x {
                return false;
            }
        }

        if !ylen.is_zero() {
            if ylen > zero {
                t3 = self.p1.y - line.p1.y;
                t4 = self.p2.y - line.p1.y;
            } else {
                t3 = line.p1.y - self.p2.y;
                t4 = line.p1.y - self.p1.y;
                ylen = -ylen;
            }

            if (t3 < zero || t3 > ylen) && (t4 < zero || t4 > ylen) {
                return false;
            }
        } else {
            // Fully horizontal line: check y.
            if line.p1.y < self.p1.y || line.p1.y > self.p2.y {
                return false;
            }
        }

        // An axis-aligned line has already been fully checked.
        if line.p1.x == line.p2.x || line.p1.y == line.p2.y {
            return true;
        }

        // Check that the parametric intervals overlap; t1 < t2 and t3 < t4.
        let t1y = t1.to_bits() as i64 * ylen.to_bits() as i64;
        let t2y = t2.to_bits() as i64 * ylen.to_bits() as i64;
        let t3x = t3.to_bits() as i64 * xlen.to_bits() as i64;
        let t4x = t4.to_bits() as i64 * xlen.to_bits() as i64;

        t1y < t4x && t3x < t2y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point;

    #[test]
    fn canonical_swaps_corners() {
        let b = Box2D::canonical(&point(4.0, 1.0), &point(1.0, 4.0));
        assert_eq!(b.p1, point(1.0, 1.0));
        assert_eq!(b.p2, point(4.0, 4.0));
    }

    #[test]
    fn add_point_grows() {
        let mut b = Box2D::from_point(&point(1.0, 1.0));
        b.add_point(&point(3.0, 0.0));
        assert_eq!(b.p1, point(1.0, 0.0));
        assert_eq!(b.p2, point(3.0, 1.0));
    }

    #[test]
    fn pixel_alignment() {
        assert!(Box2D::from_integers(0, 0, 2, 2).is_pixel_aligned());
        assert!(!Box2D::canonical(&point(0.5, 0.0), &point(2.0, 2.0)).is_pixel_aligned());
    }

    #[test]
    fn round_to_integer_rect_rounds_outwards() {
        let b = Box2D::canonical(&point(0.25, -0.75), &point(2.5, 3.25));
        let r = b.round_to_integer_rect();
        assert_eq!((r.x, r.y, r.width, r.height), (0, -1, 3, 5));
    }

    #[test]
    fn segment_intersection() {
        let b = Box2D::from_integers(0, 0, 4, 4);

        // Crossing diagonally through the interior without an endpoint inside.
        let l = Line::new(point(-2.0, -1.0), point(3.0, 6.0));
        assert!(b.intersects_segment(&l));

        // Passing well outside.
        let l = Line::new(point(-2.0, -2.0), point(6.0, -1.0));
        assert!(!b.intersects_segment(&l));

        // A diagonal clipping only the corner region misses the box.
        let l = Line::new(point(3.0, -2.0), point(8.0, 3.0));
        assert!(!b.intersects_segment(&l));

        // Endpoint inside.
        let l = Line::new(point(1.0, 1.0), point(9.0, 9.0));
        assert!(b.intersects_segment(&l));
    }

    #[test]
    fn add_curve_to_covers_extrema() {
        // A curve bulging left of the chord between its endpoints.
        let a = point(0.0, 0.0);
        let bp = point(-3.0, 1.0);
        let c = point(-3.0, 2.0);
        let d = point(0.0, 3.0);

        let mut b = Box2D::from_point(&a);
        b.add_curve_to(&a, &bp, &c, &d);
        // The extremum sits at x = -2.25 (t = 0.5); the box must reach it
        // but not as far as the control polygon.
        assert!(b.p1.x <= Fixed::from_f64(-2.25));
        assert!(b.p1.x > Fixed::from_f64(-3.0));
    }
}
