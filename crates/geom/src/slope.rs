use crate::{Fixed, Point};

/// The direction vector between two fixed-point points.
///
/// Slopes are never divided out; every comparison happens on the cross
/// product of the two direction vectors so that near-vertical directions
/// lose no precision.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Slope {
    pub dx: Fixed,
    pub dy: Fixed,
}

impl Slope {
    #[inline]
    pub fn new(a: &Point, b: &Point) -> Self {
        Slope {
            dx: b.x - a.x,
            dy: b.y - a.y,
        }
    }

    #[inline]
    pub fn from_deltas(dx: Fixed, dy: Fixed) -> Self {
        Slope { dx, dy }
    }

    #[inline]
    pub fn reversed(self) -> Self {
        Slope {
            dx: -self.dx,
            dy: -self.dy,
        }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.dx.is_zero() && self.dy.is_zero()
    }

    /// Whether the two slopes describe the same direction (or exactly
    /// opposite ones): the cross product of the vectors is zero.
    #[inline]
    pub fn equal(&self, other: &Slope) -> bool {
        self.dy.to_bits() as i64 * other.dx.to_bits() as i64
            == other.dy.to_bits() as i64 * self.dx.to_bits() as i64
    }

    /// Whether `other` points backwards with respect to `self` (their dot
    /// product is negative).
    #[inline]
    pub fn backwards(&self, other: &Slope) -> bool {
        (self.dx.to_bits() as i64 * other.dx.to_bits() as i64)
            + (self.dy.to_bits() as i64 * other.dy.to_bits() as i64)
            < 0
    }

    /// Compares the angle of `self` to the angle of `other`: the sign of
    /// `self.dy * other.dx - other.dy * self.dx` computed in 64 bits.
    ///
    /// Zero vectors compare equal to each other and less than everything
    /// else. Directions that differ by exactly pi are disambiguated by
    /// nudging `other` an infinitesimal amount backwards, so `self` wins.
    ///
    /// Note the asymmetry callers rely on when ordering edges by their
    /// top-to-bottom direction vectors: for two edges sharing their top
    /// point this sorts them left to right, while for two edges sharing
    /// their bottom point the sense of the result is exactly reversed.
    pub fn compare(&self, other: &Slope) -> i32 {
        let l = self.dy.to_bits() as i64 * other.dx.to_bits() as i64;
        let r = other.dy.to_bits() as i64 * self.dx.to_bits() as i64;
        if l > r {
            return 1;
        }
        if l < r {
            return -1;
        }

        // Special-case zero vectors: they compare equal to each other and
        // less than any non-zero vector.
        if self.is_zero() && other.is_zero() {
            return 0;
        }
        if self.is_zero() {
            return -1;
        }
        if other.is_zero() {
            return 1;
        }

        // Two vectors that are either equal or differ by exactly pi; a sign
        // change in either component identifies the latter.
        if (self.dx.to_bits() ^ other.dx.to_bits()) < 0
            || (self.dy.to_bits() ^ other.dy.to_bits()) < 0
        {
            return 1;
        }

        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point;

    fn slope(dx: f64, dy: f64) -> Slope {
        Slope::new(&point(0.0, 0.0), &point(dx, dy))
    }

    #[test]
    fn compare_orders_by_angle() {
        // With y growing downward, a vector pointing further "up" for the
        // same dx has a smaller dy; the cross product ordering follows.
        assert!(slope(1.0, 0.0).compare(&slope(1.0, 1.0)) < 0);
        assert!(slope(1.0, 2.0).compare(&slope(1.0, 1.0)) > 0);
        assert_eq!(slope(1.0, 1.0).compare(&slope(2.0, 2.0)), 0);
    }

    #[test]
    fn compare_antiparallel_first_wins() {
        assert!(slope(1.0, 0.0).compare(&slope(-1.0, 0.0)) > 0);
        assert!(slope(-1.0, 0.0).compare(&slope(1.0, 0.0)) > 0);
    }

    #[test]
    fn compare_zero_vectors() {
        assert_eq!(slope(0.0, 0.0).compare(&slope(0.0, 0.0)), 0);
        assert!(slope(0.0, 0.0).compare(&slope(1.0, 0.0)) < 0);
        assert!(slope(1.0, 0.0).compare(&slope(0.0, 0.0)) > 0);
    }

    #[test]
    fn equal_and_backwards() {
        assert!(slope(1.0, 1.0).equal(&slope(3.0, 3.0)));
        assert!(slope(1.0, 1.0).equal(&slope(-1.0, -1.0)));
        assert!(!slope(1.0, 1.0).equal(&slope(1.0, 2.0)));

        assert!(slope(1.0, 0.0).backwards(&slope(-1.0, 0.1)));
        assert!(!slope(1.0, 0.0).backwards(&slope(1.0, 5.0)));
    }
}
