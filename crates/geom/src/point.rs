use crate::math::{dpoint, DPoint};
use crate::Fixed;

/// A point in 24.8 fixed-point device space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: Fixed,
    pub y: Fixed,
}

impl Point {
    #[inline]
    pub fn new(x: Fixed, y: Fixed) -> Self {
        Point { x, y }
    }

    #[inline]
    pub fn from_f64(x: f64, y: f64) -> Self {
        Point {
            x: Fixed::from_f64(x),
            y: Fixed::from_f64(y),
        }
    }

    #[inline]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Point {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
        }
    }

    #[inline]
    pub fn to_f64(self) -> DPoint {
        dpoint(self.x.to_f64(), self.y.to_f64())
    }

    #[inline]
    pub fn translate(self, dx: Fixed, dy: Fixed) -> Self {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Shorthand for `Point::from_f64`.
#[inline]
pub fn point(x: f64, y: f64) -> Point {
    Point::from_f64(x, y)
}
