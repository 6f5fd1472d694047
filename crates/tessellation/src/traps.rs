//! The trapezoid store filled by the tessellators.

use crate::boxes::Boxes;
use crate::geom::{Box2D, Fixed, Line, Point};
use crate::Antialias;
use smallvec::SmallVec;

/// A trapezoid: the region between `left` and `right` within the
/// horizontal band `[top, bottom]`. The two lines must not cross inside
/// the band.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Trapezoid {
    pub top: Fixed,
    pub bottom: Fixed,
    pub left: Line,
    pub right: Line,
}

impl Trapezoid {
    /// Whether the point (in doubles) lies inside this trapezoid.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if y < self.top.to_f64() || y > self.bottom.to_f64() {
            return false;
        }

        let line_x = |line: &Line| -> f64 {
            let p1 = line.p1.to_f64();
            let p2 = line.p2.to_f64();
            if p1.y == p2.y {
                return p1.x;
            }
            p1.x + (y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y)
        };

        line_x(&self.left) <= x && x <= line_x(&self.right)
    }
}

/// Append-only store of trapezoids.
///
/// `is_rectilinear` is only ever set by the rectilinear tessellator, whose
/// output has purely vertical sides. Conversion to boxes (and from there to
/// an integer region) is only valid for such content.
#[derive(Clone, Debug, Default)]
pub struct Traps {
    traps: SmallVec<[Trapezoid; 16]>,
    limits: Vec<Box2D>,
    is_rectilinear: bool,
}

impl Traps {
    pub fn new() -> Self {
        Traps {
            traps: SmallVec::new(),
            limits: Vec::new(),
            is_rectilinear: false,
        }
    }

    pub fn with_limits(limits: &[Box2D]) -> Self {
        let mut traps = Traps::new();
        traps.limits = limits.to_vec();
        traps
    }

    #[inline]
    pub fn traps(&self) -> &[Trapezoid] {
        &self.traps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.traps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    #[inline]
    pub fn limits(&self) -> &[Box2D] {
        &self.limits
    }

    #[inline]
    pub fn is_rectilinear(&self) -> bool {
        self.is_rectilinear
    }

    pub(crate) fn set_rectilinear(&mut self, value: bool) {
        self.is_rectilinear = value;
    }

    pub fn clear(&mut self) {
        self.traps.clear();
        self.is_rectilinear = false;
    }

    /// Appends one trapezoid. Inverted bands are a caller bug; they assert
    /// in debug builds and are dropped in release builds.
    pub fn add_trap(&mut self, top: Fixed, bottom: Fixed, left: &Line, right: &Line) {
        debug_assert!(top < bottom);
        debug_assert!(left.p1.y != left.p2.y);
        debug_assert!(right.p1.y != right.p2.y);

        if top >= bottom {
            return;
        }

        self.traps.push(Trapezoid {
            top,
            bottom,
            left: *left,
            right: *right,
        });
    }

    /// Whether any stored trapezoid contains the point.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.traps.iter().any(|t| t.contains(x, y))
    }

    /// Bounding box of the stored trapezoids; the zero box when empty.
    pub fn extents(&self) -> Box2D {
        if self.traps.is_empty() {
            return Box2D::from_point(&Point::default());
        }

        let first = &self.traps[0];
        let mut extents = Box2D::new(
            Point::new(first.left.x_for_y(first.top), first.top),
            Point::new(first.right.x_for_y(first.top), first.bottom),
        );
        for trap in self.traps.iter() {
            if trap.top < extents.p1.y {
                extents.p1.y = trap.top;
            }
            if trap.bottom > extents.p2.y {
                extents.p2.y = trap.bottom;
            }

            for x in &[trap.left.x_for_y(trap.top), trap.left.x_for_y(trap.bottom)] {
                if *x < extents.p1.x {
                    extents.p1.x = *x;
                }
            }
            for x in &[trap.right.x_for_y(trap.top), trap.right.x_for_y(trap.bottom)] {
                if *x > extents.p2.x {
                    extents.p2.x = *x;
                }
            }
        }
        extents
    }

    /// Converts rectilinear, non-overlapping trap content into boxes.
    /// Returns `None` when any trapezoid has a non-vertical side.
    pub fn to_boxes(&self, antialias: Antialias) -> Option<Boxes> {
        let mut boxes = Boxes::new();

        for trap in self.traps.iter() {
            if !trap.left.is_vertical() || !trap.right.is_vertical() {
                return None;
            }

            let b = Box2D::new(
                Point::new(trap.left.p1.x, trap.top),
                Point::new(trap.right.p1.x, trap.bottom),
            );
            boxes.add(antialias, &b);
        }

        Some(boxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    fn vline(x: f64, y1: f64, y2: f64) -> Line {
        Line::new(point(x, y1), point(x, y2))
    }

    #[test]
    fn add_and_contain() {
        let mut traps = Traps::new();
        traps.add_trap(
            Fixed::from_int(0),
            Fixed::from_int(4),
            &vline(1.0, 0.0, 4.0),
            &vline(3.0, 0.0, 4.0),
        );

        assert!(traps.contains(2.0, 2.0));
        assert!(!traps.contains(0.5, 2.0));
        assert!(!traps.contains(2.0, 5.0));
    }

    #[test]
    fn slanted_trap_contains() {
        // The left side leans right as y grows.
        let mut traps = Traps::new();
        traps.add_trap(
            Fixed::from_int(0),
            Fixed::from_int(4),
            &Line::new(point(0.0, 0.0), point(4.0, 4.0)),
            &vline(5.0, 0.0, 4.0),
        );

        assert!(traps.contains(4.5, 4.0));
        assert!(!traps.contains(1.0, 3.0));
    }

    #[test]
    fn extents_and_boxes() {
        let mut traps = Traps::new();
        traps.add_trap(
            Fixed::from_int(1),
            Fixed::from_int(3),
            &vline(1.0, 1.0, 3.0),
            &vline(4.0, 1.0, 3.0),
        );

        let e = traps.extents();
        assert_eq!(e.p1, point(1.0, 1.0));
        assert_eq!(e.p2, point(4.0, 3.0));

        let boxes = traps.to_boxes(Antialias::Default).unwrap();
        assert_eq!(boxes.boxes().len(), 1);
        assert!(boxes.is_pixel_aligned());
    }

    #[test]
    fn to_boxes_rejects_slants() {
        let mut traps = Traps::new();
        traps.add_trap(
            Fixed::from_int(0),
            Fixed::from_int(4),
            &Line::new(point(0.0, 0.0), point(4.0, 4.0)),
            &vline(5.0, 0.0, 4.0),
        );
        assert!(traps.to_boxes(Antialias::Default).is_none());
    }
}
