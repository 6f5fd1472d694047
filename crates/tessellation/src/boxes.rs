//! Accumulator of axis-aligned boxes.

use crate::geom::{Box2D, Point};
use crate::Antialias;
use smallvec::SmallVec;

/// An append-only set of boxes with optional clip limits.
///
/// Boxes are stored with `p1.y < p2.y` but may keep `p1.x > p2.x` to carry
/// a reversed winding through rectilinear tessellation. The
/// `is_pixel_aligned` hint stays true only while every stored box has all
/// integer corners.
#[derive(Clone, Debug)]
pub struct Boxes {
    boxes: SmallVec<[Box2D; 32]>,
    limits: Vec<Box2D>,
    limit: Box2D,
    is_pixel_aligned: bool,
}

impl Default for Boxes {
    fn default() -> Self {
        Boxes::new()
    }
}

impl Boxes {
    pub fn new() -> Self {
        Boxes {
            boxes: SmallVec::new(),
            limits: Vec::new(),
            limit: Box2D::from_point(&Point::default()),
            is_pixel_aligned: true,
        }
    }

    /// A set holding the single integer rectangle.
    pub fn from_rectangle(x: i32, y: i32, w: i32, h: i32) -> Self {
        let mut boxes = Boxes::new();
        boxes.boxes.push(Box2D::from_integers(x, y, w, h));
        boxes
    }

    /// Restricts every subsequent add to the given limit boxes.
    pub fn limit(&mut self, limits: &[Box2D]) {
        self.limits = limits.to_vec();
        if let Some((first, rest)) = limits.split_first() {
            let mut limit = *first;
            for b in rest {
                limit.add_box(b);
            }
            self.limit = limit;
        }
    }

    #[inline]
    pub fn limits(&self) -> &[Box2D] {
        &self.limits
    }

    pub(crate) fn clear_limits(&mut self) {
        self.limits.clear();
    }

    #[inline]
    pub fn boxes(&self) -> &[Box2D] {
        &self.boxes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    #[inline]
    pub fn is_pixel_aligned(&self) -> bool {
        self.is_pixel_aligned
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.is_pixel_aligned = true;
    }

    pub fn for_each_box<F: FnMut(&Box2D) -> bool>(&self, mut f: F) -> bool {
        for b in self.boxes.iter() {
            if !f(b) {
                return false;
            }
        }
        true
    }

    /// Bounding box of the content; the zero box when empty.
    pub fn extents(&self) -> Box2D {
        let mut iter = self.boxes.iter();
        let mut extents = match iter.next() {
            Some(b) => *b,
            None => return Box2D::from_point(&Point::default()),
        };
        for b in iter {
            extents.add_box(b);
        }
        extents
    }

    fn push(&mut self, b: &Box2D) {
        self.boxes.push(*b);
        if self.is_pixel_aligned {
            self.is_pixel_aligned = b.is_pixel_aligned();
        }
    }

    /// Appends a box. Without antialiasing every corner snaps to the pixel
    /// grid first (halfway down). Degenerate boxes are dropped. With limits
    /// present, the input is intersected against every limit box, emitting
    /// one clipped box per overlapped limit and preserving a reversed x
    /// winding.
    pub fn add(&mut self, antialias: Antialias, bbox: &Box2D) {
        let mut b = *bbox;
        if antialias == Antialias::None {
            b.p1.x = b.p1.x.round_down();
            b.p1.y = b.p1.y.round_down();
            b.p2.x = b.p2.x.round_down();
            b.p2.y = b.p2.y.round_down();
        }

        if b.p1.y == b.p2.y {
            return;
        }
        if b.p1.x == b.p2.x {
            return;
        }

        if self.limits.is_empty() {
            self.push(&b);
            return;
        }

        // Support counter-clockwise winding for rectangular tessellation.
        let mut reversed = false;
        let (x1, x2) = if b.p1.x < b.p2.x {
            (b.p1.x, b.p2.x)
        } else {
            reversed = !reversed;
            (b.p2.x, b.p1.x)
        };

        if x1 >= self.limit.p2.x || x2 <= self.limit.p1.x {
            return;
        }

        let (y1, y2) = if b.p1.y < b.p2.y {
            (b.p1.y, b.p2.y)
        } else {
            reversed = !reversed;
            (b.p2.y, b.p1.y)
        };

        if y1 >= self.limit.p2.y || y2 <= self.limit.p1.y {
            return;
        }

        for n in 0..self.limits.len() {
            let limits = self.limits[n];

            if x1 >= limits.p2.x || x2 <= limits.p1.x {
                continue;
            }
            if y1 >= limits.p2.y || y2 <= limits.p1.y {
                continue;
            }

            let cx1 = x1.max(limits.p1.x);
            let cy1 = y1.max(limits.p1.y);
            let cx2 = x2.min(limits.p2.x);
            let cy2 = y2.min(limits.p2.y);

            if cy2 <= cy1 || cx2 <= cx1 {
                continue;
            }

            let clipped = if reversed {
                Box2D::new(Point::new(cx2, cy1), Point::new(cx1, cy2))
            } else {
                Box2D::new(Point::new(cx1, cy1), Point::new(cx2, cy2))
            };
            self.push(&clipped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{point, Fixed};

    #[test]
    fn degenerate_boxes_are_dropped() {
        let mut boxes = Boxes::new();
        boxes.add(Antialias::Default, &Box2D::from_integers(1, 1, 0, 5));
        boxes.add(Antialias::Default, &Box2D::from_integers(1, 1, 5, 0));
        assert!(boxes.is_empty());
    }

    #[test]
    fn antialias_none_snaps_to_grid() {
        let mut boxes = Boxes::new();
        let b = Box2D::canonical(&point(0.25, 0.75), &point(4.75, 3.25));
        boxes.add(Antialias::None, &b);

        assert_eq!(boxes.len(), 1);
        assert!(boxes.is_pixel_aligned());
        assert_eq!(boxes.boxes()[0], Box2D::from_integers(0, 1, 5, 2));
    }

    #[test]
    fn pixel_alignment_hint_is_sticky() {
        let mut boxes = Boxes::new();
        boxes.add(Antialias::Default, &Box2D::from_integers(0, 0, 1, 1));
        assert!(boxes.is_pixel_aligned());

        boxes.add(
            Antialias::Default,
            &Box2D::canonical(&point(2.5, 0.0), &point(4.0, 1.0)),
        );
        assert!(!boxes.is_pixel_aligned());
    }

    #[test]
    fn limits_clip_and_split() {
        let mut boxes = Boxes::new();
        boxes.limit(&[
            Box2D::from_integers(0, 0, 2, 4),
            Box2D::from_integers(3, 0, 2, 4),
        ]);

        // One input box overlapping both limit regions emits two boxes.
        boxes.add(Antialias::Default, &Box2D::from_integers(1, 1, 3, 1));
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes.boxes()[0], Box2D::from_integers(1, 1, 1, 1));
        assert_eq!(boxes.boxes()[1], Box2D::from_integers(3, 1, 1, 1));

        // Entirely outside the union: nothing.
        boxes.add(Antialias::Default, &Box2D::from_integers(7, 0, 2, 2));
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn reversed_winding_survives_clipping() {
        let mut boxes = Boxes::new();
        boxes.limit(&[Box2D::from_integers(0, 0, 4, 4)]);

        // A box given in reversed x order keeps its orientation.
        let b = Box2D::new(point(6.0, 1.0), point(1.0, 3.0));
        boxes.add(Antialias::Default, &b);

        assert_eq!(boxes.len(), 1);
        let clipped = boxes.boxes()[0];
        assert!(clipped.p1.x > clipped.p2.x);
        assert_eq!(clipped.p1.x, Fixed::from_int(4));
        assert_eq!(clipped.p2.x, Fixed::from_int(1));
    }

    #[test]
    fn extents_unions_content() {
        let mut boxes = Boxes::new();
        boxes.add(Antialias::Default, &Box2D::from_integers(0, 0, 1, 1));
        boxes.add(Antialias::Default, &Box2D::from_integers(3, 2, 2, 2));

        let e = boxes.extents();
        assert_eq!(e.p1, point(0.0, 0.0));
        assert_eq!(e.p2, point(5.0, 4.0));
    }
}
