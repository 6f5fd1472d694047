//! The polygon representation consumed by the tessellators: a flat list of
//! downward-directed edges with winding directions, optionally clipped
//! against a set of limit boxes.

use crate::geom::{Box2D, Fixed, Line, Point};
use smallvec::SmallVec;

/// One polygon edge: a line bounded to the `[top, bottom]` band, directed
/// downward, winding `dir` (+1 for an edge that originally pointed down,
/// -1 for one that pointed up).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Edge {
    pub line: Line,
    pub top: Fixed,
    pub bottom: Fixed,
    pub dir: i32,
}

/// An ordered list of external edges plus an extents box and optional clip
/// limits. While limits are set, every added edge is clipped to the union
/// band and split per limit region; portions that stick out sideways are
/// replaced by vertical edges pinned to the limit boundary so the winding
/// seen inside the limits is unchanged.
#[derive(Clone, Debug)]
pub struct Polygon {
    edges: SmallVec<[Edge; 32]>,
    extents: Option<Box2D>,
    limits: Vec<Box2D>,
    limit: Box2D,
}

impl Default for Polygon {
    fn default() -> Self {
        Polygon::new()
    }
}

impl Polygon {
    pub fn new() -> Self {
        Polygon {
            edges: SmallVec::new(),
            extents: None,
            limits: Vec::new(),
            limit: Box2D::from_point(&Point::default()),
        }
    }

    pub fn with_limits(limits: &[Box2D]) -> Self {
        let mut polygon = Polygon::new();
        polygon.set_limits(limits);
        polygon
    }

    pub fn set_limits(&mut self, limits: &[Box2D]) {
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
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn limits(&self) -> &[Box2D] {
        &self.limits
    }

    /// The union of the limit boxes, if any are set.
    pub fn limit(&self) -> Option<Box2D> {
        if self.limits.is_empty() {
            None
        } else {
            Some(self.limit)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
            || self
                .extents
                .map_or(true, |e| e.p2.x <= e.p1.x)
    }

    /// Bounding box of all added edges; `None` while the polygon is empty.
    #[inline]
    pub fn extents(&self) -> Option<Box2D> {
        self.extents
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.extents = None;
    }

    /// Adds one edge of the filled outline, from `p1` to `p2` in path
    /// direction. Horizontal edges carry no winding and are dropped.
    pub fn add_external_edge(&mut self, p1: &Point, p2: &Point) {
        self.add_directed_edge(p1, p2, 1);
    }

    fn add_directed_edge(&mut self, p1: &Point, p2: &Point, dir: i32) {
        if p1.y == p2.y {
            return;
        }

        let (p1, p2, dir) = if p1.y > p2.y { (p2, p1, -dir) } else { (p1, p2, dir) };

        if self.limits.is_empty() {
            self.add_edge(p1, p2, p1.y, p2.y, dir);
        } else {
            if p2.y <= self.limit.p1.y || p1.y >= self.limit.p2.y {
                return;
            }
            self.add_clipped_edge(p1, p2, p1.y, p2.y, dir);
        }
    }

    fn add_edge(&mut self, p1: &Point, p2: &Point, top: Fixed, bottom: Fixed, dir: i32) {
        debug_assert!(top < bottom);

        let line = Line::new(*p1, *p2);
        self.edges.push(Edge {
            line,
            top,
            bottom,
            dir,
        });

        // Grow the extents; the x reach of a trimmed edge is where its line
        // crosses the band, not necessarily an endpoint.
        let extents = self
            .extents
            .get_or_insert_with(|| Box2D::new(Point::new(p1.x, top), Point::new(p1.x, bottom)));

        if top < extents.p1.y {
            extents.p1.y = top;
        }
        if bottom > extents.p2.y {
            extents.p2.y = bottom;
        }

        for (endpoint, boundary) in &[(p1, top), (p2, bottom)] {
            if endpoint.x < extents.p1.x || endpoint.x > extents.p2.x {
                let mut x = endpoint.x;
                if *boundary != endpoint.y {
                    x = line.x_for_y(*boundary);
                }
                if x < extents.p1.x {
                    extents.p1.x = x;
                }
                if x > extents.p2.x {
                    extents.p2.x = x;
                }
            }
        }
    }

    fn add_clipped_edge(&mut self, p1: &Point, p2: &Point, top: Fixed, bottom: Fixed, dir: i32) {
        for n in 0..self.limits.len() {
            let limits = self.limits[n];

            if top >= limits.p2.y || bottom <= limits.p1.y {
                continue;
            }

            let bot_left = Point::new(limits.p1.x, limits.p2.y);
            let top_right = Point::new(limits.p2.x, limits.p1.y);

            // The band of the edge inside this limit.
            let mut top_y = top.max(limits.p1.y);
            let bot_y = bottom.min(limits.p2.y);

            // The projection of the edge on the horizontal axis.
            let pleft = p1.x.min(p2.x);
            let pright = p1.x.max(p2.x);

            if limits.p1.x <= pleft && pright <= limits.p2.x {
                // Fully contained horizontally: clip vertically only.
                self.add_edge(p1, p2, top_y, bot_y, dir);
            } else if pright <= limits.p1.x {
                // Entirely to the left: replace with the limit's left side.
                self.add_edge(&limits.p1, &bot_left, top_y, bot_y, dir);
            } else if limits.p2.x <= pleft {
                // Entirely to the right: replace with the limit's right side.
                self.add_edge(&top_right, &limits.p2, top_y, bot_y, dir);
            } else {
                // The edge and the limit intersect in a generic way: split
                // into up to three parts, substituting the limit sides for
                // the portions that stick out.
                let line = Line::new(*p1, *p2);
                let top_left_to_bottom_right = p1.x <= p2.x;

                if top_left_to_bottom_right {
                    let mut left_y;
                    if pleft >= limits.p1.x {
                        left_y = top_y;
                    } else {
                        left_y = line.y_for_x(limits.p1.x);
                        if line.x_for_y(left_y) < limits.p1.x {
                            left_y += Fixed::EPSILON;
                        }
                    }

                    left_y = left_y.min(bot_y);
                    if top_y < left_y {
                        self.add_edge(&limits.p1, &bot_left, top_y, left_y, dir);
                        top_y = left_y;
                    }

                    let right_y;
                    if pright <= limits.p2.x {
                        right_y = bot_y;
                    } else {
                        let mut y = line.y_for_x(limits.p2.x);
                        if line.x_for_y(y) > limits.p2.x {
                            y -= Fixed::EPSILON;
                        }
                        right_y = y;
                    }

                    if top_y < right_y {
                        self.add_edge(p1, p2, top_y, right_y, dir);
                        top_y = right_y;
                    }

                    if top_y < bot_y {
                        self.add_edge(&top_right, &limits.p2, top_y, bot_y, dir);
                    }
                } else {
                    let mut right_y;
                    if pright <= limits.p2.x {
                        right_y = top_y;
                    } else {
                        right_y = line.y_for_x(limits.p2.x);
                        if line.x_for_y(right_y) > limits.p2.x {
                            right_y += Fixed::EPSILON;
                        }
                    }

                    right_y = right_y.min(bot_y);
                    if top_y < right_y {
                        self.add_edge(&top_right, &limits.p2, top_y, right_y, dir);
                        top_y = right_y;
                    }

                    let left_y;
                    if pleft >= limits.p1.x {
                        left_y = bot_y;
                    } else {
                        let mut y = line.y_for_x(limits.p1.x);
                        if line.x_for_y(y) < limits.p1.x {
                            y -= Fixed::EPSILON;
                        }
                        left_y = y;
                    }

                    if top_y < left_y {
                        self.add_edge(p1, p2, top_y, left_y, dir);
                        top_y = left_y;
                    }

                    if top_y < bot_y {
                        self.add_edge(&limits.p1, &bot_left, top_y, bot_y, dir);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    #[test]
    fn horizontal_edges_are_dropped() {
        let mut polygon = Polygon::new();
        polygon.add_external_edge(&point(0.0, 1.0), &point(5.0, 1.0));
        assert_eq!(polygon.num_edges(), 0);
        assert!(polygon.is_empty());
    }

    #[test]
    fn upward_edges_reverse_direction() {
        let mut polygon = Polygon::new();
        polygon.add_external_edge(&point(0.0, 4.0), &point(0.0, 0.0));

        let e = polygon.edges()[0];
        assert_eq!(e.dir, -1);
        assert!(e.line.p1.y < e.line.p2.y);
        assert_eq!(e.top, Fixed::from_int(0));
        assert_eq!(e.bottom, Fixed::from_int(4));
    }

    #[test]
    fn extents_cover_edges() {
        let mut polygon = Polygon::new();
        polygon.add_external_edge(&point(1.0, 0.0), &point(3.0, 4.0));
        polygon.add_external_edge(&point(3.0, 4.0), &point(0.0, 2.0));

        let e = polygon.extents().unwrap();
        assert_eq!(e.p1, point(0.0, 0.0));
        assert_eq!(e.p2, point(3.0, 4.0));
    }

    #[test]
    fn limits_clip_vertically() {
        let limit = Box2D::from_integers(0, 1, 10, 2);
        let mut polygon = Polygon::with_limits(&[limit]);
        polygon.add_external_edge(&point(2.0, 0.0), &point(2.0, 5.0));

        assert_eq!(polygon.num_edges(), 1);
        let e = polygon.edges()[0];
        assert_eq!(e.top, Fixed::from_int(1));
        assert_eq!(e.bottom, Fixed::from_int(3));

        // Edges outside the limit band vanish entirely.
        let mut polygon = Polygon::with_limits(&[limit]);
        polygon.add_external_edge(&point(2.0, 4.0), &point(2.0, 5.0));
        assert_eq!(polygon.num_edges(), 0);
    }

    #[test]
    fn limits_pin_outlying_edges_to_the_boundary() {
        let limit = Box2D::from_integers(0, 0, 4, 4);
        let mut polygon = Polygon::with_limits(&[limit]);
        // An edge completely to the left of the limit still contributes
        // its winding, pinned to the limit's left side.
        polygon.add_external_edge(&point(-3.0, 1.0), &point(-3.0, 3.0));

        assert_eq!(polygon.num_edges(), 1);
        let e = polygon.edges()[0];
        assert!(e.line.is_vertical());
        assert_eq!(e.line.p1.x, Fixed::from_int(0));
        assert_eq!(e.dir, 1);
    }

    #[test]
    fn generic_clip_splits_into_three() {
        let limit = Box2D::from_integers(0, 0, 4, 4);
        let mut polygon = Polygon::with_limits(&[limit]);
        // Crosses the left and right limit sides on its way down.
        polygon.add_external_edge(&point(-4.0, 0.0), &point(8.0, 4.0));

        assert_eq!(polygon.num_edges(), 3);
        let edges = polygon.edges();
        // Left vertical part, diagonal middle, right vertical part, with
        // contiguous bands.
        assert!(edges[0].line.is_vertical());
        assert!(!edges[1].line.is_vertical());
        assert!(edges[2].line.is_vertical());
        assert_eq!(edges[0].bottom, edges[1].top);
        assert_eq!(edges[1].bottom, edges[2].top);
        assert_eq!(edges[0].top, Fixed::from_int(0));
        assert_eq!(edges[2].bottom, Fixed::from_int(4));
    }
}
