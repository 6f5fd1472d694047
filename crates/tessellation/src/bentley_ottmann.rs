//! The general sweep-line tessellator.
//!
//! A Bentley-Ottmann sweep over the polygon's edges: start and stop events
//! are known up front and pre-sorted, intersection events are discovered as
//! edges become adjacent and are scheduled in a binary heap. The sweep
//! keeps the active edges in a doubly-linked list ordered by their x at the
//! current y, walks it at every y transition to start, continue or close
//! deferred trapezoids, and swaps edge pairs as their intersections pass.
//!
//! All comparisons are exact: slope and ordering tests are 64-bit cross
//! products and the intersection point itself is a 96-by-64-bit division,
//! so rounding can never disagree with the sweep order. The computed
//! intersection coordinates are rounded to fixed point with a paired
//! nudge-and-exactness rule that the containment tests consume; changing
//! either half changes which tessellation coincident edges produce.

use crate::error::TessellationResult;
use crate::fixed::wide::{det32_64, det64x32_128, int_96by64_32x64_divrem};
use crate::geom::{Fixed, Line, Point};
use crate::polygon::Polygon;
use crate::traps::Traps;
use crate::FillRule;

use std::cmp::Ordering;

const NIL: u32 = u32::MAX;

struct BoEdge {
    edge: crate::polygon::Edge,
    prev: u32,
    next: u32,
    /// Memoized collinearity: the partner this edge was last compared
    /// against, and the answer. Sound because edges are immutable once
    /// created, and symmetric because both directions consult it.
    colinear: u32,
    colinear_value: bool,
    deferred_right: u32,
    deferred_top: Fixed,
}

impl BoEdge {
    fn new(edge: crate::polygon::Edge) -> Self {
        BoEdge {
            edge,
            prev: NIL,
            next: NIL,
            colinear: NIL,
            colinear_value: false,
            deferred_right: NIL,
            deferred_top: Fixed::from_int(0),
        }
    }
}

/// Event type order at a shared point: stops before intersections before
/// starts.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum EventKind {
    Stop,
    Intersection,
    Start,
}

#[derive(Copy, Clone)]
struct QueueEvent {
    kind: EventKind,
    point: Point,
    e1: u32,
    e2: u32,
}

#[derive(Copy, Clone)]
struct StartEvent {
    point: Point,
    edge: u32,
}

#[inline]
fn point_compare(a: &Point, b: &Point) -> Ordering {
    a.y.cmp(&b.y).then(a.x.cmp(&b.x))
}

/// Compare the slopes of two edges by their top-to-bottom direction
/// vectors: the sign of `adx * bdy - bdx * ady` in 64 bits, with shortcuts
/// for vertical edges (which compare by the other's x direction alone).
/// Since the dy values are positive by construction, two edges sharing a
/// top point sort left-to-right; sharing a bottom point reverses the sense.
fn edge_slope_compare(edges: &[BoEdge], a: u32, b: u32) -> i32 {
    let la = &edges[a as usize].edge.line;
    let lb = &edges[b as usize].edge.line;

    let adx = (la.p2.x - la.p1.x).to_bits();
    let bdx = (lb.p2.x - lb.p1.x).to_bits();

    // First check for vertical lines.
    if adx == 0 {
        return -bdx.signum();
    }
    if bdx == 0 {
        return adx.signum();
    }

    // Then where the two edges point in different directions wrt x.
    if (adx ^ bdx) < 0 {
        return adx.signum();
    }

    let ady = (la.p2.y - la.p1.y).to_bits();
    let bdy = (lb.p2.y - lb.p1.y).to_bits();
    let adx_bdy = adx as i64 * bdy as i64;
    let bdx_ady = bdx as i64 * ady as i64;

    (adx_bdy as i128 - bdx_ady as i128).signum() as i32
}

/// The x ordinate of edge `a` at `y` compared against `x`, exactly:
/// `(y - p1.y) * adx` versus `(x - p1.x) * ady` with both dy factors
/// positive by construction.
fn edge_compare_for_y_against_x(edges: &[BoEdge], a: u32, y: Fixed, x: Fixed) -> i32 {
    let line = &edges[a as usize].edge.line;

    if x < line.p1.x && x < line.p2.x {
        return 1;
    }
    if x > line.p1.x && x > line.p2.x {
        return -1;
    }

    let adx = (line.p2.x - line.p1.x).to_bits();
    let dx = (x - line.p1.x).to_bits();

    if adx == 0 {
        return -dx.signum();
    }
    if dx == 0 || (adx ^ dx) < 0 {
        return adx.signum();
    }

    let dy = (y - line.p1.y).to_bits();
    let ady = (line.p2.y - line.p1.y).to_bits();

    let l = dy as i64 * adx as i64;
    let r = dx as i64 * ady as i64;

    (l as i128 - r as i128).signum() as i32
}

fn sweep_line_compare_edges(edges: &[BoEdge], a: u32, b: u32, y: Fixed) -> Ordering {
    let cmp = Line::compare_at_y(
        &edges[a as usize].edge.line,
        &edges[b as usize].edge.line,
        y,
    );
    if cmp != Ordering::Equal {
        return cmp;
    }

    // Two collinear edges: of the pair, the one extending further down is
    // "less" for fill purposes.
    edges[b as usize]
        .edge
        .bottom
        .cmp(&edges[a as usize].edge.bottom)
}

fn edges_colinear(edges: &mut [BoEdge], a: u32, b: u32) -> bool {
    if edges[a as usize].colinear == b {
        return edges[a as usize].colinear_value;
    }
    if edges[b as usize].colinear == a {
        let value = edges[b as usize].colinear_value;
        edges[a as usize].colinear = b;
        edges[a as usize].colinear_value = value;
        return value;
    }

    let la = edges[a as usize].edge.line;
    let lb = edges[b as usize].edge.line;

    let mut p = 0u32;
    p |= (la.p1.x == lb.p1.x) as u32;
    p |= ((la.p1.y == lb.p1.y) as u32) << 1;
    p |= ((la.p2.x == lb.p2.x) as u32) << 3;
    p |= ((la.p2.y == lb.p2.y) as u32) << 4;
    if p == (1 << 0) | (1 << 1) | (1 << 3) | (1 << 4) {
        edges[a as usize].colinear = b;
        edges[a as usize].colinear_value = true;
        return true;
    }

    if edge_slope_compare(edges, a, b) != 0 {
        edges[a as usize].colinear = b;
        edges[a as usize].colinear_value = false;
        return false;
    }

    // The y choice here must be greater than the start of either line.
    let value = if p != 0 {
        // Same slope with a coincident starting point.
        ((p >> 1) & p) & 5 != 0
    } else if la.p1.y < lb.p1.y {
        edge_compare_for_y_against_x(edges, b, la.p1.y, la.p1.x) == 0
    } else {
        edge_compare_for_y_against_x(edges, a, lb.p1.y, lb.p1.x) == 0
    };

    edges[a as usize].colinear = b;
    edges[a as usize].colinear_value = value;
    value
}

#[derive(Copy, Clone)]
struct IntersectOrdinate {
    ordinate: i32,
    exact: bool,
}

/// Round one intersection ordinate. When twice the (sign-folded) remainder
/// reaches the denominator the quotient is nudged one unit away from zero
/// and the result counts as exact for the containment tests; otherwise the
/// truncated quotient is kept and flagged inexact.
fn intersect_ordinate(num: i128, den: i64) -> Option<IntersectOrdinate> {
    let qr = int_96by64_32x64_divrem(num, den)?;

    let mut quo = qr.quo;
    let mut exact = true;
    if qr.rem != 0 {
        let mut rem = qr.rem as i128;
        if (den < 0) != (rem < 0) {
            rem = -rem;
        }
        if 2 * rem >= den as i128 {
            quo += if quo < 0 { -1 } else { 1 };
        } else {
            exact = false;
        }
    }

    Some(IntersectOrdinate {
        ordinate: quo as i32,
        exact,
    })
}

/// Compute the intersection of the lines of two edges. Returns `None` for
/// parallel lines, for an intersection parameter outside either segment,
/// or on division overflow (which the caller treats as no intersection).
fn intersect_lines(
    edges: &[BoEdge],
    a: u32,
    b: u32,
) -> Option<(IntersectOrdinate, IntersectOrdinate)> {
    let la = &edges[a as usize].edge.line;
    let lb = &edges[b as usize].edge.line;

    let dx1 = (la.p1.x - la.p2.x).to_bits();
    let dy1 = (la.p1.y - la.p2.y).to_bits();
    let dx2 = (lb.p1.x - lb.p2.x).to_bits();
    let dy2 = (lb.p1.y - lb.p2.y).to_bits();

    let den_det = det32_64(dx1, dy1, dx2, dy2);
    if den_det == 0 {
        return None;
    }

    // Reject intersections outside the segments without dividing:
    // t * den = R for the parameter along a, and similarly along b.
    let r = det32_64(
        dx2,
        dy2,
        (lb.p1.x - la.p1.x).to_bits(),
        (lb.p1.y - la.p1.y).to_bits(),
    );
    if den_det < 0 {
        if den_det >= r {
            return None;
        }
    } else {
        if den_det <= r {
            return None;
        }
    }

    let r = det32_64(
        dy1,
        dx1,
        (la.p1.y - lb.p1.y).to_bits(),
        (la.p1.x - lb.p1.x).to_bits(),
    );
    if den_det < 0 {
        if den_det >= r {
            return None;
        }
    } else {
        if den_det <= r {
            return None;
        }
    }

    let a_det = det32_64(
        la.p1.x.to_bits(),
        la.p1.y.to_bits(),
        la.p2.x.to_bits(),
        la.p2.y.to_bits(),
    );
    let b_det = det32_64(
        lb.p1.x.to_bits(),
        lb.p1.y.to_bits(),
        lb.p2.x.to_bits(),
        lb.p2.y.to_bits(),
    );

    let x = intersect_ordinate(det64x32_128(a_det, dx1, b_det, dx2), den_det)?;
    let y = intersect_ordinate(det64x32_128(a_det, dy1, b_det, dy2), den_det)?;

    Some((x, y))
}

/// Compare a rounded intersection ordinate against a fixed value: with
/// identical quotients a non-zero remainder makes the ordinate greater.
#[inline]
fn intersect_ordinate_32_compare(a: IntersectOrdinate, b: Fixed) -> i32 {
    if a.ordinate > b.to_bits() {
        return 1;
    }
    if a.ordinate < b.to_bits() {
        return -1;
    }
    if a.exact {
        0
    } else {
        1
    }
}

/// Whether the edge contains the intersection point: seen by the sweep
/// after the edge's start event and before its stop event. At a y equal to
/// top or bottom the x value decides, since rounded intersections are not
/// exact.
fn edge_contains_intersect_point(
    edges: &[BoEdge],
    edge: u32,
    x: IntersectOrdinate,
    y: IntersectOrdinate,
) -> bool {
    let e = &edges[edge as usize].edge;

    let cmp_top = intersect_ordinate_32_compare(y, e.top);
    let cmp_bottom = intersect_ordinate_32_compare(y, e.bottom);

    if cmp_top < 0 || cmp_bottom > 0 {
        return false;
    }

    if cmp_top > 0 && cmp_bottom < 0 {
        return true;
    }

    // The point lies on the same y as top or bottom; at the top the x must
    // be greater to count as inside, at the bottom it must be less.
    if cmp_top == 0 {
        let top_x = e.line.x_for_y(e.top);
        intersect_ordinate_32_compare(x, top_x) > 0
    } else {
        let bot_x = e.line.x_for_y(e.bottom);
        intersect_ordinate_32_compare(x, bot_x) < 0
    }
}

fn bo_edge_intersect(edges: &[BoEdge], a: u32, b: u32) -> Option<Point> {
    let (x, y) = intersect_lines(edges, a, b)?;

    if !edge_contains_intersect_point(edges, a, x, y) {
        return None;
    }
    if !edge_contains_intersect_point(edges, b, x, y) {
        return None;
    }

    // The rounded intersection fits the edge coordinates' precision; the
    // remainders are no longer needed.
    Some(Point::new(
        Fixed::from_bits(x.ordinate),
        Fixed::from_bits(y.ordinate),
    ))
}

/// The two-source event schedule: pre-sorted start events walked by a
/// cursor, dynamically scheduled stop/intersection events in a binary
/// min-heap over an arena. Event identity (the arena index) is the final
/// tie-break, so no two events ever compare equal.
struct EventQueue {
    events: Vec<QueueEvent>,
    /// 1-based binary heap of arena indices; elements[0] is unused.
    heap: Vec<u32>,
    starts: Vec<StartEvent>,
    start_cursor: usize,
}

enum Dequeued {
    Start(u32),
    Queued(QueueEvent),
}

fn queue_event_compare(events: &[QueueEvent], a: u32, b: u32) -> Ordering {
    let ea = &events[a as usize];
    let eb = &events[b as usize];
    point_compare(&ea.point, &eb.point)
        .then(ea.kind.cmp(&eb.kind))
        .then(a.cmp(&b))
}

impl EventQueue {
    fn new(starts: Vec<StartEvent>) -> Self {
        EventQueue {
            events: Vec::new(),
            heap: vec![NIL],
            starts,
            start_cursor: 0,
        }
    }

    fn heap_push(&mut self, id: u32) {
        self.heap.push(id);
        let events = &self.events;
        let heap = &mut self.heap;

        let mut i = heap.len() - 1;
        while i > 1 {
            let parent = i >> 1;
            if queue_event_compare(events, heap[i], heap[parent]) == Ordering::Less {
                heap.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn heap_peek(&self) -> Option<u32> {
        self.heap.get(1).copied()
    }

    fn heap_pop(&mut self) {
        let events = &self.events;
        let heap = &mut self.heap;

        let tail = heap.pop().unwrap();
        let len = heap.len();
        if len <= 1 {
            return;
        }

        heap[1] = tail;
        let mut i = 1;
        loop {
            let mut child = i << 1;
            if child >= len {
                break;
            }
            if child + 1 < len
                && queue_event_compare(events, heap[child + 1], heap[child]) == Ordering::Less
            {
                child += 1;
            }
            if queue_event_compare(events, heap[child], heap[i]) != Ordering::Less {
                break;
            }
            heap.swap(child, i);
            i = child;
        }
    }

    fn insert(&mut self, kind: EventKind, e1: u32, e2: u32, point: Point) {
        let id = self.events.len() as u32;
        self.events.push(QueueEvent {
            kind,
            point,
            e1,
            e2,
        });
        self.heap_push(id);
    }

    fn insert_stop(&mut self, edges: &[BoEdge], edge: u32) {
        let e = &edges[edge as usize].edge;
        let point = Point::new(e.line.x_for_y(e.bottom), e.bottom);
        self.insert(EventKind::Stop, edge, NIL, point);
    }

    /// Schedule an intersection event for two edges that have just become
    /// neighbours, if they cross strictly below the current sweep line.
    fn insert_if_intersect_below_current_y(
        &mut self,
        edges: &mut [BoEdge],
        left: u32,
        right: u32,
    ) {
        let ll = edges[left as usize].edge.line;
        let rl = edges[right as usize].edge.line;

        if ll.p1.x.max(ll.p2.x) <= rl.p1.x.min(rl.p2.x) {
            return;
        }

        if ll == rl {
            return;
        }

        // "left" and "right" describe the current order in the active
        // list; if the slopes also sort left below right then their
        // crossing is already above the sweep line.
        if edge_slope_compare(edges, left, right) <= 0 {
            return;
        }

        if let Some(point) = bo_edge_intersect(edges, left, right) {
            self.insert(EventKind::Intersection, left, right, point);
        }
    }

    fn dequeue(&mut self) -> Option<Dequeued> {
        let heap_head = self.heap_peek();
        let start = self.starts.get(self.start_cursor);

        match (heap_head, start) {
            (None, None) => None,
            (Some(h), None) => {
                let event = self.events[h as usize];
                self.heap_pop();
                Some(Dequeued::Queued(event))
            }
            (None, Some(s)) => {
                let edge = s.edge;
                self.start_cursor += 1;
                Some(Dequeued::Start(edge))
            }
            (Some(h), Some(s)) => {
                let he = &self.events[h as usize];
                // At a shared point the queued event's kind wins.
                let cmp = point_compare(&s.point, &he.point).then(EventKind::Start.cmp(&he.kind));
                if cmp == Ordering::Less {
                    let edge = s.edge;
                    self.start_cursor += 1;
                    Some(Dequeued::Start(edge))
                } else {
                    let event = self.events[h as usize];
                    self.heap_pop();
                    Some(Dequeued::Queued(event))
                }
            }
        }
    }
}

struct SweepLine {
    head: u32,
    stopped: u32,
    current_y: Fixed,
    current_edge: u32,
    #[allow(dead_code)]
    log: bool,
}

impl SweepLine {
    fn new() -> Self {
        SweepLine {
            head: NIL,
            stopped: NIL,
            current_y: Fixed::MIN,
            current_edge: NIL,
            log: debug_log_enabled(),
        }
    }

    /// Insert into the sorted active list, scanning outward from the
    /// rolling cursor; nearly-sorted insertions stay close to O(1).
    fn insert(&mut self, edges: &mut [BoEdge], edge: u32) {
        if self.current_edge != NIL {
            match sweep_line_compare_edges(edges, self.current_edge, edge, self.current_y) {
                Ordering::Less => {
                    let mut prev = self.current_edge;
                    let mut next = edges[prev as usize].next;
                    while next != NIL
                        && sweep_line_compare_edges(edges, next, edge, self.current_y)
                            == Ordering::Less
                    {
                        prev = next;
                        next = edges[prev as usize].next;
                    }

                    edges[prev as usize].next = edge;
                    edges[edge as usize].prev = prev;
                    edges[edge as usize].next = next;
                    if next != NIL {
                        edges[next as usize].prev = edge;
                    }
                }
                Ordering::Greater => {
                    let mut next = self.current_edge;
                    let mut prev = edges[next as usize].prev;
                    while prev != NIL
                        && sweep_line_compare_edges(edges, prev, edge, self.current_y)
                            == Ordering::Greater
                    {
                        next = prev;
                        prev = edges[next as usize].prev;
                    }

                    edges[next as usize].prev = edge;
                    edges[edge as usize].next = next;
                    edges[edge as usize].prev = prev;
                    if prev != NIL {
                        edges[prev as usize].next = edge;
                    } else {
                        self.head = edge;
                    }
                }
                Ordering::Equal => {
                    let prev = self.current_edge;
                    let next = edges[prev as usize].next;
                    edges[edge as usize].prev = prev;
                    edges[edge as usize].next = next;
                    if next != NIL {
                        edges[next as usize].prev = edge;
                    }
                    edges[prev as usize].next = edge;
                }
            }
        } else {
            self.head = edge;
            edges[edge as usize].next = NIL;
        }

        self.current_edge = edge;
    }

    fn delete(&mut self, edges: &mut [BoEdge], edge: u32) {
        let prev = edges[edge as usize].prev;
        let next = edges[edge as usize].next;

        if prev != NIL {
            edges[prev as usize].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            edges[next as usize].prev = prev;
        }

        if self.current_edge == edge {
            self.current_edge = if prev != NIL { prev } else { next };
        }
    }

    fn swap(&mut self, edges: &mut [BoEdge], left: u32, right: u32) {
        let left_prev = edges[left as usize].prev;
        let right_next = edges[right as usize].next;

        if left_prev != NIL {
            edges[left_prev as usize].next = right;
        } else {
            self.head = right;
        }

        if right_next != NIL {
            edges[right_next as usize].prev = left;
        }

        edges[left as usize].next = right_next;
        edges[right as usize].next = left;

        edges[right as usize].prev = left_prev;
        edges[left as usize].prev = right;
    }
}

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    std::env::var("TRAPEZE_DEBUG_TRAPS").is_ok()
}

#[cfg(not(debug_assertions))]
fn debug_log_enabled() -> bool {
    false
}

/// Close the trapezoid deferred on `left`, if it grew to a positive
/// height.
fn end_trap(edges: &mut [BoEdge], left: u32, bot: Fixed, sweep: &SweepLine, traps: &mut Traps) {
    let top = edges[left as usize].deferred_top;
    let right = edges[left as usize].deferred_right;

    if top < bot {
        let left_line = edges[left as usize].edge.line;
        let right_line = edges[right as usize].edge.line;
        traps.add_trap(top, bot, &left_line, &right_line);

        tess_log!(
            sweep,
            "end trap: left={:?} right={:?} top={:?} bot={:?}",
            left_line,
            right_line,
            top,
            bot
        );
    }

    edges[left as usize].deferred_right = NIL;
}

/// Start a new trapezoid at `top` between `left` and `right`. An existing
/// deferred trapezoid is continued unchanged when its right edge is still
/// `right`, swapped silently when the new right edge is collinear with the
/// old one, and closed otherwise.
fn start_or_continue_trap(
    edges: &mut [BoEdge],
    left: u32,
    right: u32,
    top: Fixed,
    sweep: &SweepLine,
    traps: &mut Traps,
) {
    if edges[left as usize].deferred_right == right {
        return;
    }

    debug_assert!(right != NIL);
    if edges[left as usize].deferred_right != NIL {
        let deferred_right = edges[left as usize].deferred_right;
        if edges_colinear(edges, deferred_right, right) {
            // Continuation on the right, just swap edges.
            edges[left as usize].deferred_right = right;
            return;
        }

        end_trap(edges, left, top, sweep, traps);
    }

    if !edges_colinear(edges, left, right) {
        edges[left as usize].deferred_top = top;
        edges[left as usize].deferred_right = right;

        tess_log!(sweep, "begin trap: {} {} {:?}", left, right, top);
    }
}

/// Walk the active list left to right accumulating winding; every
/// transition to "outside" on a non-collinear edge closes the span.
fn active_edges_to_traps(
    edges: &mut [BoEdge],
    head: u32,
    top: Fixed,
    fill_rule: FillRule,
    sweep: &SweepLine,
    traps: &mut Traps,
) {
    tess_log!(sweep, "processing active edges for {:?}", top);

    let mut in_out = 0i32;
    let mut left = head;
    let mut pos = head;

    while pos != NIL {
        if pos != left && edges[pos as usize].deferred_right != NIL {
            if edges[left as usize].deferred_right == NIL && edges_colinear(edges, left, pos) {
                // Continuation on the left.
                edges[left as usize].deferred_top = edges[pos as usize].deferred_top;
                edges[left as usize].deferred_right = edges[pos as usize].deferred_right;
                edges[pos as usize].deferred_right = NIL;
            } else {
                end_trap(edges, pos, top, sweep, traps);
            }
        }

        in_out += edges[pos as usize].edge.dir;
        if fill_rule.is_outside(in_out) {
            // Skip collinear edges.
            let next = edges[pos as usize].next;
            if next == NIL || !edges_colinear(edges, pos, next) {
                start_or_continue_trap(edges, left, pos, top, sweep, traps);
                left = edges[pos as usize].next;
            }
        }

        pos = edges[pos as usize].next;
    }
}

fn tessellate_bo_edges(
    edges: &mut [BoEdge],
    starts: Vec<StartEvent>,
    fill_rule: FillRule,
    traps: &mut Traps,
) -> TessellationResult {
    let mut intersection_count = 0usize;

    let mut event_queue = EventQueue::new(starts);
    let mut sweep_line = SweepLine::new();

    while let Some(event) = event_queue.dequeue() {
        let event_point = match &event {
            Dequeued::Start(edge) => {
                let e = &edges[*edge as usize].edge;
                Point::new(e.line.x_for_y(e.top), e.top)
            }
            Dequeued::Queued(q) => q.point,
        };

        if event_point.y != sweep_line.current_y {
            let mut e = sweep_line.stopped;
            while e != NIL {
                if edges[e as usize].deferred_right != NIL {
                    let bottom = edges[e as usize].edge.bottom;
                    end_trap(edges, e, bottom, &sweep_line, traps);
                }
                e = edges[e as usize].next;
            }
            sweep_line.stopped = NIL;

            active_edges_to_traps(
                edges,
                sweep_line.head,
                sweep_line.current_y,
                fill_rule,
                &sweep_line,
                traps,
            );

            sweep_line.current_y = event_point.y;
        }

        match event {
            Dequeued::Start(e1) => {
                tess_log!(sweep_line, "start: {} at {:?}", e1, event_point);

                sweep_line.insert(edges, e1);

                event_queue.insert_stop(edges, e1);

                // Check whether this edge continues a stopped collinear
                // edge; if so, adopt its deferred trapezoid.
                let mut left = sweep_line.stopped;
                while left != NIL {
                    let next = edges[left as usize].next;
                    if edges[e1 as usize].edge.top <= edges[left as usize].edge.bottom
                        && edges_colinear(edges, e1, left)
                    {
                        edges[e1 as usize].deferred_top = edges[left as usize].deferred_top;
                        edges[e1 as usize].deferred_right =
                            edges[left as usize].deferred_right;
                        edges[left as usize].deferred_right = NIL;

                        let prev = edges[left as usize].prev;
                        if prev != NIL {
                            edges[prev as usize].next = next;
                        } else {
                            sweep_line.stopped = next;
                        }
                        if next != NIL {
                            edges[next as usize].prev = prev;
                        }
                        break;
                    }
                    left = next;
                }

                let left = edges[e1 as usize].prev;
                let right = edges[e1 as usize].next;

                if left != NIL {
                    event_queue.insert_if_intersect_below_current_y(edges, left, e1);
                }

                if right != NIL {
                    event_queue.insert_if_intersect_below_current_y(edges, e1, right);
                }
            }

            Dequeued::Queued(QueueEvent {
                kind: EventKind::Stop,
                e1,
                ..
            }) => {
                tess_log!(sweep_line, "stop: {} at {:?}", e1, event_point);

                let left = edges[e1 as usize].prev;
                let right = edges[e1 as usize].next;

                sweep_line.delete(edges, e1);

                // Park the edge on the stopped list so a fresh collinear
                // edge starting at this y can continue its trapezoid.
                if edges[e1 as usize].deferred_right != NIL {
                    edges[e1 as usize].next = sweep_line.stopped;
                    if sweep_line.stopped != NIL {
                        edges[sweep_line.stopped as usize].prev = e1;
                    }
                    sweep_line.stopped = e1;
                    edges[e1 as usize].prev = NIL;
                }

                if left != NIL && right != NIL {
                    event_queue.insert_if_intersect_below_current_y(edges, left, right);
                }
            }

            Dequeued::Queued(QueueEvent {
                kind: EventKind::Intersection,
                e1,
                e2,
                ..
            }) => {
                // Skip the intersection if the edges are no longer
                // adjacent (a previous swap rearranged them).
                if e2 != edges[e1 as usize].next {
                    continue;
                }

                intersection_count += 1;
                tess_log!(
                    sweep_line,
                    "intersection: {} x {} at {:?}",
                    e1,
                    e2,
                    event_point
                );

                let left = edges[e1 as usize].prev;
                let right = edges[e2 as usize].next;

                sweep_line.swap(edges, e1, e2);

                // After the swap e2 is left of e1.
                if left != NIL {
                    event_queue.insert_if_intersect_below_current_y(edges, left, e2);
                }

                if right != NIL {
                    event_queue.insert_if_intersect_below_current_y(edges, e1, right);
                }
            }

            Dequeued::Queued(QueueEvent {
                kind: EventKind::Start,
                ..
            }) => unreachable!("start events are never heap-scheduled"),
        }
    }

    let mut e = sweep_line.stopped;
    while e != NIL {
        if edges[e as usize].deferred_right != NIL {
            let bottom = edges[e as usize].edge.bottom;
            end_trap(edges, e, bottom, &sweep_line, traps);
        }
        e = edges[e as usize].next;
    }

    tess_log!(sweep_line, "{} intersections", intersection_count);
    let _ = intersection_count;

    Ok(())
}

/// Tessellates the filled area of `polygon` under `fill_rule` into
/// trapezoids appended to `traps`.
pub fn tessellate_polygon(
    traps: &mut Traps,
    polygon: &Polygon,
    fill_rule: FillRule,
) -> TessellationResult {
    if polygon.num_edges() == 0 {
        return Ok(());
    }

    let mut edges: Vec<BoEdge> = polygon.edges().iter().map(|e| BoEdge::new(*e)).collect();

    let mut starts: Vec<StartEvent> = edges
        .iter()
        .enumerate()
        .map(|(i, e)| StartEvent {
            point: Point::new(e.edge.line.x_for_y(e.edge.top), e.edge.top),
            edge: i as u32,
        })
        .collect();

    starts.sort_unstable_by(|a, b| point_compare(&a.point, &b.point).then(a.edge.cmp(&b.edge)));

    tessellate_bo_edges(&mut edges, starts, fill_rule, traps)
}
