//! Sweep-line tessellation specialised for rectilinear polygons.
//!
//! Every edge is vertical, so the sweep order of two edges never changes:
//! no intersection events exist and the comparator collapses to an x
//! comparison. One pre-sorted event array drives the whole sweep. The
//! output can be collected either as trapezoids (flagged rectilinear) or
//! directly as boxes.

use crate::boxes::Boxes;
use crate::error::{TessellationError, TessellationResult};
use crate::geom::{Box2D, Fixed, Line, Point};
use crate::polygon::{Edge, Polygon};
use crate::traps::Traps;
use crate::{Antialias, FillRule};

use std::cmp::Ordering;

const NIL: u32 = u32::MAX;

struct BoEdge {
    edge: Edge,
    prev: u32,
    next: u32,
    deferred_right: u32,
    deferred_top: Fixed,
}

impl BoEdge {
    fn new(edge: Edge) -> Self {
        BoEdge {
            edge,
            prev: NIL,
            next: NIL,
            deferred_right: NIL,
            deferred_top: Fixed::from_int(0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Start,
    Stop,
}

#[derive(Copy, Clone)]
struct Event {
    kind: EventKind,
    point: Point,
    edge: u32,
}

fn point_compare(a: &Point, b: &Point) -> Ordering {
    a.y.cmp(&b.y).then(a.x.cmp(&b.x))
}

fn event_compare(a: &Event, b: &Event) -> Ordering {
    point_compare(&a.point, &b.point).then(a.kind.cmp(&b.kind))
}

/// Where the de-overlapped geometry is collected.
trait RectilinearSink {
    fn add(&mut self, top: Fixed, bottom: Fixed, left: &Line, right: &Line);
}

impl RectilinearSink for Traps {
    fn add(&mut self, top: Fixed, bottom: Fixed, left: &Line, right: &Line) {
        self.add_trap(top, bottom, left, right);
    }
}

impl RectilinearSink for Boxes {
    fn add(&mut self, top: Fixed, bottom: Fixed, left: &Line, right: &Line) {
        let b = Box2D::new(Point::new(left.p1.x, top), Point::new(right.p1.x, bottom));
        self.add(Antialias::Default, &b);
    }
}

struct SweepLine {
    head: u32,
    current_y: Fixed,
    current_edge: u32,
}

fn edge_compare(edges: &[BoEdge], a: u32, b: u32) -> Ordering {
    let a = &edges[a as usize];
    let b = &edges[b as usize];

    // Of two collinear edges, the one reaching further down sorts first.
    a.edge
        .line
        .p1
        .x
        .cmp(&b.edge.line.p1.x)
        .then(b.edge.bottom.cmp(&a.edge.bottom))
}

impl SweepLine {
    fn new() -> Self {
        SweepLine {
            head: NIL,
            current_y: Fixed::MIN,
            current_edge: NIL,
        }
    }

    fn insert(&mut self, edges: &mut [BoEdge], edge: u32) {
        if self.current_edge != NIL {
            match edge_compare(edges, self.current_edge, edge) {
                Ordering::Less => {
                    let mut prev = self.current_edge;
                    let mut next = edges[prev as usize].next;
                    while next != NIL && edge_compare(edges, next, edge) == Ordering::Less {
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
                    while prev != NIL && edge_compare(edges, prev, edge) == Ordering::Greater {
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
}

#[inline]
fn edges_collinear(edges: &[BoEdge], a: u32, b: u32) -> bool {
    edges[a as usize].edge.line.p1.x == edges[b as usize].edge.line.p1.x
}

fn end_trap<S: RectilinearSink>(edges: &mut [BoEdge], left: u32, bot: Fixed, sink: &mut S) {
    let top = edges[left as usize].deferred_top;
    let right = edges[left as usize].deferred_right;

    // Only emit non-degenerate trapezoids with positive height.
    if top < bot {
        let left_line = edges[left as usize].edge.line;
        let right_line = edges[right as usize].edge.line;
        sink.add(top, bot, &left_line, &right_line);
    }

    edges[left as usize].deferred_right = NIL;
}

/// Start a new trapezoid spanning `left` to `right` at `top`, continuing or
/// closing any trapezoid already deferred on `left`.
fn start_or_continue_trap<S: RectilinearSink>(
    edges: &mut [BoEdge],
    left: u32,
    right: u32,
    top: Fixed,
    sink: &mut S,
) {
    if edges[left as usize].deferred_right == right {
        return;
    }

    if edges[left as usize].deferred_right != NIL {
        if right != NIL && edges_collinear(edges, edges[left as usize].deferred_right, right) {
            // Continuation on the right, just swap edges.
            edges[left as usize].deferred_right = right;
            return;
        }

        end_trap(edges, left, top, sink);
    }

    if right != NIL && !edges_collinear(edges, left, right) {
        edges[left as usize].deferred_top = top;
        edges[left as usize].deferred_right = right;
    }
}

fn active_edges_to_traps<S: RectilinearSink>(
    edges: &mut [BoEdge],
    head: u32,
    top: Fixed,
    fill_rule: FillRule,
    sink: &mut S,
) {
    let mut left = head;

    match fill_rule {
        FillRule::Winding => {
            while left != NIL {
                // Greedily search for the closing edge so the span is as
                // wide as possible with as few trapezoids as possible.
                let mut in_out = edges[left as usize].edge.dir;

                // Check for a collinear edge holding a trap to adopt.
                if edges[left as usize].deferred_right == NIL {
                    let mut right = edges[left as usize].next;
                    while right != NIL && edges[right as usize].deferred_right == NIL {
                        right = edges[right as usize].next;
                    }

                    if right != NIL && edges_collinear(edges, left, right) {
                        // Continuation on the left.
                        edges[left as usize].deferred_top = edges[right as usize].deferred_top;
                        edges[left as usize].deferred_right =
                            edges[right as usize].deferred_right;
                        edges[right as usize].deferred_right = NIL;
                    }
                }

                // End all subsumed traps.
                let mut right = edges[left as usize].next;
                while right != NIL {
                    if edges[right as usize].deferred_right != NIL {
                        end_trap(edges, right, top, sink);
                    }

                    in_out += edges[right as usize].edge.dir;
                    if in_out == 0 {
                        // Skip collinear edges.
                        let next = edges[right as usize].next;
                        if next == NIL || !edges_collinear(edges, right, next) {
                            break;
                        }
                    }

                    right = edges[right as usize].next;
                }

                if right == NIL {
                    // No closing edge: drop any deferred trap on left.
                    start_or_continue_trap(edges, left, NIL, top, sink);
                    break;
                }

                start_or_continue_trap(edges, left, right, top, sink);

                left = edges[right as usize].next;
            }
        }
        FillRule::EvenOdd => {
            while left != NIL {
                let mut in_out = 0;

                let mut right = edges[left as usize].next;
                while right != NIL {
                    if edges[right as usize].deferred_right != NIL {
                        end_trap(edges, right, top, sink);
                    }

                    let was_even = in_out & 1 == 0;
                    in_out += 1;
                    if was_even {
                        // Skip collinear edges.
                        let next = edges[right as usize].next;
                        let skip = next != NIL && edges_collinear(edges, right, next);
                        if !skip {
                            break;
                        }
                    }

                    right = edges[right as usize].next;
                }

                start_or_continue_trap(edges, left, right, top, sink);

                left = right;
                if left != NIL {
                    left = edges[left as usize].next;
                }
            }
        }
    }
}

fn tessellate_rectilinear<S: RectilinearSink>(
    edges: &mut [BoEdge],
    events: &[Event],
    fill_rule: FillRule,
    sink: &mut S,
) {
    let mut order: Vec<u32> = (0..events.len() as u32).collect();
    order.sort_unstable_by(|&a, &b| {
        event_compare(&events[a as usize], &events[b as usize]).then(a.cmp(&b))
    });

    let mut sweep_line = SweepLine::new();

    for &event_id in &order {
        let event = events[event_id as usize];

        if event.point.y != sweep_line.current_y {
            active_edges_to_traps(edges, sweep_line.head, sweep_line.current_y, fill_rule, sink);
            sweep_line.current_y = event.point.y;
        }

        match event.kind {
            EventKind::Start => {
                sweep_line.insert(edges, event.edge);
            }
            EventKind::Stop => {
                sweep_line.delete(edges, event.edge);

                if edges[event.edge as usize].deferred_right != NIL {
                    end_trap(edges, event.edge, sweep_line.current_y, sink);
                }
            }
        }
    }
}

fn push_edge_events(edges: &mut Vec<BoEdge>, events: &mut Vec<Event>, edge: Edge) {
    let id = edges.len() as u32;
    debug_assert!(edge.line.is_vertical());

    events.push(Event {
        kind: EventKind::Start,
        point: Point::new(edge.line.p1.x, edge.top),
        edge: id,
    });
    events.push(Event {
        kind: EventKind::Stop,
        point: Point::new(edge.line.p1.x, edge.bottom),
        edge: id,
    });
    edges.push(BoEdge::new(edge));
}

/// Tessellates a polygon whose edges are all vertical, emitting the fill as
/// boxes.
pub fn tessellate_rectilinear_polygon_to_boxes(
    polygon: &Polygon,
    fill_rule: FillRule,
    boxes: &mut Boxes,
) -> TessellationResult {
    if polygon.num_edges() == 0 {
        return Ok(());
    }

    let mut edges = Vec::with_capacity(polygon.num_edges());
    let mut events = Vec::with_capacity(2 * polygon.num_edges());

    for edge in polygon.edges() {
        if !edge.line.is_vertical() {
            return Err(TessellationError::Unsupported);
        }
        push_edge_events(&mut edges, &mut events, *edge);
    }

    tessellate_rectilinear(&mut edges, &events, fill_rule, boxes);
    Ok(())
}

/// Tessellates a polygon whose edges are all vertical into trapezoids,
/// flagged rectilinear.
pub fn tessellate_rectilinear_polygon(
    polygon: &Polygon,
    fill_rule: FillRule,
    traps: &mut Traps,
) -> TessellationResult {
    if polygon.num_edges() == 0 {
        return Ok(());
    }

    let mut edges = Vec::with_capacity(polygon.num_edges());
    let mut events = Vec::with_capacity(2 * polygon.num_edges());

    for edge in polygon.edges() {
        if !edge.line.is_vertical() {
            return Err(TessellationError::Unsupported);
        }
        push_edge_events(&mut edges, &mut events, *edge);
    }

    tessellate_rectilinear(&mut edges, &events, fill_rule, traps);
    traps.set_rectilinear(true);
    Ok(())
}

/// Re-tessellates the (rectilinear) content of `traps` in place, removing
/// any overlap between trapezoids.
pub fn tessellate_rectilinear_traps(traps: &mut Traps, fill_rule: FillRule) -> TessellationResult {
    if traps.is_empty() {
        return Ok(());
    }

    if !traps.is_rectilinear() {
        debug_assert!(traps.is_rectilinear());
        return Err(TessellationError::Unsupported);
    }

    let mut edges = Vec::with_capacity(2 * traps.len());
    let mut events = Vec::with_capacity(4 * traps.len());

    for trap in traps.traps() {
        push_edge_events(
            &mut edges,
            &mut events,
            Edge {
                line: trap.left,
                top: trap.top,
                bottom: trap.bottom,
                dir: 1,
            },
        );
        push_edge_events(
            &mut edges,
            &mut events,
            Edge {
                line: trap.right,
                top: trap.top,
                bottom: trap.bottom,
                dir: -1,
            },
        );
    }

    traps.clear();
    tessellate_rectilinear(&mut edges, &events, fill_rule, traps);
    traps.set_rectilinear(true);

    Ok(())
}

/// De-overlaps a set of boxes in place, honouring the winding carried by
/// reversed boxes.
pub fn tessellate_boxes(boxes: &mut Boxes, fill_rule: FillRule) -> TessellationResult {
    if boxes.len() <= 1 {
        return Ok(());
    }

    let input: Vec<Box2D> = boxes.boxes().to_vec();
    boxes.clear();

    let mut edges = Vec::with_capacity(2 * input.len());
    let mut events = Vec::with_capacity(4 * input.len());

    for b in &input {
        let (top, bottom) = if b.p1.y < b.p2.y {
            (b.p1.y, b.p2.y)
        } else {
            (b.p2.y, b.p1.y)
        };

        // A box stored with reversed x order subtracts winding.
        let (left_x, right_x, dir) = if b.p1.x <= b.p2.x {
            (b.p1.x, b.p2.x, 1)
        } else {
            (b.p2.x, b.p1.x, -1)
        };

        push_edge_events(
            &mut edges,
            &mut events,
            Edge {
                line: Line::new(Point::new(left_x, top), Point::new(left_x, bottom)),
                top,
                bottom,
                dir,
            },
        );
        push_edge_events(
            &mut edges,
            &mut events,
            Edge {
                line: Line::new(Point::new(right_x, top), Point::new(right_x, bottom)),
                top,
                bottom,
                dir: -dir,
            },
        );
    }

    tessellate_rectilinear(&mut edges, &events, fill_rule, boxes);
    Ok(())
}
