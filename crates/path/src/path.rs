use crate::geom::math::{transform_is_scale, Transform};
use crate::geom::spline::Spline;
use crate::geom::{Box2D, Fixed, IntRect, Point, Slope};
use crate::PathError;

/// Operation tag for one path element. Move and line ops consume one point
/// from the point stream, curves three, close none.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Verb {
    MoveTo,
    LineTo,
    CurveTo,
    Close,
}

/// Callbacks for walking a path. The interpreter dispatches one call per
/// stored op; a trailing pending move-to (one not yet followed by a drawing
/// op) is replayed at the end so consumers see the complete current state.
pub trait PathInterpreter {
    fn move_to(&mut self, p: &Point);
    fn line_to(&mut self, p: &Point);
    fn curve_to(&mut self, b: &Point, c: &Point, d: &Point);
    fn close(&mut self);
}

/// An ordered op + point stream with incrementally maintained invariants.
///
/// Degenerate and redundant input is canonicalised on the way in:
///
/// * the op for a `move_to` is not emitted until a subsequent drawing op
///   needs it, so move-only paths produce no output;
/// * a `line_to` onto the current point directly after a `move_to` is kept
///   (it strokes as a dot) but dropped anywhere else;
/// * consecutive collinear `line_to`s merge into one, unless the second
///   doubles back over the first — stroke joins at a reversal depend on
///   seeing two distinct segments;
/// * a `curve_to` that goes nowhere collapses to a `line_to`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Path {
    verbs: Vec<Verb>,
    points: Vec<Point>,

    current_point: Point,
    last_move_point: Point,

    has_current_point: bool,
    needs_move_to: bool,
    has_extents: bool,
    has_curve_to: bool,
    stroke_is_rectilinear: bool,
    fill_is_rectilinear: bool,
    fill_maybe_region: bool,
    fill_is_empty: bool,

    extents: Box2D,
}

impl Default for Path {
    fn default() -> Self {
        Path::new()
    }
}

impl Path {
    pub fn new() -> Self {
        Path {
            verbs: Vec::new(),
            points: Vec::new(),
            current_point: Point::default(),
            last_move_point: Point::default(),
            has_current_point: false,
            needs_move_to: true,
            has_extents: false,
            has_curve_to: false,
            stroke_is_rectilinear: true,
            fill_is_rectilinear: true,
            fill_maybe_region: true,
            fill_is_empty: true,
            extents: Box2D::from_point(&Point::default()),
        }
    }

    #[inline]
    pub(crate) fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    #[inline]
    pub(crate) fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    #[inline]
    pub fn current_point(&self) -> Option<Point> {
        if self.has_current_point {
            Some(self.current_point)
        } else {
            None
        }
    }

    #[inline]
    pub fn has_curve_to(&self) -> bool {
        self.has_curve_to
    }

    #[inline]
    pub fn stroke_is_rectilinear(&self) -> bool {
        self.stroke_is_rectilinear
    }

    #[inline]
    pub fn fill_is_rectilinear(&self) -> bool {
        self.fill_is_rectilinear
    }

    #[inline]
    pub fn fill_maybe_region(&self) -> bool {
        self.fill_maybe_region
    }

    #[inline]
    pub fn fill_is_empty(&self) -> bool {
        self.fill_is_empty
    }

    /// The bounding box of everything added so far, or `None` for a path
    /// with no visible ops.
    pub fn extents(&self) -> Option<Box2D> {
        if self.has_extents {
            Some(self.extents)
        } else {
            None
        }
    }

    /// Integer rectangle covering the fill of this path; empty paths give a
    /// zero rectangle.
    pub fn fill_extents(&self) -> IntRect {
        if self.extents.p1.x < self.extents.p2.x && self.extents.p1.y < self.extents.p2.y {
            self.extents.round_to_integer_rect()
        } else {
            IntRect::default()
        }
    }

    pub fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.new_sub_path();

        self.has_current_point = true;
        self.current_point = Point::new(x, y);
        self.last_move_point = self.current_point;
    }

    /// Starts a new subpath without defining a first point. The previous
    /// subpath is implicitly closed for the purpose of the fill flags.
    pub fn new_sub_path(&mut self) {
        if !self.needs_move_to {
            // The current subpath contains at least one command.
            if self.fill_is_rectilinear {
                // The implicit close must itself be axis-aligned.
                self.fill_is_rectilinear = self.current_point.x == self.last_move_point.x
                    || self.current_point.y == self.last_move_point.y;
                self.fill_maybe_region &= self.fill_is_rectilinear;
            }
            self.needs_move_to = true;
        }

        self.has_current_point = false;
    }

    pub fn rel_move_to(&mut self, dx: Fixed, dy: Fixed) -> Result<(), PathError> {
        if !self.has_current_point {
            return Err(PathError::NoCurrentPoint);
        }
        self.move_to(self.current_point.x + dx, self.current_point.y + dy);
        Ok(())
    }

    /// Emits the deferred move-to once a drawing op commits the subpath.
    fn move_to_apply(&mut self) {
        if !self.needs_move_to {
            return;
        }
        self.needs_move_to = false;

        if self.has_extents {
            self.extents.add_point(&self.current_point);
        } else {
            self.extents = Box2D::from_point(&self.current_point);
            self.has_extents = true;
        }

        if self.fill_maybe_region {
            self.fill_maybe_region =
                self.current_point.x.is_integer() && self.current_point.y.is_integer();
        }

        self.last_move_point = self.current_point;

        let p = self.current_point;
        self.push(Verb::MoveTo, &[p]);
    }

    fn last_verb(&self) -> Verb {
        debug_assert!(!self.verbs.is_empty());
        *self.verbs.last().unwrap()
    }

    fn penultimate_point(&self) -> Point {
        debug_assert!(self.points.len() >= 2);
        self.points[self.points.len() - 2]
    }

    fn drop_line_to(&mut self) {
        debug_assert_eq!(self.last_verb(), Verb::LineTo);
        self.verbs.pop();
        self.points.pop();
    }

    pub fn line_to(&mut self, x: Fixed, y: Fixed) {
        let point = Point::new(x, y);

        // With no current point a line-to degenerates to a move-to, going
        // through move_to so last_move_point is updated properly.
        if !self.has_current_point {
            return self.move_to(x, y);
        }

        self.move_to_apply();

        // A degenerate segment directly after the initial move-to is a
        // valid path for stroking (a dot); anywhere else it is dropped.
        if self.last_verb() != Verb::MoveTo
            && x == self.current_point.x
            && y == self.current_point.y
        {
            return;
        }

        // Merge into the previous line-to when the gradient is unchanged.
        if self.last_verb() == Verb::LineTo {
            let p = self.penultimate_point();
            if p == self.current_point {
                // Previous line element was degenerate; replace it.
                self.drop_line_to();
            } else {
                let prev = Slope::new(&p, &self.current_point);
                let this = Slope::new(&self.current_point, &point);
                // Anti-parallel segments must not be trimmed while a
                // stroke depends on the reversal.
                if prev.equal(&this) && !prev.backwards(&this) {
                    self.drop_line_to();
                }
            }
        }

        if self.stroke_is_rectilinear {
            self.stroke_is_rectilinear =
                self.current_point.x == x || self.current_point.y == y;
            self.fill_is_rectilinear &= self.stroke_is_rectilinear;
            self.fill_maybe_region &= self.fill_is_rectilinear;
            if self.fill_maybe_region {
                self.fill_maybe_region = x.is_integer() && y.is_integer();
            }
            if self.fill_is_empty {
                self.fill_is_empty =
                    self.current_point.x == x && self.current_point.y == y;
            }
        }

        self.current_point = point;
        self.extents.add_point(&point);

        self.push(Verb::LineTo, &[point]);
    }

    pub fn rel_line_to(&mut self, dx: Fixed, dy: Fixed) -> Result<(), PathError> {
        if !self.has_current_point {
            return Err(PathError::NoCurrentPoint);
        }
        self.line_to(self.current_point.x + dx, self.current_point.y + dy);
        Ok(())
    }

    pub fn curve_to(
        &mut self,
        x0: Fixed,
        y0: Fixed,
        x1: Fixed,
        y1: Fixed,
        x2: Fixed,
        y2: Fixed,
    ) {
        // A curve that does not move collapses to a line-to. This happens
        // frequently with rounded rectangles of radius zero.
        if self.current_point.x == x2 && self.current_point.y == y2 {
            if x1 == x2 && x0 == x2 && y1 == y2 && y0 == y2 {
                return self.line_to(x2, y2);
            }
        }

        // Make sure subpaths are started properly.
        if !self.has_current_point {
            self.move_to(x0, y0);
        }

        self.move_to_apply();

        // Drop a degenerate line-to left dangling before the curve.
        if self.last_verb() == Verb::LineTo {
            let p = self.penultimate_point();
            if p == self.current_point {
                self.drop_line_to();
            }
        }

        let b = Point::new(x0, y0);
        let c = Point::new(x1, y1);
        let d = Point::new(x2, y2);

        let current = self.current_point;
        self.extents.add_curve_to(&current, &b, &c, &d);

        self.current_point = d;
        self.has_curve_to = true;
        self.stroke_is_rectilinear = false;
        self.fill_is_rectilinear = false;
        self.fill_maybe_region = false;
        self.fill_is_empty = false;

        self.push(Verb::CurveTo, &[b, c, d]);
    }

    pub fn rel_curve_to(
        &mut self,
        dx0: Fixed,
        dy0: Fixed,
        dx1: Fixed,
        dy1: Fixed,
        dx2: Fixed,
        dy2: Fixed,
    ) -> Result<(), PathError> {
        if !self.has_current_point {
            return Err(PathError::NoCurrentPoint);
        }
        let p = self.current_point;
        self.curve_to(
            p.x + dx0,
            p.y + dy0,
            p.x + dx1,
            p.y + dy1,
            p.x + dx2,
            p.y + dy2,
        );
        Ok(())
    }

    pub fn close(&mut self) {
        // A close on an empty subpath is a no-op.
        if !self.has_current_point {
            return;
        }

        // Add a line-to so the flags and degeneracies resolve exactly as
        // they would for the explicit closing segment, then drop the op
        // itself (the close implies it).
        self.line_to(self.last_move_point.x, self.last_move_point.y);

        if self.last_verb() == Verb::LineTo {
            self.drop_line_to();
        }

        self.needs_move_to = true;

        self.push(Verb::Close, &[]);
    }

    fn push(&mut self, verb: Verb, points: &[Point]) {
        self.verbs.push(verb);
        self.points.extend_from_slice(points);
    }

    /// Walks the stored ops through the interpreter.
    pub fn interpret<I: PathInterpreter>(&self, sink: &mut I) {
        let mut points = self.points.iter();

        for verb in &self.verbs {
            match verb {
                Verb::MoveTo => sink.move_to(points.next().unwrap()),
                Verb::LineTo => sink.line_to(points.next().unwrap()),
                Verb::CurveTo => {
                    let b = points.next().unwrap();
                    let c = points.next().unwrap();
                    let d = points.next().unwrap();
                    sink.curve_to(b, c, d);
                }
                Verb::Close => sink.close(),
            }
        }

        if self.needs_move_to && self.has_current_point {
            sink.move_to(&self.current_point);
        }
    }

    /// Like [`Path::interpret`] but replaces every curve with line-tos
    /// through the spline flattener at the given tolerance.
    pub fn interpret_flat<I: PathInterpreter>(&self, sink: &mut I, tolerance: f64) {
        if !self.has_curve_to {
            return self.interpret(sink);
        }

        let mut flattener = Flattener::new(sink, tolerance);
        self.interpret(&mut flattener);
    }

    /// Appends a copy of `other`, offset by `(dx, dy)`.
    pub fn append(&mut self, other: &Path, dx: Fixed, dy: Fixed) {
        struct Appender<'a> {
            path: &'a mut Path,
            dx: Fixed,
            dy: Fixed,
        }

        impl PathInterpreter for Appender<'_> {
            fn move_to(&mut self, p: &Point) {
                self.path.move_to(p.x + self.dx, p.y + self.dy);
            }
            fn line_to(&mut self, p: &Point) {
                self.path.line_to(p.x + self.dx, p.y + self.dy);
            }
            fn curve_to(&mut self, b: &Point, c: &Point, d: &Point) {
                self.path.curve_to(
                    b.x + self.dx,
                    b.y + self.dy,
                    c.x + self.dx,
                    c.y + self.dy,
                    d.x + self.dx,
                    d.y + self.dy,
                );
            }
            fn close(&mut self) {
                self.path.close();
            }
        }

        other.interpret(&mut Appender { path: self, dx, dy });
    }

    /// Translates every point in place. Cheap: no flag may change except
    /// the region hint, which is re-derived from the new alignment.
    pub fn translate(&mut self, offx: Fixed, offy: Fixed) {
        if offx.is_zero() && offy.is_zero() {
            return;
        }

        self.last_move_point.x += offx;
        self.last_move_point.y += offy;
        self.current_point.x += offx;
        self.current_point.y += offy;

        self.fill_maybe_region = true;
        for p in &mut self.points {
            p.x += offx;
            p.y += offy;
            if self.fill_maybe_region {
                self.fill_maybe_region = p.x.is_integer() && p.y.is_integer();
            }
        }
        self.fill_maybe_region &= self.fill_is_rectilinear;

        self.extents.p1.x += offx;
        self.extents.p1.y += offy;
        self.extents.p2.x += offx;
        self.extents.p2.y += offy;
    }

    fn offset_and_scale(&mut self, offx: Fixed, offy: Fixed, scalex: Fixed, scaley: Fixed) {
        if scalex == Fixed::ONE && scaley == Fixed::ONE {
            return self.translate(offx, offy);
        }

        self.last_move_point.x = scalex.mul(self.last_move_point.x) + offx;
        self.last_move_point.y = scaley.mul(self.last_move_point.y) + offy;
        self.current_point.x = scalex.mul(self.current_point.x) + offx;
        self.current_point.y = scaley.mul(self.current_point.y) + offy;

        self.fill_maybe_region = true;
        for p in &mut self.points {
            if scalex != Fixed::ONE {
                p.x = p.x.mul(scalex);
            }
            p.x += offx;

            if scaley != Fixed::ONE {
                p.y = p.y.mul(scaley);
            }
            p.y += offy;

            if self.fill_maybe_region {
                self.fill_maybe_region = p.x.is_integer() && p.y.is_integer();
            }
        }
        self.fill_maybe_region &= self.fill_is_rectilinear;

        self.extents.p1.x = scalex.mul(self.extents.p1.x) + offx;
        self.extents.p2.x = scalex.mul(self.extents.p2.x) + offx;
        if scalex < Fixed::from_int(0) {
            std::mem::swap(&mut self.extents.p1.x, &mut self.extents.p2.x);
        }

        self.extents.p1.y = scaley.mul(self.extents.p1.y) + offy;
        self.extents.p2.y = scaley.mul(self.extents.p2.y) + offy;
        if scaley < Fixed::from_int(0) {
            std::mem::swap(&mut self.extents.p1.y, &mut self.extents.p2.y);
        }
    }

    /// Transforms the path by `matrix`. A matrix with no shear takes the
    /// in-place scale-and-translate fast path; the general case maps every
    /// point and rebuilds the extents (through the bounder when curves are
    /// present, since the box of transformed control points is not tight).
    /// The rectilinearity flags downgrade conservatively.
    pub fn transform(&mut self, matrix: &Transform) {
        if transform_is_scale(matrix) {
            return self.offset_and_scale(
                Fixed::from_f64(matrix.m31),
                Fixed::from_f64(matrix.m32),
                Fixed::from_f64(matrix.m11),
                Fixed::from_f64(matrix.m22),
            );
        }

        let map = |p: &Point| -> Point {
            let t = matrix.transform_point(p.to_f64());
            Point::from_f64(t.x, t.y)
        };

        self.last_move_point = map(&self.last_move_point);
        self.current_point = map(&self.current_point);

        if self.points.is_empty() {
            return;
        }

        for p in &mut self.points {
            *p = map(p);
        }

        if self.has_curve_to {
            if let Some(extents) = self.bounder_extents() {
                self.extents = extents;
            }
        } else {
            let mut extents = Box2D::from_point(&self.points[0]);
            for p in &self.points {
                extents.add_point(p);
            }
            self.extents = extents;
        }

        // The flags might become stricter than strictly needed.
        self.stroke_is_rectilinear = false;
        self.fill_is_rectilinear = false;
        self.fill_is_empty = false;
        self.fill_maybe_region = false;
    }

    /// Tight extents computed by walking the ops, growing curve segments by
    /// their extrema rather than their control points.
    pub fn bounder_extents(&self) -> Option<Box2D> {
        struct Bounder {
            current_point: Point,
            extents: Option<Box2D>,
        }

        impl Bounder {
            fn add(&mut self, p: &Point) {
                match &mut self.extents {
                    Some(e) => e.add_point(p),
                    None => self.extents = Some(Box2D::from_point(p)),
                }
            }
        }

        impl PathInterpreter for Bounder {
            fn move_to(&mut self, p: &Point) {
                self.current_point = *p;
                self.add(p);
            }
            fn line_to(&mut self, p: &Point) {
                self.current_point = *p;
                self.add(p);
            }
            fn curve_to(&mut self, b: &Point, c: &Point, d: &Point) {
                let a = self.current_point;
                if self.extents.is_none() {
                    self.extents = Some(Box2D::from_point(&a));
                }
                if let Some(e) = &mut self.extents {
                    e.add_curve_to(&a, b, c, d);
                }
                self.current_point = *d;
            }
            fn close(&mut self) {}
        }

        let mut bounder = Bounder {
            current_point: Point::default(),
            extents: None,
        };
        self.interpret(&mut bounder);
        bounder.extents
    }
}

/// Path interpreter adaptor replacing curves with flattened line-tos.
pub struct Flattener<'a, S> {
    sink: &'a mut S,
    tolerance: f64,
    current_point: Point,
}

impl<'a, S: PathInterpreter> Flattener<'a, S> {
    pub fn new(sink: &'a mut S, tolerance: f64) -> Self {
        Flattener {
            sink,
            tolerance,
            current_point: Point::default(),
        }
    }
}

impl<S: PathInterpreter> PathInterpreter for Flattener<'_, S> {
    fn move_to(&mut self, p: &Point) {
        self.current_point = *p;
        self.sink.move_to(p);
    }

    fn line_to(&mut self, p: &Point) {
        self.current_point = *p;
        self.sink.line_to(p);
    }

    fn curve_to(&mut self, b: &Point, c: &Point, d: &Point) {
        match Spline::new(&self.current_point, b, c, d) {
            Some(mut spline) => {
                let sink = &mut *self.sink;
                spline.decompose(self.tolerance, &mut |p, _| sink.line_to(&p));
            }
            None => self.sink.line_to(d),
        }
        self.current_point = *d;
    }

    fn close(&mut self) {
        self.sink.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::math::euclid;
    use crate::point;

    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
    }

    impl PathInterpreter for Recorder {
        fn move_to(&mut self, p: &Point) {
            self.ops.push(format!("M {:?} {:?}", p.x, p.y));
        }
        fn line_to(&mut self, p: &Point) {
            self.ops.push(format!("L {:?} {:?}", p.x, p.y));
        }
        fn curve_to(&mut self, _: &Point, _: &Point, d: &Point) {
            self.ops.push(format!("C {:?} {:?}", d.x, d.y));
        }
        fn close(&mut self) {
            self.ops.push("Z".into());
        }
    }

    fn record(path: &Path) -> Vec<String> {
        let mut r = Recorder::default();
        path.interpret(&mut r);
        r.ops
    }

    fn fx(v: f64) -> Fixed {
        Fixed::from_f64(v)
    }

    #[test]
    fn move_only_paths_emit_trailing_move() {
        let mut p = Path::new();
        p.move_to(fx(1.0), fx(2.0));
        p.move_to(fx(3.0), fx(4.0));
        // Deferred moves are not stored; the trailing one is replayed.
        assert!(p.is_empty());
        assert_eq!(record(&p), vec!["M 3 4"]);
    }

    #[test]
    fn collinear_line_tos_merge() {
        let mut p = Path::new();
        p.move_to(fx(0.0), fx(0.0));
        p.line_to(fx(1.0), fx(0.0));
        p.line_to(fx(2.0), fx(0.0));
        assert_eq!(record(&p), vec!["M 0 0", "L 2 0"]);
    }

    #[test]
    fn antiparallel_line_tos_do_not_merge() {
        let mut p = Path::new();
        p.move_to(fx(0.0), fx(0.0));
        p.line_to(fx(2.0), fx(0.0));
        p.line_to(fx(1.0), fx(0.0));
        assert_eq!(record(&p), vec!["M 0 0", "L 2 0", "L 1 0"]);
    }

    #[test]
    fn degenerate_line_after_move_is_kept() {
        let mut p = Path::new();
        p.move_to(fx(1.0), fx(1.0));
        p.line_to(fx(1.0), fx(1.0));
        assert_eq!(record(&p), vec!["M 1 1", "L 1 1"]);

        // But dropped later in a subpath.
        let mut p = Path::new();
        p.move_to(fx(0.0), fx(0.0));
        p.line_to(fx(1.0), fx(0.0));
        p.line_to(fx(1.0), fx(0.0));
        assert_eq!(record(&p), vec!["M 0 0", "L 1 0"]);
    }

    #[test]
    fn close_on_empty_subpath_is_noop() {
        let mut p = Path::new();
        p.close();
        assert!(p.is_empty());
    }

    #[test]
    fn degenerate_curve_becomes_line() {
        let mut p = Path::new();
        p.move_to(fx(1.0), fx(1.0));
        p.curve_to(fx(1.0), fx(1.0), fx(1.0), fx(1.0), fx(1.0), fx(1.0));
        assert!(!p.has_curve_to());
        assert_eq!(record(&p), vec!["M 1 1", "L 1 1"]);
    }

    #[test]
    fn rel_ops_need_current_point() {
        let mut p = Path::new();
        assert_eq!(p.rel_line_to(fx(1.0), fx(0.0)), Err(PathError::NoCurrentPoint));
        p.move_to(fx(1.0), fx(1.0));
        assert!(p.rel_line_to(fx(1.0), fx(0.0)).is_ok());
        assert_eq!(p.current_point(), Some(point(2.0, 1.0)));
    }

    #[test]
    fn rectilinear_flags() {
        let mut p = Path::new();
        p.move_to(fx(0.0), fx(0.0));
        p.line_to(fx(4.0), fx(0.0));
        p.line_to(fx(4.0), fx(4.0));
        assert!(p.stroke_is_rectilinear());
        // Not closed back over the start: the implicit close is diagonal.
        p.new_sub_path();
        assert!(p.stroke_is_rectilinear());
        assert!(!p.fill_is_rectilinear());

        let mut p = Path::new();
        p.move_to(fx(0.0), fx(0.0));
        p.line_to(fx(4.0), fx(4.0));
        assert!(!p.stroke_is_rectilinear());
        assert!(!p.fill_is_rectilinear());
    }

    #[test]
    fn region_hint_requires_integer_coords() {
        let mut p = Path::new();
        p.move_to(fx(0.0), fx(0.0));
        p.line_to(fx(4.0), fx(0.0));
        p.line_to(fx(4.0), fx(4.0));
        p.line_to(fx(0.0), fx(4.0));
        p.close();
        assert!(p.fill_maybe_region());

        let mut p = Path::new();
        p.move_to(fx(0.5), fx(0.0));
        p.line_to(fx(4.0), fx(0.0));
        p.line_to(fx(4.0), fx(4.0));
        p.line_to(fx(0.5), fx(4.0));
        p.close();
        assert!(p.fill_is_rectilinear());
        assert!(!p.fill_maybe_region());
    }

    #[test]
    fn extents_track_ops() {
        let mut p = Path::new();
        p.move_to(fx(1.0), fx(1.0));
        p.line_to(fx(5.0), fx(3.0));
        let e = p.extents().unwrap();
        assert_eq!(e.p1, point(1.0, 1.0));
        assert_eq!(e.p2, point(5.0, 3.0));

        let r = p.fill_extents();
        assert_eq!((r.x, r.y, r.width, r.height), (1, 1, 4, 2));
    }

    #[test]
    fn transform_scale_fast_path_matches_general() {
        let build = || {
            let mut p = Path::new();
            p.move_to(fx(1.0), fx(1.0));
            p.line_to(fx(3.0), fx(1.0));
            p.line_to(fx(3.0), fx(2.0));
            p.close();
            p
        };

        let mut fast = build();
        fast.transform(&Transform::scale(2.0, -3.0).then_translate(crate::geom::math::dvector(5.0, 7.0)));

        let e = fast.extents().unwrap();
        assert_eq!(e.p1, point(7.0, 1.0));
        assert_eq!(e.p2, point(11.0, 4.0));
        assert_eq!(fast.points()[0], point(7.0, 4.0));
    }

    #[test]
    fn transform_general_rebuilds_extents() {
        let mut p = Path::new();
        p.move_to(fx(0.0), fx(0.0));
        p.line_to(fx(2.0), fx(0.0));
        p.transform(&Transform::rotation(euclid::Angle::degrees(90.0)));

        assert!(!p.stroke_is_rectilinear());
        let e = p.extents().unwrap();
        // (0,0) and (0,2), within fixed-point resolution.
        assert!((e.p2.y.to_f64() - 2.0).abs() < 0.01);
        assert!(e.p2.x.to_f64().abs() < 0.01);
    }

    #[test]
    fn append_offsets_ops() {
        let mut a = Path::new();
        a.move_to(fx(0.0), fx(0.0));
        a.line_to(fx(1.0), fx(0.0));

        let mut b = Path::new();
        b.move_to(fx(5.0), fx(5.0));
        b.line_to(fx(6.0), fx(5.0));

        a.append(&b, fx(1.0), fx(1.0));
        assert_eq!(record(&a), vec!["M 0 0", "L 1 0", "M 6 6", "L 7 6"]);
    }

    #[test]
    fn flattened_interpretation_has_no_curves() {
        let mut p = Path::new();
        p.move_to(fx(0.0), fx(0.0));
        p.curve_to(fx(3.0), fx(0.0), fx(3.0), fx(3.0), fx(0.0), fx(3.0));

        let mut r = Recorder::default();
        p.interpret_flat(&mut r, 0.25);
        assert!(r.ops.iter().all(|op| !op.starts_with('C')));
        assert_eq!(r.ops.last().unwrap(), "L 0 3");
    }
}
