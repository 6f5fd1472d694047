//! 2D path tessellation using trapezoids.
//!
//! This crate is a facade over the trapeze family of crates:
//!
//! * [`trapeze_fixed`](https://docs.rs/trapeze_fixed/) - 24.8 fixed-point
//!   scalars and the wide-integer helpers backing exact intersection math.
//! * [`trapeze_geom`](https://docs.rs/trapeze_geom/) - points, slopes, boxes
//!   and lines in fixed point, cubic bézier flattening and convex hulls.
//! * [`trapeze_path`](https://docs.rs/trapeze_path/) - the path data
//!   structure and its interpreters.
//! * [`trapeze_tessellation`](https://docs.rs/trapeze_tessellation/) - fill
//!   and stroke tessellators producing trapezoids or axis-aligned boxes.

pub use trapeze_tessellation as tessellation;

pub use trapeze_tessellation::path;

pub use trapeze_tessellation::geom;

pub use trapeze_tessellation::fixed;

#[doc(inline)]
pub use trapeze_tessellation::{
    fill_rectilinear_to_boxes, fill_to_polygon, fill_to_traps, stroke_polygon_to_traps,
    stroke_rectilinear_to_boxes, stroke_to_polygon, Antialias, Boxes, FillRule, LineCap, LineJoin,
    Polygon, StrokeStyle, TessellationError, TessellationResult, Trapezoid, Traps,
};
