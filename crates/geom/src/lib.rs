//! Geometric primitives on 24.8 fixed-point coordinates.
//!
//! Everything the tessellators reason about lives here: points, direction
//! vectors ([`Slope`]), lines, axis-aligned boxes, the cubic bézier
//! flattener and the convex hull used to build stroking pens. Device-space
//! math that genuinely needs floating point (tangent normalisation, the
//! current transformation matrix) goes through the f64 aliases in [`math`].

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub use trapeze_fixed as fixed;

pub use crate::fixed::Fixed;

mod box2d;
pub mod hull;
mod line;
pub mod math;
mod point;
mod slope;
pub mod spline;

pub use crate::box2d::{Box2D, IntRect};
pub use crate::line::Line;
pub use crate::point::{point, Point};
pub use crate::slope::Slope;
