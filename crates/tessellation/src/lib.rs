//! Tessellation of 2D fill and stroke operations into trapezoids.
//!
//! ## Overview
//!
//! The pipeline turns a fixed-point path plus a style and transform into a
//! set of non-overlapping trapezoids (or, for rectilinear content,
//! axis-aligned boxes) that a scan converter can rasterise directly:
//!
//! * [`fill_to_traps`] - fill a path under a [`FillRule`].
//! * [`stroke_polygon_to_traps`] - expand a stroked path (caps, joins,
//!   dashes, splines) and tessellate the outline.
//! * [`fill_rectilinear_to_boxes`] / [`stroke_rectilinear_to_boxes`] -
//!   fast paths for axis-aligned input, emitting boxes without the general
//!   sweep.
//!
//! The general tessellator is a Bentley-Ottmann sweep over the polygon's
//! edges with exact 128-bit intersection arithmetic, so that rounding can
//! never reorder the sweep and change the topology of the output.
//!
//! Intermediate results flow through [`Polygon`] (directed edge lists),
//! [`Traps`] and [`Boxes`].

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub use trapeze_path as path;

pub use crate::path::geom;

pub use crate::path::fixed;

use crate::geom::math::{transformed_circle_major_axis, Transform};

#[cfg(debug_assertions)]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => {
        if $obj.log {
            println!($fmt);
        }
    };
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {
        if $obj.log {
            println!($fmt, $($arg)*);
        }
    };
}

#[cfg(not(debug_assertions))]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => {
        let _ = &$obj;
    };
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {
        let _ = &$obj;
    };
}

mod bentley_ottmann;
mod bentley_ottmann_rectilinear;
mod boxes;
mod dash;
mod error;
mod fill;
mod pen;
mod polygon;
mod stroke;
mod stroke_rectilinear;
mod traps;

#[cfg(test)]
mod stroke_tests;

pub use crate::bentley_ottmann::tessellate_polygon;
pub use crate::bentley_ottmann_rectilinear::{
    tessellate_boxes, tessellate_rectilinear_polygon, tessellate_rectilinear_polygon_to_boxes,
    tessellate_rectilinear_traps,
};
pub use crate::boxes::Boxes;
pub use crate::error::{InternalError, TessellationError, TessellationResult};
pub use crate::fill::{
    fill_rectilinear_to_boxes, fill_rectilinear_to_polygon, fill_to_polygon, fill_to_traps,
};
pub use crate::pen::{Pen, PenVertex};
pub use crate::polygon::{Edge, Polygon};
pub use crate::stroke::{
    stroke_polygon_to_traps, stroke_to_polygon, stroke_to_shaper, StrokeFace, StrokeOutput,
};
pub use crate::stroke_rectilinear::stroke_rectilinear_to_boxes;
pub use crate::traps::{Trapezoid, Traps};

pub use crate::path::{Antialias, FillRule, LineCap, LineJoin};

/// How to render the outline of a path.
///
/// Dash lengths and offsets are expressed in user space; the defaults
/// follow the conventional drawing-context defaults (a two-unit-wide
/// butt-capped, miter-joined solid line).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeStyle {
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub dash: Vec<f64>,
    pub dash_offset: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        StrokeStyle {
            line_width: 2.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

impl StrokeStyle {
    #[inline]
    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }

    /// The furthest, in device-space x and y, that stroking can place ink
    /// from the path itself: half the line width, grown for square caps
    /// and (on non-rectilinear paths) for miters up to the miter limit.
    /// Used to pad clip bounds before culling stroke geometry.
    pub fn max_distance_from_path(
        &self,
        stroke_is_rectilinear: bool,
        ctm: &Transform,
    ) -> (f64, f64) {
        let mut style_expansion: f64 = 0.5;

        if self.line_cap == LineCap::Square {
            style_expansion = std::f64::consts::FRAC_1_SQRT_2;
        }

        if self.line_join == LineJoin::Miter && !stroke_is_rectilinear {
            let miter = std::f64::consts::SQRT_2 * self.miter_limit;
            if style_expansion < miter {
                style_expansion = miter;
            }
        }

        style_expansion *= self.line_width;

        let dx = style_expansion * (ctm.m11.hypot(ctm.m21));
        let dy = style_expansion * (ctm.m22.hypot(ctm.m12));
        (dx, dy)
    }

    /// Total length of one period of the dash pattern. An odd number of
    /// dash entries is implicitly doubled, as if the pattern were repeated
    /// with inverted on/off phases.
    pub fn dash_period(&self) -> f64 {
        let sum: f64 = self.dash.iter().sum();
        if self.dash.len() & 1 == 1 {
            2.0 * sum
        } else {
            sum
        }
    }

    /// Ratio of one dash period that is "on".
    pub fn dash_stroked(&self) -> f64 {
        let mut stroked = 0.0;
        let mut i = 0;
        while i < self.dash.len() {
            stroked += self.dash[i];
            i += 2;
        }
        if self.dash.len() & 1 == 1 {
            // Odd-length patterns alternate phase per period; both halves
            // together stroke the full sum once.
            let sum: f64 = self.dash.iter().sum();
            stroked = sum;
        }
        stroked
    }

    /// The pen radius in user space: half the line width.
    #[inline]
    pub fn half_line_width(&self) -> f64 {
        self.line_width / 2.0
    }

    /// The device-space major radius of the pen under `ctm`.
    pub fn pen_major_axis(&self, ctm: &Transform) -> f64 {
        transformed_circle_major_axis(ctm, self.half_line_width())
    }
}

#[cfg(test)]
mod style_tests {
    use super::*;

    #[test]
    fn defaults() {
        let style = StrokeStyle::default();
        assert_eq!(style.line_width, 2.0);
        assert_eq!(style.line_cap, LineCap::Butt);
        assert_eq!(style.line_join, LineJoin::Miter);
        assert!(!style.is_dashed());
    }

    #[test]
    fn dash_period_doubles_odd_patterns() {
        let mut style = StrokeStyle::default();
        style.dash = vec![2.0, 1.0];
        assert_eq!(style.dash_period(), 3.0);
        assert_eq!(style.dash_stroked(), 2.0);

        style.dash = vec![2.0];
        assert_eq!(style.dash_period(), 4.0);
        assert_eq!(style.dash_stroked(), 2.0);
    }

    #[test]
    fn max_distance_grows_with_miter() {
        let id = Transform::identity();
        let mut style = StrokeStyle::default();
        style.miter_limit = 10.0;

        let (dx, _) = style.max_distance_from_path(false, &id);
        assert!((dx - std::f64::consts::SQRT_2 * 10.0 * 2.0).abs() < 1e-9);

        // Rectilinear paths cannot produce long miters.
        let (dx, dy) = style.max_distance_from_path(true, &id);
        assert_eq!((dx, dy), (1.0, 1.0));
    }
}
