//! Path storage and interpretation.
//!
//! A [`Path`] is an ordered stream of move/line/curve/close operations over
//! fixed-point points, maintaining a set of incremental invariants
//! (extents, rectilinearity, region candidacy) that the tessellation fast
//! paths key off. See the [`Path`] documentation for the exact op
//! canonicalisation rules.

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub use trapeze_geom as geom;

pub use crate::geom::fixed;

pub use crate::geom::{point, Box2D, Fixed, IntRect, Line, Point, Slope};

mod path;
mod queries;

pub use crate::path::{Flattener, Path, PathInterpreter, Verb};
pub use crate::queries::PathIter;

use std::fmt;

/// The fill rule defines how overlapping subpaths select the filled
/// region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    /// Non-zero winding number.
    Winding,
    /// Odd winding parity.
    EvenOdd,
}

impl FillRule {
    /// Whether a point with the given winding number is outside the fill.
    #[inline]
    pub fn is_outside(self, winding: i32) -> bool {
        match self {
            FillRule::Winding => winding == 0,
            FillRule::EvenOdd => winding & 1 == 0,
        }
    }
}

impl Default for FillRule {
    fn default() -> Self {
        FillRule::Winding
    }
}

/// Shape of the ends of an open stroked subpath (and of every dash).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl Default for LineCap {
    fn default() -> Self {
        LineCap::Butt
    }
}

/// Shape of the corner where two stroked segments meet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl Default for LineJoin {
    fn default() -> Self {
        LineJoin::Miter
    }
}

/// Antialiasing request forwarded from the drawing context. The tessellator
/// only distinguishes "none" (snap to the pixel grid with `round_down`)
/// from everything else.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Antialias {
    None,
    Default,
}

impl Default for Antialias {
    fn default() -> Self {
        Antialias::Default
    }
}

/// Errors raised by path construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathError {
    /// A relative operation was invoked with no current point.
    NoCurrentPoint,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::NoCurrentPoint => write!(f, "no current point"),
        }
    }
}

impl std::error::Error for PathError {}
