//! Floating-point companions to the fixed-point primitives.
//!
//! The transformation matrix handed in by the drawing context, and the
//! tangent/normal math the stroker performs in device space, use f64
//! through euclid. Callers supply the matrix together with its inverse;
//! invertibility is not re-checked here.

pub use euclid;

/// An f64 point.
pub type DPoint = euclid::default::Point2D<f64>;
/// An f64 vector.
pub type DVector = euclid::default::Vector2D<f64>;
/// A 3x2 affine transformation matrix.
pub type Transform = euclid::default::Transform2D<f64>;

pub use euclid::default::Point2D;
pub use euclid::point2 as dpoint;
pub use euclid::vec2 as dvector;

/// Whether the matrix has no shear components (a scale and translation
/// only). Such matrices admit the in-place path transform fast path.
#[inline]
pub fn transform_is_scale(m: &Transform) -> bool {
    m.m12 == 0.0 && m.m21 == 0.0
}

/// Length of the major axis of the ellipse that `m` maps a circle of radius
/// `radius` onto. Used to size the pen and to bound stroke extents.
pub fn transformed_circle_major_axis(m: &Transform, radius: f64) -> f64 {
    let a = m.m11;
    let b = m.m12;
    let c = m.m21;
    let d = m.m22;

    let i = a * a + b * b;
    let j = c * c + d * d;

    let f = 0.5 * (i + j);
    let g = 0.5 * (i - j);
    let h = a * c + b * d;

    radius * (f + (g * g + h * h).sqrt()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_detection() {
        assert!(transform_is_scale(&Transform::identity()));
        assert!(transform_is_scale(&Transform::scale(2.0, 3.0)));
        assert!(!transform_is_scale(&Transform::rotation(euclid::Angle::radians(0.3))));
    }

    #[test]
    fn major_axis() {
        let m = Transform::scale(3.0, 2.0);
        assert!((transformed_circle_major_axis(&m, 1.0) - 3.0).abs() < 1e-9);

        let m = Transform::rotation(euclid::Angle::radians(1.0));
        assert!((transformed_circle_major_axis(&m, 2.0) - 2.0).abs() < 1e-9);
    }
}
