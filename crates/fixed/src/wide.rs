//! Wide-integer helpers for exact intersection arithmetic.
//!
//! The sweep line computes line/line intersections with 64-bit determinants
//! and a 96-by-64-bit division whose quotient must fit in 32 bits. Native
//! `i64`/`i128` cover the representation; what this module keeps as named
//! operations are the determinants and the divisions whose remainder
//! conventions the tessellator's rounding rule depends on: the sign of a
//! remainder always follows the dividend.

/// Quotient and remainder of a signed 64-bit division.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quorem64 {
    pub quo: i64,
    pub rem: i64,
}

/// Quotient and remainder of a signed 128-bit division.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quorem128 {
    pub quo: i128,
    pub rem: i128,
}

/// `a * d - b * c` with 32-bit inputs and a 64-bit result.
#[inline]
pub fn det32_64(a: i32, b: i32, c: i32, d: i32) -> i64 {
    a as i64 * d as i64 - b as i64 * c as i64
}

/// `a * d - b * c` with mixed 64/32-bit inputs and a 128-bit result.
#[inline]
pub fn det64x32_128(a: i64, b: i32, c: i64, d: i32) -> i128 {
    a as i128 * d as i128 - c as i128 * b as i128
}

/// Divides a signed 64-bit value, returning both quotient and remainder.
/// The quotient truncates towards zero and the remainder takes the sign of
/// the dividend.
#[inline]
pub fn i64_divrem(num: i64, den: i64) -> Quorem64 {
    Quorem64 {
        quo: num / den,
        rem: num % den,
    }
}

/// Divides a signed 128-bit value, with the same sign conventions as
/// [`i64_divrem`].
#[inline]
pub fn i128_divrem(num: i128, den: i128) -> Quorem128 {
    Quorem128 {
        quo: num / den,
        rem: num % den,
    }
}

/// Divides a 96-bit dividend by a 64-bit divisor, producing a quotient that
/// must fit in 32 bits and a 64-bit remainder.
///
/// Returns `None` when the quotient magnitude does not fit in 32 bits; the
/// caller treats that as "no intersection at this y" and carries on. It is
/// an error to call this with a dividend needing more than 96 bits.
#[inline]
pub fn int_96by64_32x64_divrem(num: i128, den: i64) -> Option<Quorem64> {
    debug_assert!(den != 0);
    debug_assert!(num.abs() < (1i128 << 96));

    let quo = num / den as i128;
    if quo > u32::MAX as i128 || quo < -(u32::MAX as i128) {
        return None;
    }

    Some(Quorem64 {
        quo: quo as i64,
        rem: (num % den as i128) as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinants() {
        assert_eq!(det32_64(1, 2, 3, 4), -2);
        assert_eq!(det32_64(i32::MAX, i32::MIN, i32::MIN, i32::MAX), {
            let a = i32::MAX as i64;
            let b = i32::MIN as i64;
            a * a - b * b
        });
        assert_eq!(det64x32_128(1 << 40, 3, 1 << 41, 7), (7i128 << 40) - (3i128 << 41));
    }

    #[test]
    fn remainder_sign_follows_dividend() {
        let qr = i64_divrem(-7, 2);
        assert_eq!(qr.quo, -3);
        assert_eq!(qr.rem, -1);

        let qr = i64_divrem(7, -2);
        assert_eq!(qr.quo, -3);
        assert_eq!(qr.rem, 1);
    }

    #[test]
    fn divrem_96by64() {
        let qr = int_96by64_32x64_divrem(1000, 7).unwrap();
        assert_eq!(qr.quo, 142);
        assert_eq!(qr.rem, 6);

        let qr = int_96by64_32x64_divrem(-1000, 7).unwrap();
        assert_eq!(qr.quo, -142);
        assert_eq!(qr.rem, -6);

        // A quotient needing more than 32 bits overflows.
        assert!(int_96by64_32x64_divrem((u32::MAX as i128 + 2) * 7, 7).is_none());
    }

    #[test]
    fn divrem_96by64_large_divisor() {
        let num = (1i128 << 90) + 12345;
        let den = (1i64 << 60) + 3;
        let qr = int_96by64_32x64_divrem(num, den).unwrap();
        assert_eq!(qr.quo as i128 * den as i128 + qr.rem as i128, num);
        assert!((qr.rem as i128).abs() < (den as i128).abs());
    }
}
