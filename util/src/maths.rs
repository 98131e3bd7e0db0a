//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Wrap an angle into the range (-pi, pi].
///
/// This gives the shortest signed representation of an angular difference, so that a turn from
/// just below pi to just above -pi is a small positive step rather than a full revolution.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t: T = pi_t + pi_t;

    // Shift into [0, 2pi), then back down. A result of exactly -pi is moved to pi so the range is
    // open at the bottom.
    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    if wrapped <= -pi_t {
        wrapped + tau_t
    } else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_wrap_pi() {
        assert_eq!(wrap_pi(0f64), 0f64);
        assert_eq!(wrap_pi(PI), PI);
        assert_eq!(wrap_pi(-PI), PI);
        assert!((wrap_pi(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_pi(-TAU - 0.5) + 0.5).abs() < 1e-12);

        // Crossing the +-pi boundary gives the short way round
        assert!((wrap_pi(-3.0f64 - 3.0) - (TAU - 6.0)).abs() < 1e-12);
        assert!((wrap_pi(3.1f64 - (-3.1)) - (6.2 - TAU)).abs() < 1e-12);
    }

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(5f64, 3f64), 2f64);
        assert_eq!(rem_euclid(-1f64, 3f64), 2f64);
        assert_eq!(rem_euclid(3f64, 3f64), 0f64);
    }
}
