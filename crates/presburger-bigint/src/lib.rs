#![forbid(unsafe_code)]
//! Arbitrary-precision integer core for the `presburger` crate.
//!
//! This crate supplies the single `BigInt` type every constraint row,
//! matrix entry, and tableau cell in `presburger` is built from. All
//! library arithmetic goes through it: there is no silent-width
//! wraparound anywhere above this layer.
//!
//! Division always floors toward negative infinity (`fdiv_q`/`fdiv_r`),
//! independent of the platform's native signed-division behavior.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Rem, Sub, SubAssign};

use num_bigint::{BigInt as Inner, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// An arbitrary-precision signed integer.
///
/// Wraps [`num_bigint::BigInt`] behind a newtype so the rest of the crate
/// depends on one narrow surface (add/sub/mul/gcd/floor-division/compare)
/// rather than on `num-bigint` directly, the same way the library is
/// expected to swap in a different arbitrary-precision backend without
/// touching call sites.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BigInt(Inner);

impl BigInt {
    /// The additive identity, `0`.
    #[must_use]
    pub fn zero() -> Self {
        Self(Inner::zero())
    }

    /// The multiplicative identity, `1`.
    #[must_use]
    pub fn one() -> Self {
        Self(Inner::one())
    }

    /// `-1`, used pervasively when negating inequalities.
    #[must_use]
    pub fn minus_one() -> Self {
        Self(-Inner::one())
    }

    /// Build a `BigInt` from a native `i64`.
    #[must_use]
    pub fn from_i64(v: i64) -> Self {
        Self(Inner::from(v))
    }

    /// Build a `BigInt` from a native `u64`.
    #[must_use]
    pub fn from_u64(v: u64) -> Self {
        Self(Inner::from(v))
    }

    /// `true` if this value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `true` if this value is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0.sign() == Sign::Plus
    }

    /// `true` if this value is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    /// Sign of the value: `-1`, `0`, or `1`.
    #[must_use]
    pub fn signum(&self) -> i32 {
        match self.0.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Negation.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self(-&self.0)
    }

    /// Greatest common divisor. Always non-negative; `gcd(0, 0) == 0`.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        Self(self.0.gcd(&other.0))
    }

    /// Floor division: `fdiv_q(a, b) = floor(a / b)`.
    ///
    /// Flooring is toward negative infinity regardless of the signs of
    /// `a` and `b`, matching `isl_int`'s documented semantics rather than
    /// Rust's native truncating `/`.
    ///
    /// # Panics
    /// Panics if `other` is zero.
    #[must_use]
    pub fn fdiv_q(&self, other: &Self) -> Self {
        assert!(!other.is_zero(), "fdiv_q by zero");
        Self(self.0.div_floor(&other.0))
    }

    /// Floor remainder: `a = fdiv_q(a, b) * b + fdiv_r(a, b)`, with
    /// `fdiv_r(a, b)` always having the same sign as `b` (or zero).
    ///
    /// # Panics
    /// Panics if `other` is zero.
    #[must_use]
    pub fn fdiv_r(&self, other: &Self) -> Self {
        assert!(!other.is_zero(), "fdiv_r by zero");
        Self(self.0.mod_floor(&other.0))
    }

    /// Exact division. Callers must establish divisibility first (e.g.
    /// via [`BigInt::gcd`]); this is not checked.
    ///
    /// # Panics
    /// Panics if `other` is zero.
    #[must_use]
    pub fn divexact(&self, other: &Self) -> Self {
        assert!(!other.is_zero(), "divexact by zero");
        Self(&self.0 / &other.0)
    }

    /// Ceiling division: `ceil(a / b)`.
    ///
    /// # Panics
    /// Panics if `other` is zero.
    #[must_use]
    pub fn cdiv_q(&self, other: &Self) -> Self {
        assert!(!other.is_zero(), "cdiv_q by zero");
        let q = self.fdiv_q(other);
        let r = self.fdiv_r(other);
        if r.is_zero() { q } else { q + Self::one() }
    }

    /// Parse from a decimal string.
    ///
    /// # Errors
    /// Returns an error string if `s` is not a valid base-10 integer.
    pub fn parse(s: &str) -> Result<Self, String> {
        s.trim()
            .parse::<Inner>()
            .map(Self)
            .map_err(|e| format!("invalid integer literal '{s}': {e}"))
    }

    /// Render as a native `i64` if it fits, for use in error messages and
    /// interfaces that only need small values (e.g. the `order` field of
    /// a derivative-like count).
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        use num_traits::ToPrimitive;
        self.0.to_i64()
    }
}

impl Default for BigInt {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BigInt {
    fn from(v: i64) -> Self {
        Self::from_i64(v)
    }
}

impl From<i32> for BigInt {
    fn from(v: i32) -> Self {
        Self::from_i64(i64::from(v))
    }
}

macro_rules! bin_op {
    ($trait_:ident, $method:ident, $op:tt) => {
        impl $trait_ for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                BigInt(self.0 $op rhs.0)
            }
        }
        impl $trait_ for &BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &BigInt) -> BigInt {
                BigInt(&self.0 $op &rhs.0)
            }
        }
    };
}

bin_op!(Add, add, +);
bin_op!(Sub, sub, -);
bin_op!(Mul, mul, *);

impl Div for BigInt {
    type Output = BigInt;
    fn div(self, rhs: BigInt) -> BigInt {
        self.fdiv_q(&rhs)
    }
}

impl Rem for BigInt {
    type Output = BigInt;
    fn rem(self, rhs: BigInt) -> BigInt {
        self.fdiv_r(&rhs)
    }
}

impl AddAssign<&BigInt> for BigInt {
    fn add_assign(&mut self, rhs: &BigInt) {
        self.0 += &rhs.0;
    }
}

impl SubAssign<&BigInt> for BigInt {
    fn sub_assign(&mut self, rhs: &BigInt) {
        self.0 -= &rhs.0;
    }
}

impl MulAssign<&BigInt> for BigInt {
    fn mul_assign(&mut self, rhs: &BigInt) {
        self.0 *= &rhs.0;
    }
}

impl Neg for BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        BigInt(-self.0)
    }
}

impl Neg for &BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        BigInt(-&self.0)
    }
}

/// Three-way comparison against zero, used throughout constraint
/// evaluation (`a·x ⊙ 0`).
#[must_use]
pub fn cmp_zero(v: &BigInt) -> Ordering {
    v.0.cmp(&Inner::zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_division_rounds_toward_negative_infinity() {
        assert_eq!(BigInt::from_i64(7).fdiv_q(&BigInt::from_i64(2)), BigInt::from_i64(3));
        assert_eq!(BigInt::from_i64(-7).fdiv_q(&BigInt::from_i64(2)), BigInt::from_i64(-4));
        assert_eq!(BigInt::from_i64(7).fdiv_q(&BigInt::from_i64(-2)), BigInt::from_i64(-4));
        assert_eq!(BigInt::from_i64(-7).fdiv_q(&BigInt::from_i64(-2)), BigInt::from_i64(3));
    }

    #[test]
    fn floor_remainder_matches_divisor_sign() {
        assert_eq!(BigInt::from_i64(-7).fdiv_r(&BigInt::from_i64(2)), BigInt::from_i64(1));
        assert_eq!(BigInt::from_i64(7).fdiv_r(&BigInt::from_i64(-2)), BigInt::from_i64(-1));
    }

    #[test]
    fn gcd_is_nonnegative() {
        assert_eq!(
            BigInt::from_i64(-12).gcd(&BigInt::from_i64(18)),
            BigInt::from_i64(6)
        );
        assert_eq!(BigInt::zero().gcd(&BigInt::zero()), BigInt::zero());
    }

    #[test]
    fn ceiling_division() {
        assert_eq!(BigInt::from_i64(7).cdiv_q(&BigInt::from_i64(2)), BigInt::from_i64(4));
        assert_eq!(BigInt::from_i64(6).cdiv_q(&BigInt::from_i64(2)), BigInt::from_i64(3));
        assert_eq!(BigInt::from_i64(-7).cdiv_q(&BigInt::from_i64(2)), BigInt::from_i64(-3));
    }

    #[test]
    fn parse_roundtrips_display() {
        let v = BigInt::parse("-123456789012345678901234567890").expect("valid literal");
        assert_eq!(v.to_string(), "-123456789012345678901234567890");
    }
}
