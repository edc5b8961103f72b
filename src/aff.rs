//! Affine expressions over a [`LocalSpace`] and their piecewise unions.

use presburger_bigint::BigInt;

use crate::local_space::LocalSpace;
use crate::set::Set;

/// `(const + coeffs·x) / denom`, `denom > 0`, normalized so
/// `gcd(denom, const, coeffs...) == 1` (or `denom == 1` if every
/// coefficient is zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aff {
    local_space: LocalSpace,
    /// `[denom, const, coeffs...]`, length `2 + local_space.var_cols()`.
    row: Vec<BigInt>,
}

impl Aff {
    /// The zero affine expression `0 / 1` over `local_space`.
    #[must_use]
    pub fn zero(local_space: LocalSpace) -> Self {
        let row = vec![BigInt::zero(); 2 + local_space.var_cols()];
        let mut aff = Aff { local_space, row };
        aff.row[0] = BigInt::one();
        aff
    }

    /// Build and normalize from a raw `[denom, const, coeffs...]` row.
    ///
    /// # Panics
    /// Panics if `denom <= 0` or the row has the wrong width.
    #[must_use]
    pub fn from_row(local_space: LocalSpace, row: Vec<BigInt>) -> Self {
        assert_eq!(row.len(), 2 + local_space.var_cols(), "aff row has wrong width");
        assert!(row[0].is_positive(), "aff denominator must be positive");
        let mut aff = Aff { local_space, row };
        aff.normalize();
        aff
    }

    /// The affine expression equal to dimension `i` of `local_space`'s
    /// variables (parameters come first, then in, then out, then divs —
    /// per [`LocalSpace`]'s column layout; `var_index` is that combined
    /// index, i.e. `local_space.param_offset() + i` etc.).
    #[must_use]
    pub fn var(local_space: LocalSpace, var_index: usize) -> Self {
        let mut aff = Aff::zero(local_space);
        aff.row[2 + var_index] = BigInt::one();
        aff
    }

    /// The constant affine expression `k`.
    #[must_use]
    pub fn constant_on(local_space: LocalSpace, k: BigInt) -> Self {
        let mut aff = Aff::zero(local_space);
        aff.row[1] = k;
        aff
    }

    #[must_use]
    pub fn local_space(&self) -> &LocalSpace {
        &self.local_space
    }

    #[must_use]
    pub fn denom(&self) -> &BigInt {
        &self.row[0]
    }

    #[must_use]
    pub fn constant(&self) -> &BigInt {
        &self.row[1]
    }

    #[must_use]
    pub fn coeff(&self, var_index: usize) -> &BigInt {
        &self.row[2 + var_index]
    }

    #[must_use]
    pub fn row(&self) -> &[BigInt] {
        &self.row
    }

    fn normalize(&mut self) {
        let g = self.row[1..]
            .iter()
            .fold(self.row[0].clone(), |acc, v| acc.gcd(v));
        if !g.is_zero() && g != BigInt::one() {
            for v in &mut self.row {
                *v = v.divexact(&g);
            }
        }
        if self.row[0].is_negative() {
            for v in &mut self.row {
                *v = v.negate();
            }
        }
    }

    /// `self + other`, over the same local space.
    ///
    /// # Panics
    /// Panics if the local spaces differ.
    #[must_use]
    pub fn add(&self, other: &Aff) -> Self {
        assert_eq!(self.local_space, other.local_space, "aff local spaces must match");
        let d = &self.row[0] * &other.row[0];
        let row: Vec<BigInt> = std::iter::once(d.clone())
            .chain(
                self.row[1..]
                    .iter()
                    .zip(other.row[1..].iter())
                    .map(|(a, b)| &(a * &other.row[0]) + &(b * &self.row[0])),
            )
            .collect();
        Aff::from_row(self.local_space.clone(), row)
    }

    /// Scale by an integer constant.
    #[must_use]
    pub fn scale(&self, k: &BigInt) -> Self {
        let mut row = self.row.clone();
        for v in &mut row[1..] {
            *v = &*v * k;
        }
        Aff::from_row(self.local_space.clone(), row)
    }

    /// Evaluate at a full variable assignment (length `var_cols()`),
    /// returning the exact rational value as `(numerator, denom)`.
    ///
    /// # Panics
    /// Panics on a length mismatch.
    #[must_use]
    pub fn eval(&self, point: &[BigInt]) -> (BigInt, BigInt) {
        assert_eq!(point.len(), self.local_space.var_cols(), "aff eval point has wrong width");
        let mut acc = self.row[1].clone();
        for (c, x) in self.row[2..].iter().zip(point.iter()) {
            acc = acc + c * x;
        }
        (acc, self.row[0].clone())
    }
}

/// A `Space` plus an ordered list of `(Set, Aff)` pieces with
/// pairwise-disjoint sets sharing that space.
#[derive(Debug, Clone)]
pub struct PwAff {
    pieces: Vec<(Set, Aff)>,
}

impl PwAff {
    /// An empty piecewise affine expression (defined nowhere).
    #[must_use]
    pub fn empty() -> Self {
        PwAff { pieces: Vec::new() }
    }

    /// A single-piece `PwAff` defined on all of `domain`.
    #[must_use]
    pub fn from_aff(domain: Set, aff: Aff) -> Self {
        PwAff { pieces: vec![(domain, aff)] }
    }

    #[must_use]
    pub fn pieces(&self) -> &[(Set, Aff)] {
        &self.pieces
    }

    /// Append a piece. Callers are responsible for keeping pieces
    /// pairwise disjoint (as built by the PIP solver's region tree).
    pub fn push_piece(&mut self, domain: Set, aff: Aff) {
        self.pieces.push((domain, aff));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    #[test]
    fn zero_aff_normalizes_to_denom_one() {
        let ls = LocalSpace::new(Space::set(0, 1));
        let a = Aff::zero(ls);
        assert_eq!(a.denom(), &BigInt::one());
        assert_eq!(a.constant(), &BigInt::zero());
    }

    #[test]
    fn add_combines_denominators() {
        let ls = LocalSpace::new(Space::set(0, 1));
        let a = Aff::constant_on(ls.clone(), BigInt::from_i64(1));
        let b = Aff::var(ls, 0);
        let sum = a.add(&b);
        assert_eq!(sum.constant(), &BigInt::one());
        assert_eq!(sum.coeff(0), &BigInt::one());
    }

    #[test]
    fn eval_computes_rational_value() {
        let ls = LocalSpace::new(Space::set(0, 1));
        let a = Aff::var(ls, 0).scale(&BigInt::from_i64(3));
        let (num, den) = a.eval(&[BigInt::from_i64(4)]);
        assert_eq!(num, BigInt::from_i64(12));
        assert_eq!(den, BigInt::one());
    }
}
