//! A single constraint row: `c0 + sum(cj * xj) ⊙ 0`, `⊙ ∈ {=, ≥}`.

use presburger_bigint::BigInt;

use crate::local_space::LocalSpace;

/// Whether a [`Constraint`] asserts equality or non-negativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Equality,
    Inequality,
}

/// One constraint row together with the [`LocalSpace`] that gives its
/// columns meaning. Constraints are usually built and consumed as plain
/// `Vec<BigInt>` rows inside [`crate::basic_map::BasicMap`]; this type
/// exists for the public, name-aware constraint-building API (the
/// `isl_constraint` analogue).
#[derive(Debug, Clone)]
pub struct Constraint {
    local_space: LocalSpace,
    kind: ConstraintKind,
    row: Vec<BigInt>,
}

impl Constraint {
    /// An all-zero equality `0 = 0` over `local_space`.
    #[must_use]
    pub fn zero_equality(local_space: LocalSpace) -> Self {
        let len = local_space.constraint_len();
        Constraint {
            local_space,
            kind: ConstraintKind::Equality,
            row: vec![BigInt::zero(); len],
        }
    }

    /// An all-zero inequality `0 >= 0` over `local_space`.
    #[must_use]
    pub fn zero_inequality(local_space: LocalSpace) -> Self {
        let len = local_space.constraint_len();
        Constraint {
            local_space,
            kind: ConstraintKind::Inequality,
            row: vec![BigInt::zero(); len],
        }
    }

    /// Build directly from a raw row (length must equal
    /// `local_space.constraint_len()`).
    ///
    /// # Panics
    /// Panics on a row-length mismatch.
    #[must_use]
    pub fn from_row(local_space: LocalSpace, kind: ConstraintKind, row: Vec<BigInt>) -> Self {
        assert_eq!(row.len(), local_space.constraint_len(), "constraint row has wrong width");
        Constraint { local_space, kind, row }
    }

    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    #[must_use]
    pub fn local_space(&self) -> &LocalSpace {
        &self.local_space
    }

    #[must_use]
    pub fn row(&self) -> &[BigInt] {
        &self.row
    }

    /// The constant term.
    #[must_use]
    pub fn constant(&self) -> &BigInt {
        &self.row[0]
    }

    pub fn set_constant(&mut self, v: BigInt) {
        self.row[0] = v;
    }

    /// Coefficient of parameter `i`.
    #[must_use]
    pub fn coeff_param(&self, i: usize) -> &BigInt {
        &self.row[self.local_space.param_offset() + i]
    }

    pub fn set_coeff_param(&mut self, i: usize, v: BigInt) {
        let off = self.local_space.param_offset() + i;
        self.row[off] = v;
    }

    /// Coefficient of input dimension `i`.
    #[must_use]
    pub fn coeff_in(&self, i: usize) -> &BigInt {
        &self.row[self.local_space.in_offset() + i]
    }

    pub fn set_coeff_in(&mut self, i: usize, v: BigInt) {
        let off = self.local_space.in_offset() + i;
        self.row[off] = v;
    }

    /// Coefficient of output (or set) dimension `i`.
    #[must_use]
    pub fn coeff_out(&self, i: usize) -> &BigInt {
        &self.row[self.local_space.out_offset() + i]
    }

    pub fn set_coeff_out(&mut self, i: usize, v: BigInt) {
        let off = self.local_space.out_offset() + i;
        self.row[off] = v;
    }

    /// Coefficient of div `i`.
    #[must_use]
    pub fn coeff_div(&self, i: usize) -> &BigInt {
        &self.row[self.local_space.div_offset() + i]
    }

    pub fn set_coeff_div(&mut self, i: usize, v: BigInt) {
        let off = self.local_space.div_offset() + i;
        self.row[off] = v;
    }

    /// Negate every coefficient and the constant term in place (turns
    /// `a ⊙ 0` into `-a ⊙ 0`; combined with a kind change this produces
    /// the complementary half-space of an inequality).
    pub fn negate(&mut self) {
        for v in &mut self.row {
            *v = v.negate();
        }
    }

    /// Consume the constraint, returning its raw row.
    #[must_use]
    pub fn into_row(self) -> Vec<BigInt> {
        self.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    #[test]
    fn accessors_round_trip() {
        let ls = LocalSpace::new(Space::map(1, 1, 1));
        let mut c = Constraint::zero_inequality(ls);
        c.set_constant(BigInt::from_i64(5));
        c.set_coeff_param(0, BigInt::from_i64(2));
        c.set_coeff_in(0, BigInt::from_i64(-1));
        c.set_coeff_out(0, BigInt::from_i64(3));
        assert_eq!(c.constant(), &BigInt::from_i64(5));
        assert_eq!(c.coeff_param(0), &BigInt::from_i64(2));
        assert_eq!(c.coeff_in(0), &BigInt::from_i64(-1));
        assert_eq!(c.coeff_out(0), &BigInt::from_i64(3));
    }

    #[test]
    fn negate_flips_every_entry() {
        let ls = LocalSpace::new(Space::set(0, 1));
        let mut c = Constraint::zero_equality(ls);
        c.set_constant(BigInt::from_i64(4));
        c.negate();
        assert_eq!(c.constant(), &BigInt::from_i64(-4));
    }
}
