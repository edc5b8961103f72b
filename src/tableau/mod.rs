//! Rational/integer simplex tableau: the algorithmic heart (spec.md §4.4).
//!
//! A [`Tableau`] holds one row per basic (dependent) variable and one
//! column per non-basic variable, all scaled by a single common
//! denominator so every entry stays an exact integer. Row `i`'s sample
//! value is `row[i][0] / denom`. `pivot` exchanges a basic and
//! non-basic variable via the usual integer (fraction-free) simplex
//! update.

pub mod gbr;
pub mod gomory;
pub mod lexmin;
pub mod pip;

use presburger_bigint::BigInt;

use crate::ctx::Context;
use crate::vecmat::Mat;

/// One row's status: which variable it currently represents, and
/// whether that variable is constrained to be non-negative (an
/// inequality slack) or free (an equality's representative, or a
/// variable that has been proven unbounded below).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// The row is the slack of an original inequality; its sample must
    /// stay `>= 0`.
    Inequality,
    /// The row represents a variable pinned by an equality (sample is
    /// fixed to the constant column whenever all other entries are 0).
    Equality,
}

/// A variable's current role: basic (represented by a tableau row) or
/// non-basic (a tableau column, implicitly at its lower bound of 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarStatus {
    Basic(usize),
    NonBasic(usize),
}

/// The simplex tableau itself.
///
/// Columns `0` is the constant column (after dividing by `denom`,
/// `row[0]` is the row's sample value at the current vertex); columns
/// `1..=n_var` are the non-basic variables' coefficients.
#[derive(Debug, Clone)]
pub struct Tableau {
    mat: Mat,
    denom: BigInt,
    n_var: usize,
    row_kind: Vec<RowKind>,
    row_var: Vec<usize>,
    col_var: Vec<usize>,
    var_status: Vec<VarStatus>,
    empty: bool,
}

impl Tableau {
    /// Build an empty tableau over `n_var` non-basic variables, all at
    /// their zero lower bound, with no rows yet.
    #[must_use]
    pub fn new(n_var: usize) -> Self {
        Tableau {
            mat: Mat::zero(0, 1 + n_var),
            denom: BigInt::one(),
            n_var,
            row_kind: Vec::new(),
            row_var: Vec::new(),
            col_var: (0..n_var).collect(),
            var_status: (0..n_var).map(VarStatus::NonBasic).collect(),
            empty: false,
        }
    }

    #[must_use]
    pub fn n_var(&self) -> usize {
        self.n_var
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.mat.n_rows()
    }

    #[must_use]
    pub fn is_marked_empty(&self) -> bool {
        self.empty
    }

    pub fn mark_empty(&mut self) {
        self.empty = true;
    }

    /// Add a row `row = [const, coeffs over non-basic vars...]`
    /// representing either an inequality slack (`row >= 0`) or an
    /// equality's defining relation, introducing a new basic variable
    /// `var_index` to carry it.
    ///
    /// # Panics
    /// Panics if `row.len() != 1 + n_var`.
    pub fn add_row(&mut self, kind: RowKind, var_index: usize, row: Vec<BigInt>) -> usize {
        assert_eq!(row.len(), 1 + self.n_var, "tableau row has wrong width");
        self.mat.push_row(row);
        let r = self.mat.n_rows() - 1;
        self.row_kind.push(kind);
        self.row_var.push(var_index);
        self.var_status.push(VarStatus::Basic(r));
        r
    }

    /// Current sample value of row `r`: `row[r][0] / denom`.
    #[must_use]
    pub fn sample_numerator(&self, r: usize) -> &BigInt {
        self.mat.get(r, 0)
    }

    #[must_use]
    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    /// `true` if every basic inequality row has a non-negative sample
    /// (the current vertex is rationally feasible).
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        if self.empty {
            return false;
        }
        (0..self.n_rows()).all(|r| {
            self.row_kind[r] != RowKind::Inequality || !self.mat.get(r, 0).is_negative()
        })
    }

    /// Find a row with a negative sample that an inequality must keep
    /// non-negative, returning its index. Bland's-rule tie-break:
    /// lowest `row_var` first.
    #[must_use]
    pub fn first_infeasible_row(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for r in 0..self.n_rows() {
            if self.row_kind[r] == RowKind::Inequality && self.mat.get(r, 0).is_negative() {
                best = match best {
                    None => Some(r),
                    Some(b) if self.row_var[r] < self.row_var[b] => Some(r),
                    Some(b) => Some(b),
                };
            }
        }
        best
    }

    /// Exact-integer (fraction-free) pivot exchanging basic row `r` with
    /// non-basic column `c`: `mat[r][c]` becomes the new reciprocal
    /// pivot entry and every other row is updated to keep the tableau
    /// denominator-consistent.
    ///
    /// # Panics
    /// Panics if `mat.get(r, c + 1)` is zero.
    pub fn pivot(&mut self, r: usize, c: usize) {
        let pivot_val = self.mat.get(r, c + 1).clone();
        assert!(!pivot_val.is_zero(), "pivot on a zero entry");
        let pivot_sign = pivot_val.signum();
        let pivot_abs = pivot_val.abs();

        let old_denom = self.denom.clone();
        let new_denom = &old_denom * &pivot_abs;
        // s * old_denom, where s = sign(pivot_val): the scale factor that
        // turns the pivot row's "old_denom * x_l = ..." relation into the
        // entering variable's defining relation without flipping the sign
        // convention every other row's denominator keeps.
        let signed_denom = if pivot_sign < 0 { old_denom.negate() } else { old_denom.clone() };

        let cols = self.mat.n_cols();
        let pivot_row: Vec<BigInt> = self.mat.row(r).to_vec();

        for row_idx in 0..self.n_rows() {
            if row_idx == r {
                continue;
            }
            let factor = self.mat.get(row_idx, c + 1).clone();
            if factor.is_zero() {
                for j in 0..cols {
                    let scaled = self.mat.get(row_idx, j) * &pivot_abs;
                    self.mat.set(row_idx, j, scaled);
                }
                continue;
            }
            // s * factor: the leaving variable's new coefficient in this
            // row is this times old_denom, derived separately below since
            // the generic elimination formula cancels to zero exactly at
            // the pivot column (factor and pivot_row[c+1] always agree up
            // to sign there, so naively reusing it double-counts).
            let signed_factor = if pivot_sign < 0 { factor.negate() } else { factor };
            for j in 0..cols {
                if j == c + 1 {
                    continue;
                }
                let cur = self.mat.get(row_idx, j).clone();
                let updated = &(&cur * &pivot_abs) - &(&signed_factor * &pivot_row[j]);
                self.mat.set(row_idx, j, updated);
            }
            let xl_coeff = &signed_factor * &old_denom;
            self.mat.set(row_idx, c + 1, xl_coeff);
        }

        for j in 0..cols {
            if j == c + 1 {
                let xl_coeff = &signed_denom * &old_denom;
                self.mat.set(r, j, xl_coeff);
            } else {
                let v = &signed_denom.negate() * &pivot_row[j];
                self.mat.set(r, j, v);
            }
        }

        self.denom = new_denom;
        self.normalize();

        let leaving_var = self.row_var[r];
        let entering_var = self.col_var[c];
        self.row_var[r] = entering_var;
        self.col_var[c] = leaving_var;
        self.var_status[entering_var] = VarStatus::Basic(r);
        self.var_status[leaving_var] = VarStatus::NonBasic(c);
    }

    /// Divide every entry (including `denom`) by their common gcd, to
    /// keep coefficients from growing without bound across many pivots.
    fn normalize(&mut self) {
        let mut g = self.denom.clone();
        for r in 0..self.n_rows() {
            for v in self.mat.row(r) {
                g = g.gcd(v);
            }
        }
        if g.is_zero() || g == BigInt::one() {
            return;
        }
        self.denom = self.denom.divexact(&g);
        for r in 0..self.n_rows() {
            for v in self.mat.row_mut(r) {
                *v = v.divexact(&g);
            }
        }
    }

    /// Run the primal simplex to rational feasibility using Bland's
    /// rule (lowest-indexed infeasible row, lowest-indexed improving
    /// column), bumping `ctx`'s pivot counter for every pivot performed.
    /// Returns `false` (and marks the tableau empty) if no feasible
    /// vertex exists.
    pub fn restore_feasibility(&mut self, ctx: &mut Context) -> bool {
        loop {
            if ctx.check_abort() {
                return false;
            }
            let Some(r) = self.first_infeasible_row() else {
                return true;
            };
            let Some(c) = self.find_entering_column(r) else {
                self.mark_empty();
                return false;
            };
            self.pivot(r, c);
            ctx.stats_mut().pivot_count += 1;
        }
    }

    /// Among non-basic columns with a positive entry in row `r` (a
    /// candidate to raise the row's sample towards 0 as that variable
    /// increases from its lower bound of 0), pick the lowest-indexed
    /// variable, Bland's-rule style.
    fn find_entering_column(&self, r: usize) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None; // (var, col)
        for c in 0..self.n_var {
            if self.mat.get(r, c + 1).is_positive() {
                let var = self.col_var[c];
                best = match best {
                    None => Some((var, c)),
                    Some((bv, _)) if var < bv => Some((var, c)),
                    some => some,
                };
            }
        }
        best.map(|(_, c)| c)
    }

    /// Current status of variable `v`.
    #[must_use]
    pub fn var_status(&self, v: usize) -> VarStatus {
        self.var_status[v]
    }

    /// The variable currently occupying non-basic column `c`.
    #[must_use]
    pub fn col_var_unchecked(&self, c: usize) -> usize {
        self.col_var[c]
    }

    /// The variable currently represented by basic row `r`.
    #[must_use]
    pub fn row_var_unchecked(&self, r: usize) -> usize {
        self.row_var[r]
    }

    /// The kind of row `r` (inequality slack vs. equality).
    #[must_use]
    pub fn row_kind_unchecked(&self, r: usize) -> RowKind {
        self.row_kind[r]
    }

    /// Row `r`'s coefficient on non-basic column `c` (column `0` is the
    /// constant column, so this reads `mat[r][c + 1]`).
    #[must_use]
    pub fn coeff(&self, r: usize, c: usize) -> &BigInt {
        self.mat.get(r, c + 1)
    }

    /// Append a fresh, all-zero non-basic column for a newly introduced
    /// variable, returning its column index.
    pub fn add_col(&mut self) -> usize {
        let new_var = self.var_status.len();
        let mut new_mat = Mat::zero(self.n_rows(), self.mat.n_cols() + 1);
        for r in 0..self.n_rows() {
            for j in 0..self.mat.n_cols() {
                new_mat.set(r, j, self.mat.get(r, j).clone());
            }
        }
        self.mat = new_mat;
        self.n_var += 1;
        self.col_var.push(new_var);
        self.var_status.push(VarStatus::NonBasic(self.n_var - 1));
        self.n_var - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bi(v: i64) -> BigInt {
        BigInt::from_i64(v)
    }

    #[test]
    fn feasible_system_reports_feasible_after_restore() {
        // x >= -3, x <= 5  (as x >= -3 and -x + 5 >= 0), one free non-basic var x.
        let mut t = Tableau::new(1);
        t.add_row(RowKind::Inequality, 1, vec![bi(3), bi(1)]);
        t.add_row(RowKind::Inequality, 2, vec![bi(5), bi(-1)]);
        let mut ctx = Context::new();
        assert!(t.restore_feasibility(&mut ctx));
        assert!(t.is_feasible());
    }

    #[test]
    fn infeasible_system_is_marked_empty() {
        // x >= 1 and -x - 1 >= 0 (x <= -1): no feasible x.
        let mut t = Tableau::new(1);
        t.add_row(RowKind::Inequality, 1, vec![bi(-1), bi(1)]);
        t.add_row(RowKind::Inequality, 2, vec![bi(-1), bi(-1)]);
        let mut ctx = Context::new();
        assert!(!t.restore_feasibility(&mut ctx));
        assert!(t.is_marked_empty());
    }

    #[test]
    fn lower_bound_on_a_single_variable_requires_a_real_pivot() {
        // x - 5 >= 0, i.e. x >= 5. At the origin (x=0) the row's sample is
        // -5 (infeasible), and the row's only coefficient is +1: a pivot
        // that raises x from 0 to 5 is required to reach feasibility.
        let mut t = Tableau::new(1);
        t.add_row(RowKind::Inequality, 1, vec![bi(-5), bi(1)]);
        let mut ctx = Context::new();
        assert!(t.restore_feasibility(&mut ctx), "x >= 5 is satisfiable at x = 5");
        assert!(t.is_feasible());
        assert!(!t.is_marked_empty());
    }

    #[test]
    fn pivot_updates_an_uninvolved_row_by_substitution() {
        // Row 0 (var 1): u = -2x, i.e. [const=0, coeff=-2] over non-basic x.
        // Row 1 (var 2): w = 3x, i.e. [const=0, coeff=3].
        // Pivoting row 0 into column 0 (bringing x into the basis in place
        // of u) must re-derive row 1 by substituting x = -u/2, giving
        // 2w = -3u, i.e. new_denom = 2, row 1 = [0, -3].
        let mut t = Tableau::new(1);
        t.add_row(RowKind::Equality, 1, vec![bi(0), bi(-2)]);
        t.add_row(RowKind::Equality, 2, vec![bi(0), bi(3)]);
        t.pivot(0, 0);
        assert_eq!(*t.denom(), bi(2));
        assert_eq!(*t.sample_numerator(1), bi(0));
        assert_eq!(*t.coeff(1, 0), bi(-3));
    }

    #[test]
    fn pivot_updates_its_own_row_by_solving_for_the_entering_variable() {
        // Row 0 (var 1): u = -1 - x, i.e. [const=-1, coeff=-1]. Pivoting
        // x into the basis in place of u means solving for x: x = -1 - u,
        // so the post-pivot row (now representing x) is [-1, -1].
        let mut t = Tableau::new(1);
        t.add_row(RowKind::Equality, 1, vec![bi(-1), bi(-1)]);
        t.pivot(0, 0);
        assert_eq!(*t.denom(), bi(1));
        assert_eq!(*t.sample_numerator(0), bi(-1));
        assert_eq!(*t.coeff(0, 0), bi(-1));
    }
}
