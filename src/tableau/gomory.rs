//! Gomory cuts: the rational-to-integer closing step of lexmin (spec.md
//! §4.4 "Integer lexmin").
//!
//! After a rational lexmin optimum is reached, any basic row whose
//! sample is non-integer induces a valid cut that excludes that
//! fractional vertex without excluding any integer point: if row `r`'s
//! equation is `x_r = (n + sum(a_j * x_j)) / d` with `x_j >= 0`, then
//! every integer point satisfies `frac(a_j/d) * x_j`, summed, `>=
//! frac(n/d)`. Adding that inequality and restoring feasibility
//! strictly cuts off the fractional vertex while preserving every
//! integer solution; iterating converges because each cut removes a
//! distinct vertex from a tableau with finitely many.

use presburger_bigint::BigInt;

use crate::ctx::Context;
use crate::tableau::{RowKind, Tableau};

/// `true` if row `r`'s sample value is an integer (its numerator is
/// divisible by the tableau's common denominator).
fn is_integer_row(tab: &Tableau, r: usize) -> bool {
    tab.sample_numerator(r).fdiv_r(tab.denom()).is_zero()
}

/// Find a basic row with a non-integer sample, lowest row-variable
/// index first (keeps the process deterministic).
fn first_fractional_row(tab: &Tableau) -> Option<usize> {
    let mut best: Option<usize> = None;
    for r in 0..tab.n_rows() {
        if !is_integer_row(tab, r) {
            best = match best {
                None => Some(r),
                Some(b) if tab.row_var_unchecked(r) < tab.row_var_unchecked(b) => Some(r),
                some => some,
            };
        }
    }
    best
}

/// Build and add a Gomory cut against row `r`'s fractional sample,
/// returning the new row's index. The cut row is
/// `frac(n/d) ... with coefficients frac(a_j/d)`, each term normalized
/// to lie in `[0, 1)` of the tableau's denominator before subtracting.
fn add_cut(tab: &mut Tableau, r: usize) -> usize {
    let d = tab.denom().clone();
    let mut row = vec![BigInt::zero(); 1 + tab.n_var()];
    row[0] = nonneg_frac(tab.sample_numerator(r), &d).negate();
    for c in 0..tab.n_var() {
        row[c + 1] = nonneg_frac(tab.coeff(r, c), &d);
    }
    let new_var = tab.n_var();
    tab.add_col();
    tab.add_row(RowKind::Inequality, new_var, row)
}

/// `v mod d`, normalized into `[0, d)` (floor remainder; always
/// non-negative since `d > 0`).
fn nonneg_frac(v: &BigInt, d: &BigInt) -> BigInt {
    v.fdiv_r(d)
}

/// Drive a rationally-feasible tableau to an integer-feasible one by
/// repeatedly cutting fractional vertices and re-minimizing. Returns
/// `false` (tableau marked empty) if the integer hull turns out to be
/// empty.
pub fn integer_close(tab: &mut Tableau, ctx: &mut Context) -> bool {
    loop {
        if ctx.check_abort() {
            return true;
        }
        let Some(r) = first_fractional_row(tab) else {
            return true;
        };
        add_cut(tab, r);
        ctx.stats_mut().gomory_cut_count += 1;
        if !tab.restore_feasibility(ctx) {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tableau::Tableau;

    #[test]
    fn integer_close_accepts_already_integer_tableau() {
        let mut tab = Tableau::new(1);
        tab.add_row(RowKind::Inequality, 1, vec![BigInt::from_i64(3), BigInt::from_i64(1)]);
        let mut ctx = Context::new();
        assert!(tab.restore_feasibility(&mut ctx));
        assert!(integer_close(&mut tab, &mut ctx));
    }
}
