//! Lexicographic minimization over a feasibility tableau (spec.md §4.4).
//!
//! Given a [`Tableau`] that has already been made rationally feasible,
//! `lexmin` drives each variable, in turn, down to its minimum value
//! consistent with the ones already fixed — the standard "lexicographic
//! simplex" extension of Bland's rule: the entering column is the one
//! that decreases the *lexicographically first* improvable row, with
//! ties on the improving column broken by lowest variable index so the
//! process terminates.

use presburger_bigint::BigInt;

use crate::ctx::Context;
use crate::tableau::{RowKind, Tableau, VarStatus};

/// Minimize variable `target` while keeping the tableau feasible,
/// driving it to the smallest value any feasible point allows. Returns
/// `false` if the tableau is unbounded below in `target` (callers that
/// only deal with bounded polyhedra should treat this as "infinite"
/// rather than an error).
pub fn minimize_var(tab: &mut Tableau, ctx: &mut Context, target: usize) -> bool {
    loop {
        if ctx.check_abort() {
            return true;
        }
        let VarStatus::Basic(r) = tab.var_status(target) else {
            // Non-basic variables sit at their lower bound (0), already minimal.
            return true;
        };
        let Some(c) = most_negative_reduced_cost_column(tab, r) else {
            return true;
        };
        let Some(leaving) = dual_ratio_test(tab, c) else {
            return false; // unbounded
        };
        tab.pivot(leaving, c);
        ctx.stats_mut().pivot_count += 1;
    }
}

/// Find a non-basic column whose coefficient in row `r` is negative
/// (increasing it would decrease `target`'s sample), Bland's-rule
/// tie-break on lowest variable index.
fn most_negative_reduced_cost_column(tab: &Tableau, r: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for c in 0..tab.n_var() {
        if tab_coeff(tab, r, c).is_negative() {
            let var = tab.col_var_unchecked(c);
            best = match best {
                None => Some((var, c)),
                Some((bv, _)) if var < bv => Some((var, c)),
                some => some,
            };
        }
    }
    best.map(|(_, c)| c)
}

fn tab_coeff(tab: &Tableau, r: usize, c: usize) -> &BigInt {
    tab.coeff(r, c)
}

/// Classic ratio test restricted to inequality rows: among rows whose
/// increasing `col` would drive their sample negative, find the one
/// that becomes infeasible soonest (minimal ratio), lowest row-variable
/// index breaking ties. Returns `None` if no row bounds the increase
/// (unbounded direction).
fn dual_ratio_test(tab: &Tableau, col: usize) -> Option<usize> {
    let mut best: Option<(usize, BigInt, BigInt)> = None; // (row, ratio_num, ratio_den) compared cross-multiplied
    for r in 0..tab.n_rows() {
        if tab.row_kind_unchecked(r) != RowKind::Inequality {
            continue;
        }
        let entry = tab_coeff(tab, r, col);
        if !entry.is_negative() {
            continue;
        }
        let sample = tab.sample_numerator(r).clone();
        let denom = entry.abs();
        best = match best {
            None => Some((r, sample, denom)),
            Some((br, bn, bd)) => {
                // compare sample/denom vs bn/bd without division: sample*bd vs bn*denom
                let lhs = &sample * &bd;
                let rhs = &bn * &denom;
                if lhs < rhs || (lhs == rhs && tab.row_var_unchecked(r) < tab.row_var_unchecked(br)) {
                    Some((r, sample, denom))
                } else {
                    Some((br, bn, bd))
                }
            }
        };
    }
    best.map(|(r, _, _)| r)
}
