//! Parametric integer programming: lexmin where some columns are
//! *parameters* rather than variables (spec.md §4.4 "Parametric
//! variant").
//!
//! Parameters never get pivoted into the tableau as its own variables;
//! instead every *sign decision* the simplex would otherwise make on a
//! row with a parametric constant splits into two branches — the
//! parametric expression is `>= 0` on one branch and `<= -1` on the
//! other — each recorded as a new inequality in a separate *context*
//! polyhedron over the parameters alone. The main tableau only advances
//! down a branch while its context remains non-empty; the result is a
//! tree whose leaves pair a parameter-space condition with the
//! optimum's affine expression in the parameters, exactly the shape
//! [`crate::aff::PwAff`] is built from.

use presburger_bigint::BigInt;

use crate::ctx::Context;
use crate::tableau::{RowKind, Tableau, VarStatus};

/// One leaf of a solved PIP tree: the parameter-space region (as a list
/// of `>= 0` inequalities over `[1, params...]`) paired with the
/// optimal value's affine expression in the parameters, one row per
/// minimized variable.
#[derive(Debug, Clone)]
pub struct PipLeaf {
    pub context: Vec<Vec<BigInt>>,
    pub values: Vec<Vec<BigInt>>,
}

/// Solve parametric lexmin of `targets` (tableau variable indices, in
/// minimization order) subject to a tableau whose first `n_param`
/// non-basic columns are parameters (never entering the basis) and
/// whose remaining columns are ordinary variables.
///
/// Returns one leaf per region of parameter space with a distinct
/// optimum, collectively partitioning the context's feasible parameter
/// region (spec.md's "disjoint parameter partition").
pub fn lexmin_parametric(
    tab: &mut Tableau,
    ctx: &mut Context,
    n_param: usize,
    targets: &[usize],
    context_ineq: Vec<Vec<BigInt>>,
) -> Vec<PipLeaf> {
    if ctx.check_abort() {
        return Vec::new();
    }
    if !tab.restore_feasibility(ctx) {
        return Vec::new();
    }

    for &target in targets {
        if let Some(col) = ambiguous_pivot_column(tab, n_param, target) {
            let (pos_row, neg_row) = branch_rows(tab, n_param, target, col);
            let mut pos_ctx = context_ineq.clone();
            pos_ctx.push(pos_row);
            let mut neg_ctx = context_ineq.clone();
            neg_ctx.push(neg_row.iter().map(BigInt::negate).collect::<Vec<_>>());

            let mut pos_tab = tab.clone();
            let mut neg_tab = tab.clone();
            let mut leaves = lexmin_parametric(&mut pos_tab, ctx, n_param, targets, pos_ctx);
            leaves.extend(lexmin_parametric(&mut neg_tab, ctx, n_param, targets, neg_ctx));
            return leaves;
        }
        if !crate::tableau::lexmin::minimize_var(tab, ctx, target) {
            return Vec::new(); // unbounded: no finite PwAff piece
        }
        if !crate::tableau::gomory::integer_close(tab, ctx) {
            return Vec::new();
        }
    }

    vec![PipLeaf {
        context: context_ineq,
        values: targets.iter().map(|&t| extract_value(tab, n_param, t)).collect(),
    }]
}

/// A pivot decision is ambiguous when the row representing `target`
/// has a nonzero coefficient on a *parameter* column: the sign of that
/// coefficient's effect depends on parameter values we don't know yet,
/// so we must branch rather than pick a fixed pivot.
fn ambiguous_pivot_column(tab: &Tableau, n_param: usize, target: usize) -> Option<usize> {
    let VarStatus::Basic(r) = tab.var_status(target) else {
        return None;
    };
    (0..n_param).find(|&c| !tab.coeff(r, c).is_zero())
}

/// Build the two branch conditions (`expr >= 0` and `expr <= -1`) from
/// `target`'s row, restricted to the parameter columns plus the
/// constant term — the affine expression whose sign is undetermined.
fn branch_rows(tab: &Tableau, n_param: usize, target: usize, _col: usize) -> (Vec<BigInt>, Vec<BigInt>) {
    let VarStatus::Basic(r) = tab.var_status(target) else {
        unreachable!("ambiguous_pivot_column only returns Some for basic targets")
    };
    let mut row = vec![BigInt::zero(); 1 + n_param];
    row[0] = tab.sample_numerator(r).clone();
    for p in 0..n_param {
        row[p + 1] = tab.coeff(r, p).clone();
    }
    (row.clone(), row)
}

/// Read out `target`'s optimal value as an affine expression in the
/// parameters: `[constant, param_0, ..., param_{n_param-1}]`, valid once
/// no ambiguous pivot remains (every non-parameter column has been
/// driven to 0 or out of the row).
fn extract_value(tab: &Tableau, n_param: usize, target: usize) -> Vec<BigInt> {
    let mut out = vec![BigInt::zero(); 1 + n_param];
    match tab.var_status(target) {
        VarStatus::NonBasic(_) => out, // sits at 0, i.e. the all-zero affine expression
        VarStatus::Basic(r) => {
            out[0] = tab.sample_numerator(r).clone();
            for p in 0..n_param {
                out[p + 1] = tab.coeff(r, p).clone();
            }
            out
        }
    }
}
