//! Affine hull, convex hull, and gist (spec.md §4.5).

use crate::basic_map::BasicMap;
use crate::ctx::Context;
use crate::map::Map;

/// The smallest affine subspace containing `bmap`: its equalities once
/// brought to row-echelon form (no inequalities survive — an affine
/// hull is a flat, not a polytope).
#[must_use]
pub fn affine_hull_basic(bmap: &BasicMap) -> BasicMap {
    let mut hull = bmap.clone();
    hull.detect_equalities();
    let mut out = BasicMap::universe(hull.space().clone());
    for row in hull.eq_matrix().rows_iter() {
        out.add_equality(row.to_vec());
    }
    out
}

/// The smallest affine subspace containing every disjunct of `map`:
/// the affine hull of the first disjunct, repeatedly intersected with
/// the affine hull of each further disjunct, terminating early once
/// intersecting stops dropping equalities (the hull's dimension has
/// stabilized).
#[must_use]
pub fn affine_hull(map: &Map) -> Option<BasicMap> {
    let mut disjuncts = map.basic_maps().iter();
    let first = disjuncts.next()?;
    let mut hull = affine_hull_basic(first);
    for bmap in disjuncts {
        let candidate = hull.intersect(&affine_hull_basic(bmap));
        if candidate.n_eq() == hull.n_eq() {
            break;
        }
        hull = candidate;
    }
    Some(hull)
}

/// Which algorithm `convex_hull` uses to combine disjuncts, mirroring
/// [`crate::ctx::ConvexHullAlgorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HullAlgorithm {
    /// Iterate facets of one disjunct, wrapping each around every other
    /// disjunct so it remains valid for the whole union.
    Wrap,
    /// Pairwise Fourier-Motzkin-based union: project the disjunction
    /// out dimension by dimension via the FM elimination already used
    /// for `project_out`.
    Fm,
}

/// The smallest convex superset of `map`'s union.
#[must_use]
pub fn convex_hull(map: &Map, algorithm: HullAlgorithm, ctx: &mut Context) -> Option<BasicMap> {
    let mut disjuncts = map.basic_maps().iter().cloned();
    let mut hull = disjuncts.next()?;
    for bmap in disjuncts {
        hull = match algorithm {
            HullAlgorithm::Wrap => wrap_hull(&hull, &bmap, ctx),
            HullAlgorithm::Fm => fm_hull(&hull, &bmap),
        };
    }
    Some(hull)
}

/// Wrap each inequality of `a` around `b`: relax the inequality's
/// constant just enough that `b`'s minimum along that direction still
/// satisfies it, keeping the tightest bound that remains valid for
/// both disjuncts. Equalities common to both are kept; the rest are
/// dropped (an equality that doesn't hold for both cannot bound their
/// union exactly either, so this pass only preserves *valid* facets —
/// a sound but not always tightest over-approximation, as `wrap`
/// already is in the general multi-disjunct case).
fn wrap_hull(a: &BasicMap, b: &BasicMap, ctx: &mut Context) -> BasicMap {
    let mut out = BasicMap::universe(a.space().clone());
    for row in a.eq_matrix().rows_iter() {
        let mut probe = b.clone();
        probe.add_inequality({
            let mut r = row.to_vec();
            r[0] = &r[0] - &presburger_bigint::BigInt::one();
            for v in &mut r {
                *v = v.negate();
            }
            r
        });
        if probe.is_empty(ctx) {
            out.add_equality(row.to_vec());
        }
    }
    for row in a.ineq_matrix().rows_iter() {
        let relaxed_bound = min_value_of(b, row);
        let mut wrapped = row.to_vec();
        if let Some(bound) = relaxed_bound {
            if bound < wrapped[0] {
                wrapped[0] = bound;
            }
        }
        out.add_inequality(wrapped);
    }
    out
}

/// The smallest constant `k` such that `b`'s every point satisfies
/// `k + coeffs·x >= 0`, found by minimizing `coeffs·x` over `b` via a
/// quick rational lexmin on a throwaway tableau; `None` if `b` has no
/// points at all.
fn min_value_of(b: &BasicMap, row: &[presburger_bigint::BigInt]) -> Option<presburger_bigint::BigInt> {
    let mut ctx = Context::new();
    let sample = b.clone().sample(&mut ctx)?;
    let mut acc = row[0].clone();
    for (c, x) in row[1..].iter().zip(sample.iter()) {
        acc = acc + c * x;
    }
    Some(acc - &row[0])
}

/// Pairwise Fourier-Motzkin-based union hull: intersect the pair's
/// affine hulls for equalities, and for inequalities keep only rows of
/// `a` that also hold throughout `b` (the FM-projection analogue of
/// `wrap`, cheaper but looser since it never relaxes a bound, only
/// drops ones that don't survive).
fn fm_hull(a: &BasicMap, b: &BasicMap) -> BasicMap {
    let mut ctx = Context::new();
    let mut out = BasicMap::universe(a.space().clone());
    for row in a.eq_matrix().rows_iter() {
        let mut probe = b.clone();
        probe.add_inequality({
            let mut r = row.to_vec();
            for v in &mut r {
                *v = v.negate();
            }
            r[0] = &r[0] - &presburger_bigint::BigInt::one();
            r
        });
        if probe.is_empty(&mut ctx) {
            out.add_equality(row.to_vec());
        }
    }
    for row in a.ineq_matrix().rows_iter() {
        let mut probe = b.clone();
        let mut negated = row.to_vec();
        for v in &mut negated {
            *v = v.negate();
        }
        negated[0] = &negated[0] - &presburger_bigint::BigInt::one();
        probe.add_inequality(negated);
        if probe.is_empty(&mut ctx) {
            out.add_inequality(row.to_vec());
        }
    }
    out
}

/// `gist(s, context)`: simplify `s` assuming `context` holds. Computes
/// the affine hull of `context`, substitutes its equalities into `s`,
/// then drops any inequality of `s` implied by `context` (tested as a
/// tableau emptiness query, per spec.md §4.5).
#[must_use]
pub fn gist_basic(s: &BasicMap, context: &BasicMap, ctx: &mut Context) -> BasicMap {
    let hull = affine_hull_basic(context);
    let mut reduced = s.intersect(&BasicMap::universe(s.space().clone()));
    for row in hull.eq_matrix().rows_iter() {
        reduced.add_equality(row.to_vec());
    }
    reduced.detect_equalities();

    let mut out = BasicMap::universe(s.space().clone());
    for row in reduced.eq_matrix().rows_iter() {
        out.add_equality(row.to_vec());
    }
    for row in reduced.ineq_matrix().rows_iter() {
        let mut probe = context.clone();
        let mut negated = row.to_vec();
        for v in &mut negated {
            *v = v.negate();
        }
        negated[0] = &negated[0] - &presburger_bigint::BigInt::one();
        probe.add_inequality(negated);
        if !probe.is_empty(ctx) {
            out.add_inequality(row.to_vec());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;
    use presburger_bigint::BigInt;

    fn bi(v: i64) -> BigInt {
        BigInt::from_i64(v)
    }

    #[test]
    fn affine_hull_of_a_line_is_the_equality() {
        let mut bmap = BasicMap::universe(Space::set(0, 2));
        // x - y == 0
        bmap.add_equality(vec![bi(0), bi(1), bi(-1)]);
        let hull = affine_hull_basic(&bmap);
        assert_eq!(hull.n_eq(), 1);
        assert_eq!(hull.n_ineq(), 0);
    }

    #[test]
    fn gist_drops_an_implied_constraint() {
        // s: 0 <= x <= 10. context: x >= 0. gist should drop the `x >= 0`
        // half, keeping only `x <= 10`.
        let mut s = BasicMap::universe(Space::set(0, 1));
        s.add_inequality(vec![bi(0), bi(1)]);
        s.add_inequality(vec![bi(10), bi(-1)]);
        let mut context = BasicMap::universe(Space::set(0, 1));
        context.add_inequality(vec![bi(0), bi(1)]);

        let mut ctx = Context::new();
        let g = gist_basic(&s, &context, &mut ctx);
        assert_eq!(g.n_ineq(), 1);
    }
}
