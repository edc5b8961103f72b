//! Coalescing: merging adjacent convex disjuncts of a [`Map`] whose
//! union is itself convex.
//!
//! Every pattern check here is phrased as a tableau emptiness query
//! over a candidate `BasicMap`. Four patterns are implemented directly:
//!
//! - **equal**: `a` and `b` denote the same set (`a ⊆ b` and `b ⊆ a`).
//! - **subset**: `a ⊆ b` (or `b ⊆ a`), so the smaller disjunct is
//!   redundant.
//! - **adjacent-cut**: `a` and `b` agree on every constraint except one
//!   pair of complementary, unit-gap inequalities (`c >= 0` vs.
//!   `-c - 1 >= 0`), so together they cover that cut's full integer
//!   range and the constraint can simply be dropped.
//! - **shared-facet**: `a` lies entirely in `{h >= 0}`, `b` entirely in
//!   `{h <= 0}` for one of `a`'s own rows `h`, and the two disjuncts
//!   agree exactly on the shared boundary `h = 0`. Unlike adjacent-cut,
//!   the remaining rows need not match textually: the merge keeps
//!   whichever of `a`'s and `b`'s other rows hold throughout *both*
//!   disjuncts, so two boxes that overlap on one facet (rather than
//!   just differing by a unit gap) still collapse to one.
//!
//! The more elaborate **extension** (partial multi-constraint
//! relaxation) and **wrapping** (convex-hull-based merge of disjuncts
//! that are not unions of half-space complements) patterns described in
//! the reference algorithm are not implemented; see `DESIGN.md`. Their
//! absence only costs extra disjuncts in the output, never
//! correctness — a `Map` that fails to coalesce fully still denotes the
//! same set.

use presburger_bigint::BigInt;

use crate::basic_map::BasicMap;
use crate::ctx::Context;
use crate::map::Map;

/// Run coalescing to a fixed point: repeatedly scan all disjunct pairs,
/// replacing the first mergeable pair found, until a full pass makes no
/// merge.
pub fn coalesce(map: &mut Map, ctx: &mut Context) {
    loop {
        if ctx.check_abort() {
            return;
        }
        let basic_maps = map.basic_maps().to_vec();
        let n = basic_maps.len();
        let mut merged = None;
        'search: for i in 0..n {
            for j in (i + 1)..n {
                if let Some(m) = try_merge(&basic_maps[i], &basic_maps[j], ctx) {
                    merged = Some((i, j, m));
                    break 'search;
                }
            }
        }
        let Some((i, j, m)) = merged else {
            return;
        };
        let mut next = Vec::with_capacity(n - 1);
        for (idx, bmap) in basic_maps.into_iter().enumerate() {
            if idx != i && idx != j {
                next.push(bmap);
            }
        }
        next.push(m);
        map.set_basic_maps(next);
        ctx.stats_mut().coalesce_merge_count += 1;
    }
}

/// Try every supported pattern for the pair `(a, b)`, returning the
/// merged `BasicMap` on success.
fn try_merge(a: &BasicMap, b: &BasicMap, ctx: &mut Context) -> Option<BasicMap> {
    if is_subset(b, a, ctx) {
        return Some(a.clone());
    }
    if is_subset(a, b, ctx) {
        return Some(b.clone());
    }
    adjacent_cut(a, b, ctx)
        .or_else(|| shared_facet_cut(a, b, ctx))
        .or_else(|| shared_facet_cut(b, a, ctx))
}

/// `a ⊆ b` iff, for every constraint row of `b`, `a` together with that
/// row's *strict complement* is empty (no point of `a` violates any
/// constraint of `b`).
fn is_subset(a: &BasicMap, b: &BasicMap, ctx: &mut Context) -> bool {
    if a.space() != b.space() {
        return false;
    }
    for row in b.eq_matrix().rows_iter() {
        // `row == 0` is violated by `row >= 1` or `row <= -1`; check both halves.
        if !complement_intersection_empty(a, row, true, ctx) || !complement_intersection_empty(a, row, false, ctx) {
            return false;
        }
    }
    for row in b.ineq_matrix().rows_iter() {
        // `row >= 0` is violated by `-row - 1 >= 0` (i.e. `row <= -1`).
        if !complement_intersection_empty(a, row, false, ctx) {
            return false;
        }
    }
    true
}

/// Build `a ∩ {complement of `row`}` and check it is empty.
/// `strict_positive == true` tests the `row >= 1` half of an equality's
/// negation; `false` tests `-row - 1 >= 0` (`row <= -1`), which is also
/// exactly an inequality's negation.
fn complement_intersection_empty(a: &BasicMap, row: &[BigInt], strict_positive: bool, ctx: &mut Context) -> bool {
    let mut candidate = a.clone();
    let mut complement = row.to_vec();
    if strict_positive {
        complement[0] = &complement[0] - &BigInt::one();
    } else {
        for v in &mut complement {
            *v = v.negate();
        }
        complement[0] = &complement[0] - &BigInt::one();
    }
    candidate.add_inequality(complement);
    candidate.is_empty(ctx)
}

/// Detect the "adjacent-cut" pattern: `a` and `b` share every equality
/// and every inequality except one complementary pair `(c >= 0, -c - 1
/// >= 0)`, which together partition all integers and can be dropped.
fn adjacent_cut(a: &BasicMap, b: &BasicMap, _ctx: &mut Context) -> Option<BasicMap> {
    if a.space() != b.space() || a.n_eq() != b.n_eq() || a.n_ineq() != b.n_ineq() {
        return None;
    }
    if !rows_match_as_sets(a.eq_matrix().rows_iter().collect::<Vec<_>>(), b.eq_matrix().rows_iter().collect::<Vec<_>>()) {
        return None;
    }

    let a_rows: Vec<&[BigInt]> = a.ineq_matrix().rows_iter().collect::<Vec<_>>();
    let b_rows: Vec<&[BigInt]> = b.ineq_matrix().rows_iter().collect::<Vec<_>>();
    for (ai, a_row) in a_rows.iter().enumerate() {
        for (bi, b_row) in b_rows.iter().enumerate() {
            if is_complementary_cut(a_row, b_row) {
                let a_rest: Vec<&[BigInt]> = a_rows.iter().enumerate().filter(|&(k, _)| k != ai).map(|(_, r)| *r).collect();
                let b_rest: Vec<&[BigInt]> = b_rows.iter().enumerate().filter(|&(k, _)| k != bi).map(|(_, r)| *r).collect();
                if rows_match_as_sets(a_rest.clone(), b_rest.clone()) {
                    let mut merged = BasicMap::universe(a.space().clone());
                    for row in a.eq_matrix().rows_iter().collect::<Vec<_>>() {
                        merged.add_equality(row.to_vec());
                    }
                    for row in a_rest {
                        merged.add_inequality(row.to_vec());
                    }
                    return Some(merged);
                }
            }
        }
    }
    None
}

/// Detect the shared-facet pattern: some inequality row `h` of `a`
/// splits space into `a`'s own `{h >= 0}` half and `b`'s `{h <= 0}`
/// half (checked as an emptiness query, not a literal matching row in
/// `b`), with the two disjuncts agreeing exactly on the boundary
/// `h = 0`. The merged row set keeps, from each side's other rows,
/// only the ones that also hold throughout the other disjunct — a row
/// true only on its own side is dropped, one true on both sides
/// survives, so two boxes overlapping on one facet combine into their
/// outer hull instead of just cancelling a unit gap.
fn shared_facet_cut(a: &BasicMap, b: &BasicMap, ctx: &mut Context) -> Option<BasicMap> {
    if a.space() != b.space() {
        return None;
    }
    if !rows_match_as_sets(a.eq_matrix().rows_iter().collect::<Vec<_>>(), b.eq_matrix().rows_iter().collect::<Vec<_>>()) {
        return None;
    }

    let a_rows: Vec<&[BigInt]> = a.ineq_matrix().rows_iter().collect();
    for (hi, &h) in a_rows.iter().enumerate() {
        let neg_h: Vec<BigInt> = h.iter().map(BigInt::negate).collect();
        if !complement_intersection_empty(b, &neg_h, false, ctx) {
            continue; // b is not entirely within {h <= 0}
        }
        if !cross_sections_agree(a, h, b, ctx) {
            continue;
        }

        let mut kept: Vec<Vec<BigInt>> = Vec::new();
        for (i, &row) in a_rows.iter().enumerate() {
            if i != hi && complement_intersection_empty(b, row, false, ctx) {
                push_unique(&mut kept, row.to_vec());
            }
        }
        for row in b.ineq_matrix().rows_iter() {
            if complement_intersection_empty(a, row, false, ctx) {
                push_unique(&mut kept, row.to_vec());
            }
        }

        let mut merged = BasicMap::universe(a.space().clone());
        for row in a.eq_matrix().rows_iter() {
            merged.add_equality(row.to_vec());
        }
        for row in kept {
            merged.add_inequality(row);
        }
        return Some(merged);
    }
    None
}

/// `a ∩ {h = 0} == b ∩ {h = 0}`, checked by pinning `h` as an equality
/// on both and testing mutual subset.
fn cross_sections_agree(a: &BasicMap, h: &[BigInt], b: &BasicMap, ctx: &mut Context) -> bool {
    let mut a_h0 = a.clone();
    a_h0.add_equality(h.to_vec());
    let mut b_h0 = b.clone();
    b_h0.add_equality(h.to_vec());
    is_subset(&a_h0, &b_h0, ctx) && is_subset(&b_h0, &a_h0, ctx)
}

fn push_unique(rows: &mut Vec<Vec<BigInt>>, row: Vec<BigInt>) {
    if !rows.iter().any(|r| *r == row) {
        rows.push(row);
    }
}

/// `true` if `a_row: c >= 0` and `b_row: -c - 1 >= 0` for the same
/// coefficient vector `c` — the unit-gap complementary cut.
fn is_complementary_cut(a_row: &[BigInt], b_row: &[BigInt]) -> bool {
    if a_row.len() != b_row.len() {
        return false;
    }
    a_row[1..].iter().zip(b_row[1..].iter()).all(|(x, y)| *x == y.negate())
        && b_row[0] == a_row[0].negate() - BigInt::one()
}

fn rows_match_as_sets(a: Vec<&[BigInt]>, b: Vec<&[BigInt]>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    'outer: for ra in &a {
        for (k, rb) in b.iter().enumerate() {
            if !used[k] && ra == rb {
                used[k] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    fn bi(v: i64) -> BigInt {
        BigInt::from_i64(v)
    }

    #[test]
    fn coalesces_a_complementary_cut_into_the_universe() {
        // a: x >= 0, b: x <= -1 (i.e. -x - 1 >= 0); together all of Z.
        let mut a = BasicMap::universe(Space::set(0, 1));
        a.add_inequality(vec![bi(0), bi(1)]);
        let mut b = BasicMap::universe(Space::set(0, 1));
        b.add_inequality(vec![bi(-1), bi(-1)]);

        let mut map = Map::empty(Space::set(0, 1));
        map.add_basic_map(a);
        map.add_basic_map(b);

        let mut ctx = Context::new();
        map.coalesce(&mut ctx);
        assert_eq!(map.n_basic_map(), 1);
        assert_eq!(map.basic_maps()[0].n_ineq(), 0);
    }

    #[test]
    fn coalesces_two_boxes_sharing_a_facet() {
        // a: 0<=x<=10, 0<=y<=10; b: 10<=x<=20, 0<=y<=10; overlapping on
        // the facet x=10, union is the single box 0<=x<=20, 0<=y<=10.
        let mut a = BasicMap::universe(Space::set(0, 2));
        a.add_inequality(vec![bi(0), bi(1), bi(0)]);
        a.add_inequality(vec![bi(10), bi(-1), bi(0)]);
        a.add_inequality(vec![bi(0), bi(0), bi(1)]);
        a.add_inequality(vec![bi(10), bi(0), bi(-1)]);

        let mut b = BasicMap::universe(Space::set(0, 2));
        b.add_inequality(vec![bi(-10), bi(1), bi(0)]);
        b.add_inequality(vec![bi(20), bi(-1), bi(0)]);
        b.add_inequality(vec![bi(0), bi(0), bi(1)]);
        b.add_inequality(vec![bi(10), bi(0), bi(-1)]);

        let mut map = Map::empty(Space::set(0, 2));
        map.add_basic_map(a);
        map.add_basic_map(b);

        let mut ctx = Context::new();
        map.coalesce(&mut ctx);
        assert_eq!(map.n_basic_map(), 1);
        assert_eq!(map.basic_maps()[0].n_ineq(), 4);
    }

    #[test]
    fn drops_a_redundant_subset_disjunct() {
        // a: 0 <= x <= 10, b: 2 <= x <= 5 (subset of a).
        let mut a = BasicMap::universe(Space::set(0, 1));
        a.add_inequality(vec![bi(0), bi(1)]);
        a.add_inequality(vec![bi(10), bi(-1)]);
        let mut b = BasicMap::universe(Space::set(0, 1));
        b.add_inequality(vec![bi(-2), bi(1)]);
        b.add_inequality(vec![bi(5), bi(-1)]);

        let mut map = Map::empty(Space::set(0, 1));
        map.add_basic_map(a);
        map.add_basic_map(b);

        let mut ctx = Context::new();
        map.coalesce(&mut ctx);
        assert_eq!(map.n_basic_map(), 1);
    }
}
