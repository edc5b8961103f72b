//! Transitive closure and power of relations.

use presburger_bigint::BigInt;

use crate::basic_map::BasicMap;
use crate::ctx::Context;
use crate::map::Map;

/// The maximum number of `R ∪ R∘R∘...` unrolling rounds attempted
/// before giving up and returning an inexact over-approximation. The
/// closed-form translation case below needs none of this; it exists
/// for the general fixpoint fallback.
const MAX_UNROLL_ROUNDS: usize = 32;

/// `power(R)`: `R⁺ = ⋃_{k>=1} R^k`. When every disjunct of `R` is a
/// single affine translation `x -> x + delta` over a shared domain, the
/// closed form `{x -> x + k*delta : k >= 1, x in D, x + k*delta in
/// range(R)}` is exact; otherwise this falls back to
/// [`transitive_closure`].
#[must_use]
pub fn power(r: &Map, ctx: &mut Context) -> (Map, bool) {
    if let Some((translation, exact)) = as_single_translation(r) {
        return (translation, exact);
    }
    transitive_closure(r, ctx)
}

/// A relation is a "single translation" when it has exactly one
/// disjunct whose equalities pin every output dimension to `input +
/// constant` (no output-to-output or output-to-parameter coupling
/// beyond that shift).
fn as_single_translation(r: &Map) -> Option<(Map, bool)> {
    if r.n_basic_map() != 1 {
        return None;
    }
    let bmap = &r.basic_maps()[0];
    let space = bmap.space();
    if space.n_in() != space.n_out() || space.n_in() == 0 {
        return None;
    }
    let ls = bmap.local_space();
    let n_in = space.n_in();
    let mut delta = vec![BigInt::zero(); n_in];
    let mut pinned = vec![false; n_in];
    for row in bmap.eq_matrix().rows_iter() {
        // Looking for rows of the shape `out_i - in_i - delta_i == 0`.
        for i in 0..n_in {
            let out_coeff = &row[ls.out_offset() + i];
            let in_coeff = &row[ls.in_offset() + i];
            if out_coeff.is_zero() || in_coeff.is_zero() {
                continue;
            }
            let other_nonzero = row
                .iter()
                .enumerate()
                .any(|(j, v)| j != ls.out_offset() + i && j != ls.in_offset() + i && j != 0 && !v.is_zero());
            if other_nonzero {
                continue;
            }
            if *out_coeff == BigInt::one() && *in_coeff == BigInt::minus_one() {
                delta[i] = row[0].negate();
                pinned[i] = true;
            } else if *out_coeff == BigInt::minus_one() && *in_coeff == BigInt::one() {
                delta[i] = row[0].clone();
                pinned[i] = true;
            }
        }
    }
    if !pinned.iter().all(|&p| p) {
        return None;
    }

    // {x -> x + k*delta : k >= 1}: k is a genuine fresh existential
    // (not a div in the rounding sense, but the same "unknown"
    // representation local_space already carries for not-yet-resolved
    // existentials), constrained only by k >= 1; `out_i - in_i -
    // delta_i * k == 0` stays linear since `delta_i` is a known
    // constant.
    let mut closed = BasicMap::universe(space.clone());
    let k_var = closed.add_unknown_div();
    let k_column = 1 + k_var; // `LocalSpace` rows are `[const, ...var_cols]`.
    for (i, d) in delta.iter().enumerate() {
        let mut row = vec![BigInt::zero(); closed.local_space().constraint_len()];
        row[closed.local_space().out_offset() + i] = BigInt::one();
        row[closed.local_space().in_offset() + i] = BigInt::minus_one();
        row[k_column] = d.negate();
        closed.add_equality(row);
    }
    let mut k_ge_one = vec![BigInt::zero(); closed.local_space().constraint_len()];
    k_ge_one[k_column] = BigInt::one();
    k_ge_one[0] = BigInt::minus_one();
    closed.add_inequality(k_ge_one);
    Some((Map::from_basic_map(space.clone(), closed), true))
}

/// General transitive closure: iterate `R, R ∪ R∘R, ...` until a
/// fixpoint (detected by the union stopping growth after `coalesce`) or
/// until `MAX_UNROLL_ROUNDS` is reached, at which point the current
/// over-approximation is returned with `exact = false`.
#[must_use]
pub fn transitive_closure(r: &Map, ctx: &mut Context) -> (Map, bool) {
    let mut acc = r.clone();
    for _ in 0..MAX_UNROLL_ROUNDS {
        if ctx.check_abort() {
            return (acc, false);
        }
        let composed = compose(&acc, r);
        let next = acc.union(&composed);
        let mut next = next;
        next.coalesce(ctx);
        if next.n_basic_map() == acc.n_basic_map() {
            return (next, true);
        }
        acc = next;
    }
    (acc, false)
}

/// Relational composition `(a ; b) = { x -> z : exists y, x -> y in a,
/// y -> z in b }`, built by intersecting `a`'s range tuple with `b`'s
/// domain tuple (requires matching spaces) and existentially
/// eliminating the shared intermediate dimensions.
#[must_use]
pub fn compose(a: &Map, b: &Map) -> Map {
    let out_space = crate::space::Space::map(a.space().n_param(), a.space().n_in(), b.space().n_out());
    let mut out = Map::empty(out_space.clone());
    for da in a.basic_maps() {
        for db in b.basic_maps() {
            if let Some(composed) = compose_basic(da, db, &out_space) {
                out.add_basic_map(composed);
            }
        }
    }
    out
}

fn compose_basic(a: &BasicMap, b: &BasicMap, out_space: &crate::space::Space) -> Option<BasicMap> {
    let n_param = out_space.n_param();
    let n_in = out_space.n_in();
    let n_mid = a.space().n_out();
    let n_out = out_space.n_out();
    if n_mid != b.space().n_in() {
        return None;
    }

    // Joint space: params, a's in, shared mid, b's out.
    let joint_space = crate::space::Space::map(n_param, n_in + n_mid, n_out);
    let mut joint = BasicMap::universe(joint_space);
    let jls = joint.local_space().clone();
    let width = jls.constraint_len();

    let embed_a = |row: &[BigInt]| -> Vec<BigInt> {
        // a's columns: [const, params, in(n_in), out(n_mid)] -> joint [const, params, in(n_in), mid(n_mid), out(n_out) zeros]
        let mut out = vec![BigInt::zero(); width];
        out[0] = row[0].clone();
        out[1..1 + n_param].clone_from_slice(&row[1..1 + n_param]);
        out[1 + n_param..1 + n_param + n_in + n_mid].clone_from_slice(&row[1 + n_param..1 + n_param + n_in + n_mid]);
        out
    };
    let embed_b = |row: &[BigInt]| -> Vec<BigInt> {
        // b's columns: [const, params, in(n_mid), out(n_out)] -> joint [const, params, mid(n_mid) slot, out(n_out)]
        let mut out = vec![BigInt::zero(); width];
        out[0] = row[0].clone();
        out[1..1 + n_param].clone_from_slice(&row[1..1 + n_param]);
        let mid_src = &row[1 + n_param..1 + n_param + n_mid];
        out[1 + n_param + n_in..1 + n_param + n_in + n_mid].clone_from_slice(mid_src);
        let out_src = &row[1 + n_param + n_mid..];
        out[1 + n_param + n_in + n_mid..].clone_from_slice(out_src);
        out
    };

    for row in a.eq_matrix().rows_iter() {
        joint.add_equality(embed_a(row));
    }
    for row in a.ineq_matrix().rows_iter() {
        joint.add_inequality(embed_a(row));
    }
    for row in b.eq_matrix().rows_iter() {
        joint.add_equality(embed_b(row));
    }
    for row in b.ineq_matrix().rows_iter() {
        joint.add_inequality(embed_b(row));
    }

    joint.project_out(n_param + n_in, n_mid);
    debug_assert_eq!(joint.space(), out_space);
    Some(joint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    fn bi(v: i64) -> BigInt {
        BigInt::from_i64(v)
    }

    #[test]
    fn single_translation_is_recognized() {
        let mut bmap = BasicMap::universe(Space::map(0, 1, 1));
        // out - in - 1 == 0
        bmap.add_equality(vec![bi(-1), bi(-1), bi(1)]);
        let r = Map::from_basic_map(Space::map(0, 1, 1), bmap);
        let (_closure, exact) = power(&r, &mut Context::new());
        assert!(exact);
    }
}
