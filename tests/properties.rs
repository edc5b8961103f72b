//! Randomized algebraic-law checks for spec.md §8 Testable Properties 1
//! (idempotence) and 2 (neutrality), run against small bounded interval
//! sets and translations via `quickcheck`, mirroring the way
//! `tests/integration.rs` pins a point and checks `is_empty` rather than
//! reaching for any private membership helper.
//!
//! `S - S == empty` is not covered here: the crate exposes no public
//! set-difference operator to build the left-hand side from (see
//! DESIGN.md).

use presburger::{BasicMap, Context, Map, Space};
use presburger_bigint::BigInt;
use quickcheck_macros::quickcheck;

fn bi(v: i64) -> BigInt {
    BigInt::from_i64(v)
}

/// Fold an arbitrary `i64` into a small range so generated bounds stay
/// cheap to solve and don't overflow the interval arithmetic below.
fn clamp(v: i64) -> i64 {
    v.rem_euclid(41) - 20
}

fn probe_range() -> std::ops::RangeInclusive<i64> {
    -30..=30
}

fn interval(a: i64, b: i64) -> BasicMap {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut bmap = BasicMap::universe(Space::set(0, 1));
    bmap.add_inequality(vec![bi(-lo), bi(1)]); // x - lo >= 0
    bmap.add_inequality(vec![bi(hi), bi(-1)]); // hi - x >= 0
    bmap
}

fn set_contains(bmap: &BasicMap, x: i64) -> bool {
    let mut probe = bmap.clone();
    probe.add_equality(vec![bi(-x), bi(1)]);
    let mut ctx = Context::new();
    !probe.is_empty(&mut ctx)
}

fn map_contains(map: &Map, x: i64) -> bool {
    map.basic_maps().iter().any(|b| set_contains(b, x))
}

#[quickcheck]
fn coalesce_is_idempotent(a_lo: i64, a_hi: i64, b_lo: i64, b_hi: i64) -> bool {
    let mut map = Map::empty(Space::set(0, 1));
    map.add_basic_map(interval(clamp(a_lo), clamp(a_hi)));
    map.add_basic_map(interval(clamp(b_lo), clamp(b_hi)));

    let mut ctx = Context::new();
    map.coalesce(&mut ctx);
    let once: Vec<bool> = probe_range().map(|x| map_contains(&map, x)).collect();
    map.coalesce(&mut ctx);
    let twice: Vec<bool> = probe_range().map(|x| map_contains(&map, x)).collect();
    once == twice
}

#[quickcheck]
fn detect_equalities_is_idempotent(v: i64) -> bool {
    // A single point is the cheapest case forcing the negation-pairing
    // path to actually promote something.
    let v = clamp(v);
    let mut bmap = interval(v, v);
    bmap.detect_equalities();
    let eq1: Vec<Vec<BigInt>> = bmap.eq_matrix().rows_iter().map(<[BigInt]>::to_vec).collect();
    let ineq1: Vec<Vec<BigInt>> = bmap.ineq_matrix().rows_iter().map(<[BigInt]>::to_vec).collect();
    bmap.detect_equalities();
    let eq2: Vec<Vec<BigInt>> = bmap.eq_matrix().rows_iter().map(<[BigInt]>::to_vec).collect();
    let ineq2: Vec<Vec<BigInt>> = bmap.ineq_matrix().rows_iter().map(<[BigInt]>::to_vec).collect();
    eq1 == eq2 && ineq1 == ineq2
}

#[quickcheck]
fn union_with_self_is_neutral(lo: i64, hi: i64) -> bool {
    let s = interval(clamp(lo), clamp(hi));
    let mut map = Map::empty(Space::set(0, 1));
    map.add_basic_map(s.clone());
    let mut only = Map::empty(Space::set(0, 1));
    only.add_basic_map(s.clone());

    let doubled = map.union(&only);
    probe_range().all(|x| map_contains(&doubled, x) == set_contains(&s, x))
}

#[quickcheck]
fn intersect_with_self_is_neutral(lo: i64, hi: i64) -> bool {
    let s = interval(clamp(lo), clamp(hi));
    let mut map = Map::empty(Space::set(0, 1));
    map.add_basic_map(s.clone());
    let mut only = Map::empty(Space::set(0, 1));
    only.add_basic_map(s.clone());

    let same = map.intersect(&only);
    probe_range().all(|x| map_contains(&same, x) == set_contains(&s, x))
}

fn pair_contains(map: &Map, i: i64, o: i64) -> bool {
    map.basic_maps().iter().any(|bmap| {
        let mut probe = bmap.clone();
        probe.add_equality(vec![bi(-i), bi(1), bi(0)]);
        probe.add_equality(vec![bi(-o), bi(0), bi(1)]);
        let mut ctx = Context::new();
        !probe.is_empty(&mut ctx)
    })
}

#[quickcheck]
fn compose_with_identity_is_neutral(k: i64) -> bool {
    // translation: { [i] -> [o] : o == i + k }
    let k = clamp(k);
    let mut step = BasicMap::universe(Space::map(0, 1, 1));
    step.add_equality(vec![bi(-k), bi(-1), bi(1)]); // -k - i + o == 0
    let r = Map::from_basic_map(Space::map(0, 1, 1), step);

    let mut id_bmap = BasicMap::universe(Space::map(0, 1, 1));
    id_bmap.add_equality(vec![bi(0), bi(-1), bi(1)]); // o - i == 0
    let id = Map::from_basic_map(Space::map(0, 1, 1), id_bmap);

    let composed = presburger::compose(&r, &id);
    (-15..=15).all(|i: i64| (-15..=15).all(|o: i64| pair_contains(&composed, i, o) == pair_contains(&r, i, o)))
}
