//! End-to-end scenarios that exercise more than one module together,
//! the way a user of this crate actually would: build some `BasicMap`s,
//! run an analysis over them, and check the shape of the result.

use presburger::{BasicMap, Context, LevelBefore, Map, Space};
use presburger_bigint::BigInt;

fn bi(v: i64) -> BigInt {
    BigInt::from_i64(v)
}

#[test]
fn coalesce_merges_an_adjacent_cut_into_the_universe() {
    // { [i] : 0 <= i <= 10 } union { [i] : -1 <= i <= -1 or i <= -1, i >= 11 }
    // i.e. two half-planes split at the same cut recombine into one.
    let mut low = BasicMap::universe(Space::set(0, 1));
    low.add_inequality(vec![bi(0), bi(1)]); // i >= 0
    let mut high = BasicMap::universe(Space::set(0, 1));
    high.add_inequality(vec![bi(-1), bi(-1)]); // -i - 1 >= 0, i.e. i <= -1

    let mut map = Map::empty(Space::set(0, 1));
    map.add_basic_map(low);
    map.add_basic_map(high);
    assert_eq!(map.n_basic_map(), 2);

    let mut ctx = Context::new();
    map.coalesce(&mut ctx);
    assert_eq!(map.n_basic_map(), 1, "complementary cut should collapse to the universe");
    assert_eq!(map.basic_maps()[0].n_ineq(), 0);
}

#[test]
fn coalesce_drops_a_disjunct_that_is_a_subset_of_another() {
    // { [i] : 0 <= i <= 10 } union { [i] : 2 <= i <= 5 }, the latter redundant.
    let mut wide = BasicMap::universe(Space::set(0, 1));
    wide.add_inequality(vec![bi(0), bi(1)]);
    wide.add_inequality(vec![bi(10), bi(-1)]);
    let mut narrow = BasicMap::universe(Space::set(0, 1));
    narrow.add_inequality(vec![bi(-2), bi(1)]);
    narrow.add_inequality(vec![bi(5), bi(-1)]);

    let mut map = Map::empty(Space::set(0, 1));
    map.add_basic_map(wide);
    map.add_basic_map(narrow);

    let mut ctx = Context::new();
    map.coalesce(&mut ctx);
    assert_eq!(map.n_basic_map(), 1, "the narrower disjunct is wholly contained in the wider one");
}

#[test]
fn power_of_a_unit_translation_is_a_closed_form_shift() {
    // r: [i] -> [i + 1]. r^k should be recognized as a single closed-form
    // translation rather than unrolled, since its exponent never shows up
    // in the result directly (power returns the relation for unbounded k).
    let mut step = BasicMap::universe(Space::map(0, 1, 1));
    step.add_equality(vec![bi(1), bi(-1), bi(1)]); // out - in - 1 == 0

    let r = Map::from_basic_map(Space::map(0, 1, 1), step);
    let mut ctx = Context::new();
    let (closure, exact) = presburger::power(&r, &mut ctx);
    assert!(exact, "a single translation's power should be computed exactly");
    assert!(!closure.basic_maps().is_empty());
}

#[test]
fn transitive_closure_of_a_translation_is_the_reachability_order() {
    let mut step = BasicMap::universe(Space::map(0, 1, 1));
    step.add_equality(vec![bi(1), bi(-1), bi(1)]); // out == in + 1

    let r = Map::from_basic_map(Space::map(0, 1, 1), step);
    let mut ctx = Context::new();
    let (plus, exact) = presburger::transitive_closure(&r, &mut ctx);
    assert!(exact);

    // The closure should allow out >= in + 1 (e.g. in=0, out=3 satisfiable)
    // but reject out == in (no disjunct accepts the identity).
    let mut probe = BasicMap::universe(Space::map(0, 1, 1));
    probe.add_equality(vec![bi(0), bi(0), bi(1)]); // out - in == 0
    for bmap in plus.basic_maps() {
        let mut combined = bmap.intersect(&probe);
        assert!(combined.is_empty(&mut ctx), "the identity pair should not be in the strict closure");
    }
}

struct AtLevel(u32);
impl LevelBefore for AtLevel {
    fn level_before(&self, _a: &Space, _b: &Space) -> u32 {
        self.0
    }
}

#[test]
fn flow_attributes_an_identity_sink_to_an_identity_source() {
    // sink S[i] -> M[i], source T[i] -> M[i]: every read at iteration i is
    // covered by the write at the same i, so nothing is left unattributed.
    let sink = Map::universe(Space::map(0, 1, 1));
    let source = Map::universe(Space::map(0, 1, 1));

    let mut ctx = Context::new();
    let result = presburger::compute_flow(&sink, &[source], &AtLevel(1), 1, &mut ctx);
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].source_index, 0);
}

#[test]
fn flow_reports_no_source_for_an_untouched_location() {
    // sink reads M[i] for all i; source only ever writes M[0]. Everything
    // but iteration 0 has no covering write.
    let sink = Map::universe(Space::map(0, 1, 1));
    let mut source_bmap = BasicMap::universe(Space::map(0, 1, 1));
    source_bmap.add_equality(vec![bi(0), bi(0), bi(1)]); // out == 0
    let source = Map::from_basic_map(Space::map(0, 1, 1), source_bmap);

    let mut ctx = Context::new();
    let result = presburger::compute_flow(&sink, &[source], &AtLevel(1), 1, &mut ctx);
    assert!(!result.no_source.basic_maps().is_empty());
}

#[test]
fn format_round_trips_a_parametric_map_through_text_and_back() {
    use presburger::format::{OutputFormat, parse_map, print_map};

    let mut ctx = Context::new();
    let src = "[n] -> { [i] -> [j] : j = i + 1 and 0 <= i and i <= n }";
    let parsed = parse_map(src, &mut ctx).expect("should parse");
    let printed = print_map(&parsed, &ctx, OutputFormat::Isl).expect("should print");
    let reparsed = parse_map(&printed, &mut ctx).expect("re-parse should succeed");

    assert_eq!(reparsed.space().n_param(), parsed.space().n_param());
    assert_eq!(reparsed.space().n_in(), parsed.space().n_in());
    assert_eq!(reparsed.space().n_out(), parsed.space().n_out());
    assert_eq!(reparsed.n_basic_map(), parsed.n_basic_map());
}

#[test]
fn sample_of_a_nonempty_basic_map_satisfies_its_own_constraints() {
    // { [i, j] : 0 <= i <= 5 and j == 2*i }
    let mut bmap = BasicMap::universe(Space::set(0, 2));
    bmap.add_inequality(vec![bi(0), bi(1), bi(0)]); // i >= 0
    bmap.add_inequality(vec![bi(5), bi(-1), bi(0)]); // 5 - i >= 0
    bmap.add_equality(vec![bi(0), bi(2), bi(-1)]); // 2i - j == 0

    let mut ctx = Context::new();
    let point = bmap.sample(&mut ctx).expect("a satisfying point should exist");
    assert_eq!(point.len(), 2);
    let i = &point[0];
    let j = &point[1];
    assert!(!i.is_negative());
    assert_eq!(j, &(i * &bi(2)));
}
