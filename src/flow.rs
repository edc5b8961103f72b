//! Dependence flow analysis: last-writer source computation between a
//! sink access relation and a set of candidate source relations.
//!
//! Given a sink access relation and an ordered list of source access
//! relations (all `Iter -> Mem`), computes, for each sink iteration, the
//! last source iteration writing the same memory location before it.
//!
//! This implementation assumes the sink/source relations carry no
//! unresolved local divs (the common case for plain array-index access
//! relations); run `compute_divs` on a disjunct first if it has any.

use presburger_bigint::BigInt;

use crate::basic_map::BasicMap;
use crate::closure::compose;
use crate::ctx::Context;
use crate::map::Map;
use crate::space::Space;

/// A user-supplied partial order over iteration-space pairs: `0` if `a`
/// cannot precede `b` at the level in question, otherwise the (positive)
/// loop level at which `a` is known to precede `b`. Dependence analysis
/// walks levels from innermost (highest) to outermost (lowest),
/// resolving the *last* writer one level at a time.
pub trait LevelBefore {
    fn level_before(&self, a: &Space, b: &Space) -> u32;
}

/// One source's contribution to a sink's flow dependence: the relation
/// from that source's iterations to the sink iterations it feeds.
#[derive(Debug, Clone)]
pub struct SourceFlow {
    pub source_index: usize,
    pub relation: Map,
}

/// The complete result of a flow analysis: one `SourceFlow` per source
/// that feeds at least one sink iteration, plus the subset of sink
/// iterations with no preceding source at all.
#[derive(Debug, Clone)]
pub struct FlowResult {
    pub sources: Vec<SourceFlow>,
    pub no_source: Map,
}

/// Compute last-writer dependence flow for `sink` against `sources` (in
/// user priority order — ties among sources at the same level resolve in
/// favor of the source listed first), using `max_level` as the deepest
/// loop level to consider.
///
/// For each level from deepest to shallowest, and for each source in
/// priority order: find the edges from that source to the
/// still-unattributed sink iterations the level order proves precede
/// them, claim those sink iterations (removing them from "no source"
/// and from every lower-priority source's claim that the level order
/// says can still be overridden), and record the edges under that
/// source.
pub fn compute_flow(sink: &Map, sources: &[Map], levels: &dyn LevelBefore, max_level: u32, ctx: &mut Context) -> FlowResult {
    let sink_iter_space = Space::set(sink.space().n_param(), sink.space().n_in());
    let mut no_source = domain_of(sink);
    let mut claimed: Vec<Map> = sources
        .iter()
        .map(|s| Map::empty(Space::map(s.space().n_param(), s.space().n_in(), sink.space().n_in())))
        .collect();

    for level in (1..=max_level).rev() {
        if ctx.check_abort() {
            break;
        }
        for (j, source) in sources.iter().enumerate() {
            if levels.level_before(source.space(), sink.space()) < level {
                continue;
            }
            let same_mem = compose(source, &reverse(sink));
            let edges = compose(&same_mem, &identity_on(&no_source));
            if edges.n_basic_map() == 0 {
                continue;
            }
            let reached = range_of(&edges);
            no_source = set_minus(&no_source, &reached, ctx);
            claimed[j] = claimed[j].union(&edges);

            for (k, other_source) in sources.iter().enumerate().take(j) {
                if levels.level_before(other_source.space(), source.space()) >= level {
                    let kept_sinks = set_minus(&Map::universe(sink_iter_space.clone()), &reached, ctx);
                    claimed[k] = compose(&claimed[k], &identity_on(&kept_sinks));
                }
            }
        }
    }

    let result_sources = claimed
        .into_iter()
        .enumerate()
        .filter(|(_, m)| m.n_basic_map() > 0)
        .map(|(source_index, relation)| SourceFlow { source_index, relation })
        .collect();

    FlowResult { sources: result_sources, no_source }
}

/// Reverse a map's input/output tuples, disjunct by disjunct.
fn reverse(m: &Map) -> Map {
    let reversed_space = m.space().reversed();
    let n_param = reversed_space.n_param();
    let old_n_in = m.space().n_in();
    let old_n_out = m.space().n_out();
    let mut out = Map::empty(reversed_space.clone());
    for bmap in m.basic_maps() {
        let mut rev = BasicMap::universe(reversed_space.clone());
        for row in bmap.eq_matrix().rows_iter() {
            rev.add_equality(swap_in_out(row, n_param, old_n_in, old_n_out));
        }
        for row in bmap.ineq_matrix().rows_iter() {
            rev.add_inequality(swap_in_out(row, n_param, old_n_in, old_n_out));
        }
        out.add_basic_map(rev);
    }
    out
}

fn swap_in_out(row: &[BigInt], n_param: usize, old_n_in: usize, old_n_out: usize) -> Vec<BigInt> {
    let mut out = vec![BigInt::zero(); row.len()];
    out[0] = row[0].clone();
    out[1..1 + n_param].clone_from_slice(&row[1..1 + n_param]);
    let old_in_start = 1 + n_param;
    let old_out_start = old_in_start + old_n_in;
    out[old_in_start..old_in_start + old_n_out].clone_from_slice(&row[old_out_start..old_out_start + old_n_out]);
    out[old_in_start + old_n_out..].clone_from_slice(&row[old_in_start..old_in_start + old_n_in]);
    out
}

/// The identity map over `set`'s space, restricted to `set`: `{ x -> x :
/// x in set }`.
fn identity_on(set: &Map) -> Map {
    let n = set.space().n_out();
    let n_param = set.space().n_param();
    let map_space = Space::map(n_param, n, n);
    let mut out = Map::empty(map_space.clone());
    for bmap in set.basic_maps() {
        let mut id_bmap = BasicMap::universe(map_space.clone());
        let ls = id_bmap.local_space().clone();
        for i in 0..n {
            let mut row = vec![BigInt::zero(); ls.constraint_len()];
            row[ls.in_offset() + i] = BigInt::one();
            row[ls.out_offset() + i] = BigInt::minus_one();
            id_bmap.add_equality(row);
        }
        for row in bmap.eq_matrix().rows_iter() {
            id_bmap.add_equality(embed_set_row_as_domain(row, &ls, n_param, n));
        }
        for row in bmap.ineq_matrix().rows_iter() {
            id_bmap.add_inequality(embed_set_row_as_domain(row, &ls, n_param, n));
        }
        out.add_basic_map(id_bmap);
    }
    out
}

/// A `Set` row is `[const, params, dims(n)]`; restate it over a map
/// `LocalSpace`'s domain block, i.e. `[const, params, in(n), out(n)
/// zeros]`.
fn embed_set_row_as_domain(row: &[BigInt], ls: &crate::local_space::LocalSpace, n_param: usize, n: usize) -> Vec<BigInt> {
    let mut out = vec![BigInt::zero(); ls.constraint_len()];
    out[0] = row[0].clone();
    out[1..1 + n_param].clone_from_slice(&row[1..1 + n_param]);
    out[ls.in_offset()..ls.in_offset() + n].clone_from_slice(&row[1 + n_param..1 + n_param + n]);
    out
}

/// The range of `m`, as a `Set`: project out the domain dimensions of
/// every disjunct.
fn range_of(m: &Map) -> Map {
    let n_param = m.space().n_param();
    let n_out = m.space().n_out();
    let n_in = m.space().n_in();
    let range_space = Space::set(n_param, n_out);
    let mut out = Map::empty(range_space.clone());
    for bmap in m.basic_maps() {
        let mut working = bmap.clone();
        let in_offset = working.local_space().in_offset();
        working.project_out(in_offset - 1, n_in);
        out.add_basic_map(working);
    }
    out
}

/// The domain of `m`, as a `Set`: project out the range dimensions of
/// every disjunct.
fn domain_of(m: &Map) -> Map {
    let n_param = m.space().n_param();
    let n_in = m.space().n_in();
    let n_out = m.space().n_out();
    let domain_space = Space::set(n_param, n_in);
    let mut out = Map::empty(domain_space.clone());
    for bmap in m.basic_maps() {
        let mut working = bmap.clone();
        let out_offset = working.local_space().out_offset();
        working.project_out(out_offset - 1, n_out);
        // `working`'s surviving columns now sit in the map's "in" tuple
        // with no "out" tuple left; relabel them as a plain set's
        // dimensions (same columns, different tuple name).
        out.add_basic_map(working.with_relabeled_space(domain_space.clone()));
    }
    out
}

/// `a \ b` for two `Map`s over the same space: for each disjunct of
/// `b`, intersect the running result with that disjunct's complement
/// (a union of single-violated-constraint disjuncts), then drop
/// newly-empty disjuncts.
fn set_minus(a: &Map, b: &Map, ctx: &mut Context) -> Map {
    let mut result = a.clone();
    for bmap in b.basic_maps() {
        result = result.intersect(&complement_basic(bmap));
        result.drop_empty(ctx);
    }
    result
}

/// The complement of one `BasicMap`'s conjunction, as a union of
/// disjuncts each violating exactly one of its constraints: an equality
/// `e == 0` splits into `e >= 1` and `e <= -1`; an inequality `c >= 0`
/// negates to `c <= -1`.
fn complement_basic(bmap: &BasicMap) -> Map {
    let space = bmap.space().clone();
    let mut out = Map::empty(space.clone());
    for row in bmap.eq_matrix().rows_iter() {
        let mut gt = BasicMap::universe(space.clone());
        let mut r = row.to_vec();
        r[0] = &r[0] - &BigInt::one();
        gt.add_inequality(r);
        out.add_basic_map(gt);

        let mut lt = BasicMap::universe(space.clone());
        let mut r: Vec<BigInt> = row.iter().map(BigInt::negate).collect();
        r[0] = &r[0] - &BigInt::one();
        lt.add_inequality(r);
        out.add_basic_map(lt);
    }
    for row in bmap.ineq_matrix().rows_iter() {
        let mut neg = BasicMap::universe(space.clone());
        let mut r: Vec<BigInt> = row.iter().map(BigInt::negate).collect();
        r[0] = &r[0] - &BigInt::one();
        neg.add_inequality(r);
        out.add_basic_map(neg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysLevel(u32);
    impl LevelBefore for AlwaysLevel {
        fn level_before(&self, _a: &Space, _b: &Space) -> u32 {
            self.0
        }
    }

    fn bi(v: i64) -> BigInt {
        BigInt::from_i64(v)
    }

    #[test]
    fn single_source_claims_all_sink_iterations() {
        // sink: S[i] -> M[i]; source: T[i] -> M[i]. Every memory location
        // the sink touches is touched by the source at the same index.
        let sink = Map::universe(Space::map(0, 1, 1));
        let source = Map::universe(Space::map(0, 1, 1));
        let mut ctx = Context::new();
        let result = compute_flow(&sink, &[source], &AlwaysLevel(1), 1, &mut ctx);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].source_index, 0);
    }

    #[test]
    fn source_fixed_to_one_location_only_claims_that_sink_iteration() {
        // sink: S[i] -> M[i] (identity); source: T[_] -> M[0] (always
        // writes location 0). Only sink iteration 0 can be attributed.
        let mut sink_bmap = BasicMap::universe(Space::map(0, 1, 1));
        sink_bmap.add_equality(vec![bi(0), bi(-1), bi(1)]); // out - in == 0
        let sink = Map::from_basic_map(Space::map(0, 1, 1), sink_bmap);

        let mut source_bmap = BasicMap::universe(Space::map(0, 1, 1));
        source_bmap.add_equality(vec![bi(0), bi(0), bi(1)]); // out == 0
        let source = Map::from_basic_map(Space::map(0, 1, 1), source_bmap);

        let mut ctx = Context::new();
        let result = compute_flow(&sink, &[source], &AlwaysLevel(1), 1, &mut ctx);
        assert_eq!(result.sources.len(), 1);
        // Every other sink iteration is left without a source.
        assert!(!result.no_source.basic_maps().is_empty());
    }
}
