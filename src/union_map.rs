//! `UnionMap` / `UnionSet`: a parameter space plus a hash table of
//! [`Map`]s keyed by their per-disjunct [`Space`].

use rustc_hash::FxHashMap;

use crate::ctx::Context;
use crate::map::Map;
use crate::space::Space;

/// A fixed-`n_param` parameter space plus a table mapping each distinct
/// (non-parameter) tuple `Space` seen so far to the `Map` over it. Two
/// disjuncts with different tuple identifiers coexist side by side
/// rather than forcing a common `Space`.
#[derive(Debug, Clone)]
pub struct UnionMap {
    n_param: usize,
    maps: FxHashMap<SpaceKey, Map>,
}

/// A hashable, structural stand-in for `Space` used as the union-map
/// table key. `Space` itself only implements `PartialEq`/`Eq`
/// (structural, not hash-friendly over its `Option<Id>` names without
/// extra plumbing), so the key is derived from the same fields
/// `Space::structurally_equal` compares, keeping lookups consistent
/// with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SpaceKey {
    n_param: usize,
    n_in: usize,
    n_out: usize,
    in_tuple_id: Option<crate::ctx::Id>,
    out_tuple_id: Option<crate::ctx::Id>,
}

fn key_of(space: &Space) -> SpaceKey {
    SpaceKey {
        n_param: space.n_param(),
        n_in: space.n_in(),
        n_out: space.n_out(),
        in_tuple_id: space.in_tuple_id(),
        out_tuple_id: space.out_tuple_id(),
    }
}

/// `UnionMap` specialized to sets: every member `Space` has `n_in ==
/// 0`. Carried as a type alias, mirroring [`crate::set::Set`].
pub type UnionSet = UnionMap;

impl UnionMap {
    /// An empty union-map over `n_param` parameters.
    #[must_use]
    pub fn empty(n_param: usize) -> Self {
        UnionMap { n_param, maps: FxHashMap::default() }
    }

    #[must_use]
    pub fn n_param(&self) -> usize {
        self.n_param
    }

    #[must_use]
    pub fn n_map(&self) -> usize {
        self.maps.len()
    }

    /// Iterate over the per-space `Map`s.
    pub fn maps(&self) -> impl Iterator<Item = &Map> {
        self.maps.values()
    }

    /// Fold `map` into this union, unioning with whatever is already
    /// stored for `map`'s space.
    ///
    /// # Panics
    /// Panics if `map`'s parameter count differs from this union-map's.
    pub fn add_map(&mut self, map: Map) {
        assert_eq!(map.space().n_param(), self.n_param, "parameter count mismatch");
        let key = key_of(map.space());
        self.maps
            .entry(key)
            .and_modify(|existing| *existing = existing.union(&map))
            .or_insert(map);
    }

    /// Union of two union-maps: every space's `Map` is unioned.
    #[must_use]
    pub fn union(&self, other: &UnionMap) -> UnionMap {
        let mut out = self.clone();
        for map in other.maps.values() {
            out.add_map(map.clone());
        }
        out
    }

    /// Intersection: only spaces present in both contribute, each
    /// intersected pairwise.
    #[must_use]
    pub fn intersect(&self, other: &UnionMap) -> UnionMap {
        let mut out = UnionMap::empty(self.n_param);
        for (key, a) in &self.maps {
            if let Some(b) = other.maps.get(key) {
                out.maps.insert(key.clone(), a.intersect(b));
            }
        }
        out
    }

    /// `true` if every contained `Map` is empty.
    pub fn is_empty(&mut self, ctx: &mut Context) -> bool {
        self.maps.values_mut().all(|m| m.is_empty(ctx))
    }

    /// Coalesce every contained `Map` independently.
    pub fn coalesce(&mut self, ctx: &mut Context) {
        for map in self.maps.values_mut() {
            map.coalesce(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_map_unions_same_space_entries() {
        let mut u = UnionMap::empty(0);
        u.add_map(Map::universe(Space::set(0, 1)));
        u.add_map(Map::universe(Space::set(0, 1)));
        assert_eq!(u.n_map(), 1);
        assert_eq!(u.maps().next().unwrap().n_basic_map(), 2);
    }

    #[test]
    fn distinct_tuple_spaces_coexist() {
        let mut u = UnionMap::empty(0);
        u.add_map(Map::universe(Space::set(0, 1)));
        u.add_map(Map::universe(Space::set(0, 2)));
        assert_eq!(u.n_map(), 2);
    }

    #[test]
    fn intersect_keeps_only_shared_spaces() {
        let mut a = UnionMap::empty(0);
        a.add_map(Map::universe(Space::set(0, 1)));
        a.add_map(Map::universe(Space::set(0, 2)));
        let mut b = UnionMap::empty(0);
        b.add_map(Map::universe(Space::set(0, 1)));
        let i = a.intersect(&b);
        assert_eq!(i.n_map(), 1);
    }
}
