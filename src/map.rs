//! `Map`: a finite union (disjunction) of [`BasicMap`]s sharing one
//! [`Space`].

use crate::basic_map::BasicMap;
use crate::coalesce;
use crate::ctx::Context;
use crate::space::Space;

/// A `Space` plus a dynamic array of `BasicMap`s all sharing it,
/// denoting their set-theoretic union. Disjunct order is not
/// semantically significant.
#[derive(Debug, Clone)]
pub struct Map {
    space: Space,
    basic_maps: Vec<BasicMap>,
    /// Asserts the disjuncts are pairwise disjoint (enables the
    /// `add_disjoint` fast path; never inferred automatically).
    disjoint: bool,
}

impl Map {
    /// The empty union over `space` (no disjuncts).
    #[must_use]
    pub fn empty(space: Space) -> Self {
        Map { space, basic_maps: Vec::new(), disjoint: true }
    }

    /// The universe, as a single unconstrained disjunct.
    #[must_use]
    pub fn universe(space: Space) -> Self {
        let bmap = BasicMap::universe(space.clone());
        Map { space, basic_maps: vec![bmap], disjoint: true }
    }

    /// Lift a single `BasicMap` into a one-disjunct `Map`.
    ///
    /// # Panics
    /// Panics if `bmap`'s space differs from `space`.
    #[must_use]
    pub fn from_basic_map(space: Space, bmap: BasicMap) -> Self {
        assert_eq!(&space, bmap.space(), "basic map space mismatch");
        Map { space, basic_maps: vec![bmap], disjoint: true }
    }

    #[must_use]
    pub fn space(&self) -> &Space {
        &self.space
    }

    #[must_use]
    pub fn basic_maps(&self) -> &[BasicMap] {
        &self.basic_maps
    }

    #[must_use]
    pub fn n_basic_map(&self) -> usize {
        self.basic_maps.len()
    }

    #[must_use]
    pub fn is_disjoint_flagged(&self) -> bool {
        self.disjoint
    }

    /// Add a disjunct whose space matches this map's, without asserting
    /// disjointness from the existing ones.
    ///
    /// # Panics
    /// Panics if `bmap`'s space differs from this map's.
    pub fn add_basic_map(&mut self, bmap: BasicMap) {
        assert_eq!(&self.space, bmap.space(), "basic map space mismatch");
        self.basic_maps.push(bmap);
        self.disjoint = false;
    }

    /// Add a disjunct known to be disjoint from every existing one
    /// (skips the `disjoint` downgrade the general `add_basic_map` path
    /// takes). Caller is responsible for the claim's truth.
    ///
    /// # Panics
    /// Panics if `bmap`'s space differs from this map's.
    pub fn add_disjoint(&mut self, bmap: BasicMap) {
        assert_eq!(&self.space, bmap.space(), "basic map space mismatch");
        self.basic_maps.push(bmap);
    }

    /// Set-theoretic union.
    ///
    /// # Panics
    /// Panics if the spaces differ.
    #[must_use]
    pub fn union(&self, other: &Map) -> Map {
        assert_eq!(self.space, other.space, "union requires matching spaces");
        let mut out = Map { space: self.space.clone(), basic_maps: self.basic_maps.clone(), disjoint: false };
        out.basic_maps.extend(other.basic_maps.iter().cloned());
        out
    }

    /// Set-theoretic intersection: the pairwise `BasicMap::intersect` of
    /// every disjunct pair, dropping empties only when the caller later
    /// asks (kept lazily here so callers can inspect pre-filter
    /// results, matching `is_empty`'s own on-demand emptiness check).
    ///
    /// # Panics
    /// Panics if the spaces differ.
    #[must_use]
    pub fn intersect(&self, other: &Map) -> Map {
        assert_eq!(self.space, other.space, "intersect requires matching spaces");
        let mut out = Map { space: self.space.clone(), basic_maps: Vec::new(), disjoint: false };
        for a in &self.basic_maps {
            for b in &other.basic_maps {
                out.basic_maps.push(a.intersect(b));
            }
        }
        out
    }

    /// `true` if every disjunct is empty.
    pub fn is_empty(&mut self, ctx: &mut Context) -> bool {
        self.basic_maps.iter_mut().all(|b| b.is_empty(ctx))
    }

    /// Remove disjuncts known to be empty, shrinking the representation
    /// without changing the denoted union.
    pub fn drop_empty(&mut self, ctx: &mut Context) {
        self.basic_maps.retain_mut(|b| !b.is_empty(ctx));
    }

    /// Merge adjacent disjuncts whose union is itself convex, replacing
    /// them with a single `BasicMap` wherever possible.
    pub fn coalesce(&mut self, ctx: &mut Context) {
        coalesce::coalesce(self, ctx);
    }

    /// Replace the disjunct list wholesale (used by `coalesce`).
    pub(crate) fn set_basic_maps(&mut self, basic_maps: Vec<BasicMap>) {
        self.basic_maps = basic_maps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presburger_bigint::BigInt;

    #[test]
    fn union_concatenates_disjuncts() {
        let a = Map::universe(Space::set(0, 1));
        let b = Map::universe(Space::set(0, 1));
        let u = a.union(&b);
        assert_eq!(u.n_basic_map(), 2);
    }

    #[test]
    fn intersect_cross_multiplies_disjuncts() {
        let mut a = Map::empty(Space::set(0, 1));
        a.add_basic_map(BasicMap::universe(Space::set(0, 1)));
        a.add_basic_map(BasicMap::universe(Space::set(0, 1)));
        let b = Map::universe(Space::set(0, 1));
        let i = a.intersect(&b);
        assert_eq!(i.n_basic_map(), 2);
    }

    #[test]
    fn drop_empty_removes_contradictory_disjuncts() {
        let mut m = Map::empty(Space::set(0, 1));
        let mut empty_bmap = BasicMap::universe(Space::set(0, 1));
        empty_bmap.add_inequality(vec![BigInt::from_i64(-1), BigInt::zero()]);
        m.add_basic_map(empty_bmap);
        m.add_basic_map(BasicMap::universe(Space::set(0, 1)));
        let mut ctx = Context::new();
        m.drop_empty(&mut ctx);
        assert_eq!(m.n_basic_map(), 1);
    }
}
