//! Tuple-signature metadata.
//!
//! A `Space` names nothing by itself; it only records shape: how many
//! parameters, how many input-tuple and output-tuple dimensions, and
//! (optionally) the identifiers attached to each of those. Two `Space`s
//! are compared structurally, recursively through any nested (wrapped)
//! spaces.

use std::rc::Rc;

use crate::ctx::Id;

/// A tuple-signature: `(n_param, n_in, n_out)` plus optional identifiers.
///
/// Sets are represented as maps with `n_in == 0`; see [`Space::is_set`].
/// A *wrapped* relation (a set of pairs, used as the domain or range of
/// another map) is represented by a nested `Space` occupying the input or
/// output tuple slot.
#[derive(Debug, Clone)]
pub struct Space {
    n_param: usize,
    n_in: usize,
    n_out: usize,
    param_ids: Vec<Option<Id>>,
    in_ids: Vec<Option<Id>>,
    out_ids: Vec<Option<Id>>,
    in_tuple_id: Option<Id>,
    out_tuple_id: Option<Id>,
    nested_in: Option<Rc<Space>>,
    nested_out: Option<Rc<Space>>,
}

impl Space {
    /// A set space: no input tuple, `n_dim` output (= "set") dimensions.
    #[must_use]
    pub fn set(n_param: usize, n_dim: usize) -> Self {
        Space {
            n_param,
            n_in: 0,
            n_out: n_dim,
            param_ids: vec![None; n_param],
            in_ids: Vec::new(),
            out_ids: vec![None; n_dim],
            in_tuple_id: None,
            out_tuple_id: None,
            nested_in: None,
            nested_out: None,
        }
    }

    /// A map space: `n_in` input and `n_out` output dimensions.
    #[must_use]
    pub fn map(n_param: usize, n_in: usize, n_out: usize) -> Self {
        Space {
            n_param,
            n_in,
            n_out,
            param_ids: vec![None; n_param],
            in_ids: vec![None; n_in],
            out_ids: vec![None; n_out],
            in_tuple_id: None,
            out_tuple_id: None,
            nested_in: None,
            nested_out: None,
        }
    }

    /// Number of parameters.
    #[must_use]
    pub fn n_param(&self) -> usize {
        self.n_param
    }

    /// Number of input-tuple dimensions (`0` for a set).
    #[must_use]
    pub fn n_in(&self) -> usize {
        self.n_in
    }

    /// Number of output-tuple dimensions.
    #[must_use]
    pub fn n_out(&self) -> usize {
        self.n_out
    }

    /// Total number of non-parameter (variable) dimensions: `n_in + n_out`.
    #[must_use]
    pub fn n_total(&self) -> usize {
        self.n_in + self.n_out
    }

    /// `true` for a set space (`n_in == 0`).
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.n_in == 0
    }

    /// Assign a name to parameter `i`.
    ///
    /// # Panics
    /// Panics if `i >= n_param()`.
    pub fn set_param_id(&mut self, i: usize, id: Id) {
        self.param_ids[i] = Some(id);
    }

    /// Name of parameter `i`, if any.
    #[must_use]
    pub fn param_id(&self, i: usize) -> Option<Id> {
        self.param_ids[i]
    }

    /// Assign a name to input dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= n_in()`.
    pub fn set_in_id(&mut self, i: usize, id: Id) {
        self.in_ids[i] = Some(id);
    }

    /// Assign a name to output dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= n_out()`.
    pub fn set_out_id(&mut self, i: usize, id: Id) {
        self.out_ids[i] = Some(id);
    }

    /// Name of output (or set) dimension `i`, if any.
    #[must_use]
    pub fn out_id(&self, i: usize) -> Option<Id> {
        self.out_ids[i]
    }

    /// Name of input dimension `i`, if any.
    #[must_use]
    pub fn in_id(&self, i: usize) -> Option<Id> {
        self.in_ids[i]
    }

    /// Set the input tuple's name (e.g. the `S` in `S[i] -> T[j]`).
    pub fn set_in_tuple_id(&mut self, id: Id) {
        self.in_tuple_id = Some(id);
    }

    /// Set the output tuple's name.
    pub fn set_out_tuple_id(&mut self, id: Id) {
        self.out_tuple_id = Some(id);
    }

    /// The input tuple's name, if any.
    #[must_use]
    pub fn in_tuple_id(&self) -> Option<Id> {
        self.in_tuple_id
    }

    /// The output tuple's name, if any.
    #[must_use]
    pub fn out_tuple_id(&self) -> Option<Id> {
        self.out_tuple_id
    }

    /// The nested (wrapped) space occupying the input slot, if this
    /// space's input tuple is itself a set of pairs.
    #[must_use]
    pub fn nested_in(&self) -> Option<&Space> {
        self.nested_in.as_deref()
    }

    /// The nested (wrapped) space occupying the output slot.
    #[must_use]
    pub fn nested_out(&self) -> Option<&Space> {
        self.nested_out.as_deref()
    }

    /// Replace the input slot with a wrapped relation `nested`, whose own
    /// `n_in + n_out` becomes this space's `n_in`.
    #[must_use]
    pub fn with_nested_in(mut self, nested: Space) -> Self {
        self.n_in = nested.n_total();
        self.in_ids = vec![None; self.n_in];
        self.nested_in = Some(Rc::new(nested));
        self
    }

    /// Replace the output slot with a wrapped relation `nested`.
    #[must_use]
    pub fn with_nested_out(mut self, nested: Space) -> Self {
        self.n_out = nested.n_total();
        self.out_ids = vec![None; self.n_out];
        self.nested_out = Some(Rc::new(nested));
        self
    }

    /// The domain space: a set with this space's parameters and input
    /// dimensions.
    #[must_use]
    pub fn domain(&self) -> Space {
        let mut s = Space::set(self.n_param, self.n_in);
        s.param_ids.clone_from(&self.param_ids);
        s.out_ids.clone_from(&self.in_ids);
        s.out_tuple_id = self.in_tuple_id;
        s.nested_out.clone_from(&self.nested_in);
        s
    }

    /// The range space: a set with this space's parameters and output
    /// dimensions.
    #[must_use]
    pub fn range(&self) -> Space {
        let mut s = Space::set(self.n_param, self.n_out);
        s.param_ids.clone_from(&self.param_ids);
        s.out_ids.clone_from(&self.out_ids);
        s.out_tuple_id = self.out_tuple_id;
        s.nested_out.clone_from(&self.nested_out);
        s
    }

    /// The map space obtained by reversing the input and output tuples.
    #[must_use]
    pub fn reversed(&self) -> Space {
        Space {
            n_param: self.n_param,
            n_in: self.n_out,
            n_out: self.n_in,
            param_ids: self.param_ids.clone(),
            in_ids: self.out_ids.clone(),
            out_ids: self.in_ids.clone(),
            in_tuple_id: self.out_tuple_id,
            out_tuple_id: self.in_tuple_id,
            nested_in: self.nested_out.clone(),
            nested_out: self.nested_in.clone(),
        }
    }

    /// Structural equality: same tuple counts, matching names at equal
    /// positions, structurally equal nested spaces. This is the
    /// denotational equality used to decide whether two constraint
    /// systems can be intersected directly.
    #[must_use]
    pub fn structurally_equal(&self, other: &Space) -> bool {
        self.n_param == other.n_param
            && self.n_in == other.n_in
            && self.n_out == other.n_out
            && self.param_ids == other.param_ids
            && self.in_ids == other.in_ids
            && self.out_ids == other.out_ids
            && self.in_tuple_id == other.in_tuple_id
            && self.out_tuple_id == other.out_tuple_id
            && nested_eq(&self.nested_in, &other.nested_in)
            && nested_eq(&self.nested_out, &other.nested_out)
    }
}

/// Which tuple [`Space::without_dims`] removes dimensions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DimKind {
    Param,
    In,
    Out,
}

impl Space {
    /// `self` with `n` dimensions of tuple `kind` removed, starting at
    /// local (0-based, within that tuple) offset `first`.
    ///
    /// # Panics
    /// Panics if `[first, first + n)` exceeds the named tuple's width.
    #[must_use]
    pub(crate) fn without_dims(&self, kind: DimKind, first: usize, n: usize) -> Space {
        if n == 0 {
            return self.clone();
        }
        let mut out = self.clone();
        match kind {
            DimKind::Param => {
                assert!(first + n <= self.n_param, "param range out of bounds");
                out.n_param -= n;
                out.param_ids.drain(first..first + n);
            }
            DimKind::In => {
                assert!(first + n <= self.n_in, "input range out of bounds");
                out.n_in -= n;
                out.in_ids.drain(first..first + n);
            }
            DimKind::Out => {
                assert!(first + n <= self.n_out, "output range out of bounds");
                out.n_out -= n;
                out.out_ids.drain(first..first + n);
            }
        }
        out
    }
}

fn nested_eq(a: &Option<Rc<Space>>, b: &Option<Rc<Space>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.structurally_equal(b),
        _ => false,
    }
}

impl PartialEq for Space {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_equal(other)
    }
}
impl Eq for Space {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Context;

    #[test]
    fn set_and_map_have_expected_shape() {
        let s = Space::set(1, 3);
        assert!(s.is_set());
        assert_eq!(s.n_total(), 3);

        let m = Space::map(1, 2, 3);
        assert!(!m.is_set());
        assert_eq!(m.n_in(), 2);
        assert_eq!(m.n_out(), 3);
    }

    #[test]
    fn structural_equality_considers_names() {
        let mut ctx = Context::new();
        let x = ctx.intern("x");
        let mut a = Space::set(0, 1);
        let mut b = Space::set(0, 1);
        assert_eq!(a, b);
        a.set_out_id(0, x);
        assert_ne!(a, b);
        b.set_out_id(0, x);
        assert_eq!(a, b);
    }

    #[test]
    fn domain_and_range_project_map_space() {
        let m = Space::map(2, 3, 4);
        assert_eq!(m.domain().n_total(), 3);
        assert_eq!(m.domain().n_param(), 2);
        assert_eq!(m.range().n_total(), 4);
    }

    #[test]
    fn reversed_swaps_tuples() {
        let m = Space::map(1, 2, 3);
        let r = m.reversed();
        assert_eq!(r.n_in(), 3);
        assert_eq!(r.n_out(), 2);
    }

    #[test]
    fn without_dims_shrinks_the_named_tuple() {
        let m = Space::map(1, 3, 2);
        let shrunk = m.without_dims(DimKind::In, 1, 2);
        assert_eq!(shrunk.n_in(), 1);
        assert_eq!(shrunk.n_param(), 1);
        assert_eq!(shrunk.n_out(), 2);
    }

    #[test]
    fn wrapping_sets_nested_dimension_count() {
        let pair = Space::map(0, 1, 1);
        let wrapped = Space::set(0, 0).with_nested_out(pair);
        assert_eq!(wrapped.n_out(), 2);
        assert!(wrapped.nested_out().is_some());
    }
}
