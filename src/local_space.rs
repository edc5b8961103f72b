//! A [`Space`] equipped with an ordered list of integer-division (div)
//! definitions.
//!
//! Every constraint row used by [`crate::basic_map::BasicMap`] is laid
//! out over the column order a `LocalSpace` fixes: `[const | params |
//! in-dims | out-dims | divs]`. A div row is
//! `[denom | numerator | coeffs over (params, in, out, earlier divs)]`,
//! encoding `div_i = floor((numerator + coeffs·x) / denom)`; `denom == 0`
//! marks an *unknown* (existential, not-yet-resolved) div.

use std::cmp::Ordering;

use presburger_bigint::BigInt;

use crate::space::Space;
use crate::vecmat::Mat;

/// A `Space` plus its ordered div definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSpace {
    space: Space,
    /// `n_div x (2 + n_param + n_in + n_out + n_div)`.
    divs: Mat,
}

impl LocalSpace {
    /// Build a `LocalSpace` with no divs.
    #[must_use]
    pub fn new(space: Space) -> Self {
        let width = 2 + space.n_param() + space.n_total();
        LocalSpace {
            space,
            divs: Mat::zero(0, width),
        }
    }

    /// The underlying `Space`.
    #[must_use]
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Number of div definitions.
    #[must_use]
    pub fn n_div(&self) -> usize {
        self.divs.n_rows()
    }

    /// Total variable columns: `params + in + out + divs`.
    #[must_use]
    pub fn var_cols(&self) -> usize {
        self.space.n_param() + self.space.n_total() + self.n_div()
    }

    /// Length of a constraint row over this local space: `1 + var_cols()`.
    #[must_use]
    pub fn constraint_len(&self) -> usize {
        1 + self.var_cols()
    }

    /// Column offset of the constant term (always `0`).
    #[must_use]
    pub fn const_offset(&self) -> usize {
        0
    }

    /// Column offset of the first parameter.
    #[must_use]
    pub fn param_offset(&self) -> usize {
        1
    }

    /// Column offset of the first input-tuple dimension.
    #[must_use]
    pub fn in_offset(&self) -> usize {
        1 + self.space.n_param()
    }

    /// Column offset of the first output-tuple dimension.
    #[must_use]
    pub fn out_offset(&self) -> usize {
        self.in_offset() + self.space.n_in()
    }

    /// Column offset of the first div.
    #[must_use]
    pub fn div_offset(&self) -> usize {
        self.out_offset() + self.space.n_out()
    }

    /// `true` if div `i` is known (`denom > 0`).
    ///
    /// # Panics
    /// Panics if `i >= n_div()`.
    #[must_use]
    pub fn div_is_known(&self, i: usize) -> bool {
        !self.divs.get(i, 0).is_zero()
    }

    /// The denominator of div `i`.
    #[must_use]
    pub fn div_denom(&self, i: usize) -> &BigInt {
        self.divs.get(i, 0)
    }

    /// The numerator (constant term) of div `i`'s defining affine
    /// expression.
    #[must_use]
    pub fn div_numerator(&self, i: usize) -> &BigInt {
        self.divs.get(i, 1)
    }

    /// The full div-definition row `[denom | numerator | coeffs...]` for
    /// div `i`.
    #[must_use]
    pub fn div_row(&self, i: usize) -> &[BigInt] {
        self.divs.row(i)
    }

    /// Append an unknown (existential) div with zero coefficients.
    /// Returns its index.
    pub fn add_unknown_div(&mut self) -> usize {
        let width = self.divs.n_cols();
        self.divs.push_row(vec![BigInt::zero(); width]);
        self.divs.n_rows() - 1
    }

    /// Append a known div `floor((numerator + coeffs·x) / denom)`,
    /// `denom > 0`. `coeffs` covers `(params, in, out, earlier divs)` and
    /// must have length `var_cols()` *before* this div is added.
    ///
    /// # Panics
    /// Panics if `denom <= 0` or `coeffs.len() != var_cols()` (measured
    /// before insertion).
    pub fn add_known_div(&mut self, denom: BigInt, numerator: BigInt, coeffs: Vec<BigInt>) -> usize {
        assert!(denom.is_positive(), "div denominator must be positive");
        assert_eq!(coeffs.len(), self.var_cols(), "div coefficient row has wrong width");
        let mut row = Vec::with_capacity(2 + coeffs.len());
        row.push(denom);
        row.push(numerator);
        row.extend(coeffs);
        self.divs.push_row(row);
        self.divs.n_rows() - 1
    }

    /// Replace the div matrix wholesale (used by `merge_divs`).
    pub(crate) fn set_divs(&mut self, divs: Mat) {
        self.divs = divs;
    }

    /// Reinterpret this local space's columns under a differently
    /// labeled `Space` of the same total column count — e.g. relabeling
    /// a map's all-domain-no-range columns (after projecting out the
    /// range) as a plain set's dimensions. Column positions are
    /// otherwise unchanged; only which tuple each falls under moves.
    ///
    /// # Panics
    /// Panics if `new_space`'s `n_param() + n_total()` differs from this
    /// local space's.
    pub(crate) fn with_space(&self, new_space: Space) -> LocalSpace {
        assert_eq!(
            new_space.n_param() + new_space.n_total(),
            self.space.n_param() + self.space.n_total(),
            "with_space requires a matching column layout"
        );
        LocalSpace {
            space: new_space,
            divs: self.divs.clone(),
        }
    }
}

/// Total order over div-definition rows used to canonicalize and merge
/// div lists.
///
/// Unknown divs (`denom == 0`) always sort after every known div. Among
/// comparable rows, ordering is first by the position of the last
/// nonzero entry in `[numerator, coeffs...]` (an all-zero row sorts
/// first), then lexicographically on that same slice.
#[must_use]
pub fn cmp_row(known_a: bool, a: &[BigInt], known_b: bool, b: &[BigInt]) -> Ordering {
    match (known_a, known_b) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    let last_a = last_nonzero(a);
    let last_b = last_nonzero(b);
    match last_a.cmp(&last_b) {
        Ordering::Equal => {}
        other => return other,
    }
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

fn last_nonzero(row: &[BigInt]) -> Option<usize> {
    row.iter().rposition(|v| !v.is_zero())
}

/// Merge the div lists of two `LocalSpace`s sharing the same `Space`,
/// returning the combined `LocalSpace` and, for each input, a map from
/// its original div index to the merged index.
///
/// # Panics
/// Panics if `a.space() != b.space()`.
#[must_use]
pub fn merge_divs(a: &LocalSpace, b: &LocalSpace) -> (LocalSpace, Vec<usize>, Vec<usize>) {
    assert_eq!(a.space(), b.space(), "merge_divs requires matching spaces");

    let fixed = a.space.n_param() + a.space.n_total();
    let mut exp_a = vec![0usize; a.n_div()];
    let mut exp_b = vec![0usize; b.n_div()];
    let mut merged_rows: Vec<(bool, Vec<BigInt>)> = Vec::new();

    // Remap div `idx`'s own coefficient-on-earlier-divs tail into the
    // shared output index space using the already-computed `exp` map
    // (valid because divs only reference strictly earlier divs, which —
    // since we walk each input list in original order — are always
    // merged before we reach `idx`).
    fn remapped_row(ls: &LocalSpace, idx: usize, fixed: usize, exp: &[usize], out_len: usize) -> (bool, Vec<BigInt>) {
        let row = ls.div_row(idx);
        let known = !row[0].is_zero();
        let mut out = vec![BigInt::zero(); 1 + fixed + out_len];
        out[0] = row[1].clone(); // numerator
        out[1..1 + fixed].clone_from_slice(&row[2..2 + fixed]);
        for (k, coeff) in row[2 + fixed..].iter().enumerate() {
            if !coeff.is_zero() {
                out[1 + fixed + exp[k]] = coeff.clone();
            }
        }
        (known, out)
    }

    let (mut ia, mut ib) = (0usize, 0usize);
    while ia < a.n_div() || ib < b.n_div() {
        if ib >= b.n_div() {
            let (known, row) = remapped_row(a, ia, fixed, &exp_a, merged_rows.len());
            exp_a[ia] = merged_rows.len();
            merged_rows.push((known, row));
            ia += 1;
            continue;
        }
        if ia >= a.n_div() {
            let (known, row) = remapped_row(b, ib, fixed, &exp_b, merged_rows.len());
            exp_b[ib] = merged_rows.len();
            merged_rows.push((known, row));
            ib += 1;
            continue;
        }
        let (known_a, ra) = remapped_row(a, ia, fixed, &exp_a, merged_rows.len());
        let (known_b, rb) = remapped_row(b, ib, fixed, &exp_b, merged_rows.len());
        let ra_denom = a.div_denom(ia).clone();
        let rb_denom = b.div_denom(ib).clone();

        let mergeable = known_a && known_b && ra_denom == rb_denom && ra == rb;
        if mergeable {
            exp_a[ia] = merged_rows.len();
            exp_b[ib] = merged_rows.len();
            merged_rows.push((known_a, with_denom(&ra, &ra_denom)));
            ia += 1;
            ib += 1;
            continue;
        }

        match cmp_row(known_a, &ra, known_b, &rb) {
            Ordering::Greater => {
                exp_b[ib] = merged_rows.len();
                merged_rows.push((known_b, with_denom(&rb, &rb_denom)));
                ib += 1;
            }
            _ => {
                exp_a[ia] = merged_rows.len();
                merged_rows.push((known_a, with_denom(&ra, &ra_denom)));
                ia += 1;
            }
        }
    }

    fn with_denom(numerator_and_coeffs: &[BigInt], denom: &BigInt) -> Vec<BigInt> {
        let mut v = Vec::with_capacity(1 + numerator_and_coeffs.len());
        v.push(denom.clone());
        v.extend_from_slice(numerator_and_coeffs);
        v
    }

    // Every row was built against `merged_rows.len()` divs *so far*; now
    // that the final count is known, pad each row's div tail out to the
    // full width.
    let n_div = merged_rows.len();
    let width = 2 + fixed + n_div;
    let mut data = Vec::with_capacity(n_div * width);
    for (_, row) in &merged_rows {
        data.extend_from_slice(row);
        data.resize(data.len() + (width - row.len()), BigInt::zero());
    }
    let mut out = LocalSpace::new(a.space.clone());
    out.set_divs(Mat::from_rows(n_div, width, data));
    (out, exp_a, exp_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bi(v: i64) -> BigInt {
        BigInt::from_i64(v)
    }

    #[test]
    fn unknown_div_sorts_after_known() {
        let known = vec![bi(1), bi(0)];
        let unknown = vec![bi(0), bi(0)];
        assert_eq!(cmp_row(true, &known, false, &unknown), Ordering::Less);
    }

    #[test]
    fn merge_divs_unifies_identical_known_divs() {
        let space = Space::set(1, 1);
        let mut a = LocalSpace::new(space.clone());
        // div0 = floor((0 + 1*param)/2)
        a.add_known_div(bi(2), bi(0), vec![bi(1), bi(0)]);
        let mut b = LocalSpace::new(space);
        b.add_known_div(bi(2), bi(0), vec![bi(1), bi(0)]);

        let (merged, exp_a, exp_b) = merge_divs(&a, &b);
        assert_eq!(merged.n_div(), 1);
        assert_eq!(exp_a, vec![0]);
        assert_eq!(exp_b, vec![0]);
    }

    #[test]
    fn merge_divs_keeps_distinct_known_divs_separate() {
        let space = Space::set(1, 1);
        let mut a = LocalSpace::new(space.clone());
        a.add_known_div(bi(2), bi(0), vec![bi(1), bi(0)]);
        let mut b = LocalSpace::new(space);
        b.add_known_div(bi(3), bi(1), vec![bi(1), bi(0)]);

        let (merged, exp_a, exp_b) = merge_divs(&a, &b);
        assert_eq!(merged.n_div(), 2);
        assert_ne!(exp_a[0], exp_b[0]);
    }

    #[test]
    fn unknown_divs_never_unify() {
        let space = Space::set(0, 1);
        let mut a = LocalSpace::new(space.clone());
        a.add_unknown_div();
        let mut b = LocalSpace::new(space);
        b.add_unknown_div();

        let (merged, _, _) = merge_divs(&a, &b);
        assert_eq!(merged.n_div(), 2);
    }
}
