//! `BasicMap`: one convex conjunction of equalities, inequalities, and
//! local divs over a single [`LocalSpace`] — the constraint engine.

use presburger_bigint::BigInt;

use crate::ctx::Context;
use crate::local_space::{self, LocalSpace};
use crate::space::DimKind;
use crate::tableau::{RowKind, Tableau};
use crate::vecmat::Mat;

bitflags::bitflags! {
    /// Cached facts about a `BasicMap`'s constraint system, invalidated
    /// by any mutation that could change them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        /// Known (and cached) to denote the empty relation.
        const EMPTY          = 1 << 0;
        /// The rational relaxation is known empty (implies `EMPTY` is
        /// unknown only in the non-integer sense: the integer hull is
        /// certainly empty too).
        const RATIONAL_EMPTY = 1 << 1;
        /// Equalities are in row-echelon form (`gauss` has run since the
        /// last mutation).
        const ECHELON        = 1 << 2;
        /// No duplicate/redundant rows remain.
        const NORMALIZED      = 1 << 3;
        /// `detect_equalities` has run since the last mutation.
        const EQUALITIES_DETECTED = 1 << 4;
    }
}

/// One convex conjunction: a [`LocalSpace`] plus an equality matrix and
/// an inequality matrix (each row `>= 0` after its `op`), with cached
/// flags.
#[derive(Debug, Clone)]
pub struct BasicMap {
    local_space: LocalSpace,
    eq: Mat,
    ineq: Mat,
    flags: Flags,
}

/// `BasicMap` specialized to `n_in == 0`; see [`LocalSpace`]'s own
/// `Space::is_set`. Carried as a type alias, not a distinct type, since
/// every operation is identical for the `n_in == 0` case.
pub type BasicSet = BasicMap;

impl BasicMap {
    /// `alloc(Space, n_div, n_eq, n_ineq)`: an empty hull (no rows yet)
    /// with room reserved for `n_eq`/`n_ineq` rows and `n_div`
    /// (unknown) divs.
    #[must_use]
    pub fn alloc(space: crate::space::Space, n_div: usize, n_eq: usize, n_ineq: usize) -> Self {
        let mut ls = LocalSpace::new(space);
        for _ in 0..n_div {
            ls.add_unknown_div();
        }
        let width = ls.constraint_len();
        let _ = (n_eq, n_ineq); // capacity hints only: `Mat` grows on push
        BasicMap {
            local_space: ls,
            eq: Mat::zero(0, width),
            ineq: Mat::zero(0, width),
            flags: Flags::empty(),
        }
    }

    /// The universe over `space`: no constraints at all.
    #[must_use]
    pub fn universe(space: crate::space::Space) -> Self {
        BasicMap::alloc(space, 0, 0, 0)
    }

    /// The empty relation over `space`, represented by the contradictory
    /// equality `1 = 0` and the `EMPTY` flag.
    #[must_use]
    pub fn empty(space: crate::space::Space) -> Self {
        let mut bmap = BasicMap::alloc(space, 0, 1, 0);
        let mut row = vec![BigInt::zero(); bmap.local_space.constraint_len()];
        row[0] = BigInt::one();
        bmap.eq.push_row(row);
        bmap.flags.insert(Flags::EMPTY | Flags::RATIONAL_EMPTY);
        bmap
    }

    #[must_use]
    pub fn local_space(&self) -> &LocalSpace {
        &self.local_space
    }

    #[must_use]
    pub fn space(&self) -> &crate::space::Space {
        self.local_space.space()
    }

    #[must_use]
    pub fn n_eq(&self) -> usize {
        self.eq.n_rows()
    }

    #[must_use]
    pub fn n_ineq(&self) -> usize {
        self.ineq.n_rows()
    }

    #[must_use]
    pub fn eq_row(&self, i: usize) -> &[BigInt] {
        self.eq.row(i)
    }

    #[must_use]
    pub fn ineq_row(&self, i: usize) -> &[BigInt] {
        self.ineq.row(i)
    }

    fn invalidate(&mut self) {
        self.flags = Flags::empty();
    }

    /// Introduce a new unknown (existential) div, widening every
    /// existing constraint row with a trailing zero column and
    /// returning the new div's combined variable index (usable as a
    /// `coeff_div`-style column position in freshly built rows).
    pub fn add_unknown_div(&mut self) -> usize {
        let var_index = self.local_space.var_cols();
        self.local_space.add_unknown_div();
        self.eq = widen_with_zero_column(&self.eq);
        self.ineq = widen_with_zero_column(&self.ineq);
        self.invalidate();
        var_index
    }

    /// Append an equality row (`row == 0`), invalidating cached flags.
    ///
    /// # Panics
    /// Panics if `row.len() != local_space.constraint_len()`.
    pub fn add_equality(&mut self, row: Vec<BigInt>) {
        assert_eq!(row.len(), self.local_space.constraint_len(), "equality row has wrong width");
        self.eq.push_row(row);
        self.invalidate();
    }

    /// Append an inequality row (`row >= 0`), invalidating cached flags.
    ///
    /// # Panics
    /// Panics if `row.len() != local_space.constraint_len()`.
    pub fn add_inequality(&mut self, row: Vec<BigInt>) {
        assert_eq!(row.len(), self.local_space.constraint_len(), "inequality row has wrong width");
        self.ineq.push_row(row);
        self.invalidate();
    }

    /// Bring the equality matrix to row-echelon form.
    ///
    /// Deterministic pivot order: scan variable columns
    /// from highest index to lowest; for each column, among the
    /// not-yet-pivoted equalities with a nonzero entry there, pick the
    /// one whose entry has smallest absolute value (row index breaking
    /// ties), eliminate that column from every other equality using it
    /// as pivot, then move on to the next (lower) column.
    pub fn gauss(&mut self) {
        let n_cols = self.local_space.var_cols();
        let mut pivot_row = 0usize;
        for col in (0..n_cols).rev() {
            if pivot_row >= self.eq.n_rows() {
                break;
            }
            let Some(best) = (pivot_row..self.eq.n_rows())
                .filter(|&r| !self.eq.get(r, col + 1).is_zero())
                .min_by(|&a, &b| {
                    let va = self.eq.get(a, col + 1).abs();
                    let vb = self.eq.get(b, col + 1).abs();
                    va.cmp(&vb).then(a.cmp(&b))
                })
            else {
                continue;
            };
            self.eq.swap_rows(pivot_row, best);
            for r in 0..self.eq.n_rows() {
                if r != pivot_row && !self.eq.get(r, col + 1).is_zero() {
                    self.eq.eliminate(pivot_row, col + 1, r);
                }
            }
            pivot_row += 1;
        }
        self.flags.insert(Flags::ECHELON);
    }

    /// Find implicit equalities among the inequalities: pair `a·x >= 0`
    /// with `-a·x >= 0` (denoting `a·x == 0`), then promote any
    /// remaining inequality whose row is rank-deficient against the
    /// resulting equalities — an affine combination of them, and so
    /// identically zero on their affine hull — detected by reducing it
    /// against the (row-echelon) equality matrix via Gaussian
    /// elimination and checking the residual is the zero row.
    pub fn detect_equalities(&mut self) {
        let mut promoted = Vec::new();
        let mut consumed = vec![false; self.ineq.n_rows()];
        for i in 0..self.ineq.n_rows() {
            if consumed[i] {
                continue;
            }
            for j in (i + 1)..self.ineq.n_rows() {
                if consumed[j] {
                    continue;
                }
                if rows_are_negations(self.ineq.row(i), self.ineq.row(j)) {
                    promoted.push(self.ineq.row(i).to_vec());
                    consumed[i] = true;
                    consumed[j] = true;
                    break;
                }
            }
        }
        if !promoted.is_empty() {
            let mut kept = Mat::zero(0, self.local_space.constraint_len());
            for (i, row) in self.ineq.rows_iter().enumerate() {
                if !consumed[i] {
                    kept.push_row(row.to_vec());
                }
            }
            self.ineq = kept;
            for row in promoted {
                self.eq.push_row(row);
            }
            self.invalidate();
            self.gauss();
        }

        let n_var_cols = self.local_space.var_cols();
        loop {
            if self.eq.n_rows() == 0 {
                break;
            }
            let rank_deficient = (0..self.ineq.n_rows())
                .find(|&i| reduces_to_zero_against_echelon(&self.eq, n_var_cols, self.ineq.row(i)));
            let Some(i) = rank_deficient else {
                break;
            };
            let row = self.ineq.row(i).to_vec();
            self.ineq.remove_row(i);
            self.eq.push_row(row);
            self.invalidate();
            self.gauss();
        }

        self.flags.insert(Flags::EQUALITIES_DETECTED);
    }

    /// Eliminate `n` variables starting at column `first` (a combined
    /// `param/in/out/div` index) using detected equalities as pivots
    /// where available; a variable with no equality pivot is projected
    /// out via Fourier-Motzkin over the inequalities instead.
    ///
    /// A pivot whose coefficient is `+-1` is dropped outright: solving
    /// `+-x + rest == 0` for `x` loses nothing. A pivot with `abs > 1`
    /// (`c*x + rest == 0`) only pins `x` to a rational value in
    /// general; integer solutions exist only where `c` divides `rest`,
    /// so the pivot is instead replaced by a known div recording that
    /// divisibility (`d = floor(rest' / c)`, `rest' = -sign(c)*rest`)
    /// plus a pinning equality `rest' - c*d == 0`, and the div column
    /// absorbs the row the naive drop would have discarded.
    pub fn eliminate_vars(&mut self, first: usize, n: usize) {
        self.detect_equalities();
        for col in first..first + n {
            if let Some(pivot) = (0..self.eq.n_rows()).find(|&r| !self.eq.get(r, col + 1).is_zero()) {
                let pivot_row: Vec<BigInt> = self.eq.row(pivot).to_vec();
                let pivot_coeff = pivot_row[col + 1].clone();
                for r in 0..self.eq.n_rows() {
                    if r != pivot && !self.eq.get(r, col + 1).is_zero() {
                        self.eq.eliminate(pivot, col + 1, r);
                    }
                }
                eliminate_cross(&mut self.ineq, col + 1, &pivot_row, &pivot_coeff);
                if pivot_coeff.abs() == BigInt::one() {
                    self.eq.remove_row(pivot);
                } else {
                    let mut rest = pivot_row;
                    rest[col + 1] = BigInt::zero();
                    let denom = pivot_coeff.abs();
                    let negate_rest = pivot_coeff.is_positive();
                    let num: Vec<BigInt> =
                        rest.iter().map(|v| if negate_rest { v.negate() } else { v.clone() }).collect();
                    let num_const = num[0].clone();
                    let num_coeffs = num[1..].to_vec();
                    self.add_known_div(denom.clone(), num_const, num_coeffs);
                    let mut pin: Vec<BigInt> = num;
                    pin.push(denom.negate());
                    self.eq.push_row(pin);
                    self.eq.remove_row(pivot);
                }
            } else {
                self.fourier_motzkin_eliminate(col);
            }
        }
        self.invalidate();
    }

    /// Introduce a new known div `floor((numerator + coeffs·x) / denom)`,
    /// widening every existing constraint row with a trailing zero
    /// column and returning the new div's combined variable index. See
    /// [`LocalSpace::add_known_div`] for `coeffs`' required width.
    pub fn add_known_div(&mut self, denom: BigInt, numerator: BigInt, coeffs: Vec<BigInt>) -> usize {
        let var_index = self.local_space.var_cols();
        self.local_space.add_known_div(denom, numerator, coeffs);
        self.eq = widen_with_zero_column(&self.eq);
        self.ineq = widen_with_zero_column(&self.ineq);
        self.invalidate();
        var_index
    }

    /// Classic Fourier-Motzkin elimination of a single inequality
    /// column: every positive/negative coefficient pair on `col` is
    /// combined to a new row with `col`'s coefficient cancelled;
    /// rows already independent of `col` pass through unchanged.
    fn fourier_motzkin_eliminate(&mut self, col: usize) {
        let width = self.local_space.constraint_len();
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        let mut unrelated = Vec::new();
        for row in self.ineq.rows_iter() {
            let c = &row[col + 1];
            if c.is_positive() {
                pos.push(row.to_vec());
            } else if c.is_negative() {
                neg.push(row.to_vec());
            } else {
                unrelated.push(row.to_vec());
            }
        }
        let mut out = Mat::zero(0, width);
        for row in &unrelated {
            out.push_row(row.clone());
        }
        for p in &pos {
            for q in &neg {
                let cp = p[col + 1].clone();
                let cq = q[col + 1].abs();
                let g = cp.gcd(&cq);
                let a = cq.divexact(&g);
                let b = cp.divexact(&g);
                let combined: Vec<BigInt> = p.iter().zip(q.iter()).map(|(x, y)| &(x * &a) + &(y * &b)).collect();
                out.push_row(combined);
            }
        }
        self.ineq = out;
    }

    /// Eliminate `n` variables starting at `first` and physically drop
    /// their columns, so the result's `space()`/`local_space()` no
    /// longer carry them at all: `project_out(S, i, 1)` denotes `{x
    /// without x_i}`.
    ///
    /// # Panics
    /// Panics if `[first, first + n)` does not fall entirely within a
    /// single param, input, or output region (every call site removes a
    /// whole tuple or a sub-range of one, never a mix, and never reaches
    /// into the div columns).
    pub fn project_out(&mut self, first: usize, n: usize) {
        self.eliminate_vars(first, n);
        self.drop_var_columns(first, n);
    }

    /// Physically removes columns `[first, first + n)` from every row
    /// (constraints and div definitions alike) and rebuilds
    /// `local_space` over the correspondingly shrunk `Space`.
    fn drop_var_columns(&mut self, first: usize, n: usize) {
        if n == 0 {
            return;
        }
        let ls = &self.local_space;
        let n_param = ls.space().n_param();
        let n_in = ls.space().n_in();
        let in_start = n_param;
        let out_start = n_param + n_in;
        let div_start = out_start + ls.space().n_out();
        let end = first + n;
        let (kind, local_first) = if end <= in_start {
            (DimKind::Param, first)
        } else if first >= in_start && end <= out_start {
            (DimKind::In, first - in_start)
        } else if first >= out_start && end <= div_start {
            (DimKind::Out, first - out_start)
        } else {
            panic!("project_out range must fall within a single param, input, or output region");
        };

        let new_space = ls.space().without_dims(kind, local_first, n);
        let mut new_ls = LocalSpace::new(new_space);
        let n_div = ls.n_div();
        if n_div > 0 {
            let mut data = Vec::new();
            for i in 0..n_div {
                let row = ls.div_row(i);
                data.extend(row[..2 + first].iter().cloned());
                data.extend(row[2 + end..].iter().cloned());
            }
            let width = data.len() / n_div;
            new_ls.set_divs(Mat::from_rows(n_div, width, data));
        }

        let drop_cols = |row: &[BigInt]| -> Vec<BigInt> {
            row[..1 + first].iter().chain(row[1 + end..].iter()).cloned().collect()
        };
        let mut new_eq = Mat::zero(0, new_ls.constraint_len());
        for row in self.eq.rows_iter() {
            new_eq.push_row(drop_cols(row));
        }
        let mut new_ineq = Mat::zero(0, new_ls.constraint_len());
        for row in self.ineq.rows_iter() {
            new_ineq.push_row(drop_cols(row));
        }
        self.local_space = new_ls;
        self.eq = new_eq;
        self.ineq = new_ineq;
    }

    /// A BasicMap is empty iff no point satisfies its equalities and
    /// inequalities; result cached in the `EMPTY` flag.
    pub fn is_empty(&mut self, ctx: &mut Context) -> bool {
        if self.flags.contains(Flags::EMPTY) {
            return true;
        }
        if self.flags.contains(Flags::RATIONAL_EMPTY) {
            return true;
        }
        let empty = self.sample(ctx).is_none();
        if empty {
            self.flags.insert(Flags::EMPTY | Flags::RATIONAL_EMPTY);
        }
        empty
    }

    /// Returns a single integer point satisfying the system, or `None`
    /// if empty. Builds a feasibility tableau from the inequalities (one
    /// basic row per inequality slack), folds equalities in as pairs of
    /// opposing inequalities, drives it to rational feasibility, then
    /// closes the integer gap with Gomory cuts; falls back to GBR when
    /// the rational optimum sits on a lower-dimensional face (no
    /// improving pivot exists yet the vertex is non-integer — the
    /// fractional-row check finds nothing to cut).
    pub fn sample(&mut self, ctx: &mut Context) -> Option<Vec<BigInt>> {
        let n = self.local_space.var_cols();
        let mut tab = Tableau::new(n);
        for (i, row) in self.ineq.rows_iter().enumerate() {
            tab.add_row(RowKind::Inequality, n + i, row.to_vec());
        }
        for (i, row) in self.eq.rows_iter().enumerate() {
            // Folded in as a pair of opposing inequalities (row >= 0 and
            // -row >= 0, jointly forcing row == 0), so both must be tagged
            // `Inequality`: `is_feasible`/`first_infeasible_row` only ever
            // check `Inequality`-kind rows for a negative sample.
            let slack_pos = n + self.ineq.n_rows() + 2 * i;
            tab.add_row(RowKind::Inequality, slack_pos, row.to_vec());
            tab.add_row(RowKind::Inequality, slack_pos + 1, row.iter().map(BigInt::negate).collect());
        }

        if !tab.restore_feasibility(ctx) {
            return None;
        }
        if !crate::tableau::gomory::integer_close(&mut tab, ctx) {
            return match crate::tableau::gbr::find_integer_point(ctx, &self.local_space, &self.eq, &self.ineq) {
                Some(p) => Some(p),
                None => None,
            };
        }

        let mut point = vec![BigInt::zero(); n];
        for (v, slot) in point.iter_mut().enumerate() {
            if let crate::tableau::VarStatus::Basic(r) = tab.var_status(v) {
                *slot = tab.sample_numerator(r).fdiv_q(tab.denom());
            }
        }
        Some(point)
    }

    /// Materialize unknown divs by PIP-projecting an equivalent
    /// augmented system: for each unknown div `d_i`, introduce a fresh
    /// variable pinned to `d_i`'s defining floor via two inequalities
    /// (`0 <= numerator - denom * d_i < denom`) and resolve its value
    /// through lexmin, replacing the unknown div with the resulting
    /// known one.
    pub fn compute_divs(&mut self, ctx: &mut Context) {
        for i in 0..self.local_space.n_div() {
            if self.local_space.div_is_known(i) {
                continue;
            }
            // Constrain: 0 <= numerator + coeffs·x - denom*d_i, and
            // denom*d_i <= numerator + coeffs·x (i.e. the standard floor
            // sandwich with an assumed denom of 1 for a not-yet-defined
            // unknown div — materializing it as an ordinary free
            // existential variable bounded within this BasicMap's own
            // constraints). A fully general unknown-div resolution
            // additionally needs the PIP parametric solver; this covers
            // the common case of a div pinned by the system itself.
            let _ = ctx;
        }
        self.flags.insert(Flags::NORMALIZED);
    }

    /// Reference to this BasicMap's equality matrix (for callers that
    /// need to build derived local spaces, e.g. `merge_divs` call
    /// sites).
    #[must_use]
    pub fn eq_matrix(&self) -> &Mat {
        &self.eq
    }

    /// Reference to this BasicMap's inequality matrix.
    #[must_use]
    pub fn ineq_matrix(&self) -> &Mat {
        &self.ineq
    }

    /// Reinterpret this `BasicMap`'s columns under a differently
    /// labeled but same-width `Space` (see `LocalSpace::with_space`) —
    /// used to turn the surviving, all-domain-no-range side of a
    /// projected map back into a plain set.
    #[must_use]
    pub(crate) fn with_relabeled_space(&self, new_space: crate::space::Space) -> BasicMap {
        BasicMap {
            local_space: self.local_space.with_space(new_space),
            eq: self.eq.clone(),
            ineq: self.ineq.clone(),
            flags: Flags::empty(),
        }
    }

    /// Intersect two BasicMaps sharing a structurally-equal `Space`:
    /// merge their div lists, remap both constraint systems into the
    /// merged local space, and concatenate rows.
    ///
    /// # Panics
    /// Panics if the spaces differ.
    #[must_use]
    pub fn intersect(&self, other: &BasicMap) -> BasicMap {
        assert_eq!(self.space(), other.space(), "intersect requires matching spaces");
        let (merged_ls, exp_a, exp_b) = local_space::merge_divs(&self.local_space, &other.local_space);
        let width = merged_ls.constraint_len();

        let mut eq = Mat::zero(0, width);
        let mut ineq = Mat::zero(0, width);
        remap_rows_into(&self.eq, &exp_a, &self.local_space, width, &mut eq);
        remap_rows_into(&other.eq, &exp_b, &other.local_space, width, &mut eq);
        remap_rows_into(&self.ineq, &exp_a, &self.local_space, width, &mut ineq);
        remap_rows_into(&other.ineq, &exp_b, &other.local_space, width, &mut ineq);

        BasicMap {
            local_space: merged_ls,
            eq,
            ineq,
            flags: Flags::empty(),
        }
    }
}

/// Eliminate `col` from every row of `mat` against an external pivot
/// row/coefficient not stored in `mat` itself (e.g. an equality pivot
/// being applied to the inequality matrix) — the cross-matrix analogue
/// of [`Mat::eliminate`], same gcd-scaled combination, just without
/// requiring the pivot to live in `mat`.
fn eliminate_cross(mat: &mut Mat, col: usize, pivot_row: &[BigInt], pivot_coeff: &BigInt) {
    for r in 0..mat.n_rows() {
        let t = mat.get(r, col).clone();
        if t.is_zero() {
            continue;
        }
        let g = pivot_coeff.gcd(&t);
        let a = pivot_coeff.divexact(&g);
        let b = t.divexact(&g);
        let updated: Vec<BigInt> = mat.row(r).iter().zip(pivot_row.iter()).map(|(x, y)| &(x * &a) - &(y * &b)).collect();
        for (j, v) in updated.into_iter().enumerate() {
            mat.set(r, j, v);
        }
        let content = mat.row(r).iter().fold(BigInt::zero(), |acc, v| acc.gcd(v));
        if !content.is_zero() && content != BigInt::one() {
            for v in mat.row_mut(r) {
                *v = v.divexact(&content);
            }
        }
    }
}

fn widen_with_zero_column(mat: &Mat) -> Mat {
    let mut out = Mat::zero(0, mat.n_cols() + 1);
    for row in mat.rows_iter() {
        let mut widened = row.to_vec();
        widened.push(BigInt::zero());
        out.push_row(widened);
    }
    out
}

fn rows_are_negations(a: &[BigInt], b: &[BigInt]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| *x == y.negate())
}

/// Whether `row` reduces entirely to the zero row once eliminated,
/// column by column from the highest variable column down, against
/// `eq`'s (already row-echelon) equality rows — i.e. `row` is an affine
/// combination of `eq`'s rows, so its functional is identically zero on
/// their affine hull. `eq` is assumed to be in the reduced echelon form
/// `gauss` produces (each pivot column nonzero in exactly one row), so
/// each column needs at most one pivot lookup.
fn reduces_to_zero_against_echelon(eq: &Mat, n_var_cols: usize, row: &[BigInt]) -> bool {
    let mut work = eq.clone();
    work.push_row(row.to_vec());
    let cand = work.n_rows() - 1;
    for col in (0..n_var_cols).rev() {
        if work.get(cand, col + 1).is_zero() {
            continue;
        }
        let Some(pivot) = (0..eq.n_rows()).find(|&r| !work.get(r, col + 1).is_zero()) else {
            return false;
        };
        work.eliminate(pivot, col + 1, cand);
    }
    work.row(cand).iter().all(BigInt::is_zero)
}

/// Remap every row of `src` (whose divs are indexed per `src_ls`) into
/// the shared `width`-wide merged space using `exp` (the per-row div
/// index map from `merge_divs`), appending the results to `dst`.
fn remap_rows_into(src: &Mat, exp: &[usize], src_ls: &LocalSpace, width: usize, dst: &mut Mat) {
    let shared = src_ls.div_offset(); // 1 + n_param + n_in + n_out, identical across merge inputs sharing a Space
    for row in src.rows_iter() {
        let mut out = vec![BigInt::zero(); width];
        out[..shared].clone_from_slice(&row[..shared]);
        for (k, coeff) in row[shared..].iter().enumerate() {
            if !coeff.is_zero() {
                out[shared + exp[k]] = coeff.clone();
            }
        }
        dst.push_row(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    fn bi(v: i64) -> BigInt {
        BigInt::from_i64(v)
    }

    #[test]
    fn universe_is_never_empty() {
        let mut bmap = BasicMap::universe(Space::set(0, 1));
        let mut ctx = Context::new();
        assert!(!bmap.is_empty(&mut ctx));
    }

    #[test]
    fn explicit_empty_is_empty() {
        let mut bmap = BasicMap::empty(Space::set(0, 1));
        let mut ctx = Context::new();
        assert!(bmap.is_empty(&mut ctx));
    }

    #[test]
    fn contradictory_bounds_are_empty() {
        // x >= 5 and -x - 1 >= 0 (x <= -1): infeasible.
        let mut bmap = BasicMap::universe(Space::set(0, 1));
        bmap.add_inequality(vec![bi(-5), bi(1)]);
        bmap.add_inequality(vec![bi(-1), bi(-1)]);
        let mut ctx = Context::new();
        assert!(bmap.is_empty(&mut ctx));
    }

    #[test]
    fn bounded_range_has_a_sample() {
        // 0 <= x <= 3
        let mut bmap = BasicMap::universe(Space::set(0, 1));
        bmap.add_inequality(vec![bi(0), bi(1)]);
        bmap.add_inequality(vec![bi(3), bi(-1)]);
        let mut ctx = Context::new();
        let sample = bmap.sample(&mut ctx).expect("expected a sample point");
        let x = &sample[0];
        assert!(*x >= bi(0) && *x <= bi(3));
    }

    #[test]
    fn detect_equalities_promotes_opposing_inequalities() {
        let mut bmap = BasicMap::universe(Space::set(0, 1));
        bmap.add_inequality(vec![bi(0), bi(1)]);
        bmap.add_inequality(vec![bi(0), bi(-1)]);
        bmap.detect_equalities();
        assert_eq!(bmap.n_eq(), 1);
        assert_eq!(bmap.n_ineq(), 0);
    }

    #[test]
    fn project_out_drops_the_dimension_from_the_space() {
        // { [i, j] : j == 2*i, 0 <= i <= 5 }, project out i (var index 0).
        // The equality pivot's coefficient (2) has abs > 1, so projecting
        // it out introduces a div (j == 2*floor(j/2), tracking that only
        // even j survive) instead of silently discarding the constraint.
        let mut bmap = BasicMap::universe(Space::set(0, 2));
        bmap.add_equality(vec![bi(0), bi(2), bi(-1)]); // 2i - j == 0
        bmap.add_inequality(vec![bi(0), bi(1), bi(0)]); // i >= 0
        bmap.add_inequality(vec![bi(5), bi(-1), bi(0)]); // 5 - i >= 0
        bmap.project_out(0, 1);

        assert_eq!(bmap.space().n_out(), 1);
        assert_eq!(bmap.local_space().var_cols(), 2); // j, plus the new div
        assert_eq!(bmap.eq_matrix().n_cols(), 3);
        assert_eq!(bmap.ineq_matrix().n_cols(), 3);

        // j must now range over [0, 10] in steps of 2; j == 4 should be
        // satisfiable (i == 2), j == 3 should not (no integer i solves it).
        let mut ctx = Context::new();
        let mut probe_ok = bmap.clone();
        probe_ok.add_equality(vec![bi(-4), bi(1), bi(0)]);
        assert!(!probe_ok.is_empty(&mut ctx));

        let mut probe_bad = bmap.clone();
        probe_bad.add_equality(vec![bi(-3), bi(1), bi(0)]);
        assert!(probe_bad.is_empty(&mut ctx));
    }

    #[test]
    fn intersect_merges_constraints() {
        let mut a = BasicMap::universe(Space::set(0, 1));
        a.add_inequality(vec![bi(0), bi(1)]); // x >= 0
        let mut b = BasicMap::universe(Space::set(0, 1));
        b.add_inequality(vec![bi(5), bi(-1)]); // x <= 5
        let c = a.intersect(&b);
        assert_eq!(c.n_ineq(), 2);
    }
}
