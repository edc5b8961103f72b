//! Dense, refcounted, copy-on-write integer matrix with in-place row
//! operations — the fundamental storage unit for constraint systems and
//! div-definition rows (spec.md §3).

use std::rc::Rc;

use presburger_bigint::BigInt;

#[derive(Debug, Clone, PartialEq, Eq)]
struct MatInner {
    rows: usize,
    cols: usize,
    data: Vec<BigInt>,
}

/// A dense `rows x cols` matrix of [`BigInt`], refcounted with
/// copy-on-write mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mat(Rc<MatInner>);

impl Mat {
    /// An all-zero `rows x cols` matrix.
    #[must_use]
    pub fn zero(rows: usize, cols: usize) -> Self {
        Mat(Rc::new(MatInner {
            rows,
            cols,
            data: vec![BigInt::zero(); rows * cols],
        }))
    }

    /// Build from row-major data.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    #[must_use]
    pub fn from_rows(rows: usize, cols: usize, data: Vec<BigInt>) -> Self {
        assert_eq!(data.len(), rows * cols, "row/col count does not match data length");
        Mat(Rc::new(MatInner { rows, cols, data }))
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.0.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.0.cols
    }

    /// Read a single row as a slice.
    #[must_use]
    pub fn row(&self, i: usize) -> &[BigInt] {
        let cols = self.0.cols;
        &self.0.data[i * cols..(i + 1) * cols]
    }

    /// Read a single entry.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> &BigInt {
        &self.0.data[i * self.0.cols + j]
    }

    fn inner_mut(&mut self) -> &mut MatInner {
        Rc::make_mut(&mut self.0)
    }

    /// Write a single entry, cloning the backing storage first if shared.
    pub fn set(&mut self, i: usize, j: usize, v: BigInt) {
        let cols = self.n_cols();
        self.inner_mut().data[i * cols + j] = v;
    }

    /// Mutable access to one row, cloning the backing storage first if
    /// shared.
    pub fn row_mut(&mut self, i: usize) -> &mut [BigInt] {
        let cols = self.n_cols();
        &mut self.inner_mut().data[i * cols..(i + 1) * cols]
    }

    /// Append a row. The row's length must equal `n_cols()`.
    ///
    /// # Panics
    /// Panics if `row.len() != n_cols()` (except when the matrix has no
    /// columns yet, in which case the column count is adopted from
    /// `row`).
    pub fn push_row(&mut self, row: Vec<BigInt>) {
        let inner = self.inner_mut();
        if inner.cols == 0 && inner.rows == 0 {
            inner.cols = row.len();
        } else {
            assert_eq!(row.len(), inner.cols, "row width mismatch");
        }
        inner.data.extend(row);
        inner.rows += 1;
    }

    /// Remove the row at `i`, shifting later rows up.
    ///
    /// # Panics
    /// Panics if `i >= n_rows()`.
    pub fn remove_row(&mut self, i: usize) {
        let cols = self.n_cols();
        let inner = self.inner_mut();
        assert!(i < inner.rows, "row index out of range");
        inner.data.drain(i * cols..(i + 1) * cols);
        inner.rows -= 1;
    }

    /// Swap two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.n_cols();
        let inner = self.inner_mut();
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (left, right) = inner.data.split_at_mut(hi * cols);
        left[lo * cols..(lo + 1) * cols].swap_with_slice(&mut right[0..cols]);
    }

    /// Multiply every entry of row `i` by `factor` in place.
    pub fn scale_row(&mut self, i: usize, factor: &BigInt) {
        for v in self.row_mut(i) {
            *v *= factor;
        }
    }

    /// `row[dst] = a * row[dst] + b * row[src]` in place, `dst != src`.
    ///
    /// # Panics
    /// Panics if `dst == src`.
    pub fn combine_rows(&mut self, dst: usize, a: &BigInt, src: usize, b: &BigInt) {
        assert_ne!(dst, src, "combine_rows requires distinct rows");
        let cols = self.n_cols();
        let inner = self.inner_mut();
        let (lo, hi) = if dst < src { (dst, src) } else { (src, dst) };
        let (left, right) = inner.data.split_at_mut(hi * cols);
        let lo_row = &mut left[lo * cols..(lo + 1) * cols];
        let hi_row = &mut right[0..cols];
        let (dst_row, src_row): (&mut [BigInt], &[BigInt]) = if dst < src {
            (lo_row, hi_row)
        } else {
            (hi_row, lo_row)
        };
        for (d, s) in dst_row.iter_mut().zip(src_row.iter()) {
            *d = &*d * a + s * b;
        }
    }

    /// Eliminate column `col` from row `target` using row `pivot` as the
    /// pivot, without introducing fractions: with `p = pivot[col]`,
    /// `t = target[col]`, `g = gcd(p, t)`, replace
    /// `target := (p/g) * target - (t/g) * pivot`.
    ///
    /// This is the Hermite-style integer elimination step used by
    /// `gauss`/`detect_equalities`; it is a no-op if `target[col]` is
    /// already zero.
    ///
    /// # Panics
    /// Panics if `pivot == target` or if `pivot[col]` is zero.
    pub fn eliminate(&mut self, pivot: usize, col: usize, target: usize) {
        assert_ne!(pivot, target, "eliminate requires distinct rows");
        let p = self.get(pivot, col).clone();
        let t = self.get(target, col).clone();
        assert!(!p.is_zero(), "eliminate requires a nonzero pivot entry");
        if t.is_zero() {
            return;
        }
        let g = p.gcd(&t);
        let a = p.divexact(&g);
        let b = t.divexact(&g);
        self.combine_rows(target, &a, pivot, &b.negate());
        // Normalize to keep coefficients from growing unboundedly: divide
        // the updated row by the gcd of its own entries.
        let content = self.row(target).iter().fold(BigInt::zero(), |acc, v| acc.gcd(v));
        if !content.is_zero() && content != BigInt::one() {
            self.scale_row_divide(target, &content);
        }
    }

    fn scale_row_divide(&mut self, i: usize, d: &BigInt) {
        for v in self.row_mut(i) {
            *v = v.divexact(d);
        }
    }

    /// Iterate over all rows.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[BigInt]> {
        (0..self.n_rows()).map(move |i| self.row(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of(vals: &[i64]) -> Vec<BigInt> {
        vals.iter().map(|&v| BigInt::from_i64(v)).collect()
    }

    #[test]
    fn combine_rows_matches_hand_computation() {
        let mut m = Mat::from_rows(2, 2, vec![
            BigInt::from_i64(1), BigInt::from_i64(2),
            BigInt::from_i64(3), BigInt::from_i64(4),
        ]);
        // row0 = 1*row0 + 2*row1 = [1+6, 2+8] = [7, 10]
        m.combine_rows(0, &BigInt::one(), 1, &BigInt::from_i64(2));
        assert_eq!(m.row(0), row_of(&[7, 10]).as_slice());
        assert_eq!(m.row(1), row_of(&[3, 4]).as_slice());
    }

    #[test]
    fn eliminate_zeroes_target_column() {
        let mut m = Mat::from_rows(2, 2, vec![
            BigInt::from_i64(2), BigInt::from_i64(3),
            BigInt::from_i64(4), BigInt::from_i64(5),
        ]);
        m.eliminate(0, 0, 1);
        assert_eq!(m.get(1, 0), &BigInt::zero());
    }

    #[test]
    fn cow_on_clone() {
        let a = Mat::from_rows(1, 2, row_of(&[1, 2]));
        let mut b = a.clone();
        b.set(0, 0, BigInt::from_i64(99));
        assert_eq!(a.get(0, 0), &BigInt::from_i64(1));
        assert_eq!(b.get(0, 0), &BigInt::from_i64(99));
    }
}
