//! Dense, refcounted, copy-on-write integer vector.

use std::ops::Index;
use std::rc::Rc;

use presburger_bigint::BigInt;

/// A fixed-length, refcounted, copy-on-write sequence of [`BigInt`].
///
/// Generalizes the teacher's `Arc<Expr>` sharing discipline (cheap clone,
/// mutate-in-place only when uniquely owned) to a flat numeric buffer:
/// this is `isl_vec`'s Rust analogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVec(Rc<Vec<BigInt>>);

impl IntVec {
    /// A vector of `len` zeros.
    #[must_use]
    pub fn zero(len: usize) -> Self {
        IntVec(Rc::new(vec![BigInt::zero(); len]))
    }

    /// Build from an owned `Vec<BigInt>`.
    #[must_use]
    pub fn from_vec(v: Vec<BigInt>) -> Self {
        IntVec(Rc::new(v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if this vector has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read-only slice access.
    #[must_use]
    pub fn as_slice(&self) -> &[BigInt] {
        &self.0
    }

    /// `true` if every entry is zero.
    #[must_use]
    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(BigInt::is_zero)
    }

    /// Mutable access, cloning the backing storage first if it is shared
    /// (refcount > 1). This is the vector-level copy-on-write primitive.
    pub fn make_mut(&mut self) -> &mut Vec<BigInt> {
        Rc::make_mut(&mut self.0)
    }

    /// Divide every entry by `d` (exact division; `d` must divide every
    /// entry, typically their gcd).
    #[must_use]
    pub fn scaled_down(&self, d: &BigInt) -> Self {
        IntVec::from_vec(self.0.iter().map(|v| v.divexact(d)).collect())
    }

    /// The gcd of all (nonzero) entries, or zero if the vector is all
    /// zero.
    #[must_use]
    pub fn content(&self) -> BigInt {
        self.0.iter().fold(BigInt::zero(), |g, v| g.gcd(v))
    }

    /// Normalize by dividing through by the gcd of all entries (no-op if
    /// the vector is all-zero or the gcd is already 1).
    #[must_use]
    pub fn normalized(&self) -> Self {
        let g = self.content();
        if g.is_zero() || g == BigInt::one() {
            self.clone()
        } else {
            self.scaled_down(&g)
        }
    }

    /// Dot product of two equal-length vectors.
    ///
    /// # Panics
    /// Panics if lengths differ.
    #[must_use]
    pub fn dot(&self, other: &Self) -> BigInt {
        assert_eq!(self.len(), other.len(), "dot product length mismatch");
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(BigInt::zero(), |acc, (a, b)| acc + a * b)
    }
}

impl Index<usize> for IntVec {
    type Output = BigInt;
    fn index(&self, idx: usize) -> &BigInt {
        &self.0[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cow_clones_only_when_shared() {
        let a = IntVec::from_vec(vec![BigInt::from_i64(1), BigInt::from_i64(2)]);
        let mut b = a.clone();
        b.make_mut()[0] = BigInt::from_i64(9);
        assert_eq!(a[0], BigInt::from_i64(1));
        assert_eq!(b[0], BigInt::from_i64(9));
    }

    #[test]
    fn normalized_divides_by_content() {
        let v = IntVec::from_vec(vec![BigInt::from_i64(4), BigInt::from_i64(6), BigInt::from_i64(-2)]);
        let n = v.normalized();
        assert_eq!(n.as_slice(), &[BigInt::from_i64(2), BigInt::from_i64(3), BigInt::from_i64(-1)]);
    }
}
