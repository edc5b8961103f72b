//! Multivariate quasi-polynomials over a [`LocalSpace`], and their
//! piecewise and min/max-fold generalizations.
//!
//! A [`QPolynomial`] is a sparse sum of monomials, each a product of
//! variable powers with an integer (rational, via a shared denominator)
//! coefficient — the representation used for counting and bound
//! computations (Ehrhart quasi-polynomials, Bernstein bound
//! expansions).

use std::collections::BTreeMap;

use presburger_bigint::BigInt;

use crate::basic_map::BasicSet;
use crate::ctx::options::BoundAlgorithm;
use crate::ctx::Context;
use crate::local_space::LocalSpace;
use crate::set::Set;

/// A monomial's exponent vector: one power per variable column of the
/// owning `LocalSpace` (`params, in, out, divs`).
pub type Exponents = Vec<u32>;

/// A sparse multivariate polynomial `sum(coeff_e * prod(x_i^e_i)) /
/// denom` over a `LocalSpace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QPolynomial {
    local_space: LocalSpace,
    denom: BigInt,
    terms: BTreeMap<Exponents, BigInt>,
}

impl QPolynomial {
    /// The zero polynomial.
    #[must_use]
    pub fn zero(local_space: LocalSpace) -> Self {
        QPolynomial {
            local_space,
            denom: BigInt::one(),
            terms: BTreeMap::new(),
        }
    }

    /// The constant polynomial `k`.
    #[must_use]
    pub fn constant(local_space: LocalSpace, k: BigInt) -> Self {
        let mut p = QPolynomial::zero(local_space);
        if !k.is_zero() {
            let zero_exp = vec![0u32; p.local_space.var_cols()];
            p.terms.insert(zero_exp, k);
        }
        p
    }

    /// The monomial `x_{var_index}^1`.
    #[must_use]
    pub fn var(local_space: LocalSpace, var_index: usize) -> Self {
        let mut exp = vec![0u32; local_space.var_cols()];
        exp[var_index] = 1;
        let mut p = QPolynomial::zero(local_space);
        p.terms.insert(exp, BigInt::one());
        p
    }

    #[must_use]
    pub fn local_space(&self) -> &LocalSpace {
        &self.local_space
    }

    #[must_use]
    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    #[must_use]
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    fn add_term(&mut self, exp: Exponents, coeff: BigInt) {
        if coeff.is_zero() {
            return;
        }
        self.terms
            .entry(exp)
            .and_modify(|c| {
                *c = &*c + &coeff;
            })
            .or_insert(coeff);
        self.terms.retain(|_, c| !c.is_zero());
    }

    /// `self + other`, over the same local space.
    ///
    /// # Panics
    /// Panics if the local spaces differ.
    #[must_use]
    pub fn add(&self, other: &QPolynomial) -> Self {
        assert_eq!(self.local_space, other.local_space, "qpolynomial local spaces must match");
        let d = &self.denom * &other.denom;
        let mut out = QPolynomial {
            local_space: self.local_space.clone(),
            denom: d.clone(),
            terms: BTreeMap::new(),
        };
        for (exp, c) in &self.terms {
            out.add_term(exp.clone(), c * &other.denom);
        }
        for (exp, c) in &other.terms {
            out.add_term(exp.clone(), c * &self.denom);
        }
        out.reduce();
        out
    }

    /// `self * other`, over the same local space.
    ///
    /// # Panics
    /// Panics if the local spaces differ.
    #[must_use]
    pub fn mul(&self, other: &QPolynomial) -> Self {
        assert_eq!(self.local_space, other.local_space, "qpolynomial local spaces must match");
        let mut out = QPolynomial {
            local_space: self.local_space.clone(),
            denom: &self.denom * &other.denom,
            terms: BTreeMap::new(),
        };
        for (ea, ca) in &self.terms {
            for (eb, cb) in &other.terms {
                let exp: Exponents = ea.iter().zip(eb.iter()).map(|(x, y)| x + y).collect();
                out.add_term(exp, ca * cb);
            }
        }
        out.reduce();
        out
    }

    /// Divide every coefficient and the denominator by their common
    /// gcd.
    fn reduce(&mut self) {
        let mut g = self.denom.clone();
        for c in self.terms.values() {
            g = g.gcd(c);
        }
        if g.is_zero() || g == BigInt::one() {
            return;
        }
        self.denom = self.denom.divexact(&g);
        for c in self.terms.values_mut() {
            *c = c.divexact(&g);
        }
    }

    /// Evaluate at a full point, returning `(numerator, denom)`.
    ///
    /// # Panics
    /// Panics on a length mismatch.
    #[must_use]
    pub fn eval(&self, point: &[BigInt]) -> (BigInt, BigInt) {
        assert_eq!(point.len(), self.local_space.var_cols(), "qpolynomial eval point has wrong width");
        let mut acc = BigInt::zero();
        for (exp, c) in &self.terms {
            let mut term = c.clone();
            for (&e, x) in exp.iter().zip(point.iter()) {
                for _ in 0..e {
                    term = &term * x;
                }
            }
            acc = acc + term;
        }
        (acc, self.denom.clone())
    }

    /// The variable columns that appear with a nonzero exponent in some
    /// term, in ascending order.
    fn used_vars(&self) -> Vec<usize> {
        let n = self.local_space.var_cols();
        let mut used = vec![false; n];
        for exp in self.terms.keys() {
            for (i, &e) in exp.iter().enumerate() {
                if e > 0 {
                    used[i] = true;
                }
            }
        }
        (0..n).filter(|&i| used[i]).collect()
    }

    /// A safe (possibly loose) lower or upper bound of this polynomial
    /// over `domain`'s integer points, computed by the "range" algorithm
    /// (spec.md's `ctx::options::BoundAlgorithm`): drive each variable
    /// that actually occurs to its rational extremes over each disjunct,
    /// then propagate those intervals up through the monomial sum. The
    /// rational relaxation is safe because it can only widen, never miss,
    /// the true integer range. Bernstein basis expansion (the other
    /// `BoundAlgorithm` variant, per `original_source/isl_bound.c`) is
    /// not implemented and also runs the range algorithm.
    ///
    /// Returns `None` if `domain` is empty, if `domain` has no disjuncts,
    /// or if the polynomial is unbounded in the requested direction.
    ///
    /// # Panics
    /// Panics if a disjunct of `domain` does not share this polynomial's
    /// local space exactly (same params, in/out dims, and divs).
    #[must_use]
    pub fn bound(&self, domain: &Set, kind: FoldKind, ctx: &mut Context) -> Option<QPolynomial> {
        match ctx.options().bound {
            BoundAlgorithm::Range | BoundAlgorithm::Bernstein => {}
        }
        let used = self.used_vars();
        let mut overall: Option<Rat> = None;
        for bset in domain.basic_maps() {
            let (lo, hi) = self.bound_over_basic_set(bset, &used, ctx)?;
            let candidate = match kind {
                FoldKind::Min => lo,
                FoldKind::Max => hi,
            };
            overall = Some(match overall {
                None => candidate,
                Some(acc) => match kind {
                    FoldKind::Min => acc.min(candidate),
                    FoldKind::Max => acc.max(candidate),
                },
            });
        }
        Some(QPolynomial::from_rat(self.local_space.clone(), overall?))
    }

    /// This polynomial's exact rational interval over one disjunct:
    /// propagate each used variable's rational box from the disjunct's
    /// constraints, then push those intervals through the monomial sum
    /// via interval arithmetic.
    fn bound_over_basic_set(&self, bset: &BasicSet, used: &[usize], _ctx: &mut Context) -> Option<(Rat, Rat)> {
        assert_eq!(*bset.local_space(), self.local_space, "bound domain must share this polynomial's local space");

        let boxes = propagate_var_boxes(bset);
        let mut lo_of = BTreeMap::new();
        let mut hi_of = BTreeMap::new();
        for &v in used {
            lo_of.insert(v, boxes[v].lo.clone()?);
            hi_of.insert(v, boxes[v].hi.clone()?);
        }

        let mut total_lo = Rat::zero();
        let mut total_hi = Rat::zero();
        for (exp, coeff) in &self.terms {
            let mut term_lo = Rat::from_bigint(coeff.clone());
            let mut term_hi = term_lo.clone();
            for (i, &e) in exp.iter().enumerate() {
                if e == 0 {
                    continue;
                }
                let var_iv = (lo_of[&i].clone(), hi_of[&i].clone());
                let (p_lo, p_hi) = interval_pow(&var_iv, e);
                let (m_lo, m_hi) = interval_mul(&(term_lo, term_hi), &(p_lo, p_hi));
                term_lo = m_lo;
                term_hi = m_hi;
            }
            total_lo = total_lo.add(&term_lo);
            total_hi = total_hi.add(&term_hi);
        }

        let denom_rat = Rat::from_bigint(self.denom.clone());
        Some((total_lo.div(&denom_rat), total_hi.div(&denom_rat)))
    }

    /// A constant polynomial holding an exact rational value.
    fn from_rat(local_space: LocalSpace, r: Rat) -> QPolynomial {
        let mut p = QPolynomial {
            local_space,
            denom: r.den,
            terms: BTreeMap::new(),
        };
        if !r.num.is_zero() {
            let zero_exp = vec![0u32; p.local_space.var_cols()];
            p.terms.insert(zero_exp, r.num);
        }
        p
    }
}

/// An exact rational number, always kept with a positive, gcd-reduced
/// denominator — the unit interval arithmetic in [`QPolynomial::bound`]
/// is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rat {
    num: BigInt,
    den: BigInt,
}

impl Rat {
    fn new(num: BigInt, den: BigInt) -> Rat {
        let (num, den) = if den.is_negative() { (num.negate(), den.negate()) } else { (num, den) };
        let g = num.gcd(&den);
        if g.is_zero() || g == BigInt::one() {
            Rat { num, den }
        } else {
            Rat { num: num.divexact(&g), den: den.divexact(&g) }
        }
    }

    fn zero() -> Rat {
        Rat { num: BigInt::zero(), den: BigInt::one() }
    }

    fn from_bigint(n: BigInt) -> Rat {
        Rat { num: n, den: BigInt::one() }
    }

    fn add(&self, other: &Rat) -> Rat {
        let num = &(&self.num * &other.den) + &(&other.num * &self.den);
        Rat::new(num, &self.den * &other.den)
    }

    fn mul(&self, other: &Rat) -> Rat {
        Rat::new(&self.num * &other.num, &self.den * &other.den)
    }

    fn div(&self, other: &Rat) -> Rat {
        Rat::new(&self.num * &other.den, &self.den * &other.num)
    }

    fn neg(&self) -> Rat {
        Rat { num: self.num.negate(), den: self.den.clone() }
    }

    fn le(&self, other: &Rat) -> bool {
        &self.num * &other.den <= &other.num * &self.den
    }

    fn min(self, other: Rat) -> Rat {
        if self.le(&other) {
            self
        } else {
            other
        }
    }

    fn max(self, other: Rat) -> Rat {
        if other.le(&self) {
            self
        } else {
            other
        }
    }
}

/// `iv` (a `(lo, hi)` pair) raised to power `e`: since `iv` may straddle
/// zero, the extremes of `x^e` are among `{lo^e, hi^e}` (plus `0` itself
/// when `e` is even and the interval spans it).
fn interval_pow(iv: &(Rat, Rat), e: u32) -> (Rat, Rat) {
    let (lo, hi) = iv;
    if e == 0 {
        return (Rat::from_bigint(BigInt::one()), Rat::from_bigint(BigInt::one()));
    }
    let pow = |r: &Rat, e: u32| -> Rat {
        let mut acc = Rat::from_bigint(BigInt::one());
        for _ in 0..e {
            acc = acc.mul(r);
        }
        acc
    };
    let a = pow(lo, e);
    let b = pow(hi, e);
    let mut lo_out = a.clone().min(b.clone());
    let mut hi_out = a.max(b);
    if e % 2 == 0 && lo.le(&Rat::zero()) && Rat::zero().le(hi) {
        lo_out = lo_out.min(Rat::zero());
        hi_out = hi_out.max(Rat::zero());
    }
    (lo_out, hi_out)
}

/// The product of two intervals: the extremes of `a*b` for `a` ranging
/// over the first interval and `b` over the second are among the four
/// corner products.
fn interval_mul(a: &(Rat, Rat), b: &(Rat, Rat)) -> (Rat, Rat) {
    let corners = [a.0.mul(&b.0), a.0.mul(&b.1), a.1.mul(&b.0), a.1.mul(&b.1)];
    let mut lo = corners[0].clone();
    let mut hi = corners[0].clone();
    for c in &corners[1..] {
        lo = lo.min(c.clone());
        hi = hi.max(c.clone());
    }
    (lo, hi)
}

/// Interval-constraint propagation stops once a round leaves every
/// variable's box unchanged, or after this many rounds — mirrors
/// `closure::MAX_UNROLL_ROUNDS`'s role as a fixpoint backstop.
const MAX_BOUND_ROUNDS: usize = 32;

/// A variable's current known rational bounds during box propagation.
/// `None` means "not yet bounded in this direction".
#[derive(Clone)]
struct VarBox {
    lo: Option<Rat>,
    hi: Option<Rat>,
}

/// Derive a box (possibly still partly unbounded) for each variable
/// column of `bset`'s local space, by repeatedly isolating each
/// variable in each row (`c0 + sum(c_i x_i) >= 0`, equalities expanded
/// into both directions) and tightening its bound from the other
/// variables' current boxes. A row only contributes once every *other*
/// variable it mentions already has the bound needed to isolate `v`;
/// later rounds pick up the rows that were skipped while propagation
/// was still incomplete.
fn propagate_var_boxes(bset: &BasicSet) -> Vec<VarBox> {
    let n = bset.local_space().var_cols();
    let mut boxes: Vec<VarBox> = (0..n).map(|_| VarBox { lo: None, hi: None }).collect();

    let mut rows: Vec<Vec<BigInt>> = bset.ineq_matrix().rows_iter().map(<[BigInt]>::to_vec).collect();
    for row in bset.eq_matrix().rows_iter() {
        rows.push(row.to_vec());
        rows.push(row.iter().map(BigInt::negate).collect());
    }

    for _ in 0..MAX_BOUND_ROUNDS {
        let mut changed = false;
        for row in &rows {
            for v in 0..n {
                let c_v = &row[1 + v];
                if c_v.is_zero() {
                    continue;
                }
                let Some(s_max) = sum_max_excluding(row, &boxes, v) else {
                    continue;
                };
                let n_min = Rat::from_bigint(row[0].clone()).neg().add(&s_max.neg());
                let candidate = n_min.div(&Rat::from_bigint(c_v.clone()));
                if c_v.is_positive() {
                    let tightened = match boxes[v].lo.clone() {
                        Some(cur) => cur.max(candidate),
                        None => candidate,
                    };
                    if boxes[v].lo.as_ref() != Some(&tightened) {
                        boxes[v].lo = Some(tightened);
                        changed = true;
                    }
                } else {
                    let tightened = match boxes[v].hi.clone() {
                        Some(cur) => cur.min(candidate),
                        None => candidate,
                    };
                    if boxes[v].hi.as_ref() != Some(&tightened) {
                        boxes[v].hi = Some(tightened);
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    boxes
}

/// The largest possible value of `sum_{j != v}(row[1+j] * x_j)` given
/// each `x_j`'s current box: a positive coefficient wants that
/// variable's current upper bound, a negative one wants its lower
/// bound. Returns `None` if any needed bound isn't known yet.
fn sum_max_excluding(row: &[BigInt], boxes: &[VarBox], v: usize) -> Option<Rat> {
    let mut acc = Rat::zero();
    for (j, bx) in boxes.iter().enumerate() {
        if j == v {
            continue;
        }
        let c = &row[1 + j];
        if c.is_zero() {
            continue;
        }
        let bound = if c.is_negative() { bx.lo.clone()? } else { bx.hi.clone()? };
        acc = acc.add(&Rat::from_bigint(c.clone()).mul(&bound));
    }
    Some(acc)
}

/// A `Space` plus an ordered list of `(Set, QPolynomial)` pieces with
/// pairwise-disjoint sets sharing that space.
#[derive(Debug, Clone)]
pub struct PwQPolynomial {
    pieces: Vec<(Set, QPolynomial)>,
}

impl PwQPolynomial {
    #[must_use]
    pub fn empty() -> Self {
        PwQPolynomial { pieces: Vec::new() }
    }

    #[must_use]
    pub fn from_poly(domain: Set, poly: QPolynomial) -> Self {
        PwQPolynomial { pieces: vec![(domain, poly)] }
    }

    #[must_use]
    pub fn pieces(&self) -> &[(Set, QPolynomial)] {
        &self.pieces
    }

    pub fn push_piece(&mut self, domain: Set, poly: QPolynomial) {
        self.pieces.push((domain, poly));
    }
}

/// Which extremum a [`PwQPolynomialFold`] folds finitely many
/// quasi-polynomials by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldKind {
    Min,
    Max,
}

/// `min` or `max` of finitely many [`QPolynomial`]s over the same
/// domain piece — the representation symbolic upper/lower bounds take.
#[derive(Debug, Clone)]
pub struct QPolynomialFold {
    kind: FoldKind,
    terms: Vec<QPolynomial>,
}

impl QPolynomialFold {
    #[must_use]
    pub fn new(kind: FoldKind, terms: Vec<QPolynomial>) -> Self {
        QPolynomialFold { kind, terms }
    }

    #[must_use]
    pub fn kind(&self) -> FoldKind {
        self.kind
    }

    #[must_use]
    pub fn terms(&self) -> &[QPolynomial] {
        &self.terms
    }
}

/// A `Space` plus an ordered list of `(Set, QPolynomialFold)` pieces.
#[derive(Debug, Clone)]
pub struct PwQPolynomialFold {
    pieces: Vec<(Set, QPolynomialFold)>,
}

impl PwQPolynomialFold {
    #[must_use]
    pub fn empty() -> Self {
        PwQPolynomialFold { pieces: Vec::new() }
    }

    #[must_use]
    pub fn pieces(&self) -> &[(Set, QPolynomialFold)] {
        &self.pieces
    }

    pub fn push_piece(&mut self, domain: Set, fold: QPolynomialFold) {
        self.pieces.push((domain, fold));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    #[test]
    fn add_merges_like_terms() {
        let ls = LocalSpace::new(Space::set(0, 1));
        let x = QPolynomial::var(ls.clone(), 0);
        let sum = x.add(&x);
        assert_eq!(sum.n_terms(), 1);
        let (num, den) = sum.eval(&[BigInt::from_i64(5)]);
        assert_eq!(num, BigInt::from_i64(10));
        assert_eq!(den, BigInt::one());
    }

    #[test]
    fn mul_adds_exponents() {
        let ls = LocalSpace::new(Space::set(0, 1));
        let x = QPolynomial::var(ls, 0);
        let squared = x.mul(&x);
        let (num, _) = squared.eval(&[BigInt::from_i64(3)]);
        assert_eq!(num, BigInt::from_i64(9));
    }

    fn box_domain(lo: i64, hi: i64) -> Set {
        let mut bmap = crate::basic_map::BasicMap::universe(Space::set(0, 1));
        bmap.add_inequality(vec![BigInt::from_i64(-lo), BigInt::one()]);
        bmap.add_inequality(vec![BigInt::from_i64(hi), BigInt::minus_one()]);
        Set::from_basic_map(Space::set(0, 1), bmap)
    }

    #[test]
    fn bound_finds_the_interval_endpoints_of_a_linear_poly() {
        let ls = LocalSpace::new(Space::set(0, 1));
        let x = QPolynomial::var(ls.clone(), 0);
        let two = QPolynomial::constant(ls, BigInt::from_i64(2));
        let poly = x.mul(&two); // 2x
        let domain = box_domain(0, 10);
        let mut ctx = crate::ctx::Context::new();

        let lo = poly.bound(&domain, FoldKind::Min, &mut ctx).expect("bounded below");
        assert_eq!(lo.eval(&[BigInt::zero()]).0, BigInt::zero());

        let hi = poly.bound(&domain, FoldKind::Max, &mut ctx).expect("bounded above");
        assert_eq!(hi.eval(&[BigInt::zero()]).0, BigInt::from_i64(20));
    }

    #[test]
    fn bound_reads_the_bernstein_option_and_still_computes_a_bound() {
        let ls = LocalSpace::new(Space::set(0, 1));
        let x = QPolynomial::var(ls, 0);
        let domain = box_domain(0, 5);
        let mut ctx = crate::ctx::Context::new();
        ctx.options_mut().bound = BoundAlgorithm::Bernstein;

        let hi = x.bound(&domain, FoldKind::Max, &mut ctx).expect("bounded");
        assert_eq!(hi.eval(&[BigInt::zero()]).0, BigInt::from_i64(5));
    }

    #[test]
    fn bound_over_negative_range_matches_a_squared_term() {
        // x^2 over [-3, 2] should peak at 9 (from x = -3), not 4.
        let ls = LocalSpace::new(Space::set(0, 1));
        let x = QPolynomial::var(ls, 0);
        let squared = x.mul(&x);
        let domain = box_domain(-3, 2);
        let mut ctx = crate::ctx::Context::new();

        let hi = squared.bound(&domain, FoldKind::Max, &mut ctx).expect("bounded above");
        assert_eq!(hi.eval(&[BigInt::zero()]).0, BigInt::from_i64(9));

        let lo = squared.bound(&domain, FoldKind::Min, &mut ctx).expect("bounded below");
        assert_eq!(lo.eval(&[BigInt::zero()]).0, BigInt::zero());
    }
}
