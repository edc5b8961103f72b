#![forbid(unsafe_code)]
//! Exact manipulation of Presburger-definable sets and relations over the
//! integers: finite unions of convex integer polyhedra whose constraints
//! are affine (in)equalities with integer coefficients, optionally
//! involving integer-division ("div") local variables.
//!
//! This crate is the symbolic polyhedral engine underneath a polyhedral
//! compiler: dependence analysis, loop transformation, scheduling, and
//! code generation all reduce to the operations here. It supplies:
//!
//! - a rational/integer simplex [`tableau`] supporting parametric integer
//!   linear programming (PIP) — emptiness checks, lexicographic
//!   optimization, and projection;
//! - the [`basic_map`] / [`map`] data model and its arithmetic closure
//!   (Gaussian elimination, equality detection, redundancy removal,
//!   projection, convex hull, and [`coalesce`]scing);
//! - the [`closure`] (transitive-closure/power) and [`flow`]
//!   (dependence-flow) layers that iteratively compose relations;
//! - an affine-expression algebra ([`aff`], [`qpolynomial`]) sharing the
//!   same [`local_space`] machinery.
//!
//! Every object lives inside a [`ctx::Context`]; cross-context use is a
//! logic error (see [`ctx`] for the single-threaded ownership model this
//! crate follows instead of the reference implementation's manual
//! reference counting).
//!
//! Textual parsing and printing of the ISL concrete syntax lives in
//! [`format`], implemented only as far as needed to round-trip
//! `Set`/`Map`/`Aff` values; the full parser/CLI layer is out of scope
//! (see `DESIGN.md`).

pub mod aff;
pub mod basic_map;
pub mod closure;
pub mod coalesce;
pub mod constraint;
pub mod ctx;
pub mod error;
pub mod flow;
pub mod format;
pub mod hull;
pub mod local_space;
pub mod map;
pub mod qpolynomial;
pub mod set;
pub mod space;
pub mod tableau;
pub mod union_map;
pub mod vecmat;

pub use aff::{Aff, PwAff};
pub use basic_map::{BasicMap, BasicSet};
pub use closure::{compose, power, transitive_closure};
pub use ctx::Context;
pub use error::ErrorKind;
pub use flow::{FlowResult, LevelBefore, SourceFlow, compute_flow};
pub use local_space::LocalSpace;
pub use map::Map;
pub use qpolynomial::{PwQPolynomial, PwQPolynomialFold, QPolynomial, QPolynomialFold};
pub use set::Set;
pub use space::Space;
pub use union_map::{UnionMap, UnionSet};
