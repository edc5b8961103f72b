//! Option values recognized by the external CLI layer (§6) and consulted
//! by the algorithms in this crate.
//!
//! The CLI argument framework itself is out of scope (spec.md §1); this
//! module carries the *values* those `--flag=...` options select, stored
//! as a plain struct with typed setters on [`Context`](super::Context),
//! the way the teacher's `Simplifier` carries `max_iterations`/
//! `domain_safe` as builder fields rather than reading a config file.

/// Which solver the rational simplex falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LpSolver {
    /// Direct tableau pivoting.
    #[default]
    Tab,
    /// Route through the parametric integer solver with no parameters.
    Pip,
}

/// Which solver integer feasibility/optimization uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IlpSolver {
    /// Generalized basis reduction.
    Gbr,
    /// Parametric integer programming (Gomory cuts).
    #[default]
    Pip,
}

/// How eagerly the context tableau resolves parametric sign splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextSolver {
    /// Generalized basis reduction for the context tableau.
    Gbr,
    /// Plain lexmin for the context tableau.
    #[default]
    Lexmin,
}

/// How often GBR is invoked during a single PIP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GbrPolicy {
    /// Never invoke GBR; rely solely on Gomory cuts.
    Never,
    /// Invoke GBR at most once per solve.
    Once,
    #[default]
    /// Invoke GBR whenever the rational optimum has no nearby integer point.
    Always,
}

/// Which transitive-closure algorithm `transitive_closure` prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosureAlgorithm {
    #[default]
    /// The native decomposition + closed-form-sum-of-translations algorithm.
    Isl,
    /// A coarser box (interval) over-approximation.
    Box_,
}

/// Which convex-hull algorithm `convex_hull` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvexHullAlgorithm {
    #[default]
    /// Iterative facet wrapping.
    Wrap,
    /// Pairwise Fourier-Motzkin-based union.
    Fm,
}

/// Which bounding algorithm `QPolynomial::bound` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundAlgorithm {
    /// Bernstein basis expansion over a simplex.
    Bernstein,
    #[default]
    /// Recursive interval bound over the polynomial's AST.
    Range,
}

/// Output syntax for printing sets/maps (§6 "External Interfaces").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    /// The native ISL concrete syntax (the only format fully implemented).
    Isl,
    /// Omega calculator syntax.
    Omega,
    /// PolyLib matrix syntax.
    PolyLib,
    /// LaTeX math syntax.
    Latex,
}

/// All option values a [`Context`](super::Context) carries.
#[derive(Debug, Clone)]
pub struct Options {
    /// `--lp-solver`.
    pub lp_solver: LpSolver,
    /// `--ilp-solver`.
    pub ilp_solver: IlpSolver,
    /// `--context`.
    pub context_solver: ContextSolver,
    /// `--gbr`.
    pub gbr: GbrPolicy,
    /// `--closure`.
    pub closure: ClosureAlgorithm,
    /// `--convex-hull`.
    pub convex_hull: ConvexHullAlgorithm,
    /// `--bound`.
    pub bound: BoundAlgorithm,
    /// `--format`.
    pub format: OutputFormat,
    /// `--schedule-parametric` (recorded for completeness; the schedule
    /// tree itself is out of scope per spec.md §1).
    pub schedule_parametric: bool,
    /// `--schedule-maximize-band-depth`.
    pub schedule_maximize_band_depth: bool,
    /// `--schedule-split-parallel`.
    pub schedule_split_parallel: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            lp_solver: LpSolver::default(),
            ilp_solver: IlpSolver::default(),
            context_solver: ContextSolver::default(),
            gbr: GbrPolicy::default(),
            closure: ClosureAlgorithm::default(),
            convex_hull: ConvexHullAlgorithm::default(),
            bound: BoundAlgorithm::default(),
            format: OutputFormat::default(),
            schedule_parametric: false,
            schedule_maximize_band_depth: false,
            schedule_split_parallel: false,
        }
    }
}

/// Operation counters recorded on the `Context`, mirroring `isl_ctx`'s
/// statistics fields (e.g. number of GBR LPs solved).
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    /// Number of linear programs solved by GBR.
    pub gbr_lp_count: u64,
    /// Number of tableau pivots performed across all solves.
    pub pivot_count: u64,
    /// Number of Gomory cuts added across all solves.
    pub gomory_cut_count: u64,
    /// Number of successful coalescing merges performed.
    pub coalesce_merge_count: u64,
}
