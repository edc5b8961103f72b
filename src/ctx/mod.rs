//! The per-thread [`Context`]: interned identifiers, options, pooled
//! integer constants, the error slot, and cooperative cancellation.
//!
//! A `Context` and every object built from it are confined to one thread
//! (spec.md §5). The single piece of state another thread is allowed to
//! touch is the abort flag, exposed separately as an [`AbortHandle`] so
//! that type is the only thing that needs to be `Send`/`Sync`.

pub mod id;
pub mod options;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use presburger_bigint::BigInt;

pub use id::{Id, IdTable};
pub use options::{
    BoundAlgorithm, ClosureAlgorithm, ContextSolver, ConvexHullAlgorithm, GbrPolicy, IlpSolver,
    LpSolver, OutputFormat, Options, Stats,
};

use crate::error::ErrorKind;

/// A `Send + Sync` handle that lets another thread request cancellation
/// of whatever the owning thread's [`Context`] is currently doing.
///
/// This is the only part of a `Context` allowed to cross a thread
/// boundary (spec.md §9 "global mutable abort flag" redesign note: "an
/// atomic flag inside the Context, checked at loop heads... the flag may
/// be set from another thread").
#[derive(Debug, Clone)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    /// Request cancellation. Idempotent.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Pooled small integer constants, reused instead of reallocated at every
/// constraint-row construction site.
#[derive(Debug, Clone)]
pub struct IntPool {
    /// Cached `0`.
    pub zero: BigInt,
    /// Cached `1`.
    pub one: BigInt,
    /// Cached `2`.
    pub two: BigInt,
    /// Cached `-1`.
    pub minus_one: BigInt,
}

impl Default for IntPool {
    fn default() -> Self {
        IntPool {
            zero: BigInt::zero(),
            one: BigInt::one(),
            two: BigInt::from_i64(2),
            minus_one: BigInt::minus_one(),
        }
    }
}

/// The process-wide-free, per-thread context every polyhedral object is
/// built inside (spec.md §4.1).
#[derive(Debug)]
pub struct Context {
    ids: IdTable,
    options: Options,
    stats: Stats,
    error: ErrorKind,
    aborted: Arc<AtomicBool>,
    pool: IntPool,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Allocate a fresh context with default options.
    #[must_use]
    pub fn new() -> Self {
        Context {
            ids: IdTable::new(),
            options: Options::default(),
            stats: Stats::default(),
            error: ErrorKind::None,
            aborted: Arc::new(AtomicBool::new(false)),
            pool: IntPool::default(),
        }
    }

    /// Intern `name`, returning a stable [`Id`] for the lifetime of this
    /// context.
    pub fn intern(&mut self, name: &str) -> Id {
        self.ids.intern(name)
    }

    /// Recover the name behind a previously interned [`Id`].
    ///
    /// # Panics
    /// Panics if `id` was interned by a different `Context`.
    #[must_use]
    pub fn id_name(&self, id: Id) -> &str {
        self.ids.name(id)
    }

    /// Current option values.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable access to option values, for `--flag=value`-style setters.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Current operation counters.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Mutable access to operation counters, used by the tableau and
    /// coalescing implementations to record their own activity.
    pub fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    /// The pooled small-integer constants.
    #[must_use]
    pub fn pool(&self) -> &IntPool {
        &self.pool
    }

    /// Read the last error recorded on this context.
    #[must_use]
    pub fn last_error(&self) -> &ErrorKind {
        &self.error
    }

    /// Clear the error slot back to [`ErrorKind::None`].
    pub fn reset_error(&mut self) {
        self.error = ErrorKind::None;
    }

    /// Record an error on this context. Structural errors (dimension
    /// mismatch, invalid position, ...) should call this and then return
    /// `None`/empty to the caller.
    pub fn set_error(&mut self, kind: ErrorKind) {
        self.error = kind;
    }

    /// Obtain a [`AbortHandle`] that another thread can use to request
    /// cancellation of work running on this context.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(Arc::clone(&self.aborted))
    }

    /// Request cancellation from the owning thread itself.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Clear a previously requested cancellation, allowing further work.
    pub fn resume(&self) {
        self.aborted.store(false, Ordering::SeqCst);
    }

    /// `true` if cancellation has been requested. Every iterative
    /// algorithm (tableau pivot loop, closure fixpoint, coalesce pass,
    /// parametric projection, flow main loop) must check this at its loop
    /// head and, if set, unwind and set `ErrorKind::Abort`.
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Check for cancellation, recording `ErrorKind::Abort` and returning
    /// `true` if a caller should unwind. Call this at the head of every
    /// loop iteration in the solver, coalescing, and closure code.
    pub fn check_abort(&mut self) -> bool {
        if self.aborted() {
            self.set_error(ErrorKind::Abort);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_handle_propagates_to_owner() {
        let ctx = Context::new();
        assert!(!ctx.aborted());
        let handle = ctx.abort_handle();
        handle.abort();
        assert!(ctx.aborted());
    }

    #[test]
    fn error_slot_round_trips() {
        let mut ctx = Context::new();
        assert_eq!(*ctx.last_error(), ErrorKind::None);
        ctx.set_error(ErrorKind::invalid("bad dimension"));
        assert!(ctx.last_error().is_error());
        ctx.reset_error();
        assert_eq!(*ctx.last_error(), ErrorKind::None);
    }
}
