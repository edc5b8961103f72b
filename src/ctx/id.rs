//! Interned identifiers.
//!
//! Identifiers (parameter names, tuple names, function names in the
//! textual format) are interned once per [`Context`](super::Context) and
//! afterward compared by key, not by string content. This is the
//! single-threaded, per-Context counterpart of the teacher's
//! `rustc_hash`-sharded global symbol table: here there is exactly one
//! table, owned by the `Context`, so no locking is needed.

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Key type for an interned identifier, stable for the life of the
    /// owning `Context`.
    pub struct IdKey;
}

/// An interned name.
///
/// Two `Id`s compare equal iff they were interned from the same
/// [`Context`](super::Context) and denote the same name; comparing `Id`s
/// from different contexts is a logic error the caller must avoid (see
/// the "cross-context use is forbidden" invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(IdKey);

/// Per-Context identifier table.
#[derive(Debug, Default)]
pub struct IdTable {
    names: SlotMap<IdKey, Box<str>>,
    by_name: FxHashMap<Box<str>, IdKey>,
}

impl IdTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the existing [`Id`] if already present.
    pub fn intern(&mut self, name: &str) -> Id {
        if let Some(&key) = self.by_name.get(name) {
            return Id(key);
        }
        let boxed: Box<str> = name.into();
        let key = self.names.insert(boxed.clone());
        self.by_name.insert(boxed, key);
        Id(key)
    }

    /// Recover the name an [`Id`] was interned from.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this table (cross-context use).
    #[must_use]
    pub fn name(&self, id: Id) -> &str {
        self.names
            .get(id.0)
            .expect("Id used outside the Context that interned it")
    }

    /// Number of distinct interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` if no names have been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut table = IdTable::new();
        let a = table.intern("x");
        let b = table.intern("x");
        let c = table.intern("y");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.name(a), "x");
        assert_eq!(table.name(c), "y");
    }
}
