//! `Set`: the `n_in == 0` specialization of [`crate::map::Map`].
//!
//! Carried as a type alias rather than a separate type, mirroring
//! [`crate::basic_map::BasicSet`]: every `Map` operation applies
//! unchanged to a `Set`, since a set is just a map with no input tuple.

pub use crate::map::Map as Set;
