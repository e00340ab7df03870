#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Position lookup used by the keyed diff (`key -> index`).
#[cfg(feature = "std")]
pub(crate) type KeyIndexMap<K> = HashMap<K, usize>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyIndexMap<K> = BTreeMap<K, usize>;

/// Bound for identities that [`crate::diff_by_key`] can reconcile.
///
/// With `std` this is `Hash + Eq`; without it, keys are stored in a `BTreeMap` and must be `Ord`.
#[cfg(feature = "std")]
pub trait DiffKey: core::hash::Hash + Eq + Clone {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone> DiffKey for K {}

#[cfg(not(feature = "std"))]
pub trait DiffKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone> DiffKey for K {}
