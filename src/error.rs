//! Error types for the `chained-hash` crate

use core::fmt::Debug;

/// Returned by [`FixedTable::try_set`](crate::FixedTable::try_set) when the
/// table already holds as many entries as its capacity allows.
///
/// The rejected value is handed back so the caller keeps ownership of it.
/// The table is left exactly as it was.
#[derive(Clone, PartialEq, Eq, thiserror::Error)]
#[error("table is at capacity ({capacity} entries)")]
pub struct CapacityError<V> {
    capacity: usize,
    value: V,
}

impl<V> CapacityError<V> {
    pub(crate) fn new(capacity: usize, value: V) -> Self {
        CapacityError { capacity, value }
    }

    /// The capacity of the table that rejected the value.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A reference to the rejected value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Takes back ownership of the rejected value.
    pub fn into_value(self) -> V {
        self.value
    }
}

// Written by hand so the error is usable for any `V`, not only `V: Debug`.
impl<V> Debug for CapacityError<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CapacityError")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
