#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod capacity;
mod chain;
mod entry;

pub mod error;

/// A fixed-capacity, string-keyed hash table with per-bucket chains.
///
/// This module provides [`FixedTable`], the [`TableBuilder`] used to
/// configure it, and its iterators.
pub mod fixed_table;

#[cfg(any(test, feature = "stats"))]
pub mod stats;

pub use capacity::MAX_BUCKET_COUNT;
pub use error::CapacityError;
pub use fixed_table::FixedTable;
pub use fixed_table::TableBuilder;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`FixedTable::new`] when no other is named.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`FixedTable::new`] when no other is named.
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}
