#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use core::alloc::Layout;
use core::fmt;

/// The fixed-width hash family used by the default hasher.
pub mod hash;

/// A HashMap implementation using linear probing over tagged slots.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

/// A hash set implementation using linear probing over tagged slots.
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

pub use hash::BuildTagHasher;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;

/// The hasher builder used when none is specified.
pub type DefaultHashBuilder = BuildTagHasher;

/// A randomly seeded hasher builder backed by `foldhash`.
#[cfg(feature = "foldhash")]
pub type FoldHashBuilder = foldhash::fast::RandomState;

/// The error type for `try_*` methods that may need to grow a table.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The requested table would exceed the maximum number of slots, or its
    /// size in bytes would not fit in `isize`.
    CapacityOverflow,

    /// The memory allocator returned an error.
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => {
                f.write_str("hash table capacity exceeds the maximum table size")
            }
            TryReserveError::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes for a hash table failed",
                layout.size()
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TryReserveError {}
