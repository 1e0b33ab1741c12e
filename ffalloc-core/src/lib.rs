#![no_std]

#![deny(missing_docs)]

//! Building blocks for a fixed-capacity pool allocator.
//!
//! ffalloc-core carves a caller-sized pool of raw memory into variable-sized blocks, served first-fit. It contains:
//! -   A platform trait, used to reserve the single raw region of memory to be carved up.
//! -   The `Pool` itself, which tracks every block through an intrusive list of in-pool headers, splitting blocks on
//!     allocation and coalescing them forward on deallocation.
//! -   A `Statistics` snapshot, measuring occupancy, peak occupancy, and fragmentation.

mod api;
mod internals;
mod utils;

pub use api::*;
