#![no_std]
#![deny(missing_docs)]

//! A First-Fit Pool Allocator library.
//!
//! The type `FFAllocator` provides a fixed-capacity memory pool, reserved from the OS in one piece up front, out of
//! which allocations are served with a first-fit strategy.
//!
//! #   Warning
//!
//! This pool allocator is strictly single-threaded, and trusts its caller on deallocation.
//!
//! See the README.md file for the limitations and trade-offs made.

mod allocator;
mod platform;

pub use allocator::FFAllocator;

pub use ffalloc_core::{OutOfMemory, Statistics, HEADER_SIZE};

use platform::FFPlatform;
