//! The internals of ffalloc-core.
//!
//! The internals provide all the heavy-lifting.

pub mod blocks;
