//! The allocation error.

use thiserror::Error;

/// OutOfMemory
///
/// Returned whenever a request cannot be satisfied, whether because no free block is large enough or because the
/// platform refused to reserve the pool in the first place.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("out of memory")]
pub struct OutOfMemory;
