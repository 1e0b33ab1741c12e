//! The API of ffalloc-core.

mod error;
mod platform;
mod pool;
mod statistics;

pub use error::OutOfMemory;
pub use platform::Platform;
pub use pool::{Pool, HEADER_SIZE};
pub use statistics::Statistics;
