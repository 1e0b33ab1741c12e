//! The pool statistics.

use core::fmt;

/// Statistics
///
/// A point-in-time snapshot of the pool's occupancy.
///
/// `total_size` counts every byte of the pool, block headers included; the other three quantities count payload
/// bytes only. Headers are thus neither free nor in use, which is why an untouched pool already reports a sliver of
/// fragmentation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Statistics {
    /// Size of the pool, in bytes, headers included.
    pub total_size: usize,
    /// Number of payload bytes currently allocated.
    pub current_usage: usize,
    /// High-water mark of `current_usage` over the lifetime of the pool.
    pub peak_usage: usize,
    /// Payload size of the largest free block, or 0 if no block is free.
    pub largest_free_block: usize,
}

impl Statistics {
    /// Returns the share of non-allocated memory lying outside the largest free block, in integer percents of the
    /// pool size.
    ///
    /// Free memory gathered in a single block scores low; free memory scattered across many small blocks scores
    /// high. Returns 0 if no block is free at all.
    pub fn fragmentation_percent(&self) -> usize {
        if self.largest_free_block == 0 {
            return 0;
        }

        let scattered = self.total_size - self.largest_free_block - self.current_usage;

        scattered * 100 / self.total_size
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Memory: {} bytes", self.total_size)?;
        writeln!(f, "Current Usage: {} bytes", self.current_usage)?;
        writeln!(f, "Peak Usage: {} bytes", self.peak_usage)?;
        write!(f, "Fragmentation: {}%", self.fragmentation_percent())
    }
}

// mod tests
