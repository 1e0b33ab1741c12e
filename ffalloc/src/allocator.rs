//! Allocator

use core::ptr::NonNull;

use ffalloc_core::{OutOfMemory, Pool, Statistics};

use crate::FFPlatform;

/// First-Fit Pool Allocator.
///
/// The entire pool is reserved from the OS when the allocator is created, and returned to the OS in one piece when
/// the allocator is dropped; individual allocations never touch the OS.
pub struct FFAllocator {
    pool: Pool<FFPlatform>,
}

impl FFAllocator {
    /// Creates an allocator backed by a pool of `pool_size` bytes.
    ///
    /// Returns Ok if the pool could be reserved, Err otherwise.
    ///
    /// Failure to create the allocator may occur if:
    ///
    /// -   `pool_size` is too small to fit a single block header.
    /// -   The OS refuses to map `pool_size` bytes.
    #[cold]
    pub fn new(pool_size: usize) -> Result<FFAllocator, OutOfMemory> {
        Pool::new(FFPlatform::new(), pool_size).map(|pool| FFAllocator { pool })
    }

    /// Allocates `size` bytes of memory out of the pool.
    ///
    /// The request is rounded up to the alignment of the block headers, so the payload may hold slightly more than
    /// `size` bytes; the payload is suitably aligned for any type whose alignment does not exceed that of a
    /// pointer.
    ///
    /// Returns Ok if a free block could accommodate the request, Err otherwise.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, OutOfMemory> { self.pool.allocate(size) }

    /// Deallocates the memory located at `reference`.
    ///
    /// `None` is accepted, and ignored, mirroring `free(NULL)`.
    ///
    /// #   Safety
    ///
    /// -   Assumes `reference`, when not None, has been returned by a prior call to `allocate` on this instance.
    /// -   Assumes `reference` has not been deallocated since its allocation.
    /// -   Assumes the memory pointed by `reference` is no longer in use.
    pub unsafe fn deallocate(&mut self, reference: Option<NonNull<u8>>) { self.pool.deallocate(reference) }

    /// Takes a snapshot of the pool's occupancy.
    ///
    /// The snapshot also powers the `Display` implementation of `Statistics`, rendering one line per quantity.
    pub fn statistics(&self) -> Statistics { self.pool.statistics() }
}
