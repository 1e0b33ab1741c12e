//! The Pool.

use core::{
    alloc::Layout,
    cmp, mem,
    ptr::NonNull,
};

use log::{debug, trace};

use crate::{
    api::{OutOfMemory, Platform, Statistics},
    internals::blocks::{BlockHeader, BlockList},
    utils,
};

/// Size of the bookkeeping header preceding each allocation, in bytes.
///
/// Every allocation consumes `HEADER_SIZE` bytes of the pool on top of its payload, and a fresh pool starts with a
/// single free block of `pool_size - HEADER_SIZE` payload bytes.
pub const HEADER_SIZE: usize = BlockHeader::SIZE;

/// Pool
///
/// A fixed-capacity memory pool: one contiguous region reserved from the platform up front, carved into blocks on
/// demand, and returned to the platform in one piece on drop.
///
/// Allocation walks the blocks in address order and hands out the first free block large enough, splitting off the
/// surplus when worthwhile. Deallocation marks the block free and coalesces adjacent free blocks in a single
/// forward scan from the head.
///
/// The pool is strictly single-threaded: both `allocate` and `deallocate` require exclusive access, and the type is
/// neither `Send` nor `Sync`.
pub struct Pool<P>
    where
        P: Platform,
{
    //  The source, and final destination, of the backing region.
    platform: P,
    //  Base address of the backing region.
    region: NonNull<u8>,
    //  Size of the backing region, in bytes.
    total_size: usize,
    //  The blocks threaded through the region.
    ledger: BlockList,
    //  Payload bytes currently allocated.
    current_usage: usize,
    //  High-water mark of `current_usage`.
    peak_usage: usize,
}

impl<P> Pool<P>
    where
        P: Platform,
{
    /// Creates a pool of `pool_size` bytes reserved from `platform`.
    ///
    /// Returns an error if `pool_size` cannot even fit one block header, or if the platform refuses the
    /// reservation.
    #[cold]
    pub fn new(platform: P, pool_size: usize) -> Result<Pool<P>, OutOfMemory> {
        //  A pool too small for its first header could never hand out a single byte.
        if pool_size < HEADER_SIZE {
            return Err(OutOfMemory);
        }

        let layout = Self::region_layout(pool_size)?;

        //  Safety:
        //  -   `layout` is of non-zero size, and of power-of-2 alignment.
        let region = unsafe { platform.reserve(layout) };

        let region = match region {
            Some(region) => region,
            None => {
                debug!("pool creation failed: platform refused {} bytes", pool_size);
                return Err(OutOfMemory);
            },
        };

        debug_assert!(utils::is_sufficiently_aligned_for(region, mem::align_of::<BlockHeader>()));

        //  Safety:
        //  -   The region was just reserved: access is exclusive, it spans `pool_size >= HEADER_SIZE` bytes, and
        //      the platform aligned it as per `layout`.
        let ledger = unsafe { BlockList::initialize(region, pool_size) };

        debug!("pool created: {} bytes at {:p}", pool_size, region.as_ptr());

        Ok(Pool { platform, region, total_size: pool_size, ledger, current_usage: 0, peak_usage: 0 })
    }

    /// Allocates `size` bytes out of the pool, returning the address of the payload.
    ///
    /// The request is rounded up to the header's alignment, so the block handed out may hold slightly more than
    /// `size` bytes; usage statistics account for the rounded size. A request of 0 bytes succeeds, and returns an
    /// address distinct from that of any other live allocation.
    ///
    /// The payload remains valid until it is deallocated, or the pool is dropped, whichever comes first.
    ///
    /// Returns an error if no free block can accommodate the rounded request.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, OutOfMemory> {
        if size > self.total_size {
            debug!("allocation failed: {} bytes requested, pool is {} bytes", size, self.total_size);
            return Err(OutOfMemory);
        }

        //  Keeps every header naturally aligned, as split offsets remain sums of aligned quantities.
        let size = utils::round_up(size, mem::align_of::<BlockHeader>());

        let mut block = match self.ledger.first_fit(size) {
            Some(block) => block,
            None => {
                debug!("allocation failed: no free block fits {} bytes", size);
                return Err(OutOfMemory);
            },
        };

        //  Safety:
        //  -   `block` was just returned by the first-fit walk on this ledger, hence free and large enough.
        //  -   `size` is a multiple of the header's alignment, as per above.
        unsafe { self.ledger.split(block, size) };

        //  Safety:
        //  -   `block` is live, and the ledger is exclusively accessed.
        let header = unsafe { block.as_mut() };

        header.mark_allocated();

        self.current_usage += header.size();
        self.peak_usage = cmp::max(self.peak_usage, self.current_usage);

        //  Safety:
        //  -   `block` is a live header of this ledger.
        let payload = unsafe { BlockHeader::payload(block) };

        trace!("allocated {} bytes at {:p}", header.size(), payload.as_ptr());

        Ok(payload)
    }

    /// Deallocates a payload previously handed out by this pool.
    ///
    /// `None` is accepted, and ignored, mirroring `free(NULL)`.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `reference`, when not None, was returned by a call to `allocate` on this very instance.
    /// -   Assumes that `reference` has not been deallocated since that call.
    /// -   Assumes that the memory it designates is no longer in use.
    pub unsafe fn deallocate(&mut self, reference: Option<NonNull<u8>>) {
        let payload = match reference {
            Some(payload) => payload,
            None => return,
        };

        debug_assert!(self.contains(payload), "{:p} is not from this pool", payload.as_ptr());

        //  Safety:
        //  -   `payload` was obtained from `BlockHeader::payload` on a live header of this ledger, as per this
        //      function's contract.
        let mut block = BlockHeader::from_payload(payload);

        //  Safety:
        //  -   `block` is live, and the ledger is exclusively accessed.
        let header = block.as_mut();

        header.mark_free();

        debug_assert!(self.current_usage >= header.size());

        self.current_usage -= header.size();

        trace!("deallocated {} bytes at {:p}", header.size(), payload.as_ptr());

        self.ledger.merge_forward();
    }

    /// Takes a snapshot of the pool's occupancy.
    pub fn statistics(&self) -> Statistics {
        Statistics {
            total_size: self.total_size,
            current_usage: self.current_usage,
            peak_usage: self.peak_usage,
            largest_free_block: self.ledger.largest_free(),
        }
    }

    //  Layout of the backing region: `pool_size` bytes, aligned for the first header.
    fn region_layout(pool_size: usize) -> Result<Layout, OutOfMemory> {
        Layout::from_size_align(pool_size, mem::align_of::<BlockHeader>()).map_err(|_| OutOfMemory)
    }

    //  Returns whether `pointer` may be a payload of this pool: within the region, past the first header.
    fn contains(&self, pointer: NonNull<u8>) -> bool {
        let base = self.region.as_ptr() as usize;
        let pointer = pointer.as_ptr() as usize;

        pointer >= base + HEADER_SIZE && pointer <= base + self.total_size
    }
}

impl<P> Drop for Pool<P>
    where
        P: Platform,
{
    fn drop(&mut self) {
        //  Safety:
        //  -   The layout was validated when the region was reserved.
        let layout = unsafe { Layout::from_size_align_unchecked(self.total_size, mem::align_of::<BlockHeader>()) };

        //  Safety:
        //  -   `region` was returned by `reserve` on this platform, with this very layout.
        //  -   Outstanding payloads, if any, must no longer be in use, as documented on `allocate`.
        unsafe { self.platform.release(self.region, layout) };

        debug!("pool released: {} bytes at {:p}", self.total_size, self.region.as_ptr());
    }
}

// mod tests
