//! Blocks
//!
//! A Block is a contiguous slice of the pool: a fixed-size header immediately followed by the payload handed out to
//! the caller. Headers are never _constructed_ as ordinary values; raw pool memory is reinterpreted as headers, and
//! rewritten in place as blocks are carved up and recombined.
//!
//! The `BlockList` threads through every block, free and allocated alike, in address order. It is the sole source of
//! truth for the state of the pool: at all times the blocks partition it, each `next` header (when present) starting
//! exactly `BlockHeader::SIZE + size` bytes after its predecessor's.

use core::{
    mem,
    ptr::{self, NonNull},
};

use log::trace;

use crate::utils;

/// BlockHeader
///
/// The fixed-size metadata record preceding each block's payload in the pool.
#[repr(C)]
pub(crate) struct BlockHeader {
    //  Number of payload bytes following the header; excludes the header itself.
    size: usize,
    //  Availability of the payload for allocation.
    is_free: bool,
    //  Next header in address order, if any.
    next: Option<NonNull<BlockHeader>>,
}

impl BlockHeader {
    /// Size of the header itself, in bytes.
    ///
    /// Every block occupies `SIZE + size()` bytes of the pool. The size is a multiple of the header's alignment, so
    /// a payload is always aligned exactly as its header is.
    pub(crate) const SIZE: usize = mem::size_of::<BlockHeader>();

    /// In-place constructs a free `BlockHeader` at the designated location.
    ///
    /// #   Safety
    ///
    /// -   Assumes that access to the memory location is exclusive.
    /// -   Assumes that the location is sufficiently sized and aligned for a header.
    pub(crate) unsafe fn initialize(at: NonNull<u8>, size: usize, next: Option<NonNull<BlockHeader>>)
        -> NonNull<BlockHeader>
    {
        debug_assert!(utils::is_sufficiently_aligned_for(at, mem::align_of::<BlockHeader>()));

        let header = at.cast::<BlockHeader>();

        //  Safety:
        //  -   Access to the memory location is exclusive.
        //  -   `at` is assumed to be sufficiently sized and aligned.
        ptr::write(header.as_ptr(), BlockHeader { size, is_free: true, next });

        header
    }

    /// Returns the address of the payload, immediately following the header.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `header` designates a live header within a pool.
    pub(crate) unsafe fn payload(header: NonNull<BlockHeader>) -> NonNull<u8> {
        //  Safety:
        //  -   The payload immediately follows its header, so the computed pointer is at most one-past-the-end of
        //      the pool.
        NonNull::new_unchecked(header.as_ptr().add(1).cast::<u8>())
    }

    /// Returns the header governing the designated payload.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `payload` was obtained by `Self::payload` on a live header.
    pub(crate) unsafe fn from_payload(payload: NonNull<u8>) -> NonNull<BlockHeader> {
        //  Safety:
        //  -   A live header immediately precedes its payload.
        let header = NonNull::new_unchecked(payload.as_ptr().sub(Self::SIZE)).cast::<BlockHeader>();

        debug_assert!(utils::is_sufficiently_aligned_for(header.cast(), mem::align_of::<BlockHeader>()));

        header
    }

    /// Returns the payload size, in bytes.
    pub(crate) fn size(&self) -> usize { self.size }

    /// Returns whether the block is available for allocation.
    pub(crate) fn is_free(&self) -> bool { self.is_free }

    /// Returns the next header in address order, if any.
    pub(crate) fn next(&self) -> Option<NonNull<BlockHeader>> { self.next }

    /// Marks the block as allocated.
    pub(crate) fn mark_allocated(&mut self) {
        debug_assert!(self.is_free);

        self.is_free = false;
    }

    /// Marks the block as free.
    pub(crate) fn mark_free(&mut self) {
        debug_assert!(!self.is_free);

        self.is_free = true;
    }
}

/// BlockList
///
/// The intrusive list of block headers threaded through the pool, in address order, starting at the pool's base.
pub(crate) struct BlockList {
    //  First header; always located at the base of the pool.
    head: NonNull<BlockHeader>,
}

impl BlockList {
    /// Initializes the list over a fresh pool: a single free block spanning the entire region.
    ///
    /// #   Safety
    ///
    /// -   Assumes that access to the region is exclusive.
    /// -   Assumes that the region spans at least `total_size` bytes, with `total_size >= BlockHeader::SIZE`.
    /// -   Assumes that `region` is sufficiently aligned for a header.
    pub(crate) unsafe fn initialize(region: NonNull<u8>, total_size: usize) -> BlockList {
        debug_assert!(total_size >= BlockHeader::SIZE);

        //  Safety:
        //  -   Access is exclusive, and the region is sufficiently sized and aligned.
        let head = BlockHeader::initialize(region, total_size - BlockHeader::SIZE, None);

        BlockList { head }
    }

    /// Returns the first free block, in address order, whose payload can accommodate `size` bytes.
    pub(crate) fn first_fit(&self, size: usize) -> Option<NonNull<BlockHeader>> {
        let mut current = Some(self.head);

        while let Some(header) = current {
            //  Safety:
            //  -   Every header reachable from the head is live, and the list is exclusively accessed.
            let block = unsafe { header.as_ref() };

            if block.is_free() && block.size() >= size {
                return Some(header);
            }

            current = block.next();
        }

        None
    }

    /// Splits `block` so that its payload shrinks to exactly `size` bytes, the surplus forming a new free block
    /// immediately after it.
    ///
    /// No split occurs unless the surplus can host a header plus at least 1 payload byte; the block is then handed
    /// out whole, and its few surplus bytes only come back once the block is freed.
    ///
    /// #   Safety
    ///
    /// -   Assumes that `block` belongs to this list, is free, and holds at least `size` payload bytes.
    /// -   Assumes that `size` is a multiple of the header's alignment.
    pub(crate) unsafe fn split(&mut self, mut block: NonNull<BlockHeader>, size: usize) {
        debug_assert!(size % mem::align_of::<BlockHeader>() == 0);
        debug_assert!(block.as_ref().is_free());
        debug_assert!(block.as_ref().size() >= size);

        if block.as_ref().size() <= size + BlockHeader::SIZE {
            return;
        }

        let address = block.as_ptr();
        let remainder = block.as_ref().size() - size - BlockHeader::SIZE;

        //  Safety:
        //  -   The new header lies `size` bytes into the payload, which extends `block.size()` bytes past its
        //      header; `size + BlockHeader::SIZE` of those are accounted for, leaving `remainder` for the payload.
        let at = NonNull::new_unchecked(BlockHeader::payload(block).as_ptr().add(size));

        //  Safety:
        //  -   The location is exclusively accessed and sufficiently sized, as per above; it is aligned since both
        //      `size` and `BlockHeader::SIZE` are multiples of the header's alignment.
        let free = BlockHeader::initialize(at, remainder, block.as_ref().next());

        //  Safety:
        //  -   `block` is live, and the list is exclusively accessed.
        let block = block.as_mut();

        block.size = size;
        block.next = Some(free);

        trace!("split block at {:p}: {} payload bytes kept, {} freed beyond the new header",
            address, size, remainder);
    }

    /// Coalesces every run of adjacent free blocks into a single block, scanning once from the head.
    ///
    /// A block absorbing its successor is re-examined against its new successor without advancing, so an entire free
    /// run collapses in one pass. The scan only ever looks forward; a free predecessor absorbs the current block by
    /// virtue of the scan starting from the head.
    pub(crate) fn merge_forward(&mut self) {
        let mut merged = 0usize;
        let mut current = self.head;

        loop {
            //  Safety:
            //  -   Every header reachable from the head is live, and the list is exclusively accessed.
            let block = unsafe { current.as_ref() };

            let next = match block.next() {
                Some(next) => next,
                None => break,
            };

            //  Safety:
            //  -   Every header reachable from the head is live, and the list is exclusively accessed.
            let follower = unsafe { next.as_ref() };

            if block.is_free() && follower.is_free() {
                let absorbed = BlockHeader::SIZE + follower.size();
                let beyond = follower.next();

                //  Safety:
                //  -   `current` is live; `follower` is dead past this point, its header reclaimed as payload.
                let block = unsafe { current.as_mut() };

                block.size += absorbed;
                block.next = beyond;

                merged += 1;
                //  Stay put: the enlarged block may absorb its new successor too.
            } else {
                current = next;
            }
        }

        if merged > 0 {
            trace!("coalesced {} adjacent free blocks", merged);
        }
    }

    /// Returns the payload size of the largest free block, or 0 if no block is free.
    pub(crate) fn largest_free(&self) -> usize {
        let mut largest = 0;
        let mut current = Some(self.head);

        while let Some(header) = current {
            //  Safety:
            //  -   Every header reachable from the head is live, and the list is exclusively accessed.
            let block = unsafe { header.as_ref() };

            if block.is_free() && block.size() > largest {
                largest = block.size();
            }

            current = block.next();
        }

        largest
    }
}

//
//  Test introspection.
//

#[cfg(test)]
impl BlockList {
    //  Number of blocks in the list.
    pub(crate) fn block_count(&self) -> usize {
        let mut count = 0;
        let mut current = Some(self.head);

        while let Some(header) = current {
            let block = unsafe { header.as_ref() };

            count += 1;
            current = block.next();
        }

        count
    }

    //  Sum of header and payload sizes over all blocks; equals the pool size at all times.
    pub(crate) fn footprint(&self) -> usize {
        let mut footprint = 0;
        let mut current = Some(self.head);

        while let Some(header) = current {
            let block = unsafe { header.as_ref() };

            footprint += BlockHeader::SIZE + block.size();
            current = block.next();
        }

        footprint
    }

    //  Sum of payload sizes over the blocks marked allocated.
    pub(crate) fn allocated_payload(&self) -> usize {
        let mut allocated = 0;
        let mut current = Some(self.head);

        while let Some(header) = current {
            let block = unsafe { header.as_ref() };

            if !block.is_free() {
                allocated += block.size();
            }

            current = block.next();
        }

        allocated
    }

    //  Payload size and freedom of the `index`-th block, in address order.
    //
    //  #   Panics
    //
    //  If `index` is out of range.
    pub(crate) fn nth_block(&self, index: usize) -> (usize, bool) {
        let mut remaining = index;
        let mut current = Some(self.head);

        while let Some(header) = current {
            let block = unsafe { header.as_ref() };

            if remaining == 0 {
                return (block.size(), block.is_free());
            }

            remaining -= 1;
            current = block.next();
        }

        panic!("no block at index {}", index);
    }
}

// mod tests
