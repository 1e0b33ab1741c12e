//! Implementation of Unix specific calls.

use core::{alloc::Layout, ptr};

use ffalloc_core::Platform;

/// Implementation of the Platform trait, for Unix.
#[derive(Default)]
pub(crate) struct FFPlatform;

impl FFPlatform {
    //  Smallest page size `mmap` may assume; actual pages may be larger, and are at least this aligned.
    const PAGE_SIZE: usize = 4096;

    /// Creates an instance.
    pub(crate) const fn new() -> Self { Self }
}

impl Platform for FFPlatform {
    unsafe fn reserve(&self, layout: Layout) -> Option<ptr::NonNull<u8>> {
        assert!(layout.align() <= Self::PAGE_SIZE,
            "Incorrect alignment: {} > {}", layout.align(), Self::PAGE_SIZE);

        mmap_reserve(layout.size())
    }

    unsafe fn release(&self, region: ptr::NonNull<u8>, layout: Layout) {
        munmap_release(region.as_ptr(), layout.size());
    }
}

//  Wrapper around `mmap`.
//
//  Returns a pointer to `size` bytes of memory; the pointer is page-aligned.
fn mmap_reserve(size: usize) -> Option<ptr::NonNull<u8>> {
    let length = size;
    let prot = libc::PROT_READ | libc::PROT_WRITE;
    let flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;

    //  No specific address hint.
    let addr = ptr::null_mut();
    //  When used in conjunction with MAP_ANONYMOUS, fd is mandated to be -1 on some implementations.
    let fd = -1;
    //  When used in conjunction with MAP_ANONYMOUS, offset is mandated to be 0 on some implementations.
    let offset = 0;

    //  Safety:
    //  -   `addr`, `fd`, and `offset` are suitable for MAP_ANONYMOUS.
    let result = unsafe { libc::mmap(addr, length, prot, flags, fd, offset) };

    let result = if result != libc::MAP_FAILED { result as *mut u8 } else { ptr::null_mut() };
    ptr::NonNull::new(result)
}

//  Wrapper around `munmap`.
//
//  #   Panics
//
//  If `munmap` returns a non-0 result.
//
//  #   Safety
//
//  -   Assumes that `addr` points to a `mmap`ed area of at least `size` bytes.
//  -   Assumes that the range `[addr, addr + size)` is no longer in use.
unsafe fn munmap_release(addr: *mut u8, size: usize) {
    let result = libc::munmap(addr as *mut libc::c_void, size);
    assert!(result == 0, "Could not munmap {:x}, {}: {}", addr as usize, size, result);
}
