//! Platform
//!
//! The Platform trait is used to reserve the pool's backing memory directly from the Platform. By abstracting the
//! underlying platform, it becomes possible to easily port the code to a different OS, or even to a bare-metal
//! target.
//!
//! The platform is solicited exactly twice per pool: once to reserve the region when the pool is created, and once
//! to release it when the pool is dropped. Carving blocks out of the region involves no further call.

use core::{
    alloc::Layout,
    ptr::NonNull,
};

/// Abstraction of platform specific memory reservation and release.
pub trait Platform {
    /// Reserves a fresh region of memory as per the specified layout.
    ///
    /// May return None if the reservation request cannot be satisfied.
    ///
    /// #   Safety
    ///
    /// The caller may assume that if a pointer is returned then:
    /// -   The number of usable bytes is _greater than or equal_ to `layout.size()`.
    /// -   The pointer is _at least_ aligned to `layout.align()`.
    ///
    /// `reserve` assumes that:
    /// -   `layout.size()` is non-zero.
    /// -   `layout.align()` is non-zero, and is a power of 2.
    unsafe fn reserve(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Releases the supplied region of memory.
    ///
    /// #   Safety
    ///
    /// The caller should no longer reference the memory after calling this function.
    ///
    /// `release` assumes that:
    /// -   `region` was reserved by this instance of `Platform`, with `layout` as argument.
    /// -   `region` is the value returned by `reserve`, and not an interior pointer.
    unsafe fn release(&self, region: NonNull<u8>, layout: Layout);
}

impl<'a, P> Platform for &'a P
    where
        P: Platform,
{
    unsafe fn reserve(&self, layout: Layout) -> Option<NonNull<u8>> { (**self).reserve(layout) }

    unsafe fn release(&self, region: NonNull<u8>, layout: Layout) { (**self).release(region, layout) }
}
