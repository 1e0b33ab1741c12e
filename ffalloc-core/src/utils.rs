//! A collection of utilities.

use core::ptr::NonNull;

/// Returns whether the pointer is sufficiently aligned for the given alignment.
///
/// #   Panics
///
/// In Debug, if `alignment` is not a power of 2.
pub(crate) fn is_sufficiently_aligned_for(ptr: NonNull<u8>, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());

    (ptr.as_ptr() as usize) % alignment == 0
}

/// Rounds `size` up to the nearest multiple of `alignment`.
///
/// #   Panics
///
/// In Debug, if `alignment` is not a power of 2, or if the round-up overflows.
pub(crate) fn round_up(size: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());

    let mask = alignment - 1;

    (size + mask) & !mask
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn is_sufficiently_aligned_for() {
    fn is_aligned_for(ptr: usize, alignment: usize) -> bool {
        let ptr = NonNull::new(ptr as *mut u8).unwrap();
        super::is_sufficiently_aligned_for(ptr, alignment)
    }

    fn is_not_aligned_for(ptr: usize, alignment: usize) -> bool {
        !is_aligned_for(ptr, alignment)
    }

    assert!(is_aligned_for(1, 1));
    assert!(is_aligned_for(2, 1));
    assert!(is_aligned_for(3, 1));
    assert!(is_aligned_for(4, 1));

    assert!(is_not_aligned_for(1, 2));
    assert!(is_aligned_for(2, 2));
    assert!(is_not_aligned_for(3, 2));
    assert!(is_aligned_for(4, 2));

    assert!(is_aligned_for(8, 8));
    assert!(is_aligned_for(16, 8));
    assert!(is_not_aligned_for(12, 8));
}

#[test]
fn round_up() {
    assert_eq!(0, super::round_up(0, 8));
    assert_eq!(8, super::round_up(1, 8));
    assert_eq!(8, super::round_up(7, 8));
    assert_eq!(8, super::round_up(8, 8));
    assert_eq!(16, super::round_up(9, 8));
    assert_eq!(104, super::round_up(100, 8));
    assert_eq!(304, super::round_up(300, 8));

    assert_eq!(3, super::round_up(3, 1));
    assert_eq!(4, super::round_up(3, 4));
}

} // mod tests
