use std::{mem, ptr, slice};

use ffalloc::{FFAllocator, OutOfMemory, HEADER_SIZE};

//  Requests are rounded up to the alignment of the block headers, a pointer's worth.
fn rounded(size: usize) -> usize {
    let mask = mem::align_of::<usize>() - 1;

    (size + mask) & !mask
}

#[test]
fn creation_rejects_an_undersized_pool() {
    assert!(FFAllocator::new(0).is_err());
    assert!(FFAllocator::new(HEADER_SIZE - 1).is_err());
    assert!(FFAllocator::new(HEADER_SIZE).is_ok());
}

#[test]
fn allocate_then_use() {
    let mut allocator = FFAllocator::new(4096).expect("a pool");

    let payload = allocator.allocate(64).expect("64 bytes");

    //  Safety:
    //  -   The payload spans at least 64 writable bytes.
    unsafe { ptr::write_bytes(payload.as_ptr(), 0xab, 64) };

    //  Safety:
    //  -   The 64 bytes were just written.
    let bytes = unsafe { slice::from_raw_parts(payload.as_ptr(), 64) };

    assert!(bytes.iter().all(|&byte| byte == 0xab));

    //  Safety:
    //  -   `payload` was allocated above, and is no longer in use.
    unsafe { allocator.deallocate(Some(payload)) };
}

#[test]
fn deallocate_none_is_accepted() {
    let mut allocator = FFAllocator::new(1024).expect("a pool");

    //  Safety:
    //  -   None is trivially valid.
    unsafe { allocator.deallocate(None) };

    assert_eq!(0, allocator.statistics().current_usage);
}

#[test]
fn exhaustion_recovers_after_a_free() {
    let mut allocator = FFAllocator::new(4096).expect("a pool");

    let payload = allocator.allocate(4096 - HEADER_SIZE).expect("the whole pool");

    assert_eq!(Err(OutOfMemory), allocator.allocate(1));

    //  Safety:
    //  -   `payload` was allocated above, and is no longer in use.
    unsafe { allocator.deallocate(Some(payload)) };

    assert!(allocator.allocate(1).is_ok());
}

#[test]
fn first_fit_reuses_an_exact_hole() {
    let mut allocator = FFAllocator::new(4096).expect("a pool");

    let a = allocator.allocate(256).expect("256 bytes");
    let b = allocator.allocate(256).expect("256 bytes");

    //  Safety:
    //  -   `a` was allocated above, and is no longer in use.
    unsafe { allocator.deallocate(Some(a)) };

    //  An exact fit: the hole is handed back whole, without a split.
    let c = allocator.allocate(256).expect("256 bytes");

    assert_eq!(a, c);
    assert_eq!(512, allocator.statistics().current_usage);
    assert_eq!(512, allocator.statistics().peak_usage);

    //  Safety:
    //  -   Both payloads were allocated above, deallocated exactly once, and are no longer in use.
    unsafe { allocator.deallocate(Some(b)) };
    unsafe { allocator.deallocate(Some(c)) };
}

#[test]
fn fragmentation_follows_the_documented_formula() {
    let mut allocator = FFAllocator::new(1024).expect("a pool");

    let a = allocator.allocate(100).expect("100 bytes");
    let _b = allocator.allocate(200).expect("200 bytes");

    //  Safety:
    //  -   `a` was allocated above, and is no longer in use.
    unsafe { allocator.deallocate(Some(a)) };

    let statistics = allocator.statistics();

    //  The trailing free block outweighs the freed hole.
    let tail = 1024 - 3 * HEADER_SIZE - rounded(100) - 200;

    assert_eq!(200, statistics.current_usage);
    assert_eq!(tail, statistics.largest_free_block);
    assert_eq!((1024 - tail - 200) * 100 / 1024, statistics.fragmentation_percent());
}

#[test]
fn demonstration_scenario() {
    const POOL: usize = 1024 * 1024;

    let mut allocator = FFAllocator::new(POOL).expect("a 1 MiB pool");

    let initial = allocator.statistics();

    assert_eq!(POOL, initial.total_size);
    assert_eq!(0, initial.current_usage);
    assert_eq!(0, initial.peak_usage);
    assert_eq!(POOL - HEADER_SIZE, initial.largest_free_block);

    let a = allocator.allocate(256).expect("256 bytes");
    let b = allocator.allocate(512).expect("512 bytes");
    let c = allocator.allocate(128).expect("128 bytes");

    let loaded = allocator.statistics();

    assert_eq!(896, loaded.current_usage);
    assert_eq!(896, loaded.peak_usage);
    assert_eq!(POOL - 4 * HEADER_SIZE - 896, loaded.largest_free_block);

    //  Safety:
    //  -   `b` was allocated above, and is no longer in use.
    unsafe { allocator.deallocate(Some(b)) };

    let holed = allocator.statistics();

    assert_eq!(384, holed.current_usage);
    assert_eq!(896, holed.peak_usage);

    //  A hole of a few hundred bytes barely registers against a 1 MiB pool.
    assert_eq!(0, holed.fragmentation_percent());

    //  First fit: the hole comes before the large trailing block, so it is the one carved up.
    let d = allocator.allocate(300).expect("300 bytes");

    assert_eq!(b, d);
    assert_eq!(384 + rounded(300), allocator.statistics().current_usage);
    assert_eq!(896, allocator.statistics().peak_usage);

    //  Safety:
    //  -   Each payload was allocated above, is deallocated exactly once, and is no longer in use.
    unsafe { allocator.deallocate(Some(a)) };
    unsafe { allocator.deallocate(Some(c)) };
    unsafe { allocator.deallocate(Some(d)) };

    let settled = allocator.statistics();

    assert_eq!(0, settled.current_usage);
    assert_eq!(896, settled.peak_usage);
    assert_eq!(POOL - HEADER_SIZE, settled.largest_free_block);
    assert_eq!(0, settled.fragmentation_percent());

    //  The pool collapsed back to a single block, usable wall to wall.
    let e = allocator.allocate(POOL - HEADER_SIZE).expect("the whole pool");

    //  Safety:
    //  -   `e` was allocated above, and is no longer in use.
    unsafe { allocator.deallocate(Some(e)) };
}

#[test]
fn statistics_render_one_line_per_quantity() {
    let allocator = FFAllocator::new(1024).expect("a pool");

    let expected = format!(
        "Total Memory: 1024 bytes\nCurrent Usage: 0 bytes\nPeak Usage: 0 bytes\nFragmentation: {}%",
        HEADER_SIZE * 100 / 1024
    );

    assert_eq!(expected, format!("{}", allocator.statistics()));
}

#[test]
fn out_of_memory_renders_tersely() {
    assert_eq!("out of memory", format!("{}", OutOfMemory));
}
