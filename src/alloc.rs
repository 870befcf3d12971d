// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Shared task allocator pairing for descriptor names
//!
//! Descriptor names cross the same binary seams the real interface does, so
//! they use the one allocation mechanism that stays matched across module
//! boundaries: `libc::malloc` paired with `libc::free`. Allocations and
//! releases are counted so tests can verify the caller-owned round trip
//! neither leaks nor double-frees.

use std::alloc::Layout;
use std::mem::size_of;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::types::WideChar;

static ALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static RELEASES: AtomicU64 = AtomicU64::new(0);

/// Number of wide-name allocations performed so far
pub fn allocation_count() -> u64 {
    ALLOCATIONS.load(Ordering::SeqCst)
}

/// Number of wide-name releases performed so far
pub fn release_count() -> u64 {
    RELEASES.load(Ordering::SeqCst)
}

/// Allocations not yet released
pub fn live_allocations() -> u64 {
    allocation_count().saturating_sub(release_count())
}

/// Allocate a null-terminated wide copy of `s` with the shared allocator
///
/// Ownership transfers to the caller, who must release the result via
/// [`free_wide`]. Allocation exhaustion aborts the process; this is
/// test-only scaffolding and does not report out-of-memory through result
/// codes.
pub fn alloc_wide(s: &str) -> *mut WideChar {
    let units: Vec<WideChar> = s.encode_utf16().chain(std::iter::once(0)).collect();
    let ptr = unsafe { libc::malloc(units.len() * size_of::<WideChar>()) } as *mut WideChar;
    if ptr.is_null() {
        let layout = Layout::array::<WideChar>(units.len()).expect("layout overflow");
        std::alloc::handle_alloc_error(layout);
    }
    unsafe {
        std::ptr::copy_nonoverlapping(units.as_ptr(), ptr, units.len());
    }
    ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
    trace!(units = units.len(), "allocated wide name");
    ptr
}

/// Release a wide name previously produced by [`alloc_wide`]
///
/// Tolerates null (a no-op), matching the deallocator the real interface
/// pairs with.
///
/// # Safety
/// `ptr` must be null or a pointer obtained from [`alloc_wide`] that has
/// not been released before.
pub unsafe fn free_wide(ptr: *mut WideChar) {
    if ptr.is_null() {
        return;
    }
    libc::free(ptr as *mut libc::c_void);
    RELEASES.fetch_add(1, Ordering::SeqCst);
    trace!("released wide name");
}

/// Length in code units of a null-terminated wide string, excluding the
/// terminator
///
/// # Safety
/// `ptr` must point to a null-terminated wide string.
pub unsafe fn wide_len(ptr: *const WideChar) -> usize {
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    len
}

/// Decode a wide name back into a `String`, or `None` for a null pointer
///
/// # Safety
/// `ptr` must be null or point to a null-terminated wide string.
pub unsafe fn wide_to_string(ptr: *const WideChar) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let units = std::slice::from_raw_parts(ptr, wide_len(ptr));
    Some(String::from_utf16_lossy(units))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_round_trip_preserves_content() {
        let ptr = alloc_wide("example");
        assert!(!ptr.is_null());
        unsafe {
            assert_eq!(wide_len(ptr), 7);
            assert_eq!(wide_to_string(ptr).as_deref(), Some("example"));
            free_wide(ptr);
        }
    }

    #[test]
    fn empty_string_still_allocates_terminator() {
        let ptr = alloc_wide("");
        assert!(!ptr.is_null());
        unsafe {
            assert_eq!(wide_len(ptr), 0);
            assert_eq!(wide_to_string(ptr).as_deref(), Some(""));
            free_wide(ptr);
        }
    }

    #[test]
    fn non_ascii_names_survive_utf16_encoding() {
        let ptr = alloc_wide("schräg-𝕊");
        unsafe {
            assert_eq!(wide_to_string(ptr).as_deref(), Some("schräg-𝕊"));
            free_wide(ptr);
        }
    }

    #[test]
    fn null_is_a_no_op_for_free_and_decode() {
        unsafe {
            free_wide(std::ptr::null_mut());
            assert_eq!(wide_to_string(std::ptr::null()), None);
        }
    }
}
