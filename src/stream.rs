// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The three-tier storage-stream interface family
//!
//! Consumers interact with a stream only through these traits, which mirror
//! the abstract capability set of the interface the test double substitutes
//! for: a reference-counted object, a sequential read/write stream, and an
//! extended stream with random access, region locking, stat, and cloning.
//! All traits are object-safe; real call sites hold `Box<dyn Stream>` or
//! `&dyn SequentialStream`.

use crate::error::StreamResult;
use crate::types::{
    CommitMode, CopyProgress, InterfaceId, LockRange, SeekOrigin, StatFlag, StreamStat,
};

/// Tier 1: reference-counted object lifetime
pub trait StreamObject: Send + Sync {
    /// Ask whether the object supports the given interface tier
    fn query_interface(&self, iid: InterfaceId) -> StreamResult<()>;

    /// Increment the reference count, returning the new count
    fn add_ref(&self) -> u32;

    /// Decrement the reference count, returning the new count
    fn release(&self) -> u32;
}

/// Tier 2: sequential byte-oriented transfer
pub trait SequentialStream: StreamObject {
    /// Read up to `buf.len()` bytes at the current position
    fn read(&self, buf: &mut [u8]) -> StreamResult<usize>;

    /// Write `data` at the current position
    fn write(&self, data: &[u8]) -> StreamResult<usize>;
}

/// Tier 3: random access, sizing, transactions, region locks, stat, clone
pub trait Stream: SequentialStream {
    /// Move the position by `offset` relative to `origin`, returning the new
    /// absolute position
    fn seek(&self, offset: i64, origin: SeekOrigin) -> StreamResult<u64>;

    /// Resize the stream to `new_len` bytes
    fn set_len(&self, new_len: u64) -> StreamResult<()>;

    /// Copy `len` bytes from the current position into `dst`
    fn copy_to(&self, dst: &dyn SequentialStream, len: u64) -> StreamResult<CopyProgress>;

    /// Flush pending changes according to `mode`
    fn commit(&self, mode: CommitMode) -> StreamResult<()>;

    /// Discard changes made since the last commit
    fn revert(&self) -> StreamResult<()>;

    /// Lock the given byte range
    fn lock_region(&self, range: LockRange) -> StreamResult<()>;

    /// Release a previously locked byte range
    fn unlock_region(&self, range: LockRange) -> StreamResult<()>;

    /// Fill `out` with a descriptor of this stream
    ///
    /// When the implementation materializes a name, ownership of the
    /// allocation transfers to the caller; see [`StreamStat`].
    fn stat(&self, out: &mut StreamStat, flags: StatFlag) -> StreamResult<()>;

    /// Create a new stream over the same bytes with an independent position
    fn clone_stream(&self) -> StreamResult<Box<dyn Stream>>;
}
