// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Mock implementation of the stream interface family
//!
//! `MockStream` is one mock object implementing all three interface tiers.
//! It has no behavior of its own: every call is recorded (arguments, count,
//! order) and answered from caller-installed expectations, and the mocking
//! framework fails the enclosing test on an unexpected call or an
//! expectation left unmet at drop. Semantics such as "seek moves the
//! position" belong to whoever configures the expectations, not to this
//! type.
//!
//! One instance per test case; expectations are tracked against the
//! specific instance, so the mock is deliberately not `Clone`.

use crate::error::StreamResult;
use crate::stream::{SequentialStream, Stream, StreamObject};
use crate::types::{
    CommitMode, CopyProgress, InterfaceId, LockRange, SeekOrigin, StatFlag, StreamStat,
};

mockall::mock! {
    pub Stream {}

    impl StreamObject for Stream {
        fn query_interface(&self, iid: InterfaceId) -> StreamResult<()>;
        fn add_ref(&self) -> u32;
        fn release(&self) -> u32;
    }

    impl SequentialStream for Stream {
        fn read(&self, buf: &mut [u8]) -> StreamResult<usize>;
        fn write(&self, data: &[u8]) -> StreamResult<usize>;
    }

    impl Stream for Stream {
        fn seek(&self, offset: i64, origin: SeekOrigin) -> StreamResult<u64>;
        fn set_len(&self, new_len: u64) -> StreamResult<()>;
        fn copy_to(&self, dst: &dyn SequentialStream, len: u64) -> StreamResult<CopyProgress>;
        fn commit(&self, mode: CommitMode) -> StreamResult<()>;
        fn revert(&self) -> StreamResult<()>;
        fn lock_region(&self, range: LockRange) -> StreamResult<()>;
        fn unlock_region(&self, range: LockRange) -> StreamResult<()>;
        fn stat(&self, out: &mut StreamStat, flags: StatFlag) -> StreamResult<()>;
        fn clone_stream(&self) -> StreamResult<Box<dyn Stream>>;
    }
}
