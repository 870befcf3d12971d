// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Test double for a three-tier storage-stream interface family
//!
//! The crate provides one mock ([`MockStream`], built on `mockall`) that
//! records every call and answers from caller-installed expectations, a
//! canned [`stat_with_name`] responder whose descriptor names follow the
//! caller-owned, allocator-matched memory contract of the real interface,
//! an in-memory reference stream for expectations that need a live
//! collaborator, and a fault-injection decorator for scripted failure
//! scenarios.
//!
//! ```
//! use stream_mock::{MockStream, SequentialStream, StreamError};
//!
//! let mut mock = MockStream::new();
//! mock.expect_read().times(1).returning(|_| Err(StreamError::AccessDenied));
//!
//! assert!(matches!(mock.read(&mut [0u8; 16]), Err(StreamError::AccessDenied)));
//! ```

pub mod alloc;
pub mod buffer;
pub mod error;
pub mod fault;
pub mod mock;
pub mod stat;
pub mod stream;
pub mod types;

pub use buffer::InMemoryStream;
pub use error::{StreamError, StreamResult};
pub use fault::{FailureBehavior, FaultCode, FaultOp, FaultPolicy, FaultRule, FaultStream};
pub use mock::MockStream;
pub use stat::stat_with_name;
pub use stream::{SequentialStream, Stream, StreamObject};
pub use types::{
    CommitMode, CopyProgress, InterfaceId, LockKind, LockRange, SeekOrigin, StatFlag, StreamKind,
    StreamStat, WideChar,
};
