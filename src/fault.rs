// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fault injection decorator for stream test doubles
//!
//! `FaultStream` wraps any [`Stream`] and injects configurable failures
//! according to a [`FailureBehavior`] policy, counting calls per operation
//! so tests can assert exactly when a failure fired. A JSON-serializable
//! [`FaultPolicy`] describes the same thing declaratively for tests driven
//! from fixture files.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use libc::EIO;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StreamError, StreamResult};
use crate::stream::{SequentialStream, Stream, StreamObject};
use crate::types::{
    CommitMode, CopyProgress, InterfaceId, LockRange, SeekOrigin, StatFlag, StreamStat,
};

/// Custom predicate function type for fault injection
pub type FaultPredicate = Arc<dyn Fn(&str, u64) -> Option<StreamError> + Send + Sync>;

/// Configurable failure behavior for decorated stream operations
pub enum FailureBehavior {
    /// Never fail - all operations pass through
    AlwaysSucceed,

    /// Fail after N successful calls to a specific operation
    FailAfter {
        op: &'static str,
        count: u64,
        error_fn: Arc<dyn Fn() -> StreamError + Send + Sync>,
    },

    /// Fail for the first N calls to a specific operation
    FailFor {
        op: &'static str,
        count: u64,
        error_fn: Arc<dyn Fn() -> StreamError + Send + Sync>,
    },

    /// Always fail a specific operation with a specific error
    AlwaysFail {
        op: &'static str,
        error_fn: Arc<dyn Fn() -> StreamError + Send + Sync>,
    },

    /// Custom predicate receiving (operation_name, call_count)
    Custom(FaultPredicate),
}

impl Default for FailureBehavior {
    fn default() -> Self {
        Self::AlwaysSucceed
    }
}

/// Supported operations for stream-level fault injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultOp {
    Read,
    Write,
    Seek,
    SetLen,
    CopyTo,
    Commit,
    Revert,
    LockRegion,
    UnlockRegion,
    Stat,
    CloneStream,
}

impl FaultOp {
    fn name(self) -> &'static str {
        match self {
            FaultOp::Read => "read",
            FaultOp::Write => "write",
            FaultOp::Seek => "seek",
            FaultOp::SetLen => "set_len",
            FaultOp::CopyTo => "copy_to",
            FaultOp::Commit => "commit",
            FaultOp::Revert => "revert",
            FaultOp::LockRegion => "lock_region",
            FaultOp::UnlockRegion => "unlock_region",
            FaultOp::Stat => "stat",
            FaultOp::CloneStream => "clone_stream",
        }
    }
}

/// Supported synthetic failure codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCode {
    Eio,
    NoSpace,
    AccessDenied,
    LockViolation,
    Busy,
}

impl FaultCode {
    fn to_error(self) -> StreamError {
        match self {
            FaultCode::Eio => StreamError::Io(io::Error::from_raw_os_error(EIO)),
            FaultCode::NoSpace => StreamError::NoSpace,
            FaultCode::AccessDenied => StreamError::AccessDenied,
            FaultCode::LockViolation => StreamError::LockViolation,
            FaultCode::Busy => StreamError::Busy,
        }
    }
}

/// Individual rule describing which op should fail and how often.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FaultRule {
    pub op: FaultOp,
    pub code: FaultCode,
    /// Number of leading invocations to skip before injecting faults.
    #[serde(default)]
    pub start_after: u64,
    /// Maximum number of injected failures for this rule.
    #[serde(default)]
    pub max_faults: Option<u64>,
}

impl Default for FaultRule {
    fn default() -> Self {
        Self {
            op: FaultOp::Write,
            code: FaultCode::Eio,
            start_after: 0,
            max_faults: None,
        }
    }
}

/// JSON-serializable fault policy for fixture-driven tests.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct FaultPolicy {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub rules: Vec<FaultRule>,
}

impl FaultPolicy {
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Compile the policy into a behavior usable by [`FaultStream`]
    pub fn into_behavior(self) -> FailureBehavior {
        if !self.enabled || self.rules.is_empty() {
            return FailureBehavior::AlwaysSucceed;
        }
        let rules = self.rules;
        let injected = Mutex::new(vec![0u64; rules.len()]);
        FailureBehavior::Custom(Arc::new(move |op, count| {
            let mut injected = injected.lock().unwrap();
            for (idx, rule) in rules.iter().enumerate() {
                if rule.op.name() != op || count < rule.start_after {
                    continue;
                }
                if let Some(max) = rule.max_faults {
                    if injected[idx] >= max {
                        continue;
                    }
                }
                injected[idx] += 1;
                return Some(rule.code.to_error());
            }
            None
        }))
    }
}

/// Stream decorator that delegates to an inner stream and injects
/// configurable failures
pub struct FaultStream {
    inner: Box<dyn Stream>,
    behavior: Mutex<FailureBehavior>,
    call_counts: Mutex<HashMap<String, AtomicU64>>,
}

impl FaultStream {
    /// Wrap `inner` with a decorator that never fails
    pub fn new(inner: Box<dyn Stream>) -> Self {
        Self::with_behavior(inner, FailureBehavior::AlwaysSucceed)
    }

    /// Wrap `inner` with the specified failure behavior
    pub fn with_behavior(inner: Box<dyn Stream>, behavior: FailureBehavior) -> Self {
        Self {
            inner,
            behavior: Mutex::new(behavior),
            call_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Update the failure behavior at runtime
    pub fn set_behavior(&self, behavior: FailureBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Number of times a specific operation has been called
    pub fn call_count(&self, op: &str) -> u64 {
        self.call_counts
            .lock()
            .unwrap()
            .get(op)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Reset all call counters to zero
    pub fn reset_counters(&self) {
        let counts = self.call_counts.lock().unwrap();
        for counter in counts.values() {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn check_fault(&self, op: &str) -> Result<(), StreamError> {
        let mut counts_guard = self.call_counts.lock().unwrap();
        let counter = counts_guard.entry(op.to_string()).or_insert_with(|| AtomicU64::new(0));
        let current_count = counter.fetch_add(1, Ordering::SeqCst);
        drop(counts_guard);

        let behavior_guard = self.behavior.lock().unwrap();
        let injected = match &*behavior_guard {
            FailureBehavior::AlwaysSucceed => None,

            FailureBehavior::FailAfter {
                op: target,
                count: threshold,
                error_fn,
            } => (op == *target && current_count >= *threshold).then(|| error_fn()),

            FailureBehavior::FailFor {
                op: target,
                count: limit,
                error_fn,
            } => (op == *target && current_count < *limit).then(|| error_fn()),

            FailureBehavior::AlwaysFail { op: target, error_fn } => {
                (op == *target).then(|| error_fn())
            }

            FailureBehavior::Custom(predicate) => predicate(op, current_count),
        };

        match injected {
            Some(err) => {
                debug!(op, call = current_count, error = %err, "injected fault");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

impl StreamObject for FaultStream {
    fn query_interface(&self, iid: InterfaceId) -> StreamResult<()> {
        self.check_fault("query_interface")?;
        self.inner.query_interface(iid)
    }

    fn add_ref(&self) -> u32 {
        self.inner.add_ref()
    }

    fn release(&self) -> u32 {
        self.inner.release()
    }
}

impl SequentialStream for FaultStream {
    fn read(&self, buf: &mut [u8]) -> StreamResult<usize> {
        self.check_fault("read")?;
        self.inner.read(buf)
    }

    fn write(&self, data: &[u8]) -> StreamResult<usize> {
        self.check_fault("write")?;
        self.inner.write(data)
    }
}

impl Stream for FaultStream {
    fn seek(&self, offset: i64, origin: SeekOrigin) -> StreamResult<u64> {
        self.check_fault("seek")?;
        self.inner.seek(offset, origin)
    }

    fn set_len(&self, new_len: u64) -> StreamResult<()> {
        self.check_fault("set_len")?;
        self.inner.set_len(new_len)
    }

    fn copy_to(&self, dst: &dyn SequentialStream, len: u64) -> StreamResult<CopyProgress> {
        self.check_fault("copy_to")?;
        self.inner.copy_to(dst, len)
    }

    fn commit(&self, mode: CommitMode) -> StreamResult<()> {
        self.check_fault("commit")?;
        self.inner.commit(mode)
    }

    fn revert(&self) -> StreamResult<()> {
        self.check_fault("revert")?;
        self.inner.revert()
    }

    fn lock_region(&self, range: LockRange) -> StreamResult<()> {
        self.check_fault("lock_region")?;
        self.inner.lock_region(range)
    }

    fn unlock_region(&self, range: LockRange) -> StreamResult<()> {
        self.check_fault("unlock_region")?;
        self.inner.unlock_region(range)
    }

    fn stat(&self, out: &mut StreamStat, flags: StatFlag) -> StreamResult<()> {
        self.check_fault("stat")?;
        self.inner.stat(out, flags)
    }

    fn clone_stream(&self) -> StreamResult<Box<dyn Stream>> {
        self.check_fault("clone_stream")?;
        self.inner.clone_stream()
    }
}

/// Helper function to create a simple EIO error for testing
pub fn eio_error() -> StreamError {
    FaultCode::Eio.to_error()
}

/// Helper function to create a no-space error for testing
pub fn no_space_error() -> StreamError {
    StreamError::NoSpace
}
