// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the stream test double

use std::io;

/// Stream operation error type
///
/// These are the result codes a test author configures on the mock; the
/// double itself never raises them on its own.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error("access denied")]
    AccessDenied,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("seek before start of stream")]
    InvalidSeek,
    #[error("lock violation")]
    LockViolation,
    #[error("busy")]
    Busy,
    #[error("interface not supported")]
    NoInterface,
    #[error("no space left")]
    NoSpace,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported")]
    Unsupported,
}

pub type StreamResult<T> = Result<T, StreamError>;
