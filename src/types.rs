// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Core type definitions for the stream test double

use serde::{Deserialize, Serialize};

/// Wide character as carried by the stream interface family (UTF-16 code unit)
pub type WideChar = u16;

/// Opaque interface identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceId(pub [u8; 16]);

impl std::fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity(32);
        for &byte in &self.0 {
            s.push_str(&format!("{:02x}", byte));
        }
        f.write_str(&s)
    }
}

impl InterfaceId {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Tier-1 lifetime interface (reference counting)
    pub const STREAM_OBJECT: InterfaceId = InterfaceId([0u8; 16]);
    /// Tier-2 sequential read/write interface
    pub const SEQUENTIAL_STREAM: InterfaceId = InterfaceId([1u8; 16]);
    /// Tier-3 extended random-access interface
    pub const STREAM: InterfaceId = InterfaceId([2u8; 16]);
}

/// Origin for seek operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekOrigin {
    Start,
    Current,
    End,
}

/// Commit semantics requested by the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitMode {
    Default,
    Overwrite,
    OnlyIfCurrent,
}

/// Stat flag controlling whether the descriptor name is materialized
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatFlag {
    Default,
    NoName,
}

/// Lock kind for byte-range locking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockKind {
    Shared,
    Exclusive,
}

/// Byte range lock specification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockRange {
    pub offset: u64,
    pub len: u64,
    pub kind: LockKind,
}

/// Bytes consumed on each side of a copy-to operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CopyProgress {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Kind of object described by a stat descriptor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    Stream,
    Storage,
    ByteArray,
}

/// Stream descriptor filled by the stat operation
///
/// Fixed layout so the record can cross the same binary seams the real
/// interface does. `name` is either null or a null-terminated wide string
/// allocated with the shared task allocator; ownership transfers to the
/// caller on return, and the caller must release it via
/// [`crate::alloc::free_wide`].
#[repr(C)]
#[derive(Debug)]
pub struct StreamStat {
    pub name: *mut WideChar,
    pub kind: StreamKind,
    pub len: u64,
}

impl StreamStat {
    pub fn new() -> Self {
        Self {
            name: std::ptr::null_mut(),
            kind: StreamKind::Stream,
            len: 0,
        }
    }
}

impl Default for StreamStat {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_id_display_is_hex() {
        assert_eq!(InterfaceId::STREAM.to_string(), "02".repeat(16));
    }

    #[test]
    fn stat_descriptor_starts_with_null_name() {
        let stat = StreamStat::new();
        assert!(stat.name.is_null());
        assert_eq!(stat.len, 0);
        assert_eq!(stat.kind, StreamKind::Stream);
    }
}
