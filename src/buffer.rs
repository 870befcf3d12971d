// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory reference implementation of the stream interface family
//!
//! `InMemoryStream` gives tests a real collaborator: a `copy_to` target, a
//! clone source, or a baseline to compare mock-driven code against. Clones
//! share the underlying bytes and carry an independent position, matching
//! the clone contract of the interface.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::alloc::alloc_wide;
use crate::error::{StreamError, StreamResult};
use crate::stream::{SequentialStream, Stream, StreamObject};
use crate::types::{
    CommitMode, CopyProgress, InterfaceId, LockKind, LockRange, SeekOrigin, StatFlag, StreamKind,
    StreamStat,
};

struct Shared {
    name: Option<String>,
    data: Mutex<Vec<u8>>,
    committed: Mutex<Vec<u8>>,
    locks: Mutex<Vec<LockRange>>,
    refcount: AtomicU32,
}

/// Byte-buffer stream with a per-instance position cursor
pub struct InMemoryStream {
    shared: Arc<Shared>,
    pos: Mutex<u64>,
}

impl InMemoryStream {
    pub fn new() -> Self {
        Self::with_contents(None::<String>, &[])
    }

    pub fn with_contents(name: Option<impl Into<String>>, contents: &[u8]) -> Self {
        Self {
            shared: Arc::new(Shared {
                name: name.map(Into::into),
                data: Mutex::new(contents.to_vec()),
                committed: Mutex::new(contents.to_vec()),
                locks: Mutex::new(Vec::new()),
                refcount: AtomicU32::new(1),
            }),
            pos: Mutex::new(0),
        }
    }

    /// Current position of this instance's cursor
    pub fn position(&self) -> u64 {
        *self.pos.lock().unwrap()
    }

    /// Snapshot of the current (uncommitted) contents
    pub fn contents(&self) -> Vec<u8> {
        self.shared.data.lock().unwrap().clone()
    }

    fn overlapping(a: &LockRange, b: &LockRange) -> bool {
        a.offset < b.offset.saturating_add(b.len) && b.offset < a.offset.saturating_add(a.len)
    }
}

impl Default for InMemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamObject for InMemoryStream {
    fn query_interface(&self, iid: InterfaceId) -> StreamResult<()> {
        match iid {
            InterfaceId::STREAM_OBJECT
            | InterfaceId::SEQUENTIAL_STREAM
            | InterfaceId::STREAM => Ok(()),
            _ => Err(StreamError::NoInterface),
        }
    }

    fn add_ref(&self) -> u32 {
        self.shared.refcount.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn release(&self) -> u32 {
        let prev = self.shared.refcount.load(Ordering::SeqCst);
        if prev == 0 {
            return 0;
        }
        self.shared.refcount.fetch_sub(1, Ordering::SeqCst) - 1
    }
}

impl SequentialStream for InMemoryStream {
    fn read(&self, buf: &mut [u8]) -> StreamResult<usize> {
        let data = self.shared.data.lock().unwrap();
        let mut pos = self.pos.lock().unwrap();
        let start = (*pos).min(data.len() as u64) as usize;
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        *pos += n as u64;
        Ok(n)
    }

    fn write(&self, data: &[u8]) -> StreamResult<usize> {
        let mut bytes = self.shared.data.lock().unwrap();
        let mut pos = self.pos.lock().unwrap();
        let start = *pos as usize;
        if start > bytes.len() {
            // writing past end zero-fills the gap; the allocation tracks the
            // cursor, so growth is bounded by where the caller seeked
            bytes.resize(start, 0);
        }
        let overlap = data.len().min(bytes.len().saturating_sub(start));
        bytes[start..start + overlap].copy_from_slice(&data[..overlap]);
        bytes.extend_from_slice(&data[overlap..]);
        *pos += data.len() as u64;
        Ok(data.len())
    }
}

impl Stream for InMemoryStream {
    fn seek(&self, offset: i64, origin: SeekOrigin) -> StreamResult<u64> {
        // lock order is data before pos, as in read and write
        let data = self.shared.data.lock().unwrap();
        let mut pos = self.pos.lock().unwrap();
        let base = match origin {
            SeekOrigin::Start => 0,
            SeekOrigin::Current => *pos as i64,
            SeekOrigin::End => data.len() as i64,
        };
        let target = base.checked_add(offset).ok_or(StreamError::InvalidArgument)?;
        if target < 0 {
            return Err(StreamError::InvalidSeek);
        }
        *pos = target as u64;
        Ok(*pos)
    }

    fn set_len(&self, new_len: u64) -> StreamResult<()> {
        self.shared.data.lock().unwrap().resize(new_len as usize, 0);
        Ok(())
    }

    fn copy_to(&self, dst: &dyn SequentialStream, len: u64) -> StreamResult<CopyProgress> {
        // the interface accepts counts far past end of stream; clamp before
        // sizing the transfer buffer
        let chunk_len = {
            let data = self.shared.data.lock().unwrap();
            let pos = self.pos.lock().unwrap();
            let remaining = (data.len() as u64).saturating_sub(*pos);
            len.min(remaining) as usize
        };
        let mut chunk = vec![0u8; chunk_len];
        let read = self.read(&mut chunk)?;
        let written = dst.write(&chunk[..read])?;
        Ok(CopyProgress {
            bytes_read: read as u64,
            bytes_written: written as u64,
        })
    }

    fn commit(&self, _mode: CommitMode) -> StreamResult<()> {
        let data = self.shared.data.lock().unwrap();
        *self.shared.committed.lock().unwrap() = data.clone();
        Ok(())
    }

    fn revert(&self) -> StreamResult<()> {
        let committed = self.shared.committed.lock().unwrap();
        *self.shared.data.lock().unwrap() = committed.clone();
        Ok(())
    }

    fn lock_region(&self, range: LockRange) -> StreamResult<()> {
        let mut locks = self.shared.locks.lock().unwrap();
        let conflict = locks.iter().any(|held| {
            Self::overlapping(held, &range)
                && (held.kind == LockKind::Exclusive || range.kind == LockKind::Exclusive)
        });
        if conflict {
            return Err(StreamError::LockViolation);
        }
        locks.push(range);
        Ok(())
    }

    fn unlock_region(&self, range: LockRange) -> StreamResult<()> {
        let mut locks = self.shared.locks.lock().unwrap();
        match locks.iter().position(|held| *held == range) {
            Some(idx) => {
                locks.remove(idx);
                Ok(())
            }
            None => Err(StreamError::LockViolation),
        }
    }

    fn stat(&self, out: &mut StreamStat, flags: StatFlag) -> StreamResult<()> {
        out.kind = StreamKind::Stream;
        out.len = self.shared.data.lock().unwrap().len() as u64;
        out.name = match (&self.shared.name, flags) {
            (Some(name), StatFlag::Default) => alloc_wide(name),
            _ => std::ptr::null_mut(),
        };
        Ok(())
    }

    fn clone_stream(&self) -> StreamResult<Box<dyn Stream>> {
        Ok(Box::new(InMemoryStream {
            shared: Arc::clone(&self.shared),
            pos: Mutex::new(*self.pos.lock().unwrap()),
        }))
    }
}
