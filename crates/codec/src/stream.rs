//! BinaryStream - byte-addressable source/sink
//!
//! The codec only needs this contract. Two backends are provided: a growable
//! memory buffer and a file handle.

use bytes::Bytes;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, StreamError};

/// Reference point of a seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Begin,
    Current,
    End,
}

/// Byte stream contract
///
/// One stream must not be shared by concurrent codec calls.
pub trait BinaryStream {
    /// Read up to `buf.len()` bytes at the cursor, returning the count read.
    /// Returns fewer only at end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write `buf` at the cursor, returning the count written. A write that
    /// cannot complete leaves the length unchanged and returns fewer bytes.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Move the cursor, returning the new absolute position
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64>;

    /// Cursor position
    fn tell(&self) -> u64;

    /// Total stream length in bytes
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cursor at or past the last byte
    fn at_end(&self) -> bool {
        self.tell() >= self.len()
    }

    /// Bytes between the cursor and the end
    fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.tell())
    }

    /// Stream usable (open and not failed)
    fn is_good(&self) -> bool;

    fn close(&mut self);
}

fn resolve(offset: i64, origin: SeekOrigin, current: u64, len: u64) -> Result<u64> {
    let base = match origin {
        SeekOrigin::Begin => 0,
        SeekOrigin::Current => i64::try_from(current).map_err(|_| StreamError::Seek { offset })?,
        SeekOrigin::End => i64::try_from(len).map_err(|_| StreamError::Seek { offset })?,
    };
    match base.checked_add(offset) {
        Some(target) if target >= 0 => Ok(target as u64),
        Some(target) => Err(StreamError::Seek { offset: target }),
        None => Err(StreamError::Seek { offset }),
    }
}

/// In-memory stream
///
/// Seeking past the end is allowed; a later write zero-fills the gap.
/// An optional capacity turns it into a fixed-size sink: a write that does
/// not fit is refused whole and reports zero bytes written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStream {
    buffer: Vec<u8>,
    position: usize,
    capacity: Option<usize>,
    closed: bool,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed-size sink holding at most `capacity` bytes
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Default::default()
        }
    }

    /// Stream positioned at the start of existing content
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            buffer: data.into().to_vec(),
            ..Default::default()
        }
    }

    /// Current content
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.buffer)
    }
}

impl From<Vec<u8>> for MemoryStream {
    fn from(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            ..Default::default()
        }
    }
}

impl BinaryStream for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let start = self.position.min(self.buffer.len());
        let n = buf.len().min(self.buffer.len() - start);
        buf[..n].copy_from_slice(&self.buffer[start..start + n]);
        self.position += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let limit = self.capacity.unwrap_or(usize::MAX);
        if buf.len() > limit.saturating_sub(self.position) {
            return Ok(0);
        }
        let end = self.position + buf.len();
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[self.position..end].copy_from_slice(buf);
        self.position = end;
        Ok(buf.len())
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let target = resolve(offset, origin, self.tell(), self.len())?;
        self.position = target as usize;
        Ok(target)
    }

    fn tell(&self) -> u64 {
        self.position as u64
    }

    fn len(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn is_good(&self) -> bool {
        !self.closed
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// File access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    /// Create or truncate
    Write,
    ReadWrite,
}

/// File-backed stream
#[derive(Debug)]
pub struct FileStream {
    file: Option<File>,
    position: u64,
    len: u64,
}

impl FileStream {
    pub fn open(path: impl AsRef<Path>, mode: FileMode) -> Result<Self> {
        let mut options = OpenOptions::new();
        match mode {
            FileMode::Read => options.read(true),
            FileMode::Write => options.write(true).create(true).truncate(true),
            FileMode::ReadWrite => options.read(true).write(true).create(true),
        };
        let file = options.open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file: Some(file),
            position: 0,
            len,
        })
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(StreamError::Closed)
    }

    /// Drop whatever a failed write left behind
    fn rollback(&mut self, position: u64, len: u64) -> Result<()> {
        let file = self.file()?;
        file.set_len(len)?;
        file.seek(SeekFrom::Start(position))?;
        self.position = position;
        self.len = len;
        Ok(())
    }
}

impl BinaryStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let file = self.file()?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.position += filled as u64;
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let (position, len) = (self.position, self.len);
        let file = self.file()?;
        let mut written = 0;
        let mut failure = None;
        while written < buf.len() {
            match file.write(&buf[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if written < buf.len() {
            // partial bytes may overwrite earlier content; only growth is undone
            self.rollback(position, len)?;
            return match failure {
                Some(e) => Err(e.into()),
                None => Ok(0),
            };
        }
        self.position += written as u64;
        self.len = self.len.max(self.position);
        Ok(written)
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let target = resolve(offset, origin, self.position, self.len)?;
        self.file()?.seek(SeekFrom::Start(target))?;
        self.position = target;
        Ok(target)
    }

    fn tell(&self) -> u64 {
        self.position
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn is_good(&self) -> bool {
        self.file.is_some()
    }

    fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush() {
                tracing::warn!(error = %e, "flush on close failed");
            }
        }
    }
}
