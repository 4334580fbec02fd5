//! `ByteCursor` walks a buffer read from the kernel event descriptor. It hands
//! out native-endian integers and length-delimited sub-slices, checking every
//! read against the end of the buffer: a truncated record becomes a
//! [`CursorError`] rather than a read past the end.

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    /// The whole buffer, as returned by one `read()`
    buffer: &'a [u8],
    /// Offset of the next unread byte
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Return if every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume the next `len` bytes.
    /// Returns `Err(CursorError::OutOfBounds)` when the buffer is too short, in
    /// which case the cursor doesn't move.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], CursorError> {
        let start = self.position;
        match start.checked_add(len) {
            Some(end) if end <= self.buffer.len() => {
                self.position = end;
                Ok(&self.buffer[start..end])
            }
            _ => Err(CursorError::OutOfBounds {
                offset: start,
                wanted: len,
                len: self.buffer.len(),
            }),
        }
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CursorError> {
        let mut data = [0; N];
        data.copy_from_slice(self.take(N)?);
        Ok(data)
    }

    pub fn read_u16(&mut self) -> Result<u16, CursorError> {
        self.read_array().map(u16::from_ne_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, CursorError> {
        self.read_array().map(i32::from_ne_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, CursorError> {
        self.read_array().map(u32::from_ne_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64, CursorError> {
        self.read_array().map(i64::from_ne_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, CursorError> {
        self.read_array().map(u64::from_ne_bytes)
    }
}

/// Interpret `bytes` as a zero terminated string. Everything after the first
/// 0 is garbage; without a 0 the whole slice is used. No encoding is
/// assumed, paths are arbitrary bytes.
pub fn nul_terminated(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|c| *c == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("reading {wanted} bytes at offset {offset} overruns the event buffer (len {len})")]
    OutOfBounds {
        offset: usize,
        wanted: usize,
        len: usize,
    },
}
