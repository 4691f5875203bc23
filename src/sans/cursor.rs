//! Bounds-checked, forward-only reader over a document slice.

use thiserror::Error;

/// A read would run past the end of the readable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Reading {wanted} bytes at offset {offset} would pass the end of data ({limit}).")]
pub struct Truncated {
    pub offset: usize,
    pub wanted: usize,
    pub limit: usize,
}

/// Sequential cursor over an immutable byte slice.
///
/// The cursor never reads beyond `limit`, which starts as the slice length
/// and may be narrowed (never widened) with [`Cursor::limit_to`].
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
    limit: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            position: 0,
            limit: bytes.len(),
        }
    }

    /// Narrow the readable region to end at `limit`.
    ///
    /// Fails if the underlying slice is shorter than `limit`.
    pub fn limit_to(&mut self, limit: usize) -> Result<(), Truncated> {
        if limit > self.bytes.len() {
            return Err(Truncated {
                offset: self.position,
                wanted: limit.saturating_sub(self.position),
                limit: self.bytes.len(),
            });
        }

        self.limit = limit.min(self.limit);
        Ok(())
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.limit
    }

    /// Take a borrowed run of `n` bytes, advancing the cursor.
    pub fn take_slice(&mut self, n: usize) -> Result<&'a [u8], Truncated> {
        let start = self.position;
        let end = start
            .checked_add(n)
            .filter(|end| *end <= self.limit)
            .ok_or(Truncated {
                offset: start,
                wanted: n,
                limit: self.limit,
            })?;

        self.position = end;
        Ok(&self.bytes[start..end])
    }

    /// Take an exact number of bytes, advancing the cursor.
    pub fn take<const N: usize>(&mut self) -> Result<[u8; N], Truncated> {
        let mut out = [0; N];
        out.copy_from_slice(self.take_slice(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, Truncated> {
        let [b] = self.take()?;
        Ok(b)
    }

    /// Skip `n` bytes without inspecting them.
    pub fn skip(&mut self, n: usize) -> Result<(), Truncated> {
        self.take_slice(n).map(|_| ())
    }
}
