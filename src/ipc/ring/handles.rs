/*!
 * Role Handles
 * Writer and reader halves of a split ring buffer
 *
 * Each role's cursor is stored by exactly one side. Splitting a
 * `RingBuffer` hands out one `Producer` and one `Consumer` borrowed from it,
 * so a second writer or reader cannot exist while the halves are alive.
 */

use super::buffer::RawRing;
use super::timeouts::TimeoutPolicy;
use crate::core::errors::TransportResult;
use std::io;
use std::marker::PhantomData;

/// Writer half of a ring buffer
pub struct Producer<'a> {
    raw: RawRing,
    _ring: PhantomData<&'a mut ()>,
}

// SAFETY: only the writer role is reachable through a producer
unsafe impl Send for Producer<'_> {}

impl Producer<'_> {
    pub(crate) fn new(raw: RawRing) -> Self {
        Self {
            raw,
            _ring: PhantomData,
        }
    }

    /// Append all of `data`, blocking until there is room
    pub fn write(&mut self, data: &[u8]) -> TransportResult<usize> {
        self.raw.write(data)
    }

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn free_space(&self) -> usize {
        self.raw.free_space()
    }

    pub fn is_full(&self) -> bool {
        self.raw.is_full()
    }

    pub fn has_timeout(&self) -> bool {
        self.raw.has_timeout()
    }

    pub fn timeouts(&self) -> TimeoutPolicy {
        self.raw.timeouts()
    }
}

impl io::Write for Producer<'_> {
    /// Writes at most `capacity` bytes per call, all or nothing
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let chunk = buf.len().min(self.raw.capacity());
        Ok(self.raw.write(&buf[..chunk])?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reader half of a ring buffer
pub struct Consumer<'a> {
    raw: RawRing,
    _ring: PhantomData<&'a mut ()>,
}

// SAFETY: only the reader role is reachable through a consumer
unsafe impl Send for Consumer<'_> {}

impl Consumer<'_> {
    pub(crate) fn new(raw: RawRing) -> Self {
        Self {
            raw,
            _ring: PhantomData,
        }
    }

    /// Fill `out`, blocking until enough bytes are queued
    pub fn read(&mut self, out: &mut [u8]) -> TransportResult<usize> {
        self.raw.read(out)
    }

    /// Copy the next `out.len()` bytes without consuming them
    pub fn peek(&mut self, out: &mut [u8]) -> TransportResult<usize> {
        self.raw.peek(out)
    }

    /// Discard `count` queued bytes
    pub fn skip(&mut self, count: usize) -> TransportResult<usize> {
        self.raw.skip(count)
    }

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Bytes currently queued
    pub fn len(&self) -> usize {
        self.raw.occupancy()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn has_timeout(&self) -> bool {
        self.raw.has_timeout()
    }
}

impl io::Read for Consumer<'_> {
    /// Blocks for at least one byte, then drains what is queued up to `buf.len()`
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.raw.block(|| !self.raw.is_empty())?;
        let available = buf.len().min(self.raw.occupancy());
        Ok(self.raw.read(&mut buf[..available])?)
    }
}
