/*!
 * Ring Buffer
 * Single-producer single-consumer byte ring over caller-supplied memory
 *
 * The buffer never allocates: it interprets a header followed by
 * `capacity` data bytes at an address the caller owns, typically the base
 * of a shared mapping. The occupancy counter is the one synchronization
 * point between the two roles:
 *
 * - the writer copies bytes, then publishes them with a release increment
 * - the reader acquires the counter, copies bytes out, then frees them with
 *   a release decrement
 *
 * Cursors reset to zero exactly when they reach the end of the region.
 * Requests crossing the end are split into a tail copy and a head copy, and
 * the tail is published before the head is copied.
 */

use super::handles::{Consumer, Producer};
use super::layout::{BufferHeader, Snapshot};
use super::timeouts::TimeoutPolicy;
use crate::core::errors::{TransportError, TransportResult};
use crate::core::hints::unlikely;
use crate::core::limits::{HEADER_ALIGN, HEADER_SIZE, MAX_CAPACITY};
use crate::core::sync::{BlockError, BlockingConfig, SpinWait};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::sync::atomic::Ordering;
use tracing::debug;

/// Raw view of a ring shared by the role handles
///
/// Copyable so both halves of a split can hold one. Each method documents
/// which role may call it; the public handles enforce that by construction.
#[derive(Clone, Copy)]
pub(crate) struct RawRing {
    header: NonNull<BufferHeader>,
    data: NonNull<u8>,
    capacity: usize,
    waiter: SpinWait,
}

impl RawRing {
    /// Validate memory bounds and locate the data region
    fn locate(ptr: *mut u8, len: usize) -> TransportResult<(NonNull<BufferHeader>, NonNull<u8>)> {
        let base = NonNull::new(ptr).ok_or_else(|| TransportError::invalid("memory pointer is null"))?;
        if base.as_ptr() as usize % HEADER_ALIGN != 0 {
            return Err(TransportError::invalid(format!(
                "memory at {:p} is not {}-byte aligned",
                base.as_ptr(),
                HEADER_ALIGN
            )));
        }
        if len < HEADER_SIZE {
            return Err(TransportError::invalid(format!(
                "memory of {} bytes cannot hold the {} byte header",
                len, HEADER_SIZE
            )));
        }
        // SAFETY: len >= HEADER_SIZE, so the data pointer stays in bounds
        let data = unsafe { NonNull::new_unchecked(base.as_ptr().add(HEADER_SIZE)) };
        Ok((base.cast(), data))
    }

    /// Initialize a header in place and reset the ring to empty
    ///
    /// # Safety
    /// `ptr` must be valid for reads and writes of `len` bytes for as long
    /// as the returned ring is used.
    unsafe fn create(ptr: *mut u8, len: usize, capacity: usize, timeouts: TimeoutPolicy) -> TransportResult<Self> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(TransportError::invalid(format!(
                "capacity {} outside 1..={}",
                capacity, MAX_CAPACITY
            )));
        }
        timeouts.validate()?;
        let (header, data) = Self::locate(ptr, len)?;
        let available = len - HEADER_SIZE;
        if capacity > available {
            return Err(TransportError::invalid(format!(
                "capacity {} exceeds the {} data bytes available",
                capacity, available
            )));
        }

        ptr::write(header.as_ptr(), BufferHeader::new(capacity as i32, timeouts));
        debug!(capacity, has_timeout = timeouts.has_timeout(), "Ring buffer created");

        Ok(Self {
            header,
            data,
            capacity,
            waiter: SpinWait::default(),
        })
    }

    /// Open a header another party already initialized
    ///
    /// # Safety
    /// Same requirements as [`RawRing::create`].
    unsafe fn attach(ptr: *mut u8, len: usize) -> TransportResult<Self> {
        let (header, data) = Self::locate(ptr, len)?;
        let snapshot = header.as_ref().snapshot();
        if !snapshot.is_consistent() {
            return Err(TransportError::Corrupted(format!(
                "header state violates ring invariants: {:?}",
                snapshot
            )));
        }
        let capacity = snapshot.capacity as usize;
        if capacity > len - HEADER_SIZE {
            return Err(TransportError::Corrupted(format!(
                "capacity {} exceeds the {} byte mapping",
                capacity, len
            )));
        }
        header
            .as_ref()
            .timeouts
            .validate()
            .map_err(|e| TransportError::Corrupted(e.to_string()))?;

        debug!(capacity, "Attached to ring buffer");
        Ok(Self {
            header,
            data,
            capacity,
            waiter: SpinWait::default(),
        })
    }

    #[inline(always)]
    fn header(&self) -> &BufferHeader {
        // SAFETY: validated at construction; the memory outlives the handle
        unsafe { self.header.as_ref() }
    }

    pub(crate) fn set_blocking(&mut self, config: BlockingConfig) {
        self.waiter = SpinWait::new(config);
    }

    pub(crate) fn blocking(&self) -> BlockingConfig {
        *self.waiter.config()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn timeouts(&self) -> TimeoutPolicy {
        self.header().timeouts
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.header().snapshot()
    }

    /// Bytes currently queued
    #[inline]
    pub(crate) fn occupancy(&self) -> usize {
        self.header().size.load(Ordering::Acquire).max(0) as usize
    }

    #[inline]
    pub(crate) fn free_space(&self) -> usize {
        self.capacity.saturating_sub(self.occupancy())
    }

    pub(crate) fn is_full(&self) -> bool {
        self.occupancy() == self.capacity
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.occupancy() == 0
    }

    pub(crate) fn has_timeout(&self) -> bool {
        self.header().timeouts.has_timeout()
    }

    /// Advance a cursor, resetting to zero when it reaches the end
    #[inline]
    fn advance(&self, cursor: usize, by: usize) -> usize {
        let next = cursor + by;
        if next >= self.capacity {
            next - self.capacity
        } else {
            next
        }
    }

    /// Length of the tail copy when a request starting at `cursor` reaches
    /// the end of the region
    ///
    /// `foreign` is the other role's cursor. Queued or free bytes can only
    /// wrap when our cursor is at or past it.
    #[inline]
    fn tail_len(&self, cursor: usize, foreign: usize, len: usize) -> Option<usize> {
        if cursor >= foreign {
            let right_space = self.capacity - cursor;
            if len >= right_space {
                return Some(right_space);
            }
        }
        None
    }

    fn check_request(&self, len: usize) -> TransportResult<()> {
        if unlikely(len > self.capacity) {
            return Err(TransportError::invalid(format!(
                "request of {} bytes exceeds capacity {}",
                len, self.capacity
            )));
        }
        Ok(())
    }

    /// Wait for `condition`, translating a blown deadline
    pub(crate) fn block(&self, condition: impl FnMut() -> bool) -> TransportResult<()> {
        let timeouts = self.header().timeouts;
        self.waiter
            .block(&timeouts, condition)
            .map(|_| ())
            .map_err(|BlockError::Timeout { elapsed, limit }| TransportError::Timeout {
                elapsed_cycles: elapsed,
                timeout_cycles: limit,
            })
    }

    #[inline(always)]
    unsafe fn copy_in(&self, offset: usize, src: &[u8]) {
        debug_assert!(offset + src.len() <= self.capacity);
        ptr::copy_nonoverlapping(src.as_ptr(), self.data.as_ptr().add(offset), src.len());
    }

    #[inline(always)]
    unsafe fn copy_out(&self, offset: usize, dst: &mut [u8]) {
        debug_assert!(offset + dst.len() <= self.capacity);
        ptr::copy_nonoverlapping(self.data.as_ptr().add(offset), dst.as_mut_ptr(), dst.len());
    }

    /// Writer role: append all of `data` or fail without side effects
    pub(crate) fn write(&self, data: &[u8]) -> TransportResult<usize> {
        let len = data.len();
        if len == 0 {
            return Ok(0);
        }
        self.check_request(len)?;
        self.block(|| self.free_space() >= len)?;

        let header = self.header();
        let mut cursor = header.write.load(Ordering::Relaxed) as usize;
        let read = header.read.load(Ordering::Acquire) as usize;
        let mut rest = data;

        if let Some(right_space) = self.tail_len(cursor, read, len) {
            let (tail, head) = rest.split_at(right_space);
            // SAFETY: the free region runs from the cursor to the end
            unsafe { self.copy_in(cursor, tail) };
            header.write.store(0, Ordering::Release);
            header.size.fetch_add(right_space as i32, Ordering::AcqRel);
            cursor = 0;
            rest = head;
        }

        // SAFETY: the predicate guaranteed `rest.len()` free bytes from the cursor
        unsafe { self.copy_in(cursor, rest) };
        header
            .write
            .store(self.advance(cursor, rest.len()) as i32, Ordering::Release);
        header.size.fetch_add(rest.len() as i32, Ordering::AcqRel);

        Ok(len)
    }

    /// Reader role: fill `out` entirely or fail without side effects
    pub(crate) fn read(&self, out: &mut [u8]) -> TransportResult<usize> {
        let len = out.len();
        if len == 0 {
            return Ok(0);
        }
        self.check_request(len)?;
        self.block(|| self.occupancy() >= len)?;

        let header = self.header();
        let mut cursor = header.read.load(Ordering::Relaxed) as usize;
        let write = header.write.load(Ordering::Acquire) as usize;
        let mut rest = out;

        if let Some(right_space) = self.tail_len(cursor, write, len) {
            let (tail, head) = std::mem::take(&mut rest).split_at_mut(right_space);
            // SAFETY: queued bytes run from the cursor to the end
            unsafe { self.copy_out(cursor, tail) };
            header.read.store(0, Ordering::Release);
            header.size.fetch_sub(right_space as i32, Ordering::AcqRel);
            cursor = 0;
            rest = head;
        }

        // SAFETY: the predicate guaranteed `rest.len()` queued bytes from the cursor
        unsafe { self.copy_out(cursor, rest) };
        let consumed = rest.len();
        header
            .read
            .store(self.advance(cursor, consumed) as i32, Ordering::Release);
        header.size.fetch_sub(consumed as i32, Ordering::AcqRel);

        Ok(len)
    }

    /// Reader role: copy out the next `out.len()` bytes without consuming them
    ///
    /// Works on a private copy of the read cursor and never stores to the
    /// header, so a concurrent writer's progress is never rolled back.
    pub(crate) fn peek(&self, out: &mut [u8]) -> TransportResult<usize> {
        let len = out.len();
        if len == 0 {
            return Ok(0);
        }
        self.check_request(len)?;
        self.block(|| self.occupancy() >= len)?;

        let header = self.header();
        let mut cursor = header.read.load(Ordering::Relaxed) as usize;
        let write = header.write.load(Ordering::Acquire) as usize;
        let mut rest = out;

        if let Some(right_space) = self.tail_len(cursor, write, len) {
            let (tail, head) = std::mem::take(&mut rest).split_at_mut(right_space);
            // SAFETY: as in `read`
            unsafe { self.copy_out(cursor, tail) };
            cursor = 0;
            rest = head;
        }
        // SAFETY: as in `read`
        unsafe { self.copy_out(cursor, rest) };

        Ok(len)
    }

    /// Reader role: discard `count` queued bytes without copying them
    pub(crate) fn skip(&self, count: usize) -> TransportResult<usize> {
        let available = self.occupancy();
        if count > available {
            return Err(TransportError::OutOfRange {
                requested: count,
                available,
            });
        }
        if count == 0 {
            return Ok(0);
        }

        let header = self.header();
        let cursor = header.read.load(Ordering::Relaxed) as usize;
        header
            .read
            .store(self.advance(cursor, count) as i32, Ordering::Release);
        header.size.fetch_sub(count as i32, Ordering::AcqRel);

        Ok(count)
    }

    /// Both roles: reset to empty. Only sound while neither side is active.
    pub(crate) fn clear(&self) {
        let header = self.header();
        header.read.store(0, Ordering::Release);
        header.write.store(0, Ordering::Release);
        header.size.store(0, Ordering::Release);
        debug!(capacity = self.capacity, "Ring buffer cleared");
    }
}

/// Ring buffer handle holding both roles
///
/// # Thread Safety
/// Mutating operations take `&mut self`. For a writer thread and a reader
/// thread, [`split`](RingBuffer::split) the handle; each half is `Send`.
/// Across processes, each side attaches its own handle and must restrict
/// itself to one role.
pub struct RingBuffer<'a> {
    raw: RawRing,
    _memory: PhantomData<&'a mut [u8]>,
}

// SAFETY: the handle owns exclusive use of both roles over memory borrowed for 'a
unsafe impl Send for RingBuffer<'_> {}

impl<'a> RingBuffer<'a> {
    /// Bytes of memory needed for a ring of `capacity` data bytes
    pub const fn required_size(capacity: usize) -> usize {
        HEADER_SIZE + capacity
    }

    /// Construct a ring in place over `memory`
    ///
    /// The slice must start on an 8-byte boundary and hold at least
    /// [`required_size(capacity)`](RingBuffer::required_size) bytes.
    pub fn create(memory: &'a mut [u8], capacity: usize, timeouts: TimeoutPolicy) -> TransportResult<Self> {
        // SAFETY: the exclusive borrow keeps the memory valid for 'a
        unsafe { Self::create_raw(memory.as_mut_ptr(), memory.len(), capacity, timeouts) }
    }

    /// Construct a ring in place at `ptr`
    ///
    /// # Safety
    /// `ptr` must be valid for reads and writes of `len` bytes for `'a`, and
    /// only accessed by peers following this ring's protocol.
    pub unsafe fn create_raw(ptr: *mut u8, len: usize, capacity: usize, timeouts: TimeoutPolicy) -> TransportResult<Self> {
        Ok(Self {
            raw: RawRing::create(ptr, len, capacity, timeouts)?,
            _memory: PhantomData,
        })
    }

    /// Open a ring a peer already created at `ptr`
    ///
    /// # Safety
    /// As for [`create_raw`](RingBuffer::create_raw).
    pub unsafe fn attach_raw(ptr: *mut u8, len: usize) -> TransportResult<Self> {
        Ok(Self {
            raw: RawRing::attach(ptr, len)?,
            _memory: PhantomData,
        })
    }

    /// Replace the process-local blocking tunables
    pub fn with_blocking(mut self, config: BlockingConfig) -> Self {
        self.raw.set_blocking(config);
        self
    }

    pub fn blocking(&self) -> BlockingConfig {
        self.raw.blocking()
    }

    /// Split into writer and reader halves
    pub fn split(&mut self) -> (Producer<'_>, Consumer<'_>) {
        (Producer::new(self.raw), Consumer::new(self.raw))
    }

    /// Append all of `data`, blocking until there is room
    ///
    /// Returns `data.len()`; an empty slice is a no-op. Fails with
    /// `InvalidArgument` when `data` is longer than the capacity and with
    /// `Timeout` when the policy deadline passes first.
    pub fn write(&mut self, data: &[u8]) -> TransportResult<usize> {
        self.raw.write(data)
    }

    /// Fill `out` from the ring, blocking until enough bytes are queued
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

    /// Reset cursors and occupancy, keeping capacity and policy
    pub fn clear(&mut self) {
        self.raw.clear()
    }

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Bytes currently queued
    pub fn len(&self) -> usize {
        self.raw.occupancy()
    }

    pub fn is_full(&self) -> bool {
        self.raw.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn free_space(&self) -> usize {
        self.raw.free_space()
    }

    pub fn has_timeout(&self) -> bool {
        self.raw.has_timeout()
    }

    pub fn timeouts(&self) -> TimeoutPolicy {
        self.raw.timeouts()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.raw.snapshot()
    }
}

impl std::fmt::Debug for RingBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("RingBuffer")
            .field("capacity", &snapshot.capacity)
            .field("read", &snapshot.read)
            .field("write", &snapshot.write)
            .field("size", &snapshot.size)
            .field("timeouts", &self.timeouts())
            .finish()
    }
}
