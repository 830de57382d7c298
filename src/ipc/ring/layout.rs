/*!
 * Shared Header Layout
 *
 * Bit-exact description of the memory a ring buffer occupies:
 *
 * ```text
 * offset  size  field
 *      0     4  capacity     (i32, fixed at creation)
 *      4     4  read cursor  (i32, stored by the reader)
 *      8     4  write cursor (i32, stored by the writer)
 *     12     4  occupancy    (atomic i32, updated by both)
 *     16    24  timeouts     (u64 timeout, u64 levels[2])
 *     40     -  capacity bytes of data
 * ```
 *
 * Cursors are atomics even though each has a single storing role, because
 * the opposite role loads them to decide where the data wraps.
 */

use super::timeouts::TimeoutPolicy;
use crate::core::limits::{HEADER_ALIGN, HEADER_SIZE};
use serde::{Deserialize, Serialize};
use std::mem::{align_of, size_of};
use std::sync::atomic::{AtomicI32, Ordering};

/// Ring buffer header placed at the base of the shared region
#[repr(C)]
#[derive(Debug)]
pub struct BufferHeader {
    pub capacity: i32,
    pub read: AtomicI32,
    pub write: AtomicI32,
    pub size: AtomicI32,
    pub timeouts: TimeoutPolicy,
}

const _: () = assert!(size_of::<BufferHeader>() == HEADER_SIZE);
const _: () = assert!(align_of::<BufferHeader>() == HEADER_ALIGN);

impl BufferHeader {
    pub fn new(capacity: i32, timeouts: TimeoutPolicy) -> Self {
        Self {
            capacity,
            read: AtomicI32::new(0),
            write: AtomicI32::new(0),
            size: AtomicI32::new(0),
            timeouts,
        }
    }

    /// Point-in-time copy of the mutable fields
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            capacity: self.capacity,
            read: self.read.load(Ordering::Acquire),
            write: self.write.load(Ordering::Acquire),
            size: self.size.load(Ordering::Acquire),
        }
    }
}

/// Diagnostic view of a header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub capacity: i32,
    pub read: i32,
    pub write: i32,
    pub size: i32,
}

impl Snapshot {
    /// Whether the recorded state satisfies the cursor and occupancy invariants
    pub fn is_consistent(&self) -> bool {
        self.capacity > 0
            && (0..self.capacity).contains(&self.read)
            && (0..self.capacity).contains(&self.write)
            && (0..=self.capacity).contains(&self.size)
    }
}
