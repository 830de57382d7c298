/*!
 * Backing Regions
 * Memory providers a ring buffer can be created over
 *
 * `HeapRegion` is process-private and suits threads in one process.
 * `SharedMapping` is an anonymous `MAP_SHARED` mapping that survives `fork`,
 * so a parent and child see the same ring.
 */

use crate::core::errors::{TransportError, TransportResult};
use crate::core::limits::HEADER_ALIGN;
use crate::ipc::ring::RingBuffer;

/// Owned, 8-byte aligned, zeroed memory
pub struct HeapRegion {
    words: Vec<u64>,
    len: usize,
}

impl HeapRegion {
    /// Region of exactly `len` usable bytes
    pub fn with_len(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(HEADER_ALIGN)],
            len,
        }
    }

    /// Region sized for a ring of `capacity` data bytes
    pub fn for_capacity(capacity: usize) -> Self {
        Self::with_len(RingBuffer::required_size(capacity))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.words.as_mut_ptr().cast()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: the vector holds at least `len` initialized bytes
        unsafe { std::slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }
}

#[cfg(unix)]
pub use unix_impl::SharedMapping;

#[cfg(unix)]
mod unix_impl {
    use super::*;
    use nix::sys::mman::{mmap_anonymous, munmap, MapFlags, ProtFlags};
    use std::ffi::c_void;
    use std::num::NonZeroUsize;
    use std::ptr::NonNull;
    use tracing::{debug, warn};

    /// Anonymous shared mapping, inherited by child processes
    pub struct SharedMapping {
        ptr: NonNull<c_void>,
        len: usize,
    }

    // SAFETY: the mapping is plain memory with no thread affinity
    unsafe impl Send for SharedMapping {}

    impl SharedMapping {
        /// Map `len` zeroed bytes shared with future children
        pub fn anonymous(len: usize) -> TransportResult<Self> {
            let length = NonZeroUsize::new(len)
                .ok_or_else(|| TransportError::invalid("mapping length is zero"))?;

            // SAFETY: a fresh anonymous mapping aliases no existing memory
            let ptr = unsafe {
                mmap_anonymous(
                    None,
                    length,
                    ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                    MapFlags::MAP_SHARED,
                )
            }
            .map_err(|e| TransportError::MappingFailed(format!("mmap of {} bytes: {}", len, e)))?;

            debug!(len, "Anonymous shared mapping created");
            Ok(Self { ptr, len })
        }

        /// Mapping sized for a ring of `capacity` data bytes
        pub fn for_capacity(capacity: usize) -> TransportResult<Self> {
            Self::anonymous(RingBuffer::required_size(capacity))
        }

        pub fn len(&self) -> usize {
            self.len
        }

        pub fn is_empty(&self) -> bool {
            self.len == 0
        }

        /// Page-aligned base address
        pub fn as_mut_ptr(&mut self) -> *mut u8 {
            self.ptr.as_ptr().cast()
        }

        pub fn as_mut_slice(&mut self) -> &mut [u8] {
            // SAFETY: the mapping is readable and writable for `len` bytes
            unsafe { std::slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
        }
    }

    impl Drop for SharedMapping {
        fn drop(&mut self) {
            // SAFETY: ptr/len describe a mapping this value created
            if let Err(e) = unsafe { munmap(self.ptr, self.len) } {
                warn!(error = %e, len = self.len, "munmap failed");
            }
        }
    }
}
