/*!
 * IPC Module
 * Shared-memory byte transport: ring buffer, backing regions and configuration
 */

pub mod config;
pub mod region;
pub mod ring; // Lock-free SPSC ring over caller-supplied memory

// Re-export for convenience
pub use config::TransportConfig;
pub use region::HeapRegion;
#[cfg(unix)]
pub use region::SharedMapping;
pub use ring::{BufferHeader, Consumer, Producer, RingBuffer, Snapshot, TimeoutPolicy};
