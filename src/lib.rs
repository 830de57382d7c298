/*!
 * Shared Memory Transport Library
 * Bounded SPSC byte ring for sockets replaced by shared memory
 */

pub mod core;
pub mod ipc;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{TransportError, TransportResult};
pub use crate::core::sync::BlockingConfig;
pub use ipc::{Consumer, HeapRegion, Producer, RingBuffer, Snapshot, TimeoutPolicy, TransportConfig};
#[cfg(unix)]
pub use ipc::SharedMapping;
pub use monitoring::init_tracing;
