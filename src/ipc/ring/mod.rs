/*!
 * Shared Memory Ring Buffer
 * Lock-free SPSC byte stream over a caller-mapped region
 */

mod buffer;
mod handles;
mod layout;
mod timeouts;

pub use buffer::RingBuffer;
pub use handles::{Consumer, Producer};
pub use layout::{BufferHeader, Snapshot};
pub use timeouts::TimeoutPolicy;
