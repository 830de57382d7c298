/*!
 * Synchronization Primitives
 *
 * Lock-free waiting for the shared memory transport. Waits never park on a
 * kernel object tied to the peer; they poll and escalate from busy spinning
 * to yielding to short sleeps, bounded by a timeout policy measured in
 * hardware cycles.
 */

mod config;
mod spinwait;

pub use config::BlockingConfig;
pub use spinwait::{BlockError, EscalationLevel, SpinWait};
