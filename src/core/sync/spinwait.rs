/*!
 * Escalating Spin-Wait
 *
 * Polls a condition over shared memory until it holds, escalating the wait
 * strategy as the call ages. There is no kernel wait object shared with the
 * peer: its progress is only ever observed by re-testing the condition.
 *
 * # Tiers
 *
 * Elapsed cycles since entry are compared against the policy thresholds on
 * every iteration:
 *
 * 1. **Busy** (below `levels[0]`): re-test immediately, optionally with a
 *    processor spin hint
 * 2. **Yield** (past `levels[0]`): give up the scheduling slot between tests
 * 3. **Sleep** (past `levels[1]`): sleep one quantum between tests
 * 4. **Timed out** (past `timeout`, only when `timeout != 0`): fail
 *
 * The tier is recomputed each iteration rather than latched. Elapsed time is
 * monotonic, so in practice it only moves forward.
 */

use super::config::BlockingConfig;
use crate::core::clock::{self, CycleCount};
use crate::core::hints::{likely, spin_hint};
use crate::ipc::ring::TimeoutPolicy;
use miette::Diagnostic;
use std::thread;
use thiserror::Error;
use tracing::{trace, warn};

/// Blocking engine failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum BlockError {
    #[error("Condition not satisfied after {elapsed} cycles (timeout: {limit})")]
    #[diagnostic(code(sync::block_timeout))]
    Timeout {
        elapsed: CycleCount,
        limit: CycleCount,
    },
}

/// Wait strategy in effect for a given elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EscalationLevel {
    Busy,
    Yield,
    Sleep,
    TimedOut,
}

impl EscalationLevel {
    /// Select the tier for `elapsed` cycles under `policy`
    pub fn for_elapsed(policy: &TimeoutPolicy, elapsed: CycleCount) -> Self {
        if policy.has_timeout() && elapsed > policy.timeout {
            Self::TimedOut
        } else if elapsed > policy.levels[1] {
            Self::Sleep
        } else if elapsed > policy.levels[0] {
            Self::Yield
        } else {
            Self::Busy
        }
    }
}

/// Escalating spin-wait over a polled condition
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinWait {
    config: BlockingConfig,
}

impl SpinWait {
    pub fn new(config: BlockingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BlockingConfig {
        &self.config
    }

    /// Block until `condition` holds or the policy deadline passes
    ///
    /// Returns the cycles spent waiting, `0` when the condition already held.
    pub fn block<F>(&self, policy: &TimeoutPolicy, mut condition: F) -> Result<CycleCount, BlockError>
    where
        F: FnMut() -> bool,
    {
        if likely(condition()) {
            return Ok(0);
        }

        let start = clock::now();
        let mut level = EscalationLevel::Busy;

        loop {
            let elapsed = clock::elapsed_since(start);
            let next = EscalationLevel::for_elapsed(policy, elapsed);
            if next != level {
                trace!(from = ?level, to = ?next, elapsed_cycles = elapsed, "Escalating wait");
                level = next;
            }

            match level {
                EscalationLevel::Busy => {
                    if self.config.spin_hint {
                        spin_hint();
                    }
                }
                EscalationLevel::Yield => thread::yield_now(),
                EscalationLevel::Sleep => thread::sleep(self.config.quantum()),
                EscalationLevel::TimedOut => {
                    warn!(
                        elapsed_cycles = elapsed,
                        timeout_cycles = policy.timeout,
                        "Blocked call timed out"
                    );
                    return Err(BlockError::Timeout {
                        elapsed,
                        limit: policy.timeout,
                    });
                }
            }

            if condition() {
                return Ok(clock::elapsed_since(start));
            }
        }
    }
}
