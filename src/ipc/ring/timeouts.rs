/*!
 * Timeout Policy
 *
 * Escalation thresholds and absolute deadline for blocked transport calls,
 * expressed in clock cycles. The record is stored verbatim in the shared
 * header, so its layout is part of the wire contract.
 */

use crate::core::clock::{self, CycleCount};
use crate::core::errors::{TransportError, TransportResult};
use crate::core::limits::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-channel timeout policy
///
/// `timeout == 0` blocks indefinitely. When a timeout is set, both levels
/// must lie below it, and `levels[0] <= levels[1]` always.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutPolicy {
    /// Elapsed cycles after which a blocked call fails
    pub timeout: CycleCount,
    /// Elapsed cycles at which the yield and sleep tiers begin
    pub levels: [CycleCount; ESCALATION_LEVELS],
}

impl TimeoutPolicy {
    /// Create a validated policy
    pub fn new(timeout: CycleCount, levels: [CycleCount; ESCALATION_LEVELS]) -> TransportResult<Self> {
        let policy = Self { timeout, levels };
        policy.validate()?;
        Ok(policy)
    }

    /// Block indefinitely with the default escalation thresholds
    pub const fn blocking() -> Self {
        Self {
            timeout: 0,
            levels: [DEFAULT_LEVEL_ZERO_CYCLES, DEFAULT_LEVEL_ONE_CYCLES],
        }
    }

    /// Stay in the busy tier longer, fail fast when the peer stalls
    pub const fn low_latency() -> Self {
        Self {
            timeout: LOW_LATENCY_TIMEOUT_CYCLES,
            levels: [LOW_LATENCY_LEVEL_ZERO_CYCLES, LOW_LATENCY_LEVEL_ONE_CYCLES],
        }
    }

    /// Back off to the scheduler early and tolerate slow peers
    pub const fn relaxed() -> Self {
        Self {
            timeout: RELAXED_TIMEOUT_CYCLES,
            levels: [RELAXED_LEVEL_ZERO_CYCLES, RELAXED_LEVEL_ONE_CYCLES],
        }
    }

    /// Build a policy from wall-clock durations using the calibrated clock
    ///
    /// A zero `timeout` keeps the policy blocking.
    pub fn from_durations(timeout: Duration, yield_after: Duration, sleep_after: Duration) -> TransportResult<Self> {
        Self::new(
            clock::to_cycles(timeout),
            [clock::to_cycles(yield_after), clock::to_cycles(sleep_after)],
        )
    }

    /// Whether blocked calls eventually fail
    pub fn has_timeout(&self) -> bool {
        self.timeout != 0
    }

    /// Check threshold ordering
    pub fn validate(&self) -> TransportResult<()> {
        if self.levels.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(TransportError::invalid(format!(
                "escalation levels must be non-decreasing: {:?}",
                self.levels
            )));
        }
        if self.has_timeout() && self.levels.iter().any(|&level| level >= self.timeout) {
            return Err(TransportError::invalid(format!(
                "escalation levels {:?} must lie below timeout {}",
                self.levels, self.timeout
            )));
        }
        Ok(())
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::blocking()
    }
}
