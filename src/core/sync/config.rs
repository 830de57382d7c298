/*!
 * Blocking Configuration
 *
 * Process-local tunables for the blocking engine. None of this lives in
 * shared memory, so each side of a ring may tune its own waits.
 */

use crate::core::limits::DEFAULT_SLEEP_QUANTUM;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Blocking engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockingConfig {
    /// Emit a processor spin-wait hint in the busy tier (off by default)
    pub spin_hint: bool,
    /// Sleep between predicate tests in the sleep tier, in microseconds
    pub sleep_quantum_us: u64,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            spin_hint: false,
            sleep_quantum_us: DEFAULT_SLEEP_QUANTUM.as_micros() as u64,
        }
    }
}

impl BlockingConfig {
    /// Busy tier pauses the pipeline between polls
    pub const fn with_spin_hint() -> Self {
        Self {
            spin_hint: true,
            sleep_quantum_us: 1,
        }
    }

    /// Set the sleep-tier quantum
    pub fn sleep_quantum(mut self, quantum: Duration) -> Self {
        self.sleep_quantum_us = quantum.as_micros() as u64;
        self
    }

    /// Sleep-tier quantum as a duration
    pub fn quantum(&self) -> Duration {
        Duration::from_micros(self.sleep_quantum_us)
    }
}
