/*!
 * Transport Configuration
 *
 * Capacity, timeout policy and blocking tunables for one ring, loadable from
 * JSON or from `SHM_RING_*` environment variables.
 */

use crate::core::errors::{TransportError, TransportResult};
use crate::core::limits::DEFAULT_CAPACITY;
use crate::core::sync::BlockingConfig;
use crate::ipc::ring::{RingBuffer, TimeoutPolicy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ENV_CAPACITY: &str = "SHM_RING_CAPACITY";
pub const ENV_TIMEOUT_CYCLES: &str = "SHM_RING_TIMEOUT_CYCLES";
pub const ENV_LEVEL0_CYCLES: &str = "SHM_RING_LEVEL0_CYCLES";
pub const ENV_LEVEL1_CYCLES: &str = "SHM_RING_LEVEL1_CYCLES";
pub const ENV_SPIN_HINT: &str = "SHM_RING_SPIN_HINT";
pub const ENV_SLEEP_QUANTUM_US: &str = "SHM_RING_SLEEP_QUANTUM_US";

/// Configuration for creating a ring buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Data bytes in the ring
    pub capacity: usize,
    /// Shared timeout policy written into the header
    pub timeouts: TimeoutPolicy,
    /// Local blocking tunables
    pub blocking: BlockingConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            timeouts: TimeoutPolicy::blocking(),
            blocking: BlockingConfig::default(),
        }
    }
}

impl TransportConfig {
    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> TransportResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TransportError::invalid(format!("invalid transport config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Start from defaults and apply any `SHM_RING_*` overrides
    pub fn from_env() -> TransportResult<Self> {
        let mut config = Self::default();
        if let Some(capacity) = env_value(ENV_CAPACITY)? {
            config.capacity = capacity;
        }
        if let Some(timeout) = env_value(ENV_TIMEOUT_CYCLES)? {
            config.timeouts.timeout = timeout;
        }
        if let Some(level) = env_value(ENV_LEVEL0_CYCLES)? {
            config.timeouts.levels[0] = level;
        }
        if let Some(level) = env_value(ENV_LEVEL1_CYCLES)? {
            config.timeouts.levels[1] = level;
        }
        if let Some(spin_hint) = env_flag(ENV_SPIN_HINT)? {
            config.blocking.spin_hint = spin_hint;
        }
        if let Some(quantum) = env_value(ENV_SLEEP_QUANTUM_US)? {
            config.blocking.sleep_quantum_us = quantum;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutPolicy) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_blocking(mut self, blocking: BlockingConfig) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn validate(&self) -> TransportResult<()> {
        if self.capacity == 0 {
            return Err(TransportError::invalid("capacity must be positive"));
        }
        self.timeouts.validate()
    }

    /// Bytes of memory a ring with this configuration occupies
    pub fn required_size(&self) -> usize {
        RingBuffer::required_size(self.capacity)
    }

    /// Create a ring over `memory` using this configuration
    pub fn create<'a>(&self, memory: &'a mut [u8]) -> TransportResult<RingBuffer<'a>> {
        Ok(RingBuffer::create(memory, self.capacity, self.timeouts)?.with_blocking(self.blocking))
    }
}

fn env_value<T>(key: &str) -> TransportResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| TransportError::invalid(format!("{}={:?}: {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

fn env_flag(key: &str) -> TransportResult<Option<bool>> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(TransportError::invalid(format!("{}={:?} is not a flag", key, raw))),
        },
        Err(_) => Ok(None),
    }
}
