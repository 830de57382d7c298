/*!
 * Transport Limits and Constants
 *
 * Centralized location for the sizes, thresholds and quanta used by the
 * shared memory ring buffer and its blocking engine.
 *
 * - Layout constants are marked with [LAYOUT] and must not change without
 *   breaking peers built against the existing header
 * - Performance-sensitive constants are marked with [PERF]
 */

use std::time::Duration;

// =============================================================================
// SHARED LAYOUT
// =============================================================================

/// Number of escalation thresholds stored in a timeout policy
/// [LAYOUT] Busy -> yield -> sleep needs two boundaries
pub const ESCALATION_LEVELS: usize = 2;

/// Size of the ring buffer header in bytes
/// [LAYOUT] 4 x i32 cursors/counters followed by the 24 byte timeout record
pub const HEADER_SIZE: usize = 40;

/// Required alignment of the memory handed to the ring buffer
/// [LAYOUT] The timeout record holds u64 fields
pub const HEADER_ALIGN: usize = 8;

/// Largest capacity representable by the i32 header fields
pub const MAX_CAPACITY: usize = i32::MAX as usize;

// =============================================================================
// BLOCKING ENGINE
// =============================================================================

/// Default elapsed cycles before a blocked call starts yielding
/// [PERF] Roughly tens of microseconds on a ~3GHz TSC
pub const DEFAULT_LEVEL_ZERO_CYCLES: u64 = 100_000;

/// Default elapsed cycles before a blocked call starts sleeping
pub const DEFAULT_LEVEL_ONE_CYCLES: u64 = 1_000_000;

/// Sleep quantum used by the third escalation tier
pub const DEFAULT_SLEEP_QUANTUM: Duration = Duration::from_micros(1);

/// Low-latency preset: yield after this many cycles
pub const LOW_LATENCY_LEVEL_ZERO_CYCLES: u64 = 1_000_000;

/// Low-latency preset: sleep after this many cycles
pub const LOW_LATENCY_LEVEL_ONE_CYCLES: u64 = 10_000_000;

/// Low-latency preset: give up after this many cycles
pub const LOW_LATENCY_TIMEOUT_CYCLES: u64 = 1_000_000_000;

/// Relaxed preset: yield after this many cycles
pub const RELAXED_LEVEL_ZERO_CYCLES: u64 = 10_000;

/// Relaxed preset: sleep after this many cycles
pub const RELAXED_LEVEL_ONE_CYCLES: u64 = 100_000;

/// Relaxed preset: give up after this many cycles
pub const RELAXED_TIMEOUT_CYCLES: u64 = 30_000_000_000;

// =============================================================================
// CLOCK CALIBRATION
// =============================================================================

/// How long the cycle counter is sampled against the wall clock
pub const CALIBRATION_WINDOW: Duration = Duration::from_millis(5);

// =============================================================================
// CONFIGURATION DEFAULTS
// =============================================================================

/// Default ring capacity when none is configured (64KB)
pub const DEFAULT_CAPACITY: usize = 64 * 1024;
