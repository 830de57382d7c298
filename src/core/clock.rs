/*!
 * Cycle Clock
 * Monotonic hardware time source for the blocking engine
 *
 * On x86 targets this reads the time-stamp counter directly. Elsewhere it
 * falls back to nanoseconds since a process-wide epoch, so one "cycle" is one
 * nanosecond there. Converting between cycles and wall-clock durations goes
 * through a one-off calibration that is cached for the life of the process.
 */

use crate::core::limits::CALIBRATION_WINDOW;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Elapsed time measured in clock cycles
pub type CycleCount = u64;

static CYCLES_PER_MICRO: OnceLock<f64> = OnceLock::new();

#[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Sample the cycle counter
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn now() -> CycleCount {
    // SAFETY: rdtsc is available on every x86_64 processor
    unsafe { std::arch::x86_64::_rdtsc() }
}

/// Sample the cycle counter
#[cfg(target_arch = "x86")]
#[inline(always)]
pub fn now() -> CycleCount {
    // SAFETY: rdtsc is available on every processor rustc targets for x86
    unsafe { std::arch::x86::_rdtsc() }
}

/// Sample the cycle counter
#[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
#[inline(always)]
pub fn now() -> CycleCount {
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as CycleCount
}

/// Cycles elapsed since `start`, saturating if the counter went backwards
#[inline(always)]
pub fn elapsed_since(start: CycleCount) -> CycleCount {
    now().saturating_sub(start)
}

/// Estimated counter frequency in cycles per microsecond
///
/// The first call blocks for the calibration window.
pub fn cycles_per_micro() -> f64 {
    *CYCLES_PER_MICRO.get_or_init(calibrate)
}

/// Convert a wall-clock duration to cycles
pub fn to_cycles(duration: Duration) -> CycleCount {
    let micros = duration.as_secs_f64() * 1_000_000.0;
    (micros * cycles_per_micro()).round() as CycleCount
}

/// Convert cycles to an approximate wall-clock duration
pub fn to_duration(cycles: CycleCount) -> Duration {
    let micros = cycles as f64 / cycles_per_micro();
    Duration::from_secs_f64(micros / 1_000_000.0)
}

fn calibrate() -> f64 {
    let wall_start = Instant::now();
    let start = now();
    while wall_start.elapsed() < CALIBRATION_WINDOW {
        std::hint::spin_loop();
    }
    let cycles = elapsed_since(start);
    let micros = wall_start.elapsed().as_secs_f64() * 1_000_000.0;

    // A stalled counter would make every conversion divide by zero
    let rate = (cycles as f64 / micros).max(1.0);
    debug!(cycles_per_micro = rate, "Cycle clock calibrated");
    rate
}
