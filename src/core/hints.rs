/*!
 * Processor Hints
 * Spin-wait and branch prediction hints for the polling hot path
 */

/// Tell the processor we are inside a spin-wait loop
///
/// # Performance
/// Emits `pause` on x86 (`yield`/`isb` on ARM). Reduces power draw and
/// pipeline flushes when the loop exits, at the cost of a few dozen cycles
/// per iteration, which delays noticing the peer's progress.
#[inline(always)]
pub fn spin_hint() {
    std::hint::spin_loop();
}

/// Hint that this branch is likely to be taken
///
/// On stable this returns the value unchanged; the annotation documents the
/// hot path for readers.
#[inline(always)]
#[must_use]
pub fn likely(b: bool) -> bool {
    b
}

/// Hint that this branch is unlikely to be taken
#[inline(always)]
#[must_use]
pub fn unlikely(b: bool) -> bool {
    b
}
