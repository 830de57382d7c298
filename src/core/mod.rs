/*!
 * Core Module
 * Error types, limits, timing and blocking primitives
 */

pub mod clock;
pub mod errors;
pub mod hints;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use clock::CycleCount;
pub use errors::*;
