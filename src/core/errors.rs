/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::clock::CycleCount;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Transport operation result
///
/// # Must Use
/// A failed write or read moved no bytes; callers must not assume partial progress
pub type TransportResult<T> = Result<T, TransportError>;

/// Ring buffer transport errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum TransportError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(transport::invalid_argument),
        help("Check the memory pointer, its alignment and length, the capacity, and the request size.")
    )]
    InvalidArgument(String),

    #[error("Transport operation timed out after {elapsed_cycles} cycles (timeout: {timeout_cycles} cycles)")]
    #[diagnostic(
        code(transport::timeout),
        help("The peer made no progress before the deadline. Raise the policy timeout or check that the peer is alive.")
    )]
    Timeout {
        elapsed_cycles: CycleCount,
        timeout_cycles: CycleCount,
    },

    #[error("Requested {requested} bytes but only {available} are queued")]
    #[diagnostic(
        code(transport::out_of_range),
        help("Skip at most the current occupancy of the buffer.")
    )]
    OutOfRange { requested: usize, available: usize },

    #[error("Shared header is corrupted: {0}")]
    #[diagnostic(
        code(transport::corrupted),
        help("The memory does not hold an initialized ring buffer, or the peer uses a different layout.")
    )]
    Corrupted(String),

    #[error("Shared memory mapping failed: {0}")]
    #[diagnostic(
        code(transport::mapping_failed),
        help("Check the requested length and the process memory limits.")
    )]
    MappingFailed(String),
}

impl TransportError {
    /// Check if retrying the same operation later can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TransportError::InvalidArgument(msg.into())
    }
}

impl From<TransportError> for io::Error {
    fn from(err: TransportError) -> Self {
        let kind = match &err {
            TransportError::Timeout { .. } => io::ErrorKind::WouldBlock,
            TransportError::InvalidArgument(_) | TransportError::OutOfRange { .. } => {
                io::ErrorKind::InvalidInput
            }
            TransportError::Corrupted(_) => io::ErrorKind::InvalidData,
            TransportError::MappingFailed(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
