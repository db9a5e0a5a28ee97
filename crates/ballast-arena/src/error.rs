//! Error types for arena construction and the thread context.

use std::error::Error;
use std::fmt;

/// Errors from arena construction and thread-context management.
///
/// Runtime misuse of a live arena (oversized pushes, pop ordering) is a
/// panic, not an error value; only construction and context setup are
/// recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The configuration failed validation.
    InvalidConfig {
        /// Description of the violated rule.
        reason: String,
    },
    /// The page provider could not reserve a block.
    ReserveFailed {
        /// Size of the failed reservation in bytes.
        requested: u64,
    },
    /// The calling thread already has a live scratch context.
    CtxAlreadyInitialized,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::InvalidConfig { reason } => {
                write!(f, "invalid arena config: {reason}")
            }
            ArenaError::ReserveFailed { requested } => {
                write!(f, "failed to reserve {requested} bytes of address space")
            }
            ArenaError::CtxAlreadyInitialized => {
                write!(f, "thread scratch context is already initialized")
            }
        }
    }
}

impl Error for ArenaError {}
