//! Error types for container construction.

use std::error::Error;
use std::fmt;

/// Errors from hash container construction.
///
/// Runtime lookups never fail with an error value; a missing key is a
/// `None` or `false` result. Only descriptor validation is fallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The descriptor failed validation.
    InvalidDescriptor {
        /// Description of the violated rule.
        reason: String,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidDescriptor { reason } => {
                write!(f, "invalid map descriptor: {reason}")
            }
        }
    }
}

impl Error for MapError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_the_reason() {
        let err = MapError::InvalidDescriptor {
            reason: "capacity must be a power of two (got 12)".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("invalid map descriptor"));
        assert!(text.contains("power of two"));
    }
}
