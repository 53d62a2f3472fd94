//! Unified error type for Presage.
//!
//! One flat enum covers every failure the engine can surface. Parse misses
//! and delivery failures are handled at the boundary where they occur and
//! never escape to crash the event loop; the variants here exist so those
//! boundaries have something precise to log or to return to an admin caller.

use serde::{Deserialize, Serialize};

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PresageError>;

/// Unified error type for all Presage operations.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PresageError {
    /// Invalid input or configuration (rejected admin values included)
    #[error("Invalid: {message}")]
    Invalid {
        /// What was invalid about the input
        message: String,
    },

    /// A feed message could not be interpreted
    #[error("Parse error: {message}")]
    Parse {
        /// What the parser could not make sense of
        message: String,
    },

    /// Outbound delivery or edit failed
    #[error("Transport error: {message}")]
    Transport {
        /// What the transport reported
        message: String,
    },

    /// Internal engine error
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong inside the engine
        message: String,
    },
}

impl PresageError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
