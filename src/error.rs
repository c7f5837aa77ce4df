//! Error types and handling infrastructure for lasermaze.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types and `anyhow` at the binary boundary for context.
//!
//! Almost every runtime path in the game core is deliberately infallible: driver
//! writes are fire-and-forget and queue overflow is an accepted lossy policy,
//! not an error. What remains are boot-time wiring problems and operator input,
//! both of which surface here.

use thiserror::Error;

/// The main error type for lasermaze operations.
#[derive(Error, Debug)]
pub enum MazeError {
    /// Peripheral or driver wiring failed at boot. Fatal: the game cannot run
    /// without its audio and sensor access.
    #[error("Hardware initialization failed: {message}")]
    Hardware { message: String },

    /// Malformed operator console input.
    #[error("Invalid console command: {message}")]
    Input { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for lasermaze operations.
pub type Result<T> = std::result::Result<T, MazeError>;

impl MazeError {
    /// Create a Hardware error with a descriptive message
    pub fn hardware(message: impl Into<String>) -> Self {
        Self::Hardware {
            message: message.into(),
        }
    }

    /// Create an Input error with a descriptive message
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}
