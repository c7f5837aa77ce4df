//! # lasermaze - Laser Maze Control Core
//!
//! Control core of a physical laser-maze escape-room game: an interrupt-driven
//! remote-control front end feeding a concurrent, multi-phase game-state
//! orchestrator that drives lighting/laser effectors and an audio cue system
//! while tracking per-player lives, timing, and win/loss outcomes.
//!
//! ## Architecture
//!
//! - [`input`] - RF edge classification and the dispatcher task
//! - [`game`] - phase state machine, phase workers, emergency reset protocol
//! - [`hardware`] - driver seams (effectors, beam sensors, audio) and the
//!   simulated rig
//! - [`console`] - operator console standing in for the physical receiver
//! - [`error`] - centralized error types and handling
//!
//! Physical edges flow through a bounded event queue into the dispatcher,
//! which forwards normalized messages to whichever phase worker is currently
//! the exclusive consumer of the coordinator queue. Both queues hold three
//! slots; producers drop rather than block when one fills up.

// Core modules
pub mod error;
pub mod hardware;

// Input front end
pub mod input;

// Game core
pub mod game;

// Operator console for the simulated rig
pub mod console;

// Re-export commonly used types for convenience
pub use error::{MazeError, Result};

// Public API surface for external usage
pub use game::state::{GamePhase, SessionConfig};
pub use game::{Game, GameMessage};
pub use hardware::{SimulatedRig, Track};
pub use input::{Channel, EdgeClassifier, PressClass, RfEvent};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
