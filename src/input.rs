//! RF remote input domain.
//!
//! Four active-high input lines, one per remote channel, interrupt on every
//! electrical transition. [`edge::EdgeClassifier`] turns raw edges into
//! classified press events; [`dispatcher`] drains those events, short-circuits
//! the emergency channel, and forwards the rest to the game core.

pub mod dispatcher;
pub mod edge;

pub use edge::{classify, Channel, EdgeClassifier, PressClass, RfEvent, LONG_PRESS};

/// Fixed capacity of both the raw event queue and the game message queue.
/// Producers never block on a full queue; they drop.
pub const QUEUE_CAPACITY: usize = 3;
