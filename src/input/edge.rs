//! Interrupt-context press/release edge tracking.
//!
//! `on_edge` is the only code that runs at interrupt priority: it must be
//! O(1), never block, and never allocate. Classification needs a complete
//! press-then-release cycle, which is also what makes contact bounce
//! tolerable without any extra debounce filtering: a bounce that never
//! completes a cycle emits nothing.

use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A press is LONG once it has been held for this long (boundary inclusive).
pub const LONG_PRESS: Duration = Duration::from_millis(800);

/// Remote channel roles, fixed by the installation's wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    /// RF1: start / advance.
    Start = 0,
    /// RF2: life loss (short) or win (long).
    Life = 1,
    /// RF3: end the session early.
    End = 2,
    /// RF4: reserved for the emergency reset protocol.
    Emergency = 3,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Start,
        Channel::Life,
        Channel::End,
        Channel::Emergency,
    ];

    /// Map a raw line index (0-3) to its channel role.
    pub fn from_index(index: u8) -> Option<Channel> {
        match index {
            0 => Some(Channel::Start),
            1 => Some(Channel::Life),
            2 => Some(Channel::End),
            3 => Some(Channel::Emergency),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Press classification by held duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressClass {
    Short,
    Long,
}

/// Classify a completed press by how long the line was held active.
pub fn classify(held: Duration) -> PressClass {
    if held >= LONG_PRESS {
        PressClass::Long
    } else {
        PressClass::Short
    }
}

/// Classified press event, produced once per full press-release cycle and
/// consumed exactly once by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfEvent {
    pub channel: Channel,
    pub class: PressClass,
}

/// Per-channel press state, written only from interrupt context.
#[derive(Debug, Default, Clone, Copy)]
struct PressState {
    pressed: bool,
    press_start: Option<Instant>,
}

/// Per-channel edge tracker feeding the bounded event queue.
pub struct EdgeClassifier {
    channels: [PressState; 4],
    events: mpsc::Sender<RfEvent>,
}

impl EdgeClassifier {
    pub fn new(events: mpsc::Sender<RfEvent>) -> Self {
        Self {
            channels: [PressState::default(); 4],
            events,
        }
    }

    /// Handle one electrical transition on a channel's input line.
    ///
    /// `now` is supplied by the caller: interrupt context must not own a
    /// clock, and tests pin timestamps exactly. Returns the event that was
    /// enqueued, if any; a full queue drops the event silently (accepted
    /// lossy policy under rapid multi-button input).
    pub fn on_edge(&mut self, channel: Channel, level_active: bool, now: Instant) -> Option<RfEvent> {
        let state = &mut self.channels[channel.index() as usize];

        if level_active {
            if !state.pressed {
                state.pressed = true;
                state.press_start = Some(now);
            }
            return None;
        }

        if !state.pressed {
            // Release with no prior press: spurious, ignore.
            return None;
        }
        state.pressed = false;
        let start = state.press_start.take()?;

        let event = RfEvent {
            channel,
            class: classify(now.saturating_duration_since(start)),
        };
        match self.events.try_send(event) {
            Ok(()) => Some(event),
            Err(_) => {
                log::debug!("rf event queue full, dropping {:?}", event);
                None
            }
        }
    }
}
