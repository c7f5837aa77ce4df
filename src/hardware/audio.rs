//! Audio cue catalogue.
//!
//! Track durations come from a static table and are used only to size the
//! settle delays between cues; playback is never measured or enforced.

use std::time::Duration;

/// The nine tracks on the player's storage card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Game instructions, played (and replayed) during the quest intro.
    Instructions,
    /// "Two lives left" warning.
    TwoLivesLeft,
    /// "One life left" warning.
    OneLifeLeft,
    /// "No lives left", the losing player's final cue.
    NoLivesLeft,
    /// Mission successful.
    MissionSuccess,
    /// Countdown played while a player lines up at the maze entrance.
    TurnCountdown,
    /// "Next player get ready", played after every resolved turn.
    NextPlayer,
    /// "Time is up".
    TimeUp,
    /// End-of-session announcement, looped in the consequence phase.
    SessionEnd,
}

impl Track {
    /// Track number understood by the playback driver.
    pub const fn id(self) -> u8 {
        match self {
            Track::Instructions => 1,
            Track::TwoLivesLeft => 2,
            Track::OneLifeLeft => 3,
            Track::NoLivesLeft => 4,
            Track::MissionSuccess => 5,
            Track::TurnCountdown => 6,
            Track::NextPlayer => 7,
            Track::TimeUp => 8,
            Track::SessionEnd => 9,
        }
    }

    /// Nominal recording length, used to size settle delays.
    pub const fn duration(self) -> Duration {
        let ms: u64 = match self {
            Track::Instructions => 27_000,
            Track::TwoLivesLeft => 6_000,
            Track::OneLifeLeft => 9_000,
            Track::NoLivesLeft => 8_000,
            Track::MissionSuccess => 11_000,
            Track::TurnCountdown => 4_000,
            Track::NextPlayer => 6_000,
            Track::TimeUp => 5_000,
            Track::SessionEnd => 11_000,
        };
        Duration::from_millis(ms)
    }

    /// Cue announcing how many lives remain after a loss.
    pub fn lives_cue(lives_remaining: u32) -> Track {
        match lives_remaining {
            2 => Track::TwoLivesLeft,
            1 => Track::OneLifeLeft,
            _ => Track::NoLivesLeft,
        }
    }
}
