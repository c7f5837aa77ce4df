//! Driver seams for the physical rig.
//!
//! The real installation talks to two daisy-chained shift registers (lighting
//! contactors, laser emitters, diagnostic LEDs), an 8-bit I/O expander wired to
//! the beam sensors, and a serial audio player. All three are thin, stateless
//! I/O wrappers, so the game core only sees them through the traits below.
//! Runtime operations are fire-and-forget and never fail; anything that can go
//! wrong happens at boot, before a single task is spawned.

pub mod audio;
pub mod effects;
pub mod sim;

pub use audio::Track;
pub use effects::Effects;
pub use sim::SimulatedRig;

/// Number of laser beam channels monitored by the sensor expander.
pub const NUM_LASERS: usize = 8;

/// Discrete output assignments on the shift-register chain.
///
/// The first eight positions drive power hardware, the rest are panel
/// diagnostic LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutputId {
    /// Laser emitter banks.
    Emitter1 = 1,
    Emitter2,
    Emitter3,
    Emitter4,
    /// Red lighting contactor.
    RedLighting,
    /// Green lighting contactor.
    GreenLighting,
    Relay3,
    Relay4,
    LedSetupOk,
    LedBus,
    LedAudio,
    LedPreparation,
    LedQuest,
    LedConsequence,
    LedResetProtocol,
}

/// All four laser emitter banks, energized and cut together.
pub const EMITTER_BANKS: [OutputId; 4] = [
    OutputId::Emitter1,
    OutputId::Emitter2,
    OutputId::Emitter3,
    OutputId::Emitter4,
];

/// Fire-and-forget discrete output driver (lighting, lasers, panel LEDs).
pub trait DiscreteOutputs: Send + Sync {
    /// Drive a single output line. No acknowledgment, no failure path.
    fn set(&self, id: OutputId, on: bool);
}

/// Beam sensor expander: one bit per laser channel, polled rather than
/// interrupt-driven.
pub trait LaserSensors: Send + Sync {
    /// Sample all eight sensors. Bit = 1 means the beam is currently broken.
    fn read_mask(&self) -> u8;

    /// Legacy expander-bit toggle applied on short remote presses. Preserved
    /// interface; no downstream consumer has been identified.
    fn toggle_input(&self, bit: u8);
}

/// Audio cue driver. Starting a track stops whatever was playing.
pub trait AudioPlayer: Send + Sync {
    fn play(&self, track: Track);
}
