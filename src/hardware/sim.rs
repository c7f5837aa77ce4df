//! In-memory rig used by the binary's operator console and by tests.
//!
//! Mirrors the observable surface of the real drivers: a latch per discrete
//! output, a settable sensor mask, and a record of every track handed to the
//! playback driver.

use crate::hardware::{AudioPlayer, DiscreteOutputs, LaserSensors, OutputId, Track};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};

/// Simulated hardware backend implementing all three driver traits.
#[derive(Default)]
pub struct SimulatedRig {
    outputs: Mutex<HashMap<OutputId, bool>>,
    sensor_mask: AtomicU8,
    input_latch: AtomicU8,
    played: Mutex<Vec<Track>>,
}

impl SimulatedRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a discrete output line (off until first written).
    pub fn output(&self, id: OutputId) -> bool {
        self.outputs.lock().get(&id).copied().unwrap_or(false)
    }

    /// Simulate beams breaking and clearing: bit = 1 reads as broken.
    pub fn set_sensor_mask(&self, mask: u8) {
        self.sensor_mask.store(mask, Ordering::SeqCst);
    }

    /// Every track played so far, in order.
    pub fn played_tracks(&self) -> Vec<Track> {
        self.played.lock().clone()
    }

    /// State of the legacy expander latch (see `LaserSensors::toggle_input`).
    pub fn input_latch(&self) -> u8 {
        self.input_latch.load(Ordering::SeqCst)
    }
}

impl DiscreteOutputs for SimulatedRig {
    fn set(&self, id: OutputId, on: bool) {
        self.outputs.lock().insert(id, on);
    }
}

impl LaserSensors for SimulatedRig {
    fn read_mask(&self) -> u8 {
        self.sensor_mask.load(Ordering::SeqCst)
    }

    fn toggle_input(&self, bit: u8) {
        if bit < 8 {
            self.input_latch.fetch_xor(1 << bit, Ordering::SeqCst);
        }
    }
}

impl AudioPlayer for SimulatedRig {
    fn play(&self, track: Track) {
        log::debug!("audio: track {} ({:?})", track.id(), track);
        self.played.lock().push(track);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_latch_last_write() {
        let rig = SimulatedRig::new();
        assert!(!rig.output(OutputId::RedLighting));
        rig.set(OutputId::RedLighting, true);
        assert!(rig.output(OutputId::RedLighting));
        rig.set(OutputId::RedLighting, false);
        assert!(!rig.output(OutputId::RedLighting));
    }

    #[test]
    fn toggle_input_flips_single_bit() {
        let rig = SimulatedRig::new();
        rig.toggle_input(2);
        assert_eq!(rig.input_latch(), 0b100);
        rig.toggle_input(2);
        assert_eq!(rig.input_latch(), 0);
        // Out-of-range bits are ignored rather than wrapping.
        rig.toggle_input(8);
        assert_eq!(rig.input_latch(), 0);
    }

    #[test]
    fn play_records_track_order() {
        let rig = SimulatedRig::new();
        rig.play(Track::Instructions);
        rig.play(Track::TurnCountdown);
        assert_eq!(
            rig.played_tracks(),
            vec![Track::Instructions, Track::TurnCountdown]
        );
    }
}
