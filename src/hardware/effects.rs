//! Convenience layer over the discrete output driver.
//!
//! Groups the raw output lines into the handful of effector moves the game
//! phases actually make: lighting banks, the laser emitters as a unit, and the
//! per-phase diagnostic LEDs.

use crate::hardware::{DiscreteOutputs, OutputId, EMITTER_BANKS};
use std::sync::Arc;

/// Shared handle to the effector bus.
#[derive(Clone)]
pub struct Effects {
    outputs: Arc<dyn DiscreteOutputs>,
}

impl Effects {
    pub fn new(outputs: Arc<dyn DiscreteOutputs>) -> Self {
        Self { outputs }
    }

    pub fn set_red_lighting(&self, on: bool) {
        self.outputs.set(OutputId::RedLighting, on);
    }

    pub fn set_green_lighting(&self, on: bool) {
        self.outputs.set(OutputId::GreenLighting, on);
    }

    /// Energize or cut all four laser emitter banks together.
    pub fn set_lasers(&self, on: bool) {
        for bank in EMITTER_BANKS {
            self.outputs.set(bank, on);
        }
    }

    /// Drive a single panel diagnostic LED.
    pub fn set_indicator(&self, id: OutputId, on: bool) {
        self.outputs.set(id, on);
    }

    /// Everything to the safe/off state: lighting, lasers, and phase LEDs.
    pub fn all_off(&self) {
        self.set_red_lighting(false);
        self.set_green_lighting(false);
        self.set_lasers(false);
        for led in [
            OutputId::LedPreparation,
            OutputId::LedQuest,
            OutputId::LedConsequence,
            OutputId::LedResetProtocol,
        ] {
            self.outputs.set(led, false);
        }
    }
}
