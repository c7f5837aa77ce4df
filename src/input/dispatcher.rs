//! Dispatcher task sitting between the edge classifier and the game core.
//!
//! Single consumer of the raw event queue. The emergency channel gets a
//! synchronous short-circuit check here, ahead of any forwarding, so a reset
//! request can never queue up behind game traffic.

use crate::game::emergency::EmergencyController;
use crate::game::GameMessage;
use crate::hardware::LaserSensors;
use crate::input::{Channel, PressClass, RfEvent};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Drain classified remote events until the event queue closes.
pub async fn dispatcher_loop(
    mut events: mpsc::Receiver<RfEvent>,
    messages: mpsc::Sender<GameMessage>,
    sensors: Arc<dyn LaserSensors>,
    emergency: EmergencyController,
) {
    while let Some(event) = events.recv().await {
        debug!(
            "{:?} press on channel {}",
            event.class,
            event.channel.index() + 1
        );

        if event.channel == Channel::Emergency && event.class == PressClass::Long {
            info!("emergency long press intercepted, starting reset protocol");
            emergency.reset().await;
            continue;
        }

        if event.class == PressClass::Short && event.channel != Channel::Emergency {
            // Legacy expander toggle carried over from an earlier iteration of
            // the installation; no consumer reads it back.
            sensors.toggle_input(event.channel.index());
        }

        let msg = GameMessage {
            channel: event.channel,
            class: event.class,
        };
        if messages.try_send(msg).is_err() {
            warn!("coordinator queue full, dropping {:?}", msg);
        }
    }
}
