//! Game core: the phase state machine and its worker tasks.
//!
//! Data flow: physical edges -> [`crate::input::EdgeClassifier`] -> bounded
//! event queue -> [`crate::input::dispatcher`] -> bounded message queue ->
//! whichever phase worker is currently active. Workers mutate the shared
//! phase variable, which the coordinator observes to drive transitions.
//!
//! The message receiver sits behind an async mutex; a phase worker locks it
//! for its whole lifetime, which is what enforces the
//! single-consumer-at-a-time invariant.

pub mod consequence;
pub mod coordinator;
pub mod emergency;
pub mod preparation;
pub mod quest;
pub mod state;

use crate::hardware::{AudioPlayer, DiscreteOutputs, Effects, LaserSensors};
use crate::input::{dispatcher, Channel, PressClass, RfEvent, QUEUE_CAPACITY};
use emergency::EmergencyController;
use state::{SharedGame, TaskTable};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Normalized remote message consumed by the active phase worker. Same shape
/// as [`RfEvent`], but a separate queue domain owned by the game core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameMessage {
    pub channel: Channel,
    pub class: PressClass,
}

impl GameMessage {
    /// Convenience predicate for the match patterns the phases care about.
    pub fn is(&self, channel: Channel, class: PressClass) -> bool {
        self.channel == channel && self.class == class
    }
}

/// Shared handle to the coordinator message queue's consumer end.
pub type MessageReceiver = Arc<Mutex<mpsc::Receiver<GameMessage>>>;

/// Coordinator poll interval while a phase worker is active.
pub const PHASE_POLL: Duration = Duration::from_millis(100);

/// Quest turn tick: bounds reaction latency without starving the scheduler.
pub const GAME_TICK: Duration = Duration::from_millis(50);

/// Everything a task needs to participate in the game, cheap to clone.
#[derive(Clone)]
pub struct GameContext {
    pub shared: SharedGame,
    pub tasks: Arc<TaskTable>,
    pub messages: MessageReceiver,
    pub effects: Effects,
    pub sensors: Arc<dyn LaserSensors>,
    pub audio: Arc<dyn AudioPlayer>,
}

/// The running system: dispatcher, coordinator, and the plumbing between them.
pub struct Game {
    pub ctx: GameContext,
    pub emergency: EmergencyController,
    /// Producer end of the raw event queue; hand this to the edge classifier.
    pub rf_events: mpsc::Sender<RfEvent>,
    dispatcher: JoinHandle<()>,
}

impl Game {
    /// Wire the queues, start the dispatcher and a fresh coordinator.
    pub fn launch(
        outputs: Arc<dyn DiscreteOutputs>,
        sensors: Arc<dyn LaserSensors>,
        audio: Arc<dyn AudioPlayer>,
    ) -> Game {
        let (rf_tx, rf_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (msg_tx, msg_rx) = mpsc::channel(QUEUE_CAPACITY);

        let ctx = GameContext {
            shared: SharedGame::new(),
            tasks: Arc::new(TaskTable::new()),
            messages: Arc::new(Mutex::new(msg_rx)),
            effects: Effects::new(outputs),
            sensors: Arc::clone(&sensors),
            audio,
        };

        let emergency = EmergencyController::new(ctx.clone());
        emergency.spawn_coordinator();

        let dispatcher = tokio::spawn(dispatcher::dispatcher_loop(
            rf_rx,
            msg_tx,
            sensors,
            emergency.clone(),
        ));

        Game {
            ctx,
            emergency,
            rf_events: rf_tx,
            dispatcher,
        }
    }

    /// Abort the dispatcher; used by shutdown paths that outlive the queues.
    pub fn shutdown(self) {
        self.dispatcher.abort();
    }
}

/// Cancellation-aware sleep. Returns `false` if the token fired first, in
/// which case the caller is expected to unwind out of its loop.
pub(crate) async fn idle_for(cancel: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

/// Discard everything currently queued, so stale input cannot leak into the
/// next stage. Returns how many messages were dropped.
pub(crate) fn flush_messages(rx: &mut mpsc::Receiver<GameMessage>) -> usize {
    let mut flushed = 0;
    while rx.try_recv().is_ok() {
        flushed += 1;
    }
    if flushed > 0 {
        log::debug!("flushed {} stale message(s)", flushed);
    }
    flushed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_predicate_matches_both_fields() {
        let msg = GameMessage {
            channel: Channel::Start,
            class: PressClass::Short,
        };
        assert!(msg.is(Channel::Start, PressClass::Short));
        assert!(!msg.is(Channel::Start, PressClass::Long));
        assert!(!msg.is(Channel::Life, PressClass::Short));
    }

    #[tokio::test]
    async fn flush_drains_queued_messages() {
        let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);
        for _ in 0..2 {
            tx.try_send(GameMessage {
                channel: Channel::Life,
                class: PressClass::Short,
            })
            .unwrap();
        }
        assert_eq!(flush_messages(&mut rx), 2);
        assert_eq!(flush_messages(&mut rx), 0);
    }
}
