//! Emergency teardown/reset protocol.
//!
//! A long press on the emergency channel must bring the system back to a
//! known-safe Idle state from anywhere: cancel the current task generation,
//! join every recorded handle, force the effectors off, wipe the shared
//! state, drain stale messages, and respawn a fresh coordinator. Best-effort
//! by design, with no rollback on partial failure.

use crate::game::state::{TaskSlot, TaskTable};
use crate::game::{coordinator, GameContext};
use crate::hardware::OutputId;
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Settle delay between teardown and respawn.
const RESET_SETTLE: Duration = Duration::from_millis(500);

/// Cross-cutting reset controller. Cloned into the dispatcher; this is the
/// sole path allowed to reach Idle from a non-Idle phase and the sole path
/// allowed to end tasks it did not itself spawn.
#[derive(Clone)]
pub struct EmergencyController {
    ctx: GameContext,
    /// Cancellation token for the current task generation. Replaced wholesale
    /// on every reset; workers hold child tokens of their generation.
    generation: Arc<Mutex<CancellationToken>>,
}

impl EmergencyController {
    pub fn new(ctx: GameContext) -> Self {
        Self {
            ctx,
            generation: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    /// Spawn a coordinator under the current generation token and record its
    /// handle. A worker spawned concurrently with a reset inherits a child of
    /// the cancelled token, so it exits at its first suspension point even if
    /// its handle escaped the teardown join.
    pub fn spawn_coordinator(&self) {
        let token = self.generation.lock().clone();
        let handle = tokio::spawn(coordinator::coordinator_loop(self.ctx.clone(), token));
        self.ctx.tasks.record(TaskSlot::Coordinator, handle);
    }

    /// Full teardown and restart. Safe to invoke from any phase; a reset
    /// already in progress simply leaves nothing for the next one to join.
    pub async fn reset(&self) {
        warn!("emergency reset: tearing down all tasks");
        self.ctx.effects.set_indicator(OutputId::LedResetProtocol, true);

        let token = self.generation.lock().clone();
        token.cancel();
        join_all(&self.ctx.tasks).await;

        // Hardware to the safe state, shared state back to boot defaults.
        self.ctx.effects.all_off();
        self.ctx.shared.reset();

        // Discard whatever the dispatcher queued before the reset won the race.
        {
            let mut rx = self.ctx.messages.lock().await;
            let mut dropped = 0;
            while rx.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                info!("discarded {} pending message(s)", dropped);
            }
        }

        tokio::time::sleep(RESET_SETTLE).await;

        *self.generation.lock() = CancellationToken::new();
        self.spawn_coordinator();
        info!("emergency reset complete, coordinator restarted");
    }
}

/// Join every recorded task, null-checking each slot.
async fn join_all(tasks: &TaskTable) {
    for slot in TaskSlot::ALL {
        if let Some(handle) = tasks.take(slot) {
            if handle.await.is_err() {
                warn!("{:?} task did not exit cleanly", slot);
            } else {
                info!("{:?} task stopped", slot);
            }
        }
    }
}
