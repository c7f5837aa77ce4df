//! Top-level phase state machine.
//!
//! The coordinator owns the phase-task lifecycle: for every phase other than
//! Idle it spawns exactly one worker, records the handle, and then polls the
//! shared phase variable until the worker hands the baton forward and
//! self-exits. It never drains the message queue while a worker is active;
//! the worker holds the receiver lock for its whole run.

use crate::game::state::{GamePhase, TaskSlot};
use crate::game::{consequence, idle_for, preparation, quest, GameContext, PHASE_POLL};
use crate::hardware::OutputId;
use crate::input::{Channel, PressClass};
use log::info;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run the coordinator until cancelled by the emergency controller.
pub async fn coordinator_loop(ctx: GameContext, cancel: CancellationToken) {
    // Fresh start or post-reset respawn: either way, begin from a clean slate.
    ctx.effects.all_off();
    ctx.shared.reset();
    info!("coordinator started; system fully reset and ready");

    loop {
        if cancel.is_cancelled() {
            return;
        }
        match ctx.shared.phase() {
            GamePhase::Idle => {
                if !wait_for_start(&ctx, &cancel).await {
                    return;
                }
            }
            GamePhase::Preparation => {
                run_phase(
                    &ctx,
                    &cancel,
                    GamePhase::Preparation,
                    TaskSlot::Preparation,
                    OutputId::LedPreparation,
                    preparation::preparation_loop,
                )
                .await;
            }
            GamePhase::Quest => {
                run_phase(
                    &ctx,
                    &cancel,
                    GamePhase::Quest,
                    TaskSlot::Quest,
                    OutputId::LedQuest,
                    quest::quest_loop,
                )
                .await;
            }
            GamePhase::Consequence => {
                run_phase(
                    &ctx,
                    &cancel,
                    GamePhase::Consequence,
                    TaskSlot::Consequence,
                    OutputId::LedConsequence,
                    consequence::consequence_loop,
                )
                .await;
            }
        }
    }
}

/// Idle: exclusive receive on the message queue until `{start, short}`.
async fn wait_for_start(ctx: &GameContext, cancel: &CancellationToken) -> bool {
    info!("system ready, short-press the start channel to begin preparation");
    let mut rx = ctx.messages.lock().await;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return false,
            msg = rx.recv() => match msg {
                Some(msg) if msg.is(Channel::Start, PressClass::Short) => {
                    ctx.shared.set_phase(GamePhase::Preparation);
                    return true;
                }
                Some(_) => {}
                None => return false,
            }
        }
    }
}

/// Spawn one worker for `phase`, then poll the shared phase variable at a
/// bounded interval until the worker moves it along.
async fn run_phase<F, Fut>(
    ctx: &GameContext,
    cancel: &CancellationToken,
    phase: GamePhase,
    slot: TaskSlot,
    led: OutputId,
    worker: F,
) where
    F: FnOnce(GameContext, CancellationToken) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    info!("starting {:?} phase", phase);
    ctx.effects.set_indicator(led, true);

    let handle = tokio::spawn(worker(ctx.clone(), cancel.child_token()));
    ctx.tasks.record(slot, handle);

    while ctx.shared.phase() == phase {
        if !idle_for(cancel, PHASE_POLL).await {
            // Emergency teardown joins the worker through the handle table.
            return;
        }
    }

    if let Some(handle) = ctx.tasks.take(slot) {
        let _ = handle.await;
    }
    ctx.effects.set_indicator(led, false);
    info!("{:?} phase completed", phase);
}
