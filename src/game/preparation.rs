//! Preparation phase: time-limit selection and confirmation.
//!
//! Collects one time-limit choice, confirms it with a blink pattern, publishes
//! the session config, then waits for the start signal before handing the
//! phase to Quest.

use crate::game::state::{GamePhase, SessionConfig};
use crate::game::{flush_messages, idle_for, GameContext};
use crate::input::{Channel, PressClass};
use log::info;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Half-period of one confirmation blink cycle (off 300ms, on 300ms).
const BLINK_HALF_PERIOD: Duration = Duration::from_millis(300);

pub async fn preparation_loop(ctx: GameContext, cancel: CancellationToken) {
    info!("preparation started");

    // All lights and lasers on while the operator makes a choice.
    ctx.effects.set_red_lighting(true);
    ctx.effects.set_green_lighting(true);
    ctx.effects.set_lasers(true);

    let mut rx = ctx.messages.lock().await;

    info!("select time mode: long-press channel 1/2/3");
    let config = loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            msg = rx.recv() => match msg {
                // First qualifying long press wins; no re-selection this run.
                Some(msg) if msg.class == PressClass::Long => match msg.channel {
                    Channel::Start => break SessionConfig::option(0),
                    Channel::Life => break SessionConfig::option(1),
                    Channel::End => break SessionConfig::option(2),
                    Channel::Emergency => {}
                },
                Some(_) => {}
                None => return,
            }
        }
    };
    info!(
        "time mode selected: {}s, confirming with {} blink(s)",
        config.time_limit.as_secs(),
        config.confirm_blinks
    );

    // Anything queued while the operator dithered must not leak forward.
    flush_messages(&mut rx);

    for _ in 0..config.confirm_blinks {
        ctx.effects.set_red_lighting(false);
        ctx.effects.set_green_lighting(false);
        if !idle_for(&cancel, BLINK_HALF_PERIOD).await {
            return;
        }
        ctx.effects.set_red_lighting(true);
        ctx.effects.set_green_lighting(true);
        if !idle_for(&cancel, BLINK_HALF_PERIOD).await {
            return;
        }
    }

    ctx.effects.set_red_lighting(false);
    ctx.effects.set_green_lighting(false);
    ctx.effects.set_lasers(false);
    ctx.shared.set_config(config);
    info!("time mode confirmed, long-press the start channel to begin the quest");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            msg = rx.recv() => match msg {
                Some(msg) if msg.is(Channel::Start, PressClass::Long) => {
                    ctx.shared.set_phase(GamePhase::Quest);
                    return;
                }
                Some(_) => {}
                None => return,
            }
        }
    }
}
