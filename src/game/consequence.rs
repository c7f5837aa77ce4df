//! Consequence phase: session wrap-up.
//!
//! Lasers stay off, both lighting banks stay on, and the end-of-session
//! announcement loops every 20 seconds until the operator long-presses the
//! start channel to open a new preparation round.

use crate::game::state::GamePhase;
use crate::game::GameContext;
use crate::hardware::Track;
use crate::input::{Channel, PressClass};
use log::info;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const RECV_TIMEOUT: Duration = Duration::from_millis(100);
const REPLAY_INTERVAL: Duration = Duration::from_secs(20);

pub async fn consequence_loop(ctx: GameContext, cancel: CancellationToken) {
    info!("consequence started");

    ctx.effects.set_lasers(false);
    ctx.effects.set_red_lighting(true);
    ctx.effects.set_green_lighting(true);

    ctx.audio.play(Track::SessionEnd);
    let mut last_replay = Instant::now();

    info!("session over; long-press the start channel to restart preparation");
    let mut rx = ctx.messages.lock().await;
    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => return,
            received = tokio::time::timeout(RECV_TIMEOUT, rx.recv()) => received,
        };
        match received {
            Ok(Some(msg)) if msg.is(Channel::Start, PressClass::Long) => {
                ctx.shared.set_phase(GamePhase::Preparation);
                return;
            }
            Ok(Some(_)) => {}
            Ok(None) => return,
            // Timed out: nothing queued this interval.
            Err(_) => {}
        }

        if last_replay.elapsed() >= REPLAY_INTERVAL {
            info!("replaying session end announcement");
            ctx.audio.play(Track::SessionEnd);
            last_replay = Instant::now();
        }
    }
}
