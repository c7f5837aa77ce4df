//! Quest phase: instructions, sensor calibration, and the player turn loop.
//!
//! A turn races four termination conditions: a win or end-early signal from
//! the remote, running out of lives (beam breaks or remote life-loss events),
//! and the session time limit. Only one queued message is drained per tick,
//! which bounds reaction latency and keeps an event storm from starving the
//! sensor sampling.

use crate::game::state::GamePhase;
use crate::game::{flush_messages, idle_for, GameContext, GameMessage, GAME_TICK};
use crate::hardware::{Track, NUM_LASERS};
use crate::input::{Channel, PressClass};
use log::{info, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Lives granted at the start of every player turn.
pub const LIVES_PER_TURN: u32 = 3;

const ALERT_BLINKS: u32 = 3;
const ALERT_BLINK_INTERVAL: Duration = Duration::from_millis(200);

/// How a player's turn resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Win,
    LivesExhausted,
    Timeout,
    EndedEarly,
}

pub async fn quest_loop(ctx: GameContext, cancel: CancellationToken) {
    info!("quest started");
    let mut rx = ctx.messages.lock().await;

    // Instructions loop: short start press replays, long press begins.
    ctx.audio.play(Track::Instructions);
    info!("instructions playing; short-press start to replay, long-press to begin");
    loop {
        match recv(&cancel, &mut rx).await {
            None => return,
            Some(msg) if msg.is(Channel::Start, PressClass::Short) => {
                info!("replaying instructions");
                ctx.audio.play(Track::Instructions);
            }
            Some(msg) if msg.is(Channel::Start, PressClass::Long) => break,
            Some(_) => {}
        }
    }
    flush_messages(&mut rx);

    // One calibration pass per quest run; the working mask is frozen after.
    let working = calibrate(ctx.sensors.read_mask());
    let time_limit = ctx.shared.config().time_limit;

    let mut player: u32 = 1;
    loop {
        ctx.effects.set_lasers(true);
        ctx.audio.play(Track::TurnCountdown);

        if player == 1 {
            info!("waiting for player 1 to start (short-press start)");
            loop {
                match recv(&cancel, &mut rx).await {
                    None => return,
                    Some(msg) if msg.is(Channel::Start, PressClass::Short) => break,
                    Some(msg) if msg.is(Channel::End, PressClass::Long) => {
                        info!("session ended before the first turn");
                        ctx.shared.set_phase(GamePhase::Consequence);
                        return;
                    }
                    Some(_) => {}
                }
            }
        }
        if !idle_for(&cancel, Track::TurnCountdown.duration()).await {
            return;
        }

        ctx.effects.set_red_lighting(false);
        ctx.effects.set_green_lighting(false);
        info!("player {} started ({}s limit)", player, time_limit.as_secs());

        let outcome = match run_turn(&ctx, &cancel, &mut rx, working, time_limit).await {
            Some(outcome) => outcome,
            None => return,
        };
        ctx.effects.set_lasers(false);
        info!("player {} turn over: {:?}", player, outcome);

        match outcome {
            TurnOutcome::EndedEarly => {
                ctx.shared.set_phase(GamePhase::Consequence);
                return;
            }
            TurnOutcome::Win => {
                ctx.effects.set_green_lighting(true);
                ctx.effects.set_red_lighting(false);
                if !settle(&ctx, &cancel, Track::MissionSuccess).await {
                    return;
                }
            }
            TurnOutcome::LivesExhausted => {
                ctx.effects.set_red_lighting(true);
                ctx.effects.set_green_lighting(false);
                if !settle(&ctx, &cancel, Track::NoLivesLeft).await {
                    return;
                }
            }
            TurnOutcome::Timeout => {
                ctx.effects.set_red_lighting(true);
                ctx.effects.set_green_lighting(false);
                if !settle(&ctx, &cancel, Track::TimeUp).await {
                    return;
                }
            }
        }
        if !settle(&ctx, &cancel, Track::NextPlayer).await {
            return;
        }

        // Continue decision: next player in, or close out the session.
        ctx.effects.set_lasers(true);
        info!("short-press start for the next player, long-press end to finish");
        loop {
            match recv(&cancel, &mut rx).await {
                None => return,
                Some(msg) if msg.is(Channel::Start, PressClass::Short) => {
                    player += 1;
                    break;
                }
                Some(msg) if msg.is(Channel::End, PressClass::Long) => {
                    ctx.shared.set_phase(GamePhase::Consequence);
                    return;
                }
                Some(_) => {}
            }
        }
    }
}

/// One player's timed attempt. Returns `None` only on cancellation.
async fn run_turn(
    ctx: &GameContext,
    cancel: &CancellationToken,
    rx: &mut mpsc::Receiver<GameMessage>,
    working: u8,
    time_limit: Duration,
) -> Option<TurnOutcome> {
    let mut lives = LIVES_PER_TURN;
    let started = Instant::now();

    loop {
        if started.elapsed() >= time_limit {
            return Some(TurnOutcome::Timeout);
        }

        let interrupted = ctx.sensors.read_mask() & working != 0;

        // Drain at most one queued message this iteration.
        let mut life_event = false;
        let mut won = false;
        let mut ended_early = false;
        if let Ok(msg) = rx.try_recv() {
            if msg.is(Channel::Life, PressClass::Short) {
                life_event = true;
            } else if msg.is(Channel::Life, PressClass::Long) {
                won = true;
            } else if msg.is(Channel::End, PressClass::Long) {
                ended_early = true;
            }
        }
        // Both cannot be set in one tick, but the win check comes first.
        if won {
            return Some(TurnOutcome::Win);
        }
        if ended_early {
            return Some(TurnOutcome::EndedEarly);
        }

        if interrupted || life_event {
            lives -= 1;
            info!("life lost, {} remaining", lives);
            if !alert_blink(ctx, cancel).await {
                return None;
            }
            ctx.audio.play(Track::lives_cue(lives));
            // Resumption requires a clear beam. No timeout here: a sensor that
            // sticks broken after calibration blocks the turn until an
            // emergency reset (documented risk, not remedied).
            loop {
                if ctx.sensors.read_mask() & working == 0 {
                    break;
                }
                if !idle_for(cancel, GAME_TICK).await {
                    return None;
                }
            }
            if lives == 0 {
                return Some(TurnOutcome::LivesExhausted);
            }
        }

        if started.elapsed() >= time_limit {
            return Some(TurnOutcome::Timeout);
        }
        if !idle_for(cancel, GAME_TICK).await {
            return None;
        }
    }
}

/// Laser alert pattern shown on every life loss.
async fn alert_blink(ctx: &GameContext, cancel: &CancellationToken) -> bool {
    for _ in 0..ALERT_BLINKS {
        ctx.effects.set_lasers(false);
        if !idle_for(cancel, ALERT_BLINK_INTERVAL).await {
            return false;
        }
        ctx.effects.set_lasers(true);
        if !idle_for(cancel, ALERT_BLINK_INTERVAL).await {
            return false;
        }
    }
    true
}

/// Play a cue and wait out its nominal duration.
async fn settle(ctx: &GameContext, cancel: &CancellationToken, track: Track) -> bool {
    ctx.audio.play(track);
    idle_for(cancel, track.duration()).await
}

async fn recv(
    cancel: &CancellationToken,
    rx: &mut mpsc::Receiver<GameMessage>,
) -> Option<GameMessage> {
    tokio::select! {
        _ = cancel.cancelled() => None,
        msg = rx.recv() => msg,
    }
}

/// A sensor reading broken while the maze is idle is miscalibrated; exclude
/// it from interruption detection for the remainder of the run.
fn calibrate(raw: u8) -> u8 {
    if raw == 0 {
        info!("sensor calibration: all {} channels working", NUM_LASERS);
    } else {
        warn!(
            "sensor calibration: idle mask {:#010b}, broken channels excluded",
            raw
        );
    }
    !raw
}
