//! End-to-end phase machine scenarios against the simulated rig.
//!
//! All tests run with paused tokio time, so every tick, blink, and audio
//! settle delay advances instantly and deterministically.

use lasermaze::{
    Channel, Game, GamePhase, PressClass, RfEvent, SessionConfig, SimulatedRig, Track,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Generous virtual-time budget; paused time makes this effectively free.
const WAIT: Duration = Duration::from_secs(600);

fn launch() -> (Arc<SimulatedRig>, Game) {
    let rig = Arc::new(SimulatedRig::new());
    let game = Game::launch(rig.clone(), rig.clone(), rig.clone());
    (rig, game)
}

async fn press(game: &Game, channel: Channel, class: PressClass) {
    game.rf_events
        .send(RfEvent { channel, class })
        .await
        .expect("event queue closed");
}

async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

async fn wait_for_phase(game: &Game, phase: GamePhase) {
    let shared = game.ctx.shared.clone();
    wait_until(&format!("phase {phase:?}"), move || shared.phase() == phase).await;
}

fn plays(rig: &Arc<SimulatedRig>, track: Track) -> usize {
    rig.played_tracks().iter().filter(|&&t| t == track).count()
}

/// Lasers are on from preparation entry until the selection is confirmed,
/// which makes them the safe signal that the post-selection flush has run and
/// a start press will not be discarded.
async fn wait_lasers(rig: &Arc<SimulatedRig>, on: bool) {
    let rig = rig.clone();
    let what = if on { "lasers on" } else { "lasers off" };
    wait_until(what, move || {
        rig.output(lasermaze::hardware::OutputId::Emitter1) == on
    })
    .await;
}

/// Walk the system from Idle into a running player turn.
///
/// `option_channel` picks the time limit during preparation.
async fn enter_first_turn(rig: &Arc<SimulatedRig>, game: &Game, option_channel: Channel) {
    press(game, Channel::Start, PressClass::Short).await;
    wait_for_phase(game, GamePhase::Preparation).await;
    wait_lasers(rig, true).await;

    press(game, option_channel, PressClass::Long).await;
    wait_lasers(rig, false).await;
    assert_eq!(
        game.ctx.shared.config(),
        SessionConfig::option(option_channel.index() as usize)
    );

    press(game, Channel::Start, PressClass::Long).await;
    wait_for_phase(game, GamePhase::Quest).await;

    // Quest intro: long press ends the instructions loop; the turn countdown
    // cue is the signal that turn setup ran and player 1 may start.
    press(game, Channel::Start, PressClass::Long).await;
    let rig_poll = rig.clone();
    wait_until("turn countdown cue", move || {
        plays(&rig_poll, Track::TurnCountdown) >= 1
    })
    .await;

    press(game, Channel::Start, PressClass::Short).await;
}

#[tokio::test(start_paused = true)]
async fn scenario_a_start_short_enters_preparation() {
    let (_rig, game) = launch();
    assert_eq!(game.ctx.shared.phase(), GamePhase::Idle);

    press(&game, Channel::Start, PressClass::Short).await;
    wait_for_phase(&game, GamePhase::Preparation).await;
}

#[tokio::test(start_paused = true)]
async fn scenario_b_channel1_long_selects_70s_then_quest() {
    let (rig, game) = launch();

    press(&game, Channel::Start, PressClass::Short).await;
    wait_for_phase(&game, GamePhase::Preparation).await;
    wait_lasers(&rig, true).await;

    press(&game, Channel::Life, PressClass::Long).await;
    wait_lasers(&rig, false).await;
    assert_eq!(
        game.ctx.shared.config().time_limit,
        Duration::from_millis(70_000)
    );
    assert_eq!(game.ctx.shared.config().confirm_blinks, 2);

    press(&game, Channel::Start, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Quest).await;
}

#[tokio::test(start_paused = true)]
async fn preparation_ignores_short_presses_and_emergency_channel_selection() {
    let (_rig, game) = launch();

    press(&game, Channel::Start, PressClass::Short).await;
    wait_for_phase(&game, GamePhase::Preparation).await;

    // Neither a short press nor the reserved channel may select a time mode.
    press(&game, Channel::End, PressClass::Short).await;
    press(&game, Channel::Emergency, PressClass::Short).await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(game.ctx.shared.config(), SessionConfig::default());

    press(&game, Channel::End, PressClass::Long).await;
    let shared = game.ctx.shared.clone();
    wait_until("90s config", move || {
        shared.config() == SessionConfig::option(2)
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn scenario_c_life_press_costs_a_life_and_beam_break_blocks_until_clear() {
    let (rig, game) = launch();
    enter_first_turn(&rig, &game, Channel::Life).await;

    // Remote life-loss event: 3 -> 2.
    press(&game, Channel::Life, PressClass::Short).await;
    let rig_poll = rig.clone();
    wait_until("two-lives cue", move || {
        plays(&rig_poll, Track::TwoLivesLeft) >= 1
    })
    .await;

    // Beam break: 2 -> 1, and the turn stays blocked until the mask clears.
    rig.set_sensor_mask(0b0000_0100);
    let rig_poll = rig.clone();
    wait_until("one-life cue", move || {
        plays(&rig_poll, Track::OneLifeLeft) >= 1
    })
    .await;

    // A win sent while blocked must not resolve the turn yet.
    press(&game, Channel::Life, PressClass::Long).await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(plays(&rig, Track::MissionSuccess), 0);

    rig.set_sensor_mask(0);
    let rig_poll = rig.clone();
    wait_until("mission success cue", move || {
        plays(&rig_poll, Track::MissionSuccess) >= 1
    })
    .await;
    assert!(rig.output(lasermaze::hardware::OutputId::GreenLighting));
    assert!(!rig.output(lasermaze::hardware::OutputId::RedLighting));
    assert_eq!(game.ctx.shared.phase(), GamePhase::Quest);

    // Continue decision: close the session out.
    press(&game, Channel::End, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Consequence).await;
}

#[tokio::test(start_paused = true)]
async fn three_losses_exhaust_lives_and_keep_the_session_alive() {
    let (rig, game) = launch();
    enter_first_turn(&rig, &game, Channel::Life).await;

    for (cue, expected) in [
        (Track::TwoLivesLeft, 1),
        (Track::OneLifeLeft, 1),
        // Played once on the final loss and once as the outcome audio.
        (Track::NoLivesLeft, 1),
    ] {
        press(&game, Channel::Life, PressClass::Short).await;
        let rig_poll = rig.clone();
        wait_until("life cue", move || plays(&rig_poll, cue) >= expected).await;
    }

    let rig_poll = rig.clone();
    wait_until("after-turn cue", move || {
        plays(&rig_poll, Track::NextPlayer) >= 1
    })
    .await;
    assert!(rig.output(lasermaze::hardware::OutputId::RedLighting));
    assert_eq!(game.ctx.shared.phase(), GamePhase::Quest);

    // Next player starts automatically after the continue signal.
    press(&game, Channel::Start, PressClass::Short).await;
    let rig_poll = rig.clone();
    wait_until("second countdown", move || {
        plays(&rig_poll, Track::TurnCountdown) >= 2
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn scenario_e_turn_times_out_with_lives_remaining() {
    let (rig, game) = launch();
    // 30 second option keeps the virtual clock walk short.
    enter_first_turn(&rig, &game, Channel::Start).await;

    let rig_poll = rig.clone();
    wait_until("time-up cue", move || plays(&rig_poll, Track::TimeUp) >= 1).await;
    assert!(rig.output(lasermaze::hardware::OutputId::RedLighting));
    assert_eq!(plays(&rig, Track::TwoLivesLeft), 0, "no life was lost");
    assert_eq!(game.ctx.shared.phase(), GamePhase::Quest);

    press(&game, Channel::End, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Consequence).await;
}

#[tokio::test(start_paused = true)]
async fn end_long_while_waiting_for_player_one_skips_to_consequence() {
    let (rig, game) = launch();

    press(&game, Channel::Start, PressClass::Short).await;
    wait_for_phase(&game, GamePhase::Preparation).await;
    wait_lasers(&rig, true).await;
    press(&game, Channel::Life, PressClass::Long).await;
    wait_lasers(&rig, false).await;
    press(&game, Channel::Start, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Quest).await;
    press(&game, Channel::Start, PressClass::Long).await;
    let rig_poll = rig.clone();
    wait_until("countdown", move || plays(&rig_poll, Track::TurnCountdown) >= 1).await;

    press(&game, Channel::End, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Consequence).await;
}

#[tokio::test(start_paused = true)]
async fn consequence_restarts_preparation_on_start_long() {
    let (rig, game) = launch();
    enter_first_turn(&rig, &game, Channel::End).await;
    press(&game, Channel::Life, PressClass::Long).await; // win
    let rig_poll = rig.clone();
    wait_until("win cue", move || plays(&rig_poll, Track::MissionSuccess) >= 1).await;
    press(&game, Channel::End, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Consequence).await;

    let rig_poll = rig.clone();
    wait_until("session end cue", move || {
        plays(&rig_poll, Track::SessionEnd) >= 1
    })
    .await;
    // The announcement repeats while the phase idles.
    let rig_poll = rig.clone();
    wait_until("session end replay", move || {
        plays(&rig_poll, Track::SessionEnd) >= 2
    })
    .await;

    // Config chosen last round survives until the next preparation overwrites it.
    assert_eq!(game.ctx.shared.config(), SessionConfig::option(2));

    press(&game, Channel::Start, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Preparation).await;
}

#[tokio::test(start_paused = true)]
async fn scenario_d_emergency_reset_from_a_blocked_quest_turn() {
    let (rig, game) = launch();
    enter_first_turn(&rig, &game, Channel::Life).await;

    // Break a beam and leave it broken: the turn is now blocked in the
    // wait-for-clear loop with no timeout of its own.
    rig.set_sensor_mask(0b0000_0001);
    let rig_poll = rig.clone();
    wait_until("life cue", move || plays(&rig_poll, Track::TwoLivesLeft) >= 1).await;

    press(&game, Channel::Emergency, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Idle).await;

    assert_eq!(game.ctx.shared.config(), SessionConfig::default());
    for bank in lasermaze::hardware::EMITTER_BANKS {
        assert!(!rig.output(bank), "lasers must be off after a reset");
    }
    assert!(!rig.output(lasermaze::hardware::OutputId::RedLighting));
    assert!(!rig.output(lasermaze::hardware::OutputId::GreenLighting));

    // The respawned coordinator accepts a fresh session.
    rig.set_sensor_mask(0);
    press(&game, Channel::Start, PressClass::Short).await;
    wait_for_phase(&game, GamePhase::Preparation).await;
}

#[tokio::test(start_paused = true)]
async fn emergency_reset_from_preparation_returns_to_idle() {
    let (_rig, game) = launch();

    press(&game, Channel::Start, PressClass::Short).await;
    wait_for_phase(&game, GamePhase::Preparation).await;

    press(&game, Channel::Emergency, PressClass::Long).await;
    wait_for_phase(&game, GamePhase::Idle).await;
    assert_eq!(game.ctx.shared.config(), SessionConfig::default());
}

#[tokio::test(start_paused = true)]
async fn dispatcher_applies_legacy_toggle_on_short_presses_only() {
    let (rig, game) = launch();

    press(&game, Channel::Life, PressClass::Short).await;
    let rig_poll = rig.clone();
    wait_until("latch toggled", move || rig_poll.input_latch() == 0b10).await;

    // Long presses and the emergency channel leave the latch alone.
    press(&game, Channel::Life, PressClass::Long).await;
    press(&game, Channel::Emergency, PressClass::Short).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(rig.input_latch(), 0b10);
}
