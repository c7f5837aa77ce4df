//! lasermaze - Laser Maze Control Core
//!
//! Runs the full game system against the simulated rig, with an operator
//! console on stdin in place of the physical RF receiver.

use anyhow::Result;
use clap::{Arg, Command};
use lasermaze::console::{parse_mask, run_console};
use lasermaze::hardware::SimulatedRig;
use lasermaze::Game;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging for development
    env_logger::init();

    let matches = Command::new("lasermaze")
        .version(lasermaze::VERSION)
        .about("Control core for a laser-maze escape room game")
        .long_about(
            "Runs the laser-maze phase state machine against a simulated rig. \
             Type `press <1-4> <ms>` to synthesize remote presses, `beam <mask>` \
             to break and clear beams, `quit` to exit.",
        )
        .arg(
            Arg::new("broken")
                .long("broken")
                .value_name("MASK")
                .help("Sensor bits that read broken from boot (decimal or 0x hex)"),
        )
        .get_matches();

    let rig = Arc::new(SimulatedRig::new());

    // Peripheral wiring problems are fatal at boot by design: the game cannot
    // run without its sensor access, so halt before any task is spawned.
    if let Some(raw) = matches.get_one::<String>("broken") {
        let mask =
            parse_mask(raw).ok_or_else(|| anyhow::anyhow!("invalid sensor mask: {}", raw))?;
        rig.set_sensor_mask(mask);
    }

    let game = Game::launch(rig.clone(), rig.clone(), rig.clone());
    run_console(game.rf_events.clone(), rig).await;
    game.shutdown();

    Ok(())
}
