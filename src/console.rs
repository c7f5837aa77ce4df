//! Operator console for the simulated rig.
//!
//! The physical front end (RF receiver lines firing interrupts on every
//! transition) is out of scope, so the binary stands a line-oriented stdin
//! console in its place: each `press` command synthesizes the exact pair of
//! edges the receiver would have produced, and `beam` drives the simulated
//! sensor mask.

use crate::error::{MazeError, Result};
use crate::hardware::SimulatedRig;
use crate::input::{Channel, EdgeClassifier, RfEvent};
use log::error;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedSender};

/// Parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Full press/release cycle on a remote channel, held for the duration.
    Press { channel: Channel, held: Duration },
    /// Overwrite the simulated 8-bit sensor mask (bit = 1 reads broken).
    Beam { mask: u8 },
    Quit,
}

const USAGE: &str = "commands: press <1-4> <ms> | beam <mask> | quit";

/// Parse one console line.
pub fn parse_command(line: &str) -> Result<ConsoleCommand> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("press") => {
            let channel = parts
                .next()
                .and_then(|raw| raw.parse::<u8>().ok())
                .and_then(|n| n.checked_sub(1))
                .and_then(Channel::from_index)
                .ok_or_else(|| MazeError::input("press needs a channel between 1 and 4"))?;
            let millis = parts
                .next()
                .and_then(|raw| raw.parse::<u64>().ok())
                .ok_or_else(|| MazeError::input("press needs a hold duration in milliseconds"))?;
            Ok(ConsoleCommand::Press {
                channel,
                held: Duration::from_millis(millis),
            })
        }
        Some("beam") => {
            let mask = parts
                .next()
                .and_then(parse_mask)
                .ok_or_else(|| MazeError::input("beam needs a mask, decimal or 0x hex"))?;
            Ok(ConsoleCommand::Beam { mask })
        }
        Some("quit") | Some("exit") => Ok(ConsoleCommand::Quit),
        Some(other) => Err(MazeError::input(format!("unknown command '{}'", other))),
        None => Err(MazeError::input("empty command")),
    }
}

/// Accept `13` or `0x0d`.
pub fn parse_mask(raw: &str) -> Option<u8> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).ok()
    } else {
        raw.parse::<u8>().ok()
    }
}

/// Spawn a blocking thread that reads stdin lines and forwards them.
fn spawn_stdin_thread(tx: UnboundedSender<String>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if tx.send(line.trim().to_string()).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    error!("stdin read failed: {}", err);
                    break;
                }
            }
        }
    })
}

/// Run the console until `quit` or EOF.
pub async fn run_console(rf_events: mpsc::Sender<RfEvent>, rig: Arc<SimulatedRig>) {
    let mut classifier = EdgeClassifier::new(rf_events);
    let (tx, mut lines) = mpsc::unbounded_channel();
    let reader = spawn_stdin_thread(tx);

    println!("{}", USAGE);
    while let Some(line) = lines.recv().await {
        if line.is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(ConsoleCommand::Press { channel, held }) => {
                let now = Instant::now();
                classifier.on_edge(channel, true, now);
                classifier.on_edge(channel, false, now + held);
                // Give the dispatcher a chance to drain before the next line.
                tokio::task::yield_now().await;
            }
            Ok(ConsoleCommand::Beam { mask }) => {
                rig.set_sensor_mask(mask);
            }
            Ok(ConsoleCommand::Quit) => break,
            Err(err) => {
                eprintln!("{}", err);
                eprintln!("{}", USAGE);
            }
        }
    }
    drop(reader); // stdin thread exits on its own at EOF
}
