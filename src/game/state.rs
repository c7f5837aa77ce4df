//! Shared game state and the task handle table.
//!
//! The original installation kept all of this in raw volatile globals. Here a
//! single lock-guarded struct holds everything the tasks share, with a simple
//! writer discipline: the phase variable is written by exactly one task at a
//! time (the active phase worker hands the baton forward; only the emergency
//! controller may force it back to Idle), and `SessionConfig` is written only
//! by a running preparation worker.

use log::info;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Top-level game phase. Absent an emergency reset the sequence is strictly
/// cyclic after the first Idle: Preparation, Quest, Consequence, Preparation…
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Preparation,
    Quest,
    Consequence,
}

/// Session parameters chosen during preparation, read by the quest phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub time_limit: Duration,
    pub confirm_blinks: u32,
}

/// The three selectable time limits, bound to long presses on channels 0/1/2.
pub const TIME_OPTIONS_MS: [u64; 3] = [30_000, 70_000, 90_000];

impl SessionConfig {
    /// Option bound to the given selection channel index; confirm blink count
    /// is index + 1.
    pub fn option(index: usize) -> SessionConfig {
        SessionConfig {
            time_limit: Duration::from_millis(TIME_OPTIONS_MS[index]),
            confirm_blinks: index as u32 + 1,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::option(1)
    }
}

#[derive(Debug)]
struct GameState {
    phase: GamePhase,
    config: SessionConfig,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: GamePhase::Idle,
            config: SessionConfig::default(),
        }
    }
}

/// Lock-guarded holder for the phase variable and session config.
#[derive(Clone, Default)]
pub struct SharedGame {
    inner: Arc<Mutex<GameState>>,
}

impl SharedGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GamePhase {
        self.inner.lock().phase
    }

    /// Advance the phase variable. Callers follow the single-writer-at-a-time
    /// convention described in the module docs.
    pub fn set_phase(&self, phase: GamePhase) {
        let mut state = self.inner.lock();
        let previous = std::mem::replace(&mut state.phase, phase);
        info!("phase {:?} -> {:?}", previous, phase);
    }

    pub fn config(&self) -> SessionConfig {
        self.inner.lock().config
    }

    /// Publish the session config chosen during preparation. It persists until
    /// the next preparation run overwrites it.
    pub fn set_config(&self, config: SessionConfig) {
        self.inner.lock().config = config;
    }

    /// Revert everything to boot defaults (emergency path only).
    pub fn reset(&self) {
        *self.inner.lock() = GameState::default();
    }
}

/// Task slots, one per spawnable task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum TaskSlot {
    Coordinator = 0,
    Preparation,
    Quest,
    Consequence,
}

impl TaskSlot {
    pub const ALL: [TaskSlot; 4] = [
        TaskSlot::Coordinator,
        TaskSlot::Preparation,
        TaskSlot::Quest,
        TaskSlot::Consequence,
    ];
}

/// Fixed-size handle table with `None` as the explicit "not running" sentinel.
///
/// Slots are set by the spawner immediately after `tokio::spawn` and cleared
/// by whichever side observes the task's exit (the coordinator after a worker
/// hands the phase forward, or the emergency controller during teardown).
#[derive(Default)]
pub struct TaskTable {
    slots: Mutex<[Option<JoinHandle<()>>; 4]>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, slot: TaskSlot, handle: JoinHandle<()>) {
        self.slots.lock()[slot as usize] = Some(handle);
    }

    /// Take a handle out of its slot, leaving the sentinel behind.
    pub fn take(&self, slot: TaskSlot) -> Option<JoinHandle<()>> {
        self.slots.lock()[slot as usize].take()
    }

    pub fn is_running(&self, slot: TaskSlot) -> bool {
        self.slots.lock()[slot as usize].is_some()
    }
}
