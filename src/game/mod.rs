//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Direction enum and input normalization
//! - `config`: Tunables and their validation
//! - `board`: Cells, tiles, spawning, animation stepping
//! - `resolver`: The single slide/merge traversal
//! - `terminal`: Win and game-over evaluation
//! - `sequencer`: Tick-driven turn state machine
//! - `events`: Game events for shells and replay

pub mod input;
pub mod config;
pub mod board;
pub mod resolver;
pub mod terminal;
pub mod sequencer;
pub mod events;

// Re-export key types
pub use input::{Direction, InputError};
pub use config::{ConfigError, GameConfig, SpawnRule};
pub use board::{Board, BoardSnapshot, Cell, CellView, MergeCommit, SpawnedTile};
pub use resolver::{probe, resolve, scan_order, Phase, Step};
pub use terminal::{legal_directions, Verdict};
pub use sequencer::{replay_game, Game, TerminalReason, TickResult, TurnOutcome, TurnPhase};
pub use events::{GameEvent, GameEventData};
