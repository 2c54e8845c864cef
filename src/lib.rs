//! # Merge Grid
//!
//! Tick-driven engine for a 4×4 tile-merging puzzle. A shell feeds it
//! directions and clock ticks; it animates, merges, scores and spawns.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        MERGE GRID                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - Integer grid vectors                      │
//! │  ├── rng.rs      - Seeded Xorshift128+ behind RandomSource   │
//! │  └── hash.rs     - State hashing for replay verification     │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Direction and input normalization         │
//! │  ├── config.rs   - Tunables and validation                   │
//! │  ├── board.rs    - Cells, spawning, animation stepping       │
//! │  ├── resolver.rs - Slide/merge traversal                     │
//! │  ├── terminal.rs - Win and game-over evaluation              │
//! │  ├── sequencer.rs- Turn state machine (one tick per call)    │
//! │  └── events.rs   - Events for shells and replay              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Turn Model
//!
//! A turn is three passes (slide, merge, slide), each resolved on entry
//! and then animated to rest before the next begins. Merges score on the
//! tick they settle, never when they are initiated.
//!
//! ## Determinism Guarantee
//!
//! Given the same seed and the same directions, a game produces the same
//! boards, scores and events on any platform. No floats, no wall clock.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::vec2::GridVec;
pub use crate::core::rng::{DeterministicRng, RandomSource};
pub use game::input::Direction;
pub use game::config::GameConfig;
pub use game::board::{Board, BoardSnapshot};
pub use game::sequencer::{replay_game, Game, TurnOutcome, TurnPhase};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default animation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Side length of the grid
pub const GRID_SIZE: usize = 4;

/// Default winning exponent (2^11 = 2048)
pub const WINNING_EXP: u8 = 11;

/// Largest exponent a cell can hold; tiles at this value no longer merge
pub const MAX_EXP: u8 = 31;
