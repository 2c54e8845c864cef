//! Game Events
//!
//! Emitted by the turn sequencer so a shell can react (sounds, score
//! pop-ups, screens) without diffing boards between ticks.

use serde::{Serialize, Deserialize};

use crate::game::board::{MergeCommit, SpawnedTile};
use crate::game::input::Direction;
use crate::game::sequencer::TurnOutcome;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Board cleared and starting tiles placed
    NewGame {
        /// Tiles placed on the fresh board
        starting_tiles: Vec<SpawnedTile>,
    },

    /// A direction was accepted and a turn began
    TurnStarted {
        /// Direction captured for the turn
        direction: Direction,
    },

    /// A merge committed on settle and scored
    MergeCommitted {
        /// Cell and exponent the merge produced
        commit: MergeCommit,
        /// Points awarded (value of the new tile)
        points: u64,
        /// Score after the award
        new_score: u64,
    },

    /// A tile was placed after a changing turn
    TileSpawned {
        /// Where and what was placed
        tile: SpawnedTile,
    },

    /// The turn finished and was evaluated
    TurnCompleted {
        /// What the turn did
        outcome: TurnOutcome,
    },

    /// The winning tile appeared for the first time
    GameWon {
        /// Score at the win
        score: u64,
    },

    /// No move remains
    GameOver {
        /// Final score
        score: u64,
        /// Best score so far
        hi_score: u64,
    },

    /// Play continues past a win
    Resumed,
}

/// A game event with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create new game event.
    pub fn new_game(tick: u64, starting_tiles: Vec<SpawnedTile>) -> Self {
        Self::new(tick, GameEventData::NewGame { starting_tiles })
    }

    /// Create turn started event.
    pub fn turn_started(tick: u64, direction: Direction) -> Self {
        Self::new(tick, GameEventData::TurnStarted { direction })
    }

    /// Create merge committed event.
    pub fn merge_committed(tick: u64, commit: MergeCommit, new_score: u64) -> Self {
        Self::new(
            tick,
            GameEventData::MergeCommitted {
                commit,
                points: commit.points(),
                new_score,
            },
        )
    }

    /// Create tile spawned event.
    pub fn tile_spawned(tick: u64, tile: SpawnedTile) -> Self {
        Self::new(tick, GameEventData::TileSpawned { tile })
    }

    /// Create turn completed event.
    pub fn turn_completed(tick: u64, outcome: TurnOutcome) -> Self {
        Self::new(tick, GameEventData::TurnCompleted { outcome })
    }

    /// Create game won event.
    pub fn game_won(tick: u64, score: u64) -> Self {
        Self::new(tick, GameEventData::GameWon { score })
    }

    /// Create game over event.
    pub fn game_over(tick: u64, score: u64, hi_score: u64) -> Self {
        Self::new(tick, GameEventData::GameOver { score, hi_score })
    }

    /// Is this one of the events that ends play?
    pub fn is_terminal(&self) -> bool {
        matches!(self.data, GameEventData::GameWon { .. } | GameEventData::GameOver { .. })
    }
}
