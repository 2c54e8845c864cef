//! Move Resolution
//!
//! One traversal, two phases. `Slide` moves tiles into empty slots without
//! combining; `Merge` combines a tile with an equal, not-yet-merged
//! neighbour. A turn runs Slide, Merge, Slide, which reproduces full 2048
//! cascading with this single primitive.
//!
//! Cells nearest the target edge are visited first, so a leading tile has
//! already moved when the tiles behind it are scanned.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::{GRID_SIZE, MAX_EXP};
use crate::core::vec2::GridVec;
use crate::game::board::Board;
use crate::game::input::Direction;

/// Traversal mode of the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Relocate tiles into empty slots
    Slide,
    /// Combine adjacent equal tiles
    Merge,
}

/// One legal forward step of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Tile moves into the empty slot `to`
    Slide {
        /// Destination `(col, row)`
        to: (usize, usize),
    },
    /// Tile merges into the equal tile at `to`
    Merge {
        /// Destination `(col, row)`
        to: (usize, usize),
    },
}

impl Step {
    /// Where the tile ends up.
    #[inline]
    pub fn to(self) -> (usize, usize) {
        match self {
            Step::Slide { to } | Step::Merge { to } => to,
        }
    }
}

/// Visit order for `direction`: slots nearest the target edge first.
pub fn scan_order(direction: Direction) -> [(usize, usize); GRID_SIZE * GRID_SIZE] {
    std::array::from_fn(|k| {
        let major = k / GRID_SIZE;
        let minor = k % GRID_SIZE;
        let lead = GRID_SIZE - 1 - major;
        match direction {
            Direction::Left => (major, minor),
            Direction::Right => (lead, minor),
            Direction::Up => (minor, major),
            Direction::Down => (minor, lead),
        }
    })
}

/// The step the tile at `(col, row)` could take in `phase`, without mutating.
///
/// `None` for empty slots, slots on the target edge, and any obstruction.
pub fn probe(board: &Board, col: usize, row: usize, direction: Direction, phase: Phase) -> Option<Step> {
    let source = board.cell_at(col, row);
    if source.is_empty() {
        return None;
    }

    let to = GridVec::from_cell(col, row)
        .add(direction.vector())
        .to_cell(GRID_SIZE)?;
    let target = board.cell_at(to.0, to.1);

    match phase {
        Phase::Slide => target.is_empty().then_some(Step::Slide { to }),
        Phase::Merge => {
            let mergeable = !target.is_empty()
                && target.value_exp == source.value_exp
                && source.value_exp < MAX_EXP
                && !source.merged_this_turn
                && !target.merged_this_turn;
            mergeable.then_some(Step::Merge { to })
        }
    }
}

/// Run one phase over the whole board. Returns the number of steps taken.
///
/// A tile keeps stepping forward until blocked, so a slide can cross
/// several slots in one pass. A merge marks its destination, which blocks
/// any further merge into or out of it for the rest of the turn.
pub fn resolve(board: &mut Board, direction: Direction, phase: Phase) -> u32 {
    let mut moved = 0;

    for (col, row) in scan_order(direction) {
        let mut from = (col, row);
        while let Some(step) = probe(board, from.0, from.1, direction, phase) {
            match step {
                Step::Slide { to } => board.slide_tile(from, to),
                Step::Merge { to } => board.merge_tile(from, to),
            }
            from = step.to();
            moved += 1;
        }
    }

    moved
}

/// Like [`resolve`], for raw vectors from a shell. Anything other than a
/// cardinal unit vector leaves the board untouched and returns 0.
pub fn resolve_vector(board: &mut Board, vector: GridVec, phase: Phase) -> u32 {
    match Direction::from_vector(vector) {
        Ok(direction) => resolve(board, direction, phase),
        Err(err) => {
            debug!(%err, "move vector rejected");
            0
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
