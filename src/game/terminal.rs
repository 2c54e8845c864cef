//! Terminal-State Evaluation
//!
//! Read-only questions about a board: can anything still move, and has the
//! winning tile appeared. Legality is decided by the resolver's own
//! [`probe`] over the resolver's own [`scan_order`], so the evaluator can
//! never disagree with what a move would actually do.

use serde::{Serialize, Deserialize};

use crate::game::board::Board;
use crate::game::input::Direction;
use crate::game::resolver::{probe, scan_order, Phase};

/// Outcome of evaluating a settled board at the end of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Keep playing
    Continue,
    /// Winning tile reached for the first time
    Won,
    /// Full board, nothing can move or merge
    GameOver,
}

/// True if a move in `direction` would slide or merge at least one tile.
pub fn can_move(board: &Board, direction: Direction) -> bool {
    scan_order(direction).into_iter().any(|(col, row)| {
        probe(board, col, row, direction, Phase::Slide).is_some()
            || probe(board, col, row, direction, Phase::Merge).is_some()
    })
}

/// Which directions would change the board, indexed like [`Direction::ALL`].
pub fn legal_directions(board: &Board) -> [bool; 4] {
    Direction::ALL.map(|direction| can_move(board, direction))
}

/// True at the first slot, in any direction, that has a legal slide or merge.
pub fn any_move_possible(board: &Board) -> bool {
    Direction::ALL.into_iter().any(|direction| can_move(board, direction))
}

/// True iff some tile has exactly the winning exponent.
pub fn has_won(board: &Board, winning_exp: u8) -> bool {
    board.cells().any(|cell| cell.value_exp == winning_exp)
}

/// No empty slot and no legal move. A full board with a merge is still live.
pub fn is_game_over(board: &Board) -> bool {
    !board.any_empty() && !any_move_possible(board)
}

/// End-of-turn check. A win already recorded is not reported again.
pub fn evaluate(board: &Board, winning_exp: u8, already_won: bool) -> Verdict {
    if !already_won && has_won(board, winning_exp) {
        Verdict::Won
    } else if is_game_over(board) {
        Verdict::GameOver
    } else {
        Verdict::Continue
    }
}
