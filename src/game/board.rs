//! Board and Cell State
//!
//! Cells never move. A tile "travels" by copying its exponent from one slot
//! to another; the receiving slot's `visual` position starts where the tile
//! came from and converges on the slot's `home` one step per tick.
//!
//! A merge is virtual until it settles: the destination keeps the old
//! exponent with `merge_pending` set, and the increment is committed exactly
//! once, on the tick its visual position reaches home.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::{GRID_SIZE, MAX_EXP};
use crate::core::vec2::GridVec;
use crate::core::rng::RandomSource;
use crate::core::hash::StateHasher;
use crate::game::config::SpawnRule;

// =============================================================================
// CELL
// =============================================================================

/// One fixed slot of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Tile exponent: 0 = empty, k = tile worth 2^k
    pub value_exp: u8,

    /// Fixed display position (column, row)
    pub home: GridVec,

    /// Animated position; equals `home` when settled
    pub visual: GridVec,

    /// This slot already received a merge this turn
    pub merged_this_turn: bool,

    /// Merge initiated, increment not yet committed
    pub merge_pending: bool,

    /// Remaining frames of "just merged" emphasis (cosmetic)
    pub reward_ticks: u8,
}

impl Cell {
    /// Empty cell at `(col, row)`.
    pub const fn empty(col: usize, row: usize) -> Self {
        let home = GridVec::from_cell(col, row);
        Self {
            value_exp: 0,
            home,
            visual: home,
            merged_this_turn: false,
            merge_pending: false,
            reward_ticks: 0,
        }
    }

    /// No tile here.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value_exp == 0
    }

    /// Animation has reached the fixed position.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.visual == self.home
    }

    /// Displayed tile value (0 for empty).
    #[inline]
    pub fn value(&self) -> u64 {
        tile_value(self.value_exp)
    }

    /// Empty the slot and snap its visual position home.
    pub fn clear(&mut self) {
        let home = self.home;
        *self = Cell {
            value_exp: 0,
            home,
            visual: home,
            merged_this_turn: false,
            merge_pending: false,
            reward_ticks: 0,
        };
    }

    /// Advance the animation by one step.
    ///
    /// Returns the new exponent if this step committed a pending merge.
    pub fn step(&mut self, reward_ticks: u8) -> Option<u8> {
        if self.is_settled() {
            return None;
        }

        self.visual = self.visual.step_toward(self.home);

        if self.is_settled() && self.merge_pending {
            self.merge_pending = false;
            self.value_exp = (self.value_exp + 1).min(MAX_EXP);
            self.reward_ticks = reward_ticks;
            return Some(self.value_exp);
        }
        None
    }
}

/// Displayed value of an exponent (0 stays 0).
#[inline]
pub fn tile_value(exp: u8) -> u64 {
    if exp == 0 {
        0
    } else {
        1u64 << exp
    }
}

// =============================================================================
// EVENTS OF BOARD MUTATION
// =============================================================================

/// A tile placed by a spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedTile {
    /// Column
    pub col: usize,
    /// Row
    pub row: usize,
    /// Exponent placed
    pub value_exp: u8,
}

/// A merge that committed during an animation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCommit {
    /// Column
    pub col: usize,
    /// Row
    pub row: usize,
    /// Exponent after the increment
    pub value_exp: u8,
}

impl MergeCommit {
    /// Points this merge scores: the resulting tile's value.
    pub fn points(&self) -> u64 {
        tile_value(self.value_exp)
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// The N×N grid. Indexed `[row][col]` internally; the API takes `(col, row)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; GRID_SIZE]; GRID_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board, every visual position at home.
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|row| std::array::from_fn(|col| Cell::empty(col, row))),
        }
    }

    /// Build a settled board from exponents given row by row, left to right.
    pub fn from_exponents(rows: [[u8; GRID_SIZE]; GRID_SIZE]) -> Self {
        let mut board = Self::new();
        for (row, exps) in rows.iter().enumerate() {
            for (col, &exp) in exps.iter().enumerate() {
                board.place(col, row, exp);
            }
        }
        board
    }

    /// Exponents row by row.
    pub fn exponents(&self) -> [[u8; GRID_SIZE]; GRID_SIZE] {
        std::array::from_fn(|row| std::array::from_fn(|col| self.cells[row][col].value_exp))
    }

    /// Bounds-checked access. Out of range is a logic error.
    #[inline]
    pub fn cell_at(&self, col: usize, row: usize) -> &Cell {
        debug_assert!(col < GRID_SIZE && row < GRID_SIZE, "cell ({col}, {row}) out of range");
        &self.cells[row][col]
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, col: usize, row: usize) -> &mut Cell {
        debug_assert!(col < GRID_SIZE && row < GRID_SIZE, "cell ({col}, {row}) out of range");
        &mut self.cells[row][col]
    }

    /// Checked access for callers holding untrusted coordinates.
    pub fn get(&self, col: usize, row: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut().flatten()
    }

    /// True iff the slot holds no tile.
    #[inline]
    pub fn is_empty(&self, col: usize, row: usize) -> bool {
        self.cell_at(col, row).is_empty()
    }

    /// Number of empty slots.
    pub fn count_empty(&self) -> usize {
        self.cells().filter(|c| c.is_empty()).count()
    }

    /// At least one empty slot.
    pub fn any_empty(&self) -> bool {
        self.cells().any(Cell::is_empty)
    }

    /// Largest exponent on the board.
    pub fn max_exp(&self) -> u8 {
        self.cells().map(|c| c.value_exp).max().unwrap_or(0)
    }

    /// Sum of displayed values (merges conserve it).
    pub fn total_value(&self) -> u64 {
        self.cells().map(Cell::value).sum()
    }

    /// Pick one empty slot uniformly at random.
    ///
    /// Draws a rank among the current empty count, then walks the grid to
    /// that rank, so every empty slot is equally likely.
    pub fn random_empty_cell<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Option<(usize, usize)> {
        let empty = self.count_empty();
        if empty == 0 {
            return None;
        }

        let rank = rng.next_int(empty as u32) as usize;
        self.cells()
            .filter(|c| c.is_empty())
            .nth(rank)
            .map(|c| (c.home.x as usize, c.home.y as usize))
    }

    /// Place a random tile on a random empty slot. No-op on a full board.
    pub fn spawn<R: RandomSource + ?Sized>(&mut self, rng: &mut R, rule: &SpawnRule) -> Option<SpawnedTile> {
        let (col, row) = self.random_empty_cell(rng)?;
        let value_exp = if rng.roll_percent(rule.high_percent) {
            rule.high_exp
        } else {
            rule.low_exp
        };

        self.place(col, row, value_exp);
        Some(SpawnedTile { col, row, value_exp })
    }

    /// Put a settled tile on a slot (0 empties it).
    pub fn place(&mut self, col: usize, row: usize, value_exp: u8) {
        let cell = self.cell_mut(col, row);
        cell.clear();
        cell.value_exp = value_exp.min(MAX_EXP);
    }

    /// Clear every slot. Fixed positions never change.
    pub fn reset(&mut self) {
        for cell in self.cells_mut() {
            cell.clear();
        }
    }

    /// Forget which slots merged; called at turn boundaries.
    pub fn clear_turn_flags(&mut self) {
        for cell in self.cells_mut() {
            cell.merged_this_turn = false;
        }
    }

    /// Every visual position equals its fixed position.
    pub fn is_settled(&self) -> bool {
        self.cells().all(Cell::is_settled)
    }

    /// Step every unsettled cell once, returning merges that committed.
    pub fn step_animation(&mut self, reward_ticks: u8) -> Vec<MergeCommit> {
        let mut commits = Vec::new();
        for cell in self.cells_mut() {
            if let Some(value_exp) = cell.step(reward_ticks) {
                commits.push(MergeCommit {
                    col: cell.home.x as usize,
                    row: cell.home.y as usize,
                    value_exp,
                });
            }
        }
        commits
    }

    /// Count down the cosmetic merge emphasis.
    pub fn decay_rewards(&mut self) {
        for cell in self.cells_mut() {
            cell.reward_ticks = cell.reward_ticks.saturating_sub(1);
        }
    }

    // =========================================================================
    // Mutation primitives used by the resolver
    // =========================================================================

    /// Move a tile into an empty slot. The receiver animates from the slot
    /// the tile just left, so each step of a chained slide is one cell.
    pub(crate) fn slide_tile(&mut self, from: (usize, usize), to: (usize, usize)) {
        let source = *self.cell_at(from.0, from.1);
        debug_assert!(self.is_empty(to.0, to.1), "slide into occupied slot {to:?}");

        let target = self.cell_mut(to.0, to.1);
        target.value_exp = source.value_exp;
        target.visual = source.home;
        target.merged_this_turn = source.merged_this_turn;
        target.merge_pending = source.merge_pending;
        target.reward_ticks = source.reward_ticks;

        self.cell_mut(from.0, from.1).clear();
    }

    /// Start a merge of `from` into the equal tile at `to`.
    pub(crate) fn merge_tile(&mut self, from: (usize, usize), to: (usize, usize)) {
        let source = *self.cell_at(from.0, from.1);
        debug_assert_eq!(source.value_exp, self.cell_at(to.0, to.1).value_exp);

        let target = self.cell_mut(to.0, to.1);
        target.merged_this_turn = true;
        target.merge_pending = true;
        target.visual = source.visual;

        self.cell_mut(from.0, from.1).clear();
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cells: std::array::from_fn(|row| {
                std::array::from_fn(|col| {
                    let cell = &self.cells[row][col];
                    CellView {
                        value_exp: cell.value_exp,
                        visual: cell.visual,
                        reward_ticks: cell.reward_ticks,
                    }
                })
            }),
        }
    }

    /// Hash this board for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for cell in self.cells() {
            hasher.update_u8(cell.value_exp);
            hasher.update_vec(cell.visual);
            hasher.update_bool(cell.merged_this_turn);
            hasher.update_bool(cell.merge_pending);
            hasher.update_u8(cell.reward_ticks);
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                if cell.is_empty() {
                    write!(f, "{:>5}", ".")?;
                } else {
                    write!(f, "{:>5}", cell.value())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// What a renderer needs from one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// Tile exponent (0 = empty)
    pub value_exp: u8,
    /// Where to draw it, in cell units
    pub visual: GridVec,
    /// Remaining emphasis frames
    pub reward_ticks: u8,
}

/// Read-only grid view, `[row][col]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Cells by row, then column
    pub cells: [[CellView; GRID_SIZE]; GRID_SIZE],
}

impl BoardSnapshot {
    /// Cell view at `(col, row)`.
    pub fn at(&self, col: usize, row: usize) -> &CellView {
        &self.cells[row][col]
    }
}

// =============================================================================
// TESTS
// =============================================================================
