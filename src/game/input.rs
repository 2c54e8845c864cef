//! Input Capture and Normalization
//!
//! The engine understands exactly four inputs. Anything a shell produces
//! (raw vectors, key presses, numeric action ids) is normalized to a
//! [`Direction`] here, before it can reach the board.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::vec2::GridVec;

/// Input rejected before any board mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Vector is zero, diagonal, or longer than one cell.
    #[error("not a cardinal unit vector: {0}")]
    NotCardinal(GridVec),

    /// Key has no direction bound to it.
    #[error("no direction bound to key {0:?}")]
    UnknownKey(char),

    /// Numeric action id outside 0..4.
    #[error("direction index out of range: {0}")]
    BadIndex(u8),
}

/// One of the four move directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Direction {
    /// Toward row 0
    Up = 0,
    /// Toward the last row
    Down = 1,
    /// Toward column 0
    Left = 2,
    /// Toward the last column
    Right = 3,
}

impl Direction {
    /// All four directions, in index order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector for this direction.
    #[inline]
    pub const fn vector(self) -> GridVec {
        match self {
            Direction::Up => GridVec::UP,
            Direction::Down => GridVec::DOWN,
            Direction::Left => GridVec::LEFT,
            Direction::Right => GridVec::RIGHT,
        }
    }

    /// Opposite direction.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Index in [`Direction::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Normalize a raw vector. Diagonal and zero vectors are rejected.
    pub fn from_vector(v: GridVec) -> Result<Direction, InputError> {
        if !v.is_cardinal_unit() {
            return Err(InputError::NotCardinal(v));
        }
        Ok(match (v.x, v.y) {
            (0, y) if y < 0 => Direction::Up,
            (0, _) => Direction::Down,
            (x, _) if x < 0 => Direction::Left,
            _ => Direction::Right,
        })
    }

    /// Map a key press (`wasd` or vi-style `hjkl`, case-insensitive).
    pub fn from_key(key: char) -> Result<Direction, InputError> {
        match key.to_ascii_lowercase() {
            'w' | 'k' => Ok(Direction::Up),
            's' | 'j' => Ok(Direction::Down),
            'a' | 'h' => Ok(Direction::Left),
            'd' | 'l' => Ok(Direction::Right),
            _ => Err(InputError::UnknownKey(key)),
        }
    }

    /// Map a numeric action id (0=Up, 1=Down, 2=Left, 3=Right).
    pub fn from_index(index: u8) -> Result<Direction, InputError> {
        Direction::ALL
            .get(index as usize)
            .copied()
            .ok_or(InputError::BadIndex(index))
    }
}

impl TryFrom<GridVec> for Direction {
    type Error = InputError;

    fn try_from(v: GridVec) -> Result<Self, Self::Error> {
        Direction::from_vector(v)
    }
}

impl From<Direction> for GridVec {
    fn from(d: Direction) -> Self {
        d.vector()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}
