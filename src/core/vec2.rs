//! Integer 2D Vector
//!
//! Grid coordinates and direction vectors in whole-cell units.
//! `x` grows to the right (column), `y` grows downward (row).

use std::fmt;
use std::ops::{Add, Sub, Neg};
use serde::{Serialize, Deserialize};

/// 2D vector with integer components, measured in cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridVec {
    /// X component (column axis)
    pub x: i32,
    /// Y component (row axis, downward)
    pub y: i32,
}

impl GridVec {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Unit vector pointing up (toward row 0)
    pub const UP: Self = Self { x: 0, y: -1 };

    /// Unit vector pointing down (toward the last row)
    pub const DOWN: Self = Self { x: 0, y: 1 };

    /// Unit vector pointing left (toward column 0)
    pub const LEFT: Self = Self { x: -1, y: 0 };

    /// Unit vector pointing right (toward the last column)
    pub const RIGHT: Self = Self { x: 1, y: 0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Create the position vector of a grid cell.
    #[inline]
    pub const fn from_cell(col: usize, row: usize) -> Self {
        Self {
            x: col as i32,
            y: row as i32,
        }
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Component-wise sign: each axis becomes -1, 0 or 1.
    #[inline]
    pub fn signum(self) -> Self {
        Self {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }

    /// One step from `self` toward `target`, at most one cell per axis.
    #[inline]
    pub fn step_toward(self, target: Self) -> Self {
        self.add(target.sub(self).signum())
    }

    /// Manhattan distance to another point.
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// True for exactly one of the four axis-aligned unit vectors.
    #[inline]
    pub fn is_cardinal_unit(self) -> bool {
        matches!((self.x, self.y), (0, 1) | (0, -1) | (1, 0) | (-1, 0))
    }

    /// Convert to `(col, row)` if both components fall inside `[0, size)`.
    #[inline]
    pub fn to_cell(self, size: usize) -> Option<(usize, usize)> {
        let size = size as i32;
        if self.x >= 0 && self.x < size && self.y >= 0 && self.y < size {
            Some((self.x as usize, self.y as usize))
        } else {
            None
        }
    }
}

impl Add for GridVec {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        GridVec::add(self, rhs)
    }
}

impl Sub for GridVec {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        GridVec::sub(self, rhs)
    }
}

impl Neg for GridVec {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
        }
    }
}

impl fmt::Debug for GridVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridVec({}, {})", self.x, self.y)
    }
}

impl fmt::Display for GridVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
