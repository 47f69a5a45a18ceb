// Copyright 2020 Zachary Stewart
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Rectangular board sizes and the directions things extend across them.
use std::{convert::TryFrom, fmt};

use crate::board::Coordinate;

/// Direction in which a ship's hull, or an ability's projection, extends from its anchor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Orientation {
    /// Towards row 0.
    North,
    /// Towards column 0.
    West,
    /// Towards the last row.
    South,
    /// Towards the last column.
    East,
}

impl Orientation {
    /// All orientations, in the order a player cycles through them.
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::West,
        Orientation::South,
        Orientation::East,
    ];

    /// Get the `(rows, cols)` step of a single cell in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Orientation::North => (-1, 0),
            Orientation::West => (0, -1),
            Orientation::South => (1, 0),
            Orientation::East => (0, 1),
        }
    }

    /// Get the coordinate one cell away from `coord` in this direction.
    pub fn step(self, coord: Coordinate) -> Coordinate {
        let (rows, cols) = self.delta();
        coord.offset(rows, cols)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Orientation::North => "north",
            Orientation::West => "west",
            Orientation::South => "south",
            Orientation::East => "east",
        })
    }
}

/// Project a line of `length` cells starting at `anchor` and running along `orientation`.
///
/// The anchor is always the first cell. No bounds checking is done, callers must check
/// each cell before committing anything to a board.
pub fn project(anchor: Coordinate, length: usize, orientation: Orientation) -> Vec<Coordinate> {
    let (rows, cols) = orientation.delta();
    (0..length as i32)
        .map(|k| anchor.offset(rows * k, cols * k))
        .collect()
}

/// Dimensions of a rectangular player grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoardSize {
    /// Number of rows in the board.
    rows: usize,
    /// Number of columns in the board.
    cols: usize,
}

impl BoardSize {
    /// Create a new [`BoardSize`] with the given number of rows and columns.
    /// Panics if either is 0 or if a coordinate on the board could not be represented.
    pub fn new(rows: usize, cols: usize) -> Self {
        match Self::try_new(rows, cols) {
            Some(size) => size,
            None => panic!("BoardSize must be nonzero and fit i32, got {}x{}", rows, cols),
        }
    }

    /// Create a new [`BoardSize`]. Returns `None` if either dimension is 0, if either
    /// dimension does not fit an `i32` coordinate, or if `rows * cols` overflows.
    pub fn try_new(rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 || i32::try_from(rows).is_err() || i32::try_from(cols).is_err()
        {
            None
        } else {
            rows.checked_mul(cols).map(|_| Self { rows, cols })
        }
    }

    /// Get the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells on the board.
    pub fn total_size(&self) -> usize {
        self.rows * self.cols
    }

    /// Check if the given [`Coordinate`] lies on a board of this size.
    #[inline]
    pub fn within_bounds(&self, coord: Coordinate) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.rows
            && (coord.col as usize) < self.cols
    }

    /// Get an iterator over rows of this grid. Each row is an iterator over the coordinates of
    /// that row.
    pub fn iter_rows(&self) -> impl Iterator<Item = impl Iterator<Item = Coordinate>> {
        let cols = self.cols as i32;
        (0..self.rows as i32).map(move |row| (0..cols).map(move |col| Coordinate { row, col }))
    }

    /// Get a flat iterator over every coordinate of the board, row by row.
    pub fn iter_coordinates(&self) -> impl Iterator<Item = Coordinate> {
        self.iter_rows().flatten()
    }
}

impl Default for BoardSize {
    /// The smallest board a match accepts, 7x7.
    fn default() -> Self {
        Self { rows: 7, cols: 7 }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
