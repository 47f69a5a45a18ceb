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
//! Cell positions on a player's grid.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The position of a cell in a player's grid.
///
/// Coordinates are signed so that projections of ships and abilities may run past the
/// edge of the board. Anything that is about to touch a board must be bounds checked
/// with [`BoardSize::within_bounds`][crate::board::BoardSize::within_bounds] first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    /// Row of the cell, counted from the top of the board.
    pub row: i32,
    /// Column of the cell, counted from the left of the board.
    pub col: i32,
}

impl Coordinate {
    /// Construct a [`Coordinate`] from the given `row` and `col`.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Get the coordinate offset from this one by the given number of rows and columns.
    pub fn offset(self, rows: i32, cols: i32) -> Self {
        Self::new(self.row + rows, self.col + cols)
    }
}

impl From<(i32, i32)> for Coordinate {
    /// Construct a [`Coordinate`] from the given `(row, col)` pair.
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl From<Coordinate> for (i32, i32) {
    /// Convert the [`Coordinate`] into a `(row, col)` pair.
    fn from(coord: Coordinate) -> Self {
        (coord.row, coord.col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
