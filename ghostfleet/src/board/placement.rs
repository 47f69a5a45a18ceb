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
//! Occupancy of a player's grid and the record of what other players learned about it.
//! Shared between the deployment and combat phases.

use std::collections::{BTreeSet, HashMap};

use crate::{board::Coordinate, ships::ShipId};

/// Mapping of occupied cells to the ship occupying them for a single player's board.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Placement {
    /// Occupied cells. Cells absent from the map are open water.
    cells: HashMap<Coordinate, ShipId>,
}

impl Placement {
    /// Create an empty placement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the ship occupying the given cell, if any.
    pub fn get(&self, coord: Coordinate) -> Option<ShipId> {
        self.cells.get(&coord).copied()
    }

    /// Returns true if a ship occupies the given cell.
    pub fn is_occupied(&self, coord: Coordinate) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Returns true if no cell of any ship remains.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Iterate all occupied cells and their ships, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, ShipId)> + '_ {
        self.cells.iter().map(|(&coord, &ship)| (coord, ship))
    }

    /// Get the remaining cells of the given ship, sorted.
    pub fn cells_of(&self, ship: ShipId) -> Vec<Coordinate> {
        let mut cells: Vec<_> = self
            .iter()
            .filter_map(|(coord, id)| if id == ship { Some(coord) } else { None })
            .collect();
        cells.sort();
        cells
    }

    /// Returns true if at least one cell of the given ship remains.
    pub fn has_ship(&self, ship: ShipId) -> bool {
        self.cells.values().any(|&id| id == ship)
    }

    /// Get the set of ships with at least one remaining cell.
    pub fn ships(&self) -> BTreeSet<ShipId> {
        self.cells.values().copied().collect()
    }

    /// Occupy every given cell with `ship`. Callers have already checked for overlap.
    pub(crate) fn insert(&mut self, ship: ShipId, cells: &[Coordinate]) {
        for &coord in cells {
            let previous = self.cells.insert(coord, ship);
            debug_assert!(previous.is_none(), "{} was already occupied", coord);
        }
    }

    /// Clear every given cell.
    pub(crate) fn clear(&mut self, cells: &[Coordinate]) {
        for coord in cells {
            self.cells.remove(coord);
        }
    }

    /// Clear a single cell, returning the ship that was there.
    pub(crate) fn remove(&mut self, coord: Coordinate) -> Option<ShipId> {
        self.cells.remove(&coord)
    }
}

/// What an observer learned about a single cell of another player's board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Outcome {
    /// Nothing was there.
    Miss,
    /// A ship cell was there and was destroyed.
    Hit,
    /// A ship cell was seen there but not attacked.
    Spotted,
}

/// One observer's record of outcomes against one target board.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct HitHistory {
    records: HashMap<Coordinate, Outcome>,
}

impl HitHistory {
    /// Get the outcome recorded for the given cell.
    pub fn get(&self, coord: Coordinate) -> Option<Outcome> {
        self.records.get(&coord).copied()
    }

    /// Returns true if nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of recorded cells.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate all records, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, Outcome)> + '_ {
        self.records.iter().map(|(&coord, &outcome)| (coord, outcome))
    }

    /// Get the sorted cells that carry the given outcome.
    pub fn cells_with(&self, outcome: Outcome) -> Vec<Coordinate> {
        let mut cells: Vec<_> = self
            .iter()
            .filter_map(|(coord, o)| if o == outcome { Some(coord) } else { None })
            .collect();
        cells.sort();
        cells
    }

    /// Record an outcome. A `Hit` is final: the cell is open water afterwards, so later
    /// strikes reporting a miss there must not erase it.
    pub(crate) fn record(&mut self, coord: Coordinate, outcome: Outcome) {
        let entry = self.records.entry(coord).or_insert(outcome);
        if *entry != Outcome::Hit {
            *entry = outcome;
        }
    }
}
