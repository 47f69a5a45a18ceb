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
//! Ship kinds and the validated catalog every player of a match draws their fleet from.
use std::{collections::HashSet, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    board::{Coordinate, Orientation},
    ships::ability::{self, AbilityOutcome, AbilityShape, Mode, PendingSelection},
};

/// Index of a ship kind in a match's [`ShipCatalog`]. Every player owns at most one ship
/// of each kind, so a player and a `ShipId` identify a single ship.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShipId(pub usize);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable description of a kind of ship and its abilities.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShipKind {
    /// Display name, unique within a catalog.
    name: String,
    /// Number of cells in the hull.
    length: usize,
    /// Attack points spent per attack ability use.
    attack_cost: u32,
    /// Scout points spent per scout ability use.
    scout_cost: u32,
    /// Cells selected by the attack ability.
    attack_shape: AbilityShape,
    /// Cells selected by the scout ability.
    scout_shape: AbilityShape,
}

impl ShipKind {
    /// Create a ship kind whose abilities are free single-cell strikes. Use
    /// [`with_attack`][ShipKind::with_attack] and [`with_scout`][ShipKind::with_scout] to
    /// give it something better.
    pub fn new(name: impl Into<String>, length: usize) -> Self {
        Self {
            name: name.into(),
            length,
            attack_cost: 0,
            scout_cost: 0,
            attack_shape: AbilityShape::Single,
            scout_shape: AbilityShape::Single,
        }
    }

    /// Set the cost and shape of the attack ability.
    pub fn with_attack(mut self, cost: u32, shape: AbilityShape) -> Self {
        self.attack_cost = cost;
        self.attack_shape = shape;
        self
    }

    /// Set the cost and shape of the scout ability.
    pub fn with_scout(mut self, cost: u32, shape: AbilityShape) -> Self {
        self.scout_cost = cost;
        self.scout_shape = shape;
        self
    }

    /// Get the name of this kind.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the hull length of this kind.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Get the ability cost for the given mode.
    pub fn cost(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Attack => self.attack_cost,
            Mode::Scout => self.scout_cost,
        }
    }

    /// Get the ability shape for the given mode.
    pub fn shape(&self, mode: Mode) -> AbilityShape {
        match mode {
            Mode::Attack => self.attack_shape,
            Mode::Scout => self.scout_shape,
        }
    }

    /// Invoke the attack ability of the ship `id` (which must be of this kind) at `anchor`.
    pub fn attack(
        &self,
        id: ShipId,
        anchor: Coordinate,
        orientation: Orientation,
        selection: &mut Option<PendingSelection>,
    ) -> AbilityOutcome {
        ability::invoke(self.attack_shape, id, Mode::Attack, anchor, orientation, selection)
    }

    /// Invoke the scout ability of the ship `id` (which must be of this kind) at `anchor`.
    pub fn scout(
        &self,
        id: ShipId,
        anchor: Coordinate,
        orientation: Orientation,
        selection: &mut Option<PendingSelection>,
    ) -> AbilityOutcome {
        ability::invoke(self.scout_shape, id, Mode::Scout, anchor, orientation, selection)
    }

    /// Invoke the ability for `mode`.
    pub fn invoke(
        &self,
        mode: Mode,
        id: ShipId,
        anchor: Coordinate,
        orientation: Orientation,
        selection: &mut Option<PendingSelection>,
    ) -> AbilityOutcome {
        match mode {
            Mode::Attack => self.attack(id, anchor, orientation, selection),
            Mode::Scout => self.scout(id, anchor, orientation, selection),
        }
    }
}

/// Reason a catalog was rejected.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum CatalogError {
    /// The catalog contained no ships.
    #[error("catalog holds no ships")]
    Empty,
    /// The ship at the given index has an empty name.
    #[error("ship at index {0} has an empty name")]
    EmptyName(usize),
    /// Two ships share a name.
    #[error("ship name {0:?} appears more than once")]
    DuplicateName(String),
    /// A ship has no hull cells.
    #[error("ship {0:?} has length 0")]
    ZeroLength(String),
    /// A ship ability has a count of 0 or an extent that is too large.
    #[error("ship {name:?} has an invalid {mode} ability shape")]
    InvalidShape { name: String, mode: Mode },
}

/// Validated, ordered set of ship kinds available to every player of a match.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShipCatalog {
    ships: Vec<ShipKind>,
}

impl ShipCatalog {
    /// Validate a list of ship kinds. Malformed entries are rejected, never coerced.
    pub fn new(ships: Vec<ShipKind>) -> Result<Self, CatalogError> {
        if ships.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut names = HashSet::new();
        for (idx, kind) in ships.iter().enumerate() {
            if kind.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(idx));
            }
            if !names.insert(kind.name.as_str()) {
                return Err(CatalogError::DuplicateName(kind.name.clone()));
            }
            if kind.length == 0 {
                return Err(CatalogError::ZeroLength(kind.name.clone()));
            }
            for &mode in &[Mode::Attack, Mode::Scout] {
                if !kind.shape(mode).is_valid() {
                    return Err(CatalogError::InvalidShape {
                        name: kind.name.clone(),
                        mode,
                    });
                }
            }
        }
        Ok(Self { ships })
    }

    /// The default fleet of five ships.
    pub fn standard() -> Self {
        let ships = vec![
            ShipKind::new("Patrol Boat", 2)
                .with_attack(4, AbilityShape::Line { reach: 2 })
                .with_scout(4, AbilityShape::Salvo { count: 5 }),
            ShipKind::new("Destroyer", 3)
                .with_attack(3, AbilityShape::Cross)
                .with_scout(3, AbilityShape::Cross),
            ShipKind::new("Submarine", 3)
                .with_attack(2, AbilityShape::Sortie { range: 1, stride: 1 })
                .with_scout(
                    4,
                    AbilityShape::Area {
                        up: 1,
                        down: 1,
                        left: 1,
                        right: 1,
                    },
                ),
            ShipKind::new("Battleship", 4)
                .with_attack(
                    5,
                    AbilityShape::Area {
                        up: 1,
                        down: 0,
                        left: 1,
                        right: 1,
                    },
                )
                .with_scout(5, AbilityShape::Sortie { range: 6, stride: 3 }),
            ShipKind::new("Aircraft Carrier", 5)
                .with_attack(7, AbilityShape::Salvo { count: 9 })
                .with_scout(5, AbilityShape::Salvo { count: 9 }),
        ];
        Self { ships }
    }

    /// Get the kind with the given id.
    pub fn get(&self, id: ShipId) -> Option<&ShipKind> {
        self.ships.get(id.0)
    }

    /// Find a ship id by case-insensitive name.
    pub fn find(&self, name: &str) -> Option<ShipId> {
        self.ships
            .iter()
            .position(|kind| kind.name.eq_ignore_ascii_case(name))
            .map(ShipId)
    }

    /// Iterate over all ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = ShipId> {
        (0..self.ships.len()).map(ShipId)
    }

    /// Iterate over all ids and kinds in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (ShipId, &ShipKind)> {
        self.ships
            .iter()
            .enumerate()
            .map(|(idx, kind)| (ShipId(idx), kind))
    }

    /// Number of kinds in the catalog.
    pub fn len(&self) -> usize {
        self.ships.len()
    }

    /// Length of the longest ship.
    pub fn longest(&self) -> usize {
        self.ships.iter().map(ShipKind::len).max().unwrap_or(0)
    }
}

impl Default for ShipCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
