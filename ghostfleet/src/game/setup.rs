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
//! Implements the deployment phase of a match.
use log::{debug, info};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

use crate::{
    board::{project, BoardSize, Coordinate, Orientation, Placement},
    game::{
        config::{ConfigError, MatchConfig, Rule},
        turns::Match,
        Phase, PlayerId, PlayerKind,
    },
    ships::{ShipCatalog, ShipId},
};

pub use self::errors::{AddPlayerError, AddPlayerReason, DeployError};

mod errors;

/// One committed placement, as kept on the undo and redo stacks.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeployRecord {
    /// Ship that was placed.
    ship: ShipId,
    /// Cells the ship occupies.
    cells: Vec<Coordinate>,
}

impl DeployRecord {
    /// Get the ship that was placed.
    pub fn ship(&self) -> ShipId {
        self.ship
    }

    /// Get the cells the ship occupies.
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }
}

/// Deployment state of a single player's board.
#[derive(Debug, Clone, Default)]
struct Deployment {
    /// Current occupancy.
    placement: Placement,
    /// Committed placements, most recent last.
    undo: Vec<DeployRecord>,
    /// Undone placements, most recently undone last.
    redo: Vec<DeployRecord>,
    /// Frozen once the player finishes.
    finished: bool,
}

impl Deployment {
    /// Check whether `ship` could be placed, returning the cells it would occupy.
    fn check(
        &self,
        ship: ShipId,
        length: usize,
        anchor: Coordinate,
        orientation: Orientation,
        board: BoardSize,
    ) -> Result<Vec<Coordinate>, DeployError> {
        if self.finished {
            return Err(DeployError::DeploymentFinished);
        }
        if self.placement.has_ship(ship) {
            return Err(DeployError::AlreadyDeployed);
        }
        let cells = project(anchor, length, orientation);
        if !cells.iter().all(|&coord| board.within_bounds(coord)) {
            return Err(DeployError::OutOfBounds);
        }
        if cells.iter().any(|&coord| self.placement.is_occupied(coord)) {
            return Err(DeployError::Overlap);
        }
        Ok(cells)
    }

    fn place(
        &mut self,
        ship: ShipId,
        length: usize,
        anchor: Coordinate,
        orientation: Orientation,
        board: BoardSize,
    ) -> Result<Vec<Coordinate>, DeployError> {
        let cells = self.check(ship, length, anchor, orientation, board)?;
        self.placement.insert(ship, &cells);
        self.undo.push(DeployRecord {
            ship,
            cells: cells.clone(),
        });
        self.redo.clear();
        Ok(cells)
    }

    fn undo(&mut self) -> Result<ShipId, DeployError> {
        if self.finished {
            return Err(DeployError::NothingToUndo);
        }
        let record = self.undo.pop().ok_or(DeployError::NothingToUndo)?;
        self.placement.clear(&record.cells);
        let ship = record.ship;
        self.redo.push(record);
        Ok(ship)
    }

    fn redo(&mut self) -> Result<ShipId, DeployError> {
        if self.finished {
            return Err(DeployError::NothingToRedo);
        }
        // Committing a placement clears the redo stack, so the cells are still free.
        let record = self.redo.pop().ok_or(DeployError::NothingToRedo)?;
        self.placement.insert(record.ship, &record.cells);
        let ship = record.ship;
        self.undo.push(record);
        Ok(ship)
    }

    /// Place every ship of the catalog that is not on the board yet at a random legal
    /// position. Either all of them are placed or nothing changes.
    fn place_remaining<R: Rng + ?Sized>(
        &mut self,
        catalog: &ShipCatalog,
        board: BoardSize,
        rng: &mut R,
    ) -> Result<usize, DeployError> {
        if self.finished {
            return Err(DeployError::DeploymentFinished);
        }
        let mut scratch = self.clone();
        let mut placed = 0;
        for (ship, kind) in catalog.iter() {
            if scratch.placement.has_ship(ship) {
                continue;
            }
            let orientations = Orientation::ALL;
            let candidates: Vec<_> = board
                .iter_coordinates()
                .flat_map(|anchor| orientations.iter().map(move |&o| (anchor, o)))
                .filter(|&(anchor, o)| {
                    scratch
                        .check(ship, kind.len(), anchor, o, board)
                        .is_ok()
                })
                .collect();
            let &(anchor, orientation) = candidates.choose(rng).ok_or(DeployError::Overlap)?;
            scratch.place(ship, kind.len(), anchor, orientation, board)?;
            placed += 1;
        }
        *self = scratch;
        Ok(placed)
    }
}

/// A player who has joined the match.
#[derive(Debug)]
struct Seat {
    id: PlayerId,
    kind: PlayerKind,
    deployment: Deployment,
}

/// Handles the deployment phase of a match. Acts as a builder for [`Match`].
#[derive(Debug)]
pub struct MatchSetup {
    /// Rules of the match.
    config: MatchConfig,
    /// Ships every player deploys.
    catalog: ShipCatalog,
    /// Players in seat order.
    seats: Vec<Seat>,
    /// Random source of the match, handed over to the [`Match`] on start.
    rng: StdRng,
}

impl MatchSetup {
    /// Construct a new [`MatchSetup`]. Fails if the board is smaller than 7x7, or a ship
    /// or one of its abilities does not fit on the board.
    pub fn new(config: MatchConfig, catalog: ShipCatalog) -> Result<Self, ConfigError> {
        config.validate(&catalog)?;
        let rng = config.rng();
        debug!(
            "new match setup on a {} board with {} ship kinds",
            config.board,
            catalog.len()
        );
        Ok(Self {
            config,
            catalog,
            seats: Vec::new(),
            rng,
        })
    }

    /// Get the configuration of the match.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Get the ship catalog of the match.
    pub fn catalog(&self) -> &ShipCatalog {
        &self.catalog
    }

    /// The phase of a match that is still being set up.
    pub fn phase(&self) -> Phase {
        Phase::Deploying
    }

    /// Add a player to the match. Seat order is the order in which players are added.
    /// Automated players have their fleet deployed at random and are finished at once.
    pub fn add_player(&mut self, id: PlayerId, kind: PlayerKind) -> Result<(), AddPlayerError> {
        if self.seat(id).is_some() {
            return Err(AddPlayerError::new(AddPlayerReason::DuplicateId, id, kind));
        }
        let mut deployment = Deployment::default();
        if kind.is_automated() {
            if deployment
                .place_remaining(&self.catalog, self.config.board, &mut self.rng)
                .is_err()
            {
                return Err(AddPlayerError::new(
                    AddPlayerReason::NoRoomForFleet,
                    id,
                    kind,
                ));
            }
            deployment.finished = true;
        }
        debug!("{} joined ({:?})", id, kind);
        self.seats.push(Seat {
            id,
            kind,
            deployment,
        });
        Ok(())
    }

    /// Get the ids of all players in seat order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.seats.iter().map(|seat| seat.id)
    }

    /// Place `ship` for `player` with its first cell at `anchor`, extending along
    /// `orientation`. Returns the occupied cells.
    pub fn place(
        &mut self,
        player: PlayerId,
        ship: ShipId,
        anchor: Coordinate,
        orientation: Orientation,
    ) -> Result<Vec<Coordinate>, DeployError> {
        let board = self.config.board;
        let length = self.catalog.get(ship).map(|kind| kind.len());
        let deployment = self.deployment_mut(player)?;
        let length = length.ok_or(DeployError::UnknownShip)?;
        let cells = deployment.place(ship, length, anchor, orientation, board)?;
        debug!("{} placed {} at {} facing {}", player, ship, anchor, orientation);
        Ok(cells)
    }

    /// Remove the most recently committed placement of `player`. Returns the ship that
    /// was removed.
    pub fn undo(&mut self, player: PlayerId) -> Result<ShipId, DeployError> {
        let ship = self.deployment_mut(player)?.undo()?;
        debug!("{} undid placement of {}", player, ship);
        Ok(ship)
    }

    /// Restore the most recently undone placement of `player`. Returns the ship that was
    /// restored.
    pub fn redo(&mut self, player: PlayerId) -> Result<ShipId, DeployError> {
        let ship = self.deployment_mut(player)?.redo()?;
        debug!("{} redid placement of {}", player, ship);
        Ok(ship)
    }

    /// Freeze the deployment of `player`. Finishing twice is allowed. Returns whether
    /// every player has now finished.
    pub fn finish(&mut self, player: PlayerId) -> Result<bool, DeployError> {
        let deployment = self.deployment_mut(player)?;
        if deployment.placement.is_empty() {
            return Err(DeployError::NoShipsPlaced);
        }
        if !deployment.finished {
            deployment.finished = true;
            debug!("{} finished deploying", player);
        }
        Ok(self.all_finished())
    }

    /// Place every ship `player` has not placed yet at a random legal position, each
    /// with its own undo record. Returns how many ships were placed. If the remaining
    /// fleet cannot fit, nothing is placed and [`DeployError::Overlap`] is returned.
    pub fn place_remaining_randomly<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<usize, DeployError> {
        let board = self.config.board;
        let seat = self
            .seats
            .iter_mut()
            .find(|seat| seat.id == player)
            .ok_or(DeployError::UnknownPlayer)?;
        let placed = seat.deployment.place_remaining(&self.catalog, board, rng)?;
        debug!("{} placed {} ships at random", player, placed);
        Ok(placed)
    }

    /// Get the current placement of `player`.
    pub fn placement_of(&self, player: PlayerId) -> Option<&Placement> {
        self.seat(player).map(|seat| &seat.deployment.placement)
    }

    /// Get the ships `player` has not placed yet, in catalog order.
    pub fn pending_ships(&self, player: PlayerId) -> Option<Vec<ShipId>> {
        self.seat(player).map(|seat| {
            self.catalog
                .ids()
                .filter(|&ship| !seat.deployment.placement.has_ship(ship))
                .collect()
        })
    }

    /// Get the placements of `player` that [`undo`][MatchSetup::undo] would remove, most
    /// recent last.
    pub fn undo_stack(&self, player: PlayerId) -> Option<&[DeployRecord]> {
        self.seat(player).map(|seat| &seat.deployment.undo[..])
    }

    /// Get the placements of `player` that [`redo`][MatchSetup::redo] would restore,
    /// next to restore last.
    pub fn redo_stack(&self, player: PlayerId) -> Option<&[DeployRecord]> {
        self.seat(player).map(|seat| &seat.deployment.redo[..])
    }

    /// Check if `player` finished deploying. Unknown players are never finished.
    pub fn is_finished(&self, player: PlayerId) -> bool {
        self.seat(player)
            .map_or(false, |seat| seat.deployment.finished)
    }

    /// Check if `player` is controlled by the engine.
    pub fn is_automated(&self, player: PlayerId) -> bool {
        self.seat(player).map_or(false, |seat| seat.kind.is_automated())
    }

    /// Checks if at least two players have joined and all of them finished.
    pub fn ready(&self) -> bool {
        self.seats.len() >= 2 && self.all_finished()
    }

    /// Tries to start the match. If all players are ready, returns a [`Match`] with the
    /// current placements. If fewer than 2 players have joined, or any player has not
    /// finished deploying, returns `self`.
    pub fn start(mut self) -> Result<Match, Self> {
        if !self.ready() {
            return Err(self);
        }
        let first = if self.config.has_rule(Rule::RandomFirstTurn) {
            self.rng.gen_range(0, self.seats.len())
        } else {
            0
        };
        info!(
            "starting match with {} players, {} moves first",
            self.seats.len(),
            self.seats[first].id
        );
        let seats = self
            .seats
            .into_iter()
            .map(|seat| (seat.id, seat.kind, seat.deployment.placement))
            .collect();
        Ok(Match::new(self.config, self.catalog, seats, first, self.rng))
    }

    fn all_finished(&self) -> bool {
        self.seats.iter().all(|seat| seat.deployment.finished)
    }

    fn seat(&self, player: PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.id == player)
    }

    fn deployment_mut(&mut self, player: PlayerId) -> Result<&mut Deployment, DeployError> {
        self.seats
            .iter_mut()
            .find(|seat| seat.id == player)
            .map(|seat| &mut seat.deployment)
            .ok_or(DeployError::UnknownPlayer)
    }
}
