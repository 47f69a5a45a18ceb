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
use std::fmt::{self, Debug};

use thiserror::Error;

use crate::game::{PlayerId, PlayerKind};

/// Reason a deployment action was rejected. A rejected action changes nothing.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum DeployError {
    /// No player with that id has joined.
    #[error("no such player")]
    UnknownPlayer,
    /// The ship is not in the catalog.
    #[error("no such ship")]
    UnknownShip,
    /// The player already finished deploying.
    #[error("deployment is already finished")]
    DeploymentFinished,
    /// One or more cells are occupied by another ship.
    #[error("the requested position is already occupied")]
    Overlap,
    /// One or more cells lie outside the board.
    #[error("the ship does not fit on the board at that position")]
    OutOfBounds,
    /// The ship has already been placed.
    #[error("ship was already placed")]
    AlreadyDeployed,
    /// There is no placement to undo.
    #[error("nothing to undo")]
    NothingToUndo,
    /// There is no undone placement to redo.
    #[error("nothing to redo")]
    NothingToRedo,
    /// A player cannot finish with an empty board.
    #[error("no ships have been placed")]
    NoShipsPlaced,
}

/// Reason a player could not join.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum AddPlayerReason {
    /// The id is already taken.
    #[error("id already in use")]
    DuplicateId,
    /// An automated player's fleet could not be deployed on the board.
    #[error("no room to deploy the fleet")]
    NoRoomForFleet,
}

/// Error returned when trying to add a player.
#[derive(Error)]
#[error("could not add player with id {id:?}: {reason}")]
pub struct AddPlayerError {
    /// Why the player was turned away.
    #[source]
    reason: AddPlayerReason,
    /// ID of the player that was attempted to be added.
    id: PlayerId,
    /// The kind of player that was not added.
    kind: PlayerKind,
}

impl AddPlayerError {
    /// Create an [`AddPlayerError`] for the player with the given ID and kind.
    pub(super) fn new(reason: AddPlayerReason, id: PlayerId, kind: PlayerKind) -> Self {
        Self { reason, id, kind }
    }

    /// Get the reason the player was not added.
    pub fn reason(&self) -> AddPlayerReason {
        self.reason
    }

    /// The id of the player that was added.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// The kind of the player that was attempted to be added.
    pub fn kind(&self) -> &PlayerKind {
        &self.kind
    }

    /// Extract the ID and kind from this error.
    pub fn into_inner(self) -> (PlayerId, PlayerKind) {
        (self.id, self.kind)
    }
}

impl From<AddPlayerError> for (PlayerId, PlayerKind) {
    /// Allows retrieving the inner id and kind from the error with into.
    fn from(err: AddPlayerError) -> Self {
        err.into_inner()
    }
}

impl Debug for AddPlayerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
