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
//! Errors returned by a running [`Match`][crate::game::Match].

use thiserror::Error;

/// Reason a turn operation was rejected.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum TurnError {
    /// The player does not hold the turn.
    #[error("player does not hold the turn")]
    NotActivePlayer,
    /// No player with that id is in the match.
    #[error("no such player")]
    UnknownPlayer,
    /// The match has ended.
    #[error("the match is over")]
    MatchOver,
}

/// Reason an attack or scout could not be resolved.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CombatError {
    /// The attacker is not active, or its target is eliminated or a placeholder.
    #[error("no valid target")]
    InvalidTarget,
    /// The position is not on the board.
    #[error("position is outside the board")]
    UnknownPosition,
}

/// Reason an order was rejected. A rejected order changes nothing.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum OrderError {
    /// The order was issued out of turn.
    #[error(transparent)]
    Turn(#[from] TurnError),
    /// The order could not be resolved against the target.
    #[error(transparent)]
    Combat(#[from] CombatError),
    /// Ship abilities are disabled in this match.
    #[error("ship abilities are disabled")]
    AbilitiesDisabled,
    /// The ship is not in the catalog.
    #[error("no such ship")]
    UnknownShip,
    /// The ship has no cells left, or was never deployed.
    #[error("ship has been lost")]
    ShipLost,
    /// The ability costs more than the player has.
    #[error("ability costs {needed} points but only {available} are available")]
    InsufficientPoints { needed: u32, available: u32 },
    /// The free single-cell strike was already used this turn.
    #[error("the basic strike was already used this turn")]
    StrikeSpent,
}
