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
//! Implementation of the match as a whole. A match goes through two stages, each with
//! its own type:
//!
//! [`setup`] provides [`MatchSetup`], where players join and deploy their fleets. It acts
//! as a builder for [`Match`].
//!
//! [`turns`] provides [`Match`], which rotates turns between the surviving players,
//! resolves their orders through [`combat`], advances deferred [`events`] and lets
//! [`automated`] players take their turns.
use std::fmt;

pub use self::{
    automated::{Plan, Policy, RandomPolicy, TurnView},
    combat::{AttackOutcome, ScoutOutcome},
    config::{ConfigError, MatchConfig, PointRules, Points, Rule},
    errors::{CombatError, OrderError, TurnError},
    events::{Event, EventStep, Scheduler},
    roster::{Roster, Standing, Stance},
    setup::{AddPlayerError, AddPlayerReason, DeployError, DeployRecord, MatchSetup},
    turns::{Match, MatchState, Order, OrderOutcome},
};

pub mod automated;
pub mod combat;
pub mod config;
mod errors;
pub mod events;
pub mod roster;
pub mod setup;
pub mod turns;

/// Opaque identifier of a player, unique within a match.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Who makes the decisions for a player.
#[derive(Debug)]
pub enum PlayerKind {
    /// Orders are issued from outside the engine.
    Human,
    /// The engine deploys the fleet and plays every turn using the given policy.
    Automated(Box<dyn Policy>),
}

impl PlayerKind {
    /// An automated player using [`RandomPolicy`].
    pub fn automated() -> Self {
        PlayerKind::Automated(Box::new(RandomPolicy::default()))
    }

    /// Whether this is an automated player.
    pub fn is_automated(&self) -> bool {
        match self {
            PlayerKind::Human => false,
            PlayerKind::Automated(_) => true,
        }
    }
}

/// Stage of a match.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    /// Players are deploying their fleets.
    Deploying,
    /// The given human player holds the turn.
    ActivePlayerTurn(PlayerId),
    /// The given automated player is taking its turn.
    AutomatedPlayerResolving(PlayerId),
    /// Only the given player is left.
    MatchOver(PlayerId),
}

impl Phase {
    /// Get the player holding the turn, if any.
    pub fn turn_holder(self) -> Option<PlayerId> {
        match self {
            Phase::ActivePlayerTurn(id) | Phase::AutomatedPlayerResolving(id) => Some(id),
            Phase::Deploying | Phase::MatchOver(_) => None,
        }
    }

    /// Get the winner if the match is over.
    pub fn winner(self) -> Option<PlayerId> {
        match self {
            Phase::MatchOver(id) => Some(id),
            _ => None,
        }
    }
}
