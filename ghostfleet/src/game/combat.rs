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
//! Resolution of single-cell attacks and scouts against a player's current target.
//!
//! The resolver does no cost or turn accounting, that is done by the
//! [`Match`][crate::game::Match] before it calls in here.
use log::trace;

use crate::{
    board::{Coordinate, Outcome},
    game::{
        errors::CombatError,
        roster::{Roster, Standing},
        PlayerId,
    },
    ships::Mode,
};

/// Result of attacking a single cell.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttackOutcome {
    /// A ship cell was destroyed.
    Hit,
    /// The cell was open water.
    Miss,
}

/// Result of scouting a single cell.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScoutOutcome {
    /// A ship cell is there.
    Spotted,
    /// The cell is open water.
    Miss,
}

impl From<AttackOutcome> for Outcome {
    fn from(outcome: AttackOutcome) -> Self {
        match outcome {
            AttackOutcome::Hit => Outcome::Hit,
            AttackOutcome::Miss => Outcome::Miss,
        }
    }
}

impl From<ScoutOutcome> for Outcome {
    fn from(outcome: ScoutOutcome) -> Self {
        match outcome {
            ScoutOutcome::Spotted => Outcome::Spotted,
            ScoutOutcome::Miss => Outcome::Miss,
        }
    }
}

impl Roster {
    /// Find the player `attacker` may strike at `position`.
    pub fn strike_target(
        &self,
        attacker: PlayerId,
        position: Coordinate,
    ) -> Result<PlayerId, CombatError> {
        if !self.is_active(attacker) {
            return Err(CombatError::InvalidTarget);
        }
        let target = self
            .target_of(attacker)
            .filter(|&target| self.is_active(target))
            .ok_or(CombatError::InvalidTarget)?;
        if !self.board().within_bounds(position) {
            return Err(CombatError::UnknownPosition);
        }
        Ok(target)
    }

    /// Attack `position` on the board of `attacker`'s target. A hit removes the cell; if it
    /// was the target's last, the target is eliminated and its hunter retargeted.
    pub fn attack(
        &mut self,
        attacker: PlayerId,
        position: Coordinate,
    ) -> Result<AttackOutcome, CombatError> {
        let target = self.strike_target(attacker, position)?;
        let (hit, sunk) = match self.player_mut(target) {
            Some(defender) => {
                let hit = defender.placement.remove(position).is_some();
                (hit, hit && defender.placement.is_empty())
            }
            None => return Err(CombatError::InvalidTarget),
        };
        let outcome = if hit {
            AttackOutcome::Hit
        } else {
            AttackOutcome::Miss
        };
        trace!("{} attacked {} at {}: {:?}", attacker, target, position, outcome);
        self.record(attacker, target, position, outcome.into());
        if sunk {
            self.remove(target, Standing::Eliminated);
        }
        Ok(outcome)
    }

    /// Scout `position` on the board of `attacker`'s target without destroying anything.
    pub fn scout(
        &mut self,
        attacker: PlayerId,
        position: Coordinate,
    ) -> Result<ScoutOutcome, CombatError> {
        let target = self.strike_target(attacker, position)?;
        let occupied = self
            .placement_of(target)
            .map_or(false, |placement| placement.is_occupied(position));
        let outcome = if occupied {
            ScoutOutcome::Spotted
        } else {
            ScoutOutcome::Miss
        };
        trace!("{} scouted {} at {}: {:?}", attacker, target, position, outcome);
        self.record(attacker, target, position, outcome.into());
        Ok(outcome)
    }

    /// Resolve a single cell in the given mode.
    pub fn resolve(
        &mut self,
        attacker: PlayerId,
        mode: Mode,
        position: Coordinate,
    ) -> Result<Outcome, CombatError> {
        match mode {
            Mode::Attack => self.attack(attacker, position).map(Outcome::from),
            Mode::Scout => self.scout(attacker, position).map(Outcome::from),
        }
    }

    fn record(&mut self, observer: PlayerId, target: PlayerId, position: Coordinate, outcome: Outcome) {
        if let Some(player) = self.player_mut(observer) {
            player
                .history
                .entry(target)
                .or_default()
                .record(position, outcome);
        }
    }
}
