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
//! The players of a running match and who each of them is targeting.
use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info};

use crate::{
    board::{BoardSize, HitHistory, Orientation, Placement},
    game::{
        automated::Policy,
        config::Points,
        PlayerId, PlayerKind,
    },
    ships::{Mode, PendingSelection},
};

/// Interaction settings of a human player: which mode and orientation their next
/// order uses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Stance {
    /// Mode of the next order.
    pub mode: Mode,
    /// Orientation of the next order.
    pub orientation: Orientation,
}

impl Default for Stance {
    fn default() -> Self {
        Self {
            mode: Mode::Attack,
            orientation: Orientation::North,
        }
    }
}

/// Who decides for a player during combat.
#[derive(Debug)]
pub(crate) enum Controller {
    Human(Stance),
    Automated(Box<dyn Policy>),
}

impl From<PlayerKind> for Controller {
    fn from(kind: PlayerKind) -> Self {
        match kind {
            PlayerKind::Human => Controller::Human(Stance::default()),
            PlayerKind::Automated(policy) => Controller::Automated(policy),
        }
    }
}

/// Whether a player is still in the match.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Standing {
    /// Still playing.
    Active,
    /// Lost every ship cell.
    Eliminated,
    /// Left the match.
    Quit,
}

/// Combat state of one player.
#[derive(Debug)]
pub(crate) struct Player {
    pub(crate) id: PlayerId,
    pub(crate) controller: Controller,
    pub(crate) placement: Placement,
    pub(crate) points: Points,
    /// What this player learned about each opponent.
    pub(crate) history: HashMap<PlayerId, HitHistory>,
    pub(crate) selection: Option<PendingSelection>,
    /// Set once the free basic strike was used this turn.
    pub(crate) struck: bool,
    pub(crate) standing: Standing,
}

impl Player {
    pub(crate) fn is_automated(&self) -> bool {
        match self.controller {
            Controller::Human(_) => false,
            Controller::Automated(_) => true,
        }
    }
}

/// The players of a match, in seat order, together with the targeting cycle between the
/// active ones.
#[derive(Debug)]
pub struct Roster {
    /// Size of every player's board.
    board: BoardSize,
    /// All players in seat order, including those who left.
    players: Vec<Player>,
    /// Active players in seat order.
    active: Vec<PlayerId>,
    /// Current target of each player. Players keep their last target after leaving.
    targets: HashMap<PlayerId, PlayerId>,
    /// Players who left the match, most recent last.
    eliminated: Vec<PlayerId>,
    /// Hunters whose target changed since this was last drained.
    retargeted: Vec<PlayerId>,
}

impl Roster {
    /// Build the roster from players in seat order. Each player targets the next one,
    /// the last targets the first.
    pub(crate) fn new(board: BoardSize, players: Vec<(PlayerId, PlayerKind, Placement)>) -> Self {
        let players: Vec<_> = players
            .into_iter()
            .map(|(id, kind, placement)| Player {
                id,
                controller: kind.into(),
                placement,
                points: Points::default(),
                history: HashMap::new(),
                selection: None,
                struck: false,
                standing: Standing::Active,
            })
            .collect();
        let active: Vec<_> = players.iter().map(|player| player.id).collect();
        let targets = active
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, active[(idx + 1) % active.len()]))
            .collect();
        let roster = Self {
            board,
            players,
            active,
            targets,
            eliminated: Vec::new(),
            retargeted: Vec::new(),
        };
        debug_assert!(roster.targets_form_cycle());
        roster
    }

    /// Get the size of every player's board.
    pub fn board(&self) -> BoardSize {
        self.board
    }

    /// Get the active players in seat order.
    pub fn active(&self) -> &[PlayerId] {
        &self.active
    }

    /// Get all players in seat order, including those who left.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|player| player.id)
    }

    /// Get the players who left the match, most recent last.
    pub fn eliminated(&self) -> &[PlayerId] {
        &self.eliminated
    }

    /// Check whether `player` is still in the match.
    pub fn is_active(&self, player: PlayerId) -> bool {
        self.active.contains(&player)
    }

    /// Get the current target of `player`. For players whose hunted opponent left with no
    /// replacement available, this is a placeholder: the most recently eliminated player.
    pub fn target_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.targets.get(&player).copied()
    }

    /// Get the player currently targeting `target`, if any.
    pub fn hunter_of(&self, target: PlayerId) -> Option<PlayerId> {
        self.active
            .iter()
            .copied()
            .find(|&hunter| hunter != target && self.target_of(hunter) == Some(target))
    }

    /// Get the current target mapping of active players, ordered by id.
    pub fn targets(&self) -> BTreeMap<PlayerId, PlayerId> {
        self.active
            .iter()
            .filter_map(|&id| self.target_of(id).map(|target| (id, target)))
            .collect()
    }

    /// Get the standing of `player`.
    pub fn standing(&self, player: PlayerId) -> Option<Standing> {
        self.player(player).map(|player| player.standing)
    }

    /// Get the placement of `player`.
    pub fn placement_of(&self, player: PlayerId) -> Option<&Placement> {
        self.player(player).map(|player| &player.placement)
    }

    /// Get what `observer` has recorded against `target`.
    pub fn hit_history(&self, observer: PlayerId, target: PlayerId) -> Option<&HitHistory> {
        self.player(observer)
            .and_then(|player| player.history.get(&target))
    }

    /// Get the only active player, once everyone else has left.
    pub fn survivor(&self) -> Option<PlayerId> {
        match self.active[..] {
            [winner] => Some(winner),
            _ => None,
        }
    }

    /// Check that the targets of the active players form a single cycle covering all of
    /// them, with nobody targeting themselves.
    pub fn targets_form_cycle(&self) -> bool {
        let start = match self.active.first() {
            Some(&start) => start,
            None => return true,
        };
        if self.active.len() == 1 {
            return true;
        }
        let mut seen = HashSet::new();
        let mut current = start;
        for _ in 0..self.active.len() {
            if !seen.insert(current) {
                return false;
            }
            current = match self.target_of(current) {
                Some(next) if next != current && self.is_active(next) => next,
                _ => return false,
            };
        }
        current == start
    }

    pub(crate) fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    /// Get the next active player after `player` in seat order, wrapping around. `player`
    /// itself need not be active.
    pub(crate) fn next_after(&self, player: PlayerId) -> Option<PlayerId> {
        let seat = self.players.iter().position(|p| p.id == player)?;
        let count = self.players.len();
        (1..=count)
            .map(|offset| self.players[(seat + offset) % count].id)
            .find(|&id| self.is_active(id))
    }

    /// Remove `player` from the active set and hand its hunter a new target. Does nothing
    /// if the player already left.
    pub(crate) fn remove(&mut self, player: PlayerId, standing: Standing) {
        if !self.is_active(player) {
            return;
        }
        let hunter = self.hunter_of(player);
        self.active.retain(|&id| id != player);
        self.eliminated.push(player);
        if let Some(left) = self.player_mut(player) {
            left.standing = standing;
            left.selection = None;
        }
        match standing {
            Standing::Quit => info!("{} quit", player),
            _ => info!("{} was eliminated", player),
        }
        if let Some(hunter) = hunter {
            self.reassign_target(hunter);
        }
        debug_assert!(self.targets_form_cycle());
    }

    /// Give `hunter` the first active player in seat order that nobody targets. If there
    /// is none, the hunter keeps the most recently eliminated player as a placeholder.
    pub(crate) fn reassign_target(&mut self, hunter: PlayerId) {
        let candidate = self.active.iter().copied().find(|&id| {
            id != hunter
                && !self
                    .active
                    .iter()
                    .any(|&other| other != hunter && self.target_of(other) == Some(id))
        });
        let target = candidate.or_else(|| self.eliminated.last().copied());
        if let Some(target) = target {
            debug!("{} now targets {}", hunter, target);
            self.targets.insert(hunter, target);
        }
        if let Some(player) = self.player_mut(hunter) {
            player.selection = None;
        }
        self.retargeted.push(hunter);
    }

    /// Take the hunters retargeted since the last call.
    pub(crate) fn drain_retargeted(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.retargeted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(count: u32) -> Roster {
        Roster::new(
            BoardSize::default(),
            (1..=count)
                .map(|id| (PlayerId(id), PlayerKind::Human, Placement::new()))
                .collect(),
        )
    }

    #[test]
    fn players_target_their_successor() {
        let roster = roster(3);
        assert_eq!(roster.target_of(PlayerId(1)), Some(PlayerId(2)));
        assert_eq!(roster.target_of(PlayerId(2)), Some(PlayerId(3)));
        assert_eq!(roster.target_of(PlayerId(3)), Some(PlayerId(1)));
        assert!(roster.targets_form_cycle());
    }

    #[test]
    fn removal_closes_the_cycle() {
        let mut roster = roster(4);
        roster.remove(PlayerId(2), Standing::Eliminated);
        assert_eq!(roster.target_of(PlayerId(1)), Some(PlayerId(3)));
        assert!(roster.targets_form_cycle());
        assert_eq!(roster.drain_retargeted(), vec![PlayerId(1)]);
        assert!(roster.drain_retargeted().is_empty());
        assert_eq!(roster.next_after(PlayerId(2)), Some(PlayerId(3)));
        assert_eq!(roster.next_after(PlayerId(4)), Some(PlayerId(1)));
    }

    #[test]
    fn last_survivor_keeps_a_placeholder() {
        let mut roster = roster(2);
        roster.remove(PlayerId(2), Standing::Quit);
        assert_eq!(roster.survivor(), Some(PlayerId(1)));
        assert_eq!(roster.target_of(PlayerId(1)), Some(PlayerId(2)));
        assert_eq!(roster.standing(PlayerId(2)), Some(Standing::Quit));
        assert_eq!(roster.eliminated(), &[PlayerId(2)]);
    }

    #[test]
    fn broken_cycles_are_detected() {
        let mut roster = roster(3);
        roster.targets.insert(PlayerId(3), PlayerId(2));
        assert!(!roster.targets_form_cycle());
    }
}
