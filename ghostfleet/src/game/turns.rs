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
//! Turn rotation and order handling of a running match.
use std::collections::BTreeMap;

use log::{debug, info, warn};
use rand::rngs::StdRng;

use crate::{
    board::{BoardSize, Coordinate, HitHistory, Orientation, Outcome, Placement},
    game::{
        automated::{self, Plan, TurnView},
        combat::{AttackOutcome, ScoutOutcome},
        config::{MatchConfig, Points, Rule},
        errors::{CombatError, OrderError, TurnError},
        events::{Event, EventStep, Scheduler},
        roster::{Controller, Roster, Stance, Standing},
        Phase, PlayerId, PlayerKind,
    },
    ships::{AbilityOutcome, Mode, PendingSelection, ShipCatalog, ShipId},
};

/// Snapshot of the turn-level state of a match.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MatchState {
    /// Current phase.
    pub phase: Phase,
    /// Active players in seat order.
    pub turn_order: Vec<PlayerId>,
    /// Target of every active player.
    pub targets: BTreeMap<PlayerId, PlayerId>,
    /// Players who left the match, most recent last.
    pub eliminated: Vec<PlayerId>,
}

/// A single gameplay action of the player holding the turn.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Order {
    /// Attack or scout.
    pub mode: Mode,
    /// Ship whose ability to use, or `None` for the free single-cell strike.
    pub ship: Option<ShipId>,
    /// Cell on the target's board the order is aimed at.
    pub anchor: Coordinate,
    /// Direction for abilities whose shape depends on it.
    pub orientation: Orientation,
}

impl Order {
    /// The free single-cell strike, usable once per turn.
    pub fn strike(mode: Mode, anchor: Coordinate) -> Self {
        Self {
            mode,
            ship: None,
            anchor,
            orientation: Orientation::North,
        }
    }

    /// Use the ability of `ship` for `mode`.
    pub fn ability(mode: Mode, ship: ShipId, anchor: Coordinate, orientation: Orientation) -> Self {
        Self {
            mode,
            ship: Some(ship),
            anchor,
            orientation,
        }
    }
}

/// What happened as a result of an accepted [`Order`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum OrderOutcome {
    /// These cells were resolved, in order.
    Resolved(Vec<(Coordinate, Outcome)>),
    /// An event was launched and will advance on the player's following turns.
    Deferred,
    /// The anchor was added to a selection that needs more anchors.
    Accumulating { selected: usize, required: usize },
}

/// Handles gameplay once every player has deployed.
#[derive(Debug)]
pub struct Match {
    /// Rules of the match.
    config: MatchConfig,
    /// Ships of every player.
    catalog: ShipCatalog,
    /// Players and targets.
    roster: Roster,
    /// In-flight deferred effects.
    scheduler: Scheduler,
    /// Current phase.
    phase: Phase,
    /// Random source handed to automated players.
    rng: StdRng,
    /// Event steps resolved since the last call to `take_event_steps`.
    event_steps: Vec<EventStep>,
}

impl Match {
    /// Start a match with players in seat order. `first` is the seat index of the player
    /// who moves first. Automated players that come up before any human take their turns
    /// immediately.
    pub(crate) fn new(
        config: MatchConfig,
        catalog: ShipCatalog,
        seats: Vec<(PlayerId, PlayerKind, Placement)>,
        first: usize,
        rng: StdRng,
    ) -> Self {
        let roster = Roster::new(config.board, seats);
        let mut game = Self {
            config,
            catalog,
            roster,
            scheduler: Scheduler::new(),
            phase: Phase::Deploying,
            rng,
            event_steps: Vec::new(),
        };
        let order: Vec<_> = game.roster.active().to_vec();
        let opening = game.config.points;
        for (seat, &id) in order.iter().enumerate() {
            if let Some(player) = game.roster.player_mut(id) {
                player.points = if seat == first {
                    opening.first_player
                } else {
                    opening.other_players
                };
            }
        }
        if let Some(&starter) = order.get(first) {
            if !game.begin_turn(starter, false) {
                game.rotate_from(starter);
            }
        }
        game
    }

    /// Get the configuration of the match.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Get the ship catalog of the match.
    pub fn catalog(&self) -> &ShipCatalog {
        &self.catalog
    }

    /// Get the size of every player's board.
    pub fn board(&self) -> BoardSize {
        self.config.board
    }

    /// Get the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Get the player holding the turn, if the match is not over.
    pub fn current_active_player(&self) -> Option<PlayerId> {
        self.phase.turn_holder()
    }

    /// Whether only one player is left.
    pub fn is_over(&self) -> bool {
        self.phase.winner().is_some()
    }

    /// Get the winner once the match is over.
    pub fn winner(&self) -> Option<PlayerId> {
        self.phase.winner()
    }

    /// Get a snapshot of the phase, turn order, targets and eliminations.
    pub fn state(&self) -> MatchState {
        MatchState {
            phase: self.phase,
            turn_order: self.roster.active().to_vec(),
            targets: self.roster.targets(),
            eliminated: self.roster.eliminated().to_vec(),
        }
    }

    /// Get all players in seat order, including those who left.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.roster.players()
    }

    /// Get the target of `player`. After everyone else left this is a placeholder.
    pub fn target_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.roster.target_of(player)
    }

    /// Get the standing of `player`.
    pub fn standing(&self, player: PlayerId) -> Option<Standing> {
        self.roster.standing(player)
    }

    /// Get the points of `player`.
    pub fn points_of(&self, player: PlayerId) -> Option<Points> {
        self.roster.player(player).map(|player| player.points)
    }

    /// Get the remaining ship cells of `player`.
    pub fn placement_of(&self, player: PlayerId) -> Option<&Placement> {
        self.roster.placement_of(player)
    }

    /// Get what `observer` recorded against `target`.
    pub fn hit_history(&self, observer: PlayerId, target: PlayerId) -> Option<&HitHistory> {
        self.roster.hit_history(observer, target)
    }

    /// Get the in-flight events of `player`.
    pub fn events_of(&self, player: PlayerId) -> &[Event] {
        self.scheduler.events_of(player)
    }

    /// Get the partially collected selection of `player`.
    pub fn pending_selection(&self, player: PlayerId) -> Option<&PendingSelection> {
        self.roster
            .player(player)
            .and_then(|player| player.selection.as_ref())
    }

    /// Whether `player` can still use the free single-cell strike this turn.
    pub fn strike_available(&self, player: PlayerId) -> bool {
        self.roster.player(player).map_or(false, |player| !player.struck)
    }

    /// Whether `player` is controlled by the engine.
    pub fn is_automated(&self, player: PlayerId) -> bool {
        self.roster
            .player(player)
            .map_or(false, |player| player.is_automated())
    }

    /// Get the stance of a human player.
    pub fn stance(&self, player: PlayerId) -> Option<Stance> {
        match self.roster.player(player).map(|player| &player.controller) {
            Some(Controller::Human(stance)) => Some(*stance),
            _ => None,
        }
    }

    /// Change the stance of a human player.
    pub fn set_stance(&mut self, player: PlayerId, stance: Stance) -> Result<(), TurnError> {
        match self.roster.player_mut(player).map(|player| &mut player.controller) {
            Some(Controller::Human(current)) => {
                *current = stance;
                Ok(())
            }
            _ => Err(TurnError::UnknownPlayer),
        }
    }

    /// Take the event steps resolved since the last call.
    pub fn take_event_steps(&mut self) -> Vec<EventStep> {
        std::mem::take(&mut self.event_steps)
    }

    /// Build what `player` knows about its turn, as given to automated policies.
    pub fn turn_view(&self, player: PlayerId) -> Option<TurnView> {
        let actor = self.roster.player(player)?;
        let target = self.roster.target_of(player)?;
        Some(TurnView {
            player,
            target,
            board: self.config.board,
            points: actor.points,
            abilities: self.config.has_rule(Rule::Abilities),
            ships: actor
                .placement
                .ships()
                .into_iter()
                .filter_map(|id| self.catalog.get(id).map(|kind| (id, kind.clone())))
                .collect(),
            history: actor.history.get(&target).cloned().unwrap_or_default(),
        })
    }

    /// Resolve a single attack for `attacker` against its target, without any turn or
    /// cost checks.
    pub fn attack(
        &mut self,
        attacker: PlayerId,
        position: Coordinate,
    ) -> Result<AttackOutcome, CombatError> {
        let outcome = self.roster.attack(attacker, position)?;
        self.settle();
        Ok(outcome)
    }

    /// Resolve a single scout for `attacker` against its target, without any turn or
    /// cost checks.
    pub fn scout(
        &mut self,
        attacker: PlayerId,
        position: Coordinate,
    ) -> Result<ScoutOutcome, CombatError> {
        let outcome = self.roster.scout(attacker, position)?;
        self.settle();
        Ok(outcome)
    }

    /// Carry out an order of the player holding the turn.
    pub fn issue(&mut self, player: PlayerId, order: Order) -> Result<OrderOutcome, OrderError> {
        self.check_turn(player)?;
        let outcome = match order.ship {
            None => self.basic_strike(player, order.mode, order.anchor)?,
            Some(ship) => self.use_ability(player, ship, order)?,
        };
        self.settle();
        Ok(outcome)
    }

    /// End the turn of `player` and pass it on. Automated players coming up take their
    /// turns before this returns.
    pub fn advance_turn(&mut self, player: PlayerId) -> Result<MatchState, TurnError> {
        self.check_turn(player)?;
        if let Some(actor) = self.roster.player_mut(player) {
            actor.selection = None;
        }
        debug!("{} ended their turn", player);
        self.rotate_from(player);
        Ok(self.state())
    }

    /// Remove `player` from the match. If they held the turn, it passes to the next
    /// player.
    pub fn quit(&mut self, player: PlayerId) -> Result<MatchState, TurnError> {
        if self.is_over() {
            return Err(TurnError::MatchOver);
        }
        if !self.roster.is_active(player) {
            return Err(TurnError::UnknownPlayer);
        }
        let held = self.current_active_player() == Some(player);
        self.roster.remove(player, Standing::Quit);
        self.scheduler.discard(player);
        self.settle();
        if held && !self.is_over() {
            self.rotate_from(player);
        }
        Ok(self.state())
    }

    fn check_turn(&self, player: PlayerId) -> Result<(), TurnError> {
        if self.is_over() {
            Err(TurnError::MatchOver)
        } else if self.roster.player(player).is_none() {
            Err(TurnError::UnknownPlayer)
        } else if self.current_active_player() != Some(player) {
            Err(TurnError::NotActivePlayer)
        } else {
            Ok(())
        }
    }

    fn basic_strike(
        &mut self,
        player: PlayerId,
        mode: Mode,
        anchor: Coordinate,
    ) -> Result<OrderOutcome, OrderError> {
        if !self.strike_available(player) {
            return Err(OrderError::StrikeSpent);
        }
        let outcome = self.roster.resolve(player, mode, anchor)?;
        if let Some(actor) = self.roster.player_mut(player) {
            actor.struck = true;
        }
        Ok(OrderOutcome::Resolved(vec![(anchor, outcome)]))
    }

    fn use_ability(
        &mut self,
        player: PlayerId,
        ship: ShipId,
        order: Order,
    ) -> Result<OrderOutcome, OrderError> {
        if !self.config.has_rule(Rule::Abilities) {
            return Err(OrderError::AbilitiesDisabled);
        }
        let kind = self.catalog.get(ship).ok_or(OrderError::UnknownShip)?;
        let actor = self.roster.player(player).ok_or(TurnError::UnknownPlayer)?;
        if !actor.placement.has_ship(ship) {
            return Err(OrderError::ShipLost);
        }
        let needed = kind.cost(order.mode);
        let available = actor.points.get(order.mode);
        if available < needed {
            return Err(OrderError::InsufficientPoints { needed, available });
        }
        let target = self.roster.strike_target(player, order.anchor)?;

        let actor = self
            .roster
            .player_mut(player)
            .ok_or(TurnError::UnknownPlayer)?;
        let outcome = kind.invoke(
            order.mode,
            ship,
            order.anchor,
            order.orientation,
            &mut actor.selection,
        );
        match outcome {
            AbilityOutcome::Immediate(cells) => {
                actor.points.spend(order.mode, needed);
                debug!(
                    "{} used the {} {} ability on {} cells",
                    player,
                    kind.name(),
                    order.mode,
                    cells.len()
                );
                let board = self.config.board;
                let mut resolved = Vec::with_capacity(cells.len());
                for cell in cells.into_iter().filter(|&cell| board.within_bounds(cell)) {
                    // Stop once the target left part way through.
                    if self.roster.target_of(player) != Some(target) {
                        break;
                    }
                    match self.roster.resolve(player, order.mode, cell) {
                        Ok(outcome) => resolved.push((cell, outcome)),
                        Err(_) => break,
                    }
                }
                Ok(OrderOutcome::Resolved(resolved))
            }
            AbilityOutcome::Deferred(event) => {
                actor.points.spend(order.mode, needed);
                self.scheduler.register(player, event);
                Ok(OrderOutcome::Deferred)
            }
            AbilityOutcome::Accumulating { selected, required } => {
                debug!(
                    "{} selected {}/{} anchors for the {} {} ability",
                    player,
                    selected,
                    required,
                    kind.name(),
                    order.mode
                );
                Ok(OrderOutcome::Accumulating { selected, required })
            }
        }
    }

    /// Apply the consequences of eliminations: drop the events of retargeted hunters and
    /// of players who left, and end the match when one player remains.
    fn settle(&mut self) {
        for hunter in self.roster.drain_retargeted() {
            self.scheduler.discard(hunter);
        }
        for &gone in self.roster.eliminated() {
            self.scheduler.discard(gone);
        }
        if let Some(winner) = self.roster.survivor() {
            if !self.is_over() {
                info!("{} won the match", winner);
                self.phase = Phase::MatchOver(winner);
            }
        }
    }

    /// Pass the turn on from `previous` until a human holds it or the match ends.
    fn rotate_from(&mut self, mut previous: PlayerId) {
        loop {
            let empty: Vec<_> = self
                .roster
                .active()
                .iter()
                .copied()
                .filter(|&id| {
                    self.roster
                        .placement_of(id)
                        .map_or(false, |placement| placement.is_empty())
                })
                .collect();
            for id in empty {
                self.roster.remove(id, Standing::Eliminated);
            }
            self.settle();
            if self.is_over() {
                return;
            }
            let next = match self.roster.next_after(previous) {
                Some(next) => next,
                None => return,
            };
            debug_assert!(self.roster.targets_form_cycle());
            if self.begin_turn(next, true) {
                return;
            }
            previous = next;
        }
    }

    /// Start the turn of `player`: reset per-turn state, grant points and run its events.
    /// Automated players play their whole turn here. Returns true if the turn now waits
    /// for a human or the match ended.
    fn begin_turn(&mut self, player: PlayerId, grant: bool) -> bool {
        let abilities = self.config.has_rule(Rule::Abilities);
        let per_turn = self.config.points.per_turn;
        if let Some(actor) = self.roster.player_mut(player) {
            actor.struck = false;
            actor.selection = None;
            if grant && abilities {
                actor.points.grant(per_turn);
            }
        }
        let steps = self.scheduler.run_turn(player, &mut self.roster);
        self.event_steps.extend(steps);
        self.settle();
        if self.is_over() {
            return true;
        }
        if self.is_automated(player) {
            self.phase = Phase::AutomatedPlayerResolving(player);
            debug!("{} is taking an automated turn", player);
            self.play_automated(player);
            self.is_over()
        } else {
            self.phase = Phase::ActivePlayerTurn(player);
            debug!("{} holds the turn", player);
            true
        }
    }

    fn play_automated(&mut self, player: PlayerId) {
        let view = match self.turn_view(player) {
            Some(view) => view,
            None => return,
        };
        let plan = match self.roster.player_mut(player).map(|actor| &mut actor.controller) {
            Some(Controller::Automated(policy)) => policy.plan(&view, &mut self.rng),
            _ => return,
        };
        let Plan {
            mode,
            ship,
            anchors,
            orientation,
        } = plan;
        let mut accepted = false;
        for anchor in anchors {
            let order = Order {
                mode,
                ship,
                anchor,
                orientation,
            };
            match self.issue(player, order) {
                Ok(_) => accepted = true,
                Err(err) => {
                    debug!("{} could not carry out its plan: {}", player, err);
                    break;
                }
            }
            if self.is_over() {
                return;
            }
        }
        if !accepted {
            let anchor = automated::fallback_anchor(&view);
            if let Err(err) = self.issue(player, Order::strike(Mode::Attack, anchor)) {
                warn!("{} could not make a fallback strike: {}", player, err);
            }
        }
    }
}
