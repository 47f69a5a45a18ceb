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
//! Deferred multi-turn effects of ship abilities, such as a torpedo travelling one cell
//! per turn or a spotter plane sweeping a line.
use std::collections::HashMap;

use log::{debug, trace};

use crate::{
    board::{Coordinate, Orientation, Outcome},
    game::{roster::Roster, PlayerId},
    ships::Mode,
};

/// A deferred effect travelling from its anchor, one cell per step.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Event {
    /// Whether each step attacks or scouts.
    kind: Mode,
    /// Cell the effect was launched from. It is never resolved itself.
    anchor: Coordinate,
    /// Direction of travel.
    orientation: Orientation,
    /// Steps left before the effect ends.
    remaining: u32,
    /// Steps taken per turn.
    stride: u32,
    /// Last resolved cell, if any step was taken.
    last: Option<Coordinate>,
    /// Steps left this turn.
    budget: u32,
}

impl Event {
    /// Create an event with a full step budget.
    pub fn new(
        kind: Mode,
        anchor: Coordinate,
        orientation: Orientation,
        range: u32,
        stride: u32,
    ) -> Self {
        Self {
            kind,
            anchor,
            orientation,
            remaining: range,
            stride,
            last: None,
            budget: stride,
        }
    }

    /// Whether each step attacks or scouts.
    pub fn kind(&self) -> Mode {
        self.kind
    }

    /// Cell the event was launched from. It is never resolved itself.
    pub fn anchor(&self) -> Coordinate {
        self.anchor
    }

    /// Direction the event travels in.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Steps left before the event runs out.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Steps taken at the start of each of the owner's turns.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Most recently resolved cell, if any step was taken.
    pub fn last(&self) -> Option<Coordinate> {
        self.last
    }

    /// Steps still allowed during the current turn.
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Cell the next step resolves.
    pub fn next_position(&self) -> Coordinate {
        self.orientation.step(self.last.unwrap_or(self.anchor))
    }
}

/// One resolved step of an event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EventStep {
    /// Player who launched the event.
    pub owner: PlayerId,
    /// Whether the step attacked or scouted.
    pub kind: Mode,
    /// Resolved cell.
    pub position: Coordinate,
    /// What was found there.
    pub outcome: Outcome,
}

/// Holds the in-flight events of every player.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    events: HashMap<PlayerId, Vec<Event>>,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event owned by `player`.
    pub fn register(&mut self, player: PlayerId, event: Event) {
        debug!(
            "{} launched a deferred {} from {} heading {}",
            player, event.kind, event.anchor, event.orientation
        );
        self.events.entry(player).or_default().push(event);
    }

    /// Get the in-flight events of `player`.
    pub fn events_of(&self, player: PlayerId) -> &[Event] {
        self.events.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop every event of `player`.
    pub fn discard(&mut self, player: PlayerId) {
        if let Some(events) = self.events.remove(&player) {
            if !events.is_empty() {
                debug!("discarding {} events of {}", events.len(), player);
            }
        }
    }

    /// Step every event of `player` that has budget left this turn exactly once, in
    /// registration order.
    ///
    /// Events end when they run out of steps, leave the board, or (for attacks) hit
    /// something. If the owner's target changes during the pass, every event of the owner
    /// is dropped.
    pub fn advance(&mut self, player: PlayerId, roster: &mut Roster) -> Vec<EventStep> {
        let events = match self.events.remove(&player) {
            Some(events) => events,
            None => return Vec::new(),
        };
        let target = roster.target_of(player);
        let mut steps = Vec::new();
        let mut kept = Vec::with_capacity(events.len());
        for mut event in events {
            if event.budget == 0 {
                kept.push(event);
                continue;
            }
            event.budget -= 1;
            let position = event.next_position();
            if !roster.board().within_bounds(position) {
                trace!("event of {} left the board at {}", player, position);
                continue;
            }
            let outcome = match roster.resolve(player, event.kind, position) {
                Ok(outcome) => outcome,
                Err(err) => {
                    debug!("dropping events of {}: {}", player, err);
                    return steps;
                }
            };
            steps.push(EventStep {
                owner: player,
                kind: event.kind,
                position,
                outcome,
            });
            event.last = Some(position);
            event.remaining = event.remaining.saturating_sub(1);
            if roster.target_of(player) != target {
                debug!("target of {} changed, dropping its events", player);
                return steps;
            }
            let hit = event.kind == Mode::Attack && outcome == Outcome::Hit;
            if event.remaining > 0 && !hit {
                kept.push(event);
            }
        }
        if !kept.is_empty() {
            self.events.insert(player, kept);
        }
        steps
    }

    /// Run all of `player`'s events for a turn: refill each budget to its stride and
    /// advance until no budget is left.
    pub fn run_turn(&mut self, player: PlayerId, roster: &mut Roster) -> Vec<EventStep> {
        if let Some(events) = self.events.get_mut(&player) {
            for event in events.iter_mut() {
                event.budget = event.stride;
            }
        }
        let mut steps = Vec::new();
        while self
            .events_of(player)
            .iter()
            .any(|event| event.budget > 0)
        {
            steps.extend(self.advance(player, roster));
        }
        steps
    }
}
