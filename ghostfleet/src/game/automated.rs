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
//! Decision making for players the engine plays itself.
use std::fmt::Debug;

use rand::{seq::SliceRandom, Rng, RngCore};

use crate::{
    board::{BoardSize, Coordinate, HitHistory, Orientation, Outcome},
    game::{config::Points, PlayerId},
    ships::{Mode, ShipId, ShipKind},
};

/// Everything an automated player may know when planning its turn.
#[derive(Debug, Clone)]
pub struct TurnView {
    /// The player whose turn it is.
    pub player: PlayerId,
    /// Current target of the player.
    pub target: PlayerId,
    /// Size of the target's board.
    pub board: BoardSize,
    /// Points available this turn.
    pub points: Points,
    /// Whether ship abilities may be used.
    pub abilities: bool,
    /// Ships of the player with at least one cell left.
    pub ships: Vec<(ShipId, ShipKind)>,
    /// What the player recorded against its target so far.
    pub history: HitHistory,
}

impl TurnView {
    /// Cells of the target's board with nothing recorded, row by row.
    pub fn unrecorded(&self) -> Vec<Coordinate> {
        self.board
            .iter_coordinates()
            .filter(|&coord| self.history.get(coord).is_none())
            .collect()
    }

    /// Cells worth striking in the given mode: spotted or unrecorded cells for attacks,
    /// unrecorded cells for scouting.
    pub fn candidates(&self, mode: Mode) -> Vec<Coordinate> {
        self.board
            .iter_coordinates()
            .filter(|&coord| match (mode, self.history.get(coord)) {
                (_, None) => true,
                (Mode::Attack, Some(Outcome::Spotted)) => true,
                _ => false,
            })
            .collect()
    }

    /// Ships whose ability for `mode` can be paid for this turn.
    pub fn affordable(&self, mode: Mode) -> impl Iterator<Item = &(ShipId, ShipKind)> + '_ {
        let points = self.points;
        self.ships
            .iter()
            .filter(move |(_, kind)| points.can_afford(mode, kind.cost(mode)))
    }
}

/// What an automated player wants to do this turn. Each anchor becomes one order; salvo
/// abilities take several.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Plan {
    /// Mode of every order.
    pub mode: Mode,
    /// Ship whose ability to use, or `None` for the free single-cell strike.
    pub ship: Option<ShipId>,
    /// Anchors to issue orders at, in order.
    pub anchors: Vec<Coordinate>,
    /// Orientation of every order.
    pub orientation: Orientation,
}

impl Plan {
    /// A free single-cell strike.
    pub fn strike(mode: Mode, anchor: Coordinate) -> Self {
        Self {
            mode,
            ship: None,
            anchors: vec![anchor],
            orientation: Orientation::North,
        }
    }
}

/// Strategy of an automated player. Plans that turn out to be illegal are replaced by a
/// free single-cell attack.
pub trait Policy: Debug + Send {
    /// Decide what to do this turn.
    fn plan(&mut self, view: &TurnView, rng: &mut dyn RngCore) -> Plan;
}

/// Default policy: picks a random mode, ship and anchor, preferring cells known to hold
/// a ship for attacks and never striking the same cell twice while fresh cells remain.
#[derive(Debug, Clone, Default)]
pub struct RandomPolicy {
    /// Chance of using an affordable ability instead of the free strike.
    ability_chance: Option<f64>,
}

impl RandomPolicy {
    /// Use an affordable ability with the given probability, clamped to `0.0..=1.0`.
    pub fn with_ability_chance(chance: f64) -> Self {
        Self {
            ability_chance: Some(chance.max(0.0).min(1.0)),
        }
    }

    fn pick_anchors(
        &self,
        view: &TurnView,
        mode: Mode,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<Coordinate> {
        let mut preferred = view.history.cells_with(Outcome::Spotted);
        if mode == Mode::Scout {
            preferred.clear();
        }
        preferred.shuffle(rng);
        let mut fresh = view.unrecorded();
        fresh.shuffle(rng);
        let mut rest: Vec<_> = view
            .board
            .iter_coordinates()
            .filter(|coord| !preferred.contains(coord) && !fresh.contains(coord))
            .collect();
        rest.shuffle(rng);
        preferred
            .into_iter()
            .chain(fresh)
            .chain(rest)
            .take(count)
            .collect()
    }
}

impl Policy for RandomPolicy {
    fn plan(&mut self, view: &TurnView, rng: &mut dyn RngCore) -> Plan {
        let mut mode = if view.abilities && rng.gen_bool(0.5) {
            Mode::Scout
        } else {
            Mode::Attack
        };
        if mode == Mode::Scout && view.unrecorded().is_empty() {
            mode = Mode::Attack;
        }
        let orientation = Orientation::ALL
            .choose(rng)
            .copied()
            .unwrap_or(Orientation::North);

        let chance = self.ability_chance.unwrap_or(0.5);
        let ship = if view.abilities && rng.gen_bool(chance) {
            let affordable: Vec<_> = view.affordable(mode).collect();
            affordable.choose(rng).map(|(id, kind)| (*id, kind.shape(mode)))
        } else {
            None
        };

        match ship {
            Some((id, shape)) => {
                let count = shape.anchors_needed() as usize;
                Plan {
                    mode,
                    ship: Some(id),
                    anchors: self.pick_anchors(view, mode, count, rng),
                    orientation,
                }
            }
            None => Plan {
                mode,
                ship: None,
                anchors: self.pick_anchors(view, mode, 1, rng),
                orientation,
            },
        }
    }
}

/// Cell for a free attack when a plan could not be carried out.
pub(crate) fn fallback_anchor(view: &TurnView) -> Coordinate {
    let candidates = view.candidates(Mode::Attack);
    candidates
        .first()
        .copied()
        .or_else(|| view.board.iter_coordinates().next())
        .unwrap_or(Coordinate::new(0, 0))
}
