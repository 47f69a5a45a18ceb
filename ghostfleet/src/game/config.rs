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
//! Explicit per-match configuration. There are no global settings; everything a match
//! needs to know about its rules is carried by a [`MatchConfig`].
use std::fmt;

use enumflags2::BitFlags;
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;

use crate::{
    board::BoardSize,
    ships::{Mode, ShipCatalog, ShipId},
};

/// Smallest number of rows and columns a match board may have.
pub const MIN_BOARD_SIDE: usize = 7;

/// Optional rules of a match.
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Rule {
    /// Ships may use their attack and scout abilities, paid for with points.
    Abilities = 0b01,
    /// The first turn goes to a random player instead of the first seat.
    RandomFirstTurn = 0b10,
}

/// A pair of point pools, one per [`Mode`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Points {
    /// Points spent on attack abilities.
    pub attack: u32,
    /// Points spent on scout abilities.
    pub scout: u32,
}

impl Points {
    /// Create a pair of pools.
    pub const fn new(attack: u32, scout: u32) -> Self {
        Self { attack, scout }
    }

    /// Get the pool for the given mode.
    pub fn get(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Attack => self.attack,
            Mode::Scout => self.scout,
        }
    }

    /// Check whether `cost` can be paid from the pool for `mode`.
    pub fn can_afford(&self, mode: Mode, cost: u32) -> bool {
        self.get(mode) >= cost
    }

    /// Deduct `cost` from the pool for `mode`. The caller must have checked
    /// [`can_afford`][Points::can_afford].
    pub(crate) fn spend(&mut self, mode: Mode, cost: u32) {
        let pool = match mode {
            Mode::Attack => &mut self.attack,
            Mode::Scout => &mut self.scout,
        };
        debug_assert!(*pool >= cost);
        *pool = pool.saturating_sub(cost);
    }

    /// Add another pair of pools to this one.
    pub(crate) fn grant(&mut self, other: Points) {
        self.attack = self.attack.saturating_add(other.attack);
        self.scout = self.scout.saturating_add(other.scout);
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "attack {} / scout {}", self.attack, self.scout)
    }
}

/// How many points players receive and when.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PointRules {
    /// Opening points of the player who moves first.
    pub first_player: Points,
    /// Opening points of every other player.
    pub other_players: Points,
    /// Points granted at the start of each of a player's turns while abilities are enabled.
    pub per_turn: Points,
}

impl Default for PointRules {
    fn default() -> Self {
        Self {
            first_player: Points::new(3, 3),
            other_players: Points::new(1, 1),
            per_turn: Points::new(3, 3),
        }
    }
}

/// Configuration of a single match.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MatchConfig {
    /// Size of every player's board.
    pub board: BoardSize,
    /// Enabled optional rules.
    pub rules: BitFlags<Rule>,
    /// Seed for every random decision of the match. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Point grants.
    pub points: PointRules,
}

impl MatchConfig {
    /// Set the board size.
    pub fn with_board(mut self, board: BoardSize) -> Self {
        self.board = board;
        self
    }

    /// Replace the set of enabled rules.
    pub fn with_rules<B: Into<BitFlags<Rule>>>(mut self, rules: B) -> Self {
        self.rules = rules.into();
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the point grants.
    pub fn with_points(mut self, points: PointRules) -> Self {
        self.points = points;
        self
    }

    /// Whether the given rule is enabled.
    pub fn has_rule(&self, rule: Rule) -> bool {
        self.rules.contains(rule)
    }

    /// Build the random source for a match with this configuration.
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Check the board against the minimum size, the longest ship and the reach of every
    /// ability in `catalog`.
    pub(crate) fn validate(&self, catalog: &ShipCatalog) -> Result<(), ConfigError> {
        if self.board.rows() < MIN_BOARD_SIDE || self.board.cols() < MIN_BOARD_SIDE {
            return Err(ConfigError::BoardTooSmall(self.board));
        }
        let side = self.board.rows().max(self.board.cols());
        let longest = catalog.longest();
        if longest > side {
            return Err(ConfigError::ShipTooLong {
                length: longest,
                board: self.board,
            });
        }
        for (ship, kind) in catalog.iter() {
            for &mode in &[Mode::Attack, Mode::Scout] {
                let shape = kind.shape(mode);
                if shape.reach() as usize > side
                    || shape.anchors_needed() as usize > self.board.total_size()
                {
                    return Err(ConfigError::ShapeTooLarge {
                        ship,
                        mode,
                        board: self.board,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board: BoardSize::default(),
            rules: Rule::RandomFirstTurn.into(),
            seed: None,
            points: PointRules::default(),
        }
    }
}

/// Reason a [`MatchConfig`] cannot host a match.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum ConfigError {
    /// The board is smaller than 7x7.
    #[error("board {0} is smaller than the 7x7 minimum")]
    BoardTooSmall(BoardSize),
    /// A ship in the catalog does not fit on the board in any orientation.
    #[error("a ship of length {length} does not fit on a {board} board")]
    ShipTooLong { length: usize, board: BoardSize },
    /// An ability reaches farther than the board or needs more anchors than it has cells.
    #[error("the {mode} ability of ship {ship} does not fit on a {board} board")]
    ShapeTooLarge {
        ship: ShipId,
        mode: Mode,
        board: BoardSize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ships::{AbilityShape, ShipKind};

    #[test]
    fn rejects_small_boards() {
        let config = MatchConfig::default().with_board(BoardSize::new(6, 10));
        let catalog = ShipCatalog::standard();
        assert_eq!(
            config.validate(&catalog),
            Err(ConfigError::BoardTooSmall(BoardSize::new(6, 10)))
        );
        assert_eq!(MatchConfig::default().validate(&catalog), Ok(()));
    }

    #[test]
    fn rejects_ships_longer_than_the_board() {
        let catalog = ShipCatalog::new(vec![ShipKind::new("Barge", 8)]).unwrap();
        assert_eq!(
            MatchConfig::default().validate(&catalog),
            Err(ConfigError::ShipTooLong {
                length: 8,
                board: BoardSize::new(7, 7)
            })
        );
    }

    #[test]
    fn rejects_abilities_larger_than_the_board() {
        let far = ShipCatalog::new(vec![
            ShipKind::new("Skiff", 2).with_attack(1, AbilityShape::Line { reach: 8 })
        ])
        .unwrap();
        assert_eq!(
            MatchConfig::default().validate(&far),
            Err(ConfigError::ShapeTooLarge {
                ship: ShipId(0),
                mode: Mode::Attack,
                board: BoardSize::new(7, 7)
            })
        );

        let many = ShipCatalog::new(vec![
            ShipKind::new("Skiff", 2).with_scout(1, AbilityShape::Salvo { count: 50 })
        ])
        .unwrap();
        assert_eq!(
            MatchConfig::default().validate(&many),
            Err(ConfigError::ShapeTooLarge {
                ship: ShipId(0),
                mode: Mode::Scout,
                board: BoardSize::new(7, 7)
            })
        );
        assert_eq!(
            MatchConfig::default()
                .with_board(BoardSize::new(7, 8))
                .validate(&far),
            Ok(())
        );
    }

    #[test]
    fn spending_points() {
        let mut points = Points::new(3, 1);
        assert!(points.can_afford(Mode::Attack, 3));
        assert!(!points.can_afford(Mode::Scout, 2));
        points.spend(Mode::Attack, 2);
        points.grant(Points::new(3, 3));
        assert_eq!(points, Points::new(4, 4));
    }

    #[test]
    fn rules_are_flags() {
        let config = MatchConfig::default().with_rules(Rule::Abilities | Rule::RandomFirstTurn);
        assert!(config.has_rule(Rule::Abilities));
        let config = config.with_rules(BitFlags::empty());
        assert!(!config.has_rule(Rule::RandomFirstTurn));
    }
}
