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
//! A turn-based naval combat engine for any number of players.
//!
//! Players join a [`MatchSetup`][game::MatchSetup] and deploy their fleets on equally
//! sized grids, with undo and redo. Once everyone is done the setup turns into a
//! [`Match`][game::Match], where each player hunts a single target among the survivors,
//! attacking or scouting its grid with free strikes or paid ship abilities, some of which
//! play out over several turns. The last player with a ship afloat wins.
//!
//! ```
//! use ghostfleet::{
//!     board::{Coordinate, Orientation},
//!     game::{MatchConfig, MatchSetup, Order, PlayerId, PlayerKind, Rule},
//!     ships::{Mode, ShipCatalog},
//! };
//!
//! let config = MatchConfig::default().with_rules(Rule::Abilities).with_seed(42);
//! let mut setup = MatchSetup::new(config, ShipCatalog::standard()).unwrap();
//! setup.add_player(PlayerId(1), PlayerKind::Human).unwrap();
//! setup.add_player(PlayerId(2), PlayerKind::automated()).unwrap();
//!
//! let submarine = setup.catalog().find("Submarine").unwrap();
//! setup
//!     .place(PlayerId(1), submarine, Coordinate::new(3, 3), Orientation::South)
//!     .unwrap();
//! setup.finish(PlayerId(1)).unwrap();
//!
//! let mut game = setup.start().unwrap();
//! assert_eq!(game.current_active_player(), Some(PlayerId(1)));
//! game.issue(PlayerId(1), Order::strike(Mode::Attack, Coordinate::new(0, 0)))
//!     .unwrap();
//! game.advance_turn(PlayerId(1)).unwrap();
//! ```

pub mod board;
pub mod game;
pub mod ships;
