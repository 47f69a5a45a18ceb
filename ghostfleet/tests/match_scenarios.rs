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
use enumflags2::BitFlags;
use ghostfleet::{
    board::{Coordinate, Orientation, Outcome},
    game::{
        AttackOutcome, CombatError, Match, MatchConfig, MatchSetup, Order, OrderError,
        OrderOutcome, Phase, PlayerId, PlayerKind, PointRules, Points, Rule, Standing,
    },
    ships::{AbilityShape, Mode, ShipCatalog, ShipId, ShipKind},
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

const A: PlayerId = PlayerId(1);
const B: PlayerId = PlayerId(2);
const C: PlayerId = PlayerId(3);

/// Placement of one ship for one player.
type Deploy = (PlayerId, &'static str, (i32, i32), Orientation);

/// Start a match of human players with the given deployments, first seat first.
fn start(config: MatchConfig, catalog: ShipCatalog, players: &[PlayerId], deploy: &[Deploy]) -> Match {
    let mut setup = MatchSetup::new(config, catalog).unwrap();
    for &id in players {
        setup.add_player(id, PlayerKind::Human).unwrap();
    }
    for &(id, name, (row, col), orientation) in deploy {
        let ship = setup.catalog().find(name).unwrap();
        setup
            .place(id, ship, Coordinate::new(row, col), orientation)
            .unwrap();
    }
    for &id in players {
        setup.finish(id).unwrap();
    }
    setup.start().unwrap()
}

fn with_abilities() -> MatchConfig {
    MatchConfig::default()
        .with_rules(Rule::Abilities)
        .with_seed(99)
}

#[test]
fn sinking_the_last_cell_ends_a_duel() {
    let catalog = ShipCatalog::new(vec![ShipKind::new("Dinghy", 1)]).unwrap();
    let mut game = start(
        MatchConfig::default().with_rules(BitFlags::empty()),
        catalog,
        &[A, B],
        &[
            (A, "Dinghy", (0, 0), Orientation::East),
            (B, "Dinghy", (4, 2), Orientation::East),
        ],
    );
    assert_eq!(game.attack(A, Coordinate::new(4, 2)), Ok(AttackOutcome::Hit));
    assert_eq!(game.standing(B), Some(Standing::Eliminated));
    assert_eq!(game.phase(), Phase::MatchOver(A));
    assert!(game.is_over());
    assert_eq!(game.state().eliminated, vec![B]);
}

#[test]
fn submarine_torpedo_travels_one_cell() {
    let mut game = start(
        with_abilities(),
        ShipCatalog::standard(),
        &[A, B],
        &[
            (A, "Submarine", (0, 0), Orientation::East),
            (B, "Submarine", (3, 2), Orientation::East),
            (B, "Destroyer", (6, 0), Orientation::East),
        ],
    );
    let sub = game.catalog().find("Submarine").unwrap();
    let torpedo = Order::ability(Mode::Attack, sub, Coordinate::new(3, 3), Orientation::West);
    assert_eq!(game.issue(A, torpedo), Ok(OrderOutcome::Deferred));
    assert_eq!(game.points_of(A), Some(Points::new(1, 3)));
    let events = game.events_of(A);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].remaining(), 1);
    assert_eq!(events[0].kind(), Mode::Attack);
    // Launching does not touch the target yet.
    assert_eq!(game.hit_history(A, B), None);

    game.advance_turn(A).unwrap();
    game.advance_turn(B).unwrap();
    let steps = game.take_event_steps();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].position, Coordinate::new(3, 2));
    assert_eq!(steps[0].outcome, Outcome::Hit);
    assert!(game.events_of(A).is_empty());
    assert!(!game.placement_of(B).unwrap().is_occupied(Coordinate::new(3, 2)));
    assert_eq!(
        game.hit_history(A, B).unwrap().get(Coordinate::new(3, 2)),
        Some(Outcome::Hit)
    );
}

#[test]
fn carrier_scout_accumulates_nine_anchors() {
    let points = PointRules {
        first_player: Points::new(10, 10),
        ..PointRules::default()
    };
    let mut game = start(
        with_abilities().with_points(points),
        ShipCatalog::standard(),
        &[A, B],
        &[
            (A, "Aircraft Carrier", (0, 0), Orientation::East),
            (B, "Aircraft Carrier", (2, 0), Orientation::East),
        ],
    );
    let carrier = game.catalog().find("Aircraft Carrier").unwrap();
    let anchors: Vec<_> = (0..9).map(|col| Coordinate::new(col / 7 + 1, col % 7)).collect();
    for (idx, &anchor) in anchors[..8].iter().enumerate() {
        let order = Order::ability(Mode::Scout, carrier, anchor, Orientation::North);
        assert_eq!(
            game.issue(A, order),
            Ok(OrderOutcome::Accumulating {
                selected: idx + 1,
                required: 9
            })
        );
        // Repeating an anchor adds nothing.
        assert_eq!(
            game.issue(A, order),
            Ok(OrderOutcome::Accumulating {
                selected: idx + 1,
                required: 9
            })
        );
    }
    assert_eq!(game.points_of(A), Some(Points::new(10, 10)));
    assert_eq!(game.pending_selection(A).unwrap().anchors(), &anchors[..8]);

    let last = Order::ability(Mode::Scout, carrier, anchors[8], Orientation::North);
    match game.issue(A, last) {
        Ok(OrderOutcome::Resolved(cells)) => {
            assert_eq!(cells.len(), 9);
            let positions: Vec<_> = cells.iter().map(|&(coord, _)| coord).collect();
            assert_eq!(positions, anchors);
            // Row 2 holds the carrier, row 1 is open water.
            for (coord, outcome) in cells {
                let expected = if coord.row == 2 && coord.col < 5 {
                    Outcome::Spotted
                } else {
                    Outcome::Miss
                };
                assert_eq!(outcome, expected, "at {}", coord);
            }
        }
        other => panic!("expected a resolved salvo, got {:?}", other),
    }
    assert_eq!(game.points_of(A), Some(Points::new(10, 5)));
    assert_eq!(game.pending_selection(A), None);
    assert_eq!(game.placement_of(B).unwrap().len(), 5);
}

#[test]
fn switching_ships_restarts_a_selection() {
    let points = PointRules {
        first_player: Points::new(10, 10),
        ..PointRules::default()
    };
    let mut game = start(
        with_abilities().with_points(points),
        ShipCatalog::standard(),
        &[A, B],
        &[
            (A, "Aircraft Carrier", (0, 0), Orientation::East),
            (A, "Patrol Boat", (1, 0), Orientation::East),
            (B, "Destroyer", (2, 0), Orientation::East),
        ],
    );
    let carrier = game.catalog().find("Aircraft Carrier").unwrap();
    let patrol = game.catalog().find("Patrol Boat").unwrap();
    game.issue(
        A,
        Order::ability(Mode::Scout, carrier, Coordinate::new(0, 0), Orientation::North),
    )
    .unwrap();
    assert_eq!(
        game.issue(
            A,
            Order::ability(Mode::Scout, patrol, Coordinate::new(0, 1), Orientation::North)
        ),
        Ok(OrderOutcome::Accumulating {
            selected: 1,
            required: 5
        })
    );
    assert_eq!(game.pending_selection(A).unwrap().ship(), patrol);
}

#[test]
fn attacking_an_eliminated_target_changes_nothing() {
    let catalog = ShipCatalog::new(vec![ShipKind::new("Dinghy", 1)]).unwrap();
    let mut game = start(
        with_abilities(),
        catalog,
        &[A, B],
        &[
            (A, "Dinghy", (0, 0), Orientation::East),
            (B, "Dinghy", (1, 1), Orientation::East),
        ],
    );
    game.attack(A, Coordinate::new(1, 1)).unwrap();
    assert!(game.is_over());
    let points = game.points_of(A);
    let history = game.hit_history(A, B).cloned();
    let other_points = game.points_of(B);

    assert_eq!(
        game.attack(A, Coordinate::new(2, 2)),
        Err(CombatError::InvalidTarget)
    );
    assert_eq!(
        game.scout(B, Coordinate::new(0, 0)),
        Err(CombatError::InvalidTarget)
    );
    assert_eq!(game.points_of(A), points);
    assert_eq!(game.points_of(B), other_points);
    assert_eq!(game.hit_history(A, B).cloned(), history);
    assert_eq!(game.hit_history(B, A), None);
}

#[test]
fn ability_errors() {
    let mut game = start(
        with_abilities(),
        ShipCatalog::standard(),
        &[A, B],
        &[
            (A, "Aircraft Carrier", (0, 0), Orientation::East),
            (B, "Destroyer", (2, 0), Orientation::East),
        ],
    );
    let carrier = game.catalog().find("Aircraft Carrier").unwrap();
    let destroyer = game.catalog().find("Destroyer").unwrap();
    let anchor = Coordinate::new(4, 4);
    assert_eq!(
        game.issue(A, Order::ability(Mode::Attack, carrier, anchor, Orientation::North)),
        Err(OrderError::InsufficientPoints {
            needed: 7,
            available: 3
        })
    );
    assert_eq!(
        game.issue(A, Order::ability(Mode::Attack, destroyer, anchor, Orientation::North)),
        Err(OrderError::ShipLost)
    );
    assert_eq!(
        game.issue(A, Order::ability(Mode::Attack, ShipId(42), anchor, Orientation::North)),
        Err(OrderError::UnknownShip)
    );

    let mut plain = start(
        MatchConfig::default().with_rules(BitFlags::empty()),
        ShipCatalog::standard(),
        &[A, B],
        &[
            (A, "Destroyer", (0, 0), Orientation::East),
            (B, "Destroyer", (2, 0), Orientation::East),
        ],
    );
    assert_eq!(
        plain.issue(A, Order::ability(Mode::Attack, destroyer, anchor, Orientation::North)),
        Err(OrderError::AbilitiesDisabled)
    );
}

#[test]
fn destroyer_cross_skips_cells_off_the_board() {
    let mut game = start(
        with_abilities(),
        ShipCatalog::standard(),
        &[A, B],
        &[
            (A, "Destroyer", (0, 0), Orientation::East),
            (B, "Destroyer", (0, 0), Orientation::South),
            (B, "Patrol Boat", (5, 5), Orientation::East),
        ],
    );
    let destroyer = game.catalog().find("Destroyer").unwrap();
    let order = Order::ability(Mode::Attack, destroyer, Coordinate::new(1, 0), Orientation::North);
    match game.issue(A, order) {
        Ok(OrderOutcome::Resolved(cells)) => {
            // The western neighbour lies outside the board.
            assert_eq!(cells.len(), 4);
            let hits = cells
                .iter()
                .filter(|&&(_, outcome)| outcome == Outcome::Hit)
                .count();
            assert_eq!(hits, 3);
        }
        other => panic!("expected a resolved cross, got {:?}", other),
    }
    assert_eq!(game.points_of(A), Some(Points::new(0, 3)));
    assert!(!game.is_over());
    assert_eq!(game.placement_of(B).unwrap().len(), 2);
}

#[test]
fn spotter_plane_sweeps_three_cells_per_turn() {
    let points = PointRules {
        first_player: Points::new(0, 5),
        ..PointRules::default()
    };
    let mut game = start(
        with_abilities().with_points(points),
        ShipCatalog::standard(),
        &[A, B],
        &[
            (A, "Battleship", (0, 0), Orientation::East),
            (B, "Battleship", (3, 0), Orientation::South),
        ],
    );
    let battleship = game.catalog().find("Battleship").unwrap();
    let plane = Order::ability(Mode::Scout, battleship, Coordinate::new(4, 6), Orientation::West);
    assert_eq!(game.issue(A, plane), Ok(OrderOutcome::Deferred));
    game.advance_turn(A).unwrap();
    game.advance_turn(B).unwrap();
    let positions: Vec<_> = game
        .take_event_steps()
        .iter()
        .map(|step| step.position)
        .collect();
    assert_eq!(
        positions,
        vec![
            Coordinate::new(4, 5),
            Coordinate::new(4, 4),
            Coordinate::new(4, 3)
        ]
    );
    game.advance_turn(A).unwrap();
    game.advance_turn(B).unwrap();
    let steps = game.take_event_steps();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[2].position, Coordinate::new(4, 0));
    assert_eq!(steps[2].outcome, Outcome::Spotted);
    assert!(game.events_of(A).is_empty());
    assert_eq!(game.placement_of(B).unwrap().len(), 4);
}

#[test]
fn quitting_hands_the_hunter_a_new_target() {
    let catalog = ShipCatalog::new(vec![ShipKind::new("Dinghy", 1)]).unwrap();
    let mut game = start(
        MatchConfig::default().with_rules(BitFlags::empty()),
        catalog,
        &[A, B, C],
        &[
            (A, "Dinghy", (0, 0), Orientation::East),
            (B, "Dinghy", (0, 0), Orientation::East),
            (C, "Dinghy", (0, 0), Orientation::East),
        ],
    );
    assert_eq!(game.target_of(A), Some(B));
    assert_eq!(game.current_active_player(), Some(A));

    let state = game.quit(A).unwrap();
    assert_eq!(state.phase, Phase::ActivePlayerTurn(B));
    assert_eq!(state.turn_order, vec![B, C]);
    assert_eq!(game.target_of(C), Some(B));
    assert_eq!(game.target_of(B), Some(C));

    game.attack(B, Coordinate::new(0, 0)).unwrap();
    assert_eq!(game.phase(), Phase::MatchOver(B));
    // The winner keeps a placeholder target that cannot be struck.
    assert_eq!(game.target_of(B), Some(C));
}

#[test]
fn sinking_the_target_stops_the_rest_of_an_area_attack() {
    let catalog = ShipCatalog::new(vec![
        ShipKind::new("Dinghy", 1).with_attack(0, AbilityShape::Cross)
    ])
    .unwrap();
    let mut game = start(
        with_abilities(),
        catalog,
        &[A, B, C],
        &[
            (A, "Dinghy", (0, 0), Orientation::East),
            (B, "Dinghy", (3, 3), Orientation::East),
            (C, "Dinghy", (3, 4), Orientation::East),
        ],
    );
    let dinghy = game.catalog().find("Dinghy").unwrap();
    let cross = Order::ability(Mode::Attack, dinghy, Coordinate::new(3, 3), Orientation::North);
    assert_eq!(
        game.issue(A, cross),
        Ok(OrderOutcome::Resolved(vec![(Coordinate::new(3, 3), Outcome::Hit)]))
    );
    assert_eq!(game.standing(B), Some(Standing::Eliminated));
    assert_eq!(game.target_of(A), Some(C));
    // The new target is untouched by the cells aimed at the old one.
    assert_eq!(game.standing(C), Some(Standing::Active));
    assert_eq!(game.placement_of(C).unwrap().len(), 1);
    assert_eq!(game.hit_history(A, C), None);
    assert_eq!(game.phase(), Phase::ActivePlayerTurn(A));
}

#[test]
fn automated_players_take_their_turns() {
    let mut setup = MatchSetup::new(
        MatchConfig::default().with_rules(BitFlags::empty()).with_seed(5),
        ShipCatalog::standard(),
    )
    .unwrap();
    setup.add_player(A, PlayerKind::Human).unwrap();
    setup.add_player(B, PlayerKind::automated()).unwrap();
    setup
        .place_remaining_randomly(A, &mut StdRng::seed_from_u64(9))
        .unwrap();
    assert_eq!(setup.finish(A), Ok(true));
    let mut game = setup.start().unwrap();
    assert_eq!(game.current_active_player(), Some(A));

    for turn in 1..=5 {
        let state = game.advance_turn(A).unwrap();
        assert_eq!(state.phase, Phase::ActivePlayerTurn(A));
        assert_eq!(game.hit_history(B, A).unwrap().len(), turn);
    }
}

#[test]
fn all_automated_matches_play_out() {
    let config = MatchConfig::default()
        .with_rules(Rule::Abilities | Rule::RandomFirstTurn)
        .with_seed(2024);
    let mut setup = MatchSetup::new(config, ShipCatalog::standard()).unwrap();
    for id in 1..=4 {
        setup.add_player(PlayerId(id), PlayerKind::automated()).unwrap();
    }
    let game = setup.start().unwrap();
    assert!(game.is_over());
    let winner = game.winner().unwrap();
    let state = game.state();
    assert_eq!(state.turn_order, vec![winner]);
    assert_eq!(state.eliminated.len(), 3);
    assert!(!game.placement_of(winner).unwrap().is_empty());
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Strike(i32, i32),
    Advance,
    Quit,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        6 => (0..7i32, 0..7i32).prop_map(|(row, col)| Action::Strike(row, col)),
        3 => Just(Action::Advance),
        1 => Just(Action::Quit),
    ]
}

/// Targets of the active players must form one cycle through all of them.
fn assert_single_cycle(game: &Match) -> Result<(), TestCaseError> {
    let state = game.state();
    prop_assert_eq!(state.targets.len(), state.turn_order.len());
    let start = state.turn_order[0];
    let mut current = start;
    for _ in 0..state.turn_order.len() {
        let next = state.targets[&current];
        prop_assert!(next != current, "{} targets itself", current);
        prop_assert!(state.turn_order.contains(&next), "{} targets a gone player", current);
        current = next;
    }
    prop_assert_eq!(current, start);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn targets_stay_a_single_cycle(
        players in 2..=6u32,
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 0..120),
    ) {
        let catalog = ShipCatalog::new(vec![ShipKind::new("Skiff", 2)]).unwrap();
        let config = MatchConfig::default().with_seed(seed);
        let mut setup = MatchSetup::new(config, catalog).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for id in 1..=players {
            setup.add_player(PlayerId(id), PlayerKind::Human).unwrap();
            setup.place_remaining_randomly(PlayerId(id), &mut rng).unwrap();
            setup.finish(PlayerId(id)).unwrap();
        }
        let mut game = setup.start().unwrap();
        assert_single_cycle(&game)?;

        for action in actions {
            let holder = match game.current_active_player() {
                Some(holder) => holder,
                None => break,
            };
            match action {
                Action::Strike(row, col) => {
                    let order = Order::strike(Mode::Attack, Coordinate::new(row, col));
                    let _ = game.issue(holder, order);
                }
                Action::Advance => {
                    game.advance_turn(holder).unwrap();
                }
                Action::Quit => {
                    game.quit(holder).unwrap();
                }
            }
            if game.is_over() {
                break;
            }
            assert_single_cycle(&game)?;
        }

        let state = game.state();
        prop_assert_eq!(
            state.turn_order.len() + state.eliminated.len(),
            players as usize
        );
        if let Some(winner) = game.winner() {
            prop_assert_eq!(state.turn_order, vec![winner]);
        }
    }
}
