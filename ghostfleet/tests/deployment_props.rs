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
use ghostfleet::{
    board::{Coordinate, Orientation},
    game::{DeployError, MatchConfig, MatchSetup, PlayerId, PlayerKind},
    ships::{ShipCatalog, ShipId},
};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

const PLAYER: PlayerId = PlayerId(1);

/// A setup with one human player who placed a random part of the standard fleet.
fn partial_setup(seed: u64) -> MatchSetup {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut setup = MatchSetup::new(MatchConfig::default(), ShipCatalog::standard()).unwrap();
    setup.add_player(PLAYER, PlayerKind::Human).unwrap();
    let ships: Vec<_> = setup.catalog().ids().collect();
    for ship in ships {
        if rng.gen_bool(0.5) {
            let anchor = Coordinate::new(rng.gen_range(0, 7), rng.gen_range(0, 7));
            let orientation = Orientation::ALL[rng.gen_range(0, 4)];
            let _ = setup.place(PLAYER, ship, anchor, orientation);
        }
    }
    setup
}

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![
        Just(Orientation::North),
        Just(Orientation::West),
        Just(Orientation::South),
        Just(Orientation::East),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn undo_reverts_place(
        seed in any::<u64>(),
        ship in 0..5usize,
        row in -2..9i32,
        col in -2..9i32,
        orientation in orientation(),
    ) {
        let mut setup = partial_setup(seed);
        let before = setup.placement_of(PLAYER).unwrap().clone();
        match setup.place(PLAYER, ShipId(ship), Coordinate::new(row, col), orientation) {
            Ok(cells) => {
                prop_assert_eq!(cells.len(), setup.catalog().get(ShipId(ship)).unwrap().len());
                prop_assert_eq!(setup.undo(PLAYER), Ok(ShipId(ship)));
                prop_assert_eq!(setup.placement_of(PLAYER).unwrap(), &before);
            }
            Err(_) => {
                // Rejected placements change nothing.
                prop_assert_eq!(setup.placement_of(PLAYER).unwrap(), &before);
            }
        }
    }

    #[test]
    fn redo_reverts_undo(seed in any::<u64>()) {
        let mut setup = partial_setup(seed);
        let before = setup.placement_of(PLAYER).unwrap().clone();
        match setup.undo(PLAYER) {
            Ok(ship) => {
                prop_assert!(!setup.placement_of(PLAYER).unwrap().has_ship(ship));
                prop_assert_eq!(setup.redo(PLAYER), Ok(ship));
                prop_assert_eq!(setup.placement_of(PLAYER).unwrap(), &before);
            }
            Err(err) => {
                prop_assert_eq!(err, DeployError::NothingToUndo);
                prop_assert!(before.is_empty());
            }
        }
    }

    #[test]
    fn finish_is_idempotent(seed in any::<u64>()) {
        let mut setup = partial_setup(seed);
        let first = setup.finish(PLAYER);
        let placement = setup.placement_of(PLAYER).unwrap().clone();
        prop_assert_eq!(setup.finish(PLAYER), first);
        prop_assert_eq!(setup.placement_of(PLAYER).unwrap(), &placement);
        prop_assert_eq!(setup.is_finished(PLAYER), first.is_ok());
    }

    #[test]
    fn random_placement_completes_any_partial_fleet(seed in any::<u64>()) {
        let mut setup = partial_setup(seed);
        let pending = setup.pending_ships(PLAYER).unwrap().len();
        let records = setup.undo_stack(PLAYER).unwrap().len();
        let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
        prop_assert_eq!(setup.place_remaining_randomly(PLAYER, &mut rng), Ok(pending));
        prop_assert_eq!(setup.undo_stack(PLAYER).unwrap().len(), records + pending);
        prop_assert_eq!(setup.placement_of(PLAYER).unwrap().len(), 17);
    }
}

#[test]
fn undo_after_finish_is_rejected() {
    let mut setup = MatchSetup::new(MatchConfig::default(), ShipCatalog::standard()).unwrap();
    setup.add_player(PLAYER, PlayerKind::Human).unwrap();
    setup
        .place(PLAYER, ShipId(0), Coordinate::new(6, 5), Orientation::East)
        .unwrap();
    setup
        .place(PLAYER, ShipId(1), Coordinate::new(0, 0), Orientation::South)
        .unwrap();
    setup.undo(PLAYER).unwrap();
    assert_eq!(setup.finish(PLAYER), Ok(true));

    assert_eq!(setup.undo(PLAYER), Err(DeployError::NothingToUndo));
    assert_eq!(setup.redo(PLAYER), Err(DeployError::NothingToRedo));
    assert_eq!(setup.placement_of(PLAYER).unwrap().len(), 2);
    assert_eq!(setup.undo_stack(PLAYER).unwrap().len(), 1);
}
