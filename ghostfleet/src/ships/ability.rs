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
//! Cell-selection shapes of ship abilities, and how invoking one turns an anchor into
//! cells to resolve.
use std::{convert::TryFrom, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    board::{Coordinate, Orientation},
    game::events::Event,
    ships::ShipId,
};

/// Whether an action destroys what it finds or only reveals it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// Destroy ship cells.
    Attack,
    /// Reveal ship cells without destroying them.
    Scout,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Mode::Attack => "attack",
            Mode::Scout => "scout",
        })
    }
}

/// Largest value any count or extent of an [`AbilityShape`] may take.
pub const MAX_SHAPE_EXTENT: u32 = i32::MAX as u32;

/// The set of cells an ability selects relative to the anchor it was invoked at.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "shape", rename_all = "snake_case"))]
pub enum AbilityShape {
    /// Only the anchor.
    Single,
    /// The anchor and `reach` cells on either side of it, along the invoking orientation.
    Line { reach: u32 },
    /// The anchor and its four orthogonal neighbours.
    Cross,
    /// A rectangle extending `up`, `down`, `left` and `right` of the anchor.
    Area {
        up: u32,
        down: u32,
        left: u32,
        right: u32,
    },
    /// A deferred effect travelling from the anchor along the invoking orientation,
    /// `range` cells in total, `stride` cells per turn.
    Sortie { range: u32, stride: u32 },
    /// `count` distinct anchors chosen one invocation at a time.
    Salvo { count: u32 },
}

impl AbilityShape {
    /// Check that every count in this shape is at least 1 and that no count or extent
    /// exceeds [`MAX_SHAPE_EXTENT`].
    pub fn is_valid(&self) -> bool {
        let counts_ok = match *self {
            AbilityShape::Single | AbilityShape::Cross | AbilityShape::Area { .. } => true,
            AbilityShape::Line { reach } => reach >= 1,
            AbilityShape::Sortie { range, stride } => range >= 1 && stride >= 1,
            AbilityShape::Salvo { count } => count >= 1,
        };
        counts_ok && self.extents().iter().all(|&extent| extent <= MAX_SHAPE_EXTENT)
    }

    /// Get the farthest any selected cell may lie from the anchor, in cells.
    pub fn reach(&self) -> u32 {
        match *self {
            AbilityShape::Single | AbilityShape::Salvo { .. } => 0,
            AbilityShape::Cross => 1,
            AbilityShape::Line { reach } => reach,
            AbilityShape::Area {
                up,
                down,
                left,
                right,
            } => up.max(down).max(left).max(right),
            AbilityShape::Sortie { range, .. } => range,
        }
    }

    /// Get the number of anchors the shape needs before it resolves.
    pub fn anchors_needed(&self) -> u32 {
        match *self {
            AbilityShape::Salvo { count } => count,
            _ => 1,
        }
    }

    fn extents(&self) -> Vec<u32> {
        match *self {
            AbilityShape::Single | AbilityShape::Cross => vec![],
            AbilityShape::Line { reach } => vec![reach],
            AbilityShape::Area {
                up,
                down,
                left,
                right,
            } => vec![up, down, left, right],
            AbilityShape::Sortie { range, stride } => vec![range, stride],
            AbilityShape::Salvo { count } => vec![count],
        }
    }

    /// Get the cells selected by an immediate shape, or `None` for shapes that defer or
    /// accumulate and for extents that do not fit an `i32`. The cells are not bounds
    /// checked.
    pub fn cells(&self, anchor: Coordinate, orientation: Orientation) -> Option<Vec<Coordinate>> {
        match *self {
            AbilityShape::Single => Some(vec![anchor]),
            AbilityShape::Line { reach } => {
                let (rows, cols) = orientation.delta();
                let reach = i32::try_from(reach).ok()?;
                Some(
                    (-reach..=reach)
                        .map(|k| anchor.offset(rows * k, cols * k))
                        .collect(),
                )
            }
            AbilityShape::Cross => Some(
                std::iter::once(anchor)
                    .chain(Orientation::ALL.iter().map(|o| o.step(anchor)))
                    .collect(),
            ),
            AbilityShape::Area {
                up,
                down,
                left,
                right,
            } => {
                let up = i32::try_from(up).ok()?;
                let down = i32::try_from(down).ok()?;
                let left = i32::try_from(left).ok()?;
                let right = i32::try_from(right).ok()?;
                let mut cells = Vec::new();
                for row in -up..=down {
                    for col in -left..=right {
                        cells.push(anchor.offset(row, col));
                    }
                }
                Some(cells)
            }
            AbilityShape::Sortie { .. } | AbilityShape::Salvo { .. } => None,
        }
    }
}

/// Partially collected anchors of an accumulating ability.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PendingSelection {
    /// Ship whose ability is being collected.
    ship: ShipId,
    /// Mode the ability was invoked in.
    mode: Mode,
    /// Distinct anchors in the order they were chosen.
    anchors: Vec<Coordinate>,
}

impl PendingSelection {
    /// Get the ship whose ability is being collected.
    pub fn ship(&self) -> ShipId {
        self.ship
    }

    /// Get the mode the ability was invoked in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get the anchors chosen so far.
    pub fn anchors(&self) -> &[Coordinate] {
        &self.anchors
    }
}

/// Result of invoking a ship ability at an anchor.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AbilityOutcome {
    /// Resolve these cells now.
    Immediate(Vec<Coordinate>),
    /// Register this event with the scheduler.
    Deferred(Event),
    /// The anchor was added to a selection which is not complete yet.
    Accumulating { selected: usize, required: usize },
}

/// Invoke `shape` for `ship` in `mode`. Salvo shapes collect anchors into `selection`;
/// every other shape leaves it untouched.
pub(crate) fn invoke(
    shape: AbilityShape,
    ship: ShipId,
    mode: Mode,
    anchor: Coordinate,
    orientation: Orientation,
    selection: &mut Option<PendingSelection>,
) -> AbilityOutcome {
    match shape {
        AbilityShape::Sortie { range, stride } => {
            AbilityOutcome::Deferred(Event::new(mode, anchor, orientation, range, stride))
        }
        AbilityShape::Salvo { count } => {
            let required = count as usize;
            let mut pending = match selection.take() {
                Some(pending) if pending.ship == ship && pending.mode == mode => pending,
                _ => PendingSelection {
                    ship,
                    mode,
                    anchors: Vec::new(),
                },
            };
            if !pending.anchors.contains(&anchor) {
                pending.anchors.push(anchor);
            }
            let selected = pending.anchors.len();
            if selected >= required {
                AbilityOutcome::Immediate(pending.anchors)
            } else {
                *selection = Some(pending);
                AbilityOutcome::Accumulating { selected, required }
            }
        }
        immediate => AbilityOutcome::Immediate(
            immediate
                .cells(anchor, orientation)
                .unwrap_or_else(|| vec![anchor]),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_runs_along_the_orientation_axis() {
        let shape = AbilityShape::Line { reach: 2 };
        let anchor = Coordinate::new(3, 3);
        let cells = shape.cells(anchor, Orientation::East).unwrap();
        assert_eq!(cells.len(), 5);
        assert!(cells.iter().all(|c| c.row == 3));
        assert_eq!(cells[0], Coordinate::new(3, 1));
        assert_eq!(cells[4], Coordinate::new(3, 5));

        let cells = shape.cells(anchor, Orientation::North).unwrap();
        assert!(cells.iter().all(|c| c.col == 3));
    }

    #[test]
    fn area_covers_rows_above_and_columns_around() {
        let block = AbilityShape::Area {
            up: 1,
            down: 0,
            left: 1,
            right: 1,
        };
        let mut cells = block.cells(Coordinate::new(4, 4), Orientation::North).unwrap();
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Coordinate::new(3, 3),
                Coordinate::new(3, 4),
                Coordinate::new(3, 5),
                Coordinate::new(4, 3),
                Coordinate::new(4, 4),
                Coordinate::new(4, 5),
            ]
        );
    }

    #[test]
    fn oversized_extents_are_invalid() {
        let area = AbilityShape::Area {
            up: 1 << 31,
            down: 0,
            left: 0,
            right: 0,
        };
        assert!(!area.is_valid());
        assert_eq!(area.cells(Coordinate::new(0, 0), Orientation::North), None);
        let line = AbilityShape::Line { reach: u32::MAX };
        assert!(!line.is_valid());
        assert_eq!(line.cells(Coordinate::new(0, 0), Orientation::North), None);
        assert!(AbilityShape::Line {
            reach: MAX_SHAPE_EXTENT
        }
        .is_valid());
        assert_eq!(line.reach(), u32::MAX);
    }

    #[test]
    fn cross_has_five_cells() {
        let cells = AbilityShape::Cross
            .cells(Coordinate::new(0, 0), Orientation::North)
            .unwrap();
        assert_eq!(cells.len(), 5);
        assert!(cells.contains(&Coordinate::new(-1, 0)));
    }

    #[test]
    fn sortie_defers() {
        let mut selection = None;
        let outcome = invoke(
            AbilityShape::Sortie { range: 1, stride: 1 },
            ShipId(2),
            Mode::Attack,
            Coordinate::new(3, 3),
            Orientation::West,
            &mut selection,
        );
        match outcome {
            AbilityOutcome::Deferred(event) => {
                assert_eq!(event.kind(), Mode::Attack);
                assert_eq!(event.remaining(), 1);
            }
            other => panic!("expected a deferred event, got {:?}", other),
        }
        assert_eq!(selection, None);
    }

    #[test]
    fn salvo_ignores_duplicates_and_restarts_on_switch() {
        let shape = AbilityShape::Salvo { count: 3 };
        let mut selection = None;
        let mut fire = |ship, mode, row| {
            invoke(
                shape,
                ShipId(ship),
                mode,
                Coordinate::new(row, 0),
                Orientation::North,
                &mut selection,
            )
        };
        assert_eq!(
            fire(4, Mode::Scout, 0),
            AbilityOutcome::Accumulating {
                selected: 1,
                required: 3
            }
        );
        assert_eq!(
            fire(4, Mode::Scout, 0),
            AbilityOutcome::Accumulating {
                selected: 1,
                required: 3
            }
        );
        // A different mode starts over.
        assert_eq!(
            fire(4, Mode::Attack, 1),
            AbilityOutcome::Accumulating {
                selected: 1,
                required: 3
            }
        );
        fire(4, Mode::Attack, 2);
        assert_eq!(
            fire(4, Mode::Attack, 3),
            AbilityOutcome::Immediate(vec![
                Coordinate::new(1, 0),
                Coordinate::new(2, 0),
                Coordinate::new(3, 0),
            ])
        );
        assert_eq!(selection, None);
    }
}
