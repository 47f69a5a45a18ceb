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
//! Types used for defining ships and their abilities.

pub use self::{
    ability::{AbilityOutcome, AbilityShape, Mode, PendingSelection, MAX_SHAPE_EXTENT},
    catalog::{CatalogError, ShipCatalog, ShipId, ShipKind},
};

mod ability;
mod catalog;
