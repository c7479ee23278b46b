// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Definition-plus-position bundles used by history and persistence.

use latchwork_layout::{DecorationDefinition, LogicItemDefinition};
use latchwork_vocabulary::Point;

/// A logic item ready to be placed: full definition plus position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLogicItem {
    /// The item definition.
    pub definition: LogicItemDefinition,
    /// The anchor position.
    pub position: Point,
}

/// A decoration ready to be placed: full definition plus position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedDecoration {
    /// The decoration definition.
    pub definition: DecorationDefinition,
    /// The anchor position.
    pub position: Point,
}
