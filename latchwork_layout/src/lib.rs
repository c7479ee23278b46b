// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latchwork Layout: the persistent data model of the editable circuit.
//!
//! A [`Layout`] owns three dense tables:
//!
//! - logic items ([`LogicItemStore`]),
//! - decorations ([`DecorationStore`]),
//! - wires ([`WireStore`]), each wire owning a [`SegmentTree`].
//!
//! Tables hand out dense ids that stay contiguous: deletion swaps the last
//! entry into the vacated slot and shrinks the table. The store layer is
//! *passive*: it never emits messages itself. The editing layer performs
//! every mutation through this crate and reports it on the [`InfoMessage`]
//! bus, which the derived indices consume; the message vocabulary lives here
//! because its payloads are layout data.
//!
//! Two wire slots are reserved: [`WireId::TEMPORARY`] collects every
//! free-floating segment and [`WireId::COLLIDING`] every segment laid out
//! over occupied positions. Inserted wire trees start at
//! [`WireId::FIRST_INSERTED`]; a mode change of a wire segment is therefore
//! always a move between trees.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod shape;

mod decoration;
mod logicitem;
mod message;
mod segment_tree;
mod wire;

pub use decoration::{DecorationDefinition, DecorationLayoutData, DecorationSize, DecorationStore};
pub use logicitem::{LogicItemDefinition, LogicItemLayoutData, LogicItemStore};
pub use message::InfoMessage;
pub use segment_tree::SegmentTree;
pub use wire::WireStore;

use latchwork_vocabulary::WireId;

/// The complete in-memory circuit layout.
///
/// Equality compares the full observable state of all three tables,
/// including display states and valid parts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    logicitems: LogicItemStore,
    decorations: DecorationStore,
    wires: WireStore,
}

impl Layout {
    /// Creates an empty layout with the two reserved wire trees.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The logic-item table.
    #[must_use]
    pub fn logicitems(&self) -> &LogicItemStore {
        &self.logicitems
    }

    /// The logic-item table, mutable.
    pub fn logicitems_mut(&mut self) -> &mut LogicItemStore {
        &mut self.logicitems
    }

    /// The decoration table.
    #[must_use]
    pub fn decorations(&self) -> &DecorationStore {
        &self.decorations
    }

    /// The decoration table, mutable.
    pub fn decorations_mut(&mut self) -> &mut DecorationStore {
        &mut self.decorations
    }

    /// The wire table.
    #[must_use]
    pub fn wires(&self) -> &WireStore {
        &self.wires
    }

    /// The wire table, mutable.
    pub fn wires_mut(&mut self) -> &mut WireStore {
        &mut self.wires
    }

    /// Whether the layout holds no items, decorations, or segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logicitems.is_empty() && self.decorations.is_empty() && self.wires.is_empty()
    }

    /// Heap bytes currently allocated by the layout tables.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.logicitems.allocated_size()
            + self.decorations.allocated_size()
            + self.wires.allocated_size()
    }
}

#[cfg(test)]
mod tests {
    use latchwork_vocabulary::{
        DisplayState, LogicItemType, OrderedLine, Point, SegmentInfo,
    };

    use super::*;

    #[test]
    fn empty_layout_has_reserved_wires() {
        let layout = Layout::new();
        assert!(layout.is_empty());
        assert_eq!(layout.wires().len(), 2);
        assert!(layout.wires().tree(WireId::TEMPORARY).is_empty());
        assert!(layout.wires().tree(WireId::COLLIDING).is_empty());
    }

    #[test]
    fn layout_equality_sees_all_tables() {
        let mut a = Layout::new();
        let b = Layout::new();
        assert_eq!(a, b);

        a.logicitems_mut().add(
            LogicItemDefinition::default_for(LogicItemType::AndElement),
            Point::new(0, 0),
            DisplayState::Temporary,
        );
        assert_ne!(a, b);

        let mut c = Layout::new();
        let line = OrderedLine::new(Point::new(0, 0), Point::new(2, 0));
        c.wires_mut()
            .tree_mut(WireId::TEMPORARY)
            .add_segment(SegmentInfo::with_shadow_points(line));
        assert_ne!(c, b);
        assert!(!c.is_empty());
    }
}
