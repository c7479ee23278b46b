// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latchwork Index: the derived acceleration structures of the circuit core.
//!
//! Every structure here is a pure function of the layout, maintained
//! incrementally from the [`InfoMessage`] stream:
//!
//! - [`CollisionIndex`]: position-to-occupancy map for O(1) collision
//!   decisions.
//! - [`LogicItemConnectionIndex`] / [`WireConnectionIndex`]: four
//!   position-to-endpoint maps for O(1) pin and endpoint lookup.
//! - [`SpatialIndex`]: rectangle-keyed index for area queries and point
//!   hit-testing, grid-bucketed.
//! - [`KeyIndex`]: bi-directional dense-id/stable-key maps.
//!
//! [`LayoutIndex`] bundles all of them and fans each message out in a fixed
//! registration order. Because each index is rebuildable from a layout
//! snapshot, [`LayoutIndex::validate`] can compare the incrementally
//! maintained state against a rebuild: the round-trip invariant every
//! mutation must preserve.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod collision;
mod connection;
mod key;
mod spatial;

pub use collision::{BodyTag, CollisionData, CollisionIndex, IndexState, WireTag};
pub use connection::{
    Direction, LogicItemConnection, LogicItemConnectionIndex, WireConnection,
    WireConnectionIndex,
};
pub use key::KeyIndex;
pub use spatial::{SpatialIndex, SpatialPayload};

use alloc::vec::Vec;

use latchwork_geometry::fine::PointFine;
use latchwork_layout::{InfoMessage, Layout, LogicItemLayoutData};
use latchwork_vocabulary::{Offset, Point, Segment};

/// All derived indices of one layout, updated together.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutIndex {
    collision: CollisionIndex,
    logicitem_inputs: LogicItemConnectionIndex,
    logicitem_outputs: LogicItemConnectionIndex,
    wire_inputs: WireConnectionIndex,
    wire_outputs: WireConnectionIndex,
    spatial: SpatialIndex,
    keys: KeyIndex,
}

impl LayoutIndex {
    /// Creates empty indices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds all indices from a layout snapshot.
    ///
    /// Stable keys are assigned fresh, in table order; use
    /// [`KeyIndex::set_logicitem_key`] and friends to restore persisted
    /// keys afterwards.
    #[must_use]
    pub fn from_layout(layout: &Layout) -> Self {
        let mut index = Self::new();
        for message in generate_created_messages(layout) {
            index.submit(&message);
        }
        for message in generate_inserted_messages(layout) {
            index.submit(&message);
        }
        index
    }

    /// The collision index.
    #[must_use]
    pub fn collision(&self) -> &CollisionIndex {
        &self.collision
    }

    /// The logic-item input pin map.
    #[must_use]
    pub fn logicitem_inputs(&self) -> &LogicItemConnectionIndex {
        &self.logicitem_inputs
    }

    /// The logic-item output pin map.
    #[must_use]
    pub fn logicitem_outputs(&self) -> &LogicItemConnectionIndex {
        &self.logicitem_outputs
    }

    /// The wire input endpoint map.
    #[must_use]
    pub fn wire_inputs(&self) -> &WireConnectionIndex {
        &self.wire_inputs
    }

    /// The wire output endpoint map.
    #[must_use]
    pub fn wire_outputs(&self) -> &WireConnectionIndex {
        &self.wire_outputs
    }

    /// The spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// The key index.
    #[must_use]
    pub fn keys(&self) -> &KeyIndex {
        &self.keys
    }

    /// The key index, mutable; used to restore persisted keys.
    pub fn keys_mut(&mut self) -> &mut KeyIndex {
        &mut self.keys
    }

    /// Delivers one message to every index, in registration order.
    pub fn submit(&mut self, message: &InfoMessage) {
        self.collision.submit(message);
        self.logicitem_inputs.submit(message);
        self.logicitem_outputs.submit(message);
        self.wire_inputs.submit(message);
        self.wire_outputs.submit(message);
        self.spatial.submit(message);
        self.keys.submit(message);
    }

    /// Whether inserting the logic item would collide, including the
    /// orientation handshake rules of the pin maps.
    #[must_use]
    pub fn is_colliding_item(&self, data: &LogicItemLayoutData) -> bool {
        self.collision.is_colliding_item(data)
            || self.logicitem_inputs.is_colliding(data)
            || self.logicitem_outputs.is_colliding(data)
    }

    /// Whether any inserted element is hit by the fine point.
    #[must_use]
    pub fn has_element(&self, point: PointFine) -> bool {
        self.spatial.has_element(point)
    }

    /// Up to four inserted segments touching the grid point.
    #[must_use]
    pub fn query_line_segments(&self, point: Point) -> smallvec::SmallVec<[Segment; 4]> {
        self.spatial.query_line_segments(point)
    }

    /// Heap bytes currently allocated by all indices.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.collision.allocated_size()
            + self.logicitem_inputs.allocated_size()
            + self.logicitem_outputs.allocated_size()
            + self.wire_inputs.allocated_size()
            + self.wire_outputs.allocated_size()
            + self.spatial.allocated_size()
            + self.keys.allocated_size()
    }

    /// Asserts that the incrementally maintained state equals a rebuild from
    /// the layout and that the key maps cover exactly the live ids.
    ///
    /// # Panics
    ///
    /// Panics on any mismatch; that is a message-propagation bug in the core.
    pub fn validate(&self, layout: &Layout) {
        let rebuilt = Self::from_layout(layout);
        assert!(
            self.collision == rebuilt.collision,
            "collision index out of sync with the layout"
        );
        assert!(
            self.logicitem_inputs == rebuilt.logicitem_inputs
                && self.logicitem_outputs == rebuilt.logicitem_outputs,
            "logic item connection indices out of sync with the layout"
        );
        assert!(
            self.wire_inputs == rebuilt.wire_inputs && self.wire_outputs == rebuilt.wire_outputs,
            "wire connection indices out of sync with the layout"
        );
        assert!(
            self.spatial == rebuilt.spatial,
            "spatial index out of sync with the layout"
        );
        assert!(
            self.keys.is_consistent_with(layout),
            "key index out of sync with the layout"
        );
    }
}

impl Default for LayoutIndex {
    fn default() -> Self {
        Self {
            collision: CollisionIndex::new(),
            logicitem_inputs: LogicItemConnectionIndex::new(Direction::Input),
            logicitem_outputs: LogicItemConnectionIndex::new(Direction::Output),
            wire_inputs: WireConnectionIndex::new(Direction::Input),
            wire_outputs: WireConnectionIndex::new(Direction::Output),
            spatial: SpatialIndex::new(),
            keys: KeyIndex::new(),
        }
    }
}

/// The creation messages a layout's current contents would have produced.
///
/// Covers every element regardless of display state; replaying these binds
/// stable keys for the whole layout.
#[must_use]
pub fn generate_created_messages(layout: &Layout) -> Vec<InfoMessage> {
    let mut messages = Vec::new();
    for id in layout.logicitems().ids() {
        messages.push(InfoMessage::LogicItemCreated { id });
    }
    for id in layout.decorations().ids() {
        messages.push(InfoMessage::DecorationCreated { id });
    }
    for wire in layout.wires().ids() {
        let tree = layout.wires().tree(wire);
        for index in tree.indices() {
            messages.push(InfoMessage::SegmentCreated {
                segment: Segment::new(wire, index),
                size: Offset::new(latchwork_geometry::line::distance(tree.line(index))),
            });
        }
    }
    messages
}

/// The insertion messages a layout's inserted contents would have produced.
#[must_use]
pub fn generate_inserted_messages(layout: &Layout) -> Vec<InfoMessage> {
    let mut messages = Vec::new();
    for id in layout.logicitems().ids() {
        if layout.logicitems().display_state(id).is_inserted() {
            messages.push(InfoMessage::LogicItemInserted {
                id,
                data: layout.logicitems().layout_data(id),
            });
        }
    }
    for id in layout.decorations().ids() {
        if layout.decorations().display_state(id).is_inserted() {
            messages.push(InfoMessage::DecorationInserted {
                id,
                data: layout.decorations().layout_data(id),
            });
        }
    }
    for wire in layout.wires().inserted_ids() {
        let tree = layout.wires().tree(wire);
        for index in tree.indices() {
            messages.push(InfoMessage::SegmentInserted {
                segment: Segment::new(wire, index),
                info: tree.info(index),
            });
        }
    }
    messages
}

impl LogicItemConnectionIndex {
    /// Builds the index from a layout snapshot.
    #[must_use]
    pub fn from_layout(layout: &Layout, direction: Direction) -> Self {
        let mut index = Self::new(direction);
        for message in generate_inserted_messages(layout) {
            index.submit(&message);
        }
        index
    }
}

impl WireConnectionIndex {
    /// Builds the index from a layout snapshot.
    #[must_use]
    pub fn from_layout(layout: &Layout, direction: Direction) -> Self {
        let mut index = Self::new(direction);
        for message in generate_inserted_messages(layout) {
            index.submit(&message);
        }
        index
    }
}

impl CollisionIndex {
    /// Builds the index from a layout snapshot.
    #[must_use]
    pub fn from_layout(layout: &Layout) -> Self {
        let mut index = Self::new();
        for message in generate_inserted_messages(layout) {
            index.submit(&message);
        }
        index
    }
}

impl SpatialIndex {
    /// Builds the index from a layout snapshot.
    #[must_use]
    pub fn from_layout(layout: &Layout) -> Self {
        let mut index = Self::new();
        for message in generate_inserted_messages(layout) {
            index.submit(&message);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use latchwork_layout::{LogicItemDefinition, SegmentTree};
    use latchwork_vocabulary::{
        DisplayState, LogicItemType, OrderedLine, Point, SegmentInfo, SegmentPointType, WireId,
    };

    use super::*;

    fn layout_with_gate_and_wire() -> Layout {
        let mut layout = Layout::new();
        layout.logicitems_mut().add(
            LogicItemDefinition::default_for(LogicItemType::AndElement),
            Point::new(5, 0),
            DisplayState::Normal,
        );

        let wire = layout.wires_mut().add_wire();
        assert_eq!(wire, WireId::FIRST_INSERTED);
        let tree: &mut SegmentTree = layout.wires_mut().tree_mut(wire);
        tree.add_segment(SegmentInfo {
            line: OrderedLine::new(Point::new(0, 0), Point::new(3, 0)),
            p0_type: SegmentPointType::ShadowPoint,
            p1_type: SegmentPointType::Output,
        });
        layout
    }

    #[test]
    fn from_layout_equals_incremental_build() {
        let layout = layout_with_gate_and_wire();
        let index = LayoutIndex::from_layout(&layout);

        // Validation rebuilds internally and must pass on a fresh build.
        index.validate(&layout);
        assert!(index.has_element(PointFine::new(1.0, 0.0)));
        assert!(
            index
                .wire_outputs()
                .find(Point::new(3, 0))
                .is_some()
        );
        assert!(index.wire_inputs().find(Point::new(3, 0)).is_none());
    }

    #[test]
    fn combined_item_collision_includes_handshakes() {
        let layout = layout_with_gate_and_wire();
        let index = LayoutIndex::from_layout(&layout);

        // Same footprint as the inserted gate: collides.
        let data = layout.logicitems().layout_data(latchwork_vocabulary::LogicItemId::new(0));
        assert!(index.is_colliding_item(&data));

        // Disjoint position: free.
        let mut moved = data;
        moved.position = Point::new(5, 10);
        assert!(!index.is_colliding_item(&moved));
    }
}
