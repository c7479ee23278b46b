// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stable-key selections that survive arbitrary layout edits.

use latchwork_geometry::part::{to_line, to_offset};
use latchwork_index::KeyIndex;
use latchwork_layout::Layout;
use latchwork_vocabulary::{
    DecorationKey, LogicItemKey, OrderedLine, Part, SegmentKey, SegmentPart,
};

use crate::Selection;

/// A selection expressed in stable keys and absolute geometry.
///
/// Logic items and decorations are identified by key alone. Segments carry
/// their key *and* the absolute sub-line, because a segment's offsets change
/// when it is split, merged, or moved; the line pins down which portion was
/// selected, independent of the current offset basis.
///
/// Lists are kept sorted so equal selections compare equal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StableSelection {
    /// Selected logic items by key.
    pub logicitems: Vec<LogicItemKey>,
    /// Selected decorations by key.
    pub decorations: Vec<DecorationKey>,
    /// Selected segment sub-lines by key.
    pub segments: Vec<(SegmentKey, OrderedLine)>,
}

impl StableSelection {
    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logicitems.is_empty() && self.decorations.is_empty() && self.segments.is_empty()
    }
}

/// Converts a live selection to its stable form.
///
/// # Panics
///
/// Panics if the selection refers to ids unknown to the key index; selections
/// kept live through the message stream never do.
#[must_use]
pub fn to_stable_selection(
    selection: &Selection,
    key_index: &KeyIndex,
    layout: &Layout,
) -> StableSelection {
    let mut logicitems: Vec<LogicItemKey> = selection
        .logicitems()
        .map(|id| key_index.logicitem_key(id))
        .collect();
    logicitems.sort_unstable();

    let mut decorations: Vec<DecorationKey> = selection
        .decorations()
        .map(|id| key_index.decoration_key(id))
        .collect();
    decorations.sort_unstable();

    let mut segments: Vec<(SegmentKey, OrderedLine)> = Vec::new();
    for (segment, parts) in selection.segments() {
        let key = key_index.segment_key(segment);
        let line = layout.wires().tree(segment.wire).line(segment.index);
        for part in parts {
            segments.push((key, to_line(line, *part)));
        }
    }
    segments.sort_unstable();

    StableSelection {
        logicitems,
        decorations,
        segments,
    }
}

/// Converts a stable selection back to a live one through the current key
/// index.
///
/// # Panics
///
/// Panics if a key is not live or a stored sub-line no longer lies on its
/// segment; history replay guarantees both.
#[must_use]
pub fn to_selection(
    stable: &StableSelection,
    key_index: &KeyIndex,
    layout: &Layout,
) -> Selection {
    let mut selection = Selection::new();

    for key in &stable.logicitems {
        selection.add_logicitem(key_index.logicitem_id(*key));
    }
    for key in &stable.decorations {
        selection.add_decoration(key_index.decoration_id(*key));
    }
    for (key, sub_line) in &stable.segments {
        let segment = key_index.segment(*key);
        let line = layout.wires().tree(segment.wire).line(segment.index);
        let part = Part::new(to_offset(line, sub_line.p0), to_offset(line, sub_line.p1));
        selection.add_segment(SegmentPart::new(segment, part));
    }

    selection
}

#[cfg(test)]
mod tests {
    use latchwork_index::LayoutIndex;
    use latchwork_layout::SegmentTree;
    use latchwork_vocabulary::{DisplayState, LogicItemType, Point, Segment, SegmentInfo};

    use super::*;

    #[test]
    fn round_trips_through_the_key_index() {
        let mut layout = Layout::new();
        let item = layout.logicitems_mut().add(
            latchwork_layout::LogicItemDefinition::default_for(LogicItemType::AndElement),
            Point::new(0, 0),
            DisplayState::Normal,
        );
        let wire = layout.wires_mut().add_wire();
        let tree: &mut SegmentTree = layout.wires_mut().tree_mut(wire);
        let index = tree.add_segment(SegmentInfo::with_shadow_points(OrderedLine::new(
            Point::new(0, 5),
            Point::new(8, 5),
        )));
        let segment = Segment::new(wire, index);

        let layout_index = LayoutIndex::from_layout(&layout);
        let keys = layout_index.keys();

        let mut selection = Selection::new();
        selection.add_logicitem(item);
        selection.add_segment(SegmentPart::new(segment, Part::from_range(2, 6)));

        let stable = to_stable_selection(&selection, keys, &layout);
        assert_eq!(
            stable.segments,
            [(
                keys.segment_key(segment),
                OrderedLine::new(Point::new(2, 5), Point::new(6, 5))
            )]
        );

        let restored = to_selection(&stable, keys, &layout);
        assert_eq!(restored, selection);
    }
}
