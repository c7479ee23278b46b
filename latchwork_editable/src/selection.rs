// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense-id-valued selections.

use hashbrown::{HashMap, HashSet};

use latchwork_geometry::PartVec;
use latchwork_layout::InfoMessage;
use latchwork_vocabulary::{DecorationId, LogicItemId, Offset, Part, Segment, SegmentPart};

/// A set of selected logic items, decorations, and segment parts.
///
/// Selections refer to the *current* layout by dense id; applying the layout
/// message stream keeps them live across edits (id renumbering, segment
/// splits and merges, deletions). Per-segment parts are normalized by
/// [`PartVec`]; entries whose part list becomes empty are dropped, so two
/// selections covering the same geometry compare equal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    logicitems: HashSet<LogicItemId>,
    decorations: HashSet<DecorationId>,
    segments: HashMap<Segment, PartVec>,
}

impl Selection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logicitems.is_empty() && self.decorations.is_empty() && self.segments.is_empty()
    }

    /// Adds a logic item.
    pub fn add_logicitem(&mut self, id: LogicItemId) {
        self.logicitems.insert(id);
    }

    /// Removes a logic item.
    pub fn remove_logicitem(&mut self, id: LogicItemId) {
        self.logicitems.remove(&id);
    }

    /// Adds a decoration.
    pub fn add_decoration(&mut self, id: DecorationId) {
        self.decorations.insert(id);
    }

    /// Removes a decoration.
    pub fn remove_decoration(&mut self, id: DecorationId) {
        self.decorations.remove(&id);
    }

    /// Adds a segment part, merging with already-selected ranges.
    pub fn add_segment(&mut self, segment_part: SegmentPart) {
        self.segments
            .entry(segment_part.segment)
            .or_default()
            .add(segment_part.part);
    }

    /// Removes a segment part, splitting selected ranges as needed.
    pub fn remove_segment(&mut self, segment_part: SegmentPart) {
        if let Some(parts) = self.segments.get_mut(&segment_part.segment) {
            parts.remove(segment_part.part);
            if parts.is_empty() {
                self.segments.remove(&segment_part.segment);
            }
        }
    }

    /// Whether the logic item is selected.
    #[must_use]
    pub fn is_selected_logicitem(&self, id: LogicItemId) -> bool {
        self.logicitems.contains(&id)
    }

    /// Whether the decoration is selected.
    #[must_use]
    pub fn is_selected_decoration(&self, id: DecorationId) -> bool {
        self.decorations.contains(&id)
    }

    /// The selected ids of logic items.
    pub fn logicitems(&self) -> impl Iterator<Item = LogicItemId> + '_ {
        self.logicitems.iter().copied()
    }

    /// The selected ids of decorations.
    pub fn decorations(&self) -> impl Iterator<Item = DecorationId> + '_ {
        self.decorations.iter().copied()
    }

    /// The selected segments with their part lists.
    pub fn segments(&self) -> impl Iterator<Item = (Segment, &PartVec)> {
        self.segments.iter().map(|(segment, parts)| (*segment, parts))
    }

    /// The selected parts of one segment, if any.
    #[must_use]
    pub fn segment_parts(&self, segment: Segment) -> Option<&PartVec> {
        self.segments.get(&segment)
    }

    /// Applies one layout message, keeping the selection live.
    pub fn submit(&mut self, message: &InfoMessage) {
        match message {
            InfoMessage::LogicItemIdUpdated { new_id, old_id } => {
                if self.logicitems.remove(old_id) {
                    self.logicitems.insert(*new_id);
                }
            }
            InfoMessage::LogicItemDeleted { id } => {
                self.logicitems.remove(id);
            }
            InfoMessage::DecorationIdUpdated { new_id, old_id } => {
                if self.decorations.remove(old_id) {
                    self.decorations.insert(*new_id);
                }
            }
            InfoMessage::DecorationDeleted { id } => {
                self.decorations.remove(id);
            }
            InfoMessage::SegmentIdUpdated {
                new_segment,
                old_segment,
            } => {
                if let Some(parts) = self.segments.remove(old_segment) {
                    self.segments.insert(*new_segment, parts);
                }
            }
            InfoMessage::SegmentPartMoved {
                destination,
                source,
                ..
            } => {
                self.move_parts(*source, *destination);
            }
            InfoMessage::SegmentPartDeleted { segment_part, .. } => {
                self.remove_segment(*segment_part);
            }
            _ => {}
        }
    }

    /// Moves the selected overlap of `source` onto `destination`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "offsets within a segment fit u16 and the assert pins the sign"
    )]
    fn move_parts(&mut self, source: SegmentPart, destination: SegmentPart) {
        let Some(parts) = self.segments.get_mut(&source.segment) else {
            return;
        };

        let moved: PartVec = parts
            .iter()
            .filter_map(|part| part.intersection(source.part))
            .fold(PartVec::new(), |mut acc, part| {
                acc.add(part);
                acc
            });
        if moved.is_empty() {
            return;
        }

        parts.remove(source.part);
        if parts.is_empty() {
            self.segments.remove(&source.segment);
        }

        let entry = self.segments.entry(destination.segment).or_default();
        for part in &moved {
            let begin =
                i32::from(part.begin.get()) - i32::from(source.part.begin.get())
                    + i32::from(destination.part.begin.get());
            let end = begin + i32::from(part.len());
            debug_assert!(begin >= 0, "moved part must start inside the destination");
            entry.add(Part::new(
                Offset::new(begin as u16),
                Offset::new(end as u16),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use latchwork_vocabulary::{SegmentIndex, WireId};

    use super::*;

    fn segment(wire: u32, index: u16) -> Segment {
        Segment::new(WireId::new(wire), SegmentIndex::new(index))
    }

    fn part_of(segment: Segment, begin: u16, end: u16) -> SegmentPart {
        SegmentPart::new(segment, Part::from_range(begin, end))
    }

    #[test]
    fn segment_parts_normalize() {
        let mut selection = Selection::new();
        let s = segment(2, 0);

        selection.add_segment(part_of(s, 0, 2));
        selection.add_segment(part_of(s, 2, 5));
        assert_eq!(
            selection.segment_parts(s).unwrap().parts(),
            [Part::from_range(0, 5)]
        );

        selection.remove_segment(part_of(s, 0, 5));
        assert!(selection.is_empty());
    }

    #[test]
    fn id_updates_rename_entries() {
        let mut selection = Selection::new();
        selection.add_logicitem(LogicItemId::new(3));
        selection.submit(&InfoMessage::LogicItemIdUpdated {
            new_id: LogicItemId::new(0),
            old_id: LogicItemId::new(3),
        });
        assert!(selection.is_selected_logicitem(LogicItemId::new(0)));

        selection.submit(&InfoMessage::LogicItemDeleted {
            id: LogicItemId::new(0),
        });
        assert!(selection.is_empty());
    }

    #[test]
    fn part_moves_follow_splits() {
        let mut selection = Selection::new();
        let source = segment(2, 0);
        let destination = segment(2, 1);
        selection.add_segment(part_of(source, 3, 8));

        // The tail [5, 10) of the segment splits off to a new segment.
        selection.submit(&InfoMessage::SegmentPartMoved {
            destination: part_of(destination, 0, 5),
            source: part_of(source, 5, 10),
            create_destination: true,
            delete_source: false,
        });

        assert_eq!(
            selection.segment_parts(source).unwrap().parts(),
            [Part::from_range(3, 5)]
        );
        assert_eq!(
            selection.segment_parts(destination).unwrap().parts(),
            [Part::from_range(0, 3)]
        );
    }
}
