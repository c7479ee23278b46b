// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bi-directional dense-id to stable-key maps.
//!
//! Keys are handed out monotonically and never reused within a session.
//! Selections, history entries, and persisted state refer to elements by
//! key; the maps here translate to and from the dense ids that index the
//! layout tables.
//!
//! Class invariants: both directions of every map are mutual inverses, and
//! each "next key" counter strictly exceeds every live key.

use hashbrown::HashMap;

use latchwork_layout::InfoMessage;
use latchwork_vocabulary::{
    DecorationId, DecorationKey, LogicItemId, LogicItemKey, Segment, SegmentKey,
};

/// The id-to-key and key-to-id maps for items, decorations, and segments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyIndex {
    logicitem_keys: HashMap<LogicItemId, LogicItemKey>,
    logicitem_ids: HashMap<LogicItemKey, LogicItemId>,
    next_logicitem_key: LogicItemKey,

    decoration_keys: HashMap<DecorationId, DecorationKey>,
    decoration_ids: HashMap<DecorationKey, DecorationId>,
    next_decoration_key: DecorationKey,

    segment_keys: HashMap<Segment, SegmentKey>,
    segment_ids: HashMap<SegmentKey, Segment>,
    next_segment_key: SegmentKey,
}

impl KeyIndex {
    /// Creates an empty index with all counters at the first key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The key of a live logic item.
    ///
    /// # Panics
    ///
    /// Panics if the id is not bound; that is a lost-message bug.
    #[must_use]
    pub fn logicitem_key(&self, id: LogicItemId) -> LogicItemKey {
        *self
            .logicitem_keys
            .get(&id)
            .expect("logic item id must be bound to a key")
    }

    /// The dense id currently bound to the key, if the element is live.
    #[must_use]
    pub fn try_logicitem_id(&self, key: LogicItemKey) -> Option<LogicItemId> {
        self.logicitem_ids.get(&key).copied()
    }

    /// The dense id currently bound to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not live; callers that may hold retired keys use
    /// [`Self::try_logicitem_id`].
    #[must_use]
    pub fn logicitem_id(&self, key: LogicItemKey) -> LogicItemId {
        self.try_logicitem_id(key)
            .expect("logic item key must be live")
    }

    /// The key of a live decoration.
    ///
    /// # Panics
    ///
    /// Panics if the id is not bound.
    #[must_use]
    pub fn decoration_key(&self, id: DecorationId) -> DecorationKey {
        *self
            .decoration_keys
            .get(&id)
            .expect("decoration id must be bound to a key")
    }

    /// The dense id currently bound to the key, if live.
    #[must_use]
    pub fn try_decoration_id(&self, key: DecorationKey) -> Option<DecorationId> {
        self.decoration_ids.get(&key).copied()
    }

    /// The dense id currently bound to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not live.
    #[must_use]
    pub fn decoration_id(&self, key: DecorationKey) -> DecorationId {
        self.try_decoration_id(key)
            .expect("decoration key must be live")
    }

    /// The key of a live segment.
    ///
    /// # Panics
    ///
    /// Panics if the segment is not bound.
    #[must_use]
    pub fn segment_key(&self, segment: Segment) -> SegmentKey {
        *self
            .segment_keys
            .get(&segment)
            .expect("segment must be bound to a key")
    }

    /// The segment currently bound to the key, if live.
    #[must_use]
    pub fn try_segment(&self, key: SegmentKey) -> Option<Segment> {
        self.segment_ids.get(&key).copied()
    }

    /// The segment currently bound to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not live.
    #[must_use]
    pub fn segment(&self, key: SegmentKey) -> Segment {
        self.try_segment(key).expect("segment key must be live")
    }

    /// Rebinds a live logic item to a specific key.
    ///
    /// Used when restoring persisted keys or replaying history; the monotonic
    /// counter advances past the restored key.
    ///
    /// # Panics
    ///
    /// Panics if the id is not live or the key is already taken.
    pub fn set_logicitem_key(&mut self, id: LogicItemId, key: LogicItemKey) {
        let old_key = self
            .logicitem_keys
            .insert(id, key)
            .expect("logic item id must be bound before rebinding");
        self.logicitem_ids.remove(&old_key);
        let previous = self.logicitem_ids.insert(key, id);
        assert!(previous.is_none(), "logic item key already bound");
        self.next_logicitem_key = self.next_logicitem_key.max(key.successor());
    }

    /// Rebinds a live decoration to a specific key.
    ///
    /// # Panics
    ///
    /// Panics if the id is not live or the key is already taken.
    pub fn set_decoration_key(&mut self, id: DecorationId, key: DecorationKey) {
        let old_key = self
            .decoration_keys
            .insert(id, key)
            .expect("decoration id must be bound before rebinding");
        self.decoration_ids.remove(&old_key);
        let previous = self.decoration_ids.insert(key, id);
        assert!(previous.is_none(), "decoration key already bound");
        self.next_decoration_key = self.next_decoration_key.max(key.successor());
    }

    /// Rebinds a live segment to a specific key.
    ///
    /// # Panics
    ///
    /// Panics if the segment is not live or the key is already taken.
    pub fn set_segment_key(&mut self, segment: Segment, key: SegmentKey) {
        let old_key = self
            .segment_keys
            .insert(segment, key)
            .expect("segment must be bound before rebinding");
        self.segment_ids.remove(&old_key);
        let previous = self.segment_ids.insert(key, segment);
        assert!(previous.is_none(), "segment key already bound");
        self.next_segment_key = self.next_segment_key.max(key.successor());
    }

    /// Heap bytes currently allocated by the maps.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        use core::mem::size_of;

        self.logicitem_keys.capacity()
            * (size_of::<LogicItemId>() + size_of::<LogicItemKey>())
            * 2
            + self.decoration_keys.capacity()
                * (size_of::<DecorationId>() + size_of::<DecorationKey>())
                * 2
            + self.segment_keys.capacity() * (size_of::<Segment>() + size_of::<SegmentKey>()) * 2
    }

    /// Applies one layout message.
    pub fn submit(&mut self, message: &InfoMessage) {
        match message {
            InfoMessage::LogicItemCreated { id } => {
                let key = self.next_logicitem_key;
                self.next_logicitem_key = key.successor();
                let previous = self.logicitem_keys.insert(*id, key);
                assert!(previous.is_none(), "logic item id already bound");
                self.logicitem_ids.insert(key, *id);
            }
            InfoMessage::LogicItemIdUpdated { new_id, old_id } => {
                let key = self
                    .logicitem_keys
                    .remove(old_id)
                    .expect("logic item id must be bound");
                let previous = self.logicitem_keys.insert(*new_id, key);
                assert!(previous.is_none(), "logic item id already bound");
                self.logicitem_ids.insert(key, *new_id);
            }
            InfoMessage::LogicItemDeleted { id } => {
                let key = self
                    .logicitem_keys
                    .remove(id)
                    .expect("logic item id must be bound");
                self.logicitem_ids.remove(&key);
            }

            InfoMessage::DecorationCreated { id } => {
                let key = self.next_decoration_key;
                self.next_decoration_key = key.successor();
                let previous = self.decoration_keys.insert(*id, key);
                assert!(previous.is_none(), "decoration id already bound");
                self.decoration_ids.insert(key, *id);
            }
            InfoMessage::DecorationIdUpdated { new_id, old_id } => {
                let key = self
                    .decoration_keys
                    .remove(old_id)
                    .expect("decoration id must be bound");
                let previous = self.decoration_keys.insert(*new_id, key);
                assert!(previous.is_none(), "decoration id already bound");
                self.decoration_ids.insert(key, *new_id);
            }
            InfoMessage::DecorationDeleted { id } => {
                let key = self
                    .decoration_keys
                    .remove(id)
                    .expect("decoration id must be bound");
                self.decoration_ids.remove(&key);
            }

            InfoMessage::SegmentCreated { segment, .. } => {
                let key = self.next_segment_key;
                self.next_segment_key = key.successor();
                let previous = self.segment_keys.insert(*segment, key);
                assert!(previous.is_none(), "segment already bound");
                self.segment_ids.insert(key, *segment);
            }
            InfoMessage::SegmentIdUpdated {
                new_segment,
                old_segment,
            } => {
                let key = self
                    .segment_keys
                    .remove(old_segment)
                    .expect("segment must be bound");
                let previous = self.segment_keys.insert(*new_segment, key);
                assert!(previous.is_none(), "segment already bound");
                self.segment_ids.insert(key, *new_segment);
            }
            InfoMessage::SegmentPartMoved {
                destination,
                source,
                create_destination,
                delete_source,
            } => {
                match (create_destination, delete_source) {
                    // Whole-segment move: the key follows the segment.
                    (true, true) => {
                        let key = self
                            .segment_keys
                            .remove(&source.segment)
                            .expect("segment must be bound");
                        let previous = self.segment_keys.insert(destination.segment, key);
                        assert!(previous.is_none(), "segment already bound");
                        self.segment_ids.insert(key, destination.segment);
                    }
                    // Split: the new segment gets a fresh key.
                    (true, false) => {
                        let key = self.next_segment_key;
                        self.next_segment_key = key.successor();
                        let previous = self.segment_keys.insert(destination.segment, key);
                        assert!(previous.is_none(), "segment already bound");
                        self.segment_ids.insert(key, destination.segment);
                    }
                    // Merge: the absorbed segment's key retires.
                    (false, true) => {
                        let key = self
                            .segment_keys
                            .remove(&source.segment)
                            .expect("segment must be bound");
                        self.segment_ids.remove(&key);
                    }
                    // Part shuffle between existing segments: keys unchanged.
                    (false, false) => {}
                }
            }
            InfoMessage::SegmentPartDeleted {
                segment_part,
                delete_segment,
            } => {
                if *delete_segment {
                    let key = self
                        .segment_keys
                        .remove(&segment_part.segment)
                        .expect("segment must be bound");
                    self.segment_ids.remove(&key);
                }
            }
            _ => {}
        }
    }

    /// Checks the class invariants and the id coverage against a layout.
    ///
    /// Every live dense id must be bound, both map directions must agree,
    /// and every counter must exceed every live key.
    #[must_use]
    pub fn is_consistent_with(&self, layout: &latchwork_layout::Layout) -> bool {
        let items_covered = layout.logicitems().ids().all(|id| {
            self.logicitem_keys
                .get(&id)
                .is_some_and(|key| self.logicitem_ids.get(key) == Some(&id))
        }) && self.logicitem_keys.len() == layout.logicitems().len();

        let decorations_covered = layout.decorations().ids().all(|id| {
            self.decoration_keys
                .get(&id)
                .is_some_and(|key| self.decoration_ids.get(key) == Some(&id))
        }) && self.decoration_keys.len() == layout.decorations().len();

        let segment_count: usize = layout
            .wires()
            .ids()
            .map(|wire| layout.wires().tree(wire).len())
            .sum();
        let segments_covered = layout.wires().ids().all(|wire| {
            layout.wires().tree(wire).indices().all(|index| {
                let segment = Segment::new(wire, index);
                self.segment_keys
                    .get(&segment)
                    .is_some_and(|key| self.segment_ids.get(key) == Some(&segment))
            })
        }) && self.segment_keys.len() == segment_count;

        let counters_ok = self
            .logicitem_keys
            .values()
            .all(|key| *key < self.next_logicitem_key)
            && self
                .decoration_keys
                .values()
                .all(|key| *key < self.next_decoration_key)
            && self
                .segment_keys
                .values()
                .all(|key| *key < self.next_segment_key);

        items_covered && decorations_covered && segments_covered && counters_ok
    }
}

#[cfg(test)]
mod tests {
    use latchwork_vocabulary::{Part, SegmentIndex, SegmentPart, WireId};

    use super::*;

    fn segment(wire: u32, index: u16) -> Segment {
        Segment::new(WireId::new(wire), SegmentIndex::new(index))
    }

    fn part_of(segment: Segment, begin: u16, end: u16) -> SegmentPart {
        SegmentPart::new(segment, Part::from_range(begin, end))
    }

    #[test]
    fn created_items_get_monotone_keys() {
        let mut index = KeyIndex::new();
        index.submit(&InfoMessage::LogicItemCreated {
            id: LogicItemId::new(0),
        });
        index.submit(&InfoMessage::LogicItemCreated {
            id: LogicItemId::new(1),
        });

        let first = index.logicitem_key(LogicItemId::new(0));
        let second = index.logicitem_key(LogicItemId::new(1));
        assert!(first < second);
        assert_eq!(index.logicitem_id(second), LogicItemId::new(1));
    }

    #[test]
    fn id_updates_retarget_keys() {
        let mut index = KeyIndex::new();
        index.submit(&InfoMessage::LogicItemCreated {
            id: LogicItemId::new(0),
        });
        let key = index.logicitem_key(LogicItemId::new(0));

        index.submit(&InfoMessage::LogicItemIdUpdated {
            new_id: LogicItemId::new(3),
            old_id: LogicItemId::new(0),
        });
        assert_eq!(index.logicitem_id(key), LogicItemId::new(3));
        assert!(index.try_logicitem_id(key).is_some());

        index.submit(&InfoMessage::LogicItemDeleted {
            id: LogicItemId::new(3),
        });
        assert!(index.try_logicitem_id(key).is_none());
    }

    #[test]
    fn set_key_advances_counter() {
        let mut index = KeyIndex::new();
        index.submit(&InfoMessage::DecorationCreated {
            id: DecorationId::new(0),
        });
        index.set_decoration_key(DecorationId::new(0), DecorationKey::new(100));

        index.submit(&InfoMessage::DecorationCreated {
            id: DecorationId::new(1),
        });
        let next = index.decoration_key(DecorationId::new(1));
        assert!(next > DecorationKey::new(100));
    }

    #[test]
    fn segment_keys_follow_moves() {
        let mut index = KeyIndex::new();
        let temporary = segment(0, 0);
        index.submit(&InfoMessage::SegmentCreated {
            segment: temporary,
            size: latchwork_vocabulary::Offset::new(4),
        });
        let key = index.segment_key(temporary);

        // Whole-segment move to an inserted tree keeps the key.
        let inserted = segment(2, 0);
        index.submit(&InfoMessage::SegmentPartMoved {
            destination: part_of(inserted, 0, 4),
            source: part_of(temporary, 0, 4),
            create_destination: true,
            delete_source: true,
        });
        assert_eq!(index.segment(key), inserted);

        // A split allocates a fresh key for the new segment.
        let tail = segment(2, 1);
        index.submit(&InfoMessage::SegmentPartMoved {
            destination: part_of(tail, 0, 2),
            source: part_of(inserted, 2, 4),
            create_destination: true,
            delete_source: false,
        });
        let tail_key = index.segment_key(tail);
        assert!(tail_key > key);

        // Merging retires the absorbed key.
        index.submit(&InfoMessage::SegmentPartMoved {
            destination: part_of(inserted, 2, 4),
            source: part_of(tail, 0, 2),
            create_destination: false,
            delete_source: true,
        });
        assert!(index.try_segment(tail_key).is_none());
        assert_eq!(index.segment(key), inserted);
    }
}
