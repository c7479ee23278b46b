// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rectangle-keyed index of inserted items for area and point queries.
//!
//! Every inserted logic item, decoration, and segment contributes one entry
//! keyed by its padded selection rectangle. The backend is a uniform grid:
//! entries are bucketed into fixed-size cells and queries touch only the
//! cells overlapping the query primitive, which suits the editor's workload:
//! roughly uniform density in screen space and small query rectangles.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use latchwork_geometry::fine::{
    body_selection_rect, line_selection_rect, point_fine, PointFine, RectFine,
};
use latchwork_layout::shape::bounding_rect;
use latchwork_layout::InfoMessage;
use latchwork_vocabulary::{DecorationId, LogicItemId, Point, Segment};

/// What an index entry refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpatialPayload {
    /// An inserted logic item.
    LogicItem(LogicItemId),
    /// An inserted decoration.
    Decoration(DecorationId),
    /// An inserted wire segment.
    Segment(Segment),
}

/// Grid cell edge length in fine units.
///
/// Selection rectangles are a few grid units across; 16 keeps the per-entry
/// cell count at one for typical elements while bounding the slots scanned
/// per query cell.
const CELL_SIZE: f64 = 16.0;

type CellCoord = (i32, i32);

#[derive(Clone, Debug)]
struct SlotEntry {
    rect: RectFine,
    payload: SpatialPayload,
    cells: SmallVec<[CellCoord; 4]>,
}

/// The spatial index.
///
/// Entries are immutable-payload: a dense-id change is modeled as a
/// retargeting of the payload while the rectangle stays put; a geometry
/// change is remove-then-insert, which the message protocol already
/// guarantees (uninsert precedes re-insert).
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex {
    slots: Vec<Option<SlotEntry>>,
    free_list: Vec<usize>,
    cells: HashMap<CellCoord, SmallVec<[usize; 8]>>,
    by_payload: HashMap<SpatialPayload, usize>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_payload.len()
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_payload.is_empty()
    }

    /// All payloads whose selection rectangle intersects `rect`.
    ///
    /// The corners of `rect` may be unordered; the order of results is
    /// unspecified but deterministic for a fixed index state.
    #[must_use]
    pub fn query_selection(&self, rect: RectFine) -> Vec<SpatialPayload> {
        let rect = rect.abs();
        let mut seen: HashSet<usize> = HashSet::new();
        let mut result = Vec::new();

        let (ix0, ix1) = cell_range(rect.x0, rect.x1);
        let (iy0, iy1) = cell_range(rect.y0, rect.y1);
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                let Some(cell) = self.cells.get(&(ix, iy)) else {
                    continue;
                };
                for &slot in cell {
                    if !seen.insert(slot) {
                        continue;
                    }
                    let entry = self.slot_entry(slot);
                    if rects_overlap(&entry.rect, &rect) {
                        result.push(entry.payload);
                    }
                }
            }
        }
        result
    }

    /// Whether any entry's selection rectangle contains `point`.
    #[must_use]
    pub fn has_element(&self, point: PointFine) -> bool {
        let cell = (cell_coord(point.x), cell_coord(point.y));
        self.cells.get(&cell).is_some_and(|slots| {
            slots.iter().any(|&slot| {
                let entry = self.slot_entry(slot);
                entry.rect.contains(point)
            })
        })
    }

    /// Up to four distinct segments whose line touches the grid point.
    ///
    /// Used to resolve what was clicked when a wire vertex is hit; logic
    /// items and decorations are filtered out. On a consistent layout at
    /// most four segments can meet at a point, one per direction.
    #[must_use]
    pub fn query_line_segments(&self, point: Point) -> SmallVec<[Segment; 4]> {
        let fine = point_fine(point);
        let cell = (cell_coord(fine.x), cell_coord(fine.y));
        let mut result: SmallVec<[Segment; 4]> = SmallVec::new();

        if let Some(slots) = self.cells.get(&cell) {
            for &slot in slots {
                let entry = self.slot_entry(slot);
                if let SpatialPayload::Segment(segment) = entry.payload
                    && entry.rect.contains(fine)
                    && !result.contains(&segment)
                {
                    assert!(result.len() < 4, "more than four segments at {point}");
                    result.push(segment);
                }
            }
        }
        result
    }

    /// Heap bytes currently allocated by the backend.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        use core::mem::size_of;

        self.slots.capacity() * size_of::<Option<SlotEntry>>()
            + self.free_list.capacity() * size_of::<usize>()
            + self
                .cells
                .capacity()
                .saturating_mul(size_of::<CellCoord>() + size_of::<SmallVec<[usize; 8]>>())
            + self
                .by_payload
                .capacity()
                .saturating_mul(size_of::<SpatialPayload>() + size_of::<usize>())
    }

    /// Applies one layout message.
    pub fn submit(&mut self, message: &InfoMessage) {
        match message {
            InfoMessage::LogicItemInserted { id, data } => {
                let rect = body_selection_rect(bounding_rect(data));
                self.insert(SpatialPayload::LogicItem(*id), rect);
            }
            InfoMessage::InsertedLogicItemIdUpdated { new_id, old_id, .. } => {
                self.retarget(
                    SpatialPayload::LogicItem(*old_id),
                    SpatialPayload::LogicItem(*new_id),
                );
            }
            InfoMessage::LogicItemUninserted { id, .. } => {
                self.remove(SpatialPayload::LogicItem(*id));
            }
            InfoMessage::DecorationInserted { id, data } => {
                let rect = body_selection_rect(data.bounding_rect());
                self.insert(SpatialPayload::Decoration(*id), rect);
            }
            InfoMessage::InsertedDecorationIdUpdated { new_id, old_id, .. } => {
                self.retarget(
                    SpatialPayload::Decoration(*old_id),
                    SpatialPayload::Decoration(*new_id),
                );
            }
            InfoMessage::DecorationUninserted { id, .. } => {
                self.remove(SpatialPayload::Decoration(*id));
            }
            InfoMessage::SegmentInserted { segment, info } => {
                let rect = line_selection_rect(info.line);
                self.insert(SpatialPayload::Segment(*segment), rect);
            }
            InfoMessage::InsertedSegmentIdUpdated {
                new_segment,
                old_segment,
                ..
            } => {
                self.retarget(
                    SpatialPayload::Segment(*old_segment),
                    SpatialPayload::Segment(*new_segment),
                );
            }
            InfoMessage::SegmentUninserted { segment, .. } => {
                self.remove(SpatialPayload::Segment(*segment));
            }
            _ => {}
        }
    }

    fn insert(&mut self, payload: SpatialPayload, rect: RectFine) {
        assert!(
            !self.by_payload.contains_key(&payload),
            "duplicate spatial entry"
        );

        let slot = if let Some(slot) = self.free_list.pop() {
            slot
        } else {
            self.slots.push(None);
            self.slots.len() - 1
        };

        let cells = covered_cells(&rect);
        for &cell in &cells {
            self.cells.entry(cell).or_default().push(slot);
        }
        self.slots[slot] = Some(SlotEntry {
            rect,
            payload,
            cells,
        });
        self.by_payload.insert(payload, slot);
    }

    fn remove(&mut self, payload: SpatialPayload) {
        let slot = self
            .by_payload
            .remove(&payload)
            .expect("spatial entry must be present");
        let entry = self.slots[slot]
            .take()
            .expect("spatial slot must be occupied");

        for cell in &entry.cells {
            let bucket = self
                .cells
                .get_mut(cell)
                .expect("spatial cell must be present");
            let position = bucket
                .iter()
                .position(|&s| s == slot)
                .expect("slot must be listed in its cell");
            bucket.swap_remove(position);
            if bucket.is_empty() {
                // Dropping empty cells keeps the map compact for sparse grids.
                self.cells.remove(cell);
            }
        }
        self.free_list.push(slot);
    }

    fn retarget(&mut self, old_payload: SpatialPayload, new_payload: SpatialPayload) {
        let slot = self
            .by_payload
            .remove(&old_payload)
            .expect("spatial entry must be present");
        let entry = self.slots[slot]
            .as_mut()
            .expect("spatial slot must be occupied");
        entry.payload = new_payload;
        let previous = self.by_payload.insert(new_payload, slot);
        assert!(previous.is_none(), "duplicate spatial entry");
    }

    fn slot_entry(&self, slot: usize) -> &SlotEntry {
        self.slots
            .get(slot)
            .expect("cell references out-of-bounds slot")
            .as_ref()
            .expect("cell references vacant slot")
    }
}

/// Entries compare by their payload-to-rectangle mapping; the bucketing is an
/// implementation detail.
impl PartialEq for SpatialIndex {
    fn eq(&self, other: &Self) -> bool {
        if self.by_payload.len() != other.by_payload.len() {
            return false;
        }
        self.by_payload.iter().all(|(payload, &slot)| {
            let rect = self.slot_entry(slot).rect;
            other
                .by_payload
                .get(payload)
                .is_some_and(|&other_slot| other.slot_entry(other_slot).rect == rect)
        })
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "fine coordinates derive from the 16-bit grid and fit i32 cells"
)]
fn cell_coord(value: f64) -> i32 {
    (value / CELL_SIZE).floor() as i32
}

fn cell_range(min: f64, max: f64) -> (i32, i32) {
    let c0 = cell_coord(min);
    let c1 = cell_coord(max);
    if c0 <= c1 { (c0, c1) } else { (c1, c0) }
}

fn covered_cells(rect: &RectFine) -> SmallVec<[CellCoord; 4]> {
    let (ix0, ix1) = cell_range(rect.x0, rect.x1);
    let (iy0, iy1) = cell_range(rect.y0, rect.y1);
    let mut cells = SmallVec::new();
    for ix in ix0..=ix1 {
        for iy in iy0..=iy1 {
            cells.push((ix, iy));
        }
    }
    cells
}

/// Closed-edge overlap test; shared edges count as intersecting.
fn rects_overlap(a: &RectFine, b: &RectFine) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

#[cfg(test)]
mod tests {
    use latchwork_layout::LogicItemLayoutData;
    use latchwork_vocabulary::{
        LogicItemType, Orientation, OrderedLine, SegmentIndex, SegmentInfo, WireId,
    };

    use super::*;

    fn and_message(id: u32, x: i16, y: i16) -> InfoMessage {
        InfoMessage::LogicItemInserted {
            id: LogicItemId::new(id),
            data: LogicItemLayoutData {
                item_type: LogicItemType::AndElement,
                input_count: 2,
                output_count: 1,
                position: Point::new(x, y),
                orientation: Orientation::Right,
            },
        }
    }

    fn segment_message(wire: u32, index: u16, x0: i16, y0: i16, x1: i16, y1: i16) -> InfoMessage {
        InfoMessage::SegmentInserted {
            segment: Segment::new(WireId::new(wire), SegmentIndex::new(index)),
            info: SegmentInfo::with_shadow_points(OrderedLine::new(
                Point::new(x0, y0),
                Point::new(x1, y1),
            )),
        }
    }

    #[test]
    fn point_and_rect_queries() {
        let mut index = SpatialIndex::new();
        index.submit(&and_message(0, 0, 0));
        index.submit(&segment_message(2, 0, 5, 5, 9, 5));

        assert!(index.has_element(PointFine::new(1.0, 0.5)));
        assert!(index.has_element(PointFine::new(7.0, 5.1)));
        assert!(!index.has_element(PointFine::new(3.9, 3.9)));

        let hits = index.query_selection(RectFine::new(-1.0, -1.0, 10.0, 10.0));
        assert_eq!(hits.len(), 2);

        let hits = index.query_selection(RectFine::new(6.0, 4.0, 8.0, 6.0));
        assert_eq!(
            hits,
            [SpatialPayload::Segment(Segment::new(
                WireId::new(2),
                SegmentIndex::new(0)
            ))]
        );
    }

    #[test]
    fn line_segment_queries_filter_items() {
        let mut index = SpatialIndex::new();
        index.submit(&and_message(0, 4, 4));
        index.submit(&segment_message(2, 0, 0, 4, 4, 4));
        index.submit(&segment_message(2, 1, 4, 0, 4, 4));

        let segments = index.query_line_segments(Point::new(4, 4));
        assert_eq!(segments.len(), 2);
        assert!(segments.contains(&Segment::new(WireId::new(2), SegmentIndex::new(0))));
        assert!(segments.contains(&Segment::new(WireId::new(2), SegmentIndex::new(1))));

        assert!(index.query_line_segments(Point::new(2, 0)).is_empty());
    }

    #[test]
    fn uninsert_and_retarget() {
        let mut index = SpatialIndex::new();
        index.submit(&and_message(0, 0, 0));
        index.submit(&InfoMessage::InsertedLogicItemIdUpdated {
            new_id: LogicItemId::new(5),
            old_id: LogicItemId::new(0),
            data: LogicItemLayoutData {
                item_type: LogicItemType::AndElement,
                input_count: 2,
                output_count: 1,
                position: Point::new(0, 0),
                orientation: Orientation::Right,
            },
        });

        let hits = index.query_selection(RectFine::new(0.0, 0.0, 2.0, 1.0));
        assert_eq!(hits, [SpatialPayload::LogicItem(LogicItemId::new(5))]);

        index.submit(&InfoMessage::LogicItemUninserted {
            id: LogicItemId::new(5),
            data: LogicItemLayoutData {
                item_type: LogicItemType::AndElement,
                input_count: 2,
                output_count: 1,
                position: Point::new(0, 0),
                orientation: Orientation::Right,
            },
        });
        assert!(index.is_empty());
    }
}
