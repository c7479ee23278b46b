// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-wire container of line segments.

use alloc::vec::Vec;

use latchwork_geometry::PartVec;
use latchwork_geometry::part::full_part;
use latchwork_vocabulary::{
    Endpoints, Offset, OrderedLine, Part, Point, SegmentIndex, SegmentInfo, SegmentPointType,
};

/// The segments of one wire, with per-endpoint types and per-segment
/// valid-parts.
///
/// For inserted wires the tree invariant holds: the segments form a connected,
/// acyclic graph, and the endpoint types of segments meeting at a shared point
/// agree (all `CrossPoint`, or one `CornerPoint` pair). The store does not
/// enforce connectivity; the editing layer establishes it and the index
/// layer's validation checks it.
///
/// Valid-parts mark sub-ranges that remain "valid" while an overlapping edit
/// (paste, move preview) is in flight; each list is kept sorted, disjoint,
/// and non-adjacent by [`PartVec`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentTree {
    infos: Vec<SegmentInfo>,
    valid_parts: Vec<PartVec>,
}

impl SegmentTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether the tree has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Whether `index` denotes a live segment.
    #[must_use]
    pub fn is_live(&self, index: SegmentIndex) -> bool {
        index.index() < self.infos.len()
    }

    /// Iterates over all segment indices in table order.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "segment counts are bounded by the u16 index space"
    )]
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = SegmentIndex> + use<> {
        (0..self.infos.len() as u16).map(SegmentIndex::new)
    }

    /// Iterates over all segment infos in table order.
    pub fn segments(&self) -> impl Iterator<Item = &SegmentInfo> {
        self.infos.iter()
    }

    /// Appends a segment and returns its index.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "segment counts are bounded by the u16 index space"
    )]
    pub fn add_segment(&mut self, info: SegmentInfo) -> SegmentIndex {
        assert!(
            self.infos.len() < usize::from(u16::MAX),
            "segment tree is full"
        );
        let index = SegmentIndex::new(self.infos.len() as u16);
        self.infos.push(info);
        self.valid_parts.push(PartVec::new());
        index
    }

    /// Removes a segment by swapping the last one into its slot.
    ///
    /// Returns the index of the segment that moved (the previously-last
    /// index), or `None` if the removed segment was last.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "segment counts are bounded by the u16 index space"
    )]
    pub fn remove_segment(&mut self, index: SegmentIndex) -> Option<SegmentIndex> {
        self.assert_live(index);
        let last = self.infos.len() - 1;

        self.infos.swap_remove(index.index());
        self.valid_parts.swap_remove(index.index());

        (index.index() != last).then(|| SegmentIndex::new(last as u16))
    }

    /// The segment's geometry and endpoint types.
    #[must_use]
    pub fn info(&self, index: SegmentIndex) -> SegmentInfo {
        self.assert_live(index);
        self.infos[index.index()]
    }

    /// The segment's line.
    #[must_use]
    pub fn line(&self, index: SegmentIndex) -> OrderedLine {
        self.info(index).line
    }

    /// The part covering the segment's full line.
    #[must_use]
    pub fn part(&self, index: SegmentIndex) -> Part {
        full_part(self.line(index))
    }

    /// Replaces the segment's geometry and endpoint types.
    ///
    /// The valid-parts list is *not* adjusted; callers that change the line
    /// are responsible for redistributing it.
    pub fn set_info(&mut self, index: SegmentIndex, info: SegmentInfo) {
        self.assert_live(index);
        self.infos[index.index()] = info;
    }

    /// Sets both endpoint types without touching the geometry.
    pub fn set_endpoints(&mut self, index: SegmentIndex, endpoints: Endpoints) {
        self.assert_live(index);
        let info = self.infos[index.index()];
        self.infos[index.index()] = info.with_endpoints(endpoints);
    }

    /// The valid sub-ranges of the segment.
    #[must_use]
    pub fn valid_parts(&self, index: SegmentIndex) -> &PartVec {
        self.assert_live(index);
        &self.valid_parts[index.index()]
    }

    /// Replaces the valid-parts list wholesale.
    ///
    /// Used when segment geometry changes and offsets must be rebased.
    pub fn set_valid_parts(&mut self, index: SegmentIndex, parts: PartVec) {
        self.assert_live(index);
        if let Some(max) = parts.max_offset() {
            assert!(
                max <= Offset::new(latchwork_geometry::line::distance(self.line(index))),
                "valid parts exceed the segment length"
            );
        }
        self.valid_parts[index.index()] = parts;
    }

    /// Marks `part` as valid, merging into the existing list.
    ///
    /// # Panics
    ///
    /// Panics if the part exceeds the segment length.
    pub fn mark_valid(&mut self, index: SegmentIndex, part: Part) {
        self.assert_live(index);
        assert!(
            self.part(index).contains(part),
            "valid part exceeds the segment length"
        );
        self.valid_parts[index.index()].add(part);
    }

    /// Unmarks `part`, splitting existing ranges as needed.
    pub fn unmark_valid(&mut self, index: SegmentIndex, part: Part) {
        self.assert_live(index);
        self.valid_parts[index.index()].remove(part);
    }

    /// Count of endpoints with the given type.
    #[must_use]
    pub fn count_endpoints(&self, point_type: SegmentPointType) -> usize {
        self.infos
            .iter()
            .map(|info| {
                usize::from(info.p0_type == point_type) + usize::from(info.p1_type == point_type)
            })
            .sum()
    }

    /// Count of `Input` endpoints; at most one on a consistent inserted tree.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.count_endpoints(SegmentPointType::Input)
    }

    /// Count of `Output` endpoints.
    #[must_use]
    pub fn output_count(&self) -> usize {
        self.count_endpoints(SegmentPointType::Output)
    }

    /// The position of the first `Input` endpoint, if any.
    #[must_use]
    pub fn first_input_position(&self) -> Option<Point> {
        self.infos.iter().find_map(|info| {
            if info.p0_type == SegmentPointType::Input {
                Some(info.line.p0)
            } else if info.p1_type == SegmentPointType::Input {
                Some(info.line.p1)
            } else {
                None
            }
        })
    }

    /// Total grid length of all segments.
    #[must_use]
    pub fn total_length(&self) -> u32 {
        self.infos
            .iter()
            .map(|info| u32::from(latchwork_geometry::line::distance(info.line)))
            .sum()
    }

    /// Heap bytes currently allocated by the tree.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        use core::mem::size_of;

        self.infos.capacity() * size_of::<SegmentInfo>()
            + self.valid_parts.capacity() * size_of::<PartVec>()
    }

    fn assert_live(&self, index: SegmentIndex) {
        assert!(self.is_live(index), "dead segment index {index}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(x0: i16, y0: i16, x1: i16, y1: i16) -> SegmentInfo {
        SegmentInfo::with_shadow_points(OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1)))
    }

    #[test]
    fn add_and_remove_with_swap() {
        let mut tree = SegmentTree::new();
        let a = tree.add_segment(info(0, 0, 4, 0));
        let b = tree.add_segment(info(4, 0, 4, 4));
        let c = tree.add_segment(info(4, 4, 8, 4));
        assert_eq!(tree.len(), 3);

        // Removing the first segment moves the last into its slot.
        let moved = tree.remove_segment(a);
        assert_eq!(moved, Some(c));
        assert_eq!(tree.line(a), OrderedLine::new(Point::new(4, 4), Point::new(8, 4)));

        // Removing the last segment moves nothing.
        assert_eq!(tree.remove_segment(b), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn valid_parts_stay_normalized() {
        let mut tree = SegmentTree::new();
        let index = tree.add_segment(info(0, 0, 10, 0));

        tree.mark_valid(index, Part::from_range(0, 3));
        tree.mark_valid(index, Part::from_range(3, 5));
        assert_eq!(tree.valid_parts(index).parts(), [Part::from_range(0, 5)]);

        tree.unmark_valid(index, Part::from_range(1, 2));
        assert_eq!(
            tree.valid_parts(index).parts(),
            [Part::from_range(0, 1), Part::from_range(2, 5)]
        );
    }

    #[test]
    #[should_panic(expected = "exceeds the segment length")]
    fn valid_part_must_fit_segment() {
        let mut tree = SegmentTree::new();
        let index = tree.add_segment(info(0, 0, 2, 0));
        tree.mark_valid(index, Part::from_range(0, 3));
    }

    #[test]
    fn endpoint_counting() {
        let mut tree = SegmentTree::new();
        let a = tree.add_segment(info(0, 0, 4, 0));
        tree.set_endpoints(
            a,
            Endpoints {
                p0: SegmentPointType::Input,
                p1: SegmentPointType::Output,
            },
        );
        let _ = tree.add_segment(info(4, 0, 8, 0));

        assert_eq!(tree.input_count(), 1);
        assert_eq!(tree.output_count(), 1);
        assert_eq!(tree.first_input_position(), Some(Point::new(0, 0)));
        assert_eq!(tree.total_length(), 8);
    }
}
