// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A sorted, disjoint, non-adjacent list of parts.

use latchwork_vocabulary::{Offset, Part};
use smallvec::SmallVec;

/// A normalized set of offset ranges along one segment.
///
/// The list invariant: parts are sorted by `begin`, pairwise disjoint, and
/// never touching (touching ranges are merged on insertion). Every mutation
/// preserves the invariant, so consumers can treat the slice view as a
/// canonical form: two `PartVec`s are equal iff they cover the same offsets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PartVec {
    parts: SmallVec<[Part; 2]>,
}

impl PartVec {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list covering a single part.
    #[must_use]
    pub fn from_part(part: Part) -> Self {
        let mut parts = SmallVec::new();
        parts.push(part);
        Self { parts }
    }

    /// Whether no offsets are covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The normalized parts, sorted and disjoint.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Iterates over the normalized parts.
    pub fn iter(&self) -> core::slice::Iter<'_, Part> {
        self.parts.iter()
    }

    /// The exclusive upper bound of the covered offsets, if any.
    #[must_use]
    pub fn max_offset(&self) -> Option<Offset> {
        self.parts.last().map(|part| part.end)
    }

    /// Whether `part` is fully covered.
    #[must_use]
    pub fn contains(&self, part: Part) -> bool {
        self.parts.iter().any(|existing| existing.contains(part))
    }

    /// Whether any offset of `part` is covered.
    #[must_use]
    pub fn overlaps(&self, part: Part) -> bool {
        self.parts.iter().any(|existing| existing.overlaps(part))
    }

    /// Adds `part`, merging overlapping and touching neighbors.
    pub fn add(&mut self, part: Part) {
        let mut begin = part.begin;
        let mut end = part.end;

        // Absorb every existing range that overlaps or touches the new one.
        let mut index = 0;
        while index < self.parts.len() {
            let existing = self.parts[index];
            if existing.touches(part) {
                begin = begin.min(existing.begin);
                end = end.max(existing.end);
                self.parts.remove(index);
            } else {
                index += 1;
            }
        }

        let merged = Part::new(begin, end);
        let insert_at = self
            .parts
            .iter()
            .position(|existing| merged.begin < existing.begin)
            .unwrap_or(self.parts.len());
        self.parts.insert(insert_at, merged);
    }

    /// Removes `part`, splitting covering ranges as needed.
    pub fn remove(&mut self, part: Part) {
        let mut result: SmallVec<[Part; 2]> = SmallVec::new();

        for &existing in &self.parts {
            if !existing.overlaps(part) {
                result.push(existing);
                continue;
            }
            if existing.begin < part.begin {
                result.push(Part::new(existing.begin, part.begin));
            }
            if part.end < existing.end {
                result.push(Part::new(part.end, existing.end));
            }
        }

        self.parts = result;
    }

    /// Keeps the offsets below `offset` and returns the offsets at or above
    /// it, re-based so the cut point becomes offset zero.
    ///
    /// Used when a segment is split: the tail list belongs to the new
    /// segment, whose line starts at the cut point.
    #[must_use]
    pub fn split_off(&mut self, offset: Offset) -> Self {
        let mut head: SmallVec<[Part; 2]> = SmallVec::new();
        let mut tail: SmallVec<[Part; 2]> = SmallVec::new();

        for &existing in &self.parts {
            if existing.end <= offset {
                head.push(existing);
            } else if existing.begin >= offset {
                tail.push(Part::new(
                    Offset::new(existing.begin.get() - offset.get()),
                    Offset::new(existing.end.get() - offset.get()),
                ));
            } else {
                head.push(Part::new(existing.begin, offset));
                tail.push(Part::new(
                    Offset::new(0),
                    Offset::new(existing.end.get() - offset.get()),
                ));
            }
        }

        self.parts = head;
        Self { parts: tail }
    }

    /// Adds every part of `other`, shifted right by `offset`.
    ///
    /// Used when two segments merge: the second segment's list is appended
    /// behind the first segment's length.
    pub fn extend_shifted(&mut self, other: &Self, offset: Offset) {
        for &part in &other.parts {
            self.add(Part::new(
                Offset::new(part.begin.get() + offset.get()),
                Offset::new(part.end.get() + offset.get()),
            ));
        }
    }
}

impl<'a> IntoIterator for &'a PartVec {
    type Item = &'a Part;
    type IntoIter = core::slice::Iter<'a, Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(begin: u16, end: u16) -> Part {
        Part::from_range(begin, end)
    }

    #[test]
    fn add_merges_touching_ranges() {
        let mut parts = PartVec::new();
        parts.add(part(0, 2));
        parts.add(part(4, 6));
        assert_eq!(parts.parts(), [part(0, 2), part(4, 6)]);

        // Touching both neighbors collapses everything into one range.
        parts.add(part(2, 4));
        assert_eq!(parts.parts(), [part(0, 6)]);
    }

    #[test]
    fn add_merges_overlapping_ranges() {
        let mut parts = PartVec::new();
        parts.add(part(1, 3));
        parts.add(part(2, 5));
        assert_eq!(parts.parts(), [part(1, 5)]);
    }

    #[test]
    fn remove_splits_ranges() {
        let mut parts = PartVec::from_part(part(0, 10));
        parts.remove(part(3, 6));
        assert_eq!(parts.parts(), [part(0, 3), part(6, 10)]);

        parts.remove(part(0, 3));
        assert_eq!(parts.parts(), [part(6, 10)]);

        parts.remove(part(0, 16));
        assert!(parts.is_empty());
    }

    #[test]
    fn contains_and_overlaps() {
        let mut parts = PartVec::new();
        parts.add(part(2, 5));
        parts.add(part(7, 9));

        assert!(parts.contains(part(3, 5)));
        assert!(!parts.contains(part(4, 8)));
        assert!(parts.overlaps(part(4, 8)));
        assert!(!parts.overlaps(part(5, 7)));
    }

    #[test]
    fn split_off_rebases_tail() {
        let mut parts = PartVec::new();
        parts.add(part(1, 4));
        parts.add(part(6, 9));

        let tail = parts.split_off(Offset::new(3));
        assert_eq!(parts.parts(), [part(1, 3)]);
        assert_eq!(tail.parts(), [part(0, 1), part(3, 6)]);
    }

    #[test]
    fn extend_shifted_appends_behind_length() {
        let mut parts = PartVec::from_part(part(0, 2));
        let other = PartVec::from_part(part(1, 3));
        parts.extend_shifted(&other, Offset::new(5));
        assert_eq!(parts.parts(), [part(0, 2), part(6, 8)]);
    }
}
