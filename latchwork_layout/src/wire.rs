// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dense wire table.

use alloc::vec::Vec;

use latchwork_vocabulary::WireId;

use crate::segment_tree::SegmentTree;

/// Dense table of wires, each owning one [`SegmentTree`].
///
/// Slots 0 and 1 are reserved ([`WireId::TEMPORARY`], [`WireId::COLLIDING`])
/// and exist from construction; they are never deleted. Inserted wire trees
/// occupy the slots from [`WireId::FIRST_INSERTED`] upward and are recycled
/// with swap-and-pop like every other dense table.
#[derive(Clone, Debug, PartialEq)]
pub struct WireStore {
    trees: Vec<SegmentTree>,
}

impl Default for WireStore {
    fn default() -> Self {
        Self {
            trees: alloc::vec![SegmentTree::new(), SegmentTree::new()],
        }
    }
}

impl WireStore {
    /// Number of wire slots, reserved ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether no segments exist anywhere, reserved trees included.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.iter().all(SegmentTree::is_empty)
    }

    /// Whether `id` denotes a live slot.
    #[must_use]
    pub fn is_live(&self, id: WireId) -> bool {
        id.index() < self.trees.len()
    }

    /// Iterates over all wire ids, reserved ones included.
    pub fn ids(&self) -> impl Iterator<Item = WireId> {
        (0..self.trees.len() as u32).map(WireId::new)
    }

    /// Iterates over the inserted wire ids.
    pub fn inserted_ids(&self) -> impl Iterator<Item = WireId> {
        (WireId::FIRST_INSERTED.get()..self.trees.len() as u32).map(WireId::new)
    }

    /// Appends an empty inserted wire tree and returns its id.
    pub fn add_wire(&mut self) -> WireId {
        let id = WireId::new(self.trees.len() as u32);
        self.trees.push(SegmentTree::new());
        id
    }

    /// Removes an inserted wire by swapping the last slot into its place.
    ///
    /// Returns the previously-last id if a slot moved.
    ///
    /// # Panics
    ///
    /// Panics on a reserved id or when the tree is not empty; wires are
    /// deleted only after their segments have been moved out.
    pub fn swap_delete(&mut self, id: WireId) -> Option<WireId> {
        self.assert_live(id);
        assert!(id.is_inserted(), "reserved wires cannot be deleted");
        assert!(
            self.trees[id.index()].is_empty(),
            "only empty wires can be deleted"
        );
        let last = self.trees.len() - 1;

        self.trees.swap_remove(id.index());

        (id.index() != last).then(|| WireId::new(last as u32))
    }

    /// The wire's segment tree.
    #[must_use]
    pub fn tree(&self, id: WireId) -> &SegmentTree {
        self.assert_live(id);
        &self.trees[id.index()]
    }

    /// The wire's segment tree, mutable.
    pub fn tree_mut(&mut self, id: WireId) -> &mut SegmentTree {
        self.assert_live(id);
        &mut self.trees[id.index()]
    }

    /// Two trees from distinct slots, both mutable.
    ///
    /// # Panics
    ///
    /// Panics if the ids are equal or dead.
    pub fn two_trees_mut(
        &mut self,
        a: WireId,
        b: WireId,
    ) -> (&mut SegmentTree, &mut SegmentTree) {
        self.assert_live(a);
        self.assert_live(b);
        assert!(a != b, "tree pair must be distinct");

        if a.index() < b.index() {
            let (head, tail) = self.trees.split_at_mut(b.index());
            (&mut head[a.index()], &mut tail[0])
        } else {
            let (head, tail) = self.trees.split_at_mut(a.index());
            (&mut tail[0], &mut head[b.index()])
        }
    }

    /// Heap bytes currently allocated by the table.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.trees.capacity() * core::mem::size_of::<SegmentTree>()
            + self
                .trees
                .iter()
                .map(SegmentTree::allocated_size)
                .sum::<usize>()
    }

    fn assert_live(&self, id: WireId) {
        assert!(self.is_live(id), "dead wire id {id}");
    }
}

#[cfg(test)]
mod tests {
    use latchwork_vocabulary::{OrderedLine, Point, SegmentInfo};

    use super::*;

    #[test]
    fn reserved_slots_exist_from_construction() {
        let store = WireStore::default();
        assert_eq!(store.len(), 2);
        assert!(store.is_empty());
        assert_eq!(store.inserted_ids().count(), 0);
    }

    #[test]
    fn add_and_swap_delete() {
        let mut store = WireStore::default();
        let a = store.add_wire();
        let b = store.add_wire();
        assert_eq!(a, WireId::FIRST_INSERTED);

        let line = OrderedLine::new(Point::new(0, 0), Point::new(2, 0));
        store
            .tree_mut(b)
            .add_segment(SegmentInfo::with_shadow_points(line));

        let moved = store.swap_delete(a);
        assert_eq!(moved, Some(b));
        assert_eq!(store.tree(a).len(), 1);
    }

    #[test]
    #[should_panic(expected = "reserved wires cannot be deleted")]
    fn reserved_wires_are_not_deletable() {
        WireStore::default().swap_delete(WireId::TEMPORARY);
    }

    #[test]
    fn two_trees_mut_returns_distinct_borrows() {
        let mut store = WireStore::default();
        let a = store.add_wire();
        let line = OrderedLine::new(Point::new(0, 0), Point::new(2, 0));

        let (temporary, inserted) = store.two_trees_mut(WireId::TEMPORARY, a);
        temporary.add_segment(SegmentInfo::with_shadow_points(line));
        assert!(inserted.is_empty());
        assert_eq!(store.tree(WireId::TEMPORARY).len(), 1);
    }
}
