// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rubber-band selection: base selection plus rectangle operations.

use core::cell::{Ref, RefCell};

use latchwork_geometry::fine::{line_part_in_rect, RectFine};
use latchwork_index::{LayoutIndex, SpatialPayload};
use latchwork_layout::{InfoMessage, Layout};
use latchwork_vocabulary::{DecorationId, LogicItemId, SegmentPart};

use crate::Selection;

/// A borrowed view of a resolved visible selection.
///
/// Either the initial selection itself (no pending operations) or a guard
/// over the memoized resolution.
#[derive(Debug)]
pub enum ResolvedSelection<'a> {
    /// No operations were pending; the initial selection is the resolution.
    Direct(&'a Selection),
    /// The memoized resolution.
    Cached(Ref<'a, Selection>),
}

impl core::ops::Deref for ResolvedSelection<'_> {
    type Target = Selection;

    fn deref(&self) -> &Selection {
        match self {
            Self::Direct(selection) => selection,
            Self::Cached(guard) => guard,
        }
    }
}

/// Whether a rectangle operation adds to or subtracts from the selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectionFunction {
    /// Elements inside the rectangle join the selection.
    Add,
    /// Elements inside the rectangle leave the selection.
    Subtract,
}

/// One rectangle operation of a visible selection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisibleSelectionOperation {
    /// Add or subtract.
    pub function: SelectionFunction,
    /// The rectangle, in fine coordinates.
    pub rect: RectFine,
}

/// The selection the user sees: an initial selection composed with an
/// ordered list of rectangle operations.
///
/// Resolution folds the operations over the initial selection, querying the
/// spatial index per rectangle; the result is memoized until a structural
/// layout change could alter membership. The cache is interior state;
/// resolution works through a shared reference, and the cache is observable
/// only through the resolved selection itself.
#[derive(Debug, Default)]
pub struct VisibleSelection {
    initial_selection: Selection,
    operations: Vec<VisibleSelectionOperation>,
    cached_selection: RefCell<Option<Selection>>,
}

impl Clone for VisibleSelection {
    fn clone(&self) -> Self {
        Self {
            initial_selection: self.initial_selection.clone(),
            operations: self.operations.clone(),
            cached_selection: RefCell::new(self.cached_selection.borrow().clone()),
        }
    }
}

impl PartialEq for VisibleSelection {
    fn eq(&self, other: &Self) -> bool {
        // The cache is memoization state, not identity.
        self.initial_selection == other.initial_selection && self.operations == other.operations
    }
}

impl VisibleSelection {
    /// Creates an empty visible selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a visible selection from a base selection with no operations.
    #[must_use]
    pub fn from_selection(selection: Selection) -> Self {
        Self {
            initial_selection: selection,
            operations: Vec::new(),
            cached_selection: RefCell::new(None),
        }
    }

    /// Whether the base selection and operation list are both empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.initial_selection.is_empty() && self.operations.is_empty()
    }

    /// The pending rectangle operations.
    #[must_use]
    pub fn operations(&self) -> &[VisibleSelectionOperation] {
        &self.operations
    }

    /// The base selection the operations fold over.
    #[must_use]
    pub fn initial_selection(&self) -> &Selection {
        &self.initial_selection
    }

    /// Adds a logic item to the base selection.
    pub fn add_logicitem(&mut self, id: LogicItemId) {
        self.initial_selection.add_logicitem(id);
        self.invalidate();
    }

    /// Removes a logic item from the base selection.
    pub fn remove_logicitem(&mut self, id: LogicItemId) {
        self.initial_selection.remove_logicitem(id);
        self.invalidate();
    }

    /// Adds a decoration to the base selection.
    pub fn add_decoration(&mut self, id: DecorationId) {
        self.initial_selection.add_decoration(id);
        self.invalidate();
    }

    /// Removes a decoration from the base selection.
    pub fn remove_decoration(&mut self, id: DecorationId) {
        self.initial_selection.remove_decoration(id);
        self.invalidate();
    }

    /// Appends a rectangle operation.
    pub fn add(&mut self, function: SelectionFunction, rect: RectFine) {
        self.operations
            .push(VisibleSelectionOperation { function, rect });
        self.invalidate();
    }

    /// Replaces the rectangle of the last operation.
    ///
    /// This is the rubber-band update; it is a no-op without operations.
    pub fn update_last(&mut self, rect: RectFine) {
        if let Some(last) = self.operations.last_mut() {
            if last.rect == rect {
                return;
            }
            last.rect = rect;
            self.invalidate();
        }
    }

    /// Removes the last operation, if any.
    pub fn pop_last(&mut self) -> Option<VisibleSelectionOperation> {
        let popped = self.operations.pop();
        if popped.is_some() {
            self.invalidate();
        }
        popped
    }

    /// The resolved selection, memoized.
    ///
    /// Without operations this is the initial selection itself and no cache
    /// is created.
    pub fn selection<'a>(
        &'a self,
        layout: &Layout,
        index: &LayoutIndex,
    ) -> ResolvedSelection<'a> {
        if self.operations.is_empty() {
            return ResolvedSelection::Direct(&self.initial_selection);
        }

        {
            let mut cache = self.cached_selection.borrow_mut();
            if cache.is_none() {
                *cache = Some(self.resolve(layout, index));
            }
        }
        ResolvedSelection::Cached(Ref::map(self.cached_selection.borrow(), |cache| {
            cache.as_ref().expect("cache was just populated")
        }))
    }

    /// Folds all operations into the initial selection and clears the list.
    pub fn apply_all(&mut self, layout: &Layout, index: &LayoutIndex) {
        if self.operations.is_empty() {
            return;
        }
        self.initial_selection = self.resolve(layout, index);
        self.operations.clear();
        self.invalidate();
    }

    /// Applies one layout message.
    ///
    /// Id maintenance is forwarded to the base selection and to any cached
    /// resolution; structural changes that can alter rectangle membership
    /// drop the cache.
    pub fn submit(&mut self, message: &InfoMessage) {
        self.initial_selection.submit(message);
        if let Some(cached) = self.cached_selection.get_mut() {
            cached.submit(message);
        }

        if matches!(
            message,
            InfoMessage::LogicItemInserted { .. }
                | InfoMessage::LogicItemUninserted { .. }
                | InfoMessage::DecorationInserted { .. }
                | InfoMessage::DecorationUninserted { .. }
                | InfoMessage::SegmentInserted { .. }
                | InfoMessage::SegmentUninserted { .. }
                | InfoMessage::SegmentPartMoved { .. }
                | InfoMessage::SegmentPartDeleted { .. }
        ) {
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        *self.cached_selection.get_mut() = None;
    }

    fn resolve(&self, layout: &Layout, index: &LayoutIndex) -> Selection {
        let mut selection = self.initial_selection.clone();

        for operation in &self.operations {
            for payload in index.spatial().query_selection(operation.rect) {
                match (payload, operation.function) {
                    (SpatialPayload::LogicItem(id), SelectionFunction::Add) => {
                        selection.add_logicitem(id);
                    }
                    (SpatialPayload::LogicItem(id), SelectionFunction::Subtract) => {
                        selection.remove_logicitem(id);
                    }
                    (SpatialPayload::Decoration(id), SelectionFunction::Add) => {
                        selection.add_decoration(id);
                    }
                    (SpatialPayload::Decoration(id), SelectionFunction::Subtract) => {
                        selection.remove_decoration(id);
                    }
                    (SpatialPayload::Segment(segment), function) => {
                        let line = layout.wires().tree(segment.wire).line(segment.index);
                        let Some(part) = line_part_in_rect(line, operation.rect) else {
                            continue;
                        };
                        let segment_part = SegmentPart::new(segment, part);
                        match function {
                            SelectionFunction::Add => selection.add_segment(segment_part),
                            SelectionFunction::Subtract => selection.remove_segment(segment_part),
                        }
                    }
                }
            }
        }

        selection
    }
}

#[cfg(test)]
mod tests {
    use latchwork_layout::{LogicItemDefinition, SegmentTree};
    use latchwork_vocabulary::{
        DisplayState, LogicItemId, LogicItemType, OrderedLine, Part, Point, Segment, SegmentInfo,
    };

    use super::*;

    fn inserted_layout() -> Layout {
        let mut layout = Layout::new();
        layout.logicitems_mut().add(
            LogicItemDefinition::default_for(LogicItemType::AndElement),
            Point::new(0, 0),
            DisplayState::Normal,
        );
        let wire = layout.wires_mut().add_wire();
        let tree: &mut SegmentTree = layout.wires_mut().tree_mut(wire);
        tree.add_segment(SegmentInfo::with_shadow_points(OrderedLine::new(
            Point::new(0, 5),
            Point::new(10, 5),
        )));
        layout
    }

    #[test]
    fn rect_operations_compose() {
        let layout = inserted_layout();
        let index = LayoutIndex::from_layout(&layout);
        let mut visible = VisibleSelection::new();

        visible.add(SelectionFunction::Add, RectFine::new(-1.0, -1.0, 11.0, 6.0));
        {
            let resolved = visible.selection(&layout, &index);
            assert!(resolved.is_selected_logicitem(LogicItemId::new(0)));
            assert_eq!(resolved.segments().count(), 1);
        }

        visible.add(
            SelectionFunction::Subtract,
            RectFine::new(3.5, 4.0, 6.5, 6.0),
        );
        let resolved = visible.selection(&layout, &index);
        let segment = resolved.segments().next().map(|(segment, _)| segment);
        let parts = resolved.segment_parts(segment.unwrap()).unwrap();
        assert_eq!(
            parts.parts(),
            [Part::from_range(0, 3), Part::from_range(7, 10)]
        );
    }

    #[test]
    fn update_last_and_pop_mutate_the_tail() {
        let layout = inserted_layout();
        let index = LayoutIndex::from_layout(&layout);
        let mut visible = VisibleSelection::new();

        visible.add(SelectionFunction::Add, RectFine::new(0.0, 0.0, 1.0, 1.0));
        visible.update_last(RectFine::new(-1.0, -1.0, 2.5, 1.5));
        assert!(
            visible
                .selection(&layout, &index)
                .is_selected_logicitem(LogicItemId::new(0))
        );

        visible.pop_last();
        assert!(visible.selection(&layout, &index).is_empty());
        assert!(visible.operations().is_empty());
    }

    #[test]
    fn apply_all_folds_into_initial() {
        let layout = inserted_layout();
        let index = LayoutIndex::from_layout(&layout);
        let mut visible = VisibleSelection::new();

        visible.add(SelectionFunction::Add, RectFine::new(-1.0, -1.0, 2.5, 1.5));
        visible.apply_all(&layout, &index);
        assert!(visible.operations().is_empty());
        assert!(
            visible
                .initial_selection()
                .is_selected_logicitem(LogicItemId::new(0))
        );
    }

    #[test]
    fn structural_messages_invalidate_the_cache() {
        let layout = inserted_layout();
        let index = LayoutIndex::from_layout(&layout);
        let mut visible = VisibleSelection::new();
        visible.add(SelectionFunction::Add, RectFine::new(-1.0, -1.0, 11.0, 6.0));

        // Populate the cache, then pretend the segment was uninserted.
        let segment = {
            let resolved = visible.selection(&layout, &index);
            resolved.segments().next().map(|(segment, _)| segment)
        }
        .unwrap();

        let mut uninserted = layout.clone();
        let tree: &mut SegmentTree = uninserted.wires_mut().tree_mut(segment.wire);
        let info = tree.info(segment.index);
        tree.remove_segment(segment.index);
        let shrunk_index = LayoutIndex::from_layout(&uninserted);

        visible.submit(&InfoMessage::SegmentUninserted { segment, info });
        let resolved = visible.selection(&uninserted, &shrunk_index);
        assert_eq!(resolved.segments().count(), 0);
    }
}
