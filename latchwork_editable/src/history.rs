// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The undo/redo log of semantic edits.
//!
//! Each entry is the *inverse* of one primitive: executing it on the layout
//! reverses exactly the edit that pushed it. Entries live in one tag vector;
//! their payloads live in parallel vectors, one per payload type, each
//! holding exactly as many values as entries of its tag appear. Pushing and
//! popping therefore always touch the tag vector plus the payload vectors of
//! that tag, in stack order.
//!
//! Grouping: user-visible operations delimit groups with [`HistoryStack::push_new_group`];
//! compound edits (a paste of N elements) sit between a single pair of
//! boundaries so one undo reverses the whole group.

use latchwork_geometry::fine::RectFine;
use latchwork_vocabulary::{
    ClockAttrs, DecorationKey, LogicItemKey, MoveDelta, OrderedLine, SegmentKey, TextAttrs,
};

use crate::placed::{PlacedDecoration, PlacedLogicItem};
use crate::visible_selection::VisibleSelectionOperation;
use crate::StableSelection;

/// Tag of one history entry.
///
/// The name describes the inverse operation the entry performs when popped
/// during undo; `LogicItemToModeInsert` re-inserts an item that the recorded
/// edit had uninserted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HistoryEntry {
    /// Group boundary.
    NewGroup,

    /// Re-create a deleted temporary logic item.
    LogicItemCreateTemporary,
    /// Delete a created temporary logic item.
    LogicItemDeleteTemporary,
    /// Bring a logic item back to the temporary mode.
    LogicItemToModeTemporary,
    /// Bring a logic item back to the colliding mode.
    LogicItemToModeColliding,
    /// Re-insert a logic item.
    LogicItemToModeInsert,
    /// Move a temporary logic item back.
    LogicItemMoveTemporary,
    /// Restore a logic item's attributes.
    LogicItemChangeAttributes,
    /// Restore a logic item's input count.
    LogicItemResize,
    /// Re-add a logic item to the visible selection.
    LogicItemAddVisibleSelection,
    /// Remove a logic item from the visible selection.
    LogicItemRemoveVisibleSelection,

    /// Re-create a deleted temporary decoration.
    DecorationCreateTemporary,
    /// Delete a created temporary decoration.
    DecorationDeleteTemporary,
    /// Bring a decoration back to the temporary mode.
    DecorationToModeTemporary,
    /// Bring a decoration back to the colliding mode.
    DecorationToModeColliding,
    /// Re-insert a decoration.
    DecorationToModeInsert,
    /// Move a temporary decoration back.
    DecorationMoveTemporary,
    /// Restore a decoration's attributes.
    DecorationChangeAttributes,
    /// Re-add a decoration to the visible selection.
    DecorationAddVisibleSelection,
    /// Remove a decoration from the visible selection.
    DecorationRemoveVisibleSelection,

    /// Re-create a deleted temporary wire segment.
    WireCreateTemporary,
    /// Delete a created temporary wire segment.
    WireDeleteTemporary,
    /// Bring a wire segment back to the temporary mode.
    WireToModeTemporary,
    /// Bring a wire segment back to the colliding mode.
    WireToModeColliding,
    /// Re-insert a wire segment.
    WireToModeInsert,
    /// Move a temporary wire segment back.
    WireMoveTemporary,

    /// Clear the visible selection.
    VisibleSelectionClear,
    /// Restore a saved visible selection.
    VisibleSelectionSet,
    /// Re-append a popped rectangle operation.
    VisibleSelectionAddOperation,
    /// Restore the previous rectangle of the last operation.
    VisibleSelectionUpdateLast,
    /// Pop the last rectangle operation.
    VisibleSelectionPopLast,
}

/// Whether undo and redo are currently available; consumed by UI layers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryStatus {
    /// An undo group is available.
    pub undo_available: bool,
    /// A redo group is available.
    pub redo_available: bool,
}

/// One direction of the history: a tag stack plus parallel payload stacks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,

    logicitem_keys: Vec<LogicItemKey>,
    placed_logicitems: Vec<PlacedLogicItem>,
    decoration_keys: Vec<DecorationKey>,
    placed_decorations: Vec<PlacedDecoration>,
    segment_keys: Vec<SegmentKey>,
    lines: Vec<OrderedLine>,
    move_deltas: Vec<MoveDelta>,
    clock_attrs: Vec<ClockAttrs>,
    text_attrs: Vec<TextAttrs>,
    resize_deltas: Vec<i8>,
    selections: Vec<StableSelection>,
    selection_operations: Vec<VisibleSelectionOperation>,
    selection_rects: Vec<RectFine>,
}

impl HistoryStack {
    /// Whether no entries are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded entries, group boundaries included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Discards all entries and payloads.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The topmost entry, if any.
    #[must_use]
    pub fn top_entry(&self) -> Option<HistoryEntry> {
        self.entries.last().copied()
    }

    /// All entries, bottom to top.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Pushes a group boundary unless the top already is one.
    ///
    /// Returns whether a boundary was pushed.
    pub fn push_new_group(&mut self) -> bool {
        if self.top_entry() == Some(HistoryEntry::NewGroup) {
            return false;
        }
        self.entries.push(HistoryEntry::NewGroup);
        true
    }

    /// Removes a trailing group boundary, if present.
    pub fn pop_new_group(&mut self) {
        if self.top_entry() == Some(HistoryEntry::NewGroup) {
            self.entries.pop();
        }
    }

    //
    // Logic items
    //

    /// Records: re-create this temporary logic item on undo.
    pub fn push_logicitem_create_temporary(&mut self, key: LogicItemKey, placed: PlacedLogicItem) {
        self.entries.push(HistoryEntry::LogicItemCreateTemporary);
        self.logicitem_keys.push(key);
        self.placed_logicitems.push(placed);
    }

    /// Records: delete this temporary logic item on undo.
    pub fn push_logicitem_delete_temporary(&mut self, key: LogicItemKey) {
        self.entries.push(HistoryEntry::LogicItemDeleteTemporary);
        self.logicitem_keys.push(key);
    }

    /// Records: return this logic item to temporary mode on undo.
    pub fn push_logicitem_to_mode_temporary(&mut self, key: LogicItemKey) {
        self.entries.push(HistoryEntry::LogicItemToModeTemporary);
        self.logicitem_keys.push(key);
    }

    /// Records: return this logic item to colliding mode on undo.
    pub fn push_logicitem_to_mode_colliding(&mut self, key: LogicItemKey) {
        self.entries.push(HistoryEntry::LogicItemToModeColliding);
        self.logicitem_keys.push(key);
    }

    /// Records: re-insert this logic item on undo.
    pub fn push_logicitem_to_mode_insert(&mut self, key: LogicItemKey) {
        self.entries.push(HistoryEntry::LogicItemToModeInsert);
        self.logicitem_keys.push(key);
    }

    /// Records: move this temporary logic item by `delta` on undo.
    pub fn push_logicitem_move_temporary(&mut self, key: LogicItemKey, delta: MoveDelta) {
        self.entries.push(HistoryEntry::LogicItemMoveTemporary);
        self.logicitem_keys.push(key);
        self.move_deltas.push(delta);
    }

    /// Records: restore these attributes on undo.
    pub fn push_logicitem_change_attributes(&mut self, key: LogicItemKey, attrs: ClockAttrs) {
        self.entries.push(HistoryEntry::LogicItemChangeAttributes);
        self.logicitem_keys.push(key);
        self.clock_attrs.push(attrs);
    }

    /// Records: resize this logic item by `delta` inputs on undo.
    pub fn push_logicitem_resize(&mut self, key: LogicItemKey, delta: i8) {
        self.entries.push(HistoryEntry::LogicItemResize);
        self.logicitem_keys.push(key);
        self.resize_deltas.push(delta);
    }

    /// Records: re-add this logic item to the visible selection on undo.
    pub fn push_logicitem_add_visible_selection(&mut self, key: LogicItemKey) {
        self.entries.push(HistoryEntry::LogicItemAddVisibleSelection);
        self.logicitem_keys.push(key);
    }

    /// Records: remove this logic item from the visible selection on undo.
    pub fn push_logicitem_remove_visible_selection(&mut self, key: LogicItemKey) {
        self.entries
            .push(HistoryEntry::LogicItemRemoveVisibleSelection);
        self.logicitem_keys.push(key);
    }

    /// Pops a [`HistoryEntry::LogicItemCreateTemporary`] entry.
    pub fn pop_logicitem_create_temporary(&mut self) -> (LogicItemKey, PlacedLogicItem) {
        self.pop_expecting(HistoryEntry::LogicItemCreateTemporary);
        (
            pop_payload(&mut self.logicitem_keys),
            pop_payload(&mut self.placed_logicitems),
        )
    }

    /// Pops a [`HistoryEntry::LogicItemDeleteTemporary`] entry.
    pub fn pop_logicitem_delete_temporary(&mut self) -> LogicItemKey {
        self.pop_expecting(HistoryEntry::LogicItemDeleteTemporary);
        pop_payload(&mut self.logicitem_keys)
    }

    /// Pops one of the three logic-item mode entries.
    pub fn pop_logicitem_to_mode(&mut self) -> (LogicItemKey, HistoryEntry) {
        let entry = self.entries.pop().expect("history stack must not be empty");
        assert!(
            matches!(
                entry,
                HistoryEntry::LogicItemToModeTemporary
                    | HistoryEntry::LogicItemToModeColliding
                    | HistoryEntry::LogicItemToModeInsert
            ),
            "top entry is not a logic item mode entry"
        );
        (pop_payload(&mut self.logicitem_keys), entry)
    }

    /// Pops a [`HistoryEntry::LogicItemMoveTemporary`] entry.
    pub fn pop_logicitem_move_temporary(&mut self) -> (LogicItemKey, MoveDelta) {
        self.pop_expecting(HistoryEntry::LogicItemMoveTemporary);
        (
            pop_payload(&mut self.logicitem_keys),
            pop_payload(&mut self.move_deltas),
        )
    }

    /// Pops a [`HistoryEntry::LogicItemChangeAttributes`] entry.
    pub fn pop_logicitem_change_attributes(&mut self) -> (LogicItemKey, ClockAttrs) {
        self.pop_expecting(HistoryEntry::LogicItemChangeAttributes);
        (
            pop_payload(&mut self.logicitem_keys),
            pop_payload(&mut self.clock_attrs),
        )
    }

    /// Pops a [`HistoryEntry::LogicItemResize`] entry.
    pub fn pop_logicitem_resize(&mut self) -> (LogicItemKey, i8) {
        self.pop_expecting(HistoryEntry::LogicItemResize);
        (
            pop_payload(&mut self.logicitem_keys),
            pop_payload(&mut self.resize_deltas),
        )
    }

    /// Pops a [`HistoryEntry::LogicItemAddVisibleSelection`] entry.
    pub fn pop_logicitem_add_visible_selection(&mut self) -> LogicItemKey {
        self.pop_expecting(HistoryEntry::LogicItemAddVisibleSelection);
        pop_payload(&mut self.logicitem_keys)
    }

    /// Pops a [`HistoryEntry::LogicItemRemoveVisibleSelection`] entry.
    pub fn pop_logicitem_remove_visible_selection(&mut self) -> LogicItemKey {
        self.pop_expecting(HistoryEntry::LogicItemRemoveVisibleSelection);
        pop_payload(&mut self.logicitem_keys)
    }

    //
    // Decorations
    //

    /// Records: re-create this temporary decoration on undo.
    pub fn push_decoration_create_temporary(
        &mut self,
        key: DecorationKey,
        placed: PlacedDecoration,
    ) {
        self.entries.push(HistoryEntry::DecorationCreateTemporary);
        self.decoration_keys.push(key);
        self.placed_decorations.push(placed);
    }

    /// Records: delete this temporary decoration on undo.
    pub fn push_decoration_delete_temporary(&mut self, key: DecorationKey) {
        self.entries.push(HistoryEntry::DecorationDeleteTemporary);
        self.decoration_keys.push(key);
    }

    /// Records: return this decoration to temporary mode on undo.
    pub fn push_decoration_to_mode_temporary(&mut self, key: DecorationKey) {
        self.entries.push(HistoryEntry::DecorationToModeTemporary);
        self.decoration_keys.push(key);
    }

    /// Records: return this decoration to colliding mode on undo.
    pub fn push_decoration_to_mode_colliding(&mut self, key: DecorationKey) {
        self.entries.push(HistoryEntry::DecorationToModeColliding);
        self.decoration_keys.push(key);
    }

    /// Records: re-insert this decoration on undo.
    pub fn push_decoration_to_mode_insert(&mut self, key: DecorationKey) {
        self.entries.push(HistoryEntry::DecorationToModeInsert);
        self.decoration_keys.push(key);
    }

    /// Records: move this temporary decoration by `delta` on undo.
    pub fn push_decoration_move_temporary(&mut self, key: DecorationKey, delta: MoveDelta) {
        self.entries.push(HistoryEntry::DecorationMoveTemporary);
        self.decoration_keys.push(key);
        self.move_deltas.push(delta);
    }

    /// Records: restore these attributes on undo.
    pub fn push_decoration_change_attributes(&mut self, key: DecorationKey, attrs: TextAttrs) {
        self.entries.push(HistoryEntry::DecorationChangeAttributes);
        self.decoration_keys.push(key);
        self.text_attrs.push(attrs);
    }

    /// Records: re-add this decoration to the visible selection on undo.
    pub fn push_decoration_add_visible_selection(&mut self, key: DecorationKey) {
        self.entries
            .push(HistoryEntry::DecorationAddVisibleSelection);
        self.decoration_keys.push(key);
    }

    /// Records: remove this decoration from the visible selection on undo.
    pub fn push_decoration_remove_visible_selection(&mut self, key: DecorationKey) {
        self.entries
            .push(HistoryEntry::DecorationRemoveVisibleSelection);
        self.decoration_keys.push(key);
    }

    /// Pops a [`HistoryEntry::DecorationCreateTemporary`] entry.
    pub fn pop_decoration_create_temporary(&mut self) -> (DecorationKey, PlacedDecoration) {
        self.pop_expecting(HistoryEntry::DecorationCreateTemporary);
        (
            pop_payload(&mut self.decoration_keys),
            pop_payload(&mut self.placed_decorations),
        )
    }

    /// Pops a [`HistoryEntry::DecorationDeleteTemporary`] entry.
    pub fn pop_decoration_delete_temporary(&mut self) -> DecorationKey {
        self.pop_expecting(HistoryEntry::DecorationDeleteTemporary);
        pop_payload(&mut self.decoration_keys)
    }

    /// Pops one of the three decoration mode entries.
    pub fn pop_decoration_to_mode(&mut self) -> (DecorationKey, HistoryEntry) {
        let entry = self.entries.pop().expect("history stack must not be empty");
        assert!(
            matches!(
                entry,
                HistoryEntry::DecorationToModeTemporary
                    | HistoryEntry::DecorationToModeColliding
                    | HistoryEntry::DecorationToModeInsert
            ),
            "top entry is not a decoration mode entry"
        );
        (pop_payload(&mut self.decoration_keys), entry)
    }

    /// Pops a [`HistoryEntry::DecorationMoveTemporary`] entry.
    pub fn pop_decoration_move_temporary(&mut self) -> (DecorationKey, MoveDelta) {
        self.pop_expecting(HistoryEntry::DecorationMoveTemporary);
        (
            pop_payload(&mut self.decoration_keys),
            pop_payload(&mut self.move_deltas),
        )
    }

    /// Pops a [`HistoryEntry::DecorationChangeAttributes`] entry.
    pub fn pop_decoration_change_attributes(&mut self) -> (DecorationKey, TextAttrs) {
        self.pop_expecting(HistoryEntry::DecorationChangeAttributes);
        (
            pop_payload(&mut self.decoration_keys),
            pop_payload(&mut self.text_attrs),
        )
    }

    /// Pops a [`HistoryEntry::DecorationAddVisibleSelection`] entry.
    pub fn pop_decoration_add_visible_selection(&mut self) -> DecorationKey {
        self.pop_expecting(HistoryEntry::DecorationAddVisibleSelection);
        pop_payload(&mut self.decoration_keys)
    }

    /// Pops a [`HistoryEntry::DecorationRemoveVisibleSelection`] entry.
    pub fn pop_decoration_remove_visible_selection(&mut self) -> DecorationKey {
        self.pop_expecting(HistoryEntry::DecorationRemoveVisibleSelection);
        pop_payload(&mut self.decoration_keys)
    }

    //
    // Wire segments
    //

    /// Records: re-create this temporary segment on undo.
    pub fn push_wire_create_temporary(&mut self, key: SegmentKey, line: OrderedLine) {
        self.entries.push(HistoryEntry::WireCreateTemporary);
        self.segment_keys.push(key);
        self.lines.push(line);
    }

    /// Records: delete this temporary segment on undo.
    ///
    /// The line identifies the span when the key has retired in a merge by
    /// the time the entry replays.
    pub fn push_wire_delete_temporary(&mut self, key: SegmentKey, line: OrderedLine) {
        self.entries.push(HistoryEntry::WireDeleteTemporary);
        self.segment_keys.push(key);
        self.lines.push(line);
    }

    /// Records: return this segment to temporary mode on undo.
    pub fn push_wire_to_mode_temporary(&mut self, key: SegmentKey, line: OrderedLine) {
        self.entries.push(HistoryEntry::WireToModeTemporary);
        self.segment_keys.push(key);
        self.lines.push(line);
    }

    /// Records: return this segment to colliding mode on undo.
    pub fn push_wire_to_mode_colliding(&mut self, key: SegmentKey, line: OrderedLine) {
        self.entries.push(HistoryEntry::WireToModeColliding);
        self.segment_keys.push(key);
        self.lines.push(line);
    }

    /// Records: re-insert this segment on undo.
    pub fn push_wire_to_mode_insert(&mut self, key: SegmentKey, line: OrderedLine) {
        self.entries.push(HistoryEntry::WireToModeInsert);
        self.segment_keys.push(key);
        self.lines.push(line);
    }

    /// Records: move this temporary segment by `delta` on undo.
    ///
    /// The line is where the segment will be found at replay time.
    pub fn push_wire_move_temporary(&mut self, key: SegmentKey, line: OrderedLine, delta: MoveDelta) {
        self.entries.push(HistoryEntry::WireMoveTemporary);
        self.segment_keys.push(key);
        self.lines.push(line);
        self.move_deltas.push(delta);
    }

    /// Pops a [`HistoryEntry::WireCreateTemporary`] entry.
    pub fn pop_wire_create_temporary(&mut self) -> (SegmentKey, OrderedLine) {
        self.pop_expecting(HistoryEntry::WireCreateTemporary);
        (
            pop_payload(&mut self.segment_keys),
            pop_payload(&mut self.lines),
        )
    }

    /// Pops a [`HistoryEntry::WireDeleteTemporary`] entry.
    pub fn pop_wire_delete_temporary(&mut self) -> (SegmentKey, OrderedLine) {
        self.pop_expecting(HistoryEntry::WireDeleteTemporary);
        (
            pop_payload(&mut self.segment_keys),
            pop_payload(&mut self.lines),
        )
    }

    /// Pops one of the three wire mode entries.
    pub fn pop_wire_to_mode(&mut self) -> (SegmentKey, OrderedLine, HistoryEntry) {
        let entry = self.entries.pop().expect("history stack must not be empty");
        assert!(
            matches!(
                entry,
                HistoryEntry::WireToModeTemporary
                    | HistoryEntry::WireToModeColliding
                    | HistoryEntry::WireToModeInsert
            ),
            "top entry is not a wire mode entry"
        );
        (
            pop_payload(&mut self.segment_keys),
            pop_payload(&mut self.lines),
            entry,
        )
    }

    /// Pops a [`HistoryEntry::WireMoveTemporary`] entry.
    pub fn pop_wire_move_temporary(&mut self) -> (SegmentKey, OrderedLine, MoveDelta) {
        self.pop_expecting(HistoryEntry::WireMoveTemporary);
        (
            pop_payload(&mut self.segment_keys),
            pop_payload(&mut self.lines),
            pop_payload(&mut self.move_deltas),
        )
    }

    //
    // Visible selection
    //

    /// Records: clear the visible selection on undo.
    pub fn push_visible_selection_clear(&mut self) {
        self.entries.push(HistoryEntry::VisibleSelectionClear);
    }

    /// Records: restore this visible selection on undo.
    pub fn push_visible_selection_set(&mut self, selection: StableSelection) {
        self.entries.push(HistoryEntry::VisibleSelectionSet);
        self.selections.push(selection);
    }

    /// Records: re-append this rectangle operation on undo.
    pub fn push_visible_selection_add_operation(&mut self, operation: VisibleSelectionOperation) {
        self.entries
            .push(HistoryEntry::VisibleSelectionAddOperation);
        self.selection_operations.push(operation);
    }

    /// Records: restore this rectangle on the last operation on undo.
    pub fn push_visible_selection_update_last(&mut self, rect: RectFine) {
        self.entries.push(HistoryEntry::VisibleSelectionUpdateLast);
        self.selection_rects.push(rect);
    }

    /// Records: pop the last rectangle operation on undo.
    pub fn push_visible_selection_pop_last(&mut self) {
        self.entries.push(HistoryEntry::VisibleSelectionPopLast);
    }

    /// Pops a [`HistoryEntry::VisibleSelectionClear`] entry.
    pub fn pop_visible_selection_clear(&mut self) {
        self.pop_expecting(HistoryEntry::VisibleSelectionClear);
    }

    /// Pops a [`HistoryEntry::VisibleSelectionSet`] entry.
    pub fn pop_visible_selection_set(&mut self) -> StableSelection {
        self.pop_expecting(HistoryEntry::VisibleSelectionSet);
        pop_payload(&mut self.selections)
    }

    /// Pops a [`HistoryEntry::VisibleSelectionAddOperation`] entry.
    pub fn pop_visible_selection_add_operation(&mut self) -> VisibleSelectionOperation {
        self.pop_expecting(HistoryEntry::VisibleSelectionAddOperation);
        pop_payload(&mut self.selection_operations)
    }

    /// Pops a [`HistoryEntry::VisibleSelectionUpdateLast`] entry.
    pub fn pop_visible_selection_update_last(&mut self) -> RectFine {
        self.pop_expecting(HistoryEntry::VisibleSelectionUpdateLast);
        pop_payload(&mut self.selection_rects)
    }

    /// Pops a [`HistoryEntry::VisibleSelectionPopLast`] entry.
    pub fn pop_visible_selection_pop_last(&mut self) {
        self.pop_expecting(HistoryEntry::VisibleSelectionPopLast);
    }

    fn pop_expecting(&mut self, expected: HistoryEntry) {
        let entry = self.entries.pop().expect("history stack must not be empty");
        assert!(entry == expected, "unexpected history entry {entry:?}");
    }
}

fn pop_payload<T>(payloads: &mut Vec<T>) -> T {
    payloads
        .pop()
        .expect("payload vector out of sync with the entry vector")
}

/// The last entry that is not `skip_type`, from the top.
#[must_use]
pub fn get_entry_before_skip(
    entries: &[HistoryEntry],
    skip_type: HistoryEntry,
) -> Option<HistoryEntry> {
    entries
        .iter()
        .rev()
        .find(|entry| **entry != skip_type)
        .copied()
}

/// The last entry that is not a group boundary.
#[must_use]
pub fn last_non_group_entry(entries: &[HistoryEntry]) -> Option<HistoryEntry> {
    get_entry_before_skip(entries, HistoryEntry::NewGroup)
}

/// Whether entries were pushed after the last group boundary.
#[must_use]
pub fn has_ungrouped_entries(stack: &HistoryStack) -> bool {
    stack
        .top_entry()
        .is_some_and(|entry| entry != HistoryEntry::NewGroup)
}

/// Re-opens the last finished group so a follow-up edit joins it.
pub fn reopen_group(stack: &mut HistoryStack) {
    stack.pop_new_group();
}

/// Which stack new entries are routed to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum HistoryState {
    /// Edits push onto the undo stack and clear the redo stack.
    #[default]
    Recording,
    /// An undo is replaying; its pushes form the redo group.
    UndoInProgress,
    /// A redo is replaying; its pushes form the next undo group.
    RedoInProgress,
}

/// Both history directions plus the routing state.
///
/// While an undo group replays, the inverse entries it generates are routed
/// to the redo stack, and vice versa; ordinary edits push onto the undo
/// stack and invalidate the redo stack.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    undo_stack: HistoryStack,
    redo_stack: HistoryStack,
    state: HistoryState,
    enabled: bool,
}

impl History {
    /// Creates a history; a disabled history drops every push.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Whether recording is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Undo/redo availability.
    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            undo_available: last_non_group_entry(self.undo_stack.entries()).is_some(),
            redo_available: last_non_group_entry(self.redo_stack.entries()).is_some(),
        }
    }

    /// The undo stack.
    #[must_use]
    pub fn undo_stack(&self) -> &HistoryStack {
        &self.undo_stack
    }

    /// The redo stack.
    #[must_use]
    pub fn redo_stack(&self) -> &HistoryStack {
        &self.redo_stack
    }

    /// The stack receiving pushes in the current state, or `None` while
    /// disabled.
    pub fn recording_stack(&mut self) -> Option<&mut HistoryStack> {
        if !self.enabled {
            return None;
        }
        Some(match self.state {
            HistoryState::Recording | HistoryState::RedoInProgress => &mut self.undo_stack,
            HistoryState::UndoInProgress => &mut self.redo_stack,
        })
    }

    /// The stack entries are replayed from during undo/redo.
    pub(crate) fn undo_stack_mut(&mut self) -> &mut HistoryStack {
        &mut self.undo_stack
    }

    pub(crate) fn redo_stack_mut(&mut self) -> &mut HistoryStack {
        &mut self.redo_stack
    }

    /// Marks the start of an undo replay; pushes now build the redo group.
    pub(crate) fn begin_undo(&mut self) {
        assert!(
            self.state == HistoryState::Recording,
            "history replay must not nest"
        );
        self.state = HistoryState::UndoInProgress;
        self.redo_stack.push_new_group();
    }

    /// Marks the start of a redo replay; pushes now build the undo group.
    pub(crate) fn begin_redo(&mut self) {
        assert!(
            self.state == HistoryState::Recording,
            "history replay must not nest"
        );
        self.state = HistoryState::RedoInProgress;
        self.undo_stack.push_new_group();
    }

    /// Returns to normal recording.
    pub(crate) fn end_replay(&mut self) {
        assert!(
            self.state != HistoryState::Recording,
            "no history replay in progress"
        );
        self.state = HistoryState::Recording;
    }

    /// Whether an undo or redo replay is running.
    #[must_use]
    pub fn is_replaying(&self) -> bool {
        self.state != HistoryState::Recording
    }

    /// Drops the redo stack; called on every ordinary edit.
    pub(crate) fn invalidate_redo(&mut self) {
        if self.state == HistoryState::Recording && !self.redo_stack.is_empty() {
            self.redo_stack.clear();
        }
    }

    /// Discards both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_boundaries_deduplicate() {
        let mut stack = HistoryStack::default();
        assert!(stack.push_new_group());
        assert!(!stack.push_new_group());
        assert_eq!(stack.len(), 1);

        stack.pop_new_group();
        assert!(stack.is_empty());
    }

    #[test]
    fn payloads_travel_with_entries() {
        let mut stack = HistoryStack::default();
        stack.push_logicitem_delete_temporary(LogicItemKey::new(7));
        stack.push_visible_selection_update_last(RectFine::new(0.0, 0.0, 1.0, 1.0));

        assert_eq!(
            stack.top_entry(),
            Some(HistoryEntry::VisibleSelectionUpdateLast)
        );
        let rect = stack.pop_visible_selection_update_last();
        assert_eq!(rect, RectFine::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(stack.pop_logicitem_delete_temporary(), LogicItemKey::new(7));
        assert!(stack.is_empty());
    }

    #[test]
    #[should_panic(expected = "unexpected history entry")]
    fn mismatched_pop_is_fatal() {
        let mut stack = HistoryStack::default();
        stack.push_logicitem_delete_temporary(LogicItemKey::new(0));
        let _ = stack.pop_wire_delete_temporary();
    }

    #[test]
    fn replay_routing() {
        let mut history = History::new(true);
        history
            .recording_stack()
            .unwrap()
            .push_logicitem_delete_temporary(LogicItemKey::new(0));
        history.recording_stack().unwrap().push_new_group();
        assert!(history.status().undo_available);
        assert!(!history.status().redo_available);

        history.begin_undo();
        history
            .recording_stack()
            .unwrap()
            .push_logicitem_create_temporary(
                LogicItemKey::new(0),
                PlacedLogicItem {
                    definition: latchwork_layout::LogicItemDefinition::default_for(
                        latchwork_vocabulary::LogicItemType::AndElement,
                    ),
                    position: latchwork_vocabulary::Point::new(0, 0),
                },
            );
        history.end_replay();
        assert!(history.status().redo_available);
    }

    #[test]
    fn entry_scanning_helpers() {
        let mut stack = HistoryStack::default();
        assert_eq!(last_non_group_entry(stack.entries()), None);

        stack.push_new_group();
        stack.push_visible_selection_pop_last();
        stack.push_new_group();
        assert_eq!(
            last_non_group_entry(stack.entries()),
            Some(HistoryEntry::VisibleSelectionPopLast)
        );
        assert!(!has_ungrouped_entries(&stack));

        reopen_group(&mut stack);
        stack.push_visible_selection_clear();
        assert!(has_ungrouped_entries(&stack));
    }
}
