// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The facade external callers drive.

use latchwork_geometry::fine::{PointFine, RectFine};
use latchwork_index::{KeyIndex, LayoutIndex};
use latchwork_layout::{DecorationDefinition, Layout, LogicItemDefinition};
use latchwork_vocabulary::{
    ClockAttrs, Delay, DecorationId, DisplayState, InsertionMode, LogicItemId, MoveDelta,
    OrderedLine, Point, Segment, SegmentPart, TextAttrs,
};

use crate::circuit_data::{CircuitData, SelectionId};
use crate::editing::{decoration, logicitem, wire};
use crate::history::{HistoryEntry, HistoryStatus};
use crate::stable_selection::{to_selection, to_stable_selection};
use crate::visible_selection::{ResolvedSelection, SelectionFunction, VisibleSelection};
use crate::{EditError, Selection};

/// Construction-time options of an [`EditableCircuit`].
#[derive(Clone, Debug, PartialEq)]
pub struct CircuitConfig {
    /// Whether edits are recorded for undo.
    pub enable_history: bool,
    /// Signal delay per grid unit of wire, used by schematic generation.
    pub wire_delay_per_distance: Delay,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            enable_history: true,
            wire_delay_per_distance: Delay::from_nanos(10),
        }
    }
}

/// The editable circuit: layout, indices, selections, and history behind one
/// mutation-checked surface.
///
/// All operations complete synchronously; message propagation to every index
/// finishes before a call returns. The facade is not thread-safe; callers
/// serialize access. Re-entrant mutation (an index or observer calling back
/// into a mutator during delivery) is a logic error and is rejected by a
/// mutation-depth check.
#[derive(Debug, Default)]
pub struct EditableCircuit {
    circuit: CircuitData,
    config: CircuitConfig,
    mutation_depth: u32,
}

impl EditableCircuit {
    /// Creates an empty circuit with the given options.
    #[must_use]
    pub fn new(config: CircuitConfig) -> Self {
        Self {
            circuit: CircuitData::new(config.enable_history),
            config,
            mutation_depth: 0,
        }
    }

    /// The construction options.
    #[must_use]
    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    /// The authoritative layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.circuit.layout
    }

    /// All derived indices.
    #[must_use]
    pub fn index(&self) -> &LayoutIndex {
        &self.circuit.index
    }

    /// The dense-id/stable-key maps.
    #[must_use]
    pub fn key_index(&self) -> &KeyIndex {
        self.circuit.index.keys()
    }

    /// Whether any inserted element is hit by the fine point.
    #[must_use]
    pub fn has_element(&self, point: PointFine) -> bool {
        self.circuit.index.has_element(point)
    }

    /// Heap bytes currently allocated by the layout and all indices.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.circuit.layout.allocated_size() + self.circuit.index.allocated_size()
    }

    /// Asserts every index round-trip invariant; test and debugging aid.
    ///
    /// # Panics
    ///
    /// Panics when derived state is out of sync with the layout.
    pub fn validate(&self) {
        self.circuit.validate();
    }

    //
    // Editing
    //

    /// Adds a logic item. See [`logicitem::add_logicitem`].
    pub fn add_logicitem(
        &mut self,
        definition: LogicItemDefinition,
        position: Point,
        mode: InsertionMode,
    ) -> Result<LogicItemId, EditError> {
        self.with_mutation(|circuit| logicitem::add_logicitem(circuit, definition, position, mode))
    }

    /// Adds a decoration. See [`decoration::add_decoration`].
    pub fn add_decoration(
        &mut self,
        definition: DecorationDefinition,
        position: Point,
        mode: InsertionMode,
    ) -> Result<DecorationId, EditError> {
        self.with_mutation(|circuit| {
            decoration::add_decoration(circuit, definition, position, mode)
        })
    }

    /// Adds a wire segment. See [`wire::add_wire_segment`].
    pub fn add_wire_segment(
        &mut self,
        line: OrderedLine,
        mode: InsertionMode,
    ) -> Result<SegmentPart, EditError> {
        self.with_mutation(|circuit| wire::add_wire_segment(circuit, line, mode))
    }

    /// Changes a logic item's insertion mode.
    pub fn change_logicitem_insertion_mode(
        &mut self,
        id: LogicItemId,
        mode: InsertionMode,
    ) -> Result<DisplayState, EditError> {
        self.with_mutation(|circuit| logicitem::set_logicitem_insertion_mode(circuit, id, mode))
    }

    /// Changes a decoration's insertion mode.
    pub fn change_decoration_insertion_mode(
        &mut self,
        id: DecorationId,
        mode: InsertionMode,
    ) -> Result<DisplayState, EditError> {
        self.with_mutation(|circuit| decoration::set_decoration_insertion_mode(circuit, id, mode))
    }

    /// Changes a wire part's insertion mode; returns the rewritten part and
    /// the resulting state.
    pub fn change_wire_insertion_mode(
        &mut self,
        mut segment_part: SegmentPart,
        mode: InsertionMode,
    ) -> Result<(SegmentPart, DisplayState), EditError> {
        self.with_mutation(|circuit| {
            let state = wire::change_wire_insertion_mode(circuit, &mut segment_part, mode)?;
            Ok((segment_part, state))
        })
    }

    /// Moves a temporary logic item.
    pub fn move_temporary_logicitem(
        &mut self,
        id: LogicItemId,
        delta: MoveDelta,
    ) -> Result<(), EditError> {
        self.with_mutation(|circuit| logicitem::move_temporary_logicitem(circuit, id, delta))
    }

    /// Moves a temporary decoration.
    pub fn move_temporary_decoration(
        &mut self,
        id: DecorationId,
        delta: MoveDelta,
    ) -> Result<(), EditError> {
        self.with_mutation(|circuit| decoration::move_temporary_decoration(circuit, id, delta))
    }

    /// Moves an uninserted wire part; returns the rewritten part.
    pub fn move_temporary_segment(
        &mut self,
        mut segment_part: SegmentPart,
        delta: MoveDelta,
    ) -> Result<SegmentPart, EditError> {
        self.with_mutation(|circuit| {
            wire::move_temporary_segment(circuit, &mut segment_part, delta)?;
            Ok(segment_part)
        })
    }

    /// Moves every element of a registered selection, all of which must be
    /// temporary. The whole move is a no-op if any target leaves the grid.
    pub fn move_temporary_selection(
        &mut self,
        selection_id: SelectionId,
        delta: MoveDelta,
    ) -> Result<(), EditError> {
        self.with_mutation(|circuit| {
            // Validate everything up front so a failure mutates nothing.
            let selection = circuit.selections.get(selection_id).clone();
            for id in selection.logicitems() {
                let mut data = circuit.layout.logicitems().layout_data(id);
                data.position = data.position.checked_add(delta).ok_or(EditError::OutOfRange)?;
                if !latchwork_layout::shape::is_representable(&data) {
                    return Err(EditError::OutOfRange);
                }
            }
            for id in selection.decorations() {
                let mut data = circuit.layout.decorations().layout_data(id);
                data.position = data.position.checked_add(delta).ok_or(EditError::OutOfRange)?;
                if !data.is_representable() {
                    return Err(EditError::OutOfRange);
                }
            }
            for (segment, parts) in selection.segments() {
                let line = circuit.layout.wires().tree(segment.wire).line(segment.index);
                for part in parts {
                    let sub = latchwork_geometry::part::to_line(line, *part);
                    if latchwork_geometry::line::checked_add(sub, delta).is_none() {
                        return Err(EditError::OutOfRange);
                    }
                }
            }

            for id in selection.logicitems() {
                logicitem::move_temporary_logicitem(circuit, id, delta)
                    .expect("validated move cannot fail");
            }
            for id in selection.decorations() {
                decoration::move_temporary_decoration(circuit, id, delta)
                    .expect("validated move cannot fail");
            }
            // Take parts from the live selection one at a time; the message
            // stream keeps the remaining entries valid across splits.
            loop {
                let Some(next) = circuit.selections.get(selection_id).segments().find_map(
                    |(segment, parts)| {
                        parts
                            .parts()
                            .first()
                            .map(|part| SegmentPart::new(segment, *part))
                    },
                ) else {
                    break;
                };
                circuit
                    .selections
                    .get_mut(selection_id)
                    .remove_segment(next);
                let mut moved = next;
                wire::move_temporary_segment(circuit, &mut moved, delta)
                    .expect("validated move cannot fail");
                circuit.selections.get_mut(selection_id).add_segment(moved);
            }
            Ok(())
        })
    }

    /// Deletes a logic item in any state.
    pub fn delete_logicitem(&mut self, id: LogicItemId) {
        self.with_mutation(|circuit| logicitem::delete_logicitem(circuit, id));
    }

    /// Deletes a decoration in any state.
    pub fn delete_decoration(&mut self, id: DecorationId) {
        self.with_mutation(|circuit| decoration::delete_decoration(circuit, id));
    }

    /// Deletes a wire part in any state.
    pub fn delete_wire_segment(&mut self, segment_part: SegmentPart) {
        self.with_mutation(|circuit| delete_wire_segment_any_state(circuit, segment_part));
    }

    /// Deletes everything in a registered selection.
    ///
    /// Deleting an already-emptied selection is a no-op.
    pub fn delete_selection(&mut self, selection_id: SelectionId) {
        self.with_mutation(|circuit| loop {
            let next_logicitem = circuit.selections.get(selection_id).logicitems().next();
            if let Some(id) = next_logicitem {
                logicitem::delete_logicitem(circuit, id);
                continue;
            }
            let next_decoration = circuit.selections.get(selection_id).decorations().next();
            if let Some(id) = next_decoration {
                decoration::delete_decoration(circuit, id);
                continue;
            }
            let next_part = circuit
                .selections
                .get(selection_id)
                .segments()
                .find_map(|(segment, parts)| {
                    parts
                        .parts()
                        .first()
                        .map(|part| SegmentPart::new(segment, *part))
                });
            if let Some(part) = next_part {
                delete_wire_segment_any_state(circuit, part);
                continue;
            }
            break;
        });
    }

    /// Replaces a clock generator's attributes.
    pub fn set_logicitem_attributes(&mut self, id: LogicItemId, attrs: ClockAttrs) {
        self.with_mutation(|circuit| logicitem::set_logicitem_attributes(circuit, id, attrs));
    }

    /// Replaces a decoration's attributes.
    pub fn set_decoration_attributes(&mut self, id: DecorationId, attrs: TextAttrs) {
        self.with_mutation(|circuit| decoration::set_decoration_attributes(circuit, id, attrs));
    }

    /// Adjusts a logic item's input count.
    pub fn resize_logicitem(
        &mut self,
        id: LogicItemId,
        delta: i8,
    ) -> Result<DisplayState, EditError> {
        self.with_mutation(|circuit| logicitem::resize_logicitem(circuit, id, delta))
    }

    /// Splits a wire segment at an interior point; returns the tail part.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not strictly interior to the segment's line.
    pub fn split_wire_segment(
        &mut self,
        segment: Segment,
        position: Point,
    ) -> SegmentPart {
        self.with_mutation(|circuit| {
            crate::editing::wire_detail::split_line_segment(circuit, segment, position)
        })
    }

    /// Merges two collinear segments sharing a non-connection endpoint;
    /// returns the surviving segment.
    pub fn merge_wire_segments(
        &mut self,
        segment_0: Segment,
        segment_1: Segment,
    ) -> Segment {
        self.with_mutation(|circuit| {
            crate::editing::wire_detail::merge_line_segments(circuit, segment_0, segment_1, None)
        })
    }

    //
    // Registered selections
    //

    /// Registers a new tracked selection.
    pub fn create_selection(&mut self) -> SelectionId {
        self.circuit.selections.create()
    }

    /// Removes a tracked selection.
    pub fn destroy_selection(&mut self, selection_id: SelectionId) {
        self.circuit.selections.destroy(selection_id);
    }

    /// The current contents of a tracked selection.
    #[must_use]
    pub fn selection(&self, selection_id: SelectionId) -> &Selection {
        self.circuit.selections.get(selection_id)
    }

    /// Adds a logic item to a tracked selection.
    pub fn add_to_selection_logicitem(&mut self, selection_id: SelectionId, id: LogicItemId) {
        self.circuit.selections.get_mut(selection_id).add_logicitem(id);
    }

    /// Adds a decoration to a tracked selection.
    pub fn add_to_selection_decoration(&mut self, selection_id: SelectionId, id: DecorationId) {
        self.circuit
            .selections
            .get_mut(selection_id)
            .add_decoration(id);
    }

    /// Adds a segment part to a tracked selection.
    pub fn add_to_selection_segment(&mut self, selection_id: SelectionId, part: SegmentPart) {
        self.circuit.selections.get_mut(selection_id).add_segment(part);
    }

    /// Removes a logic item from a tracked selection.
    pub fn remove_from_selection_logicitem(&mut self, selection_id: SelectionId, id: LogicItemId) {
        self.circuit
            .selections
            .get_mut(selection_id)
            .remove_logicitem(id);
    }

    /// Removes a decoration from a tracked selection.
    pub fn remove_from_selection_decoration(
        &mut self,
        selection_id: SelectionId,
        id: DecorationId,
    ) {
        self.circuit
            .selections
            .get_mut(selection_id)
            .remove_decoration(id);
    }

    /// Removes a segment part from a tracked selection.
    pub fn remove_from_selection_segment(&mut self, selection_id: SelectionId, part: SegmentPart) {
        self.circuit
            .selections
            .get_mut(selection_id)
            .remove_segment(part);
    }

    //
    // Visible selection
    //

    /// The resolved visible selection.
    #[must_use]
    pub fn visible_selection(&self) -> ResolvedSelection<'_> {
        self.circuit
            .visible_selection
            .selection(&self.circuit.layout, &self.circuit.index)
    }

    /// Appends a rectangle operation to the visible selection.
    pub fn add_visible_selection_rect(&mut self, function: SelectionFunction, rect: RectFine) {
        self.with_mutation(|circuit| {
            circuit.visible_selection.add(function, rect);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_visible_selection_pop_last();
            }
        });
    }

    /// Replaces the rectangle of the last operation (rubber-banding).
    pub fn update_last_visible_selection_rect(&mut self, rect: RectFine) {
        self.with_mutation(|circuit| {
            let Some(old) = circuit
                .visible_selection
                .operations()
                .last()
                .map(|operation| operation.rect)
            else {
                return;
            };
            if old == rect {
                return;
            }
            circuit.visible_selection.update_last(rect);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_visible_selection_update_last(old);
            }
        });
    }

    /// Removes the last rectangle operation, if any.
    pub fn try_pop_last_visible_selection_rect(&mut self) {
        self.with_mutation(|circuit| {
            if let Some(operation) = circuit.visible_selection.pop_last() {
                if let Some(stack) = circuit.history.recording_stack() {
                    stack.push_visible_selection_add_operation(operation);
                }
            }
        });
    }

    /// Empties the visible selection.
    pub fn clear_visible_selection(&mut self) {
        self.with_mutation(|circuit| {
            push_visible_selection_restore(circuit);
            circuit.visible_selection = VisibleSelection::new();
        });
    }

    /// Replaces the visible selection with `selection`.
    pub fn set_visible_selection(&mut self, selection: Selection) {
        self.with_mutation(|circuit| {
            push_visible_selection_restore(circuit);
            circuit.visible_selection = VisibleSelection::from_selection(selection);
        });
    }

    /// Adds a logic item to the visible selection's base.
    pub fn add_logicitem_to_visible_selection(&mut self, id: LogicItemId) {
        self.with_mutation(|circuit| {
            circuit.visible_selection.add_logicitem(id);
            let key = circuit.index.keys().logicitem_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_remove_visible_selection(key);
            }
        });
    }

    /// Removes a logic item from the visible selection's base.
    pub fn remove_logicitem_from_visible_selection(&mut self, id: LogicItemId) {
        self.with_mutation(|circuit| {
            circuit.visible_selection.remove_logicitem(id);
            let key = circuit.index.keys().logicitem_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_add_visible_selection(key);
            }
        });
    }

    /// Adds a decoration to the visible selection's base.
    pub fn add_decoration_to_visible_selection(&mut self, id: DecorationId) {
        self.with_mutation(|circuit| {
            circuit.visible_selection.add_decoration(id);
            let key = circuit.index.keys().decoration_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_remove_visible_selection(key);
            }
        });
    }

    /// Removes a decoration from the visible selection's base.
    pub fn remove_decoration_from_visible_selection(&mut self, id: DecorationId) {
        self.with_mutation(|circuit| {
            circuit.visible_selection.remove_decoration(id);
            let key = circuit.index.keys().decoration_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_add_visible_selection(key);
            }
        });
    }

    /// Folds all rectangle operations into the base selection.
    pub fn apply_all_visible_selection_operations(&mut self) {
        self.with_mutation(|circuit| {
            let (layout, index, visible) = (
                &circuit.layout,
                &circuit.index,
                &mut circuit.visible_selection,
            );
            visible.apply_all(layout, index);
        });
    }

    //
    // History
    //

    /// Closes the current undo group, if any entries are pending.
    pub fn finish_undo_group(&mut self) {
        if let Some(stack) = self.circuit.history.recording_stack() {
            stack.push_new_group();
        }
    }

    /// Undo/redo availability.
    #[must_use]
    pub fn history_status(&self) -> HistoryStatus {
        self.circuit.history.status()
    }

    /// Discards all recorded history, e.g. after loading a file.
    pub fn clear_history(&mut self) {
        self.circuit.history.clear();
    }

    /// Reverses the topmost undo group; a no-op on an empty stack.
    pub fn undo(&mut self) {
        if !self.circuit.history.status().undo_available {
            return;
        }
        self.assert_not_mutating();

        self.circuit.history.begin_undo();
        self.circuit.history.undo_stack_mut().pop_new_group();
        loop {
            let top = self.circuit.history.undo_stack().top_entry();
            match top {
                None | Some(HistoryEntry::NewGroup) => break,
                Some(entry) => self.apply_undo_entry(entry),
            }
        }
        self.circuit.history.end_replay();
    }

    /// Re-applies the topmost redo group; a no-op on an empty stack.
    pub fn redo(&mut self) {
        if !self.circuit.history.status().redo_available {
            return;
        }
        self.assert_not_mutating();

        self.circuit.history.begin_redo();
        self.circuit.history.redo_stack_mut().pop_new_group();
        loop {
            let top = self.circuit.history.redo_stack().top_entry();
            match top {
                None | Some(HistoryEntry::NewGroup) => break,
                Some(entry) => self.apply_redo_entry(entry),
            }
        }
        self.circuit.history.end_replay();
    }

    fn apply_undo_entry(&mut self, entry: HistoryEntry) {
        let circuit = &mut self.circuit;
        apply_history_entry(circuit, entry, StackSide::Undo);
    }

    fn apply_redo_entry(&mut self, entry: HistoryEntry) {
        let circuit = &mut self.circuit;
        apply_history_entry(circuit, entry, StackSide::Redo);
    }

    fn with_mutation<R>(&mut self, f: impl FnOnce(&mut CircuitData) -> R) -> R {
        self.assert_not_mutating();
        self.mutation_depth += 1;
        self.circuit.history.invalidate_redo();
        let result = f(&mut self.circuit);
        self.mutation_depth -= 1;
        result
    }

    fn assert_not_mutating(&self) {
        assert!(
            self.mutation_depth == 0,
            "re-entrant mutation during message delivery"
        );
    }
}

/// Deletes a wire part, demoting it to temporary first when inserted.
fn delete_wire_segment_any_state(circuit: &mut CircuitData, segment_part: SegmentPart) {
    let mut part = segment_part;
    if crate::editing::wire_display_state(part.segment.wire) != DisplayState::Temporary {
        let state = wire::change_wire_insertion_mode(circuit, &mut part, InsertionMode::Temporary);
        debug_assert!(state == Ok(DisplayState::Temporary), "demotion cannot fail");
    }
    wire::delete_temporary_segment_part(circuit, part);
}

/// Records the inverse that restores the current visible selection.
fn push_visible_selection_restore(circuit: &mut CircuitData) {
    let resolved: Selection = {
        let resolved = circuit
            .visible_selection
            .selection(&circuit.layout, &circuit.index);
        (*resolved).clone()
    };
    let stable = to_stable_selection(&resolved, circuit.index.keys(), &circuit.layout);
    if let Some(stack) = circuit.history.recording_stack() {
        if stable.is_empty() {
            stack.push_visible_selection_clear();
        } else {
            stack.push_visible_selection_set(stable);
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum StackSide {
    Undo,
    Redo,
}

/// Pops and executes one history entry; inverses route to the other side.
fn apply_history_entry(circuit: &mut CircuitData, entry: HistoryEntry, side: StackSide) {
    macro_rules! stack {
        () => {
            match side {
                StackSide::Undo => circuit.history.undo_stack_mut(),
                StackSide::Redo => circuit.history.redo_stack_mut(),
            }
        };
    }

    match entry {
        HistoryEntry::NewGroup => unreachable!("group boundaries stop the replay loop"),

        HistoryEntry::LogicItemCreateTemporary => {
            let (key, placed) = stack!().pop_logicitem_create_temporary();
            logicitem::restore_temporary_logicitem(circuit, key, placed);
        }
        HistoryEntry::LogicItemDeleteTemporary => {
            let key = stack!().pop_logicitem_delete_temporary();
            let id = circuit.index.keys().logicitem_id(key);
            logicitem::delete_logicitem(circuit, id);
        }
        HistoryEntry::LogicItemToModeTemporary
        | HistoryEntry::LogicItemToModeColliding
        | HistoryEntry::LogicItemToModeInsert => {
            let (key, entry) = stack!().pop_logicitem_to_mode();
            let id = circuit.index.keys().logicitem_id(key);
            match entry {
                HistoryEntry::LogicItemToModeTemporary => {
                    let state =
                        logicitem::set_logicitem_insertion_mode(circuit, id, InsertionMode::Temporary);
                    assert!(state == Ok(DisplayState::Temporary), "history replay diverged");
                }
                HistoryEntry::LogicItemToModeColliding => {
                    logicitem::force_logicitem_colliding(circuit, id);
                }
                HistoryEntry::LogicItemToModeInsert => {
                    let state = logicitem::set_logicitem_insertion_mode(
                        circuit,
                        id,
                        InsertionMode::InsertOrDiscard,
                    );
                    assert!(state == Ok(DisplayState::Normal), "history replay diverged");
                }
                _ => unreachable!(),
            }
        }
        HistoryEntry::LogicItemMoveTemporary => {
            let (key, delta) = stack!().pop_logicitem_move_temporary();
            let id = circuit.index.keys().logicitem_id(key);
            logicitem::move_temporary_logicitem(circuit, id, delta)
                .expect("recorded move must stay on the grid");
        }
        HistoryEntry::LogicItemChangeAttributes => {
            let (key, attrs) = stack!().pop_logicitem_change_attributes();
            let id = circuit.index.keys().logicitem_id(key);
            logicitem::set_logicitem_attributes(circuit, id, attrs);
        }
        HistoryEntry::LogicItemResize => {
            let (key, delta) = stack!().pop_logicitem_resize();
            let id = circuit.index.keys().logicitem_id(key);
            logicitem::resize_logicitem(circuit, id, delta)
                .expect("recorded resize must stay on the grid");
        }
        HistoryEntry::LogicItemAddVisibleSelection => {
            let key = stack!().pop_logicitem_add_visible_selection();
            let id = circuit.index.keys().logicitem_id(key);
            circuit.visible_selection.add_logicitem(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_remove_visible_selection(key);
            }
        }
        HistoryEntry::LogicItemRemoveVisibleSelection => {
            let key = stack!().pop_logicitem_remove_visible_selection();
            let id = circuit.index.keys().logicitem_id(key);
            circuit.visible_selection.remove_logicitem(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_add_visible_selection(key);
            }
        }

        HistoryEntry::DecorationCreateTemporary => {
            let (key, placed) = stack!().pop_decoration_create_temporary();
            decoration::restore_temporary_decoration(circuit, key, placed);
        }
        HistoryEntry::DecorationDeleteTemporary => {
            let key = stack!().pop_decoration_delete_temporary();
            let id = circuit.index.keys().decoration_id(key);
            decoration::delete_decoration(circuit, id);
        }
        HistoryEntry::DecorationToModeTemporary
        | HistoryEntry::DecorationToModeColliding
        | HistoryEntry::DecorationToModeInsert => {
            let (key, entry) = stack!().pop_decoration_to_mode();
            let id = circuit.index.keys().decoration_id(key);
            match entry {
                HistoryEntry::DecorationToModeTemporary => {
                    let state = decoration::set_decoration_insertion_mode(
                        circuit,
                        id,
                        InsertionMode::Temporary,
                    );
                    assert!(state == Ok(DisplayState::Temporary), "history replay diverged");
                }
                HistoryEntry::DecorationToModeColliding => {
                    decoration::force_decoration_colliding(circuit, id);
                }
                HistoryEntry::DecorationToModeInsert => {
                    let state = decoration::set_decoration_insertion_mode(
                        circuit,
                        id,
                        InsertionMode::InsertOrDiscard,
                    );
                    assert!(state == Ok(DisplayState::Normal), "history replay diverged");
                }
                _ => unreachable!(),
            }
        }
        HistoryEntry::DecorationMoveTemporary => {
            let (key, delta) = stack!().pop_decoration_move_temporary();
            let id = circuit.index.keys().decoration_id(key);
            decoration::move_temporary_decoration(circuit, id, delta)
                .expect("recorded move must stay on the grid");
        }
        HistoryEntry::DecorationChangeAttributes => {
            let (key, attrs) = stack!().pop_decoration_change_attributes();
            let id = circuit.index.keys().decoration_id(key);
            decoration::set_decoration_attributes(circuit, id, attrs);
        }
        HistoryEntry::DecorationAddVisibleSelection => {
            let key = stack!().pop_decoration_add_visible_selection();
            let id = circuit.index.keys().decoration_id(key);
            circuit.visible_selection.add_decoration(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_remove_visible_selection(key);
            }
        }
        HistoryEntry::DecorationRemoveVisibleSelection => {
            let key = stack!().pop_decoration_remove_visible_selection();
            let id = circuit.index.keys().decoration_id(key);
            circuit.visible_selection.remove_decoration(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_add_visible_selection(key);
            }
        }

        HistoryEntry::WireCreateTemporary => {
            let (key, line) = stack!().pop_wire_create_temporary();
            wire::restore_temporary_segment(circuit, key, line);
        }
        HistoryEntry::WireDeleteTemporary => {
            let (key, line) = stack!().pop_wire_delete_temporary();
            wire::apply_delete_temporary(circuit, key, line);
        }
        HistoryEntry::WireToModeTemporary
        | HistoryEntry::WireToModeColliding
        | HistoryEntry::WireToModeInsert => {
            let (key, line, entry) = stack!().pop_wire_to_mode();
            match entry {
                HistoryEntry::WireToModeTemporary => {
                    wire::apply_to_mode_temporary(circuit, key, line);
                }
                HistoryEntry::WireToModeColliding => {
                    let segment = circuit.index.keys().segment(key);
                    let mut part = wire::part_of_sub_line(circuit, segment, line);
                    wire::force_wire_colliding(circuit, &mut part);
                }
                HistoryEntry::WireToModeInsert => {
                    let segment = circuit.index.keys().segment(key);
                    let mut part = wire::part_of_sub_line(circuit, segment, line);
                    let state = wire::change_wire_insertion_mode(
                        circuit,
                        &mut part,
                        InsertionMode::InsertOrDiscard,
                    );
                    assert!(state == Ok(DisplayState::Normal), "history replay diverged");
                }
                _ => unreachable!(),
            }
        }
        HistoryEntry::WireMoveTemporary => {
            let (key, line, delta) = stack!().pop_wire_move_temporary();
            wire::apply_move_temporary(circuit, key, line, delta);
        }

        HistoryEntry::VisibleSelectionClear => {
            stack!().pop_visible_selection_clear();
            push_visible_selection_restore(circuit);
            circuit.visible_selection = VisibleSelection::new();
        }
        HistoryEntry::VisibleSelectionSet => {
            let stable = stack!().pop_visible_selection_set();
            push_visible_selection_restore(circuit);
            let selection = to_selection(&stable, circuit.index.keys(), &circuit.layout);
            circuit.visible_selection = VisibleSelection::from_selection(selection);
        }
        HistoryEntry::VisibleSelectionAddOperation => {
            let operation = stack!().pop_visible_selection_add_operation();
            circuit
                .visible_selection
                .add(operation.function, operation.rect);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_visible_selection_pop_last();
            }
        }
        HistoryEntry::VisibleSelectionUpdateLast => {
            let rect = stack!().pop_visible_selection_update_last();
            let old = circuit
                .visible_selection
                .operations()
                .last()
                .map(|operation| operation.rect)
                .expect("recorded update requires a pending operation");
            circuit.visible_selection.update_last(rect);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_visible_selection_update_last(old);
            }
        }
        HistoryEntry::VisibleSelectionPopLast => {
            stack!().pop_visible_selection_pop_last();
            if let Some(operation) = circuit.visible_selection.pop_last() {
                if let Some(stack) = circuit.history.recording_stack() {
                    stack.push_visible_selection_add_operation(operation);
                }
            }
        }
    }
}
