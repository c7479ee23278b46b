// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-facing logic-item primitives.

use latchwork_geometry::line;
use latchwork_layout::shape;
use latchwork_layout::{InfoMessage, LogicItemDefinition};
use latchwork_vocabulary::{
    ClockAttrs, DisplayState, InsertionMode, LogicItemId, LogicItemKey, MoveDelta, Orientation,
    Point, SegmentPointType,
};

use crate::editing::wire_detail::{fix_and_merge_segments, update_segment_point_types};
use crate::placed::PlacedLogicItem;
use crate::{CircuitData, EditError};

/// Adds a logic item in the requested mode.
///
/// The item is created temporary, then transitioned. With
/// [`InsertionMode::InsertOrDiscard`] a colliding item is deleted again and
/// [`EditError::Collided`] is returned.
pub fn add_logicitem(
    circuit: &mut CircuitData,
    definition: LogicItemDefinition,
    position: Point,
    mode: InsertionMode,
) -> Result<LogicItemId, EditError> {
    tracing::debug!(item_type = ?definition.item_type, %position, ?mode, "add logic item");
    let data = latchwork_layout::LogicItemLayoutData {
        item_type: definition.item_type,
        input_count: definition.input_count,
        output_count: definition.output_count,
        position,
        orientation: definition.orientation,
    };
    if !shape::is_representable(&data) {
        return Err(EditError::OutOfRange);
    }

    let id = circuit
        .layout
        .logicitems_mut()
        .add(definition, position, DisplayState::Temporary);
    circuit.submit(InfoMessage::LogicItemCreated { id });

    let key = circuit.index.keys().logicitem_key(id);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_logicitem_delete_temporary(key);
    }

    if mode != InsertionMode::Temporary {
        set_logicitem_insertion_mode(circuit, id, mode)?;
    }
    Ok(id)
}

/// Restores a deleted temporary logic item under its original key.
///
/// History replay only.
pub fn restore_temporary_logicitem(
    circuit: &mut CircuitData,
    key: LogicItemKey,
    placed: PlacedLogicItem,
) -> LogicItemId {
    let id = circuit.layout.logicitems_mut().add(
        placed.definition,
        placed.position,
        DisplayState::Temporary,
    );
    circuit.submit(InfoMessage::LogicItemCreated { id });
    circuit.index.keys_mut().set_logicitem_key(id, key);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_logicitem_delete_temporary(key);
    }
    id
}

/// Changes the insertion mode of a logic item, one lattice step at a time.
///
/// Returns the resulting display state; promoting a still-colliding item
/// reports `Colliding` without effect, and `InsertOrDiscard` on a colliding
/// temporary item deletes it and returns [`EditError::Collided`].
pub fn set_logicitem_insertion_mode(
    circuit: &mut CircuitData,
    id: LogicItemId,
    mode: InsertionMode,
) -> Result<DisplayState, EditError> {
    let current = circuit.layout.logicitems().display_state(id);

    match (current, mode) {
        (DisplayState::Temporary, InsertionMode::Temporary) => Ok(DisplayState::Temporary),
        (DisplayState::Temporary, InsertionMode::Collisions) => lay_out_logicitem(circuit, id, false),
        (DisplayState::Temporary, InsertionMode::InsertOrDiscard) => {
            lay_out_logicitem(circuit, id, true)
        }

        (DisplayState::Colliding, InsertionMode::Temporary) => {
            circuit
                .layout
                .logicitems_mut()
                .set_display_state(id, DisplayState::Temporary);
            let key = circuit.index.keys().logicitem_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_to_mode_colliding(key);
            }
            Ok(DisplayState::Temporary)
        }
        (DisplayState::Colliding, InsertionMode::Collisions) => Ok(DisplayState::Colliding),
        (DisplayState::Colliding, InsertionMode::InsertOrDiscard) => {
            let data = circuit.layout.logicitems().layout_data(id);
            if !shape::is_representable(&data) || circuit.index.is_colliding_item(&data) {
                // Caller policy: the promotion stays pending.
                return Ok(DisplayState::Colliding);
            }
            insert_logicitem(circuit, id);
            let key = circuit.index.keys().logicitem_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_to_mode_colliding(key);
            }
            Ok(DisplayState::Normal)
        }

        (DisplayState::Normal, InsertionMode::InsertOrDiscard) => Ok(DisplayState::Normal),
        (DisplayState::Normal, InsertionMode::Collisions) => {
            uninsert_logicitem(circuit, id);
            let key = circuit.index.keys().logicitem_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_to_mode_insert(key);
            }
            Ok(DisplayState::Colliding)
        }
        (DisplayState::Normal, InsertionMode::Temporary) => {
            uninsert_logicitem(circuit, id);
            let key = circuit.index.keys().logicitem_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_to_mode_insert(key);
            }
            circuit
                .layout
                .logicitems_mut()
                .set_display_state(id, DisplayState::Temporary);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_to_mode_colliding(key);
            }
            Ok(DisplayState::Temporary)
        }
    }
}

fn lay_out_logicitem(
    circuit: &mut CircuitData,
    id: LogicItemId,
    discard_on_collision: bool,
) -> Result<DisplayState, EditError> {
    let data = circuit.layout.logicitems().layout_data(id);
    let colliding = !shape::is_representable(&data) || circuit.index.is_colliding_item(&data);

    if colliding {
        if discard_on_collision {
            delete_temporary_logicitem(circuit, id);
            return Err(EditError::Collided);
        }
        circuit
            .layout
            .logicitems_mut()
            .set_display_state(id, DisplayState::Colliding);
        let key = circuit.index.keys().logicitem_key(id);
        if let Some(stack) = circuit.history.recording_stack() {
            stack.push_logicitem_to_mode_temporary(key);
        }
        return Ok(DisplayState::Colliding);
    }

    insert_logicitem(circuit, id);
    let key = circuit.index.keys().logicitem_key(id);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_logicitem_to_mode_temporary(key);
    }
    Ok(DisplayState::Normal)
}

/// Registers the item in the indices and connects coincident wire endpoints.
pub(crate) fn insert_logicitem(circuit: &mut CircuitData, id: LogicItemId) {
    circuit
        .layout
        .logicitems_mut()
        .set_display_state(id, DisplayState::Normal);
    let data = circuit.layout.logicitems().layout_data(id);
    circuit.submit(InfoMessage::LogicItemInserted { id, data });

    // A wire ending on an input pin delivers into it; on an output pin it
    // receives from it.
    for pin in shape::input_locations(&data) {
        adopt_wire_endpoint(circuit, pin.position, pin.orientation, SegmentPointType::Output);
    }
    for pin in shape::output_locations(&data) {
        adopt_wire_endpoint(circuit, pin.position, pin.orientation, SegmentPointType::Input);
    }
}

fn adopt_wire_endpoint(
    circuit: &mut CircuitData,
    position: Point,
    pin_orientation: Orientation,
    target: SegmentPointType,
) {
    let touching = circuit.index.query_line_segments(position);
    for segment in touching {
        let info = circuit.layout.wires().tree(segment.wire).info(segment.index);
        if info.type_at(position).is_none() {
            continue;
        }
        let orientation = line::endpoint_orientation(info.line, position);
        if orientation.is_compatible_with(pin_orientation) {
            update_segment_point_types(circuit, position, &[(segment, target)]);
        }
    }
}

/// Puts a logic item into the colliding state without collision checks.
///
/// History replay only: restores a recorded colliding state exactly.
pub fn force_logicitem_colliding(circuit: &mut CircuitData, id: LogicItemId) {
    match circuit.layout.logicitems().display_state(id) {
        DisplayState::Colliding => {}
        DisplayState::Temporary => {
            circuit
                .layout
                .logicitems_mut()
                .set_display_state(id, DisplayState::Colliding);
            let key = circuit.index.keys().logicitem_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_to_mode_temporary(key);
            }
        }
        DisplayState::Normal => {
            uninsert_logicitem(circuit, id);
            let key = circuit.index.keys().logicitem_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_logicitem_to_mode_insert(key);
            }
        }
    }
}

fn uninsert_logicitem(circuit: &mut CircuitData, id: LogicItemId) {
    let data = circuit.layout.logicitems().layout_data(id);
    circuit.submit(InfoMessage::LogicItemUninserted { id, data });
    circuit
        .layout
        .logicitems_mut()
        .set_display_state(id, DisplayState::Colliding);

    // Release the wire endpoints that were connected to the pins.
    for pin in shape::input_locations(&data) {
        fix_and_merge_segments(circuit, pin.position, None);
    }
    for pin in shape::output_locations(&data) {
        fix_and_merge_segments(circuit, pin.position, None);
    }
}

/// Deletes a logic item, transitioning it to temporary first.
pub fn delete_logicitem(circuit: &mut CircuitData, id: LogicItemId) {
    if circuit.layout.logicitems().display_state(id) != DisplayState::Temporary {
        let result = set_logicitem_insertion_mode(circuit, id, InsertionMode::Temporary);
        debug_assert!(result == Ok(DisplayState::Temporary), "demotion cannot fail");
    }
    delete_temporary_logicitem(circuit, id);
}

fn delete_temporary_logicitem(circuit: &mut CircuitData, id: LogicItemId) {
    let key = circuit.index.keys().logicitem_key(id);
    let placed = PlacedLogicItem {
        definition: circuit.layout.logicitems().definition(id),
        position: circuit.layout.logicitems().position(id),
    };

    circuit.submit(InfoMessage::LogicItemDeleted { id });
    let moved = circuit.layout.logicitems_mut().swap_delete(id);
    if let Some(old_id) = moved {
        circuit.submit(InfoMessage::LogicItemIdUpdated {
            new_id: id,
            old_id,
        });
        if circuit.layout.logicitems().display_state(id).is_inserted() {
            let data = circuit.layout.logicitems().layout_data(id);
            circuit.submit(InfoMessage::InsertedLogicItemIdUpdated {
                new_id: id,
                old_id,
                data,
            });
        }
    }

    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_logicitem_create_temporary(key, placed);
    }
}

/// Moves a temporary logic item by `delta`.
pub fn move_temporary_logicitem(
    circuit: &mut CircuitData,
    id: LogicItemId,
    delta: MoveDelta,
) -> Result<(), EditError> {
    assert!(
        circuit.layout.logicitems().display_state(id) == DisplayState::Temporary,
        "only temporary items move freely"
    );

    let position = circuit.layout.logicitems().position(id);
    let target = position.checked_add(delta).ok_or(EditError::OutOfRange)?;
    let mut data = circuit.layout.logicitems().layout_data(id);
    data.position = target;
    if !shape::is_representable(&data) {
        return Err(EditError::OutOfRange);
    }

    circuit.layout.logicitems_mut().set_position(id, target);
    let key = circuit.index.keys().logicitem_key(id);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_logicitem_move_temporary(key, delta.negated());
    }
    Ok(())
}

/// Replaces a clock generator's attributes.
pub fn set_logicitem_attributes(circuit: &mut CircuitData, id: LogicItemId, attrs: ClockAttrs) {
    let old = circuit
        .layout
        .logicitems()
        .attrs(id)
        .cloned()
        .expect("only clock generators carry attributes");
    if old == attrs {
        return;
    }

    circuit.layout.logicitems_mut().set_attrs(id, attrs);
    let key = circuit.index.keys().logicitem_key(id);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_logicitem_change_attributes(key, old);
    }
}

/// Adjusts the input count by `delta`, clamped to the type's range.
///
/// Resizing re-checks collisions by cycling through the temporary mode; a
/// previously inserted item that no longer fits ends up colliding. The
/// anchor position is the first input pin and is preserved as-is.
pub fn resize_logicitem(
    circuit: &mut CircuitData,
    id: LogicItemId,
    delta: i8,
) -> Result<DisplayState, EditError> {
    let item_type = circuit.layout.logicitems().item_type(id);
    let range = shape::input_count_range(item_type);
    let current = circuit.layout.logicitems().input_count(id);
    let target = i16::from(current) + i16::from(delta);
    let target = target.clamp(i16::from(*range.start()), i16::from(*range.end()));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "clamped into the type's u8 count range"
    )]
    let target = target as u8;

    let state = circuit.layout.logicitems().display_state(id);
    if target == current {
        return Ok(state);
    }

    let result = set_logicitem_insertion_mode(circuit, id, InsertionMode::Temporary);
    debug_assert!(result == Ok(DisplayState::Temporary), "demotion cannot fail");

    circuit.layout.logicitems_mut().set_input_count(id, target);
    let key = circuit.index.keys().logicitem_key(id);
    #[allow(
        clippy::cast_possible_truncation,
        reason = "count deltas fit i8 by the same clamp"
    )]
    let applied = (i16::from(target) - i16::from(current)) as i8;
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_logicitem_resize(key, -applied);
    }

    match state {
        DisplayState::Temporary => Ok(DisplayState::Temporary),
        // Re-check collisions on the way back up; a blocked item stays
        // colliding rather than being discarded.
        DisplayState::Colliding | DisplayState::Normal => {
            set_logicitem_insertion_mode(circuit, id, InsertionMode::Collisions)
        }
    }
}
