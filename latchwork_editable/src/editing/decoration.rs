// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-facing decoration primitives.
//!
//! Decorations never appear in the collision index: its occupancy table is
//! wires and logic items only. They collide purely against each other, by
//! grid-rectangle overlap through the spatial index.

use latchwork_geometry::fine::rect_fine;
use latchwork_index::SpatialPayload;
use latchwork_layout::{DecorationDefinition, DecorationLayoutData, InfoMessage};
use latchwork_vocabulary::{
    DecorationId, DecorationKey, DisplayState, InsertionMode, MoveDelta, Point, TextAttrs,
};

use crate::placed::PlacedDecoration;
use crate::{CircuitData, EditError};

/// Adds a decoration in the requested mode.
pub fn add_decoration(
    circuit: &mut CircuitData,
    definition: DecorationDefinition,
    position: Point,
    mode: InsertionMode,
) -> Result<DecorationId, EditError> {
    tracing::debug!(%position, ?mode, "add decoration");
    let data = DecorationLayoutData {
        decoration_type: definition.decoration_type,
        position,
        size: definition.size,
    };
    if !data.is_representable() {
        return Err(EditError::OutOfRange);
    }

    let id = circuit
        .layout
        .decorations_mut()
        .add(definition, position, DisplayState::Temporary);
    circuit.submit(InfoMessage::DecorationCreated { id });

    let key = circuit.index.keys().decoration_key(id);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_decoration_delete_temporary(key);
    }

    if mode != InsertionMode::Temporary {
        set_decoration_insertion_mode(circuit, id, mode)?;
    }
    Ok(id)
}

/// Restores a deleted temporary decoration under its original key.
///
/// History replay only.
pub fn restore_temporary_decoration(
    circuit: &mut CircuitData,
    key: DecorationKey,
    placed: PlacedDecoration,
) -> DecorationId {
    let id = circuit.layout.decorations_mut().add(
        placed.definition,
        placed.position,
        DisplayState::Temporary,
    );
    circuit.submit(InfoMessage::DecorationCreated { id });
    circuit.index.keys_mut().set_decoration_key(id, key);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_decoration_delete_temporary(key);
    }
    id
}

/// Whether inserting the decoration would overlap an inserted decoration.
#[must_use]
pub fn is_decoration_colliding(circuit: &CircuitData, data: &DecorationLayoutData) -> bool {
    if !data.is_representable() {
        return true;
    }
    let rect = rect_fine(data.bounding_rect());
    circuit
        .index
        .spatial()
        .query_selection(rect)
        .iter()
        .any(|payload| matches!(payload, SpatialPayload::Decoration(_)))
}

/// Changes the insertion mode of a decoration, one lattice step at a time.
pub fn set_decoration_insertion_mode(
    circuit: &mut CircuitData,
    id: DecorationId,
    mode: InsertionMode,
) -> Result<DisplayState, EditError> {
    let current = circuit.layout.decorations().display_state(id);

    match (current, mode) {
        (DisplayState::Temporary, InsertionMode::Temporary) => Ok(DisplayState::Temporary),
        (DisplayState::Temporary, InsertionMode::Collisions) => {
            lay_out_decoration(circuit, id, false)
        }
        (DisplayState::Temporary, InsertionMode::InsertOrDiscard) => {
            lay_out_decoration(circuit, id, true)
        }

        (DisplayState::Colliding, InsertionMode::Temporary) => {
            circuit
                .layout
                .decorations_mut()
                .set_display_state(id, DisplayState::Temporary);
            let key = circuit.index.keys().decoration_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_to_mode_colliding(key);
            }
            Ok(DisplayState::Temporary)
        }
        (DisplayState::Colliding, InsertionMode::Collisions) => Ok(DisplayState::Colliding),
        (DisplayState::Colliding, InsertionMode::InsertOrDiscard) => {
            let data = circuit.layout.decorations().layout_data(id);
            if is_decoration_colliding(circuit, &data) {
                return Ok(DisplayState::Colliding);
            }
            insert_decoration(circuit, id);
            let key = circuit.index.keys().decoration_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_to_mode_colliding(key);
            }
            Ok(DisplayState::Normal)
        }

        (DisplayState::Normal, InsertionMode::InsertOrDiscard) => Ok(DisplayState::Normal),
        (DisplayState::Normal, InsertionMode::Collisions) => {
            uninsert_decoration(circuit, id);
            let key = circuit.index.keys().decoration_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_to_mode_insert(key);
            }
            Ok(DisplayState::Colliding)
        }
        (DisplayState::Normal, InsertionMode::Temporary) => {
            uninsert_decoration(circuit, id);
            let key = circuit.index.keys().decoration_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_to_mode_insert(key);
            }
            circuit
                .layout
                .decorations_mut()
                .set_display_state(id, DisplayState::Temporary);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_to_mode_colliding(key);
            }
            Ok(DisplayState::Temporary)
        }
    }
}

fn lay_out_decoration(
    circuit: &mut CircuitData,
    id: DecorationId,
    discard_on_collision: bool,
) -> Result<DisplayState, EditError> {
    let data = circuit.layout.decorations().layout_data(id);

    if is_decoration_colliding(circuit, &data) {
        if discard_on_collision {
            delete_temporary_decoration(circuit, id);
            return Err(EditError::Collided);
        }
        circuit
            .layout
            .decorations_mut()
            .set_display_state(id, DisplayState::Colliding);
        let key = circuit.index.keys().decoration_key(id);
        if let Some(stack) = circuit.history.recording_stack() {
            stack.push_decoration_to_mode_temporary(key);
        }
        return Ok(DisplayState::Colliding);
    }

    insert_decoration(circuit, id);
    let key = circuit.index.keys().decoration_key(id);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_decoration_to_mode_temporary(key);
    }
    Ok(DisplayState::Normal)
}

/// Puts a decoration into the colliding state without collision checks.
///
/// History replay only: restores a recorded colliding state exactly.
pub fn force_decoration_colliding(circuit: &mut CircuitData, id: DecorationId) {
    match circuit.layout.decorations().display_state(id) {
        DisplayState::Colliding => {}
        DisplayState::Temporary => {
            circuit
                .layout
                .decorations_mut()
                .set_display_state(id, DisplayState::Colliding);
            let key = circuit.index.keys().decoration_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_to_mode_temporary(key);
            }
        }
        DisplayState::Normal => {
            uninsert_decoration(circuit, id);
            let key = circuit.index.keys().decoration_key(id);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_decoration_to_mode_insert(key);
            }
        }
    }
}

fn insert_decoration(circuit: &mut CircuitData, id: DecorationId) {
    circuit
        .layout
        .decorations_mut()
        .set_display_state(id, DisplayState::Normal);
    let data = circuit.layout.decorations().layout_data(id);
    circuit.submit(InfoMessage::DecorationInserted { id, data });
}

fn uninsert_decoration(circuit: &mut CircuitData, id: DecorationId) {
    let data = circuit.layout.decorations().layout_data(id);
    circuit.submit(InfoMessage::DecorationUninserted { id, data });
    circuit
        .layout
        .decorations_mut()
        .set_display_state(id, DisplayState::Colliding);
}

/// Deletes a decoration, transitioning it to temporary first.
pub fn delete_decoration(circuit: &mut CircuitData, id: DecorationId) {
    if circuit.layout.decorations().display_state(id) != DisplayState::Temporary {
        let result = set_decoration_insertion_mode(circuit, id, InsertionMode::Temporary);
        debug_assert!(result == Ok(DisplayState::Temporary), "demotion cannot fail");
    }
    delete_temporary_decoration(circuit, id);
}

fn delete_temporary_decoration(circuit: &mut CircuitData, id: DecorationId) {
    let key = circuit.index.keys().decoration_key(id);
    let placed = PlacedDecoration {
        definition: circuit.layout.decorations().definition(id),
        position: circuit.layout.decorations().position(id),
    };

    circuit.submit(InfoMessage::DecorationDeleted { id });
    let moved = circuit.layout.decorations_mut().swap_delete(id);
    if let Some(old_id) = moved {
        circuit.submit(InfoMessage::DecorationIdUpdated {
            new_id: id,
            old_id,
        });
        if circuit.layout.decorations().display_state(id).is_inserted() {
            let data = circuit.layout.decorations().layout_data(id);
            circuit.submit(InfoMessage::InsertedDecorationIdUpdated {
                new_id: id,
                old_id,
                data,
            });
        }
    }

    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_decoration_create_temporary(key, placed);
    }
}

/// Moves a temporary decoration by `delta`.
pub fn move_temporary_decoration(
    circuit: &mut CircuitData,
    id: DecorationId,
    delta: MoveDelta,
) -> Result<(), EditError> {
    assert!(
        circuit.layout.decorations().display_state(id) == DisplayState::Temporary,
        "only temporary decorations move freely"
    );

    let position = circuit.layout.decorations().position(id);
    let target = position.checked_add(delta).ok_or(EditError::OutOfRange)?;
    let mut data = circuit.layout.decorations().layout_data(id);
    data.position = target;
    if !data.is_representable() {
        return Err(EditError::OutOfRange);
    }

    circuit.layout.decorations_mut().set_position(id, target);
    let key = circuit.index.keys().decoration_key(id);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_decoration_move_temporary(key, delta.negated());
    }
    Ok(())
}

/// Replaces a decoration's text attributes.
pub fn set_decoration_attributes(circuit: &mut CircuitData, id: DecorationId, attrs: TextAttrs) {
    let old = circuit.layout.decorations().attrs(id).clone();
    if old == attrs {
        return;
    }

    circuit.layout.decorations_mut().set_attrs(id, attrs);
    let key = circuit.index.keys().decoration_key(id);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_decoration_change_attributes(key, old);
    }
}
