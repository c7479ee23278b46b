// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end editing scenarios driven through the facade.

use latchwork_editable::{CircuitConfig, EditError, EditableCircuit, SelectionFunction};
use latchwork_geometry::fine::RectFine;
use latchwork_layout::LogicItemDefinition;
use latchwork_vocabulary::{
    DisplayState, InsertionMode, LogicItemId, LogicItemType, MoveDelta, OrderedLine, Point,
    SegmentPointType, WireId,
};

fn line(x0: i16, y0: i16, x1: i16, y1: i16) -> OrderedLine {
    OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1))
}

fn and_gate() -> LogicItemDefinition {
    LogicItemDefinition::default_for(LogicItemType::AndElement)
}

fn new_circuit() -> EditableCircuit {
    EditableCircuit::new(CircuitConfig::default())
}

/// S1: two wires inserted across each other coalesce into one wire with a
/// four-way cross point.
#[test]
fn crossing_wires_coalesce_into_one_wire() {
    let mut circuit = new_circuit();
    circuit
        .add_wire_segment(line(0, 2, 4, 2), InsertionMode::InsertOrDiscard)
        .unwrap();
    circuit
        .add_wire_segment(line(2, 0, 2, 4), InsertionMode::InsertOrDiscard)
        .unwrap();

    // One inserted wire beyond the two reserved trees.
    assert_eq!(circuit.layout().wires().len(), 3);
    let wire = WireId::FIRST_INSERTED;
    let tree = circuit.layout().wires().tree(wire);
    assert_eq!(tree.len(), 4);

    let crossing = Point::new(2, 2);
    let mut incident = 0;
    for info in tree.segments() {
        if let Some(point_type) = info.type_at(crossing) {
            incident += 1;
            assert_eq!(point_type, SegmentPointType::CrossPoint);
        }
    }
    assert_eq!(incident, 4);

    let segments = circuit.index().query_line_segments(crossing);
    assert_eq!(segments.len(), 4);
    assert!(circuit.index().collision().is_wire_cross_point(crossing));

    circuit.validate();
}

/// S2: a wire ending on a gate's input pin handshakes with it.
#[test]
fn wire_handshakes_with_gate_pin() {
    let mut circuit = new_circuit();
    let gate = circuit
        .add_logicitem(and_gate(), Point::new(5, 0), InsertionMode::InsertOrDiscard)
        .unwrap();
    let part = circuit
        .add_wire_segment(line(3, 0, 5, 0), InsertionMode::InsertOrDiscard)
        .unwrap();

    let pin = Point::new(5, 0);
    let info = circuit
        .layout()
        .wires()
        .tree(part.segment.wire)
        .info(part.segment.index);
    // The wire delivers into the gate, so its endpoint is a wire output.
    assert_eq!(info.p1_type, SegmentPointType::Output);

    let endpoint = circuit.index().wire_outputs().find(pin).unwrap();
    assert_eq!(endpoint.segment, part.segment);
    assert!(circuit.index().wire_inputs().find(pin).is_none());

    let gate_pin = circuit.index().logicitem_inputs().find(pin).unwrap();
    assert_eq!(gate_pin.item, gate);

    // Item plus wire connection in the occupancy record.
    assert!(circuit.index().collision().query(pin).is_logicitem_wire_connection());

    circuit.validate();
}

/// S3: overlapping insertion leaves the second gate colliding, and the
/// promotion attempt has no effect.
#[test]
fn overlapping_gate_stays_colliding() {
    let mut circuit = new_circuit();
    let first = circuit
        .add_logicitem(and_gate(), Point::new(0, 0), InsertionMode::InsertOrDiscard)
        .unwrap();
    let second = circuit
        .add_logicitem(and_gate(), Point::new(0, 0), InsertionMode::Collisions)
        .unwrap();

    assert_eq!(
        circuit.layout().logicitems().display_state(first),
        DisplayState::Normal
    );
    assert_eq!(
        circuit.layout().logicitems().display_state(second),
        DisplayState::Colliding
    );

    let promoted = circuit
        .change_logicitem_insertion_mode(second, InsertionMode::InsertOrDiscard)
        .unwrap();
    assert_eq!(promoted, DisplayState::Colliding);

    // The first gate's index entries are untouched.
    circuit.validate();

    // Discarding on collision removes the item entirely.
    let result = circuit.add_logicitem(and_gate(), Point::new(0, 0), InsertionMode::InsertOrDiscard);
    assert_eq!(result, Err(EditError::Collided));
    assert_eq!(circuit.layout().logicitems().len(), 2);
}

/// S4: moving an inserted gate and undoing restores position, key, and
/// every index.
#[test]
fn move_with_undo_restores_everything() {
    let mut circuit = new_circuit();
    let gate = circuit
        .add_logicitem(and_gate(), Point::new(4, 4), InsertionMode::InsertOrDiscard)
        .unwrap();
    let key = circuit.key_index().logicitem_key(gate);
    circuit.finish_undo_group();

    circuit
        .change_logicitem_insertion_mode(gate, InsertionMode::Temporary)
        .unwrap();
    circuit
        .move_temporary_logicitem(gate, MoveDelta::new(2, 0))
        .unwrap();
    circuit
        .change_logicitem_insertion_mode(gate, InsertionMode::Collisions)
        .unwrap();
    circuit.finish_undo_group();

    assert_eq!(circuit.layout().logicitems().position(gate), Point::new(6, 4));
    circuit.validate();

    circuit.undo();

    let id = circuit.key_index().logicitem_id(key);
    assert_eq!(circuit.layout().logicitems().position(id), Point::new(4, 4));
    assert_eq!(
        circuit.layout().logicitems().display_state(id),
        DisplayState::Normal
    );
    circuit.validate();

    circuit.redo();
    let id = circuit.key_index().logicitem_id(key);
    assert_eq!(circuit.layout().logicitems().position(id), Point::new(6, 4));
    circuit.validate();
}

/// S5: splitting an inserted segment and merging it back.
#[test]
fn split_and_merge_round_trip() {
    let mut circuit = new_circuit();
    let part = circuit
        .add_wire_segment(line(0, 0, 10, 0), InsertionMode::InsertOrDiscard)
        .unwrap();

    let tail = circuit.split_wire_segment(part.segment, Point::new(5, 0));
    let wire = part.segment.wire;
    {
        let tree = circuit.layout().wires().tree(wire);
        assert_eq!(tree.len(), 2);
        let head_info = tree.info(part.segment.index);
        let tail_info = tree.info(tail.segment.index);
        assert_eq!(head_info.line, line(0, 0, 5, 0));
        assert_eq!(tail_info.line, line(5, 0, 10, 0));
        // Two collinear segments meet: a corner, not a cross.
        assert_eq!(head_info.p1_type, SegmentPointType::CornerPoint);
        assert_eq!(tail_info.p0_type, SegmentPointType::CornerPoint);
    }
    circuit.validate();

    let survivor = circuit.merge_wire_segments(part.segment, tail.segment);
    // The lower of the two indices survives.
    assert_eq!(survivor.index, part.segment.index.min(tail.segment.index));
    let tree = circuit.layout().wires().tree(wire);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.line(survivor.index), line(0, 0, 10, 0));
    circuit.validate();
}

/// S6, first half: removing the stem of a T downgrades the junction from a
/// cross point to a corner.
#[test]
fn removing_a_branch_downgrades_cross_to_corner() {
    let mut circuit = new_circuit();
    circuit
        .add_wire_segment(line(0, 0, 4, 0), InsertionMode::InsertOrDiscard)
        .unwrap();
    let stem = circuit
        .add_wire_segment(line(2, 0, 2, 4), InsertionMode::InsertOrDiscard)
        .unwrap();

    // The tee: the horizontal splits at (2, 0), three branches share a cross.
    let junction = Point::new(2, 0);
    assert_eq!(circuit.index().query_line_segments(junction).len(), 3);
    circuit.validate();

    circuit.delete_wire_segment(stem);

    // Still one wire, still connected, junction downgraded.
    assert_eq!(circuit.layout().wires().len(), 3);
    let remaining = circuit.index().query_line_segments(junction);
    assert_eq!(remaining.len(), 2);
    for segment in &remaining {
        let info = circuit.layout().wires().tree(segment.wire).info(segment.index);
        assert_eq!(info.type_at(junction), Some(SegmentPointType::CornerPoint));
    }
    circuit.validate();
}

/// S6, second half: removing a middle segment splits the tree into two
/// wires, and segment keys survive.
#[test]
fn removing_a_middle_segment_splits_the_tree() {
    let mut circuit = new_circuit();
    circuit
        .add_wire_segment(line(0, 0, 4, 0), InsertionMode::InsertOrDiscard)
        .unwrap();
    circuit
        .add_wire_segment(line(4, 0, 4, 4), InsertionMode::InsertOrDiscard)
        .unwrap();
    let far_part = circuit
        .add_wire_segment(line(4, 4, 8, 4), InsertionMode::InsertOrDiscard)
        .unwrap();
    assert_eq!(circuit.layout().wires().len(), 3);
    let far_key = circuit.key_index().segment_key(far_part.segment);

    // Remove the vertical middle; the far horizontal is now disconnected.
    let middle = circuit
        .index()
        .query_line_segments(Point::new(4, 2))
        .first()
        .copied()
        .unwrap();
    let middle_line = circuit
        .layout()
        .wires()
        .tree(middle.wire)
        .line(middle.index);
    assert_eq!(middle_line, line(4, 0, 4, 4));
    circuit.delete_wire_segment(latchwork_vocabulary::SegmentPart::new(
        middle,
        latchwork_geometry::part::full_part(middle_line),
    ));

    // Two inserted wires now exist; the moved component kept its key.
    assert_eq!(circuit.layout().wires().len(), 4);
    let far_segment = circuit.key_index().segment(far_key);
    let far_line = circuit
        .layout()
        .wires()
        .tree(far_segment.wire)
        .line(far_segment.index);
    assert_eq!(far_line, line(4, 4, 8, 4));
    circuit.validate();
}

/// Rectangle selection over gates and wires resolves deterministically and
/// reacts to pops.
#[test]
fn visible_selection_tracks_rectangles() {
    let mut circuit = new_circuit();
    let gate = circuit
        .add_logicitem(and_gate(), Point::new(0, 0), InsertionMode::InsertOrDiscard)
        .unwrap();
    circuit
        .add_wire_segment(line(0, 5, 10, 5), InsertionMode::InsertOrDiscard)
        .unwrap();

    circuit.add_visible_selection_rect(SelectionFunction::Add, RectFine::new(-1.0, -1.0, 11.0, 6.0));
    {
        let resolved = circuit.visible_selection();
        assert!(resolved.is_selected_logicitem(gate));
        assert_eq!(resolved.segments().count(), 1);
    }

    circuit.add_visible_selection_rect(
        SelectionFunction::Subtract,
        RectFine::new(-1.0, -1.0, 11.0, 6.0),
    );
    assert!(circuit.visible_selection().is_empty());

    circuit.try_pop_last_visible_selection_rect();
    assert!(circuit.visible_selection().is_selected_logicitem(gate));

    circuit.apply_all_visible_selection_operations();
    assert!(
        circuit
            .visible_selection()
            .is_selected_logicitem(gate)
    );
}

/// Deleting a tracked selection removes items and wire parts in any state.
#[test]
fn deleting_a_selection_clears_the_layout() {
    let mut circuit = new_circuit();
    let gate = circuit
        .add_logicitem(and_gate(), Point::new(0, 0), InsertionMode::InsertOrDiscard)
        .unwrap();
    let part = circuit
        .add_wire_segment(line(0, 5, 6, 5), InsertionMode::InsertOrDiscard)
        .unwrap();

    let selection = circuit.create_selection();
    circuit.add_to_selection_logicitem(selection, gate);
    circuit.add_to_selection_segment(selection, part);

    circuit.delete_selection(selection);
    assert!(circuit.layout().is_empty());
    circuit.validate();

    // Deleting again is a no-op.
    circuit.delete_selection(selection);
    circuit.destroy_selection(selection);
}

/// Undo across a whole editing session returns to the empty layout.
#[test]
fn history_reverses_a_session() {
    let mut circuit = new_circuit();

    circuit
        .add_logicitem(and_gate(), Point::new(0, 0), InsertionMode::InsertOrDiscard)
        .unwrap();
    circuit.finish_undo_group();

    circuit
        .add_wire_segment(line(2, 0, 6, 0), InsertionMode::InsertOrDiscard)
        .unwrap();
    circuit.finish_undo_group();

    circuit
        .add_wire_segment(line(4, -2, 4, 2), InsertionMode::InsertOrDiscard)
        .unwrap();
    circuit.finish_undo_group();
    circuit.validate();

    circuit.undo();
    circuit.validate();
    circuit.undo();
    circuit.validate();
    circuit.undo();
    circuit.validate();

    assert!(circuit.layout().is_empty());
    assert!(!circuit.history_status().undo_available);
    assert!(circuit.history_status().redo_available);

    circuit.redo();
    circuit.redo();
    circuit.redo();
    circuit.validate();
    assert_eq!(circuit.layout().logicitems().len(), 1);
    assert_eq!(circuit.layout().wires().len(), 3);
    assert!(!circuit.history_status().redo_available);
}

/// A temporary item never touches the indices until it is inserted.
#[test]
fn temporary_items_stay_out_of_the_indices() {
    let mut circuit = new_circuit();
    let gate = circuit
        .add_logicitem(and_gate(), Point::new(0, 0), InsertionMode::Temporary)
        .unwrap();

    assert!(!circuit.has_element(kurbo::Point::new(1.0, 0.5)));
    assert!(circuit.index().collision().is_empty());

    circuit
        .change_logicitem_insertion_mode(gate, InsertionMode::Collisions)
        .unwrap();
    assert!(circuit.has_element(kurbo::Point::new(1.0, 0.5)));
    circuit.validate();
}

/// Out-of-range moves are rejected without mutating anything.
#[test]
fn out_of_range_moves_are_no_ops() {
    let mut circuit = new_circuit();
    let gate = circuit
        .add_logicitem(and_gate(), Point::new(0, 0), InsertionMode::Temporary)
        .unwrap();

    let result = circuit.move_temporary_logicitem(gate, MoveDelta::new(i32::from(i16::MAX), 0));
    assert_eq!(result, Err(EditError::OutOfRange));
    assert_eq!(circuit.layout().logicitems().position(gate), Point::new(0, 0));

    let _ = LogicItemId::new(0);
}
