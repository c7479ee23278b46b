// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-facing wire primitives: adding segments, mode transitions, moves,
//! and deletion.

use latchwork_geometry::line;
use latchwork_geometry::part::{full_part, to_line, to_offset};
use latchwork_vocabulary::{
    DisplayState, InsertionMode, MoveDelta, OrderedLine, Part, Point, Segment, SegmentInfo,
    SegmentKey, SegmentPart, WireId,
};

use crate::editing::wire_detail::{
    add_temporary_segment, fix_and_merge_segments, is_wire_colliding, merge_and_delete_tree,
    move_segment_between_trees, normalize_to_full_segment, remove_segment_part_from_uninserted_tree,
    split_broken_tree, split_line_segment, swap_and_delete_empty_wire,
};
use crate::editing::wire_display_state;
use crate::{CircuitData, EditError};

/// Adds a wire segment in the requested mode.
///
/// The segment starts out temporary; for the inserting modes it runs the
/// insertion pipeline, which may split the line at junctions with existing
/// wires. The returned part refers to the last inserted piece.
pub fn add_wire_segment(
    circuit: &mut CircuitData,
    line: OrderedLine,
    mode: InsertionMode,
) -> Result<SegmentPart, EditError> {
    tracing::debug!(%line, ?mode, "add wire segment");
    let mut segment_part = add_temporary_segment(circuit, line);

    let key = circuit.index.keys().segment_key(segment_part.segment);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_wire_delete_temporary(key, line);
    }

    if mode != InsertionMode::Temporary {
        change_wire_insertion_mode(circuit, &mut segment_part, mode)?;
    }
    Ok(segment_part)
}

/// Changes the insertion mode of a segment part, one lattice step at a time.
///
/// The part is rewritten to its new location. Returns the resulting display
/// state; promoting a still-colliding part reports `Colliding` without
/// effect, and `InsertOrDiscard` on a colliding temporary part deletes it
/// and returns [`EditError::Collided`].
pub fn change_wire_insertion_mode(
    circuit: &mut CircuitData,
    segment_part: &mut SegmentPart,
    mode: InsertionMode,
) -> Result<DisplayState, EditError> {
    let current = wire_display_state(segment_part.segment.wire);

    match (current, mode) {
        (DisplayState::Temporary, InsertionMode::Temporary) => Ok(DisplayState::Temporary),
        (DisplayState::Temporary, InsertionMode::Collisions) => {
            lay_out_wire_part(circuit, segment_part, false)
        }
        (DisplayState::Temporary, InsertionMode::InsertOrDiscard) => {
            lay_out_wire_part(circuit, segment_part, true)
        }

        (DisplayState::Colliding, InsertionMode::Temporary) => {
            let line = part_sub_line(circuit, *segment_part);
            move_segment_between_trees(circuit, segment_part, WireId::TEMPORARY);
            let key = circuit.index.keys().segment_key(segment_part.segment);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_wire_to_mode_colliding(key, line);
            }
            Ok(DisplayState::Temporary)
        }
        (DisplayState::Colliding, InsertionMode::Collisions) => Ok(DisplayState::Colliding),
        (DisplayState::Colliding, InsertionMode::InsertOrDiscard) => {
            let line = part_sub_line(circuit, *segment_part);
            if is_wire_colliding(circuit, line) {
                // Caller policy: the promotion stays pending.
                return Ok(DisplayState::Colliding);
            }
            move_segment_between_trees(circuit, segment_part, WireId::TEMPORARY);
            let key = circuit.index.keys().segment_key(segment_part.segment);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_wire_to_mode_colliding(key, line);
            }
            insert_wire_segment(circuit, segment_part);
            Ok(DisplayState::Normal)
        }

        (DisplayState::Normal, InsertionMode::InsertOrDiscard) => Ok(DisplayState::Normal),
        (DisplayState::Normal, InsertionMode::Collisions) => {
            uninsert_wire_segment(circuit, segment_part);
            Ok(DisplayState::Colliding)
        }
        (DisplayState::Normal, InsertionMode::Temporary) => {
            uninsert_wire_segment(circuit, segment_part);
            let line = part_sub_line(circuit, *segment_part);
            move_segment_between_trees(circuit, segment_part, WireId::TEMPORARY);
            let key = circuit.index.keys().segment_key(segment_part.segment);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_wire_to_mode_colliding(key, line);
            }
            Ok(DisplayState::Temporary)
        }
    }
}

/// Moves an uninserted segment part by `delta`.
///
/// Selections referring to the part stay valid: offsets along the segment
/// are unchanged by a translation.
pub fn move_temporary_segment(
    circuit: &mut CircuitData,
    segment_part: &mut SegmentPart,
    delta: MoveDelta,
) -> Result<(), EditError> {
    assert!(
        !segment_part.segment.wire.is_inserted(),
        "only uninserted segments move freely"
    );

    let sub_line = part_sub_line(circuit, *segment_part);
    let moved_line = line::checked_add(sub_line, delta).ok_or(EditError::OutOfRange)?;

    normalize_to_full_segment(circuit, segment_part);
    circuit
        .layout
        .wires_mut()
        .tree_mut(segment_part.segment.wire)
        .set_info(
            segment_part.segment.index,
            SegmentInfo::with_shadow_points(moved_line),
        );

    let key = circuit.index.keys().segment_key(segment_part.segment);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_wire_move_temporary(key, moved_line, delta.negated());
    }
    Ok(())
}

/// Deletes an uninserted segment part.
///
/// Inserted parts are first taken to temporary by the caller so index
/// invariants are restored before removal.
pub fn delete_temporary_segment_part(circuit: &mut CircuitData, mut segment_part: SegmentPart) {
    assert!(
        !segment_part.segment.wire.is_inserted(),
        "inserted parts transition to temporary before deletion"
    );

    normalize_to_full_segment(circuit, &mut segment_part);
    let key = circuit.index.keys().segment_key(segment_part.segment);
    let sub_line = circuit
        .layout
        .wires()
        .tree(segment_part.segment.wire)
        .line(segment_part.segment.index);

    remove_segment_part_from_uninserted_tree(circuit, segment_part);

    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_wire_create_temporary(key, sub_line);
    }
}

/// Replays a `WireDeleteTemporary` history entry.
///
/// Deletes every uninserted piece covering the recorded span; the key is a
/// fast path that may have retired.
pub fn apply_delete_temporary(circuit: &mut CircuitData, key: SegmentKey, line: OrderedLine) {
    if let Some(segment) = circuit.index.keys().try_segment(key) {
        if !segment.wire.is_inserted() {
            let segment_line = circuit.layout.wires().tree(segment.wire).line(segment.index);
            if segment_line == line {
                delete_temporary_segment_part(
                    circuit,
                    SegmentPart::new(segment, full_part(segment_line)),
                );
                return;
            }
        }
    }

    while let Some(segment_part) = find_uninserted_overlap(circuit, line) {
        delete_temporary_segment_part(circuit, segment_part);
    }
}

/// Replays a `WireMoveTemporary` history entry.
pub fn apply_move_temporary(
    circuit: &mut CircuitData,
    key: SegmentKey,
    line: OrderedLine,
    delta: MoveDelta,
) {
    let mut segment_part = if let Some(segment) = circuit.index.keys().try_segment(key) {
        let segment_line = circuit.layout.wires().tree(segment.wire).line(segment.index);
        SegmentPart::new(segment, full_part(segment_line))
    } else {
        find_uninserted_overlap(circuit, line).expect("recorded segment span must exist")
    };
    move_temporary_segment(circuit, &mut segment_part, delta)
        .expect("recorded move must stay on the grid");
}

/// Any part of an uninserted segment overlapping the given span.
fn find_uninserted_overlap(circuit: &CircuitData, line: OrderedLine) -> Option<SegmentPart> {
    for wire in [WireId::TEMPORARY, WireId::COLLIDING] {
        let tree = circuit.layout.wires().tree(wire);
        for index in tree.indices() {
            let segment_line = tree.line(index);
            if let Some(overlap) = collinear_overlap(segment_line, line) {
                let part = Part::new(
                    to_offset(segment_line, overlap.p0),
                    to_offset(segment_line, overlap.p1),
                );
                return Some(SegmentPart::new(Segment::new(wire, index), part));
            }
        }
    }
    None
}

/// Restores a deleted temporary segment under its original key.
///
/// History replay only; ordinary callers use [`add_wire_segment`].
pub fn restore_temporary_segment(
    circuit: &mut CircuitData,
    key: SegmentKey,
    line: OrderedLine,
) -> SegmentPart {
    let segment_part = add_temporary_segment(circuit, line);
    circuit
        .index
        .keys_mut()
        .set_segment_key(segment_part.segment, key);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_wire_delete_temporary(key, line);
    }
    segment_part
}

/// Moves a segment part into the colliding tree without collision checks.
///
/// History replay only: restores a recorded colliding state exactly.
pub fn force_wire_colliding(circuit: &mut CircuitData, segment_part: &mut SegmentPart) {
    let current = wire_display_state(segment_part.segment.wire);
    match current {
        DisplayState::Colliding => {}
        DisplayState::Temporary => {
            let line = part_sub_line(circuit, *segment_part);
            move_segment_between_trees(circuit, segment_part, WireId::COLLIDING);
            let key = circuit.index.keys().segment_key(segment_part.segment);
            if let Some(stack) = circuit.history.recording_stack() {
                stack.push_wire_to_mode_temporary(key, line);
            }
        }
        DisplayState::Normal => {
            uninsert_wire_segment(circuit, segment_part);
        }
    }
}

/// The sub-line a segment part covers.
pub fn part_sub_line(circuit: &CircuitData, segment_part: SegmentPart) -> OrderedLine {
    let line = circuit
        .layout
        .wires()
        .tree(segment_part.segment.wire)
        .line(segment_part.segment.index);
    to_line(line, segment_part.part)
}

/// The part of `segment` covering `sub_line`, for history replay.
///
/// # Panics
///
/// Panics if the sub-line does not lie on the segment.
pub fn part_of_sub_line(
    circuit: &CircuitData,
    segment: Segment,
    sub_line: OrderedLine,
) -> SegmentPart {
    let line = circuit.layout.wires().tree(segment.wire).line(segment.index);
    let part = Part::new(to_offset(line, sub_line.p0), to_offset(line, sub_line.p1));
    SegmentPart::new(segment, part)
}

fn lay_out_wire_part(
    circuit: &mut CircuitData,
    segment_part: &mut SegmentPart,
    discard_on_collision: bool,
) -> Result<DisplayState, EditError> {
    let line = part_sub_line(circuit, *segment_part);

    if is_wire_colliding(circuit, line) {
        if discard_on_collision {
            delete_temporary_segment_part(circuit, *segment_part);
            return Err(EditError::Collided);
        }
        move_segment_between_trees(circuit, segment_part, WireId::COLLIDING);
        let key = circuit.index.keys().segment_key(segment_part.segment);
        if let Some(stack) = circuit.history.recording_stack() {
            stack.push_wire_to_mode_temporary(key, line);
        }
        return Ok(DisplayState::Colliding);
    }

    insert_wire_segment(circuit, segment_part);
    Ok(DisplayState::Normal)
}

/// Runs the insertion pipeline on a temporary segment part.
///
/// The line is split wherever it touches an existing inserted wire; each
/// piece joins (and possibly merges) the trees it touches, junction types
/// are fixed up, and coincident logic-item pins are adopted. The part is
/// rewritten to the last piece's location.
///
/// # Panics
///
/// Panics if the line would collide; callers check first.
pub(crate) fn insert_wire_segment(circuit: &mut CircuitData, segment_part: &mut SegmentPart) {
    normalize_to_full_segment(circuit, segment_part);
    let line = circuit
        .layout
        .wires()
        .tree(segment_part.segment.wire)
        .line(segment_part.segment.index);
    assert!(
        !is_wire_colliding(circuit, line),
        "insertion pipeline requires a collision-free line"
    );

    // Points where the new line crosses or touches existing inserted wires;
    // the segment is split there so every junction gets its cross point.
    let split_points: Vec<Point> = line::interior_points(line)
        .filter(|point| !circuit.index.query_line_segments(*point).is_empty())
        .collect();

    // Track pieces by key: inserting one piece renumbers the rest. Pieces
    // split off here are new temporary segments, so each needs its own
    // delete entry for undo.
    let mut piece_keys: Vec<SegmentKey> = Vec::new();
    let mut cursor = *segment_part;
    for point in split_points {
        piece_keys.push(circuit.index.keys().segment_key(cursor.segment));
        cursor = split_line_segment(circuit, cursor.segment, point);
        let tail_key = circuit.index.keys().segment_key(cursor.segment);
        let tail_line = circuit
            .layout
            .wires()
            .tree(cursor.segment.wire)
            .line(cursor.segment.index);
        if let Some(stack) = circuit.history.recording_stack() {
            stack.push_wire_delete_temporary(tail_key, tail_line);
        }
    }
    piece_keys.push(circuit.index.keys().segment_key(cursor.segment));

    for key in piece_keys {
        let segment = circuit.index.keys().segment(key);
        let piece_line = circuit.layout.wires().tree(segment.wire).line(segment.index);
        let mut piece = SegmentPart::new(segment, full_part(piece_line));

        insert_single_piece(circuit, &mut piece);

        // The piece may have merged into a neighbor; record its final span.
        let final_key = circuit.index.keys().segment_key(piece.segment);
        let final_line = part_sub_line(circuit, piece);
        if let Some(stack) = circuit.history.recording_stack() {
            stack.push_wire_to_mode_temporary(final_key, final_line);
        }
        *segment_part = piece;
    }
}

fn insert_single_piece(circuit: &mut CircuitData, piece: &mut SegmentPart) {
    let line = circuit
        .layout
        .wires()
        .tree(piece.segment.wire)
        .line(piece.segment.index);
    let endpoints = [line.p0, line.p1];

    // Merge every adjacent inserted tree pairwise until one remains.
    loop {
        let wires = adjacent_wires(circuit, endpoints);
        if wires.len() < 2 {
            break;
        }
        let mut destination = wires[0];
        let mut source = wires[1];
        merge_and_delete_tree(circuit, &mut destination, &mut source);
    }

    let destination = match adjacent_wires(circuit, endpoints).first() {
        Some(wire) => *wire,
        None => circuit.layout.wires_mut().add_wire(),
    };

    // An endpoint landing inside an existing segment splits it first.
    for point in endpoints {
        let touching = circuit.index.query_line_segments(point);
        for segment in touching {
            let segment_line = circuit.layout.wires().tree(segment.wire).line(segment.index);
            if line::contains_point_interior(segment_line, point) {
                split_line_segment(circuit, segment, point);
                break;
            }
        }
    }

    move_segment_between_trees(circuit, piece, destination);

    fix_and_merge_segments(circuit, endpoints[0], Some(piece));
    fix_and_merge_segments(circuit, endpoints[1], Some(piece));
}

fn adjacent_wires(circuit: &CircuitData, endpoints: [Point; 2]) -> Vec<WireId> {
    let mut wires: Vec<WireId> = Vec::new();
    for point in endpoints {
        for segment in circuit.index.query_line_segments(point) {
            if !wires.contains(&segment.wire) {
                wires.push(segment.wire);
            }
        }
    }
    wires.sort_unstable();
    wires
}

/// Replays a `WireToModeTemporary` history entry.
///
/// The recorded span may since have been split across several inserted
/// segments or merged into a longer one by junction repairs, and the
/// recorded key may have retired in a merge. Every inserted piece covering
/// the span is demoted; the earlier entries of the group address the
/// resulting temporary pieces by geometry.
pub fn apply_to_mode_temporary(
    circuit: &mut CircuitData,
    key: SegmentKey,
    line: OrderedLine,
) {
    if let Some(segment) = circuit.index.keys().try_segment(key) {
        if !segment.wire.is_inserted() {
            // Still a single uninserted segment; the simple path.
            let mut part = part_of_sub_line(circuit, segment, line);
            let state = change_wire_insertion_mode(circuit, &mut part, InsertionMode::Temporary);
            assert!(
                state == Ok(DisplayState::Temporary),
                "history replay diverged"
            );
            return;
        }
    }

    // Demote every inserted piece of the span.
    let mut demoted = 0_usize;
    loop {
        let found = line::points(line).find_map(|point| {
            circuit
                .index
                .query_line_segments(point)
                .into_iter()
                .find_map(|segment| {
                    let segment_line =
                        circuit.layout.wires().tree(segment.wire).line(segment.index);
                    collinear_overlap(segment_line, line)
                        .map(|overlap| (segment, segment_line, overlap))
                })
        });
        let Some((segment, segment_line, overlap)) = found else {
            break;
        };

        let part = Part::new(
            to_offset(segment_line, overlap.p0),
            to_offset(segment_line, overlap.p1),
        );
        let mut segment_part = SegmentPart::new(segment, part);
        let state =
            change_wire_insertion_mode(circuit, &mut segment_part, InsertionMode::Temporary);
        assert!(
            state == Ok(DisplayState::Temporary),
            "history replay diverged"
        );
        demoted += 1;
    }
    assert!(demoted > 0, "recorded span must still exist");
}

/// The positive-length overlap of two collinear lines, if any.
fn collinear_overlap(a: OrderedLine, b: OrderedLine) -> Option<OrderedLine> {
    if !line::is_parallel(a, b) {
        return None;
    }
    if line::is_horizontal(a) {
        if a.p0.y != b.p0.y {
            return None;
        }
        let x0 = a.p0.x.max(b.p0.x);
        let x1 = a.p1.x.min(b.p1.x);
        (x0 < x1).then(|| OrderedLine::new(Point { x: x0, y: a.p0.y }, Point { x: x1, y: a.p0.y }))
    } else {
        if a.p0.x != b.p0.x {
            return None;
        }
        let y0 = a.p0.y.max(b.p0.y);
        let y1 = a.p1.y.min(b.p1.y);
        (y0 < y1).then(|| OrderedLine::new(Point { x: a.p0.x, y: y0 }, Point { x: a.p0.x, y: y1 }))
    }
}

/// Takes an inserted segment part out of its tree into the colliding tree,
/// repairing the tree left behind.
pub(crate) fn uninsert_wire_segment(circuit: &mut CircuitData, segment_part: &mut SegmentPart) {
    normalize_to_full_segment(circuit, segment_part);
    let wire = segment_part.segment.wire;
    let line = circuit
        .layout
        .wires()
        .tree(wire)
        .line(segment_part.segment.index);

    move_segment_between_trees(circuit, segment_part, WireId::COLLIDING);

    let key = circuit.index.keys().segment_key(segment_part.segment);
    if let Some(stack) = circuit.history.recording_stack() {
        stack.push_wire_to_mode_insert(key, line);
    }

    if circuit.layout.wires().tree(wire).is_empty() {
        swap_and_delete_empty_wire(circuit, wire, None);
        return;
    }

    fix_and_merge_segments(circuit, line.p0, None);
    fix_and_merge_segments(circuit, line.p1, None);
    split_broken_tree(circuit, line.p0, line.p1);
}
