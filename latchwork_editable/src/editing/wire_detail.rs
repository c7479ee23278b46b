// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wire segment surgery: splitting, merging, cross-tree moves, and tree
//! repair.
//!
//! Restructuring an inserted segment always follows the same choreography:
//! uninsert the affected segments, reshape the tree while reporting part
//! moves, then re-insert. Every index stays consistent by construction, and
//! the stable-key bookkeeping rides on the `SegmentPartMoved` flags.

use latchwork_geometry::line;
use latchwork_geometry::part::{full_part, to_line, to_offset, to_point};
use latchwork_vocabulary::{
    Endpoints, Offset, OrderedLine, Part, Point, Segment, SegmentIndex, SegmentInfo, SegmentKey,
    SegmentPart, SegmentPointType, WireId,
};

use latchwork_layout::InfoMessage;

use crate::CircuitData;

/// Appends a free-floating segment to the temporary tree.
pub fn add_temporary_segment(circuit: &mut CircuitData, line: OrderedLine) -> SegmentPart {
    let tree = circuit.layout.wires_mut().tree_mut(WireId::TEMPORARY);
    let index = tree.add_segment(SegmentInfo::with_shadow_points(line));
    let segment = Segment::new(WireId::TEMPORARY, index);

    circuit.submit(InfoMessage::SegmentCreated {
        segment,
        size: Offset::new(line::distance(line)),
    });

    SegmentPart::new(segment, full_part(line))
}

/// Splits a segment at an interior grid point.
///
/// The head keeps the segment's index and its `p0` type; the tail is a new
/// segment keeping the old `p1` type. On inserted trees the shared endpoint
/// becomes a corner point on both sides (a later
/// [`fix_and_merge_segments`] may promote it to a cross point); on
/// uninserted trees it stays a shadow point. Valid parts are redistributed
/// by offset.
///
/// Returns the tail as a full segment part.
///
/// # Panics
///
/// Panics if `position` is not strictly interior to the segment's line.
pub fn split_line_segment(
    circuit: &mut CircuitData,
    segment: Segment,
    position: Point,
) -> SegmentPart {
    let inserted = segment.wire.is_inserted();
    let info = circuit.layout.wires().tree(segment.wire).info(segment.index);
    assert!(
        line::contains_point_interior(info.line, position),
        "split position must be strictly interior"
    );

    if inserted {
        circuit.submit(InfoMessage::SegmentUninserted { segment, info });
    }

    let offset = to_offset(info.line, position);
    let shared = if inserted {
        SegmentPointType::CornerPoint
    } else {
        SegmentPointType::ShadowPoint
    };
    let head_info = SegmentInfo {
        line: OrderedLine::new(info.line.p0, position),
        p0_type: info.p0_type,
        p1_type: shared,
    };
    let tail_info = SegmentInfo {
        line: OrderedLine::new(position, info.line.p1),
        p0_type: shared,
        p1_type: info.p1_type,
    };

    let tail_segment;
    let full_len = line::distance(info.line);
    {
        let tree = circuit.layout.wires_mut().tree_mut(segment.wire);
        let mut head_parts = tree.valid_parts(segment.index).clone();
        let tail_parts = head_parts.split_off(offset);

        tree.set_info(segment.index, head_info);
        tree.set_valid_parts(segment.index, head_parts);

        let tail_index = tree.add_segment(tail_info);
        tree.set_valid_parts(tail_index, tail_parts);
        tail_segment = Segment::new(segment.wire, tail_index);
    }

    circuit.submit(InfoMessage::SegmentPartMoved {
        destination: SegmentPart::new(
            tail_segment,
            Part::new(Offset::new(0), Offset::new(full_len - offset.get())),
        ),
        source: SegmentPart::new(segment, Part::new(offset, Offset::new(full_len))),
        create_destination: true,
        delete_source: false,
    });

    if inserted {
        circuit.submit(InfoMessage::SegmentInserted {
            segment,
            info: head_info,
        });
        circuit.submit(InfoMessage::SegmentInserted {
            segment: tail_segment,
            info: tail_info,
        });
    }

    SegmentPart::new(tail_segment, full_part(tail_info.line))
}

/// Merges two collinear segments of one tree that share an endpoint.
///
/// The segment with the smaller index survives; the other's key retires. The
/// shared endpoint must not be a connection (`Input`/`Output`/`CrossPoint`).
/// `preserve` is rewritten in place so a caller's reference survives the
/// merge and any renumbering it causes.
///
/// Returns the surviving segment.
pub fn merge_line_segments(
    circuit: &mut CircuitData,
    segment_0: Segment,
    segment_1: Segment,
    mut preserve: Option<&mut SegmentPart>,
) -> Segment {
    assert!(
        segment_0.wire == segment_1.wire && segment_0.index != segment_1.index,
        "merge requires two distinct segments of one wire"
    );
    let (keep, remove) = if segment_0.index < segment_1.index {
        (segment_0, segment_1)
    } else {
        (segment_1, segment_0)
    };

    let inserted = keep.wire.is_inserted();
    let keep_info = circuit.layout.wires().tree(keep.wire).info(keep.index);
    let remove_info = circuit.layout.wires().tree(remove.wire).info(remove.index);

    assert!(
        line::is_parallel(keep_info.line, remove_info.line),
        "merge requires collinear segments"
    );
    // Which segment comes first along the axis; they must touch end-to-start.
    let keep_first = keep_info.line.p1 == remove_info.line.p0;
    assert!(
        keep_first || remove_info.line.p1 == keep_info.line.p0,
        "merge requires segments sharing an endpoint"
    );
    let shared_type = if keep_first {
        keep_info.p1_type
    } else {
        keep_info.p0_type
    };
    assert!(
        !shared_type.is_connection(),
        "merge must not erase a connection point"
    );

    if inserted {
        circuit.submit(InfoMessage::SegmentUninserted {
            segment: keep,
            info: keep_info,
        });
        circuit.submit(InfoMessage::SegmentUninserted {
            segment: remove,
            info: remove_info,
        });
    }

    let keep_len = line::distance(keep_info.line);
    let remove_len = line::distance(remove_info.line);
    let merged_info = if keep_first {
        SegmentInfo {
            line: OrderedLine::new(keep_info.line.p0, remove_info.line.p1),
            p0_type: keep_info.p0_type,
            p1_type: remove_info.p1_type,
        }
    } else {
        SegmentInfo {
            line: OrderedLine::new(remove_info.line.p0, keep_info.line.p1),
            p0_type: remove_info.p0_type,
            p1_type: keep_info.p1_type,
        }
    };

    // Reshape the tree and compute the merged valid parts.
    {
        let tree = circuit.layout.wires_mut().tree_mut(keep.wire);
        let keep_parts = tree.valid_parts(keep.index).clone();
        let remove_parts = tree.valid_parts(remove.index).clone();

        let merged_parts = if keep_first {
            let mut parts = keep_parts;
            parts.extend_shifted(&remove_parts, Offset::new(keep_len));
            parts
        } else {
            let mut parts = remove_parts;
            parts.extend_shifted(&keep_parts, Offset::new(remove_len));
            parts
        };

        tree.set_info(keep.index, merged_info);
        tree.set_valid_parts(keep.index, merged_parts);
    }

    // Report the part moves so selections and keys stay aligned.
    if keep_first {
        circuit.submit(InfoMessage::SegmentPartMoved {
            destination: SegmentPart::new(
                keep,
                Part::from_range(keep_len, keep_len + remove_len),
            ),
            source: SegmentPart::new(remove, Part::from_range(0, remove_len)),
            create_destination: false,
            delete_source: true,
        });
    } else {
        circuit.submit(InfoMessage::SegmentPartMoved {
            destination: SegmentPart::new(
                keep,
                Part::from_range(remove_len, remove_len + keep_len),
            ),
            source: SegmentPart::new(keep, Part::from_range(0, keep_len)),
            create_destination: false,
            delete_source: false,
        });
        circuit.submit(InfoMessage::SegmentPartMoved {
            destination: SegmentPart::new(keep, Part::from_range(0, remove_len)),
            source: SegmentPart::new(remove, Part::from_range(0, remove_len)),
            create_destination: false,
            delete_source: true,
        });
    }

    // Rewrite the caller's reference before indices shuffle underneath it.
    if let Some(part) = preserve.as_deref_mut() {
        if part.segment == remove {
            let base = if keep_first { keep_len } else { 0 };
            part.segment = keep;
            part.part = Part::from_range(
                part.part.begin.get() + base,
                part.part.end.get() + base,
            );
        } else if part.segment == keep && !keep_first {
            part.part = Part::from_range(
                part.part.begin.get() + remove_len,
                part.part.end.get() + remove_len,
            );
        }
    }

    let renumbered = remove_segment_with_renumber(circuit, remove);
    if let (Some(part), Some(old_index)) = (preserve, renumbered) {
        if part.segment == Segment::new(remove.wire, old_index) {
            part.segment = remove;
        }
    }

    if inserted {
        circuit.submit(InfoMessage::SegmentInserted {
            segment: keep,
            info: merged_info,
        });
    }

    keep
}

/// Merges every pair in `pairs`, in an order that keeps pending pairs valid.
///
/// Merging deletes the segment with the higher index, so pairs are processed
/// in descending order; after each merge, a pending pair that still names the
/// deleted segment is rewritten to the survivor and the tail re-sorted. The
/// final id mapping is part of the contract: callers depend on the survivor
/// of each pair being the smaller index.
pub fn merge_all_line_segments(circuit: &mut CircuitData, pairs: &mut Vec<(Segment, Segment)>) {
    for pair in pairs.iter_mut() {
        if pair.0 < pair.1 {
            core::mem::swap(&mut pair.0, &mut pair.1);
        }
    }
    pairs.sort_unstable_by(|a, b| b.cmp(a));

    let mut index = 0;
    while index < pairs.len() {
        let (first, second) = pairs[index];
        merge_line_segments(circuit, first, second, None);

        // At most one other pair still references the merged-away segment;
        // it continues under the survivor's index.
        if let Some(offset) = pairs[index + 1..].iter().position(|pair| pair.0 == first) {
            let position = index + 1 + offset;
            pairs[position].0 = second;
            if pairs[position].0 < pairs[position].1 {
                let pair = &mut pairs[position];
                core::mem::swap(&mut pair.0, &mut pair.1);
            }
            pairs[index + 1..].sort_unstable_by(|a, b| b.cmp(a));
        }

        index += 1;
    }
    pairs.clear();
}

/// Moves `segment_part` into `destination_id`, splitting as needed.
///
/// Either tree may be inserted or uninserted. A segment arriving in an
/// uninserted tree gets shadow endpoints; arriving in an inserted tree it
/// keeps its endpoint types and is announced with `SegmentInserted`.
pub fn move_segment_between_trees(
    circuit: &mut CircuitData,
    segment_part: &mut SegmentPart,
    destination_id: WireId,
) {
    normalize_to_full_segment(circuit, segment_part);
    move_full_segment(circuit, segment_part, destination_id);
}

/// Splits around `segment_part` until it covers a whole segment.
pub fn normalize_to_full_segment(circuit: &mut CircuitData, segment_part: &mut SegmentPart) {
    let line = circuit
        .layout
        .wires()
        .tree(segment_part.segment.wire)
        .line(segment_part.segment.index);
    let full = full_part(line);

    if segment_part.part.end < full.end {
        let position = to_point(line, segment_part.part.end);
        split_line_segment(circuit, segment_part.segment, position);
    }
    if segment_part.part.begin > Offset::new(0) {
        let position = to_point(line, segment_part.part.begin);
        let tail = split_line_segment(circuit, segment_part.segment, position);
        *segment_part = tail;
    } else {
        let line = circuit
            .layout
            .wires()
            .tree(segment_part.segment.wire)
            .line(segment_part.segment.index);
        segment_part.part = full_part(line);
    }
}

/// Moves one whole segment to another tree.
fn move_full_segment(
    circuit: &mut CircuitData,
    segment_part: &mut SegmentPart,
    destination_id: WireId,
) {
    let source = segment_part.segment;
    assert!(source.wire != destination_id, "move requires distinct trees");
    let source_inserted = source.wire.is_inserted();
    let destination_inserted = destination_id.is_inserted();

    let info = circuit.layout.wires().tree(source.wire).info(source.index);
    debug_assert!(
        segment_part.part == full_part(info.line),
        "only full segments move between trees"
    );

    if source_inserted {
        circuit.submit(InfoMessage::SegmentUninserted {
            segment: source,
            info,
        });
    }

    let stored_info = if destination_inserted {
        info
    } else {
        SegmentInfo::with_shadow_points(info.line)
    };

    let destination_segment;
    {
        let valid_parts = circuit
            .layout
            .wires()
            .tree(source.wire)
            .valid_parts(source.index)
            .clone();
        let tree = circuit.layout.wires_mut().tree_mut(destination_id);
        let index = tree.add_segment(stored_info);
        tree.set_valid_parts(index, valid_parts);
        destination_segment = Segment::new(destination_id, index);
    }

    let len = line::distance(info.line);
    circuit.submit(InfoMessage::SegmentPartMoved {
        destination: SegmentPart::new(destination_segment, Part::from_range(0, len)),
        source: SegmentPart::new(source, Part::from_range(0, len)),
        create_destination: true,
        delete_source: true,
    });

    remove_segment_with_renumber(circuit, source);

    if destination_inserted {
        circuit.submit(InfoMessage::SegmentInserted {
            segment: destination_segment,
            info: stored_info,
        });
    }

    *segment_part = SegmentPart::new(destination_segment, Part::from_range(0, len));
}

/// Removes a segment from its tree, reporting the swap-and-pop renumbering.
///
/// Returns the old index of the segment that moved into the freed slot.
fn remove_segment_with_renumber(circuit: &mut CircuitData, segment: Segment) -> Option<SegmentIndex> {
    let inserted = segment.wire.is_inserted();
    let moved = circuit
        .layout
        .wires_mut()
        .tree_mut(segment.wire)
        .remove_segment(segment.index);

    if let Some(old_index) = moved {
        let old_segment = Segment::new(segment.wire, old_index);
        circuit.submit(InfoMessage::SegmentIdUpdated {
            new_segment: segment,
            old_segment,
        });
        if inserted {
            let info = circuit.layout.wires().tree(segment.wire).info(segment.index);
            circuit.submit(InfoMessage::InsertedSegmentIdUpdated {
                new_segment: segment,
                old_segment,
                info,
            });
        }
    }
    moved
}

/// Deletes part of an uninserted segment.
///
/// Touching the begin or end shrinks the segment in place; a middle part
/// splits first. The whole segment is removed when the part covers it.
pub fn remove_segment_part_from_uninserted_tree(
    circuit: &mut CircuitData,
    segment_part: SegmentPart,
) {
    let segment = segment_part.segment;
    assert!(!segment.wire.is_inserted(), "only uninserted parts are deleted directly");

    let line = circuit.layout.wires().tree(segment.wire).line(segment.index);
    let full = full_part(line);
    let part = segment_part.part;
    assert!(full.contains(part), "part must lie within the segment");

    if part == full {
        circuit.submit(InfoMessage::SegmentPartDeleted {
            segment_part,
            delete_segment: true,
        });
        remove_segment_with_renumber(circuit, segment);
        return;
    }

    if part.begin > Offset::new(0) && part.end < full.end {
        // Middle: split behind the part, then fall through to the
        // end-touching case.
        split_line_segment(circuit, segment, to_point(line, part.end));
    }

    let line = circuit.layout.wires().tree(segment.wire).line(segment.index);
    let full = full_part(line);

    circuit.submit(InfoMessage::SegmentPartDeleted {
        segment_part: SegmentPart::new(segment, part),
        delete_segment: false,
    });

    if part.begin == Offset::new(0) {
        // Shrink from the front; remaining offsets rebase to zero.
        let remaining = Part::new(part.end, full.end);
        let new_line = to_line(line, remaining);
        {
            let tree = circuit.layout.wires_mut().tree_mut(segment.wire);
            let tail_parts = tree.valid_parts(segment.index).clone().split_off(part.end);
            tree.set_info(segment.index, SegmentInfo::with_shadow_points(new_line));
            tree.set_valid_parts(segment.index, tail_parts);
        }
        circuit.submit(InfoMessage::SegmentPartMoved {
            destination: SegmentPart::new(segment, Part::from_range(0, remaining.len())),
            source: SegmentPart::new(segment, remaining),
            create_destination: false,
            delete_source: false,
        });
    } else {
        // Shrink from the back; offsets are unchanged.
        let remaining = Part::new(Offset::new(0), part.begin);
        let new_line = to_line(line, remaining);
        let tree = circuit.layout.wires_mut().tree_mut(segment.wire);
        let mut head_parts = tree.valid_parts(segment.index).clone();
        let _ = head_parts.split_off(part.begin);
        tree.set_info(segment.index, SegmentInfo::with_shadow_points(new_line));
        tree.set_valid_parts(segment.index, head_parts);
    }
}

/// Deletes an inserted wire whose tree has become empty, renumbering the
/// wire that takes its slot. `preserve` is rewritten across the swap.
pub fn swap_and_delete_empty_wire(
    circuit: &mut CircuitData,
    wire_id: WireId,
    preserve: Option<&mut WireId>,
) {
    assert!(
        circuit.layout.wires().tree(wire_id).is_empty(),
        "only empty wires are deleted"
    );

    let moved = circuit.layout.wires_mut().swap_delete(wire_id);
    let Some(old_wire) = moved else {
        return;
    };

    // Every segment of the relocated tree changes its wire id.
    let indices: Vec<_> = circuit.layout.wires().tree(wire_id).indices().collect();
    for index in indices {
        let new_segment = Segment::new(wire_id, index);
        let old_segment = Segment::new(old_wire, index);
        let info = circuit.layout.wires().tree(wire_id).info(index);
        circuit.submit(InfoMessage::SegmentIdUpdated {
            new_segment,
            old_segment,
        });
        circuit.submit(InfoMessage::InsertedSegmentIdUpdated {
            new_segment,
            old_segment,
            info,
        });
    }

    if let Some(preserved) = preserve {
        if *preserved == old_wire {
            *preserved = wire_id;
        }
    }
}

/// Moves every segment of `source` into `destination` and deletes the empty
/// source wire. Both ids are rewritten across renumbering.
pub fn merge_and_delete_tree(
    circuit: &mut CircuitData,
    destination: &mut WireId,
    source: &mut WireId,
) {
    assert!(
        destination.is_inserted() && source.is_inserted(),
        "tree merges operate on inserted wires"
    );

    while let Some(index) = circuit.layout.wires().tree(*source).indices().next_back() {
        let line = circuit.layout.wires().tree(*source).line(index);
        let mut part = SegmentPart::new(Segment::new(*source, index), full_part(line));
        move_full_segment(circuit, &mut part, *destination);
    }

    let source_id = *source;
    swap_and_delete_empty_wire(circuit, source_id, Some(destination));
    *source = *destination;
}

/// The connected component of the tree containing `start`, as segment keys.
fn connected_component_keys(circuit: &CircuitData, wire: WireId, start: Point) -> Vec<SegmentKey> {
    let tree = circuit.layout.wires().tree(wire);

    let mut visited: Vec<bool> = vec![false; tree.len()];
    let mut frontier: Vec<Point> = vec![start];

    while let Some(point) = frontier.pop() {
        for index in tree.indices() {
            if visited[index.index()] {
                continue;
            }
            let info = tree.info(index);
            if info.line.p0 == point || info.line.p1 == point {
                visited[index.index()] = true;
                frontier.push(if info.line.p0 == point {
                    info.line.p1
                } else {
                    info.line.p0
                });
            }
        }
    }

    tree.indices()
        .filter(|index| visited[index.index()])
        .map(|index| circuit.index.keys().segment_key(Segment::new(wire, index)))
        .collect()
}

/// Repairs a tree whose segment between `p0` and `p1` was removed.
///
/// If the remaining segments are no longer connected, the component around
/// `p1` moves to a fresh wire, whose id is returned. Segment keys survive
/// the move.
pub fn split_broken_tree(circuit: &mut CircuitData, p0: Point, p1: Point) -> Option<WireId> {
    let segments = circuit.index.query_line_segments(p1);
    let wire = segments.first()?.wire;
    if !wire.is_inserted() {
        return None;
    }

    let component = connected_component_keys(circuit, wire, p1);
    if component.len() == circuit.layout.wires().tree(wire).len() {
        // Still connected through another path around the removed span.
        return None;
    }
    debug_assert!(
        !connected_component_keys(circuit, wire, p0)
            .iter()
            .any(|key| component.contains(key)),
        "a disconnected component must not reach the far side"
    );

    let new_wire = circuit.layout.wires_mut().add_wire();
    for key in component {
        let segment = circuit.index.keys().segment(key);
        let line = circuit.layout.wires().tree(segment.wire).line(segment.index);
        let mut part = SegmentPart::new(segment, full_part(line));
        move_full_segment(circuit, &mut part, new_wire);
    }

    Some(new_wire)
}

/// Sets endpoint types of segments at one position.
///
/// For inserted segments a message is emitted even when the type is
/// unchanged: re-affirming an endpoint re-registers its collision entry
/// after a neighboring uninsert cleared the shared point.
pub fn update_segment_point_types(
    circuit: &mut CircuitData,
    position: Point,
    updates: &[(Segment, SegmentPointType)],
) {
    for (segment, point_type) in updates {
        let info = circuit.layout.wires().tree(segment.wire).info(segment.index);
        let new_info = info.with_type_at(position, *point_type);
        if new_info != info {
            circuit
                .layout
                .wires_mut()
                .tree_mut(segment.wire)
                .set_info(segment.index, new_info);
        }
        if segment.wire.is_inserted() {
            circuit.submit(InfoMessage::InsertedEndPointsUpdated {
                segment: *segment,
                new_info,
                old_info: info,
            });
        }
    }
}

/// Restores shadow endpoints on an uninserted segment.
pub fn reset_uninserted_endpoints(circuit: &mut CircuitData, segment: Segment) {
    assert!(!segment.wire.is_inserted(), "segment must be uninserted");
    circuit
        .layout
        .wires_mut()
        .tree_mut(segment.wire)
        .set_endpoints(segment.index, Endpoints::SHADOW);
}

/// Marks a temporary cross point on an uninserted segment, used to preserve
/// junctions through a paste preview.
pub fn set_uninserted_crosspoint(circuit: &mut CircuitData, segment: Segment, point: Point) {
    assert!(!segment.wire.is_inserted(), "segment must be uninserted");
    let tree = circuit.layout.wires_mut().tree_mut(segment.wire);
    let info = tree.info(segment.index);
    tree.set_info(
        segment.index,
        info.with_type_at(point, SegmentPointType::CrossPoint),
    );
}

/// Whether inserting a wire along `line` would collide.
#[must_use]
pub fn is_wire_colliding(circuit: &CircuitData, line: OrderedLine) -> bool {
    circuit.index.collision().is_colliding_line(line)
}

/// Normalizes the junction at `position`: merges leftover collinear pairs,
/// maintains corner and cross points, and adopts logic-item pins.
///
/// `preserve` is rewritten in place when a merge consumes the segment it
/// refers to.
pub fn fix_and_merge_segments(
    circuit: &mut CircuitData,
    position: Point,
    preserve: Option<&mut SegmentPart>,
) {
    let segments = circuit.index.query_line_segments(position);

    match segments.len() {
        0 => {}
        1 => {
            fix_single_endpoint(circuit, segments[0], position);
        }
        2 => {
            let (a, b) = (segments[0], segments[1]);
            let line_a = circuit.layout.wires().tree(a.wire).line(a.index);
            let line_b = circuit.layout.wires().tree(b.wire).line(b.index);
            debug_assert!(a.wire == b.wire, "junction segments must share a tree");

            if line::is_parallel(line_a, line_b) {
                let type_a = endpoint_type_at(circuit, a, position);
                let type_b = endpoint_type_at(circuit, b, position);
                if type_a.is_connection() || type_b.is_connection() {
                    // A former cross point down to two branches.
                    update_segment_point_types(
                        circuit,
                        position,
                        &[
                            (a, SegmentPointType::CornerPoint),
                            (b, SegmentPointType::CornerPoint),
                        ],
                    );
                } else {
                    merge_line_segments(circuit, a, b, preserve);
                }
            } else {
                update_segment_point_types(
                    circuit,
                    position,
                    &[
                        (a, SegmentPointType::CornerPoint),
                        (b, SegmentPointType::CornerPoint),
                    ],
                );
            }
        }
        _ => {
            let updates: Vec<_> = segments
                .iter()
                .map(|segment| (*segment, SegmentPointType::CrossPoint))
                .collect();
            update_segment_point_types(circuit, position, &updates);
        }
    }
}

fn endpoint_type_at(circuit: &CircuitData, segment: Segment, position: Point) -> SegmentPointType {
    circuit
        .layout
        .wires()
        .tree(segment.wire)
        .info(segment.index)
        .type_at(position)
        .expect("junction point must be a segment endpoint")
}

/// One segment ends at `position`: adopt a coincident logic-item pin, or
/// fall back to a shadow point.
fn fix_single_endpoint(circuit: &mut CircuitData, segment: Segment, position: Point) {
    let info = circuit.layout.wires().tree(segment.wire).info(segment.index);
    let Some(current) = info.type_at(position) else {
        return;
    };
    let orientation = line::endpoint_orientation(info.line, position);

    let target = if let Some(pin) = circuit.index.logicitem_inputs().find(position) {
        if orientation.is_compatible_with(pin.orientation) {
            SegmentPointType::Output
        } else {
            SegmentPointType::ShadowPoint
        }
    } else if let Some(pin) = circuit.index.logicitem_outputs().find(position) {
        if orientation.is_compatible_with(pin.orientation) {
            SegmentPointType::Input
        } else {
            SegmentPointType::ShadowPoint
        }
    } else if current == SegmentPointType::Input || current == SegmentPointType::Output {
        // The pin is gone; release the connection.
        SegmentPointType::ShadowPoint
    } else if current == SegmentPointType::CornerPoint || current == SegmentPointType::CrossPoint {
        // The other branches are gone.
        SegmentPointType::ShadowPoint
    } else {
        current
    };

    if target != current {
        update_segment_point_types(circuit, position, &[(segment, target)]);
    }
}

/// Adopts item pins for both endpoints of one inserted segment.
///
/// Wire endpoints coincident with a compatible logic-item output become
/// `Input`; coincident with a compatible input they become `Output`.
pub fn set_wire_endpoints_at_logicitem_pins(circuit: &mut CircuitData, segment: Segment) {
    let info = circuit.layout.wires().tree(segment.wire).info(segment.index);
    for position in [info.line.p0, info.line.p1] {
        if circuit.index.query_line_segments(position).len() == 1 {
            fix_single_endpoint(circuit, segment, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use latchwork_vocabulary::{InsertionMode, LogicItemType};

    use crate::editing::logicitem::add_logicitem;
    use crate::editing::wire::add_wire_segment;

    use super::*;

    fn line(x0: i16, y0: i16, x1: i16, y1: i16) -> OrderedLine {
        OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn batch_merge_preserves_the_descending_contract() {
        let mut circuit = CircuitData::new(false);

        // An inserted staircase of four collinear spans split at three
        // points: merging all pairs must leave a single segment.
        let part = add_wire_segment(&mut circuit, line(0, 0, 12, 0), InsertionMode::InsertOrDiscard)
            .unwrap();
        let wire = part.segment.wire;

        let first = part.segment;
        let tail_a = split_line_segment(&mut circuit, first, Point::new(3, 0));
        let tail_b = split_line_segment(&mut circuit, tail_a.segment, Point::new(6, 0));
        let tail_c = split_line_segment(&mut circuit, tail_b.segment, Point::new(9, 0));

        let mut pairs = vec![
            (first, tail_a.segment),
            (tail_a.segment, tail_b.segment),
            (tail_b.segment, tail_c.segment),
        ];
        merge_all_line_segments(&mut circuit, &mut pairs);

        assert!(pairs.is_empty());
        let tree = circuit.layout.wires().tree(wire);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.line(SegmentIndex::new(0)), line(0, 0, 12, 0));
        circuit.validate();
    }

    #[test]
    fn pin_adoption_is_symmetric() {
        let mut circuit = CircuitData::new(false);
        add_logicitem(
            &mut circuit,
            latchwork_layout::LogicItemDefinition::default_for(LogicItemType::AndElement),
            Point::new(5, 0),
            InsertionMode::InsertOrDiscard,
        )
        .unwrap();
        let part = add_wire_segment(&mut circuit, line(3, 0, 5, 0), InsertionMode::InsertOrDiscard)
            .unwrap();

        // Re-running the adoption routine is idempotent.
        set_wire_endpoints_at_logicitem_pins(&mut circuit, part.segment);
        let info = circuit
            .layout
            .wires()
            .tree(part.segment.wire)
            .info(part.segment.index);
        assert_eq!(info.p1_type, SegmentPointType::Output);
        circuit.validate();
    }

    #[test]
    fn uninserted_endpoint_helpers() {
        let mut circuit = CircuitData::new(false);
        let part =
            add_wire_segment(&mut circuit, line(0, 0, 4, 0), InsertionMode::Temporary).unwrap();

        set_uninserted_crosspoint(&mut circuit, part.segment, Point::new(0, 0));
        let info = circuit
            .layout
            .wires()
            .tree(part.segment.wire)
            .info(part.segment.index);
        assert_eq!(info.p0_type, SegmentPointType::CrossPoint);

        reset_uninserted_endpoints(&mut circuit, part.segment);
        let info = circuit
            .layout
            .wires()
            .tree(part.segment.wire)
            .info(part.segment.index);
        assert_eq!(info.endpoints(), Endpoints::SHADOW);
    }
}

