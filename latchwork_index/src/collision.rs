// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The position-to-occupancy map deciding whether an insertion collides.

use hashbrown::HashMap;
use smallvec::SmallVec;

use latchwork_geometry::line;
use latchwork_layout::shape;
use latchwork_layout::{InfoMessage, LogicItemLayoutData};
use latchwork_vocabulary::{
    LogicItemId, OrderedLine, Point, SegmentInfo, SegmentPointType, WireId,
};

/// What occupies the body slot of a grid point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BodyTag {
    /// Slot is free.
    #[default]
    None,
    /// A logic item's body or connection occupies the point.
    LogicItem(LogicItemId),
    /// Sentinel: a wire corner occupies the point.
    WireCorner,
    /// Sentinel: a wire cross point occupies the point.
    WireCross,
}

/// What occupies the horizontal or vertical wire slot of a grid point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WireTag {
    /// Slot is free.
    #[default]
    None,
    /// A wire runs through or ends at the point.
    Wire(WireId),
    /// Sentinel: a connection endpoint occupies the slot (vertical slot
    /// only).
    Connection,
}

/// The three-slot occupancy record of one grid point.
///
/// Every reachable combination maps to exactly one [`IndexState`]; the slots
/// are the compressed encoding from which the state is inferred.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionData {
    /// Logic-item body or wire corner/cross sentinel.
    pub body: BodyTag,
    /// Wire running horizontally through the point.
    pub horizontal: WireTag,
    /// Wire running vertically through the point, or the connection sentinel.
    pub vertical: WireTag,
}

impl CollisionData {
    fn is_vacant(self) -> bool {
        !matches!(self.body, BodyTag::LogicItem(_))
            && !matches!(self.horizontal, WireTag::Wire(_))
            && !matches!(self.vertical, WireTag::Wire(_))
    }

    /// Whether only a logic-item body occupies the point.
    #[must_use]
    pub fn is_logicitem_body(self) -> bool {
        matches!(self.body, BodyTag::LogicItem(_))
            && self.horizontal == WireTag::None
            && self.vertical == WireTag::None
    }

    /// Whether a logic-item connection occupies the point.
    #[must_use]
    pub fn is_logicitem_connection(self) -> bool {
        matches!(self.body, BodyTag::LogicItem(_))
            && self.horizontal == WireTag::None
            && self.vertical == WireTag::Connection
    }

    /// Whether a wire connection endpoint occupies the point.
    #[must_use]
    pub fn is_wire_connection(self) -> bool {
        self.body == BodyTag::None
            && matches!(self.horizontal, WireTag::Wire(_))
            && self.vertical == WireTag::Connection
    }

    /// Whether only a horizontal wire runs through the point.
    #[must_use]
    pub fn is_wire_horizontal(self) -> bool {
        self.body == BodyTag::None
            && matches!(self.horizontal, WireTag::Wire(_))
            && self.vertical == WireTag::None
    }

    /// Whether only a vertical wire runs through the point.
    #[must_use]
    pub fn is_wire_vertical(self) -> bool {
        self.body == BodyTag::None
            && self.horizontal == WireTag::None
            && matches!(self.vertical, WireTag::Wire(_))
    }

    /// Whether a wire corner occupies the point.
    #[must_use]
    pub fn is_wire_corner_point(self) -> bool {
        self.body == BodyTag::WireCorner && self.same_wire_both_slots()
    }

    /// Whether a wire cross point occupies the point.
    #[must_use]
    pub fn is_wire_cross_point(self) -> bool {
        self.body == BodyTag::WireCross && self.same_wire_both_slots()
    }

    /// Whether two unconnected wires cross at the point.
    #[must_use]
    pub fn is_wires_crossing(self) -> bool {
        self.body == BodyTag::None
            && matches!(self.horizontal, WireTag::Wire(_))
            && matches!(self.vertical, WireTag::Wire(_))
    }

    /// Whether a logic-item pin and a wire endpoint handshake at the point.
    #[must_use]
    pub fn is_logicitem_wire_connection(self) -> bool {
        matches!(self.body, BodyTag::LogicItem(_))
            && matches!(self.horizontal, WireTag::Wire(_))
            && self.vertical == WireTag::Connection
    }

    fn same_wire_both_slots(self) -> bool {
        match (self.horizontal, self.vertical) {
            (WireTag::Wire(a), WireTag::Wire(b)) => a == b,
            _ => false,
        }
    }

    /// The inferred occupancy state.
    #[must_use]
    pub fn state(self) -> IndexState {
        if self.is_logicitem_body() {
            IndexState::LogicItemBody
        } else if self.is_logicitem_connection() {
            IndexState::LogicItemConnection
        } else if self.is_wire_connection() {
            IndexState::WireConnection
        } else if self.is_wire_horizontal() {
            IndexState::WireHorizontal
        } else if self.is_wire_vertical() {
            IndexState::WireVertical
        } else if self.is_wire_corner_point() {
            IndexState::WireCornerPoint
        } else if self.is_wire_cross_point() {
            IndexState::WireCrossPoint
        } else if self.is_wires_crossing() {
            IndexState::WireCrossing
        } else if self.is_logicitem_wire_connection() {
            IndexState::LogicItemWireConnection
        } else {
            IndexState::InvalidState
        }
    }
}

/// The kind of point a prospective insertion would place.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemType {
    /// Interior body point of a logic item.
    LogicItemBody,
    /// Pin of a logic item.
    LogicItemConnection,
    /// Input/output endpoint of a wire segment.
    WireConnection,
    /// Interior point of a horizontal segment.
    WireHorizontal,
    /// Interior point of a vertical segment.
    WireVertical,
    /// Corner endpoint shared by two segments.
    WireCornerPoint,
    /// Cross endpoint shared by three or four segments.
    WireCrossPoint,
    /// Endpoint of a line still being planned; used by collision checks only.
    WireNewUnknownPoint,
}

/// The fully decoded occupancy of a grid point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IndexState {
    /// Only a logic-item body.
    LogicItemBody,
    /// A logic-item pin.
    LogicItemConnection,
    /// A wire endpoint of connection type.
    WireConnection,
    /// A horizontal wire.
    WireHorizontal,
    /// A vertical wire.
    WireVertical,
    /// A wire corner.
    WireCornerPoint,
    /// A wire cross point.
    WireCrossPoint,
    /// Two unconnected wires crossing.
    WireCrossing,
    /// A logic-item pin handshaking with a wire endpoint.
    LogicItemWireConnection,
    /// No valid interpretation; indicates an index bug.
    InvalidState,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct CollisionPoint {
    position: Point,
    item_type: ItemType,
}

type CollisionPoints = SmallVec<[CollisionPoint; 8]>;

fn item_collision_points(data: &LogicItemLayoutData) -> CollisionPoints {
    let mut points = CollisionPoints::new();
    for info in shape::input_locations(data) {
        points.push(CollisionPoint {
            position: info.position,
            item_type: ItemType::LogicItemConnection,
        });
    }
    for info in shape::output_locations(data) {
        points.push(CollisionPoint {
            position: info.position,
            item_type: ItemType::LogicItemConnection,
        });
    }
    for position in shape::body_points(data) {
        points.push(CollisionPoint {
            position,
            item_type: ItemType::LogicItemBody,
        });
    }
    points
}

/// The collision point of an endpoint type; shadow points occupy nothing.
fn endpoint_item_type(point_type: SegmentPointType) -> Option<ItemType> {
    match point_type {
        SegmentPointType::Input | SegmentPointType::Output => Some(ItemType::WireConnection),
        SegmentPointType::CornerPoint => Some(ItemType::WireCornerPoint),
        SegmentPointType::CrossPoint => Some(ItemType::WireCrossPoint),
        SegmentPointType::ShadowPoint => None,
        SegmentPointType::NewUnknown => Some(ItemType::WireNewUnknownPoint),
    }
}

fn push_segment_end_points(buffer: &mut CollisionPoints, info: SegmentInfo) {
    if let Some(item_type) = endpoint_item_type(info.p0_type) {
        buffer.push(CollisionPoint {
            position: info.line.p0,
            item_type,
        });
    }
    if let Some(item_type) = endpoint_item_type(info.p1_type) {
        buffer.push(CollisionPoint {
            position: info.line.p1,
            item_type,
        });
    }
}

fn segment_end_points(info: SegmentInfo) -> CollisionPoints {
    let mut points = CollisionPoints::new();
    push_segment_end_points(&mut points, info);
    points
}

fn segment_collision_points(info: SegmentInfo) -> CollisionPoints {
    let mut points = CollisionPoints::new();
    let interior_type = if line::is_horizontal(info.line) {
        ItemType::WireHorizontal
    } else {
        ItemType::WireVertical
    };
    for position in line::interior_points(info.line) {
        points.push(CollisionPoint {
            position,
            item_type: interior_type,
        });
    }
    push_segment_end_points(&mut points, info);
    points
}

/// The point-to-occupancy map.
///
/// Maintenance is set-and-verify: every update states the value it expects to
/// replace, and a mismatch panics; it means a message was lost, duplicated,
/// or mis-ordered, which is a bug in the core, not a caller error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionIndex {
    map: HashMap<Point, CollisionData>,
}

impl CollisionIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw occupancy record at `point`.
    #[must_use]
    pub fn query(&self, point: Point) -> CollisionData {
        self.map.get(&point).copied().unwrap_or_default()
    }

    /// Whether inserting the logic item would occupy an incompatible point.
    ///
    /// Orientation handshakes are out of scope here; the connection indices
    /// check those.
    #[must_use]
    pub fn is_colliding_item(&self, data: &LogicItemLayoutData) -> bool {
        item_collision_points(data)
            .iter()
            .any(|point| self.state_colliding(point.position, point.item_type))
    }

    /// Whether inserting a wire along `line` would occupy an incompatible
    /// point.
    ///
    /// Endpoints are checked as [`ItemType::WireNewUnknownPoint`]: their
    /// final type (shadow, corner, cross, connection) is only decided by the
    /// insertion pipeline.
    #[must_use]
    pub fn is_colliding_line(&self, line: OrderedLine) -> bool {
        let probe = SegmentInfo {
            line,
            p0_type: SegmentPointType::NewUnknown,
            p1_type: SegmentPointType::NewUnknown,
        };
        segment_collision_points(probe)
            .iter()
            .any(|point| self.state_colliding(point.position, point.item_type))
    }

    /// Whether two unconnected wires cross at `point`.
    #[must_use]
    pub fn is_wires_crossing(&self, point: Point) -> bool {
        self.query(point).is_wires_crossing()
    }

    /// Whether `point` is a wire cross point.
    #[must_use]
    pub fn is_wire_cross_point(&self, point: Point) -> bool {
        self.query(point).is_wire_cross_point()
    }

    /// The first wire registered at `point`, horizontal slot first.
    #[must_use]
    pub fn get_first_wire(&self, point: Point) -> Option<WireId> {
        let data = self.query(point);
        match (data.horizontal, data.vertical) {
            (WireTag::Wire(id), _) => Some(id),
            (_, WireTag::Wire(id)) => Some(id),
            _ => None,
        }
    }

    /// Number of occupied grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no point is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over all occupied points with their inferred states.
    pub fn states(&self) -> impl Iterator<Item = (Point, IndexState)> + '_ {
        self.map.iter().map(|(point, data)| (*point, data.state()))
    }

    /// Heap bytes currently allocated by the map.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.map.capacity() * (core::mem::size_of::<Point>() + core::mem::size_of::<CollisionData>())
    }

    /// Applies one layout message.
    pub fn submit(&mut self, message: &InfoMessage) {
        match message {
            InfoMessage::LogicItemInserted { id, data } => {
                self.set_item_points(data, None, Some(*id));
            }
            InfoMessage::InsertedLogicItemIdUpdated {
                new_id,
                old_id,
                data,
            } => {
                self.set_item_points(data, Some(*old_id), Some(*new_id));
            }
            InfoMessage::LogicItemUninserted { id, data } => {
                self.set_item_points(data, Some(*id), None);
            }
            InfoMessage::SegmentInserted { segment, info } => {
                self.set_segment_points(*info, None, Some(segment.wire));
            }
            InfoMessage::InsertedSegmentIdUpdated {
                new_segment,
                old_segment,
                info,
            } => {
                if new_segment.wire != old_segment.wire {
                    self.set_segment_points(*info, Some(old_segment.wire), Some(new_segment.wire));
                }
            }
            InfoMessage::InsertedEndPointsUpdated {
                segment,
                new_info,
                old_info,
            } => {
                for point in segment_end_points(*old_info) {
                    self.set_wire_state(point.position, point.item_type, Some(segment.wire), None);
                }
                for point in segment_end_points(*new_info) {
                    self.set_wire_state(point.position, point.item_type, None, Some(segment.wire));
                }
            }
            InfoMessage::SegmentUninserted { segment, info } => {
                self.set_segment_points(*info, Some(segment.wire), None);
            }
            _ => {}
        }
    }

    fn set_item_points(
        &mut self,
        data: &LogicItemLayoutData,
        verify_old: Option<LogicItemId>,
        set_new: Option<LogicItemId>,
    ) {
        for point in item_collision_points(data) {
            self.set_logicitem_state(point.position, point.item_type, verify_old, set_new);
        }
    }

    fn set_segment_points(
        &mut self,
        info: SegmentInfo,
        verify_old: Option<WireId>,
        set_new: Option<WireId>,
    ) {
        for point in segment_collision_points(info) {
            self.set_wire_state(point.position, point.item_type, verify_old, set_new);
        }
    }

    fn state_colliding(&self, position: Point, item_type: ItemType) -> bool {
        let Some(data) = self.map.get(&position).copied() else {
            return false;
        };
        match item_type {
            ItemType::LogicItemBody => true,
            ItemType::LogicItemConnection => !data.is_wire_connection(),
            ItemType::WireConnection => !data.is_logicitem_connection(),
            ItemType::WireHorizontal => !data.is_wire_vertical(),
            ItemType::WireVertical => !data.is_wire_horizontal(),
            ItemType::WireCornerPoint | ItemType::WireCrossPoint => true,
            ItemType::WireNewUnknownPoint => {
                data.is_logicitem_body()
                    || data.is_logicitem_wire_connection()
                    || data.is_wires_crossing()
            }
        }
    }

    fn set_logicitem_state(
        &mut self,
        position: Point,
        item_type: ItemType,
        verify_old: Option<LogicItemId>,
        set_new: Option<LogicItemId>,
    ) {
        let data = self.map.entry(position).or_default();

        let expected = match verify_old {
            Some(id) => BodyTag::LogicItem(id),
            None => BodyTag::None,
        };
        assert!(
            data.body == expected,
            "unexpected collision state at {position}"
        );

        match item_type {
            ItemType::LogicItemBody => {}
            ItemType::LogicItemConnection => set_connection_tag(&mut data.vertical, position),
            _ => panic!("not a logic item point type"),
        }

        data.body = match set_new {
            Some(id) => BodyTag::LogicItem(id),
            None => BodyTag::None,
        };

        if data.is_vacant() {
            self.map.remove(&position);
        }
    }

    fn set_wire_state(
        &mut self,
        position: Point,
        item_type: ItemType,
        verify_old: Option<WireId>,
        set_new: Option<WireId>,
    ) {
        let data = self.map.entry(position).or_default();

        let expected = match verify_old {
            Some(id) => WireTag::Wire(id),
            None => WireTag::None,
        };
        let updated = match set_new {
            Some(id) => WireTag::Wire(id),
            None => WireTag::None,
        };
        let check_and_update = |slot: &mut WireTag| {
            assert!(
                *slot == expected,
                "unexpected collision state at {position}"
            );
            *slot = updated;
        };
        // Corner and cross tags are shared by every incident endpoint of the
        // point, so their slot updates are idempotent: a slot already carrying
        // the target value stays valid.
        let shared_update = |slot: &mut WireTag| {
            assert!(
                *slot == expected || *slot == updated,
                "unexpected collision state at {position}"
            );
            *slot = updated;
        };

        match item_type {
            ItemType::WireConnection => {
                set_connection_tag(&mut data.vertical, position);
                check_and_update(&mut data.horizontal);
            }
            ItemType::WireHorizontal => check_and_update(&mut data.horizontal),
            ItemType::WireVertical => check_and_update(&mut data.vertical),
            ItemType::WireCornerPoint | ItemType::WireCrossPoint => {
                let tag = if item_type == ItemType::WireCornerPoint {
                    BodyTag::WireCorner
                } else {
                    BodyTag::WireCross
                };
                if set_new.is_some() {
                    set_body_tag(&mut data.body, tag, position);
                } else {
                    // While a junction settles, a neighboring endpoint update
                    // may already have rewritten the point tag; only a logic
                    // item here would be a real inconsistency.
                    assert!(
                        !matches!(data.body, BodyTag::LogicItem(_)),
                        "cannot clear wire point tag at {position}, body slot occupied"
                    );
                }
                shared_update(&mut data.horizontal);
                shared_update(&mut data.vertical);
            }
            ItemType::WireNewUnknownPoint => {
                panic!("planning points are never stored in the index")
            }
            _ => panic!("not a wire point type"),
        }

        if data.is_vacant() {
            self.map.remove(&position);
        }
    }
}

fn set_connection_tag(slot: &mut WireTag, position: Point) {
    assert!(
        matches!(slot, WireTag::None | WireTag::Connection),
        "cannot set connection tag at {position}, vertical slot occupied"
    );
    *slot = WireTag::Connection;
}

fn set_body_tag(slot: &mut BodyTag, tag: BodyTag, position: Point) {
    assert!(
        *slot == BodyTag::None || *slot == tag,
        "cannot set wire point tag at {position}, body slot occupied"
    );
    *slot = tag;
}

#[cfg(test)]
mod tests {
    use latchwork_vocabulary::{LogicItemType, Orientation, Segment, SegmentIndex};

    use super::*;

    fn and_data(x: i16, y: i16) -> LogicItemLayoutData {
        LogicItemLayoutData {
            item_type: LogicItemType::AndElement,
            input_count: 2,
            output_count: 1,
            position: Point::new(x, y),
            orientation: Orientation::Right,
        }
    }

    fn segment(wire: u32, index: u16) -> Segment {
        Segment::new(WireId::new(wire), SegmentIndex::new(index))
    }

    fn shadow_info(x0: i16, y0: i16, x1: i16, y1: i16) -> SegmentInfo {
        SegmentInfo::with_shadow_points(OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1)))
    }

    #[test]
    fn inserted_item_occupies_body_and_pins() {
        let mut index = CollisionIndex::new();
        let data = and_data(5, 0);
        index.submit(&InfoMessage::LogicItemInserted {
            id: LogicItemId::new(0),
            data,
        });

        assert_eq!(index.query(Point::new(6, 0)).state(), IndexState::LogicItemBody);
        assert_eq!(
            index.query(Point::new(5, 0)).state(),
            IndexState::LogicItemConnection
        );
        assert!(index.is_colliding_item(&data));

        index.submit(&InfoMessage::LogicItemUninserted {
            id: LogicItemId::new(0),
            data,
        });
        assert!(index.is_empty());
        assert!(!index.is_colliding_item(&data));
    }

    #[test]
    fn crossing_wires_do_not_collide() {
        let mut index = CollisionIndex::new();
        index.submit(&InfoMessage::SegmentInserted {
            segment: segment(2, 0),
            info: shadow_info(0, 2, 4, 2),
        });

        // A vertical line crossing the interior is allowed.
        let vertical = OrderedLine::new(Point::new(2, 0), Point::new(2, 4));
        assert!(!index.is_colliding_line(vertical));

        // An overlapping horizontal line is not.
        let overlap = OrderedLine::new(Point::new(1, 2), Point::new(3, 2));
        assert!(index.is_colliding_line(overlap));

        index.submit(&InfoMessage::SegmentInserted {
            segment: segment(3, 0),
            info: shadow_info(2, 0, 2, 4),
        });
        assert!(index.is_wires_crossing(Point::new(2, 2)));
        assert_eq!(index.get_first_wire(Point::new(2, 2)), Some(WireId::new(2)));
    }

    #[test]
    fn endpoint_updates_swap_point_tags() {
        let mut index = CollisionIndex::new();
        let info = shadow_info(0, 0, 4, 0);
        let cross_info = SegmentInfo {
            p1_type: SegmentPointType::CrossPoint,
            ..info
        };

        index.submit(&InfoMessage::SegmentInserted {
            segment: segment(2, 0),
            info,
        });
        // Shadow endpoints occupy nothing.
        assert_eq!(index.query(Point::new(4, 0)), CollisionData::default());

        index.submit(&InfoMessage::InsertedEndPointsUpdated {
            segment: segment(2, 0),
            new_info: cross_info,
            old_info: info,
        });
        assert_eq!(
            index.query(Point::new(4, 0)).state(),
            IndexState::WireCrossPoint
        );
        assert!(index.is_wire_cross_point(Point::new(4, 0)));
    }

    #[test]
    #[should_panic(expected = "unexpected collision state")]
    fn double_insertion_is_fatal() {
        let mut index = CollisionIndex::new();
        let message = InfoMessage::SegmentInserted {
            segment: segment(2, 0),
            info: shadow_info(0, 0, 4, 0),
        };
        index.submit(&message);
        index.submit(&message);
    }

    #[test]
    fn new_unknown_points_respect_crossings() {
        let mut index = CollisionIndex::new();
        index.submit(&InfoMessage::SegmentInserted {
            segment: segment(2, 0),
            info: shadow_info(0, 2, 4, 2),
        });
        index.submit(&InfoMessage::SegmentInserted {
            segment: segment(3, 0),
            info: shadow_info(2, 0, 2, 4),
        });

        // An endpoint may not land on a two-wire crossing.
        let probe = OrderedLine::new(Point::new(2, 2), Point::new(6, 2));
        assert!(index.is_colliding_line(probe));
    }
}
