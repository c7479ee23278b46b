// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position-to-endpoint maps for logic-item pins and wire endpoints.
//!
//! Four maps exist: logic-item inputs, logic-item outputs, wire inputs, and
//! wire outputs. Each is driven by its own subset of the inserted-state
//! messages. The collision index guarantees that at most one endpoint of a
//! given kind occupies a grid point; a duplicate registration here is a
//! fatal internal error.

use hashbrown::HashMap;

use latchwork_geometry::line::endpoint_orientation;
use latchwork_layout::shape::{self, ConnectionVec};
use latchwork_layout::{InfoMessage, LogicItemLayoutData};
use latchwork_vocabulary::{
    ConnectionId, LogicItemId, Orientation, Point, Segment, SegmentInfo, SegmentPointType,
};

/// Which endpoint kind a map tracks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Input pins (items) or `Input`-typed endpoints (wires).
    Input,
    /// Output pins (items) or `Output`-typed endpoints (wires).
    Output,
}

impl Direction {
    fn segment_point_type(self) -> SegmentPointType {
        match self {
            Self::Input => SegmentPointType::Input,
            Self::Output => SegmentPointType::Output,
        }
    }
}

/// A registered logic-item pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LogicItemConnection {
    /// The owning item.
    pub item: LogicItemId,
    /// Pin index within the item's direction.
    pub connection: ConnectionId,
    /// Facing of the pin.
    pub orientation: Orientation,
}

/// A registered wire endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WireConnection {
    /// The owning segment.
    pub segment: Segment,
    /// Facing of the endpoint, away from the segment.
    pub orientation: Orientation,
}

/// Position map of logic-item pins for one direction.
#[derive(Clone, Debug, PartialEq)]
pub struct LogicItemConnectionIndex {
    direction: Direction,
    map: HashMap<Point, LogicItemConnection>,
}

impl LogicItemConnectionIndex {
    /// Creates an empty index for `direction`.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            map: HashMap::new(),
        }
    }

    /// The tracked direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The pin registered at `point`, if any.
    #[must_use]
    pub fn find(&self, point: Point) -> Option<LogicItemConnection> {
        self.map.get(&point).copied()
    }

    /// Number of registered pins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no pin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether inserting the item would conflict with registered pins of
    /// this direction.
    ///
    /// Same-direction pins may not share a point at all; opposite-direction
    /// pins of the candidate must be orientation-compatible with whatever is
    /// registered at their points (the handshake rule).
    #[must_use]
    pub fn is_colliding(&self, data: &LogicItemLayoutData) -> bool {
        let same_direction: ConnectionVec;
        let opposite_direction: ConnectionVec;
        match self.direction {
            Direction::Input => {
                same_direction = shape::input_locations(data);
                opposite_direction = shape::output_locations(data);
            }
            Direction::Output => {
                same_direction = shape::output_locations(data);
                opposite_direction = shape::input_locations(data);
            }
        }

        let same_collides = same_direction
            .iter()
            .any(|info| self.map.contains_key(&info.position));
        let opposite_collides = opposite_direction.iter().any(|info| {
            self.map
                .get(&info.position)
                .is_some_and(|entry| !info.orientation.is_compatible_with(entry.orientation))
        });

        same_collides || opposite_collides
    }

    /// Heap bytes currently allocated by the map.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.map.capacity()
            * (core::mem::size_of::<Point>() + core::mem::size_of::<LogicItemConnection>())
    }

    /// Applies one layout message.
    pub fn submit(&mut self, message: &InfoMessage) {
        match message {
            InfoMessage::LogicItemInserted { id, data } => {
                for info in self.locations(data) {
                    let entry = LogicItemConnection {
                        item: *id,
                        connection: info.connection_id,
                        orientation: info.orientation,
                    };
                    let previous = self.map.insert(info.position, entry);
                    assert!(
                        previous.is_none(),
                        "duplicate connection entry at {}",
                        info.position
                    );
                }
            }
            InfoMessage::InsertedLogicItemIdUpdated {
                new_id,
                old_id,
                data,
            } => {
                for info in self.locations(data) {
                    let entry = self
                        .map
                        .get_mut(&info.position)
                        .expect("connection entry must be present");
                    assert!(
                        entry.item == *old_id && entry.connection == info.connection_id,
                        "unexpected connection entry at {}",
                        info.position
                    );
                    entry.item = *new_id;
                }
            }
            InfoMessage::LogicItemUninserted { id, data } => {
                for info in self.locations(data) {
                    let entry = self
                        .map
                        .remove(&info.position)
                        .expect("connection entry must be present");
                    assert!(
                        entry.item == *id && entry.connection == info.connection_id,
                        "unexpected connection entry at {}",
                        info.position
                    );
                }
            }
            _ => {}
        }
    }

    fn locations(&self, data: &LogicItemLayoutData) -> ConnectionVec {
        match self.direction {
            Direction::Input => shape::input_locations(data),
            Direction::Output => shape::output_locations(data),
        }
    }
}

/// Position map of wire endpoints for one direction.
///
/// Registration is driven by endpoint *point type*: an inserted segment whose
/// `p0` is typed `Input` registers `p0` here iff this is the input index, and
/// symmetrically for `Output` and `p1`.
#[derive(Clone, Debug, PartialEq)]
pub struct WireConnectionIndex {
    direction: Direction,
    map: HashMap<Point, WireConnection>,
}

impl WireConnectionIndex {
    /// Creates an empty index for `direction`.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            map: HashMap::new(),
        }
    }

    /// The tracked direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The endpoint registered at `point`, if any.
    #[must_use]
    pub fn find(&self, point: Point) -> Option<WireConnection> {
        self.map.get(&point).copied()
    }

    /// Number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no endpoint is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Heap bytes currently allocated by the map.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        self.map.capacity()
            * (core::mem::size_of::<Point>() + core::mem::size_of::<WireConnection>())
    }

    /// Applies one layout message.
    pub fn submit(&mut self, message: &InfoMessage) {
        match message {
            InfoMessage::SegmentInserted { segment, info } => {
                for (position, orientation) in tracked_endpoints(self.direction, info) {
                    let entry = WireConnection {
                        segment: *segment,
                        orientation,
                    };
                    let previous = self.map.insert(position, entry);
                    assert!(
                        previous.is_none(),
                        "duplicate wire endpoint entry at {position}"
                    );
                }
            }
            InfoMessage::InsertedSegmentIdUpdated {
                new_segment,
                old_segment,
                info,
            } => {
                for (position, _) in tracked_endpoints(self.direction, info) {
                    let entry = self
                        .map
                        .get_mut(&position)
                        .expect("wire endpoint entry must be present");
                    assert!(
                        entry.segment == *old_segment,
                        "unexpected wire endpoint entry at {position}"
                    );
                    entry.segment = *new_segment;
                }
            }
            InfoMessage::InsertedEndPointsUpdated {
                segment,
                new_info,
                old_info,
            } => {
                for (position, _) in tracked_endpoints(self.direction, old_info) {
                    let entry = self
                        .map
                        .remove(&position)
                        .expect("wire endpoint entry must be present");
                    assert!(
                        entry.segment == *segment,
                        "unexpected wire endpoint entry at {position}"
                    );
                }
                for (position, orientation) in tracked_endpoints(self.direction, new_info) {
                    let entry = WireConnection {
                        segment: *segment,
                        orientation,
                    };
                    let previous = self.map.insert(position, entry);
                    assert!(
                        previous.is_none(),
                        "duplicate wire endpoint entry at {position}"
                    );
                }
            }
            InfoMessage::SegmentUninserted { segment, info } => {
                for (position, _) in tracked_endpoints(self.direction, info) {
                    let entry = self
                        .map
                        .remove(&position)
                        .expect("wire endpoint entry must be present");
                    assert!(
                        entry.segment == *segment,
                        "unexpected wire endpoint entry at {position}"
                    );
                }
            }
            _ => {}
        }
    }

}

/// The endpoints of `info` the given direction tracks, with facings.
fn tracked_endpoints(
    direction: Direction,
    info: &SegmentInfo,
) -> impl Iterator<Item = (Point, Orientation)> {
    let tracked = direction.segment_point_type();
    let line = info.line;
    let p0 = (info.p0_type == tracked).then(|| (line.p0, endpoint_orientation(line, line.p0)));
    let p1 = (info.p1_type == tracked).then(|| (line.p1, endpoint_orientation(line, line.p1)));
    p0.into_iter().chain(p1)
}

#[cfg(test)]
mod tests {
    use latchwork_vocabulary::{LogicItemType, OrderedLine, SegmentIndex, WireId};

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

    #[test]
    fn item_pins_register_and_unregister() {
        let mut inputs = LogicItemConnectionIndex::new(Direction::Input);
        let data = and_data(5, 0);
        let id = LogicItemId::new(0);

        inputs.submit(&InfoMessage::LogicItemInserted { id, data });
        let entry = inputs.find(Point::new(5, 1)).unwrap();
        assert_eq!(entry.item, id);
        assert_eq!(entry.connection, ConnectionId::new(1));
        assert_eq!(entry.orientation, Orientation::Left);

        inputs.submit(&InfoMessage::LogicItemUninserted { id, data });
        assert!(inputs.is_empty());
    }

    #[test]
    fn opposite_pins_handshake_same_pins_collide() {
        let mut outputs = LogicItemConnectionIndex::new(Direction::Output);
        // Output of this gate sits at (7, 0), facing right.
        outputs.submit(&InfoMessage::LogicItemInserted {
            id: LogicItemId::new(0),
            data: and_data(5, 0),
        });

        // A second gate whose input pin lands on that output, facing left:
        // compatible handshake.
        let handshake = and_data(7, 0);
        assert!(!outputs.is_colliding(&handshake));

        // A gate whose *output* lands on the registered output collides.
        let same_direction = and_data(5, 0);
        assert!(outputs.is_colliding(&same_direction));
    }

    #[test]
    fn wire_endpoints_follow_point_types() {
        let mut wire_outputs = WireConnectionIndex::new(Direction::Output);
        let line = OrderedLine::new(Point::new(3, 0), Point::new(5, 0));
        let info = SegmentInfo {
            line,
            p0_type: SegmentPointType::ShadowPoint,
            p1_type: SegmentPointType::Output,
        };
        let segment = Segment::new(WireId::new(2), SegmentIndex::new(0));

        wire_outputs.submit(&InfoMessage::SegmentInserted { segment, info });
        let entry = wire_outputs.find(Point::new(5, 0)).unwrap();
        assert_eq!(entry.segment, segment);
        assert_eq!(entry.orientation, Orientation::Right);
        assert!(wire_outputs.find(Point::new(3, 0)).is_none());

        // Downgrading the endpoint unregisters it.
        let downgraded = SegmentInfo {
            p1_type: SegmentPointType::ShadowPoint,
            ..info
        };
        wire_outputs.submit(&InfoMessage::InsertedEndPointsUpdated {
            segment,
            new_info: downgraded,
            old_info: info,
        });
        assert!(wire_outputs.is_empty());
    }
}
