// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid shapes of logic items: pin locations, body points, bounds.
//!
//! Shapes are defined for the `Right` orientation and rotated about the
//! anchor position for the other facings; undirected elements (buttons,
//! LEDs) are single-cell and never rotate. All derived points are expressed
//! through checked coordinate arithmetic; use [`is_representable`] before
//! relying on the panicking accessors.

use core::ops::RangeInclusive;

use alloc::vec::Vec;

use latchwork_vocabulary::{
    ConnectionId, LogicItemType, Orientation, Point, Rect,
};
use smallvec::SmallVec;

use crate::logicitem::LogicItemLayoutData;

/// One pin location with its facing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionInfo {
    /// Pin index, counted per direction.
    pub connection_id: ConnectionId,
    /// Grid position of the pin.
    pub position: Point,
    /// Facing of the pin, away from the element body.
    pub orientation: Orientation,
}

/// Pin lists are small; eight covers every built-in element type inline.
pub type ConnectionVec = SmallVec<[ConnectionInfo; 8]>;

/// The allowed input counts of the type.
#[must_use]
pub fn input_count_range(item_type: LogicItemType) -> RangeInclusive<u8> {
    use LogicItemType::*;
    match item_type {
        AndElement | OrElement | XorElement => 2..=128,
        Buffer => 1..=1,
        Button => 0..=0,
        Led => 1..=1,
        DisplayNumber => 1..=64,
        DisplayAscii => 8..=8,
        ClockGenerator => 0..=0,
        FlipflopJk => 3..=3,
        FlipflopD | FlipflopMsD | LatchD => 2..=2,
        ShiftRegister => 3..=3,
        SubCircuit => 0..=128,
        TextElement => 0..=0,
    }
}

/// The allowed output counts of the type.
#[must_use]
pub fn output_count_range(item_type: LogicItemType) -> RangeInclusive<u8> {
    use LogicItemType::*;
    match item_type {
        AndElement | OrElement | XorElement | Buffer => 1..=1,
        Button => 1..=1,
        Led => 0..=0,
        DisplayNumber | DisplayAscii => 0..=0,
        ClockGenerator => 1..=1,
        FlipflopJk => 2..=2,
        FlipflopD | FlipflopMsD | LatchD => 1..=1,
        ShiftRegister => 2..=2,
        SubCircuit => 0..=128,
        TextElement => 0..=0,
    }
}

/// The default input count of the type.
#[must_use]
pub fn default_input_count(item_type: LogicItemType) -> u8 {
    use LogicItemType::*;
    match item_type {
        AndElement | OrElement | XorElement => 2,
        DisplayNumber => 3,
        SubCircuit => 2,
        other => *input_count_range(other).start(),
    }
}

/// The default output count of the type.
#[must_use]
pub fn default_output_count(item_type: LogicItemType) -> u8 {
    use LogicItemType::*;
    match item_type {
        SubCircuit => 2,
        other => *output_count_range(other).start(),
    }
}

/// The default facing of the type.
#[must_use]
pub fn default_orientation(item_type: LogicItemType) -> Orientation {
    use LogicItemType::*;
    match item_type {
        Button | Led | TextElement => Orientation::Undirected,
        _ => Orientation::Right,
    }
}

/// Untransformed element width (along x, facing `Right`), in grid units.
fn element_width(data: &LogicItemLayoutData) -> i32 {
    use LogicItemType::*;
    match data.item_type {
        AndElement | OrElement | XorElement | SubCircuit | LatchD => 2,
        Buffer => 1,
        Button | Led | TextElement => 0,
        DisplayNumber | DisplayAscii => 4,
        ClockGenerator => 3,
        FlipflopJk | FlipflopD | FlipflopMsD => 4,
        ShiftRegister => 8,
    }
}

/// Untransformed element height (along y), in grid units.
fn element_height(data: &LogicItemLayoutData) -> i32 {
    use LogicItemType::*;
    match data.item_type {
        AndElement | OrElement | XorElement | SubCircuit => {
            i32::from(data.input_count.max(data.output_count)) - 1
        }
        Buffer | Button | Led | TextElement => 0,
        DisplayNumber => i32::from(data.input_count).max(2) - 1,
        DisplayAscii => 7,
        ClockGenerator => 2,
        FlipflopJk | ShiftRegister => 2,
        FlipflopD | FlipflopMsD | LatchD => 1,
    }
}

/// Local pin offsets facing `Right`: inputs on the left edge, outputs on the
/// right edge, one grid row apart starting at the anchor row.
fn local_inputs(data: &LogicItemLayoutData) -> SmallVec<[(i32, i32); 8]> {
    (0..i32::from(data.input_count)).map(|i| (0, i)).collect()
}

fn local_outputs(data: &LogicItemLayoutData) -> SmallVec<[(i32, i32); 8]> {
    let width = element_width(data);
    (0..i32::from(data.output_count))
        .map(|i| (width, i))
        .collect()
}

/// Rotates a local offset into world space for the given facing.
fn transform(orientation: Orientation, (x, y): (i32, i32)) -> (i32, i32) {
    match orientation {
        Orientation::Right | Orientation::Undirected => (x, y),
        Orientation::Left => (-x, -y),
        Orientation::Up => (y, -x),
        Orientation::Down => (-y, x),
    }
}

/// Rotates a local facing into world space.
fn transform_orientation(orientation: Orientation, local: Orientation) -> Orientation {
    match orientation {
        Orientation::Right | Orientation::Undirected => local,
        Orientation::Left => local.opposite(),
        Orientation::Up => match local {
            Orientation::Right => Orientation::Up,
            Orientation::Left => Orientation::Down,
            Orientation::Up => Orientation::Left,
            Orientation::Down => Orientation::Right,
            Orientation::Undirected => Orientation::Undirected,
        },
        Orientation::Down => match local {
            Orientation::Right => Orientation::Down,
            Orientation::Left => Orientation::Up,
            Orientation::Up => Orientation::Right,
            Orientation::Down => Orientation::Left,
            Orientation::Undirected => Orientation::Undirected,
        },
    }
}

fn world_point(data: &LogicItemLayoutData, local: (i32, i32)) -> Option<Point> {
    let (dx, dy) = transform(data.orientation, local);
    let x = data.position.x.checked_add(dx)?;
    let y = data.position.y.checked_add(dy)?;
    Some(Point { x, y })
}

fn pin_orientation(data: &LogicItemLayoutData, local: Orientation) -> Orientation {
    if data.orientation == Orientation::Undirected {
        Orientation::Undirected
    } else {
        transform_orientation(data.orientation, local)
    }
}

/// Whether every derived point of the element stays on the grid.
#[must_use]
pub fn is_representable(data: &LogicItemLayoutData) -> bool {
    let corners = [
        (0, 0),
        (element_width(data), element_height(data)),
        (element_width(data), 0),
        (0, element_height(data)),
    ];
    corners
        .into_iter()
        .all(|local| world_point(data, local).is_some())
}

/// Input pin locations with their facings.
///
/// # Panics
///
/// Panics if the element is not representable on the grid.
#[must_use]
#[allow(clippy::cast_possible_truncation, reason = "pin counts are at most 128")]
pub fn input_locations(data: &LogicItemLayoutData) -> ConnectionVec {
    local_inputs(data)
        .into_iter()
        .enumerate()
        .map(|(i, local)| ConnectionInfo {
            connection_id: ConnectionId::new(i as u8),
            position: world_point(data, local).expect("element must be representable"),
            orientation: pin_orientation(data, Orientation::Left),
        })
        .collect()
}

/// Output pin locations with their facings.
///
/// # Panics
///
/// Panics if the element is not representable on the grid.
#[must_use]
#[allow(clippy::cast_possible_truncation, reason = "pin counts are at most 128")]
pub fn output_locations(data: &LogicItemLayoutData) -> ConnectionVec {
    local_outputs(data)
        .into_iter()
        .enumerate()
        .map(|(i, local)| ConnectionInfo {
            connection_id: ConnectionId::new(i as u8),
            position: world_point(data, local).expect("element must be representable"),
            orientation: pin_orientation(data, Orientation::Right),
        })
        .collect()
}

/// All grid points of the element body, pin positions excluded.
///
/// # Panics
///
/// Panics if the element is not representable on the grid.
#[must_use]
pub fn body_points(data: &LogicItemLayoutData) -> Vec<Point> {
    let inputs = input_locations(data);
    let outputs = output_locations(data);
    let is_pin = |point: Point| {
        inputs.iter().any(|info| info.position == point)
            || outputs.iter().any(|info| info.position == point)
    };

    let mut points = Vec::new();
    for x in 0..=element_width(data) {
        for y in 0..=element_height(data) {
            let point = world_point(data, (x, y)).expect("element must be representable");
            if !is_pin(point) {
                points.push(point);
            }
        }
    }
    points
}

/// The tight grid bounding rectangle of the element.
///
/// # Panics
///
/// Panics if the element is not representable on the grid.
#[must_use]
pub fn bounding_rect(data: &LogicItemLayoutData) -> Rect {
    let a = world_point(data, (0, 0)).expect("element must be representable");
    let b = world_point(data, (element_width(data), element_height(data)))
        .expect("element must be representable");

    let p0 = Point {
        x: a.x.min(b.x),
        y: a.y.min(b.y),
    };
    let p1 = Point {
        x: a.x.max(b.x),
        y: a.y.max(b.y),
    };
    Rect::new(p0, p1)
}

#[cfg(test)]
mod tests {
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
    fn and_gate_pins_face_outward() {
        let data = and_data(5, 0);

        let inputs = input_locations(&data);
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].position, Point::new(5, 0));
        assert_eq!(inputs[1].position, Point::new(5, 1));
        assert!(inputs.iter().all(|i| i.orientation == Orientation::Left));

        let outputs = output_locations(&data);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].position, Point::new(7, 0));
        assert_eq!(outputs[0].orientation, Orientation::Right);
    }

    #[test]
    fn body_points_exclude_pins() {
        let data = and_data(0, 0);
        let body = body_points(&data);

        assert!(!body.contains(&Point::new(0, 0)));
        assert!(!body.contains(&Point::new(2, 0)));
        assert!(body.contains(&Point::new(1, 0)));
        assert!(body.contains(&Point::new(1, 1)));
        assert!(body.contains(&Point::new(2, 1)));

        // 3x2 grid points minus 2 inputs and 1 output.
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn rotation_preserves_pin_count_and_handedness() {
        let mut data = and_data(0, 0);
        data.orientation = Orientation::Down;

        let inputs = input_locations(&data);
        assert_eq!(inputs[0].position, Point::new(0, 0));
        assert_eq!(inputs[1].position, Point::new(-1, 0));
        assert!(inputs.iter().all(|i| i.orientation == Orientation::Up));

        let outputs = output_locations(&data);
        assert_eq!(outputs[0].position, Point::new(0, 2));
        assert_eq!(outputs[0].orientation, Orientation::Down);
    }

    #[test]
    fn representability_checks_grid_bounds() {
        let data = and_data(i16::MAX - 1, 0);
        assert!(!is_representable(&data));
        assert!(is_representable(&and_data(0, 0)));
    }

    #[test]
    fn button_is_single_cell() {
        let data = LogicItemLayoutData {
            item_type: LogicItemType::Button,
            input_count: 0,
            output_count: 1,
            position: Point::new(3, 3),
            orientation: Orientation::Undirected,
        };
        assert_eq!(output_locations(&data)[0].position, Point::new(3, 3));
        assert_eq!(
            output_locations(&data)[0].orientation,
            Orientation::Undirected
        );
        assert!(body_points(&data).is_empty());
    }
}
