// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between points on a segment's line and offset ranges.
//!
//! Offsets are measured in grid units from the line's `p0` endpoint; a part
//! `[begin, end)` covers the unit intervals between offsets `begin` and
//! `end`.

use latchwork_vocabulary::{Offset, OrderedLine, Part, Point};

use crate::line::{distance, is_horizontal};

/// The part covering the full line.
#[must_use]
pub fn full_part(line: OrderedLine) -> Part {
    Part::from_range(0, distance(line))
}

/// The offset of `point` along the line.
///
/// # Panics
///
/// Panics if `point` does not lie on the line.
#[must_use]
pub fn to_offset(line: OrderedLine, point: Point) -> Offset {
    assert!(
        crate::line::contains_point(line, point),
        "point must lie on the line"
    );
    let d = if is_horizontal(line) {
        line.p0.x.distance_to(point.x)
    } else {
        line.p0.y.distance_to(point.y)
    };
    Offset::new(d as u16)
}

/// The point at `offset` along the line.
///
/// # Panics
///
/// Panics if the offset exceeds the line length.
#[must_use]
pub fn to_point(line: OrderedLine, offset: Offset) -> Point {
    assert!(
        offset.get() <= distance(line),
        "offset exceeds the line length"
    );
    let step = i32::from(offset.get());
    let advance = |coord: latchwork_vocabulary::Coord| {
        coord.checked_add(step).expect("line points stay on grid")
    };
    if is_horizontal(line) {
        Point {
            x: advance(line.p0.x),
            y: line.p0.y,
        }
    } else {
        Point {
            x: line.p0.x,
            y: advance(line.p0.y),
        }
    }
}

/// The sub-line covered by `part`.
///
/// # Panics
///
/// Panics if the part exceeds the line length.
#[must_use]
pub fn to_line(line: OrderedLine, part: Part) -> OrderedLine {
    OrderedLine::new(to_point(line, part.begin), to_point(line, part.end))
}

/// Whether `part` covers the entire line.
#[must_use]
pub fn is_full_part(line: OrderedLine, part: Part) -> bool {
    part == full_part(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x0: i16, y0: i16, x1: i16, y1: i16) -> OrderedLine {
        OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn offset_round_trips() {
        let l = line(2, 1, 8, 1);
        assert_eq!(full_part(l), Part::from_range(0, 6));
        assert_eq!(to_offset(l, Point::new(5, 1)), Offset::new(3));
        assert_eq!(to_point(l, Offset::new(3)), Point::new(5, 1));
        assert_eq!(
            to_line(l, Part::from_range(1, 4)),
            line(3, 1, 6, 1)
        );
    }

    #[test]
    fn vertical_offsets() {
        let l = line(0, -2, 0, 3);
        assert_eq!(to_offset(l, Point::new(0, 0)), Offset::new(2));
        assert_eq!(to_line(l, Part::from_range(0, 2)), line(0, -2, 0, 0));
        assert!(is_full_part(l, Part::from_range(0, 5)));
    }

    #[test]
    #[should_panic(expected = "lie on the line")]
    fn offset_of_outside_point_panics() {
        let _ = to_offset(line(0, 0, 4, 0), Point::new(5, 0));
    }
}
