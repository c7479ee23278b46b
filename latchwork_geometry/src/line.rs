// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Predicates and iteration over orthogonal grid lines.

use latchwork_vocabulary::{Coord, MoveDelta, Orientation, OrderedLine, Point};

/// Whether the line runs along the x axis.
#[must_use]
pub fn is_horizontal(line: OrderedLine) -> bool {
    line.p0.y == line.p1.y
}

/// Whether the line runs along the y axis.
#[must_use]
pub fn is_vertical(line: OrderedLine) -> bool {
    line.p0.x == line.p1.x
}

/// The number of grid units the line spans.
#[must_use]
pub fn distance(line: OrderedLine) -> u16 {
    let d = if is_horizontal(line) {
        line.p0.x.distance_to(line.p1.x)
    } else {
        line.p0.y.distance_to(line.p1.y)
    };
    debug_assert!(d > 0, "ordered lines have positive length");
    d as u16
}

/// Whether two lines share an axis.
#[must_use]
pub fn is_parallel(a: OrderedLine, b: OrderedLine) -> bool {
    is_horizontal(a) == is_horizontal(b)
}

/// The facing of the line's end at `point`, away from the line.
///
/// # Panics
///
/// Panics if `point` is not an endpoint of `line`.
#[must_use]
pub fn endpoint_orientation(line: OrderedLine, point: Point) -> Orientation {
    if point == line.p0 {
        if is_horizontal(line) {
            Orientation::Left
        } else {
            Orientation::Up
        }
    } else if point == line.p1 {
        if is_horizontal(line) {
            Orientation::Right
        } else {
            Orientation::Down
        }
    } else {
        panic!("point is not an endpoint of the line");
    }
}

/// Whether `point` lies on the line, endpoints included.
#[must_use]
pub fn contains_point(line: OrderedLine, point: Point) -> bool {
    if is_horizontal(line) {
        point.y == line.p0.y && line.p0.x <= point.x && point.x <= line.p1.x
    } else {
        point.x == line.p0.x && line.p0.y <= point.y && point.y <= line.p1.y
    }
}

/// Whether `point` lies strictly between the line's endpoints.
#[must_use]
pub fn contains_point_interior(line: OrderedLine, point: Point) -> bool {
    contains_point(line, point) && point != line.p0 && point != line.p1
}

/// All grid points of the line, endpoints included, in ascending order.
pub fn points(line: OrderedLine) -> impl Iterator<Item = Point> {
    let horizontal = is_horizontal(line);
    let base = line.p0;
    (0..=i32::from(distance(line))).map(move |step| offset_point(base, horizontal, step))
}

/// The grid points strictly between the line's endpoints.
pub fn interior_points(line: OrderedLine) -> impl Iterator<Item = Point> {
    let horizontal = is_horizontal(line);
    let base = line.p0;
    (1..i32::from(distance(line))).map(move |step| offset_point(base, horizontal, step))
}

fn offset_point(base: Point, horizontal: bool, step: i32) -> Point {
    // Stays on the grid: `step` never exceeds the line length.
    let advance = |coord: Coord| coord.checked_add(step).expect("line points stay on grid");
    if horizontal {
        Point {
            x: advance(base.x),
            y: base.y,
        }
    } else {
        Point {
            x: base.x,
            y: advance(base.y),
        }
    }
}

/// Translates the line, returning `None` if an endpoint leaves the grid.
#[must_use]
pub fn checked_add(line: OrderedLine, delta: MoveDelta) -> Option<OrderedLine> {
    let p0 = line.p0.checked_add(delta)?;
    let p1 = line.p1.checked_add(delta)?;
    Some(OrderedLine::new(p0, p1))
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn line(x0: i16, y0: i16, x1: i16, y1: i16) -> OrderedLine {
        OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn axis_predicates() {
        assert!(is_horizontal(line(0, 2, 4, 2)));
        assert!(is_vertical(line(2, 0, 2, 4)));
        assert!(!is_parallel(line(0, 2, 4, 2), line(2, 0, 2, 4)));
        assert_eq!(distance(line(0, 2, 4, 2)), 4);
        assert_eq!(distance(line(2, -1, 2, 1)), 2);
    }

    #[test]
    fn endpoint_orientations() {
        let h = line(0, 2, 4, 2);
        assert_eq!(endpoint_orientation(h, Point::new(0, 2)), Orientation::Left);
        assert_eq!(
            endpoint_orientation(h, Point::new(4, 2)),
            Orientation::Right
        );

        let v = line(2, 0, 2, 4);
        assert_eq!(endpoint_orientation(v, Point::new(2, 0)), Orientation::Up);
        assert_eq!(endpoint_orientation(v, Point::new(2, 4)), Orientation::Down);
    }

    #[test]
    fn point_containment() {
        let l = line(0, 2, 4, 2);
        assert!(contains_point(l, Point::new(0, 2)));
        assert!(contains_point(l, Point::new(2, 2)));
        assert!(!contains_point(l, Point::new(2, 3)));
        assert!(contains_point_interior(l, Point::new(1, 2)));
        assert!(!contains_point_interior(l, Point::new(0, 2)));
    }

    #[test]
    fn point_iteration() {
        let all: Vec<_> = points(line(1, 0, 4, 0)).collect();
        assert_eq!(
            all,
            [
                Point::new(1, 0),
                Point::new(2, 0),
                Point::new(3, 0),
                Point::new(4, 0)
            ]
        );

        let interior: Vec<_> = interior_points(line(1, 0, 4, 0)).collect();
        assert_eq!(interior, [Point::new(2, 0), Point::new(3, 0)]);
        assert_eq!(interior_points(line(0, 0, 1, 0)).count(), 0);
    }

    #[test]
    fn translation_checks_range() {
        let l = line(0, 0, 4, 0);
        assert_eq!(
            checked_add(l, MoveDelta::new(2, 1)),
            Some(line(2, 1, 6, 1))
        );
        assert_eq!(checked_add(l, MoveDelta::new(i32::from(i16::MAX), 0)), None);
    }
}
