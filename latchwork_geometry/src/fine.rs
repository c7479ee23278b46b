// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary between the integer grid and the fractional pointer space.
//!
//! Fine coordinates come from the UI (pointer positions, rubber-band
//! rectangles) and are only ever used for spatial queries and selection
//! rectangles; authoritative geometry stays on the integer grid. Conversions
//! to the grid round toward negative infinity.

use kurbo::{Point as KurboPoint, Rect as KurboRect};
use latchwork_vocabulary::{Coord, OrderedLine, Part, Point, Rect};

use crate::line::{distance, is_horizontal};

/// A point in the fractional pointer space.
pub type PointFine = KurboPoint;

/// An axis-aligned rectangle in the fractional pointer space.
///
/// Callers may pass unordered corners; queries normalize via [`KurboRect::abs`].
pub type RectFine = KurboRect;

/// Padding of selection boxes around items and segments, in grid units.
///
/// A click within this distance of a line or body hits the element.
pub const SELECTION_PADDING: f64 = 0.25;

/// The fine-space position of a grid point.
#[must_use]
pub fn point_fine(point: Point) -> PointFine {
    PointFine::new(f64::from(point.x.get()), f64::from(point.y.get()))
}

/// The fine-space rectangle spanned by a grid rectangle.
#[must_use]
pub fn rect_fine(rect: Rect) -> RectFine {
    RectFine::new(
        f64::from(rect.p0.x.get()),
        f64::from(rect.p0.y.get()),
        f64::from(rect.p1.x.get()),
        f64::from(rect.p1.y.get()),
    )
}

/// Converts a fine point to the grid by flooring both coordinates.
///
/// Returns `None` if the floored point does not fit the grid range.
#[must_use]
pub fn to_grid_floor(point: PointFine) -> Option<Point> {
    let x = floor_coord(point.x)?;
    let y = floor_coord(point.y)?;
    Some(Point { x, y })
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "the range check precedes the cast"
)]
fn floor_coord(value: f64) -> Option<Coord> {
    let floored = value.floor();
    if floored < f64::from(i16::MIN) || floored > f64::from(i16::MAX) {
        return None;
    }
    Some(Coord::new(floored as i16))
}

/// The padded selection box of a line segment.
#[must_use]
pub fn line_selection_rect(line: OrderedLine) -> RectFine {
    let p0 = point_fine(line.p0);
    let p1 = point_fine(line.p1);
    RectFine::new(
        p0.x - SELECTION_PADDING,
        p0.y - SELECTION_PADDING,
        p1.x + SELECTION_PADDING,
        p1.y + SELECTION_PADDING,
    )
}

/// The padded selection box of a grid rectangle (logic-item or decoration
/// bounds).
#[must_use]
pub fn body_selection_rect(rect: Rect) -> RectFine {
    rect_fine(rect).inflate(SELECTION_PADDING, SELECTION_PADDING)
}

/// The sub-part of `line` covered by `rect`, if any.
///
/// A unit interval of the line is covered as soon as the rectangle overlaps
/// it with positive length along the line's axis; the cross-axis coordinate
/// must lie within the rectangle. This is the rule used to resolve rectangle
/// selection operations over segments.
#[must_use]
pub fn line_part_in_rect(line: OrderedLine, rect: RectFine) -> Option<Part> {
    let rect = rect.abs();
    let (axis_min, axis_max, cross, cross_min, cross_max) = if is_horizontal(line) {
        (
            f64::from(line.p0.x.get()),
            f64::from(line.p1.x.get()),
            f64::from(line.p0.y.get()),
            rect.y0,
            rect.y1,
        )
    } else {
        (
            f64::from(line.p0.y.get()),
            f64::from(line.p1.y.get()),
            f64::from(line.p0.x.get()),
            rect.x0,
            rect.x1,
        )
    };

    if cross < cross_min || cross > cross_max {
        return None;
    }

    let (rect_min, rect_max) = if is_horizontal(line) {
        (rect.x0, rect.x1)
    } else {
        (rect.y0, rect.y1)
    };

    let covered_min = rect_min.max(axis_min);
    let covered_max = rect_max.min(axis_max);
    if covered_min >= covered_max {
        return None;
    }

    let length = f64::from(distance(line));
    let begin = (covered_min - axis_min).floor().clamp(0.0, length);
    let end = (covered_max - axis_min).ceil().clamp(0.0, length);
    if begin >= end {
        return None;
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "both values are clamped to the line length, which fits u16"
    )]
    let (begin, end) = (begin as u16, end as u16);
    Some(Part::from_range(begin, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x0: i16, y0: i16, x1: i16, y1: i16) -> OrderedLine {
        OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn grid_floor_rounds_toward_negative_infinity() {
        assert_eq!(
            to_grid_floor(PointFine::new(1.9, -0.1)),
            Some(Point::new(1, -1))
        );
        assert_eq!(
            to_grid_floor(PointFine::new(-2.0, 3.0)),
            Some(Point::new(-2, 3))
        );
        assert_eq!(to_grid_floor(PointFine::new(1e9, 0.0)), None);
    }

    #[test]
    fn selection_rects_are_padded() {
        let rect = line_selection_rect(line(0, 2, 4, 2));
        assert_eq!(rect.x0, -SELECTION_PADDING);
        assert_eq!(rect.y0, 2.0 - SELECTION_PADDING);
        assert_eq!(rect.x1, 4.0 + SELECTION_PADDING);
        assert_eq!(rect.y1, 2.0 + SELECTION_PADDING);
    }

    #[test]
    fn part_in_rect_covers_partial_units() {
        let l = line(0, 0, 10, 0);

        // Rect covering x in [2.5, 5.5] grabs units 2..6.
        let rect = RectFine::new(2.5, -0.5, 5.5, 0.5);
        assert_eq!(line_part_in_rect(l, rect), Some(Part::from_range(2, 6)));

        // Rect fully left of the line selects nothing.
        let rect = RectFine::new(-3.0, -0.5, -1.0, 0.5);
        assert_eq!(line_part_in_rect(l, rect), None);

        // Rect that misses the line's y selects nothing.
        let rect = RectFine::new(2.0, 1.5, 5.0, 2.5);
        assert_eq!(line_part_in_rect(l, rect), None);
    }

    #[test]
    fn part_in_rect_handles_vertical_lines() {
        let l = line(3, 0, 3, 6);
        let rect = RectFine::new(2.5, 1.0, 3.5, 4.0);
        assert_eq!(line_part_in_rect(l, rect), Some(Part::from_range(1, 4)));
    }
}
