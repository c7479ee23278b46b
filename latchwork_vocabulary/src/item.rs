// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Enums and records describing circuit elements and wire segments.

use alloc::string::String;
use core::fmt;

use crate::{Delay, OrderedLine, Point};

/// The kind of a logic item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogicItemType {
    /// N-input conjunction.
    AndElement,
    /// N-input disjunction.
    OrElement,
    /// N-input exclusive-or.
    XorElement,
    /// Single-input buffer.
    Buffer,
    /// Interactive momentary source.
    Button,
    /// Single-input indicator.
    Led,
    /// Multi-digit numeric display.
    DisplayNumber,
    /// Eight-bit ASCII display.
    DisplayAscii,
    /// Free-running clock source.
    ClockGenerator,
    /// JK flip-flop.
    FlipflopJk,
    /// Edge-triggered D flip-flop.
    FlipflopD,
    /// Master-slave D flip-flop.
    FlipflopMsD,
    /// Level-sensitive D latch.
    LatchD,
    /// Serial shift register.
    ShiftRegister,
    /// Nested circuit instance.
    SubCircuit,
    /// Pin-less annotation element.
    TextElement,
}

/// The kind of a decoration.
///
/// Decorations share the layout's positioning and selection machinery with
/// logic items but are purely visual and never reach the simulation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DecorationType {
    /// A block of text on the canvas.
    #[default]
    TextElement,
}

/// The facing of a logic item or of a wire endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Facing positive x.
    Right,
    /// Facing negative x.
    Left,
    /// Facing negative y.
    Up,
    /// Facing positive y.
    Down,
    /// No facing; connects in any direction.
    Undirected,
}

impl Orientation {
    /// The opposite facing; `Undirected` is its own opposite.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Undirected => Self::Undirected,
        }
    }

    /// Whether two facings may handshake at a shared point.
    ///
    /// Directed facings must be exact opposites; `Undirected` pairs with
    /// anything.
    #[must_use]
    pub const fn is_compatible_with(self, other: Self) -> bool {
        matches!(self, Self::Undirected)
            || matches!(other, Self::Undirected)
            || matches!(
                (self, other),
                (Self::Right, Self::Left)
                    | (Self::Left, Self::Right)
                    | (Self::Up, Self::Down)
                    | (Self::Down, Self::Up)
            )
    }
}

/// Whether an item participates in indices and simulation.
///
/// The three states form a lattice `Temporary < Colliding < Normal`; every
/// mode change decomposes into steps between neighbors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DisplayState {
    /// Free-floating; no collision or connectivity checks apply.
    Temporary,
    /// Laid out but overlapping an inserted item.
    Colliding,
    /// Inserted; all invariants are enforced.
    Normal,
}

impl DisplayState {
    /// Whether items in this state are registered in the derived indices.
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// The requested target state of an add or mode-change operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InsertionMode {
    /// Leave the item free-floating.
    Temporary,
    /// Lay the item out; it may end up colliding.
    Collisions,
    /// Insert, or discard the item if the target position collides.
    InsertOrDiscard,
}

impl From<DisplayState> for InsertionMode {
    fn from(state: DisplayState) -> Self {
        match state {
            DisplayState::Temporary => Self::Temporary,
            DisplayState::Colliding => Self::Collisions,
            DisplayState::Normal => Self::InsertOrDiscard,
        }
    }
}

/// The role of a segment endpoint within its wire and against external pins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SegmentPointType {
    /// The wire receives a signal here (the point coincides with a logic-item
    /// output pin).
    Input,
    /// The wire delivers a signal here (a logic-item input pin, or a free
    /// delivering end).
    Output,
    /// Exactly two segments of the same tree meet here.
    CornerPoint,
    /// Three or four segments of the same tree meet here.
    CrossPoint,
    /// A plain end of a segment; occupies no connection slot.
    ShadowPoint,
    /// Placeholder used while planning an insertion; never stored on an
    /// inserted segment.
    NewUnknown,
}

impl SegmentPointType {
    /// Whether the type denotes an electrical connection (input, output, or
    /// cross point).
    #[must_use]
    pub const fn is_connection(self) -> bool {
        matches!(self, Self::Input | Self::Output | Self::CrossPoint)
    }
}

/// Endpoint types of one segment, in line order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoints {
    /// Type at the segment's `p0`.
    pub p0: SegmentPointType,
    /// Type at the segment's `p1`.
    pub p1: SegmentPointType,
}

impl Endpoints {
    /// Both endpoints as shadow points, the default for uninserted segments.
    pub const SHADOW: Self = Self {
        p0: SegmentPointType::ShadowPoint,
        p1: SegmentPointType::ShadowPoint,
    };
}

/// Geometry and endpoint metadata of one wire segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SegmentInfo {
    /// The segment's line.
    pub line: OrderedLine,
    /// Endpoint type at `line.p0`.
    pub p0_type: SegmentPointType,
    /// Endpoint type at `line.p1`.
    pub p1_type: SegmentPointType,
}

impl SegmentInfo {
    /// Creates segment info with both endpoints as shadow points.
    #[must_use]
    pub const fn with_shadow_points(line: OrderedLine) -> Self {
        Self {
            line,
            p0_type: SegmentPointType::ShadowPoint,
            p1_type: SegmentPointType::ShadowPoint,
        }
    }

    /// The endpoint types in line order.
    #[must_use]
    pub const fn endpoints(&self) -> Endpoints {
        Endpoints {
            p0: self.p0_type,
            p1: self.p1_type,
        }
    }

    /// The endpoint type at `point`, if `point` is one of the two endpoints.
    #[must_use]
    pub fn type_at(&self, point: Point) -> Option<SegmentPointType> {
        if point == self.line.p0 {
            Some(self.p0_type)
        } else if point == self.line.p1 {
            Some(self.p1_type)
        } else {
            None
        }
    }

    /// Returns a copy with the endpoint at `point` set to `point_type`.
    ///
    /// # Panics
    ///
    /// Panics if `point` is not an endpoint of the segment.
    #[must_use]
    pub fn with_type_at(&self, point: Point, point_type: SegmentPointType) -> Self {
        let mut info = *self;
        if point == self.line.p0 {
            info.p0_type = point_type;
        } else if point == self.line.p1 {
            info.p1_type = point_type;
        } else {
            panic!("point is not an endpoint of the segment");
        }
        info
    }

    /// Returns a copy with the given endpoint types.
    #[must_use]
    pub const fn with_endpoints(&self, endpoints: Endpoints) -> Self {
        Self {
            line: self.line,
            p0_type: endpoints.p0,
            p1_type: endpoints.p1,
        }
    }
}

impl fmt::Display for SegmentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {:?}-{:?}>",
            self.line, self.p0_type, self.p1_type
        )
    }
}

/// Attributes of a clock generator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockAttrs {
    /// Display name of the generator.
    pub name: String,
    /// Full period of one on/off cycle.
    pub period: Delay,
}

impl Default for ClockAttrs {
    fn default() -> Self {
        Self {
            name: String::new(),
            period: Delay::from_micros(1),
        }
    }
}

/// Attributes of a text decoration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextAttrs {
    /// The displayed text.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_handshakes() {
        use Orientation::*;

        assert!(Right.is_compatible_with(Left));
        assert!(Up.is_compatible_with(Down));
        assert!(!Right.is_compatible_with(Right));
        assert!(!Left.is_compatible_with(Up));
        assert!(Undirected.is_compatible_with(Right));
        assert!(Down.is_compatible_with(Undirected));
    }

    #[test]
    fn display_state_lattice() {
        assert!(DisplayState::Temporary < DisplayState::Colliding);
        assert!(DisplayState::Colliding < DisplayState::Normal);
        assert!(DisplayState::Normal.is_inserted());
        assert!(!DisplayState::Colliding.is_inserted());
    }

    #[test]
    fn segment_info_endpoint_updates() {
        let line = OrderedLine::new(Point::new(0, 0), Point::new(4, 0));
        let info = SegmentInfo::with_shadow_points(line);

        let updated = info.with_type_at(Point::new(4, 0), SegmentPointType::Input);
        assert_eq!(updated.p0_type, SegmentPointType::ShadowPoint);
        assert_eq!(updated.p1_type, SegmentPointType::Input);
        assert_eq!(
            updated.type_at(Point::new(4, 0)),
            Some(SegmentPointType::Input)
        );
        assert_eq!(updated.type_at(Point::new(2, 0)), None);
    }
}
