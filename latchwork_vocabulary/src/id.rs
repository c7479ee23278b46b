// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense identifiers and stable keys.
//!
//! Dense ids index compact vector tables and are recycled by swap-and-pop
//! deletion; they are *not* stable across edits. Stable keys are assigned
//! monotonically by the key index and never reused within a session; they are
//! what selections, history entries, and external observers hold on to.

use core::fmt;

use crate::Part;

macro_rules! dense_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Creates an id from its raw table position.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Returns the raw table position.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Returns the id as a table index.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! stable_key {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u64);

        impl $name {
            /// The first key handed out by a fresh key index.
            pub const FIRST: Self = Self(0);

            /// Creates a key from its raw value.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// The next key in monotonic order.
            #[must_use]
            pub const fn successor(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

dense_id!(
    /// Dense id of a logic item in the layout's logic-item table.
    LogicItemId
);
dense_id!(
    /// Dense id of a decoration in the layout's decoration table.
    DecorationId
);
dense_id!(
    /// Dense id of a wire in the layout's wire table.
    ///
    /// Two slots are reserved: [`WireId::TEMPORARY`] holds every free-floating
    /// segment and [`WireId::COLLIDING`] every segment laid out over an
    /// occupied position. Inserted wire trees start at
    /// [`WireId::FIRST_INSERTED`].
    WireId
);

impl WireId {
    /// The reserved tree holding all `temporary` segments.
    pub const TEMPORARY: Self = Self(0);
    /// The reserved tree holding all `colliding` segments.
    pub const COLLIDING: Self = Self(1);
    /// The first id used for inserted wire trees.
    pub const FIRST_INSERTED: Self = Self(2);

    /// Whether this id denotes an inserted wire tree.
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        self.0 >= Self::FIRST_INSERTED.0
    }
}

stable_key!(
    /// Stable key of a logic item.
    LogicItemKey
);
stable_key!(
    /// Stable key of a decoration.
    DecorationKey
);
stable_key!(
    /// Stable key of a wire segment.
    SegmentKey
);

/// Position of a segment within its wire's segment tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentIndex(u16);

impl SegmentIndex {
    /// Creates an index from its raw value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Returns the index as a table position.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SegmentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pin position on a logic item, counted separately for inputs and outputs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u8);

impl ConnectionId {
    /// Creates a connection id.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A segment of one wire: the wire's dense id plus the segment's position in
/// the wire's tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    /// The owning wire.
    pub wire: WireId,
    /// The segment's position in the wire's tree.
    pub index: SegmentIndex,
}

impl Segment {
    /// Creates a segment reference.
    #[must_use]
    pub const fn new(wire: WireId, index: SegmentIndex) -> Self {
        Self { wire, index }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<wire {} segment {}>", self.wire, self.index)
    }
}

/// A sub-range of one segment: the segment plus an offset range along its
/// ordered line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentPart {
    /// The referenced segment.
    pub segment: Segment,
    /// The offset range along the segment's line.
    pub part: Part,
}

impl SegmentPart {
    /// Creates a segment part.
    #[must_use]
    pub const fn new(segment: Segment, part: Part) -> Self {
        Self { segment, part }
    }
}

impl fmt::Display for SegmentPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.segment, self.part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_wire_ids() {
        assert!(!WireId::TEMPORARY.is_inserted());
        assert!(!WireId::COLLIDING.is_inserted());
        assert!(WireId::FIRST_INSERTED.is_inserted());
        assert!(WireId::new(7).is_inserted());
    }

    #[test]
    fn keys_are_monotone() {
        let key = SegmentKey::FIRST;
        assert!(key < key.successor());
        assert_eq!(key.successor().get(), 1);
    }
}
