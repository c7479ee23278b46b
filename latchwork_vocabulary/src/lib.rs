// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latchwork Vocabulary: the strong-typed value vocabulary of the circuit core.
//!
//! Everything the editable circuit talks about is expressed through the small
//! value types in this crate:
//!
//! - Grid geometry: [`Coord`], [`Point`], [`Line`], [`OrderedLine`], [`Rect`].
//! - One-dimensional ranges along a segment: [`Offset`], [`Part`].
//! - Dense identifiers that index compact tables and are recycled on deletion:
//!   [`LogicItemId`], [`DecorationId`], [`WireId`], [`SegmentIndex`],
//!   [`Segment`], [`SegmentPart`].
//! - Stable keys that are assigned monotonically and survive arbitrary edits:
//!   [`LogicItemKey`], [`DecorationKey`], [`SegmentKey`].
//! - The closed enums of the data model: [`LogicItemType`], [`Orientation`],
//!   [`DisplayState`], [`InsertionMode`], [`SegmentPointType`].
//!
//! All geometry lives on a signed 16-bit integer grid; there is no
//! floating-point state in this crate. Types with invariants (orthogonal
//! lines, ordered rectangles, non-empty parts) enforce them at construction
//! and panic on violation, which keeps every downstream consumer free of
//! re-validation.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod grid;
mod id;
mod item;

pub use grid::{Coord, Delay, Line, MoveDelta, Offset, OrderedLine, Part, Point, Rect};
pub use id::{
    ConnectionId, DecorationId, DecorationKey, LogicItemId, LogicItemKey, Segment, SegmentIndex,
    SegmentKey, SegmentPart, WireId,
};
pub use item::{
    ClockAttrs, DecorationType, DisplayState, Endpoints, InsertionMode, LogicItemType, Orientation,
    SegmentInfo, SegmentPointType, TextAttrs,
};
