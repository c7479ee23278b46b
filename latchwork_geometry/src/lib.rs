// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latchwork Geometry: grid-line arithmetic shared by the layout and every
//! derived index.
//!
//! Three groups of helpers live here:
//!
//! - **Line predicates and iteration** ([`line`]): horizontal/vertical tests,
//!   endpoint facings, and the grid points covered by a segment.
//! - **Part arithmetic** ([`part`], [`PartVec`]): converting between points on
//!   a segment's line and half-open offset ranges, plus the sorted, disjoint,
//!   non-adjacent list of parts used by valid-parts tracking and selections.
//! - **Fine-grid conversions** ([`fine`]): the boundary between the integer
//!   grid and the fractional pointer space. Fine coordinates are plain
//!   [`kurbo::Point`] / [`kurbo::Rect`] values; only selection rectangles and
//!   spatial queries ever leave the integer grid.
//!
//! This crate is `no_std` and uses `alloc`; enable `std` (default) or `libm`
//! to select Kurbo's float backend.

#![no_std]

extern crate alloc;

pub mod fine;
pub mod line;
pub mod part;

mod part_vec;

pub use fine::{PointFine, RectFine};
pub use part_vec::PartVec;
