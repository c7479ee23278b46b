// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editing operations: everything that mutates the layout.
//!
//! Operations validate their preconditions, apply the mutation, and emit the
//! resulting messages before returning, never interleaved, so a failed
//! precondition leaves no partial state behind. Each operation records the
//! inverse entries on the recording history stack as it goes.
//!
//! The wire algorithms live in [`wire_detail`]; [`wire`], [`logicitem`], and
//! [`decoration`] hold the user-facing primitives the facade composes.

pub mod decoration;
pub mod logicitem;
pub mod wire;
pub mod wire_detail;

use latchwork_vocabulary::{DisplayState, WireId};

/// The display state implied by the tree a segment lives in.
#[must_use]
pub fn wire_display_state(wire: WireId) -> DisplayState {
    if wire == WireId::TEMPORARY {
        DisplayState::Temporary
    } else if wire == WireId::COLLIDING {
        DisplayState::Colliding
    } else {
        DisplayState::Normal
    }
}
