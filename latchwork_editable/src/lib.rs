// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latchwork Editable: the interactive editing layer of the circuit core.
//!
//! [`EditableCircuit`] is the facade external callers talk to. It owns a
//! [`Layout`](latchwork_layout::Layout), keeps every derived index coherent
//! through the message bus, tracks selections, and records an undo history of
//! semantic edits.
//!
//! The interesting machinery underneath:
//!
//! - [`Selection`] / [`StableSelection`]: dense-id-valued and stable-key
//!   selections, convertible through the key index.
//! - [`VisibleSelection`]: the rubber-band selection: an initial selection
//!   plus an ordered list of additive/subtractive rectangles, resolved
//!   lazily against the spatial index and memoized.
//! - [`HistoryStack`]: parallel-vector log of inverse operations, grouped
//!   so one undo reverses one user-visible action.
//! - The editing operations in [`editing`]: insert, delete, move, and mode
//!   transitions for items, decorations, and wires, including wire segment
//!   split/merge and tree repair.
//! - [`persist`]: the serde payload of a saved circuit.
//!
//! Domain failures (`collided`, out-of-range) are ordinary [`Result`] values;
//! invariant violations panic, since they indicate a bug in this crate, not
//! bad user input.

pub mod editing;
pub mod persist;

mod circuit_data;
mod editable_circuit;
mod history;
mod placed;
mod selection;
mod stable_selection;
mod visible_selection;

pub use circuit_data::{CircuitData, SelectionId, SelectionStore};
pub use editable_circuit::{CircuitConfig, EditableCircuit};
pub use history::{
    get_entry_before_skip, has_ungrouped_entries, last_non_group_entry, reopen_group, History,
    HistoryEntry, HistoryStack, HistoryStatus,
};
pub use placed::{PlacedDecoration, PlacedLogicItem};
pub use selection::Selection;
pub use stable_selection::{to_selection, to_stable_selection, StableSelection};
pub use visible_selection::{
    ResolvedSelection, SelectionFunction, VisibleSelection, VisibleSelectionOperation,
};

/// Expected failures of editing operations.
///
/// These are outcomes of user actions, not bugs: the caller decides whether
/// to keep a colliding preview, retry, or discard.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The requested insertion would collide and the mode asked to discard.
    #[error("the inserted element would collide")]
    Collided,
    /// A position or move target leaves the representable grid range; the
    /// operation was a no-op.
    #[error("the operation would leave the grid range")]
    OutOfRange,
}

/// Failures of loading a persisted circuit.
///
/// A failed load leaves the prior circuit intact.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file's version is newer than this build understands.
    #[error("unknown file version {0}")]
    VersionUnknown(u32),
    /// The payload does not describe a loadable circuit.
    #[error("malformed circuit file: {0}")]
    Malformed(String),
}
