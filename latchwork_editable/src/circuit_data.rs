// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared mutable state every editing operation works on.

use hashbrown::HashMap;

use latchwork_index::LayoutIndex;
use latchwork_layout::{InfoMessage, Layout};

use crate::history::History;
use crate::{Selection, VisibleSelection};

/// Stable handle of a tracked selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectionId(u64);

impl SelectionId {
    /// The raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The registry of caller-owned selections.
///
/// Registered selections are kept live through the message stream like the
/// visible selection; callers address them by [`SelectionId`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionStore {
    selections: HashMap<SelectionId, Selection>,
    next_id: u64,
}

impl SelectionStore {
    /// Registers a new, empty selection.
    pub fn create(&mut self) -> SelectionId {
        let id = SelectionId(self.next_id);
        self.next_id += 1;
        self.selections.insert(id, Selection::new());
        id
    }

    /// Removes a selection.
    ///
    /// # Panics
    ///
    /// Panics if the id is not registered.
    pub fn destroy(&mut self, id: SelectionId) {
        self.selections
            .remove(&id)
            .expect("selection id must be registered");
    }

    /// The selection behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if the id is not registered.
    #[must_use]
    pub fn get(&self, id: SelectionId) -> &Selection {
        self.selections
            .get(&id)
            .expect("selection id must be registered")
    }

    /// The selection behind `id`, mutable.
    ///
    /// # Panics
    ///
    /// Panics if the id is not registered.
    pub fn get_mut(&mut self, id: SelectionId) -> &mut Selection {
        self.selections
            .get_mut(&id)
            .expect("selection id must be registered")
    }

    /// Number of registered selections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Whether no selection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    fn submit(&mut self, message: &InfoMessage) {
        for selection in self.selections.values_mut() {
            selection.submit(message);
        }
    }
}

/// Layout, indices, selections, and history as one unit.
///
/// Editing operations mutate the layout through this struct and report every
/// mutation with [`CircuitData::submit`], which fans the message out to the
/// indices, the visible selection, and all registered selections, in that
/// fixed order, synchronously.
#[derive(Debug, Default)]
pub struct CircuitData {
    /// The authoritative layout.
    pub layout: Layout,
    /// All derived indices.
    pub index: LayoutIndex,
    /// The user-visible selection.
    pub visible_selection: VisibleSelection,
    /// Caller-registered selections.
    pub selections: SelectionStore,
    /// The undo/redo log.
    pub history: History,
}

impl CircuitData {
    /// Creates empty circuit data.
    #[must_use]
    pub fn new(enable_history: bool) -> Self {
        Self {
            history: History::new(enable_history),
            ..Self::default()
        }
    }

    /// Delivers one mutation message to every consumer, in registration
    /// order.
    pub fn submit(&mut self, message: InfoMessage) {
        tracing::trace!(?message, "layout message");
        self.index.submit(&message);
        self.visible_selection.submit(&message);
        self.selections.submit(&message);
    }

    /// Asserts all index round-trip invariants against the layout.
    ///
    /// # Panics
    ///
    /// Panics when any derived state is out of sync; see
    /// [`LayoutIndex::validate`].
    pub fn validate(&self) {
        self.index.validate(&self.layout);
    }
}

#[cfg(test)]
mod tests {
    use latchwork_vocabulary::LogicItemId;

    use super::*;

    #[test]
    fn selection_registry_round_trip() {
        let mut store = SelectionStore::default();
        let id = store.create();
        store.get_mut(id).add_logicitem(LogicItemId::new(0));
        assert!(store.get(id).is_selected_logicitem(LogicItemId::new(0)));

        let other = store.create();
        assert_ne!(id, other);

        store.destroy(id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn messages_reach_registered_selections() {
        let mut circuit = CircuitData::new(true);
        for index in 0..3 {
            circuit.submit(InfoMessage::LogicItemCreated {
                id: LogicItemId::new(index),
            });
        }

        let id = circuit.selections.create();
        circuit
            .selections
            .get_mut(id)
            .add_logicitem(LogicItemId::new(2));

        // A swap-and-pop deletion of item 0 renumbers item 2.
        circuit.submit(InfoMessage::LogicItemDeleted {
            id: LogicItemId::new(0),
        });
        circuit.submit(InfoMessage::LogicItemIdUpdated {
            new_id: LogicItemId::new(0),
            old_id: LogicItemId::new(2),
        });
        assert!(
            circuit
                .selections
                .get(id)
                .is_selected_logicitem(LogicItemId::new(0))
        );
    }
}
