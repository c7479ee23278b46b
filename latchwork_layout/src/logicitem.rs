// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dense logic-item table.

use alloc::vec::Vec;

use latchwork_vocabulary::{
    ClockAttrs, DisplayState, LogicItemId, LogicItemType, Orientation, Point,
};
use smallvec::SmallVec;

use crate::shape;

/// Per-pin inversion flags; inline up to the common pin counts.
type Inverters = SmallVec<[bool; 8]>;

/// Everything needed to create a logic item, minus its position.
#[derive(Clone, Debug, PartialEq)]
pub struct LogicItemDefinition {
    /// The element kind.
    pub item_type: LogicItemType,
    /// Number of input pins.
    pub input_count: u8,
    /// Number of output pins.
    pub output_count: u8,
    /// Facing of the element.
    pub orientation: Orientation,
    /// Inversion flag per input pin; empty means no inversions.
    pub input_inverters: Vec<bool>,
    /// Inversion flag per output pin; empty means no inversions.
    pub output_inverters: Vec<bool>,
    /// Clock attributes; present iff the type is a clock generator.
    pub attrs: Option<ClockAttrs>,
}

impl LogicItemDefinition {
    /// A definition with the type's default pin counts and orientation.
    #[must_use]
    pub fn default_for(item_type: LogicItemType) -> Self {
        Self {
            item_type,
            input_count: shape::default_input_count(item_type),
            output_count: shape::default_output_count(item_type),
            orientation: shape::default_orientation(item_type),
            input_inverters: Vec::new(),
            output_inverters: Vec::new(),
            attrs: (item_type == LogicItemType::ClockGenerator).then(ClockAttrs::default),
        }
    }

    /// Whether counts, inverters, and attributes are consistent with the
    /// type's constraints.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let inputs_ok = shape::input_count_range(self.item_type).contains(&self.input_count);
        let outputs_ok = shape::output_count_range(self.item_type).contains(&self.output_count);
        let input_inverters_ok = self.input_inverters.is_empty()
            || self.input_inverters.len() == usize::from(self.input_count);
        let output_inverters_ok = self.output_inverters.is_empty()
            || self.output_inverters.len() == usize::from(self.output_count);
        let attrs_ok = self.attrs.is_some() == (self.item_type == LogicItemType::ClockGenerator);

        inputs_ok && outputs_ok && input_inverters_ok && output_inverters_ok && attrs_ok
    }
}

/// The shape-relevant subset of a logic item, copied into messages.
///
/// Index maintenance works on this value alone so that uninsert messages can
/// describe the state *before* a mutation without borrowing the store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogicItemLayoutData {
    /// The element kind.
    pub item_type: LogicItemType,
    /// Number of input pins.
    pub input_count: u8,
    /// Number of output pins.
    pub output_count: u8,
    /// Anchor position.
    pub position: Point,
    /// Facing of the element.
    pub orientation: Orientation,
}

/// Dense table of logic items.
///
/// Stored as parallel vectors indexed by [`LogicItemId`]; deletion swaps the
/// last row into the vacated slot. All accessors panic on dead ids; handing
/// one in is a logic error of the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogicItemStore {
    types: Vec<LogicItemType>,
    input_counts: Vec<u8>,
    output_counts: Vec<u8>,
    input_inverters: Vec<Inverters>,
    output_inverters: Vec<Inverters>,
    positions: Vec<Point>,
    orientations: Vec<Orientation>,
    display_states: Vec<DisplayState>,
    attrs: Vec<Option<ClockAttrs>>,
}

impl LogicItemStore {
    /// Number of live logic items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `id` denotes a live row.
    #[must_use]
    pub fn is_live(&self, id: LogicItemId) -> bool {
        id.index() < self.types.len()
    }

    /// Iterates over all live ids in table order.
    pub fn ids(&self) -> impl Iterator<Item = LogicItemId> {
        (0..self.types.len() as u32).map(LogicItemId::new)
    }

    /// Appends a new item and returns its dense id.
    ///
    /// # Panics
    ///
    /// Panics if the definition is invalid.
    pub fn add(
        &mut self,
        definition: LogicItemDefinition,
        position: Point,
        display_state: DisplayState,
    ) -> LogicItemId {
        assert!(definition.is_valid(), "invalid logic item definition");

        let id = LogicItemId::new(self.types.len() as u32);

        let input_inverters = normalized_inverters(
            &definition.input_inverters,
            usize::from(definition.input_count),
        );
        let output_inverters = normalized_inverters(
            &definition.output_inverters,
            usize::from(definition.output_count),
        );

        self.types.push(definition.item_type);
        self.input_counts.push(definition.input_count);
        self.output_counts.push(definition.output_count);
        self.input_inverters.push(input_inverters);
        self.output_inverters.push(output_inverters);
        self.positions.push(position);
        self.orientations.push(definition.orientation);
        self.display_states.push(display_state);
        self.attrs.push(definition.attrs);

        id
    }

    /// Removes `id` by swapping the last row into its slot.
    ///
    /// Returns the id of the row that moved, i.e. the previously-last id, or
    /// `None` if `id` was the last row.
    pub fn swap_delete(&mut self, id: LogicItemId) -> Option<LogicItemId> {
        self.assert_live(id);
        let last = self.types.len() - 1;

        self.types.swap_remove(id.index());
        self.input_counts.swap_remove(id.index());
        self.output_counts.swap_remove(id.index());
        self.input_inverters.swap_remove(id.index());
        self.output_inverters.swap_remove(id.index());
        self.positions.swap_remove(id.index());
        self.orientations.swap_remove(id.index());
        self.display_states.swap_remove(id.index());
        self.attrs.swap_remove(id.index());

        (id.index() != last).then(|| LogicItemId::new(last as u32))
    }

    /// The element kind.
    #[must_use]
    pub fn item_type(&self, id: LogicItemId) -> LogicItemType {
        self.assert_live(id);
        self.types[id.index()]
    }

    /// The anchor position.
    #[must_use]
    pub fn position(&self, id: LogicItemId) -> Point {
        self.assert_live(id);
        self.positions[id.index()]
    }

    /// The facing.
    #[must_use]
    pub fn orientation(&self, id: LogicItemId) -> Orientation {
        self.assert_live(id);
        self.orientations[id.index()]
    }

    /// The display state.
    #[must_use]
    pub fn display_state(&self, id: LogicItemId) -> DisplayState {
        self.assert_live(id);
        self.display_states[id.index()]
    }

    /// The input pin count.
    #[must_use]
    pub fn input_count(&self, id: LogicItemId) -> u8 {
        self.assert_live(id);
        self.input_counts[id.index()]
    }

    /// The output pin count.
    #[must_use]
    pub fn output_count(&self, id: LogicItemId) -> u8 {
        self.assert_live(id);
        self.output_counts[id.index()]
    }

    /// Per-input inversion flags.
    #[must_use]
    pub fn input_inverters(&self, id: LogicItemId) -> &[bool] {
        self.assert_live(id);
        &self.input_inverters[id.index()]
    }

    /// Per-output inversion flags.
    #[must_use]
    pub fn output_inverters(&self, id: LogicItemId) -> &[bool] {
        self.assert_live(id);
        &self.output_inverters[id.index()]
    }

    /// Clock attributes, present for clock generators.
    #[must_use]
    pub fn attrs(&self, id: LogicItemId) -> Option<&ClockAttrs> {
        self.assert_live(id);
        self.attrs[id.index()].as_ref()
    }

    /// Moves the item to `position`.
    pub fn set_position(&mut self, id: LogicItemId, position: Point) {
        self.assert_live(id);
        self.positions[id.index()] = position;
    }

    /// Sets the display state.
    pub fn set_display_state(&mut self, id: LogicItemId, state: DisplayState) {
        self.assert_live(id);
        self.display_states[id.index()] = state;
    }

    /// Replaces the clock attributes.
    ///
    /// # Panics
    ///
    /// Panics if the item is not a clock generator.
    pub fn set_attrs(&mut self, id: LogicItemId, attrs: ClockAttrs) {
        self.assert_live(id);
        assert!(
            self.types[id.index()] == LogicItemType::ClockGenerator,
            "only clock generators carry clock attributes"
        );
        self.attrs[id.index()] = Some(attrs);
    }

    /// Sets the input count, resizing the inversion flags.
    ///
    /// # Panics
    ///
    /// Panics if the count is outside the type's range.
    pub fn set_input_count(&mut self, id: LogicItemId, count: u8) {
        self.assert_live(id);
        assert!(
            shape::input_count_range(self.types[id.index()]).contains(&count),
            "input count outside the type's range"
        );
        self.input_counts[id.index()] = count;
        self.input_inverters[id.index()].resize(usize::from(count), false);
    }

    /// The full definition of the item, for re-adding or persisting.
    #[must_use]
    pub fn definition(&self, id: LogicItemId) -> LogicItemDefinition {
        self.assert_live(id);
        LogicItemDefinition {
            item_type: self.types[id.index()],
            input_count: self.input_counts[id.index()],
            output_count: self.output_counts[id.index()],
            orientation: self.orientations[id.index()],
            input_inverters: self.input_inverters[id.index()].to_vec(),
            output_inverters: self.output_inverters[id.index()].to_vec(),
            attrs: self.attrs[id.index()].clone(),
        }
    }

    /// The shape-relevant data used by index maintenance.
    #[must_use]
    pub fn layout_data(&self, id: LogicItemId) -> LogicItemLayoutData {
        self.assert_live(id);
        LogicItemLayoutData {
            item_type: self.types[id.index()],
            input_count: self.input_counts[id.index()],
            output_count: self.output_counts[id.index()],
            position: self.positions[id.index()],
            orientation: self.orientations[id.index()],
        }
    }

    /// Heap bytes currently allocated by the table.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        use core::mem::size_of;

        self.types.capacity() * size_of::<LogicItemType>()
            + self.input_counts.capacity()
            + self.output_counts.capacity()
            + self.input_inverters.capacity() * size_of::<Inverters>()
            + self.output_inverters.capacity() * size_of::<Inverters>()
            + self.positions.capacity() * size_of::<Point>()
            + self.orientations.capacity() * size_of::<Orientation>()
            + self.display_states.capacity() * size_of::<DisplayState>()
            + self.attrs.capacity() * size_of::<Option<ClockAttrs>>()
    }

    fn assert_live(&self, id: LogicItemId) {
        assert!(self.is_live(id), "dead logic item id {id}");
    }
}

fn normalized_inverters(flags: &[bool], count: usize) -> Inverters {
    if flags.is_empty() {
        SmallVec::from_elem(false, count)
    } else {
        SmallVec::from_slice(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_definition() -> LogicItemDefinition {
        LogicItemDefinition::default_for(LogicItemType::AndElement)
    }

    #[test]
    fn add_and_access() {
        let mut store = LogicItemStore::default();
        let id = store.add(and_definition(), Point::new(5, 0), DisplayState::Normal);

        assert_eq!(store.len(), 1);
        assert_eq!(store.item_type(id), LogicItemType::AndElement);
        assert_eq!(store.position(id), Point::new(5, 0));
        assert_eq!(store.input_count(id), 2);
        assert_eq!(store.input_inverters(id), &[false, false]);
        assert!(store.display_state(id).is_inserted());
    }

    #[test]
    fn swap_delete_moves_last_row() {
        let mut store = LogicItemStore::default();
        let first = store.add(and_definition(), Point::new(0, 0), DisplayState::Temporary);
        let _second = store.add(and_definition(), Point::new(4, 0), DisplayState::Temporary);
        let third = store.add(and_definition(), Point::new(8, 0), DisplayState::Temporary);

        let moved = store.swap_delete(first);
        assert_eq!(moved, Some(third));
        assert_eq!(store.len(), 2);
        // The previously-last row now answers under the deleted id.
        assert_eq!(store.position(first), Point::new(8, 0));

        // Deleting the final row moves nothing.
        let last = LogicItemId::new(1);
        assert_eq!(store.swap_delete(last), None);
    }

    #[test]
    fn set_input_count_resizes_inverters() {
        let mut store = LogicItemStore::default();
        let id = store.add(and_definition(), Point::new(0, 0), DisplayState::Temporary);

        store.set_input_count(id, 4);
        assert_eq!(store.input_count(id), 4);
        assert_eq!(store.input_inverters(id).len(), 4);
    }

    #[test]
    #[should_panic(expected = "invalid logic item definition")]
    fn invalid_definition_is_rejected() {
        let mut definition = and_definition();
        definition.input_count = 1; // and gates need at least two inputs
        LogicItemStore::default().add(definition, Point::new(0, 0), DisplayState::Temporary);
    }
}
