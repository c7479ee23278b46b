// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dense decoration table.
//!
//! Decorations are purely visual elements (currently text blocks). They share
//! the dense-id, display-state, and selection machinery of logic items but
//! carry no pins and never appear in the connection indices or the schematic.

use alloc::vec::Vec;

use latchwork_vocabulary::{DecorationId, DecorationType, DisplayState, Point, Rect, TextAttrs};

/// Grid extent of a decoration, in cells beyond its anchor point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DecorationSize {
    /// Additional cells along x.
    pub width: u16,
    /// Additional cells along y.
    pub height: u16,
}

impl DecorationSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Everything needed to create a decoration, minus its position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecorationDefinition {
    /// The decoration kind.
    pub decoration_type: DecorationType,
    /// Grid extent.
    pub size: DecorationSize,
    /// Text attributes.
    pub attrs: TextAttrs,
}

/// The shape-relevant subset of a decoration, copied into messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecorationLayoutData {
    /// The decoration kind.
    pub decoration_type: DecorationType,
    /// Anchor position.
    pub position: Point,
    /// Grid extent.
    pub size: DecorationSize,
}

impl DecorationLayoutData {
    /// Whether the full extent stays on the grid.
    #[must_use]
    pub fn is_representable(&self) -> bool {
        self.position
            .x
            .checked_add(i32::from(self.size.width))
            .is_some()
            && self
                .position
                .y
                .checked_add(i32::from(self.size.height))
                .is_some()
    }

    /// The tight grid bounding rectangle.
    ///
    /// # Panics
    ///
    /// Panics if the decoration is not representable on the grid.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let p1 = Point {
            x: self
                .position
                .x
                .checked_add(i32::from(self.size.width))
                .expect("decoration must be representable"),
            y: self
                .position
                .y
                .checked_add(i32::from(self.size.height))
                .expect("decoration must be representable"),
        };
        Rect::new(self.position, p1)
    }

    /// All grid points covered by the decoration.
    ///
    /// # Panics
    ///
    /// Panics if the decoration is not representable on the grid.
    #[must_use]
    pub fn body_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for dx in 0..=i32::from(self.size.width) {
            for dy in 0..=i32::from(self.size.height) {
                points.push(Point {
                    x: self
                        .position
                        .x
                        .checked_add(dx)
                        .expect("decoration must be representable"),
                    y: self
                        .position
                        .y
                        .checked_add(dy)
                        .expect("decoration must be representable"),
                });
            }
        }
        points
    }
}

/// Dense table of decorations with swap-and-pop deletion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecorationStore {
    types: Vec<DecorationType>,
    positions: Vec<Point>,
    sizes: Vec<DecorationSize>,
    display_states: Vec<DisplayState>,
    attrs: Vec<TextAttrs>,
}

impl DecorationStore {
    /// Number of live decorations.
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
    pub fn is_live(&self, id: DecorationId) -> bool {
        id.index() < self.types.len()
    }

    /// Iterates over all live ids in table order.
    pub fn ids(&self) -> impl Iterator<Item = DecorationId> {
        (0..self.types.len() as u32).map(DecorationId::new)
    }

    /// Appends a new decoration and returns its dense id.
    pub fn add(
        &mut self,
        definition: DecorationDefinition,
        position: Point,
        display_state: DisplayState,
    ) -> DecorationId {
        let id = DecorationId::new(self.types.len() as u32);
        self.types.push(definition.decoration_type);
        self.positions.push(position);
        self.sizes.push(definition.size);
        self.display_states.push(display_state);
        self.attrs.push(definition.attrs);
        id
    }

    /// Removes `id` by swapping the last row into its slot.
    ///
    /// Returns the previously-last id if a row moved.
    pub fn swap_delete(&mut self, id: DecorationId) -> Option<DecorationId> {
        self.assert_live(id);
        let last = self.types.len() - 1;

        self.types.swap_remove(id.index());
        self.positions.swap_remove(id.index());
        self.sizes.swap_remove(id.index());
        self.display_states.swap_remove(id.index());
        self.attrs.swap_remove(id.index());

        (id.index() != last).then(|| DecorationId::new(last as u32))
    }

    /// The decoration kind.
    #[must_use]
    pub fn decoration_type(&self, id: DecorationId) -> DecorationType {
        self.assert_live(id);
        self.types[id.index()]
    }

    /// The anchor position.
    #[must_use]
    pub fn position(&self, id: DecorationId) -> Point {
        self.assert_live(id);
        self.positions[id.index()]
    }

    /// The grid extent.
    #[must_use]
    pub fn size(&self, id: DecorationId) -> DecorationSize {
        self.assert_live(id);
        self.sizes[id.index()]
    }

    /// The display state.
    #[must_use]
    pub fn display_state(&self, id: DecorationId) -> DisplayState {
        self.assert_live(id);
        self.display_states[id.index()]
    }

    /// The text attributes.
    #[must_use]
    pub fn attrs(&self, id: DecorationId) -> &TextAttrs {
        self.assert_live(id);
        &self.attrs[id.index()]
    }

    /// Moves the decoration to `position`.
    pub fn set_position(&mut self, id: DecorationId, position: Point) {
        self.assert_live(id);
        self.positions[id.index()] = position;
    }

    /// Sets the display state.
    pub fn set_display_state(&mut self, id: DecorationId, state: DisplayState) {
        self.assert_live(id);
        self.display_states[id.index()] = state;
    }

    /// Replaces the text attributes.
    pub fn set_attrs(&mut self, id: DecorationId, attrs: TextAttrs) {
        self.assert_live(id);
        self.attrs[id.index()] = attrs;
    }

    /// The full definition, for re-adding or persisting.
    #[must_use]
    pub fn definition(&self, id: DecorationId) -> DecorationDefinition {
        self.assert_live(id);
        DecorationDefinition {
            decoration_type: self.types[id.index()],
            size: self.sizes[id.index()],
            attrs: self.attrs[id.index()].clone(),
        }
    }

    /// The shape-relevant data used by index maintenance.
    #[must_use]
    pub fn layout_data(&self, id: DecorationId) -> DecorationLayoutData {
        self.assert_live(id);
        DecorationLayoutData {
            decoration_type: self.types[id.index()],
            position: self.positions[id.index()],
            size: self.sizes[id.index()],
        }
    }

    /// Heap bytes currently allocated by the table.
    #[must_use]
    pub fn allocated_size(&self) -> usize {
        use core::mem::size_of;

        self.types.capacity() * size_of::<DecorationType>()
            + self.positions.capacity() * size_of::<Point>()
            + self.sizes.capacity() * size_of::<DecorationSize>()
            + self.display_states.capacity() * size_of::<DisplayState>()
            + self
                .attrs
                .iter()
                .map(|attrs| size_of::<TextAttrs>() + attrs.text.capacity())
                .sum::<usize>()
    }

    fn assert_live(&self, id: DecorationId) {
        assert!(self.is_live(id), "dead decoration id {id}");
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    fn text_definition(text: &str) -> DecorationDefinition {
        DecorationDefinition {
            decoration_type: DecorationType::TextElement,
            size: DecorationSize::new(2, 0),
            attrs: TextAttrs {
                text: String::from(text),
            },
        }
    }

    #[test]
    fn add_access_and_delete() {
        let mut store = DecorationStore::default();
        let a = store.add(text_definition("a"), Point::new(0, 0), DisplayState::Normal);
        let b = store.add(text_definition("b"), Point::new(5, 5), DisplayState::Normal);

        assert_eq!(store.attrs(a).text, "a");
        assert_eq!(store.layout_data(b).position, Point::new(5, 5));

        let moved = store.swap_delete(a);
        assert_eq!(moved, Some(b));
        assert_eq!(store.attrs(a).text, "b");
    }

    #[test]
    fn body_points_cover_the_extent() {
        let data = DecorationLayoutData {
            decoration_type: DecorationType::TextElement,
            position: Point::new(1, 1),
            size: DecorationSize::new(2, 1),
        };
        assert_eq!(data.body_points().len(), 6);
        assert_eq!(
            data.bounding_rect(),
            Rect::new(Point::new(1, 1), Point::new(3, 2))
        );
    }
}
