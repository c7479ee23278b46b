// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latchwork Schematic: the logical element graph handed to a simulator.
//!
//! [`generate_schematic`] freezes the inserted part of a layout into a pure
//! data structure: one element per `Normal` logic item, one element per
//! non-empty inserted wire, and the connections between them derived from
//! coincident pins and wire endpoints. How the graph is simulated, event
//! queue, history views, and so on, is a different crate's concern.

use hashbrown::HashMap;

use latchwork_layout::{shape, Layout};
use latchwork_vocabulary::{
    ConnectionId, Delay, Point, SegmentPointType, LogicItemType, LogicItemId, WireId,
};

/// Position of an element within a [`Schematic`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(u32);

impl ElementId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "element counts are bounded by the layout's dense id space"
    )]
    const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// The element's position in the schematic.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What an element simulates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A logic item of the given type.
    LogicItem(LogicItemType),
    /// A wire distributing one signal.
    Wire,
}

/// One endpoint of a connection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConnectionEnd {
    /// The connected element.
    pub element: ElementId,
    /// The pin index on that element.
    pub connection: ConnectionId,
}

/// One schematic element.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// What the element simulates.
    pub kind: ElementKind,
    /// Number of inputs.
    pub input_count: usize,
    /// Number of outputs.
    pub output_count: usize,
    /// Inversion flag per input.
    pub input_inverters: Vec<bool>,
    /// Inversion flag per output.
    pub output_inverters: Vec<bool>,
    /// Per-element delay: wire propagation, or a clock generator's period.
    pub delay: Option<Delay>,
    /// The output each input is fed from, if connected.
    pub input_sources: Vec<Option<ConnectionEnd>>,
    /// The input each output feeds, if connected.
    pub output_destinations: Vec<Option<ConnectionEnd>>,
}

/// The pure-data element graph derived from a layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schematic {
    elements: Vec<Element>,
}

impl Schematic {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the schematic has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in id order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// One element.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range id.
    #[must_use]
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    /// Number of inputs of an element.
    #[must_use]
    pub fn input_count(&self, id: ElementId) -> usize {
        self.element(id).input_count
    }

    /// Number of outputs of an element.
    #[must_use]
    pub fn output_count(&self, id: ElementId) -> usize {
        self.element(id).output_count
    }

    /// The output feeding the given input, if connected.
    #[must_use]
    pub fn input_source(&self, id: ElementId, input: ConnectionId) -> Option<ConnectionEnd> {
        self.element(id).input_sources[usize::from(input.get())]
    }

    /// The input fed by the given output, if connected.
    #[must_use]
    pub fn output_destination(&self, id: ElementId, output: ConnectionId) -> Option<ConnectionEnd> {
        self.element(id).output_destinations[usize::from(output.get())]
    }

    fn connect(&mut self, from: ConnectionEnd, to: ConnectionEnd) {
        self.elements[from.element.index()].output_destinations[usize::from(from.connection.get())] =
            Some(to);
        self.elements[to.element.index()].input_sources[usize::from(to.connection.get())] =
            Some(from);
    }
}

/// The result of schematic generation: the graph plus the id mappings back
/// into the layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchematicGeneration {
    /// The derived element graph.
    pub schematic: Schematic,
    /// Schematic element of each inserted logic item.
    pub logicitem_elements: HashMap<LogicItemId, ElementId>,
    /// Schematic element of each non-empty inserted wire.
    pub wire_elements: HashMap<WireId, ElementId>,
    /// The wire delay the generation was run with.
    pub wire_delay_per_distance: Delay,
}

/// Derives the schematic of the inserted layout.
///
/// Wires become elements whose inputs are their `Input`-typed endpoints and
/// whose outputs are their `Output`-typed endpoints; a wire with no input
/// endpoint keeps `input_count = 0` and lists every output, leaving the
/// simulator's free-input accounting to decide activity. A wire with an
/// input carries one extra output slot ahead of the endpoint outputs. Wire
/// delay scales with total segment length.
#[must_use]
pub fn generate_schematic(layout: &Layout, wire_delay_per_distance: Delay) -> SchematicGeneration {
    let mut generation = SchematicGeneration {
        wire_delay_per_distance,
        ..SchematicGeneration::default()
    };

    // Pin position maps of the inserted logic items.
    let mut input_pins: HashMap<Point, (LogicItemId, ConnectionId)> = HashMap::new();
    let mut output_pins: HashMap<Point, (LogicItemId, ConnectionId)> = HashMap::new();

    for id in layout.logicitems().ids() {
        if !layout.logicitems().display_state(id).is_inserted() {
            continue;
        }
        let data = layout.logicitems().layout_data(id);

        let element = ElementId::new(generation.schematic.elements.len());
        let input_count = usize::from(data.input_count);
        let output_count = usize::from(data.output_count);
        generation.schematic.elements.push(Element {
            kind: ElementKind::LogicItem(data.item_type),
            input_count,
            output_count,
            input_inverters: layout.logicitems().input_inverters(id).to_vec(),
            output_inverters: layout.logicitems().output_inverters(id).to_vec(),
            delay: layout.logicitems().attrs(id).map(|attrs| attrs.period),
            input_sources: vec![None; input_count],
            output_destinations: vec![None; output_count],
        });
        generation.logicitem_elements.insert(id, element);

        for pin in shape::input_locations(&data) {
            input_pins.insert(pin.position, (id, pin.connection_id));
        }
        for pin in shape::output_locations(&data) {
            output_pins.insert(pin.position, (id, pin.connection_id));
        }
    }

    for wire in layout.wires().inserted_ids() {
        let tree = layout.wires().tree(wire);
        if tree.is_empty() {
            continue;
        }

        let input_endpoints = tree.input_count();
        let output_endpoints = tree.output_count();
        let has_input = input_endpoints > 0;

        // An input-less wire is a dangling cluster of outputs; it gets no
        // placeholder input.
        let input_count = input_endpoints;
        let output_count = if has_input {
            1 + output_endpoints
        } else {
            output_endpoints
        };

        let length = tree.total_length();
        let element = ElementId::new(generation.schematic.elements.len());
        generation.schematic.elements.push(Element {
            kind: ElementKind::Wire,
            input_count,
            output_count,
            input_inverters: vec![false; input_count],
            output_inverters: vec![false; output_count],
            delay: Some(wire_delay_per_distance.saturating_mul(i64::from(length))),
            input_sources: vec![None; input_count],
            output_destinations: vec![None; output_count],
        });
        generation.wire_elements.insert(wire, element);

        // Walk the endpoints: wire inputs pair with item outputs, wire
        // outputs with item inputs. Connection ids follow walk order.
        let mut next_input = 0_u8;
        let mut next_output = if has_input { 1_u8 } else { 0_u8 };
        for info in tree.segments() {
            for (point, point_type) in [
                (info.line.p0, info.p0_type),
                (info.line.p1, info.p1_type),
            ] {
                match point_type {
                    SegmentPointType::Input => {
                        let wire_end = ConnectionEnd {
                            element,
                            connection: ConnectionId::new(next_input),
                        };
                        next_input += 1;
                        if let Some((item, connection)) = output_pins.get(&point) {
                            let item_end = ConnectionEnd {
                                element: generation.logicitem_elements[item],
                                connection: *connection,
                            };
                            generation.schematic.connect(item_end, wire_end);
                        }
                    }
                    SegmentPointType::Output => {
                        let wire_end = ConnectionEnd {
                            element,
                            connection: ConnectionId::new(next_output),
                        };
                        next_output += 1;
                        if let Some((item, connection)) = input_pins.get(&point) {
                            let item_end = ConnectionEnd {
                                element: generation.logicitem_elements[item],
                                connection: *connection,
                            };
                            generation.schematic.connect(wire_end, item_end);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    generation
}

#[cfg(test)]
mod tests {
    use latchwork_layout::{LogicItemDefinition, SegmentTree};
    use latchwork_vocabulary::{
        DisplayState, OrderedLine, SegmentInfo,
    };

    use super::*;

    fn line(x0: i16, y0: i16, x1: i16, y1: i16) -> OrderedLine {
        OrderedLine::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn empty_layout_generates_empty_schematic() {
        let generation = generate_schematic(&Layout::new(), Delay::from_micros(5));
        assert!(generation.schematic.is_empty());
        assert_eq!(generation.wire_delay_per_distance, Delay::from_micros(5));
    }

    #[test]
    fn wire_with_no_inputs_lists_outputs_only() {
        let mut layout = Layout::new();
        let wire = layout.wires_mut().add_wire();
        let tree: &mut SegmentTree = layout.wires_mut().tree_mut(wire);
        tree.add_segment(SegmentInfo {
            line: line(0, 0, 1, 0),
            p0_type: SegmentPointType::Output,
            p1_type: SegmentPointType::Output,
        });

        let generation = generate_schematic(&layout, Delay::ZERO);
        let element = generation.wire_elements[&wire];

        assert_eq!(generation.schematic.input_count(element), 0);
        assert_eq!(generation.schematic.output_count(element), 2);
        assert_eq!(
            generation
                .schematic
                .output_destination(element, ConnectionId::new(0)),
            None
        );
        assert_eq!(
            generation
                .schematic
                .output_destination(element, ConnectionId::new(1)),
            None
        );
    }

    #[test]
    fn wire_output_connects_to_gate_input() {
        let mut layout = Layout::new();
        let item = layout.logicitems_mut().add(
            LogicItemDefinition::default_for(LogicItemType::AndElement),
            Point::new(1, 0),
            DisplayState::Normal,
        );

        let wire = layout.wires_mut().add_wire();
        let tree: &mut SegmentTree = layout.wires_mut().tree_mut(wire);
        tree.add_segment(SegmentInfo {
            line: line(0, 0, 1, 0),
            p0_type: SegmentPointType::Output,
            p1_type: SegmentPointType::Output,
        });

        let generation = generate_schematic(&layout, Delay::ZERO);
        let wire_element = generation.wire_elements[&wire];
        let and_element = generation.logicitem_elements[&item];

        assert_eq!(generation.schematic.input_count(wire_element), 0);
        assert_eq!(generation.schematic.output_count(wire_element), 2);

        // One wire output ends on the gate's first input pin at (1, 0).
        let destinations: Vec<_> = (0..2)
            .map(|connection| {
                generation
                    .schematic
                    .output_destination(wire_element, ConnectionId::new(connection))
            })
            .collect();
        assert!(destinations.contains(&Some(ConnectionEnd {
            element: and_element,
            connection: ConnectionId::new(0),
        })));
        assert!(destinations.contains(&None));

        // The reverse direction is recorded on the gate.
        assert_eq!(
            generation
                .schematic
                .input_source(and_element, ConnectionId::new(0)),
            Some(ConnectionEnd {
                element: wire_element,
                connection: ConnectionId::new(1),
            })
        );
    }

    #[test]
    fn wire_with_input_reserves_the_leading_output() {
        let mut layout = Layout::new();
        let wire = layout.wires_mut().add_wire();
        let tree: &mut SegmentTree = layout.wires_mut().tree_mut(wire);
        tree.add_segment(SegmentInfo {
            line: line(0, 0, 4, 0),
            p0_type: SegmentPointType::Input,
            p1_type: SegmentPointType::Output,
        });

        let generation = generate_schematic(&layout, Delay::from_nanos(10));
        let element = generation.wire_elements[&wire];

        assert_eq!(generation.schematic.input_count(element), 1);
        assert_eq!(generation.schematic.output_count(element), 2);
        assert_eq!(
            generation.schematic.element(element).delay,
            Some(Delay::from_nanos(40))
        );
    }

    #[test]
    fn clock_generators_carry_their_period() {
        let mut layout = Layout::new();
        let item = layout.logicitems_mut().add(
            LogicItemDefinition::default_for(LogicItemType::ClockGenerator),
            Point::new(0, 0),
            DisplayState::Normal,
        );

        let generation = generate_schematic(&layout, Delay::ZERO);
        let element = generation.logicitem_elements[&item];
        assert!(generation.schematic.element(element).delay.is_some());
    }
}
