// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The persistence payload of a saved circuit.
//!
//! Only what is needed to rebuild the circuit is stored: for every inserted
//! logic item its definition and placement, for every decoration its
//! definition and placement, and for every inserted wire the plain list of
//! segment lines. Endpoint types, valid parts, and all derived indices are
//! recomputed on load by re-running the insertion pipeline. The envelope
//! (compression, file I/O) belongs to outer layers; this module defines the
//! serde payload and the conversions.
//!
//! Stable keys are not persisted; a load assigns fresh monotone keys.

use serde::{Deserialize, Serialize};

use latchwork_layout::{DecorationDefinition, DecorationSize, Layout};
use latchwork_vocabulary::{
    ClockAttrs, DecorationType, InsertionMode, LogicItemType, Orientation, OrderedLine, Point,
    TextAttrs,
};

use crate::{CircuitConfig, EditableCircuit, EditError, LoadError};

/// The newest payload version this build writes and reads.
pub const CURRENT_VERSION: u32 = 1;

/// The UI viewport stored alongside the circuit, passed through opaquely.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewPoint {
    /// World-space x of the view center.
    pub offset_x: f64,
    /// World-space y of the view center.
    pub offset_y: f64,
    /// Zoom factor.
    pub zoom: f64,
}

/// Simulation parameters stored with the circuit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Signal delay per grid unit of wire, in nanoseconds.
    pub wire_delay_per_distance_ns: i64,
}

/// One persisted logic item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedLogicItem {
    /// The element kind.
    pub item_type: LogicItemType,
    /// Number of input pins.
    pub input_count: u8,
    /// Number of output pins.
    pub output_count: u8,
    /// Inversion flag per input pin.
    pub input_inverters: Vec<bool>,
    /// Inversion flag per output pin.
    pub output_inverters: Vec<bool>,
    /// Anchor position.
    pub position: Point,
    /// Facing of the element.
    pub orientation: Orientation,
    /// Clock attributes, for clock generators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<ClockAttrs>,
}

/// One persisted decoration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedDecoration {
    /// The decoration kind.
    pub decoration_type: DecorationType,
    /// Anchor position.
    pub position: Point,
    /// Extent along x, in cells beyond the anchor.
    pub width: u16,
    /// Extent along y, in cells beyond the anchor.
    pub height: u16,
    /// Text attributes.
    pub attrs: TextAttrs,
}

/// One persisted wire: its segment lines, nothing else.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedWire {
    /// The ordered lines of the wire's segments.
    pub segments: Vec<OrderedLine>,
}

/// A complete persisted circuit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircuitFile {
    /// Payload version.
    pub version: u32,
    /// Stored viewport.
    pub view_point: ViewPoint,
    /// Stored simulation parameters.
    pub simulation_config: SimulationConfig,
    /// Inserted logic items.
    pub logicitems: Vec<PersistedLogicItem>,
    /// Inserted decorations.
    pub decorations: Vec<PersistedDecoration>,
    /// Inserted wires.
    pub wires: Vec<PersistedWire>,
}

/// Captures the inserted contents of a layout as a persistable payload.
#[must_use]
pub fn to_circuit_file(
    layout: &Layout,
    view_point: ViewPoint,
    simulation_config: SimulationConfig,
) -> CircuitFile {
    let mut logicitems = Vec::new();
    for id in layout.logicitems().ids() {
        if !layout.logicitems().display_state(id).is_inserted() {
            continue;
        }
        let definition = layout.logicitems().definition(id);
        logicitems.push(PersistedLogicItem {
            item_type: definition.item_type,
            input_count: definition.input_count,
            output_count: definition.output_count,
            input_inverters: definition.input_inverters,
            output_inverters: definition.output_inverters,
            position: layout.logicitems().position(id),
            orientation: definition.orientation,
            attrs: definition.attrs,
        });
    }

    let mut decorations = Vec::new();
    for id in layout.decorations().ids() {
        if !layout.decorations().display_state(id).is_inserted() {
            continue;
        }
        let definition = layout.decorations().definition(id);
        decorations.push(PersistedDecoration {
            decoration_type: definition.decoration_type,
            position: layout.decorations().position(id),
            width: definition.size.width,
            height: definition.size.height,
            attrs: definition.attrs,
        });
    }

    let mut wires = Vec::new();
    for wire in layout.wires().inserted_ids() {
        let tree = layout.wires().tree(wire);
        if tree.is_empty() {
            continue;
        }
        wires.push(PersistedWire {
            segments: tree.segments().map(|info| info.line).collect(),
        });
    }

    CircuitFile {
        version: CURRENT_VERSION,
        view_point,
        simulation_config,
        logicitems,
        decorations,
        wires,
    }
}

/// Builds a fresh circuit from a persisted payload.
///
/// A failure leaves no partial circuit behind; the caller keeps whatever it
/// had. History starts empty.
pub fn load_circuit_file(
    file: &CircuitFile,
    config: CircuitConfig,
) -> Result<EditableCircuit, LoadError> {
    if file.version > CURRENT_VERSION {
        return Err(LoadError::VersionUnknown(file.version));
    }

    let mut circuit = EditableCircuit::new(config);

    for item in &file.logicitems {
        let definition = latchwork_layout::LogicItemDefinition {
            item_type: item.item_type,
            input_count: item.input_count,
            output_count: item.output_count,
            orientation: item.orientation,
            input_inverters: item.input_inverters.clone(),
            output_inverters: item.output_inverters.clone(),
            attrs: item.attrs.clone(),
        };
        if !definition.is_valid() {
            return Err(LoadError::Malformed(format!(
                "invalid logic item definition at {}",
                item.position
            )));
        }
        match circuit.add_logicitem(definition, item.position, InsertionMode::InsertOrDiscard) {
            Ok(_) => {}
            Err(EditError::Collided) => {
                return Err(LoadError::Malformed(format!(
                    "overlapping logic item at {}",
                    item.position
                )));
            }
            Err(EditError::OutOfRange) => {
                return Err(LoadError::Malformed(format!(
                    "logic item outside the grid at {}",
                    item.position
                )));
            }
        }
    }

    for item in &file.decorations {
        let definition = DecorationDefinition {
            decoration_type: item.decoration_type,
            size: DecorationSize::new(item.width, item.height),
            attrs: item.attrs.clone(),
        };
        match circuit.add_decoration(definition, item.position, InsertionMode::InsertOrDiscard) {
            Ok(_) => {}
            Err(error) => {
                return Err(LoadError::Malformed(format!(
                    "unloadable decoration at {}: {error}",
                    item.position
                )));
            }
        }
    }

    for wire in &file.wires {
        for line in &wire.segments {
            match circuit.add_wire_segment(*line, InsertionMode::InsertOrDiscard) {
                Ok(_) => {}
                Err(error) => {
                    return Err(LoadError::Malformed(format!(
                        "unloadable wire segment {line}: {error}"
                    )));
                }
            }
        }
    }

    // Loading is not an undoable action.
    circuit.clear_history();
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use latchwork_layout::LogicItemDefinition;

    use super::*;

    #[test]
    fn save_load_round_trip() {
        let mut circuit = EditableCircuit::new(CircuitConfig::default());
        circuit
            .add_logicitem(
                LogicItemDefinition::default_for(LogicItemType::AndElement),
                Point::new(5, 0),
                InsertionMode::InsertOrDiscard,
            )
            .unwrap();
        circuit
            .add_wire_segment(
                OrderedLine::new(Point::new(0, 0), Point::new(5, 0)),
                InsertionMode::InsertOrDiscard,
            )
            .unwrap();

        let file = to_circuit_file(
            circuit.layout(),
            ViewPoint::default(),
            SimulationConfig::default(),
        );
        let restored = load_circuit_file(&file, CircuitConfig::default()).unwrap();

        // The reloaded circuit captures to the same payload.
        let file_again = to_circuit_file(
            restored.layout(),
            ViewPoint::default(),
            SimulationConfig::default(),
        );
        assert_eq!(file, file_again);
        restored.validate();
    }

    #[test]
    fn serde_round_trip_is_stable() {
        let mut circuit = EditableCircuit::new(CircuitConfig::default());
        circuit
            .add_logicitem(
                LogicItemDefinition::default_for(LogicItemType::ClockGenerator),
                Point::new(2, 2),
                InsertionMode::InsertOrDiscard,
            )
            .unwrap();

        let file = to_circuit_file(
            circuit.layout(),
            ViewPoint {
                offset_x: 1.5,
                offset_y: -4.0,
                zoom: 2.0,
            },
            SimulationConfig {
                wire_delay_per_distance_ns: 10,
            },
        );

        let encoded = serde_json::to_string(&file).unwrap();
        let decoded: CircuitFile = serde_json::from_str(&encoded).unwrap();
        assert_eq!(file, decoded);
        assert_eq!(serde_json::to_string(&decoded).unwrap(), encoded);
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let file = CircuitFile {
            version: CURRENT_VERSION + 1,
            view_point: ViewPoint::default(),
            simulation_config: SimulationConfig::default(),
            logicitems: Vec::new(),
            decorations: Vec::new(),
            wires: Vec::new(),
        };
        assert!(matches!(
            load_circuit_file(&file, CircuitConfig::default()),
            Err(LoadError::VersionUnknown(_))
        ));
    }
}
