//! JSON netlist interchange.
//!
//! The on-disk design format keeps every name as a string; this module
//! converts it to and from the interned IR at the CLI boundary.
//!
//! ```json
//! {
//!   "modules": [
//!     {
//!       "name": "top", "top": true,
//!       "wires": [
//!         { "name": "clk", "width": 1, "input": true,
//!           "attributes": { "clkbuf_inhibit": true } }
//!       ],
//!       "cells": [
//!         { "name": "ff0", "type": "DFFRE", "connections": [
//!           { "port": "C", "direction": "input", "signal": [["clk", 0]] }
//!         ] }
//!       ],
//!       "connections": [ { "lhs": [["clk", 0]], "rhs": [["clk_alias", 0]] } ]
//!     }
//!   ]
//! }
//! ```
//!
//! A signal is a list of bits, LSB first; each bit is either a
//! `["wire", offset]` pair or a constant `"0"`, `"1"`, `"x"`, `"z"`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use takt_common::{Interner, Logic};
use takt_ir::{
    AttrValue, Connection, Design, Module, PortDirection, SigBit, SigSpec, WireId,
};

/// Errors produced while resolving a JSON design against itself.
#[derive(Debug, thiserror::Error)]
pub enum NetlistJsonError {
    /// A signal referenced a wire the module does not declare.
    #[error("unknown wire '{wire}' referenced in module '{module}'")]
    UnknownWire {
        /// The module containing the reference.
        module: String,
        /// The undeclared wire name.
        wire: String,
    },

    /// A signal referenced a bit past the end of a wire.
    #[error("bit {offset} out of range for wire '{wire}' (width {width}) in module '{module}'")]
    BitOutOfRange {
        /// The module containing the reference.
        module: String,
        /// The wire name.
        wire: String,
        /// The wire's declared width.
        width: u32,
        /// The offending bit offset.
        offset: u32,
    },

    /// A constant bit was not one of `0`, `1`, `x`, `z`.
    #[error("invalid constant bit '{0}': expected one of 0, 1, x, z")]
    InvalidConst(String),
}

/// A whole design as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDesign {
    /// All modules, blackbox declarations included.
    pub modules: Vec<JsonModule>,
}

/// One module of the design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonModule {
    /// The module name; cell types resolve against it.
    pub name: String,
    /// `true` for the hierarchy root.
    #[serde(default, skip_serializing_if = "is_false")]
    pub top: bool,
    /// `true` for an interface-only declaration.
    #[serde(default, skip_serializing_if = "is_false")]
    pub blackbox: bool,
    /// Wires in declaration order; port order follows it.
    #[serde(default)]
    pub wires: Vec<JsonWire>,
    /// Cell instances.
    #[serde(default)]
    pub cells: Vec<JsonCell>,
    /// Wire-to-wire connection pairs.
    #[serde(default)]
    pub connections: Vec<JsonConnectionPair>,
}

/// One wire of a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWire {
    /// The wire name.
    pub name: String,
    /// Bit width.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Input-port flag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub input: bool,
    /// Output-port flag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub output: bool,
    /// Attributes; booleans, integers, and strings are supported.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, JsonAttr>,
}

/// One cell instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCell {
    /// The instance name.
    pub name: String,
    /// The cell-type name.
    #[serde(rename = "type")]
    pub ty: String,
    /// Port bindings.
    #[serde(default)]
    pub connections: Vec<JsonCellConnection>,
}

/// One port binding of a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCellConnection {
    /// The port name.
    pub port: String,
    /// The port direction per the cell type's declaration.
    pub direction: JsonDirection,
    /// The bound signal.
    pub signal: Vec<JsonSigBit>,
}

/// A module-level connection pair; both sides carry the same net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonConnectionPair {
    /// The first side.
    pub lhs: Vec<JsonSigBit>,
    /// The second side.
    pub rhs: Vec<JsonSigBit>,
}

/// A port direction as spelled in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonDirection {
    /// Data flows into the cell.
    Input,
    /// Data flows out of the cell.
    Output,
    /// Bidirectional.
    Inout,
}

/// One signal bit: a `["wire", offset]` pair or a constant character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonSigBit {
    /// A bit of a named wire.
    Wire(String, u32),
    /// A constant bit.
    Const(String),
}

/// An attribute value as spelled in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonAttr {
    /// A boolean flag.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A string value.
    String(String),
}

fn default_width() -> u32 {
    1
}

fn is_false(value: &bool) -> bool {
    !value
}

/// Builds the interned IR from a JSON design.
pub fn design_from_json(
    json: &JsonDesign,
    interner: &Interner,
) -> Result<Design, NetlistJsonError> {
    let mut design = Design::new();
    for json_module in &json.modules {
        let module_id = design.add_module(interner.get_or_intern(&json_module.name));
        let module = design.modules.get_mut(module_id);
        module.top = json_module.top;
        module.blackbox = json_module.blackbox;

        let mut wire_ids: HashMap<&str, (WireId, u32)> = HashMap::new();
        for json_wire in &json_module.wires {
            let id = module.add_wire(interner.get_or_intern(&json_wire.name), json_wire.width);
            {
                let wire = module.wires.get_mut(id);
                wire.port_input = json_wire.input;
                wire.port_output = json_wire.output;
                for (key, value) in &json_wire.attributes {
                    wire.attrs
                        .set(interner.get_or_intern(key), attr_from_json(value));
                }
            }
            wire_ids.insert(json_wire.name.as_str(), (id, json_wire.width));
        }

        for json_cell in &json_module.cells {
            let mut connections = Vec::with_capacity(json_cell.connections.len());
            for conn in &json_cell.connections {
                connections.push(Connection {
                    port: interner.get_or_intern(&conn.port),
                    direction: direction_from_json(conn.direction),
                    sig: sig_from_json(&conn.signal, &wire_ids, &json_module.name)?,
                });
            }
            module.add_cell(
                interner.get_or_intern(&json_cell.name),
                interner.get_or_intern(&json_cell.ty),
                connections,
            );
        }

        for pair in &json_module.connections {
            let lhs = sig_from_json(&pair.lhs, &wire_ids, &json_module.name)?;
            let rhs = sig_from_json(&pair.rhs, &wire_ids, &json_module.name)?;
            module.connect(lhs, rhs);
        }

        module.fixup_ports();
    }
    Ok(design)
}

/// Serializes the interned IR back to the JSON shape.
pub fn design_to_json(design: &Design, interner: &Interner) -> JsonDesign {
    let modules = design
        .modules
        .values()
        .map(|module| module_to_json(module, interner))
        .collect();
    JsonDesign { modules }
}

fn module_to_json(module: &Module, interner: &Interner) -> JsonModule {
    let wires = module
        .wires
        .values()
        .map(|wire| JsonWire {
            name: interner.resolve(wire.name).to_string(),
            width: wire.width,
            input: wire.port_input,
            output: wire.port_output,
            attributes: wire
                .attrs
                .iter()
                .map(|(key, value)| (interner.resolve(key).to_string(), attr_to_json(value)))
                .collect(),
        })
        .collect();

    let cells = module
        .cells
        .values()
        .map(|cell| JsonCell {
            name: interner.resolve(cell.name).to_string(),
            ty: interner.resolve(cell.ty).to_string(),
            connections: cell
                .connections
                .iter()
                .map(|conn| JsonCellConnection {
                    port: interner.resolve(conn.port).to_string(),
                    direction: direction_to_json(conn.direction),
                    signal: sig_to_json(&conn.sig, module, interner),
                })
                .collect(),
        })
        .collect();

    let connections = module
        .connections
        .iter()
        .map(|(lhs, rhs)| JsonConnectionPair {
            lhs: sig_to_json(lhs, module, interner),
            rhs: sig_to_json(rhs, module, interner),
        })
        .collect();

    JsonModule {
        name: interner.resolve(module.name).to_string(),
        top: module.top,
        blackbox: module.blackbox,
        wires,
        cells,
        connections,
    }
}

fn sig_from_json(
    bits: &[JsonSigBit],
    wire_ids: &HashMap<&str, (WireId, u32)>,
    module: &str,
) -> Result<SigSpec, NetlistJsonError> {
    let mut sig = SigSpec::new();
    for bit in bits {
        match bit {
            JsonSigBit::Wire(wire, offset) => {
                let &(id, width) =
                    wire_ids
                        .get(wire.as_str())
                        .ok_or_else(|| NetlistJsonError::UnknownWire {
                            module: module.to_string(),
                            wire: wire.clone(),
                        })?;
                if *offset >= width {
                    return Err(NetlistJsonError::BitOutOfRange {
                        module: module.to_string(),
                        wire: wire.clone(),
                        width,
                        offset: *offset,
                    });
                }
                sig.push(SigBit::wire(id, *offset));
            }
            JsonSigBit::Const(text) => {
                let mut chars = text.chars();
                let value = chars
                    .next()
                    .and_then(Logic::from_char)
                    .filter(|_| chars.next().is_none())
                    .ok_or_else(|| NetlistJsonError::InvalidConst(text.clone()))?;
                sig.push(SigBit::Const(value));
            }
        }
    }
    Ok(sig)
}

fn sig_to_json(sig: &SigSpec, module: &Module, interner: &Interner) -> Vec<JsonSigBit> {
    sig.bits()
        .iter()
        .map(|&bit| match bit {
            SigBit::Wire { wire, offset } => {
                JsonSigBit::Wire(interner.resolve(module.wires[wire].name).to_string(), offset)
            }
            SigBit::Const(value) => JsonSigBit::Const(value.to_string()),
        })
        .collect()
}

fn attr_from_json(value: &JsonAttr) -> AttrValue {
    match value {
        JsonAttr::Bool(b) => AttrValue::Bool(*b),
        JsonAttr::Int(i) => AttrValue::Int(*i),
        JsonAttr::String(s) => AttrValue::String(s.clone()),
    }
}

fn attr_to_json(value: &AttrValue) -> JsonAttr {
    match value {
        AttrValue::Bool(b) => JsonAttr::Bool(*b),
        AttrValue::Int(i) => JsonAttr::Int(*i),
        AttrValue::String(s) => JsonAttr::String(s.clone()),
    }
}

fn direction_from_json(direction: JsonDirection) -> PortDirection {
    match direction {
        JsonDirection::Input => PortDirection::Input,
        JsonDirection::Output => PortDirection::Output,
        JsonDirection::Inout => PortDirection::InOut,
    }
}

fn direction_to_json(direction: PortDirection) -> JsonDirection {
    match direction {
        PortDirection::Input => JsonDirection::Input,
        PortDirection::Output => JsonDirection::Output,
        PortDirection::InOut => JsonDirection::Inout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "modules": [
            {
                "name": "FF",
                "blackbox": true,
                "wires": [
                    { "name": "C", "input": true,
                      "attributes": { "clkbuf_sink": true } }
                ]
            },
            {
                "name": "top",
                "top": true,
                "wires": [
                    { "name": "clk", "input": true },
                    { "name": "clk_alias" },
                    { "name": "data", "width": 8 }
                ],
                "cells": [
                    { "name": "ff0", "type": "FF", "connections": [
                        { "port": "C", "direction": "input",
                          "signal": [["clk_alias", 0]] }
                    ] }
                ],
                "connections": [
                    { "lhs": [["clk_alias", 0]], "rhs": [["clk", 0]] }
                ]
            }
        ]
    }"#;

    #[test]
    fn load_sample_design() {
        let json: JsonDesign = serde_json::from_str(SAMPLE).unwrap();
        let interner = Interner::new();
        let design = design_from_json(&json, &interner).unwrap();

        assert_eq!(design.modules.len(), 2);
        let top_id = design.top_module().unwrap();
        let top = &design.modules[top_id];
        assert!(top.top);
        assert_eq!(top.wires.len(), 3);
        assert_eq!(top.cells.len(), 1);
        assert_eq!(top.connections.len(), 1);
        assert_eq!(top.ports.len(), 1);

        let ff_id = design.module_by_name(interner.get_or_intern("FF")).unwrap();
        let ff = &design.modules[ff_id];
        assert!(ff.blackbox);
        let c = ff.wire_by_name(interner.get_or_intern("C")).unwrap();
        assert!(ff.wires[c]
            .attrs
            .get_bool(interner.get_or_intern("clkbuf_sink")));
    }

    #[test]
    fn roundtrip_preserves_shape() {
        let json: JsonDesign = serde_json::from_str(SAMPLE).unwrap();
        let interner = Interner::new();
        let design = design_from_json(&json, &interner).unwrap();
        let back = design_to_json(&design, &interner);
        let design2 = design_from_json(&back, &interner).unwrap();

        assert_eq!(design2.modules.len(), design.modules.len());
        let top = design2.top_module().unwrap();
        assert_eq!(
            design2.modules[top].cells.len(),
            design.modules[design.top_module().unwrap()].cells.len()
        );
        // Serializing twice is stable.
        let again = design_to_json(&design2, &interner);
        assert_eq!(
            serde_json::to_string(&again).unwrap(),
            serde_json::to_string(&back).unwrap()
        );
    }

    #[test]
    fn constants_roundtrip() {
        let json: JsonDesign = serde_json::from_str(
            r#"{ "modules": [ {
                "name": "m",
                "wires": [ { "name": "w" } ],
                "connections": [ { "lhs": [["w", 0]], "rhs": ["0"] } ]
            } ] }"#,
        )
        .unwrap();
        let interner = Interner::new();
        let design = design_from_json(&json, &interner).unwrap();
        let module = design.modules.values().next().unwrap();
        assert_eq!(
            module.connections[0].1.bit(0),
            SigBit::Const(Logic::Zero)
        );
        let back = design_to_json(&design, &interner);
        assert_eq!(back.modules[0].connections[0].rhs, vec![JsonSigBit::Const("0".to_string())]);
    }

    #[test]
    fn unknown_wire_is_reported() {
        let json: JsonDesign = serde_json::from_str(
            r#"{ "modules": [ {
                "name": "m",
                "cells": [ { "name": "c", "type": "T", "connections": [
                    { "port": "A", "direction": "input", "signal": [["missing", 0]] }
                ] } ]
            } ] }"#,
        )
        .unwrap();
        let interner = Interner::new();
        let err = design_from_json(&json, &interner).unwrap_err();
        assert!(matches!(err, NetlistJsonError::UnknownWire { .. }));
        assert_eq!(
            err.to_string(),
            "unknown wire 'missing' referenced in module 'm'"
        );
    }

    #[test]
    fn bit_out_of_range_is_reported() {
        let json: JsonDesign = serde_json::from_str(
            r#"{ "modules": [ {
                "name": "m",
                "wires": [ { "name": "w", "width": 2 } ],
                "connections": [ { "lhs": [["w", 2]], "rhs": ["0"] } ]
            } ] }"#,
        )
        .unwrap();
        let interner = Interner::new();
        let err = design_from_json(&json, &interner).unwrap_err();
        assert!(matches!(
            err,
            NetlistJsonError::BitOutOfRange {
                width: 2,
                offset: 2,
                ..
            }
        ));
    }

    #[test]
    fn invalid_constant_is_reported() {
        let json: JsonDesign = serde_json::from_str(
            r#"{ "modules": [ {
                "name": "m",
                "wires": [ { "name": "w" } ],
                "connections": [ { "lhs": [["w", 0]], "rhs": ["7"] } ]
            } ] }"#,
        )
        .unwrap();
        let interner = Interner::new();
        let err = design_from_json(&json, &interner).unwrap_err();
        assert!(matches!(err, NetlistJsonError::InvalidConst(_)));
    }

    #[test]
    fn directions_map_both_ways() {
        assert_eq!(direction_from_json(JsonDirection::Input), PortDirection::Input);
        assert_eq!(direction_from_json(JsonDirection::Output), PortDirection::Output);
        assert_eq!(direction_from_json(JsonDirection::Inout), PortDirection::InOut);
        assert_eq!(direction_to_json(PortDirection::InOut), JsonDirection::Inout);
    }
}
