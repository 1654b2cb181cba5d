//! Wire attributes.
//!
//! Attributes are free-form key/value annotations persisted on wires. The
//! clock-buffer pass consumes the `clkbuf_*` vocabulary below; other tools
//! may attach their own keys, which are carried through untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use takt_common::Ident;

/// Well-known wire attribute names.
pub mod names {
    /// User opt-out: never insert a clock buffer on this wire.
    pub const CLKBUF_INHIBIT: &str = "clkbuf_inhibit";
    /// This port bit produces an already-buffered clock.
    pub const CLKBUF_DRIVER: &str = "clkbuf_driver";
    /// This port bit requires a buffered clock.
    pub const CLKBUF_SINK: &str = "clkbuf_sink";
    /// This port's bits pass through an inverter from the named partner
    /// port's same bits. The value is the partner port name.
    pub const CLKBUF_INV: &str = "clkbuf_inv";
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A string value.
    String(String),
}

impl AttrValue {
    /// Interprets the value as a boolean, the way the netlist format does:
    /// `Bool` is itself, `Int` is nonzero, `String` is non-empty.
    pub fn as_bool(&self) -> bool {
        match self {
            AttrValue::Bool(b) => *b,
            AttrValue::Int(i) => *i != 0,
            AttrValue::String(s) => !s.is_empty(),
        }
    }

    /// Returns the string value, if this is a string attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// An ordered map of attributes keyed by interned name.
///
/// Ordered so that iteration and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrMap {
    entries: BTreeMap<Ident, AttrValue>,
}

impl AttrMap {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sets an attribute, replacing any previous value under the same key.
    pub fn set(&mut self, name: Ident, value: AttrValue) {
        self.entries.insert(name, value);
    }

    /// Returns the value of an attribute, if set.
    pub fn get(&self, name: Ident) -> Option<&AttrValue> {
        self.entries.get(&name)
    }

    /// Returns the boolean interpretation of an attribute; `false` when the
    /// attribute is absent.
    pub fn get_bool(&self, name: Ident) -> bool {
        self.entries.get(&name).is_some_and(AttrValue::as_bool)
    }

    /// Returns the string value of an attribute, if set to a string.
    pub fn get_str(&self, name: Ident) -> Option<&str> {
        self.entries.get(&name).and_then(AttrValue::as_str)
    }

    /// Removes every attribute.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Ident, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}
