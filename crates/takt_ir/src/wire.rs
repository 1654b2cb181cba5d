//! Wire definitions.
//!
//! A [`Wire`] is a named, multi-bit net within a module. Wires carry the
//! attribute map and the port flags; a wire with `port_input` or
//! `port_output` set appears in the module's port table.

use crate::attr::AttrMap;
use crate::ids::WireId;
use serde::{Deserialize, Serialize};
use takt_common::Ident;

/// A named multi-bit wire within a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    /// The unique ID of this wire within its module.
    pub id: WireId,
    /// The wire name.
    pub name: Ident,
    /// The number of bits.
    pub width: u32,
    /// `true` if this wire is an input port of the module.
    pub port_input: bool,
    /// `true` if this wire is an output port of the module.
    pub port_output: bool,
    /// Position in the module's port table; `None` for non-port wires and
    /// for port wires whose table has not been recomputed yet.
    pub port_index: Option<u32>,
    /// Attributes attached to this wire.
    pub attrs: AttrMap,
}

impl Wire {
    /// Returns `true` if this wire is an input or output port.
    pub fn is_port(&self) -> bool {
        self.port_input || self.port_output
    }
}
