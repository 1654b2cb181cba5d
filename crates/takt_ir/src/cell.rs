//! Cell definitions.
//!
//! A [`Cell`] is an instance of a named cell type: a technology primitive,
//! a blackbox, or another module of the design. Its [`Connection`]s bind
//! port names to signals; the direction is recorded per connection and is
//! populated by loaders from the cell type's module or blackbox
//! declaration.

use crate::ids::CellId;
use crate::sig::SigSpec;
use serde::{Deserialize, Serialize};
use takt_common::Ident;

/// The direction of a port on a cell or module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Data flows into the cell.
    Input,
    /// Data flows out of the cell.
    Output,
    /// Bidirectional.
    InOut,
}

impl PortDirection {
    /// Returns `true` if the port can drive its signal (`Output` or `InOut`).
    pub fn drives(self) -> bool {
        matches!(self, PortDirection::Output | PortDirection::InOut)
    }

    /// Returns `true` if the port can read its signal (`Input` or `InOut`).
    pub fn reads(self) -> bool {
        matches!(self, PortDirection::Input | PortDirection::InOut)
    }
}

/// One port binding of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// The port name on the cell type.
    pub port: Ident,
    /// The direction of the port, per the cell type's declaration.
    pub direction: PortDirection,
    /// The signal bound to the port.
    pub sig: SigSpec,
}

impl Connection {
    /// Creates an input connection.
    pub fn input(port: Ident, sig: SigSpec) -> Self {
        Self {
            port,
            direction: PortDirection::Input,
            sig,
        }
    }

    /// Creates an output connection.
    pub fn output(port: Ident, sig: SigSpec) -> Self {
        Self {
            port,
            direction: PortDirection::Output,
            sig,
        }
    }
}

/// A cell instance within a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// The unique ID of this cell within its module.
    pub id: CellId,
    /// The instance name.
    pub name: Ident,
    /// The cell-type name (primitive, blackbox, or module name).
    pub ty: Ident,
    /// Port bindings.
    pub connections: Vec<Connection>,
}

impl Cell {
    /// Returns the signal bound to the named port, if connected.
    pub fn port(&self, name: Ident) -> Option<&SigSpec> {
        self.connections
            .iter()
            .find(|conn| conn.port == name)
            .map(|conn| &conn.sig)
    }
}
