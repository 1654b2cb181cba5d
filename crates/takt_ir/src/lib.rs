//! The takt netlist IR.
//!
//! A [`Design`] is a hierarchy of [`Module`]s. Each module owns named,
//! multi-bit [`Wire`]s (which carry attributes and port flags), [`Cell`]s
//! (instances of primitives, blackboxes, or other modules, with per-port
//! [`SigSpec`] connections), and an explicit list of wire-to-wire
//! connections. The [`SigMap`] canonicaliser resolves the connection
//! relation to one deterministic representative bit per net.

#![warn(missing_docs)]

pub mod arena;
pub mod attr;
pub mod cell;
pub mod design;
pub mod ids;
pub mod module;
pub mod sig;
pub mod sigmap;
pub mod wire;

pub use arena::{Arena, ArenaId};
pub use attr::{AttrMap, AttrValue};
pub use cell::{Cell, Connection, PortDirection};
pub use design::Design;
pub use ids::{CellId, ModuleId, WireId};
pub use module::Module;
pub use sig::{SigBit, SigSpec};
pub use sigmap::SigMap;
pub use wire::Wire;
