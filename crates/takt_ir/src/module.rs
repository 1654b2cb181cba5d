//! Module definitions — the primary organizational unit of the netlist.
//!
//! A [`Module`] contains wires, cells, and an explicit connection list.
//! Modules form a hierarchy through cells whose type names another module
//! of the design. A *blackbox* module is known by its interface only; its
//! port wires carry the attributes that drive the clock-buffer pass.

use crate::arena::Arena;
use crate::attr::AttrMap;
use crate::cell::{Cell, Connection};
use crate::ids::{CellId, ModuleId, WireId};
use crate::sig::SigSpec;
use crate::wire::Wire;
use serde::{Deserialize, Serialize};
use takt_common::Ident;

/// A single hardware module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The unique ID of this module in the design.
    pub id: ModuleId,
    /// The module name.
    pub name: Ident,
    /// All wires declared within this module.
    pub wires: Arena<WireId, Wire>,
    /// All cells instantiated within this module.
    pub cells: Arena<CellId, Cell>,
    /// Explicit wire-to-wire connections: each pair declares its two
    /// signals to carry the same net, bit for bit.
    pub connections: Vec<(SigSpec, SigSpec)>,
    /// The ordered port table; recomputed by [`fixup_ports`](Self::fixup_ports).
    pub ports: Vec<WireId>,
    /// `true` if this module is a declaration without a body.
    pub blackbox: bool,
    /// `true` if this module is the root of the hierarchy.
    pub top: bool,
}

impl Module {
    /// Creates an empty regular module.
    pub fn new(id: ModuleId, name: Ident) -> Self {
        Self {
            id,
            name,
            wires: Arena::new(),
            cells: Arena::new(),
            connections: Vec::new(),
            ports: Vec::new(),
            blackbox: false,
            top: false,
        }
    }

    /// Adds a new wire with no attributes or port flags.
    pub fn add_wire(&mut self, name: Ident, width: u32) -> WireId {
        let id = self.wires.next_id();
        self.wires.alloc(Wire {
            id,
            name,
            width,
            port_input: false,
            port_output: false,
            port_index: None,
            attrs: AttrMap::new(),
        })
    }

    /// Adds a new wire copying `src`'s width, attributes, and port flags.
    pub fn add_wire_like(&mut self, name: Ident, src: WireId) -> WireId {
        let template = self.wires.get(src);
        let (width, port_input, port_output, port_index, attrs) = (
            template.width,
            template.port_input,
            template.port_output,
            template.port_index,
            template.attrs.clone(),
        );
        let id = self.wires.next_id();
        self.wires.alloc(Wire {
            id,
            name,
            width,
            port_input,
            port_output,
            port_index,
            attrs,
        })
    }

    /// Adds a new cell with the given type and port bindings.
    pub fn add_cell(&mut self, name: Ident, ty: Ident, connections: Vec<Connection>) -> CellId {
        let id = self.cells.next_id();
        self.cells.alloc(Cell {
            id,
            name,
            ty,
            connections,
        })
    }

    /// Declares `lhs` and `rhs` to carry the same net, bit for bit.
    ///
    /// The widths must match; extra bits on the wider side would silently
    /// float, which is always a caller bug.
    pub fn connect(&mut self, lhs: SigSpec, rhs: SigSpec) {
        debug_assert_eq!(lhs.width(), rhs.width());
        self.connections.push((lhs, rhs));
    }

    /// Looks up a wire by name.
    pub fn wire_by_name(&self, name: Ident) -> Option<WireId> {
        self.wires
            .iter()
            .find(|(_, w)| w.name == name)
            .map(|(id, _)| id)
    }

    /// Exchanges the names of two wires. Everything else about them —
    /// width, attributes, port flags, connections referring to them —
    /// stays put.
    pub fn swap_names(&mut self, a: WireId, b: WireId) {
        if a == b {
            return;
        }
        let name_a = self.wires.get(a).name;
        let name_b = self.wires.get(b).name;
        self.wires.get_mut(a).name = name_b;
        self.wires.get_mut(b).name = name_a;
    }

    /// Recomputes the port table from the wires' port flags.
    ///
    /// Port wires keep their relative order (by previous port index, then
    /// allocation order) and are renumbered contiguously; wires that lost
    /// their port flags are dropped from the table and their stale index is
    /// cleared.
    pub fn fixup_ports(&mut self) {
        let mut port_wires: Vec<WireId> = self
            .wires
            .iter()
            .filter(|(_, w)| w.is_port())
            .map(|(id, _)| id)
            .collect();
        port_wires.sort_by_key(|&id| {
            let w = self.wires.get(id);
            (w.port_index.unwrap_or(u32::MAX), id)
        });
        for (position, &id) in port_wires.iter().enumerate() {
            self.wires.get_mut(id).port_index = Some(position as u32);
        }
        for (_, w) in self.wires.iter_mut() {
            if !w.port_input && !w.port_output {
                w.port_index = None;
            }
        }
        self.ports = port_wires;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sig::SigBit;

    fn empty_module() -> Module {
        Module::new(ModuleId::from_raw(0), Ident::from_raw(1))
    }

    #[test]
    fn add_wire_assigns_sequential_ids() {
        let mut m = empty_module();
        let a = m.add_wire(Ident::from_raw(2), 1);
        let b = m.add_wire(Ident::from_raw(3), 4);
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(m.wires[b].width, 4);
        assert_eq!(m.wires[a].id, a);
    }

    #[test]
    fn add_wire_like_copies_shape() {
        let mut m = empty_module();
        let src = m.add_wire(Ident::from_raw(2), 2);
        m.wires.get_mut(src).port_input = true;
        m.wires.get_mut(src).port_index = Some(0);
        let copy = m.add_wire_like(Ident::from_raw(3), src);
        let w = &m.wires[copy];
        assert_eq!(w.width, 2);
        assert!(w.port_input);
        assert_eq!(w.port_index, Some(0));
        assert_eq!(w.name, Ident::from_raw(3));
    }

    #[test]
    fn wire_lookup_by_name() {
        let mut m = empty_module();
        let a = m.add_wire(Ident::from_raw(5), 1);
        assert_eq!(m.wire_by_name(Ident::from_raw(5)), Some(a));
        assert_eq!(m.wire_by_name(Ident::from_raw(6)), None);
    }

    #[test]
    fn swap_names_exchanges_only_names() {
        let mut m = empty_module();
        let a = m.add_wire(Ident::from_raw(5), 1);
        let b = m.add_wire(Ident::from_raw(6), 2);
        m.swap_names(a, b);
        assert_eq!(m.wires[a].name, Ident::from_raw(6));
        assert_eq!(m.wires[b].name, Ident::from_raw(5));
        assert_eq!(m.wires[a].width, 1);
        assert_eq!(m.wires[b].width, 2);
    }

    #[test]
    fn swap_names_with_self_is_noop() {
        let mut m = empty_module();
        let a = m.add_wire(Ident::from_raw(5), 1);
        m.swap_names(a, a);
        assert_eq!(m.wires[a].name, Ident::from_raw(5));
    }

    #[test]
    fn connect_records_pair() {
        let mut m = empty_module();
        let a = m.add_wire(Ident::from_raw(2), 1);
        let b = m.add_wire(Ident::from_raw(3), 1);
        m.connect(SigSpec::full_wire(a, 1), SigSpec::full_wire(b, 1));
        assert_eq!(m.connections.len(), 1);
        assert_eq!(m.connections[0].0.bit(0), SigBit::wire(a, 0));
    }

    #[test]
    fn fixup_ports_orders_and_renumbers() {
        let mut m = empty_module();
        let a = m.add_wire(Ident::from_raw(2), 1);
        let b = m.add_wire(Ident::from_raw(3), 1);
        let c = m.add_wire(Ident::from_raw(4), 1);
        m.wires.get_mut(a).port_input = true;
        m.wires.get_mut(a).port_index = Some(1);
        m.wires.get_mut(b).port_output = true;
        m.wires.get_mut(b).port_index = Some(0);
        m.wires.get_mut(c).port_input = true; // no index yet: sorts last

        m.fixup_ports();
        assert_eq!(m.ports, vec![b, a, c]);
        assert_eq!(m.wires[b].port_index, Some(0));
        assert_eq!(m.wires[a].port_index, Some(1));
        assert_eq!(m.wires[c].port_index, Some(2));
    }

    #[test]
    fn fixup_ports_drops_demoted_wires() {
        let mut m = empty_module();
        let a = m.add_wire(Ident::from_raw(2), 1);
        m.wires.get_mut(a).port_input = true;
        m.fixup_ports();
        assert_eq!(m.ports, vec![a]);

        m.wires.get_mut(a).port_input = false;
        m.fixup_ports();
        assert!(m.ports.is_empty());
        assert_eq!(m.wires[a].port_index, None);
    }

    #[test]
    fn add_cell_stores_connections() {
        let mut m = empty_module();
        let w = m.add_wire(Ident::from_raw(2), 1);
        let cell = m.add_cell(
            Ident::from_raw(7),
            Ident::from_raw(8),
            vec![Connection::output(Ident::from_raw(9), SigSpec::full_wire(w, 1))],
        );
        assert_eq!(m.cells[cell].ty, Ident::from_raw(8));
        assert_eq!(m.cells[cell].connections.len(), 1);
        assert_eq!(m.cells[cell].id, cell);
    }

    #[test]
    fn serde_roundtrip() {
        let mut m = empty_module();
        let w = m.add_wire(Ident::from_raw(2), 1);
        m.wires.get_mut(w).port_input = true;
        m.fixup_ports();
        let json = serde_json::to_string(&m).unwrap();
        let restored: Module = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.ports, m.ports);
        assert_eq!(restored.wires.len(), 1);
    }
}
