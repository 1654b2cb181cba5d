//! The design-wide attribute catalogue.
//!
//! Four mappings over (cell-type, port, bit) triples, built up while the
//! hierarchy is traversed leaves-first: which port bits require a buffered
//! clock, which already produce one, and which pairs pass through an
//! inverter. Blackbox declarations seed the catalogue from their port
//! attributes; as each regular module is processed, its own ports are
//! promoted into the catalogue so parent modules see the outcome.

use crate::config::ResolvedConfig;
use std::collections::{HashMap, HashSet};
use takt_common::{Ident, Interner};
use takt_ir::Module;

/// A (cell-type, port-name, bit-index) triple.
pub(crate) type PortBit = (Ident, Ident, u32);

/// The catalogue of clock-buffer attributes accumulated across the design.
///
/// Append-only for the lifetime of one pass invocation.
#[derive(Default)]
pub(crate) struct AttributeCatalog {
    sink_ports: HashSet<PortBit>,
    buf_ports: HashSet<PortBit>,
    /// Inverter output port bit → same cell's input (port, bit).
    inv_out: HashMap<PortBit, (Ident, u32)>,
    /// Inverter input port bit → same cell's output (port, bit).
    inv_in: HashMap<PortBit, (Ident, u32)>,
    /// Cell types observed to own at least one sink port anywhere in the
    /// design. Consulted by the final combinational-driver sweep.
    sink_cell_types: HashSet<Ident>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the catalogue from a blackbox declaration's port attributes.
    pub fn collect_blackbox(&mut self, module: &Module, rc: &ResolvedConfig, interner: &Interner) {
        for &wire_id in &module.ports {
            let wire = &module.wires[wire_id];
            if wire.attrs.get_bool(rc.attr_driver) {
                for bit in 0..wire.width {
                    self.buf_ports.insert((module.name, wire.name, bit));
                }
            }
            if wire.attrs.get_bool(rc.attr_sink) {
                for bit in 0..wire.width {
                    self.sink_ports.insert((module.name, wire.name, bit));
                }
            }
            if let Some(partner) = wire.attrs.get_str(rc.attr_inv) {
                let partner = interner.get_or_intern(partner);
                for bit in 0..wire.width {
                    self.inv_out
                        .insert((module.name, wire.name, bit), (partner, bit));
                    self.inv_in
                        .insert((module.name, partner, bit), (wire.name, bit));
                }
            }
        }
    }

    pub fn is_sink(&self, ty: Ident, port: Ident, bit: u32) -> bool {
        self.sink_ports.contains(&(ty, port, bit))
    }

    pub fn is_buffered(&self, ty: Ident, port: Ident, bit: u32) -> bool {
        self.buf_ports.contains(&(ty, port, bit))
    }

    /// If `(ty, port, bit)` is an inverter's output, returns the input
    /// `(port, bit)` it inverts.
    pub fn inverter_source(&self, ty: Ident, port: Ident, bit: u32) -> Option<(Ident, u32)> {
        self.inv_out.get(&(ty, port, bit)).copied()
    }

    /// If `(ty, port, bit)` is an inverter's input, returns the output
    /// `(port, bit)` it feeds.
    pub fn inverter_target(&self, ty: Ident, port: Ident, bit: u32) -> Option<(Ident, u32)> {
        self.inv_in.get(&(ty, port, bit)).copied()
    }

    /// Promotes a module's port bit to "requires a buffered clock": parents
    /// instantiating the module must provide one.
    pub fn mark_sink(&mut self, module: Ident, wire: Ident, bit: u32) {
        self.sink_ports.insert((module, wire, bit));
    }

    /// Promotes a module's port bit to "already buffered": parents must not
    /// stack another buffer on it.
    pub fn mark_buffered(&mut self, module: Ident, wire: Ident, bit: u32) {
        self.buf_ports.insert((module, wire, bit));
    }

    pub fn note_sink_cell_type(&mut self, ty: Ident) {
        self.sink_cell_types.insert(ty);
    }

    pub fn is_sink_cell_type(&self, ty: Ident) -> bool {
        self.sink_cell_types.contains(&ty)
    }

    pub fn has_sink_cell_types(&self) -> bool {
        !self.sink_cell_types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BufferCell, ClkbufConfig};
    use takt_ir::attr::names;
    use takt_ir::{AttrValue, Design};

    fn resolved(interner: &Interner) -> ResolvedConfig {
        let config = ClkbufConfig::new(Some(BufferCell::parse("CLK_BUF", "O:I").unwrap()), None);
        ResolvedConfig::resolve(&config, interner)
    }

    /// A blackbox with a sink port `C`, a driver port `O`, and an inverter
    /// pair `Y` (out) / `A` (in), each 1 bit wide.
    fn attributed_blackbox(design: &mut Design, interner: &Interner) -> takt_ir::ModuleId {
        let id = design.add_module(interner.get_or_intern("CELL"));
        let module = design.modules.get_mut(id);
        module.blackbox = true;

        let c = module.add_wire(interner.get_or_intern("C"), 1);
        module.wires.get_mut(c).port_input = true;
        module.wires.get_mut(c).attrs.set(
            interner.get_or_intern(names::CLKBUF_SINK),
            AttrValue::Bool(true),
        );

        let o = module.add_wire(interner.get_or_intern("O"), 1);
        module.wires.get_mut(o).port_output = true;
        module.wires.get_mut(o).attrs.set(
            interner.get_or_intern(names::CLKBUF_DRIVER),
            AttrValue::Bool(true),
        );

        let a = module.add_wire(interner.get_or_intern("A"), 1);
        module.wires.get_mut(a).port_input = true;
        let y = module.add_wire(interner.get_or_intern("Y"), 1);
        module.wires.get_mut(y).port_output = true;
        module.wires.get_mut(y).attrs.set(
            interner.get_or_intern(names::CLKBUF_INV),
            AttrValue::String("A".to_string()),
        );

        module.fixup_ports();
        id
    }

    #[test]
    fn blackbox_ports_seed_catalogue() {
        let interner = Interner::new();
        let rc = resolved(&interner);
        let mut design = Design::new();
        let id = attributed_blackbox(&mut design, &interner);

        let mut catalog = AttributeCatalog::new();
        catalog.collect_blackbox(&design.modules[id], &rc, &interner);

        let ty = interner.get_or_intern("CELL");
        assert!(catalog.is_sink(ty, interner.get_or_intern("C"), 0));
        assert!(catalog.is_buffered(ty, interner.get_or_intern("O"), 0));
        assert!(!catalog.is_sink(ty, interner.get_or_intern("O"), 0));
        assert!(!catalog.is_sink(ty, interner.get_or_intern("C"), 1));
    }

    #[test]
    fn inverter_pair_recorded_both_ways() {
        let interner = Interner::new();
        let rc = resolved(&interner);
        let mut design = Design::new();
        let id = attributed_blackbox(&mut design, &interner);

        let mut catalog = AttributeCatalog::new();
        catalog.collect_blackbox(&design.modules[id], &rc, &interner);

        let ty = interner.get_or_intern("CELL");
        let a = interner.get_or_intern("A");
        let y = interner.get_or_intern("Y");
        assert_eq!(catalog.inverter_source(ty, y, 0), Some((a, 0)));
        assert_eq!(catalog.inverter_target(ty, a, 0), Some((y, 0)));
        assert_eq!(catalog.inverter_source(ty, a, 0), None);
        assert_eq!(catalog.inverter_target(ty, y, 0), None);
    }

    #[test]
    fn promotion_is_visible_to_queries() {
        let interner = Interner::new();
        let mut catalog = AttributeCatalog::new();
        let module = interner.get_or_intern("sub");
        let wire = interner.get_or_intern("clk_in");
        assert!(!catalog.is_sink(module, wire, 0));
        catalog.mark_sink(module, wire, 0);
        assert!(catalog.is_sink(module, wire, 0));

        catalog.mark_buffered(module, wire, 1);
        assert!(catalog.is_buffered(module, wire, 1));
        assert!(!catalog.is_buffered(module, wire, 0));
    }

    #[test]
    fn sink_cell_types_accumulate() {
        let interner = Interner::new();
        let mut catalog = AttributeCatalog::new();
        assert!(!catalog.has_sink_cell_types());
        let ff = interner.get_or_intern("DFFRE");
        catalog.note_sink_cell_type(ff);
        assert!(catalog.has_sink_cell_types());
        assert!(catalog.is_sink_cell_type(ff));
        assert!(!catalog.is_sink_cell_type(interner.get_or_intern("LUT4")));
    }

    #[test]
    fn multibit_ports_expand_per_bit() {
        let interner = Interner::new();
        let rc = resolved(&interner);
        let mut design = Design::new();
        let id = design.add_module(interner.get_or_intern("WIDE"));
        {
            let module = design.modules.get_mut(id);
            module.blackbox = true;
            let c = module.add_wire(interner.get_or_intern("CLKS"), 3);
            module.wires.get_mut(c).port_input = true;
            module.wires.get_mut(c).attrs.set(
                interner.get_or_intern(names::CLKBUF_SINK),
                AttrValue::Bool(true),
            );
            module.fixup_ports();
        }

        let mut catalog = AttributeCatalog::new();
        catalog.collect_blackbox(&design.modules[id], &rc, &interner);
        let ty = interner.get_or_intern("WIDE");
        let clks = interner.get_or_intern("CLKS");
        for bit in 0..3 {
            assert!(catalog.is_sink(ty, clks, bit));
        }
        assert!(!catalog.is_sink(ty, clks, 3));
    }
}
