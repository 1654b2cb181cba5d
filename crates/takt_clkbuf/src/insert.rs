//! Buffer materialisation and rewiring for one module.
//!
//! Runs after classification. For every bit that has a sink, no buffer
//! yet, and a local driver (or is a top-level input), a buffer chain is
//! created on the net; drivers are then re-pointed at the chain's input
//! side, buffered input ports are re-created so the port keeps its name,
//! and output ports whose bits were buffered are promoted into the
//! catalogue for the parent modules.

use crate::catalog::AttributeCatalog;
use crate::classify::{self, ClockClasses};
use crate::config::ResolvedConfig;
use std::collections::HashMap;
use takt_common::{Ident, Interner};
use takt_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use takt_ir::{CellId, Connection, Design, ModuleId, SigBit, SigMap, SigSpec, WireId};

/// Progress note: a buffer or pad cell was inserted.
const CELL_INSERTED: DiagnosticCode = DiagnosticCode {
    category: Category::Note,
    number: 101,
};

/// What was inserted into one module.
#[derive(Default)]
pub(crate) struct ModuleOutcome {
    pub buffers: usize,
    pub pads: usize,
}

/// The buffer chain created on one canonical bit: the cell whose output
/// drives the original net, and the topmost driver-side wire — what the
/// original driver must now drive.
struct BufferedNet {
    cell: CellId,
    iwire: WireId,
}

/// Generates `_clkbuf_*` names for inserted wires and cells.
struct TempNames {
    next: u32,
}

impl TempNames {
    fn new() -> Self {
        Self { next: 0 }
    }

    fn fresh(&mut self, interner: &Interner, kind: &str) -> Ident {
        let name = format!("_clkbuf_{kind}_{}", self.next);
        self.next += 1;
        interner.get_or_intern(&name)
    }
}

/// Processes one regular module: classify, insert, rewire.
pub(crate) fn process_module(
    design: &mut Design,
    module_id: ModuleId,
    catalog: &mut AttributeCatalog,
    rc: &ResolvedConfig,
    buffer_inputs: bool,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> ModuleOutcome {
    let module = design.modules.get_mut(module_id);
    let module_name = module.name;
    let is_top = module.top;

    // The canonicaliser is frozen here, before any insertion; queries about
    // the original nets stay stable through all rewiring below.
    let sigmap = SigMap::new(module);
    let classes: ClockClasses =
        classify::classify_module(module, &sigmap, catalog, rc, interner, sink);

    let mut outcome = ModuleOutcome::default();
    let mut names = TempNames::new();
    // Canonical bit -> its buffer chain.
    let mut buffered: HashMap<SigBit, BufferedNet> = HashMap::new();
    // Input-port wires that grew a buffer, paired with their replacements.
    let mut input_queue: Vec<(WireId, WireId)> = Vec::new();

    // Snapshot: wires created during the loop must not be reconsidered.
    for wire_id in module.wires.ids() {
        let (wire_name, width, port_input, port_output, inhibited) = {
            let wire = &module.wires[wire_id];
            (
                wire.name,
                wire.width,
                wire.port_input,
                wire.port_output,
                wire.attrs.get_bool(rc.attr_inhibit),
            )
        };
        // A wire that is both input and output should not happen; leave it
        // alone.
        if port_input && port_output {
            continue;
        }

        let mut process_wire =
            rc.selection.matches(interner.resolve(module_name), interner.resolve(wire_name));
        if !rc.selection.is_explicit() && inhibited {
            process_wire = false;
        }
        if !process_wire {
            // Bypassed here; make sure no buffer gets stacked on it higher
            // up in the hierarchy either.
            if port_output {
                for bit in 0..width {
                    catalog.mark_buffered(module_name, wire_name, bit);
                }
            }
            continue;
        }

        let mut any_input_bit_buffered = false;

        for offset in 0..width {
            let wire_bit = SigBit::wire(wire_id, offset);
            let canon = sigmap.map(wire_bit);

            if classes.buf_bits.contains(&canon) {
                // Already buffered downstream. If this is an output, tell
                // the parents.
                if port_output {
                    catalog.mark_buffered(module_name, wire_name, offset);
                }
            } else if !classes.sink_bits.contains(&canon) {
                // No sink consumes this bit.
            } else if classes.driven_bits.contains(&wire_bit) || (port_input && is_top) {
                // A clock network without a buffer, driven by one of our
                // cells or a top-level input: materialise the chain.
                let mut iwire: Option<WireId> = None;
                let mut chain_cell: Option<CellId> = None;
                let pad = if port_input && is_top { rc.inpad.as_ref() } else { None };
                let is_input = pad.is_some();

                if let Some(buffer) = &rc.buffer {
                    if (!is_input || buffer_inputs) && !port_output {
                        let ty = if classes.generated_clk_bits.contains(&canon) {
                            rc.fabric_buffer
                        } else {
                            buffer.cell_type
                        };
                        let driver_side = module.add_wire(names.fresh(interner, "net"), 1);
                        let cell = module.add_cell(
                            names.fresh(interner, "cell"),
                            ty,
                            vec![
                                Connection::output(buffer.output, SigSpec::from(canon)),
                                Connection::input(
                                    buffer.input,
                                    SigSpec::full_wire(driver_side, 1),
                                ),
                            ],
                        );
                        sink.emit(insertion_note(ty, module_name, wire_name, offset, interner));
                        outcome.buffers += 1;
                        iwire = Some(driver_side);
                        chain_cell = Some(cell);
                    }
                }
                if let Some(pad) = pad {
                    // The pad's network side drives the buffer's input when
                    // one was created, otherwise the net itself; a fresh
                    // wire on the pad's driver side receives the original
                    // port signal.
                    let network_side = match iwire {
                        Some(wire) => SigSpec::full_wire(wire, 1),
                        None => SigSpec::from(canon),
                    };
                    let driver_side = module.add_wire(names.fresh(interner, "net"), 1);
                    let pad_cell = module.add_cell(
                        names.fresh(interner, "cell"),
                        pad.cell_type,
                        vec![
                            Connection::output(pad.output, network_side),
                            Connection::input(pad.input, SigSpec::full_wire(driver_side, 1)),
                        ],
                    );
                    sink.emit(insertion_note(
                        pad.cell_type,
                        module_name,
                        wire_name,
                        offset,
                        interner,
                    ));
                    outcome.pads += 1;
                    if chain_cell.is_none() {
                        chain_cell = Some(pad_cell);
                    }
                    iwire = Some(driver_side);
                }
                if let (Some(iwire), Some(cell)) = (iwire, chain_cell) {
                    buffered.insert(canon, BufferedNet { cell, iwire });
                }
                if port_input {
                    any_input_bit_buffered = true;
                }
            } else if port_input {
                // A clock input of a submodule: mark it and let the parent
                // worry about it.
                catalog.mark_sink(module_name, wire_name, offset);
            }
        }

        if any_input_bit_buffered {
            // Re-create the input wire; the original lives on internally,
            // still carrying the buffered net. The name swap is deferred to
            // the end of the module so the canonicaliser is not upset
            // before driver re-routing.
            let new_wire = module.add_wire_like(names.fresh(interner, "port"), wire_id);
            for offset in 0..width {
                let canon = sigmap.map(SigBit::wire(wire_id, offset));
                if let Some(net) = buffered.get(&canon) {
                    module.connect(
                        SigSpec::full_wire(net.iwire, 1),
                        SigSpec::from(SigBit::wire(new_wire, offset)),
                    );
                } else {
                    module.connect(
                        SigSpec::from(SigBit::wire(wire_id, offset)),
                        SigSpec::from(SigBit::wire(new_wire, offset)),
                    );
                }
            }
            input_queue.push((wire_id, new_wire));
        }
    }

    // Promote newly-buffered output ports for the parents.
    for wire_id in module.wires.ids() {
        let wire = &module.wires[wire_id];
        if wire.port_input || !wire.port_output {
            continue;
        }
        if !rc
            .selection
            .matches(interner.resolve(module_name), interner.resolve(wire.name))
        {
            continue;
        }
        let (wire_name, width) = (wire.name, wire.width);
        for offset in 0..width {
            if buffered.contains_key(&sigmap.map(SigBit::wire(wire_id, offset))) {
                catalog.mark_buffered(module_name, wire_name, offset);
            }
        }
    }

    // Re-point the original drivers at the buffer inputs.
    for cell_id in module.cells.ids() {
        for conn_index in 0..module.cells[cell_id].connections.len() {
            if !module.cells[cell_id].connections[conn_index].direction.drives() {
                continue;
            }
            let mut sig = module.cells[cell_id].connections[conn_index].sig.clone();
            let mut changed = false;
            for bit in sig.bits_mut() {
                if let Some(net) = buffered.get(&sigmap.map(*bit)) {
                    // Never substitute the buffer's own output pin.
                    if net.cell != cell_id {
                        *bit = SigBit::wire(net.iwire, 0);
                        changed = true;
                    }
                }
            }
            if changed {
                module.cells[cell_id].connections[conn_index].sig = sig;
            }
        }
    }

    // The name swap comes last so the connections recorded above were made
    // against the original identities.
    for &(old_wire, new_wire) in &input_queue {
        module.swap_names(old_wire, new_wire);
        let wire = module.wires.get_mut(old_wire);
        wire.attrs.clear();
        wire.port_input = false;
        wire.port_output = false;
        wire.port_index = None;
    }
    module.fixup_ports();

    // Keep combinational readers of a renamed input on the raw port: cells
    // without clock-sink ports read the replacement wire, while sink cells
    // keep seeing the buffered net.
    if !input_queue.is_empty() && catalog.has_sink_cell_types() {
        let renames: Vec<(WireId, WireId, u32)> = input_queue
            .iter()
            .map(|&(old_wire, new_wire)| (old_wire, new_wire, module.wires[old_wire].width))
            .collect();
        let buffer_type = rc.buffer.as_ref().map(|b| b.cell_type);
        for cell_id in module.cells.ids() {
            let ty = module.cells[cell_id].ty;
            if catalog.is_sink_cell_type(ty) || Some(ty) == buffer_type {
                continue;
            }
            for conn_index in 0..module.cells[cell_id].connections.len() {
                if module.cells[cell_id].connections[conn_index].direction.drives() {
                    continue;
                }
                let translated =
                    translate_renamed_wires(&module.cells[cell_id].connections[conn_index].sig, &renames);
                if translated != module.cells[cell_id].connections[conn_index].sig {
                    module.cells[cell_id].connections[conn_index].sig = translated;
                }
            }
        }
    }

    outcome
}

/// Replaces chunks spanning a full renamed input wire with its replacement.
///
/// Partial slices of a renamed wire are left untouched; the sweep is
/// best-effort.
fn translate_renamed_wires(sig: &SigSpec, renames: &[(WireId, WireId, u32)]) -> SigSpec {
    let mut out = SigSpec::new();
    for chunk in sig.chunks() {
        let replacement = renames.iter().find_map(|&(old_wire, new_wire, width)| {
            (chunk == SigSpec::full_wire(old_wire, width))
                .then(|| SigSpec::full_wire(new_wire, width))
        });
        match replacement {
            Some(new_chunk) => out.extend_from(&new_chunk),
            None => out.extend_from(&chunk),
        }
    }
    out
}

fn insertion_note(
    cell_type: Ident,
    module_name: Ident,
    wire_name: Ident,
    offset: u32,
    interner: &Interner,
) -> Diagnostic {
    Diagnostic::note(
        CELL_INSERTED,
        format!("inserting {}", interner.resolve(cell_type)),
    )
    .with_location(format!(
        "{}.{}[{offset}]",
        interner.resolve(module_name),
        interner.resolve(wire_name)
    ))
}
