//! Per-module classification of clock bits.
//!
//! Walks one module's cells and sorts every canonical signal bit into the
//! classes the insertion engine acts on: has a sink, already buffered,
//! driven by a local cell, pad-driven, or a generated clock. Sink and
//! already-buffered marks then propagate through clock-path inverters to a
//! fixed point.

use crate::catalog::AttributeCatalog;
use crate::config::ResolvedConfig;
use std::collections::{HashMap, HashSet, VecDeque};
use takt_common::Interner;
use takt_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use takt_ir::{Module, SigBit, SigMap};

/// Generated-clock structural warning.
const GENERATED_CLOCK: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 301,
};

/// The classification of one module's signal bits.
///
/// `sink_bits`, `buf_bits`, and `generated_clk_bits` hold canonical bits;
/// `driven_bits` and `pad_driven_bits` hold the raw bits exactly as they
/// appear on cell output ports. The insertion engine's local-driver test
/// deliberately uses the raw form.
pub(crate) struct ClockClasses {
    /// Canonical bits consumed by at least one clock sink.
    pub sink_bits: HashSet<SigBit>,
    /// Canonical bits already carrying a buffered clock.
    pub buf_bits: HashSet<SigBit>,
    /// Raw bits driven by a local cell output (clock generators excluded).
    pub driven_bits: HashSet<SigBit>,
    /// Raw bits driven by an input-buffer primitive.
    pub pad_driven_bits: HashSet<SigBit>,
    /// Canonical bits identified as generated clocks; these take the
    /// fabric buffer instead of the configured one.
    pub generated_clk_bits: HashSet<SigBit>,
}

/// What changed about a bit, for the propagation worklist.
enum Mark {
    Sink,
    Buffered,
}

/// Classifies every bit of `module` and runs the inverter fixed point.
pub(crate) fn classify_module(
    module: &Module,
    sigmap: &SigMap,
    catalog: &mut AttributeCatalog,
    rc: &ResolvedConfig,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> ClockClasses {
    let mut sink_bits: HashSet<SigBit> = HashSet::new();
    let mut buf_bits: HashSet<SigBit> = HashSet::new();

    // Nets consumed by a clock sink, and nets that already have a buffer.
    for cell in module.cells.values() {
        for conn in &cell.connections {
            for i in 0..conn.sig.width() {
                if catalog.is_sink(cell.ty, conn.port, i) {
                    catalog.note_sink_cell_type(cell.ty);
                    sink_bits.insert(sigmap.map(conn.sig.bit(i)));
                }
                if catalog.is_buffered(cell.ty, conn.port, i) {
                    buf_bits.insert(sigmap.map(conn.sig.bit(i)));
                }
            }
        }
    }

    propagate_through_inverters(module, sigmap, catalog, &mut sink_bits, &mut buf_bits);

    // Locally driven nets. Clock-generator outputs are considered already
    // routed through clock resources and never buffered.
    let mut driven_bits: HashSet<SigBit> = HashSet::new();
    let mut pad_driven_bits: HashSet<SigBit> = HashSet::new();
    for cell in module.cells.values() {
        if cell.ty == rc.pll || cell.ty == rc.boot_clock {
            continue;
        }
        for conn in &cell.connections {
            if conn.direction.drives() {
                driven_bits.extend(conn.sig.bits().iter().copied());
            }
        }
        if cell.ty == rc.input_buffer {
            if let Some(out) = cell.port(rc.input_buffer_output) {
                pad_driven_bits.extend(out.bits().iter().copied());
            }
        }
    }

    // A flip-flop clock pin fed by a local non-pad driver is a generated
    // clock.
    let mut generated_clk_bits: HashSet<SigBit> = HashSet::new();
    for cell in module.cells.values() {
        if cell.ty != rc.flip_flop {
            continue;
        }
        for conn in &cell.connections {
            if !conn.direction.reads() || conn.port != rc.flip_flop_clock_port {
                continue;
            }
            for &bit in conn.sig.bits() {
                if driven_bits.contains(&bit)
                    && !pad_driven_bits.contains(&bit)
                    && generated_clk_bits.insert(sigmap.map(bit))
                {
                    sink.emit(
                        Diagnostic::warning(GENERATED_CLOCK, "generated clock")
                            .with_location(bit_location(module, interner, bit))
                            .with_note("a fabric clock buffer will be used for this bit"),
                    );
                }
            }
        }
    }

    ClockClasses {
        sink_bits,
        buf_bits,
        driven_bits,
        pad_driven_bits,
        generated_clk_bits,
    }
}

/// Propagates sink/buffered marks through inverter cells until stable.
///
/// Two rules, applied from a worklist keyed on newly marked bits:
/// - an inverter *output* that feeds a sink and is not yet buffered becomes
///   buffered, and the requirement moves to the inverter's *input*;
/// - a buffered inverter *input* makes the *output* buffered as well.
///
/// Both sets only grow and are bounded by the module's bit count, so the
/// loop terminates.
fn propagate_through_inverters(
    module: &Module,
    sigmap: &SigMap,
    catalog: &AttributeCatalog,
    sink_bits: &mut HashSet<SigBit>,
    buf_bits: &mut HashSet<SigBit>,
) {
    // Static inverter edges of this module, on canonical bits.
    let mut inverter_inputs_of: HashMap<SigBit, Vec<SigBit>> = HashMap::new();
    let mut inverter_outputs_of: HashMap<SigBit, Vec<SigBit>> = HashMap::new();
    for cell in module.cells.values() {
        for conn in &cell.connections {
            for i in 0..conn.sig.width() {
                let bit = sigmap.map(conn.sig.bit(i));
                if let Some((in_port, in_bit)) = catalog.inverter_source(cell.ty, conn.port, i) {
                    if let Some(in_sig) = cell.port(in_port) {
                        if in_bit < in_sig.width() {
                            inverter_inputs_of
                                .entry(bit)
                                .or_default()
                                .push(sigmap.map(in_sig.bit(in_bit)));
                        }
                    }
                }
                if let Some((out_port, out_bit)) = catalog.inverter_target(cell.ty, conn.port, i) {
                    if let Some(out_sig) = cell.port(out_port) {
                        if out_bit < out_sig.width() {
                            inverter_outputs_of
                                .entry(bit)
                                .or_default()
                                .push(sigmap.map(out_sig.bit(out_bit)));
                        }
                    }
                }
            }
        }
    }

    if inverter_inputs_of.is_empty() && inverter_outputs_of.is_empty() {
        return;
    }

    // Deterministic seeding keeps processing order reproducible.
    let mut seeds: Vec<(SigBit, Mark)> = Vec::new();
    let mut sorted_sinks: Vec<SigBit> = sink_bits.iter().copied().collect();
    sorted_sinks.sort();
    seeds.extend(sorted_sinks.into_iter().map(|b| (b, Mark::Sink)));
    let mut sorted_bufs: Vec<SigBit> = buf_bits.iter().copied().collect();
    sorted_bufs.sort();
    seeds.extend(sorted_bufs.into_iter().map(|b| (b, Mark::Buffered)));

    let mut work: VecDeque<(SigBit, Mark)> = seeds.into();
    while let Some((bit, mark)) = work.pop_front() {
        match mark {
            Mark::Sink => {
                if buf_bits.contains(&bit) {
                    continue;
                }
                if let Some(inputs) = inverter_inputs_of.get(&bit) {
                    // The inverter output will look buffered once its input
                    // side is; pull the requirement upstream.
                    if buf_bits.insert(bit) {
                        work.push_back((bit, Mark::Buffered));
                    }
                    for &input in inputs {
                        if sink_bits.insert(input) {
                            work.push_back((input, Mark::Sink));
                        }
                    }
                }
            }
            Mark::Buffered => {
                if let Some(outputs) = inverter_outputs_of.get(&bit) {
                    for &output in outputs {
                        if buf_bits.insert(output) {
                            work.push_back((output, Mark::Buffered));
                        }
                    }
                }
            }
        }
    }
}

/// Renders a bit as `module.wire[offset]` for diagnostics.
pub(crate) fn bit_location(module: &Module, interner: &Interner, bit: SigBit) -> String {
    let module_name = interner.resolve(module.name);
    match bit {
        SigBit::Wire { wire, offset } => {
            let wire_name = interner.resolve(module.wires[wire].name);
            format!("{module_name}.{wire_name}[{offset}]")
        }
        SigBit::Const(value) => format!("{module_name}.<const {value}>"),
    }
}
