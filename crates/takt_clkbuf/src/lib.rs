//! Clock-buffer insertion for takt netlists.
//!
//! Inserts the target technology's clock-buffer cells (and optionally
//! input-pad cells at top-level clock inputs) between clock drivers and the
//! clock sinks that consume them, so place-and-route receives every clock
//! network already routed through the mandated buffering primitive.
//!
//! Requirements are declared as attributes on blackbox ports
//! (`clkbuf_sink`, `clkbuf_driver`, `clkbuf_inv`) and propagate across the
//! module hierarchy: the design is processed leaves-first, and each
//! module's unresolved sinks and freshly buffered outputs are promoted into
//! a design-wide catalogue its parents consult. Requirements also pass
//! transparently through clock-path inverters, and generated clocks
//! (flip-flop outputs clocking other flip-flops) are routed through the
//! fabric clock buffer instead of the configured one.
//!
//! # Usage
//!
//! ```ignore
//! use takt_clkbuf::{insert_clock_buffers, BufferCell, ClkbufConfig};
//! let config = ClkbufConfig::new(Some(BufferCell::parse("CLK_BUF", "O:I")?), None);
//! let report = insert_clock_buffers(&mut design, &config, &interner, &sink)?;
//! ```

#![warn(missing_docs)]

mod catalog;
mod classify;
mod config;
mod hierarchy;
mod insert;

pub use config::{BufferCell, ClkbufConfig, ClkbufError, Primitives, Selection};

use catalog::AttributeCatalog;
use config::ResolvedConfig;
use serde::{Deserialize, Serialize};
use takt_common::Interner;
use takt_diagnostics::DiagnosticSink;
use takt_ir::Design;

/// Summary of one pass invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClkbufReport {
    /// Regular (non-blackbox) modules processed.
    pub modules_processed: usize,
    /// Clock-buffer cells inserted (fabric buffers included).
    pub buffers_inserted: usize,
    /// Input-pad cells inserted.
    pub pads_inserted: usize,
}

/// Runs the clock-buffer insertion pass over a design.
///
/// The design is mutated in place, module by module, leaves first; there is
/// no rollback. Structural findings (generated clocks, inserted cells) are
/// emitted into `sink`; a configuration error aborts before any mutation.
pub fn insert_clock_buffers(
    design: &mut Design,
    config: &ClkbufConfig,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Result<ClkbufReport, ClkbufError> {
    config.validate()?;
    let rc = ResolvedConfig::resolve(config, interner);

    // When the input-pad cell itself emits a buffered clock, no clock
    // buffer is stacked on top of it at top-level inputs.
    let mut buffer_inputs = true;
    if let Some(pad) = &rc.inpad {
        if let Some(pad_module) = design.module_by_name(pad.cell_type) {
            let pad_module = &design.modules[pad_module];
            if let Some(out_wire) = pad_module.wire_by_name(pad.output) {
                if pad_module.wires[out_wire].attrs.get_bool(rc.attr_driver) {
                    buffer_inputs = false;
                }
            }
        }
    }

    let mut catalog = AttributeCatalog::new();
    let mut report = ClkbufReport::default();
    for module_id in hierarchy::sorted_modules(design) {
        if design.modules[module_id].blackbox {
            catalog.collect_blackbox(&design.modules[module_id], &rc, interner);
            continue;
        }
        let outcome = insert::process_module(
            design,
            module_id,
            &mut catalog,
            &rc,
            buffer_inputs,
            interner,
            sink,
        );
        report.modules_processed += 1;
        report.buffers_inserted += outcome.buffers;
        report.pads_inserted += outcome.pads;
    }
    Ok(report)
}
