//! Pass configuration: buffer/pad cell specs, wire selection, and the
//! recognised primitive names.

use serde::{Deserialize, Serialize};
use takt_common::{Ident, Interner};

/// Errors reported by the clock-buffer pass before any mutation happens.
#[derive(Debug, thiserror::Error)]
pub enum ClkbufError {
    /// Neither a buffer cell nor an input-pad cell was configured.
    #[error("either a clock-buffer cell (--buf) or an input-pad cell (--inpad) is required")]
    MissingBufferCell,

    /// A port pair was not of the form `<output>:<input>`.
    #[error("invalid port pair '{0}': expected '<output>:<input>'")]
    InvalidPortPair(String),
}

/// A buffer-like cell type together with its two port names.
///
/// The `output` port faces the clock network (the sinks); the `input` port
/// consumes the original driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferCell {
    /// The cell-type name, e.g. `CLK_BUF`.
    pub cell_type: String,
    /// The network-side port name.
    pub output: String,
    /// The driver-side port name.
    pub input: String,
}

impl BufferCell {
    /// Parses a cell type plus a `<output>:<input>` port pair.
    pub fn parse(cell_type: &str, ports: &str) -> Result<Self, ClkbufError> {
        let (output, input) = ports
            .split_once(':')
            .ok_or_else(|| ClkbufError::InvalidPortPair(ports.to_string()))?;
        if output.is_empty() || input.is_empty() {
            return Err(ClkbufError::InvalidPortPair(ports.to_string()));
        }
        Ok(Self {
            cell_type: cell_type.to_string(),
            output: output.to_string(),
            input: input.to_string(),
        })
    }
}

/// Which wires are candidates for buffer insertion.
///
/// With no patterns every wire is a candidate, minus those carrying
/// `clkbuf_inhibit`. An explicit selection overrides `clkbuf_inhibit`: a
/// wire the user named is processed even when opted out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    patterns: Vec<String>,
}

impl Selection {
    /// The default selection: every wire.
    pub fn all() -> Self {
        Self::default()
    }

    /// A selection restricted to the given patterns. Each pattern is a wire
    /// name, optionally qualified as `module.wire`, with an optional
    /// trailing `*` wildcard on the wire part.
    pub fn from_patterns(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Returns `true` when the user supplied patterns.
    pub fn is_explicit(&self) -> bool {
        !self.patterns.is_empty()
    }

    /// Returns `true` if the wire is a candidate under this selection.
    pub fn matches(&self, module: &str, wire: &str) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        self.patterns.iter().any(|pattern| {
            let (want_module, want_wire) = match pattern.split_once('.') {
                Some((m, w)) => (Some(m), w),
                None => (None, pattern.as_str()),
            };
            if want_module.is_some_and(|m| m != module) {
                return false;
            }
            match want_wire.strip_suffix('*') {
                Some(prefix) => wire.starts_with(prefix),
                None => want_wire == wire,
            }
        })
    }
}

/// The cell-type names with hardwired meaning to the pass.
///
/// Kept as data rather than scattered string literals so tests and other
/// technology families can retarget them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primitives {
    /// Clock-generator whose output clocks are never buffered.
    pub pll: String,
    /// Free-running oscillator whose output clocks are never buffered.
    pub boot_clock: String,
    /// Input buffer: its output marks bits as already routed from a pad.
    pub input_buffer: String,
    /// The input buffer's output port name.
    pub input_buffer_output: String,
    /// Flip-flop whose clock pin defines generated-clock detection.
    pub flip_flop: String,
    /// The flip-flop's clock input port name.
    pub flip_flop_clock_port: String,
    /// The buffer cell substituted for generated clocks.
    pub fabric_buffer: String,
}

impl Default for Primitives {
    fn default() -> Self {
        Self {
            pll: "PLL".to_string(),
            boot_clock: "BOOT_CLOCK".to_string(),
            input_buffer: "I_BUF".to_string(),
            input_buffer_output: "O".to_string(),
            flip_flop: "DFFRE".to_string(),
            flip_flop_clock_port: "C".to_string(),
            fabric_buffer: "FCLK_BUF".to_string(),
        }
    }
}

/// Full configuration for one invocation of the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClkbufConfig {
    /// The clock-buffer cell to insert, if any.
    pub buffer: Option<BufferCell>,
    /// The input-pad cell to insert at top-level clock inputs, if any.
    pub inpad: Option<BufferCell>,
    /// Which wires are candidates.
    pub selection: Selection,
    /// The recognised primitive names.
    pub primitives: Primitives,
}

impl ClkbufConfig {
    /// Creates a configuration with the given buffer and pad cells, the
    /// match-all selection, and the default primitives.
    pub fn new(buffer: Option<BufferCell>, inpad: Option<BufferCell>) -> Self {
        Self {
            buffer,
            inpad,
            selection: Selection::all(),
            primitives: Primitives::default(),
        }
    }

    /// Checks the configuration is usable. At least one of the buffer and
    /// input-pad cells must be present.
    pub fn validate(&self) -> Result<(), ClkbufError> {
        if self.buffer.is_none() && self.inpad.is_none() {
            return Err(ClkbufError::MissingBufferCell);
        }
        Ok(())
    }
}

/// The configuration with every name interned, ready for the hot loops.
pub(crate) struct ResolvedConfig {
    pub buffer: Option<ResolvedBufferCell>,
    pub inpad: Option<ResolvedBufferCell>,
    pub selection: Selection,
    pub pll: Ident,
    pub boot_clock: Ident,
    pub input_buffer: Ident,
    pub input_buffer_output: Ident,
    pub flip_flop: Ident,
    pub flip_flop_clock_port: Ident,
    pub fabric_buffer: Ident,
    pub attr_inhibit: Ident,
    pub attr_driver: Ident,
    pub attr_sink: Ident,
    pub attr_inv: Ident,
}

pub(crate) struct ResolvedBufferCell {
    pub cell_type: Ident,
    pub output: Ident,
    pub input: Ident,
}

impl ResolvedConfig {
    pub fn resolve(config: &ClkbufConfig, interner: &Interner) -> Self {
        let resolve_cell = |cell: &BufferCell| ResolvedBufferCell {
            cell_type: interner.get_or_intern(&cell.cell_type),
            output: interner.get_or_intern(&cell.output),
            input: interner.get_or_intern(&cell.input),
        };
        let p = &config.primitives;
        Self {
            buffer: config.buffer.as_ref().map(resolve_cell),
            inpad: config.inpad.as_ref().map(resolve_cell),
            selection: config.selection.clone(),
            pll: interner.get_or_intern(&p.pll),
            boot_clock: interner.get_or_intern(&p.boot_clock),
            input_buffer: interner.get_or_intern(&p.input_buffer),
            input_buffer_output: interner.get_or_intern(&p.input_buffer_output),
            flip_flop: interner.get_or_intern(&p.flip_flop),
            flip_flop_clock_port: interner.get_or_intern(&p.flip_flop_clock_port),
            fabric_buffer: interner.get_or_intern(&p.fabric_buffer),
            attr_inhibit: interner.get_or_intern(takt_ir::attr::names::CLKBUF_INHIBIT),
            attr_driver: interner.get_or_intern(takt_ir::attr::names::CLKBUF_DRIVER),
            attr_sink: interner.get_or_intern(takt_ir::attr::names::CLKBUF_SINK),
            attr_inv: interner.get_or_intern(takt_ir::attr::names::CLKBUF_INV),
        }
    }
}
