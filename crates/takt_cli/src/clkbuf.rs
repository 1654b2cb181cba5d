//! The `takt clkbuf` subcommand.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use takt_clkbuf::{insert_clock_buffers, BufferCell, ClkbufConfig, ClkbufError, Selection};
use takt_common::Interner;
use takt_diagnostics::{
    DiagnosticRenderer, DiagnosticSink, JsonRenderer, Severity, TerminalRenderer,
};

use crate::netlist_json::{self, JsonDesign};
use crate::ReportFormat;

/// Arguments for the `takt clkbuf` subcommand.
#[derive(Args, Debug)]
pub struct ClkbufArgs {
    /// Input netlist JSON file.
    pub input: PathBuf,

    /// Clock-buffer cell type and its `<output>:<input>` port pair; the
    /// output port faces the clock network sinks.
    #[arg(long, num_args = 2, value_names = ["CELL", "PORTS"])]
    pub buf: Option<Vec<String>>,

    /// Input-pad cell type and its `<output>:<input>` port pair, inserted
    /// on clock nets that are also top-module inputs.
    #[arg(long, num_args = 2, value_names = ["CELL", "PORTS"])]
    pub inpad: Option<Vec<String>>,

    /// Restrict candidate wires (`wire`, `module.wire`, trailing `*`
    /// wildcard). An explicit selection overrides `clkbuf_inhibit`.
    #[arg(long, num_args = 1..)]
    pub select: Vec<String>,

    /// Write the transformed netlist here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Diagnostic output format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Runs the subcommand, returning the process exit code.
pub fn run(args: &ClkbufArgs, quiet: bool) -> i32 {
    match execute(args, quiet) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn execute(args: &ClkbufArgs, quiet: bool) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(&args.input)?;
    let json: JsonDesign = serde_json::from_str(&text)?;
    let interner = Interner::new();
    let mut design = netlist_json::design_from_json(&json, &interner)?;

    let mut config = ClkbufConfig::new(parse_cell_spec(&args.buf)?, parse_cell_spec(&args.inpad)?);
    if !args.select.is_empty() {
        config.selection = Selection::from_patterns(args.select.clone());
    }

    let sink = DiagnosticSink::new();
    let report = insert_clock_buffers(&mut design, &config, &interner, &sink)?;

    let renderer: Box<dyn DiagnosticRenderer> = match args.format {
        ReportFormat::Text => Box::new(TerminalRenderer::new(false)),
        ReportFormat::Json => Box::new(JsonRenderer),
    };
    for diag in sink.take_all() {
        if quiet && diag.severity < Severity::Warning {
            continue;
        }
        eprintln!("{}", renderer.render(&diag));
    }
    if !quiet {
        eprintln!(
            "clkbuf: inserted {} buffer(s) and {} pad(s) across {} module(s)",
            report.buffers_inserted, report.pads_inserted, report.modules_processed
        );
    }

    let out = netlist_json::design_to_json(&design, &interner);
    let serialized = serde_json::to_string_pretty(&out)?;
    match &args.output {
        Some(path) => fs::write(path, serialized + "\n")?,
        None => println!("{serialized}"),
    }
    Ok(())
}

fn parse_cell_spec(values: &Option<Vec<String>>) -> Result<Option<BufferCell>, ClkbufError> {
    match values.as_deref() {
        Some([cell, ports]) => BufferCell::parse(cell, ports).map(Some),
        Some(parts) => Err(ClkbufError::InvalidPortPair(parts.join(" "))),
        None => Ok(None),
    }
}
