//! takt CLI — the command-line interface for the takt netlist tools.
//!
//! Provides `takt clkbuf` for clock-buffer insertion on JSON netlists.

#![warn(missing_docs)]

mod clkbuf;
mod netlist_json;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// takt — clock-network tooling for FPGA synthesis netlists.
#[derive(Parser, Debug)]
#[command(name = "takt", version, about = "takt netlist tools")]
pub struct Cli {
    /// Suppress notes and the summary line; warnings and errors still print.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Insert clock buffers between clock drivers and clock sinks.
    ///
    /// Without a selection, all wires without the `clkbuf_inhibit`
    /// attribute are considered for clock-buffer insertion. At least one of
    /// `--buf` and `--inpad` is required.
    Clkbuf(clkbuf::ClkbufArgs),
}

/// Output format for diagnostics.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// One JSON object per diagnostic.
    Json,
}

fn main() {
    let cli = Cli::parse();
    let code = match &cli.command {
        Command::Clkbuf(args) => clkbuf::run(args, cli.quiet),
    };
    process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_clkbuf_with_buf_and_inpad() {
        let cli = Cli::try_parse_from([
            "takt", "clkbuf", "design.json", "--buf", "CLK_BUF", "O:I", "--inpad", "I_PAD",
            "O:I", "-o", "out.json",
        ])
        .unwrap();
        let Command::Clkbuf(args) = cli.command;
        assert_eq!(args.input.to_str(), Some("design.json"));
        assert_eq!(args.buf.as_deref(), Some(&["CLK_BUF".to_string(), "O:I".to_string()][..]));
        assert_eq!(args.inpad.as_deref(), Some(&["I_PAD".to_string(), "O:I".to_string()][..]));
        assert_eq!(args.output.as_deref().and_then(|p| p.to_str()), Some("out.json"));
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_selection_patterns() {
        let cli = Cli::try_parse_from([
            "takt", "clkbuf", "design.json", "--buf", "CLK_BUF", "O:I", "--select", "clk",
            "top.aux_clk",
        ])
        .unwrap();
        let Command::Clkbuf(args) = cli.command;
        assert_eq!(args.select, vec!["clk".to_string(), "top.aux_clk".to_string()]);
    }

    #[test]
    fn quiet_is_global() {
        let cli = Cli::try_parse_from([
            "takt", "clkbuf", "-q", "design.json", "--buf", "CLK_BUF", "O:I",
        ])
        .unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn buf_requires_two_values() {
        assert!(Cli::try_parse_from(["takt", "clkbuf", "design.json", "--buf", "CLK_BUF"]).is_err());
    }
}
