//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pagecraft",
    version,
    about = "Inspect blocks and replay popup/menu sessions of the pagecraft editor core",
    long_about = "Inspect block documents and replay popup/menu sessions.\n\n\
                  `classify` prints what every block of a document can do.\n\
                  `replay` runs a scripted session against the layer stores and \
                  prints the resulting event timeline."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: the platform config directory).
    #[arg(long = "settings", value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the capabilities of every block in a JSON document.
    Classify(ClassifyArgs),

    /// Run a TOML popup/menu script and print the event timeline.
    Replay(ReplayArgs),
}

#[derive(Parser)]
pub struct ClassifyArgs {
    /// JSON array of backend blocks.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct ReplayArgs {
    /// Replay script.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print one plain line per event instead of a table.
    #[arg(long = "plain")]
    pub plain: bool,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
