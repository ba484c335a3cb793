//! CLI argument definitions for the table merger.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "datamerger",
    version,
    about = "Merge Excel/CSV tables whose column names disagree",
    long_about = "Merge Excel/CSV tables whose column names disagree.\n\n\
                  Column labels are normalized and mapped to standard names through an\n\
                  editable alias registry, then all tables are stacked into one result."
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

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Write logs to a daily file (YYYYMMDD.log) in this directory.
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Alias registry document (default: the platform config directory).
    #[arg(long = "mappings", value_name = "PATH", global = true)]
    pub mappings: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge input files into one table.
    Merge(MergeArgs),

    /// Show the columns each input contributes, with previews.
    Inspect(InspectArgs),

    /// Print raw column labels with their code points.
    Diagnose(DiagnoseArgs),

    /// View or edit the alias registry.
    #[command(subcommand)]
    Mapping(MappingCommand),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Input files or directories.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (default: merged.<format> in the current directory).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format (default: from the output extension, else xlsx).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Keep column labels as they are.
    #[arg(long = "no-normalize")]
    pub no_normalize: bool,

    /// Also match labels that contain a known alias.
    #[arg(long = "fuzzy")]
    pub fuzzy: bool,

    /// Drop rows that repeat an earlier row in full.
    #[arg(long = "dedup")]
    pub dedup: bool,

    /// Drop rows that repeat these key columns (comma separated).
    #[arg(long = "dedup-keys", value_name = "COLUMNS", value_delimiter = ',')]
    pub dedup_keys: Vec<String>,

    /// Which duplicate to keep.
    #[arg(long = "keep", value_enum, default_value = "first")]
    pub keep: KeepArg,

    /// Columns to leave out of the result (comma separated).
    #[arg(long = "exclude", value_name = "COLUMNS", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Do not add the source file and sheet columns.
    #[arg(long = "no-source-columns")]
    pub no_source_columns: bool,

    /// Print the quality and mapping reports as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Input files or directories.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Keep column labels as they are.
    #[arg(long = "no-normalize")]
    pub no_normalize: bool,

    /// Also match labels that contain a known alias.
    #[arg(long = "fuzzy")]
    pub fuzzy: bool,

    /// Print the report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct DiagnoseArgs {
    /// Input files or directories.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Also show fuzzy matches.
    #[arg(long = "fuzzy")]
    pub fuzzy: bool,
}

#[derive(Subcommand)]
pub enum MappingCommand {
    /// List every standard name with its aliases.
    List,

    /// Add or replace a standard name and its aliases.
    Add {
        #[arg(value_name = "STANDARD")]
        standard: String,
        #[arg(value_name = "ALIAS")]
        aliases: Vec<String>,
    },

    /// Remove a standard name.
    Remove {
        #[arg(value_name = "STANDARD")]
        standard: String,
    },

    /// Restore the built-in registry.
    Reset,

    /// Show how a label would be resolved.
    Lookup {
        #[arg(value_name = "LABEL")]
        label: String,

        /// Also try fuzzy matching.
        #[arg(long = "fuzzy")]
        fuzzy: bool,
    },

    /// Write an annotated template of the registry document.
    ExportTemplate {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Xlsx,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KeepArg {
    First,
    Last,
    None,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
