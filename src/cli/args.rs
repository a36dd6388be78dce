//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, export::ExportArgs, list::ListArgs,
    stats::StatsArgs,
};

#[derive(Parser)]
#[command(name = "stockgrid")]
#[command(author, version, about = "Inventory spreadsheet toolkit")]
#[command(long_about = "Reads a loosely formatted inventory spreadsheet, rebuilds its location and shelf structure, and reports stock levels against par.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List inventory items with search, filters and sorting
    List(ListArgs),

    /// Show the inventory dashboard (totals and stock per location)
    Stats(StatsArgs),

    /// Export items and stats as a single JSON document
    Export(ExportArgs),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically pick the command's natural format
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated table (for terminals and piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default, then the command's own
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .filter(|format| *format != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}
