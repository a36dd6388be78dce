//! `stockgrid export` command - items and stats as one document

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{write_output, SourceArgs};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::entities::SheetResponse;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Include the unmodified grid as `rawData`
    #[arg(long)]
    pub include_raw: bool,

    /// Write to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Emit compact JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let inventory = args.source.load(&config)?;
    let raw_data = args.include_raw.then_some(inventory.grid);
    let response = SheetResponse::new(inventory.records, raw_data);

    // JSON unless YAML is asked for explicitly
    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Json,
        other => other,
    };
    let content = render(&response, format, args.compact)?;
    write_output(&content, args.output, global.quiet)
}

fn render(response: &SheetResponse, format: OutputFormat, compact: bool) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yml::to_string(response).into_diagnostic(),
        OutputFormat::Json => {
            let json = if compact {
                serde_json::to_string(response)
            } else {
                serde_json::to_string_pretty(response)
            };
            json.map(|s| s + "\n").into_diagnostic()
        }
        other => Err(miette::miette!(
            help = "Use --format json or --format yaml",
            "export does not support the {:?} format",
            other
        )),
    }
}
