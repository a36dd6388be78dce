//! `stockgrid config` command - Configuration inspection
//!
//! Shows the effective configuration, where it is read from, and which
//! keys are recognised.

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::config::PROJECT_CONFIG_FILE;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only project config path
    #[arg(long = "project-only", conflicts_with = "global_only")]
    pub project_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("sheet_id", "Spreadsheet ID fetched when no FILE is given"),
    ("range", "A1-notation range to fetch (default A:Z)"),
    ("api_key", "Google API key for public or link-shared sheets"),
    ("access_token", "OAuth access token (spreadsheets.readonly scope)"),
    ("service_account_json", "Service account key JSON, inline"),
    ("service_account_key", "Path to a service account key file"),
    ("sheets_endpoint", "Sheets API base URL"),
    ("default_format", "Default output format (tsv, json, yaml, etc.)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, _global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args),
        ConfigCommands::Path(args) => run_path(args),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load();

    if let Some(key) = &args.key {
        if !VALID_KEYS.iter().any(|(k, _)| *k == key.as_str()) {
            return Err(miette::miette!(
                help = "Run 'stockgrid config keys' to list valid keys",
                "Unknown configuration key '{}'",
                key
            ));
        }
        return match config.display_value(key) {
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    for (key, _) in VALID_KEYS {
        print_config_value(key, config.display_value(key).as_deref());
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command-line flags (--sheet-id, --range, --format)");
    println!("  2. Environment variables (STOCKGRID_SHEET_ID, GOOGLE_SERVICE_ACCOUNT_JSON, ...)");
    println!("  3. Project config ({})", PROJECT_CONFIG_FILE);
    println!("  4. Global config (~/.config/stockgrid/config.yaml)");

    Ok(())
}

fn run_path(args: PathArgs) -> Result<()> {
    let global_path = get_global_config_path()?;
    let project_path = get_project_config_path()?;

    if args.project_only {
        println!("{}", project_path.display());
    } else if args.global_only {
        println!("{}", global_path.display());
    } else {
        println!("{}", style("Configuration file paths:").bold());
        println!();
        print_path("Global:", &global_path);
        println!();
        print_path("Project:", &project_path);
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style(format!(
            "Set keys in {} or the global config file.",
            PROJECT_CONFIG_FILE
        ))
        .dim()
    );

    Ok(())
}

// Helper functions

fn get_global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn get_project_config_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| miette::miette!("Could not determine working directory: {}", e))?;
    Ok(cwd.join(PROJECT_CONFIG_FILE))
}

fn print_path(label: &str, path: &std::path::Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    let status = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {:width$} {}", "", status, width = label.len());
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}
