//! `stockgrid stats` command - inventory dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::SourceArgs;
use crate::cli::helpers::{escape_csv, format_quantity};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{aggregate, Config};
use crate::entities::{DashboardStats, InventoryRecord};

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Skip the per-location breakdown
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let inventory = args.source.load(&config)?;
    let stats = aggregate(&inventory.records);

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&stats).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&stats).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            print!("{}", render_csv(&stats));
        }
        OutputFormat::Md => {
            print!("{}", render_markdown(&stats, &inventory.records, args.summary_only));
        }
        OutputFormat::Id => {
            for location in &stats.locations {
                println!("{}", location);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_dashboard(&stats, &inventory.records, args.summary_only);
        }
    }

    Ok(())
}

/// Item count and below-par count for one location
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LocationCounts {
    items: usize,
    below_par: usize,
}

fn counts_by_location(records: &[InventoryRecord]) -> BTreeMap<&str, LocationCounts> {
    let mut counts: BTreeMap<&str, LocationCounts> = BTreeMap::new();
    for record in records {
        let entry = counts.entry(record.location.as_str()).or_default();
        entry.items += 1;
        if record.is_below_par {
            entry.below_par += 1;
        }
    }
    counts
}

fn location_table(stats: &DashboardStats, records: &[InventoryRecord]) -> Builder {
    let counts = counts_by_location(records);
    let mut builder = Builder::default();
    builder.push_record(["Location", "Items", "Stock", "Below Par"]);
    for location in &stats.locations {
        let c = counts.get(location.as_str()).copied().unwrap_or_default();
        builder.push_record([
            location.clone(),
            c.items.to_string(),
            format_quantity(stats.stock_at(location)),
            c.below_par.to_string(),
        ]);
    }
    builder
}

fn print_dashboard(stats: &DashboardStats, records: &[InventoryRecord], summary_only: bool) {
    let width = 48;

    println!("{}", style("Inventory Dashboard").bold().underlined());
    println!("{}", "═".repeat(width));
    println!();

    let below_par = if stats.items_below_par > 0 {
        style(stats.items_below_par.to_string()).red().bold()
    } else {
        style(stats.items_below_par.to_string()).green()
    };

    println!("  {:<22} {}", "Total items:", style(stats.total_items).cyan());
    println!("  {:<22} {}", "Total stock:", format_quantity(stats.total_stock));
    println!("  {:<22} {}", "Items below par:", below_par);
    println!(
        "  {:<22} {}",
        "Total order amount:",
        style(format_quantity(stats.total_order_amount)).yellow()
    );
    println!("  {:<22} {}", "Locations:", stats.locations.len());

    if summary_only || stats.locations.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Stock by Location").bold());
    println!("{}", location_table(stats, records).build().with(Style::rounded()));
}

fn render_markdown(stats: &DashboardStats, records: &[InventoryRecord], summary_only: bool) -> String {
    let mut output = String::new();
    output.push_str("# Inventory Dashboard\n\n");

    let mut summary = Builder::default();
    summary.push_record(["Metric", "Value"]);
    summary.push_record(["Total Items".to_string(), stats.total_items.to_string()]);
    summary.push_record(["Total Stock".to_string(), format_quantity(stats.total_stock)]);
    summary.push_record(["Items Below Par".to_string(), stats.items_below_par.to_string()]);
    summary.push_record([
        "Total Order Amount".to_string(),
        format_quantity(stats.total_order_amount),
    ]);
    summary.push_record(["Locations".to_string(), stats.locations.len().to_string()]);
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push('\n');

    if !summary_only && !stats.locations.is_empty() {
        output.push_str("\n## Stock by Location\n\n");
        output.push_str(&location_table(stats, records).build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    output
}

fn render_csv(stats: &DashboardStats) -> String {
    let mut output = String::from("location,stock\n");
    for (location, stock) in &stats.stock_by_location {
        output.push_str(&format!("{},{}\n", escape_csv(location), format_quantity(*stock)));
    }
    output
}
