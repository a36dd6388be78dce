//! `stockgrid list` command - inventory listing with search, filters and sorting

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::SourceArgs;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, InventoryQuery, SortDirection, SortField, SortSpec};
use crate::entities::InventoryRecord;

/// Columns available for display in the list output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListColumn {
    ItemId,
    Name,
    Location,
    Shelf,
    Type,
    Stock,
    Par,
    Order,
    BelowPar,
}

impl ListColumn {
    pub fn key(self) -> &'static str {
        match self {
            ListColumn::ItemId => "item-id",
            ListColumn::Name => "name",
            ListColumn::Location => "location",
            ListColumn::Shelf => "shelf",
            ListColumn::Type => "type",
            ListColumn::Stock => "stock",
            ListColumn::Par => "par",
            ListColumn::Order => "order",
            ListColumn::BelowPar => "below-par",
        }
    }
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Column definitions for inventory list output
const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("item-id", "ITEM ID", 24),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("location", "LOCATION", 20),
    ColumnDef::new("shelf", "SHELF", 20),
    ColumnDef::new("type", "TYPE", 14),
    ColumnDef::new("stock", "STOCK", 8),
    ColumnDef::new("par", "PAR", 8),
    ColumnDef::new("order", "ORDER", 8),
    ColumnDef::new("below-par", "BELOW PAR", 10),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Search item name, location and shelf (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only show items at this location ("all" shows every location)
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Only show items with stock below par
    #[arg(long)]
    pub below_par: bool,

    /// Only show items with a positive order amount
    #[arg(long)]
    pub needs_order: bool,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        ListColumn::Name,
        ListColumn::Location,
        ListColumn::Shelf,
        ListColumn::Stock,
        ListColumn::Par,
        ListColumn::Order,
        ListColumn::BelowPar,
    ])]
    pub columns: Vec<ListColumn>,

    /// Sort by field
    #[arg(long, default_value_t = SortField::ItemName)]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,

    /// Wrap long text columns at this width instead of truncating
    #[arg(long, short = 'w')]
    pub wrap: Option<usize>,
}

impl ListArgs {
    /// Translate the flags into a query
    pub fn query(&self) -> InventoryQuery {
        let direction = if self.reverse {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        InventoryQuery {
            search: self.search.clone(),
            location: self
                .location
                .clone()
                .filter(|l| !l.eq_ignore_ascii_case("all")),
            below_par: self.below_par,
            needs_order: self.needs_order,
            sort: SortSpec::new(self.sort, direction),
            limit: self.limit,
        }
    }
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let inventory = args.source.load(&config)?;
    let records = args.query().apply(&inventory.records);

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&records).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if records.is_empty() && format == OutputFormat::Tsv {
                if !global.quiet {
                    println!("No items found.");
                }
                return Ok(());
            }

            let table_config = if global.quiet {
                TableConfig::for_pipe()
            } else if let Some(width) = args.wrap {
                TableConfig::with_wrap(width)
            } else {
                TableConfig::default()
            };
            let visible: Vec<&str> = args.columns.iter().map(|c| c.key()).collect();
            TableFormatter::new(COLUMNS, "item")
                .with_config(table_config)
                .output(records.iter().map(record_to_row), format, &visible);
        }
    }

    Ok(())
}

fn record_to_row(record: &InventoryRecord) -> TableRow {
    TableRow::new(record.item_id.clone())
        .cell("item-id", CellValue::Id(record.item_id.clone()))
        .cell("name", CellValue::Text(record.item_name.clone()))
        .cell("location", CellValue::Text(record.location.clone()))
        .cell(
            "shelf",
            record
                .shelf
                .clone()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty),
        )
        .cell(
            "type",
            record
                .item_type
                .clone()
                .map(CellValue::Type)
                .unwrap_or(CellValue::Empty),
        )
        .cell("stock", CellValue::Quantity(record.stock))
        .cell("par", CellValue::Quantity(record.par))
        .cell("order", CellValue::OrderQuantity(record.order_amount))
        .cell("below-par", CellValue::BelowPar(record.is_below_par))
}
