//! Core module - parsing, aggregation and the data-source collaborators

pub mod config;
pub mod logging;
pub mod parse;
pub mod query;
pub mod source;
pub mod stats;

pub use config::Config;
pub use parse::{parse_grid, ColumnMap, RawGrid, RowKind};
pub use query::{InventoryQuery, SortDirection, SortField, SortSpec};
pub use source::{GridSource, ServiceAccountKey, SheetRequest, SheetsAuth, SourceError};
pub use stats::aggregate;
