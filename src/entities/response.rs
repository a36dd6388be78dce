//! Sheet response - the combined document served for one grid

use serde::{Deserialize, Serialize};

use crate::core::parse::{parse_grid, RawGrid};
use crate::core::stats::aggregate;
use crate::entities::{DashboardStats, InventoryRecord};

/// Parsed items, their stats and optionally the grid they came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetResponse {
    pub items: Vec<InventoryRecord>,
    pub stats: DashboardStats,

    /// Unmodified grid, for diagnosing parse results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<RawGrid>,
}

impl SheetResponse {
    /// Aggregate already-parsed items
    pub fn new(items: Vec<InventoryRecord>, raw_data: Option<RawGrid>) -> Self {
        let stats = aggregate(&items);
        Self {
            items,
            stats,
            raw_data,
        }
    }

    /// Parse and aggregate a grid in one step
    pub fn from_grid(grid: RawGrid, include_raw: bool) -> Self {
        let items = parse_grid(&grid);
        Self::new(items, include_raw.then_some(grid))
    }
}
