//! Dashboard statistics value type

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of a parsed inventory, recomputed on demand from the records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: usize,
    pub total_stock: f64,
    pub items_below_par: usize,
    pub total_order_amount: f64,

    /// Distinct record locations, ascending
    pub locations: Vec<String>,

    /// Summed stock per location
    pub stock_by_location: BTreeMap<String, f64>,
}

impl DashboardStats {
    /// Stock held at a location, zero if the location is unknown
    pub fn stock_at(&self, location: &str) -> f64 {
        self.stock_by_location.get(location).copied().unwrap_or(0.0)
    }
}
