//! Inventory record - one stocked item reconstructed from a sheet row

use serde::{Deserialize, Serialize};

/// Location assigned to items that appear before any location header
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// A single inventory line with its inferred location and shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Item ID cell text, or "{location} - {shelf}" when the cell was empty
    pub item_id: String,

    /// Most recent location header above the row
    pub location: String,

    /// Most recent shelf header above the row, or the row's own shelf marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf: Option<String>,

    pub item_name: String,

    /// Third column of the sheet, taken positionally
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    pub stock: f64,
    pub par: f64,
    pub order_amount: f64,

    /// stock < par
    pub is_below_par: bool,

    /// order_amount > 0
    pub needs_order: bool,
}

impl InventoryRecord {
    /// Create a record with zeroed quantities
    pub fn new(
        item_id: impl Into<String>,
        location: impl Into<String>,
        item_name: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            location: location.into(),
            shelf: None,
            item_name: item_name.into(),
            item_type: None,
            stock: 0.0,
            par: 0.0,
            order_amount: 0.0,
            is_below_par: false,
            needs_order: false,
        }
    }

    pub fn with_shelf(mut self, shelf: Option<String>) -> Self {
        self.shelf = shelf;
        self
    }

    pub fn with_type(mut self, item_type: Option<String>) -> Self {
        self.item_type = item_type;
        self
    }

    /// Set the quantities and recompute the derived flags
    pub fn with_quantities(mut self, stock: f64, par: f64, order_amount: f64) -> Self {
        self.stock = stock;
        self.par = par;
        self.order_amount = order_amount;
        self.is_below_par = stock < par;
        self.needs_order = order_amount > 0.0;
        self
    }
}
