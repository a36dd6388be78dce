//! Entity type definitions
//!
//! - [`InventoryRecord`] - One stocked item with its inferred location and shelf
//! - [`DashboardStats`] - Totals and per-location stock for a record list
//! - [`SheetResponse`] - Items and stats served together for one grid

pub mod record;
pub mod response;
pub mod stats;

pub use record::{InventoryRecord, UNKNOWN_LOCATION};
pub use response::SheetResponse;
pub use stats::DashboardStats;
