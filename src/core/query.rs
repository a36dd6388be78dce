//! Inventory queries - search, filter and sort over parsed records

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::entities::InventoryRecord;

/// Record field a listing can be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    ItemId,
    #[default]
    ItemName,
    Location,
    Shelf,
    Type,
    Stock,
    Par,
    OrderAmount,
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortField::ItemId => write!(f, "item-id"),
            SortField::ItemName => write!(f, "item-name"),
            SortField::Location => write!(f, "location"),
            SortField::Shelf => write!(f, "shelf"),
            SortField::Type => write!(f, "type"),
            SortField::Stock => write!(f, "stock"),
            SortField::Par => write!(f, "par"),
            SortField::OrderAmount => write!(f, "order-amount"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Sort column and direction; defaults to item name ascending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Selecting the active field flips direction; another field starts ascending
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }

    /// Compare two records under this spec
    pub fn compare(&self, a: &InventoryRecord, b: &InventoryRecord) -> Ordering {
        let ordering = match self.field {
            SortField::ItemId => compare_text(&a.item_id, &b.item_id),
            SortField::ItemName => compare_text(&a.item_name, &b.item_name),
            SortField::Location => compare_text(&a.location, &b.location),
            SortField::Shelf => compare_optional_text(a.shelf.as_deref(), b.shelf.as_deref()),
            SortField::Type => {
                compare_optional_text(a.item_type.as_deref(), b.item_type.as_deref())
            }
            SortField::Stock => a.stock.total_cmp(&b.stock),
            SortField::Par => a.par.total_cmp(&b.par),
            SortField::OrderAmount => a.order_amount.total_cmp(&b.order_amount),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Case-insensitive comparison with exact text as the tie-breaker
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Absent values sort after present ones
fn compare_optional_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_text(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filters and ordering applied to a record listing
#[derive(Debug, Clone, Default)]
pub struct InventoryQuery {
    /// Case-insensitive substring matched against name, location and shelf
    pub search: Option<String>,
    /// Exact location; `None` keeps every location
    pub location: Option<String>,
    pub below_par: bool,
    pub needs_order: bool,
    pub sort: SortSpec,
    pub limit: Option<usize>,
}

impl InventoryQuery {
    /// Whether a record passes the search and filters
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = record.item_name.to_lowercase().contains(&term)
                || record.location.to_lowercase().contains(&term)
                || record
                    .shelf
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if &record.location != location {
                return false;
            }
        }

        (!self.below_par || record.is_below_par) && (!self.needs_order || record.needs_order)
    }

    /// Filter, sort (stable) and truncate a record list
    pub fn apply(&self, records: &[InventoryRecord]) -> Vec<InventoryRecord> {
        let mut selected: Vec<InventoryRecord> = records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();

        selected.sort_by(|a, b| self.sort.compare(a, b));

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}
