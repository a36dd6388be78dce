//! Grid parser - rebuilds location → shelf → item structure from a flat sheet
//!
//! Inventory sheets group items positionally: a row carrying only an Item ID
//! names a location, a row carrying only a shelf label ("Shelf 1 Row A") opens
//! a shelf, and the item rows underneath inherit both. The parser walks the
//! rows once, top to bottom, carrying the most recent location and shelf.
//!
//! Parsing never fails. Missing columns, ragged rows and non-numeric
//! quantities all resolve to empty text or zero.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::entities::{InventoryRecord, UNKNOWN_LOCATION};

/// A sheet as rows of cell text; the first row holds the headers
pub type RawGrid = Vec<Vec<String>>;

/// The item type is read from the third column regardless of its header
const TYPE_COLUMN: usize = 2;

static ROW_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)row\s+[a-z0-9]").expect("Hardcode regex pattern"));

/// Column index for each logical role, discovered from the header row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub item_id: Option<usize>,
    pub item_name: Option<usize>,
    pub stock: Option<usize>,
    pub par: Option<usize>,
    pub order_amount: Option<usize>,
}

impl ColumnMap {
    /// Match header text against the roles; the first matching header wins
    pub fn discover<S: AsRef<str>>(headers: &[S]) -> Self {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().to_lowercase())
            .collect();
        let find = |matches: fn(&str) -> bool| lowered.iter().position(|h| matches(h));

        Self {
            item_id: find(|h| h.contains("item id") || h.contains("itemid")),
            item_name: find(|h| h.contains("item name") || h.contains("itemname")),
            stock: find(|h| h == "stock"),
            par: find(|h| h == "par"),
            order_amount: find(|h| h.contains("order")),
        }
    }
}

/// How a data row contributes to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Item ID only: opens a new location and closes the current shelf
    LocationHeader,
    /// Shelf label only: opens a new shelf within the current location
    ShelfHeader,
    /// An inventory item; `own_shelf` when its Item ID is itself a shelf label
    Item { own_shelf: bool },
    /// Nothing usable
    Blank,
}

/// Classify a row from its trimmed Item ID and Item Name cells
pub fn classify(item_id: &str, item_name: &str) -> RowKind {
    let shelf = is_shelf_marker(item_id);

    if !item_name.is_empty() {
        RowKind::Item { own_shelf: shelf }
    } else if shelf {
        RowKind::ShelfHeader
    } else if !item_id.is_empty() {
        RowKind::LocationHeader
    } else {
        RowKind::Blank
    }
}

/// Whether a label names a shelf rather than a location
///
/// True when the text contains both "shelf" and "row", or "row" followed by
/// whitespace and a letter or digit. "Shelf 1 Row A" and "Row 3" are shelves;
/// "Events Shelf" is a location.
pub fn is_shelf_marker(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    (lower.contains("shelf") && lower.contains("row")) || ROW_LABEL.is_match(text)
}

/// Read a leading decimal number from cell text, zero when there is none
///
/// Leading whitespace is skipped and trailing text ignored, so "12 units"
/// reads as 12. Non-finite results also read as zero.
pub fn coerce_number(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        let frac_digits = frac_end - (end + 1);
        if mantissa_digits + frac_digits > 0 {
            end = frac_end;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    match s[..end].parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => value,
        _ => 0.0,
    }
}

/// Item ID used when the row's own Item ID cell is empty
pub fn synthesize_item_id(location: &str, shelf: Option<&str>) -> String {
    match shelf {
        Some(shelf) => format!("{} - {}", location, shelf),
        None => location.to_string(),
    }
}

fn cell(row: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|idx| row.get(idx))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn quantity(row: &[String], column: Option<usize>) -> f64 {
    column
        .and_then(|idx| row.get(idx))
        .map(|s| coerce_number(s))
        .unwrap_or(0.0)
}

/// Parse a sheet into inventory records, in source row order
///
/// Grids with fewer than two rows (no data below the header) yield nothing.
pub fn parse_grid(grid: &[Vec<String>]) -> Vec<InventoryRecord> {
    let Some((headers, rows)) = grid.split_first() else {
        return Vec::new();
    };
    if rows.is_empty() {
        return Vec::new();
    }

    let columns = ColumnMap::discover(headers);
    debug!(?columns, "discovered sheet columns");

    let mut records = Vec::new();
    let mut current_location = String::new();
    let mut current_shelf = String::new();

    for (idx, row) in rows.iter().enumerate() {
        let item_id = cell(row, columns.item_id);
        let item_name = cell(row, columns.item_name);
        let kind = classify(item_id, item_name);
        // Sheet row numbers are 1-based and the header is row 1
        trace!(row = idx + 2, ?kind, item_id, item_name, "classified row");

        let own_shelf = match kind {
            RowKind::LocationHeader => {
                current_location = item_id.to_string();
                current_shelf.clear();
                continue;
            }
            RowKind::ShelfHeader => {
                current_shelf = item_id.to_string();
                continue;
            }
            RowKind::Blank => continue,
            RowKind::Item { own_shelf } => own_shelf,
        };

        let shelf = if own_shelf {
            current_shelf = item_id.to_string();
            Some(current_shelf.clone())
        } else if !current_shelf.is_empty() {
            Some(current_shelf.clone())
        } else {
            None
        };

        let location = if !current_location.is_empty() {
            current_location.clone()
        } else if !item_id.is_empty() && !own_shelf {
            current_location = item_id.to_string();
            current_location.clone()
        } else {
            UNKNOWN_LOCATION.to_string()
        };

        let record_id = if item_id.is_empty() {
            synthesize_item_id(&location, shelf.as_deref())
        } else {
            item_id.to_string()
        };

        // A blank-but-present cell still yields an (empty) type
        let item_type = row
            .get(TYPE_COLUMN)
            .filter(|s| !s.is_empty())
            .map(|s| s.trim().to_string());

        records.push(
            InventoryRecord::new(record_id, location, item_name)
                .with_shelf(shelf)
                .with_type(item_type)
                .with_quantities(
                    quantity(row, columns.stock),
                    quantity(row, columns.par),
                    quantity(row, columns.order_amount),
                ),
        );
    }

    debug!(rows = rows.len(), records = records.len(), "parsed sheet");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    const HEADERS: &[&str] = &["Item ID", "Item Name", "Type", "Stock", "Par", "Order Amount"];

    #[test]
    fn test_empty_and_header_only_grids() {
        assert!(parse_grid(&[]).is_empty());
        assert!(parse_grid(&grid(&[HEADERS])).is_empty());
    }

    #[test]
    fn test_location_then_shelf_then_item() {
        let g = grid(&[
            HEADERS,
            &["Trailer", "", "", "", "", ""],
            &["Shelf 1 Row A", "", "", "", "", ""],
            &["", "Widget", "Tool", "5", "10", "5"],
        ]);
        let records = parse_grid(&g);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.location, "Trailer");
        assert_eq!(r.shelf.as_deref(), Some("Shelf 1 Row A"));
        assert_eq!(r.item_name, "Widget");
        assert_eq!(r.item_type.as_deref(), Some("Tool"));
        assert_eq!(r.stock, 5.0);
        assert_eq!(r.par, 10.0);
        assert_eq!(r.order_amount, 5.0);
        assert!(r.is_below_par);
        assert!(r.needs_order);
        assert_eq!(r.item_id, "Trailer - Shelf 1 Row A");
    }

    #[test]
    fn test_events_shelf_is_a_location() {
        assert!(!is_shelf_marker("Events Shelf"));
        assert_eq!(classify("Events Shelf", ""), RowKind::LocationHeader);

        let g = grid(&[
            HEADERS,
            &["Events Shelf", "", "", "", "", ""],
            &["", "Banner", "", "1", "1", "0"],
        ]);
        let records = parse_grid(&g);
        assert_eq!(records[0].location, "Events Shelf");
        assert_eq!(records[0].shelf, None);
    }

    #[test]
    fn test_item_without_context_is_unknown() {
        let g = grid(&[HEADERS, &["", "Bolt", "", "3", "1", ""]]);
        let records = parse_grid(&g);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, "Unknown");
        assert_eq!(records[0].shelf, None);
        assert_eq!(records[0].item_id, "Unknown");
        assert!(!records[0].needs_order);
    }

    #[test]
    fn test_shelf_marker_patterns() {
        assert!(is_shelf_marker("Shelf 1 Row A"));
        assert!(is_shelf_marker("SHELF2-ROW"));
        assert!(is_shelf_marker("Row 3"));
        assert!(is_shelf_marker("top row b"));
        assert!(is_shelf_marker("Row\t7"));
        assert!(!is_shelf_marker("Row"));
        assert!(!is_shelf_marker("Rows"));
        assert!(!is_shelf_marker("Row -"));
        assert!(!is_shelf_marker("Narrow"));
        assert!(!is_shelf_marker("Events Shelf"));
        assert!(!is_shelf_marker(""));
        // Known ambiguity: the heuristic treats these locations as shelves
        assert!(is_shelf_marker("Shelf Row Supplies"));
        assert!(is_shelf_marker("Narrow Closet"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("", ""), RowKind::Blank);
        assert_eq!(classify("Trailer", ""), RowKind::LocationHeader);
        assert_eq!(classify("Row 2", ""), RowKind::ShelfHeader);
        assert_eq!(classify("Row 2", "Rope"), RowKind::Item { own_shelf: true });
        assert_eq!(classify("", "Rope"), RowKind::Item { own_shelf: false });
        assert_eq!(classify("T-100", "Rope"), RowKind::Item { own_shelf: false });
    }

    #[test]
    fn test_new_location_resets_shelf() {
        let g = grid(&[
            HEADERS,
            &["Trailer", "", "", "", "", ""],
            &["Row 1", "", "", "", "", ""],
            &["", "Widget", "", "1", "1", "0"],
            &["Warehouse", "", "", "", "", ""],
            &["", "Gadget", "", "1", "1", "0"],
        ]);
        let records = parse_grid(&g);

        assert_eq!(records[0].shelf.as_deref(), Some("Row 1"));
        assert_eq!(records[1].location, "Warehouse");
        assert_eq!(records[1].shelf, None);
        assert_eq!(records[1].item_id, "Warehouse");
    }

    #[test]
    fn test_row_own_shelf_marker_sets_current_shelf() {
        let g = grid(&[
            HEADERS,
            &["Trailer", "", "", "", "", ""],
            &["Row 4", "Hammer", "", "2", "1", "0"],
            &["", "Nails", "", "100", "50", "0"],
        ]);
        let records = parse_grid(&g);

        assert_eq!(records[0].shelf.as_deref(), Some("Row 4"));
        assert_eq!(records[0].item_id, "Row 4");
        assert_eq!(records[1].shelf.as_deref(), Some("Row 4"));
        assert_eq!(records[1].location, "Trailer");
    }

    #[test]
    fn test_item_id_becomes_location_when_none_established() {
        let g = grid(&[
            HEADERS,
            &["Garage", "Shovel", "", "1", "1", "0"],
            &["", "Rake", "", "1", "1", "0"],
        ]);
        let records = parse_grid(&g);

        assert_eq!(records[0].location, "Garage");
        assert_eq!(records[0].item_id, "Garage");
        assert_eq!(records[1].location, "Garage");
    }

    #[test]
    fn test_item_id_ignored_as_location_once_established() {
        let g = grid(&[
            HEADERS,
            &["Trailer", "", "", "", "", ""],
            &["T-100", "Tarp", "", "1", "1", "0"],
        ]);
        let records = parse_grid(&g);
        assert_eq!(records[0].location, "Trailer");
        assert_eq!(records[0].item_id, "T-100");
    }

    #[test]
    fn test_shelf_marker_item_without_location_is_unknown() {
        let g = grid(&[
            HEADERS,
            &["Shelf 2 Row B", "Tape", "", "1", "1", "0"],
            &["", "Glue", "", "1", "1", "0"],
        ]);
        let records = parse_grid(&g);

        assert_eq!(records[0].location, "Unknown");
        assert_eq!(records[1].location, "Unknown");
        assert_eq!(records[1].item_id, "Unknown - Shelf 2 Row B");
    }

    #[test]
    fn test_blank_and_noise_rows_skipped() {
        let g = grid(&[
            HEADERS,
            &[],
            &["", "", "Tool", "4", "", ""],
            &["Trailer"],
            &["", "Widget", "", "1", "1", "0"],
        ]);
        let records = parse_grid(&g);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, "Trailer");
    }

    #[test]
    fn test_ragged_rows_and_missing_cells() {
        let g = grid(&[HEADERS, &["Trailer"], &["", "Widget"], &["", "Gadget", "Part", "7"]]);
        let records = parse_grid(&g);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].stock, 0.0);
        assert_eq!(records[0].item_type, None);
        assert_eq!(records[1].stock, 7.0);
        assert_eq!(records[1].par, 0.0);
        assert!(!records[1].is_below_par);
    }

    #[test]
    fn test_whitespace_type_and_infinite_stock() {
        let g = grid(&[HEADERS, &["Trailer", "Widget", "   ", "Infinity", "5", "0"]]);
        let records = parse_grid(&g);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.item_type.as_deref(), Some(""));
        // Non-finite quantities read as zero, so the item counts as below par
        assert_eq!(r.stock, 0.0);
        assert!(r.is_below_par);
        assert!(!r.needs_order);

        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["type"], "");
        assert_eq!(json["stock"], 0.0);
    }

    #[test]
    fn test_columns_discovered_in_any_order() {
        let g = grid(&[
            &["ORDER QTY", "Par", "itemname", "STOCK", "ItemID"],
            &["", "", "", "", "Van"],
            &["2", "6", "Cable", "4", ""],
        ]);
        let records = parse_grid(&g);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.item_name, "Cable");
        assert_eq!(r.location, "Van");
        assert_eq!(r.stock, 4.0);
        assert_eq!(r.par, 6.0);
        assert_eq!(r.order_amount, 2.0);
        // Type is positional: third column here is the item name column
        assert_eq!(r.item_type.as_deref(), Some("Cable"));
    }

    #[test]
    fn test_column_discovery_rules() {
        let cols = ColumnMap::discover(&["Item ID", "Item Name", "Stock Level", "Par ", "Order", "Reorder"]);
        assert_eq!(cols.item_id, Some(0));
        assert_eq!(cols.item_name, Some(1));
        assert_eq!(cols.stock, None);
        assert_eq!(cols.par, None);
        assert_eq!(cols.order_amount, Some(4));

        let cols = ColumnMap::discover::<&str>(&[]);
        assert_eq!(cols, ColumnMap::default());
    }

    #[test]
    fn test_missing_name_column_yields_nothing() {
        let g = grid(&[&["Item ID", "Stock"], &["Trailer", "1"], &["Widget", "2"]]);
        assert!(parse_grid(&g).is_empty());
    }

    #[test]
    fn test_cells_are_trimmed() {
        let g = grid(&[
            HEADERS,
            &["  Trailer  ", " ", "", "", "", ""],
            &["", "  Widget ", "  Tool ", " 5 ", "10", " 0"],
        ]);
        let records = parse_grid(&g);
        assert_eq!(records[0].location, "Trailer");
        assert_eq!(records[0].item_name, "Widget");
        assert_eq!(records[0].item_type.as_deref(), Some("Tool"));
        assert_eq!(records[0].stock, 5.0);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number("5"), 5.0);
        assert_eq!(coerce_number("  2.5"), 2.5);
        assert_eq!(coerce_number("12 units"), 12.0);
        assert_eq!(coerce_number("-3"), -3.0);
        assert_eq!(coerce_number("+4"), 4.0);
        assert_eq!(coerce_number(".5"), 0.5);
        assert_eq!(coerce_number("5."), 5.0);
        assert_eq!(coerce_number("1e3"), 1000.0);
        assert_eq!(coerce_number("2E-1x"), 0.2);
        assert_eq!(coerce_number("7e"), 7.0);
        assert_eq!(coerce_number("1,234"), 1.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("$5"), 0.0);
        assert_eq!(coerce_number("."), 0.0);
        assert_eq!(coerce_number("-"), 0.0);
        assert_eq!(coerce_number("1e999"), 0.0);
        assert_eq!(coerce_number("Infinity"), 0.0);
        assert_eq!(coerce_number("-Infinity"), 0.0);
        assert!(coerce_number("-0").is_sign_positive());
    }

    #[test]
    fn test_synthesize_item_id() {
        assert_eq!(synthesize_item_id("Trailer", None), "Trailer");
        assert_eq!(synthesize_item_id("Trailer", Some("Row 1")), "Trailer - Row 1");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let g = grid(&[
            HEADERS,
            &["Garage", "Shovel", "", "1", "3", "2"],
            &["Row 1", "", "", "", "", ""],
            &["", "Rake", "", "1", "1", "0"],
        ]);
        assert_eq!(parse_grid(&g), parse_grid(&g));
    }

    fn cell_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "", " ", "Trailer", "Events Shelf", "Shelf 1 Row A", "Row 3", "Widget", "Bolt",
            "5", "10.5", "-2", "abc", "3 boxes",
        ])
        .prop_map(str::to_string)
    }

    fn grid_strategy() -> impl Strategy<Value = RawGrid> {
        prop::collection::vec(prop::collection::vec(cell_strategy(), 0..7), 0..25).prop_map(
            |mut rows| {
                rows.insert(0, HEADERS.iter().map(|h| h.to_string()).collect());
                rows
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: grids without data rows never produce records.
        #[test]
        fn short_grids_are_empty(
            header in prop::collection::vec(cell_strategy(), 0..7),
            with_header in any::<bool>()
        ) {
            let g: RawGrid = if with_header { vec![header] } else { Vec::new() };
            prop_assert!(parse_grid(&g).is_empty());
        }

        /// Property: records always carry a name and a location, and the
        /// flags agree with the quantities.
        #[test]
        fn records_are_well_formed(g in grid_strategy()) {
            for r in parse_grid(&g) {
                prop_assert!(!r.item_name.is_empty());
                prop_assert!(!r.location.is_empty());
                prop_assert!(!r.item_id.is_empty());
                prop_assert_eq!(r.is_below_par, r.stock < r.par);
                prop_assert_eq!(r.needs_order, r.order_amount > 0.0);
            }
        }

        /// Property: output order follows source row order.
        #[test]
        fn records_follow_row_order(g in grid_strategy()) {
            let expected: Vec<String> = g[1..]
                .iter()
                .filter_map(|row| row.get(1).map(|s| s.trim().to_string()))
                .filter(|name| !name.is_empty())
                .collect();
            let names: Vec<String> = parse_grid(&g).into_iter().map(|r| r.item_name).collect();
            prop_assert_eq!(names, expected);
        }

        /// Property: parsing is deterministic.
        #[test]
        fn parse_is_deterministic(g in grid_strategy()) {
            prop_assert_eq!(parse_grid(&g), parse_grid(&g));
        }
    }
}
