//! Table formatting utilities for CLI list output
//!
//! Rows are built from typed cells so that each output format can render a
//! value its own way: colored and padded for terminals, escaped for CSV,
//! pipe-safe for Markdown.
//!
//! # Text Wrapping
//!
//! - Use `TableConfig::with_wrap(width)` to enable word-wrapped multi-line rows
//! - CSV and ID formats remain single-line for pipability

use console::style;

use crate::cli::helpers::{escape_csv, format_quantity, truncate_str};
use crate::cli::OutputFormat;

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Maximum width for text columns before wrapping (None = truncate instead)
    pub wrap_width: Option<usize>,
    /// Show summary line after table (e.g., "5 item(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            wrap_width: None,
            show_summary: true,
        }
    }
}

impl TableConfig {
    /// Create config with text wrapping enabled at the specified width
    pub fn with_wrap(width: usize) -> Self {
        Self {
            wrap_width: Some(width),
            show_summary: true,
        }
    }

    /// Create config optimized for piping (no wrapping, no summary)
    pub fn for_pipe() -> Self {
        Self {
            wrap_width: None,
            show_summary: false,
        }
    }
}

/// Wrap text to fit within a maximum width, breaking at word boundaries
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if text.chars().count() <= max_width || max_width < 5 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let current_len = current_line.chars().count();
        let word_len = word.chars().count();

        if current_line.is_empty() || current_len + 1 + word_len > max_width {
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
            // Force-break words longer than the line
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(max_width).peekable();
            while let Some(chunk) = chunks.next() {
                let piece: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    lines.push(piece);
                } else {
                    current_line = piece;
                }
            }
        } else {
            current_line.push(' ');
            current_line.push_str(word);
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Item ID (cyan)
    Id(String),
    /// Plain text, truncated to the column
    Text(String),
    /// Item type or category
    Type(String),
    /// Stock or par quantity
    Quantity(f64),
    /// Order amount (yellow when an order is needed)
    OrderQuantity(f64),
    /// Below-par flag (yes=red bold, no=dim)
    BelowPar(bool),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => {
                let display = truncate_str(id, width.saturating_sub(2));
                format!("{:<width$}", style(display).cyan(), width = width)
            }
            CellValue::Text(s) | CellValue::Type(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Quantity(q) => {
                format!("{:>width$}", format_quantity(*q), width = width)
            }
            CellValue::OrderQuantity(q) => {
                let text = format_quantity(*q);
                let styled = if *q > 0.0 {
                    style(text).yellow()
                } else {
                    style(text).dim()
                };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::BelowPar(below) => {
                let styled = if *below {
                    style("yes").red().bold()
                } else {
                    style("no").dim()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) | CellValue::Type(s) => escape_csv(s),
            CellValue::Quantity(q) | CellValue::OrderQuantity(q) => format_quantity(*q),
            CellValue::BelowPar(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::BelowPar(true) => "**yes**".to_string(),
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) | CellValue::Type(s) => s.clone(),
            CellValue::Quantity(q) | CellValue::OrderQuantity(q) => format_quantity(*q),
            CellValue::BelowPar(b) => if *b { "yes" } else { "no" }.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::BelowPar(_) => 3, // "yes" or "no"
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }

    fn wraps(&self) -> bool {
        matches!(self, CellValue::Text(_) | CellValue::Type(_))
    }
}

/// Column definition with header label and width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that renders rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    noun: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], noun: &'static str) -> Self {
        Self {
            columns,
            noun,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Print rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat, visible_columns: &[&str])
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();
        print!("{}", self.render(&rows, format, visible_columns));
    }

    /// Render rows in the specified format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat, visible_columns: &[&str]) -> String {
        let visible: Vec<&ColumnDef> = self
            .columns
            .iter()
            .filter(|c| visible_columns.contains(&c.key))
            .collect();

        let mut out = String::new();
        match format {
            OutputFormat::Csv => self.render_csv(&mut out, rows, &visible),
            OutputFormat::Md => self.render_md(&mut out, rows, &visible),
            OutputFormat::Id => {
                for row in rows {
                    out.push_str(&row.id);
                    out.push('\n');
                }
            }
            _ => self.render_tsv(&mut out, rows, &visible),
        }
        out
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow], visible: &[&ColumnDef]) -> Vec<usize> {
        visible
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                // +2 keeps room for truncate_str's "..." budget
                let natural_width = col.header.len().max(max_content.saturating_add(2));
                natural_width.min(col.width)
            })
            .collect()
    }

    fn render_tsv(&self, out: &mut String, rows: &[TableRow], visible: &[&ColumnDef]) {
        let widths = self.calculate_widths(rows, visible);

        let header: Vec<String> = visible
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        out.push_str(header.join(" ").trim_end());
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            match self.config.wrap_width {
                Some(wrap_width) => self.render_tsv_row_wrapped(out, row, visible, &widths, wrap_width),
                None => {
                    let parts: Vec<String> = visible
                        .iter()
                        .zip(&widths)
                        .map(|(col, w)| match row.get(col.key) {
                            Some(value) => value.format_tsv(*w),
                            None => CellValue::Empty.format_tsv(*w),
                        })
                        .collect();
                    out.push_str(parts.join(" ").trim_end());
                    out.push('\n');
                }
            }
        }

        if self.config.show_summary {
            out.push('\n');
            out.push_str(&format!("{} {}(s) found.\n", style(rows.len()).cyan(), self.noun));
        }
    }

    fn render_tsv_row_wrapped(
        &self,
        out: &mut String,
        row: &TableRow,
        visible: &[&ColumnDef],
        widths: &[usize],
        wrap_width: usize,
    ) {
        let wrapped_cells: Vec<Vec<String>> = visible
            .iter()
            .map(|col| match row.get(col.key) {
                Some(value) if value.wraps() => wrap_text(&value.raw(), wrap_width),
                Some(value) => vec![value.raw()],
                None => vec!["-".to_string()],
            })
            .collect();

        let max_lines = wrapped_cells.iter().map(|c| c.len()).max().unwrap_or(1);

        for line_idx in 0..max_lines {
            let parts: Vec<String> = wrapped_cells
                .iter()
                .zip(widths)
                .map(|(lines, w)| {
                    let content = lines.get(line_idx).map(|s| s.as_str()).unwrap_or("");
                    format!("{:<width$}", content, width = (*w).max(wrap_width.min(content.len())))
                })
                .collect();
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        // Blank line between multi-line rows for readability
        if max_lines > 1 {
            out.push('\n');
        }
    }

    fn render_csv(&self, out: &mut String, rows: &[TableRow], visible: &[&ColumnDef]) {
        let headers: Vec<&str> = visible.iter().map(|c| c.key).collect();
        out.push_str(&headers.join(","));
        out.push('\n');

        for row in rows {
            let values: Vec<String> = visible
                .iter()
                .map(|col| row.get(col.key).map(|v| v.format_csv()).unwrap_or_default())
                .collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }
    }

    fn render_md(&self, out: &mut String, rows: &[TableRow], visible: &[&ColumnDef]) {
        let headers: Vec<&str> = visible.iter().map(|c| c.header).collect();
        out.push_str(&format!("| {} |\n", headers.join(" | ")));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        out.push_str(&format!("|{}|\n", separators.join("|")));

        for row in rows {
            let values: Vec<String> = visible
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(|v| v.format_md())
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            out.push_str(&format!("| {} |\n", values.join(" | ")));
        }
    }
}
