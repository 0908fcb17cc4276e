//! Query Result Views
//!
//! Turns the rows returned by the chat endpoint into something displayable:
//! a key/value list for a single row, a table for several rows. Rows with no
//! meaningful value are dropped first.
//!
//! The table takes its columns from the first remaining row; keys that only
//! appear in later rows are not shown.

pub mod export;

pub use export::{to_csv, CsvExport, EXPORT_FILENAME, EXPORT_MIME};

use crate::models::RowObject;
use serde_json::{Number, Value};

pub const NO_DATA: &str = "No data found.";
const EMPTY_CELL: &str = "-";

/// Display form of a query result
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// Nothing worth showing
    NoData,
    /// One row as `key: value` pairs, in the row's key order
    KeyValue(Vec<(String, String)>),
    /// Several rows; offers CSV export
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl ResultView {
    /// Build the view for a result set
    pub fn from_rows(rows: &[RowObject]) -> Self {
        let valid = valid_rows(rows);

        match valid.as_slice() {
            [] => ResultView::NoData,
            [row] => ResultView::KeyValue(
                row.iter()
                    .map(|(k, v)| (k.clone(), display_value(v)))
                    .collect(),
            ),
            [first, ..] => {
                let headers: Vec<String> = first.keys().cloned().collect();
                let rows = valid
                    .iter()
                    .map(|row| {
                        headers
                            .iter()
                            .map(|h| table_cell(row.get(h)))
                            .collect()
                    })
                    .collect();
                ResultView::Table { headers, rows }
            }
        }
    }

    /// Whether a download control applies to this view
    pub fn exportable(&self) -> bool {
        matches!(self, ResultView::Table { .. })
    }

    /// Table title, e.g. `Results (3 rows)`
    pub fn title(&self) -> Option<String> {
        match self {
            ResultView::Table { rows, .. } => Some(format!("Results ({} rows)", rows.len())),
            _ => None,
        }
    }

    /// Plain-text rendering, one entry per output line
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            ResultView::NoData => vec![NO_DATA.to_string()],
            ResultView::KeyValue(pairs) => pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect(),
            ResultView::Table { headers, rows } => {
                let mut lines = Vec::with_capacity(rows.len() + 2);
                if let Some(title) = self.title() {
                    lines.push(title);
                }
                lines.extend(layout_table(headers, rows));
                lines
            }
        }
    }
}

/// Rows that have at least one value other than null or the empty string
pub fn valid_rows(rows: &[RowObject]) -> Vec<&RowObject> {
    rows.iter()
        .filter(|row| row.values().any(|v| !is_blank(v)))
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Value as shown in the key/value view
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Value as shown in a table cell; missing, null, empty and `false` show `-`
fn table_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => EMPTY_CELL.to_string(),
        Some(Value::String(s)) if s.is_empty() => EMPTY_CELL.to_string(),
        Some(v) => display_value(v),
    }
}

/// en-US style number: digit grouping, at most three fraction digits
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return group_integer(&i.unsigned_abs().to_string(), i < 0);
    }
    if let Some(u) = n.as_u64() {
        return group_integer(&u.to_string(), false);
    }

    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if !f.is_finite() {
        return n.to_string();
    }

    let fixed = format!("{:.3}", f.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    let negative = f < 0.0 && (int_part != "0" || !frac_part.is_empty());

    let mut out = group_integer(int_part, negative);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_integer(digits: &str, negative: bool) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Align a table into fixed-width text lines: header, rule, rows
pub fn layout_table(headers: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(headers));
    lines.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );
    lines.extend(rows.iter().map(|row| render(row)));
    lines
}
