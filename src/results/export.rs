//! CSV Export
//!
//! Serializes result rows for download. The header comes from the keys of the
//! first row and every row is written in that column order. Fields are quoted
//! only when they contain a delimiter, a quote or a line break; records are
//! joined with `\n` and the output has no trailing newline.

use crate::models::RowObject;
use crate::types::{AppError, AppResult};
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

pub const EXPORT_FILENAME: &str = "incident_data.csv";
pub const EXPORT_MIME: &str = "text/csv;charset=utf-8;";

/// A CSV document ready to be offered as a download
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: &'static str,
    pub mime: &'static str,
    pub content: String,
}

impl CsvExport {
    /// Build the export for `rows`; `None` when there is nothing to export
    pub fn from_rows(rows: &[&RowObject]) -> AppResult<Option<Self>> {
        Ok(to_csv(rows)?.map(|content| Self {
            filename: EXPORT_FILENAME,
            mime: EXPORT_MIME,
            content,
        }))
    }

    /// Write the document into `dir`, returning the written path
    pub async fn write_to(&self, dir: &Path) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.filename);
        tokio::fs::write(&path, self.content.as_bytes()).await?;
        info!("Exported {} bytes of {} to {:?}", self.content.len(), self.mime, path);
        Ok(path)
    }
}

/// Serialize rows to CSV text; `None` for an empty slice
pub fn to_csv(rows: &[&RowObject]) -> AppResult<Option<String>> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    write_row(&mut writer, headers.iter().map(|h| h.to_string()).collect())?;
    for row in rows {
        write_row(
            &mut writer,
            headers.iter().map(|h| csv_field(row.get(*h))).collect(),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV buffer flush failed: {}", e)))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("CSV output is not UTF-8: {}", e)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(Some(text))
}

/// Write one record. A lone empty field becomes an empty line; the csv
/// writer would emit `""` for it.
fn write_row(writer: &mut Writer<Vec<u8>>, fields: Vec<String>) -> AppResult<()> {
    if let [only] = fields.as_slice() {
        if only.is_empty() {
            writer.flush()?;
            writer.get_mut().push(b'\n');
            return Ok(());
        }
    }
    writer.write_record(&fields)?;
    Ok(())
}

fn csv_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => float_text(f),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Shortest decimal form; exponent notation (`1e+21`, `1.5e-7`) outside
/// `1e-6 <= |f| < 1e21`, the way JavaScript prints numbers.
fn float_text(f: f64) -> String {
    let magnitude = f.abs();
    if f.is_finite() && magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{:e}", f);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else {
        f.to_string()
    }
}
