//! History export
//!
//! Renders the persisted document for backup or spreadsheet use:
//! - `csv`: one row per history entry, newest first
//! - `json`: the full document (inputs + history), pretty-printed

use crate::storage::error::StorageError;
use crate::storage::types::{HistoryEntry, PersistedDocument};
use chrono::SecondsFormat;
use std::str::FromStr;
use thiserror::Error;

/// CSV header row
pub const CSV_HEADER: [&str; 6] = [
    "id",
    "timestamp",
    "standard_amount",
    "standard_volume",
    "target_volume",
    "result",
];

/// Export output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unknown export format: {0} (expected csv or json)")]
    UnknownFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output is not valid UTF-8")]
    Encoding,
}

/// Render `doc` in the requested format
pub fn export_document(doc: &PersistedDocument, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => history_to_csv(&doc.history),
        ExportFormat::Json => Ok(doc.to_json_pretty()?),
    }
}

/// Render history entries as CSV
pub fn history_to_csv(history: &[HistoryEntry]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for entry in history {
        writer.write_record([
            entry.id.clone(),
            format_timestamp(entry.timestamp),
            entry.standard_amount.to_string(),
            entry.standard_volume.to_string(),
            entry.target_volume.to_string(),
            entry.result.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
}

/// RFC 3339 UTC rendering of a millisecond timestamp
fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| timestamp.to_string())
}
