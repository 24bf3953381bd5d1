//! Core data types for the dosage store
//!
//! This module defines the shapes that live in memory and on disk:
//! - `InputState`: the three raw text fields as typed by the user
//! - `HistoryEntry`: one committed calculation
//! - `PersistedDocument`: the single unit of durable storage
//!
//! Field names serialize in camelCase so documents written by the browser
//! version of the calculator load unchanged.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

use crate::storage::error::{StorageError, StorageResult};

/// Which of the three input fields an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Concentrate amount printed on the label (cc)
    StandardAmount,
    /// Carrier volume the label amount is meant for (L)
    StandardVolume,
    /// Carrier volume the user wants to treat (L)
    TargetVolume,
}

impl Field {
    /// Get all fields for iteration
    pub fn all() -> &'static [Field] {
        &[
            Field::StandardAmount,
            Field::StandardVolume,
            Field::TargetVolume,
        ]
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::StandardAmount => write!(f, "standard amount"),
            Field::StandardVolume => write!(f, "standard volume"),
            Field::TargetVolume => write!(f, "target volume"),
        }
    }
}

/// Raw text inputs
///
/// Kept as text so a half-typed value ("1.", "") never corrupts state.
/// Parsing happens only when the result is derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InputState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub standard_amount: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub standard_volume: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_volume: String,
}

impl InputState {
    /// Create an input state from three text values
    pub fn new(
        standard_amount: impl Into<String>,
        standard_volume: impl Into<String>,
        target_volume: impl Into<String>,
    ) -> Self {
        Self {
            standard_amount: standard_amount.into(),
            standard_volume: standard_volume.into(),
            target_volume: target_volume.into(),
        }
    }

    /// Read one field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::StandardAmount => &self.standard_amount,
            Field::StandardVolume => &self.standard_volume,
            Field::TargetVolume => &self.target_volume,
        }
    }

    /// Replace one field verbatim
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::StandardAmount => &mut self.standard_amount,
            Field::StandardVolume => &mut self.standard_volume,
            Field::TargetVolume => &mut self.target_volume,
        };
        *slot = value.into();
    }

    /// True when every field is empty
    pub fn is_blank(&self) -> bool {
        Field::all().iter().all(|&f| self.get(f).is_empty())
    }
}

/// A committed calculation
///
/// Immutable once created. Ids are random v4 UUIDs rendered as strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique identifier
    pub id: String,
    /// Unix timestamp in milliseconds (fractional values are truncated)
    #[serde(deserialize_with = "millis_from_number")]
    pub timestamp: i64,
    pub standard_amount: f64,
    pub standard_volume: f64,
    pub target_volume: f64,
    /// Dosage computed for the target volume
    pub result: f64,
}

impl HistoryEntry {
    /// Create an entry with a fresh id and the current time
    pub fn new(
        standard_amount: f64,
        standard_volume: f64,
        target_volume: f64,
        result: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            standard_amount,
            standard_volume,
            target_volume,
            result,
        }
    }

    /// Builder method: set timestamp
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder method: set id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// The whole durable state: last inputs plus history, newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_input: InputState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<HistoryEntry>,
}

impl PersistedDocument {
    pub fn new(last_input: InputState, history: Vec<HistoryEntry>) -> Self {
        Self {
            last_input,
            history,
        }
    }

    /// Decode a document from its JSON text
    ///
    /// Anything that is not a well-formed document is reported as
    /// corruption; callers treat that the same as a missing document.
    pub fn from_json(text: &str) -> StorageResult<Self> {
        serde_json::from_str(text).map_err(|e| StorageError::Corruption(e.to_string()))
    }

    /// Encode as compact JSON
    pub fn to_json(&self) -> StorageResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as indented JSON (for export)
    pub fn to_json_pretty(&self) -> StorageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read `null` as the type's default; each section restores on its own
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept integer or fractional millisecond timestamps
fn millis_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("timestamp must be finite"));
    }
    Ok(value.trunc() as i64)
}
