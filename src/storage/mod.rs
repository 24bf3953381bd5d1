//! Dosage Converter Storage
//!
//! This module provides the durable side of the calculator:
//!
//! - **types**: Persisted shapes (InputState, HistoryEntry, PersistedDocument)
//! - **backend**: The `DocumentStore` slot and its file / in-memory backends
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Save Path:
//!   DosageStore mutation → PersistedDocument → JSON → slot (full overwrite)
//!
//! Load Path:
//!   slot → JSON → PersistedDocument → DosageStore (or defaults if corrupt)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use dosage_converter::storage::{DocumentStore, FileStore, InputState, PersistedDocument};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut slot = FileStore::new("./dosage_data", "dosage-converter-storage");
//!
//!     slot.save(&PersistedDocument::new(InputState::new("200", "200", "10"), Vec::new()))?;
//!
//!     if let Some(doc) = slot.load()? {
//!         println!("Saved target volume: {}", doc.last_input.target_volume);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use backend::{DocumentStore, FileStore, MemoryStore, DEFAULT_STORAGE_KEY};
pub use error::{StorageError, StorageResult};
pub use types::{Field, HistoryEntry, InputState, PersistedDocument};
