//! # Dosage Converter
//!
//! Scales a label dilution ratio (concentrate amount per carrier volume) to
//! the volume you actually want to treat, and keeps a local history of
//! past calculations.
//!
//! ## Modules
//!
//! - [`calculator`]: Pure number parsing and dosage derivation
//! - [`store`]: The state manager (inputs, result, history, persistence)
//! - [`storage`]: Persisted document types and storage backends
//! - [`export`]: CSV / JSON history export
//! - [`config`]: TOML + environment configuration
//! - [`logging`]: `tracing` subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dosage_converter::{DosageStore, FileStore};
//!
//! let mut store = DosageStore::open(FileStore::new("./dosage_data", "dosage-converter-storage"));
//!
//! // Label says 200 cc per 200 L; we are mixing a 10 L tank
//! store.set_standard_amount("200");
//! store.set_standard_volume("200");
//! store.set_target_volume("10");
//!
//! assert_eq!(store.result(), Some(10.0));
//!
//! // Keep it for later
//! store.add_to_history();
//! println!("{} saved calculations", store.history().len());
//! ```

pub mod calculator;
pub mod config;
pub mod export;
pub mod logging;
pub mod storage;
pub mod store;

// Re-export top-level types for convenience
pub use calculator::{compute_result, format_dose, is_acceptable_input, parse_number, DosageInputs};

pub use store::{DosageStore, LoadState};

pub use storage::{
    DocumentStore, Field, FileStore, HistoryEntry, InputState, MemoryStore, PersistedDocument,
    StorageError, StorageResult, DEFAULT_STORAGE_KEY,
};

pub use export::{export_document, history_to_csv, ExportError, ExportFormat};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig, StorageConfig};

pub use logging::{init_logging, LogFormat, LoggingError};
