//! Dosage State Manager
//!
//! `DosageStore` owns the three raw inputs, the derived result and the
//! history log, and mirrors all of it to a `DocumentStore` backend.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──► Uninitialized ──load()──► Loaded
//! ```
//!
//! Nothing is written to the backend while the store is uninitialized, so
//! defaults can never clobber a saved document before it has been read.
//! Once loaded, every mutation rewrites the whole document.

use crate::calculator::{compute_result, is_acceptable_input, DosageInputs};
use crate::storage::backend::DocumentStore;
use crate::storage::types::{Field, HistoryEntry, InputState, PersistedDocument};

/// Whether the persisted document has been read yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Load not attempted; state must not be persisted
    Uninitialized,
    /// Load attempted (the document may have been missing or corrupt)
    Loaded,
}

/// Calculator state with write-through persistence
pub struct DosageStore<S: DocumentStore> {
    backend: S,
    values: InputState,
    result: Option<f64>,
    history: Vec<HistoryEntry>,
    state: LoadState,
}

impl<S: DocumentStore> DosageStore<S> {
    /// Create an uninitialized store with empty defaults
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            values: InputState::default(),
            result: None,
            history: Vec::new(),
            state: LoadState::Uninitialized,
        }
    }

    /// Create a store and load it immediately
    pub fn open(backend: S) -> Self {
        let mut store = Self::new(backend);
        store.load();
        store
    }

    /// Restore state from the backend
    ///
    /// A missing or unreadable document leaves the defaults in place. The
    /// store is marked loaded either way. Calling this again is a no-op.
    pub fn load(&mut self) {
        if self.state == LoadState::Loaded {
            tracing::debug!("Store already loaded, ignoring load request");
            return;
        }

        match self.backend.load() {
            Ok(Some(doc)) => {
                tracing::debug!(
                    "Restored inputs and {} history entries",
                    doc.history.len()
                );
                self.values = doc.last_input;
                self.history = doc.history;
            }
            Ok(None) => {
                tracing::debug!("No saved document, starting empty");
            }
            Err(e) => {
                tracing::warn!("Failed to read saved document, starting empty: {}", e);
                self.values = InputState::default();
                self.history.clear();
            }
        }

        self.recompute();
        self.state = LoadState::Loaded;
    }

    /// Current raw inputs
    pub fn values(&self) -> &InputState {
        &self.values
    }

    /// Derived dosage, if the inputs produce one
    pub fn result(&self) -> Option<f64> {
        self.result
    }

    /// Committed calculations, newest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Look up a history entry by id
    pub fn entry(&self, id: &str) -> Option<&HistoryEntry> {
        self.history.iter().find(|e| e.id == id)
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// Snapshot of what gets persisted
    pub fn document(&self) -> PersistedDocument {
        PersistedDocument::new(self.values.clone(), self.history.clone())
    }

    /// Get the backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Consume the store and hand back its backend
    pub fn into_backend(self) -> S {
        self.backend
    }

    pub fn set_standard_amount(&mut self, text: impl Into<String>) {
        self.set_field(Field::StandardAmount, text);
    }

    pub fn set_standard_volume(&mut self, text: impl Into<String>) {
        self.set_field(Field::StandardVolume, text);
    }

    pub fn set_target_volume(&mut self, text: impl Into<String>) {
        self.set_field(Field::TargetVolume, text);
    }

    /// Replace a field verbatim
    ///
    /// No validation happens here; callers that take user input should use
    /// `try_set`.
    pub fn set_field(&mut self, field: Field, text: impl Into<String>) {
        self.values.set(field, text);
        self.recompute();
        self.persist();
    }

    /// Replace a field if the text is empty or a non-negative number
    ///
    /// Returns `false` and leaves state untouched otherwise.
    pub fn try_set(&mut self, field: Field, text: &str) -> bool {
        if !is_acceptable_input(text) {
            tracing::debug!("Rejected {} input {:?}", field, text);
            return false;
        }
        self.set_field(field, text);
        true
    }

    /// Commit the current calculation to the front of the history
    ///
    /// No-op returning `None` when there is no result.
    pub fn add_to_history(&mut self) -> Option<&HistoryEntry> {
        let result = self.result?;
        let inputs = DosageInputs::parse(&self.values)?;

        let entry = HistoryEntry::new(
            inputs.standard_amount,
            inputs.standard_volume,
            inputs.target_volume,
            result,
        );
        tracing::debug!("Adding history entry {} (result {})", entry.id, result);

        self.history.insert(0, entry);
        self.persist();
        self.history.first()
    }

    /// Drop every history entry; inputs are kept
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist();
    }

    /// Remove the entry with `id`
    ///
    /// Returns whether an entry was removed.
    pub fn delete_history_item(&mut self, id: &str) -> bool {
        let before = self.history.len();
        self.history.retain(|e| e.id != id);
        let removed = self.history.len() != before;
        self.persist();
        removed
    }

    fn recompute(&mut self) {
        self.result = compute_result(&self.values);
    }

    fn persist(&mut self) {
        if self.state != LoadState::Loaded {
            return;
        }

        let doc = self.document();
        if let Err(e) = self.backend.save(&doc) {
            tracing::warn!("Failed to save document: {}", e);
        }
    }
}

impl<S: DocumentStore + std::fmt::Debug> std::fmt::Debug for DosageStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DosageStore")
            .field("backend", &self.backend)
            .field("values", &self.values)
            .field("result", &self.result)
            .field("history", &self.history.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::{FileStore, MemoryStore};
    use crate::storage::error::{StorageError, StorageResult};

    /// Backend whose writes always fail
    struct ReadOnlyStore;

    impl DocumentStore for ReadOnlyStore {
        fn load(&self) -> StorageResult<Option<PersistedDocument>> {
            Ok(None)
        }

        fn save(&mut self, _doc: &PersistedDocument) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn loaded_store() -> DosageStore<MemoryStore> {
        DosageStore::open(MemoryStore::new())
    }

    fn enter(store: &mut DosageStore<MemoryStore>, a: &str, v: &str, t: &str) {
        store.set_standard_amount(a);
        store.set_standard_volume(v);
        store.set_target_volume(t);
    }

    #[test]
    fn test_starts_uninitialized() {
        let store = DosageStore::new(MemoryStore::new());
        assert_eq!(store.load_state(), LoadState::Uninitialized);
        assert!(!store.is_loaded());
        assert!(store.values().is_blank());
        assert!(store.result().is_none());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_result_follows_inputs() {
        let mut store = loaded_store();

        enter(&mut store, "200", "200", "10");
        assert_eq!(store.result(), Some(10.0));

        store.set_standard_volume("0");
        assert_eq!(store.result(), None);

        store.set_standard_volume("100");
        assert_eq!(store.result(), Some(20.0));

        store.set_target_volume("");
        assert_eq!(store.result(), None);
    }

    #[test]
    fn test_add_to_history_without_result_is_noop() {
        let mut store = loaded_store();
        enter(&mut store, "200", "0", "10");
        let saves = store.backend().save_count();

        assert!(store.add_to_history().is_none());
        assert!(store.history().is_empty());
        assert_eq!(store.backend().save_count(), saves);
    }

    #[test]
    fn test_add_to_history_prepends() {
        let mut store = loaded_store();

        enter(&mut store, "10", "10", "5");
        let first_id = store.add_to_history().unwrap().id.clone();
        assert_eq!(store.history()[0].result, 5.0);

        enter(&mut store, "200", "200", "10");
        let second = store.add_to_history().unwrap().clone();

        assert_eq!(store.history().len(), 2);
        assert_eq!(store.history()[0], second);
        assert_eq!(second.result, 10.0);
        assert_eq!(second.standard_amount, 200.0);
        assert_eq!(second.standard_volume, 200.0);
        assert_eq!(second.target_volume, 10.0);
        assert_eq!(store.history()[1].id, first_id);
        assert_ne!(second.id, first_id);
        assert!(second.timestamp >= store.history()[1].timestamp);
    }

    #[test]
    fn test_delete_history_item() {
        let mut store = loaded_store();
        for t in ["1", "2", "3"] {
            enter(&mut store, "10", "10", t);
            store.add_to_history();
        }
        let ids: Vec<String> = store.history().iter().map(|e| e.id.clone()).collect();

        assert!(store.delete_history_item(&ids[1]));
        let remaining: Vec<&str> = store.history().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str()]);

        assert!(!store.delete_history_item("no-such-id"));
        assert_eq!(store.history().len(), 2);
        assert!(store.entry(&ids[1]).is_none());
        assert!(store.entry(&ids[2]).is_some());
    }

    #[test]
    fn test_clear_history_keeps_inputs() {
        let mut store = loaded_store();
        enter(&mut store, "200", "200", "10");
        store.add_to_history();
        store.add_to_history();

        store.clear_history();

        assert!(store.history().is_empty());
        assert_eq!(store.values(), &InputState::new("200", "200", "10"));
        assert_eq!(store.result(), Some(10.0));

        store.clear_history();
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_try_set_rejects_negative() {
        let mut store = loaded_store();

        assert!(store.try_set(Field::StandardAmount, "20"));
        assert!(!store.try_set(Field::StandardAmount, "-5"));
        assert!(!store.try_set(Field::StandardAmount, "abc"));
        assert_eq!(store.values().standard_amount, "20");

        assert!(store.try_set(Field::StandardAmount, ""));
        assert_eq!(store.values().standard_amount, "");
    }

    #[test]
    fn test_set_field_is_verbatim() {
        let mut store = loaded_store();
        store.set_field(Field::TargetVolume, " 12 L ");
        assert_eq!(store.values().target_volume, " 12 L ");
    }

    #[test]
    fn test_nothing_persisted_before_load() {
        let saved = PersistedDocument::new(InputState::new("1", "2", "3"), Vec::new());
        let backend = MemoryStore::with_document(&saved).unwrap();
        let mut store = DosageStore::new(backend);

        store.set_standard_amount("99");
        assert_eq!(store.backend().save_count(), 0);

        store.load();
        assert!(store.is_loaded());
        assert_eq!(store.values(), &InputState::new("1", "2", "3"));
        assert_eq!(store.result(), Some(1.5));
    }

    #[test]
    fn test_every_change_persists_after_load() {
        let mut store = loaded_store();
        assert_eq!(store.backend().save_count(), 0);

        enter(&mut store, "200", "200", "10");
        assert_eq!(store.backend().save_count(), 3);

        store.add_to_history();
        store.clear_history();
        assert_eq!(store.backend().save_count(), 5);

        let persisted = store.backend().load().unwrap().unwrap();
        assert_eq!(persisted, store.document());
    }

    #[test]
    fn test_reload_round_trip() {
        let mut store = loaded_store();
        enter(&mut store, "10", "10", "5");
        store.add_to_history();
        enter(&mut store, "200", "200", "10");
        store.add_to_history();
        store.set_target_volume("7.5");

        let values = store.values().clone();
        let history = store.history().to_vec();

        // Simulated restart
        let restored = DosageStore::open(store.into_backend());

        assert_eq!(restored.values(), &values);
        assert_eq!(restored.history(), history.as_slice());
        assert_eq!(restored.result(), Some(7.5));
    }

    #[test]
    fn test_reload_keeps_inexact_floats() {
        let mut store = loaded_store();
        for n in 1..=40 {
            for (a, v, t) in [(n, 3, 11), (7, n, 3), (n * 13, 7, n)] {
                let (a, v, t) = (a as f64 / 7.0, v as f64 / 3.0, t as f64 / 11.0);
                enter(&mut store, &a.to_string(), &v.to_string(), &t.to_string());
                store.add_to_history();
            }
        }
        let history = store.history().to_vec();
        assert_eq!(history.len(), 120);

        let restored = DosageStore::open(store.into_backend());

        for (before, after) in history.iter().zip(restored.history()) {
            assert_eq!(before.result.to_bits(), after.result.to_bits(), "entry {}", before.id);
            assert_eq!(before.target_volume.to_bits(), after.target_volume.to_bits());
        }
        assert_eq!(restored.history(), history.as_slice());
    }

    #[test]
    fn test_null_input_section_keeps_history() {
        let payload = r#"{"lastInput":null,"history":[{"id":"a","timestamp":1700000000000,"standardAmount":1,"standardVolume":2,"targetVolume":3,"result":1.5}]}"#;
        let store = DosageStore::open(MemoryStore::with_payload(payload));

        assert!(store.is_loaded());
        assert!(store.values().is_blank());
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.entry("a").map(|e| e.result), Some(1.5));
    }

    #[test]
    fn test_corrupt_payload_loads_defaults() {
        let mut store = DosageStore::open(MemoryStore::with_payload("{\"lastInput\": [oops"));

        assert!(store.is_loaded());
        assert!(store.values().is_blank());
        assert!(store.history().is_empty());
        assert!(store.result().is_none());

        // Still usable, and the next change replaces the bad payload
        enter(&mut store, "200", "200", "10");
        assert_eq!(store.result(), Some(10.0));
        assert_ne!(store.backend().payload(), Some("{\"lastInput\": [oops"));
        assert!(store.backend().load().unwrap().is_some());
    }

    #[test]
    fn test_file_backed_restart() {
        let dir = tempfile::tempdir().unwrap();

        let history = {
            let mut store = DosageStore::open(FileStore::new(dir.path(), "k"));
            store.set_standard_amount("20");
            store.set_standard_volume("1");
            store.set_target_volume("16");
            store.add_to_history();
            store.history().to_vec()
        };

        let store = DosageStore::open(FileStore::new(dir.path(), "k"));
        assert_eq!(store.values(), &InputState::new("20", "1", "16"));
        assert_eq!(store.result(), Some(320.0));
        assert_eq!(store.history(), history.as_slice());
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut store = loaded_store();
        enter(&mut store, "200", "200", "10");

        store.load();
        assert_eq!(store.values(), &InputState::new("200", "200", "10"));
        assert_eq!(store.load_state(), LoadState::Loaded);
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let mut store = DosageStore::open(ReadOnlyStore);
        store.set_standard_amount("200");
        store.set_standard_volume("200");
        store.set_target_volume("10");

        assert!(store.add_to_history().is_some());
        assert_eq!(store.history().len(), 1);
    }
}
