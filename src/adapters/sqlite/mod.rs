//! SQLite adapter: Implementation of FeedbackRepository.
//!
//! Transactional alternative to the JSON file. Each save replaces the table
//! content inside a single transaction, so readers never observe a partially
//! written store and the last correction for a key always wins.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. A poisoned mutex (from a panic in
//! another thread) surfaces as `StorageError::LockPoisoned` instead of
//! touching the database again.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};

use crate::adapters::StorageError;
use crate::domain::{FeedbackEntry, FeedbackStore};
use crate::ports::FeedbackRepository;

/// SQLite feedback repository.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteStorage {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        let storage = Self {
            conn: Mutex::new(conn),
            location: path.as_ref().display().to_string(),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
            location: ":memory:".to_string(),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS feedback (
                symptom_key TEXT PRIMARY KEY,
                disease TEXT NOT NULL,
                probability REAL NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    /// Number of stored corrections.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn count(&self) -> Result<usize, StorageError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl FeedbackRepository for SqliteStorage {
    type Error = StorageError;

    fn load(&self) -> Result<FeedbackStore, Self::Error> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT symptom_key, disease, probability FROM feedback ORDER BY symptom_key",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                let disease: String = row.get(1)?;
                let probability: f64 = row.get(2)?;
                Ok((key, disease, probability))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut store = FeedbackStore::new();
        for (key, disease_name, confidence) in rows {
            store.insert_raw(
                key,
                FeedbackEntry {
                    disease_name,
                    confidence,
                },
            );
        }

        tracing::info!("Loaded {} feedback entries from {}", store.len(), self.location);
        Ok(store)
    }

    fn save(&self, store: &FeedbackStore) -> Result<(), Self::Error> {
        let mut conn = self.lock()?;
        let now = chrono::Utc::now().to_rfc3339();

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM feedback", [])?;
        {
            let mut insert = tx.prepare(
                r"
                INSERT INTO feedback (symptom_key, disease, probability, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )?;
            for (key, entry) in store.iter() {
                insert.execute(params![key, entry.disease_name, entry.confidence, now])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Saved {} feedback entries to {}", store.len(), self.location);
        Ok(())
    }

    fn location(&self) -> String {
        format!("sqlite:{}", self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SymptomKey;

    #[test]
    fn test_empty_database_loads_empty_store() {
        let storage = SqliteStorage::in_memory().expect("Should create db");
        assert!(storage.load().expect("Should load").is_empty());
        assert_eq!(storage.count().expect("Should count"), 0);
    }

    #[test]
    fn test_feedback_roundtrip() {
        let storage = SqliteStorage::in_memory().expect("Should create db");

        let mut store = FeedbackStore::new();
        store.record(&SymptomKey::normalize("fever cough headache"), "Common Cold");
        store.record(&SymptomKey::normalize("rash"), "Allergy");

        storage.save(&store).expect("Should save");
        assert_eq!(storage.count().expect("Should count"), 2);
        assert_eq!(storage.load().expect("Should load"), store);
    }

    #[test]
    fn test_save_replaces_all_rows() {
        let storage = SqliteStorage::in_memory().expect("Should create db");

        let mut first = FeedbackStore::new();
        first.record(&SymptomKey::normalize("a"), "A");
        first.record(&SymptomKey::normalize("b"), "B");
        storage.save(&first).expect("Should save");

        let mut second = FeedbackStore::new();
        second.record(&SymptomKey::normalize("a"), "A2");
        storage.save(&second).expect("Should save");

        let loaded = storage.load().expect("Should load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(
            loaded
                .lookup(&SymptomKey::normalize("a"))
                .map(|e| e.disease_name.as_str()),
            Some("A2")
        );
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().expect("Should create dir");
        let path = dir.path().join("feedback.db");

        let mut store = FeedbackStore::new();
        store.record(&SymptomKey::normalize("fever"), "Flu");
        SqliteStorage::new(&path)
            .expect("Should open")
            .save(&store)
            .expect("Should save");

        let reopened = SqliteStorage::new(&path).expect("Should reopen");
        assert_eq!(reopened.load().expect("Should load"), store);
    }
}
