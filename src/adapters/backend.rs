//! Runtime choice between the feedback repositories.

use crate::adapters::json_feedback::JsonFeedbackFile;
use crate::adapters::sqlite::SqliteStorage;
use crate::adapters::StorageError;
use crate::domain::FeedbackStore;
use crate::ports::FeedbackRepository;

/// Feedback repository selected by configuration.
pub enum FeedbackBackend {
    Json(JsonFeedbackFile),
    Sqlite(SqliteStorage),
}

impl FeedbackRepository for FeedbackBackend {
    type Error = StorageError;

    fn load(&self) -> Result<FeedbackStore, Self::Error> {
        match self {
            Self::Json(repo) => repo.load(),
            Self::Sqlite(repo) => repo.load(),
        }
    }

    fn save(&self, store: &FeedbackStore) -> Result<(), Self::Error> {
        match self {
            Self::Json(repo) => repo.save(store),
            Self::Sqlite(repo) => repo.save(store),
        }
    }

    fn location(&self) -> String {
        match self {
            Self::Json(repo) => repo.location(),
            Self::Sqlite(repo) => repo.location(),
        }
    }
}

impl From<JsonFeedbackFile> for FeedbackBackend {
    fn from(repo: JsonFeedbackFile) -> Self {
        Self::Json(repo)
    }
}

impl From<SqliteStorage> for FeedbackBackend {
    fn from(repo: SqliteStorage) -> Self {
        Self::Sqlite(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SymptomKey;

    #[test]
    fn test_dispatches_to_sqlite() {
        let backend = FeedbackBackend::from(SqliteStorage::in_memory().expect("Should create db"));
        let mut store = FeedbackStore::new();
        store.record(&SymptomKey::normalize("itching rash"), "Fungal infection");

        backend.save(&store).expect("Should save");
        assert_eq!(backend.load().expect("Should load"), store);
        assert_eq!(backend.location(), "sqlite::memory:");
    }

    #[test]
    fn test_dispatches_to_json() {
        let dir = tempfile::tempdir().expect("Should create dir");
        let path = dir.path().join("user_feedback.json");
        let backend = FeedbackBackend::from(JsonFeedbackFile::new(&path));

        let mut store = FeedbackStore::new();
        store.record(&SymptomKey::normalize("chills"), "Malaria");
        backend.save(&store).expect("Should save");

        assert!(path.exists());
        assert_eq!(backend.load().expect("Should load"), store);
    }
}
