//! JSON file adapter: Implementation of FeedbackRepository.
//!
//! Stores the whole feedback store as one JSON object, indented with four
//! spaces. Every save rewrites the file in full through a temporary file in
//! the same directory, so a crash mid-write leaves the previous content intact.
//!
//! A file that exists but does not parse is moved aside to `<name>.corrupt`
//! and treated as an empty store.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::adapters::StorageError;
use crate::domain::FeedbackStore;
use crate::ports::FeedbackRepository;

/// Feedback store persisted to a JSON file.
pub struct JsonFeedbackFile {
    path: PathBuf,
}

impl JsonFeedbackFile {
    /// Create a repository backed by `path`. The file need not exist yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn corrupt_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "feedback.json".into());
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn quarantine(&self, reason: &serde_json::Error) {
        let target = self.corrupt_path();
        tracing::warn!(
            "Feedback file {} is not valid JSON ({}); moving it to {} and starting empty",
            self.path.display(),
            reason,
            target.display()
        );
        if let Err(e) = fs::rename(&self.path, &target) {
            tracing::error!("Failed to move corrupt feedback file aside: {}", e);
        }
    }
}

impl FeedbackRepository for JsonFeedbackFile {
    type Error = StorageError;

    fn load(&self) -> Result<FeedbackStore, Self::Error> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No feedback file at {}, starting with an empty store",
                    self.path.display()
                );
                return Ok(FeedbackStore::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<FeedbackStore>(&content) {
            Ok(store) => {
                tracing::info!(
                    "Loaded {} feedback entries from {}",
                    store.len(),
                    self.path.display()
                );
                Ok(store)
            }
            Err(e) => {
                self.quarantine(&e);
                Ok(FeedbackStore::new())
            }
        }
    }

    fn save(&self, store: &FeedbackStore) -> Result<(), Self::Error> {
        let parent_dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
            store.serialize(&mut serializer)?;
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;
        temp_file
            .persist(&self.path)
            .map_err(|e| StorageError::Io(e.error))?;

        tracing::debug!(
            "Saved {} feedback entries to {}",
            store.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SymptomKey;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().expect("Should create dir");
        let repo = JsonFeedbackFile::new(dir.path().join("user_feedback.json"));
        assert!(repo.load().expect("Should load").is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempdir().expect("Should create dir");
        let repo = JsonFeedbackFile::new(dir.path().join("nested/user_feedback.json"));

        let mut store = FeedbackStore::new();
        store.record(&SymptomKey::normalize("fever cough headache"), "Common Cold");
        store.record(&SymptomKey::normalize("rash"), "Allergy");
        repo.save(&store).expect("Should save");

        let loaded = repo.load().expect("Should load");
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_file_format() {
        let dir = tempdir().expect("Should create dir");
        let path = dir.path().join("user_feedback.json");
        let repo = JsonFeedbackFile::new(&path);

        let mut store = FeedbackStore::new();
        store.record(&SymptomKey::normalize("fever"), "Flu");
        repo.save(&store).expect("Should save");

        let text = fs::read_to_string(&path).expect("Should read");
        assert_eq!(
            text,
            "{\n    \"('fever',)\": {\n        \"disease\": \"Flu\",\n        \"probability\": 100.0\n    }\n}"
        );
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let dir = tempdir().expect("Should create dir");
        let repo = JsonFeedbackFile::new(dir.path().join("user_feedback.json"));

        let mut first = FeedbackStore::new();
        first.record(&SymptomKey::normalize("a"), "A");
        first.record(&SymptomKey::normalize("b"), "B");
        repo.save(&first).expect("Should save");

        let mut second = FeedbackStore::new();
        second.record(&SymptomKey::normalize("c"), "C");
        repo.save(&second).expect("Should save");

        assert_eq!(repo.load().expect("Should load"), second);
    }

    #[test]
    fn test_reads_legacy_file() {
        let dir = tempdir().expect("Should create dir");
        let path = dir.path().join("user_feedback.json");
        fs::write(
            &path,
            r#"{"('cough', 'fever', 'headache')": {"disease": "Common Cold", "probability": 100.0}}"#,
        )
        .expect("Should write");

        let store = JsonFeedbackFile::new(&path).load().expect("Should load");
        let entry = store
            .lookup(&SymptomKey::normalize("headache fever cough"))
            .expect("Should find entry");
        assert_eq!(entry.disease_name, "Common Cold");
    }

    #[test]
    fn test_corrupt_file_is_quarantined() {
        let dir = tempdir().expect("Should create dir");
        let path = dir.path().join("user_feedback.json");
        fs::write(&path, "{ not json").expect("Should write");

        let repo = JsonFeedbackFile::new(&path);
        assert!(repo.load().expect("Should load").is_empty());
        assert!(!path.exists());
        assert!(dir.path().join("user_feedback.json.corrupt").exists());
    }
}
