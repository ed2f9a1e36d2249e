//! Diagnosis engine: symptom matching and the correction pipeline.
//!
//! The engine owns the disease index and the feedback store for the lifetime
//! of the process. Reads take `&self`; corrections take `&mut self`, so any
//! front end sharing one engine across threads has to put it behind a single
//! lock.

use crate::adapters::StorageError;
use crate::domain::{
    DiseaseIndex, FeedbackStore, Prediction, PredictionSource, SymptomKey, FEEDBACK_CONFIDENCE,
    MATCH_THRESHOLD, REJECTION_PENALTY,
};
use crate::ports::{DatasetSource, FeedbackRepository};
use crate::MedipredictError;

/// What a correction changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionReceipt {
    /// Dataset candidates of the disputed disease that lost confidence
    pub penalized: usize,

    /// Correction previously stored for the same symptoms, if any
    pub replaced: Option<String>,
}

/// Symptom matcher with persistent user corrections.
pub struct DiagnosisEngine<R>
where
    R: FeedbackRepository,
{
    index: DiseaseIndex,
    feedback: FeedbackStore,
    repository: R,
}

impl<R> DiagnosisEngine<R>
where
    R: FeedbackRepository,
    R::Error: Into<StorageError>,
{
    /// Create an engine over a built index, loading stored corrections.
    ///
    /// # Errors
    /// Returns `Persistence` if the repository cannot be read.
    pub fn new(index: DiseaseIndex, repository: R) -> Result<Self, MedipredictError> {
        let feedback = repository
            .load()
            .map_err(|e| MedipredictError::Persistence(e.into()))?;

        tracing::info!(
            "Diagnosis engine ready: {} symptom sets, {} corrections from {}",
            index.len(),
            feedback.len(),
            repository.location()
        );

        Ok(Self {
            index,
            feedback,
            repository,
        })
    }

    /// Load the dataset, build the index and create the engine.
    ///
    /// # Errors
    /// Returns `DataLoad` if the dataset is missing or malformed, or
    /// `Persistence` if stored corrections cannot be read.
    pub fn from_dataset<D: DatasetSource>(dataset: &D, repository: R) -> Result<Self, MedipredictError> {
        let rows = dataset.load_rows()?;
        if rows.is_empty() {
            tracing::warn!("Dataset has no rows; only stored corrections can match");
        }
        Self::new(DiseaseIndex::build(&rows), repository)
    }

    /// Match a free-text symptom description.
    #[must_use]
    pub fn diagnose(&self, raw_text: &str) -> Prediction {
        self.diagnose_key(&SymptomKey::normalize(raw_text))
    }

    /// Match an already normalized key.
    ///
    /// A stored correction for the exact key wins unconditionally; otherwise
    /// the most confident dataset subset match is reported when it reaches
    /// the threshold.
    #[must_use]
    pub fn diagnose_key(&self, user_key: &SymptomKey) -> Prediction {
        if user_key.is_empty() {
            return Prediction::NoDiagnosis;
        }

        if let Some(entry) = self.feedback.lookup(user_key) {
            tracing::debug!("Feedback hit for {} tokens: {}", user_key.len(), entry.disease_name);
            return Prediction::Diagnosed {
                disease: entry.disease_name.clone(),
                confidence: FEEDBACK_CONFIDENCE,
                source: PredictionSource::Feedback,
            };
        }

        match self.index.best_subset_match(user_key) {
            Some(candidate) if candidate.confidence >= MATCH_THRESHOLD => {
                tracing::debug!(
                    "Dataset match for {} tokens: {} at {:.2}",
                    user_key.len(),
                    candidate.disease_name,
                    candidate.confidence
                );
                Prediction::Diagnosed {
                    disease: candidate.disease_name.clone(),
                    confidence: candidate.confidence,
                    source: PredictionSource::Dataset,
                }
            }
            Some(candidate) => {
                tracing::debug!(
                    "Best match {} at {:.2} is under the threshold",
                    candidate.disease_name,
                    candidate.confidence
                );
                Prediction::NoDiagnosis
            }
            None => Prediction::NoDiagnosis,
        }
    }

    /// Reject `disputed_disease` for `user_key` and remember `correct_disease`.
    ///
    /// Every dataset candidate of the disputed disease loses confidence, the
    /// correction is stored for the exact key, and the whole store is saved.
    /// In-memory changes are kept even when the save fails. The correct
    /// disease is stored as given.
    ///
    /// # Errors
    /// Returns `Validation` for an empty key and `Persistence` if the store
    /// cannot be saved.
    pub fn reject(
        &mut self,
        user_key: &SymptomKey,
        disputed_disease: &str,
        correct_disease: &str,
    ) -> Result<CorrectionReceipt, MedipredictError> {
        if user_key.is_empty() {
            return Err(MedipredictError::Validation(
                "Symptom description has no words".to_string(),
            ));
        }

        let penalized = self.index.penalize(disputed_disease, REJECTION_PENALTY);
        let replaced = self
            .feedback
            .record(user_key, correct_disease)
            .map(|old| old.disease_name);

        tracing::info!(
            "Correction for {} tokens: {} -> {} ({} candidates penalized)",
            user_key.len(),
            disputed_disease,
            correct_disease,
            penalized
        );

        self.repository.save(&self.feedback).map_err(|e| {
            let err: StorageError = e.into();
            tracing::error!(
                "Failed to save feedback to {}: {}",
                self.repository.location(),
                err
            );
            MedipredictError::Persistence(err)
        })?;

        Ok(CorrectionReceipt {
            penalized,
            replaced,
        })
    }

    /// Normalize `raw_text` and [`reject`](Self::reject) it.
    ///
    /// # Errors
    /// Same as `reject`.
    pub fn submit_correction(
        &mut self,
        raw_text: &str,
        disputed_disease: &str,
        correct_disease: &str,
    ) -> Result<CorrectionReceipt, MedipredictError> {
        self.reject(
            &SymptomKey::normalize(raw_text),
            disputed_disease,
            correct_disease,
        )
    }
}

impl<R: FeedbackRepository> DiagnosisEngine<R> {
    #[must_use]
    pub fn index(&self) -> &DiseaseIndex {
        &self.index
    }

    #[must_use]
    pub fn dataset_entries(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn feedback_entries(&self) -> usize {
        self.feedback.len()
    }

    /// Where corrections are stored.
    #[must_use]
    pub fn feedback_location(&self) -> String {
        self.repository.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::csv_dataset::CsvDataset;
    use crate::adapters::json_feedback::JsonFeedbackFile;
    use crate::adapters::sqlite::SqliteStorage;
    use crate::domain::DatasetRow;
    use crate::ports::DatasetError;

    struct StaticDataset(Vec<DatasetRow>);

    impl DatasetSource for StaticDataset {
        fn load_rows(&self) -> Result<Vec<DatasetRow>, DatasetError> {
            Ok(self.0.clone())
        }
    }

    /// Repository whose saves always fail.
    struct ReadOnlyRepository;

    impl FeedbackRepository for ReadOnlyRepository {
        type Error = StorageError;

        fn load(&self) -> Result<FeedbackStore, Self::Error> {
            Ok(FeedbackStore::new())
        }

        fn save(&self, _store: &FeedbackStore) -> Result<(), Self::Error> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }

        fn location(&self) -> String {
            "read-only".to_string()
        }
    }

    fn row(disease: &str, symptoms: &[&str]) -> DatasetRow {
        DatasetRow::new(
            disease,
            symptoms.iter().map(|s| Some((*s).to_string())).collect(),
        )
    }

    fn dataset() -> StaticDataset {
        StaticDataset(vec![
            row("Flu", &["fever", "cough"]),
            row("Migraine", &["headache", "nausea"]),
        ])
    }

    fn sqlite_engine() -> DiagnosisEngine<SqliteStorage> {
        DiagnosisEngine::from_dataset(
            &dataset(),
            SqliteStorage::in_memory().expect("Should create db"),
        )
        .expect("Should build engine")
    }

    fn diagnosed(disease: &str, confidence: f64, source: PredictionSource) -> Prediction {
        Prediction::Diagnosed {
            disease: disease.to_string(),
            confidence,
            source,
        }
    }

    #[test]
    fn test_punctuation_and_order_do_not_matter() {
        let engine = sqlite_engine();
        assert_eq!(
            engine.diagnose("Cough! Fever,"),
            diagnosed("Flu", 100.0, PredictionSource::Dataset)
        );
        assert_eq!(engine.diagnose("Cough! Fever,"), engine.diagnose("fever cough"));
    }

    #[test]
    fn test_no_subset_candidate() {
        let engine = sqlite_engine();
        assert_eq!(engine.diagnose("fever"), Prediction::NoDiagnosis);
        assert_eq!(engine.diagnose("   "), Prediction::NoDiagnosis);
        assert_eq!(engine.diagnose("!!!"), Prediction::NoDiagnosis);
    }

    #[test]
    fn test_diagnose_is_idempotent() {
        let engine = sqlite_engine();
        let first = engine.diagnose("headache nausea fever");
        for _ in 0..3 {
            assert_eq!(engine.diagnose("headache nausea fever"), first);
        }
    }

    #[test]
    fn test_rejection_scenario() {
        let mut engine = sqlite_engine();

        let receipt = engine
            .submit_correction("fever cough headache", "Flu", "Common Cold")
            .expect("Should record correction");
        assert_eq!(receipt.penalized, 1);
        assert_eq!(receipt.replaced, None);

        let flu = engine
            .index()
            .iter()
            .find(|(_, c)| c.disease_name == "Flu")
            .map(|(_, c)| c.confidence);
        assert_eq!(flu, Some(98.0));

        assert_eq!(
            engine.diagnose("headache fever cough"),
            diagnosed("Common Cold", 100.0, PredictionSource::Feedback)
        );
        // Other inputs still reach the decayed candidate.
        assert_eq!(
            engine.diagnose("fever cough"),
            diagnosed("Flu", 98.0, PredictionSource::Dataset)
        );
    }

    #[test]
    fn test_repeated_rejection_accumulates() {
        let mut engine = sqlite_engine();
        engine
            .submit_correction("fever cough", "Flu", "Bronchitis")
            .expect("Should record");
        let receipt = engine
            .submit_correction("fever cough", "Flu", "Pneumonia")
            .expect("Should record");
        assert_eq!(receipt.replaced.as_deref(), Some("Bronchitis"));

        let flu = engine
            .index()
            .iter()
            .find(|(_, c)| c.disease_name == "Flu")
            .map(|(_, c)| c.confidence);
        assert_eq!(flu, Some(96.0));
        assert_eq!(engine.feedback_entries(), 1);
    }

    #[test]
    fn test_feedback_overrides_dataset() {
        let mut engine = sqlite_engine();
        engine
            .submit_correction("nausea headache", "Migraine", "Food poisoning")
            .expect("Should record");
        assert_eq!(
            engine.diagnose("Headache, nausea."),
            diagnosed("Food poisoning", 100.0, PredictionSource::Feedback)
        );
    }

    #[test]
    fn test_candidate_below_threshold_is_not_reported() {
        let mut engine = sqlite_engine();
        // 26 rejections take Migraine from 100 to 48.
        for _ in 0..26 {
            engine
                .submit_correction("unrelated words", "Migraine", "Tension headache")
                .expect("Should record");
        }
        assert_eq!(engine.diagnose("headache nausea"), Prediction::NoDiagnosis);
    }

    fn flu_confidence<R: FeedbackRepository>(engine: &DiagnosisEngine<R>) -> Option<f64> {
        engine
            .index()
            .iter()
            .find(|(_, c)| c.disease_name == "Flu")
            .map(|(_, c)| c.confidence)
    }

    #[test]
    fn test_reject_requires_symptoms() {
        let mut engine = sqlite_engine();
        assert!(matches!(
            engine.submit_correction("?!", "Flu", "Cold"),
            Err(MedipredictError::Validation(_))
        ));
        assert_eq!(engine.feedback_entries(), 0);
        assert_eq!(flu_confidence(&engine), Some(100.0));
    }

    #[test]
    fn test_blank_correct_disease_is_stored_as_given() {
        let mut engine = sqlite_engine();
        engine
            .submit_correction("fever cough", "Flu", "")
            .expect("Should record correction");

        assert_eq!(flu_confidence(&engine), Some(98.0));
        assert_eq!(engine.feedback_entries(), 1);
        assert_eq!(
            engine.diagnose("fever cough"),
            diagnosed("", 100.0, PredictionSource::Feedback)
        );
    }

    #[test]
    fn test_disputed_disease_is_trimmed() {
        let mut engine = sqlite_engine();
        let receipt = engine
            .submit_correction("fever cough headache", " Flu ", "Common Cold")
            .expect("Should record correction");
        assert_eq!(receipt.penalized, 1);
        assert_eq!(flu_confidence(&engine), Some(98.0));
    }

    #[test]
    fn test_blank_dataset_cell_never_matches() {
        let rows = CsvDataset::read_rows("Disease,Symptom_1,Symptom_2\nFlu,fever, \n".as_bytes())
            .expect("Should parse");
        let engine = DiagnosisEngine::from_dataset(
            &StaticDataset(rows),
            SqliteStorage::in_memory().expect("Should create db"),
        )
        .expect("Should build engine");

        assert_eq!(engine.dataset_entries(), 1);
        assert_eq!(engine.diagnose("fever"), Prediction::NoDiagnosis);
        assert_eq!(engine.diagnose("fever cough"), Prediction::NoDiagnosis);
    }

    #[test]
    fn test_persistence_failure_keeps_memory_changes() {
        let mut engine =
            DiagnosisEngine::from_dataset(&dataset(), ReadOnlyRepository).expect("Should build");

        let err = engine
            .submit_correction("fever cough", "Flu", "Cold")
            .expect_err("Save should fail");
        assert!(matches!(err, MedipredictError::Persistence(_)));

        assert_eq!(
            engine.diagnose("fever cough"),
            diagnosed("Cold", 100.0, PredictionSource::Feedback)
        );
    }

    #[test]
    fn test_reload_reproduces_matches() {
        let dir = tempfile::tempdir().expect("Should create dir");
        let path = dir.path().join("user_feedback.json");

        let mut engine = DiagnosisEngine::from_dataset(&dataset(), JsonFeedbackFile::new(&path))
            .expect("Should build");
        engine
            .submit_correction("fever cough headache", "Flu", "Common Cold")
            .expect("Should record");

        let reloaded = DiagnosisEngine::from_dataset(&dataset(), JsonFeedbackFile::new(&path))
            .expect("Should rebuild");
        assert_eq!(reloaded.feedback_entries(), 1);
        assert_eq!(
            reloaded.diagnose("cough headache fever"),
            engine.diagnose("cough headache fever")
        );
    }

    #[test]
    fn test_missing_dataset_is_data_load_error() {
        struct Missing;
        impl DatasetSource for Missing {
            fn load_rows(&self) -> Result<Vec<DatasetRow>, DatasetError> {
                Err(DatasetError::NotFound("symtoms_df.csv".to_string()))
            }
        }

        let result = DiagnosisEngine::from_dataset(
            &Missing,
            SqliteStorage::in_memory().expect("Should create db"),
        );
        assert!(matches!(result, Err(MedipredictError::DataLoad(_))));
    }
}
