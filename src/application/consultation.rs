//! Consultation service: the conversational front of the engine.
//!
//! One consultation turn:
//! 1. Match the message against corrections and the dataset
//! 2. On a diagnosis, answer from the dataset; a "no" verdict with a correct
//!    disease records a correction against the diagnosed disease
//! 3. Without a diagnosis, hand the message verbatim to the chat fallback
//!
//! The engine lock is released before the fallback call, so slow completions
//! never block other consultations.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::adapters::StorageError;
use crate::domain::{Prediction, SymptomKey};
use crate::ports::{ConversationalFallback, FeedbackRepository};
use crate::MedipredictError;

use super::engine::{CorrectionReceipt, DiagnosisEngine};

/// Shown to the user when the fallback cannot answer.
pub const FALLBACK_APOLOGY: &str =
    "I couldn't fetch the information right now. Please try again later.";

/// Appended to the answer once a correction has been stored.
pub const CORRECTION_THANKS: &str =
    " Thank you! I will remember this correction for future predictions.";

/// Verdict that disputes a diagnosis.
const REJECT_VERDICT: &str = "no";

/// One consultation turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsultRequest {
    /// Free-text symptom description or question
    pub message: String,

    /// User verdict on the diagnosis ("no" disputes it)
    pub feedback: Option<String>,

    /// Correct disease, used when the verdict disputes the diagnosis
    pub correct_disease: Option<String>,
}

impl ConsultRequest {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attach a verdict and the disease the user says is correct.
    #[must_use]
    pub fn with_verdict(mut self, verdict: impl Into<String>, correct_disease: impl Into<String>) -> Self {
        self.feedback = Some(verdict.into());
        self.correct_disease = Some(correct_disease.into());
        self
    }

    /// Whether the verdict disputes the diagnosis.
    #[must_use]
    pub fn disputes(&self) -> bool {
        self.feedback
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(REJECT_VERDICT))
    }
}

/// Answer to one consultation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsultReply {
    /// Text shown to the user
    pub response: String,

    /// Matcher outcome behind the answer
    pub prediction: Prediction,

    /// Set when the turn recorded a correction
    pub correction: Option<CorrectionReceipt>,
}

/// Progress of a consultation, reported to front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultStage {
    Matching,
    AskingFallback,
    SavingCorrection,
}

/// Engine counters for status screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStatus {
    pub dataset_entries: usize,
    pub feedback_entries: usize,
    pub feedback_location: String,
    pub fallback_available: bool,
}

/// Service combining the engine with the chat fallback.
pub struct ConsultationService<R, F>
where
    R: FeedbackRepository,
    F: ConversationalFallback,
{
    engine: Arc<Mutex<DiagnosisEngine<R>>>,
    fallback: Arc<F>,
}

impl<R, F> Clone for ConsultationService<R, F>
where
    R: FeedbackRepository,
    F: ConversationalFallback,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

/// Diagnosis answer in the wording users already know.
#[must_use]
pub fn diagnosis_message(disease: &str, confidence: f64) -> String {
    format!(
        "Based on my dataset, you may have {disease} with {confidence:.2}% confidence. Please consult a doctor for confirmation. (Prediction from Dataset)"
    )
}

impl<R, F> ConsultationService<R, F>
where
    R: FeedbackRepository,
    R::Error: Into<StorageError>,
    F: ConversationalFallback,
{
    /// Create a new consultation service.
    pub fn new(engine: DiagnosisEngine<R>, fallback: Arc<F>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            fallback,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, DiagnosisEngine<R>>, MedipredictError> {
        self.engine
            .lock()
            .map_err(|_| MedipredictError::Persistence(StorageError::LockPoisoned))
    }

    /// Match a description without any side effect.
    ///
    /// # Errors
    /// Returns error if the engine lock is poisoned.
    pub fn diagnose(&self, raw_text: &str) -> Result<Prediction, MedipredictError> {
        Ok(self.lock()?.diagnose(raw_text))
    }

    /// Record a correction for a description.
    ///
    /// # Errors
    /// Returns `Validation` for unusable input and `Persistence` if the
    /// correction could not be saved.
    pub fn submit_correction(
        &self,
        raw_text: &str,
        disputed_disease: &str,
        correct_disease: &str,
    ) -> Result<CorrectionReceipt, MedipredictError> {
        self.lock()?
            .submit_correction(raw_text, disputed_disease, correct_disease)
    }

    /// Run one consultation turn.
    ///
    /// # Errors
    /// See [`consult_with_progress`](Self::consult_with_progress).
    pub fn consult(&self, request: &ConsultRequest) -> Result<ConsultReply, MedipredictError> {
        self.consult_with_progress(request, |_| {})
    }

    /// Run one consultation turn, reporting each stage to `progress`.
    ///
    /// # Errors
    /// Returns `Validation` for an empty message, `Persistence` if a
    /// correction could not be saved, and `Fallback` if the chat service is
    /// unavailable or fails.
    pub fn consult_with_progress<P>(
        &self,
        request: &ConsultRequest,
        mut progress: P,
    ) -> Result<ConsultReply, MedipredictError>
    where
        P: FnMut(ConsultStage),
    {
        if request.message.trim().is_empty() {
            return Err(MedipredictError::Validation(
                "Message must not be empty".to_string(),
            ));
        }

        progress(ConsultStage::Matching);
        let key = SymptomKey::normalize(&request.message);
        let mut engine = self.lock()?;
        let prediction = engine.diagnose_key(&key);

        let Prediction::Diagnosed {
            disease, confidence, ..
        } = &prediction
        else {
            drop(engine);
            progress(ConsultStage::AskingFallback);
            return self.ask_fallback(&request.message);
        };

        let mut response = diagnosis_message(disease, *confidence);
        let mut correction = None;

        if request.disputes() {
            progress(ConsultStage::SavingCorrection);
            let correct = request.correct_disease.as_deref().unwrap_or_default();
            correction = Some(engine.reject(&key, disease, correct)?);
            response.push_str(CORRECTION_THANKS);
        }

        Ok(ConsultReply {
            response,
            prediction,
            correction,
        })
    }

    fn ask_fallback(&self, message: &str) -> Result<ConsultReply, MedipredictError> {
        if !self.fallback.is_available() {
            tracing::warn!("No diagnosis and no chat fallback configured");
        }

        let response = self.fallback.complete(message).map_err(|e| {
            tracing::error!("Chat fallback failed: {}", e);
            MedipredictError::Fallback(e)
        })?;

        Ok(ConsultReply {
            response,
            prediction: Prediction::NoDiagnosis,
            correction: None,
        })
    }

    /// Engine counters and fallback availability.
    ///
    /// # Errors
    /// Returns error if the engine lock is poisoned.
    pub fn status(&self) -> Result<EngineStatus, MedipredictError> {
        let engine = self.lock()?;
        Ok(EngineStatus {
            dataset_entries: engine.dataset_entries(),
            feedback_entries: engine.feedback_entries(),
            feedback_location: engine.feedback_location(),
            fallback_available: self.fallback.is_available(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteStorage;
    use crate::domain::{DatasetRow, DiseaseIndex, PredictionSource};
    use crate::ports::FallbackError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fallback that echoes the prompt and counts calls.
    #[derive(Default)]
    struct EchoFallback {
        calls: AtomicUsize,
    }

    impl ConversationalFallback for EchoFallback {
        fn complete(&self, text: &str) -> Result<String, FallbackError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("echo: {text}"))
        }
    }

    struct DownFallback;

    impl ConversationalFallback for DownFallback {
        fn complete(&self, _text: &str) -> Result<String, FallbackError> {
            Err(FallbackError::Unavailable)
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    fn engine() -> DiagnosisEngine<SqliteStorage> {
        let rows = vec![DatasetRow::new(
            "Flu",
            vec![Some("fever".to_string()), Some("cough".to_string())],
        )];
        DiagnosisEngine::new(
            DiseaseIndex::build(&rows),
            SqliteStorage::in_memory().expect("Should create db"),
        )
        .expect("Should build engine")
    }

    #[test]
    fn test_diagnosis_reply_wording() {
        let service = ConsultationService::new(engine(), Arc::new(EchoFallback::default()));
        let reply = service
            .consult(&ConsultRequest::new("Fever and cough"))
            .expect("Should answer");

        assert_eq!(
            reply.response,
            "Based on my dataset, you may have Flu with 100.00% confidence. Please consult a doctor for confirmation. (Prediction from Dataset)"
        );
        assert!(reply.correction.is_none());
    }

    #[test]
    fn test_no_verdict_records_correction() {
        let service = ConsultationService::new(engine(), Arc::new(EchoFallback::default()));
        let request = ConsultRequest::new("fever cough headache").with_verdict(" No ", "Common Cold");

        let reply = service.consult(&request).expect("Should answer");
        assert!(reply.response.ends_with(CORRECTION_THANKS));
        assert!(reply.response.contains("Flu with 100.00%"));
        assert_eq!(reply.correction.map(|c| c.penalized), Some(1));

        let next = service
            .diagnose("headache, fever, cough")
            .expect("Should diagnose");
        assert_eq!(next.disease(), Some("Common Cold"));
        assert_eq!(next.source(), Some(PredictionSource::Feedback));
    }

    #[test]
    fn test_other_verdicts_do_not_reject() {
        let service = ConsultationService::new(engine(), Arc::new(EchoFallback::default()));
        for verdict in ["yes", "nope", ""] {
            let request = ConsultRequest::new("fever cough").with_verdict(verdict, "Cold");
            let reply = service.consult(&request).expect("Should answer");
            assert!(reply.correction.is_none());
        }
        assert_eq!(service.status().expect("Should report").feedback_entries, 0);
    }

    #[test]
    fn test_unmatched_message_goes_to_fallback_verbatim() {
        let fallback = Arc::new(EchoFallback::default());
        let service = ConsultationService::new(engine(), Arc::clone(&fallback));

        let reply = service
            .consult(&ConsultRequest::new("What is a healthy diet?"))
            .expect("Should answer");
        assert_eq!(reply.response, "echo: What is a healthy diet?");
        assert_eq!(reply.prediction, Prediction::NoDiagnosis);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispute_on_unmatched_message_is_ignored() {
        let service = ConsultationService::new(engine(), Arc::new(EchoFallback::default()));
        let request = ConsultRequest::new("sore knee").with_verdict("no", "Arthritis");

        let reply = service.consult(&request).expect("Should answer");
        assert!(reply.correction.is_none());
        assert_eq!(service.status().expect("Should report").feedback_entries, 0);
    }

    #[test]
    fn test_fallback_failure_is_error() {
        let service = ConsultationService::new(engine(), Arc::new(DownFallback));
        let err = service
            .consult(&ConsultRequest::new("sore knee"))
            .expect_err("Should fail");
        assert!(matches!(err, MedipredictError::Fallback(FallbackError::Unavailable)));
        assert!(!service.status().expect("Should report").fallback_available);
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let service = ConsultationService::new(engine(), Arc::new(EchoFallback::default()));
        assert!(matches!(
            service.consult(&ConsultRequest::new("  ")),
            Err(MedipredictError::Validation(_))
        ));
    }

    #[test]
    fn test_progress_stages() {
        let service = ConsultationService::new(engine(), Arc::new(EchoFallback::default()));

        let mut stages = Vec::new();
        service
            .consult_with_progress(&ConsultRequest::new("knee pain"), |s| stages.push(s))
            .expect("Should answer");
        assert_eq!(stages, vec![ConsultStage::Matching, ConsultStage::AskingFallback]);

        stages.clear();
        let request = ConsultRequest::new("fever cough").with_verdict("no", "Cold");
        service
            .consult_with_progress(&request, |s| stages.push(s))
            .expect("Should answer");
        assert_eq!(stages, vec![ConsultStage::Matching, ConsultStage::SavingCorrection]);
    }
}
