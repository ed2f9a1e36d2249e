//! Background worker for consultation turns.
//!
//! Chat fallback calls can take seconds, so every turn runs on its own
//! thread and reports back over a channel the main loop polls.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::adapters::StorageError;
use crate::application::{
    ConsultReply, ConsultRequest, ConsultStage, ConsultationService, FALLBACK_APOLOGY,
};
use crate::ports::{ConversationalFallback, FeedbackRepository};
use crate::MedipredictError;

/// Updates from a running consultation.
#[derive(Debug, Clone)]
pub enum ConsultProgress {
    Stage(ConsultStage),
    Complete(ConsultReply),
    Error(String),
}

/// Handle to a running consultation.
pub struct ConsultWorkerHandle {
    progress_rx: Receiver<ConsultProgress>,
    _handle: JoinHandle<()>,
}

impl ConsultWorkerHandle {
    /// Next update, if one is waiting.
    #[must_use]
    pub fn try_recv(&self) -> Option<ConsultProgress> {
        self.progress_rx.try_recv().ok()
    }

    /// Block until the next update; `None` once the worker is gone.
    #[must_use]
    pub fn recv(&self) -> Option<ConsultProgress> {
        self.progress_rx.recv().ok()
    }
}

/// Message shown for a failed turn.
fn user_message(error: &MedipredictError) -> String {
    match error {
        MedipredictError::Fallback(_) => FALLBACK_APOLOGY.to_string(),
        other => other.to_string(),
    }
}

/// Spawns consultation turns off the UI thread.
pub struct ConsultWorker;

impl ConsultWorker {
    /// Run `request` on a background thread.
    pub fn spawn<R, F>(
        service: ConsultationService<R, F>,
        request: ConsultRequest,
    ) -> ConsultWorkerHandle
    where
        R: FeedbackRepository + 'static,
        R::Error: Into<StorageError>,
        F: ConversationalFallback + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let stage_tx = tx.clone();
            let result = service.consult_with_progress(&request, |stage| {
                let _ = stage_tx.send(ConsultProgress::Stage(stage));
            });

            let update = match result {
                Ok(reply) => ConsultProgress::Complete(reply),
                Err(e) => {
                    tracing::warn!("Consultation failed: {}", e);
                    ConsultProgress::Error(user_message(&e))
                }
            };
            let _ = tx.send(update);
        });

        ConsultWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteStorage;
    use crate::application::DiagnosisEngine;
    use crate::domain::{DatasetRow, DiseaseIndex};
    use crate::ports::FallbackError;
    use std::sync::Arc;

    struct Offline;

    impl ConversationalFallback for Offline {
        fn complete(&self, _text: &str) -> Result<String, FallbackError> {
            Err(FallbackError::Request("timed out".to_string()))
        }
    }

    fn service() -> ConsultationService<SqliteStorage, Offline> {
        let rows = vec![DatasetRow::new("Migraine", vec![Some("headache".to_string())])];
        let engine = DiagnosisEngine::new(
            DiseaseIndex::build(&rows),
            SqliteStorage::in_memory().expect("Should create db"),
        )
        .expect("Should build engine");
        ConsultationService::new(engine, Arc::new(Offline))
    }

    fn drain(handle: &ConsultWorkerHandle) -> Vec<ConsultProgress> {
        let mut updates = Vec::new();
        while let Some(update) = handle.recv() {
            updates.push(update);
        }
        updates
    }

    #[test]
    fn test_reports_stages_then_reply() {
        let handle = ConsultWorker::spawn(service(), ConsultRequest::new("bad headache"));
        let updates = drain(&handle);

        assert!(matches!(updates[0], ConsultProgress::Stage(ConsultStage::Matching)));
        match updates.last() {
            Some(ConsultProgress::Complete(reply)) => {
                assert_eq!(reply.prediction.disease(), Some("Migraine"));
            }
            other => panic!("Expected completion, got {other:?}"),
        }
    }

    #[test]
    fn test_fallback_failure_shows_apology() {
        let handle = ConsultWorker::spawn(service(), ConsultRequest::new("is coffee healthy"));
        let updates = drain(&handle);

        match updates.last() {
            Some(ConsultProgress::Error(message)) => assert_eq!(message, FALLBACK_APOLOGY),
            other => panic!("Expected error, got {other:?}"),
        }
    }
}
