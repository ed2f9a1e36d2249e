//! Progression port: Trait for future disease prediction.
//!
//! Abstracts the trained progression model so services do not depend on how
//! the prediction is computed.

use crate::domain::PatientHistory;

/// Errors from progression prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    #[error("No patient data provided")]
    NoPatientData,

    #[error("Unknown disease in history: {0}")]
    UnknownDisease(String),

    #[error("Invalid graph data")]
    InvalidGraph,
}

/// Trait for predicting a patient's next disease.
pub trait ProgressionPredictor: Send + Sync {
    /// Predict the most likely next disease from one or more histories.
    ///
    /// # Errors
    /// Returns `ProgressionError` if the histories cannot be used.
    fn predict(&self, patients: &[PatientHistory]) -> Result<String, ProgressionError>;
}
