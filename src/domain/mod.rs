//! Domain layer: Core types and rules.
//!
//! Pure Rust types with no I/O. Symptom normalization, the disease index,
//! the feedback store and health scoring all live here.

mod disease;
mod feedback;
pub mod health;
mod history;
mod index;
mod symptom;

pub use disease::{
    DiseaseCandidate, Prediction, PredictionSource, FEEDBACK_CONFIDENCE, INITIAL_CONFIDENCE,
    MATCH_THRESHOLD, REJECTION_PENALTY,
};
pub use feedback::{FeedbackEntry, FeedbackStore};
pub use health::{HealthError, HealthReport, PastDisease};
pub use history::PatientHistory;
pub use index::{DatasetRow, DiseaseIndex};
pub use symptom::SymptomKey;
