//! Disease candidates and prediction outcomes.

use serde::{Deserialize, Serialize};

/// Confidence assigned to every dataset candidate at load time.
pub const INITIAL_CONFIDENCE: f64 = 100.0;

/// Confidence reported for a user-corrected (feedback) prediction.
pub const FEEDBACK_CONFIDENCE: f64 = 100.0;

/// Minimum confidence a dataset match needs to be reported.
pub const MATCH_THRESHOLD: f64 = 50.0;

/// Confidence removed from a disease each time a diagnosis of it is rejected.
pub const REJECTION_PENALTY: f64 = 2.0;

/// A disease the dataset associates with one symptom set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseCandidate {
    /// Disease name as written in the dataset
    pub disease_name: String,

    /// Confidence score in [0, 100]
    pub confidence: f64,
}

impl DiseaseCandidate {
    /// Create a candidate at full confidence.
    #[must_use]
    pub fn new(disease_name: impl Into<String>) -> Self {
        Self {
            disease_name: disease_name.into(),
            confidence: INITIAL_CONFIDENCE,
        }
    }

    /// Lower the confidence by `amount`, never below zero.
    pub fn decay(&mut self, amount: f64) {
        self.confidence = (self.confidence - amount).max(0.0);
    }
}

/// Where a diagnosis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// Exact match on a previous user correction
    Feedback,
    /// Best subset match over the dataset
    Dataset,
}

/// Outcome of matching a symptom description.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    /// A disease was found with enough confidence.
    Diagnosed {
        disease: String,
        confidence: f64,
        source: PredictionSource,
    },
    /// Nothing matched, or the best match was under the threshold.
    NoDiagnosis,
}

impl Prediction {
    /// Predicted disease, if any.
    #[must_use]
    pub fn disease(&self) -> Option<&str> {
        match self {
            Self::Diagnosed { disease, .. } => Some(disease),
            Self::NoDiagnosis => None,
        }
    }

    /// Confidence of the prediction; zero when there is none.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Diagnosed { confidence, .. } => *confidence,
            Self::NoDiagnosis => 0.0,
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<PredictionSource> {
        match self {
            Self::Diagnosed { source, .. } => Some(*source),
            Self::NoDiagnosis => None,
        }
    }

    #[must_use]
    pub fn is_diagnosed(&self) -> bool {
        matches!(self, Self::Diagnosed { .. })
    }
}
