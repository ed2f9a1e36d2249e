//! Patient disease histories consumed by progression predictors.

use serde::{Deserialize, Serialize};

/// Ordered diseases one patient has had, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatientHistory {
    pub disease_history: Vec<String>,
}

impl PatientHistory {
    #[must_use]
    pub fn new<I, S>(diseases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            disease_history: diseases.into_iter().map(Into::into).collect(),
        }
    }

    /// Consecutive `(from, to)` pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.disease_history
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Most recent disease.
    #[must_use]
    pub fn latest(&self) -> Option<&str> {
        self.disease_history.last().map(String::as_str)
    }
}
