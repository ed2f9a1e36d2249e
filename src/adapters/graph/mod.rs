//! Transition graph adapter: Implementation of ProgressionPredictor.
//!
//! Builds a directed graph over the known chronic diseases from consecutive
//! entries of each patient's history. For every patient's most recent disease
//! `L`, each candidate `X` gains:
//! - the number of observed `L -> X` transitions across all patients
//! - `1 / rank` for its position in the progression list of `L`
//!
//! The highest score wins; ties go to the disease listed first in
//! [`DISEASE_PROFILES`]. When nothing scores (the latest diseases lead nowhere
//! known), the disease with the most incoming transitions is returned.
//! A trained model can replace this adapter by implementing the same port.

use crate::domain::health::{profile, DISEASE_PROFILES};
use crate::domain::PatientHistory;
use crate::ports::{ProgressionError, ProgressionPredictor};

const NODES: usize = DISEASE_PROFILES.len();

/// Rule-based progression predictor over the disease transition graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionGraphPredictor;

impl TransitionGraphPredictor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn node(name: &str) -> Result<usize, ProgressionError> {
        DISEASE_PROFILES
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ProgressionError::UnknownDisease(name.to_string()))
    }
}

/// Index of the highest score, first one on ties.
fn arg_max(scores: &[f64; NODES]) -> usize {
    let mut best = 0;
    for (idx, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = idx;
        }
    }
    best
}

impl ProgressionPredictor for TransitionGraphPredictor {
    fn predict(&self, patients: &[PatientHistory]) -> Result<String, ProgressionError> {
        if patients.is_empty() {
            return Err(ProgressionError::NoPatientData);
        }

        let mut edges = [[0u32; NODES]; NODES];
        let mut in_degree = [0.0f64; NODES];
        let mut edge_count = 0usize;

        for patient in patients {
            for disease in &patient.disease_history {
                Self::node(disease)?;
            }
            for (from, to) in patient.transitions() {
                let (from, to) = (Self::node(from)?, Self::node(to)?);
                edges[from][to] += 1;
                in_degree[to] += 1.0;
                edge_count += 1;
            }
        }

        if edge_count == 0 {
            return Err(ProgressionError::InvalidGraph);
        }

        let mut scores = [0.0f64; NODES];
        for latest in patients.iter().filter_map(PatientHistory::latest) {
            let from = Self::node(latest)?;
            for (to, count) in edges[from].iter().enumerate() {
                scores[to] += f64::from(*count);
            }
            if let Some(current) = profile(latest) {
                for (rank, next) in current.progression.iter().enumerate() {
                    if let Ok(to) = Self::node(next) {
                        scores[to] += 1.0 / (rank + 1) as f64;
                    }
                }
            }
        }

        let best = if scores.iter().any(|s| *s > 0.0) {
            arg_max(&scores)
        } else {
            arg_max(&in_degree)
        };

        tracing::debug!(
            "Progression graph: {} transitions, predicted {}",
            edge_count,
            DISEASE_PROFILES[best].name
        );
        Ok(DISEASE_PROFILES[best].name.to_string())
    }
}
