//! Disease index: dataset symptom sets mapped to candidate diseases.
//!
//! The index is built once from the dataset and never gains or loses keys
//! afterwards. Only candidate confidences change, through [`DiseaseIndex::penalize`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::disease::DiseaseCandidate;
use super::symptom::SymptomKey;

/// One dataset row: a disease and up to four symptom columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub disease: String,
    pub symptoms: Vec<Option<String>>,
}

impl DatasetRow {
    #[must_use]
    pub fn new<S: Into<String>>(disease: S, symptoms: Vec<Option<String>>) -> Self {
        Self {
            disease: disease.into(),
            symptoms,
        }
    }

    /// Normalized symptom key for this row.
    #[must_use]
    pub fn symptom_key(&self) -> SymptomKey {
        SymptomKey::from_fields(self.symptoms.iter().map(Option::as_deref))
    }
}

/// Symptom key to disease candidate lookup.
///
/// Iteration follows first-insertion order of each key, which decides ties
/// between equally confident matches.
#[derive(Debug, Clone, Default)]
pub struct DiseaseIndex {
    entries: Vec<(SymptomKey, DiseaseCandidate)>,
    positions: HashMap<SymptomKey, usize>,
}

impl DiseaseIndex {
    /// Build the index from dataset rows.
    ///
    /// A later row with the same key replaces the earlier candidate but keeps
    /// its position. Rows without any symptom are skipped.
    #[must_use]
    pub fn build(rows: &[DatasetRow]) -> Self {
        let mut index = Self::default();
        let mut skipped = 0usize;

        for row in rows {
            let key = row.symptom_key();
            if key.is_empty() {
                skipped += 1;
                continue;
            }

            let candidate = DiseaseCandidate::new(row.disease.trim());
            match index.positions.get(&key) {
                Some(&pos) => index.entries[pos].1 = candidate,
                None => {
                    index.positions.insert(key.clone(), index.entries.len());
                    index.entries.push((key, candidate));
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} dataset rows without symptoms", skipped);
        }
        tracing::info!(
            "Built disease index: {} symptom sets from {} rows",
            index.entries.len(),
            rows.len()
        );

        index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn get(&self, key: &SymptomKey) -> Option<&DiseaseCandidate> {
        self.positions.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Entries in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SymptomKey, &DiseaseCandidate)> {
        self.entries.iter().map(|(k, c)| (k, c))
    }

    /// Most confident candidate whose key is a subset of `user_key`.
    ///
    /// Only a strictly higher confidence replaces the current best, so the
    /// first maximum wins and a candidate at zero is never returned.
    #[must_use]
    pub fn best_subset_match(&self, user_key: &SymptomKey) -> Option<&DiseaseCandidate> {
        let mut best: Option<&DiseaseCandidate> = None;
        let mut best_confidence = 0.0;

        for (key, candidate) in &self.entries {
            if candidate.confidence > best_confidence && key.is_subset_of(user_key) {
                best_confidence = candidate.confidence;
                best = Some(candidate);
            }
        }

        best
    }

    /// Decay every candidate for `disease_name` by `amount`.
    ///
    /// The name is trimmed the same way dataset names are. Returns the number
    /// of candidates touched.
    pub fn penalize(&mut self, disease_name: &str, amount: f64) -> usize {
        let disease_name = disease_name.trim();
        let mut touched = 0;
        for (_, candidate) in self
            .entries
            .iter_mut()
            .filter(|(_, c)| c.disease_name == disease_name)
        {
            candidate.decay(amount);
            touched += 1;
        }
        touched
    }
}
