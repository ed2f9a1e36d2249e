//! Feedback store: user-confirmed diagnoses keyed by symptom set.
//!
//! Serialized as a JSON object mapping the key's string form to
//! `{"disease": ..., "probability": 100.0}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::disease::FEEDBACK_CONFIDENCE;
use super::symptom::SymptomKey;

/// A stored correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Disease the user said was correct
    #[serde(rename = "disease")]
    pub disease_name: String,

    /// Always 100.0 for entries written by this crate
    #[serde(rename = "probability")]
    pub confidence: f64,
}

impl FeedbackEntry {
    #[must_use]
    pub fn new(disease_name: impl Into<String>) -> Self {
        Self {
            disease_name: disease_name.into(),
            confidence: FEEDBACK_CONFIDENCE,
        }
    }
}

/// Storage-key to correction mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackStore {
    entries: BTreeMap<String, FeedbackEntry>,
}

impl FeedbackStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Correction recorded for exactly this key.
    #[must_use]
    pub fn lookup(&self, key: &SymptomKey) -> Option<&FeedbackEntry> {
        self.entries.get(&key.storage_key())
    }

    /// Insert or overwrite the correction for `key`.
    ///
    /// Returns the entry it replaced, if any.
    pub fn record(&mut self, key: &SymptomKey, disease_name: impl Into<String>) -> Option<FeedbackEntry> {
        self.entries
            .insert(key.storage_key(), FeedbackEntry::new(disease_name))
    }

    /// Insert an entry under an already-serialized key (used by repositories).
    pub fn insert_raw(&mut self, storage_key: impl Into<String>, entry: FeedbackEntry) {
        self.entries.insert(storage_key.into(), entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeedbackEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
