//! Symptom keys: canonical, order-independent symptom sets.
//!
//! Two normalizers produce keys:
//! - [`SymptomKey::normalize`] for free text typed by a patient
//! - [`SymptomKey::from_fields`] for the per-column values of the dataset
//!
//! Both sort their tokens so that equality and subset checks are independent
//! of the order in which symptoms were reported.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Anything that is neither a word character nor whitespace.
static NON_WORD: OnceLock<Regex> = OnceLock::new();

fn non_word() -> &'static Regex {
    NON_WORD.get_or_init(|| Regex::new(r"[^\w\s]").expect("Valid regex"))
}

/// Sorted symptom tokens used as a value-equality identifier.
///
/// Duplicates are preserved: `"fever fever"` and `"fever"` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SymptomKey(Vec<String>);

impl SymptomKey {
    /// Normalize free text into a key.
    ///
    /// Strips punctuation, splits on whitespace, lower-cases every token and
    /// sorts the result.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let cleaned = non_word().replace_all(raw, "");
        let mut tokens: Vec<String> = cleaned
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        tokens.sort();
        Self(tokens)
    }

    /// Build a key from dataset symptom columns.
    ///
    /// Only missing (`None`) fields are skipped. The rest are trimmed and
    /// lower-cased as whole values, so a multi-word field stays one token and
    /// a blank field becomes an empty token no free text can supply.
    #[must_use]
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut tokens: Vec<String> = fields
            .into_iter()
            .flatten()
            .map(|field| field.as_ref().trim().to_lowercase())
            .collect();
        tokens.sort();
        Self(tokens)
    }

    /// Sorted tokens.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every token of `self` appears somewhere in `other`.
    ///
    /// Set semantics: duplicate tokens on either side do not matter.
    #[must_use]
    pub fn is_subset_of(&self, other: &SymptomKey) -> bool {
        // `other.0` is sorted, so membership is a binary search.
        self.0
            .iter()
            .all(|token| other.0.binary_search(token).is_ok())
    }

    /// String form used as the durable feedback key.
    ///
    /// Rendered as a tuple literal, e.g. `('cough', 'fever')`, `('fever',)`
    /// or `()`, which keeps existing feedback files readable.
    #[must_use]
    pub fn storage_key(&self) -> String {
        let quoted: Vec<String> = self.0.iter().map(|t| quote_token(t)).collect();
        match quoted.len() {
            1 => format!("({},)", quoted[0]),
            _ => format!("({})", quoted.join(", ")),
        }
    }
}

impl fmt::Display for SymptomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// Quote a token the way a tuple literal would: single quotes unless the
/// token itself contains one and no double quote.
fn quote_token(token: &str) -> String {
    let use_double = token.contains('\'') && !token.contains('"');
    let quote = if use_double { '"' } else { '\'' };

    let mut out = String::with_capacity(token.len() + 2);
    out.push(quote);
    for c in token.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
