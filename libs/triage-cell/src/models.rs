use serde::{Deserialize, Serialize};

use shared_models::SymptomEntry;

/// Symptom data handed to the recommendation adapter: structured entries
/// from the health assessment, or a raw free-text description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymptomInput {
    Entries(Vec<SymptomEntry>),
    Raw(String),
}

/// Outcome of a specialist recommendation call.
///
/// `Unavailable` covers every failure mode (transport error, timeout,
/// malformed JSON, missing `status: "done"`) so callers never need to
/// distinguish why the oracle had nothing to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationResult {
    Recommended {
        specialists: Vec<String>,
        rationale: String,
    },
    Unavailable,
}

impl RecommendationResult {
    /// The ordered specialist list, empty when no recommendation exists.
    pub fn specialists(&self) -> &[String] {
        match self {
            RecommendationResult::Recommended { specialists, .. } => specialists,
            RecommendationResult::Unavailable => &[],
        }
    }
}
