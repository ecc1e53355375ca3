use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_oracle::{extract_first_json, OracleClient};

use crate::models::{RecommendationResult, SymptomInput};

pub struct RecommendationService {
    oracle: OracleClient,
}

impl RecommendationService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            oracle: OracleClient::new(config)?,
        })
    }

    /// Ask the oracle which specialists fit the collected symptoms.
    ///
    /// Never fails: any oracle or parse problem becomes `Unavailable`.
    pub async fn recommend_specialists(&self, symptoms: &SymptomInput) -> RecommendationResult {
        let symptoms_text = format_symptoms(symptoms);
        if symptoms_text.is_empty() {
            return RecommendationResult::Unavailable;
        }

        let prompt = format!(
            "You are a medical triage assistant.\n\n\
             Based on the following patient data, recommend the most appropriate \
             medical specialist(s) for consultation.\n\n\
             Patient data:\n{}\n\n\
             Instructions:\n\
             - Analyze symptoms, severity, and duration.\n\
             - Recommend 1 or more specialist types (e.g., Cardiologist, Neurologist, \
             Dermatologist, Orthopedic Surgeon, etc.)\n\
             - Provide a brief rationale for the recommendation.\n\
             - Return ONLY a JSON object with this format:\n\n\
             {{\n  \"recommended_specialist\": [\"Specialist Name 1\", \"Specialist Name 2\"],\n  \
             \"rationale\": \"Short explanation why these specialists are recommended.\",\n  \
             \"status\": \"done\"\n}}",
            symptoms_text
        );

        match self.oracle.generate(&prompt).await {
            Ok(reply) => {
                debug!("Received recommendation reply from oracle");
                parse_recommendation(&reply)
            }
            Err(e) => {
                warn!("Specialist recommendation unavailable: {}", e);
                RecommendationResult::Unavailable
            }
        }
    }
}

/// Render symptom data as the bulleted text block the prompt expects.
pub fn format_symptoms(input: &SymptomInput) -> String {
    match input {
        SymptomInput::Raw(text) => text.trim().to_string(),
        SymptomInput::Entries(entries) => entries
            .iter()
            .map(|s| {
                let severity = if s.severity.is_empty() {
                    "unknown"
                } else {
                    s.severity.as_str()
                };
                let duration = if s.duration.is_empty() {
                    "unknown"
                } else {
                    s.duration.as_str()
                };
                format!(
                    "- {} (Severity: {}, Duration: {})",
                    s.description, severity, duration
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Parse a recommendation reply. Requires a JSON object with
/// `status == "done"`; anything else is `Unavailable`.
pub fn parse_recommendation(reply: &str) -> RecommendationResult {
    let Some(value) = extract_first_json(reply) else {
        return RecommendationResult::Unavailable;
    };

    if value.get("status").and_then(Value::as_str) != Some("done") {
        return RecommendationResult::Unavailable;
    }

    let specialists = value
        .get("recommended_specialist")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let rationale = value
        .get("rationale")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    RecommendationResult::Recommended {
        specialists,
        rationale,
    }
}
