use anyhow::Result;
use tracing::warn;

use shared_config::AppConfig;
use shared_oracle::OracleClient;

/// Maximum stored length for a summarized symptom description.
pub const MAX_SUMMARY_LENGTH: usize = 200;

pub struct SummaryService {
    oracle: OracleClient,
}

impl SummaryService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            oracle: OracleClient::new(config)?,
        })
    }

    /// Condense an over-long symptom description, preserving severity and
    /// duration terms. Short input passes through; oracle failure falls
    /// back to plain truncation.
    pub async fn summarize_symptom_description(&self, description: &str) -> String {
        if description.chars().count() <= MAX_SUMMARY_LENGTH {
            return description.to_string();
        }

        let prompt = format!(
            "Summarize the following medical symptom description in {} characters \
             or less:\n{}\n\n\
             Keep important medical terms and severity indicators.",
            MAX_SUMMARY_LENGTH, description
        );

        match self.oracle.generate(&prompt).await {
            Ok(summary) => truncate_chars(&summary, MAX_SUMMARY_LENGTH),
            Err(e) => {
                warn!("Symptom summarization failed, truncating instead: {}", e);
                truncate_chars(description, MAX_SUMMARY_LENGTH)
            }
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::test_utils::TestConfig;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn short_descriptions_pass_through_untouched() {
        let server = MockServer::start().await;
        let config = TestConfig::with_oracle_url(&server.uri()).to_app_config();
        let service = SummaryService::new(&config).unwrap();

        let text = "mild cough for two days";
        assert_eq!(service.summarize_symptom_description(text).await, text);
    }

    #[tokio::test]
    async fn oracle_failure_truncates_the_original() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = TestConfig::with_oracle_url(&server.uri()).to_app_config();
        let service = SummaryService::new(&config).unwrap();

        let long = "a".repeat(500);
        let summary = service.summarize_symptom_description(&long).await;
        assert_eq!(summary.len(), MAX_SUMMARY_LENGTH);
    }

    #[tokio::test]
    async fn oracle_summary_is_length_capped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "b".repeat(400)}]}}]
            })))
            .mount(&server)
            .await;

        let config = TestConfig::with_oracle_url(&server.uri()).to_app_config();
        let service = SummaryService::new(&config).unwrap();

        let long = "a".repeat(500);
        let summary = service.summarize_symptom_description(&long).await;
        assert_eq!(summary, "b".repeat(MAX_SUMMARY_LENGTH));
    }
}
