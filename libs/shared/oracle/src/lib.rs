use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

/// HTTP client for the language-model oracle.
///
/// The base URL is configurable so tests can point it at a mock server.
/// Every request carries a hard timeout; a silent oracle is indistinguishable
/// from a malformed one, and callers degrade accordingly.
pub struct OracleClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OracleClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.oracle_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.oracle_base_url.clone(),
            api_key: config.oracle_api_key.clone(),
            model: config.oracle_model.clone(),
        })
    }

    /// Send a single prompt and return the model's text reply.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_history(&[], prompt).await
    }

    /// Send a prompt preceded by prior (role, text) turns.
    ///
    /// Roles are "user" or "model"; the final prompt is always a user turn.
    pub async fn generate_with_history(
        &self,
        history: &[(&str, &str)],
        prompt: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        debug!("Calling oracle model {}", self.model);

        let mut contents: Vec<Value> = history
            .iter()
            .map(|(role, text)| json!({"role": role, "parts": [{"text": text}]}))
            .collect();
        contents.push(json!({"role": "user", "parts": [{"text": prompt}]}));

        let response = self
            .http
            .post(&url)
            .json(&json!({ "contents": contents }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Oracle API error ({}): {}", status, error_text);
            return Err(anyhow!("Oracle API error ({}): {}", status, error_text));
        }

        let body: Value = response.json().await?;
        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid oracle response format"))?;

        Ok(text.trim().to_string())
    }
}

/// Extract the first balanced JSON object from free-form model output.
///
/// Locates the first `{` and the last `}` and parses the substring. Anything
/// that fails to parse is `None`; callers treat that as "no structured
/// payload", never as an error.
pub fn extract_first_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> AppConfig {
        AppConfig {
            database_url: String::new(),
            oracle_api_key: "test-key".to_string(),
            oracle_base_url: base_url.to_string(),
            oracle_model: "gemini-1.5-flash".to_string(),
            oracle_timeout_secs: 5,
            on_missing_patient: shared_config::OnMissingPatient::Abort,
        }
    }

    #[tokio::test]
    async fn generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-1.5-flash:generateContent",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "  hello  "}]}}]
            })))
            .mount(&server)
            .await;

        let client = OracleClient::new(&test_config(&server.uri())).unwrap();
        let reply = client.generate("hi").await.unwrap();
        assert_eq!(reply, "hello");
    }

    #[tokio::test]
    async fn generate_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = OracleClient::new(&test_config(&server.uri())).unwrap();
        assert!(client.generate("hi").await.is_err());
    }

    #[tokio::test]
    async fn generate_rejects_missing_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = OracleClient::new(&test_config(&server.uri())).unwrap();
        assert!(client.generate("hi").await.is_err());
    }

    #[test]
    fn extract_first_json_finds_embedded_object() {
        let text = "Sure! Here you go:\n{\"status\": \"done\", \"n\": 1}\nAnything else?";
        let value = extract_first_json(text).unwrap();
        assert_eq!(value["status"], "done");
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn extract_first_json_spans_nested_braces() {
        let text = "prefix {\"outer\": {\"inner\": true}} suffix";
        let value = extract_first_json(text).unwrap();
        assert_eq!(value["outer"]["inner"], true);
    }

    #[test]
    fn extract_first_json_rejects_garbage() {
        assert!(extract_first_json("no json here").is_none());
        assert!(extract_first_json("} backwards {").is_none());
        assert!(extract_first_json("{not valid json}").is_none());
    }
}
