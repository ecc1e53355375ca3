use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use tracing::warn;

use shared_config::AppConfig;
use shared_models::PatientRecord;
use shared_oracle::{extract_first_json, OracleClient};

pub struct ProfileService {
    oracle: OracleClient,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            oracle: OracleClient::new(config)?,
        })
    }

    /// Synthesize a placeholder profile for an email with no stored patient.
    ///
    /// The submitted email is always forced into the result; an oracle
    /// failure falls back to the fixed guest profile.
    pub async fn synthesize_profile(&self, email: &str) -> PatientRecord {
        let prompt = format!(
            "Generate a realistic but fake patient profile as a JSON object for the \
             following email: {}.\n\
             Include: full_name, age, gender, address, phone, DOB (YYYY-MM-DD), and \
             use the email provided.\n\
             Return only the JSON object.",
            email
        );

        let synthesized = match self.oracle.generate(&prompt).await {
            Ok(reply) => extract_first_json(&reply),
            Err(e) => {
                warn!("Profile synthesis failed: {}", e);
                None
            }
        };

        match synthesized {
            Some(data) => {
                let mut record = PatientRecord::default();
                record.merge(&data);
                record.email = email.to_string();
                record
            }
            None => guest_profile(email, Utc::now().date_naive()),
        }
    }
}

/// The fixed fallback profile used when synthesis is impossible.
pub fn guest_profile(email: &str, today: NaiveDate) -> PatientRecord {
    let dob = today
        .with_year(today.year() - 30)
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string();

    PatientRecord {
        full_name: "Guest User".to_string(),
        email: email.to_string(),
        phone: "0000000000".to_string(),
        dob,
        gender: "Other".to_string(),
        address: "123 Main St, City".to_string(),
        age: Some(30),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::test_utils::TestConfig;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn guest_profile_is_thirty_years_old() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let record = guest_profile("new@example.com", today);
        assert_eq!(record.full_name, "Guest User");
        assert_eq!(record.email, "new@example.com");
        assert_eq!(record.dob, "1996-08-07");
        assert_eq!(record.age, Some(30));
    }

    #[tokio::test]
    async fn synthesized_profile_keeps_submitted_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text":
                    "{\"full_name\": \"Asha Rao\", \"age\": 27, \"gender\": \"Female\", \
                     \"email\": \"wrong@example.com\", \"DOB\": \"1999-02-14\"}"
                }]}}]
            })))
            .mount(&server)
            .await;

        let config = TestConfig::with_oracle_url(&server.uri()).to_app_config();
        let service = ProfileService::new(&config).unwrap();

        let record = service.synthesize_profile("asha@example.com").await;
        assert_eq!(record.full_name, "Asha Rao");
        assert_eq!(record.email, "asha@example.com");
        assert_eq!(record.dob, "1999-02-14");
    }

    #[tokio::test]
    async fn oracle_failure_falls_back_to_guest_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = TestConfig::with_oracle_url(&server.uri()).to_app_config();
        let service = ProfileService::new(&config).unwrap();

        let record = service.synthesize_profile("ghost@example.com").await;
        assert_eq!(record.full_name, "Guest User");
        assert_eq!(record.email, "ghost@example.com");
    }
}
