use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use shared_config::AppConfig;
use shared_oracle::{extract_first_json, OracleClient};

use crate::models::{Speaker, Turn};

/// First question of the health assessment.
pub const ASSESSMENT_OPENING: &str =
    "What symptoms or health concerns are you experiencing today? If none, please say 'no'.";

/// Instructions priming the oracle for the question/answer loop. The
/// completion contract is the JSON object at the end: `status: "complete"`
/// plus a nested `patient_data` object.
const ASSESSMENT_INSTRUCTIONS: &str = "\
You are a medical intake assistant. The patient has confirmed their details.

IMPORTANT RULES:
1. Start IMMEDIATELY with symptoms assessment
2. Accept and process ALL user responses, including simple yes/no answers
3. If the user says \"yes\", follow up with specific questions about their symptoms
4. If the user says \"no\", ask if they have any other health concerns
5. Never ignore user input or ask for clarification unnecessarily

For each symptom, ask about severity (mild/moderate/severe), duration, and frequency.
Keep questions specific and direct, process every answer meaningfully, and do not
repeat questions.

When the assessment is complete, return a JSON object with this structure:
{
  \"status\": \"complete\",
  \"patient_data\": {
    \"current_symptoms\": [
      {\"description\": \"headache\", \"severity\": \"mild\", \"duration\": \"2 days\"}
    ],
    \"other_concerns\": \"none\",
    \"additional_notes\": \"patient reports good overall health\"
  }
}";

/// Outcome of one assessment exchange.
#[derive(Debug, Clone)]
pub enum AssessmentTurn {
    /// The oracle asked another question.
    Question(String),
    /// The oracle declared the intake complete with collected patient data.
    Complete(Value),
}

/// Drives the oracle-led question/answer loop of the health assessment.
pub struct AssessmentDialogue {
    oracle: OracleClient,
}

impl AssessmentDialogue {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            oracle: OracleClient::new(config)?,
        })
    }

    /// Send the user's answer with the assessment history and interpret the
    /// reply. An oracle failure re-asks the last question instead of
    /// surfacing an error; the session never crashes on a flaky oracle.
    pub async fn next_turn(&self, assessment_turns: &[Turn], user_input: &str) -> AssessmentTurn {
        let mut history: Vec<(&str, &str)> = vec![("user", ASSESSMENT_INSTRUCTIONS)];
        for turn in assessment_turns {
            let role = match turn.speaker {
                Speaker::Bot => "model",
                Speaker::User => "user",
            };
            history.push((role, &turn.text));
        }

        match self.oracle.generate_with_history(&history, user_input).await {
            Ok(reply) => parse_assessment_reply(&reply),
            Err(e) => {
                warn!("Assessment oracle call failed, re-asking: {}", e);
                let last_question = assessment_turns
                    .iter()
                    .rev()
                    .find(|turn| turn.speaker == Speaker::Bot)
                    .map(|turn| turn.text.clone())
                    .unwrap_or_else(|| ASSESSMENT_OPENING.to_string());
                AssessmentTurn::Question(last_question)
            }
        }
    }
}

/// A reply is a completion only when it carries `status == "complete"` and
/// a nested `patient_data` object; anything else is the next question.
pub fn parse_assessment_reply(reply: &str) -> AssessmentTurn {
    if let Some(value) = extract_first_json(reply) {
        let complete = value.get("status").and_then(Value::as_str) == Some("complete");
        if complete {
            if let Some(patient_data) = value.get("patient_data").filter(|d| d.is_object()) {
                return AssessmentTurn::Complete(patient_data.clone());
            }
        }
    }

    AssessmentTurn::Question(reply.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_reply_is_the_next_question() {
        match parse_assessment_reply("How severe is the headache?") {
            AssessmentTurn::Question(q) => assert_eq!(q, "How severe is the headache?"),
            other => panic!("expected a question, got {:?}", other),
        }
    }

    #[test]
    fn complete_status_with_patient_data_finishes() {
        let reply = r#"Thanks! {"status": "complete", "patient_data": {"current_symptoms": []}}"#;
        match parse_assessment_reply(reply) {
            AssessmentTurn::Complete(data) => assert!(data.get("current_symptoms").is_some()),
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn complete_status_without_patient_data_keeps_asking() {
        let reply = r#"{"status": "complete"}"#;
        assert!(matches!(
            parse_assessment_reply(reply),
            AssessmentTurn::Question(_)
        ));
    }

    #[test]
    fn non_complete_status_keeps_asking() {
        let reply = r#"{"status": "in_progress", "patient_data": {}}"#;
        assert!(matches!(
            parse_assessment_reply(reply),
            AssessmentTurn::Question(_)
        ));
    }
}
