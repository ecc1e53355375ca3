use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use patient_cell::models::PatientProfile;
use patient_cell::services::patient::PatientService;
use shared_config::AppConfig;
use shared_database::Database;
use shared_models::PatientRecord;
use shared_utils::validation::{validate_email, validate_name};
use triage_cell::services::profile::ProfileService;
use triage_cell::services::summary::SummaryService;

use crate::models::{EditRequest, IntakeError, IntakePhase, IntakeReply};
use crate::services::assessment::{AssessmentDialogue, AssessmentTurn, ASSESSMENT_OPENING};
use crate::session::IntakeSession;

const EMAIL_PROMPT: &str = "Please enter your email:";
const RETURNING_WELCOME: &str =
    "Welcome back! Please confirm your details are up to date.";
const NEW_PATIENT_WELCOME: &str =
    "Welcome! Here is your generated profile. Please review your details.";
const COMPLETION_MESSAGE: &str = "Medical intake completed successfully!";

/// Patient lookup as the intake flow sees it.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<PatientProfile>, IntakeError>;
}

#[async_trait]
impl PatientDirectory for PatientService {
    async fn find_by_email(&self, email: &str) -> Result<Option<PatientProfile>, IntakeError> {
        PatientService::find_by_email(self, email)
            .await
            .map_err(|e| IntakeError::Database(e.to_string()))
    }
}

/// Placeholder-profile generation as the intake flow sees it.
#[async_trait]
pub trait ProfileSynthesizer: Send + Sync {
    async fn synthesize_profile(&self, email: &str) -> PatientRecord;
}

#[async_trait]
impl ProfileSynthesizer for ProfileService {
    async fn synthesize_profile(&self, email: &str) -> PatientRecord {
        ProfileService::synthesize_profile(self, email).await
    }
}

/// The intake conversation state machine.
///
/// Transitions are driven by submitted text plus the explicit
/// confirm/edit actions. Validation failures re-prompt in place and never
/// move the phase.
pub struct IntakeFlow {
    directory: Arc<dyn PatientDirectory>,
    profiles: Arc<dyn ProfileSynthesizer>,
    assessment: AssessmentDialogue,
    summaries: SummaryService,
}

impl IntakeFlow {
    pub fn new(db: &Database, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            directory: Arc::new(PatientService::new(db)),
            profiles: Arc::new(ProfileService::new(config)?),
            assessment: AssessmentDialogue::new(config)?,
            summaries: SummaryService::new(config)?,
        })
    }

    pub fn with_parts(
        directory: Arc<dyn PatientDirectory>,
        profiles: Arc<dyn ProfileSynthesizer>,
        assessment: AssessmentDialogue,
        summaries: SummaryService,
    ) -> Self {
        Self {
            directory,
            profiles,
            assessment,
            summaries,
        }
    }

    /// Feed one line of user input into the session.
    pub async fn submit(
        &self,
        session: &mut IntakeSession,
        input: &str,
    ) -> Result<IntakeReply, IntakeError> {
        match session.phase {
            IntakePhase::CollectingName => Ok(self.collect_name(session, input)),
            IntakePhase::CollectingEmail => self.collect_email(session, input).await,
            IntakePhase::HealthAssessment => Ok(self.assessment_answer(session, input).await),
            phase => Err(IntakeError::WrongPhase(phase)),
        }
    }

    fn collect_name(&self, session: &mut IntakeSession, input: &str) -> IntakeReply {
        match validate_name(input) {
            Err(e) => IntakeReply::Reprompt {
                message: format!("Invalid name: {}", e),
            },
            Ok(name) => {
                session.push_user(input);
                session.patient_data.full_name = name;
                session.phase = IntakePhase::CollectingEmail;
                session.push_bot(EMAIL_PROMPT);
                IntakeReply::Prompt {
                    message: EMAIL_PROMPT.to_string(),
                }
            }
        }
    }

    async fn collect_email(
        &self,
        session: &mut IntakeSession,
        input: &str,
    ) -> Result<IntakeReply, IntakeError> {
        let email = match validate_email(input) {
            Err(e) => {
                return Ok(IntakeReply::Reprompt {
                    message: e.to_string(),
                })
            }
            Ok(email) => email,
        };

        session.push_user(input);
        session.patient_data.email = email.clone();

        let lookup = self.directory.find_by_email(&email).await?;
        match lookup {
            Some(profile) => {
                debug!("Returning patient matched for intake session");
                apply_profile(&mut session.patient_data, &profile);
                session.is_new_patient = Some(false);
                session.phase = IntakePhase::AwaitingConfirmation;
                session.push_bot(RETURNING_WELCOME);
                Ok(IntakeReply::Confirmation {
                    is_new_patient: false,
                })
            }
            None => {
                debug!("No stored patient, synthesizing a placeholder profile");
                let collected_name = session.patient_data.full_name.clone();
                let mut synthesized = self.profiles.synthesize_profile(&email).await;
                // The collected name and email win over generated values.
                if !collected_name.is_empty() {
                    synthesized.full_name = collected_name;
                }
                synthesized.email = email;
                session.patient_data = synthesized;
                session.is_new_patient = Some(true);
                session.phase = IntakePhase::AwaitingConfirmation;
                session.push_bot(NEW_PATIENT_WELCOME);
                Ok(IntakeReply::Confirmation {
                    is_new_patient: true,
                })
            }
        }
    }

    async fn assessment_answer(&self, session: &mut IntakeSession, input: &str) -> IntakeReply {
        session.push_user(input);

        let turn = self
            .assessment
            .next_turn(session.assessment_turns(), input)
            .await;
        match turn {
            AssessmentTurn::Question(question) => {
                session.push_bot(question.clone());
                IntakeReply::Question { message: question }
            }
            AssessmentTurn::Complete(patient_data) => {
                session.patient_data.merge(&patient_data);
                // Rambling descriptions get condensed before anything
                // downstream stores or analyzes them.
                for symptom in &mut session.patient_data.current_symptoms {
                    symptom.description = self
                        .summaries
                        .summarize_symptom_description(&symptom.description)
                        .await;
                }
                session.symptoms_collected = true;
                session.in_health_assessment = false;
                session.phase = IntakePhase::Complete;
                session.push_bot(COMPLETION_MESSAGE);
                info!("Intake session {} completed", session.token);
                IntakeReply::Completed
            }
        }
    }

    /// Confirm the displayed details and enter the health assessment.
    pub fn confirm(&self, session: &mut IntakeSession) -> Result<IntakeReply, IntakeError> {
        if session.phase != IntakePhase::AwaitingConfirmation {
            return Err(IntakeError::WrongPhase(session.phase));
        }

        session.data_confirmed = true;
        session.in_health_assessment = true;
        session.phase = IntakePhase::HealthAssessment;
        session.assessment_start = session.transcript.len();
        session.push_bot(ASSESSMENT_OPENING);

        Ok(IntakeReply::Question {
            message: ASSESSMENT_OPENING.to_string(),
        })
    }

    /// Enter the edit screen.
    pub fn begin_edit(&self, session: &mut IntakeSession) -> Result<(), IntakeError> {
        if session.phase != IntakePhase::AwaitingConfirmation {
            return Err(IntakeError::WrongPhase(session.phase));
        }
        session.phase = IntakePhase::Editing;
        Ok(())
    }

    /// Apply edited fields and return to the confirmation screen.
    pub fn apply_edit(
        &self,
        session: &mut IntakeSession,
        edit: EditRequest,
    ) -> Result<(), IntakeError> {
        if session.phase != IntakePhase::Editing {
            return Err(IntakeError::WrongPhase(session.phase));
        }

        let record = &mut session.patient_data;
        if let Some(full_name) = edit.full_name {
            record.full_name = full_name;
        }
        if let Some(email) = edit.email {
            record.email = email;
        }
        if let Some(phone) = edit.phone {
            record.phone = phone;
        }
        if let Some(dob) = edit.dob {
            record.dob = dob;
        }
        if let Some(gender) = edit.gender {
            record.gender = gender;
        }
        if let Some(address) = edit.address {
            record.address = address;
        }

        session.phase = IntakePhase::AwaitingConfirmation;
        Ok(())
    }

    /// Leave the edit screen without changes.
    pub fn cancel_edit(&self, session: &mut IntakeSession) -> Result<(), IntakeError> {
        if session.phase != IntakePhase::Editing {
            return Err(IntakeError::WrongPhase(session.phase));
        }
        session.phase = IntakePhase::AwaitingConfirmation;
        Ok(())
    }
}

/// Stored data overwrites collected data for a returning patient.
fn apply_profile(record: &mut PatientRecord, profile: &PatientProfile) {
    record.full_name = profile.full_name.clone();
    record.email = profile.email.clone();
    record.phone = profile.phone.clone();
    record.gender = profile.gender.clone();
    record.address = profile.address.clone();
    record.dob = profile.dob.clone();
    record.age = profile.age;
    record.previous_symptoms = profile.previous_symptoms.clone();
    record.previous_medications = profile.previous_medications.clone();
    record.previous_allergies = profile.previous_allergies.clone();
    record.previous_surgeries = profile.previous_surgeries.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use shared_utils::test_utils::TestConfig;

    struct StubDirectory {
        profile: Option<PatientProfile>,
    }

    #[async_trait]
    impl PatientDirectory for StubDirectory {
        async fn find_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<PatientProfile>, IntakeError> {
            Ok(self.profile.clone())
        }
    }

    struct StubSynthesizer;

    #[async_trait]
    impl ProfileSynthesizer for StubSynthesizer {
        async fn synthesize_profile(&self, email: &str) -> PatientRecord {
            PatientRecord {
                full_name: "Synthesized Name".to_string(),
                email: email.to_string(),
                gender: "Other".to_string(),
                age: Some(30),
                ..Default::default()
            }
        }
    }

    fn stored_profile() -> PatientProfile {
        PatientProfile {
            patient_id: 12,
            full_name: "Asha Rao".to_string(),
            age: Some(27),
            gender: "Female".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91-98765-43210".to_string(),
            address: "12 Lake Road".to_string(),
            dob: "1999-02-14".to_string(),
            previous_symptoms: "migraine (moderate, 3 days)".to_string(),
            previous_medications: "ibuprofen (200mg)".to_string(),
            previous_allergies: String::new(),
            previous_surgeries: String::new(),
        }
    }

    async fn flow_with(
        profile: Option<PatientProfile>,
        oracle_url: &str,
    ) -> IntakeFlow {
        let config = TestConfig::with_oracle_url(oracle_url).to_app_config();
        IntakeFlow::with_parts(
            Arc::new(StubDirectory { profile }),
            Arc::new(StubSynthesizer),
            AssessmentDialogue::new(&config).unwrap(),
            SummaryService::new(&config).unwrap(),
        )
    }

    fn session() -> IntakeSession {
        IntakeSession::new(Uuid::new_v4())
    }

    #[tokio::test]
    async fn invalid_name_reprompts_without_advancing() {
        let flow = flow_with(None, "http://localhost:9").await;
        let mut session = session();

        let reply = flow.submit(&mut session, "Jo").await.unwrap();
        assert!(matches!(reply, IntakeReply::Reprompt { .. }));
        assert_eq!(session.phase, IntakePhase::CollectingName);
        assert!(session.patient_data.full_name.is_empty());

        let reply = flow.submit(&mut session, "John Doe").await.unwrap();
        assert!(matches!(reply, IntakeReply::Reprompt { .. }));
        assert_eq!(session.phase, IntakePhase::CollectingName);
    }

    #[tokio::test]
    async fn valid_name_advances_to_email() {
        let flow = flow_with(None, "http://localhost:9").await;
        let mut session = session();

        let reply = flow.submit(&mut session, "  John   Smith ").await.unwrap();
        assert_eq!(
            reply,
            IntakeReply::Prompt {
                message: EMAIL_PROMPT.to_string()
            }
        );
        assert_eq!(session.phase, IntakePhase::CollectingEmail);
        assert_eq!(session.patient_data.full_name, "John Smith");
    }

    #[tokio::test]
    async fn bad_email_reprompts_in_place() {
        let flow = flow_with(None, "http://localhost:9").await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();

        let reply = flow.submit(&mut session, "not-an-email").await.unwrap();
        assert!(matches!(reply, IntakeReply::Reprompt { .. }));
        assert_eq!(session.phase, IntakePhase::CollectingEmail);
    }

    #[tokio::test]
    async fn known_email_loads_the_stored_profile() {
        let flow = flow_with(Some(stored_profile()), "http://localhost:9").await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();

        let reply = flow.submit(&mut session, "asha@example.com").await.unwrap();
        assert_eq!(
            reply,
            IntakeReply::Confirmation {
                is_new_patient: false
            }
        );
        assert_eq!(session.phase, IntakePhase::AwaitingConfirmation);
        assert_eq!(session.is_new_patient, Some(false));
        // Stored data overwrites the collected name.
        assert_eq!(session.patient_data.full_name, "Asha Rao");
        assert_eq!(
            session.patient_data.previous_symptoms,
            "migraine (moderate, 3 days)"
        );
    }

    #[tokio::test]
    async fn unknown_email_synthesizes_a_profile() {
        let flow = flow_with(None, "http://localhost:9").await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();

        let reply = flow.submit(&mut session, "new@example.com").await.unwrap();
        assert_eq!(
            reply,
            IntakeReply::Confirmation {
                is_new_patient: true
            }
        );
        assert_eq!(session.is_new_patient, Some(true));
        // The collected name survives synthesis; the email is forced.
        assert_eq!(session.patient_data.full_name, "John Smith");
        assert_eq!(session.patient_data.email, "new@example.com");
        assert_eq!(session.patient_data.gender, "Other");
    }

    #[tokio::test]
    async fn confirm_enters_the_health_assessment() {
        let flow = flow_with(Some(stored_profile()), "http://localhost:9").await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();
        flow.submit(&mut session, "asha@example.com").await.unwrap();

        let reply = flow.confirm(&mut session).unwrap();
        assert_eq!(
            reply,
            IntakeReply::Question {
                message: ASSESSMENT_OPENING.to_string()
            }
        );
        assert_eq!(session.phase, IntakePhase::HealthAssessment);
        assert!(session.data_confirmed);
        assert!(session.in_health_assessment);
        assert_eq!(session.assessment_turns().len(), 1);
    }

    #[tokio::test]
    async fn confirm_outside_confirmation_phase_is_rejected() {
        let flow = flow_with(None, "http://localhost:9").await;
        let mut session = session();

        assert!(matches!(
            flow.confirm(&mut session),
            Err(IntakeError::WrongPhase(IntakePhase::CollectingName))
        ));
    }

    #[tokio::test]
    async fn edit_mutates_fields_and_returns_to_confirmation() {
        let flow = flow_with(Some(stored_profile()), "http://localhost:9").await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();
        flow.submit(&mut session, "asha@example.com").await.unwrap();

        flow.begin_edit(&mut session).unwrap();
        assert_eq!(session.phase, IntakePhase::Editing);

        flow.apply_edit(
            &mut session,
            EditRequest {
                phone: Some("+91-91234-56789".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(session.phase, IntakePhase::AwaitingConfirmation);
        assert_eq!(session.patient_data.phone, "+91-91234-56789");
        // Untouched fields keep their values.
        assert_eq!(session.patient_data.full_name, "Asha Rao");
    }

    #[tokio::test]
    async fn cancel_edit_leaves_the_record_alone() {
        let flow = flow_with(Some(stored_profile()), "http://localhost:9").await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();
        flow.submit(&mut session, "asha@example.com").await.unwrap();

        flow.begin_edit(&mut session).unwrap();
        flow.cancel_edit(&mut session).unwrap();
        assert_eq!(session.phase, IntakePhase::AwaitingConfirmation);
        assert_eq!(session.patient_data.full_name, "Asha Rao");
    }

    #[tokio::test]
    async fn assessment_questions_loop_until_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "How long has the cough lasted?"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_with(Some(stored_profile()), &server.uri()).await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();
        flow.submit(&mut session, "asha@example.com").await.unwrap();
        flow.confirm(&mut session).unwrap();

        let reply = flow.submit(&mut session, "I have a cough").await.unwrap();
        assert_eq!(
            reply,
            IntakeReply::Question {
                message: "How long has the cough lasted?".to_string()
            }
        );
        assert_eq!(session.phase, IntakePhase::HealthAssessment);
        assert!(!session.symptoms_collected);
    }

    #[tokio::test]
    async fn assessment_completion_merges_data_and_finishes() {
        let server = MockServer::start().await;
        let completion = "All done. {\"status\": \"complete\", \"patient_data\": \
                          {\"current_symptoms\": [{\"description\": \"cough\", \
                          \"severity\": \"mild\", \"duration\": \"2 days\"}], \
                          \"other_concerns\": \"none\"}}";
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": completion}]}}]
            })))
            .mount(&server)
            .await;

        let flow = flow_with(Some(stored_profile()), &server.uri()).await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();
        flow.submit(&mut session, "asha@example.com").await.unwrap();
        flow.confirm(&mut session).unwrap();

        let reply = flow.submit(&mut session, "a mild cough, two days").await.unwrap();
        assert_eq!(reply, IntakeReply::Completed);
        assert_eq!(session.phase, IntakePhase::Complete);
        assert!(session.symptoms_collected);
        assert!(!session.in_health_assessment);
        assert_eq!(session.patient_data.current_symptoms.len(), 1);
        assert_eq!(session.patient_data.current_symptoms[0].description, "cough");
        assert_eq!(session.patient_data.other_concerns, "none");
        // The confirmed identity is untouched by the merge.
        assert_eq!(session.patient_data.full_name, "Asha Rao");
    }

    #[tokio::test]
    async fn oracle_failure_during_assessment_reasks_the_question() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let flow = flow_with(Some(stored_profile()), &server.uri()).await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();
        flow.submit(&mut session, "asha@example.com").await.unwrap();
        flow.confirm(&mut session).unwrap();

        let reply = flow.submit(&mut session, "I have a cough").await.unwrap();
        assert_eq!(
            reply,
            IntakeReply::Question {
                message: ASSESSMENT_OPENING.to_string()
            }
        );
        assert_eq!(session.phase, IntakePhase::HealthAssessment);
    }

    #[tokio::test]
    async fn text_input_is_rejected_outside_collecting_phases() {
        let flow = flow_with(Some(stored_profile()), "http://localhost:9").await;
        let mut session = session();
        flow.submit(&mut session, "John Smith").await.unwrap();
        flow.submit(&mut session, "asha@example.com").await.unwrap();

        assert!(matches!(
            flow.submit(&mut session, "hello").await,
            Err(IntakeError::WrongPhase(IntakePhase::AwaitingConfirmation))
        ));
    }
}
