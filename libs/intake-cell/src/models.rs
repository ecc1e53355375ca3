use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phases of the intake conversation, in the order a session moves through
/// them. `Editing` bounces back to `AwaitingConfirmation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakePhase {
    CollectingName,
    CollectingEmail,
    AwaitingConfirmation,
    Editing,
    HealthAssessment,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Bot,
    User,
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }
}

/// What a state-transition call tells the caller to render next.
///
/// `Reprompt` means validation failed and the phase did not move; every
/// other variant reflects an advanced session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntakeReply {
    Reprompt { message: String },
    Prompt { message: String },
    Confirmation { is_new_patient: bool },
    Question { message: String },
    Completed,
}

/// Field updates applied from the edit screen. Absent fields are untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "DOB", alias = "dob")]
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Action not valid in phase {0:?}")]
    WrongPhase(IntakePhase),

    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}
