use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::PatientRecord;

use crate::models::{IntakePhase, Turn};

pub const OPENING_PROMPT: &str = "Please enter your full name:";

/// One conversation's full state: phase tag, accumulated record, transcript
/// and progress flags. Serializable so a session store could be external;
/// in-process it lives in [`SessionStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeSession {
    pub token: Uuid,
    pub phase: IntakePhase,
    pub patient_data: PatientRecord,
    pub transcript: Vec<Turn>,
    pub data_confirmed: bool,
    pub in_health_assessment: bool,
    pub symptoms_collected: bool,
    pub is_new_patient: Option<bool>,
    /// Index into `transcript` where the health assessment began; only the
    /// turns from here on are replayed to the oracle.
    pub assessment_start: usize,
}

impl IntakeSession {
    pub fn new(token: Uuid) -> Self {
        Self {
            token,
            phase: IntakePhase::CollectingName,
            patient_data: PatientRecord::default(),
            transcript: vec![Turn::bot(OPENING_PROMPT)],
            data_confirmed: false,
            in_health_assessment: false,
            symptoms_collected: false,
            is_new_patient: None,
            assessment_start: 0,
        }
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::bot(text));
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::user(text));
    }

    /// Turns belonging to the health assessment conversation.
    pub fn assessment_turns(&self) -> &[Turn] {
        &self.transcript[self.assessment_start.min(self.transcript.len())..]
    }
}

/// Token-keyed store for active sessions. One conversation is only ever
/// driven by one request at a time; the lock is for the map, not for
/// cross-request coordination.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, IntakeSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> IntakeSession {
        let session = IntakeSession::new(Uuid::new_v4());
        self.sessions
            .write()
            .await
            .insert(session.token, session.clone());
        session
    }

    pub async fn get(&self, token: Uuid) -> Option<IntakeSession> {
        self.sessions.read().await.get(&token).cloned()
    }

    pub async fn put(&self, session: IntakeSession) {
        self.sessions.write().await.insert(session.token, session);
    }

    pub async fn remove(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }
}
