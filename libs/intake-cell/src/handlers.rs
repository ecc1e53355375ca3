use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{EditRequest, IntakeError, IntakeReply};
use crate::services::flow::IntakeFlow;
use crate::session::{IntakeSession, SessionStore};

/// Intake router state: the shared app state plus the in-process session
/// store keyed on session tokens.
pub struct IntakeState {
    pub app: Arc<AppState>,
    pub sessions: SessionStore,
}

fn map_intake_error(e: IntakeError) -> AppError {
    match e {
        IntakeError::SessionNotFound => AppError::NotFound(e.to_string()),
        IntakeError::WrongPhase(_) => AppError::BadRequest(e.to_string()),
        IntakeError::Database(msg) => AppError::Database(msg),
        IntakeError::ExternalService(msg) => AppError::ExternalService(msg),
    }
}

fn build_flow(state: &IntakeState) -> Result<IntakeFlow, AppError> {
    IntakeFlow::new(&state.app.db, &state.app.config)
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn load_session(state: &IntakeState, token: Uuid) -> Result<IntakeSession, AppError> {
    state
        .sessions
        .get(token)
        .await
        .ok_or_else(|| map_intake_error(IntakeError::SessionNotFound))
}

fn reply_body(session: &IntakeSession, reply: &IntakeReply) -> Value {
    json!({
        "token": session.token,
        "phase": session.phase,
        "reply": reply
    })
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<Arc<IntakeState>>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.create().await;

    Ok(Json(json!({
        "token": session.token,
        "phase": session.phase,
        "message": session.transcript.last().map(|turn| turn.text.clone())
    })))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<IntakeState>>,
    Path(token): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = load_session(&state, token).await?;
    Ok(Json(json!(session)))
}

#[axum::debug_handler]
pub async fn reset_session(
    State(state): State<Arc<IntakeState>>,
    Path(token): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.sessions.remove(token).await {
        return Err(AppError::NotFound("Session not found".to_string()));
    }
    Ok(Json(json!({"status": "discarded"})))
}

#[axum::debug_handler]
pub async fn submit_message(
    State(state): State<Arc<IntakeState>>,
    Path(token): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<Value>, AppError> {
    let flow = build_flow(&state)?;
    let mut session = load_session(&state, token).await?;

    let reply = flow
        .submit(&mut session, &request.text)
        .await
        .map_err(map_intake_error)?;

    let body = reply_body(&session, &reply);
    state.sessions.put(session).await;
    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn confirm_details(
    State(state): State<Arc<IntakeState>>,
    Path(token): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let flow = build_flow(&state)?;
    let mut session = load_session(&state, token).await?;

    let reply = flow.confirm(&mut session).map_err(map_intake_error)?;

    let body = reply_body(&session, &reply);
    state.sessions.put(session).await;
    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn begin_edit(
    State(state): State<Arc<IntakeState>>,
    Path(token): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let flow = build_flow(&state)?;
    let mut session = load_session(&state, token).await?;

    flow.begin_edit(&mut session).map_err(map_intake_error)?;

    let body = json!({
        "token": session.token,
        "phase": session.phase,
        "patient_data": session.patient_data
    });
    state.sessions.put(session).await;
    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn apply_edit(
    State(state): State<Arc<IntakeState>>,
    Path(token): Path<Uuid>,
    Json(edit): Json<EditRequest>,
) -> Result<Json<Value>, AppError> {
    let flow = build_flow(&state)?;
    let mut session = load_session(&state, token).await?;

    flow.apply_edit(&mut session, edit).map_err(map_intake_error)?;

    let body = json!({
        "token": session.token,
        "phase": session.phase,
        "patient_data": session.patient_data
    });
    state.sessions.put(session).await;
    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn cancel_edit(
    State(state): State<Arc<IntakeState>>,
    Path(token): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let flow = build_flow(&state)?;
    let mut session = load_session(&state, token).await?;

    flow.cancel_edit(&mut session).map_err(map_intake_error)?;

    let body = json!({
        "token": session.token,
        "phase": session.phase
    });
    state.sessions.put(session).await;
    Ok(Json(body))
}
