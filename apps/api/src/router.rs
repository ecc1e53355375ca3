use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;
use intake_cell::router::intake_routes;
use patient_cell::router::patient_routes;
use records_cell::router::records_routes;
use shared_database::AppState;
use triage_cell::router::triage_routes;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Carebook API is running!" }))
        .route("/health", get(health).with_state(state.clone()))
        .nest("/intake", intake_routes(state.clone()))
        .nest("/triage", triage_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/records", records_routes(state))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "configured": state.config.is_configured(),
        "database": state.db.is_healthy().await
    }))
}
