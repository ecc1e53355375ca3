use std::sync::Arc;

use axum::{routing::post, Router};

use shared_database::AppState;

use crate::handlers;

pub fn triage_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/recommend", post(handlers::recommend_specialists))
        .with_state(state)
}
