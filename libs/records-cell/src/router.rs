use std::sync::Arc;

use axum::{routing::post, Router};

use shared_database::AppState;

use crate::handlers;

pub fn records_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/map", post(handlers::map_record))
        .route("/import", post(handlers::import_operations))
        .route("/submit", post(handlers::submit_record))
        .with_state(state)
}
