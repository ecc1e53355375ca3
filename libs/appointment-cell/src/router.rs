use std::sync::Arc;

use axum::{routing::post, Router};

use shared_database::AppState;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/reserve", post(handlers::reserve_slot))
        .route("/auto-book", post(handlers::auto_book))
        .with_state(state)
}
