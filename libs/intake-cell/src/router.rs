use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_database::AppState;

use crate::handlers::{self, IntakeState};
use crate::session::SessionStore;

pub fn intake_routes(state: Arc<AppState>) -> Router {
    let intake_state = Arc::new(IntakeState {
        app: state,
        sessions: SessionStore::new(),
    });

    Router::new()
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{token}",
            get(handlers::get_session).delete(handlers::reset_session),
        )
        .route("/sessions/{token}/messages", post(handlers::submit_message))
        .route("/sessions/{token}/confirm", post(handlers::confirm_details))
        .route(
            "/sessions/{token}/edit",
            post(handlers::begin_edit)
                .put(handlers::apply_edit)
                .delete(handlers::cancel_edit),
        )
        .with_state(intake_state)
}
