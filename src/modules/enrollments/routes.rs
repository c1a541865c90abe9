use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{list_training_enrollments, register_participant, unregister_participant, update_enrollment_status};
use crate::app_state::AppState;

pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_participant))
        .route("/training/{training_id}", get(list_training_enrollments))
        .route(
            "/{participant_id}/{training_id}",
            put(update_enrollment_status).delete(unregister_participant),
        )
}
