use axum::{routing::get, Router};

use super::handlers::{
    create_participant, delete_participant, get_participant, list_participants,
    participant_training_count, participant_trainings, update_participant,
};
use crate::app_state::AppState;

pub fn participant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_participants).post(create_participant))
        .route(
            "/{id}",
            get(get_participant)
                .put(update_participant)
                .delete(delete_participant),
        )
        .route("/{id}/training-count", get(participant_training_count))
        .route("/{id}/trainings", get(participant_trainings))
}
