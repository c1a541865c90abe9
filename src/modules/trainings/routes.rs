use axum::{routing::get, Router};

use super::handlers::{
    create_training, delete_training, get_training, list_training_days, list_trainings,
    update_training,
};
use crate::app_state::AppState;

pub fn training_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trainings).post(create_training))
        .route(
            "/{id}",
            get(get_training).put(update_training).delete(delete_training),
        )
        .route("/{id}/days", get(list_training_days))
}
