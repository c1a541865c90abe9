use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_daily_attendance, record_attendance};
use crate::app_state::AppState;

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_attendance))
        .route("/{participant_id}/{day_id}", get(get_daily_attendance))
}
