use axum::{routing::get, Router};

use super::handlers::attendance_report;
use crate::app_state::AppState;

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/", get(attendance_report))
}
