use axum::{routing::get, Router};

use super::handlers::dashboard_stats;
use crate::app_state::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}
