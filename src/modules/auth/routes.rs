use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_profile, login, logout, me, update_profile};
use crate::app_state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", get(get_profile).put(update_profile))
}
