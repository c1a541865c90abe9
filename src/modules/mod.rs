pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod enrollments;
pub mod participants;
pub mod reports;
pub mod trainings;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Everything served under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::routes::auth_routes())
        .nest("/users", users::routes::user_routes())
        .nest("/participants", participants::routes::participant_routes())
        .nest("/trainings", trainings::routes::training_routes())
        .nest("/training-participants", enrollments::routes::enrollment_routes())
        .nest("/daily-attendance", attendance::routes::attendance_routes())
        .nest("/reports", reports::routes::report_routes())
        .nest("/dashboard", dashboard::routes::dashboard_routes())
}

