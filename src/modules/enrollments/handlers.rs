use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{
    repositories::EnrollmentRepository, stamped_attendance_time, EnrollmentWithParticipant,
    RegisterParticipant, TrainingParticipant, UpdateEnrollmentStatus,
};
use crate::error::{AppError, AppJson, AppResult};
use crate::middleware::CurrentUser;

fn enrollment_not_found() -> AppError {
    AppError::NotFound("Participant is not registered for this training".to_string())
}

pub async fn register_participant(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppJson(body): AppJson<RegisterParticipant>,
) -> AppResult<(StatusCode, Json<TrainingParticipant>)> {
    if EnrollmentRepository::find(&state.db, body.participant_id, body.training_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Participant is already registered for this training".to_string(),
        ));
    }

    let enrollment =
        EnrollmentRepository::register(&state.db, body.participant_id, body.training_id).await?;

    info!(
        participant_id = %body.participant_id,
        training_id = %body.training_id,
        "Participant registered"
    );
    Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn list_training_enrollments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(training_id): Path<Uuid>,
) -> AppResult<Json<Vec<EnrollmentWithParticipant>>> {
    Ok(Json(
        EnrollmentRepository::list_for_training(&state.db, training_id).await?,
    ))
}

/// Training-level status. Attended keeps the given time or stamps now;
/// any other status clears it.
pub async fn update_enrollment_status(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((participant_id, training_id)): Path<(Uuid, Uuid)>,
    AppJson(body): AppJson<UpdateEnrollmentStatus>,
) -> AppResult<Json<TrainingParticipant>> {
    let attendance_time = stamped_attendance_time(
        body.attendance_status,
        body.attendance_time,
        OffsetDateTime::now_utc(),
    );

    let enrollment = EnrollmentRepository::update_status(
        &state.db,
        participant_id,
        training_id,
        body.attendance_status,
        attendance_time,
        body.notes.as_deref(),
    )
    .await?
    .ok_or_else(enrollment_not_found)?;

    info!(
        %participant_id,
        %training_id,
        status = ?enrollment.attendance_status,
        "Enrollment status updated"
    );
    Ok(Json(enrollment))
}

pub async fn unregister_participant(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((participant_id, training_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Value>> {
    if !EnrollmentRepository::unregister(&state.db, participant_id, training_id).await? {
        return Err(enrollment_not_found());
    }
    info!(%participant_id, %training_id, "Participant unregistered");
    Ok(Json(json!({ "success": true })))
}
