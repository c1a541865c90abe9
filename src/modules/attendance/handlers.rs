use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{
    repositories::{AttendanceRepository, EnrollmentRepository, TrainingDayRepository},
    stamped_attendance_time, AttendancePlaceholder, DailyAttendance, RecordAttendance,
};
use crate::error::{AppError, AppJson, AppResult};
use crate::middleware::CurrentUser;

/// Upsert the record for (enrollment, day).
pub async fn record_attendance(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppJson(body): AppJson<RecordAttendance>,
) -> AppResult<Json<DailyAttendance>> {
    let attendance_time = stamped_attendance_time(
        body.attendance_status,
        body.attendance_time,
        OffsetDateTime::now_utc(),
    );

    let record = AttendanceRepository::upsert(
        &state.db,
        body.training_participant_id,
        body.training_day_id,
        body.attendance_status,
        attendance_time,
        body.notes.as_deref(),
    )
    .await?;

    info!(
        training_participant_id = %record.training_participant_id,
        training_day_id = %record.training_day_id,
        status = ?record.attendance_status,
        "Daily attendance recorded"
    );
    Ok(Json(record))
}

/// The stored record, or a `registered` placeholder when the participant
/// is not enrolled in the day's training or has no record yet.
pub async fn get_daily_attendance(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((participant_id, day_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Value>> {
    let day = TrainingDayRepository::find_by_id(&state.db, day_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Training day not found".to_string()))?;

    let Some(enrollment) =
        EnrollmentRepository::find(&state.db, participant_id, day.training_id).await?
    else {
        debug!(%participant_id, %day_id, "No enrollment for day, returning placeholder");
        return Ok(Json(placeholder()?));
    };

    let value = match AttendanceRepository::find(&state.db, enrollment.id, day_id).await? {
        Some(record) => to_value(&record)?,
        None => placeholder()?,
    };
    Ok(Json(value))
}

fn placeholder() -> AppResult<Value> {
    to_value(&AttendancePlaceholder::default())
}

fn to_value<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::InternalServerError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_reads_as_registered_without_time() {
        assert_eq!(
            placeholder().unwrap(),
            json!({ "attendance_status": "registered", "attendance_time": null, "notes": null })
        );
    }
}
