use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{
    repositories::{
        AttendanceRepository, EnrollmentRepository, ParticipantRepository, TrainingDayRepository,
        TrainingRepository,
    },
    DailyAttendance, DayWithAttendance, EnrollmentHistory, Page, PageQuery, Participant,
    ParticipantInput, Training, TrainingCount, TrainingDay, TrainingParticipant,
};
use crate::error::{AppError, AppJson, AppResult};
use crate::middleware::CurrentUser;

fn participant_not_found() -> AppError {
    AppError::NotFound("Participant not found".to_string())
}

pub async fn list_participants(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Participant>>> {
    let (participants, total) = ParticipantRepository::list(&state.db, &query).await?;
    Ok(Json(Page::new(participants, total, &query)))
}

pub async fn create_participant(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppJson(body): AppJson<ParticipantInput>,
) -> AppResult<(StatusCode, Json<Participant>)> {
    body.validate()?;
    let participant = ParticipantRepository::create(&state.db, &body).await?;
    info!(participant_id = %participant.id, "Participant created");
    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn get_participant(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Participant>> {
    let participant = ParticipantRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(participant_not_found)?;
    Ok(Json(participant))
}

pub async fn update_participant(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<ParticipantInput>,
) -> AppResult<Json<Participant>> {
    body.validate()?;
    let participant = ParticipantRepository::update(&state.db, id, &body)
        .await?
        .ok_or_else(participant_not_found)?;
    info!(participant_id = %id, "Participant updated");
    Ok(Json(participant))
}

pub async fn delete_participant(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !ParticipantRepository::delete(&state.db, id).await? {
        return Err(participant_not_found());
    }
    info!(participant_id = %id, "Participant deleted");
    Ok(Json(json!({ "success": true })))
}

pub async fn participant_training_count(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingCount>> {
    let count = ParticipantRepository::training_count(&state.db, id).await?;
    Ok(Json(TrainingCount { count }))
}

/// Every enrollment of the participant with its training and, per day,
/// the attendance record if one exists.
pub async fn participant_trainings(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<EnrollmentHistory>>> {
    let enrollments = EnrollmentRepository::list_for_participant(&state.db, id).await?;
    if enrollments.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let training_ids: Vec<Uuid> = enrollments.iter().map(|e| e.training_id).collect();
    let enrollment_ids: Vec<Uuid> = enrollments.iter().map(|e| e.id).collect();

    let trainings = TrainingRepository::find_many(&state.db, &training_ids).await?;
    let days = TrainingDayRepository::list_for_trainings(&state.db, &training_ids).await?;
    let attendance = AttendanceRepository::list_for_enrollments(&state.db, &enrollment_ids).await?;

    Ok(Json(assemble_history(enrollments, trainings, days, attendance)))
}

/// Enrollment order is kept. Enrollments whose training is gone are skipped.
fn assemble_history(
    enrollments: Vec<TrainingParticipant>,
    trainings: Vec<Training>,
    days: Vec<TrainingDay>,
    attendance: Vec<DailyAttendance>,
) -> Vec<EnrollmentHistory> {
    let trainings: HashMap<Uuid, Training> = trainings.into_iter().map(|t| (t.id, t)).collect();

    let mut days_by_training: HashMap<Uuid, Vec<TrainingDay>> = HashMap::new();
    for day in days {
        days_by_training.entry(day.training_id).or_default().push(day);
    }

    let mut records: HashMap<(Uuid, Uuid), DailyAttendance> = attendance
        .into_iter()
        .map(|a| ((a.training_participant_id, a.training_day_id), a))
        .collect();

    enrollments
        .into_iter()
        .filter_map(|enrollment| {
            let training = trainings.get(&enrollment.training_id)?.clone();
            let mut days: Vec<DayWithAttendance> = days_by_training
                .get(&enrollment.training_id)
                .into_iter()
                .flatten()
                .map(|day| DayWithAttendance {
                    attendance: records.remove(&(enrollment.id, day.id)),
                    day: day.clone(),
                })
                .collect();
            days.sort_by_key(|d| d.day.day_number);

            Some(EnrollmentHistory {
                enrollment,
                training,
                days,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AttendanceStatus, TrainingStatus};
    use crate::services::day_sync::tests::stored;
    use time::macros::{date, datetime};

    fn training(id: Uuid) -> Training {
        Training {
            id,
            title: "First aid".to_string(),
            description: None,
            training_date: None,
            start_time: None,
            end_time: None,
            location: None,
            instructor: None,
            max_participants: None,
            status: TrainingStatus::Scheduled,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00 UTC),
        }
    }

    fn enrollment(id: u128, training_id: Uuid) -> TrainingParticipant {
        TrainingParticipant {
            id: Uuid::from_u128(id),
            participant_id: Uuid::from_u128(1),
            training_id,
            registration_date: datetime!(2024-01-02 00:00 UTC),
            attendance_status: AttendanceStatus::Registered,
            attendance_time: None,
            notes: None,
            created_at: datetime!(2024-01-02 00:00 UTC),
            updated_at: datetime!(2024-01-02 00:00 UTC),
        }
    }

    #[test]
    fn history_attaches_days_and_their_records() {
        // `stored` days all belong to training 7.
        let training_id = Uuid::from_u128(7);
        let day_one = stored(Uuid::from_u128(11), 1, date!(2024 - 01 - 10));
        let day_two = stored(Uuid::from_u128(12), 2, date!(2024 - 01 - 11));
        let record = DailyAttendance {
            id: Uuid::from_u128(900),
            training_participant_id: Uuid::from_u128(100),
            training_day_id: day_two.id,
            attendance_status: AttendanceStatus::Attended,
            attendance_time: Some(datetime!(2024-01-11 09:00 UTC)),
            notes: None,
            created_at: datetime!(2024-01-11 09:00 UTC),
            updated_at: datetime!(2024-01-11 09:00 UTC),
        };

        let history = assemble_history(
            vec![enrollment(100, training_id), enrollment(200, Uuid::from_u128(99))],
            vec![training(training_id)],
            vec![day_two, day_one],
            vec![record],
        );

        // The enrollment whose training no longer exists is dropped.
        assert_eq!(history.len(), 1);
        let days = &history[0].days;
        assert_eq!(days[0].day.day_number, 1);
        assert!(days[0].attendance.is_none());
        assert_eq!(
            days[1].attendance.as_ref().map(|a| a.attendance_status),
            Some(AttendanceStatus::Attended)
        );
    }
}
