use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{
    repositories::{TrainingDayRepository, TrainingRepository},
    Training, TrainingDay, TrainingFields, TrainingInput, TrainingWithDays,
};
use crate::error::{AppError, AppJson, AppResult};
use crate::middleware::CurrentUser;
use crate::services::day_sync::{desired_days_from_input, reconcile, sync_training_days};

fn training_not_found() -> AppError {
    AppError::NotFound("Training not found".to_string())
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn training_fields(input: &TrainingInput) -> TrainingFields {
    TrainingFields {
        title: input.title.trim().to_string(),
        description: blank_to_none(&input.description),
        location: blank_to_none(&input.location),
        instructor: blank_to_none(&input.instructor),
        max_participants: input.max_participants,
        status: input.status.unwrap_or_default(),
    }
}

pub async fn list_trainings(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<Training>>> {
    Ok(Json(TrainingRepository::list(&state.db).await?))
}

/// The training and all of its days are written in one transaction.
pub async fn create_training(
    State(state): State<AppState>,
    _user: CurrentUser,
    AppJson(body): AppJson<TrainingInput>,
) -> AppResult<(StatusCode, Json<TrainingWithDays>)> {
    body.validate()?;
    let fields = training_fields(&body);
    let desired = desired_days_from_input(
        &body.days,
        fields.location.as_deref(),
        fields.instructor.as_deref(),
    )?;

    let mut tx = state.db.begin().await?;
    let training = TrainingRepository::create(&mut *tx, &fields).await?;
    let days = reconcile(&mut tx, training.id, &[], &desired).await?;
    tx.commit().await?;

    info!(training_id = %training.id, days = days.len(), "Training created");
    Ok((StatusCode::CREATED, Json(TrainingWithDays { training, days })))
}

pub async fn get_training(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingWithDays>> {
    let training = TrainingRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(training_not_found)?;
    let days = TrainingDayRepository::list_for_training(&state.db, id).await?;
    Ok(Json(TrainingWithDays { training, days }))
}

/// Header update and day reconciliation commit together or not at all.
pub async fn update_training(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<TrainingInput>,
) -> AppResult<Json<TrainingWithDays>> {
    body.validate()?;
    let fields = training_fields(&body);
    let desired = desired_days_from_input(
        &body.days,
        fields.location.as_deref(),
        fields.instructor.as_deref(),
    )?;

    let mut tx = state.db.begin().await?;
    let training = TrainingRepository::update(&mut *tx, id, &fields)
        .await?
        .ok_or_else(training_not_found)?;
    let days = sync_training_days(&mut tx, id, &desired).await?;
    tx.commit().await?;

    info!(training_id = %id, days = days.len(), "Training updated");
    Ok(Json(TrainingWithDays { training, days }))
}

pub async fn delete_training(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !TrainingRepository::delete(&state.db, id).await? {
        return Err(training_not_found());
    }
    info!(training_id = %id, "Training deleted");
    Ok(Json(json!({ "success": true })))
}

pub async fn list_training_days(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<TrainingDay>>> {
    Ok(Json(TrainingDayRepository::list_for_training(&state.db, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_are_dropped() {
        let input: TrainingInput = serde_json::from_value(json!({
            "title": "  Fire drill ",
            "location": "   ",
            "instructor": "Sam",
            "days": [],
        }))
        .unwrap();

        let fields = training_fields(&input);
        assert_eq!(fields.title, "Fire drill");
        assert_eq!(fields.location, None);
        assert_eq!(fields.instructor.as_deref(), Some("Sam"));
        assert_eq!(fields.status, crate::db::TrainingStatus::Scheduled);
    }

    #[test]
    fn input_without_days_fails_validation() {
        let input: TrainingInput = serde_json::from_value(json!({ "title": "Fire drill" })).unwrap();
        let err = AppError::from(input.validate().unwrap_err());
        assert!(err.to_string().contains("At least one training day is required"));
    }
}
