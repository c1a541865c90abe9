use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

use super::formats::{clock, iso_date};
use super::{TrainingDay, TrainingDayInput};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "training_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    #[default]
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

/// A training. Its schedule lives in `training_days`; the date and time
/// columns here are legacy single-day fields and stay empty for trainings
/// created through the API.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Training {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "iso_date::option")]
    pub training_date: Option<Date>,
    #[serde(with = "clock::option")]
    pub start_time: Option<Time>,
    #[serde(with = "clock::option")]
    pub end_time: Option<Time>,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub max_participants: Option<i32>,
    pub status: TrainingStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingWithDays {
    #[serde(flatten)]
    pub training: Training,
    pub days: Vec<TrainingDay>,
}

/// Body of both create and update.
#[derive(Debug, Deserialize, Validate)]
pub struct TrainingInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub instructor: Option<String>,
    #[validate(range(min = 1, message = "max_participants must be positive"))]
    pub max_participants: Option<i32>,
    pub status: Option<TrainingStatus>,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one training day is required"))]
    pub days: Vec<TrainingDayInput>,
}

/// Training header fields written by create and update.
#[derive(Debug, Clone)]
pub struct TrainingFields {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub max_participants: Option<i32>,
    pub status: TrainingStatus,
}

/// Compact row used by dashboard listings.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TrainingListing {
    pub id: Uuid,
    pub title: String,
    pub status: TrainingStatus,
    #[serde(with = "iso_date::option")]
    pub training_date: Option<Date>,
    #[serde(with = "clock::option")]
    pub start_time: Option<Time>,
    pub location: Option<String>,
}
