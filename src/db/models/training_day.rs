use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime, Time};

use super::formats::{clock, iso_date};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct TrainingDay {
    pub id: Uuid,
    pub training_id: Uuid,
    pub day_number: i32,
    #[serde(with = "iso_date")]
    pub training_date: Date,
    #[serde(with = "clock")]
    pub start_time: Time,
    #[serde(with = "clock")]
    pub end_time: Time,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The full content a training day should have after a create or edit.
///
/// This is what a reconciled day is written with, whether it ends up reusing
/// an existing row or creating a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredDay {
    pub day_number: i32,
    pub training_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub description: Option<String>,
}

/// A day as posted by the dashboard. Date and times are required; the
/// rest falls back to the training or to the day's position.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrainingDayInput {
    pub day_number: Option<i32>,
    #[serde(default, with = "iso_date::option")]
    pub training_date: Option<Date>,
    #[serde(default, with = "clock::option")]
    pub start_time: Option<Time>,
    #[serde(default, with = "clock::option")]
    pub end_time: Option<Time>,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub description: Option<String>,
}
