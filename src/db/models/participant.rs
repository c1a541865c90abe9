use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Body of both create and update: the dashboard always posts the full record.
#[derive(Debug, Deserialize, Validate)]
pub struct ParticipantInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name and email are required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name and email are required"))]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingCount {
    pub count: i64,
}
