use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

use super::AttendanceStatus;

/// One participant's status for one training day.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct DailyAttendance {
    pub id: Uuid,
    pub training_participant_id: Uuid,
    pub training_day_id: Uuid,
    pub attendance_status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub attendance_time: Option<OffsetDateTime>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct RecordAttendance {
    pub training_participant_id: Uuid,
    pub training_day_id: Uuid,
    pub attendance_status: AttendanceStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub attendance_time: Option<OffsetDateTime>,
    pub notes: Option<String>,
}

/// Returned when a participant has no record for a day yet.
#[derive(Debug, Clone, Serialize)]
pub struct AttendancePlaceholder {
    pub attendance_status: AttendanceStatus,
    pub attendance_time: Option<String>,
    pub notes: Option<String>,
}

impl Default for AttendancePlaceholder {
    fn default() -> Self {
        Self {
            attendance_status: AttendanceStatus::Registered,
            attendance_time: None,
            notes: None,
        }
    }
}
