use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

use super::{DailyAttendance, Participant, Training, TrainingDay};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Registered,
    Attended,
    Absent,
    Cancelled,
}

/// A participant's enrollment in a training.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TrainingParticipant {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub training_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub registration_date: OffsetDateTime,
    pub attendance_status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub attendance_time: Option<OffsetDateTime>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentWithParticipant {
    #[serde(flatten)]
    pub enrollment: TrainingParticipant,
    pub participant: Participant,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayWithAttendance {
    #[serde(flatten)]
    pub day: TrainingDay,
    pub attendance: Option<DailyAttendance>,
}

/// A participant's enrollment with the training and its per-day attendance.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentHistory {
    #[serde(flatten)]
    pub enrollment: TrainingParticipant,
    pub training: Training,
    pub days: Vec<DayWithAttendance>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterParticipant {
    pub participant_id: Uuid,
    pub training_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEnrollmentStatus {
    pub attendance_status: AttendanceStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub attendance_time: Option<OffsetDateTime>,
    /// Left untouched when absent from the request.
    pub notes: Option<String>,
}

/// The time stored with a status write: attended keeps the supplied time or
/// stamps `now`; every other status clears it.
pub fn stamped_attendance_time(
    status: AttendanceStatus,
    supplied: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    match status {
        AttendanceStatus::Attended => Some(supplied.unwrap_or(now)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn attended_defaults_to_now() {
        let now = datetime!(2024-01-10 09:05 UTC);
        assert_eq!(
            stamped_attendance_time(AttendanceStatus::Attended, None, now),
            Some(now)
        );
        let supplied = datetime!(2024-01-10 08:55 UTC);
        assert_eq!(
            stamped_attendance_time(AttendanceStatus::Attended, Some(supplied), now),
            Some(supplied)
        );
    }

    #[test]
    fn other_statuses_clear_the_time() {
        let now = datetime!(2024-01-10 09:05 UTC);
        for status in [
            AttendanceStatus::Registered,
            AttendanceStatus::Absent,
            AttendanceStatus::Cancelled,
        ] {
            assert_eq!(stamped_attendance_time(status, Some(now), now), None);
        }
    }
}
