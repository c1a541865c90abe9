use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{AttendanceStatus, DailyAttendance, DbResult};

const ATTENDANCE_COLUMNS: &str = "id, training_participant_id, training_day_id, attendance_status, \
     attendance_time, notes, created_at, updated_at";

/// Attended rows and all rows, for the dashboard attendance rate.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct AttendanceTally {
    pub attended: i64,
    pub total: i64,
}

impl AttendanceTally {
    /// Percentage rounded to one decimal; zero when nothing is recorded.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.attended as f64 * 1000.0 / self.total as f64).round() / 10.0
    }
}

pub struct AttendanceRepository;

impl AttendanceRepository {
    /// Insert or overwrite the record for (enrollment, day).
    pub async fn upsert(
        pool: &PgPool,
        training_participant_id: Uuid,
        training_day_id: Uuid,
        status: AttendanceStatus,
        attendance_time: Option<OffsetDateTime>,
        notes: Option<&str>,
    ) -> DbResult<DailyAttendance> {
        let sql = format!(
            r#"
            INSERT INTO daily_attendance
                (training_participant_id, training_day_id, attendance_status, attendance_time, notes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (training_participant_id, training_day_id) DO UPDATE
            SET attendance_status = EXCLUDED.attendance_status,
                attendance_time = EXCLUDED.attendance_time,
                notes = EXCLUDED.notes,
                updated_at = NOW()
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        );
        let record = sqlx::query_as::<_, DailyAttendance>(&sql)
            .bind(training_participant_id)
            .bind(training_day_id)
            .bind(status)
            .bind(attendance_time)
            .bind(notes)
            .fetch_one(pool)
            .await?;
        Ok(record)
    }

    pub async fn find(
        pool: &PgPool,
        training_participant_id: Uuid,
        training_day_id: Uuid,
    ) -> DbResult<Option<DailyAttendance>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM daily_attendance \
             WHERE training_participant_id = $1 AND training_day_id = $2"
        );
        let record = sqlx::query_as::<_, DailyAttendance>(&sql)
            .bind(training_participant_id)
            .bind(training_day_id)
            .fetch_optional(pool)
            .await?;
        Ok(record)
    }

    pub async fn list_for_enrollments(
        pool: &PgPool,
        enrollment_ids: &[Uuid],
    ) -> DbResult<Vec<DailyAttendance>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM daily_attendance WHERE training_participant_id = ANY($1)"
        );
        let records = sqlx::query_as::<_, DailyAttendance>(&sql)
            .bind(enrollment_ids)
            .fetch_all(pool)
            .await?;
        Ok(records)
    }

    pub async fn tally(pool: &PgPool) -> DbResult<AttendanceTally> {
        let tally = sqlx::query_as::<_, AttendanceTally>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE attendance_status = 'attended') AS attended,
                COUNT(*) AS total
            FROM daily_attendance
            "#,
        )
        .fetch_one(pool)
        .await?;
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_a_rounded_percentage() {
        assert_eq!(AttendanceTally { attended: 0, total: 0 }.rate(), 0.0);
        assert_eq!(AttendanceTally { attended: 3, total: 4 }.rate(), 75.0);
        assert_eq!(AttendanceTally { attended: 1, total: 3 }.rate(), 33.3);
    }
}
