use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{
    AttendanceStatus, DbResult, EnrollmentWithParticipant, Participant, TrainingParticipant,
};

const ENROLLMENT_COLUMNS: &str = "id, participant_id, training_id, registration_date, \
     attendance_status, attendance_time, notes, created_at, updated_at";

/// Enrollment joined with its participant; participant columns are
/// prefixed to keep them apart from the enrollment's.
#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    #[sqlx(flatten)]
    enrollment: TrainingParticipant,
    p_name: String,
    p_email: String,
    p_phone: Option<String>,
    p_address: Option<String>,
    p_created_at: OffsetDateTime,
    p_updated_at: OffsetDateTime,
}

impl From<EnrollmentRow> for EnrollmentWithParticipant {
    fn from(row: EnrollmentRow) -> Self {
        let participant = Participant {
            id: row.enrollment.participant_id,
            name: row.p_name,
            email: row.p_email,
            phone: row.p_phone,
            address: row.p_address,
            created_at: row.p_created_at,
            updated_at: row.p_updated_at,
        };
        Self {
            enrollment: row.enrollment,
            participant,
        }
    }
}

const ENROLLMENT_WITH_PARTICIPANT: &str = r#"
    SELECT
        tp.id, tp.participant_id, tp.training_id, tp.registration_date,
        tp.attendance_status, tp.attendance_time, tp.notes, tp.created_at, tp.updated_at,
        p.name AS p_name, p.email AS p_email, p.phone AS p_phone, p.address AS p_address,
        p.created_at AS p_created_at, p.updated_at AS p_updated_at
    FROM training_participants tp
    JOIN participants p ON p.id = tp.participant_id
"#;

pub struct EnrollmentRepository;

impl EnrollmentRepository {
    pub async fn register(
        pool: &PgPool,
        participant_id: Uuid,
        training_id: Uuid,
    ) -> DbResult<TrainingParticipant> {
        let sql = format!(
            r#"
            INSERT INTO training_participants (participant_id, training_id)
            VALUES ($1, $2)
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        );
        let enrollment = sqlx::query_as::<_, TrainingParticipant>(&sql)
            .bind(participant_id)
            .bind(training_id)
            .fetch_one(pool)
            .await?;
        Ok(enrollment)
    }

    pub async fn find(
        pool: &PgPool,
        participant_id: Uuid,
        training_id: Uuid,
    ) -> DbResult<Option<TrainingParticipant>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM training_participants \
             WHERE participant_id = $1 AND training_id = $2"
        );
        let enrollment = sqlx::query_as::<_, TrainingParticipant>(&sql)
            .bind(participant_id)
            .bind(training_id)
            .fetch_optional(pool)
            .await?;
        Ok(enrollment)
    }

    /// Newest registration first.
    pub async fn list_for_training(
        pool: &PgPool,
        training_id: Uuid,
    ) -> DbResult<Vec<EnrollmentWithParticipant>> {
        let sql = format!(
            "{ENROLLMENT_WITH_PARTICIPANT} WHERE tp.training_id = $1 ORDER BY tp.registration_date DESC"
        );
        let rows = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(training_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Enrollments of several trainings, optionally only participants whose
    /// name contains `participant_name`. Ordered by participant name.
    pub async fn list_for_trainings(
        pool: &PgPool,
        training_ids: &[Uuid],
        participant_name: Option<&str>,
    ) -> DbResult<Vec<EnrollmentWithParticipant>> {
        let sql = format!(
            "{ENROLLMENT_WITH_PARTICIPANT} \
             WHERE tp.training_id = ANY($1) AND ($2::text IS NULL OR p.name ILIKE $2) \
             ORDER BY p.name, tp.registration_date"
        );
        let rows = sqlx::query_as::<_, EnrollmentRow>(&sql)
            .bind(training_ids)
            .bind(participant_name.map(|name| format!("%{}%", name)))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_for_participant(
        pool: &PgPool,
        participant_id: Uuid,
    ) -> DbResult<Vec<TrainingParticipant>> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM training_participants \
             WHERE participant_id = $1 ORDER BY registration_date DESC"
        );
        let enrollments = sqlx::query_as::<_, TrainingParticipant>(&sql)
            .bind(participant_id)
            .fetch_all(pool)
            .await?;
        Ok(enrollments)
    }

    /// `notes` of `None` keeps the stored notes.
    pub async fn update_status(
        pool: &PgPool,
        participant_id: Uuid,
        training_id: Uuid,
        status: AttendanceStatus,
        attendance_time: Option<OffsetDateTime>,
        notes: Option<&str>,
    ) -> DbResult<Option<TrainingParticipant>> {
        let sql = format!(
            r#"
            UPDATE training_participants
            SET attendance_status = $1, attendance_time = $2,
                notes = COALESCE($3, notes), updated_at = NOW()
            WHERE participant_id = $4 AND training_id = $5
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        );
        let enrollment = sqlx::query_as::<_, TrainingParticipant>(&sql)
            .bind(status)
            .bind(attendance_time)
            .bind(notes)
            .bind(participant_id)
            .bind(training_id)
            .fetch_optional(pool)
            .await?;
        Ok(enrollment)
    }

    pub async fn unregister(pool: &PgPool, participant_id: Uuid, training_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            "DELETE FROM training_participants WHERE participant_id = $1 AND training_id = $2",
        )
        .bind(participant_id)
        .bind(training_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
