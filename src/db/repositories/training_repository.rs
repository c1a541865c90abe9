use sqlx::{PgExecutor, PgPool};
use time::Date;
use uuid::Uuid;

use crate::db::{DbResult, Training, TrainingFields, TrainingListing};

const TRAINING_COLUMNS: &str = "id, title, description, training_date, start_time, end_time, \
     location, instructor, max_participants, status, created_at, updated_at";

/// Training totals by status for the dashboard.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct TrainingCounts {
    pub total: i64,
    pub upcoming: i64,
    pub ongoing: i64,
    pub completed: i64,
}

pub struct TrainingRepository;

impl TrainingRepository {
    pub async fn list(pool: &PgPool) -> DbResult<Vec<Training>> {
        let sql = format!(
            "SELECT {TRAINING_COLUMNS} FROM trainings \
             ORDER BY training_date DESC NULLS LAST, created_at DESC"
        );
        let trainings = sqlx::query_as::<_, Training>(&sql).fetch_all(pool).await?;
        Ok(trainings)
    }

    pub async fn find_by_id<'e, E>(executor: E, training_id: Uuid) -> DbResult<Option<Training>>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {TRAINING_COLUMNS} FROM trainings WHERE id = $1");
        let training = sqlx::query_as::<_, Training>(&sql)
            .bind(training_id)
            .fetch_optional(executor)
            .await?;
        Ok(training)
    }

    pub async fn find_many(pool: &PgPool, training_ids: &[Uuid]) -> DbResult<Vec<Training>> {
        let sql = format!(
            "SELECT {TRAINING_COLUMNS} FROM trainings WHERE id = ANY($1) \
             ORDER BY training_date DESC NULLS LAST, created_at DESC"
        );
        let trainings = sqlx::query_as::<_, Training>(&sql)
            .bind(training_ids)
            .fetch_all(pool)
            .await?;
        Ok(trainings)
    }

    pub async fn create<'e, E>(executor: E, fields: &TrainingFields) -> DbResult<Training>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            INSERT INTO trainings (title, description, location, instructor, max_participants, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TRAINING_COLUMNS}
            "#
        );
        let training = sqlx::query_as::<_, Training>(&sql)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.location)
            .bind(&fields.instructor)
            .bind(fields.max_participants)
            .bind(fields.status)
            .fetch_one(executor)
            .await?;
        Ok(training)
    }

    pub async fn update<'e, E>(
        executor: E,
        training_id: Uuid,
        fields: &TrainingFields,
    ) -> DbResult<Option<Training>>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            UPDATE trainings
            SET title = $1, description = $2, location = $3, instructor = $4,
                max_participants = $5, status = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING {TRAINING_COLUMNS}
            "#
        );
        let training = sqlx::query_as::<_, Training>(&sql)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.location)
            .bind(&fields.instructor)
            .bind(fields.max_participants)
            .bind(fields.status)
            .bind(training_id)
            .fetch_optional(executor)
            .await?;
        Ok(training)
    }

    /// Days, enrollments and attendance go with it.
    pub async fn delete(pool: &PgPool, training_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(training_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Trainings with at least one day inside `[start, end]`.
    pub async fn ids_scheduled_between(pool: &PgPool, start: Date, end: Date) -> DbResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT training_id FROM training_days WHERE training_date BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }

    /// Trainings with an enrolled participant whose name contains `name`.
    pub async fn ids_with_participant_named(pool: &PgPool, name: &str) -> DbResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT tp.training_id
            FROM training_participants tp
            JOIN participants p ON p.id = tp.participant_id
            WHERE p.name ILIKE $1
            "#,
        )
        .bind(format!("%{}%", name))
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }

    pub async fn counts(pool: &PgPool) -> DbResult<TrainingCounts> {
        let counts = sqlx::query_as::<_, TrainingCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status IN ('scheduled', 'ongoing')) AS upcoming,
                COUNT(*) FILTER (WHERE status = 'ongoing') AS ongoing,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed
            FROM trainings
            "#,
        )
        .fetch_one(pool)
        .await?;
        Ok(counts)
    }

    pub async fn recent(pool: &PgPool, limit: i64) -> DbResult<Vec<TrainingListing>> {
        let listings = sqlx::query_as::<_, TrainingListing>(
            r#"
            SELECT id, title, status, training_date, start_time, location
            FROM trainings
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(listings)
    }

    /// Scheduled or ongoing trainings. A training without a date of its own
    /// takes the date and start time of its earliest day.
    pub async fn active_listings(pool: &PgPool) -> DbResult<Vec<TrainingListing>> {
        let listings = sqlx::query_as::<_, TrainingListing>(
            r#"
            SELECT
                t.id, t.title, t.status,
                COALESCE(t.training_date, first_day.training_date) AS training_date,
                COALESCE(t.start_time, first_day.start_time) AS start_time,
                t.location
            FROM trainings t
            LEFT JOIN LATERAL (
                SELECT d.training_date, d.start_time
                FROM training_days d
                WHERE d.training_id = t.id
                ORDER BY d.training_date, d.day_number
                LIMIT 1
            ) first_day ON TRUE
            WHERE t.status IN ('scheduled', 'ongoing')
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(listings)
    }
}
