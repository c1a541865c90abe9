use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db::{DbResult, DesiredDay, TrainingDay};
use crate::services::day_sync::DayStore;

const DAY_COLUMNS: &str = "id, training_id, day_number, training_date, start_time, end_time, \
     location, instructor, description, created_at, updated_at";

pub struct TrainingDayRepository;

impl TrainingDayRepository {
    pub async fn list_for_training<'e, E>(executor: E, training_id: Uuid) -> DbResult<Vec<TrainingDay>>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "SELECT {DAY_COLUMNS} FROM training_days WHERE training_id = $1 \
             ORDER BY day_number, created_at, id"
        );
        let days = sqlx::query_as::<_, TrainingDay>(&sql)
            .bind(training_id)
            .fetch_all(executor)
            .await?;
        Ok(days)
    }

    pub async fn list_for_trainings(pool: &PgPool, training_ids: &[Uuid]) -> DbResult<Vec<TrainingDay>> {
        let sql = format!(
            "SELECT {DAY_COLUMNS} FROM training_days WHERE training_id = ANY($1) \
             ORDER BY training_id, day_number, created_at, id"
        );
        let days = sqlx::query_as::<_, TrainingDay>(&sql)
            .bind(training_ids)
            .fetch_all(pool)
            .await?;
        Ok(days)
    }

    pub async fn find_by_id(pool: &PgPool, day_id: Uuid) -> DbResult<Option<TrainingDay>> {
        let sql = format!("SELECT {DAY_COLUMNS} FROM training_days WHERE id = $1");
        let day = sqlx::query_as::<_, TrainingDay>(&sql)
            .bind(day_id)
            .fetch_optional(pool)
            .await?;
        Ok(day)
    }

    pub async fn insert<'e, E>(executor: E, training_id: Uuid, day: &DesiredDay) -> DbResult<TrainingDay>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            INSERT INTO training_days
                (training_id, day_number, training_date, start_time, end_time, location, instructor, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {DAY_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, TrainingDay>(&sql)
            .bind(training_id)
            .bind(day.day_number)
            .bind(day.training_date)
            .bind(day.start_time)
            .bind(day.end_time)
            .bind(&day.location)
            .bind(&day.instructor)
            .bind(&day.description)
            .fetch_one(executor)
            .await?;
        Ok(created)
    }

    /// Rewrites every field of a day that belongs to `training_id`.
    pub async fn update<'e, E>(
        executor: E,
        day_id: Uuid,
        training_id: Uuid,
        day: &DesiredDay,
    ) -> DbResult<TrainingDay>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            UPDATE training_days
            SET day_number = $1, training_date = $2, start_time = $3, end_time = $4,
                location = $5, instructor = $6, description = $7, updated_at = NOW()
            WHERE id = $8 AND training_id = $9
            RETURNING {DAY_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, TrainingDay>(&sql)
            .bind(day.day_number)
            .bind(day.training_date)
            .bind(day.start_time)
            .bind(day.end_time)
            .bind(&day.location)
            .bind(&day.instructor)
            .bind(&day.description)
            .bind(day_id)
            .bind(training_id)
            .fetch_one(executor)
            .await?;
        Ok(updated)
    }

    /// Attendance rows for the day are removed by the foreign key cascade.
    pub async fn delete<'e, E>(executor: E, day_id: Uuid) -> DbResult<()>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("DELETE FROM training_days WHERE id = $1")
            .bind(day_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<'c> DayStore for Transaction<'c, Postgres> {
    async fn list_days(&mut self, training_id: Uuid) -> DbResult<Vec<TrainingDay>> {
        TrainingDayRepository::list_for_training(&mut **self, training_id).await
    }

    async fn create_day(&mut self, training_id: Uuid, day: &DesiredDay) -> DbResult<TrainingDay> {
        TrainingDayRepository::insert(&mut **self, training_id, day).await
    }

    async fn update_day(
        &mut self,
        day_id: Uuid,
        training_id: Uuid,
        day: &DesiredDay,
    ) -> DbResult<TrainingDay> {
        TrainingDayRepository::update(&mut **self, day_id, training_id, day).await
    }

    async fn delete_day(&mut self, day_id: Uuid) -> DbResult<()> {
        TrainingDayRepository::delete(&mut **self, day_id).await
    }
}
