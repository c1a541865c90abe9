use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{DbResult, PageQuery, Participant, ParticipantInput};

const PARTICIPANT_COLUMNS: &str = "id, name, email, phone, address, created_at, updated_at";

pub struct ParticipantRepository;

impl ParticipantRepository {
    /// Ordered by name; `search` matches the name.
    pub async fn list(pool: &PgPool, query: &PageQuery) -> DbResult<(Vec<Participant>, i64)> {
        let pattern = query.search().map(|s| format!("%{}%", s));

        let sql = format!(
            r#"
            SELECT {PARTICIPANT_COLUMNS} FROM participants
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#
        );
        let participants = sqlx::query_as::<_, Participant>(&sql)
            .bind(pattern.as_deref())
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM participants WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(pool)
        .await?;

        Ok((participants, total))
    }

    pub async fn find_by_id(pool: &PgPool, participant_id: Uuid) -> DbResult<Option<Participant>> {
        let sql = format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = $1");
        let participant = sqlx::query_as::<_, Participant>(&sql)
            .bind(participant_id)
            .fetch_optional(pool)
            .await?;
        Ok(participant)
    }

    pub async fn create(pool: &PgPool, input: &ParticipantInput) -> DbResult<Participant> {
        let sql = format!(
            r#"
            INSERT INTO participants (name, email, phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        );
        let participant = sqlx::query_as::<_, Participant>(&sql)
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(&input.phone)
            .bind(&input.address)
            .fetch_one(pool)
            .await?;
        Ok(participant)
    }

    /// Replaces every field; the dashboard always posts the full record.
    pub async fn update(
        pool: &PgPool,
        participant_id: Uuid,
        input: &ParticipantInput,
    ) -> DbResult<Option<Participant>> {
        let sql = format!(
            r#"
            UPDATE participants
            SET name = $1, email = $2, phone = $3, address = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {PARTICIPANT_COLUMNS}
            "#
        );
        let participant = sqlx::query_as::<_, Participant>(&sql)
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(&input.phone)
            .bind(&input.address)
            .bind(participant_id)
            .fetch_optional(pool)
            .await?;
        Ok(participant)
    }

    pub async fn delete(pool: &PgPool, participant_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(participant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn training_count(pool: &PgPool, participant_id: Uuid) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM training_participants WHERE participant_id = $1",
        )
        .bind(participant_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    pub async fn count(pool: &PgPool) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM participants")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
