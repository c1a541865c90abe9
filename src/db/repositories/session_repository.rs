use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{ClientInfo, DbResult, Session, SessionWithUser};

const SESSION_COLUMNS: &str = "id, user_id, token, expires_at, ip_address, user_agent, created_at";

pub struct SessionRepository;

impl SessionRepository {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
        client: &ClientInfo,
    ) -> DbResult<Session> {
        let sql = format!(
            r#"
            INSERT INTO sessions (user_id, token, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SESSION_COLUMNS}
            "#
        );
        let session = sqlx::query_as::<_, Session>(&sql)
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .bind(&client.ip_address)
            .bind(&client.user_agent)
            .fetch_one(pool)
            .await?;
        Ok(session)
    }

    /// An unexpired session whose owner is still active.
    pub async fn find_live(pool: &PgPool, token: &str) -> DbResult<Option<SessionWithUser>> {
        let found = sqlx::query_as::<_, SessionWithUser>(
            r#"
            SELECT
                s.id AS session_id,
                s.expires_at AS session_expires_at,
                u.id, u.email, u.password_hash, u.name, u.role, u.is_active,
                u.last_login, u.created_at, u.updated_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW() AND u.is_active = TRUE
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;
        Ok(found)
    }

    pub async fn delete_by_token(pool: &PgPool, token: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_user(pool: &PgPool, user_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn purge_expired(pool: &PgPool) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
