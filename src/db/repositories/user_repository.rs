use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{DbResult, PageQuery, User, UserRole};

pub(crate) const USER_COLUMNS: &str =
    "id, email, password_hash, name, role, is_active, last_login, created_at, updated_at";

/// Fields written when an admin creates an account.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

/// Partial update: `None` leaves the column as it is.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Emails are compared case-insensitively and stored lowercased.
    pub async fn find_active_by_email(pool: &PgPool, email: &str) -> DbResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) AND is_active = TRUE"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email.trim())
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Whether another account (not `except`) already uses `email`.
    pub async fn email_taken(pool: &PgPool, email: &str, except: Option<Uuid>) -> DbResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE LOWER(email) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email.trim())
        .bind(except)
        .fetch_one(pool)
        .await?;
        Ok(taken)
    }

    /// Newest first; `search` matches name or email.
    pub async fn list(pool: &PgPool, query: &PageQuery) -> DbResult<(Vec<User>, i64)> {
        let pattern = query.search().map(|s| format!("%{}%", s));

        let sql = format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(pattern.as_deref())
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(pool)
        .await?;

        Ok((users, total))
    }

    pub async fn create(pool: &PgPool, record: &UserRecord) -> DbResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, is_active)
            VALUES (LOWER($1), $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(record.email.trim())
            .bind(&record.password_hash)
            .bind(&record.name)
            .bind(record.role)
            .bind(record.is_active)
            .fetch_one(pool)
            .await?;
        Ok(user)
    }

    pub async fn update(pool: &PgPool, user_id: Uuid, changes: &UserChanges) -> DbResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($1, name),
                email = COALESCE(LOWER($2), email),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $6
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&changes.name)
            .bind(changes.email.as_deref().map(str::trim))
            .bind(changes.role)
            .bind(changes.is_active)
            .bind(&changes.password_hash)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn touch_last_login(pool: &PgPool, user_id: Uuid) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
