use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::password;
use crate::db::{
    repositories::{SessionRepository, UserChanges, UserRecord, UserRepository},
    NewUser, Page, PageQuery, UpdateUser, User,
};
use crate::error::{AppError, AppJson, AppResult};
use crate::middleware::AdminUser;

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<User>>> {
    let (users, total) = UserRepository::list(&state.db, &query).await?;
    Ok(Json(Page::new(users, total, &query)))
}

pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(body): AppJson<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    body.validate()?;
    let Some(secret) = body.password.as_ref().filter(|p| !p.expose_secret().is_empty()) else {
        return Err(AppError::Validation("Email and password are required".to_string()));
    };
    if UserRepository::email_taken(&state.db, &body.email, None).await? {
        return Err(AppError::Conflict("User with this email already exists".to_string()));
    }

    let record = UserRecord {
        email: body.email.clone(),
        password_hash: password::hash_password(secret).await?,
        name: body.name.clone(),
        role: body.role.unwrap_or_default(),
        is_active: body.is_active.unwrap_or(true),
    };
    let user = UserRepository::create(&state.db, &record).await?;

    info!(user_id = %user.id, created_by = %admin.user.id, role = ?user.role, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let user = UserRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<UpdateUser>,
) -> AppResult<Json<User>> {
    body.validate()?;

    if let Some(email) = body.email.as_deref() {
        if UserRepository::email_taken(&state.db, email, Some(id)).await? {
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }
    }

    let password_hash = match body.password.as_ref() {
        Some(secret) if !secret.expose_secret().is_empty() => {
            Some(password::hash_password(secret).await?)
        }
        _ => None,
    };

    let changes = UserChanges {
        name: body.name,
        email: body.email,
        role: body.role,
        is_active: body.is_active,
        password_hash,
    };
    let user = UserRepository::update(&state.db, id, &changes)
        .await?
        .ok_or_else(user_not_found)?;

    if !user.is_active {
        let dropped = SessionRepository::delete_for_user(&state.db, user.id).await?;
        info!(user_id = %user.id, sessions_dropped = dropped, "User deactivated");
    }

    info!(user_id = %user.id, updated_by = %admin.user.id, "User updated");
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if admin.user.id == id {
        return Err(AppError::BadRequest("Cannot delete your own account".to_string()));
    }
    if !UserRepository::delete(&state.db, id).await? {
        return Err(user_not_found());
    }

    info!(user_id = %id, deleted_by = %admin.user.id, "User deleted");
    Ok(Json(json!({ "success": true })))
}
