use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{info, warn};
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::{password, token, SESSION_COOKIE};
use crate::db::{
    repositories::{SessionRepository, UserChanges, UserRepository},
    ClientInfo, UpdateProfile, User, UserLogin,
};
use crate::error::{AppError, AppJson, AppResult};
use crate::middleware::CurrentUser;

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: User,
    pub session: SessionInfo,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    #[serde(with = "time::serde::rfc3339")]
    pub session_expires_at: OffsetDateTime,
}

/// Client address as reported by the proxy, then the request itself.
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    ClientInfo {
        ip_address: Some(
            header_value("x-forwarded-for")
                .or_else(|| header_value("x-real-ip"))
                .unwrap_or_else(|| "unknown".to_string()),
        ),
        user_agent: Some(
            header_value(header::USER_AGENT.as_str()).unwrap_or_else(|| "unknown".to_string()),
        ),
    }
}

fn invalid_credentials() -> AppError {
    AppError::Authentication("Invalid email or password".to_string())
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    AppJson(body): AppJson<UserLogin>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    body.validate()?;
    let Some(secret) = body.password.as_ref().filter(|p| !p.expose_secret().is_empty()) else {
        return Err(AppError::Validation("Email and password are required".to_string()));
    };

    let Some(user) = UserRepository::find_active_by_email(&state.db, &body.email).await? else {
        warn!("Login attempt for unknown or inactive account");
        return Err(invalid_credentials());
    };
    if !password::verify_password(secret, &user.password_hash).await? {
        warn!(user_id = %user.id, "Login attempt with wrong password");
        return Err(invalid_credentials());
    }

    let ttl = state.env.session_ttl();
    let session = SessionRepository::create(
        &state.db,
        user.id,
        &token::generate_token(),
        token::expires_at(OffsetDateTime::now_utc(), ttl),
        &client_info(&headers),
    )
    .await?;
    UserRepository::touch_last_login(&state.db, user.id).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .http_only(true)
        .secure(state.env.is_production())
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(ttl);

    info!(user_id = %user.id, "User logged in");
    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            success: true,
            user,
            session: SessionInfo {
                token: session.token,
                expires_at: session.expires_at,
            },
        }),
    ))
}

/// Always succeeds; an unknown or missing token just clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<Value>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let removed = SessionRepository::delete_by_token(&state.db, cookie.value()).await?;
        info!(sessions_removed = removed, "User logged out");
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(json!({ "success": true }))))
}

pub async fn me(current: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: current.user,
        session_expires_at: current.session_expires_at,
    })
}

pub async fn get_profile(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse { user: current.user })
}

pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(body): AppJson<UpdateProfile>,
) -> AppResult<Json<Value>> {
    body.validate()?;
    let user = current.user;

    let email = body.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    if let Some(email) = email {
        if !email.eq_ignore_ascii_case(&user.email)
            && UserRepository::email_taken(&state.db, email, Some(user.id)).await?
        {
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }
    }

    let password_hash = match (&body.current_password, &body.new_password) {
        (None, None) => None,
        (Some(current_password), Some(new_password)) => {
            password::check_password_strength(new_password)?;
            if !password::verify_password(current_password, &user.password_hash).await? {
                return Err(AppError::Validation("Current password is incorrect".to_string()));
            }
            Some(password::hash_password(new_password).await?)
        }
        _ => {
            return Err(AppError::Validation(
                "Both current and new password are required".to_string(),
            ))
        }
    };

    let changes = UserChanges {
        name: body.name,
        email: email.map(str::to_string),
        password_hash,
        ..Default::default()
    };
    let updated = UserRepository::update(&state.db, user.id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!(user_id = %updated.id, "Profile updated");
    Ok(Json(json!({ "success": true, "user": updated })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let info = client_info(&headers);
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn unknown_client_when_headers_are_missing() {
        let info = client_info(&HeaderMap::new());
        assert_eq!(info.ip_address.as_deref(), Some("unknown"));
        assert_eq!(info.user_agent.as_deref(), Some("unknown"));

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_info(&headers).ip_address.as_deref(), Some("10.0.0.2"));
    }
}
