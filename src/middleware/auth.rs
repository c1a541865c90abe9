use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::SESSION_COOKIE;
use crate::db::{repositories::SessionRepository, User};
use crate::error::AppError;

/// The user behind the request's session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_id: Uuid,
    pub session_expires_at: OffsetDateTime,
}

/// A [`CurrentUser`] with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

pub fn session_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(parts)
            .ok_or_else(|| AppError::Authentication("Not authenticated".to_string()))?;

        let found = SessionRepository::find_live(&state.db, &token)
            .await?
            .ok_or_else(|| AppError::Authentication("Session expired or invalid".to_string()))?;

        Ok(CurrentUser {
            user: found.user,
            session_id: found.session_id,
            session_expires_at: found.session_expires_at,
        })
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.user.is_admin() {
            tracing::warn!(user_id = %current.user.id, "Admin route refused");
            return Err(AppError::Authorization("Admin access required".to_string()));
        }
        Ok(AdminUser(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/participants");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn token_is_read_from_the_session_cookie() {
        let parts = parts_with_cookie(Some("theme=dark; session_token=abc123"));
        assert_eq!(session_token(&parts).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_no_token() {
        assert_eq!(session_token(&parts_with_cookie(None)), None);
        assert_eq!(session_token(&parts_with_cookie(Some("session_token="))), None);
    }
}
