use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::db::DatabaseError;
use crate::services::day_sync::DayInputError;
use crate::services::duration::OverrideParseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(err) => match err {
                DatabaseError::NotFound => StatusCode::NOT_FOUND,
                DatabaseError::Duplicate(_) => StatusCode::CONFLICT,
                DatabaseError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Short, client-facing summary of the error kind.
    fn message(&self) -> &'static str {
        match self {
            AppError::Database(err) => match err {
                DatabaseError::NotFound => "Resource not found",
                DatabaseError::Duplicate(_) => "Resource already exists",
                DatabaseError::InvalidInput(_) => "Invalid input data",
                _ => "An internal server error occurred",
            },
            AppError::Authentication(_) => "Authentication failed",
            AppError::Authorization(_) => "Access denied",
            AppError::Validation(_) => "Validation error",
            AppError::NotFound(_) => "Resource not found",
            AppError::Conflict(_) => "Resource conflict",
            AppError::InternalServerError(_) => "An internal server error occurred",
            AppError::BadRequest(_) => "Bad request",
            AppError::ServiceUnavailable(_) => "Service unavailable",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        // Driver errors stay in the log; clients get the generic message.
        let details = match &self {
            AppError::Database(DatabaseError::Sqlx(_) | DatabaseError::MigrationError(_)) => {
                self.message().to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": {
                "message": self.message(),
                "details": details,
            }
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.into())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        messages.dedup();
        AppError::Validation(messages.join(", "))
    }
}

impl From<DayInputError> for AppError {
    fn from(err: DayInputError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<OverrideParseError> for AppError {
    fn from(err: OverrideParseError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// `axum::Json` whose rejections use the JSON error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
    }

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(AppError::Database(DatabaseError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Database(DatabaseError::Duplicate("users_email_key".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Authentication("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Authorization("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_errors_keep_field_messages() {
        let errors = Probe { title: String::new() }.validate().unwrap_err();
        match AppError::from(errors) {
            AppError::Validation(message) => assert_eq!(message, "Title is required"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_day_fields_are_a_validation_error() {
        let err = AppError::from(DayInputError::MissingFields { position: 2 });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("day 2"));
    }

    #[tokio::test]
    async fn response_body_has_message_and_details() {
        let response = AppError::NotFound("Training not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"], "Resource not found");
        assert_eq!(body["error"]["details"], "Not found: Training not found");
    }
}
