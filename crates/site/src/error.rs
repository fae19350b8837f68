//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`;
//! every error body is `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::directory::LocationFailure;
use crate::services::ServiceError;
use crate::services::auth::AuthError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed outside a service.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Directory service rejected the operation.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// The browser could not produce a position.
    #[error(transparent)]
    Location(LocationFailure),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Service(err) => match err {
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::Duplicate(_)
                | ServiceError::AlreadyEdited
                | ServiceError::AlreadyResolved(_) => StatusCode::CONFLICT,
                ServiceError::Forbidden => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Location(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message; internal details never leave the server.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Service(ServiceError::Repository(_)) => "Internal server error".to_string(),
            Self::Service(err) => err.to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Authentication error".to_string()
                }
            },
            Self::Location(failure) => failure.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(_) => "Login required".to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::Duplicate;
    use chequealo_core::{AlreadyResolved, RequestStatus};
    use http_body_util::BodyExt;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body(err: AppError) -> serde_json::Value {
        let bytes = err.into_response().into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_service_error_status_codes() {
        assert_eq!(
            get_status(ServiceError::Validation("bad".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ServiceError::Duplicate(Duplicate::Review).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(ServiceError::AlreadyEdited.into()), StatusCode::CONFLICT);
        assert_eq!(
            get_status(
                ServiceError::AlreadyResolved(AlreadyResolved {
                    current: RequestStatus::Approved
                })
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(ServiceError::Forbidden.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(ServiceError::NotFound("shop").into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Location(LocationFailure::Timeout)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(AuthError::UserAlreadyExists.into()), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let value = body(ServiceError::Duplicate(Duplicate::Reply).into()).await;
        assert_eq!(
            value["error"],
            "this review already has a reply; update it instead"
        );

        let value = body(AppError::Location(LocationFailure::PermissionDenied)).await;
        assert!(value["error"].as_str().unwrap().starts_with("Permiso"));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Internal("connection string leaked".to_string());
        let value = body(err).await;
        assert_eq!(value["error"], "Internal server error");
    }
}
