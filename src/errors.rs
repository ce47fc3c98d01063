use std::borrow::Cow;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use jsonwebtoken::errors::{ErrorKind, Error as JwtError};
use derive_more::Display;
use serde::Serialize;
use serde_json::{json, Value};
use validator::ValidationErrors;

const UNIQUE_VIOLATION: &str = "23505";

/// Per-field validation message returned in the `details` of a 400.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Display)]
pub enum AppError {
    #[display("validation error: {}", summarize(_0))]
    ValidationError(Vec<FieldError>),

    #[display("Invalid input: {_0}")]
    InvalidInput(String),

    #[display("Not found: {_0}")]
    NotFound(String),

    #[display("Conflict: {_0}")]
    Conflict(String),

    #[display("Storage error: {_0}")]
    Storage(String),

    #[display("Internal server error: {_0}")]
    InternalError(String),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}:{}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Single-field validation failure.
    pub fn field(field: &str, message: &str) -> Self {
        AppError::ValidationError(vec![FieldError::new(field, message)])
    }

    fn body(&self) -> Value {
        match self {
            AppError::ValidationError(errors) => json!({
                "error": "Validation failed",
                "details": errors
            }),
            // Backend details stay in the logs
            AppError::InternalError(_) => json!({"error": "Internal server error"}),
            other => json!({"error": other.to_string()}),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.body())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_deref()
                    .unwrap_or("Invalid value");
                details.push(FieldError::new(field.to_string(), message));
            }
        }

        details.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationError(details)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed(UNIQUE_VIOLATION)) => {
                AppError::Conflict("Database conflict occurred".into())
            }
            other => AppError::InternalError(format!("Database error: {}", other)),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(format!("{:#}", err))
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidImage(msg) => AppError::field("image", &msg),
            StorageError::UnknownReference(reference) => {
                AppError::NotFound(format!("Stored object {}", reference))
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Identity failures. Each maps to its own message so callers can tell an
/// unknown account from a bad password.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum AuthError {
    #[display("Invalid token")]
    InvalidToken,

    #[display("Unknown identity: no account is registered for this email")]
    UnknownIdentity,

    #[display("Wrong credentials")]
    WrongCredentials,

    #[display("Token creation error")]
    TokenCreation,

    #[display("Token expired")]
    TokenExpired,

    #[display("Token revoked")]
    TokenRevoked,

    #[display("Missing credentials")]
    MissingCredentials,

    #[display("Not signed in")]
    NotSignedIn,

    #[display("Authentication failed, please try again")]
    AuthenticationFailed,

    #[display("Forbidden: {_0}")]
    Forbidden(String),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AuthError::TokenExpired => "Token has expired".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({"error": message}))
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        if matches!(e.kind(), ErrorKind::ExpiredSignature) {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(_: ValidationErrors) -> Self {
        AuthError::MissingCredentials
    }
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("Invalid password parameters: {_0}")]
    InvalidParameters(String),

    #[display("Password hashing failed: {_0}")]
    HashingError(String),

    #[display("Invalid password hash format: {_0}")]
    InvalidHashFormat(String),

    #[display("Password verification failed: {_0}")]
    VerificationError(String),
}

impl std::error::Error for PasswordError {}

/// Object storage failures, local or remote.
#[derive(Debug, Display)]
pub enum StorageError {
    #[display("Storage IO error: {_0}")]
    Io(String),

    #[display("Storage request failed: {_0}")]
    Http(String),

    #[display("Storage rejected the request with status {_0}")]
    Rejected(u16),

    #[display("Invalid image: {_0}")]
    InvalidImage(String),

    #[display("Unknown storage reference: {_0}")]
    UnknownReference(String),
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        err.status()
            .map(|status| StorageError::Rejected(status.as_u16()))
            .unwrap_or_else(|| StorageError::Http(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_image_becomes_an_image_field_error() {
        let err: AppError = StorageError::InvalidImage("not a picture".into()).into();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::ValidationError(ref e) if e[0].field == "image"));
    }

    #[test]
    fn remote_failures_are_bad_gateway() {
        let err: AppError = StorageError::Rejected(503).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let body = AppError::InternalError("password=hunter2".into()).body();
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[test]
    fn validation_message_lists_fields() {
        let err = AppError::ValidationError(vec![
            FieldError::new("pages", "At least one page is required"),
            FieldError::new("title", "Title is required"),
        ]);

        assert_eq!(
            err.to_string(),
            "validation error: pages:At least one page is required, title:Title is required"
        );
    }

    #[test]
    fn only_forbidden_and_malformed_auth_errors_avoid_401() {
        assert_eq!(AuthError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::MissingCredentials.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::UnknownIdentity.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::WrongCredentials.status_code(), StatusCode::UNAUTHORIZED);
    }
}
