use actix_multipart::{form::MultipartFormConfig, MultipartError};
use actix_web::{
    web,
    http::StatusCode,
    ResponseError,
    HttpResponse,
    error::{JsonPayloadError, PathError},
};
use serde_json::json;

use crate::constants::MAX_MULTIPART_BYTES;

/// Extractor failures answer with the same JSON error body as handlers.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        BodyError::from(err).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        BodyError::from(err).into()
    }))
    .app_data(
        MultipartFormConfig::default()
            .total_limit(MAX_MULTIPART_BYTES)
            .error_handler(|err, _req| BodyError::from(err).into()),
    );
}

#[derive(Debug)]
pub struct BodyError {
    message: String,
    status: StatusCode
}

impl std::fmt::Display for BodyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for BodyError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status).json(json!({ "error": self.message }))
    }
}

impl From<JsonPayloadError> for BodyError {
    fn from(err: JsonPayloadError) -> Self {
        BodyError {
            message: format!("JSON payload error: {}", err),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<PathError> for BodyError {
    fn from(err: PathError) -> Self {
        BodyError {
            message: format!("Invalid path parameter: {}", err),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<MultipartError> for BodyError {
    fn from(err: MultipartError) -> Self {
        let status = match err {
            MultipartError::Payload(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        BodyError {
            message: format!("Multipart form error: {}", err),
            status,
        }
    }
}
