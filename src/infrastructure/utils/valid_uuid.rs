use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path identifier; a malformed one is a 400.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::InvalidInput("Invalid UUID format".to_string()))
}
