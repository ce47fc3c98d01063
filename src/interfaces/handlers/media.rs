use actix_web::{get, http::{header, StatusCode}, web, HttpResponse};
use tokio::fs;

use crate::{handlers::json_error::json_error, AppState};

/// Serves images stored by the local backend.
#[get("/media/{object_path:.*}")]
pub async fn serve_media(
    state: web::Data<AppState>,
    object_path: web::Path<String>,
) -> HttpResponse {
    let Some(file_path) = state.media.as_ref().and_then(|media| media.resolve(&object_path)) else {
        return json_error(StatusCode::NOT_FOUND, "Not found", "No such media file");
    };

    match fs::read(&file_path).await {
        Ok(bytes) => {
            let content_type = infer::get(&bytes)
                .map(|kind| kind.mime_type())
                .unwrap_or("application/octet-stream");

            HttpResponse::Ok()
                .insert_header((header::CONTENT_TYPE, content_type))
                .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
                .body(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            json_error(StatusCode::NOT_FOUND, "Not found", "No such media file")
        }
        Err(e) => {
            tracing::error!(path = %object_path, "Failed to read media file: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", "Could not read media file")
        }
    }
}
