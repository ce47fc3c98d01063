use actix_web::{delete, get, post, web, HttpResponse};
use tracing::instrument;

use crate::{errors::AppError, use_cases::extractors::AdminSession, AppState};

/// Admin list in its current state, refetched on every request.
#[get("/projects")]
#[instrument(skip(_admin, state))]
pub async fn list_projects(
    _admin: AdminSession,
    state: web::Data<AppState>,
) -> HttpResponse {
    let listing = state.project_handler.refresh_listing().await;
    HttpResponse::Ok().json(listing)
}

#[post("/projects/{project_id}/deletion")]
#[instrument(skip(admin, state), fields(admin = %admin.0.email))]
pub async fn request_deletion(
    admin: AdminSession,
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ticket = state.project_handler.request_deletion(&project_id).await?;
    Ok(HttpResponse::Ok().json(ticket))
}

#[delete("/projects/{project_id}/deletion/{ticket}")]
#[instrument(skip(admin, state), fields(admin = %admin.0.email))]
pub async fn confirm_deletion(
    admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (project_id, ticket) = path.into_inner();
    let listing = state
        .project_handler
        .confirm_deletion(&project_id, &ticket)
        .await?;
    Ok(HttpResponse::Ok().json(listing))
}
