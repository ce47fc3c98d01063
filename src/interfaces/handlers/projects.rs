use actix_web::{get, web, HttpResponse};
use tracing::instrument;

use crate::{errors::AppError, AppState};

/// Showcase cards, newest first.
#[get("/projects")]
#[instrument(skip(state))]
pub async fn list_projects(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let cards = state.project_handler.list_cards().await.map_err(|e| {
        tracing::error!("Failed to list projects: {}", e);
        e
    })?;
    Ok(HttpResponse::Ok().json(cards))
}

#[get("/projects/{project_id}")]
#[instrument(skip(state))]
pub async fn get_project(
    state: web::Data<AppState>,
    project_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let project = state.project_handler.get_project(&project_id).await?;
    Ok(HttpResponse::Ok().json(project))
}
