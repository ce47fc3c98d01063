use std::path::Path;

use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use tracing::instrument;

use crate::{
    constants::LOGIN_PATH,
    errors::AppError,
    utils::markdown::{read_markdown_file, safe_markdown_to_html},
    AppState,
};

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Welcome to {}", state.config.name),
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "owner": state.config.owner,
        "links": {
            "about": "/about",
            "projects": "/api/v1/projects",
            "admin": "/admin/projects"
        }
    }))
}

#[derive(Serialize)]
struct AboutPage {
    title: String,
    html: String,
}

#[get("/about")]
#[instrument(skip(state))]
pub async fn about(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let markdown = read_markdown_file(Path::new(&state.config.about_path))
        .await
        .map_err(|e| {
            tracing::error!(path = %state.config.about_path, "About page unavailable: {}", e);
            AppError::NotFound("About page".to_string())
        })?;

    Ok(HttpResponse::Ok().json(AboutPage {
        title: format!("About {}", state.config.owner),
        html: safe_markdown_to_html(&markdown),
    }))
}

/// Describes the login form the admin area redirects to.
#[get("/login")]
pub async fn login_view() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "view": "login",
        "path": LOGIN_PATH,
        "submit": { "method": "POST", "action": "/auth/login" },
        "fields": ["email", "password"]
    }))
}
