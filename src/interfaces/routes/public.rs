use actix_web::web;

use crate::handlers::{home, media, projects};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home::home)
        .service(home::about)
        .service(home::login_view)
        .service(media::serve_media)
        .service(
            web::scope("/api/v1")
                .service(projects::list_projects)
                .service(projects::get_project)
        );
}
