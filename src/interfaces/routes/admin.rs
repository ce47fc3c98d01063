use actix_web::web;

use crate::handlers::{admin_projects, drafts, system::admin_health_check};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(admin_health_check)
            .service(admin_projects::list_projects)
            .service(admin_projects::request_deletion)
            .service(admin_projects::confirm_deletion)
            .service(drafts::create_draft)
            .service(drafts::open_project_draft)
            .service(drafts::get_draft)
            .service(drafts::update_fields)
            .service(drafts::discard_draft)
            .service(drafts::set_cover)
            .service(drafts::clear_cover)
            .service(drafts::add_technology)
            .service(drafts::remove_technology)
            .service(drafts::add_page)
            .service(drafts::edit_page)
            .service(drafts::remove_page)
            .service(drafts::submit_draft)
    );
}
