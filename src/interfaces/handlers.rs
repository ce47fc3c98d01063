pub mod admin_projects;
pub mod auth;
pub mod drafts;
pub mod home;
pub mod json_error;
pub mod media;
pub mod projects;
pub mod system;
