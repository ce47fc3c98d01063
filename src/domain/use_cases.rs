pub mod auth;
pub mod drafts;
pub mod editor;
pub mod extractors;
pub mod listing;
pub mod projects;
