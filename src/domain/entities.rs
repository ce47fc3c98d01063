pub mod draft;
pub mod draft_request;
pub mod image;
pub mod option_fields;
pub mod project;
pub mod token;
pub mod user;
