pub mod identity;
pub mod memory;
pub mod project;
pub mod sqlx_repo;
pub mod storage;
pub mod token;
pub mod user;
