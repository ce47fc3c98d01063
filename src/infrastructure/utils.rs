pub mod markdown;
pub mod storage_path;
pub mod valid_uuid;
