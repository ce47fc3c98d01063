use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Technologies shown on a showcase card before collapsing into a count.
pub const TECHNOLOGY_PREVIEW_LIMIT: usize = 3;

/// Largest accepted image payload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Whole multipart body: one image field at its `6MiB` cap plus page metadata.
pub const MAX_MULTIPART_BYTES: usize = 6 * 1024 * 1024 + 64 * 1024;

pub const LOGIN_PATH: &str = "/login";

pub const COVER_PREFIX: &str = "covers";
pub const PAGE_PREFIX: &str = "pages";
