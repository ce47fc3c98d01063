use std::{io, path::Path};

use ammonia::{Builder, UrlRelative};
use derive_more::Display;
use pulldown_cmark::{html, Options, Parser};
use tokio::fs;

const MAX_ABOUT_BYTES: u64 = 256 * 1024;
const MARKDOWN_EXTENSIONS: [&str; 3] = ["md", "markdown", "mdown"];

#[derive(Debug, Display)]
pub enum MarkdownError {
    #[display("Expected a markdown file, got {_0}")]
    NotMarkdown(String),

    #[display("Markdown file is empty")]
    Empty,

    #[display("Markdown file exceeds the size limit")]
    TooLarge,

    #[display("Failed to read markdown: {_0}")]
    Io(io::Error),
}

impl std::error::Error for MarkdownError {}

/// Renders the about page markdown to HTML with scripts and relative links removed.
pub fn safe_markdown_to_html(markdown: &str) -> String {
    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut rendered,
        Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH),
    );

    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::Deny)
        .clean(&rendered)
        .to_string()
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

pub async fn read_markdown_file(path: &Path) -> Result<String, MarkdownError> {
    if !is_markdown(path) {
        return Err(MarkdownError::NotMarkdown(path.display().to_string()));
    }

    let size = fs::metadata(path).await.map_err(MarkdownError::Io)?.len();
    if size > MAX_ABOUT_BYTES {
        return Err(MarkdownError::TooLarge);
    }

    let content = fs::read_to_string(path).await.map_err(MarkdownError::Io)?;
    if content.trim().is_empty() {
        return Err(MarkdownError::Empty);
    }
    Ok(content)
}
