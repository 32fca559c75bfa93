//! Markdown-backed portfolio pages.
//!
//! Each file in `content/pages/` becomes one public page keyed by its file
//! stem (`about.md` is served at `/about`). Frontmatter is YAML and the body
//! is rendered once at startup with GitHub Flavored Markdown.

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Slugs the navbar links to. Missing files are logged at startup.
pub const PAGE_SLUGS: [&str; 7] = [
    "about",
    "contact",
    "interests",
    "sports",
    "finance",
    "projects",
    "guest",
];

#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// In-memory page store, cheap to clone into handlers.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load every page under `content_dir/pages`.
    ///
    /// A file that fails to parse is logged and skipped so one bad page does
    /// not take the whole site down.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match load_page(&path) {
                    Ok(page) => {
                        tracing::debug!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        for slug in PAGE_SLUGS {
            if !pages.contains_key(slug) {
                tracing::warn!("Navbar page missing from content: {slug}");
            }
        }
        tracing::info!(count = pages.len(), "Content pages loaded");

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn load_page(path: &Path) -> Result<Page, ContentError> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
        .to_string();

    let (meta, body) = parse_page(&content)?;

    Ok(Page {
        slug,
        meta,
        content_html: render_markdown(&body),
    })
}

fn parse_page(raw: &str) -> Result<(PageMeta, String), ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(raw)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;
    Ok((meta, parsed.content))
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());

    // Pages are authored in-repo and use raw HTML for the card grids.
    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_frontmatter() {
        let raw = "---\ntitle: About Me\nsubtitle: Finance and data\n---\n# Hello\n";
        let (meta, body) = parse_page(raw).unwrap();
        assert_eq!(meta.title, "About Me");
        assert_eq!(meta.subtitle.as_deref(), Some("Finance and data"));
        assert!(meta.description.is_none());
        assert!(body.contains("# Hello"));
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        assert!(matches!(
            parse_page("# No frontmatter"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_render_gfm_table() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_bundled_pages_load() {
        let store = ContentStore::load(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/content")))
            .unwrap();
        for slug in PAGE_SLUGS {
            let page = store.get_page(slug).unwrap();
            assert!(!page.meta.title.is_empty(), "{slug}");
            assert!(!page.content_html.is_empty(), "{slug}");
        }
        assert!(store.get_page("nope").is_none());
    }

    #[test]
    fn test_missing_directory_is_empty_store() {
        let store = ContentStore::load(Path::new("/definitely/not/here")).unwrap();
        assert!(store.is_empty());
    }
}
