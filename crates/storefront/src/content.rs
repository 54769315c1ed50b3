//! Markdown content pages (shipping policy, returns, about, ...).
//!
//! Pages are loaded from `<content_dir>/pages/*.md` at startup. Each file has
//! YAML front matter followed by GitHub-flavored markdown:
//!
//! ```markdown
//! ---
//! title: Shipping policy
//! description: How and when orders ship
//! updated_at: 2026-03-01
//! ---
//!
//! Orders placed before noon ship the same day.
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Front matter of a content page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// All content pages, held in memory.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load all pages under `content_dir/pages`.
    ///
    /// A missing directory yields an empty store; a page that fails to parse
    /// is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "Pages directory does not exist");
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "md") {
                continue;
            }
            match load_page(&path) {
                Ok(page) => {
                    tracing::info!(slug = %page.slug, "Loaded page");
                    pages.insert(page.slug.clone(), page);
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to load page");
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Build a store from already-parsed pages.
    #[must_use]
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .into_iter()
                    .map(|page| (page.slug.clone(), page))
                    .collect(),
            ),
        }
    }

    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// All pages sorted by title, for the footer.
    #[must_use]
    pub fn pages_by_title(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.values().collect();
        pages.sort_by(|a, b| a.meta.title.cmp(&b.meta.title));
        pages
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
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?;

    parse_page(slug, &content)
}

/// Parse front matter and render the body of one page.
///
/// # Errors
///
/// Returns `ContentError::Parse` if the slug is not URL-safe or the front
/// matter is missing or malformed.
pub fn parse_page(slug: &str, source: &str) -> Result<Page, ContentError> {
    if !is_valid_slug(slug) {
        return Err(ContentError::Parse(format!("Invalid slug: {slug}")));
    }

    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug: slug.to_string(),
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Lowercase letters, digits and dashes.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Render markdown to HTML with GitHub Flavored Markdown extensions.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    // Pages are authored in-repo; raw HTML is allowed.
    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

/// Errors that can occur when loading content.
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

    const SHIPPING: &str = "---\ntitle: Shipping policy\ndescription: When orders ship\n---\n\n# Delivery\n\nOrders ship **daily**.\n";

    #[test]
    fn test_parse_page() {
        let page = parse_page("shipping", SHIPPING).unwrap();
        assert_eq!(page.slug, "shipping");
        assert_eq!(page.meta.title, "Shipping policy");
        assert_eq!(page.meta.description.as_deref(), Some("When orders ship"));
        assert!(page.content_html.contains("<strong>daily</strong>"));
        assert!(page.content_html.contains("Delivery"));
    }

    #[test]
    fn test_parse_page_requires_front_matter() {
        let err = parse_page("about", "Just text").unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)));
    }

    #[test]
    fn test_parse_page_rejects_bad_slug() {
        let err = parse_page("../secret", SHIPPING).unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)));
    }

    #[test]
    fn test_store_lookup_and_ordering() {
        let store = ContentStore::from_pages([
            parse_page("shipping", SHIPPING).unwrap(),
            parse_page("about", "---\ntitle: About us\n---\nHello").unwrap(),
        ]);
        assert_eq!(store.len(), 2);
        assert!(store.get_page("about").is_some());
        assert!(store.get_page("missing").is_none());

        let titles: Vec<_> = store
            .pages_by_title()
            .iter()
            .map(|p| p.meta.title.as_str())
            .collect();
        assert_eq!(titles, ["About us", "Shipping policy"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let store = ContentStore::load(Path::new("/nonexistent/harbor-content")).unwrap();
        assert!(store.is_empty());
    }
}
