//! Site-specific URL roots for the catalog being crawled.
//!
//! Listing pages link images as `../../../media/...` and detail pages as
//! `../../<slug>/index.html`. Those known prefixes are rewritten onto fixed
//! roots; anything else is resolved against the listing page URL.

use reqwest::Url;

use crate::error::ScraperError;

/// Relative prefix of listing-page image sources.
pub const IMAGE_PREFIX: &str = "../../../";
/// Relative prefix of listing-page detail links.
pub const DETAIL_PREFIX: &str = "../../";

const DEFAULT_SITE_ROOT: &str = "https://books.toscrape.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    asset_root: String,
    catalogue_root: String,
}

impl SiteConfig {
    /// Builds roots from the site root: assets live directly under it,
    /// detail pages under `<root>catalogue/`.
    #[must_use]
    pub fn new(site_root: &str) -> Self {
        let mut asset_root = site_root.trim().to_owned();
        if !asset_root.ends_with('/') {
            asset_root.push('/');
        }
        let catalogue_root = format!("{asset_root}catalogue/");
        Self {
            asset_root,
            catalogue_root,
        }
    }

    #[must_use]
    pub fn asset_root(&self) -> &str {
        &self.asset_root
    }

    #[must_use]
    pub fn catalogue_root(&self) -> &str {
        &self.catalogue_root
    }

    /// Absolute image URL for a listing `img src`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Parse`] if `src` can't be resolved against `page_url`.
    pub fn image_url(&self, src: &str, page_url: &str) -> Result<String, ScraperError> {
        rewrite(src, IMAGE_PREFIX, &self.asset_root, page_url)
    }

    /// Absolute detail-page URL for a listing `href`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Parse`] if `href` can't be resolved against `page_url`.
    pub fn detail_url(&self, href: &str, page_url: &str) -> Result<String, ScraperError> {
        rewrite(href, DETAIL_PREFIX, &self.catalogue_root, page_url)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_ROOT)
    }
}

fn rewrite(raw: &str, prefix: &str, root: &str, page_url: &str) -> Result<String, ScraperError> {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix(prefix) {
        return Ok(format!("{root}{rest}"));
    }
    if let Ok(absolute) = Url::parse(raw) {
        return Ok(absolute.to_string());
    }
    Url::parse(page_url)
        .and_then(|base| base.join(raw))
        .map(|u| u.to_string())
        .map_err(|e| ScraperError::parse(format!("link \"{raw}\""), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://books.toscrape.com/catalogue/category/books_1/page-1.html";

    #[test]
    fn default_roots_point_at_books_toscrape() {
        let site = SiteConfig::default();
        assert_eq!(site.asset_root(), "https://books.toscrape.com/");
        assert_eq!(site.catalogue_root(), "https://books.toscrape.com/catalogue/");
    }

    #[test]
    fn new_appends_missing_trailing_slash() {
        let site = SiteConfig::new("http://127.0.0.1:4000");
        assert_eq!(site.asset_root(), "http://127.0.0.1:4000/");
        assert_eq!(site.catalogue_root(), "http://127.0.0.1:4000/catalogue/");
    }

    #[test]
    fn image_prefix_is_rewritten_onto_asset_root() {
        let site = SiteConfig::default();
        let url = site
            .image_url("../../../media/cache/2c/da/2cdad67c.jpg", PAGE)
            .unwrap();
        assert_eq!(url, "https://books.toscrape.com/media/cache/2c/da/2cdad67c.jpg");
    }

    #[test]
    fn detail_prefix_is_rewritten_onto_catalogue_root() {
        let site = SiteConfig::default();
        let url = site
            .detail_url("../../a-light-in-the-attic_1000/index.html", PAGE)
            .unwrap();
        assert_eq!(
            url,
            "https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html"
        );
    }

    #[test]
    fn absolute_links_are_kept() {
        let site = SiteConfig::default();
        let url = site
            .detail_url("https://mirror.example.com/book/index.html", PAGE)
            .unwrap();
        assert_eq!(url, "https://mirror.example.com/book/index.html");
    }

    #[test]
    fn other_relative_links_resolve_against_page_url() {
        let site = SiteConfig::default();
        let url = site.detail_url("some-book_7/index.html", PAGE).unwrap();
        assert_eq!(
            url,
            "https://books.toscrape.com/catalogue/category/books_1/some-book_7/index.html"
        );
    }

    #[test]
    fn unresolvable_link_is_a_parse_error() {
        let site = SiteConfig::default();
        let err = site.detail_url("relative/path", "not a url").unwrap_err();
        assert!(matches!(err, ScraperError::Parse { .. }), "got: {err:?}");
    }
}
