//! Listing-page pagination by relative "next" links.
//!
//! Each listing page carries an anchor with text `next` whose `href` is a
//! bare file name such as `page-2.html`. The URL of the following page is the
//! current page URL with its last path segment swapped for that name.
//!
//! Two link values are special:
//!
//! - [`FIRST_PAGE`] (`"1"`) stands for the start URL itself and is only used
//!   to seed a crawl.
//! - An empty link means the current page is the last one.

/// Seed link for the first listing page.
pub const FIRST_PAGE: &str = "1";

/// Position of a crawl within the listing pages: the page just fetched and
/// the raw next link read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub url: String,
    pub next_link: String,
}

impl PageCursor {
    /// Cursor positioned before the first page of `start_url`.
    #[must_use]
    pub fn start(start_url: &str) -> Self {
        Self {
            url: start_url.to_owned(),
            next_link: FIRST_PAGE.to_owned(),
        }
    }

    /// `false` once the site reported no further page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.next_link.is_empty()
    }

    /// URL of the page the next link points to, or `None` on the last page.
    #[must_use]
    pub fn next_url(&self) -> Option<String> {
        resolve_page_url(&self.url, &self.next_link)
    }
}

/// Builds the URL of the page named by `next_link`, relative to `current_url`.
///
/// Returns `None` for an empty link and `current_url` unchanged for
/// [`FIRST_PAGE`]. Absolute links are returned as-is.
#[must_use]
pub fn resolve_page_url(current_url: &str, next_link: &str) -> Option<String> {
    let next_link = next_link.trim();
    if next_link.is_empty() {
        return None;
    }
    if next_link == FIRST_PAGE {
        return Some(current_url.to_owned());
    }
    if next_link.starts_with("http://") || next_link.starts_with("https://") {
        return Some(next_link.to_owned());
    }

    match current_url.rsplit_once('/') {
        Some((dir, _last)) => Some(format!("{dir}/{next_link}")),
        None => Some(next_link.to_owned()),
    }
}
