//! Address resolution for a board's site.
//!
//! Handlers see site-relative paths (`src/123.jpg`, `/b/res/1.html#5`);
//! posts carry absolute addresses. A [`Locator`] does the resolution and
//! knows how the site spells thread links.

use url::Url;

use crate::error::{Error, Result};
use crate::patterns::THREAD_LINK;

/// Resolves site-relative addresses.
pub trait Locator: Send + Sync {
    /// Absolute address for `path`, or `None` when it cannot be resolved.
    fn resolve(&self, path: &str) -> Option<Url>;

    /// Thread and, if present, post number of a thread link such as
    /// `/b/res/123.html#456`.
    fn thread_post_numbers(&self, link: &str) -> Option<(String, Option<String>)> {
        let caps = THREAD_LINK.captures(link.trim())?;
        let thread = caps.get(1)?.as_str().to_string();
        let post = caps.get(2).map(|m| m.as_str().to_string());
        Some((thread, post))
    }

    /// Thread number of a thread link.
    fn thread_number(&self, link: &str) -> Option<String> {
        self.thread_post_numbers(link).map(|(thread, _)| thread)
    }
}

/// Locator for a site rooted at one base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChanLocator {
    base: Url,
}

impl ChanLocator {
    /// Creates a locator rooted at `base`, e.g. `https://example.org/`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLocator`] if `base` is not an absolute http(s)
    /// address.
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base.trim()).map_err(|e| Error::InvalidLocator(format!("{base}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.host().is_none() {
            return Err(Error::InvalidLocator(format!("{base}: not an http(s) address")));
        }
        Ok(Self { base })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Address of `segments` joined below the site root, e.g.
    /// `["b", "res", "1.html"]` to `https://example.org/b/res/1.html`.
    #[must_use]
    pub fn build_path(&self, segments: &[&str]) -> Option<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().ok()?;
            path.clear();
            path.extend(segments.iter().filter(|s| !s.is_empty()));
        }
        Some(url)
    }

    /// Address of a thread page.
    #[must_use]
    pub fn thread_uri(&self, board: &str, thread_number: &str) -> Option<Url> {
        self.build_path(&[board, "res", &format!("{thread_number}.html")])
    }
}

impl Locator for ChanLocator {
    fn resolve(&self, path: &str) -> Option<Url> {
        let path = path.trim();
        if path.is_empty() || path.starts_with("javascript:") || path.starts_with("data:") {
            return None;
        }
        self.base.join(path).ok()
    }
}

/// Converts a base-36 post id, as printed by some engines, to decimal.
///
/// ```
/// use rs_chanscrape::locator::convert_to_decimal_number;
///
/// assert_eq!(convert_to_decimal_number("zz").as_deref(), Some("1295"));
/// assert_eq!(convert_to_decimal_number("not base36!"), None);
/// ```
#[must_use]
pub fn convert_to_decimal_number(id: &str) -> Option<String> {
    u64::from_str_radix(id.trim(), 36).ok().map(|n| n.to_string())
}
