//! # rs-chanscrape
//!
//! Declarative streaming scraper for imageboard and forum markup.
//!
//! Pages are tokenized leniently in a single forward pass. A site declares
//! an ordered table of tag patterns with open and content handlers; the
//! engine dispatches each open tag to the first matching rule and, when
//! asked, captures the raw markup up to the matching close tag. Handlers
//! write into a per-parse holder, which site pipelines turn into threads
//! and posts.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_chanscrape::{convert_threads, Site};
//!
//! let page = r#"
//! <label><input type="checkbox" name="delete" value="1">
//! <span class="filetitle">Hello</span></label>
//! <div class="message">First post</div>"#;
//!
//! let threads = convert_threads(Site::Wakaba, "https://example.org/", "b", page)?;
//! assert_eq!(threads.len(), 1);
//! assert_eq!(threads[0].posts[0].subject.as_deref(), Some("Hello"));
//! # Ok::<(), rs_chanscrape::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Lenient tokenizer**: unbalanced, unquoted and truncated markup never
//!   aborts a parse
//! - **Rule tables**: built once, shared across threads, first match wins
//! - **Site pipelines**: wakaba-family and base-36 id boards
//! - **Write-through configuration**: board titles and page counts are
//!   stored as soon as they are seen

mod error;
mod options;
mod patterns;

/// Markup tokens and the tokenizer.
pub mod markup;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Rule tables, their builder and the dispatch engine.
pub mod template;

/// Holder building blocks shared by site pipelines.
pub mod holder;

/// Threads, posts and attachments.
pub mod model;

/// Site address resolution.
pub mod locator;

/// Per-board configuration store.
pub mod config;

/// Text helpers for handler bodies.
pub mod text;

/// Site pipelines.
pub mod sites;

use std::sync::Arc;

// Public API - re-exports
pub use config::{ChanConfiguration, ConfigStore, MemoryConfigStore};
pub use error::{Error, HandlerError, HandlerResult, Result};
pub use locator::{ChanLocator, Locator};
pub use model::{FileAttachment, Icon, Post, Thread};
pub use options::Options;
pub use sites::{Markup, Site, SiteParser};
pub use template::{RuleTable, RuleTableBuilder, TagPattern};

/// Convert a board page into threads.
///
/// Uses a fresh in-memory configuration. Build a parser with
/// [`Site::parser`] to keep what the page reveals about the board.
///
/// # Errors
///
/// [`Error::InvalidLocator`] for an unusable `base_url`, or any error of
/// the parse itself.
pub fn convert_threads(site: Site, base_url: &str, board: &str, markup: &str) -> Result<Vec<Thread>> {
    let locator = Arc::new(ChanLocator::new(base_url)?);
    site.parser(locator, ChanConfiguration::in_memory(), board)
        .convert_threads(Markup::Text(markup))
}

/// Convert a thread page into its posts.
///
/// # Errors
///
/// Same as [`convert_threads`].
pub fn convert_posts(site: Site, base_url: &str, board: &str, markup: &str) -> Result<Vec<Post>> {
    let locator = Arc::new(ChanLocator::new(base_url)?);
    site.parser(locator, ChanConfiguration::in_memory(), board)
        .convert_posts(Markup::Text(markup))
}
