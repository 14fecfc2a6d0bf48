//! Site pipelines: rule tables plus holders for concrete board engines.
//!
//! # Module Structure
//!
//! - `wakaba`: wakaba-family boards (checkbox-delimited threads, `td.reply`
//!   posts, `span.filesize` attachments)
//! - `erlach`: boards printing base-36 post ids in `data-id`
//!
//! Each site parser turns a board page into threads, or a thread page into
//! posts. An input with no recognizable post yields an empty list.

use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ChanConfiguration;
use crate::error::Result;
use crate::locator::Locator;
use crate::model::{Post, Thread};
use crate::template::RuleTable;

pub mod erlach;
pub mod wakaba;

pub use erlach::ErlachParser;
pub use wakaba::WakabaParser;

/// Markup handed to a site parser, as text or as undecoded bytes.
#[derive(Debug, Clone, Copy)]
pub enum Markup<'a> {
    Text(&'a str),
    /// Decoded by byte order mark, `<meta charset>` or UTF-8.
    Bytes(&'a [u8]),
}

impl Markup<'_> {
    pub(crate) fn run<H>(self, table: &RuleTable<H>, holder: &mut H) -> Result<()> {
        match self {
            Markup::Text(text) => table.parse(text, holder),
            Markup::Bytes(bytes) => table.parse_bytes(bytes, holder),
        }
    }
}

impl<'a> From<&'a str> for Markup<'a> {
    fn from(text: &'a str) -> Self {
        Markup::Text(text)
    }
}

impl<'a> From<&'a String> for Markup<'a> {
    fn from(text: &'a String) -> Self {
        Markup::Text(text)
    }
}

impl<'a> From<&'a [u8]> for Markup<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Markup::Bytes(bytes)
    }
}

/// A board page parser.
pub trait SiteParser: Send + Sync {
    /// Threads of a board index page.
    fn convert_threads(&self, markup: Markup<'_>) -> Result<Vec<Thread>>;

    /// Posts of a single thread page.
    fn convert_posts(&self, markup: Markup<'_>) -> Result<Vec<Post>>;

    /// Reads the page to the end and converts its threads.
    ///
    /// Read failures surface as [`Error::MalformedMarkup`](crate::Error::MalformedMarkup).
    fn convert_threads_reader(&self, reader: &mut dyn Read) -> Result<Vec<Thread>> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.convert_threads(Markup::Bytes(&bytes))
    }

    /// Reads the page to the end and converts its posts.
    fn convert_posts_reader(&self, reader: &mut dyn Read) -> Result<Vec<Post>> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.convert_posts(Markup::Bytes(&bytes))
    }
}

/// Supported board engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Wakaba,
    Erlach,
}

impl Site {
    /// Parser for this engine.
    #[must_use]
    pub fn parser(
        self,
        locator: Arc<dyn Locator>,
        configuration: ChanConfiguration,
        board: &str,
    ) -> Box<dyn SiteParser> {
        match self {
            Site::Wakaba => Box::new(WakabaParser::new(locator, configuration, board)),
            Site::Erlach => Box::new(ErlachParser::new(locator)),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Site::Wakaba => "wakaba",
            Site::Erlach => "erlach",
        })
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wakaba" => Ok(Site::Wakaba),
            "erlach" => Ok(Site::Erlach),
            other => Err(format!("unknown site {other:?} (expected wakaba or erlach)")),
        }
    }
}
