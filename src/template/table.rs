//! The immutable rule table.

use std::fmt;
use std::io::Read;

use super::builder::RuleTableBuilder;
use super::engine;
use super::matcher::{Matcher, TagPattern};
use crate::encoding;
use crate::error::Result;
use crate::markup::Attributes;
use crate::Options;

/// Ordered, immutable list of matchers for one holder type.
///
/// Order is the only disambiguator: for each open tag the first matcher
/// whose pattern matches governs, and later matchers for the same tag never
/// fire for that occurrence. A broad pattern registered before a narrower
/// one for the same tag therefore hides the narrower one.
///
/// Tables hold no per-parse state and are `Send + Sync`, so one table can
/// be built once (typically in a `LazyLock`) and shared by concurrent
/// parses, each with its own holder.
pub struct RuleTable<H> {
    matchers: Vec<Matcher<H>>,
    options: Options,
}

impl<H> RuleTable<H> {
    pub(crate) fn new(matchers: Vec<Matcher<H>>, options: Options) -> Self {
        Self { matchers, options }
    }

    /// Starts building a table.
    #[must_use]
    pub fn builder() -> RuleTableBuilder<H> {
        RuleTableBuilder::new()
    }

    #[must_use]
    pub fn matchers(&self) -> &[Matcher<H>] {
        &self.matchers
    }

    /// Patterns in table order, without their handlers.
    pub fn patterns(&self) -> impl Iterator<Item = &TagPattern> {
        self.matchers.iter().map(Matcher::pattern)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// First matcher, in table order, whose pattern matches the tag.
    #[must_use]
    pub fn find(&self, name: &str, attributes: &Attributes) -> Option<&Matcher<H>> {
        self.matchers
            .iter()
            .find(|m| m.pattern.matches(name, attributes))
    }

    /// Runs the table over `source`, mutating `holder`.
    ///
    /// Handler failures abort the parse with
    /// [`Error::ParseFailed`](crate::Error::ParseFailed).
    pub fn parse(&self, source: &str, holder: &mut H) -> Result<()> {
        engine::run(self, source, holder)
    }

    /// Decodes `bytes` (BOM, then `<meta charset>`, then UTF-8) and parses.
    pub fn parse_bytes(&self, bytes: &[u8], holder: &mut H) -> Result<()> {
        let source = encoding::decode_markup(bytes);
        self.parse(&source, holder)
    }

    /// Reads `reader` to the end, decodes and parses.
    ///
    /// A read failure, including one caused by the caller closing the
    /// underlying source to cancel, surfaces as
    /// [`Error::MalformedMarkup`](crate::Error::MalformedMarkup).
    pub fn parse_reader<R: Read>(&self, mut reader: R, holder: &mut H) -> Result<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.parse_bytes(&bytes, holder)
    }
}

impl<H> fmt::Debug for RuleTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTable")
            .field("matchers", &self.matchers)
            .field("options", &self.options)
            .finish()
    }
}
