//! Fluent construction of rule tables.

use std::sync::Arc;

use tracing::debug;

use super::matcher::{ContentHandler, Matcher, OpenHandler, TagPattern};
use super::table::RuleTable;
use crate::error::{Error, HandlerResult, Result};
use crate::markup::Attributes;
use crate::Options;

/// Assembles a [`RuleTable`].
///
/// Patterns added back to back form a group; the next `open` or `content`
/// call attaches its handler to every pattern in that group. Adding a
/// pattern after a handler starts a new group.
///
/// ```rust
/// use rs_chanscrape::template::RuleTable;
///
/// #[derive(Default)]
/// struct Holder {
///     subjects: Vec<String>,
/// }
///
/// let table = RuleTable::<Holder>::builder()
///     .equals("span", "class", "filetitle")
///     .equals("span", "class", "replytitle")
///     .content(|holder, text| {
///         holder.subjects.push(text.trim().to_string());
///         Ok(())
///     })
///     .build()?;
///
/// let mut holder = Holder::default();
/// table.parse(
///     r#"<span class="filetitle">OP</span><span class="replytitle">Re</span>"#,
///     &mut holder,
/// )?;
/// assert_eq!(holder.subjects, vec!["OP", "Re"]);
/// # Ok::<(), rs_chanscrape::Error>(())
/// ```
pub struct RuleTableBuilder<H> {
    matchers: Vec<Matcher<H>>,
    group_start: usize,
    group_has_handler: bool,
    options: Options,
    problems: Vec<String>,
}

impl<H> Default for RuleTableBuilder<H> {
    fn default() -> Self {
        Self {
            matchers: Vec::new(),
            group_start: 0,
            group_has_handler: false,
            options: Options::default(),
            problems: Vec::new(),
        }
    }
}

impl<H> RuleTableBuilder<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizer and engine options for the table.
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Adds an arbitrary pattern.
    #[must_use]
    pub fn add(mut self, pattern: TagPattern) -> Self {
        if self.group_has_handler {
            self.group_start = self.matchers.len();
            self.group_has_handler = false;
        }
        self.matchers.push(Matcher {
            pattern,
            open: None,
            content: None,
        });
        self
    }

    /// Matches any `<tag>`.
    #[must_use]
    pub fn name(self, tag: &str) -> Self {
        self.add(TagPattern::Name { tag: tag.to_ascii_lowercase() })
    }

    /// Matches `<tag key="value">` exactly.
    #[must_use]
    pub fn equals(self, tag: &str, key: &str, value: &str) -> Self {
        self.add(TagPattern::AttrEquals {
            tag: tag.to_ascii_lowercase(),
            key: key.to_ascii_lowercase(),
            value: value.to_string(),
        })
    }

    /// Matches `<tag>` whose `key` starts with `prefix`.
    #[must_use]
    pub fn starts(self, tag: &str, key: &str, prefix: &str) -> Self {
        self.add(TagPattern::AttrStartsWith {
            tag: tag.to_ascii_lowercase(),
            key: key.to_ascii_lowercase(),
            prefix: prefix.to_string(),
        })
    }

    /// Matches `<tag>` whose `key` contains `substring`.
    #[must_use]
    pub fn contains(self, tag: &str, key: &str, substring: &str) -> Self {
        self.add(TagPattern::AttrContains {
            tag: tag.to_ascii_lowercase(),
            key: key.to_ascii_lowercase(),
            substring: substring.to_string(),
        })
    }

    /// Matches `<tag>` whose `key` ends with `suffix`.
    #[must_use]
    pub fn ends(self, tag: &str, key: &str, suffix: &str) -> Self {
        self.add(TagPattern::AttrEndsWith {
            tag: tag.to_ascii_lowercase(),
            key: key.to_ascii_lowercase(),
            suffix: suffix.to_string(),
        })
    }

    /// Attaches an open handler to the current group.
    #[must_use]
    pub fn open<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut H, &str, &Attributes) -> HandlerResult<bool> + Send + Sync + 'static,
    {
        let handler: OpenHandler<H> = Arc::new(handler);
        let (start, end) = (self.group_start, self.matchers.len());
        if start == end {
            self.problems.push("open handler attached before any pattern".to_string());
        }
        for matcher in &mut self.matchers[start..end] {
            if matcher.open.is_some() {
                self.problems
                    .push(format!("{} has more than one open handler", matcher.pattern));
            }
            matcher.open = Some(Arc::clone(&handler));
        }
        self.group_has_handler = true;
        self
    }

    /// Attaches a content handler to the current group.
    #[must_use]
    pub fn content<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut H, &str) -> HandlerResult + Send + Sync + 'static,
    {
        let handler: ContentHandler<H> = Arc::new(handler);
        let (start, end) = (self.group_start, self.matchers.len());
        if start == end {
            self.problems.push("content handler attached before any pattern".to_string());
        }
        for matcher in &mut self.matchers[start..end] {
            if matcher.content.is_some() {
                self.problems
                    .push(format!("{} has more than one content handler", matcher.pattern));
            }
            matcher.content = Some(Arc::clone(&handler));
        }
        self.group_has_handler = true;
        self
    }

    /// Finishes the table.
    ///
    /// Fails with [`Error::InvalidRule`] if any pattern has no handler, since
    /// it could never contribute to extraction.
    pub fn build(mut self) -> Result<RuleTable<H>> {
        for matcher in &self.matchers {
            if matcher.open.is_none() && matcher.content.is_none() {
                self.problems.push(format!("{} has no handler", matcher.pattern));
            }
        }
        if !self.problems.is_empty() {
            return Err(Error::InvalidRule(self.problems.join("; ")));
        }
        debug!(matchers = self.matchers.len(), "rule table built");
        Ok(RuleTable::new(self.matchers, self.options))
    }
}
