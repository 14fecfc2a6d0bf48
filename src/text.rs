//! Text helpers for handler bodies.
//!
//! Captured content is raw source markup; these turn it into field values
//! and rewrite comment markup into a uniform shape.

use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

use crate::markup::decode_entities;
use crate::patterns::{
    ABBREVIATION_BLOCK, ANY_TAG, BR_TAG, LINK_WITH_ID, NUMBER, POST_REFERENCE, QUOTE_SPAN,
};

/// Plain text of a markup fragment: line breaks become newlines, tags and
/// comments are dropped, entities are decoded.
///
/// ```
/// use rs_chanscrape::text::clear_html;
///
/// assert_eq!(clear_html("<b>Anon</b><br>&gt;&gt;1"), "Anon\n>>1");
/// ```
#[must_use]
pub fn clear_html(markup: &str) -> String {
    let with_breaks = BR_TAG.replace_all(markup, "\n");
    let stripped = ANY_TAG.replace_all(&with_breaks, "");
    decode_entities(&stripped).into_owned()
}

/// Trimmed text, or `None` when blank.
#[must_use]
pub fn null_if_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parses a number, treating a bad value as absent.
///
/// Boards print garbage in numeric attributes often enough that one bad
/// field must not cost the rest of the post. The failure is logged with
/// the field name.
#[must_use]
pub fn lenient_number<T>(field: &'static str, raw: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(field, value = raw, %err, "ignoring unparsable number");
            None
        }
    }
}

/// First run of digits in `text`, e.g. the count in "12 posts omitted".
#[must_use]
pub fn first_number(text: &str) -> Option<u32> {
    NUMBER.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Cuts the "comment too long" block boards append to abbreviated
/// comments on index pages. The cut is at the last such block.
#[must_use]
pub fn trim_abbreviation(comment: &str) -> &str {
    let comment = comment.trim();
    match comment.rfind(ABBREVIATION_BLOCK) {
        Some(index) => comment[..index].trim_end(),
        None => comment,
    }
}

/// Rewrites post references whose ids are not decimal into plain
/// `&gt;&gt;N` anchors, converting each id with `convert`. References
/// whose id cannot be converted keep the original id.
pub fn rewrite_post_references<F>(comment: &str, convert: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    POST_REFERENCE.replace_all(comment, |caps: &regex::Captures<'_>| {
        let href = caps.get(1).map_or("", |m| m.as_str());
        let id = caps.get(2).map_or("", |m| m.as_str());
        let number = convert(id).unwrap_or_else(|| id.to_string());
        format!("<a href=\"{href}\">&gt;&gt;{number}</a>")
    })
}

/// Removes `id` attributes from anchors.
#[must_use]
pub fn strip_link_ids(comment: &str) -> Cow<'_, str> {
    LINK_WITH_ID.replace_all(comment, "$1$2")
}

/// Puts a line break before every quote span that does not already follow
/// one.
#[must_use]
pub fn break_before_quotes(comment: &str) -> String {
    let mut out = String::with_capacity(comment.len());
    let mut rest = comment;
    while let Some(index) = rest.find(QUOTE_SPAN) {
        let (before, from_quote) = rest.split_at(index);
        out.push_str(before);
        if !out.ends_with("<br>") {
            out.push_str("<br>");
        }
        out.push_str(QUOTE_SPAN);
        rest = &from_quote[QUOTE_SPAN.len()..];
    }
    out.push_str(rest);
    out
}
