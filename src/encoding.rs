//! Character encoding detection for markup byte streams.
//!
//! Imageboards still serve windows-1251, Shift_JIS and friends. Before
//! tokenizing, bytes are decoded by (in order) a byte order mark, a
//! `<meta charset>` / `http-equiv` declaration near the top of the page,
//! or UTF-8.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::patterns::{CHARSET_META, CONTENT_TYPE_CHARSET};

/// How far into the document a charset declaration is looked for.
const SNIFF_LIMIT: usize = 1024;

/// Detect the character encoding of a markup document.
#[must_use]
pub fn detect_encoding(markup: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(markup) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&markup[..markup.len().min(SNIFF_LIMIT)]);
    declared_charset(&head)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Charset named by `<meta charset>` or, failing that, by
/// `<meta http-equiv="Content-Type" content="...; charset=...">`.
fn declared_charset(head: &str) -> Option<String> {
    CHARSET_META
        .captures(head)
        .or_else(|| CONTENT_TYPE_CHARSET.captures(head))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode markup bytes to text.
///
/// Malformed sequences become U+FFFD rather than errors; a markup scraper
/// has no use for a hard failure on one bad byte.
///
/// # Examples
///
/// ```
/// use rs_chanscrape::encoding::decode_markup;
///
/// let page = b"<meta charset=\"windows-1251\"><p>\xcf\xf0\xe8\xe2\xe5\xf2</p>";
/// assert!(decode_markup(page).contains("Привет"));
/// ```
#[must_use]
pub fn decode_markup(markup: &[u8]) -> Cow<'_, str> {
    let encoding = detect_encoding(markup);
    let (decoded, used, had_errors) = encoding.decode(markup);
    if had_errors {
        debug!(encoding = used.name(), "replaced malformed byte sequences");
    }
    decoded
}
