//! Lenient single-pass tokenizer.
//!
//! Recognises opening tags with attributes, closing tags and the text in
//! between. It never validates nesting and never fails: unexpected shapes
//! degrade to text or to a best-effort tag.
//!
//! Recovery rules:
//! - a `<` that cannot start markup is text;
//! - an attribute value whose quote is never closed runs to the next `>`
//!   (or the end of input), and the tag ends there;
//! - a tag cut off by the end of input is emitted with what was read;
//! - `</>` is dropped;
//! - comments, doctypes and `<?...?>` become `Text` holding the raw markup.

use std::iter::FusedIterator;
use std::sync::LazyLock;

use super::entities::decode_entities;
use super::token::{Attributes, Spanned, Token};
use crate::Options;

static DEFAULT_OPTIONS: LazyLock<Options> = LazyLock::new(Options::default);

/// Forward-only tokenizer over a markup string.
///
/// # Example
///
/// ```rust
/// use rs_chanscrape::markup::{Token, Tokenizer};
///
/// let names: Vec<String> = Tokenizer::new(r#"<p class="x">hi</p>"#)
///     .filter_map(|t| match t.token {
///         Token::Open { name, .. } => Some(name),
///         _ => None,
///     })
///     .collect();
/// assert_eq!(names, vec!["p"]);
/// ```
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    options: &'a Options,
    /// Set right after a raw-text element opens.
    raw_text: Option<String>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer with default options.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, &DEFAULT_OPTIONS)
    }

    #[must_use]
    pub fn with_options(source: &'a str, options: &'a Options) -> Self {
        Self {
            source,
            pos: 0,
            options,
            raw_text: None,
        }
    }

    /// Source being scanned.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    fn text(&mut self, start: usize, end: usize) -> Spanned<'a> {
        self.pos = end;
        Spanned {
            token: Token::Text {
                content: &self.source[start..end],
            },
            span: start..end,
        }
    }

    /// Text from the current position up to the next `<` that starts markup.
    fn scan_text(&mut self, from: usize) -> Spanned<'a> {
        let bytes = self.bytes();
        let start = self.pos;
        let mut i = from;
        while i < bytes.len() {
            if bytes[i] == b'<' && starts_markup(bytes, i) {
                break;
            }
            i += 1;
        }
        self.text(start, i)
    }

    /// Body of a raw-text element up to its end tag.
    fn scan_raw_text(&mut self, name: &str) -> Option<Spanned<'a>> {
        let start = self.pos;
        let end = find_end_tag(self.bytes(), start, name).unwrap_or(self.source.len());
        if end > start {
            Some(self.text(start, end))
        } else {
            None
        }
    }

    /// Comment, doctype or processing instruction as raw text.
    fn scan_declaration(&mut self) -> Spanned<'a> {
        let start = self.pos;
        let rest = &self.source[start..];
        let end = if rest.starts_with("<!--") {
            rest[4..].find("-->").map_or(self.source.len(), |i| start + 4 + i + 3)
        } else {
            rest.find('>').map_or(self.source.len(), |i| start + i + 1)
        };
        self.text(start, end)
    }

    /// Closing tag. Returns `None` for `</>`.
    fn scan_close(&mut self) -> Option<Spanned<'a>> {
        let bytes = self.bytes();
        let start = self.pos;
        let name_start = start + 2;
        let name_end = scan_name(bytes, name_start);
        let end = bytes[name_end..]
            .iter()
            .position(|&b| b == b'>')
            .map_or(bytes.len(), |i| name_end + i + 1);
        self.pos = end;

        if name_end == name_start {
            return None;
        }
        Some(Spanned {
            token: Token::Close {
                name: self.source[name_start..name_end].to_ascii_lowercase(),
            },
            span: start..end,
        })
    }

    fn scan_open(&mut self) -> Spanned<'a> {
        let bytes = self.bytes();
        let start = self.pos;
        let name_end = scan_name(bytes, start + 1);
        let name = self.source[start + 1..name_end].to_ascii_lowercase();

        let mut attributes = Attributes::new();
        let mut self_closing = false;
        let mut i = name_end;

        loop {
            i = skip_whitespace(bytes, i);
            match bytes.get(i) {
                None => break,
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') => {
                    if bytes.get(i + 1) == Some(&b'>') {
                        self_closing = true;
                        i += 2;
                        break;
                    }
                    i += 1;
                    continue;
                }
                Some(_) => {}
            }

            let key_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            if i == key_start {
                // Stray '=' with no name in front of it.
                i += 1;
                continue;
            }
            let key = self.source[key_start..i].to_ascii_lowercase();

            let after_key = skip_whitespace(bytes, i);
            if bytes.get(after_key) != Some(&b'=') {
                attributes.insert(key, String::new());
                i = after_key;
                continue;
            }
            i = skip_whitespace(bytes, after_key + 1);

            let (value, next) = match bytes.get(i) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = i + 1;
                    if let Some(len) = bytes[value_start..].iter().position(|&b| b == quote) {
                        (&self.source[value_start..value_start + len], value_start + len + 1)
                    } else {
                        let value_end = bytes[value_start..]
                            .iter()
                            .position(|&b| b == b'>')
                            .map_or(bytes.len(), |len| value_start + len);
                        (&self.source[value_start..value_end], value_end)
                    }
                }
                _ => {
                    let value_start = i;
                    let mut value_end = i;
                    while value_end < bytes.len()
                        && !bytes[value_end].is_ascii_whitespace()
                        && bytes[value_end] != b'>'
                    {
                        value_end += 1;
                    }
                    (&self.source[value_start..value_end], value_end)
                }
            };

            if self.options.decode_attribute_entities {
                attributes.insert(key, decode_entities(value).into_owned());
            } else {
                attributes.insert(key, value);
            }
            i = next;
        }

        self.pos = i;
        if !self_closing && self.options.is_raw_text_element(&name) {
            self.raw_text = Some(name.clone());
        }
        Spanned {
            token: Token::Open {
                name,
                attributes,
                self_closing,
            },
            span: start..i,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Spanned<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.raw_text.take() {
            if let Some(text) = self.scan_raw_text(&name) {
                return Some(text);
            }
        }

        loop {
            let bytes = self.bytes();
            if self.pos >= bytes.len() {
                return None;
            }
            if bytes[self.pos] != b'<' || !starts_markup(bytes, self.pos) {
                let from = self.pos + 1;
                return Some(self.scan_text(from));
            }
            match bytes.get(self.pos + 1) {
                Some(b'!' | b'?') => return Some(self.scan_declaration()),
                Some(b'/') => {
                    if let Some(close) = self.scan_close() {
                        return Some(close);
                    }
                }
                _ => return Some(self.scan_open()),
            }
        }
    }
}

impl FusedIterator for Tokenizer<'_> {}

/// Collect every token of `source` using default options.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Spanned<'_>> {
    Tokenizer::new(source).collect()
}

/// Check if the `<` at `i` opens a tag, end tag or declaration.
fn starts_markup(bytes: &[u8], i: usize) -> bool {
    match bytes.get(i + 1) {
        Some(b) if b.is_ascii_alphabetic() => true,
        Some(b'!' | b'?') => true,
        Some(b'/') => matches!(bytes.get(i + 2), Some(b) if b.is_ascii_alphabetic() || *b == b'>'),
        _ => false,
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn scan_name(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    i
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Position of `</name` (ASCII case-insensitive) at or after `from`.
fn find_end_tag(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
    let name = name.as_bytes();
    let mut i = from;
    while i + 2 + name.len() <= bytes.len() {
        let rel = bytes[i..].windows(2).position(|w| w == b"</")?;
        i += rel;
        let name_start = i + 2;
        let name_end = name_start + name.len();
        if name_end <= bytes.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(name)
            && !bytes.get(name_end).is_some_and(|&b| is_name_byte(b))
        {
            return Some(i);
        }
        i += 2;
    }
    None
}
