//! Character reference decoding.
//!
//! Covers numeric references and the named references forum templates
//! actually emit. Anything unrecognised is left as written.

use std::borrow::Cow;

/// Longest reference body we look at, `&` and `;` excluded.
const MAX_REFERENCE_LEN: usize = 10;

/// Decode character references in `input`.
///
/// Returns the input unchanged (borrowed) when it contains no `&`.
///
/// # Examples
///
/// ```
/// use rs_chanscrape::markup::decode_entities;
///
/// assert_eq!(decode_entities("a &amp; b"), "a & b");
/// assert_eq!(decode_entities("&gt;&gt;123"), ">>123");
/// assert_eq!(decode_entities("&#x41;&#66;"), "AB");
/// assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
/// ```
#[must_use]
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if let Some((ch, consumed)) = decode_reference(rest) {
            out.push(ch);
            rest = &rest[consumed..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode one reference at the start of `s` (which begins with `&`).
///
/// Returns the character and the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let semicolon = s
        .bytes()
        .take(MAX_REFERENCE_LEN + 2)
        .position(|b| b == b';')?;
    let body = s.get(1..semicolon)?;
    if body.is_empty() {
        return None;
    }

    let ch = if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None if number.bytes().all(|b| b.is_ascii_digit()) => number.parse().ok()?,
            None => return None,
        };
        char::from_u32(code)?
    } else {
        named_reference(body)?
    };
    Some((ch, semicolon + 1))
}

fn named_reference(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "shy" => '\u{ad}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "laquo" => '«',
        "raquo" => '»',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "middot" => '·',
        "bull" => '•',
        "times" => '×',
        "deg" => '°',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_when_nothing_to_decode() {
        assert!(matches!(decode_entities("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn decodes_named_and_numeric() {
        assert_eq!(decode_entities("&lt;b&gt; &quot;x&quot; &#39;y&#39;"), "<b> \"x\" 'y'");
        assert_eq!(decode_entities("&#x263A;"), "\u{263A}");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
    }

    #[test]
    fn leaves_broken_references() {
        assert_eq!(decode_entities("&amp"), "&amp");
        assert_eq!(decode_entities("&;"), "&;");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_entities("&#+5;"), "&#+5;");
        assert_eq!(decode_entities("&#1114112;"), "&#1114112;");
    }

    #[test]
    fn does_not_scan_far_for_semicolon() {
        assert_eq!(
            decode_entities("Q&A session; more"),
            "Q&A session; more"
        );
    }

    #[test]
    fn handles_multibyte_neighbours() {
        assert_eq!(decode_entities("привет &amp; мир"), "привет & мир");
        assert_eq!(decode_entities("&привет;"), "&привет;");
    }
}
