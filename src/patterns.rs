//! Compiled regex patterns shared across modules.
//!
//! All patterns are compiled once at first use via `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Charset Detection
// =============================================================================

/// `<meta charset="...">`
pub static CHARSET_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>]+)"#).expect("CHARSET_META regex")
});

/// `<meta http-equiv="Content-Type" content="...; charset=...">`
pub static CONTENT_TYPE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#,
    )
    .expect("CONTENT_TYPE_CHARSET regex")
});

// =============================================================================
// Text Cleaning
// =============================================================================

/// Line break tags, converted to newlines when clearing markup.
pub static BR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("BR_TAG regex"));

/// Any tag, comment or declaration.
pub static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("ANY_TAG regex"));

/// First run of decimal digits.
pub static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("NUMBER regex"));

// =============================================================================
// Links and Comments
// =============================================================================

/// Thread link such as `/b/res/123.html#456`: thread and optional post.
pub static THREAD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)[^/]*\.html(?:#(\d+))?$").expect("THREAD_LINK regex")
});

/// Post reference anchor carrying a non-decimal id, e.g.
/// `<a class="post-link" href="/b/1z#2k">&gt;&gt;2k</a>`.
pub static POST_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a class=".*?link.*?".*?href="(.*?)".*?>(?:>>|&gt;&gt;)(\w+)(?:<.*?>)?</a>"#)
        .expect("POST_REFERENCE regex")
});

/// Anchor with an `id` attribute; group 1 and 2 surround the attribute.
pub static LINK_WITH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<a .*?) ?id=".*?"(.*?>)"#).expect("LINK_WITH_ID regex")
});

/// `mailto:` link in a poster name block.
pub static MAILTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']?mailto:([^"'>]*)"#).expect("MAILTO regex")
});

/// Opening quote span in erlach-style comments.
pub const QUOTE_SPAN: &str = "<span class=\"citate\"";

/// Abbreviation block appended to long comments on board pages.
pub const ABBREVIATION_BLOCK: &str = "<div class=\"abbrev\">";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_link_groups() {
        let caps = THREAD_LINK.captures("/b/res/123.html#456");
        let groups = caps.map(|c| (c.get(1).map(|m| m.as_str()), c.get(2).map(|m| m.as_str())));
        assert_eq!(groups, Some((Some("123"), Some("456"))));

        let caps = THREAD_LINK.captures("/b/res/77+50.html");
        assert_eq!(caps.and_then(|c| c.get(1)).map(|m| m.as_str()), Some("77"));

        assert!(!THREAD_LINK.is_match("/b/1.html?x"));
    }

    #[test]
    fn mailto_address() {
        let caps = MAILTO.captures(r#"<a href="mailto:Sage">Anon</a>"#);
        assert_eq!(caps.and_then(|c| c.get(1)).map(|m| m.as_str()), Some("Sage"));
    }

    #[test]
    fn any_tag_strips_comments_too() {
        assert_eq!(ANY_TAG.replace_all("a<!-- <b> -->b<i>c</i>", ""), "abc");
    }

    #[test]
    fn br_variants() {
        assert_eq!(BR_TAG.replace_all("a<br>b<BR/>c<br />d", "\n"), "a\nb\nc\nd");
    }
}
