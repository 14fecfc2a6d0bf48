//! Tag predicates and the handlers attached to them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::HandlerResult;
use crate::markup::Attributes;

/// Predicate over a tag name and its attributes.
///
/// Variants are listed in increasing generality. Attribute variants never
/// match a tag that lacks the attribute, so `Contains` with an empty
/// substring means "has this attribute".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagPattern {
    /// Tag name equals `tag`.
    Name { tag: String },
    /// `attributes[key] == value`.
    AttrEquals { tag: String, key: String, value: String },
    /// `attributes[key]` starts with `prefix`.
    AttrStartsWith { tag: String, key: String, prefix: String },
    /// `attributes[key]` contains `substring`.
    AttrContains { tag: String, key: String, substring: String },
    /// `attributes[key]` ends with `suffix`.
    AttrEndsWith { tag: String, key: String, suffix: String },
}

impl TagPattern {
    /// Tag name this pattern is keyed on.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            TagPattern::Name { tag }
            | TagPattern::AttrEquals { tag, .. }
            | TagPattern::AttrStartsWith { tag, .. }
            | TagPattern::AttrContains { tag, .. }
            | TagPattern::AttrEndsWith { tag, .. } => tag,
        }
    }

    /// Check if the pattern matches a tag occurrence.
    ///
    /// `name` is expected lowercased, as the tokenizer produces it.
    #[must_use]
    pub fn matches(&self, name: &str, attributes: &Attributes) -> bool {
        if self.tag() != name {
            return false;
        }
        match self {
            TagPattern::Name { .. } => true,
            TagPattern::AttrEquals { key, value, .. } => attributes.get(key) == Some(value.as_str()),
            TagPattern::AttrStartsWith { key, prefix, .. } => {
                attributes.get(key).is_some_and(|v| v.starts_with(prefix.as_str()))
            }
            TagPattern::AttrContains { key, substring, .. } => {
                attributes.get(key).is_some_and(|v| v.contains(substring.as_str()))
            }
            TagPattern::AttrEndsWith { key, suffix, .. } => {
                attributes.get(key).is_some_and(|v| v.ends_with(suffix.as_str()))
            }
        }
    }
}

impl fmt::Display for TagPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagPattern::Name { tag } => write!(f, "{tag}"),
            TagPattern::AttrEquals { tag, key, value } => write!(f, "{tag}[{key}={value:?}]"),
            TagPattern::AttrStartsWith { tag, key, prefix } => write!(f, "{tag}[{key}^={prefix:?}]"),
            TagPattern::AttrContains { tag, key, substring } => {
                write!(f, "{tag}[{key}*={substring:?}]")
            }
            TagPattern::AttrEndsWith { tag, key, suffix } => write!(f, "{tag}[{key}$={suffix:?}]"),
        }
    }
}

/// Called on a matching open tag with `(holder, tag name, attributes)`.
///
/// Returning `true` asks the engine to capture the element's content for
/// the content handler; `false` skips capture for this occurrence.
pub type OpenHandler<H> = Arc<dyn Fn(&mut H, &str, &Attributes) -> HandlerResult<bool> + Send + Sync>;

/// Called with the raw markup captured between an open tag and its close.
pub type ContentHandler<H> = Arc<dyn Fn(&mut H, &str) -> HandlerResult + Send + Sync>;

/// A pattern with its optional open and content handlers.
pub struct Matcher<H> {
    pub(crate) pattern: TagPattern,
    pub(crate) open: Option<OpenHandler<H>>,
    pub(crate) content: Option<ContentHandler<H>>,
}

impl<H> Matcher<H> {
    #[must_use]
    pub fn pattern(&self) -> &TagPattern {
        &self.pattern
    }

    #[must_use]
    pub fn has_open_handler(&self) -> bool {
        self.open.is_some()
    }

    #[must_use]
    pub fn has_content_handler(&self) -> bool {
        self.content.is_some()
    }
}

impl<H> fmt::Debug for Matcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("pattern", &self.pattern)
            .field("open", &self.open.is_some())
            .field("content", &self.content.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    fn equals(tag: &str, key: &str, value: &str) -> TagPattern {
        TagPattern::AttrEquals {
            tag: tag.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    #[test]
    fn name_ignores_attributes() {
        let pattern = TagPattern::Name { tag: "a".into() };
        assert!(pattern.matches("a", &Attributes::new()));
        assert!(pattern.matches("a", &attrs(&[("href", "/x")])));
        assert!(!pattern.matches("abbr", &Attributes::new()));
    }

    #[test]
    fn equals_is_exact() {
        let pattern = equals("div", "class", "message");
        assert!(pattern.matches("div", &attrs(&[("class", "message")])));
        assert!(!pattern.matches("div", &attrs(&[("class", "message big")])));
        assert!(!pattern.matches("span", &attrs(&[("class", "message")])));
        assert!(!pattern.matches("div", &Attributes::new()));
    }

    #[test]
    fn affix_predicates() {
        let starts = TagPattern::AttrStartsWith {
            tag: "td".into(),
            key: "id".into(),
            prefix: "reply".into(),
        };
        assert!(starts.matches("td", &attrs(&[("id", "reply123")])));
        assert!(!starts.matches("td", &attrs(&[("id", "post123")])));

        let ends = TagPattern::AttrEndsWith {
            tag: "img".into(),
            key: "src".into(),
            suffix: "/icons/sticky.png".into(),
        };
        assert!(ends.matches("img", &attrs(&[("src", "/static/icons/sticky.png")])));
        assert!(!ends.matches("img", &attrs(&[("src", "/icons/sticky.png?v=2")])));
    }

    #[test]
    fn empty_contains_means_attribute_present() {
        let pattern = TagPattern::AttrContains {
            tag: "div".into(),
            key: "data-id".into(),
            substring: String::new(),
        };
        assert!(pattern.matches("div", &attrs(&[("data-id", "")])));
        assert!(pattern.matches("div", &attrs(&[("data-id", "zz")])));
        assert!(!pattern.matches("div", &attrs(&[("class", "post")])));
    }

    #[test]
    fn display_is_selector_like() {
        assert_eq!(equals("div", "class", "message").to_string(), "div[class=\"message\"]");
        assert_eq!(TagPattern::Name { tag: "a".into() }.to_string(), "a");
    }

    #[test]
    fn patterns_serialize_as_data() {
        let json = serde_json::to_value(equals("span", "class", "filesize")).unwrap_or_default();
        assert_eq!(json["kind"], "attr_equals");
        assert_eq!(json["tag"], "span");
        assert_eq!(json["value"], "filesize");
    }
}
