//! Token model produced by the tokenizer.

use std::ops::Range;

/// Ordered attribute map of an opening tag.
///
/// Keeps document order and answers lookups by linear scan, which is
/// faster than hashing for the handful of attributes a tag carries.
/// When a tag repeats an attribute, the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of `key`, or an empty string.
    #[must_use]
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts `key` unless it is already present.
    ///
    /// Returns `false` if the key existed and the new value was discarded.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(key, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

/// A single markup event.
///
/// Names are ASCII-lowercased. `Text` borrows from the source; comments,
/// doctypes and processing instructions are reported as `Text` carrying
/// their raw markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Opening tag.
    Open {
        name: String,
        attributes: Attributes,
        /// Written as `<name ... />`.
        self_closing: bool,
    },
    /// Closing tag. May not correspond to any open tag.
    Close { name: String },
    /// Run of text between tags.
    Text { content: &'a str },
}

impl Token<'_> {
    /// Tag name for `Open` and `Close`, `None` for text.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::Open { name, .. } | Token::Close { name } => Some(name),
            Token::Text { .. } => None,
        }
    }
}

/// A token together with the byte range it occupies in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub span: Range<usize>,
}

/// Elements that never have content, whether or not they are written
/// self-closing.
pub static VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Check if `name` is a void element.
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attribute_wins() {
        let mut attrs = Attributes::new();
        assert!(attrs.insert("class", "a"));
        assert!(!attrs.insert("class", "b"));
        assert_eq!(attrs.get("class"), Some("a"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn preserves_document_order() {
        let attrs: Attributes = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn get_or_empty_defaults() {
        let attrs = Attributes::new();
        assert_eq!(attrs.get_or_empty("href"), "");
        assert!(attrs.is_empty());
    }

    #[test]
    fn void_elements() {
        assert!(is_void_element("img"));
        assert!(is_void_element("input"));
        assert!(!is_void_element("div"));
    }
}
