//! Configuration options for tokenizing and rule dispatch.
//!
//! The `Options` struct controls how lenient the tokenizer is and how the
//! engine treats the end of the stream. Rule tables carry their own
//! `Options`; a table built without explicit options uses the defaults.

/// Configuration options for the tokenizer and rule engine.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_chanscrape::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     decode_attribute_entities: false,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Decode character references (`&amp;`, `&#39;`) in attribute values
    /// before handlers see them.
    ///
    /// Text content is never decoded by the tokenizer; content handlers
    /// receive captured markup verbatim.
    ///
    /// Default: `true`
    pub decode_attribute_entities: bool,

    /// Elements whose body is opaque text up to the matching end tag.
    ///
    /// A `<` inside these elements does not start a tag, so inline scripts
    /// cannot confuse dispatch.
    ///
    /// Default: `["script", "style"]`
    pub raw_text_elements: Vec<String>,

    /// Hand a capture that is still open when the stream ends to its
    /// content handler with whatever was accumulated.
    ///
    /// When disabled the unfinished capture is dropped silently.
    ///
    /// Default: `true`
    pub flush_capture_at_eof: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            decode_attribute_entities: true,
            raw_text_elements: vec!["script".to_string(), "style".to_string()],
            flush_capture_at_eof: true,
        }
    }
}

impl Options {
    /// Check if `name` is configured as a raw-text element.
    #[must_use]
    pub fn is_raw_text_element(&self, name: &str) -> bool {
        self.raw_text_elements.iter().any(|e| e.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert!(options.decode_attribute_entities);
        assert!(options.flush_capture_at_eof);
        assert!(options.is_raw_text_element("script"));
        assert!(options.is_raw_text_element("STYLE"));
        assert!(!options.is_raw_text_element("div"));
    }
}
