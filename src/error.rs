//! Error types for rs-chanscrape.
//!
//! `Error` is what a parse returns to its caller. `HandlerError` is what an
//! individual rule handler raises; the engine wraps it into
//! [`Error::ParseFailed`] together with the tag that was being handled.

/// Error type for parse operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The markup source could not produce further input (read failure,
    /// closed stream). Fatal to the current parse.
    #[error("malformed markup: {0}")]
    MalformedMarkup(#[from] std::io::Error),

    /// A rule handler failed to interpret something it required.
    #[error("parse failed at <{tag}>: {source}")]
    ParseFailed {
        /// Tag whose handler failed.
        tag: String,
        /// The handler's own error.
        #[source]
        source: HandlerError,
    },

    /// A rule table was assembled with a matcher that can never contribute.
    #[error("invalid rule table: {0}")]
    InvalidRule(String),

    /// A locator was constructed from an unusable base address.
    #[error("invalid locator: {0}")]
    InvalidLocator(String),
}

/// Error raised from inside an open or content handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// A value that had to be numeric was not.
    #[error("invalid number {value:?} for {field}")]
    InvalidNumber {
        /// Field being populated.
        field: &'static str,
        /// Offending raw value.
        value: String,
    },

    /// A required attribute was absent.
    #[error("missing attribute {0:?}")]
    MissingAttribute(&'static str),

    /// A handler ran before the holder had the entity it mutates.
    #[error("no {0} in progress")]
    MissingContext(&'static str),

    /// Anything else a site table wants to abort on.
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for parse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for rule handlers.
pub type HandlerResult<T = ()> = std::result::Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failed_names_the_tag() {
        let err = Error::ParseFailed {
            tag: "div".to_string(),
            source: HandlerError::MissingAttribute("data-ts"),
        };
        assert_eq!(err.to_string(), "parse failed at <div>: missing attribute \"data-ts\"");
    }

    #[test]
    fn io_error_converts_to_malformed_markup() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: Error = io.into();
        assert!(matches!(err, Error::MalformedMarkup(_)));
    }
}
