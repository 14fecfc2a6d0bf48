//! Rule dispatch over the token stream.
//!
//! One pass, one thread, no suspension. For every open tag outside a
//! capture the table is scanned in order and the first matching matcher
//! runs. If it asks for content, the engine enters capture mode: nested
//! tags are not dispatched, a depth counter tracks same-named tags, and the
//! raw source between the open tag and its matching close is handed to the
//! content handler.

use std::fmt::Write as _;

use tracing::{debug, trace, warn};

use super::matcher::Matcher;
use super::table::RuleTable;
use crate::error::{Error, HandlerError, Result};
use crate::markup::{is_void_element, Attributes, Spanned, Token, Tokenizer};

/// Capture in progress.
struct Capture<'t, H> {
    matcher: &'t Matcher<H>,
    tag: String,
    attributes: Attributes,
    depth: usize,
    /// Byte offset right after the opening tag.
    start: usize,
}

impl<H> Capture<'_, H> {
    /// Feed a token seen while capturing. Returns `true` when it closes
    /// the capture.
    fn track(&mut self, token: &Token<'_>) -> bool {
        match token {
            Token::Open { name, self_closing, .. } if !*self_closing && *name == self.tag => {
                self.depth += 1;
                false
            }
            Token::Close { name } if *name == self.tag => {
                self.depth -= 1;
                self.depth == 0
            }
            _ => false,
        }
    }

    fn finish(self, text: &str, holder: &mut H) -> Result<()> {
        invoke_content(self.matcher, holder, text, &self.tag, &self.attributes)
    }
}

#[derive(Debug, Default)]
struct Stats {
    tokens: usize,
    dispatched: usize,
    captures: usize,
}

pub(crate) fn run<H>(table: &RuleTable<H>, source: &str, holder: &mut H) -> Result<()> {
    let options = table.options();
    let mut stats = Stats::default();
    let mut capture: Option<Capture<'_, H>> = None;

    debug!(bytes = source.len(), matchers = table.len(), "parse started");

    for Spanned { token, span } in Tokenizer::with_options(source, options) {
        stats.tokens += 1;

        if let Some(active) = capture.as_mut() {
            if active.track(&token) {
                if let Some(done) = capture.take() {
                    let text = &source[done.start..span.start];
                    done.finish(text, holder)?;
                }
            }
            continue;
        }

        let Token::Open {
            name,
            attributes,
            self_closing,
        } = token
        else {
            continue;
        };
        let Some(matcher) = table.find(&name, &attributes) else {
            continue;
        };
        stats.dispatched += 1;
        trace!(pattern = %matcher.pattern(), offset = span.start, "matched");

        if !wants_capture(matcher, holder, &name, &attributes)? {
            continue;
        }
        stats.captures += 1;
        if self_closing || is_void_element(&name) {
            invoke_content(matcher, holder, "", &name, &attributes)?;
        } else {
            capture = Some(Capture {
                matcher,
                tag: name,
                attributes,
                depth: 1,
                start: span.end,
            });
        }
    }

    if let Some(active) = capture {
        if options.flush_capture_at_eof {
            warn!(tag = %active.tag, depth = active.depth, "stream ended inside capture; flushing");
            let text = &source[active.start..];
            active.finish(text, holder)?;
        } else {
            warn!(tag = %active.tag, "stream ended inside capture; dropped");
        }
    }

    debug!(
        tokens = stats.tokens,
        dispatched = stats.dispatched,
        captures = stats.captures,
        "parse finished"
    );
    Ok(())
}

/// Run the open handler and decide whether content is captured.
///
/// Capture happens only when a content handler exists and the open handler,
/// if any, returned `true`.
fn wants_capture<H>(
    matcher: &Matcher<H>,
    holder: &mut H,
    name: &str,
    attributes: &Attributes,
) -> Result<bool> {
    let proceed = match &matcher.open {
        Some(open) => open(holder, name, attributes).map_err(|source| failed(name, attributes, source))?,
        None => true,
    };
    Ok(proceed && matcher.content.is_some())
}

fn invoke_content<H>(
    matcher: &Matcher<H>,
    holder: &mut H,
    text: &str,
    name: &str,
    attributes: &Attributes,
) -> Result<()> {
    match &matcher.content {
        Some(content) => content(holder, text).map_err(|source| failed(name, attributes, source)),
        None => Ok(()),
    }
}

/// Wraps a handler error with the opening tag it was raised for, rendered
/// as `name key="value" ...`.
fn failed(name: &str, attributes: &Attributes, source: HandlerError) -> Error {
    let mut tag = name.to_string();
    for (key, value) in attributes.iter() {
        let _ = write!(tag, " {key}={value:?}");
    }
    Error::ParseFailed { tag, source }
}

#[cfg(test)]
mod tests {
    use crate::error::{Error, HandlerError};
    use crate::template::RuleTable;
    use crate::Options;

    #[derive(Default)]
    struct Log {
        events: Vec<String>,
    }

    #[test]
    fn captures_until_matching_close() {
        let table = RuleTable::<Log>::builder()
            .equals("div", "class", "message")
            .content(|log, text| {
                log.events.push(text.to_string());
                Ok(())
            })
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        let source = r#"<div class="message">a<div>b</div>c</div><div>tail</div>"#;
        assert!(table.parse(source, &mut log).is_ok());
        assert_eq!(log.events, vec!["a<div>b</div>c"]);
    }

    #[test]
    fn nested_tags_not_dispatched_while_capturing() {
        let table = RuleTable::<Log>::builder()
            .name("b")
            .open(|log, _, _| {
                log.events.push("b".into());
                Ok(false)
            })
            .name("p")
            .content(|log, text| {
                log.events.push(format!("p:{text}"));
                Ok(())
            })
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        assert!(table.parse("<p>x<b>y</b></p><b>z</b>", &mut log).is_ok());
        assert_eq!(log.events, vec!["p:x<b>y</b>", "b"]);
    }

    #[test]
    fn open_false_suppresses_capture() {
        let table = RuleTable::<Log>::builder()
            .name("a")
            .open(|log, _, attrs| Ok(attrs.get("href").is_some_and(|h| {
                log.events.push(format!("open:{h}"));
                h.starts_with('/')
            })))
            .content(|log, text| {
                log.events.push(format!("text:{text}"));
                Ok(())
            })
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        assert!(table.parse(r#"<a href="/x">one</a><a href="http://y">two</a>"#, &mut log).is_ok());
        assert_eq!(log.events, vec!["open:/x", "text:one", "open:http://y"]);
    }

    #[test]
    fn void_capture_gets_empty_text() {
        let table = RuleTable::<Log>::builder()
            .name("img")
            .content(|log, text| {
                log.events.push(format!("[{text}]"));
                Ok(())
            })
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        assert!(table.parse("<img src=a><p>x</p>", &mut log).is_ok());
        assert_eq!(log.events, vec!["[]"]);
    }

    #[test]
    fn eof_flushes_open_capture() {
        let table = RuleTable::<Log>::builder()
            .name("div")
            .content(|log, text| {
                log.events.push(text.to_string());
                Ok(())
            })
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        assert!(table.parse("<div>unterminated <div>inner</div> rest", &mut log).is_ok());
        assert_eq!(log.events, vec!["unterminated <div>inner</div> rest"]);
    }

    #[test]
    fn eof_drop_when_disabled() {
        let table = RuleTable::<Log>::builder()
            .options(Options {
                flush_capture_at_eof: false,
                ..Options::default()
            })
            .name("div")
            .content(|log, text| {
                log.events.push(text.to_string());
                Ok(())
            })
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        assert!(table.parse("<div>unterminated", &mut log).is_ok());
        assert!(log.events.is_empty());
    }

    #[test]
    fn handler_error_aborts_with_tag_context() {
        let table = RuleTable::<Log>::builder()
            .contains("div", "data-ts", "")
            .open(|_, _, attrs| {
                let raw = attrs.get_or_empty("data-ts");
                raw.parse::<i64>().map(|_| false).map_err(|_| HandlerError::InvalidNumber {
                    field: "timestamp",
                    value: raw.to_string(),
                })
            })
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        let result = table.parse(r#"<div data-ts="soon">x</div>"#, &mut log);
        match result {
            Err(Error::ParseFailed { tag, source }) => {
                assert_eq!(tag, "div data-ts=\"soon\"");
                assert!(matches!(source, HandlerError::InvalidNumber { field: "timestamp", .. }));
            }
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn content_handler_error_names_the_opening_tag() {
        let table = RuleTable::<Log>::builder()
            .equals("div", "class", "message")
            .content(|_, _| Err(HandlerError::MissingContext("post")))
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        let result = table.parse(r#"<div class="message" id="m1">text</div>"#, &mut log);
        match result {
            Err(Error::ParseFailed { tag, source }) => {
                assert_eq!(tag, "div class=\"message\" id=\"m1\"");
                assert_eq!(source, HandlerError::MissingContext("post"));
            }
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn void_content_error_names_the_tag() {
        let table = RuleTable::<Log>::builder()
            .name("img")
            .content(|_, _| Err(HandlerError::Custom("no thumbnail".into())))
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        let result = table.parse(r#"<img src="a.jpg">"#, &mut log);
        assert!(matches!(
            result,
            Err(Error::ParseFailed { ref tag, .. }) if tag == "img src=\"a.jpg\""
        ));
    }

    #[test]
    fn unmatched_close_outside_capture_is_ignored() {
        let table = RuleTable::<Log>::builder()
            .name("p")
            .content(|log, text| {
                log.events.push(text.to_string());
                Ok(())
            })
            .build();
        let Ok(table) = table else { panic!("table") };
        let mut log = Log::default();
        assert!(table.parse("</p></div><p>ok</p>", &mut log).is_ok());
        assert_eq!(log.events, vec!["ok"]);
    }
}
