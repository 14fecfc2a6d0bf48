//! Wakaba-family boards.
//!
//! Page layout this table expects:
//!
//! ```text
//! <span class="filesize"><a href="src/1.jpg">1.jpg</a></span>      opening post file
//! <a href="src/1.jpg"><img class="thumb" src="/b/thumb/1s.jpg"></a>
//! <label><input type="checkbox" name="delete" value="1">            thread boundary
//!   <span class="filetitle">..</span> <span class="postername">..</span>
//!   <span class="posterdate" data-timestamp="..">..</span></label>
//! <span class="reflink"><a href="res/1.html#1">No.1</a></span>
//! <div class="message">..</div>                                    post complete
//! <div class="omittedposts">5 posts omitted</div>
//! <table><tr><td class="reply" id="reply2">..</td></tr></table>    replies
//! ```
//!
//! Every `<a>` goes through a single matcher: reflinks, file links and
//! page links are told apart inside the handler, since a second `a`
//! matcher would never fire.

use std::sync::{Arc, LazyLock};

use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use tracing::debug;

use super::{Markup, SiteParser};
use crate::config::ChanConfiguration;
use crate::error::{Error, HandlerResult, Result};
use crate::holder::{AttachmentSlot, ThreadCollector};
use crate::locator::Locator;
use crate::markup::Attributes;
use crate::model::{FileAttachment, Icon, Post, Thread};
use crate::patterns::MAILTO;
use crate::template::RuleTable;
use crate::text::{clear_html, first_number, lenient_number, null_if_empty, trim_abbreviation};

/// Date printed next to the poster name, in the board's local time.
const DATE_FORMAT: &str = "%d.%m.%y %a %H:%M:%S";

/// Board time zone, UTC+3.
const DATE_OFFSET_SECONDS: i32 = 3 * 3600;

/// What an `<a>` capture is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkCapture {
    OriginalName,
    PageNumber,
}

/// Per-parse state.
pub struct WakabaHolder {
    locator: Arc<dyn Locator>,
    configuration: ChanConfiguration,
    board: String,
    original_name_from_link: bool,

    collector: ThreadCollector,
    /// Number of the current thread's opening post.
    parent: Option<String>,
    post: Option<Post>,
    attachments: AttachmentSlot,
    pages_count: u32,

    reflink_parsing: bool,
    link_capture: Option<LinkCapture>,
}

impl WakabaHolder {
    fn post_mut(&mut self) -> Option<&mut Post> {
        self.post.as_mut()
    }

    fn finish_post(&mut self, comment: &str) {
        let Some(mut post) = self.post.take() else {
            debug!("message without a post");
            return;
        };
        post.comment = Some(trim_abbreviation(comment).to_string());
        post.attachments = self.attachments.take_committed();
        self.collector.push_post(post);
    }

    fn on_checkbox(&mut self, attributes: &Attributes) {
        if attributes.get("type") != Some("checkbox") {
            return;
        }
        if self.post.as_ref().is_some_and(|p| p.post_number.is_some()) {
            return;
        }
        let number = null_if_empty(attributes.get_or_empty("value"));
        self.post.get_or_insert_with(Post::new).post_number.clone_from(&number);
        self.parent = number;
        self.collector.begin_thread();
    }

    fn on_reply(&mut self, attributes: &Attributes) {
        let id = attributes.get_or_empty("id");
        let number = id.strip_prefix("reply").and_then(null_if_empty);
        self.post = Some(Post {
            post_number: number,
            parent_post_number: self.parent.clone(),
            ..Post::default()
        });
        self.attachments.reset();
    }

    fn on_link(&mut self, attributes: &Attributes) -> bool {
        self.link_capture = None;
        let href = attributes.get_or_empty("href");

        if self.reflink_parsing {
            self.reflink_parsing = false;
            let thread = self.locator.thread_number(href);
            if let (Some(post), Some(thread)) = (self.post.as_mut(), thread) {
                if post.parent_post_number.is_none() && post.post_number.as_ref() != Some(&thread) {
                    post.parent_post_number = Some(thread);
                }
            }
            return false;
        }

        let file_uri = self.locator.resolve(href);
        if let Some(attachment) = self.attachments.pending_mut() {
            if attachment.file_uri.is_none() && file_uri.is_some() {
                attachment.file_uri = file_uri;
                if let Some(size) = attributes.get("data-size") {
                    attachment.size = lenient_number("size", size).unwrap_or(0);
                }
                if let Some(width) = attributes.get("data-width") {
                    attachment.width = lenient_number("width", width).unwrap_or(0);
                }
                if let Some(height) = attributes.get("data-height") {
                    attachment.height = lenient_number("height", height).unwrap_or(0);
                }
                if self.original_name_from_link {
                    self.link_capture = Some(LinkCapture::OriginalName);
                }
                return self.link_capture.is_some();
            }
        }

        if href.ends_with(".html") {
            self.link_capture = Some(LinkCapture::PageNumber);
        }
        self.link_capture.is_some()
    }

    fn on_link_text(&mut self, text: &str) {
        match self.link_capture.take() {
            Some(LinkCapture::OriginalName) => {
                if let Some(attachment) = self.attachments.pending_mut() {
                    attachment.original_name = null_if_empty(&clear_html(text));
                }
            }
            Some(LinkCapture::PageNumber) => self.on_page_link(text.trim()),
            None => {}
        }
    }

    /// Page links are numbered from zero; the index page is page zero.
    fn on_page_link(&mut self, text: &str) {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return;
        }
        let Some(pages) = text.parse::<u32>().ok().and_then(|n| n.checked_add(1)) else {
            return;
        };
        if pages > self.pages_count {
            self.pages_count = pages;
            self.configuration.store_pages_count(&self.board, pages);
        }
    }

    fn on_thumbnail(&mut self, attributes: &Attributes) {
        let Some(attachment) = self.attachments.pending_mut() else {
            debug!("thumbnail without a pending attachment");
            return;
        };
        if let Some(src) = attributes.get("src") {
            if src.contains("/thumb/") {
                attachment.thumbnail_uri = self.locator.resolve(src);
            }
            if src.contains("extras/icons/spoiler.png") {
                attachment.spoiler = true;
            }
        }
        self.attachments.commit();
    }

    fn on_name(&mut self, markup: &str) {
        let email = MAILTO
            .captures(markup)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());
        let Some(post) = self.post_mut() else {
            return;
        };
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            if email.to_lowercase().contains("sage") {
                post.sage = true;
            } else {
                post.email = Some(email);
            }
        }
        post.append_name(&clear_html(markup));
    }

    /// Reads `data-timestamp` (seconds). Returns `true` to fall back to the
    /// printed date when the attribute is missing or unusable.
    fn on_date(&mut self, attributes: &Attributes) -> bool {
        let Some(post) = self.post_mut() else {
            return false;
        };
        let seconds = attributes
            .get("data-timestamp")
            .and_then(|raw| lenient_number::<i64>("timestamp", raw));
        post.timestamp = seconds.and_then(|s| s.checked_mul(1000));
        post.timestamp.is_none()
    }

    fn on_date_text(&mut self, text: &str) {
        if let Some(post) = self.post_mut() {
            post.timestamp = parse_date(&clear_html(text));
        }
    }
}

/// Printed post date to milliseconds since the epoch.
fn parse_date(text: &str) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT).ok()?;
    let offset = FixedOffset::east_opt(DATE_OFFSET_SECONDS)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|date| date.timestamp_millis())
}

fn set_subject(holder: &mut WakabaHolder, text: &str) -> HandlerResult {
    if let Some(post) = holder.post_mut() {
        post.subject = null_if_empty(&clear_html(text));
    }
    Ok(())
}

fn flag(holder: &mut WakabaHolder, set: fn(&mut Post)) -> HandlerResult<bool> {
    if let Some(post) = holder.post_mut() {
        set(post);
    }
    Ok(false)
}

static TABLE: LazyLock<Result<RuleTable<WakabaHolder>>> = LazyLock::new(|| {
    RuleTable::<WakabaHolder>::builder()
        .equals("input", "name", "delete")
        .open(|holder, _, attrs| {
            holder.on_checkbox(attrs);
            Ok(false)
        })
        .starts("td", "id", "reply")
        .open(|holder, _, attrs| {
            holder.on_reply(attrs);
            Ok(false)
        })
        .equals("span", "class", "filesize")
        .open(|holder, _, _| {
            holder.post.get_or_insert_with(Post::new);
            holder.attachments.open();
            Ok(false)
        })
        .name("a")
        .open(|holder, _, attrs| Ok(holder.on_link(attrs)))
        .content(|holder, text| {
            holder.on_link_text(text);
            Ok(())
        })
        .starts("img", "class", "thumb")
        .open(|holder, _, attrs| {
            holder.on_thumbnail(attrs);
            Ok(false)
        })
        .starts("video", "class", "thumb")
        .open(|holder, _, _| {
            holder.attachments.commit();
            Ok(false)
        })
        .equals("div", "class", "nothumb")
        .open(|holder, _, _| {
            holder
                .attachments
                .commit_if(FileAttachment::has_size_or_dimensions);
            Ok(false)
        })
        .equals("span", "class", "filetitle")
        .equals("span", "class", "replytitle")
        .content(set_subject)
        .equals("img", "class", "poster-country")
        .open(|holder, _, attrs| {
            let (Some(title), Some(src)) = (attrs.get("title"), attrs.get("src")) else {
                return Ok(false);
            };
            let uri = holder.locator.resolve(src);
            if let (Some(post), Some(uri)) = (holder.post.as_mut(), uri) {
                post.icons.push(Icon {
                    uri,
                    title: title.to_string(),
                });
            }
            Ok(false)
        })
        .equals("span", "class", "posteruid")
        .content(|holder, text| {
            if let Some(post) = holder.post_mut() {
                post.identifier = null_if_empty(&clear_html(text));
            }
            Ok(())
        })
        // Must precede the `postername` prefix rule, which would shadow it.
        .equals("span", "class", "postername postername-admin")
        .content(|holder, text| {
            if let Some(post) = holder.post_mut() {
                post.capcode = null_if_empty(&clear_html(text));
            }
            Ok(())
        })
        .starts("span", "class", "postername")
        .content(|holder, text| {
            holder.on_name(text);
            Ok(())
        })
        .equals("span", "class", "postertrip")
        .content(|holder, text| {
            if let Some(post) = holder.post_mut() {
                post.tripcode = null_if_empty(&clear_html(text));
            }
            Ok(())
        })
        .equals("span", "class", "posterdate")
        .open(|holder, _, attrs| Ok(holder.on_date(attrs)))
        .content(|holder, text| {
            holder.on_date_text(text);
            Ok(())
        })
        .equals("div", "class", "message")
        .content(|holder, text| {
            holder.finish_post(text);
            Ok(())
        })
        .equals("div", "class", "omittedposts")
        .content(|holder, text| {
            let omitted = first_number(text);
            if let (Some(thread), Some(omitted)) = (holder.collector.current_thread_mut(), omitted) {
                thread.add_posts_count(omitted);
            }
            Ok(())
        })
        .equals("div", "class", "logo")
        .content(|holder, text| {
            holder
                .configuration
                .store_board_title(&holder.board, &clear_html(text));
            Ok(())
        })
        .equals("span", "class", "reflink")
        .open(|holder, _, _| {
            holder.reflink_parsing = true;
            Ok(false)
        })
        .ends("img", "src", "/icons/sticky.png")
        .open(|holder, _, _| flag(holder, |post| post.sticky = true))
        .ends("img", "src", "/icons/endless.png")
        .open(|holder, _, _| flag(holder, |post| post.cyclical = true))
        .build()
});

fn table() -> Result<&'static RuleTable<WakabaHolder>> {
    TABLE
        .as_ref()
        .map_err(|err| Error::InvalidRule(err.to_string()))
}

/// Parser for wakaba-family board and thread pages.
///
/// Board titles and page counts seen while parsing are written to the
/// configuration immediately, so they survive a parse that fails later.
#[derive(Clone)]
pub struct WakabaParser {
    locator: Arc<dyn Locator>,
    configuration: ChanConfiguration,
    board: String,
    original_name_from_link: bool,
}

impl WakabaParser {
    pub fn new(locator: Arc<dyn Locator>, configuration: ChanConfiguration, board: &str) -> Self {
        Self {
            locator,
            configuration,
            board: board.to_string(),
            original_name_from_link: true,
        }
    }

    /// Whether the file link's text is the uploaded file name. On by
    /// default.
    #[must_use]
    pub fn original_name_from_link(mut self, enabled: bool) -> Self {
        self.original_name_from_link = enabled;
        self
    }

    fn holder(&self, collector: ThreadCollector) -> WakabaHolder {
        WakabaHolder {
            locator: Arc::clone(&self.locator),
            configuration: self.configuration.clone(),
            board: self.board.clone(),
            original_name_from_link: self.original_name_from_link,
            collector,
            parent: None,
            post: None,
            attachments: AttachmentSlot::default(),
            pages_count: self.configuration.pages_count(&self.board).unwrap_or(0),
            reflink_parsing: false,
            link_capture: None,
        }
    }
}

impl SiteParser for WakabaParser {
    fn convert_threads(&self, markup: Markup<'_>) -> Result<Vec<Thread>> {
        let mut holder = self.holder(ThreadCollector::for_threads());
        markup.run(table()?, &mut holder)?;
        let threads = holder.collector.finish_threads();
        debug!(board = %self.board, threads = threads.len(), "converted threads");
        Ok(threads)
    }

    fn convert_posts(&self, markup: Markup<'_>) -> Result<Vec<Post>> {
        let mut holder = self.holder(ThreadCollector::for_posts());
        markup.run(table()?, &mut holder)?;
        let posts = holder.collector.finish_posts();
        debug!(board = %self.board, posts = posts.len(), "converted posts");
        Ok(posts)
    }
}
