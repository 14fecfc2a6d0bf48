//! Boards that print base-36 post ids.
//!
//! Posts are `div[data-id]` blocks; `div.post-header` marks an opening
//! post, and thus a thread boundary on board pages. Comment markup is
//! normalized: post references get decimal numbers, anchor ids are removed
//! and quotes start on their own line.

use std::sync::{Arc, LazyLock};

use tracing::debug;

use super::{Markup, SiteParser};
use crate::error::{Error, Result};
use crate::holder::{AttachmentSlot, ThreadCollector};
use crate::locator::{convert_to_decimal_number, Locator};
use crate::markup::Attributes;
use crate::model::{Post, Thread};
use crate::template::RuleTable;
use crate::text::{
    break_before_quotes, clear_html, first_number, lenient_number, null_if_empty,
    rewrite_post_references, strip_link_ids,
};

/// Suffix of the thumbnail rendition of an image.
const THUMBNAIL_SUFFIX: &str = "-R256.jpg";

/// Marker distinguishing the image counter from the post counter.
const IMAGES_COUNT_MARKER: &str = "<span class=\"en\">I: </span>";

pub struct ErlachHolder {
    locator: Arc<dyn Locator>,
    collector: ThreadCollector,
    parent: Option<String>,
    post: Option<Post>,
    attachments: AttachmentSlot,
}

impl ErlachHolder {
    fn on_post(&mut self, attributes: &Attributes) {
        let id = convert_to_decimal_number(attributes.get_or_empty("data-id"));
        if id.is_none() {
            debug!(data_id = attributes.get_or_empty("data-id"), "post id is not base 36");
        }
        let class = attributes.get_or_empty("class");
        let post = self.post.get_or_insert_with(Post::new);
        if class.contains("head") {
            self.parent.clone_from(&id);
        } else {
            post.parent_post_number.clone_from(&self.parent);
        }
        post.post_number = id;
        post.sage = class.contains("sage");
    }

    fn on_header(&mut self) {
        self.collector.begin_thread();
        if let Some(post) = self.post.as_mut() {
            post.parent_post_number = None;
            self.parent.clone_from(&post.post_number);
        }
    }

    fn on_image(&mut self, attributes: &Attributes) {
        if self.post.is_none() {
            return;
        }
        let src = attributes.get_or_empty("src");
        let thumbnail = src
            .len()
            .checked_sub(4)
            .and_then(|end| src.get(..end))
            .map(|stem| format!("{stem}{THUMBNAIL_SUFFIX}"));
        let attachment = self.attachments.open();
        attachment.file_uri = self.locator.resolve(src);
        attachment.thumbnail_uri = thumbnail.and_then(|t| self.locator.resolve(&t));
        self.attachments.commit();
    }

    fn on_canvas(&mut self, attributes: &Attributes) {
        let Some(attachment) = self.attachments.last_committed_mut() else {
            return;
        };
        attachment.width = lenient_number("width", attributes.get_or_empty("width")).unwrap_or(0);
        attachment.height = lenient_number("height", attributes.get_or_empty("height")).unwrap_or(0);
    }

    fn on_message(&mut self, text: &str) {
        let Some(mut post) = self.post.take() else {
            return;
        };
        let comment = rewrite_post_references(text, convert_to_decimal_number);
        let comment = strip_link_ids(&comment);
        post.comment = Some(break_before_quotes(&comment));
        post.attachments = self.attachments.take_committed();
        self.collector.push_post(post);
    }

    fn on_counter(&mut self, text: &str) {
        let (Some(count), Some(thread)) = (first_number(text), self.collector.current_thread_mut()) else {
            return;
        };
        if text.contains(IMAGES_COUNT_MARKER) {
            thread.add_posts_with_files_count(count);
        } else {
            thread.add_posts_count(count);
        }
    }
}

static TABLE: LazyLock<Result<RuleTable<ErlachHolder>>> = LazyLock::new(|| {
    RuleTable::<ErlachHolder>::builder()
        .equals("div", "class", "content-title")
        .content(|holder, text| {
            if !holder.collector.is_thread_mode() {
                holder.post = Some(Post {
                    subject: null_if_empty(&clear_html(text)),
                    ..Post::default()
                });
            }
            Ok(())
        })
        .contains("div", "data-id", "")
        .open(|holder, _, attrs| {
            holder.on_post(attrs);
            Ok(false)
        })
        .equals("a", "class", "post-topic")
        .content(|holder, text| {
            if let Some(post) = holder.post.as_mut() {
                post.subject = null_if_empty(&clear_html(text));
            }
            Ok(())
        })
        .contains("div", "data-ts", "")
        .open(|holder, _, attrs| {
            if let Some(post) = holder.post.as_mut() {
                post.timestamp = lenient_number("timestamp", attrs.get_or_empty("data-ts"));
            }
            Ok(false)
        })
        .contains("img", "class", "media image")
        .open(|holder, _, attrs| {
            holder.on_image(attrs);
            Ok(false)
        })
        .name("canvas")
        .open(|holder, _, attrs| {
            holder.on_canvas(attrs);
            Ok(false)
        })
        // Swallowed so its nested post blocks are not dispatched.
        .equals("div", "class", "omitted")
        .content(|_, _| Ok(()))
        .equals("div", "class", "post-message")
        .content(|holder, text| {
            holder.on_message(text);
            Ok(())
        })
        .equals("div", "class", "post-header")
        .open(|holder, _, _| {
            holder.on_header();
            Ok(false)
        })
        .contains("span", "class", "info-posts-count")
        .contains("span", "class", "info-images-count")
        .content(|holder, text| {
            holder.on_counter(text);
            Ok(())
        })
        .build()
});

fn table() -> Result<&'static RuleTable<ErlachHolder>> {
    TABLE
        .as_ref()
        .map_err(|err| Error::InvalidRule(err.to_string()))
}

/// Parser for base-36 id board and thread pages.
#[derive(Clone)]
pub struct ErlachParser {
    locator: Arc<dyn Locator>,
}

impl ErlachParser {
    pub fn new(locator: Arc<dyn Locator>) -> Self {
        Self { locator }
    }

    fn holder(&self, collector: ThreadCollector) -> ErlachHolder {
        ErlachHolder {
            locator: Arc::clone(&self.locator),
            collector,
            parent: None,
            post: None,
            attachments: AttachmentSlot::default(),
        }
    }
}

impl SiteParser for ErlachParser {
    fn convert_threads(&self, markup: Markup<'_>) -> Result<Vec<Thread>> {
        let mut holder = self.holder(ThreadCollector::for_threads().counting_opening_post_only());
        markup.run(table()?, &mut holder)?;
        Ok(holder.collector.finish_threads())
    }

    fn convert_posts(&self, markup: Markup<'_>) -> Result<Vec<Post>> {
        let mut holder = self.holder(ThreadCollector::for_posts());
        markup.run(table()?, &mut holder)?;
        Ok(holder.collector.finish_posts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_builds() {
        assert!(table().is_ok_and(|t| t.len() == 11));
    }
}
