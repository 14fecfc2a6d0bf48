//! Domain objects populated by rule handlers.
//!
//! Plain value aggregates. They are built up inside handlers and treated
//! as immutable once a holder has committed them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Flag or badge shown next to a poster's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub uri: Url,
    pub title: String,
}

/// File attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Full-size file address.
    pub file_uri: Option<Url>,

    /// Thumbnail address. `None` for files rendered without a thumbnail.
    pub thumbnail_uri: Option<Url>,

    /// File name as uploaded, when the board shows it.
    pub original_name: Option<String>,

    /// Size in bytes, `0` when unknown.
    pub size: u64,

    pub width: u32,
    pub height: u32,

    pub spoiler: bool,
}

impl FileAttachment {
    /// Check if the markup told us anything concrete about the file.
    #[must_use]
    pub fn has_size_or_dimensions(&self) -> bool {
        self.size > 0 || self.width > 0 || self.height > 0
    }
}

/// A single post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Post {
    pub post_number: Option<String>,

    /// Number of the thread's opening post; `None` for the opening post
    /// itself.
    pub parent_post_number: Option<String>,

    pub subject: Option<String>,
    pub name: Option<String>,
    pub tripcode: Option<String>,
    pub capcode: Option<String>,
    /// Poster id shown by boards with per-thread ids.
    pub identifier: Option<String>,
    pub email: Option<String>,

    pub sage: bool,
    pub sticky: bool,
    /// Thread that drops its oldest replies instead of bumping off.
    pub cyclical: bool,

    /// Comment markup.
    pub comment: Option<String>,

    /// Milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,

    pub icons: Vec<Icon>,
    pub attachments: Vec<FileAttachment>,
}

impl Post {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_original_post(&self) -> bool {
        self.parent_post_number.is_none()
    }

    /// Timestamp as a UTC date-time.
    #[must_use]
    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }

    /// Appends to the name, space-separated. Boards split names across
    /// several spans.
    pub fn append_name(&mut self, part: &str) {
        let part = part.trim();
        if part.is_empty() {
            return;
        }
        match &mut self.name {
            Some(name) => {
                name.push(' ');
                name.push_str(part);
            }
            None => self.name = Some(part.to_string()),
        }
    }
}

/// A thread: its posts in document order plus the counters boards print
/// for what they omit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub posts: Vec<Post>,

    /// Total posts, including those omitted from a board page.
    pub posts_count: u32,

    /// Posts with files, when the board reports it.
    pub posts_with_files_count: u32,
}

impl Thread {
    pub fn add_posts_count(&mut self, count: u32) {
        self.posts_count = self.posts_count.saturating_add(count);
    }

    pub fn add_posts_with_files_count(&mut self, count: u32) {
        self.posts_with_files_count = self.posts_with_files_count.saturating_add(count);
    }

    #[must_use]
    pub fn original_post(&self) -> Option<&Post> {
        self.posts.first()
    }

    /// Number of the opening post.
    #[must_use]
    pub fn thread_number(&self) -> Option<&str> {
        self.original_post().and_then(|p| p.post_number.as_deref())
    }
}
