//! Building blocks for holders.
//!
//! A holder is the per-parse mutable state a rule table writes into. Site
//! holders are plain structs; the two pieces every pipeline needs live here:
//!
//! - [`ThreadCollector`]: finished posts, grouped into threads at thread
//!   boundaries
//! - [`AttachmentSlot`]: an attachment under construction plus those
//!   already committed for the current post

use std::mem;

use crate::model::{FileAttachment, Post, Thread};

/// Accumulates posts and, in thread-list mode, groups them into threads.
///
/// In post-list mode there is no thread list: every finished post goes to
/// a single flat sequence.
#[derive(Debug, Default)]
pub struct ThreadCollector {
    current: Option<Thread>,
    posts: Vec<Post>,
    threads: Option<Vec<Thread>>,
    opening_post_only: bool,
}

impl ThreadCollector {
    /// Collector for a page listing many threads.
    #[must_use]
    pub fn for_threads() -> Self {
        Self {
            threads: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Closed threads count only their opening post, leaving shown
    /// replies to a page counter that already includes them.
    #[must_use]
    pub fn counting_opening_post_only(mut self) -> Self {
        self.opening_post_only = true;
        self
    }

    /// Collector for a single thread's posts.
    #[must_use]
    pub fn for_posts() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_thread_mode(&self) -> bool {
        self.threads.is_some()
    }

    /// Finished post, in document order.
    pub fn push_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    /// Thread being filled, if any.
    pub fn current_thread_mut(&mut self) -> Option<&mut Thread> {
        self.current.as_mut()
    }

    /// Closes the current thread and opens a fresh one.
    ///
    /// No-op outside thread-list mode.
    pub fn begin_thread(&mut self) {
        if !self.is_thread_mode() {
            return;
        }
        self.close_thread();
        self.current = Some(Thread::default());
    }

    /// Moves accumulated posts into the current thread and appends it to
    /// the result.
    ///
    /// With no accumulated posts nothing is pushed, so calling this twice
    /// in a row never duplicates a thread. Returns whether a thread was
    /// pushed.
    pub fn close_thread(&mut self) -> bool {
        let Some(threads) = self.threads.as_mut() else {
            return false;
        };
        if self.posts.is_empty() {
            return false;
        }
        let mut thread = self.current.take().unwrap_or_default();
        let shown = if self.opening_post_only {
            1
        } else {
            u32::try_from(self.posts.len()).unwrap_or(u32::MAX)
        };
        thread.add_posts_count(shown);
        thread.posts = mem::take(&mut self.posts);
        threads.push(thread);
        true
    }

    /// Flushes the last thread and returns all threads.
    ///
    /// Empty when no thread boundary or post was ever seen.
    #[must_use]
    pub fn finish_threads(mut self) -> Vec<Thread> {
        self.close_thread();
        self.threads.unwrap_or_default()
    }

    /// Returns all finished posts. In thread-list mode this is every post
    /// of every thread, in order.
    #[must_use]
    pub fn finish_posts(mut self) -> Vec<Post> {
        if self.is_thread_mode() {
            self.close_thread();
            return self
                .threads
                .unwrap_or_default()
                .into_iter()
                .flat_map(|t| t.posts)
                .collect();
        }
        self.posts
    }
}

/// Attachment slot for the post being parsed.
///
/// An attachment is opened optimistically when its first marker appears
/// and only reaches the committed list at a terminal marker. Whatever is
/// still pending when the post ends is dropped.
#[derive(Debug, Default)]
pub struct AttachmentSlot {
    pending: Option<FileAttachment>,
    committed: Vec<FileAttachment>,
}

impl AttachmentSlot {
    /// Starts a new pending attachment, dropping any previous one that
    /// never reached a terminal marker.
    pub fn open(&mut self) -> &mut FileAttachment {
        self.pending.insert(FileAttachment::default())
    }

    #[must_use]
    pub fn pending(&self) -> Option<&FileAttachment> {
        self.pending.as_ref()
    }

    pub fn pending_mut(&mut self) -> Option<&mut FileAttachment> {
        self.pending.as_mut()
    }

    /// Promotes the pending attachment. Returns `false` if none was open.
    pub fn commit(&mut self) -> bool {
        self.commit_if(|_| true)
    }

    /// Promotes the pending attachment if `keep` approves it, otherwise
    /// drops it. Either way the slot is empty afterwards.
    pub fn commit_if(&mut self, keep: impl FnOnce(&FileAttachment) -> bool) -> bool {
        match self.pending.take() {
            Some(attachment) if keep(&attachment) => {
                self.committed.push(attachment);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn committed(&self) -> &[FileAttachment] {
        &self.committed
    }

    /// Most recently committed attachment, for markers that trail the
    /// terminal one (dimensions rendered after the image, for instance).
    pub fn last_committed_mut(&mut self) -> Option<&mut FileAttachment> {
        self.committed.last_mut()
    }

    /// Hands the committed attachments to the finished post and resets
    /// the slot.
    pub fn take_committed(&mut self) -> Vec<FileAttachment> {
        self.pending = None;
        mem::take(&mut self.committed)
    }

    /// Forgets everything, for a post that starts before the previous one
    /// finished.
    pub fn reset(&mut self) {
        self.pending = None;
        self.committed.clear();
    }
}
