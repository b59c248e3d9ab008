//! Chat platform seam
//!
//! Everything the sorter needs from a chat service goes through [`ChatPlatform`],
//! so the core never sees library-specific message or error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Stable identifier of a message
    MessageId
);
id_type!(
    /// Stable identifier of a channel
    ChannelId
);
id_type!(
    /// Stable identifier of a server (guild)
    GuildId
);

/// Errors surfaced by a chat platform adapter
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform rejected the action because the bot lacks a privilege
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// Generic transport or API failure
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// An expected server, channel or message does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// A file attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Public URL of the attachment
    pub url: String,
    /// MIME type reported by the platform, if any
    pub content_type: Option<String>,
}

impl Attachment {
    /// Create an attachment descriptor
    #[must_use]
    pub fn new(url: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    /// Returns true when the content type denotes an image (`image/*`)
    ///
    /// # Examples
    ///
    /// ```
    /// use reaction_sorter_core::platform::Attachment;
    ///
    /// assert!(Attachment::new("https://cdn/a.png", Some("image/png")).is_image());
    /// assert!(Attachment::new("https://cdn/a.PNG", Some("IMAGE/PNG")).is_image());
    /// assert!(!Attachment::new("https://cdn/a.txt", Some("text/plain")).is_image());
    /// assert!(!Attachment::new("https://cdn/blob", None).is_image());
    /// ```
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("image/"))
    }
}

/// Ordered emoji to count mapping
///
/// Keys keep the order in which they were first seen. Setting an existing key
/// overwrites its count in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTally {
    entries: Vec<(String, u64)>,
}

impl ReactionTally {
    /// Create an empty tally
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set the count for an emoji, replacing any previous value
    pub fn set(&mut self, emoji: impl Into<String>, count: u64) {
        let emoji = emoji.into();
        if let Some(entry) = self.entries.iter_mut().find(|(e, _)| *e == emoji) {
            entry.1 = count;
        } else {
            self.entries.push((emoji, count));
        }
    }

    /// Count recorded for an emoji
    #[must_use]
    pub fn get(&self, emoji: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(e, _)| e == emoji)
            .map(|(_, count)| *count)
    }

    /// Sum of all counts
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Iterate emojis and counts in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(e, count)| (e.as_str(), *count))
    }

    /// Number of distinct emojis
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no reactions are recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for ReactionTally {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        let mut tally = Self::new();
        for (emoji, count) in iter {
            tally.set(emoji, count);
        }
        tally
    }
}

/// A message as seen by the sorter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPost {
    /// Message identifier
    pub id: MessageId,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Text body, if any
    pub content: Option<String>,
    /// Attachments in the order the platform reports them
    pub attachments: Vec<Attachment>,
    /// Reaction snapshot
    pub reactions: ReactionTally,
}

impl TrackedPost {
    /// Returns true if at least one attachment is an image
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.attachments.iter().any(Attachment::is_image)
    }

    /// Iterate over image attachments only
    pub fn image_attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(|a| a.is_image())
    }
}

/// Interface to the chat platform the bot is connected to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Fetch one page of channel history, newest first, strictly older than `before`
    async fn history_page(
        &self,
        channel: ChannelId,
        before: Option<MessageId>,
        limit: u8,
    ) -> Result<Vec<TrackedPost>, PlatformError>;
    /// Find a text channel by exact name within a server
    async fn find_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, PlatformError>;
    /// Create a text channel in a server
    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<ChannelId, PlatformError>;
    /// Send a text message, returning the new message id
    async fn send_message(&self, channel: ChannelId, text: &str)
        -> Result<MessageId, PlatformError>;
    /// Add a reaction to a message
    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError>;
    /// Delete every message in a channel, returning how many were deleted
    async fn purge_channel(&self, channel: ChannelId) -> Result<usize, PlatformError>;
    /// Find a server the bot is a member of by name
    async fn find_guild_by_name(&self, name: &str) -> Result<Option<GuildId>, PlatformError>;
    /// The server's system channel, if configured
    async fn system_channel(&self, guild: GuildId) -> Result<Option<ChannelId>, PlatformError>;
}
