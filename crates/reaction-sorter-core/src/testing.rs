//! Testing helpers and mock utilities.
//!
//! Provides compact constructors for posts and a strict `MockChatPlatform`.

use crate::platform::{Attachment, MessageId, ReactionTally, TrackedPost};

/// Build a non-bot post from `(url, content_type)` pairs.
#[must_use]
pub fn post(id: u64, content: Option<&str>, attachments: &[(&str, &str)]) -> TrackedPost {
    TrackedPost {
        id: MessageId(id),
        author_is_bot: false,
        content: content.map(str::to_string),
        attachments: attachments
            .iter()
            .map(|(url, content_type)| Attachment::new(*url, Some(content_type)))
            .collect(),
        reactions: ReactionTally::new(),
    }
}

/// Build a post with a single PNG attachment and the given reactions.
#[must_use]
pub fn image_post(id: u64, content: Option<&str>, reactions: &[(&str, u64)]) -> TrackedPost {
    let url = format!("https://cdn.example/{id}.png");
    let mut p = post(id, content, &[(url.as_str(), "image/png")]);
    p.reactions = reactions.iter().map(|(e, c)| (*e, *c)).collect();
    p
}

/// Create a strict mock platform: any call without an expectation panics.
///
/// # Example
///
/// ```rust,ignore
/// let platform = mock_platform_strict();
/// // the code under test must not touch the platform
/// ```
#[must_use]
pub fn mock_platform_strict() -> crate::platform::MockChatPlatform {
    crate::platform::MockChatPlatform::new()
}
