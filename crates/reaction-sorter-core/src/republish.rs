//! Ranking and republishing pipeline
//!
//! Takes a collector snapshot, orders it by engagement and replays every post
//! into the destination channel, reproducing its reactions on the copy.

use crate::collector::collect_image_posts;
use crate::platform::{ChannelId, ChatPlatform, GuildId, MessageId, PlatformError, TrackedPost};
use crate::ranking::{rank, RankedPost};
use crate::utils::truncate_str;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Platform limit for a single message body, in characters
pub const MAX_MESSAGE_CHARS: usize = 2000;
/// First message written to the destination channel on every run
pub const SORTED_HEADER: &str = "Image posts sorted by reactions:";
/// Body used when a post yields neither text nor image links
pub const EMPTY_POST_PLACEHOLDER: &str = "Message had no content or attachments.";

/// Terminal failures of a sort run
#[derive(Debug, Error)]
pub enum SortError {
    /// Reading the source channel's history failed
    #[error("Failed to read channel history: {0}")]
    Collect(#[source] PlatformError),
    /// Looking up the destination channel failed
    #[error("Failed to look up destination channel '{name}': {source}")]
    Lookup {
        /// Destination channel name
        name: String,
        /// Underlying platform error
        #[source]
        source: PlatformError,
    },
    /// The missing destination channel could not be created
    #[error("Failed to create destination channel '{name}': {source}")]
    Destination {
        /// Destination channel name
        name: String,
        /// Underlying platform error
        #[source]
        source: PlatformError,
    },
    /// Sending a republished post failed
    #[error("Failed to publish sorted posts: {0}")]
    Publish(#[source] PlatformError),
}

/// Counters describing a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepublishReport {
    /// Channel the posts were written to
    pub destination: ChannelId,
    /// Number of republished posts
    pub published: usize,
    /// Reactions successfully reproduced
    pub reactions_added: usize,
    /// Reactions that could not be reproduced
    pub reactions_failed: usize,
}

/// Result of a republishing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepublishOutcome {
    /// The snapshot was empty; nothing was written
    NothingToSort,
    /// Posts were republished
    Published(RepublishReport),
}

/// Compose the body of a republished post.
///
/// Text content comes first, followed by one `Attachment: <url>` line per
/// image. The result never exceeds [`MAX_MESSAGE_CHARS`]: text is shortened
/// first, and when the image lines alone do not fit, the text is dropped and
/// the lines that do not fit are replaced by a single `+N more` line.
#[must_use]
pub fn compose_body(post: &TrackedPost) -> String {
    let links: Vec<String> = post
        .image_attachments()
        .map(|a| format!("Attachment: {}", a.url))
        .collect();
    // Each line plus its separating newline
    let links_len: usize = links.iter().map(|l| l.chars().count() + 1).sum();

    if links_len.saturating_sub(1) > MAX_MESSAGE_CHARS {
        return fit_links(links);
    }

    let mut lines = Vec::with_capacity(links.len() + 1);
    if let Some(text) = post.content.as_deref().filter(|t| !t.is_empty()) {
        let budget = MAX_MESSAGE_CHARS.saturating_sub(links_len);
        if text.chars().count() <= budget {
            lines.push(text.to_string());
        } else if budget > 0 {
            lines.push(format!("{}…", truncate_str(text, budget - 1)));
        }
    }
    lines.extend(links);

    if lines.is_empty() {
        EMPTY_POST_PLACEHOLDER.to_string()
    } else {
        lines.join("\n")
    }
}

/// Keep as many whole link lines as fit next to a trailing `+N more` line.
fn fit_links(links: Vec<String>) -> String {
    let total = links.len();
    let reserve = format!("+{total} more").chars().count();

    let mut used = 0;
    let mut kept = Vec::new();
    for link in links {
        let len = link.chars().count() + 1;
        if used + len + reserve > MAX_MESSAGE_CHARS {
            break;
        }
        used += len;
        kept.push(link);
    }

    let omitted = total - kept.len();
    kept.push(format!("+{omitted} more"));
    kept.join("\n")
}

/// Collect, rank and republish the image posts of `source`.
///
/// # Errors
///
/// Returns [`SortError::Collect`] if history cannot be read, otherwise any
/// error from [`republish`].
#[instrument(skip(platform))]
pub async fn sort_channel<P>(
    platform: &P,
    guild: GuildId,
    source: ChannelId,
    destination_name: &str,
) -> Result<RepublishOutcome, SortError>
where
    P: ChatPlatform + ?Sized,
{
    let snapshot = collect_image_posts(platform, source)
        .await
        .map_err(SortError::Collect)?;
    let ranked = rank(snapshot);
    republish(platform, guild, destination_name, &ranked).await
}

/// Replay ranked posts into the destination channel.
///
/// Posts are written in the given order. A failed reaction is logged and
/// skipped; a failed send stops the run.
///
/// # Errors
///
/// Returns [`SortError::Lookup`] if the channel lookup fails,
/// [`SortError::Destination`] if it cannot be created and
/// [`SortError::Publish`] if a message cannot be sent.
#[instrument(skip(platform, ranked), fields(posts = ranked.len()))]
pub async fn republish<P>(
    platform: &P,
    guild: GuildId,
    destination_name: &str,
    ranked: &[RankedPost],
) -> Result<RepublishOutcome, SortError>
where
    P: ChatPlatform + ?Sized,
{
    if ranked.is_empty() {
        debug!("Empty snapshot, nothing to republish");
        return Ok(RepublishOutcome::NothingToSort);
    }

    let destination = resolve_destination(platform, guild, destination_name).await?;
    platform
        .send_message(destination, SORTED_HEADER)
        .await
        .map_err(SortError::Publish)?;

    let mut report = RepublishReport {
        destination,
        published: 0,
        reactions_added: 0,
        reactions_failed: 0,
    };

    for entry in ranked {
        let body = compose_body(&entry.post);
        let copy = platform
            .send_message(destination, &body)
            .await
            .map_err(SortError::Publish)?;
        report.published += 1;

        let (added, failed) = reproduce_reactions(platform, destination, copy, &entry.post).await;
        report.reactions_added += added;
        report.reactions_failed += failed;
    }

    info!(
        published = report.published,
        reactions_added = report.reactions_added,
        reactions_failed = report.reactions_failed,
        "Republishing finished"
    );
    Ok(RepublishOutcome::Published(report))
}

async fn resolve_destination<P>(
    platform: &P,
    guild: GuildId,
    name: &str,
) -> Result<ChannelId, SortError>
where
    P: ChatPlatform + ?Sized,
{
    let existing = platform
        .find_text_channel(guild, name)
        .await
        .map_err(|source| SortError::Lookup {
            name: name.to_string(),
            source,
        })?;
    if let Some(channel) = existing {
        return Ok(channel);
    }

    info!(%guild, name, "Destination channel missing, creating it");
    platform
        .create_text_channel(guild, name)
        .await
        .map_err(|source| SortError::Destination {
            name: name.to_string(),
            source,
        })
}

async fn reproduce_reactions<P>(
    platform: &P,
    channel: ChannelId,
    copy: MessageId,
    original: &TrackedPost,
) -> (usize, usize)
where
    P: ChatPlatform + ?Sized,
{
    let mut added = 0;
    let mut failed = 0;
    for (emoji, _) in original.reactions.iter() {
        match platform.add_reaction(channel, copy, emoji).await {
            Ok(()) => added += 1,
            Err(e) => {
                warn!(
                    source_id = %original.id,
                    copy_id = %copy,
                    "Failed to add reaction {emoji} to sorted message: {e}"
                );
                failed += 1;
            }
        }
    }
    (added, failed)
}
