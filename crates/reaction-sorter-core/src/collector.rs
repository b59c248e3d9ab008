//! Image-post collector
//!
//! Walks a channel's full history newest-first and keeps every message that
//! carries at least one image attachment, together with its reaction snapshot.

use crate::platform::{ChannelId, ChatPlatform, PlatformError, TrackedPost};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Number of messages requested per history page (platform maximum)
pub const HISTORY_PAGE_SIZE: u8 = 100;

/// Collect all image posts in a channel.
///
/// The result keeps the history order (newest first). Each message appears
/// at most once regardless of how many images it carries. Any platform error
/// aborts the whole collection; nothing partial is returned.
///
/// # Errors
///
/// Returns the first [`PlatformError`] raised while paging history.
#[instrument(skip(platform))]
pub async fn collect_image_posts<P>(
    platform: &P,
    channel: ChannelId,
) -> Result<Vec<TrackedPost>, PlatformError>
where
    P: ChatPlatform + ?Sized,
{
    let mut snapshot = Vec::new();
    let mut seen = HashSet::new();
    let mut before = None;
    let mut scanned = 0usize;

    loop {
        let page = platform
            .history_page(channel, before, HISTORY_PAGE_SIZE)
            .await?;
        let Some(oldest) = page.last() else {
            break;
        };
        before = Some(oldest.id);
        let exhausted = page.len() < usize::from(HISTORY_PAGE_SIZE);
        scanned += page.len();

        snapshot.extend(
            page.into_iter()
                .filter(|post| post.has_image() && seen.insert(post.id)),
        );

        if exhausted {
            break;
        }
    }

    debug!(scanned, collected = snapshot.len(), "History scan finished");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MessageId, MockChatPlatform};
    use crate::testing::{image_post, post};
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_non_image_posts_are_skipped() {
        let mut platform = MockChatPlatform::new();
        platform.expect_history_page().times(1).returning(|_, _, _| {
            Ok(vec![
                post(3, Some("text only"), &[]),
                post(2, None, &[("https://cdn/doc.pdf", "application/pdf")]),
                post(1, None, &[("https://cdn/clip.mp4", "video/mp4")]),
            ])
        });

        let snapshot = collect_image_posts(&platform, ChannelId(10))
            .await
            .expect("collection succeeds");
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_single_image_among_other_files_is_included_once() {
        let mut platform = MockChatPlatform::new();
        platform.expect_history_page().times(1).returning(|_, _, _| {
            Ok(vec![post(
                5,
                Some("mixed"),
                &[
                    ("https://cdn/a.txt", "text/plain"),
                    ("https://cdn/b.jpg", "image/jpeg"),
                    ("https://cdn/c.zip", "application/zip"),
                ],
            )])
        });

        let snapshot = collect_image_posts(&platform, ChannelId(10))
            .await
            .expect("collection succeeds");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, MessageId(5));
    }

    #[tokio::test]
    async fn test_pages_until_history_is_exhausted() {
        let mut platform = MockChatPlatform::new();
        let mut seq = mockall::Sequence::new();
        platform
            .expect_history_page()
            .with(eq(ChannelId(10)), eq(None::<MessageId>), eq(HISTORY_PAGE_SIZE))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok((101..=200)
                    .rev()
                    .map(|id| image_post(id, None, &[]))
                    .collect())
            });
        platform
            .expect_history_page()
            .with(eq(ChannelId(10)), eq(Some(MessageId(101))), eq(HISTORY_PAGE_SIZE))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(vec![image_post(100, None, &[]), post(99, None, &[])]));

        let snapshot = collect_image_posts(&platform, ChannelId(10))
            .await
            .expect("collection succeeds");
        assert_eq!(snapshot.len(), 101);
        assert_eq!(snapshot.first().map(|p| p.id), Some(MessageId(200)));
        assert_eq!(snapshot.last().map(|p| p.id), Some(MessageId(100)));
    }

    #[tokio::test]
    async fn test_empty_channel_yields_empty_snapshot() {
        let mut platform = MockChatPlatform::new();
        platform
            .expect_history_page()
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));

        let snapshot = collect_image_posts(&platform, ChannelId(10))
            .await
            .expect("collection succeeds");
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_forbidden_history_aborts_collection() {
        let mut platform = MockChatPlatform::new();
        platform.expect_history_page().times(1).returning(|_, _, _| {
            Err(PlatformError::PermissionDenied("Missing Access".into()))
        });

        let result = collect_image_posts(&platform, ChannelId(10)).await;
        assert!(matches!(result, Err(PlatformError::PermissionDenied(_))));
    }
}
